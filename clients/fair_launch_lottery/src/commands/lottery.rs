//! The reconciliation driver: pulls ticket state, runs the lottery and
//! writes the winner bitmap back in size-bounded slices.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use tracing::{info, warn};

use crate::bitmap;
use crate::errors::LotteryError;
use crate::fetcher::{AccountSource, RecordFetcher};
use crate::ix;
use crate::lottery::select_winners;
use crate::state::{FairLaunch, FairLaunchTicket, TicketSeqLookup};
use crate::utils::{lottery_bitmap_address, seq_lookup_address};

use super::LaunchClient;

/// Runs the whole lottery for one sale. Safe to re-run after a partial
/// failure: bitmap slices are idempotent overwrites and the bitmap record is
/// only created when absent.
pub fn create_fair_launch_lottery(
    client: &LaunchClient,
    fair_launch_key: &Pubkey,
    seed: Option<u64>,
) -> Result<()> {
    let sale = client.fetch_sale(fair_launch_key)?;

    // 1. Ensure the bitmap record exists before anything else.
    let (lottery_bitmap, bitmap_bump) =
        lottery_bitmap_address(&sale.token_mint, &client.program_id)?;
    if client.record_exists(&lottery_bitmap)? {
        info!(%lottery_bitmap, "lottery bitmap record already exists");
    } else {
        let create = ix::create_fair_launch_lottery_bitmap(
            &client.program_id,
            fair_launch_key,
            &lottery_bitmap,
            &client.payer.pubkey(),
            &client.payer.pubkey(),
            bitmap_bump,
        )?;
        client
            .send(create)
            .with_context(|| format!("creating lottery bitmap {lottery_bitmap}"))?;
        info!(%lottery_bitmap, "created lottery bitmap record");
        client.wait_for_record(&lottery_bitmap)?;
    }

    // 2. Resolve sequence numbers to ticket addresses.
    let tickets = fetch_tickets(&client.rpc, &sale, &client.program_id)?;

    // 3. Partition into winners and losers.
    let mut rng = match seed {
        Some(value) => {
            info!(seed = value, "seeded draw, results are reproducible");
            StdRng::seed_from_u64(value)
        }
        None => StdRng::from_entropy(),
    };
    let decisions = select_winners(
        &tickets,
        sale.current_median,
        sale.data.number_of_tokens,
        &mut rng,
    );
    let winners = decisions.iter().filter(|d| d.chosen).count();
    info!(
        winners,
        tickets = decisions.len(),
        quota = sale.data.number_of_tokens,
        clearing_price = sale.current_median,
        "lottery complete"
    );

    // 4. Pack by sequence number and push slices in ascending offset order.
    let mut bits = vec![false; sale.number_tickets_sold as usize];
    for decision in &decisions {
        if let Some(slot) = bits.get_mut(decision.seq as usize) {
            *slot = decision.chosen;
        } else {
            warn!(seq = decision.seq, "sequence number beyond tickets_sold, skipped");
        }
    }

    for slice in bitmap::slice_plan(&bits) {
        let offset = slice.offset;
        let bytes = slice.bytes.len();
        let update = ix::update_fair_launch_lottery_bitmap(
            &client.program_id,
            fair_launch_key,
            &lottery_bitmap,
            &client.payer.pubkey(),
            slice.offset,
            slice.bytes,
        )?;
        match client.send_with_retry(&update) {
            Ok(sig) => info!(offset, bytes, %sig, "wrote bitmap slice"),
            Err(message) => {
                return Err(LotteryError::WriteBackFailure {
                    offset,
                    attempts: crate::constants::WRITE_RETRY_ATTEMPTS,
                    message,
                }
                .into());
            }
        }
    }

    info!("all bitmap slices written");
    Ok(())
}

/// Enumerates `0..tickets_sold`, resolves each sequence lookup record to its
/// ticket and decodes the ticket state. Corrupt or missing records are
/// logged and excluded; one bad ticket must not block the lottery for
/// everyone else.
fn fetch_tickets<S: AccountSource>(
    source: &S,
    sale: &FairLaunch,
    program_id: &Pubkey,
) -> Result<Vec<FairLaunchTicket>> {
    let mut seq_keys = Vec::with_capacity(sale.number_tickets_sold as usize);
    for seq in 0..sale.number_tickets_sold {
        seq_keys.push(seq_lookup_address(&sale.token_mint, seq, program_id)?.0);
    }

    let fetcher = RecordFetcher::new(source);
    let lookups = fetcher.fetch_many(&seq_keys)?;

    let mut ticket_keys = Vec::with_capacity(lookups.len());
    for (seq, (address, maybe)) in seq_keys.iter().zip(lookups).enumerate() {
        match maybe {
            Some(data) => match TicketSeqLookup::decode(*address, &data) {
                Ok(lookup) => ticket_keys.push(lookup.fair_launch_ticket),
                Err(e) => warn!(seq, error = %e, "skipping corrupt sequence lookup"),
            },
            // repairable via create_missing_sequences
            None => warn!(seq, %address, "missing sequence lookup record"),
        }
    }

    let ticket_buffers = fetcher.fetch_many(&ticket_keys)?;
    let mut tickets = Vec::with_capacity(ticket_keys.len());
    for (address, maybe) in ticket_keys.iter().zip(ticket_buffers) {
        match maybe {
            Some(data) => match FairLaunchTicket::decode(*address, &data) {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => warn!(%address, error = %e, "excluding malformed ticket record"),
            },
            None => warn!(%address, "ticket record vanished, excluded"),
        }
    }
    Ok(tickets)
}

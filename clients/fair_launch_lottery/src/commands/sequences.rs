//! Repair path: create sequence lookup records that a buyer's crashed or
//! raced client never got around to creating.

use anyhow::{Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use tracing::{info, warn};

use crate::ix;
use crate::state::FairLaunchTicket;
use crate::utils::{account_discriminator, seq_lookup_address};

use super::LaunchClient;

/// Picks the tickets still waiting for their sequence lookup record out of
/// an owner scan. The scan also returns the sale and bitmap records (same
/// sale id at offset 8), so foreign discriminators are skipped quietly; a
/// record that claims to be a ticket but fails to decode is logged with its
/// address before being passed over.
fn repair_candidate(address: Pubkey, data: &[u8]) -> Option<FairLaunchTicket> {
    if data.len() < 8 || data[..8] != account_discriminator("FairLaunchTicket") {
        return None;
    }
    let ticket = match FairLaunchTicket::decode(address, data) {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!(%address, error = %e, "skipping malformed ticket record");
            return None;
        }
    };
    ticket.state.needs_sequence().then_some(ticket)
}

/// Scans every ticket record of the sale and creates the lookup record for
/// any ticket still marked unsequenced. The sequence number itself was
/// assigned on purchase, so the expected lookup address is derivable.
pub fn create_missing_sequences(client: &LaunchClient, fair_launch_key: &Pubkey) -> Result<()> {
    let sale = client.fetch_sale(fair_launch_key)?;

    let config = RpcProgramAccountsConfig {
        filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            8,
            fair_launch_key.as_ref(),
        ))]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    };
    let accounts = client
        .rpc
        .get_program_accounts_with_config(&client.program_id, config)
        .context("scanning sale records by owner")?;
    info!(candidates = accounts.len(), "scanned program records for sale");

    let mut created = 0u64;
    for (address, account) in accounts {
        let Some(ticket) = repair_candidate(address, &account.data) else {
            continue;
        };

        info!(ticket = %address, seq = ticket.seq, "missing sequence lookup");
        let (seq_lookup, seq_bump) =
            seq_lookup_address(&sale.token_mint, ticket.seq, &client.program_id)?;
        let create = ix::create_ticket_seq(
            &client.program_id,
            &seq_lookup,
            fair_launch_key,
            &address,
            &client.payer.pubkey(),
            seq_bump,
        )?;
        match client.send_with_retry(&create) {
            Ok(sig) => {
                info!(%seq_lookup, %sig, "created sequence lookup");
                created += 1;
            }
            Err(message) => warn!(%seq_lookup, %message, "failed to create sequence lookup"),
        }
    }

    info!(created, "missing sequence pass complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TICKET_SIZE;
    use crate::state::fixtures::ticket_data;
    use crate::state::TicketState;

    fn unsequenced_ticket() -> Vec<u8> {
        ticket_data(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            5,
            TicketState::Unsequenced,
            11,
        )
    }

    #[test]
    fn unsequenced_ticket_is_a_repair_candidate() {
        let ticket = repair_candidate(Pubkey::new_unique(), &unsequenced_ticket()).unwrap();
        assert_eq!(ticket.seq, 11);
        assert!(ticket.state.needs_sequence());
    }

    #[test]
    fn sequenced_ticket_is_skipped() {
        let data = ticket_data(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            5,
            TicketState::Active,
            11,
        );
        assert!(repair_candidate(Pubkey::new_unique(), &data).is_none());
    }

    #[test]
    fn foreign_record_types_from_the_owner_scan_are_skipped() {
        // sale-id match at offset 8 is not enough; the discriminator decides
        let mut data = unsequenced_ticket();
        data[..8].copy_from_slice(&account_discriminator("FairLaunchLotteryBitmap"));
        assert!(repair_candidate(Pubkey::new_unique(), &data).is_none());
    }

    #[test]
    fn truncated_ticket_record_is_passed_over() {
        let mut data = unsequenced_ticket();
        data.truncate(TICKET_SIZE - 1);
        assert!(repair_candidate(Pubkey::new_unique(), &data).is_none());
    }
}

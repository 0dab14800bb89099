//! Human-readable reports over the sale, a single ticket and the lottery
//! outcome. Read-only; nothing here proposes a write.

use anyhow::{Context, Result};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use tracing::warn;

use crate::fetcher::RecordFetcher;
use crate::state::{FairLaunchLotteryBitmap, FairLaunchTicket, TicketSeqLookup};
use crate::utils::{lottery_bitmap_address, seq_lookup_address, ticket_address};

use super::LaunchClient;

pub fn show(client: &LaunchClient, fair_launch_key: &Pubkey) -> Result<()> {
    let sale = client.fetch_sale(fair_launch_key)?;

    let treasury_holdings = match sale.treasury_mint {
        Some(_) => client
            .rpc
            .get_token_account_balance(&sale.treasury)
            .context("fetching treasury token balance")?
            .ui_amount_string,
        None => {
            let lamports = client
                .rpc
                .get_balance(&sale.treasury)
                .context("fetching treasury balance")?;
            format!("{} SOL", lamports as f64 / LAMPORTS_PER_SOL as f64)
        }
    };

    println!("Token Mint                {}", sale.token_mint);
    println!("Treasury                  {}", sale.treasury);
    if let Some(mint) = sale.treasury_mint {
        println!("Treasury Mint             {mint}");
    }
    println!("Authority                 {}", sale.authority);
    println!("Price Range Start         {}", sale.data.price_range_start);
    println!("Price Range End           {}", sale.data.price_range_end);
    println!("Tick Size                 {}", sale.data.tick_size);
    println!("Fee                       {}", sale.data.fee);
    println!("Phase One Start           {}", sale.data.phase_one_start);
    println!("Phase One End             {}", sale.data.phase_one_end);
    println!("Phase Two End             {}", sale.data.phase_two_end);
    println!("Number of Tokens          {}", sale.data.number_of_tokens);
    println!("Tickets Un-Sequenced      {}", sale.number_tickets_un_seqed);
    println!("Tickets Sold              {}", sale.number_tickets_sold);
    println!("Tickets Dropped           {}", sale.number_tickets_dropped);
    println!("Tickets Punched           {}", sale.number_tickets_punched);
    println!("Phase Three Started       {}", sale.phase_three_started);
    println!("Current Median            {}", sale.current_median);
    println!("Treasury Holdings         {treasury_holdings}");

    println!("Counts at Each Tick");
    for (i, count) in sale.counts_at_each_tick.iter().enumerate() {
        let tick = sale.data.price_range_start + i as u64 * sale.data.tick_size;
        println!("  {tick}: {count}");
    }
    Ok(())
}

pub fn show_ticket(client: &LaunchClient, fair_launch_key: &Pubkey) -> Result<()> {
    let sale = client.fetch_sale(fair_launch_key)?;
    let (ticket_key, _) = ticket_address(
        &sale.token_mint,
        &client.payer.pubkey(),
        &client.program_id,
    )?;
    let data = client
        .rpc
        .get_account_data(&ticket_key)
        .with_context(|| format!("fetching ticket record {ticket_key}"))?;
    let ticket = FairLaunchTicket::decode(ticket_key, &data)?;

    println!("Ticket         {ticket_key}");
    println!("Buyer          {}", ticket.buyer);
    println!("Fair Launch    {}", ticket.fair_launch);
    println!("Current Amount {}", ticket.amount);
    println!("State          {:?}", ticket.state);
    println!("Bump           {}", ticket.bump);
    println!("Sequence       {}", ticket.seq);
    Ok(())
}

pub fn show_lottery(client: &LaunchClient, fair_launch_key: &Pubkey) -> Result<()> {
    let sale = client.fetch_sale(fair_launch_key)?;
    let (lottery_bitmap, _) = lottery_bitmap_address(&sale.token_mint, &client.program_id)?;
    let bitmap_data = client
        .rpc
        .get_account_data(&lottery_bitmap)
        .with_context(|| format!("fetching lottery bitmap {lottery_bitmap}"))?;
    let header = FairLaunchLotteryBitmap::decode(lottery_bitmap, &bitmap_data)?;

    let mut seq_keys = Vec::with_capacity(sale.number_tickets_sold as usize);
    for seq in 0..sale.number_tickets_sold {
        seq_keys.push(seq_lookup_address(&sale.token_mint, seq, &client.program_id)?.0);
    }
    let fetcher = RecordFetcher::new(&client.rpc);
    let lookups = fetcher.fetch_many(&seq_keys)?;

    let mut ticket_keys = Vec::new();
    for (seq, (address, maybe)) in seq_keys.iter().zip(lookups).enumerate() {
        match maybe {
            Some(data) => match TicketSeqLookup::decode(*address, &data) {
                Ok(lookup) => ticket_keys.push(lookup.fair_launch_ticket),
                Err(e) => warn!(seq, error = %e, "skipping corrupt sequence lookup"),
            },
            None => warn!(seq, "missing sequence lookup record"),
        }
    }

    let mut entries = Vec::new();
    let buffers = fetcher.fetch_many(&ticket_keys)?;
    for (address, maybe) in ticket_keys.iter().zip(buffers) {
        match maybe {
            Some(data) => match FairLaunchTicket::decode(*address, &data) {
                Ok(ticket) => entries.push((ticket.seq, ticket.buyer)),
                Err(e) => warn!(%address, error = %e, "excluding malformed ticket record"),
            },
            None => warn!(%address, "ticket record vanished"),
        }
    }
    entries.sort_by_key(|(seq, _)| *seq);

    for (seq, buyer) in entries {
        let outcome = if FairLaunchLotteryBitmap::is_winner(&bitmap_data, seq) {
            "won"
        } else {
            "lost"
        };
        println!("Ticket {seq:>6} {buyer} {outcome}");
    }
    println!("Bitmap Ones {}", header.bitmap_ones);
    Ok(())
}

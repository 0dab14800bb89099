//! Builders for the instructions this client proposes to the fair-launch
//! program. The program applies them atomically; nothing here mutates a
//! record directly.

use std::io;

use anchor_lang::prelude::borsh;
use anchor_lang::AnchorSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use solana_sdk::sysvar;

use crate::utils::instruction_discriminator;

#[derive(AnchorSerialize)]
struct CreateLotteryBitmapArgs {
    bump: u8,
}

#[derive(AnchorSerialize)]
struct UpdateLotteryBitmapArgs {
    index: u64,
    bytes: Vec<u8>,
}

#[derive(AnchorSerialize)]
struct CreateTicketSeqArgs {
    bump: u8,
}

fn encode_args<T: AnchorSerialize>(name: &str, args: &T) -> io::Result<Vec<u8>> {
    let mut data = instruction_discriminator(name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}

pub fn create_fair_launch_lottery_bitmap(
    program_id: &Pubkey,
    fair_launch: &Pubkey,
    lottery_bitmap: &Pubkey,
    authority: &Pubkey,
    payer: &Pubkey,
    bump: u8,
) -> io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*fair_launch, false),
            AccountMeta::new(*lottery_bitmap, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
            AccountMeta::new_readonly(sysvar::clock::id(), false),
        ],
        data: encode_args(
            "create_fair_launch_lottery_bitmap",
            &CreateLotteryBitmapArgs { bump },
        )?,
    })
}

/// `index` is the sequence number of the first decision in `bytes`; the
/// program overwrites exactly `bytes.len()` bytes starting at that slot and
/// adjusts its running ones-count by the delta.
pub fn update_fair_launch_lottery_bitmap(
    program_id: &Pubkey,
    fair_launch: &Pubkey,
    lottery_bitmap: &Pubkey,
    authority: &Pubkey,
    index: u64,
    bytes: Vec<u8>,
) -> io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*fair_launch, false),
            AccountMeta::new(*lottery_bitmap, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: encode_args(
            "update_fair_launch_lottery_bitmap",
            &UpdateLotteryBitmapArgs { index, bytes },
        )?,
    })
}

pub fn create_ticket_seq(
    program_id: &Pubkey,
    seq_lookup: &Pubkey,
    fair_launch: &Pubkey,
    ticket: &Pubkey,
    payer: &Pubkey,
    bump: u8,
) -> io::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*seq_lookup, false),
            AccountMeta::new_readonly(*fair_launch, false),
            AccountMeta::new(*ticket, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data: encode_args("create_ticket_seq", &CreateTicketSeqArgs { bump })?,
    })
}

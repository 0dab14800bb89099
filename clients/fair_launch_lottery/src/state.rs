use anchor_lang::prelude::borsh;
use anchor_lang::{AnchorDeserialize, AnchorSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::constants::*;
use crate::errors::LotteryError;
use crate::utils::account_discriminator;

fn read_u64(data: &[u8], loc: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[loc..loc + 8]);
    u64::from_le_bytes(buf)
}

fn read_pubkey(data: &[u8], loc: usize) -> Pubkey {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&data[loc..loc + 32]);
    Pubkey::new_from_array(buf)
}

fn check_discriminator(
    address: &Pubkey,
    data: &[u8],
    account_name: &str,
) -> Result<(), LotteryError> {
    if data.len() < 8 || data[..8] != account_discriminator(account_name) {
        return Err(LotteryError::MalformedRecord {
            address: *address,
            reason: format!("bad {account_name} discriminator"),
        });
    }
    Ok(())
}

// ---------------
// Ticket records
// ---------------

/// Lifecycle state tag at `TICKET_STATE_LOC`. Unknown tags decode to
/// `Unknown` and count as ineligible; they never abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Unsequenced,
    Active,
    Punched,
    Withdrawn,
    Unknown(u8),
}

impl TicketState {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => TicketState::Unsequenced,
            1 => TicketState::Active,
            2 => TicketState::Punched,
            3 => TicketState::Withdrawn,
            other => TicketState::Unknown(other),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            TicketState::Unsequenced => 0,
            TicketState::Active => 1,
            TicketState::Punched => 2,
            TicketState::Withdrawn => 3,
            TicketState::Unknown(other) => *other,
        }
    }

    /// Only active (sequenced, not yet punched or withdrawn) tickets can win.
    pub fn is_active(&self) -> bool {
        matches!(self, TicketState::Active)
    }

    /// True when the ticket's sequence lookup record was never created.
    pub fn needs_sequence(&self) -> bool {
        matches!(self, TicketState::Unsequenced)
    }
}

#[derive(Debug, Clone)]
pub struct FairLaunchTicket {
    pub address: Pubkey,
    pub fair_launch: Pubkey,
    pub buyer: Pubkey,
    pub amount: u64,
    pub state: TicketState,
    pub bump: u8,
    pub seq: u64,
}

impl FairLaunchTicket {
    /// Fixed-offset decode. Fails only when the buffer is shorter than the
    /// minimum layout; everything else decodes totally.
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, LotteryError> {
        if data.len() < TICKET_SIZE {
            return Err(LotteryError::MalformedRecord {
                address,
                reason: format!("ticket record is {} bytes, need {}", data.len(), TICKET_SIZE),
            });
        }
        check_discriminator(&address, data, "FairLaunchTicket")?;

        Ok(FairLaunchTicket {
            address,
            fair_launch: read_pubkey(data, TICKET_SALE_LOC),
            buyer: read_pubkey(data, TICKET_BUYER_LOC),
            amount: read_u64(data, TICKET_AMOUNT_LOC),
            state: TicketState::from_tag(data[TICKET_STATE_LOC]),
            bump: data[TICKET_BUMP_LOC],
            seq: read_u64(data, TICKET_SEQ_LOC),
        })
    }
}

// ------------------------
// Sequence lookup records
// ------------------------

#[derive(Debug, Clone)]
pub struct TicketSeqLookup {
    pub fair_launch_ticket: Pubkey,
}

impl TicketSeqLookup {
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, LotteryError> {
        if data.len() < SEQ_LOOKUP_TICKET_LOC + 32 {
            return Err(LotteryError::MalformedRecord {
                address,
                reason: format!("sequence lookup record is {} bytes", data.len()),
            });
        }
        Ok(TicketSeqLookup {
            fair_launch_ticket: read_pubkey(data, SEQ_LOOKUP_TICKET_LOC),
        })
    }
}

// ------------
// Sale record
// ------------

#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone)]
pub struct FairLaunchData {
    pub uuid: String,
    pub price_range_start: u64,
    pub price_range_end: u64,
    pub phase_one_start: i64,
    pub phase_one_end: i64,
    pub phase_two_end: i64,
    pub tick_size: u64,
    pub number_of_tokens: u64,
    pub fee: u64,
}

/// The sale record is created once by the external program and only read
/// here; counters and the median move as buyers act.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone)]
pub struct FairLaunch {
    pub token_mint: Pubkey,
    pub treasury: Pubkey,
    pub treasury_mint: Option<Pubkey>,
    pub authority: Pubkey,
    pub bump: u8,
    pub treasury_bump: u8,
    pub token_mint_bump: u8,
    pub data: FairLaunchData,
    pub number_tickets_un_seqed: u64,
    pub number_tickets_sold: u64,
    pub number_tickets_dropped: u64,
    pub number_tickets_punched: u64,
    pub phase_three_started: bool,
    pub current_median: u64,
    pub counts_at_each_tick: Vec<u64>,
}

impl FairLaunch {
    pub fn from_account_data(address: Pubkey, data: &[u8]) -> Result<Self, LotteryError> {
        check_discriminator(&address, data, "FairLaunch")?;
        FairLaunch::deserialize(&mut &data[8..]).map_err(|e| LotteryError::MalformedRecord {
            address,
            reason: e.to_string(),
        })
    }
}

// ----------------------
// Lottery bitmap record
// ----------------------

#[derive(Debug, Clone)]
pub struct FairLaunchLotteryBitmap {
    pub fair_launch: Pubkey,
    pub bump: u8,
    pub bitmap_ones: u64,
}

impl FairLaunchLotteryBitmap {
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, LotteryError> {
        if data.len() < BITMAP_DATA_LOC {
            return Err(LotteryError::MalformedRecord {
                address,
                reason: format!("lottery bitmap record is {} bytes", data.len()),
            });
        }
        check_discriminator(&address, data, "FairLaunchLotteryBitmap")?;
        Ok(FairLaunchLotteryBitmap {
            fair_launch: read_pubkey(data, BITMAP_SALE_LOC),
            bump: data[BITMAP_BUMP_LOC],
            bitmap_ones: read_u64(data, BITMAP_ONES_LOC),
        })
    }

    /// Tests the packed bit for `seq` against full account data. Sequence
    /// numbers past the written bit array read as losses.
    pub fn is_winner(account_data: &[u8], seq: u64) -> bool {
        if account_data.len() <= BITMAP_DATA_LOC {
            return false;
        }
        crate::bitmap::bit_at(&account_data[BITMAP_DATA_LOC..], seq)
    }
}

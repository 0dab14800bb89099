use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use solana_sha256_hasher::hashv;

use crate::errors::LotteryError;

// -----------------
// Seeds / constants
// -----------------
pub const FAIR_LAUNCH_SEED: &[u8] = b"fair_launch";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const LOTTERY_SEED: &[u8] = b"lottery";

/// Program that owns every record this client reads or proposes writes to.
pub const FAIR_LAUNCH_PROGRAM: &str = "3vKL5qa6htjkRwmjmsEAjnEp7ctfRSWekiHWx1A6VK2C";

pub fn fair_launch_program_id() -> Pubkey {
    Pubkey::new_from_array([
        43, 95, 225, 165, 58, 62, 86, 230, 90, 245, 251, 116, 153, 223, 147, 184,
        54, 170, 109, 61, 143, 207, 213, 119, 77, 75, 28, 213, 148, 166, 183, 157,
    ])
}

/// Parses a base58 record address, mapping malformed input to `InvalidSeed`
/// so the caller aborts before deriving anything from garbage.
pub fn parse_record_key(raw: &str) -> Result<Pubkey, LotteryError> {
    Pubkey::from_str(raw).map_err(|_| LotteryError::InvalidSeed {
        owner: raw.to_string(),
    })
}

fn derive(seeds: &[&[u8]], program_id: &Pubkey, owner: &Pubkey) -> Result<(Pubkey, u8), LotteryError> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or(LotteryError::InvalidSeed {
        owner: owner.to_string(),
    })
}

// ------------------------------------------------------------------
// Record address derivation. All of these are pure: identical inputs
// always yield the identical (address, bump) pair, so no component
// ever needs to persist an address it can recompute.
// ------------------------------------------------------------------

pub fn fair_launch_address(
    token_mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), LotteryError> {
    derive(&[FAIR_LAUNCH_SEED, token_mint.as_ref()], program_id, token_mint)
}

pub fn treasury_address(
    token_mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), LotteryError> {
    derive(
        &[FAIR_LAUNCH_SEED, token_mint.as_ref(), TREASURY_SEED],
        program_id,
        token_mint,
    )
}

pub fn ticket_address(
    token_mint: &Pubkey,
    buyer: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), LotteryError> {
    derive(
        &[FAIR_LAUNCH_SEED, token_mint.as_ref(), buyer.as_ref()],
        program_id,
        buyer,
    )
}

/// Sequence lookup records are keyed by the little-endian encoding of the
/// sequence number, which lets the driver enumerate tickets positionally.
pub fn seq_lookup_address(
    token_mint: &Pubkey,
    seq: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), LotteryError> {
    let seq_le = seq.to_le_bytes();
    derive(
        &[FAIR_LAUNCH_SEED, token_mint.as_ref(), seq_le.as_ref()],
        program_id,
        token_mint,
    )
}

pub fn lottery_bitmap_address(
    token_mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), LotteryError> {
    derive(
        &[FAIR_LAUNCH_SEED, token_mint.as_ref(), LOTTERY_SEED],
        program_id,
        token_mint,
    )
}

// -------------------------------------------------
// Anchor discriminators (accounts and instructions)
// -------------------------------------------------

pub fn account_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("account:{name}");
    let hash = hashv(&[preimage.as_bytes()]).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let hash = hashv(&[preimage.as_bytes()]).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LotteryError {
    #[error("Invalid derivation seed: {owner}")]
    InvalidSeed { owner: String },

    #[error("Malformed record {address}: {reason}")]
    MalformedRecord { address: Pubkey, reason: String },

    #[error("Fetch batch {batch} failed after {attempts} attempts: {message}")]
    FetchBatchFailure {
        batch: usize,
        attempts: u32,
        message: String,
    },

    #[error("Bitmap slice write at offset {offset} failed after {attempts} attempts: {message}")]
    WriteBackFailure {
        offset: u64,
        attempts: u32,
        message: String,
    },

    #[error("Record {address} never became visible after creation")]
    RecordNotVisible { address: Pubkey },
}

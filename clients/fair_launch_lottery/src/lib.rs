//! Client-side lottery and allocation reconciliation engine for fair-launch
//! token sales. Derives record addresses, pulls ticket state in bounded
//! batches, runs the winner draw and reconciles the packed winner bitmap
//! back to the on-chain record store.

pub mod bitmap;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod fetcher;
pub mod ix;
pub mod lottery;
pub mod state;
pub mod utils;

pub use constants::*;
pub use errors::*;
pub use lottery::*;
pub use state::*;
pub use utils::*;

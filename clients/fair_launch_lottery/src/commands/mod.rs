pub mod lottery;
pub mod sequences;
pub mod show;

use std::thread::sleep;
use std::time::Duration;

use anyhow::{Context, Result};
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::{info, warn};

use crate::constants::{RECORD_VISIBILITY_ATTEMPTS, RETRY_BASE_DELAY_MS, WRITE_RETRY_ATTEMPTS};
use crate::errors::LotteryError;
use crate::state::FairLaunch;

/// Wallet, RPC connection and program id shared by every command.
pub struct LaunchClient {
    pub rpc: RpcClient,
    pub payer: Keypair,
    pub program_id: Pubkey,
}

impl LaunchClient {
    pub fn new(rpc_url: String, payer: Keypair, program_id: Pubkey) -> Self {
        let rpc = RpcClient::new_with_timeout_and_commitment(
            rpc_url,
            Duration::from_secs(25),
            CommitmentConfig::confirmed(),
        );
        LaunchClient {
            rpc,
            payer,
            program_id,
        }
    }

    pub fn fetch_sale(&self, fair_launch_key: &Pubkey) -> Result<FairLaunch> {
        let data = self
            .rpc
            .get_account_data(fair_launch_key)
            .with_context(|| format!("fetching sale record {fair_launch_key}"))?;
        Ok(FairLaunch::from_account_data(*fair_launch_key, &data)?)
    }

    pub fn record_exists(&self, address: &Pubkey) -> Result<bool> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .with_context(|| format!("checking record {address}"))?;
        Ok(response.value.is_some())
    }

    /// Signs and submits one proposed instruction with a fresh blockhash.
    pub fn send(&self, ix: Instruction) -> Result<Signature> {
        let blockhash = self.rpc.get_latest_blockhash()?;
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        Ok(self.rpc.send_and_confirm_transaction(&tx)?)
    }

    /// Retries a rejected submission with doubling backoff. Returns the last
    /// rejection message once the attempts are spent so the caller can name
    /// the failing write.
    pub fn send_with_retry(&self, ix: &Instruction) -> std::result::Result<Signature, String> {
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
        let mut last_message = String::new();
        for attempt in 1..=WRITE_RETRY_ATTEMPTS {
            match self.send(ix.clone()) {
                Ok(sig) => return Ok(sig),
                Err(e) => {
                    warn!(attempt, error = %e, "submission rejected");
                    last_message = e.to_string();
                    if attempt < WRITE_RETRY_ATTEMPTS {
                        sleep(delay);
                        delay *= 2;
                    }
                }
            }
        }
        Err(last_message)
    }

    /// Polls until a freshly created record is visible at our commitment.
    /// The record store lags briefly after creation; bounded backoff here
    /// replaces a flat sleep.
    pub fn wait_for_record(&self, address: &Pubkey) -> std::result::Result<(), LotteryError> {
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
        for attempt in 1..=RECORD_VISIBILITY_ATTEMPTS {
            match self.record_exists(address) {
                Ok(true) => {
                    info!(%address, attempt, "record visible");
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => warn!(%address, attempt, error = %e, "visibility check failed"),
            }
            if attempt < RECORD_VISIBILITY_ATTEMPTS {
                sleep(delay);
                delay *= 2;
            }
        }
        Err(LotteryError::RecordNotVisible { address: *address })
    }
}

//! Order-preserving, size-bounded bulk retrieval of raw record contents.

use std::thread::sleep;
use std::time::Duration;

use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::constants::{FETCH_RETRY_ATTEMPTS, MAX_FETCH_BATCH, RETRY_BASE_DELAY_MS};
use crate::errors::LotteryError;

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Bridge to the record store's bulk read. One call per batch; the store
/// caps the number of addresses it accepts per call.
pub trait AccountSource {
    fn multiple_accounts(&self, keys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>, SourceError>;
}

impl AccountSource for RpcClient {
    fn multiple_accounts(&self, keys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>, SourceError> {
        let accounts = self.get_multiple_accounts(keys)?;
        Ok(accounts
            .into_iter()
            .map(|maybe| maybe.map(|acc| acc.data))
            .collect())
    }
}

pub struct RecordFetcher<'a, S: AccountSource> {
    source: &'a S,
    attempts: u32,
    base_delay: Duration,
}

impl<'a, S: AccountSource> RecordFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        RecordFetcher {
            source,
            attempts: FETCH_RETRY_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }

    #[cfg(test)]
    fn with_base_delay(source: &'a S, base_delay: Duration) -> Self {
        RecordFetcher {
            source,
            attempts: FETCH_RETRY_ATTEMPTS,
            base_delay,
        }
    }

    /// Retrieves raw contents for `keys`, positionally aligned with the
    /// input: `result[i]` always belongs to `keys[i]`, and `None` marks a
    /// record that does not exist yet (not an error). A failing batch is
    /// retried with doubling backoff; only its own addresses surface in the
    /// eventual `FetchBatchFailure`.
    pub fn fetch_many(&self, keys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>, LotteryError> {
        let mut out = Vec::with_capacity(keys.len());
        for (batch_index, batch) in keys.chunks(MAX_FETCH_BATCH).enumerate() {
            debug!(
                batch = batch_index,
                first = batch_index * MAX_FETCH_BATCH,
                len = batch.len(),
                "pulling record batch"
            );
            out.extend(self.fetch_batch(batch_index, batch)?);
        }
        Ok(out)
    }

    fn fetch_batch(
        &self,
        batch_index: usize,
        batch: &[Pubkey],
    ) -> Result<Vec<Option<Vec<u8>>>, LotteryError> {
        let mut delay = self.base_delay;
        let mut last_message = String::new();
        for attempt in 1..=self.attempts {
            match self.source.multiple_accounts(batch) {
                Ok(contents) => return Ok(contents),
                Err(e) => {
                    warn!(
                        batch = batch_index,
                        attempt,
                        error = %e,
                        "record batch fetch failed"
                    );
                    last_message = e.to_string();
                    if attempt < self.attempts {
                        sleep(delay);
                        delay *= 2;
                    }
                }
            }
        }
        Err(LotteryError::FetchBatchFailure {
            batch: batch_index,
            attempts: self.attempts,
            message: last_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;

    /// Tags every returned buffer with the key it was asked for, so the test
    /// can verify positional alignment across batch boundaries.
    struct EchoSource {
        batch_sizes: RefCell<Vec<usize>>,
        missing_every: u64,
    }

    impl AccountSource for EchoSource {
        fn multiple_accounts(
            &self,
            keys: &[Pubkey],
        ) -> Result<Vec<Option<Vec<u8>>>, SourceError> {
            self.batch_sizes.borrow_mut().push(keys.len());
            Ok(keys
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    if self.missing_every > 0 && i as u64 % self.missing_every == 3 {
                        None
                    } else {
                        Some(k.to_bytes().to_vec())
                    }
                })
                .collect())
        }
    }

    struct FlakySource {
        failures_left: RefCell<u32>,
        inner: EchoSource,
    }

    impl AccountSource for FlakySource {
        fn multiple_accounts(
            &self,
            keys: &[Pubkey],
        ) -> Result<Vec<Option<Vec<u8>>>, SourceError> {
            let mut left = self.failures_left.borrow_mut();
            if *left > 0 {
                *left -= 1;
                return Err(Box::new(io::Error::other("node unavailable")));
            }
            self.inner.multiple_accounts(keys)
        }
    }

    fn echo(missing_every: u64) -> EchoSource {
        EchoSource {
            batch_sizes: RefCell::new(Vec::new()),
            missing_every,
        }
    }

    #[test]
    fn results_stay_aligned_with_request_order() {
        let keys: Vec<Pubkey> = (0..257).map(|_| Pubkey::new_unique()).collect();
        let source = echo(0);
        let fetcher = RecordFetcher::new(&source);

        let results = fetcher.fetch_many(&keys).unwrap();
        assert_eq!(results.len(), keys.len());
        for (key, result) in keys.iter().zip(&results) {
            assert_eq!(result.as_deref(), Some(key.to_bytes().as_slice()));
        }
        assert_eq!(*source.batch_sizes.borrow(), vec![100, 100, 57]);
    }

    #[test]
    fn absent_records_come_back_as_none_in_place() {
        let keys: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let source = echo(5);
        let fetcher = RecordFetcher::new(&source);

        let results = fetcher.fetch_many(&keys).unwrap();
        assert!(results[3].is_none());
        assert!(results[8].is_none());
        assert_eq!(results.iter().filter(|r| r.is_none()).count(), 2);
    }

    #[test]
    fn transient_batch_failure_is_retried() {
        let keys: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        let source = FlakySource {
            failures_left: RefCell::new(1),
            inner: echo(0),
        };
        let fetcher = RecordFetcher::with_base_delay(&source, Duration::from_millis(1));

        let results = fetcher.fetch_many(&keys).unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn persistent_failure_names_the_batch() {
        let keys: Vec<Pubkey> = (0..150).map(|_| Pubkey::new_unique()).collect();
        let source = FlakySource {
            failures_left: RefCell::new(u32::MAX),
            inner: echo(0),
        };
        let fetcher = RecordFetcher::with_base_delay(&source, Duration::from_millis(1));

        let err = fetcher.fetch_many(&keys).unwrap_err();
        match err {
            LotteryError::FetchBatchFailure { batch, attempts, .. } => {
                assert_eq!(batch, 0);
                assert_eq!(attempts, FETCH_RETRY_ATTEMPTS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

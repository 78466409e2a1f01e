// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded worker pool for per-unit rewrites.
//!
//! ```text
//! units --acquire permit--> spawn_blocking(job.process(unit))
//!   |         (threads)                |
//!   |                                  v
//!   +-- cancelled: stop submitting   JoinSet --join all--> PoolOutcome
//!                                     failures are counted, never fatal
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::incremental::RemapUnit;
use crate::error::Result;

/// Work done for one unit. Returns whether the written bytes differ from
/// the input.
pub trait UnitJob: Send + Sync + 'static {
    /// # Errors
    ///
    /// Any error is logged and counted as a failed unit.
    fn process(&self, unit: &RemapUnit) -> Result<bool>;
}

/// Totals of one pool run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolOutcome {
    /// Units written to the output directory.
    pub written: usize,
    /// Written units whose bytes changed.
    pub rewritten: usize,
    /// Units that failed, sorted.
    pub failed: Vec<PathBuf>,
    /// Units never started because the run was cancelled.
    pub not_started: usize,
}

/// Default worker count: available parallelism + 1.
#[must_use]
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
        + 1
}

/// Fixed-size pool running one blocking task per unit.
#[derive(Debug, Clone)]
pub struct RemapPool {
    threads: usize,
    cancel_token: CancellationToken,
}

impl RemapPool {
    /// Creates a pool with `threads` workers, or the default when `None`.
    #[must_use]
    pub fn new(threads: Option<usize>) -> Self {
        Self {
            threads: threads.filter(|t| *t > 0).unwrap_or_else(default_threads),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop submitting new units.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `job` for every unit and waits for all of them.
    ///
    /// Units already running when cancellation is requested finish
    /// normally.
    pub async fn run<J: UnitJob>(&self, units: Vec<RemapUnit>, job: Arc<J>) -> PoolOutcome {
        let semaphore = Arc::new(Semaphore::new(self.threads));
        let mut set = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, PathBuf> = HashMap::new();
        let mut outcome = PoolOutcome::default();

        let total = units.len();
        for (submitted, unit) in units.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                outcome.not_started = total - submitted;
                tracing::warn!(not_started = outcome.not_started, "remap cancelled");
                break;
            };

            let job = Arc::clone(&job);
            let source = unit.source.clone();
            let handle = set.spawn_blocking(move || {
                let _permit = permit;
                job.process(&unit)
            });
            in_flight.insert(handle.id(), source);
        }

        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((id, Ok(changed))) => {
                    in_flight.remove(&id);
                    outcome.written += 1;
                    if changed {
                        outcome.rewritten += 1;
                    }
                }
                Ok((id, Err(e))) => {
                    let source = in_flight.remove(&id).unwrap_or_default();
                    tracing::error!(unit = %source.display(), error = %format!("{e:#}"), "failed to remap unit");
                    outcome.failed.push(source);
                }
                Err(e) => {
                    let source = in_flight.remove(&e.id()).unwrap_or_default();
                    tracing::error!(unit = %source.display(), error = %e, "remap task panicked");
                    outcome.failed.push(source);
                }
            }
        }

        outcome.failed.sort();
        outcome
    }
}

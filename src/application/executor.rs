//! Bounded concurrency executor.
//!
//! Runs independent units of work as tokio tasks with at most `limit` in
//! flight. A permit from a shared [`Semaphore`] is acquired *before* each
//! task is spawned, so neither in-flight calls nor task bookkeeping can grow
//! past the bound. Results land in a slot vector indexed by input position;
//! completion order never leaks into the output.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{ConfigError, LedgerError, LedgerResult, Result};

/// Executes units of work with a fixed concurrency bound.
///
/// Cloning an `Arc<BoundedExecutor>` shares the bound: concurrent runs
/// against the same endpoint compete for the same permits.
#[derive(Debug)]
pub struct BoundedExecutor {
    limit: usize,
    semaphore: Arc<Semaphore>,
}

impl BoundedExecutor {
    /// Create an executor allowing `limit` units in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `limit` is zero.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_requests",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(Self {
            limit,
            semaphore: Arc::new(Semaphore::new(limit)),
        })
    }

    /// Configured concurrency bound.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Units currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Run a single call inline under a permit.
    ///
    /// For the one-off calls around a stage (counting, probing), so that
    /// every remote call counts against the bound.
    pub async fn call<T, Fut>(&self, unit: Fut) -> LedgerResult<T>
    where
        Fut: Future<Output = LedgerResult<T>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|closed| LedgerError::Aborted(closed.to_string()))?;
        unit.await
    }

    /// Run every unit and return one result per unit, in input order.
    ///
    /// A failing or panicking unit only affects its own slot.
    pub async fn run<T, Fut>(&self, units: Vec<Fut>) -> Vec<LedgerResult<T>>
    where
        T: Send + 'static,
        Fut: Future<Output = LedgerResult<T>> + Send + 'static,
    {
        let total = units.len();
        let mut slots: Vec<Option<LedgerResult<T>>> =
            std::iter::repeat_with(|| None).take(total).collect();
        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(total);

        for (index, unit) in units.into_iter().enumerate() {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(closed) => {
                    slots[index] = Some(Err(LedgerError::Aborted(closed.to_string())));
                    continue;
                }
            };
            let handle = tasks.spawn(async move {
                let _permit = permit;
                (index, unit.await)
            });
            positions.insert(handle.id(), index);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(err) => {
                    let Some(&index) = positions.get(&err.id()) else {
                        warn!(error = %err, "Lost track of a failed task");
                        continue;
                    };
                    warn!(index, error = %err, "Unit of work aborted");
                    slots[index] = Some(Err(LedgerError::Aborted(err.to_string())));
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(LedgerError::Aborted("task result missing".to_string())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn zero_limit_is_a_configuration_error() {
        let err = BoundedExecutor::new(0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::InvalidValue {
                field: "max_concurrent_requests",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn call_holds_a_permit_while_running() {
        let executor = Arc::new(BoundedExecutor::new(2).unwrap());
        let observed = executor
            .call({
                let executor = Arc::clone(&executor);
                async move { Ok::<_, LedgerError>(executor.in_flight()) }
            })
            .await
            .unwrap();
        assert_eq!(observed, 1);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let executor = BoundedExecutor::new(3).unwrap();
        let units: Vec<std::future::Ready<LedgerResult<u8>>> = Vec::new();
        assert!(executor.run(units).await.is_empty());
    }

    #[tokio::test]
    async fn results_follow_input_order_not_completion_order() {
        let executor = BoundedExecutor::new(4).unwrap();
        let units: Vec<_> = (0..8u64)
            .map(|i| async move {
                // Later inputs finish first.
                tokio::time::sleep(Duration::from_millis(40 - i * 5)).await;
                Ok(i)
            })
            .collect();

        let results = executor.run(units).await;
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn never_exceeds_the_limit() {
        let executor = BoundedExecutor::new(3).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let units: Vec<_> = (0..20)
            .map(|_| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .collect();

        let results = executor.run(units).await;
        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test]
    async fn failures_stay_in_their_slot() {
        let executor = BoundedExecutor::new(2).unwrap();
        let units: Vec<_> = (0..5u32)
            .map(|i| async move {
                if i == 2 {
                    Err(LedgerError::Network("boom".into()))
                } else {
                    Ok(i)
                }
            })
            .collect();

        let results = executor.run(units).await;
        assert!(results[2].is_err());
        assert_eq!(
            results.iter().filter(|r| r.is_ok()).count(),
            4,
            "siblings of a failed unit must complete"
        );
    }

    #[tokio::test]
    async fn panicking_unit_is_captured_as_aborted() {
        let executor = BoundedExecutor::new(2).unwrap();
        let units: Vec<_> = (0..3u32)
            .map(|i| async move {
                if i == 1 {
                    panic!("unit exploded");
                }
                Ok(i)
            })
            .collect();

        let results = executor.run(units).await;
        assert_eq!(results[0], Ok(0));
        assert!(matches!(results[1], Err(LedgerError::Aborted(_))));
        assert_eq!(results[2], Ok(2));
    }
}

//! Supervised Periodic Tasks
//!
//! Every background loop in the service (window recompute, event emission,
//! generator statistics) runs as a [`PeriodicTask`]: a tokio task ticking on a
//! fixed period, stopped through an explicit [`CancellationToken`].
//!
//! ## Guarantees
//! - **Catch-log-continue**: an iteration returning `Err` or panicking is logged
//!   and the loop waits for its next tick. Nothing escapes the task.
//! - **Cooperative cancellation**: cancellation is observed only between
//!   iterations; a running iteration always completes.
//! - **Bounded shutdown**: [`PeriodicTask::shutdown`] waits for the loop to exit
//!   for at most a grace period, then aborts it.

use crate::error::ServiceError;

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a running periodic loop.
pub struct PeriodicTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns `body` on the current tokio runtime, first after `initial_delay`
    /// and then every `period`.
    ///
    /// Ticks missed while an iteration overran are fired back to back, so the
    /// long-run rate stays at one iteration per `period`.
    ///
    /// # Errors
    /// `ServiceError::Scheduling` when called outside a tokio runtime or with a
    /// zero period.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        initial_delay: Duration,
        mut body: F,
    ) -> Result<Self, ServiceError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        if period.is_zero() {
            return Err(ServiceError::Scheduling {
                task: name,
                reason: "period must be greater than zero".to_string(),
            });
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| ServiceError::Scheduling {
                task: name,
                reason: e.to_string(),
            })?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + initial_delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                match AssertUnwindSafe(async { body().await }).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!("Periodic task '{}' iteration failed: {:#}", name, e);
                    }
                    Err(_) => {
                        tracing::error!("Periodic task '{}' iteration panicked", name);
                    }
                }
            }

            tracing::debug!("Periodic task '{}' exited", name);
        });

        tracing::debug!(
            "Scheduled periodic task '{}' every {:?} (initial delay {:?})",
            name,
            period,
            initial_delay
        );

        Ok(Self {
            name,
            cancel,
            handle,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signals the loop to exit at its next wake-up. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the loop and waits up to `grace` for it to exit, aborting it
    /// afterwards.
    ///
    /// Returns `true` when the loop exited on its own.
    pub async fn shutdown(self, grace: Duration) -> bool {
        self.cancel.cancel();

        let mut handle = self.handle;
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(_) => {
                tracing::debug!("Periodic task '{}' stopped", self.name);
                true
            }
            Err(_) => {
                tracing::warn!(
                    "Periodic task '{}' did not stop within {:?}, aborting",
                    self.name,
                    grace
                );
                handle.abort();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_fixed_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let task = PeriodicTask::spawn("ticker", Duration::from_secs(1), Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(()))
        })
        .unwrap();

        // Ticks at 0s, 1s, 2s
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert_eq!(task.name(), "ticker");
        assert!(!task.is_finished());

        assert!(task.shutdown(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_postpones_first_tick() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let task = PeriodicTask::spawn(
            "delayed",
            Duration::from_secs(10),
            Duration::from_secs(10),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                futures::future::ready(Ok(()))
            },
        )
        .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_and_panicking_iterations_do_not_stop_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let task = PeriodicTask::spawn("flaky", Duration::from_secs(1), Duration::ZERO, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Err(anyhow::anyhow!("first iteration fails")),
                    1 => panic!("second iteration panics"),
                    _ => Ok(()),
                }
            }
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 4);
        assert!(!task.is_finished());

        assert!(task.shutdown(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticking() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let task = PeriodicTask::spawn("stoppable", Duration::from_secs(1), Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(()))
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(task.shutdown(Duration::from_secs(1)).await);

        let after_stop = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_after_grace_period() {
        let task = PeriodicTask::spawn("stuck", Duration::from_secs(1), Duration::ZERO, || async {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(())
        })
        .unwrap();

        // Let the first iteration start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let graceful = task.shutdown(Duration::from_secs(2)).await;
        assert!(!graceful, "A stuck iteration should be aborted");
    }

    #[test]
    fn test_spawn_outside_runtime_is_a_scheduling_error() {
        let result = PeriodicTask::spawn("orphan", Duration::from_secs(1), Duration::ZERO, || async {
            Ok(())
        });

        match result {
            Err(ServiceError::Scheduling { task, .. }) => assert_eq!(task, "orphan"),
            _ => panic!("Expected a scheduling error"),
        }
    }

    #[tokio::test]
    async fn test_zero_period_is_rejected() {
        let result = PeriodicTask::spawn("busy", Duration::ZERO, Duration::ZERO, || async { Ok(()) });
        assert!(matches!(result, Err(ServiceError::Scheduling { .. })));
    }
}

use crate::error::{OraError, OraResult};
use crate::search::IndexBuilder;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Rebuilds the search index once right away and then on a fixed period.
///
/// The scheduler owns the [`IndexBuilder`] (and with it the memo) for as long
/// as it runs. A failed build is logged and the next one still happens on
/// schedule. Builds are never interrupted half-way: [`RebuildScheduler::shutdown`]
/// waits for a running build to finish.
pub struct RebuildScheduler {
    builder: Option<IndexBuilder>,
    period: Duration,
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    cycles_tx: watch::Sender<u64>,
}

impl RebuildScheduler {
    pub fn new(builder: IndexBuilder, period: Duration) -> Self {
        let (cycles_tx, _) = watch::channel(0);
        RebuildScheduler {
            builder: Some(builder),
            period,
            task: None,
            shutdown_tx: None,
            cycles_tx,
        }
    }

    /// Number of finished build cycles, successful or not.
    pub fn cycles(&self) -> watch::Receiver<u64> {
        self.cycles_tx.subscribe()
    }

    /// Spawns the rebuild loop on the current tokio runtime.
    pub fn run(&mut self) -> OraResult<()> {
        let mut builder = self
            .builder
            .take()
            .ok_or_else(|| OraError::Other("rebuild scheduler is already running".to_string()))?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let cycles_tx = self.cycles_tx.clone();
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // NOTE: also fires when the sender is dropped
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        if let Err(e) = builder.build_index().await {
                            error!(error = %e, "could not build index");
                        }
                        cycles_tx.send_modify(|cycles| *cycles += 1);
                    }
                }
            }

            info!("index rebuild scheduler stopped");
        });

        self.task = Some(task);
        self.shutdown_tx = Some(shutdown_tx);

        Ok(())
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(&mut self) -> OraResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| OraError::Other(format!("rebuild scheduler task failed: {e}")))?;
        }

        Ok(())
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::clients::discord_client::ChatClient;
use crate::clients::feed_client::FeedSource;
use crate::error::CycleError;
use crate::models::changeset::Changeset;
use crate::service::change_message_service::ChangeMessageService;
use crate::service::diff_service::DiffService;
use crate::service::snapshot_store::SnapshotStore;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Unchanged,
    Announced(Changeset),
}

/// One full cycle: fetch, diff against the stored baseline and, when
/// something changed, announce it and store the new baseline.
///
/// The baseline is only replaced after the announcement went out.
pub async fn run_check<F, S, C>(
    feed: &F,
    store: &S,
    chat: &C,
    formatter: &ChangeMessageService,
) -> Result<CheckOutcome, CycleError>
where
    F: FeedSource + ?Sized,
    S: SnapshotStore + ?Sized,
    C: ChatClient + ?Sized,
{
    let latest = feed.fetch().await?;
    let baseline = store.load().await?;
    let changeset = DiffService::diff(&baseline, &latest);

    let Some(message) = formatter.build_message(&changeset) else {
        return Ok(CheckOutcome::Unchanged);
    };
    chat.send_message(&message).await?;
    store.save(&latest).await?;
    Ok(CheckOutcome::Announced(changeset))
}

/// Same as [`run_check`] up to the diff; nothing is sent or stored.
pub async fn preview_check<F, S>(feed: &F, store: &S) -> Result<Changeset, CycleError>
where
    F: FeedSource + ?Sized,
    S: SnapshotStore + ?Sized,
{
    let latest = feed.fetch().await?;
    let baseline = store.load().await?;
    Ok(DiffService::diff(&baseline, &latest))
}

pub fn failure_message(err: &CycleError) -> String {
    format!("Error during calendar check ({}): {}", err.stage(), err)
}

/// Best effort; a failing report is only logged.
pub async fn report_failure<C: ChatClient + ?Sized>(chat: &C, err: &CycleError) {
    if let Err(send_err) = chat.send_message(&failure_message(err)).await {
        tracing::warn!("Could not report {} failure to channel: {}", err.stage(), send_err);
    }
}

/// Runs a cycle, logs its outcome and reports failures to the channel.
pub async fn check_tick<F, S, C>(
    feed: &F,
    store: &S,
    chat: &C,
    formatter: &ChangeMessageService,
) -> Result<CheckOutcome, CycleError>
where
    F: FeedSource + ?Sized,
    S: SnapshotStore + ?Sized,
    C: ChatClient + ?Sized,
{
    let result = run_check(feed, store, chat, formatter).await;
    match &result {
        Ok(CheckOutcome::Unchanged) => tracing::info!("Calendar unchanged"),
        Ok(CheckOutcome::Announced(changes)) => tracing::info!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            modified = changes.modified.len(),
            "Announced calendar changes"
        ),
        Err(err) => {
            match err {
                CycleError::Fetch(e) => tracing::error!("Calendar fetch failed: {}", e),
                CycleError::Persist(e) => tracing::error!("Snapshot storage failed: {}", e),
                CycleError::Delivery(e) => tracing::error!("Announcement delivery failed: {}", e),
            }
            report_failure(chat, err).await;
        }
    }
    result
}

/// Recurring check job. Cycles never overlap: the interval is measured from
/// the end of one cycle to the start of the next.
pub struct Scheduler {
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn SnapshotStore>,
    chat: Arc<dyn ChatClient>,
    formatter: ChangeMessageService,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        store: Arc<dyn SnapshotStore>,
        chat: Arc<dyn ChatClient>,
        formatter: ChangeMessageService,
        interval: Duration,
    ) -> Self {
        Self {
            feed,
            store,
            chat,
            formatter,
            interval,
        }
    }

    /// Loops until `shutdown` turns true (or its sender is dropped) and
    /// returns the number of completed cycles. A running cycle is always
    /// finished before the signal is honoured.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        tracing::info!("Calendar check started (interval: {:?})", self.interval);
        let mut cycles = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            let _ = check_tick(
                self.feed.as_ref(),
                self.store.as_ref(),
                self.chat.as_ref(),
                &self.formatter,
            )
            .await;
            cycles += 1;

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = async {
                    let _ = shutdown.wait_for(|stop| *stop).await;
                } => break,
            }
        }
        tracing::info!("Calendar check stopped after {} cycle(s)", cycles);
        cycles
    }
}

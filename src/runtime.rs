use std::sync::Arc;

use tokio::sync::watch;

use crate::clients::discord_client::{ChatClient, DiscordClient};
use crate::clients::feed_client::{FeedSource, WebcalFeed};
use crate::config::BotConfig;
use crate::error::CycleError;
use crate::service::change_message_service::ChangeMessageService;
use crate::service::snapshot_store::{JsonFileStore, SnapshotStore};
use crate::tasks::check_loop::{self, CheckOutcome, Scheduler};
use crate::tasks::task_runner::{TaskRunner, join_all};

struct Components {
    feed: Arc<WebcalFeed>,
    store: Arc<JsonFileStore>,
    chat: Arc<DiscordClient>,
    formatter: ChangeMessageService,
}

fn build(config: &BotConfig) -> Components {
    Components {
        feed: Arc::new(WebcalFeed::new(&config.webcal_url)),
        store: Arc::new(JsonFileStore::new(&config.data_file)),
        chat: Arc::new(DiscordClient::new(
            config.discord_token.clone(),
            config.channel_id,
        )),
        formatter: ChangeMessageService::new(config.announcement_header.clone()),
    }
}

/// Connects to Discord and checks the feed every interval until Ctrl+C.
pub async fn run_bot(config: BotConfig) -> Result<(), CycleError> {
    let components = build(&config);
    components.chat.connect().await?;
    tracing::info!(
        feed = components.feed.url(),
        store = %components.store.path().display(),
        "Watching calendar feed"
    );

    let feed: Arc<dyn FeedSource> = components.feed.clone();
    let store: Arc<dyn SnapshotStore> = components.store.clone();
    let chat: Arc<dyn ChatClient> = components.chat.clone();
    let scheduler = Scheduler::new(feed, store, chat, components.formatter, config.check_interval);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut task_runner = TaskRunner::new();
    task_runner.add_task(async move {
        scheduler.run(shutdown_rx).await;
    });
    let handles = task_runner.start_all();

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, finishing current check");
    let _ = shutdown_tx.send(true);
    join_all(handles).await;

    components.chat.disconnect().await;
    Ok(())
}

/// Connects, runs one reported check and disconnects again.
pub async fn run_once(config: BotConfig) -> Result<CheckOutcome, CycleError> {
    let components = build(&config);
    components.chat.connect().await?;
    let result = check_loop::check_tick(
        components.feed.as_ref(),
        components.store.as_ref(),
        components.chat.as_ref(),
        &components.formatter,
    )
    .await;
    components.chat.disconnect().await;
    result
}

/// Formats the pending changes without touching Discord or the stored snapshot.
pub async fn run_preview(config: BotConfig) -> Result<Option<String>, CycleError> {
    let components = build(&config);
    let changeset =
        check_loop::preview_check(components.feed.as_ref(), components.store.as_ref()).await?;
    Ok(components.formatter.build_message(&changeset))
}

//! Stepwise server: application entry point.

mod config;

use anyhow::Context;
use clap::Parser;
use stepwise_api::{
    ChatNotifier, DisabledNotifier, HttpChatNotifier, ResolverConfig, Resolvers, Stores,
};
use stepwise_db::DbManager;
use stepwise_db::repository::{
    SurrealLessonRepository, SurrealSubmissionRepository, SurrealUserLessonRepository,
    SurrealUserRepository,
};
use surrealdb::engine::remote::ws::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("stepwise=info".parse()?))
        .json()
        .init();

    let args = Args::parse();
    info!("Starting Stepwise server...");

    let db = DbManager::connect(&args.db_config())
        .await
        .context("failed to connect to SurrealDB")?;

    let resolver_config = args.resolver_config();
    let client = db.client().clone();
    let users = match resolver_config.auth.pepper.clone() {
        Some(pepper) => SurrealUserRepository::with_pepper(client.clone(), pepper),
        None => SurrealUserRepository::new(client.clone()),
    };
    let stores = Stores {
        users,
        lessons: SurrealLessonRepository::new(client.clone()),
        submissions: SurrealSubmissionRepository::new(client.clone()),
        progress: SurrealUserLessonRepository::new(client),
    };

    let notify = args.notify_config();
    if notify.base_url.is_some() {
        let notifier =
            HttpChatNotifier::new(&notify).context("invalid chat notification settings")?;
        serve(stores, notifier, resolver_config).await
    } else {
        info!("chat notifications disabled");
        serve(stores, DisabledNotifier, resolver_config).await
    }
}

type SurrealStores = Stores<
    SurrealUserRepository<Client>,
    SurrealLessonRepository<Client>,
    SurrealSubmissionRepository<Client>,
    SurrealUserLessonRepository<Client>,
>;

/// Host the resolvers until interrupted, then let pending notifications
/// finish.
async fn serve<N: ChatNotifier + 'static>(
    stores: SurrealStores,
    notifier: N,
    config: ResolverConfig,
) -> anyhow::Result<()> {
    let resolvers = Resolvers::new(stores, notifier, config);
    let lessons = resolvers.lessons().await?;
    info!(lessons = lessons.len(), "Stepwise resolvers ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutting down, draining notifications");
    resolvers.drain_notifications().await;
    info!("Stepwise server stopped.");
    Ok(())
}

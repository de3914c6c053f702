//! `subscription-auth` - authorize subscription purchases against the
//! remote authorization service.

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::sync::watch;

use subscription_auth::adapters::{
    FileAuthStateStore, FilePurchaseLedger, HttpAuthorizationClient, HttpAuthorizationConfig,
    SystemClock,
};
use subscription_auth::application::{
    drive_to_quiescence, EffectRunner, StoreConfig, SubscriptionEnvironment, SubscriptionStore,
};
use subscription_auth::config::AppConfig;
use subscription_auth::domain::subscription::{
    LocalDataUpdateKind, SubscriptionAction, SubscriptionState,
};
use subscription_auth::ports::AuthStateStore;

/// Reconcile and authorize subscription purchases
#[derive(Parser)]
#[command(name = "subscription-auth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh and authorize on an interval until interrupted (default)
    Run,

    /// Refresh once, authorize every eligible purchase, then exit
    Once,

    /// Print record counts from the stored authorization state
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    subscription_auth::logging::init(&config.runtime)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Status => status(&config).await,
        Commands::Once => {
            config.validate()?;
            once(&config).await
        }
        Commands::Run => {
            config.validate()?;
            run(&config).await
        }
    }
}

fn environment(config: &AppConfig) -> SubscriptionEnvironment {
    let mut http = HttpAuthorizationConfig::new(config.authorization.base_url.clone())
        .with_timeout(config.authorization.request_timeout());
    if let Some(key) = &config.authorization.api_key {
        http = http.with_api_key(SecretString::clone(key));
    }

    SubscriptionEnvironment::new(
        Arc::new(FileAuthStateStore::new(&config.storage.state_path)),
        Arc::new(HttpAuthorizationClient::new(http)),
        Arc::new(FilePurchaseLedger::new(&config.storage.purchases_path)),
        Arc::new(SystemClock),
    )
}

async fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let runner = EffectRunner::new(environment(config));
    let store_config = StoreConfig::default().with_channel_capacity(config.runtime.channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (handle, task) = SubscriptionStore::spawn(runner, store_config, shutdown_rx);

    tracing::info!(
        base_url = %config.authorization.base_url,
        refresh_secs = config.runtime.refresh_interval_secs,
        "Subscription authorization service running"
    );

    let mut interval = tokio::time::interval(config.runtime.refresh_interval());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
            _ = interval.tick() => {
                handle
                    .send(SubscriptionAction::LocalDataUpdate(LocalDataUpdateKind::PurchasesRefreshed))
                    .await?;
                handle
                    .send(SubscriptionAction::RequestAuthorizationForPurchases)
                    .await?;
            }
        }
    }

    shutdown_tx.send(true)?;
    let final_state = task.await?;
    log_summary(&final_state);
    Ok(())
}

async fn once(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let runner = EffectRunner::new(environment(config));
    let budget = config.runtime.max_drive_steps;
    let mut state = SubscriptionState::new();

    drive_to_quiescence(
        &mut state,
        SubscriptionAction::LocalDataUpdate(LocalDataUpdateKind::PurchasesRefreshed).into(),
        &runner,
        budget,
    )
    .await?;

    // Each drive admits at most one transaction.
    while state
        .purchases_auth_state()
        .and_then(|map| map.first_eligible(state.transactions_pending_auth_request()))
        .is_some()
    {
        drive_to_quiescence(
            &mut state,
            SubscriptionAction::RequestAuthorizationForPurchases.into(),
            &runner,
            budget,
        )
        .await?;
    }

    log_summary(&state);
    Ok(())
}

async fn status(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let store = FileAuthStateStore::new(&config.storage.state_path);
    let map = store.load().await?;
    println!("{}", serde_json::to_string_pretty(&map.summary())?);
    Ok(())
}

fn log_summary(state: &SubscriptionState) {
    if let Some(map) = state.purchases_auth_state() {
        let summary = map.summary();
        tracing::info!(
            authorized = summary.authorized,
            not_requested = summary.not_requested,
            pending = summary.pending,
            retryable = summary.retryable,
            rejected = summary.rejected,
            "Authorization state"
        );
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use prtrigger::config::AppConfig;
use prtrigger::github::api::{GithubPermissionOracle, GithubReactor};
use prtrigger::trigger::{Dispatcher, HttpBuildScheduler};
use prtrigger::{
    create_app, create_trigger_process, ServerState, TriggerContext, TriggerProcess,
    WebhookSecret,
};

#[derive(clap::Parser)]
struct Opts {
    /// Secret used to authenticate webhooks.
    #[arg(long, env = "WEBHOOK_SECRET")]
    webhook_secret: String,

    /// Path to the TOML file with the job registry and the build scheduler.
    #[arg(long, env = "PRTRIGGER_CONFIG")]
    config: PathBuf,

    /// Address of the webhook server.
    #[arg(long, env = "PRTRIGGER_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

async fn server(state: ServerState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn try_main(opts: Opts) -> anyhow::Result<()> {
    let config = AppConfig::load(&opts.config).context("Cannot load configuration")?;
    let registry = config
        .build_registry()
        .context("Cannot load job registry")?;
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(GithubPermissionOracle::new(config.permission_timeout())),
    )
    .with_authorization_concurrency(config.dispatch.authorization_concurrency);
    let ctx = TriggerContext::new(
        dispatcher,
        Arc::new(HttpBuildScheduler::new(config.scheduler.url.clone())),
        Arc::new(GithubReactor),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;

    let TriggerProcess {
        event_tx,
        trigger_process,
    } = create_trigger_process(Arc::new(ctx));
    let state = ServerState::new(event_tx, WebhookSecret::new(opts.webhook_secret));
    let server_process = server(state, opts.listen);

    runtime.block_on(async move {
        tokio::select! {
            () = trigger_process => {
                tracing::warn!("Trigger process has ended");
                Ok(())
            },
            res = server_process => {
                tracing::warn!("Server has ended: {res:?}");
                res
            }
        }
    })?;

    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prtrigger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::parse();
    if let Err(error) = try_main(opts) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::trigger::adapters::after_trigger;
use crate::trigger::{DispatchError, ElevatedContext, PullRequestEvent, TriggerContext};
use crate::utils::logging::LogError;

pub type TriggerEventSender = mpsc::Sender<PullRequestEvent>;

pub struct TriggerProcess {
    pub event_tx: TriggerEventSender,
    pub trigger_process: Pin<Box<dyn Future<Output = ()> + Send>>,
}

/// Creates a future with a process that continuously receives pull request events and
/// schedules the builds they trigger.
///
/// Every event is handled in its own task, so a slow delivery does not hold up the others.
/// The process ends once all senders are dropped and the pending deliveries are handled.
pub fn create_trigger_process(ctx: Arc<TriggerContext>) -> TriggerProcess {
    let (event_tx, event_rx) = mpsc::channel::<PullRequestEvent>(1024);
    TriggerProcess {
        event_tx,
        trigger_process: Box::pin(consume_events(ctx, event_rx)),
    }
}

async fn consume_events(ctx: Arc<TriggerContext>, mut event_rx: mpsc::Receiver<PullRequestEvent>) {
    let mut deliveries = JoinSet::new();
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                let span = tracing::info_span!(
                    "Delivery",
                    kind = %event.kind(),
                    pr = format!("{}#{}", event.repository_url, event.pr_number),
                    actor = event.actor
                );
                let ctx = ctx.clone();
                deliveries.spawn(async move {
                    if let Err(error) = handle_event(ctx, event).instrument(span.clone()).await {
                        span.log_error(error);
                    }
                });
            }
            Some(result) = deliveries.join_next(), if !deliveries.is_empty() => {
                if let Err(error) = result {
                    tracing::error!("Delivery task has failed: {error:?}");
                }
            }
        }
    }

    while let Some(result) = deliveries.join_next().await {
        if let Err(error) = result {
            tracing::error!("Delivery task has failed: {error:?}");
        }
    }
}

/// Dispatches a single event and schedules the resulting builds.
///
/// A build that cannot be scheduled does not prevent the remaining builds from being scheduled.
pub async fn handle_event(ctx: Arc<TriggerContext>, event: PullRequestEvent) -> anyhow::Result<()> {
    let elevated = ElevatedContext::new(format!(
        "{} event on {}#{}",
        event.kind(),
        event.repository_url,
        event.pr_number
    ));

    let report = match ctx.dispatcher.dispatch(&elevated, &event).await {
        Ok(report) => report,
        Err(error @ DispatchError::MalformedRepositoryUrl(_)) => {
            tracing::warn!("{error}");
            return Ok(());
        }
        Err(error @ DispatchError::IrrelevantAction { .. }) => {
            tracing::trace!("{error}");
            return Ok(());
        }
    };

    let mut failed = vec![];
    for decision in report.decisions {
        match ctx
            .scheduler
            .schedule(&elevated, &decision.job, &decision.cause)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    "Triggered build for {} due to {}",
                    decision.job.id(),
                    decision.cause.short_description()
                );
                after_trigger(ctx.reactor.as_ref(), &elevated, &event, &decision).await;
            }
            Err(error) => {
                tracing::warn!("Cannot schedule build of {}: {error:?}", decision.job.id());
                failed.push(decision.job.id().to_string());
            }
        }
    }

    if !failed.is_empty() {
        return Err(anyhow!("Cannot schedule builds of {}", failed.join(", ")));
    }
    Ok(())
}

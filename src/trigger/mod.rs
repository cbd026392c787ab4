//! Decides which jobs are built because of pull request activity and schedules those builds.
//!
//! A webhook payload is turned into a [`PullRequestEvent`] by one of the [`adapters`], the
//! [`Dispatcher`] finds the jobs tracking the pull request and checks their trigger rules, and
//! the [`process`] schedules the resulting builds.
pub mod adapters;
pub mod cause;
mod context;
pub mod dispatch;
pub mod event;
pub mod matcher;
pub mod process;
pub mod registry;
pub mod rule;
pub mod scheduler;

pub use context::{ElevatedContext, TriggerContext};
pub use dispatch::{DispatchError, DispatchReport, Dispatcher, SkipReason, TriggerDecision};
pub use event::{EventKind, PullRequestEvent};
pub use process::{create_trigger_process, TriggerEventSender, TriggerProcess};
pub use registry::{ConfigJobRegistry, JobHandle, JobRegistry, RepositorySource, SourceOwner};
pub use scheduler::{BuildScheduler, HttpBuildScheduler};

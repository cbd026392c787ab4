//! This is the library of the pull request trigger bot.
//!
//! The bot receives GitHub webhooks about pull request activity (comments, labels, reviews and
//! edits) and schedules builds of the jobs that track the pull request, provided that the job
//! has a matching trigger rule and the actor has the required repository permission.
pub mod config;
pub mod github;
pub mod permissions;
pub mod trigger;
pub mod utils;

pub use github::server::{create_app, ServerState};
pub use github::WebhookSecret;
pub use trigger::{create_trigger_process, TriggerContext, TriggerProcess};

#[cfg(test)]
mod tests;

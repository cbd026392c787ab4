use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::trigger::adapters::CommentReactor;
use crate::trigger::dispatch::Dispatcher;
use crate::trigger::scheduler::BuildScheduler;

/// Collaborators shared by all deliveries handled by the trigger process.
pub struct TriggerContext {
    pub dispatcher: Dispatcher,
    pub scheduler: Arc<dyn BuildScheduler>,
    pub reactor: Arc<dyn CommentReactor>,
}

impl TriggerContext {
    pub fn new(
        dispatcher: Dispatcher,
        scheduler: Arc<dyn BuildScheduler>,
        reactor: Arc<dyn CommentReactor>,
    ) -> Self {
        Self {
            dispatcher,
            scheduler,
            reactor,
        }
    }
}

/// Grants access to the job registry and to the credentials of repository sources.
///
/// A context is created for a single webhook delivery and dropped once the delivery has been
/// handled. It cannot be cloned, so it cannot outlive the delivery that created it.
#[derive(Debug)]
pub struct ElevatedContext {
    purpose: String,
}

impl ElevatedContext {
    pub(crate) fn new(purpose: impl Into<String>) -> Self {
        let purpose = purpose.into();
        tracing::trace!("Acquired elevated context for {purpose}");
        Self { purpose }
    }
}

impl Drop for ElevatedContext {
    fn drop(&mut self) {
        tracing::trace!("Released elevated context for {}", self.purpose);
    }
}

impl Display for ElevatedContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.purpose)
    }
}

mod github;
mod registry;

pub use github::{MockOracle, MockReactor, MockScheduler};
pub use registry::{
    comment_trigger, job, label_trigger, owner, reacting_comment_trigger, review_trigger, source,
    update_trigger, SourceBuilder,
};

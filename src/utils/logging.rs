use anyhow::Error;
use tracing::span::Span;

/// Reports an error that ended the handling of a delivery.
pub trait LogError {
    fn log_error(&self, error: Error);
}

impl LogError for Span {
    /// Logs the error inside the span, so that it carries the delivery it belongs to.
    fn log_error(&self, error: Error) {
        self.in_scope(|| {
            tracing::error!("Delivery handling failed: {error:?}");
        });
    }
}

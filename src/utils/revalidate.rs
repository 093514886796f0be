// src/utils/revalidate.rs

/// Invalidates cached views after a write.
///
/// Rendering and caching live outside this service; the default
/// implementation only records the request.
pub trait PathRevalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Logs each invalidated path at `info`.
#[derive(Debug, Default, Clone)]
pub struct TracingRevalidator;

impl PathRevalidator for TracingRevalidator {
    fn revalidate(&self, path: &str) {
        tracing::info!(path, "Revalidating view path");
    }
}

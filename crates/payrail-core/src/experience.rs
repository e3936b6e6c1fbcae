//! # Checkout Experience Cache
//!
//! Holds the per-adapter checkout experience configuration. The artifact is
//! created on first use and then reused for the adapter's lifetime.
//!
//! Creation runs under exclusive access: concurrent first callers queue
//! behind the one running creation call and then observe its result. A failed
//! creation stores nothing, so the next caller in line tries again.

use crate::error::{GatewayError, PaymentError, PaymentResult};
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::debug;

/// Create-once cache for a gateway experience artifact
#[derive(Debug)]
pub struct ExperienceCache<T> {
    cell: OnceCell<T>,
}

impl<T> ExperienceCache<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the cached artifact, running `create` if none exists yet.
    ///
    /// At most one `create` future is polled at a time per cache.
    pub async fn get_or_create<F, Fut>(&self, create: F) -> PaymentResult<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.cell
            .get_or_try_init(|| async {
                debug!("Creating checkout experience");
                create().await
            })
            .await
            .map_err(PaymentError::ExperienceCreationFailed)
    }

    /// The cached artifact, if created
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Default for ExperienceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

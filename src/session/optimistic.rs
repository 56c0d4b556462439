use std::future::Future;

use tracing::warn;

use crate::error::AppError;

/// A local change that can be undone.
pub trait Reversible<T: ?Sized> {
    fn apply(&self, target: &mut T);
    fn revert(&self, target: &mut T);
}

/// Applies `change` locally before `write` resolves, and reverts it if the
/// write fails.
pub async fn apply_optimistically<T, C, F>(target: &mut T, change: &C, write: F) -> Result<(), AppError>
where
    T: ?Sized,
    C: Reversible<T>,
    F: Future<Output = Result<(), AppError>>,
{
    change.apply(target);
    match write.await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("optimistic change rolled back: {}", e);
            change.revert(target);
            Err(e)
        }
    }
}

use std::future::Future;

use crate::shared::error::AppError;

/// Runs one optimistic mutation: `apply` makes the change visible
/// immediately, `commit` performs the remote write, and `rollback` restores
/// the prior visible state iff the commit fails. The commit error is
/// propagated untouched. Every remote write issued by the read path goes
/// through here.
pub async fn mutate<T, Apply, Commit, Fut, Rollback>(
    apply: Apply,
    commit: Commit,
    rollback: Rollback,
) -> Result<T, AppError>
where
    Apply: FnOnce(),
    Commit: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    Rollback: FnOnce(),
{
    apply();
    match commit().await {
        Ok(value) => Ok(value),
        Err(err) => {
            rollback();
            Err(err)
        }
    }
}

//! Referential guard: a document may not be removed while others point at it.
//!
//! The check is advisory. Nothing locks the store between the check and the
//! delete, so a dependent inserted in between is not seen.

use std::future::Future;

use crate::store::EntityId;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict<D> {
    pub blocked: bool,
    pub dependents: Vec<D>,
}

impl<D> Verdict<D> {
    pub fn from_dependents(dependents: Vec<D>) -> Self {
        Self {
            blocked: !dependents.is_empty(),
            dependents,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// Run `dependents_query` for `target` and decide whether deletion may proceed.
pub async fn can_delete<D, E, F, Fut>(
    target: &EntityId,
    dependents_query: F,
) -> Result<Verdict<D>, E>
where
    F: FnOnce(&EntityId) -> Fut,
    Fut: Future<Output = Result<Vec<D>, E>>,
{
    let dependents = dependents_query(target).await?;
    let verdict = Verdict::from_dependents(dependents);

    tracing::debug!(
        target_id = %target,
        blocked = verdict.blocked,
        dependents = verdict.dependents.len(),
        "referential guard evaluated"
    );

    Ok(verdict)
}

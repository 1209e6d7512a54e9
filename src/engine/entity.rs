//! The contract a domain type must satisfy to run under the engine.

use thiserror::Error;

use crate::core::{CallArgs, MethodName, Value};

use super::intercept::{CallContext, Interrupt};

/// State snapshot rejected by [`Entity::restore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid state for {entity_type}: {reason}")]
pub struct StateError {
    pub entity_type: &'static str,
    pub reason: String,
}

impl StateError {
    pub fn new(entity_type: &'static str, reason: impl Into<String>) -> Self {
        Self {
            entity_type,
            reason: reason.into(),
        }
    }
}

/// A domain entity: stable identity, snapshot/restore state, dispatchable
/// methods.
///
/// Method bodies (and the constructor) route every external interaction
/// through the [`CallContext`] they receive, and must be deterministic
/// modulo those calls: given the same restored state and the same replies,
/// a re-executed body issues the same requests in the same order and
/// returns the same value. Reading and writing own state is direct and
/// never suspends.
pub trait Entity: Sized {
    /// Type name used in method references and create requests.
    fn type_name() -> &'static str;

    /// Run the constructor. May suspend on nested creations, entity calls,
    /// or service calls, exactly like a method body.
    fn construct(ctx: &mut CallContext, args: &CallArgs) -> Result<Self, Interrupt>;

    /// Capture the entity's mutable state as an opaque value, sufficient
    /// to fully restore it. Other entities must appear in the snapshot as
    /// handles, never as embedded state.
    fn snapshot(&self) -> Value;

    /// Rebuild an entity from a snapshot previously produced by
    /// [`Entity::snapshot`].
    fn restore(state: &Value) -> Result<Self, StateError>;

    /// Invoke `method` with `args`. Implementations match on the method
    /// name and should fall back to [`Interrupt::unknown_method`] for
    /// names they do not declare.
    fn dispatch(
        &mut self,
        ctx: &mut CallContext,
        method: &MethodName,
        args: &CallArgs,
    ) -> Result<Value, Interrupt>;
}

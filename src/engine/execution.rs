//! Public execution surface.

use crate::core::{EntityRef, Message};

use super::entity::Entity;
use super::replay;

/// Drives one entity's pending work from an ordered message log.
///
/// A `complete` call is strictly sequential and assumes exclusive access
/// to the subject for its duration; `&mut self` enforces that in-process,
/// and serializing calls across processes is the caller's job.
#[derive(Debug)]
pub struct Execution<E: Entity> {
    subject: Option<E>,
}

impl<E: Entity> Execution<E> {
    pub fn new() -> Self {
        Self { subject: None }
    }

    /// Handle for "the entity this execution belongs to", safe to embed in
    /// input-message arguments before `complete` runs.
    ///
    /// The handle stays symbolic for the whole conversation: the engine
    /// matches it by its reference-like equality and passes it through
    /// unchanged in emitted messages. Mapping it to a concrete entity id
    /// is the host's job; no message kind carries the subject's own
    /// identity, so the engine never learns it.
    pub fn subject_handle(&self) -> EntityRef {
        EntityRef::Subject
    }

    /// Consume an ordered input sequence; return the ordered output
    /// sequence.
    ///
    /// Never fails past the boundary: engine faults and domain failures
    /// are reified as a terminal `ErrorRaised` message, so the caller's
    /// log remains the sole source of truth. The output is empty iff no
    /// progress was made.
    pub fn complete(&mut self, inputs: &[Message]) -> Vec<Message> {
        tracing::debug!(
            entity_type = E::type_name(),
            inputs = inputs.len(),
            "completing execution"
        );
        replay::run(&mut self.subject, inputs)
    }

    /// The concrete subject, once a snapshot or a completed construction
    /// has materialized it. After a suspension this reflects the state
    /// reached at the suspension point.
    pub fn subject(&self) -> Option<&E> {
        self.subject.as_ref()
    }
}

impl<E: Entity> Default for Execution<E> {
    fn default() -> Self {
        Self::new()
    }
}

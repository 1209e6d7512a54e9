#![forbid(unsafe_code)]

pub mod core;
pub mod engine;

// Re-export the public surface at the crate root for convenience
pub use crate::core::{
    CallArgs, CreateEntityRequestReceived, CreateEntityRequestSent, CreateEntityResponseReceived,
    CreateEntityResponseSent, DomainError, EntityId, EntityMethodRequestReceived,
    EntityMethodRequestSent, EntityMethodResponseReceived, EntityMethodResponseSent, EntityRef,
    EntityStateChanged, ErrorCode, ErrorPayload, ErrorRaised, Fault, InvalidName, Message,
    MethodName, MethodRef, Offset, ServiceRequestSent, ServiceResponseReceived, TypeName, Value,
};
pub use engine::{CallContext, Entity, Execution, Interrupt, StateError};

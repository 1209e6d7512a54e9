//! Message taxonomy: every record crossing the engine boundary.
//!
//! A closed, serde-tagged set of kinds. The engine consumes and produces
//! only these shapes; callers never pass raw data.

use serde::{Deserialize, Serialize};

use super::error::ErrorPayload;
use super::identity::{EntityRef, MethodName, MethodRef, TypeName};
use super::offset::Offset;
use super::value::{CallArgs, Value};

/// Apply `state` to the subject entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStateChanged {
    pub offset: Offset,
    pub state: Value,
}

/// A top-level call to execute on the subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMethodRequestReceived {
    pub offset: Offset,
    pub method: MethodRef,
    pub args: CallArgs,
}

/// The domain called another entity's method; the engine emits this and
/// suspends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMethodRequestSent {
    pub offset: Offset,
    pub trace_offset: Offset,
    pub receiver: EntityRef,
    pub method: MethodRef,
    pub args: CallArgs,
}

/// The reply to an earlier `EntityMethodRequestSent`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMethodResponseReceived {
    pub offset: Offset,
    pub request_offset: Offset,
    pub response: Value,
}

/// The terminal return value of the top-level method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMethodResponseSent {
    pub offset: Offset,
    pub request_offset: Offset,
    pub response: Value,
}

/// A top-level request to construct the subject itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntityRequestReceived {
    pub offset: Offset,
    pub args: CallArgs,
}

/// The domain constructed an entity; construction is deferred to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntityRequestSent {
    pub offset: Offset,
    pub trace_offset: Offset,
    pub entity_type: TypeName,
    pub args: CallArgs,
}

/// The materialized entity handle returned by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntityResponseReceived {
    pub offset: Offset,
    pub request_offset: Offset,
    pub response: EntityRef,
}

/// Terminal acknowledgement of subject construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntityResponseSent {
    pub offset: Offset,
    pub request_offset: Offset,
}

/// A call to an external service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequestSent {
    pub offset: Offset,
    pub trace_offset: Offset,
    pub service: TypeName,
    pub method: MethodName,
    pub args: CallArgs,
}

/// Reply to a service call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponseReceived {
    pub offset: Offset,
    pub request_offset: Offset,
    pub response: Value,
}

/// A domain method terminated abnormally, or the engine detected a fault.
///
/// With `request_offset` set, also accepted as input: the error-reply to
/// an earlier `*RequestSent` (how the caller injects a timed-out or failed
/// external call back into the conversation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRaised {
    pub offset: Offset,
    pub trace_offset: Option<Offset>,
    pub request_offset: Option<Offset>,
    pub error: ErrorPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Message {
    EntityStateChanged(EntityStateChanged),
    EntityMethodRequestReceived(EntityMethodRequestReceived),
    EntityMethodRequestSent(EntityMethodRequestSent),
    EntityMethodResponseReceived(EntityMethodResponseReceived),
    EntityMethodResponseSent(EntityMethodResponseSent),
    CreateEntityRequestReceived(CreateEntityRequestReceived),
    CreateEntityRequestSent(CreateEntityRequestSent),
    CreateEntityResponseReceived(CreateEntityResponseReceived),
    CreateEntityResponseSent(CreateEntityResponseSent),
    ServiceRequestSent(ServiceRequestSent),
    ServiceResponseReceived(ServiceResponseReceived),
    ErrorRaised(ErrorRaised),
}

impl Message {
    pub fn offset(&self) -> Offset {
        match self {
            Message::EntityStateChanged(m) => m.offset,
            Message::EntityMethodRequestReceived(m) => m.offset,
            Message::EntityMethodRequestSent(m) => m.offset,
            Message::EntityMethodResponseReceived(m) => m.offset,
            Message::EntityMethodResponseSent(m) => m.offset,
            Message::CreateEntityRequestReceived(m) => m.offset,
            Message::CreateEntityRequestSent(m) => m.offset,
            Message::CreateEntityResponseReceived(m) => m.offset,
            Message::CreateEntityResponseSent(m) => m.offset,
            Message::ServiceRequestSent(m) => m.offset,
            Message::ServiceResponseReceived(m) => m.offset,
            Message::ErrorRaised(m) => m.offset,
        }
    }

    /// Offset of the top-level request this message derives from.
    pub fn trace_offset(&self) -> Option<Offset> {
        match self {
            Message::EntityMethodRequestSent(m) => Some(m.trace_offset),
            Message::CreateEntityRequestSent(m) => Some(m.trace_offset),
            Message::ServiceRequestSent(m) => Some(m.trace_offset),
            Message::ErrorRaised(m) => m.trace_offset,
            _ => None,
        }
    }

    /// Offset of the originating request, for responses.
    pub fn request_offset(&self) -> Option<Offset> {
        match self {
            Message::EntityMethodResponseReceived(m) => Some(m.request_offset),
            Message::EntityMethodResponseSent(m) => Some(m.request_offset),
            Message::CreateEntityResponseReceived(m) => Some(m.request_offset),
            Message::CreateEntityResponseSent(m) => Some(m.request_offset),
            Message::ServiceResponseReceived(m) => Some(m.request_offset),
            Message::ErrorRaised(m) => m.request_offset,
            _ => None,
        }
    }

    /// Kind name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::EntityStateChanged(_) => "EntityStateChanged",
            Message::EntityMethodRequestReceived(_) => "EntityMethodRequestReceived",
            Message::EntityMethodRequestSent(_) => "EntityMethodRequestSent",
            Message::EntityMethodResponseReceived(_) => "EntityMethodResponseReceived",
            Message::EntityMethodResponseSent(_) => "EntityMethodResponseSent",
            Message::CreateEntityRequestReceived(_) => "CreateEntityRequestReceived",
            Message::CreateEntityRequestSent(_) => "CreateEntityRequestSent",
            Message::CreateEntityResponseReceived(_) => "CreateEntityResponseReceived",
            Message::CreateEntityResponseSent(_) => "CreateEntityResponseSent",
            Message::ServiceRequestSent(_) => "ServiceRequestSent",
            Message::ServiceResponseReceived(_) => "ServiceResponseReceived",
            Message::ErrorRaised(_) => "ErrorRaised",
        }
    }
}

impl From<EntityStateChanged> for Message {
    fn from(m: EntityStateChanged) -> Message {
        Message::EntityStateChanged(m)
    }
}

impl From<EntityMethodRequestReceived> for Message {
    fn from(m: EntityMethodRequestReceived) -> Message {
        Message::EntityMethodRequestReceived(m)
    }
}

impl From<EntityMethodRequestSent> for Message {
    fn from(m: EntityMethodRequestSent) -> Message {
        Message::EntityMethodRequestSent(m)
    }
}

impl From<EntityMethodResponseReceived> for Message {
    fn from(m: EntityMethodResponseReceived) -> Message {
        Message::EntityMethodResponseReceived(m)
    }
}

impl From<EntityMethodResponseSent> for Message {
    fn from(m: EntityMethodResponseSent) -> Message {
        Message::EntityMethodResponseSent(m)
    }
}

impl From<CreateEntityRequestReceived> for Message {
    fn from(m: CreateEntityRequestReceived) -> Message {
        Message::CreateEntityRequestReceived(m)
    }
}

impl From<CreateEntityRequestSent> for Message {
    fn from(m: CreateEntityRequestSent) -> Message {
        Message::CreateEntityRequestSent(m)
    }
}

impl From<CreateEntityResponseReceived> for Message {
    fn from(m: CreateEntityResponseReceived) -> Message {
        Message::CreateEntityResponseReceived(m)
    }
}

impl From<CreateEntityResponseSent> for Message {
    fn from(m: CreateEntityResponseSent) -> Message {
        Message::CreateEntityResponseSent(m)
    }
}

impl From<ServiceRequestSent> for Message {
    fn from(m: ServiceRequestSent) -> Message {
        Message::ServiceRequestSent(m)
    }
}

impl From<ServiceResponseReceived> for Message {
    fn from(m: ServiceResponseReceived) -> Message {
        Message::ServiceResponseReceived(m)
    }
}

impl From<ErrorRaised> for Message {
    fn from(m: ErrorRaised) -> Message {
        Message::ErrorRaised(m)
    }
}

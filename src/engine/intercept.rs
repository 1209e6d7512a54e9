//! Interaction interceptor: mediates every external action attempted from
//! within a method body.
//!
//! During replay each re-issued interaction is matched, in order, against
//! the logged exchanges and short-circuited with the logged reply. At the
//! first interaction with no logged counterpart the context records it and
//! unwinds the method for suspension.

use std::collections::VecDeque;

use crate::core::{
    CallArgs, DomainError, EntityRef, Fault, MethodName, MethodRef, Offset, TypeName, Value,
};

/// Why a method body stopped before returning.
///
/// Propagated with `?` out of domain code; only the replay driver consumes
/// it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// The body reached an interaction the log does not answer yet.
    Suspended,
    /// The engine detected a log or determinism violation.
    Fault(Fault),
    /// The body (or a callee, via an error-reply) raised a domain error.
    Error(DomainError),
}

impl Interrupt {
    /// Domain error for a method name the entity does not declare.
    pub fn unknown_method(entity_type: &'static str, method: &MethodName) -> Interrupt {
        Interrupt::Fault(Fault::UnknownMethod {
            entity_type: TypeName::parse(entity_type).expect("entity type name"),
            method: method.clone(),
        })
    }
}

impl From<Fault> for Interrupt {
    fn from(fault: Fault) -> Interrupt {
        Interrupt::Fault(fault)
    }
}

impl From<DomainError> for Interrupt {
    fn from(err: DomainError) -> Interrupt {
        Interrupt::Error(err)
    }
}

/// One outgoing interaction, as fingerprinted for replay matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InteractionRequest {
    EntityMethod {
        receiver: EntityRef,
        method: MethodRef,
        args: CallArgs,
    },
    CreateEntity {
        entity_type: TypeName,
        args: CallArgs,
    },
    Service {
        service: TypeName,
        method: MethodName,
        args: CallArgs,
    },
}

impl InteractionRequest {
    pub(crate) fn describe(&self) -> String {
        match self {
            InteractionRequest::EntityMethod {
                receiver, method, ..
            } => format!("method {method} on {receiver}"),
            InteractionRequest::CreateEntity { entity_type, .. } => {
                format!("create {entity_type}")
            }
            InteractionRequest::Service {
                service, method, ..
            } => format!("service {service}.{method}"),
        }
    }
}

/// Reply recorded in the log for an interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    MethodResponse(Value),
    ServiceResponse(Value),
    Created(EntityRef),
    Error(DomainError),
}

impl Reply {
    /// Whether this reply kind can answer the given request kind. Error
    /// replies answer anything.
    pub(crate) fn answers(&self, request: &InteractionRequest) -> bool {
        match self {
            Reply::MethodResponse(_) => {
                matches!(request, InteractionRequest::EntityMethod { .. })
            }
            Reply::ServiceResponse(_) => matches!(request, InteractionRequest::Service { .. }),
            Reply::Created(_) => matches!(request, InteractionRequest::CreateEntity { .. }),
            Reply::Error(_) => true,
        }
    }
}

/// A logged request together with its reply. The reply is absent only for
/// the suspension point at the log tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Exchange {
    pub request_offset: Offset,
    pub request: InteractionRequest,
    pub reply: Option<Reply>,
}

/// Calling context handed to method bodies.
///
/// All cross-entity calls, entity creations, and service calls go through
/// this handle rather than direct invocation; it is the only place a body
/// may suspend.
#[derive(Debug)]
pub struct CallContext {
    exchanges: VecDeque<Exchange>,
    pending: Option<InteractionRequest>,
}

impl CallContext {
    pub(crate) fn new(exchanges: VecDeque<Exchange>) -> Self {
        Self {
            exchanges,
            pending: None,
        }
    }

    /// Call a method on another entity.
    pub fn call(
        &mut self,
        receiver: EntityRef,
        method: MethodRef,
        args: CallArgs,
    ) -> Result<Value, Interrupt> {
        self.perform(InteractionRequest::EntityMethod {
            receiver,
            method,
            args,
        })
    }

    /// Construct a new entity; materialization is deferred to the host.
    /// Resolves to a handle for the created entity.
    pub fn create(&mut self, entity_type: TypeName, args: CallArgs) -> Result<Value, Interrupt> {
        self.perform(InteractionRequest::CreateEntity { entity_type, args })
    }

    /// Invoke a method on an external service.
    pub fn service(
        &mut self,
        service: TypeName,
        method: MethodName,
        args: CallArgs,
    ) -> Result<Value, Interrupt> {
        self.perform(InteractionRequest::Service {
            service,
            method,
            args,
        })
    }

    fn perform(&mut self, request: InteractionRequest) -> Result<Value, Interrupt> {
        let Some(exchange) = self.exchanges.pop_front() else {
            // Live extension: no logged counterpart. Record the request
            // and unwind so the driver can emit it and halt.
            tracing::debug!(request = %request.describe(), "suspending at new interaction");
            self.pending = Some(request);
            return Err(Interrupt::Suspended);
        };

        if exchange.request != request {
            return Err(Interrupt::Fault(Fault::Divergence {
                request_offset: exchange.request_offset,
                reason: format!(
                    "logged {}, re-executed {}",
                    exchange.request.describe(),
                    request.describe()
                ),
            }));
        }

        match exchange.reply {
            // The tail request was already emitted by a prior call and is
            // still unanswered: resume exactly to the suspension point.
            None => Err(Interrupt::Suspended),
            Some(Reply::MethodResponse(value)) | Some(Reply::ServiceResponse(value)) => Ok(value),
            Some(Reply::Created(entity)) => Ok(Value::Entity(entity)),
            Some(Reply::Error(err)) => Err(Interrupt::Error(err)),
        }
    }

    /// The request recorded at the live-extension suspension, if any.
    pub(crate) fn take_pending(&mut self) -> Option<InteractionRequest> {
        self.pending.take()
    }

    /// Logged exchanges not yet consumed by re-execution.
    pub(crate) fn remaining(&self) -> usize {
        self.exchanges.len()
    }
}

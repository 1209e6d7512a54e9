//! Fault taxonomy and machine-readable error payloads.
//!
//! The engine never returns `Err` across its boundary: every failure is
//! reified as a terminal `ErrorRaised` message so the caller's log stays
//! the sole source of truth.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::{MethodName, MethodRef, TypeName};
use super::offset::Offset;
use super::value::Value;

/// Invalid identifier string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidName {
    #[error("type name is invalid: {reason}")]
    Type { reason: String },
    #[error("method name is invalid: {reason}")]
    Method { reason: String },
}

/// Machine-readable classification of a raised error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The input log contradicts itself (response without request, shape
    /// mismatch, unknown state).
    LogInconsistency,
    /// Re-execution diverged from the logged interactions.
    NonDeterminism,
    /// The input sequence violates the engine's calling contract.
    ContractViolation,
    /// A domain method terminated abnormally.
    DomainFailure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::LogInconsistency => "log_inconsistency",
            ErrorCode::NonDeterminism => "non_determinism",
            ErrorCode::ContractViolation => "contract_violation",
            ErrorCode::DomainFailure => "domain_failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an `ErrorRaised` message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// A domain-declared error: what a method raises in place of a return
/// value, and what the interceptor surfaces when the log answers a request
/// with an error-reply.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct DomainError {
    pub name: TypeName,
    pub message: String,
    pub details: Value,
}

impl DomainError {
    pub fn new(name: TypeName, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Rebuild a domain error from an error-reply payload.
    ///
    /// Lenient on purpose: an injected `ErrorRaised` reply (how a caller
    /// surfaces a timed-out or failed external call) may carry any code;
    /// the method body still observes it as a domain error it can catch or
    /// propagate.
    pub fn from_payload(payload: &ErrorPayload) -> Self {
        let name = payload
            .details
            .as_map()
            .and_then(|details| details.get("error"))
            .and_then(Value::as_str)
            .and_then(|raw| TypeName::parse(raw).ok())
            .unwrap_or_else(|| TypeName::parse("Error").expect("literal type name"));
        let details = payload
            .details
            .as_map()
            .and_then(|details| details.get("details"))
            .cloned()
            .unwrap_or(Value::Null);
        Self {
            name,
            message: payload.message.clone(),
            details,
        }
    }
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> ErrorPayload {
        let mut details = BTreeMap::new();
        details.insert("error".to_string(), Value::Str(err.name.as_str().to_string()));
        details.insert("details".to_string(), err.details.clone());
        ErrorPayload {
            code: ErrorCode::DomainFailure,
            message: err.message.clone(),
            details: Value::Map(details),
        }
    }
}

/// Engine-detected violation of the log or execution contract.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Fault {
    #[error("input offsets must be strictly increasing ({got} after {prev})")]
    OffsetOrder { prev: Offset, got: Offset },
    #[error("multiple top-level requests (offsets {first} and {second})")]
    MultipleInitiators { first: Offset, second: Offset },
    #[error("interaction at offset {offset} without a top-level request")]
    MissingInitiator { offset: Offset },
    #[error("message kind {kind} is not valid engine input (offset {offset})")]
    UnexpectedInputKind { offset: Offset, kind: &'static str },
    #[error("response at offset {offset} matches no pending request (request_offset {request_offset})")]
    UnmatchedResponse { offset: Offset, request_offset: Offset },
    #[error("response at offset {offset} does not match the shape of request at {request_offset}")]
    ResponseShapeMismatch { offset: Offset, request_offset: Offset },
    #[error("request at offset {request_offset} already has a reply (offset {offset})")]
    DuplicateResponse { offset: Offset, request_offset: Offset },
    #[error("request at offset {offset} left unanswered before a later request at {later}")]
    DanglingRequest { offset: Offset, later: Offset },
    #[error("request at offset {offset} carries trace {got}, expected top-level offset {expected}")]
    TraceMismatch {
        offset: Offset,
        expected: Offset,
        got: Offset,
    },
    #[error("state snapshot at offset {offset} could not be applied: {reason}")]
    StateRejected { offset: Offset, reason: String },
    #[error("subject has no recorded state for method `{method}`")]
    SubjectStateMissing { method: MethodRef },
    #[error("method `{method}` does not target entity type `{entity_type}`")]
    SubjectTypeMismatch {
        method: MethodRef,
        entity_type: TypeName,
    },
    #[error("entity type `{entity_type}` has no method `{method}`")]
    UnknownMethod {
        entity_type: TypeName,
        method: MethodName,
    },
    #[error("re-execution diverged from the log at request offset {request_offset}: {reason}")]
    Divergence {
        request_offset: Offset,
        reason: String,
    },
    #[error("method completed with {remaining} logged interactions left unconsumed")]
    UnconsumedExchanges { remaining: usize },
}

impl Fault {
    pub fn code(&self) -> ErrorCode {
        match self {
            Fault::OffsetOrder { .. }
            | Fault::MultipleInitiators { .. }
            | Fault::MissingInitiator { .. }
            | Fault::UnexpectedInputKind { .. }
            | Fault::SubjectTypeMismatch { .. }
            | Fault::UnknownMethod { .. } => ErrorCode::ContractViolation,
            Fault::UnmatchedResponse { .. }
            | Fault::ResponseShapeMismatch { .. }
            | Fault::DuplicateResponse { .. }
            | Fault::DanglingRequest { .. }
            | Fault::TraceMismatch { .. }
            | Fault::StateRejected { .. }
            | Fault::SubjectStateMissing { .. } => ErrorCode::LogInconsistency,
            Fault::Divergence { .. } | Fault::UnconsumedExchanges { .. } => {
                ErrorCode::NonDeterminism
            }
        }
    }

    pub fn into_payload(self) -> ErrorPayload {
        let message = self.to_string();
        ErrorPayload::new(self.code(), message)
    }
}

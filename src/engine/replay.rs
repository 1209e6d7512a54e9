//! Replay driver: the control spine of a `complete` call.
//!
//! A single pass validates the input sequence into a [`ParsedLog`]; state
//! is rebuilt from the snapshots; the pending method (or constructor) is
//! re-executed through the interceptor until it completes or suspends at
//! the first interaction the log cannot answer.

use std::collections::VecDeque;

use crate::core::{
    CallArgs, DomainError, ErrorPayload, Fault, Message, MethodRef, Offset, TypeName, Value,
};

use super::entity::Entity;
use super::intercept::{CallContext, Exchange, InteractionRequest, Interrupt, Reply};
use super::output::OutputBuilder;

/// The single top-level request of a conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Initiator {
    Method {
        offset: Offset,
        method: MethodRef,
        args: CallArgs,
    },
    Construct {
        offset: Offset,
        args: CallArgs,
    },
}

impl Initiator {
    fn offset(&self) -> Offset {
        match self {
            Initiator::Method { offset, .. } | Initiator::Construct { offset, .. } => *offset,
        }
    }
}

/// Validated view of one input sequence.
#[derive(Debug, Default)]
pub(crate) struct ParsedLog {
    snapshots: Vec<(Offset, Value)>,
    initiator: Option<Initiator>,
    exchanges: VecDeque<Exchange>,
    last_offset: Option<Offset>,
}

impl ParsedLog {
    fn set_initiator(&mut self, initiator: Initiator) -> Result<(), Fault> {
        if let Some(existing) = &self.initiator {
            return Err(Fault::MultipleInitiators {
                first: existing.offset(),
                second: initiator.offset(),
            });
        }
        self.initiator = Some(initiator);
        Ok(())
    }

    fn push_request(
        &mut self,
        offset: Offset,
        trace_offset: Offset,
        request: InteractionRequest,
    ) -> Result<(), Fault> {
        let Some(initiator) = &self.initiator else {
            return Err(Fault::MissingInitiator { offset });
        };
        if trace_offset != initiator.offset() {
            return Err(Fault::TraceMismatch {
                offset,
                expected: initiator.offset(),
                got: trace_offset,
            });
        }
        // At most one unanswered request, and only at the tail.
        if let Some(open) = self.exchanges.iter().find(|e| e.reply.is_none()) {
            return Err(Fault::DanglingRequest {
                offset: open.request_offset,
                later: offset,
            });
        }
        self.exchanges.push_back(Exchange {
            request_offset: offset,
            request,
            reply: None,
        });
        Ok(())
    }

    fn push_reply(&mut self, offset: Offset, request_offset: Offset, reply: Reply) -> Result<(), Fault> {
        let Some(exchange) = self
            .exchanges
            .iter_mut()
            .find(|e| e.request_offset == request_offset)
        else {
            return Err(Fault::UnmatchedResponse {
                offset,
                request_offset,
            });
        };
        if exchange.reply.is_some() {
            return Err(Fault::DuplicateResponse {
                offset,
                request_offset,
            });
        }
        if !reply.answers(&exchange.request) {
            return Err(Fault::ResponseShapeMismatch {
                offset,
                request_offset,
            });
        }
        exchange.reply = Some(reply);
        Ok(())
    }
}

pub(crate) fn parse(inputs: &[Message]) -> Result<ParsedLog, Fault> {
    let mut log = ParsedLog::default();
    let mut prev: Option<Offset> = None;

    for message in inputs {
        let offset = message.offset();
        if let Some(prev) = prev
            && offset <= prev
        {
            return Err(Fault::OffsetOrder { prev, got: offset });
        }
        prev = Some(offset);

        match message {
            Message::EntityStateChanged(m) => {
                log.snapshots.push((m.offset, m.state.clone()));
            }
            Message::EntityMethodRequestReceived(m) => {
                log.set_initiator(Initiator::Method {
                    offset: m.offset,
                    method: m.method.clone(),
                    args: m.args.clone(),
                })?;
            }
            Message::CreateEntityRequestReceived(m) => {
                log.set_initiator(Initiator::Construct {
                    offset: m.offset,
                    args: m.args.clone(),
                })?;
            }
            Message::EntityMethodRequestSent(m) => {
                log.push_request(
                    m.offset,
                    m.trace_offset,
                    InteractionRequest::EntityMethod {
                        receiver: m.receiver,
                        method: m.method.clone(),
                        args: m.args.clone(),
                    },
                )?;
            }
            Message::CreateEntityRequestSent(m) => {
                log.push_request(
                    m.offset,
                    m.trace_offset,
                    InteractionRequest::CreateEntity {
                        entity_type: m.entity_type.clone(),
                        args: m.args.clone(),
                    },
                )?;
            }
            Message::ServiceRequestSent(m) => {
                log.push_request(
                    m.offset,
                    m.trace_offset,
                    InteractionRequest::Service {
                        service: m.service.clone(),
                        method: m.method.clone(),
                        args: m.args.clone(),
                    },
                )?;
            }
            Message::EntityMethodResponseReceived(m) => {
                log.push_reply(
                    m.offset,
                    m.request_offset,
                    Reply::MethodResponse(m.response.clone()),
                )?;
            }
            Message::ServiceResponseReceived(m) => {
                log.push_reply(
                    m.offset,
                    m.request_offset,
                    Reply::ServiceResponse(m.response.clone()),
                )?;
            }
            Message::CreateEntityResponseReceived(m) => {
                log.push_reply(m.offset, m.request_offset, Reply::Created(m.response))?;
            }
            Message::ErrorRaised(m) => {
                // Only valid as input when injected as the error-reply to
                // an earlier request.
                let Some(request_offset) = m.request_offset else {
                    return Err(Fault::UnexpectedInputKind {
                        offset,
                        kind: message.kind(),
                    });
                };
                let err = DomainError::from_payload(&m.error);
                log.push_reply(offset, request_offset, Reply::Error(err))?;
            }
            Message::EntityMethodResponseSent(_) | Message::CreateEntityResponseSent(_) => {
                return Err(Fault::UnexpectedInputKind {
                    offset,
                    kind: message.kind(),
                });
            }
        }
    }

    log.last_offset = prev;
    Ok(log)
}

/// Drive one `complete` call: rebuild state, re-execute the pending work,
/// return the ordered output stream. Never fails past the boundary; every
/// fault is reified as a terminal `ErrorRaised`.
pub(crate) fn run<E: Entity>(subject: &mut Option<E>, inputs: &[Message]) -> Vec<Message> {
    // Stateless between steps: the subject is rebuilt from this input
    // sequence alone.
    *subject = None;

    let parsed = match parse(inputs) {
        Ok(parsed) => parsed,
        Err(fault) => {
            tracing::warn!(code = fault.code().as_str(), "rejecting input log: {fault}");
            let last = inputs.iter().map(Message::offset).max();
            let mut output = OutputBuilder::new(last);
            output.push_error(None, None, fault.into_payload());
            return output.finish();
        }
    };
    let mut output = OutputBuilder::new(parsed.last_offset);

    // State rebuild: every snapshot applied in offset order, last wins.
    for (offset, state) in &parsed.snapshots {
        match E::restore(state) {
            Ok(entity) => *subject = Some(entity),
            Err(err) => {
                let fault = Fault::StateRejected {
                    offset: *offset,
                    reason: err.to_string(),
                };
                tracing::warn!(offset = %offset, "state snapshot rejected: {err}");
                output.push_error(None, None, fault.into_payload());
                return output.finish();
            }
        }
    }

    let Some(initiator) = parsed.initiator else {
        // Only state updates: no progress, empty output.
        return output.finish();
    };
    let trace_offset = initiator.offset();
    let mut ctx = CallContext::new(parsed.exchanges);

    let mut constructed: Option<E> = None;
    let result: Result<Option<Value>, Interrupt> = match &initiator {
        Initiator::Construct { args, .. } => {
            tracing::debug!(
                offset = %trace_offset,
                entity_type = E::type_name(),
                "replaying constructor"
            );
            E::construct(&mut ctx, args).map(|entity| {
                constructed = Some(entity);
                None
            })
        }
        Initiator::Method { method, args, .. } => {
            if method.entity_type.as_str() != E::type_name() {
                Err(Interrupt::Fault(Fault::SubjectTypeMismatch {
                    method: method.clone(),
                    entity_type: TypeName::parse(E::type_name()).expect("entity type name"),
                }))
            } else {
                match take_or_default_subject(subject, method) {
                    Ok(mut entity) => {
                        tracing::debug!(offset = %trace_offset, method = %method, "replaying method");
                        let result = entity.dispatch(&mut ctx, &method.name, args);
                        *subject = Some(entity);
                        result.map(Some)
                    }
                    Err(fault) => Err(Interrupt::Fault(fault)),
                }
            }
        }
    };

    match result {
        Ok(response) => {
            let remaining = ctx.remaining();
            if remaining > 0 {
                // Re-execution issued fewer interactions than the log
                // contains.
                let fault = Fault::UnconsumedExchanges { remaining };
                tracing::warn!(trace_offset = %trace_offset, "replay fault: {fault}");
                output.push_error(Some(trace_offset), None, fault.into_payload());
            } else {
                match response {
                    Some(value) => output.push_method_response(trace_offset, value),
                    None => {
                        output.push_create_response(trace_offset);
                        *subject = constructed;
                    }
                }
            }
        }
        Err(Interrupt::Suspended) => {
            // Either a live extension (emit the fresh request) or resumed
            // exactly to the prior suspension point (nothing new).
            if let Some(request) = ctx.take_pending() {
                output.push_request(trace_offset, request);
            }
        }
        Err(Interrupt::Error(err)) => {
            tracing::debug!(trace_offset = %trace_offset, "method raised {err}");
            output.push_error(
                Some(trace_offset),
                Some(trace_offset),
                ErrorPayload::from(&err),
            );
        }
        Err(Interrupt::Fault(fault)) => {
            tracing::warn!(
                trace_offset = %trace_offset,
                code = fault.code().as_str(),
                "replay fault: {fault}"
            );
            output.push_error(Some(trace_offset), None, fault.into_payload());
        }
    }

    output.finish()
}

/// Subject for a method invocation: the last restored snapshot, or the
/// entity's null state for a conversation that starts directly at a
/// request.
fn take_or_default_subject<E: Entity>(
    subject: &mut Option<E>,
    method: &MethodRef,
) -> Result<E, Fault> {
    if let Some(entity) = subject.take() {
        return Ok(entity);
    }
    E::restore(&Value::Null).map_err(|_| Fault::SubjectStateMissing {
        method: method.clone(),
    })
}

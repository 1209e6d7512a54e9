//! Output builder: fresh offsets and trace correlation for the output
//! stream of one `complete` call.

use crate::core::{
    CreateEntityRequestSent, CreateEntityResponseSent, EntityMethodRequestSent,
    EntityMethodResponseSent, ErrorPayload, ErrorRaised, Message, Offset, ServiceRequestSent,
    Value,
};

use super::intercept::InteractionRequest;

/// Collects the ordered output stream. Offsets continue the input sequence
/// without gaps, starting at `max(input.offset) + 1`; every derived
/// message copies the trace of the top-level request being processed.
#[derive(Debug)]
pub(crate) struct OutputBuilder {
    next: Offset,
    messages: Vec<Message>,
}

impl OutputBuilder {
    pub fn new(last_input: Option<Offset>) -> Self {
        Self {
            next: last_input.map_or(Offset::ZERO, Offset::next),
            messages: Vec::new(),
        }
    }

    fn advance(&mut self) -> Offset {
        let offset = self.next;
        self.next = offset.next();
        offset
    }

    /// Emit the suspension request for a live extension.
    pub fn push_request(&mut self, trace_offset: Offset, request: InteractionRequest) {
        let offset = self.advance();
        let message = match request {
            InteractionRequest::EntityMethod {
                receiver,
                method,
                args,
            } => Message::from(EntityMethodRequestSent {
                offset,
                trace_offset,
                receiver,
                method,
                args,
            }),
            InteractionRequest::CreateEntity { entity_type, args } => {
                Message::from(CreateEntityRequestSent {
                    offset,
                    trace_offset,
                    entity_type,
                    args,
                })
            }
            InteractionRequest::Service {
                service,
                method,
                args,
            } => Message::from(ServiceRequestSent {
                offset,
                trace_offset,
                service,
                method,
                args,
            }),
        };
        self.messages.push(message);
    }

    /// Emit the terminal return value of the top-level method.
    pub fn push_method_response(&mut self, request_offset: Offset, response: Value) {
        let offset = self.advance();
        self.messages.push(Message::from(EntityMethodResponseSent {
            offset,
            request_offset,
            response,
        }));
    }

    /// Emit the terminal acknowledgement of subject construction.
    pub fn push_create_response(&mut self, request_offset: Offset) {
        let offset = self.advance();
        self.messages.push(Message::from(CreateEntityResponseSent {
            offset,
            request_offset,
        }));
    }

    /// Emit an `ErrorRaised`, either in lieu of the terminal response
    /// (domain failure) or as the final message of a faulted call.
    pub fn push_error(
        &mut self,
        trace_offset: Option<Offset>,
        request_offset: Option<Offset>,
        error: ErrorPayload,
    ) {
        let offset = self.advance();
        self.messages.push(Message::from(ErrorRaised {
            offset,
            trace_offset,
            request_offset,
            error,
        }));
    }

    pub fn finish(self) -> Vec<Message> {
        self.messages
    }
}

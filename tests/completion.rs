//! Full completion scenarios for a User/Article/Comment domain: immediate
//! completion, suspension at entity creation, resumption, and the
//! determinism guarantees of the replay driver.

use std::collections::BTreeMap;

use uuid::Uuid;

use retrace::{
    CallArgs, CallContext, CreateEntityRequestSent, CreateEntityResponseReceived, DomainError,
    Entity, EntityId, EntityMethodRequestReceived, EntityMethodRequestSent,
    EntityMethodResponseReceived, EntityMethodResponseSent, EntityRef, EntityStateChanged,
    ErrorCode, Execution, Interrupt, Message, MethodName, MethodRef, Offset, StateError, TypeName,
    Value,
};

struct User {
    name: String,
}

impl User {
    fn article(&self, title: &str) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert("author".to_string(), Value::subject());
        fields.insert("title".to_string(), Value::from(title));
        Value::Map(fields)
    }
}

impl Entity for User {
    fn type_name() -> &'static str {
        "User"
    }

    fn construct(_ctx: &mut CallContext, args: &CallArgs) -> Result<Self, Interrupt> {
        let name = args
            .param(0, "name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self { name })
    }

    fn snapshot(&self) -> Value {
        Value::Str(self.name.clone())
    }

    fn restore(state: &Value) -> Result<Self, StateError> {
        match state.as_str() {
            Some(name) => Ok(Self {
                name: name.to_string(),
            }),
            None => Err(StateError::new("User", "expected name string")),
        }
    }

    fn dispatch(
        &mut self,
        ctx: &mut CallContext,
        method: &MethodName,
        args: &CallArgs,
    ) -> Result<Value, Interrupt> {
        match method.as_str() {
            "write_article" => {
                let title = args
                    .param(0, "title")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing_argument("title"))?
                    .to_string();
                Ok(self.article(&title))
            }
            "write_comment" => {
                let article = args
                    .param(0, "article")
                    .and_then(Value::as_entity)
                    .ok_or_else(|| missing_argument("article"))?;
                let text = args
                    .param(1, "text")
                    .cloned()
                    .ok_or_else(|| missing_argument("text"))?;

                let comment = ctx.create(
                    TypeName::parse("Comment").unwrap(),
                    CallArgs::positional([Value::subject(), text]),
                )?;
                ctx.call(
                    article,
                    MethodRef::parse("Article", "add_comment").unwrap(),
                    CallArgs::positional([comment.clone()]),
                )?;
                Ok(comment)
            }
            "name" => Ok(Value::Str(self.name.clone())),
            _ => Err(Interrupt::unknown_method(Self::type_name(), method)),
        }
    }
}

fn missing_argument(name: &str) -> Interrupt {
    DomainError::new(
        TypeName::parse("TypeError").unwrap(),
        format!("missing argument {name}"),
    )
    .into()
}

fn article() -> EntityRef {
    EntityRef::Id(EntityId::new(Uuid::from_bytes([0xA1; 16])))
}

fn comment() -> EntityRef {
    EntityRef::Id(EntityId::new(Uuid::from_bytes([0xC1; 16])))
}

fn state(offset: u64, name: &str) -> Message {
    Message::from(EntityStateChanged {
        offset: Offset::new(offset),
        state: Value::from(name),
    })
}

fn request(offset: u64, method: &str, args: CallArgs) -> Message {
    Message::from(EntityMethodRequestReceived {
        offset: Offset::new(offset),
        method: MethodRef::parse("User", method).unwrap(),
        args,
    })
}

fn create_comment_sent(offset: u64, trace: u64, text: &str) -> Message {
    Message::from(CreateEntityRequestSent {
        offset: Offset::new(offset),
        trace_offset: Offset::new(trace),
        entity_type: TypeName::parse("Comment").unwrap(),
        args: CallArgs::positional([Value::subject(), Value::from(text)]),
    })
}

fn write_comment_inputs() -> Vec<Message> {
    vec![
        state(1, "A"),
        request(
            2,
            "write_comment",
            CallArgs::positional([Value::Entity(article()), Value::from("X")]),
        ),
    ]
}

#[test]
fn immediate_completion() {
    let mut execution = Execution::<User>::new();
    let inputs = vec![
        state(1, "A"),
        request(2, "write_article", CallArgs::positional([Value::from("Hello")])),
    ];

    let outputs = execution.complete(&inputs);

    assert_eq!(
        outputs,
        vec![Message::from(EntityMethodResponseSent {
            offset: Offset::new(3),
            request_offset: Offset::new(2),
            response: execution.subject().unwrap().article("Hello"),
        })]
    );
}

#[test]
fn first_suspension_at_entity_creation() {
    let mut execution = Execution::<User>::new();

    let outputs = execution.complete(&write_comment_inputs());

    assert_eq!(outputs, vec![create_comment_sent(3, 2, "X")]);
}

#[test]
fn resume_after_create_response() {
    let mut execution = Execution::<User>::new();
    let mut inputs = write_comment_inputs();
    inputs.push(create_comment_sent(3, 2, "X"));
    inputs.push(Message::from(CreateEntityResponseReceived {
        offset: Offset::new(4),
        request_offset: Offset::new(3),
        response: comment(),
    }));

    let outputs = execution.complete(&inputs);

    assert_eq!(
        outputs,
        vec![Message::from(EntityMethodRequestSent {
            offset: Offset::new(5),
            trace_offset: Offset::new(2),
            receiver: article(),
            method: MethodRef::parse("Article", "add_comment").unwrap(),
            args: CallArgs::positional([Value::Entity(comment())]),
        })]
    );
}

#[test]
fn full_conversation() {
    let mut execution = Execution::<User>::new();
    let mut inputs = write_comment_inputs();
    inputs.push(create_comment_sent(3, 2, "X"));
    inputs.push(Message::from(CreateEntityResponseReceived {
        offset: Offset::new(4),
        request_offset: Offset::new(3),
        response: comment(),
    }));
    inputs.push(Message::from(EntityMethodRequestSent {
        offset: Offset::new(5),
        trace_offset: Offset::new(2),
        receiver: article(),
        method: MethodRef::parse("Article", "add_comment").unwrap(),
        args: CallArgs::positional([Value::Entity(comment())]),
    }));
    inputs.push(Message::from(EntityMethodResponseReceived {
        offset: Offset::new(6),
        request_offset: Offset::new(5),
        response: Value::Null,
    }));

    let outputs = execution.complete(&inputs);

    assert_eq!(
        outputs,
        vec![Message::from(EntityMethodResponseSent {
            offset: Offset::new(7),
            request_offset: Offset::new(2),
            response: Value::Entity(comment()),
        })]
    );
}

#[test]
fn non_determinism_detection() {
    // The log claims the method called Article.delete; re-execution calls
    // Article.add_comment.
    let mut execution = Execution::<User>::new();
    let mut inputs = write_comment_inputs();
    inputs.push(create_comment_sent(3, 2, "X"));
    inputs.push(Message::from(CreateEntityResponseReceived {
        offset: Offset::new(4),
        request_offset: Offset::new(3),
        response: comment(),
    }));
    inputs.push(Message::from(EntityMethodRequestSent {
        offset: Offset::new(5),
        trace_offset: Offset::new(2),
        receiver: article(),
        method: MethodRef::parse("Article", "delete").unwrap(),
        args: CallArgs::new(),
    }));
    inputs.push(Message::from(EntityMethodResponseReceived {
        offset: Offset::new(6),
        request_offset: Offset::new(5),
        response: Value::Null,
    }));

    let outputs = execution.complete(&inputs);

    match &outputs[..] {
        [Message::ErrorRaised(raised)] => {
            assert_eq!(raised.offset, Offset::new(7));
            assert_eq!(raised.error.code, ErrorCode::NonDeterminism);
            assert_eq!(raised.request_offset, None);
        }
        other => panic!("expected single ErrorRaised, got {other:?}"),
    }
}

#[test]
fn latest_snapshot_wins() {
    let mut execution = Execution::<User>::new();
    let inputs = vec![
        state(1, "A"),
        state(2, "B"),
        request(3, "name", CallArgs::new()),
    ];

    let outputs = execution.complete(&inputs);

    assert_eq!(
        outputs,
        vec![Message::from(EntityMethodResponseSent {
            offset: Offset::new(4),
            request_offset: Offset::new(3),
            response: Value::from("B"),
        })]
    );
}

#[test]
fn output_offsets_continue_input_and_increase() {
    let mut execution = Execution::<User>::new();
    let inputs = write_comment_inputs();
    let max_input = inputs.iter().map(Message::offset).max().unwrap();

    let outputs = execution.complete(&inputs);

    let mut prev = max_input;
    for message in &outputs {
        assert!(message.offset() > prev);
        prev = message.offset();
    }
}

#[test]
fn derived_outputs_share_the_top_level_trace() {
    let mut execution = Execution::<User>::new();
    let outputs = execution.complete(&write_comment_inputs());

    for message in &outputs {
        assert_eq!(message.trace_offset(), Some(Offset::new(2)));
    }
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let inputs = write_comment_inputs();

    let first = Execution::<User>::new().complete(&inputs);
    let second = Execution::<User>::new().complete(&inputs);

    assert_eq!(first, second);
}

#[test]
fn stepwise_and_whole_conversation_agree() {
    // Drive the conversation one response at a time, echoing the engine's
    // outputs back into the log, and compare against feeding the entire
    // log at once.
    let mut stepwise = Execution::<User>::new();
    let mut log = write_comment_inputs();

    let outputs = stepwise.complete(&log);
    log.extend(outputs);
    log.push(Message::from(CreateEntityResponseReceived {
        offset: Offset::new(4),
        request_offset: Offset::new(3),
        response: comment(),
    }));

    let outputs = stepwise.complete(&log);
    log.extend(outputs);
    log.push(Message::from(EntityMethodResponseReceived {
        offset: Offset::new(6),
        request_offset: Offset::new(5),
        response: Value::Null,
    }));

    let final_stepwise = stepwise.complete(&log);
    let final_whole = Execution::<User>::new().complete(&log);

    assert_eq!(final_stepwise, final_whole);
    assert_eq!(
        final_stepwise,
        vec![Message::from(EntityMethodResponseSent {
            offset: Offset::new(7),
            request_offset: Offset::new(2),
            response: Value::Entity(comment()),
        })]
    );
}

#[test]
fn snapshot_restore_round_trips() {
    let user = User {
        name: "Yuriy".to_string(),
    };
    let restored = User::restore(&user.snapshot()).unwrap();
    assert_eq!(restored.name, user.name);
}

#[test]
fn domain_failure_replaces_the_response() {
    let mut execution = Execution::<User>::new();
    // write_article without a title raises TypeError.
    let inputs = vec![state(1, "A"), request(2, "write_article", CallArgs::new())];

    let outputs = execution.complete(&inputs);

    match &outputs[..] {
        [Message::ErrorRaised(raised)] => {
            assert_eq!(raised.offset, Offset::new(3));
            assert_eq!(raised.trace_offset, Some(Offset::new(2)));
            assert_eq!(raised.request_offset, Some(Offset::new(2)));
            assert_eq!(raised.error.code, ErrorCode::DomainFailure);
            assert_eq!(raised.error.message, "missing argument title");
        }
        other => panic!("expected single ErrorRaised, got {other:?}"),
    }
}

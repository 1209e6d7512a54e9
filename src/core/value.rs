//! Opaque structured values carried in message payloads.
//!
//! The engine compares values for replay matching but never interprets
//! them, so equality must be total and well-defined: no floats, ordered
//! maps. Entities appear inside values only as identity handles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::identity::{EntityId, EntityRef};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Entity(EntityRef),
}

impl Value {
    /// Handle for a concrete entity.
    pub fn entity(id: EntityId) -> Self {
        Value::Entity(EntityRef::Id(id))
    }

    /// Handle for the subject of the current execution.
    pub fn subject() -> Self {
        Value::Entity(EntityRef::Subject)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<EntityRef> {
        match self {
            Value::Entity(entity) => Some(*entity),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Value {
        Value::List(value)
    }
}

impl From<EntityRef> for Value {
    fn from(value: EntityRef) -> Value {
        Value::Entity(value)
    }
}

/// Positional and named arguments of a call, in the order given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArgs {
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            args: args.into_iter().collect(),
            kwargs: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Positional argument, falling back to the named argument of the same
    /// name. Mirrors how callers may pass any parameter either way.
    pub fn param(&self, index: usize, name: &str) -> Option<&Value> {
        self.arg(index).or_else(|| self.kwarg(name))
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::from(7i64).as_int(), Some(7));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("hi").as_int(), None);

        let id = EntityId::new(Uuid::from_bytes([3u8; 16]));
        assert_eq!(Value::entity(id).as_entity(), Some(EntityRef::Id(id)));
        assert_eq!(Value::subject().as_entity(), Some(EntityRef::Subject));
    }

    #[test]
    fn call_args_lookup_positional_then_named() {
        let args = CallArgs::positional([Value::from("Stitch")]).with_kwarg("owner", Value::subject());
        assert_eq!(args.param(0, "name"), Some(&Value::from("Stitch")));
        assert_eq!(args.param(1, "owner"), Some(&Value::subject()));
        assert_eq!(args.param(1, "missing"), None);
    }

    #[test]
    fn equality_is_structural() {
        let a = CallArgs::new().with_arg(1i64).with_kwarg("k", "v");
        let b = CallArgs::positional([Value::Int(1)]).with_kwarg("k", Value::from("v"));
        assert_eq!(a, b);
    }
}

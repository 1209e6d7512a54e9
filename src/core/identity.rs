//! Identity atoms: entity handles, type names, method references.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::InvalidName;

/// Host-assigned entity identifier.
///
/// The engine never mints ids; they arrive inside messages and are passed
/// through unchanged.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an entity inside message arguments and state snapshots.
///
/// `Subject` stands for "the entity this execution belongs to". The engine
/// never maps it to a concrete id: it is matched by reference-like
/// equality (subject == subject, and nothing else) and passed through
/// unchanged in emitted messages; resolving it is the host's job. Entities
/// appear inside values only as references, never as embedded state, which
/// is what breaks reference cycles between entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Subject,
    Id(EntityId),
}

impl EntityRef {
    pub fn is_subject(&self) -> bool {
        matches!(self, EntityRef::Subject)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Subject => write!(f, "subject"),
            EntityRef::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> EntityRef {
        EntityRef::Id(id)
    }
}

/// Entity, service, or error type name. Non-empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidName> {
        let s = s.into();
        if s.is_empty() {
            Err(InvalidName::Type {
                reason: "empty".into(),
            })
        } else {
            Ok(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({:?})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Method name declared on an entity or service type. Non-empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodName(String);

impl MethodName {
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidName> {
        let s = s.into();
        if s.is_empty() {
            Err(InvalidName::Method {
                reason: "empty".into(),
            })
        } else {
            Ok(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodName({:?})", self.0)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unbound handle identifying one method of an entity type.
///
/// The engine never introspects method bodies; a reference is just the
/// `(entity type, method name)` pair it dispatches on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub entity_type: TypeName,
    pub name: MethodName,
}

impl MethodRef {
    pub fn new(entity_type: TypeName, name: MethodName) -> Self {
        Self { entity_type, name }
    }

    pub fn parse(entity_type: &str, name: &str) -> Result<Self, InvalidName> {
        Ok(Self {
            entity_type: TypeName::parse(entity_type)?,
            name: MethodName::parse(name)?,
        })
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity_type, self.name)
    }
}

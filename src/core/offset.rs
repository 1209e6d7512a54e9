//! Offset discipline for conversation logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a message within one conversation.
///
/// Offsets are strictly increasing across the combined input and output
/// stream of a single `complete` call; output offsets continue the input
/// sequence without gaps, starting at `max(input) + 1`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offset(u64);

impl Offset {
    pub const ZERO: Offset = Offset(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Offset {
        Offset(
            self.0
                .checked_add(1)
                .expect("offset overflow computing next"),
        )
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Offset {
    fn from(value: u64) -> Offset {
        Offset(value)
    }
}

impl From<Offset> for u64 {
    fn from(value: Offset) -> u64 {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        let offset = Offset::new(41);
        assert_eq!(offset.next(), Offset::new(42));
        assert_eq!(Offset::ZERO.next().get(), 1);
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Offset::new(1) < Offset::new(2));
        assert_eq!(Offset::from(7u64), Offset::new(7));
        assert_eq!(u64::from(Offset::new(7)), 7);
    }
}

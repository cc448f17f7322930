//! Signal identifiers, directions and routes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::BlockId;

/// Error returned when constructing an invalid signal identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid signal id: {reason}")]
pub struct InvalidSignalId {
    reason: &'static str,
}

/// Identifier of a signal that bounds a route.
///
/// Signal ids are opaque labels chosen by whoever lays out the network.
/// They must be non-empty and free of surrounding whitespace.
///
/// # Examples
///
/// ```
/// use track_network::domain::SignalId;
///
/// let sig = SignalId::new("S12").unwrap();
/// assert_eq!(sig.as_str(), "S12");
///
/// assert!(SignalId::new("").is_err());
/// assert!(SignalId::new(" S12").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignalId(String);

impl SignalId {
    /// Create a signal id from a string.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidSignalId> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidSignalId {
                reason: "signal id cannot be empty",
            });
        }
        if s.trim() != s {
            return Err(InvalidSignalId {
                reason: "signal id cannot have surrounding whitespace",
            });
        }
        Ok(SignalId(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SignalId {
    type Error = InvalidSignalId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        SignalId::new(s)
    }
}

impl From<SignalId> for String {
    fn from(id: SignalId) -> Self {
        id.0
    }
}

impl fmt::Debug for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalId({})", self.0)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of travel along the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A directed route between two signals.
///
/// A route may also record the blocks it passes over, in travel order,
/// which lets a [`Network`](crate::network::Network) check that it can
/// actually be driven. Routes are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    source: SignalId,
    destination: SignalId,
    direction: Direction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    blocks: Vec<BlockId>,
}

impl Route {
    /// Creates a route with no recorded blocks.
    pub fn new(source: SignalId, destination: SignalId, direction: Direction) -> Self {
        Self {
            source,
            destination,
            direction,
            blocks: Vec::new(),
        }
    }

    /// Records the blocks this route passes over, in travel order.
    pub fn with_blocks(mut self, blocks: Vec<BlockId>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn source(&self) -> &SignalId {
        &self.source
    }

    pub fn destination(&self) -> &SignalId {
        &self.destination
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Blocks passed over, in travel order. Empty if not recorded.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.destination, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(s: &str) -> SignalId {
        SignalId::new(s).unwrap()
    }

    #[test]
    fn signal_id_validation() {
        assert!(SignalId::new("A").is_ok());
        assert!(SignalId::new("S-12/b").is_ok());
        assert!(SignalId::new("").is_err());
        assert!(SignalId::new("A ").is_err());
        assert!(SignalId::new("\tA").is_err());
    }

    #[test]
    fn signal_id_error_display() {
        let err = SignalId::new("").unwrap_err();
        assert_eq!(err.to_string(), "invalid signal id: signal id cannot be empty");
    }

    #[test]
    fn signal_id_debug_and_display() {
        let id = sig("S1");
        assert_eq!(format!("{:?}", id), "SignalId(S1)");
        assert_eq!(id.to_string(), "S1");
    }

    #[test]
    fn signal_id_deserialize_validates() {
        let ok: SignalId = serde_json::from_str(r#""S1""#).unwrap();
        assert_eq!(ok, sig("S1"));
        assert!(serde_json::from_str::<SignalId>(r#""""#).is_err());
    }

    #[test]
    fn direction_reversed() {
        assert_eq!(Direction::Up.reversed(), Direction::Down);
        assert_eq!(Direction::Down.reversed(), Direction::Up);
    }

    #[test]
    fn route_accessors() {
        let route = Route::new(sig("A"), sig("B"), Direction::Up)
            .with_blocks(vec![BlockId(1), BlockId(2)]);

        assert_eq!(route.source(), &sig("A"));
        assert_eq!(route.destination(), &sig("B"));
        assert_eq!(route.direction(), Direction::Up);
        assert_eq!(route.blocks(), &[BlockId(1), BlockId(2)]);
        assert_eq!(route.to_string(), "A -> B (up)");
    }
}

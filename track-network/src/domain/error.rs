//! Domain error types.
//!
//! These errors represent rejected mutations, broken invariants and invalid
//! journeys in the core. They are distinct from persistence errors, which
//! live in [`crate::store`].

use std::fmt;

use super::{BlockId, Direction, SignalId};

/// Errors raised by network mutation and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The block id is not owned by the network
    #[error("block {0} is not in the network")]
    UnknownBlock(BlockId),

    /// A block cannot neighbour itself
    #[error("block {0} cannot be connected to itself")]
    SelfConnection(BlockId),

    /// Connecting would give a block more neighbours than its kind allows
    #[error("{kind} {block} already has {limit} neighbours")]
    NeighbourLimit {
        block: BlockId,
        kind: &'static str,
        limit: usize,
    },

    /// A block's neighbour count is not a complete wiring for its kind
    #[error("{kind} {block} has {found} neighbours, expected {expected}")]
    Cardinality {
        block: BlockId,
        kind: &'static str,
        found: usize,
        expected: &'static str,
    },

    /// The neighbour relation is not mirrored on both sides
    #[error("block {from} lists {to} as a neighbour but not the reverse")]
    Asymmetric { from: BlockId, to: BlockId },

    /// The same block id appears more than once
    #[error("block {0} appears more than once")]
    DuplicateBlock(BlockId),

    /// The network splits into more than one connected component
    #[error("network is split into {components} disconnected parts")]
    Disconnected { components: usize },

    /// Every block id has been handed out
    #[error("no block ids left in the network")]
    IdsExhausted,

    /// Two consecutive blocks on a route are not neighbours
    #[error("route cannot pass from block {from} to block {to}: not neighbours")]
    RouteNotTraversable { from: BlockId, to: BlockId },
}

/// Why a pair of consecutive routes cannot form part of one journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyFault {
    /// The next route does not start where the previous one ended
    NotAdjacent { expected: SignalId, found: SignalId },

    /// The next route runs the other way
    DirectionMismatch { expected: Direction, found: Direction },
}

impl fmt::Display for JourneyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JourneyFault::NotAdjacent { expected, found } => {
                write!(f, "expected a route from {expected}, found one from {found}")
            }
            JourneyFault::DirectionMismatch { expected, found } => {
                write!(f, "expected direction {expected}, found {found}")
            }
        }
    }
}

/// Errors raised while assembling a journey.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JourneyError {
    /// The path breaks between route `index - 1` and route `index`
    #[error("invalid journey at route {index}: {fault}")]
    Invalid { index: usize, fault: JourneyFault },

    /// Tried to remove a route from an empty path
    #[error("journey path is empty")]
    EmptyPath,

    /// The id generator has handed out its last id
    #[error("no journey ids left")]
    IdsExhausted,
}

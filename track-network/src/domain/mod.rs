//! Domain types for the track network.
//!
//! This module contains the value types the network engine works with:
//! blocks and their kinds, signals, routes and journeys. Types that carry
//! an invariant enforce it at construction time, so code that receives
//! them can trust their validity.

mod block;
mod error;
mod journey;
mod route;

pub use block::{Block, BlockId, BlockKind, Orientation};
pub use error::{JourneyError, JourneyFault, NetworkError};
pub use journey::{Journey, JourneyBuilder, JourneyId, JourneyIdGenerator};
pub use route::{Direction, InvalidSignalId, Route, SignalId};

//! Railway track network engine.
//!
//! Models a track layout as a graph of sections and points, checks that
//! the layout hangs together, and assembles routes between signals into
//! validated journeys. Editors and other front ends drive it through
//! [`network::Network`] and persist layouts with [`store`].

pub mod domain;
pub mod network;
pub mod store;

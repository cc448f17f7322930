//! Validation configuration and reports.

use std::fmt;

use crate::domain::{BlockId, BlockKind, NetworkError};

/// Which checks [`Network::validate`](super::Network::validate) runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Require every block to be reachable from every other.
    pub check_connectivity: bool,

    /// Require every block to have a complete set of neighbours
    /// (1 or 2 for a section, exactly 3 for a point).
    pub check_cardinality: bool,
}

impl ValidationConfig {
    /// Create a configuration with the given checks enabled.
    pub fn new(check_connectivity: bool, check_cardinality: bool) -> Self {
        Self {
            check_connectivity,
            check_cardinality,
        }
    }

    /// Only check that the network is one connected piece.
    ///
    /// Useful while a layout is still being drawn and many blocks are
    /// expected to be half-wired.
    pub fn connectivity_only() -> Self {
        Self::new(true, false)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_connectivity: true,
            check_cardinality: true,
        }
    }
}

/// A block whose neighbour count is wrong for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityViolation {
    pub block: BlockId,
    pub kind: BlockKind,
    pub found: usize,
}

impl CardinalityViolation {
    pub fn to_error(&self) -> NetworkError {
        NetworkError::Cardinality {
            block: self.block,
            kind: self.kind.label(),
            found: self.found,
            expected: self.kind.expected_neighbours(),
        }
    }
}

impl fmt::Display for CardinalityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_error(), f)
    }
}

/// Outcome of [`Network::validate`](super::Network::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Connected components, each sorted by id. Empty when connectivity
    /// was not checked.
    pub components: Vec<Vec<BlockId>>,

    /// Blocks with the wrong number of neighbours. Empty when cardinality
    /// was not checked.
    pub violations: Vec<CardinalityViolation>,
}

impl ValidationReport {
    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }

    pub fn is_valid(&self) -> bool {
        self.is_connected() && self.violations.is_empty()
    }

    /// Converts the report into the first problem found, if any.
    ///
    /// Disconnection is reported ahead of cardinality.
    pub fn into_result(self) -> Result<(), NetworkError> {
        if !self.is_connected() {
            return Err(NetworkError::Disconnected {
                components: self.components.len(),
            });
        }
        match self.violations.first() {
            Some(violation) => Err(violation.to_error()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return writeln!(f, "network is valid");
        }

        writeln!(f, "network is invalid")?;
        if !self.is_connected() {
            writeln!(f, "{} disconnected parts:", self.components.len())?;
            for component in &self.components {
                let ids: Vec<String> = component.iter().map(|id| id.to_string()).collect();
                writeln!(f, "  [{}]", ids.join(", "))?;
            }
        }
        for violation in &self.violations {
            writeln!(f, "  {violation}")?;
        }
        Ok(())
    }
}

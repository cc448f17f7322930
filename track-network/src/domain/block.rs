//! Block types: the nodes of the track network graph.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a block within a network.
///
/// Ids are assigned by [`Network`](crate::network::Network) when a block is
/// made and never change afterwards. Equality and hashing of blocks go
/// through the id alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Returns the raw id value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation of a point (switch).
///
/// The inverse forms are the mirrored drawings used by the editor. They
/// carry no graph semantics: every point has the same three-way topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Up,
    Down,
    UpInverse,
    DownInverse,
}

impl Orientation {
    /// Returns true for the mirrored forms.
    pub fn is_inverse(self) -> bool {
        matches!(self, Orientation::UpInverse | Orientation::DownInverse)
    }

    /// Returns the mirror image of this orientation.
    pub fn mirrored(self) -> Self {
        match self {
            Orientation::Up => Orientation::UpInverse,
            Orientation::Down => Orientation::DownInverse,
            Orientation::UpInverse => Orientation::Up,
            Orientation::DownInverse => Orientation::Down,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Up => "up",
            Orientation::Down => "down",
            Orientation::UpInverse => "up (inverse)",
            Orientation::DownInverse => "down (inverse)",
        };
        f.write_str(s)
    }
}

/// The variant of a block, with its variant-specific attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// A plain track segment.
    Section,
    /// A switch joining three blocks.
    Point { orientation: Orientation },
}

impl BlockKind {
    /// Most neighbours a block of this kind may ever have.
    pub fn max_neighbours(self) -> usize {
        match self {
            BlockKind::Section => 2,
            BlockKind::Point { .. } => 3,
        }
    }

    /// Returns true if `count` neighbours is a complete wiring for this kind.
    ///
    /// A section needs one neighbour at a line terminus and two otherwise;
    /// a point needs exactly three.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            BlockKind::Section => (1..=2).contains(&count),
            BlockKind::Point { .. } => count == 3,
        }
    }

    /// Human-readable description of the neighbour count [`accepts`](Self::accepts) wants.
    pub fn expected_neighbours(self) -> &'static str {
        match self {
            BlockKind::Section => "1 or 2",
            BlockKind::Point { .. } => "exactly 3",
        }
    }

    /// Short tag used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Section => "Section",
            BlockKind::Point { .. } => "Point",
        }
    }
}

/// A node in the track network.
///
/// Neighbours are held as ids into the owning network rather than as
/// references, so the mutual neighbour relation never forms an ownership
/// cycle. Keeping the relation symmetric is the network's job.
///
/// # Examples
///
/// ```
/// use track_network::domain::{Block, BlockId, Orientation};
///
/// let point = Block::point(BlockId(7), Orientation::Down);
/// assert!(point.is_point());
/// assert_eq!(point.orientation(), Some(Orientation::Down));
/// assert_eq!(point.neighbour_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    neighbours: BTreeSet<BlockId>,
}

impl Block {
    /// Creates a detached block of the given kind.
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            neighbours: BTreeSet::new(),
        }
    }

    /// Creates a detached section.
    pub fn section(id: BlockId) -> Self {
        Self::new(id, BlockKind::Section)
    }

    /// Creates a detached point with the given orientation.
    pub fn point(id: BlockId, orientation: Orientation) -> Self {
        Self::new(id, BlockKind::Point { orientation })
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, BlockKind::Section)
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, BlockKind::Point { .. })
    }

    /// Returns the orientation if this block is a point.
    pub fn orientation(&self) -> Option<Orientation> {
        match self.kind {
            BlockKind::Section => None,
            BlockKind::Point { orientation } => Some(orientation),
        }
    }

    /// Returns the current neighbours.
    ///
    /// Callers must not rely on any particular order.
    pub fn neighbours(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.neighbours.iter().copied()
    }

    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_neighbour(&self, other: BlockId) -> bool {
        self.neighbours.contains(&other)
    }

    /// Returns true if another neighbour can be attached without exceeding
    /// the limit for this kind.
    pub fn has_free_slot(&self) -> bool {
        self.neighbours.len() < self.kind.max_neighbours()
    }

    /// Removes `other` from this block's neighbours.
    ///
    /// Only this side of the edge is touched. Returns whether anything was
    /// removed; removing an absent neighbour is a no-op.
    pub fn remove_neighbour(&mut self, other: BlockId) -> bool {
        self.neighbours.remove(&other)
    }

    pub(crate) fn insert_neighbour(&mut self, other: BlockId) -> bool {
        self.neighbours.insert(other)
    }

    pub(crate) fn clear_neighbours(&mut self) {
        self.neighbours.clear();
    }
}

//! The track network graph.
//!
//! A [`Network`] owns every [`Block`] in an arena keyed by [`BlockId`].
//! Neighbour relations are stored as ids on both blocks of an edge, and
//! every mutation that touches an edge updates both sides, so the relation
//! stays symmetric as long as it is only changed through `Network`.

mod validate;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::domain::{Block, BlockId, NetworkError, Orientation, Route};
use crate::store::{self, StoreError};

pub use validate::{CardinalityViolation, ValidationConfig, ValidationReport};

/// A railway track network: the set of all blocks and how they connect.
///
/// # Examples
///
/// ```
/// use track_network::network::Network;
///
/// let mut network = Network::new();
/// let a = network.make_section().unwrap();
/// let b = network.make_section().unwrap();
/// assert!(!network.is_valid()); // two separate pieces
///
/// network.connect(a, b).unwrap();
/// assert!(network.is_valid());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    blocks: HashMap<BlockId, Block>,
    /// Id handed to the next block made by this network. Held wider than
    /// `BlockId` so that running past the last id is an error, not a wrap.
    next_id: u64,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(blocks: HashMap<BlockId, Block>, next_id: u64) -> Self {
        Self { blocks, next_id }
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the network has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Iterates over all blocks in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Returns all block ids in ascending order.
    pub fn ids(&self) -> Vec<BlockId> {
        let mut ids: Vec<BlockId> = self.blocks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn get(&self, id: BlockId) -> Result<&Block, NetworkError> {
        self.blocks.get(&id).ok_or(NetworkError::UnknownBlock(id))
    }

    fn get_mut(&mut self, id: BlockId) -> Result<&mut Block, NetworkError> {
        self.blocks.get_mut(&id).ok_or(NetworkError::UnknownBlock(id))
    }

    fn fresh_id(&mut self) -> Result<BlockId, NetworkError> {
        let id = u32::try_from(self.next_id).map_err(|_| NetworkError::IdsExhausted)?;
        self.next_id += 1;
        Ok(BlockId(id))
    }

    /// Adds a block to the network.
    ///
    /// Blocks are a set keyed by id: adding an id that is already present
    /// leaves the network unchanged and returns `false`. The block is
    /// inserted with no neighbours; wire it up with [`connect`](Self::connect).
    pub fn add_block(&mut self, mut block: Block) -> bool {
        let id = block.id();
        if self.blocks.contains_key(&id) {
            trace!(block = %id, "Block already present");
            return false;
        }

        block.clear_neighbours();
        self.next_id = self.next_id.max(u64::from(id.get()) + 1);
        debug!(block = %id, kind = block.kind().label(), "Added block");
        self.blocks.insert(id, block);
        true
    }

    /// Removes a block, severing it from all of its neighbours.
    ///
    /// Every neighbour forgets the removed block before it leaves the
    /// network. The returned block still lists its old neighbours; it is no
    /// longer part of any network and should not be added back expecting
    /// those edges to return. Removing an absent id returns `None`.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let block = self.blocks.remove(&id)?;

        for neighbour in block.neighbours() {
            if let Some(other) = self.blocks.get_mut(&neighbour) {
                other.remove_neighbour(id);
            }
        }

        debug!(
            block = %id,
            neighbours = block.neighbour_count(),
            "Removed block"
        );
        Some(block)
    }

    /// Makes a new section, adds it, and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::IdsExhausted`] once every id up to
    /// `u32::MAX` has been handed out or taken by [`add_block`](Self::add_block).
    pub fn make_section(&mut self) -> Result<BlockId, NetworkError> {
        let id = self.fresh_id()?;
        self.blocks.insert(id, Block::section(id));
        debug!(block = %id, "Made section");
        Ok(id)
    }

    /// Makes a new point with the given orientation, adds it, and returns its id.
    ///
    /// Fails like [`make_section`](Self::make_section) when ids run out.
    pub fn make_point(&mut self, orientation: Orientation) -> Result<BlockId, NetworkError> {
        let id = self.fresh_id()?;
        self.blocks.insert(id, Block::point(id, orientation));
        debug!(block = %id, %orientation, "Made point");
        Ok(id)
    }

    /// Connects two blocks as neighbours, on both sides.
    ///
    /// Connecting blocks that are already neighbours is a no-op.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::UnknownBlock`] if either id is not in the network
    /// - [`NetworkError::SelfConnection`] if `a == b`
    /// - [`NetworkError::NeighbourLimit`] if either block is already fully
    ///   wired (two neighbours for a section, three for a point)
    pub fn connect(&mut self, a: BlockId, b: BlockId) -> Result<(), NetworkError> {
        if a == b {
            return Err(NetworkError::SelfConnection(a));
        }

        let block_a = self.get(a)?;
        let block_b = self.get(b)?;

        if block_a.is_neighbour(b) {
            return Ok(());
        }

        for block in [block_a, block_b] {
            if !block.has_free_slot() {
                return Err(NetworkError::NeighbourLimit {
                    block: block.id(),
                    kind: block.kind().label(),
                    limit: block.kind().max_neighbours(),
                });
            }
        }

        self.get_mut(a)?.insert_neighbour(b);
        self.get_mut(b)?.insert_neighbour(a);
        debug!(%a, %b, "Connected blocks");
        Ok(())
    }

    /// Removes the edge between two blocks, on both sides.
    ///
    /// Returns whether an edge was removed.
    pub fn disconnect(&mut self, a: BlockId, b: BlockId) -> Result<bool, NetworkError> {
        self.get(a)?;
        self.get(b)?;

        let removed_a = self.get_mut(a)?.remove_neighbour(b);
        let removed_b = self.get_mut(b)?.remove_neighbour(a);

        if removed_a || removed_b {
            debug!(%a, %b, "Disconnected blocks");
        }
        Ok(removed_a || removed_b)
    }

    /// Returns every block reachable from `start`, including `start`.
    ///
    /// Walks the neighbour relation depth-first with an explicit stack, so
    /// cycles and long lines are both fine. An unknown `start` reaches
    /// nothing.
    pub fn reachable_from(&self, start: BlockId) -> HashSet<BlockId> {
        let mut visited: HashSet<BlockId> = HashSet::new();
        if !self.blocks.contains_key(&start) {
            return visited;
        }

        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            let Some(block) = self.blocks.get(&id) else {
                continue;
            };

            trace!(block = %id, neighbours = block.neighbour_count(), "Visiting block");

            for neighbour in block.neighbours() {
                if !visited.contains(&neighbour) && self.blocks.contains_key(&neighbour) {
                    stack.push(neighbour);
                }
            }
        }

        visited
    }

    /// Returns true if the blocks form a single connected piece of track.
    ///
    /// Traversal starts from an arbitrary block; the answer does not depend
    /// on which one. Networks with zero or one block are valid.
    pub fn is_valid(&self) -> bool {
        let Some(&start) = self.blocks.keys().next() else {
            return true;
        };

        let reached = self.reachable_from(start);
        let valid = self.blocks.keys().all(|id| reached.contains(id));

        debug!(
            blocks = self.blocks.len(),
            reached = reached.len(),
            valid,
            "Checked connectivity"
        );
        valid
    }

    /// Splits the network into its connected components.
    ///
    /// Each component is sorted by id, and components are ordered by their
    /// smallest id.
    pub fn components(&self) -> Vec<Vec<BlockId>> {
        let mut seen: HashSet<BlockId> = HashSet::new();
        let mut components = Vec::new();

        for id in self.ids() {
            if seen.contains(&id) {
                continue;
            }

            let mut component: Vec<BlockId> = self.reachable_from(id).into_iter().collect();
            component.sort_unstable();
            seen.extend(component.iter().copied());
            components.push(component);
        }

        components
    }

    /// Lists every block whose neighbour count is not a complete wiring.
    ///
    /// A section needs one or two neighbours and a point exactly three.
    /// [`connect`](Self::connect) already refuses to exceed those counts;
    /// this pass catches blocks left under-connected.
    pub fn cardinality_violations(&self) -> Vec<CardinalityViolation> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.blocks.get(&id))
            .filter(|block| !block.kind().accepts(block.neighbour_count()))
            .map(|block| CardinalityViolation {
                block: block.id(),
                kind: block.kind(),
                found: block.neighbour_count(),
            })
            .collect()
    }

    /// Runs the checks selected by `config` and reports what it found.
    pub fn validate(&self, config: &ValidationConfig) -> ValidationReport {
        let components = if config.check_connectivity {
            self.components()
        } else {
            Vec::new()
        };

        let violations = if config.check_cardinality {
            self.cardinality_violations()
        } else {
            Vec::new()
        };

        let report = ValidationReport {
            components,
            violations,
        };

        debug!(
            components = report.components.len(),
            violations = report.violations.len(),
            valid = report.is_valid(),
            "Validated network"
        );
        report
    }

    /// Checks that a route can be driven over this network.
    ///
    /// Every block the route records must exist, and each consecutive pair
    /// must be neighbours. Routes that record no blocks pass trivially.
    pub fn check_route(&self, route: &Route) -> Result<(), NetworkError> {
        for &id in route.blocks() {
            self.get(id)?;
        }

        for pair in route.blocks().windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if !self.get(from)?.is_neighbour(to) {
                return Err(NetworkError::RouteNotTraversable { from, to });
            }
        }

        Ok(())
    }

    /// Writes the network as a JSON document. See [`crate::store::save`].
    pub fn save<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        store::save(self, writer)
    }

    /// Reads a network from a JSON document. See [`crate::store::load`].
    pub fn load<R: Read>(reader: R) -> Result<Self, StoreError> {
        store::load(reader)
    }
}

/// Debug listing of every block and its neighbours, sorted by id.
///
/// This is for diagnostics only and is not a stable format.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.ids() {
            let Some(block) = self.blocks.get(&id) else {
                continue;
            };
            let neighbours: Vec<String> = block.neighbours().map(|n| n.to_string()).collect();
            writeln!(
                f,
                "{}[{}] neighbours: [{}]",
                block.kind().label(),
                id,
                neighbours.join(", ")
            )?;
        }
        Ok(())
    }
}

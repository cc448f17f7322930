//! Saving and loading networks as JSON documents.
//!
//! The document lists every block once, sorted by id. Neighbours are
//! written as block ids rather than nested blocks, so loops in the track
//! serialize to a finite document:
//!
//! ```json
//! {
//!   "next_id": 3,
//!   "blocks": [
//!     { "id": 0, "kind": "section", "neighbours": [1] },
//!     { "id": 1, "kind": "point", "orientation": "up", "neighbours": [0, 2] },
//!     { "id": 2, "kind": "section", "neighbours": [1] }
//!   ]
//! }
//! ```
//!
//! Loading checks the document before handing back a [`Network`]: ids must
//! be unique, neighbours must name known blocks and list each other, and no
//! block may exceed the neighbour limit for its kind.

mod error;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::domain::{Block, BlockId, BlockKind, NetworkError};
use crate::network::Network;

pub use error::StoreError;

/// On-disk form of a network.
#[derive(Debug, Serialize, Deserialize)]
struct NetworkDocument {
    /// Id the next made block will get. Older documents may omit it.
    #[serde(default)]
    next_id: u64,
    blocks: Vec<BlockRecord>,
}

/// On-disk form of one block.
#[derive(Debug, Serialize, Deserialize)]
struct BlockRecord {
    id: BlockId,
    #[serde(flatten)]
    kind: BlockKind,
    #[serde(default)]
    neighbours: Vec<BlockId>,
}

impl NetworkDocument {
    fn from_network(network: &Network) -> Self {
        let blocks = network
            .ids()
            .into_iter()
            .filter_map(|id| network.block(id))
            .map(|block| BlockRecord {
                id: block.id(),
                kind: block.kind(),
                neighbours: block.neighbours().collect(),
            })
            .collect();

        Self {
            next_id: network.next_id(),
            blocks,
        }
    }

    /// Checks the document and builds the network it describes.
    ///
    /// Blocks and their neighbours are checked in document order, so a
    /// document with several faults always reports the same one.
    fn into_network(self) -> Result<Network, NetworkError> {
        let mut blocks: HashMap<BlockId, Block> = HashMap::with_capacity(self.blocks.len());
        for record in &self.blocks {
            if blocks
                .insert(record.id, Block::new(record.id, record.kind))
                .is_some()
            {
                return Err(NetworkError::DuplicateBlock(record.id));
            }
        }

        let listed: HashSet<(BlockId, BlockId)> = self
            .blocks
            .iter()
            .flat_map(|r| r.neighbours.iter().map(move |n| (r.id, *n)))
            .collect();

        for record in &self.blocks {
            let from = record.id;
            for &to in &record.neighbours {
                if from == to {
                    return Err(NetworkError::SelfConnection(from));
                }
                if !blocks.contains_key(&to) {
                    return Err(NetworkError::UnknownBlock(to));
                }
                if !listed.contains(&(to, from)) {
                    return Err(NetworkError::Asymmetric { from, to });
                }
                if let Some(block) = blocks.get_mut(&from) {
                    block.insert_neighbour(to);
                }
            }
        }

        for record in &self.blocks {
            let Some(block) = blocks.get(&record.id) else {
                continue;
            };
            if block.neighbour_count() > block.kind().max_neighbours() {
                return Err(NetworkError::NeighbourLimit {
                    block: block.id(),
                    kind: block.kind().label(),
                    limit: block.kind().max_neighbours(),
                });
            }
        }

        let past_largest = blocks
            .keys()
            .map(|id| u64::from(id.get()) + 1)
            .max()
            .unwrap_or(0);

        Ok(Network::from_parts(blocks, self.next_id.max(past_largest)))
    }
}

/// Writes `network` to `writer` as pretty-printed JSON.
pub fn save<W: Write>(network: &Network, mut writer: W) -> Result<(), StoreError> {
    let document = NetworkDocument::from_network(network);

    serde_json::to_writer_pretty(&mut writer, &document).map_err(StoreError::Serialize)?;
    writer
        .flush()
        .map_err(|e| StoreError::Serialize(serde_json::Error::io(e)))?;

    info!(blocks = document.blocks.len(), "Saved network");
    Ok(())
}

/// Reads a network from a JSON document.
///
/// # Errors
///
/// - [`StoreError::Deserialize`] if the input is not a network document
/// - [`StoreError::Inconsistent`] if the document describes an impossible
///   network (dangling or one-sided neighbours, duplicate ids, overfull blocks)
pub fn load<R: Read>(reader: R) -> Result<Network, StoreError> {
    let document: NetworkDocument =
        serde_json::from_reader(reader).map_err(StoreError::Deserialize)?;

    let network = document.into_network().inspect_err(|e| {
        warn!(error = %e, "Rejected network document");
    })?;

    info!(blocks = network.len(), "Loaded network");
    Ok(network)
}

/// Saves `network` to a file, creating parent directories if needed.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it only once complete, so a failed save leaves any previous file
/// intact.
pub fn save_to_path(network: &Network, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(io_error)?;
    }

    let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
    save(network, BufWriter::new(staged.as_file_mut()))?;
    staged.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Loads a network from a file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Network, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Orientation;
    use tempfile::tempdir;

    /// A triangle of points, each with a stub section: every point is fully
    /// wired and the graph contains a cycle.
    fn triangle() -> Network {
        let mut network = Network::new();
        let points: Vec<BlockId> = (0..3)
            .map(|_| network.make_point(Orientation::Up).unwrap())
            .collect();
        network.connect(points[0], points[1]).unwrap();
        network.connect(points[1], points[2]).unwrap();
        network.connect(points[2], points[0]).unwrap();
        for &p in &points {
            let stub = network.make_section().unwrap();
            network.connect(p, stub).unwrap();
        }
        network
    }

    fn roundtrip(network: &Network) -> Network {
        let mut buf = Vec::new();
        save(network, &mut buf).unwrap();
        load(buf.as_slice()).unwrap()
    }

    #[test]
    fn cyclic_network_roundtrips() {
        let network = triangle();
        let loaded = roundtrip(&network);

        assert_eq!(loaded, network);
        assert!(loaded.is_valid());
    }

    #[test]
    fn orientation_survives_roundtrip() {
        let mut network = Network::new();
        let p = network.make_point(Orientation::DownInverse).unwrap();
        let loaded = roundtrip(&network);
        assert_eq!(
            loaded.block(p).unwrap().orientation(),
            Some(Orientation::DownInverse)
        );
    }

    #[test]
    fn made_ids_continue_after_load() {
        let mut network = Network::new();
        let a = network.make_section().unwrap();
        let b = network.make_section().unwrap();
        network.remove_block(b);

        let mut loaded = roundtrip(&network);
        let c = loaded.make_section().unwrap();
        assert!(c > b);
        assert_ne!(c, a);
    }

    #[test]
    fn document_layout() {
        let mut network = Network::new();
        let a = network.make_section().unwrap();
        let p = network.make_point(Orientation::Up).unwrap();
        network.connect(a, p).unwrap();

        let mut buf = Vec::new();
        save(&network, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "next_id": 2,
                "blocks": [
                    { "id": 0, "kind": "section", "neighbours": [1] },
                    { "id": 1, "kind": "point", "orientation": "up", "neighbours": [0] }
                ]
            })
        );
    }

    #[test]
    fn missing_next_id_is_derived() {
        let json = r#"{ "blocks": [ { "id": 4, "kind": "section" } ] }"#;
        let mut network = load(json.as_bytes()).unwrap();
        assert_eq!(network.make_section().unwrap(), BlockId(5));
    }

    #[test]
    fn malformed_input_is_deserialize_error() {
        let err = load("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Deserialize(_)));

        let err = load(r#"{ "blocks": [ { "id": 0, "kind": "bridge" } ] }"#.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Deserialize(_)));
    }

    #[test]
    fn rejects_dangling_neighbour() {
        let json = r#"{ "blocks": [ { "id": 0, "kind": "section", "neighbours": [9] } ] }"#;
        let err = load(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Inconsistent(NetworkError::UnknownBlock(BlockId(9)))
        ));
    }

    #[test]
    fn rejects_one_sided_neighbour() {
        let json = r#"{ "blocks": [
            { "id": 0, "kind": "section", "neighbours": [1] },
            { "id": 1, "kind": "section", "neighbours": [] }
        ] }"#;
        let err = load(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Inconsistent(NetworkError::Asymmetric {
                from: BlockId(0),
                to: BlockId(1)
            })
        ));
    }

    #[test]
    fn rejects_duplicate_ids_and_self_loops() {
        let json = r#"{ "blocks": [
            { "id": 0, "kind": "section" },
            { "id": 0, "kind": "section" }
        ] }"#;
        assert!(matches!(
            load(json.as_bytes()),
            Err(StoreError::Inconsistent(NetworkError::DuplicateBlock(BlockId(0))))
        ));

        let json = r#"{ "blocks": [ { "id": 0, "kind": "section", "neighbours": [0] } ] }"#;
        assert!(matches!(
            load(json.as_bytes()),
            Err(StoreError::Inconsistent(NetworkError::SelfConnection(BlockId(0))))
        ));
    }

    #[test]
    fn rejects_overfull_section() {
        let json = r#"{ "blocks": [
            { "id": 0, "kind": "section", "neighbours": [1, 2, 3] },
            { "id": 1, "kind": "section", "neighbours": [0] },
            { "id": 2, "kind": "section", "neighbours": [0] },
            { "id": 3, "kind": "section", "neighbours": [0] }
        ] }"#;
        assert!(matches!(
            load(json.as_bytes()),
            Err(StoreError::Inconsistent(NetworkError::NeighbourLimit { limit: 2, .. }))
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("network.json");
        let network = triangle();

        save_to_path(&network, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();

        assert_eq!(loaded, network);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("network.json");

        save_to_path(&triangle(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_replaces_existing_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("network.json");

        let mut small = Network::new();
        small.make_section().unwrap();
        save_to_path(&triangle(), &path).unwrap();
        save_to_path(&small, &path).unwrap();

        assert_eq!(load_from_path(&path).unwrap(), small);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_save_leaves_no_staged_file() {
        let dir = tempdir().unwrap();
        // A directory cannot be replaced by the finished document
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let err = save_to_path(&triangle(), &path).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(path.is_dir());
    }

    #[test]
    fn largest_id_loads_but_exhausts_made_ids() {
        let json = r#"{ "blocks": [ { "id": 4294967295, "kind": "section" } ] }"#;
        let mut network = load(json.as_bytes()).unwrap();

        assert!(network.contains(BlockId(u32::MAX)));
        assert_eq!(network.make_section(), Err(NetworkError::IdsExhausted));
        assert_eq!(network.len(), 1);
    }

    #[test]
    fn oversized_next_id_exhausts_made_ids() {
        let json = r#"{ "next_id": 18446744073709551615, "blocks": [] }"#;
        let mut network = load(json.as_bytes()).unwrap();
        assert_eq!(network.make_section(), Err(NetworkError::IdsExhausted));
    }

    #[test]
    fn first_fault_in_document_order_is_reported() {
        // Block 0 has a dangling neighbour, block 1 a one-sided one, block 2
        // points at itself.
        let json = r#"{ "blocks": [
            { "id": 0, "kind": "section", "neighbours": [7] },
            { "id": 1, "kind": "section", "neighbours": [3] },
            { "id": 2, "kind": "section", "neighbours": [2] },
            { "id": 3, "kind": "section", "neighbours": [] }
        ] }"#;

        for _ in 0..20 {
            let err = load(json.as_bytes()).unwrap_err();
            assert!(matches!(
                err,
                StoreError::Inconsistent(NetworkError::UnknownBlock(BlockId(7)))
            ));
        }
    }

    #[test]
    fn overfull_blocks_reported_in_document_order() {
        let json = r#"{ "blocks": [
            { "id": 9, "kind": "section", "neighbours": [1, 2, 3] },
            { "id": 0, "kind": "section", "neighbours": [1, 2, 3] },
            { "id": 1, "kind": "point", "orientation": "up", "neighbours": [9, 0] },
            { "id": 2, "kind": "point", "orientation": "up", "neighbours": [9, 0] },
            { "id": 3, "kind": "point", "orientation": "up", "neighbours": [9, 0] }
        ] }"#;

        for _ in 0..20 {
            assert!(matches!(
                load(json.as_bytes()),
                Err(StoreError::Inconsistent(NetworkError::NeighbourLimit {
                    block: BlockId(9),
                    ..
                }))
            ));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_path("/nonexistent/path/network.json").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn network_methods_delegate() {
        let network = triangle();
        let mut buf = Vec::new();
        network.save(&mut buf).unwrap();
        assert_eq!(Network::load(buf.as_slice()).unwrap(), network);
    }
}

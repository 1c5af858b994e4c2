use super::{Error, Scene, SparseStore, SIZE_OF_KIDOKU_TABLE};
use crate::error;
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, Error>;

/// ## Already-read tracking
///
/// One lazily allocated bit per kidoku marker of each scene.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KidokuTable {
    scenes: BTreeMap<Scene, SparseStore<()>>,
}

impl KidokuTable {
    pub fn new() -> KidokuTable {
        KidokuTable::default()
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    pub fn record(&mut self, scene: Scene, offset: usize) -> Result<()> {
        if offset >= SIZE_OF_KIDOKU_TABLE {
            return Err(error!(IndexOutOfRange; &format!("KIDOKU MARKER {}", offset)));
        }
        self.scenes
            .entry(scene)
            .or_insert_with(|| SparseStore::new(SIZE_OF_KIDOKU_TABLE))
            .set(offset, ())
    }

    pub fn has_been_read(&self, scene: Scene, offset: usize) -> bool {
        match self.scenes.get(&scene) {
            Some(markers) => markers.is_allocated(offset),
            None => false,
        }
    }

    /// Read markers grouped by scene, both in ascending order.
    pub fn entries(&self) -> impl Iterator<Item = (Scene, Vec<usize>)> + '_ {
        self.scenes
            .iter()
            .map(|(scene, markers)| (*scene, markers.allocated().map(|(i, _)| i).collect()))
    }
}

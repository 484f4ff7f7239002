use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::cell::{bubble_key, KeyCell};
use crate::error::Result;
use crate::params::{GeometryParameters, ScrewMask};

/// Key cells already built for one parameter set, by screw mask. The cache
/// owns its parameters so a cell is never served for the wrong ones.
#[derive(Debug)]
pub struct CellCache {
    params: GeometryParameters,
    cells: HashMap<ScrewMask, KeyCell>,
    hits: usize,
    misses: usize,
}

impl CellCache {
    pub fn new(params: GeometryParameters) -> Self {
        Self {
            params,
            cells: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// The cell for `screws`, built on first request.
    pub fn get_or_build(&mut self, screws: ScrewMask) -> Result<&KeyCell> {
        match self.cells.entry(screws) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                debug!(screws = screws.bits(), "cell cache miss");
                Ok(entry.insert(bubble_key(&self.params, screws)?))
            }
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

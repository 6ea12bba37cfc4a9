//! Canonical set construction.
//!
//! Scans a [`CellGrid`] in row-major order and keeps the first cell of every
//! flip-equivalence class. Every grid position records which canonical cell it
//! reduces to and the transform that maps the canonical cell onto it.
//!
//! Canonical cells are bucketed by a hash of their smallest variant. All four
//! variants of a cell share that smallest variant, so any cell equal to a
//! canonical cell under some transform lands in the same bucket, and scanning
//! a bucket in insertion order gives the same answer as scanning every
//! canonical cell.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hasher;

use twox_hash::XxHash64;

use super::{variants::flip_variants, Cell, CellGrid, Transform};

/// How a grid position is reconstructed from the canonical cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub canonical_index: usize,
    /// Applying this transform to the canonical cell yields the original cell
    pub transform: Transform,
}

#[derive(Clone, Debug)]
pub struct CanonicalSet {
    /// Four variants per canonical cell, indexed by [`Transform::index`]
    variants: Vec<[Cell; 4]>,
    /// One entry per grid position; `None` for cells dropped as unused
    resolutions: Vec<Option<Resolution>>,
    buckets: HashMap<u64, Vec<usize>>,
}

impl CanonicalSet {
    fn with_capacity(positions: usize) -> Self {
        CanonicalSet {
            variants: Vec::new(),
            resolutions: Vec::with_capacity(positions),
            buckets: HashMap::new(),
        }
    }

    /// Number of canonical cells
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of grid positions the set was built from
    pub fn original_count(&self) -> usize {
        self.resolutions.len()
    }

    /// True when no cell could be merged or dropped.
    pub fn is_already_minimal(&self) -> bool {
        self.len() == self.original_count()
    }

    /// The canonical cell itself, as first encountered in the grid.
    pub fn canonical(&self, index: usize) -> &Cell {
        &self.variants[index][Transform::Identity.index()]
    }

    pub fn variants(&self, index: usize) -> &[Cell; 4] {
        &self.variants[index]
    }

    pub fn canonical_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.variants
            .iter()
            .map(|variants| &variants[Transform::Identity.index()])
    }

    /// Resolution record for a grid position, if the position was kept.
    pub fn resolution(&self, position: usize) -> Option<Resolution> {
        self.resolutions.get(position).copied().flatten()
    }

    pub fn resolutions(&self) -> &[Option<Resolution>] {
        &self.resolutions
    }

    /// Finds the canonical cell `cell` is equal to under some transform.
    ///
    /// Canonical cells are tried in insertion order and, for each, the
    /// variants in [`Transform::ALL`] order. The first match wins.
    pub fn find(&self, cell: &Cell) -> Option<Resolution> {
        let bucket = self.buckets.get(&class_hash(cell))?;
        bucket.iter().find_map(|&canonical_index| {
            Transform::ALL
                .iter()
                .find(|t| self.variants[canonical_index][t.index()] == *cell)
                .map(|&transform| Resolution {
                    canonical_index,
                    transform,
                })
        })
    }

    /// Resolves `cell`, adding it as a new canonical cell when nothing matches.
    fn insert(&mut self, cell: &Cell) -> Resolution {
        if let Some(found) = self.find(cell) {
            return found;
        }

        let canonical_index = self.variants.len();
        let variants = flip_variants(cell);
        match self.buckets.entry(smallest_variant_hash(&variants)) {
            Entry::Occupied(mut entry) => entry.get_mut().push(canonical_index),
            Entry::Vacant(entry) => {
                entry.insert(vec![canonical_index]);
            }
        }
        self.variants.push(variants);

        Resolution {
            canonical_index,
            transform: Transform::Identity,
        }
    }
}

/// Builds the canonical set of every cell in `grid`.
pub fn build_canonical_set(grid: &CellGrid) -> CanonicalSet {
    build_canonical_set_filtered(grid, |_| true)
}

/// Builds the canonical set of the cells for which `in_use(position)` holds.
/// Other positions are dropped and get no resolution record.
pub fn build_canonical_set_filtered<F>(grid: &CellGrid, mut in_use: F) -> CanonicalSet
where
    F: FnMut(usize) -> bool,
{
    let mut set = CanonicalSet::with_capacity(grid.len());

    for (position, cell) in grid.cells().iter().enumerate() {
        let resolution = if in_use(position) {
            Some(set.insert(cell))
        } else {
            None
        };
        set.resolutions.push(resolution);
    }

    set
}

fn class_hash(cell: &Cell) -> u64 {
    smallest_variant_hash(&flip_variants(cell))
}

/// Hash of the lexicographically smallest variant, over colour channels only
fn smallest_variant_hash(variants: &[Cell; 4]) -> u64 {
    let smallest = variants
        .iter()
        .min_by(|a, b| a.colour_key().cmp(b.colour_key()))
        .unwrap_or(&variants[0]);

    let mut hasher = XxHash64::default();
    for rgb in smallest.colour_key() {
        hasher.write(&rgb);
    }
    hasher.finish()
}

use glam::{dvec3, DAffine3, DVec3};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::CellCache;
use crate::error::Result;
use crate::params::ScrewMask;
use crate::primitives::box_at;
use crate::ranked::{combine, merge_ranked, RankedShell};
use crate::shape::Shape;

// Debug marker dimensions (mm)
const MARKER_RADIUS: f64 = 2.;
const MARKER_BAR_XYZ: DVec3 = DVec3::new(10., 1., 1.);

/// What to build at a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementType {
    /// A bubble key with hardware at the positions in `screws`.
    Key { screws: ScrewMask },
    /// Sphere at the placement origin.
    Debug1,
    /// Bar along the placement's +X axis.
    Debug2,
    /// Bar along the placement's +Y axis.
    Debug3,
}

/// One physical location, as handed over by the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: PlacementType,
    pub transform: DAffine3,
}

/// How the placed cells are folded into the two shells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    /// Fold every cell on its own, then union the results.
    #[default]
    PerCell,
    /// Merge all cells rank by rank before folding, so the holes of a cell
    /// also clear its neighbours.
    Interleaved,
}

/// Ranked shells of one placement, with the transform that puts them in
/// place.
#[derive(Debug, Clone)]
pub struct PlacedCell {
    pub top: RankedShell,
    pub bottom: RankedShell,
    pub transform: DAffine3,
}

impl PlacedCell {
    pub fn placed_top(&self) -> RankedShell {
        self.top.transformed(&self.transform)
    }

    pub fn placed_bottom(&self) -> RankedShell {
        self.bottom.transformed(&self.transform)
    }
}

/// The two printed parts. They never share material.
#[derive(Debug, Clone)]
pub struct KeyboardShell {
    pub front: Shape,
    pub back: Shape,
}

fn marker(kind: PlacementType) -> Result<RankedShell> {
    let shape = match kind {
        PlacementType::Debug1 => Shape::sphere(MARKER_RADIUS)?,
        PlacementType::Debug2 => box_at(MARKER_BAR_XYZ, 0., dvec3(MARKER_BAR_XYZ.x / 2., 0., 0.))?,
        PlacementType::Debug3 => box_at(
            dvec3(MARKER_BAR_XYZ.y, MARKER_BAR_XYZ.x, MARKER_BAR_XYZ.z),
            0.,
            dvec3(0., MARKER_BAR_XYZ.x / 2., 0.),
        )?,
        PlacementType::Key { .. } => Shape::void(),
    };
    Ok(RankedShell::new().with_layer("marker", vec![], vec![shape]))
}

pub struct Keyboard {
    cells: Vec<PlacedCell>,
}

impl Keyboard {
    /// Build (or fetch from `cache`) the cell of every placement, in order.
    pub fn new(placements: &[Placement], cache: &mut CellCache) -> Result<Self> {
        let cells = placements
            .iter()
            .map(|placement| {
                let (top, bottom) = match placement.kind {
                    PlacementType::Key { screws } => {
                        let cell = cache.get_or_build(screws)?;
                        (cell.top.clone(), cell.bottom.clone())
                    }
                    kind => {
                        let marker = marker(kind)?;
                        (marker.clone(), marker)
                    }
                };
                Ok(PlacedCell {
                    top,
                    bottom,
                    transform: placement.transform,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            placements = cells.len(),
            distinct_keys = cache.len(),
            cache_hits = cache.hits(),
            "placed cells"
        );
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[PlacedCell] {
        &self.cells
    }

    /// Fold all cells into the front shell, and everything of the back
    /// halves that the front shell does not already occupy into the back
    /// shell.
    pub fn shell(&self, composition: Composition) -> KeyboardShell {
        let tops: Vec<RankedShell> = self.cells.iter().map(PlacedCell::placed_top).collect();
        let bottoms: Vec<RankedShell> = self.cells.iter().map(PlacedCell::placed_bottom).collect();
        let (front, bottom_raw) = match composition {
            Composition::PerCell => (
                combine(tops.iter().map(RankedShell::shape)),
                combine(bottoms.iter().map(RankedShell::shape)),
            ),
            Composition::Interleaved => (
                merge_ranked(&tops).shape(),
                merge_ranked(&bottoms).shape(),
            ),
        };
        debug!(?composition, cells = self.cells.len(), "assembled keyboard shell");
        KeyboardShell {
            back: bottom_raw.difference(&front),
            front,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::sample_parameters;

    fn key(bits: u64, offset: DVec3) -> Placement {
        Placement {
            kind: PlacementType::Key {
                screws: ScrewMask::new(bits).unwrap(),
            },
            transform: DAffine3::from_translation(offset),
        }
    }

    fn probe_points() -> Vec<DVec3> {
        let mut points = Vec::new();
        for i in -14..=26 {
            for j in -8..=8 {
                for k in -20..=3 {
                    points.push(dvec3(f64::from(i) * 1.9, f64::from(j) * 2.3, f64::from(k) * 1.7));
                }
            }
        }
        points
    }

    #[test]
    fn no_placements_give_void_shells() {
        let mut cache = CellCache::new(sample_parameters());
        let keyboard = Keyboard::new(&[], &mut cache).unwrap();
        for composition in [Composition::PerCell, Composition::Interleaved] {
            let shell = keyboard.shell(composition);
            assert!(shell.front.is_void());
            assert!(shell.back.is_void());
        }
    }

    #[test]
    fn front_and_back_never_overlap() {
        let mut cache = CellCache::new(sample_parameters());
        let placements = [
            key(0b0101, DVec3::ZERO),
            key(0b1010, dvec3(18., 0., 0.)),
            key(0b0101, dvec3(36., 0., 2.)),
        ];
        let keyboard = Keyboard::new(&placements, &mut cache).unwrap();
        for composition in [Composition::PerCell, Composition::Interleaved] {
            let shell = keyboard.shell(composition);
            assert!(!shell.front.is_void());
            assert!(!shell.back.is_void());
            let points = probe_points();
            assert!(points.iter().any(|p| shell.back.contains(*p)));
            for point in points {
                assert!(
                    !(shell.front.contains(point) && shell.back.contains(point)),
                    "{point} in both shells"
                );
            }
        }
    }

    #[test]
    fn identical_keys_share_one_cell() {
        let mut cache = CellCache::new(sample_parameters());
        let placements = [
            key(0b0101, DVec3::ZERO),
            key(0b0101, dvec3(18., 0., 0.)),
            key(0b0101, dvec3(36., 0., 0.)),
            key(0, dvec3(54., 0., 0.)),
        ];
        let keyboard = Keyboard::new(&placements, &mut cache).unwrap();
        assert_eq!(keyboard.cells().len(), 4);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn cells_are_moved_into_place() {
        let mut cache = CellCache::new(sample_parameters());
        let keyboard = Keyboard::new(&[key(0, dvec3(40., 0., 0.))], &mut cache).unwrap();
        let shell = keyboard.shell(Composition::PerCell);
        // Switch hole at the new origin, plate around it.
        assert!(!shell.front.contains(dvec3(40., 0., -6.75)));
        assert!(shell.front.contains(dvec3(47.3, 0., -6.75)));
        assert!(!shell.front.contains(dvec3(7.3, 0., -6.75)));
    }

    #[test]
    fn interleaving_lets_holes_clear_neighbours() {
        let mut cache = CellCache::new(sample_parameters());
        let placements = [key(0, DVec3::ZERO), key(0, dvec3(18., 0., 0.))];
        let keyboard = Keyboard::new(&placements, &mut cache).unwrap();
        let switch_hole = dvec3(0., 0., -6.75);
        // The neighbour's sphere reaches into this key's switch hole.
        assert!(keyboard.shell(Composition::PerCell).front.contains(switch_hole));
        assert!(!keyboard
            .shell(Composition::Interleaved)
            .front
            .contains(switch_hole));
    }

    #[test]
    fn markers_are_placed_in_both_halves() {
        let mut cache = CellCache::new(sample_parameters());
        let placements = [
            Placement {
                kind: PlacementType::Debug1,
                transform: DAffine3::from_translation(dvec3(0., 0., 50.)),
            },
            Placement {
                kind: PlacementType::Debug2,
                transform: DAffine3::from_translation(dvec3(0., 0., 60.)),
            },
            Placement {
                kind: PlacementType::Debug3,
                transform: DAffine3::from_translation(dvec3(0., 0., 70.)),
            },
        ];
        let keyboard = Keyboard::new(&placements, &mut cache).unwrap();
        assert!(cache.is_empty());
        let cell = &keyboard.cells()[0];
        assert!(cell.placed_bottom().shape().contains(dvec3(0., 0., 50.)));
        let shell = keyboard.shell(Composition::PerCell);
        assert!(shell.front.contains(dvec3(0., 0., 50.)));
        assert!(shell.front.contains(dvec3(8., 0., 60.)));
        assert!(!shell.front.contains(dvec3(0., 8., 60.)));
        assert!(shell.front.contains(dvec3(0., 8., 70.)));
        // The back half only keeps what the front does not cover.
        assert!(!shell.back.contains(dvec3(0., 0., 50.)));
    }

    #[test]
    fn a_bad_key_aborts_the_whole_keyboard() {
        let mut params = sample_parameters();
        params.lane_width = -1.;
        let mut cache = CellCache::new(params);
        assert!(Keyboard::new(&[key(0, DVec3::ZERO)], &mut cache).is_err());
    }
}

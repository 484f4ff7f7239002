// Each layer adds its solids to everything built so far, then removes its
// holes. A hole never cuts material added at a higher rank.

use glam::DAffine3;
use tracing::trace;

use crate::shape::Shape;

/// Holes and solids applied together at one rank.
#[derive(Debug, Clone, Default)]
pub struct RankedLayer {
    pub name: &'static str,
    pub holes: Vec<Shape>,
    pub solids: Vec<Shape>,
}

impl RankedLayer {
    pub fn new(name: &'static str, holes: Vec<Shape>, solids: Vec<Shape>) -> Self {
        Self {
            name,
            holes,
            solids,
        }
    }

    fn transformed(&self, transform: &DAffine3) -> Self {
        Self {
            name: self.name,
            holes: self.holes.iter().map(|s| s.transform(transform)).collect(),
            solids: self.solids.iter().map(|s| s.transform(transform)).collect(),
        }
    }
}

/// N-ary union. Combining nothing gives void.
pub fn combine(shapes: impl IntoIterator<Item = Shape>) -> Shape {
    Shape::union_all(shapes)
}

/// Fold layers from the lowest rank to the highest, starting from void.
pub fn apply_ranks(layers: &[RankedLayer]) -> Shape {
    layers.iter().fold(Shape::void(), |accumulator, layer| {
        trace!(
            layer = layer.name,
            holes = layer.holes.len(),
            solids = layer.solids.len(),
            "applying rank"
        );
        let solids = combine(layer.solids.iter().cloned());
        let holes = combine(layer.holes.iter().cloned());
        accumulator.union(&solids).difference(&holes)
    })
}

/// A named, ordered sequence of layers; the rank of a layer is its position.
#[derive(Debug, Clone, Default)]
pub struct RankedShell {
    layers: Vec<RankedLayer>,
}

impl RankedShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer above every existing one.
    pub fn with_layer(mut self, name: &'static str, holes: Vec<Shape>, solids: Vec<Shape>) -> Self {
        self.layers.push(RankedLayer::new(name, holes, solids));
        self
    }

    pub fn layers(&self) -> &[RankedLayer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&RankedLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn transformed(&self, transform: &DAffine3) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .map(|layer| layer.transformed(transform))
                .collect(),
        }
    }

    /// The composed volume.
    pub fn shape(&self) -> Shape {
        apply_ranks(&self.layers)
    }
}

/// Merge shells rank by rank: rank `i` of the result holds the holes and
/// solids of rank `i` of every input. Folding the merged shell lets the holes
/// of one cell clear the material its neighbours built at the same or a lower
/// rank. Layer names come from the first shell that has that rank.
pub fn merge_ranked<'a>(shells: impl IntoIterator<Item = &'a RankedShell>) -> RankedShell {
    let mut merged: Vec<RankedLayer> = Vec::new();
    for shell in shells {
        for (rank, layer) in shell.layers.iter().enumerate() {
            if rank == merged.len() {
                merged.push(RankedLayer::new(layer.name, Vec::new(), Vec::new()));
            }
            merged[rank].holes.extend(layer.holes.iter().cloned());
            merged[rank].solids.extend(layer.solids.iter().cloned());
        }
    }
    RankedShell { layers: merged }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{dvec3, DVec3};

    fn ball(radius: f64, x: f64) -> Shape {
        Shape::sphere(radius).unwrap().translate(dvec3(x, 0., 0.))
    }

    #[test]
    fn no_layers_is_void() {
        assert!(apply_ranks(&[]).is_void());
        assert!(RankedShell::new().shape().is_void());
        assert!(combine([]).is_void());
    }

    #[test]
    fn holes_cut_lower_ranks_but_not_higher_ones() {
        let big = ball(2., 0.);
        let core = ball(1., 0.);
        let pin = ball(0.5, 0.);

        // Hole above the solid: the core is removed.
        let cut = RankedShell::new()
            .with_layer("body", vec![], vec![big.clone()])
            .with_layer("bore", vec![core.clone()], vec![]);
        assert!(!cut.shape().contains(DVec3::ZERO));

        // A solid at a higher rank survives the hole below it.
        let refilled = cut.clone().with_layer("pin", vec![], vec![pin.clone()]);
        assert!(refilled.shape().contains(DVec3::ZERO));

        // Same contributions with the ranks swapped is a different part.
        let swapped = RankedShell::new()
            .with_layer("bore", vec![core], vec![])
            .with_layer("body", vec![], vec![big]);
        assert!(swapped.shape().contains(DVec3::ZERO));
    }

    #[test]
    fn within_a_rank_holes_win_over_solids() {
        let shell = RankedShell::new().with_layer("only", vec![ball(1., 0.)], vec![ball(2., 0.)]);
        assert!(!shell.shape().contains(DVec3::ZERO));
        assert!(shell.shape().contains(dvec3(1.5, 0., 0.)));
    }

    #[test]
    fn combine_is_associative() {
        let (a, b, c) = (ball(1., 0.), ball(1., 1.5), ball(1., -1.2));
        let flat = combine([a.clone(), b.clone(), c.clone()]);
        let nested = combine([combine([a, b]), c]);
        for x in [-3., -2.1, -1., -0.3, 0., 0.7, 1.4, 2.2, 3.] {
            for y in [-0.9, 0., 0.4] {
                let point = dvec3(x, y, 0.25);
                assert_eq!(flat.evaluate(point), nested.evaluate(point));
            }
        }
    }

    #[test]
    fn layers_are_found_by_name() {
        let shell = RankedShell::new()
            .with_layer("first", vec![], vec![ball(1., 0.)])
            .with_layer("second", vec![], vec![]);
        assert_eq!(shell.layers().len(), 2);
        assert_eq!(shell.layer("first").unwrap().solids.len(), 1);
        assert!(shell.layer("third").is_none());
    }

    #[test]
    fn transformed_shell_moves_every_layer() {
        let shell = RankedShell::new()
            .with_layer("body", vec![ball(0.5, 0.)], vec![ball(1., 0.)])
            .transformed(&DAffine3::from_translation(dvec3(10., 0., 0.)));
        let shape = shell.shape();
        assert!(!shape.contains(dvec3(10., 0., 0.)));
        assert!(shape.contains(dvec3(10.75, 0., 0.)));
        assert!(!shape.contains(dvec3(0.75, 0., 0.)));
    }

    #[test]
    fn merged_holes_reach_neighbouring_cells() {
        let left = RankedShell::new()
            .with_layer("body", vec![], vec![ball(2., 0.)])
            .with_layer("bore", vec![ball(0.5, 1.5)], vec![]);
        let right = RankedShell::new().with_layer("body", vec![], vec![ball(2., 3.)]);

        // Folded separately, the right cell fills the left cell's bore.
        let separate = combine([left.shape(), right.shape()]);
        assert!(separate.contains(dvec3(1.5, 0., 0.)));

        // Folded together, the bore cuts through both.
        let merged = merge_ranked([&left, &right]);
        assert_eq!(merged.layers().len(), 2);
        assert_eq!(merged.layers()[0].solids.len(), 2);
        assert!(!merged.shape().contains(dvec3(1.5, 0., 0.)));
        assert!(merged.shape().contains(dvec3(4., 0., 0.)));
    }
}

//! Signed distance shapes and their boolean algebra.
//!
//! A [`Shape`] is an immutable SDF volume: evaluating it at a point gives the
//! signed distance to its surface, negative inside. Shapes share their nodes,
//! so cloning one is cheap and every operation returns a new value.
//!
//! Void (the empty volume) is a first-class shape. It evaluates to positive
//! infinity everywhere, is the identity of union and absorbs intersection.

use std::sync::Arc;

use glam::{dvec3, DAffine3, DVec2, DVec3};

use crate::error::{Error, Result};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin.
    pub fn centered(half_extents: DVec3) -> Self {
        Self::new(-half_extents, half_extents)
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Overlap of two boxes, `None` when they are disjoint.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(Aabb::new(min, max))
        } else {
            None
        }
    }

    fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            dvec3(a.x, a.y, a.z),
            dvec3(b.x, a.y, a.z),
            dvec3(a.x, b.y, a.z),
            dvec3(b.x, b.y, a.z),
            dvec3(a.x, a.y, b.z),
            dvec3(b.x, a.y, b.z),
            dvec3(a.x, b.y, b.z),
            dvec3(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this one after a transform.
    pub fn transformed(&self, transform: &DAffine3) -> Aabb {
        let corners = self.corners().map(|corner| transform.transform_point3(corner));
        let mut bounds = Aabb::new(corners[0], corners[0]);
        for corner in &corners[1..] {
            bounds = Aabb::new(bounds.min.min(*corner), bounds.max.max(*corner));
        }
        bounds
    }

    /// Tighten the box to the side of a plane the normal points to. Only
    /// axis-aligned planes tighten; any other plane keeps the box as is.
    fn clipped(&self, point: DVec3, normal: DVec3) -> Option<Aabb> {
        let mut clipped = *self;
        for axis in 0..3 {
            if (0..3).any(|other| other != axis && normal[other] != 0.) {
                continue;
            }
            if normal[axis] > 0. {
                clipped.min[axis] = clipped.min[axis].max(point[axis]);
            } else if normal[axis] < 0. {
                clipped.max[axis] = clipped.max[axis].min(point[axis]);
            }
        }
        if clipped.min.cmple(clipped.max).all() {
            Some(clipped)
        } else {
            None
        }
    }
}

/// Two dimensional cross-section used for extrusions.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    /// Rectangle centered on the origin with rounded corners.
    RoundedRect { half_size: DVec2, round: f64 },
}

impl Profile {
    /// Rectangle of full `size` whose corners are rounded by `round`.
    pub fn rounded_rect(size: DVec2, round: f64) -> Result<Self> {
        if !(size.x > 0. && size.y > 0.) {
            return Err(Error::primitive(
                "rectangle",
                format!("size must be positive, got {} x {}", size.x, size.y),
            ));
        }
        check_round("rectangle", round, size.min_element())?;
        Ok(Self::RoundedRect {
            half_size: size / 2.,
            round,
        })
    }

    pub fn evaluate(&self, point: DVec2) -> f64 {
        match self {
            Profile::RoundedRect { half_size, round } => {
                let q = point.abs() - (*half_size - DVec2::splat(*round));
                q.max(DVec2::ZERO).length() + q.max_element().min(0.) - round
            }
        }
    }

    fn half_extents(&self) -> DVec2 {
        match self {
            Profile::RoundedRect { half_size, .. } => *half_size,
        }
    }
}

#[derive(Debug)]
enum Node {
    Sphere {
        radius: f64,
    },
    Cylinder {
        radius: f64,
        half_height: f64,
        round: f64,
    },
    Cuboid {
        half_size: DVec3,
        round: f64,
    },
    Extrusion {
        profile: Profile,
        half_height: f64,
    },
    Union(Vec<Shape>),
    Intersection(Shape, Shape),
    Difference(Shape, Shape),
    Cut {
        shape: Shape,
        point: DVec3,
        normal: DVec3,
    },
    Transform {
        shape: Shape,
        forward: DAffine3,
        inverse: DAffine3,
    },
}

/// An immutable signed distance volume.
#[derive(Debug, Clone, Default)]
pub struct Shape(Option<Arc<Node>>);

fn check_round(primitive: &'static str, round: f64, smallest_dimension: f64) -> Result<()> {
    if !(round >= 0.) {
        return Err(Error::primitive(
            primitive,
            format!("rounding must be non-negative, got {round}"),
        ));
    }
    if round > smallest_dimension / 2. {
        return Err(Error::primitive(
            primitive,
            format!(
                "rounding {round} exceeds half the smallest dimension {smallest_dimension}"
            ),
        ));
    }
    Ok(())
}

impl Shape {
    fn node(node: Node) -> Self {
        Self(Some(Arc::new(node)))
    }

    /// The empty volume.
    pub fn void() -> Self {
        Self(None)
    }

    pub fn is_void(&self) -> bool {
        self.0.is_none()
    }

    /// Sphere centered on the origin.
    pub fn sphere(radius: f64) -> Result<Self> {
        if !(radius > 0.) {
            return Err(Error::primitive(
                "sphere",
                format!("radius must be positive, got {radius}"),
            ));
        }
        Ok(Self::node(Node::Sphere { radius }))
    }

    /// Cylinder centered on the origin along Z, with rounded rims.
    pub fn cylinder(height: f64, radius: f64, round: f64) -> Result<Self> {
        if !(height > 0. && radius > 0.) {
            return Err(Error::primitive(
                "cylinder",
                format!("height and radius must be positive, got {height} and {radius}"),
            ));
        }
        check_round("cylinder", round, height.min(2. * radius))?;
        Ok(Self::node(Node::Cylinder {
            radius,
            half_height: height / 2.,
            round,
        }))
    }

    /// Box of full `size` centered on the origin, with rounded edges.
    pub fn cuboid(size: DVec3, round: f64) -> Result<Self> {
        if !size.cmpgt(DVec3::ZERO).all() {
            return Err(Error::primitive(
                "box",
                format!("size must be positive, got {size}"),
            ));
        }
        check_round("box", round, size.min_element())?;
        Ok(Self::node(Node::Cuboid {
            half_size: size / 2.,
            round,
        }))
    }

    /// Extrude a profile along Z, centered on the origin.
    pub fn extrude(profile: Profile, height: f64) -> Result<Self> {
        if !(height > 0.) {
            return Err(Error::primitive(
                "extrusion",
                format!("height must be positive, got {height}"),
            ));
        }
        Ok(Self::node(Node::Extrusion {
            profile,
            half_height: height / 2.,
        }))
    }

    /// Union of any number of shapes. Void operands are dropped, and no
    /// operands at all give void.
    pub fn union_all(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut operands: Vec<Shape> = shapes.into_iter().filter(|s| !s.is_void()).collect();
        match operands.len() {
            0 => Self::void(),
            1 => operands.remove(0),
            _ => Self::node(Node::Union(operands)),
        }
    }

    pub fn union(&self, other: &Shape) -> Self {
        Self::union_all([self.clone(), other.clone()])
    }

    pub fn intersect(&self, other: &Shape) -> Self {
        if self.is_void() || other.is_void() {
            return Self::void();
        }
        Self::node(Node::Intersection(self.clone(), other.clone()))
    }

    /// Remove `other` from this shape.
    pub fn difference(&self, other: &Shape) -> Self {
        if self.is_void() {
            return Self::void();
        }
        if other.is_void() {
            return self.clone();
        }
        Self::node(Node::Difference(self.clone(), other.clone()))
    }

    /// Keep the material on the side of the plane through `point` that
    /// `normal` points to.
    pub fn cut(&self, point: DVec3, normal: DVec3) -> Result<Self> {
        let Some(normal) = normal.try_normalize() else {
            return Err(Error::primitive(
                "cut",
                format!("plane normal must be a non-zero finite vector, got {normal}"),
            ));
        };
        if self.is_void() {
            return Ok(Self::void());
        }
        Ok(Self::node(Node::Cut {
            shape: self.clone(),
            point,
            normal,
        }))
    }

    /// Move the shape by a rigid transform.
    pub fn transform(&self, transform: &DAffine3) -> Self {
        if self.is_void() {
            return Self::void();
        }
        Self::node(Node::Transform {
            shape: self.clone(),
            forward: *transform,
            inverse: transform.inverse(),
        })
    }

    pub fn translate(&self, offset: DVec3) -> Self {
        self.transform(&DAffine3::from_translation(offset))
    }

    /// Signed distance at `point`, negative inside.
    pub fn evaluate(&self, point: DVec3) -> f64 {
        let Some(node) = &self.0 else {
            return f64::INFINITY;
        };
        match node.as_ref() {
            Node::Sphere { radius } => point.length() - radius,
            Node::Cylinder {
                radius,
                half_height,
                round,
            } => {
                let d = glam::dvec2(
                    point.truncate().length() - (radius - round),
                    point.z.abs() - (half_height - round),
                );
                d.max(DVec2::ZERO).length() + d.max_element().min(0.) - round
            }
            Node::Cuboid { half_size, round } => {
                let q = point.abs() - (*half_size - DVec3::splat(*round));
                q.max(DVec3::ZERO).length() + q.max_element().min(0.) - round
            }
            Node::Extrusion {
                profile,
                half_height,
            } => {
                let d = glam::dvec2(
                    profile.evaluate(point.truncate()),
                    point.z.abs() - half_height,
                );
                d.max(DVec2::ZERO).length() + d.max_element().min(0.)
            }
            Node::Union(shapes) => shapes
                .iter()
                .map(|shape| shape.evaluate(point))
                .fold(f64::INFINITY, f64::min),
            Node::Intersection(a, b) => a.evaluate(point).max(b.evaluate(point)),
            Node::Difference(a, b) => a.evaluate(point).max(-b.evaluate(point)),
            Node::Cut {
                shape,
                point: origin,
                normal,
            } => shape.evaluate(point).max(-(point - *origin).dot(*normal)),
            Node::Transform { shape, inverse, .. } => {
                shape.evaluate(inverse.transform_point3(point))
            }
        }
    }

    /// Whether `point` lies strictly inside the material.
    pub fn contains(&self, point: DVec3) -> bool {
        self.evaluate(point) < 0.
    }

    /// Conservative bounds of the material, `None` for void.
    pub fn bounds(&self) -> Option<Aabb> {
        let node = self.0.as_ref()?;
        match node.as_ref() {
            Node::Sphere { radius } => Some(Aabb::centered(DVec3::splat(*radius))),
            Node::Cylinder {
                radius,
                half_height,
                ..
            } => Some(Aabb::centered(dvec3(*radius, *radius, *half_height))),
            Node::Cuboid { half_size, .. } => Some(Aabb::centered(*half_size)),
            Node::Extrusion {
                profile,
                half_height,
            } => Some(Aabb::centered(profile.half_extents().extend(*half_height))),
            Node::Union(shapes) => shapes
                .iter()
                .filter_map(Shape::bounds)
                .reduce(|a, b| a.union(&b)),
            Node::Intersection(a, b) => a.bounds()?.intersection(&b.bounds()?),
            Node::Difference(a, _) => a.bounds(),
            Node::Cut {
                shape,
                point,
                normal,
            } => shape.bounds()?.clipped(*point, *normal),
            Node::Transform { shape, forward, .. } => {
                Some(shape.bounds()?.transformed(forward))
            }
        }
    }
}

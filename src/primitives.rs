// Primitives centered on the Z axis with their bottom (`above`) or top
// (`below`) at a given height.

use glam::{dvec3, DVec3};

use crate::error::Result;
use crate::shape::{Profile, Shape};

pub fn cylinder_at(height: f64, radius: f64, round: f64, offset: DVec3) -> Result<Shape> {
    Ok(Shape::cylinder(height, radius, round)?.translate(offset))
}

/// Cylinder standing on `bottom_z`.
pub fn cylinder_above(height: f64, radius: f64, round: f64, bottom_z: f64) -> Result<Shape> {
    cylinder_at(height, radius, round, dvec3(0., 0., height / 2. + bottom_z))
}

/// Cylinder hanging from `top_z`.
pub fn cylinder_below(height: f64, radius: f64, round: f64, top_z: f64) -> Result<Shape> {
    cylinder_at(height, radius, round, dvec3(0., 0., -height / 2. + top_z))
}

pub fn box_at(size: DVec3, round: f64, offset: DVec3) -> Result<Shape> {
    Ok(Shape::cuboid(size, round)?.translate(offset))
}

/// Box standing on `bottom_z`.
pub fn box_above(size: DVec3, round: f64, bottom_z: f64) -> Result<Shape> {
    box_at(size, round, dvec3(0., 0., size.z / 2. + bottom_z))
}

/// Box hanging from `top_z`.
pub fn box_below(size: DVec3, round: f64, top_z: f64) -> Result<Shape> {
    box_at(size, round, dvec3(0., 0., -size.z / 2. + top_z))
}

/// Extrusion of `profile` standing on `bottom_z`.
pub fn extrude_above(profile: Profile, height: f64, bottom_z: f64) -> Result<Shape> {
    Ok(Shape::extrude(profile, height)?.translate(dvec3(0., 0., height / 2. + bottom_z)))
}

pub fn sphere_at_height(radius: f64, z: f64) -> Result<Shape> {
    Ok(Shape::sphere(radius)?.translate(dvec3(0., 0., z)))
}

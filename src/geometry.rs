use std::f64::consts::TAU;

use glam::{dvec3, DAffine3};

use crate::error::Result;
use crate::params::{GeometryParameters, NUM_SCREW_POSITIONS};

/// Heights and radii derived from the parameters, in the cell's local frame.
///
/// The local origin is where the keycap bottom sits when the key is up, so
/// the top of the plate is below zero and the sphere center further down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHeights {
    pub sphere_center_z: f64,
    pub top_of_plate_z: f64,
    pub bottom_of_plate_z: f64,
    pub back_cover_cut_z: f64,
    pub keycap_bottom_when_down_z: f64,
    pub radius_at_top_of_plate: f64,
    /// Distance from the key axis to the axis of every screw.
    pub screw_radius_from_center: f64,
}

impl CellHeights {
    pub fn derive(params: &GeometryParameters) -> Result<Self> {
        let sphere_center_z =
            -params.plate_top_at_radius - params.keycap_bottom_height_above_plate_up;
        let top_of_plate_z = -params.keycap_bottom_height_above_plate_up;
        let bottom_of_plate_z = top_of_plate_z - params.plate_thickness;
        let radius_at_top_of_plate = params.radius_at_top_of_plate()?;
        Ok(Self {
            sphere_center_z,
            top_of_plate_z,
            bottom_of_plate_z,
            back_cover_cut_z: sphere_center_z + params.back_cover_cut_at_radius,
            keycap_bottom_when_down_z: top_of_plate_z
                + params.keycap_bottom_height_above_plate_down,
            radius_at_top_of_plate,
            screw_radius_from_center: radius_at_top_of_plate
                - (params.insert_diameter / 2. + params.insert_wall_thickness),
        })
    }
}

/// Angle of a hardware position around the key axis.
pub fn screw_angle(position: u32) -> f64 {
    f64::from(position) * TAU / f64::from(NUM_SCREW_POSITIONS)
}

/// Moves a part built on the key axis out to hardware `position`.
pub fn rotate_into_place(position: u32, radius: f64) -> DAffine3 {
    DAffine3::from_rotation_z(screw_angle(position))
        * DAffine3::from_translation(dvec3(radius, 0., 0.))
}

use glam::{dvec2, dvec3};

use crate::error::Result;
use crate::geometry::CellHeights;
use crate::params::GeometryParameters;
use crate::primitives::{box_above, box_below, extrude_above};
use crate::shape::{Profile, Shape};

/// Room the switch and its keycap need, centered on the key axis.
#[derive(Debug, Clone)]
pub struct SwitchCutouts {
    /// Through the plate, for the switch body.
    pub hole: Shape,
    /// On top of the plate, reserved for the switch footprint.
    pub flatzone: Shape,
    /// Everything the keycap can sweep, plus clearance, from its lowest
    /// (pressed) position up.
    pub keycap_clearance: Shape,
}

impl SwitchCutouts {
    pub fn new(params: &GeometryParameters, heights: &CellHeights) -> Result<Self> {
        let hole = box_below(
            dvec3(
                params.switch_hole_width,
                params.switch_hole_length,
                params.plate_thickness,
            ),
            0.,
            heights.top_of_plate_z,
        )?;
        // TODO: cut latch reliefs (SwitchLatchWidth, SwitchLatchGrabThickness)
        // under the plate at both ends of the switch hole.
        let flatzone = box_above(
            dvec3(
                params.switch_flatzone_width,
                params.switch_flatzone_length,
                params.keycap_bottom_height_above_plate_down,
            ),
            0.,
            heights.top_of_plate_z,
        )?;
        let shadow = Profile::rounded_rect(
            dvec2(
                params.keycap_width + params.keycap_clearance,
                params.keycap_length + params.keycap_clearance,
            ),
            params.keycap_round + params.keycap_clearance,
        )?;
        let keycap_clearance = extrude_above(
            shadow,
            params.keycap_height * 2.,
            heights.keycap_bottom_when_down_z,
        )?;
        Ok(Self {
            hole,
            flatzone,
            keycap_clearance,
        })
    }
}

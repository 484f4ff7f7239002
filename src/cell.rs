use glam::{dvec3, DVec3};
use tracing::debug;

use crate::error::Result;
use crate::geometry::CellHeights;
use crate::hardware::hardware;
use crate::params::{GeometryParameters, ScrewMask};
use crate::primitives::{box_at, cylinder_above, cylinder_at, cylinder_below, sphere_at_height};
use crate::ranked::RankedShell;
use crate::shape::Shape;
use crate::switch::SwitchCutouts;

/// Ranked front and back shell contributions of one key.
#[derive(Debug, Clone)]
pub struct KeyCell {
    pub top: RankedShell,
    pub bottom: RankedShell,
    /// Reserved for collision checks. Never populated.
    pub keycap_hitbox: Option<Shape>,
    /// Reserved for collision checks. Never populated.
    pub switch_hitbox: Option<Shape>,
}

impl KeyCell {
    /// Collision hitboxes of the keycap and switch.
    ///
    /// Whether these should reuse the shell geometry or be a simplified
    /// bounding volume is still open, so no cell fills them in and this
    /// always returns `None` for now.
    pub fn hitboxes(&self) -> Option<[&Shape; 2]> {
        Some([self.keycap_hitbox.as_ref()?, self.switch_hitbox.as_ref()?])
    }
}

/// Build the cell of one key with the hardware positions in `screws`.
///
/// Fails without a partial result when a parameter leads to an impossible
/// primitive.
pub fn bubble_key(params: &GeometryParameters, screws: ScrewMask) -> Result<KeyCell> {
    params.validate()?;
    let heights = CellHeights::derive(params)?;
    let interior_radius = params.sphere_radius - params.sphere_thickness;

    let solid_sphere = sphere_at_height(params.sphere_radius, heights.sphere_center_z)?;
    let interior = sphere_at_height(interior_radius, heights.sphere_center_z)?;

    let cover_cut = dvec3(0., 0., heights.back_cover_cut_z);
    let plate_cut = dvec3(0., 0., heights.bottom_of_plate_z);
    let shell_top = solid_sphere.cut(cover_cut, DVec3::Z)?;
    let shell_bottom = solid_sphere.cut(cover_cut, -DVec3::Z)?;
    let plate = solid_sphere.cut(plate_cut, DVec3::Z)?;
    // Hollow only up to the bottom of the plate.
    let hollow = interior.cut(plate_cut, -DVec3::Z)?;

    // Wall on top of the plate, around the keycap.
    let hugging_height = (params.keycap_height + params.keycap_bottom_height_above_plate_down)
        / 2.
        + params.hugging_cylinder_round;
    let hugging_cylinder = cylinder_at(
        hugging_height,
        heights.radius_at_top_of_plate,
        params.hugging_cylinder_round,
        dvec3(
            0.,
            0.,
            hugging_height / 2.
                - params.hugging_cylinder_round
                - params.keycap_bottom_height_above_plate_up,
        ),
    )?;

    // Clearing cylinders remove what is left of a partially subtracted cell
    // on the wrong side of the back cover cut.
    let top_clearing_cylinder = cylinder_below(
        params.sphere_radius * 2.,
        interior_radius,
        0.,
        heights.back_cover_cut_z,
    )?;
    let bottom_clearing_cylinder = cylinder_above(
        params.sphere_radius * 2.,
        interior_radius,
        0.,
        heights.back_cover_cut_z,
    )?;

    let switch = SwitchCutouts::new(params, &heights)?;

    let lane = box_at(
        dvec3(
            params.lane_width,
            params.sphere_radius * 2.,
            params.sphere_radius * 2.,
        ),
        0.,
        dvec3(0., 0., heights.sphere_center_z),
    )?;

    let hardware = hardware(params, &heights, &shell_bottom, screws)?;

    let top = RankedShell::new()
        .with_layer(
            "shell",
            vec![hollow.clone(), shell_bottom.clone()],
            vec![shell_top],
        )
        .with_layer(
            "plate",
            vec![hollow.intersect(&lane)],
            vec![plate.intersect(&lane), hugging_cylinder],
        )
        .with_layer(
            "hardware",
            vec![
                switch.hole.clone(),
                switch.flatzone.clone(),
                switch.keycap_clearance,
                top_clearing_cylinder.intersect(&lane),
                hardware.insert_bores,
            ],
            vec![hardware.insert_holders],
        );

    let bottom = RankedShell::new()
        .with_layer("shell", vec![hollow], vec![shell_bottom])
        .with_layer(
            "hardware",
            vec![
                switch.hole,
                switch.flatzone,
                bottom_clearing_cylinder,
                hardware.screw_holes,
            ],
            vec![hardware.screw_channels],
        );

    debug!(screws = screws.bits(), "built bubble key cell");
    Ok(KeyCell {
        top,
        bottom,
        keycap_hitbox: None,
        switch_hitbox: None,
    })
}

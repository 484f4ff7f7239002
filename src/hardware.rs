
use tracing::debug;

use crate::error::Result;
use crate::geometry::{rotate_into_place, CellHeights};
use crate::params::{GeometryParameters, ScrewMask};
use crate::primitives::{cylinder_above, cylinder_below};
use crate::ranked::combine;
use crate::shape::Shape;

/// Hardware of one position, already moved into place.
#[derive(Debug, Clone)]
pub struct HardwareSet {
    pub insert_holder: Shape,
    pub insert_bore: Shape,
    pub screw_channel: Shape,
    pub screw_hole: Shape,
}

/// Union of every enabled position, per category. All four are void when no
/// position is enabled.
#[derive(Debug, Clone, Default)]
pub struct Hardware {
    pub insert_holders: Shape,
    pub insert_bores: Shape,
    pub screw_channels: Shape,
    pub screw_holes: Shape,
}

pub fn hardware_set(
    params: &GeometryParameters,
    heights: &CellHeights,
    shell_bottom: &Shape,
    position: u32,
) -> Result<HardwareSet> {
    let into_place = rotate_into_place(position, heights.screw_radius_from_center);
    let cut_z = heights.back_cover_cut_z;
    let screw_overhang = params.screw_thread_length - params.insert_length;

    let insert_holder = cylinder_above(
        params.insert_length + params.insert_wall_thickness,
        params.insert_diameter / 2. + params.insert_wall_thickness,
        0.,
        cut_z,
    )?;
    let insert_bore = cylinder_above(params.insert_length, params.insert_diameter / 2., 0., cut_z)?;
    let screw_channel = cylinder_below(
        params.sphere_radius,
        params.screw_head_diameter / 2. + params.insert_wall_thickness,
        0.,
        cut_z,
    )?;
    let thread_hole = cylinder_below(screw_overhang, params.screw_thread_diameter / 2., 0., cut_z)?;
    let head_hole = cylinder_below(
        params.sphere_radius,
        params.screw_head_diameter / 2.,
        0.,
        cut_z - screw_overhang,
    )?;

    Ok(HardwareSet {
        insert_holder: insert_holder.transform(&into_place),
        insert_bore: insert_bore.transform(&into_place),
        screw_channel: shell_bottom.intersect(&screw_channel.transform(&into_place)),
        screw_hole: thread_hole.union(&head_hole).transform(&into_place),
    })
}

/// Build and union the hardware of every position enabled in `screws`.
pub fn hardware(
    params: &GeometryParameters,
    heights: &CellHeights,
    shell_bottom: &Shape,
    screws: ScrewMask,
) -> Result<Hardware> {
    let sets = screws
        .positions()
        .map(|position| hardware_set(params, heights, shell_bottom, position))
        .collect::<Result<Vec<_>>>()?;
    debug!(screws = screws.bits(), positions = sets.len(), "built hardware");
    Ok(Hardware {
        insert_holders: combine(sets.iter().map(|set| set.insert_holder.clone())),
        insert_bores: combine(sets.iter().map(|set| set.insert_bore.clone())),
        screw_channels: combine(sets.iter().map(|set| set.screw_channel.clone())),
        screw_holes: combine(sets.iter().map(|set| set.screw_hole.clone())),
    })
}

use serde::Deserialize;

use crate::error::{Error, Result};

/// Number of hardware positions around a key, 90° apart.
pub(crate) const NUM_SCREW_POSITIONS: u32 = 4;

/// Everything needed to build one bubble key cell (mm).
///
/// Field names in definition files are the PascalCase versions of the field
/// names below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct GeometryParameters {
    // Spherical shell
    pub sphere_radius: f64,
    /// Distance from the sphere center up to the top of the plate.
    pub plate_top_at_radius: f64,
    pub plate_thickness: f64,
    #[serde(rename = "SphereThicknes", alias = "SphereThickness")]
    pub sphere_thickness: f64,
    /// Height above the sphere center where the front and back shells split.
    pub back_cover_cut_at_radius: f64,

    // Switch
    pub switch_hole_length: f64,
    pub switch_hole_width: f64,
    // Latch reliefs are not cut yet, these are only validated.
    #[serde(default)]
    pub switch_latch_width: f64,
    #[serde(default)]
    pub switch_latch_grab_thickness: f64,
    pub switch_flatzone_length: f64,
    pub switch_flatzone_width: f64,

    // Keycap
    pub keycap_length: f64,
    pub keycap_width: f64,
    pub keycap_bottom_height_above_plate_down: f64,
    pub keycap_height: f64,
    pub keycap_bottom_height_above_plate_up: f64,
    #[serde(rename = "KeycapClearanced", alias = "KeycapClearance")]
    pub keycap_clearance: f64,
    pub keycap_round: f64,
    pub hugging_cylinder_round: f64,
    /// Max width of the openings in the front shell ("stay in your lane"),
    /// so they never bleed into the neighbouring keys.
    pub lane_width: f64,

    // Hardware
    pub insert_length: f64,
    pub insert_diameter: f64,
    pub insert_wall_thickness: f64,
    pub screw_thread_diameter: f64,
    pub screw_thread_length: f64,
    pub screw_head_diameter: f64,
}

impl GeometryParameters {
    /// Check the invariants every cell build relies on.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("SphereRadius", self.sphere_radius),
            ("PlateTopAtRadius", self.plate_top_at_radius),
            ("PlateThickness", self.plate_thickness),
            ("SphereThicknes", self.sphere_thickness),
            ("SwitchHoleLength", self.switch_hole_length),
            ("SwitchHoleWidth", self.switch_hole_width),
            ("SwitchFlatzoneLength", self.switch_flatzone_length),
            ("SwitchFlatzoneWidth", self.switch_flatzone_width),
            ("KeycapLength", self.keycap_length),
            ("KeycapWidth", self.keycap_width),
            (
                "KeycapBottomHeightAbovePlateDown",
                self.keycap_bottom_height_above_plate_down,
            ),
            ("KeycapHeight", self.keycap_height),
            (
                "KeycapBottomHeightAbovePlateUp",
                self.keycap_bottom_height_above_plate_up,
            ),
            ("LaneWidth", self.lane_width),
            ("InsertLength", self.insert_length),
            ("InsertDiameter", self.insert_diameter),
            ("InsertWallThickness", self.insert_wall_thickness),
            ("ScrewThreadDiameter", self.screw_thread_diameter),
            ("ScrewThreadLength", self.screw_thread_length),
            ("ScrewHeadDiameter", self.screw_head_diameter),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.) {
                return Err(Error::parameter(name, format!("must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("SwitchLatchWidth", self.switch_latch_width),
            ("SwitchLatchGrabThickness", self.switch_latch_grab_thickness),
            ("KeycapClearanced", self.keycap_clearance),
            ("KeycapRound", self.keycap_round),
            ("HuggingCylinderRound", self.hugging_cylinder_round),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.) {
                return Err(Error::parameter(
                    name,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }
        if !self.back_cover_cut_at_radius.is_finite() {
            return Err(Error::parameter("BackCoverCutAtRadius", "must be finite"));
        }
        if self.plate_top_at_radius > self.sphere_radius {
            return Err(Error::ParameterDomain(format!(
                "PlateTopAtRadius {} exceeds SphereRadius {}, the plate does not intersect the sphere",
                self.plate_top_at_radius, self.sphere_radius
            )));
        }
        if self.sphere_thickness >= self.sphere_radius {
            return Err(Error::parameter(
                "SphereThicknes",
                format!(
                    "must be smaller than SphereRadius {}, got {}",
                    self.sphere_radius, self.sphere_thickness
                ),
            ));
        }
        let radius_at_top_of_plate = self.radius_at_top_of_plate()?;
        let insert_outer_radius = self.insert_diameter / 2. + self.insert_wall_thickness;
        if insert_outer_radius >= radius_at_top_of_plate {
            return Err(Error::parameter(
                "InsertDiameter",
                format!(
                    "insert holder radius {insert_outer_radius} does not fit inside the plate radius {radius_at_top_of_plate}"
                ),
            ));
        }
        if self.screw_thread_length <= self.insert_length {
            return Err(Error::parameter(
                "ScrewThreadLength",
                format!(
                    "must exceed InsertLength {}, got {}",
                    self.insert_length, self.screw_thread_length
                ),
            ));
        }
        Ok(())
    }

    /// Radius of the circle where the top of the plate meets the sphere.
    pub fn radius_at_top_of_plate(&self) -> Result<f64> {
        let squared = self.sphere_radius * self.sphere_radius
            - self.plate_top_at_radius * self.plate_top_at_radius;
        if squared < 0. {
            return Err(Error::ParameterDomain(format!(
                "sqrt of negative value {squared}: PlateTopAtRadius {} exceeds SphereRadius {}",
                self.plate_top_at_radius, self.sphere_radius
            )));
        }
        Ok(squared.sqrt())
    }
}

/// Selects which of the four hardware positions of a key get an insert and
/// a screw. Bit `i` enables the position at `i * 90°`.
///
/// The mask is stored wide so definition files can keep their integer type,
/// but bits past the last position are rejected instead of ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u64")]
pub struct ScrewMask(u64);

impl ScrewMask {
    pub const NONE: ScrewMask = ScrewMask(0);

    pub fn new(bits: u64) -> Result<Self> {
        if bits >> NUM_SCREW_POSITIONS != 0 {
            return Err(Error::UnsupportedScrewBits(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn is_set(self, position: u32) -> bool {
        position < NUM_SCREW_POSITIONS && self.0 & (1 << position) != 0
    }

    /// Enabled positions in increasing order.
    pub fn positions(self) -> impl Iterator<Item = u32> {
        (0..NUM_SCREW_POSITIONS).filter(move |&position| self.is_set(position))
    }
}

impl TryFrom<u64> for ScrewMask {
    type Error = Error;

    fn try_from(bits: u64) -> Result<Self> {
        Self::new(bits)
    }
}

#[cfg(test)]
pub(crate) fn sample_parameters() -> GeometryParameters {
    GeometryParameters {
        sphere_radius: 21.,
        plate_top_at_radius: 10.,
        plate_thickness: 1.5,
        sphere_thickness: 1.8,
        back_cover_cut_at_radius: 4.,
        switch_hole_length: 14.,
        switch_hole_width: 14.,
        switch_latch_width: 5.,
        switch_latch_grab_thickness: 0.8,
        switch_flatzone_length: 15.,
        switch_flatzone_width: 15.,
        keycap_length: 18.,
        keycap_width: 18.,
        keycap_bottom_height_above_plate_down: 3.,
        keycap_height: 4.,
        keycap_bottom_height_above_plate_up: 6.,
        keycap_clearance: 1.,
        keycap_round: 1.,
        hugging_cylinder_round: 0.5,
        lane_width: 19.,
        insert_length: 4.,
        insert_diameter: 3.5,
        insert_wall_thickness: 1.2,
        screw_thread_diameter: 2.,
        screw_thread_length: 6.,
        screw_head_diameter: 4.,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_parameters_are_valid() {
        sample_parameters().validate().unwrap();
        assert_relative_eq!(
            sample_parameters().radius_at_top_of_plate().unwrap(),
            341f64.sqrt()
        );
    }

    #[test]
    fn plate_above_the_sphere_is_a_domain_error() {
        let mut params = sample_parameters();
        params.plate_top_at_radius = 22.;
        assert!(matches!(params.validate(), Err(Error::ParameterDomain(_))));
        assert!(matches!(
            params.radius_at_top_of_plate(),
            Err(Error::ParameterDomain(_))
        ));
    }

    #[test]
    fn non_positive_lengths_are_rejected() {
        let mut params = sample_parameters();
        params.plate_thickness = 0.;
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter {
                name: "PlateThickness",
                ..
            })
        ));
        let mut params = sample_parameters();
        params.keycap_round = -1.;
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter {
                name: "KeycapRound",
                ..
            })
        ));
    }

    #[test]
    fn hardware_must_fit_inside_the_plate() {
        let mut params = sample_parameters();
        params.insert_diameter = 40.;
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter {
                name: "InsertDiameter",
                ..
            })
        ));
        let mut params = sample_parameters();
        params.screw_thread_length = params.insert_length;
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter {
                name: "ScrewThreadLength",
                ..
            })
        ));
    }

    #[test]
    fn screw_mask_rejects_unused_bits() {
        assert!(matches!(
            ScrewMask::new(0b1_0000),
            Err(Error::UnsupportedScrewBits(0b1_0000))
        ));
        assert!(ScrewMask::new(u64::MAX).is_err());
        let mask = ScrewMask::new(0b0101).unwrap();
        assert_eq!(mask.positions().collect::<Vec<_>>(), vec![0, 2]);
        assert!(mask.is_set(2));
        assert!(!mask.is_set(1));
        assert!(!mask.is_set(63));
        assert_eq!(ScrewMask::NONE.positions().count(), 0);
    }

    #[test]
    fn parameters_load_from_json5() {
        let text = r#"{
            SphereRadius: 21, PlateTopAtRadius: 10, PlateThickness: 1.5,
            SphereThicknes: 1.8, BackCoverCutAtRadius: 4,
            SwitchHoleLength: 14, SwitchHoleWidth: 14,
            SwitchFlatzoneLength: 15, SwitchFlatzoneWidth: 15,
            KeycapLength: 18, KeycapWidth: 18,
            KeycapBottomHeightAbovePlateDown: 3, KeycapHeight: 4,
            KeycapBottomHeightAbovePlateUp: 6, KeycapClearanced: 1,
            KeycapRound: 1, HuggingCylinderRound: 0.5, LaneWidth: 19,
            InsertLength: 4, InsertDiameter: 3.5, InsertWallThickness: 1.2,
            ScrewThreadDiameter: 2, ScrewThreadLength: 6, ScrewHeadDiameter: 4,
        }"#;
        let params: GeometryParameters = json5::from_str(text).unwrap();
        assert_relative_eq!(params.sphere_thickness, 1.8);
        assert_relative_eq!(params.keycap_clearance, 1.);
        assert_relative_eq!(params.switch_latch_width, 0.);
        params.validate().unwrap();
    }

    #[test]
    fn screw_mask_deserialization_fails_fast() {
        #[derive(Deserialize)]
        struct Holder {
            screws: ScrewMask,
        }
        let ok: Holder = json5::from_str("{ screws: 5 }").unwrap();
        assert_eq!(ok.screws.bits(), 5);
        assert!(json5::from_str::<Holder>("{ screws: 17 }").is_err());
    }
}

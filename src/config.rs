// Keyboard definition files (JSON5): key parameters inline or in a file next
// to the definition, and one entry per placement.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{DAffine3, DQuat, DVec3, EulerRot};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::export::ExportSettings;
use crate::keyboard::{Composition, Placement, PlacementType};
use crate::params::{GeometryParameters, ScrewMask};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PlacementKind {
    #[default]
    Key,
    Debug1,
    Debug2,
    Debug3,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlacementEntry {
    #[serde(rename = "type", default)]
    kind: PlacementKind,
    #[serde(default)]
    screws: ScrewMask,
    #[serde(default)]
    translation: [f64; 3],
    #[serde(default)]
    rotation_degrees: [f64; 3],
}

impl PlacementEntry {
    fn into_placement(self, index: usize) -> Result<Placement> {
        let kind = match self.kind {
            PlacementKind::Key => PlacementType::Key {
                screws: self.screws,
            },
            _ if self.screws != ScrewMask::NONE => {
                return Err(Error::parameter(
                    "screws",
                    format!("placement {index} is a debug marker and cannot carry screws"),
                ))
            }
            PlacementKind::Debug1 => PlacementType::Debug1,
            PlacementKind::Debug2 => PlacementType::Debug2,
            PlacementKind::Debug3 => PlacementType::Debug3,
        };
        if !self.translation.iter().all(|v| v.is_finite()) {
            return Err(Error::parameter(
                "translation",
                format!("placement {index} has a non-finite translation {:?}", self.translation),
            ));
        }
        if !self.rotation_degrees.iter().all(|v| v.is_finite()) {
            return Err(Error::parameter(
                "rotation_degrees",
                format!(
                    "placement {index} has a non-finite rotation {:?}",
                    self.rotation_degrees
                ),
            ));
        }
        let [rx, ry, rz] = self.rotation_degrees.map(f64::to_radians);
        let rotation = DQuat::from_euler(EulerRot::XYZ, rx, ry, rz);
        Ok(Placement {
            kind,
            transform: DAffine3::from_rotation_translation(
                rotation,
                DVec3::from_array(self.translation),
            ),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default)]
    parameters_file: Option<PathBuf>,
    #[serde(default)]
    parameters: Option<GeometryParameters>,
    #[serde(default)]
    composition: Composition,
    #[serde(default)]
    export: ExportSettings,
    placements: Vec<PlacementEntry>,
}

/// A loaded and validated keyboard definition.
#[derive(Debug, Clone)]
pub struct KeyboardDefinition {
    pub parameters: GeometryParameters,
    pub composition: Composition,
    pub export: ExportSettings,
    pub placements: Vec<Placement>,
}

fn read_json5<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl KeyboardDefinition {
    pub fn load(path: &Path) -> Result<Self> {
        let file: DefinitionFile = read_json5(path)?;
        let parameters = match (file.parameters, file.parameters_file) {
            (Some(parameters), None) => parameters,
            (None, Some(parameters_file)) => {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                let parameters_path = base.join(parameters_file);
                debug!(path = %parameters_path.display(), "loading key parameters");
                read_json5(&parameters_path)?
            }
            (Some(_), Some(_)) => {
                return Err(Error::parameter(
                    "parameters",
                    "give either parameters or parameters_file, not both",
                ))
            }
            (None, None) => {
                return Err(Error::parameter(
                    "parameters",
                    "one of parameters or parameters_file is required",
                ))
            }
        };
        parameters.validate()?;
        let placements = file
            .placements
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_placement(index))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            parameters,
            composition: file.composition,
            export: file.export,
            placements,
        })
    }
}

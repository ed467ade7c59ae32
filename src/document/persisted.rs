use std::collections::BTreeMap;

use crate::displacement::DisplacementSettings;
use crate::foundation::core::{Rgb8, ViewId};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::model::element::CanvasElement;
use crate::model::view::DesignUrlMap;

pub const PERSISTED_VERSION: u32 = 1;

/// Serialized design state handed to the persistence collaborator.
///
/// Elements are one flat list; an element without `view` is global.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDesign {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    #[serde(default)]
    pub designs: BTreeMap<ViewId, DesignUrlMap>,
    #[serde(default)]
    pub settings: DisplacementSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garment_color: Option<Rgb8>,
}

fn default_version() -> u32 {
    PERSISTED_VERSION
}

impl PersistedDesign {
    pub fn to_json(&self) -> DrapeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> DrapeResult<Self> {
        let design: Self = serde_json::from_str(s)?;
        if design.version > PERSISTED_VERSION {
            return Err(DrapeError::validation(format!(
                "persisted design version {} is newer than supported {PERSISTED_VERSION}",
                design.version
            )));
        }
        Ok(design)
    }
}

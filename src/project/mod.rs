//! Project document handling
//!
//! A project is an opaque structured document describing tracks, clips, and
//! timeline settings. This layer extracts the typed settings it needs and
//! keeps the raw document for re-serialization into the engine.

use serde_json::Value;

use crate::domain::model::{ChannelLayout, Fraction, ProjectSettings};
use crate::error::{ExportError, ExportResult};

/// A loaded project: typed settings plus the raw document
///
/// Read-only to the exporter; the document is handed to the engine verbatim.
#[derive(Debug, Clone)]
pub struct Project {
    settings: ProjectSettings,
    document: Value,
}

impl Project {
    /// Build a project from a parsed document, validating the settings
    /// fields this layer depends on
    pub fn from_document(document: Value) -> ExportResult<Self> {
        if !document.is_object() {
            return Err(ExportError::InvalidProjectFormat {
                message: "project document must be a JSON object".to_string(),
            });
        }

        let fps = require_fraction(&document, "fps")?;
        let width = require_u32(&document, "width")?;
        let height = require_u32(&document, "height")?;
        let sample_rate = require_u32(&document, "sample_rate")?;
        let channels = require_u32(&document, "channels")?;

        let raw_layout = require_u64(&document, "channel_layout")?;
        let channel_layout = ChannelLayout::from_raw(raw_layout).ok_or_else(|| {
            ExportError::InvalidProjectFormat {
                message: format!("unrecognized channel layout code {}", raw_layout),
            }
        })?;

        let settings =
            ProjectSettings::new(fps, width, height, sample_rate, channels, channel_layout)?;

        Ok(Self { settings, document })
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Serialize the raw document for the engine's JSON load operation
    pub fn to_json_string(&self) -> ExportResult<String> {
        serde_json::to_string(&self.document).map_err(|e| ExportError::InvalidProjectFormat {
            message: format!("failed to serialize project document: {}", e),
        })
    }
}

fn require_u64(document: &Value, key: &str) -> ExportResult<u64> {
    document
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| ExportError::InvalidProjectFormat {
            message: format!("missing or invalid field `{}`", key),
        })
}

fn require_u32(document: &Value, key: &str) -> ExportResult<u32> {
    let value = require_u64(document, key)?;
    u32::try_from(value).map_err(|_| ExportError::InvalidProjectFormat {
        message: format!("field `{}` out of range: {}", key, value),
    })
}

fn require_fraction(document: &Value, key: &str) -> ExportResult<Fraction> {
    let entry = document
        .get(key)
        .ok_or_else(|| ExportError::InvalidProjectFormat {
            message: format!("missing field `{}`", key),
        })?;

    let num = entry
        .get("num")
        .and_then(Value::as_i64)
        .ok_or_else(|| ExportError::InvalidProjectFormat {
            message: format!("field `{}` missing numerator", key),
        })?;
    let den = entry
        .get("den")
        .and_then(Value::as_i64)
        .ok_or_else(|| ExportError::InvalidProjectFormat {
            message: format!("field `{}` missing denominator", key),
        })?;

    let num = i32::try_from(num).map_err(|_| ExportError::InvalidProjectFormat {
        message: format!("field `{}` numerator out of range", key),
    })?;
    let den = i32::try_from(den).map_err(|_| ExportError::InvalidProjectFormat {
        message: format!("field `{}` denominator out of range", key),
    })?;

    Fraction::new(num, den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "fps": {"num": 30, "den": 1},
            "width": 1280,
            "height": 720,
            "sample_rate": 44100,
            "channels": 2,
            "channel_layout": 3,
            "clips": []
        })
    }

    #[test]
    fn test_project_from_valid_document() {
        let project = Project::from_document(valid_document()).unwrap();
        assert_eq!(project.settings().width, 1280);
        assert_eq!(project.settings().height, 720);
        assert_eq!(project.settings().fps.to_f64(), 30.0);
        assert_eq!(project.settings().channel_layout, ChannelLayout::Stereo);
    }

    #[test]
    fn test_project_missing_field() {
        let mut document = valid_document();
        document.as_object_mut().unwrap().remove("width");
        let err = Project::from_document(document).unwrap_err();
        assert!(err.to_string().contains("width"));
    }

    #[test]
    fn test_project_zero_fps_denominator() {
        let mut document = valid_document();
        document["fps"]["den"] = json!(0);
        assert!(Project::from_document(document).is_err());
    }

    #[test]
    fn test_project_unknown_channel_layout() {
        let mut document = valid_document();
        document["channel_layout"] = json!(42);
        let err = Project::from_document(document).unwrap_err();
        assert!(err.to_string().contains("channel layout"));
    }

    #[test]
    fn test_project_not_an_object() {
        assert!(Project::from_document(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_document_round_trip() {
        let project = Project::from_document(valid_document()).unwrap();
        let serialized = project.to_json_string().unwrap();
        let reparsed: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(&reparsed, project.document());
    }
}

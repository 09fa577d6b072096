//! Persisted form of a single zone

use serde::{Deserialize, Deserializer, Serialize};

use super::overrides::OverrideSet;
use super::settings::SettingsRecord;
use crate::domain::core::Rect;

/// Everything written to a zone file
///
/// Settings fields sit at the top level of the JSON object next to the
/// identity fields. Files written by older builds used `title` for the
/// display name and may lack `local_overrides` or `geometry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    #[serde(alias = "title", default = "default_zone_name")]
    pub zone_name: String,

    #[serde(default)]
    pub folder: String,

    #[serde(flatten)]
    pub settings: SettingsRecord,

    #[serde(default)]
    pub local_overrides: OverrideSet,

    #[serde(
        default,
        deserialize_with = "lenient_geometry",
        skip_serializing_if = "Option::is_none"
    )]
    pub geometry: Option<Rect>,
}

impl ZoneRecord {
    pub fn new(zone_name: impl Into<String>, folder: impl Into<String>, settings: SettingsRecord) -> Self {
        Self {
            zone_name: zone_name.into(),
            folder: folder.into(),
            settings,
            local_overrides: OverrideSet::new(),
            geometry: None,
        }
    }
}

fn default_zone_name() -> String {
    "Zone".to_string()
}

/// Accepts `[x, y, w, h]`; anything else reads as absent
fn lenient_geometry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rect>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };

    match serde_json::from_value::<[i32; 4]>(value.clone()) {
        Ok(parts) => Ok(Some(Rect::from(parts))),
        Err(_) => {
            log::warn!("Ignoring malformed zone geometry {value}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{HexColor, SettingsField};

    #[test]
    fn flattened_layout() {
        let mut record = ZoneRecord::new("Work", "C:/Work", SettingsRecord::default());
        record.local_overrides.insert(SettingsField::Rows);
        record.geometry = Some(Rect::new(10, 20, 300, 400));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["zone_name"], "Work");
        assert_eq!(json["rows"], 5);
        assert_eq!(json["bg_color"], "#323232");
        assert_eq!(json["local_overrides"], serde_json::json!(["rows"]));
        assert_eq!(json["geometry"], serde_json::json!([10, 20, 300, 400]));
    }

    #[test]
    fn legacy_title_key_and_missing_fields() {
        let record: ZoneRecord = serde_json::from_str(
            r##"{"title": "Old", "folder": "D:/stuff", "cols": 6, "title_bg": "#00ff00"}"##,
        )
        .unwrap();
        assert_eq!(record.zone_name, "Old");
        assert_eq!(record.settings.cols, 6);
        assert_eq!(record.settings.rows, 5);
        assert_eq!(record.settings.title_bg, HexColor::rgb(0, 255, 0));
        assert!(record.local_overrides.is_empty());
        assert_eq!(record.geometry, None);
    }

    #[test]
    fn malformed_geometry_reads_as_absent() {
        let record: ZoneRecord =
            serde_json::from_str(r#"{"zone_name": "Z", "geometry": [1, 2, "wide"]}"#).unwrap();
        assert_eq!(record.geometry, None);

        let record: ZoneRecord =
            serde_json::from_str(r#"{"zone_name": "Z", "geometry": null}"#).unwrap();
        assert_eq!(record.geometry, None);
    }

    #[test]
    fn missing_name_defaults() {
        let record: ZoneRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.zone_name, "Zone");
        assert_eq!(record.folder, "");
    }
}

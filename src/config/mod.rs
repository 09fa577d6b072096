//! Configuration model for floatboard
//!
//! One global settings record, one record per zone, the set of fields each
//! zone overrides, and the rules that move values between them. Everything
//! here is platform independent.

pub mod overrides;
pub mod propagation;
pub mod settings;
pub mod store;
pub mod zone;

pub use overrides::OverrideSet;
pub use propagation::{LocalOutcome, apply_local_edit, propagate_field, sync_with_global};
pub use settings::{FieldKind, FieldValue, HexColor, SettingsError, SettingsField, SettingsRecord};
pub use store::{ConfigStore, StoreError, numbered_zone_name, sanitize_zone_name};
pub use zone::ZoneRecord;

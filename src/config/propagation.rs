//! Edit protocols between the global record and zone records
//!
//! A zone follows the global value of every field it does not override.
//! These functions are the only places that move values between the two,
//! so the rule holds at load time, on global edits and on local edits.

use super::overrides::OverrideSet;
use super::settings::{FieldValue, SettingsError, SettingsField, SettingsRecord};

/// Result of a local edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalOutcome {
    /// The field is now pinned to the zone's own value
    Overridden,
    /// The override was cleared and the field follows the global value again
    Reverted,
}

/// Applies a local edit of `field` to one zone
///
/// With the override enabled the field is recorded as overridden and takes
/// `value`; a `None` value (unparseable text) still records the override but
/// keeps the previous value. With the override disabled the typed value is
/// discarded and the field reverts to the current global value.
///
/// # Arguments
/// * `settings` - The zone's settings record
/// * `overrides` - The zone's override set
/// * `global` - Current global settings
/// * `field` - Field being edited
/// * `value` - Parsed value, if the text was valid
/// * `override_enabled` - State of the field's override checkbox
pub fn apply_local_edit(
    settings: &mut SettingsRecord,
    overrides: &mut OverrideSet,
    global: &SettingsRecord,
    field: SettingsField,
    value: Option<FieldValue>,
    override_enabled: bool,
) -> Result<LocalOutcome, SettingsError> {
    if override_enabled {
        if let Some(value) = value {
            settings.set(field, value)?;
        }
        overrides.insert(field);
        Ok(LocalOutcome::Overridden)
    } else {
        overrides.remove(field);
        settings.copy_field(global, field);
        Ok(LocalOutcome::Reverted)
    }
}

/// Copies a freshly edited global field into a zone unless it overrides it
///
/// # Returns
/// `true` when the zone took the global value
pub fn propagate_field(
    settings: &mut SettingsRecord,
    overrides: &OverrideSet,
    global: &SettingsRecord,
    field: SettingsField,
) -> bool {
    if overrides.contains(field) {
        return false;
    }
    settings.copy_field(global, field);
    true
}

/// Brings every non-overridden field of a zone in line with the global record
pub fn sync_with_global(settings: &mut SettingsRecord, overrides: &OverrideSet, global: &SettingsRecord) {
    for field in SettingsField::ALL {
        propagate_field(settings, overrides, global, field);
    }
}

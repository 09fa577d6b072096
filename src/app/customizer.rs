//! Headless model of the customization dialog
//!
//! The dialog shows one text control per settings field. In local mode each
//! row also carries an "Override" checkbox. Every control change becomes a
//! [`FieldChange`] that the controller applies immediately.

use crate::app::zone::ZoneId;
use crate::config::{FieldValue, OverrideSet, SettingsField, SettingsRecord};

/// What a customizer edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizerTarget {
    Global,
    Zone(ZoneId),
}

/// State of one dialog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldControl {
    pub field: SettingsField,
    pub text: String,
    /// Always false in global mode
    pub override_checked: bool,
}

/// A user interaction with one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlChange {
    Text { field: SettingsField, text: String },
    Override { field: SettingsField, checked: bool },
}

/// Edit produced by a control change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    pub field: SettingsField,
    /// None when the row's text does not parse
    pub value: Option<FieldValue>,
    pub override_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Customizer {
    target: CustomizerTarget,
    controls: Vec<FieldControl>,
}

impl Customizer {
    pub fn for_global(global: &SettingsRecord) -> Self {
        Self::build(CustomizerTarget::Global, global, &OverrideSet::new())
    }

    /// Customizer for one zone; checkboxes start from its override set
    pub fn for_zone(id: ZoneId, settings: &SettingsRecord, overrides: &OverrideSet) -> Self {
        Self::build(CustomizerTarget::Zone(id), settings, overrides)
    }

    fn build(target: CustomizerTarget, settings: &SettingsRecord, overrides: &OverrideSet) -> Self {
        let controls = SettingsField::ALL
            .into_iter()
            .map(|field| FieldControl {
                field,
                text: settings.get(field).to_string(),
                override_checked: overrides.contains(field),
            })
            .collect();
        Self { target, controls }
    }

    pub fn target(&self) -> CustomizerTarget {
        self.target
    }

    pub fn is_local(&self) -> bool {
        matches!(self.target, CustomizerTarget::Zone(_))
    }

    pub fn title(&self) -> &'static str {
        match self.target {
            CustomizerTarget::Global => "Global Customizer",
            CustomizerTarget::Zone(_) => "Local Customizer",
        }
    }

    pub fn controls(&self) -> &[FieldControl] {
        &self.controls
    }

    pub fn control(&self, field: SettingsField) -> Option<&FieldControl> {
        self.controls.iter().find(|control| control.field == field)
    }

    fn control_mut(&mut self, field: SettingsField) -> &mut FieldControl {
        // controls are built from SettingsField::ALL, so the index is the position
        let index = SettingsField::ALL
            .iter()
            .position(|candidate| *candidate == field)
            .unwrap_or_default();
        &mut self.controls[index]
    }

    /// Records a control change and returns the edit to apply
    pub fn update(&mut self, change: ControlChange) -> FieldChange {
        let is_local = self.is_local();
        let control = match change {
            ControlChange::Text { field, text } => {
                let control = self.control_mut(field);
                control.text = text;
                control
            }
            ControlChange::Override { field, checked } => {
                let control = self.control_mut(field);
                control.override_checked = checked && is_local;
                control
            }
        };

        let value = match FieldValue::parse(control.field, &control.text) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("Ignoring customizer input: {err}");
                None
            }
        };

        FieldChange {
            field: control.field,
            value,
            override_enabled: control.override_checked,
        }
    }

    /// Shows the applied value of `field` in its row
    pub fn reflect_field(&mut self, field: SettingsField, settings: &SettingsRecord) {
        self.control_mut(field).text = settings.get(field).to_string();
    }

    /// Rewrites an integer row whose typed number was clamped when applied
    ///
    /// Color rows are left alone so shorthand like `#123` stays as typed.
    ///
    /// # Returns
    /// `true` when the row text changed
    pub fn reflect_if_adjusted(&mut self, field: SettingsField, settings: &SettingsRecord) -> bool {
        let applied = settings.get(field);
        let FieldValue::Integer(value) = applied else {
            return false;
        };
        let control = self.control_mut(field);
        match control.text.trim().parse::<i64>() {
            Ok(typed) if typed != i64::from(value) => {}
            _ => return false,
        }
        control.text = applied.to_string();
        true
    }
}

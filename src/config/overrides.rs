//! Per-zone set of locally overridden fields

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use super::settings::SettingsField;

/// Fields a zone has pinned to its own value
///
/// Ordered by the field enumeration, so the persisted list is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet(BTreeSet<SettingsField>);

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the field was not overridden before
    pub fn insert(&mut self, field: SettingsField) -> bool {
        self.0.insert(field)
    }

    /// Returns true when the field was overridden before
    pub fn remove(&mut self, field: SettingsField) -> bool {
        self.0.remove(&field)
    }

    pub fn contains(&self, field: SettingsField) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = SettingsField> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SettingsField> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = SettingsField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for OverrideSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for field in &self.0 {
            seq.serialize_element(field.key())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for OverrideSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(OverrideSetVisitor)
    }
}

struct OverrideSetVisitor;

impl<'de> Visitor<'de> for OverrideSetVisitor {
    type Value = OverrideSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of settings field names")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut set = OverrideSet::new();
        while let Some(name) = seq.next_element::<String>()? {
            match name.parse::<SettingsField>() {
                Ok(field) => {
                    set.insert(field);
                }
                Err(_) => log::warn!("Dropping unknown override field '{name}'"),
            }
        }
        Ok(set)
    }
}

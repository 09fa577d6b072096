//! Typed settings record shared by the global configuration and every zone
//!
//! All recognised fields are enumerated once by [`SettingsField`]. The record,
//! the override set, the propagation engine and the customizer iterate that
//! enumeration, so adding a field is a compile-time change everywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing settings values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Unknown settings field '{0}'")]
    UnknownField(String),

    #[error("Invalid color '{0}', expected #RGB or #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid integer '{text}' for field {field}")]
    InvalidInteger { field: SettingsField, text: String },

    #[error("Field {field} expects a {expected} value")]
    KindMismatch {
        field: SettingsField,
        expected: &'static str,
    },
}

/// Identifier of every recognised settings field, in enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    Rows,
    Cols,
    CellIconSize,
    TextSize,
    TitleTextSize,
    TitleHeight,
    LabelHeight,
    ScaleOffsetX,
    ScaleOffsetY,
    BgColor,
    NameColor,
    TitleBg,
    TitleText,
}

/// Value domain of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer clamped into an inclusive range
    Integer { min: i32, max: i32 },
    /// Opaque RGB color
    Color,
}

impl SettingsField {
    /// Every field, in the order edits are applied
    pub const ALL: [SettingsField; 13] = [
        SettingsField::Rows,
        SettingsField::Cols,
        SettingsField::CellIconSize,
        SettingsField::TextSize,
        SettingsField::TitleTextSize,
        SettingsField::TitleHeight,
        SettingsField::LabelHeight,
        SettingsField::ScaleOffsetX,
        SettingsField::ScaleOffsetY,
        SettingsField::BgColor,
        SettingsField::NameColor,
        SettingsField::TitleBg,
        SettingsField::TitleText,
    ];

    /// Persisted key of this field
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::Rows => "rows",
            SettingsField::Cols => "cols",
            SettingsField::CellIconSize => "cell_icon_size",
            SettingsField::TextSize => "text_size",
            SettingsField::TitleTextSize => "title_text_size",
            SettingsField::TitleHeight => "title_height",
            SettingsField::LabelHeight => "label_height",
            SettingsField::ScaleOffsetX => "scale_offset_x",
            SettingsField::ScaleOffsetY => "scale_offset_y",
            SettingsField::BgColor => "bg_color",
            SettingsField::NameColor => "name_color",
            SettingsField::TitleBg => "title_bg",
            SettingsField::TitleText => "title_text",
        }
    }

    /// Human readable label used by the customizer
    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Rows => "Rows:",
            SettingsField::Cols => "Cols:",
            SettingsField::CellIconSize => "Icon Size (px):",
            SettingsField::TextSize => "Label Font (px):",
            SettingsField::TitleTextSize => "Title Font (px):",
            SettingsField::TitleHeight => "Title Height (px):",
            SettingsField::LabelHeight => "Label Height (px):",
            SettingsField::ScaleOffsetX => "Offset X:",
            SettingsField::ScaleOffsetY => "Offset Y:",
            SettingsField::BgColor => "Background (HEX):",
            SettingsField::NameColor => "Name Color (HEX):",
            SettingsField::TitleBg => "Title BG (HEX):",
            SettingsField::TitleText => "Title Text (HEX):",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            SettingsField::Rows | SettingsField::Cols => FieldKind::Integer { min: 1, max: 50 },
            SettingsField::CellIconSize => FieldKind::Integer { min: 16, max: 256 },
            SettingsField::TextSize => FieldKind::Integer { min: 6, max: 48 },
            SettingsField::TitleTextSize => FieldKind::Integer { min: 8, max: 72 },
            SettingsField::TitleHeight => FieldKind::Integer { min: 16, max: 120 },
            SettingsField::LabelHeight => FieldKind::Integer { min: 8, max: 64 },
            SettingsField::ScaleOffsetX | SettingsField::ScaleOffsetY => {
                FieldKind::Integer { min: -200, max: 200 }
            }
            SettingsField::BgColor
            | SettingsField::NameColor
            | SettingsField::TitleBg
            | SettingsField::TitleText => FieldKind::Color,
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingsField {
    type Err = SettingsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        SettingsField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| SettingsError::UnknownField(key.to_string()))
    }
}

/// Opaque RGB color persisted as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for HexColor {
    type Err = SettingsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidColor(text.to_string());
        let digits = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                // #abc expands to #aabbcc
                let mut parts = [0u8; 3];
                for (slot, c) in parts.iter_mut().zip(digits.chars()) {
                    let nibble = channel(&c.to_string())?;
                    *slot = nibble * 17;
                }
                Ok(HexColor::rgb(parts[0], parts[1], parts[2]))
            }
            6 => Ok(HexColor::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Value of a single settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i32),
    Color(HexColor),
}

impl FieldValue {
    /// Parses user text for a field
    ///
    /// Integers outside the field's range are clamped into it, the way a
    /// spin box would. Colors must be hex.
    pub fn parse(field: SettingsField, text: &str) -> Result<Self, SettingsError> {
        match field.kind() {
            FieldKind::Integer { min, max } => {
                let value: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| SettingsError::InvalidInteger {
                        field,
                        text: text.to_string(),
                    })?;
                Ok(FieldValue::Integer(value.clamp(min as i64, max as i64) as i32))
            }
            FieldKind::Color => Ok(FieldValue::Color(text.parse()?)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Color(color) => write!(f, "{color}"),
        }
    }
}

/// Complete settings record; missing keys fall back to the defaults on load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    pub rows: i32,
    pub cols: i32,
    pub cell_icon_size: i32,
    pub text_size: i32,
    pub title_text_size: i32,
    pub title_height: i32,
    pub label_height: i32,
    pub scale_offset_x: i32,
    pub scale_offset_y: i32,
    pub bg_color: HexColor,
    pub name_color: HexColor,
    pub title_bg: HexColor,
    pub title_text: HexColor,
}

impl SettingsRecord {
    /// Built-in defaults used for a fresh install and for missing keys
    pub const DEFAULT: SettingsRecord = SettingsRecord {
        rows: 5,
        cols: 4,
        cell_icon_size: 48,
        text_size: 10,
        title_text_size: 14,
        title_height: 28,
        label_height: 16,
        scale_offset_x: 1,
        scale_offset_y: 1,
        bg_color: HexColor::rgb(0x32, 0x32, 0x32),
        name_color: HexColor::rgb(0xff, 0xff, 0xff),
        title_bg: HexColor::rgb(0x9f, 0x00, 0xf0),
        title_text: HexColor::rgb(0xff, 0xff, 0xff),
    };

    pub fn get(&self, field: SettingsField) -> FieldValue {
        match field {
            SettingsField::Rows => FieldValue::Integer(self.rows),
            SettingsField::Cols => FieldValue::Integer(self.cols),
            SettingsField::CellIconSize => FieldValue::Integer(self.cell_icon_size),
            SettingsField::TextSize => FieldValue::Integer(self.text_size),
            SettingsField::TitleTextSize => FieldValue::Integer(self.title_text_size),
            SettingsField::TitleHeight => FieldValue::Integer(self.title_height),
            SettingsField::LabelHeight => FieldValue::Integer(self.label_height),
            SettingsField::ScaleOffsetX => FieldValue::Integer(self.scale_offset_x),
            SettingsField::ScaleOffsetY => FieldValue::Integer(self.scale_offset_y),
            SettingsField::BgColor => FieldValue::Color(self.bg_color),
            SettingsField::NameColor => FieldValue::Color(self.name_color),
            SettingsField::TitleBg => FieldValue::Color(self.title_bg),
            SettingsField::TitleText => FieldValue::Color(self.title_text),
        }
    }

    /// Sets a field, clamping integers into the field's range
    pub fn set(&mut self, field: SettingsField, value: FieldValue) -> Result<(), SettingsError> {
        match (field.kind(), value) {
            (FieldKind::Integer { min, max }, FieldValue::Integer(v)) => {
                if let Some(slot) = self.integer_slot(field) {
                    *slot = v.clamp(min, max);
                }
                Ok(())
            }
            (FieldKind::Color, FieldValue::Color(color)) => {
                if let Some(slot) = self.color_slot(field) {
                    *slot = color;
                }
                Ok(())
            }
            (FieldKind::Integer { .. }, FieldValue::Color(_)) => Err(SettingsError::KindMismatch {
                field,
                expected: "integer",
            }),
            (FieldKind::Color, FieldValue::Integer(_)) => Err(SettingsError::KindMismatch {
                field,
                expected: "color",
            }),
        }
    }

    /// Copies one field from another record
    pub fn copy_field(&mut self, source: &SettingsRecord, field: SettingsField) {
        // kinds always agree, so the set cannot fail
        let _ = self.set(field, source.get(field));
    }

    /// Returns a copy with every integer clamped into its valid range
    pub fn sanitized(mut self) -> Self {
        for field in SettingsField::ALL {
            if let (FieldKind::Integer { min, max }, Some(slot)) =
                (field.kind(), self.integer_slot(field))
            {
                *slot = (*slot).clamp(min, max);
            }
        }
        self
    }

    /// Side of a square grid cell: icon plus label
    pub fn cell_size(&self) -> i32 {
        self.cell_icon_size + self.label_height
    }

    fn integer_slot(&mut self, field: SettingsField) -> Option<&mut i32> {
        match field {
            SettingsField::Rows => Some(&mut self.rows),
            SettingsField::Cols => Some(&mut self.cols),
            SettingsField::CellIconSize => Some(&mut self.cell_icon_size),
            SettingsField::TextSize => Some(&mut self.text_size),
            SettingsField::TitleTextSize => Some(&mut self.title_text_size),
            SettingsField::TitleHeight => Some(&mut self.title_height),
            SettingsField::LabelHeight => Some(&mut self.label_height),
            SettingsField::ScaleOffsetX => Some(&mut self.scale_offset_x),
            SettingsField::ScaleOffsetY => Some(&mut self.scale_offset_y),
            _ => None,
        }
    }

    fn color_slot(&mut self, field: SettingsField) -> Option<&mut HexColor> {
        match field {
            SettingsField::BgColor => Some(&mut self.bg_color),
            SettingsField::NameColor => Some(&mut self.name_color),
            SettingsField::TitleBg => Some(&mut self.title_bg),
            SettingsField::TitleText => Some(&mut self.title_text),
            _ => None,
        }
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self::DEFAULT
    }
}

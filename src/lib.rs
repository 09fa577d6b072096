//! floatboard: floating desktop zones with a global/local settings model
//!
//! The configuration model, zone model, controller and renderer are platform
//! independent. The Win32 windows, tray icon and dialogs live in `ui` and
//! `platform` behind `cfg(windows)`.

pub mod app;
pub mod config;
pub mod domain;
pub mod platform;
pub mod ui;

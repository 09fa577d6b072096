//! Application orchestration layer
//!
//! Zones, their lifecycle, the customizer model, the tray controller that
//! ties them to the store and the window surface, and command dispatch.

pub mod commands;
pub mod controller;
pub mod customizer;
pub mod host;
pub mod session;
pub mod state;
pub mod zone;

pub use controller::{AppError, TrayController};
pub use customizer::{ControlChange, Customizer, CustomizerTarget};
pub use host::{HeadlessHost, ZoneHost};
pub use session::{Dialogs, Flow, Session};
pub use zone::{Zone, ZoneId};

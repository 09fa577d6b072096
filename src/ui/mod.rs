//! Rendering and the Win32 desktop surface
//!
//! `renderer` is portable and tested headless. Everything else talks to
//! Win32 and only builds on Windows.

pub mod renderer;

#[cfg(windows)]
pub mod controls;
#[cfg(windows)]
pub mod customizer_window;
#[cfg(windows)]
pub mod desktop;
#[cfg(windows)]
pub mod host;
#[cfg(windows)]
pub mod prompt;
#[cfg(windows)]
pub mod tray;
#[cfg(windows)]
pub mod zone_window;

pub use renderer::{RendererError, ZoneLayout, ZoneRenderer};

//! Platform services
//!
//! The Win32 implementations live in the `cfg(windows)` submodules. The free
//! functions here are the portable entry points the rest of the crate uses.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::core::Rect;

#[cfg(windows)]
pub mod monitors;
#[cfg(windows)]
pub mod window;
#[cfg(windows)]
pub mod windows;

/// Work area assumed when the desktop cannot be queried
pub const FALLBACK_WORK_AREA: Rect = Rect {
    x: 0,
    y: 0,
    w: 1920,
    h: 1040,
};

/// Errors raised by windowing and shell calls
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to create {what}: {message}")]
    WindowCreation { what: &'static str, message: String },

    #[error("Failed to open {}: {message}", path.display())]
    Launch { path: PathBuf, message: String },

    #[error("System call failed: {0}")]
    System(String),
}

#[cfg(windows)]
impl From<::windows::core::Error> for PlatformError {
    fn from(err: ::windows::core::Error) -> Self {
        PlatformError::System(err.to_string())
    }
}

/// Work area of the primary monitor, excluding the taskbar
pub fn primary_work_area() -> Rect {
    #[cfg(windows)]
    {
        match monitors::primary_work_area() {
            Ok(rect) => return rect,
            Err(err) => log::warn!("Using fallback work area: {err}"),
        }
    }
    FALLBACK_WORK_AREA
}

/// Opens a file or folder with its default handler
pub fn open_path(path: &Path) -> Result<(), PlatformError> {
    if !path.exists() {
        return Err(PlatformError::Launch {
            path: path.to_path_buf(),
            message: "path does not exist".to_string(),
        });
    }

    #[cfg(windows)]
    {
        self::windows::shell_open(path)
    }

    #[cfg(not(windows))]
    {
        let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
        std::process::Command::new(opener)
            .arg(path)
            .spawn()
            .map(|_| ())
            .map_err(|err| PlatformError::Launch {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_launched() {
        let result = open_path(Path::new("/definitely/not/here/floatboard.txt"));
        assert!(matches!(result, Err(PlatformError::Launch { .. })));
    }

    #[test]
    fn work_area_is_never_empty() {
        let area = primary_work_area();
        assert!(area.w > 0 && area.h > 0);
    }
}

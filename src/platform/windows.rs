//! General Windows platform utilities
//!
//! String and rectangle conversions, the shell "open" verb and the folder
//! picker.

use std::path::{Path, PathBuf};

use crate::domain::core::Rect;
use crate::platform::PlatformError;
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance, CoTaskMemFree};
use windows::Win32::UI::Shell::{
    FOS_FORCEFILESYSTEM, FOS_PICKFOLDERS, FileOpenDialog, IFileOpenDialog, SIGDN_FILESYSPATH,
    ShellExecuteW,
};
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
use windows::core::{PCWSTR, w};

/// Converts a string to a null-terminated UTF-16 buffer
pub fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Reads a UTF-16 buffer up to its first null
pub fn from_wide(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

/// Converts a domain rectangle to Windows RECT structure
pub fn rect_to_win32_rect(rect: &Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

/// Converts a Windows RECT to domain rectangle
pub fn win32_rect_to_rect(rect: &RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right - rect.left, rect.bottom - rect.top)
}

/// Opens `path` with the shell's default verb
pub fn shell_open(path: &Path) -> Result<(), PlatformError> {
    let target = to_wide(&path.to_string_lossy());
    let result = unsafe {
        ShellExecuteW(
            HWND(0),
            w!("open"),
            PCWSTR(target.as_ptr()),
            PCWSTR::null(),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };

    // values up to 32 are error codes
    if result.0 <= 32 {
        return Err(PlatformError::Launch {
            path: path.to_path_buf(),
            message: format!("ShellExecuteW returned {}", result.0),
        });
    }
    Ok(())
}

/// Shows the system folder picker
///
/// # Returns
/// The chosen folder, or None if the user cancelled
pub fn pick_folder(owner: HWND, title: &str) -> Result<Option<PathBuf>, PlatformError> {
    unsafe {
        let dialog: IFileOpenDialog = CoCreateInstance(&FileOpenDialog, None, CLSCTX_INPROC_SERVER)?;
        let options = dialog.GetOptions()?;
        dialog.SetOptions(options | FOS_PICKFOLDERS | FOS_FORCEFILESYSTEM)?;

        let title = to_wide(title);
        dialog.SetTitle(PCWSTR(title.as_ptr()))?;

        if dialog.Show(owner).is_err() {
            // cancelling reports ERROR_CANCELLED
            return Ok(None);
        }

        let item = dialog.GetResult()?;
        let raw = item.GetDisplayName(SIGDN_FILESYSPATH)?;
        let path = raw.to_string();
        CoTaskMemFree(Some(raw.0 as *const _));

        let path = path.map_err(|err| PlatformError::System(err.to_string()))?;
        Ok(Some(PathBuf::from(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_round_trip() {
        let wide = to_wide("Zone ü");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(from_wide(&wide), "Zone ü");
    }

    #[test]
    fn rect_conversions() {
        let rect = Rect::new(10, 20, 300, 400);
        let win = rect_to_win32_rect(&rect);
        assert_eq!((win.left, win.top, win.right, win.bottom), (10, 20, 310, 420));
        assert_eq!(win32_rect_to_rect(&win), rect);
    }
}

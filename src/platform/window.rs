//! Zone window placement and style helpers
//!
//! Zone windows sit at the bottom of the Z-order, just above the desktop, and
//! never take focus when moved.

use crate::domain::core::Rect;
use crate::platform::PlatformError;
use crate::platform::windows::win32_rect_to_rect;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

/// Extended style with the click-through bit set or cleared
pub fn click_through_style(ex_style: u32, enabled: bool) -> u32 {
    if enabled {
        ex_style | WS_EX_TRANSPARENT.0
    } else {
        ex_style & !WS_EX_TRANSPARENT.0
    }
}

/// Lets mouse input fall through the window to whatever is below it
pub fn set_click_through(hwnd: HWND, enabled: bool) {
    unsafe {
        let current = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
        let updated = click_through_style(current, enabled);
        if updated != current {
            SetWindowLongW(hwnd, GWL_EXSTYLE, updated as i32);
        }
    }
}

/// Pushes the window behind every other top-level window
pub fn send_to_bottom(hwnd: HWND) {
    unsafe {
        let _ = SetWindowPos(
            hwnd,
            HWND_BOTTOM,
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        );
    }
}

/// Moves and resizes a window without activating it
pub fn place_window(hwnd: HWND, rect: Rect) -> Result<(), PlatformError> {
    unsafe {
        if !IsWindow(hwnd).as_bool() {
            return Err(PlatformError::System(format!("invalid window handle {hwnd:?}")));
        }
        SetWindowPos(
            hwnd,
            HWND_BOTTOM,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            SWP_NOACTIVATE,
        )?;
    }
    Ok(())
}

/// Current window rectangle in screen coordinates
pub fn window_rect(hwnd: HWND) -> Result<Rect, PlatformError> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect)? };
    Ok(win32_rect_to_rect(&rect))
}

/// Cursor position in screen coordinates
pub fn cursor_position() -> (i32, i32) {
    let mut point = POINT::default();
    unsafe {
        let _ = GetCursorPos(&mut point);
    }
    (point.x, point.y)
}

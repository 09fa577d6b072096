//! Monitor work area lookup
//!
//! Zones are placed on the primary monitor only. Coordinates are real pixels
//! because the process declares per-monitor DPI awareness at startup.

use crate::domain::core::Rect;
use crate::platform::PlatformError;
use crate::platform::windows::win32_rect_to_rect;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;

/// Work area of the primary monitor (excluding the taskbar)
pub fn primary_work_area() -> Result<Rect, PlatformError> {
    // the primary monitor always contains the origin
    work_area_at(0, 0)
}

/// Work area of the monitor nearest to a screen point
pub fn work_area_at(x: i32, y: i32) -> Result<Rect, PlatformError> {
    unsafe {
        let hmonitor = MonitorFromPoint(POINT { x, y }, MONITOR_DEFAULTTOPRIMARY);
        if hmonitor.is_invalid() {
            return Err(PlatformError::System(format!("no monitor at ({x}, {y})")));
        }

        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if GetMonitorInfoW(hmonitor, &mut info) == FALSE {
            return Err(PlatformError::System(format!(
                "GetMonitorInfoW failed for {hmonitor:?}"
            )));
        }

        Ok(win32_rect_to_rect(&info.rcWork))
    }
}

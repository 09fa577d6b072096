//! Notification area icon and its menu
//!
//! A hidden popup window receives the icon's callback messages. Menu picks
//! become [`TrayCommand`]s on the command queue.

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::w;

use crate::app::commands::{self, TrayCommand, UiCommand};
use crate::platform::PlatformError;
use crate::platform::window::cursor_position;
use crate::ui::controls::{append_menu_item, append_menu_separator, register_class, track_menu};

/// Callback message for icon events
const WM_TRAY_CALLBACK: u32 = WM_APP + 1;
const TRAY_ICON_ID: u32 = 1;
const TOOLTIP: &str = "Floatboard";

const MENU_ADD_ZONE: usize = 1;
const MENU_GLOBAL_CUSTOMIZE: usize = 2;
const MENU_CLICK_THROUGH: usize = 3;
const MENU_QUIT: usize = 4;

/// Menu state read by the window procedure
struct TrayState {
    click_through: bool,
}

pub struct TrayIcon {
    hwnd: HWND,
    state: Box<TrayState>,
}

impl TrayIcon {
    pub fn create() -> Result<Self, PlatformError> {
        let class_name = w!("FloatboardTrayWindow");
        let instance = register_class(class_name, WNDCLASS_STYLES(0), Some(tray_window_proc))?;

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOOLWINDOW,
                class_name,
                w!("Floatboard"),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                instance,
                None,
            )
        };
        if hwnd.0 == 0 {
            return Err(PlatformError::WindowCreation {
                what: "tray window",
                message: "CreateWindowExW returned null".to_string(),
            });
        }

        let mut state = Box::new(TrayState { click_through: false });
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, state.as_mut() as *mut TrayState as isize);
        }

        let mut data = notify_data(hwnd);
        data.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
        data.uCallbackMessage = WM_TRAY_CALLBACK;
        data.hIcon = unsafe { LoadIconW(None, IDI_APPLICATION).unwrap_or_default() };
        for (slot, unit) in data.szTip.iter_mut().zip(TOOLTIP.encode_utf16()) {
            *slot = unit;
        }

        if !unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
            unsafe {
                DestroyWindow(hwnd).ok();
            }
            return Err(PlatformError::WindowCreation {
                what: "tray icon",
                message: "Shell_NotifyIconW(NIM_ADD) failed".to_string(),
            });
        }

        log::debug!("Tray icon added");
        Ok(Self { hwnd, state })
    }

    /// Window that owns menus and dialogs
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Mirrors the controller's click-through flag in the menu check mark
    pub fn set_click_through(&mut self, enabled: bool) {
        self.state.click_through = enabled;
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        unsafe {
            let data = notify_data(self.hwnd);
            let _ = Shell_NotifyIconW(NIM_DELETE, &data);
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            DestroyWindow(self.hwnd).ok();
        }
    }
}

fn notify_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        ..Default::default()
    }
}

fn show_tray_menu(hwnd: HWND, click_through: bool) {
    let Ok(menu) = (unsafe { CreatePopupMenu() }) else {
        return;
    };
    append_menu_item(menu, MENU_ADD_ZONE, "Add Zone", false);
    append_menu_item(menu, MENU_GLOBAL_CUSTOMIZE, "Global Customize", false);
    append_menu_item(menu, MENU_CLICK_THROUGH, "Click-through", click_through);
    append_menu_separator(menu);
    append_menu_item(menu, MENU_QUIT, "Quit", false);

    let command = match track_menu(hwnd, menu, cursor_position()) {
        Some(MENU_ADD_ZONE) => TrayCommand::AddZone,
        Some(MENU_GLOBAL_CUSTOMIZE) => TrayCommand::GlobalCustomize,
        Some(MENU_CLICK_THROUGH) => TrayCommand::ToggleClickThrough,
        Some(MENU_QUIT) => TrayCommand::Quit,
        _ => return,
    };
    commands::post(UiCommand::Tray(command));
}

unsafe extern "system" fn tray_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_TRAY_CALLBACK => {
            let event = (lparam.0 & 0xFFFF) as u32;
            if event == WM_RBUTTONUP || event == WM_LBUTTONUP {
                let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const TrayState;
                let click_through = !ptr.is_null() && unsafe { (*ptr).click_through };
                show_tray_menu(hwnd, click_through);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

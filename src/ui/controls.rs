//! Small Win32 control helpers shared by the tray, dialogs and zone windows

use std::sync::Once;

use crate::platform::PlatformError;
use crate::platform::windows::{from_wide, to_wide};
use windows::Win32::Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, WIN32_ERROR, WPARAM};
use windows::Win32::Graphics::Gdi::{DEFAULT_GUI_FONT, GetStockObject, HFONT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{
    ICC_STANDARD_CLASSES, ICC_WIN95_CLASSES, INITCOMMONCONTROLSEX, InitCommonControlsEx,
};
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::{PCWSTR, w};

// Matches the Win32 ERROR_CLASS_ALREADY_EXISTS (1410) code.
const CLASS_ALREADY_EXISTS_ERR: WIN32_ERROR = WIN32_ERROR(1410);

const BST_CHECKED: usize = 1;

pub fn ensure_common_controls() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let icc = INITCOMMONCONTROLSEX {
            dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_WIN95_CLASSES | ICC_STANDARD_CLASSES,
        };
        unsafe {
            InitCommonControlsEx(&icc);
        }
    });
}

pub fn module_instance() -> Result<HINSTANCE, PlatformError> {
    let module = unsafe { GetModuleHandleW(PCWSTR::null())? };
    Ok(module.into())
}

/// Registers a window class; an existing registration is fine
pub fn register_class(
    class_name: PCWSTR,
    style: WNDCLASS_STYLES,
    proc: WNDPROC,
) -> Result<HINSTANCE, PlatformError> {
    let instance = module_instance()?;
    unsafe {
        let wnd_class = WNDCLASSW {
            style,
            lpfnWndProc: proc,
            hInstance: instance,
            lpszClassName: class_name,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            ..Default::default()
        };

        if RegisterClassW(&wnd_class) == 0 {
            match GetLastError() {
                Err(err) if err.code() == CLASS_ALREADY_EXISTS_ERR.to_hresult() => {}
                Err(err) => {
                    return Err(PlatformError::WindowCreation {
                        what: "window class",
                        message: err.to_string(),
                    });
                }
                Ok(()) => {}
            }
        }
    }
    Ok(instance)
}

pub fn default_font() -> HFONT {
    unsafe { HFONT(GetStockObject(DEFAULT_GUI_FONT).0) }
}

pub fn apply_font(hwnd: HWND, font: HFONT) {
    unsafe {
        SendMessageW(hwnd, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
    }
}

fn create_child(
    parent: HWND,
    class: PCWSTR,
    style: u32,
    id: i32,
    (x, y, width, height): (i32, i32, i32, i32),
) -> HWND {
    unsafe {
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            class,
            PCWSTR::null(),
            WINDOW_STYLE(WS_CHILD.0 | WS_VISIBLE.0 | style),
            x,
            y,
            width,
            height,
            parent,
            HMENU(id as isize),
            None,
            None,
        );
        apply_font(hwnd, default_font());
        hwnd
    }
}

pub fn create_static(parent: HWND, text: &str, bounds: (i32, i32, i32, i32)) -> HWND {
    let hwnd = create_child(parent, w!("STATIC"), 0, 0, bounds);
    set_control_text(hwnd, text);
    hwnd
}

pub fn create_edit(parent: HWND, id: i32, text: &str, bounds: (i32, i32, i32, i32)) -> HWND {
    let style = WS_BORDER.0 | WS_TABSTOP.0 | (ES_AUTOHSCROLL as u32);
    let hwnd = create_child(parent, w!("EDIT"), style, id, bounds);
    set_control_text(hwnd, text);
    hwnd
}

pub fn create_checkbox(parent: HWND, id: i32, text: &str, checked: bool, bounds: (i32, i32, i32, i32)) -> HWND {
    let style = WS_TABSTOP.0 | (BS_AUTOCHECKBOX as u32);
    let hwnd = create_child(parent, w!("BUTTON"), style, id, bounds);
    set_control_text(hwnd, text);
    set_checked(hwnd, checked);
    hwnd
}

pub fn create_button(parent: HWND, id: i32, text: &str, default: bool, bounds: (i32, i32, i32, i32)) -> HWND {
    let kind = if default { BS_DEFPUSHBUTTON } else { BS_PUSHBUTTON };
    let hwnd = create_child(parent, w!("BUTTON"), WS_TABSTOP.0 | (kind as u32), id, bounds);
    set_control_text(hwnd, text);
    hwnd
}

pub fn set_control_text(hwnd: HWND, text: &str) {
    let wide = to_wide(text);
    unsafe {
        let _ = SetWindowTextW(hwnd, PCWSTR(wide.as_ptr()));
    }
}

pub fn control_text(hwnd: HWND) -> String {
    unsafe {
        let length = GetWindowTextLengthW(hwnd).max(0) as usize;
        let mut buffer = vec![0u16; length + 1];
        let copied = GetWindowTextW(hwnd, &mut buffer).max(0) as usize;
        from_wide(&buffer[..copied.min(buffer.len())])
    }
}

pub fn is_checked(hwnd: HWND) -> bool {
    unsafe { SendMessageW(hwnd, BM_GETCHECK, WPARAM(0), LPARAM(0)).0 as usize == BST_CHECKED }
}

pub fn set_checked(hwnd: HWND, checked: bool) {
    unsafe {
        SendMessageW(hwnd, BM_SETCHECK, WPARAM(usize::from(checked)), LPARAM(0));
    }
}

/// Splits a WM_COMMAND wparam into (control id, notification code)
pub fn command_parts(wparam: WPARAM) -> (i32, u32) {
    ((wparam.0 & 0xFFFF) as i32, ((wparam.0 >> 16) & 0xFFFF) as u32)
}

/// Signed client or screen coordinates packed in an lparam
pub fn point_from_lparam(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32;
    (x, y)
}

/// Appends a string item to a popup menu
pub fn append_menu_item(menu: HMENU, id: usize, text: &str, checked: bool) {
    let wide = to_wide(text);
    let flags = if checked { MF_STRING | MF_CHECKED } else { MF_STRING };
    unsafe {
        let _ = AppendMenuW(menu, flags, id, PCWSTR(wide.as_ptr()));
    }
}

pub fn append_menu_separator(menu: HMENU) {
    unsafe {
        let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
    }
}

/// Shows a popup menu at a screen point and waits for a pick
///
/// # Returns
/// The chosen item id, or None when the menu was dismissed
pub fn track_menu(owner: HWND, menu: HMENU, (x, y): (i32, i32)) -> Option<usize> {
    unsafe {
        // required for the menu to close when focus moves elsewhere
        let _ = SetForegroundWindow(owner);
        let picked = TrackPopupMenu(menu, TPM_RETURNCMD | TPM_RIGHTBUTTON, x, y, 0, owner, None);
        let _ = DestroyMenu(menu);
        let _ = PostMessageW(owner, WM_NULL, WPARAM(0), LPARAM(0));
        (picked.0 > 0).then_some(picked.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parts_split_id_and_code() {
        let wparam = WPARAM(((EN_CHANGE as usize) << 16) | 1203);
        assert_eq!(command_parts(wparam), (1203, EN_CHANGE));
    }

    #[test]
    fn lparam_points_are_signed() {
        let packed = ((-5i16 as u16 as isize) << 16) | (-20i16 as u16 as isize);
        assert_eq!(point_from_lparam(LPARAM(packed)), (-20, -5));
        assert_eq!(point_from_lparam(LPARAM((40 << 16) | 30)), (30, 40));
    }
}

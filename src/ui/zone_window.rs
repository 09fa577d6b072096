//! Layered desktop window for one zone
//!
//! Each zone is a borderless layered tool window kept at the bottom of the
//! Z-order. Frames are rendered by [`ZoneRenderer`] and pushed with
//! `UpdateLayeredWindow`. Mouse and keyboard input is translated into
//! [`ZoneCommand`]s and queued for the main loop.

use std::ffi::c_void;

use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC,
    CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::UI::Controls::{TOOLTIPS_CLASSW, TTF_SUBCLASS, TTM_ADDTOOLW, TTM_UPDATETIPTEXTW, TOOLINFOW};
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::{PCWSTR, PWSTR, w};

use crate::app::commands::{self, SearchKey, TitleAction, UiCommand, ZoneCommand};
use crate::app::zone::{Zone, ZoneId};
use crate::domain::grid::ZoneGrid;
use crate::platform::PlatformError;
use crate::platform::window::{cursor_position, send_to_bottom, set_click_through, window_rect};
use crate::platform::windows::to_wide;
use crate::ui::controls::{
    append_menu_item, append_menu_separator, point_from_lparam, register_class, track_menu,
};
use crate::ui::renderer::{RendererError, ZoneLayout, ZoneRenderer, pixmap_to_bgra};

/// Width of the resize band along the right and bottom edges
const RESIZE_MARGIN: i32 = 6;
const WHEEL_DELTA: i32 = 120;
const TTS_ALWAYSTIP: u32 = 0x01;

const MENU_CHANGE_FOLDER: usize = 1;
const MENU_RENAME: usize = 2;
const MENU_LOCK: usize = 3;
const MENU_CUSTOMIZE: usize = 4;
const MENU_CLOSE: usize = 5;
const MENU_SEARCH: usize = 10;

/// Frame presentation errors
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("Failed to acquire screen device context")]
    DeviceContextFailed,

    #[error("Failed to create memory device context")]
    MemoryDeviceContextFailed,

    #[error("Failed to create DIB section for zone frame")]
    DibSectionCreationFailed,

    #[error("Failed to select bitmap into memory DC")]
    BitmapSelectionFailed,

    #[error("Failed to update layered window surface")]
    LayerUpdateFailed,

    #[error("Rendering failed: {0}")]
    Rendering(#[from] RendererError),
}

/// What the window procedure needs to know about its zone
struct WindowState {
    id: ZoneId,
    grid: ZoneGrid,
    locked: bool,
    collapsed: bool,
    search_open: bool,
    tooltip: HWND,
    /// Tooltip text per visible slot
    tips: Vec<Option<String>>,
    hover_slot: Option<usize>,
}

pub struct ZoneWindow {
    hwnd: HWND,
    state: Box<WindowState>,
}

impl ZoneWindow {
    /// Creates the (hidden) window for a zone
    pub fn create(zone: &Zone) -> Result<Self, PlatformError> {
        let class_name = w!("FloatboardZoneWindow");
        let instance = register_class(class_name, CS_DBLCLKS, Some(zone_window_proc))?;

        let geometry = zone.geometry();
        let title = to_wide(zone.name());
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TOOLWINDOW,
                class_name,
                PCWSTR(title.as_ptr()),
                WS_POPUP,
                geometry.x,
                geometry.y,
                geometry.w,
                geometry.h,
                None,
                None,
                instance,
                None,
            )
        };
        if hwnd.0 == 0 {
            return Err(PlatformError::WindowCreation {
                what: "zone window",
                message: format!("{} '{}'", zone.id(), zone.name()),
            });
        }

        let mut state = Box::new(WindowState {
            id: zone.id(),
            grid: *zone.grid(),
            locked: zone.is_locked(),
            collapsed: zone.is_collapsed(),
            search_open: zone.search().is_some(),
            tooltip: HWND(0),
            tips: Vec::new(),
            hover_slot: None,
        });
        state.tooltip = create_tooltip(hwnd);

        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, state.as_mut() as *mut WindowState as isize);
        }

        Ok(Self { hwnd, state })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn show(&self) {
        unsafe {
            ShowWindow(self.hwnd, SW_SHOWNOACTIVATE);
        }
        send_to_bottom(self.hwnd);
    }

    pub fn set_click_through(&self, enabled: bool) {
        set_click_through(self.hwnd, enabled);
    }

    /// Copies the zone's interaction state and presents a new frame
    pub fn sync(&mut self, zone: &Zone, renderer: &ZoneRenderer) -> Result<(), PresentError> {
        self.state.grid = *zone.grid();
        self.state.locked = zone.is_locked();
        self.state.collapsed = zone.is_collapsed();
        self.state.search_open = zone.search().is_some();

        let mut tips = vec![None; zone.grid().capacity()];
        for (slot, entry) in zone.visible_entries() {
            if let Some(tip) = tips.get_mut(slot) {
                *tip = Some(entry.tooltip());
            }
        }
        self.state.tips = tips;
        self.state.hover_slot = None;
        update_tooltip(self.hwnd, self.state.tooltip, "");

        let title = to_wide(zone.name());
        unsafe {
            let _ = SetWindowTextW(self.hwnd, PCWSTR(title.as_ptr()));
        }

        let layout = ZoneLayout::from_zone(zone)?;
        let pixmap = renderer.render(&layout)?;
        let origin = zone.geometry();
        self.present_pixmap(&pixmap, POINT { x: origin.x, y: origin.y })
    }

    /// Present the pixmap via UpdateLayeredWindow for flicker-free rendering
    fn present_pixmap(&self, pixmap: &tiny_skia::Pixmap, origin: POINT) -> Result<(), PresentError> {
        use std::slice;

        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let pixels = pixmap_to_bgra(pixmap);

        unsafe {
            let screen_dc = GetDC(HWND(0));
            if screen_dc.0 == 0 {
                return Err(PresentError::DeviceContextFailed);
            }

            let memory_dc = CreateCompatibleDC(screen_dc);
            if memory_dc.0 == 0 {
                ReleaseDC(HWND(0), screen_dc);
                return Err(PresentError::MemoryDeviceContextFailed);
            }

            let mut bitmap_info = BITMAPINFO::default();
            bitmap_info.bmiHeader = BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // top-down bitmap so we can copy directly
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut pixel_ptr: *mut c_void = std::ptr::null_mut();
            let dib = match CreateDIBSection(memory_dc, &bitmap_info, DIB_RGB_COLORS, &mut pixel_ptr, None, 0) {
                Ok(bitmap) => bitmap,
                Err(_) => {
                    DeleteDC(memory_dc);
                    ReleaseDC(HWND(0), screen_dc);
                    return Err(PresentError::DibSectionCreationFailed);
                }
            };
            let dib_object: HGDIOBJ = dib.into();

            if pixel_ptr.is_null() {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(PresentError::DibSectionCreationFailed);
            }

            slice::from_raw_parts_mut(pixel_ptr as *mut u8, pixels.len()).copy_from_slice(&pixels);

            let old_bitmap = SelectObject(memory_dc, dib_object);
            if old_bitmap.0 == 0 {
                DeleteObject(dib_object);
                DeleteDC(memory_dc);
                ReleaseDC(HWND(0), screen_dc);
                return Err(PresentError::BitmapSelectionFailed);
            }

            let size = SIZE { cx: width, cy: height };
            let src_point = POINT { x: 0, y: 0 };
            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                BlendFlags: 0,
                SourceConstantAlpha: 255,
                AlphaFormat: AC_SRC_ALPHA as u8,
            };

            let update_result = UpdateLayeredWindow(
                self.hwnd,
                screen_dc,
                Some(&origin),
                Some(&size),
                memory_dc,
                Some(&src_point),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            SelectObject(memory_dc, old_bitmap);
            DeleteObject(dib_object);
            DeleteDC(memory_dc);
            ReleaseDC(HWND(0), screen_dc);

            if update_result.is_err() {
                return Err(PresentError::LayerUpdateFailed);
            }
        }

        Ok(())
    }
}

impl Drop for ZoneWindow {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            DestroyWindow(self.hwnd).ok();
        }
    }
}

fn create_tooltip(owner: HWND) -> HWND {
    unsafe {
        let tooltip = CreateWindowExW(
            WS_EX_TOPMOST,
            TOOLTIPS_CLASSW,
            PCWSTR::null(),
            WINDOW_STYLE(WS_POPUP.0 | TTS_ALWAYSTIP),
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            owner,
            None,
            None,
            None,
        );
        if tooltip.0 == 0 {
            log::warn!("Tooltip creation failed; entries will show no tooltips");
            return tooltip;
        }

        let mut empty = to_wide("");
        let info = tool_info(owner, &mut empty);
        SendMessageW(tooltip, TTM_ADDTOOLW, WPARAM(0), LPARAM(&info as *const _ as isize));
        tooltip
    }
}

fn tool_info(owner: HWND, text: &mut [u16]) -> TOOLINFOW {
    TOOLINFOW {
        cbSize: std::mem::size_of::<TOOLINFOW>() as u32,
        uFlags: TTF_SUBCLASS,
        hwnd: owner,
        uId: 1,
        rect: RECT {
            left: 0,
            top: 0,
            right: i32::MAX / 2,
            bottom: i32::MAX / 2,
        },
        lpszText: PWSTR(text.as_mut_ptr()),
        ..Default::default()
    }
}

fn update_tooltip(owner: HWND, tooltip: HWND, text: &str) {
    if tooltip.0 == 0 {
        return;
    }
    let mut wide = to_wide(text);
    let info = tool_info(owner, &mut wide);
    unsafe {
        SendMessageW(tooltip, TTM_UPDATETIPTEXTW, WPARAM(0), LPARAM(&info as *const _ as isize));
    }
}

unsafe fn window_state_mut(hwnd: HWND) -> Option<&'static mut WindowState> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut WindowState;
    if ptr.is_null() { None } else { Some(unsafe { &mut *ptr }) }
}

/// Converts a screen point to window-relative coordinates
fn to_client(hwnd: HWND, (x, y): (i32, i32)) -> (i32, i32) {
    match window_rect(hwnd) {
        Ok(rect) => (x - rect.x, y - rect.y),
        Err(_) => (x, y),
    }
}

fn post(state: &WindowState, command: ZoneCommand) {
    commands::post(UiCommand::Zone(state.id, command));
}

fn hit_test(hwnd: HWND, state: &WindowState, screen: (i32, i32)) -> u32 {
    let Ok(rect) = window_rect(hwnd) else {
        return HTCLIENT;
    };
    let (x, y) = (screen.0 - rect.x, screen.1 - rect.y);

    if !state.locked && !state.collapsed {
        let right = x >= rect.w - RESIZE_MARGIN;
        let bottom = y >= rect.h - RESIZE_MARGIN;
        match (right, bottom) {
            (true, true) => return HTBOTTOMRIGHT,
            (true, false) => return HTRIGHT,
            (false, true) => return HTBOTTOM,
            (false, false) => {}
        }
    }

    if y < state.grid.title_height() && !state.locked {
        HTCAPTION
    } else {
        HTCLIENT
    }
}

fn show_title_menu(hwnd: HWND, state: &WindowState, screen: (i32, i32)) {
    let Ok(menu) = (unsafe { CreatePopupMenu() }) else {
        return;
    };
    append_menu_item(menu, MENU_CHANGE_FOLDER, "Change Folder", false);
    append_menu_item(menu, MENU_RENAME, "Rename", false);
    append_menu_item(menu, MENU_LOCK, "Lock Movement", state.locked);
    append_menu_item(menu, MENU_CUSTOMIZE, "Customize", false);
    append_menu_separator(menu);
    append_menu_item(menu, MENU_CLOSE, "Close Zone", false);

    let action = match track_menu(hwnd, menu, screen) {
        Some(MENU_CHANGE_FOLDER) => TitleAction::ChangeFolder,
        Some(MENU_RENAME) => TitleAction::Rename,
        Some(MENU_LOCK) => TitleAction::ToggleLock,
        Some(MENU_CUSTOMIZE) => TitleAction::Customize,
        Some(MENU_CLOSE) => TitleAction::Close,
        _ => return,
    };
    post(state, ZoneCommand::Title(action));
}

fn show_grid_menu(hwnd: HWND, state: &WindowState, screen: (i32, i32)) {
    let Ok(menu) = (unsafe { CreatePopupMenu() }) else {
        return;
    };
    append_menu_item(menu, MENU_SEARCH, "Search", state.search_open);
    if track_menu(hwnd, menu, screen) == Some(MENU_SEARCH) {
        post(state, ZoneCommand::ToggleSearch);
    }
}

unsafe extern "system" fn zone_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let Some(state) = (unsafe { window_state_mut(hwnd) }) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    match msg {
        WM_NCHITTEST => LRESULT(hit_test(hwnd, state, point_from_lparam(lparam)) as isize),
        WM_WINDOWPOSCHANGING => {
            let pos = unsafe { &mut *(lparam.0 as *mut WINDOWPOS) };
            pos.hwndInsertAfter = HWND_BOTTOM;
            LRESULT(0)
        }
        WM_EXITSIZEMOVE => {
            match window_rect(hwnd) {
                Ok(rect) => post(state, ZoneCommand::Moved(rect)),
                Err(err) => log::warn!("Cannot read position of {}: {err}", state.id),
            }
            LRESULT(0)
        }
        WM_NCLBUTTONDBLCLK if wparam.0 as u32 == HTCAPTION => {
            post(state, ZoneCommand::ToggleCollapse);
            LRESULT(0)
        }
        WM_LBUTTONDBLCLK => {
            let (x, y) = point_from_lparam(lparam);
            if y < state.grid.title_height() {
                post(state, ZoneCommand::ToggleCollapse);
            } else if let Some(slot) = state.grid.slot_at(x, y) {
                post(state, ZoneCommand::Launch { slot });
            }
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            let (x, y) = point_from_lparam(lparam);
            let slot = state.grid.slot_at(x, y).filter(|slot| {
                state.tips.get(*slot).is_some_and(Option::is_some)
            });
            if slot != state.hover_slot {
                state.hover_slot = slot;
                let text = slot
                    .and_then(|slot| state.tips.get(slot).cloned().flatten())
                    .unwrap_or_default();
                update_tooltip(hwnd, state.tooltip, &text);
            }
            LRESULT(0)
        }
        WM_MOUSEWHEEL => {
            let delta = ((wparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32;
            let rows = match -delta / WHEEL_DELTA {
                0 => -delta.signum(),
                rows => rows,
            };
            if rows != 0 && !state.collapsed {
                post(state, ZoneCommand::Scroll(rows));
            }
            LRESULT(0)
        }
        WM_CHAR => {
            if state.search_open {
                if let Some(key) = SearchKey::from_char_code(wparam.0 as u32) {
                    post(state, ZoneCommand::Search(key));
                }
            }
            LRESULT(0)
        }
        WM_CONTEXTMENU => {
            let mut screen = point_from_lparam(lparam);
            if screen == (-1, -1) {
                // keyboard invocation
                screen = cursor_position();
            }
            let (_, y) = to_client(hwnd, screen);
            if y < state.grid.title_height() {
                show_title_menu(hwnd, state, screen);
            } else if !state.collapsed {
                show_grid_menu(hwnd, state, screen);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

//! Modal single-line text prompt used to rename zones

use std::thread;
use std::time::Duration;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{EnableWindow, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::{PCWSTR, w};

use crate::platform::PlatformError;
use crate::platform::windows::to_wide;
use crate::ui::controls::{
    command_parts, control_text, create_button, create_edit, create_static, ensure_common_controls, register_class,
};

const DIALOG_WIDTH: i32 = 340;
const DIALOG_HEIGHT: i32 = 150;

// IsDialogMessageW maps Enter and Escape to these ids
const ID_BTN_OK: i32 = 1;
const ID_BTN_CANCEL: i32 = 2;
const ID_EDIT: i32 = 100;

struct PromptState {
    hwnd: HWND,
    edit: HWND,
    label: String,
    initial: String,
    result: Option<String>,
}

/// Shows the prompt and blocks until it closes
///
/// # Returns
/// The entered text, or None when cancelled
pub fn prompt_text(owner: HWND, title: &str, label: &str, initial: &str) -> Result<Option<String>, PlatformError> {
    ensure_common_controls();
    let class_name = w!("FloatboardPrompt");
    let instance = register_class(class_name, CS_HREDRAW | CS_VREDRAW, Some(prompt_wnd_proc))?;

    let state_ptr = Box::into_raw(Box::new(PromptState {
        hwnd: HWND(0),
        edit: HWND(0),
        label: label.to_string(),
        initial: initial.to_string(),
        result: None,
    }));

    let wide_title = to_wide(title);
    unsafe {
        let hwnd = CreateWindowExW(
            WS_EX_DLGMODALFRAME | WS_EX_TOPMOST,
            class_name,
            PCWSTR(wide_title.as_ptr()),
            WS_POPUP | WS_CAPTION | WS_SYSMENU,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            DIALOG_WIDTH,
            DIALOG_HEIGHT,
            owner,
            None,
            instance,
            Some(state_ptr as *const _),
        );
        if hwnd.0 == 0 {
            let _ = Box::from_raw(state_ptr);
            return Err(PlatformError::WindowCreation {
                what: "text prompt",
                message: title.to_string(),
            });
        }

        if owner.0 != 0 {
            let _ = EnableWindow(owner, false);
        }
        ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        let _ = SetFocus((*state_ptr).edit);
        SendMessageW((*state_ptr).edit, EM_SETSEL, WPARAM(0), LPARAM(-1));

        run_modal_loop(state_ptr);

        if owner.0 != 0 {
            let _ = EnableWindow(owner, true);
        }
        let state = Box::from_raw(state_ptr);
        Ok(state.result)
    }
}

impl PromptState {
    fn build_controls(&mut self) {
        create_static(self.hwnd, &self.label, (12, 12, DIALOG_WIDTH - 40, 20));
        self.edit = create_edit(self.hwnd, ID_EDIT, &self.initial, (12, 36, DIALOG_WIDTH - 40, 24));
        create_button(self.hwnd, ID_BTN_OK, "OK", true, (DIALOG_WIDTH - 206, 72, 90, 26));
        create_button(self.hwnd, ID_BTN_CANCEL, "Cancel", false, (DIALOG_WIDTH - 110, 72, 90, 26));
    }

    fn handle_command(&mut self, wparam: WPARAM) {
        match command_parts(wparam).0 {
            ID_BTN_OK => {
                self.result = Some(control_text(self.edit));
                unsafe {
                    let _ = DestroyWindow(self.hwnd);
                }
            }
            ID_BTN_CANCEL => unsafe {
                let _ = DestroyWindow(self.hwnd);
            },
            _ => {}
        }
    }
}

fn run_modal_loop(state_ptr: *mut PromptState) {
    unsafe {
        let mut msg = MSG::default();
        while (*state_ptr).hwnd.0 != 0 && IsWindow((*state_ptr).hwnd).as_bool() {
            if PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    let _ = PostMessageW(HWND(0), WM_QUIT, msg.wParam, msg.lParam);
                    break;
                }

                if !IsDialogMessageW((*state_ptr).hwnd, &msg).as_bool() {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            } else {
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

unsafe fn prompt_state_mut(hwnd: HWND) -> Option<&'static mut PromptState> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut PromptState;
    unsafe { ptr.as_mut() }
}

unsafe extern "system" fn prompt_wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CREATE => {
            let createstruct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, createstruct.lpCreateParams as isize) };
            if let Some(state) = unsafe { prompt_state_mut(hwnd) } {
                state.hwnd = hwnd;
                state.build_controls();
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            if let Some(state) = unsafe { prompt_state_mut(hwnd) } {
                state.handle_command(wparam);
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            if let Some(state) = unsafe { prompt_state_mut(hwnd) } {
                state.hwnd = HWND(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

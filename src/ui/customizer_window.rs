//! Non-modal customizer window
//!
//! One row per settings field: a label, an edit box and, for a zone, an
//! "Override" checkbox. Every edit or click is queued as a
//! [`ControlChange`] and applied live by the main loop. Programmatic text
//! updates are suppressed so they do not echo back as user edits.

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::{PCWSTR, w};

use crate::app::commands::{self, UiCommand};
use crate::app::customizer::{ControlChange, Customizer};
use crate::config::SettingsField;
use crate::platform::PlatformError;
use crate::platform::windows::to_wide;
use crate::ui::controls::{
    command_parts, control_text, create_button, create_checkbox, create_edit, create_static, is_checked,
    register_class, set_checked, set_control_text,
};

const ROW_HEIGHT: i32 = 28;
const MARGIN: i32 = 12;
const LABEL_WIDTH: i32 = 150;
const EDIT_WIDTH: i32 = 100;
const CHECK_WIDTH: i32 = 90;

const ID_EDIT_BASE: i32 = 1000;
const ID_CHECK_BASE: i32 = 2000;
const ID_BTN_CLOSE: i32 = 3000;

struct Row {
    field: SettingsField,
    edit: HWND,
    check: Option<HWND>,
}

struct WindowState {
    hwnd: HWND,
    rows: Vec<Row>,
    /// Set while the window rewrites its own controls
    suppress: bool,
}

pub struct CustomizerWindow {
    state: Box<WindowState>,
}

impl CustomizerWindow {
    pub fn open(customizer: &Customizer, owner: HWND) -> Result<Self, PlatformError> {
        let class_name = w!("FloatboardCustomizer");
        let instance = register_class(class_name, CS_HREDRAW | CS_VREDRAW, Some(customizer_window_proc))?;

        let local = customizer.is_local();
        let rows = customizer.controls().len() as i32;
        let client_width = MARGIN * 3 + LABEL_WIDTH + EDIT_WIDTH + if local { CHECK_WIDTH + MARGIN } else { 0 };
        let client_height = MARGIN * 3 + rows * ROW_HEIGHT + 26;

        let title = to_wide(customizer.title());
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(WS_EX_CONTROLPARENT.0 | WS_EX_TOOLWINDOW.0),
                class_name,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                // rough allowance for the frame and caption
                client_width + 16,
                client_height + 40,
                owner,
                None,
                instance,
                None,
            )
        };
        if hwnd.0 == 0 {
            return Err(PlatformError::WindowCreation {
                what: "customizer window",
                message: customizer.title().to_string(),
            });
        }

        let mut state = Box::new(WindowState {
            hwnd,
            rows: Vec::with_capacity(customizer.controls().len()),
            suppress: false,
        });

        for (index, control) in customizer.controls().iter().enumerate() {
            let y = MARGIN + index as i32 * ROW_HEIGHT;
            create_static(hwnd, control.field.label(), (MARGIN, y + 3, LABEL_WIDTH, 20));
            let edit = create_edit(
                hwnd,
                ID_EDIT_BASE + index as i32,
                &control.text,
                (MARGIN * 2 + LABEL_WIDTH, y, EDIT_WIDTH, 22),
            );
            let check = local.then(|| {
                create_checkbox(
                    hwnd,
                    ID_CHECK_BASE + index as i32,
                    "Override",
                    control.override_checked,
                    (MARGIN * 3 + LABEL_WIDTH + EDIT_WIDTH, y, CHECK_WIDTH, 22),
                )
            });
            state.rows.push(Row {
                field: control.field,
                edit,
                check,
            });
        }
        create_button(
            hwnd,
            ID_BTN_CLOSE,
            "Close",
            true,
            (client_width - MARGIN - 90, client_height - MARGIN - 26, 90, 26),
        );

        // controls exist before the procedure can see the state, so their
        // initial text never posts changes
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, state.as_mut() as *mut WindowState as isize);
            ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
        }

        Ok(Self { state })
    }

    pub fn hwnd(&self) -> HWND {
        self.state.hwnd
    }

    pub fn is_open(&self) -> bool {
        self.state.hwnd.0 != 0 && unsafe { IsWindow(self.state.hwnd) }.as_bool()
    }

    /// Shows the customizer's current rows without posting changes
    pub fn refresh(&mut self, customizer: &Customizer) {
        if !self.is_open() {
            return;
        }
        self.state.suppress = true;
        for row in &self.state.rows {
            let Some(control) = customizer.control(row.field) else {
                continue;
            };
            if control_text(row.edit) != control.text {
                set_control_text(row.edit, &control.text);
            }
            if let Some(check) = row.check {
                if is_checked(check) != control.override_checked {
                    set_checked(check, control.override_checked);
                }
            }
        }
        self.state.suppress = false;
    }
}

impl Drop for CustomizerWindow {
    fn drop(&mut self) {
        if self.is_open() {
            unsafe {
                SetWindowLongPtrW(self.state.hwnd, GWLP_USERDATA, 0);
                DestroyWindow(self.state.hwnd).ok();
            }
        }
    }
}

impl WindowState {
    fn handle_command(&mut self, wparam: WPARAM) {
        let (id, code) = command_parts(wparam);

        if id == ID_BTN_CLOSE {
            self.close();
            return;
        }
        if self.suppress {
            return;
        }

        if (ID_EDIT_BASE..ID_EDIT_BASE + self.rows.len() as i32).contains(&id) && code == EN_CHANGE as u32 {
            let row = &self.rows[(id - ID_EDIT_BASE) as usize];
            commands::post(UiCommand::Customizer(ControlChange::Text {
                field: row.field,
                text: control_text(row.edit),
            }));
            return;
        }

        if (ID_CHECK_BASE..ID_CHECK_BASE + self.rows.len() as i32).contains(&id) && code == BN_CLICKED as u32 {
            let row = &self.rows[(id - ID_CHECK_BASE) as usize];
            if let Some(check) = row.check {
                commands::post(UiCommand::Customizer(ControlChange::Override {
                    field: row.field,
                    checked: is_checked(check),
                }));
            }
        }
    }

    fn close(&mut self) {
        commands::post(UiCommand::CustomizerClosed);
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

unsafe extern "system" fn customizer_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut WindowState;
    let Some(state) = (unsafe { ptr.as_mut() }) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    match msg {
        WM_COMMAND => {
            state.handle_command(wparam);
            LRESULT(0)
        }
        WM_CLOSE => {
            state.close();
            LRESULT(0)
        }
        WM_DESTROY => {
            state.hwnd = HWND(0);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

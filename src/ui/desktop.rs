//! Desktop entry point: tray icon, zone windows and the message loop
//!
//! Window procedures only queue [`UiCommand`]s. After each dispatched
//! message the loop drains the queue into the [`Session`] until it stays
//! empty, since modal dialogs opened by one command can queue more.
//!
//! [`UiCommand`]: crate::app::commands::UiCommand

use windows::Win32::Foundation::HWND;
use windows::Win32::System::Com::{COINIT_APARTMENTTHREADED, CoInitializeEx, CoUninitialize};
use windows::Win32::UI::HiDpi::{DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::app::commands;
use crate::app::controller::TrayController;
use crate::app::session::{Flow, Session};
use crate::config::ConfigStore;
use crate::platform::PlatformError;
use crate::ui::controls::ensure_common_controls;
use crate::ui::host::{Win32Dialogs, Win32ZoneHost};
use crate::ui::renderer::ZoneRenderer;
use crate::ui::tray::TrayIcon;

/// Balances CoInitializeEx on the UI thread
struct ComGuard;

impl ComGuard {
    fn init() -> Result<Self, PlatformError> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED)? };
        Ok(Self)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Runs until Quit is picked from the tray menu or WM_QUIT arrives
pub fn run(store: ConfigStore) -> Result<(), PlatformError> {
    unsafe {
        // before any window exists so layouts use physical pixels
        if let Err(err) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) {
            log::warn!("DPI awareness not set: {err}");
        }
    }
    let _com = ComGuard::init()?;
    ensure_common_controls();

    let mut tray = TrayIcon::create()?;
    let host = Win32ZoneHost::new(ZoneRenderer::with_system_font());
    let mut session = Session::new(TrayController::start(store, host));
    let mut dialogs = Win32Dialogs::new(tray.hwnd());
    tray.set_click_through(session.controller().is_click_through());

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 == 0 {
            log::info!("WM_QUIT received");
            session.controller_mut().quit();
            return Ok(());
        }
        if result.0 == -1 {
            return Err(PlatformError::System("GetMessageW failed".to_string()));
        }

        let handled = dialogs
            .customizer_hwnd()
            .is_some_and(|hwnd| is_dialog_message(hwnd, &msg));
        if !handled {
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        if pump_commands(&mut session, &mut dialogs) == Flow::Quit {
            log::info!("Quit requested");
            return Ok(());
        }
        tray.set_click_through(session.controller().is_click_through());
    }
}

fn pump_commands(session: &mut Session<Win32ZoneHost>, dialogs: &mut Win32Dialogs) -> Flow {
    loop {
        let batch = commands::drain();
        if batch.is_empty() {
            return Flow::Continue;
        }
        for command in batch {
            if session.handle(command, dialogs) == Flow::Quit {
                return Flow::Quit;
            }
        }
    }
}

fn is_dialog_message(hwnd: HWND, msg: &MSG) -> bool {
    unsafe { IsDialogMessageW(hwnd, msg) }.as_bool()
}

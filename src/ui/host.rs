//! Win32 implementations of the controller and session seams

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use windows::Win32::Foundation::HWND;

use crate::app::commands::{self, UiCommand};
use crate::app::customizer::Customizer;
use crate::app::host::ZoneHost;
use crate::app::session::Dialogs;
use crate::app::zone::{Zone, ZoneId};
use crate::domain::core::Rect;
use crate::platform::{self, PlatformError};
use crate::ui::customizer_window::CustomizerWindow;
use crate::ui::prompt;
use crate::ui::renderer::ZoneRenderer;
use crate::ui::zone_window::ZoneWindow;

/// One layered window per open zone
pub struct Win32ZoneHost {
    windows: HashMap<ZoneId, ZoneWindow>,
    renderer: ZoneRenderer,
    work_area: Rect,
    click_through: bool,
}

impl Win32ZoneHost {
    pub fn new(renderer: ZoneRenderer) -> Self {
        if !renderer.has_font() {
            log::warn!("No system font found; zone text will not be drawn");
        }
        Self {
            windows: HashMap::new(),
            renderer,
            work_area: platform::primary_work_area(),
            click_through: false,
        }
    }
}

impl ZoneHost for Win32ZoneHost {
    fn work_area(&self) -> Rect {
        self.work_area
    }

    fn zone_opened(&mut self, zone: &Zone) -> Result<(), PlatformError> {
        let mut window = ZoneWindow::create(zone)?;
        if let Err(err) = window.sync(zone, &self.renderer) {
            log::warn!("First frame of {} failed: {err}", zone.id());
        }
        window.set_click_through(self.click_through);
        window.show();
        self.windows.insert(zone.id(), window);
        Ok(())
    }

    fn zone_changed(&mut self, zone: &Zone) {
        let Some(window) = self.windows.get_mut(&zone.id()) else {
            log::debug!("No window for {}", zone.id());
            return;
        };
        if let Err(err) = window.sync(zone, &self.renderer) {
            log::warn!("Redraw of {} failed: {err}", zone.id());
        }
    }

    fn zone_closed(&mut self, id: ZoneId) {
        // dropping the window destroys it
        self.windows.remove(&id);
    }

    fn set_click_through(&mut self, enabled: bool) {
        self.click_through = enabled;
        for window in self.windows.values() {
            window.set_click_through(enabled);
        }
    }

    fn open_path(&mut self, path: &Path) -> Result<(), PlatformError> {
        platform::open_path(path)
    }
}

/// Native folder picker, rename prompt and customizer window
pub struct Win32Dialogs {
    owner: HWND,
    customizer: Option<CustomizerWindow>,
}

impl Win32Dialogs {
    pub fn new(owner: HWND) -> Self {
        Self { owner, customizer: None }
    }

    /// Customizer window that needs dialog keyboard handling
    pub fn customizer_hwnd(&self) -> Option<HWND> {
        self.customizer
            .as_ref()
            .filter(|window| window.is_open())
            .map(CustomizerWindow::hwnd)
    }
}

impl Dialogs for Win32Dialogs {
    fn pick_folder(&mut self, title: &str) -> Option<PathBuf> {
        match platform::windows::pick_folder(self.owner, title) {
            Ok(folder) => folder,
            Err(err) => {
                log::error!("Folder picker failed: {err}");
                None
            }
        }
    }

    fn prompt_text(&mut self, title: &str, label: &str, initial: &str) -> Option<String> {
        match prompt::prompt_text(self.owner, title, label, initial) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Text prompt failed: {err}");
                None
            }
        }
    }

    fn show_customizer(&mut self, customizer: &Customizer) {
        self.customizer = None;
        match CustomizerWindow::open(customizer, self.owner) {
            Ok(window) => self.customizer = Some(window),
            Err(err) => {
                log::error!("Cannot open {}: {err}", customizer.title());
                commands::post(UiCommand::CustomizerClosed);
            }
        }
    }

    fn refresh_customizer(&mut self, customizer: &Customizer) {
        if let Some(window) = self.customizer.as_mut() {
            window.refresh(customizer);
        }
    }

    fn close_customizer(&mut self) {
        self.customizer = None;
    }
}

//! Seam between the controller and the windowing layer

use std::path::Path;

use crate::app::zone::{Zone, ZoneId};
use crate::domain::core::Rect;
use crate::platform::PlatformError;

/// Window surface the controller drives
///
/// The Win32 implementation owns one layered window per zone; tests use a
/// recording implementation.
pub trait ZoneHost {
    /// Area new zones are centred on
    fn work_area(&self) -> Rect;

    /// A zone reached the Ready state and needs a window
    fn zone_opened(&mut self, zone: &Zone) -> Result<(), PlatformError>;

    /// A zone's settings, geometry or cosmetic state changed
    fn zone_changed(&mut self, zone: &Zone);

    fn zone_closed(&mut self, id: ZoneId);

    /// Lets mouse input pass through every zone window
    fn set_click_through(&mut self, enabled: bool);

    /// Opens a file or folder with its default handler
    fn open_path(&mut self, path: &Path) -> Result<(), PlatformError>;
}

/// Host without windows; zones are only logged
///
/// Used where no desktop surface exists, e.g. to load and re-save a
/// configuration store.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    open: Vec<ZoneId>,
}

impl HeadlessHost {
    pub fn open_zones(&self) -> &[ZoneId] {
        &self.open
    }
}

impl ZoneHost for HeadlessHost {
    fn work_area(&self) -> Rect {
        crate::platform::primary_work_area()
    }

    fn zone_opened(&mut self, zone: &Zone) -> Result<(), PlatformError> {
        match zone.folder() {
            Some(folder) => log::info!("{} '{}' -> {}", zone.id(), zone.name(), folder.display()),
            None => log::info!("{} '{}' has no folder", zone.id(), zone.name()),
        }
        self.open.push(zone.id());
        Ok(())
    }

    fn zone_changed(&mut self, zone: &Zone) {
        log::debug!("{} changed", zone.id());
    }

    fn zone_closed(&mut self, id: ZoneId) {
        self.open.retain(|open| *open != id);
    }

    fn set_click_through(&mut self, enabled: bool) {
        log::debug!("Click-through {}", if enabled { "on" } else { "off" });
    }

    fn open_path(&mut self, path: &Path) -> Result<(), PlatformError> {
        crate::platform::open_path(path)
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::path::PathBuf;

    /// Call made on a [`RecordingHost`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostCall {
        Opened(ZoneId),
        Changed(ZoneId),
        Closed(ZoneId),
        ClickThrough(bool),
        Launched(PathBuf),
    }

    /// Host that records every call instead of drawing
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub calls: Vec<HostCall>,
    }

    impl RecordingHost {
        pub fn changes_for(&self, id: ZoneId) -> usize {
            self.calls
                .iter()
                .filter(|call| **call == HostCall::Changed(id))
                .count()
        }
    }

    impl ZoneHost for RecordingHost {
        fn work_area(&self) -> Rect {
            Rect::new(0, 0, 1920, 1040)
        }

        fn zone_opened(&mut self, zone: &Zone) -> Result<(), PlatformError> {
            self.calls.push(HostCall::Opened(zone.id()));
            Ok(())
        }

        fn zone_changed(&mut self, zone: &Zone) {
            self.calls.push(HostCall::Changed(zone.id()));
        }

        fn zone_closed(&mut self, id: ZoneId) {
            self.calls.push(HostCall::Closed(id));
        }

        fn set_click_through(&mut self, enabled: bool) {
            self.calls.push(HostCall::ClickThrough(enabled));
        }

        fn open_path(&mut self, path: &Path) -> Result<(), PlatformError> {
            self.calls.push(HostCall::Launched(path.to_path_buf()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::TrayController;
    use crate::config::ConfigStore;
    use tempfile::TempDir;

    #[test]
    fn headless_host_tracks_open_zones() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("docs");
        std::fs::create_dir_all(&folder).unwrap();

        let store = ConfigStore::new(dir.path().join("store"));
        let mut controller = TrayController::start(store, HeadlessHost::default());
        let id = controller.add_zone(folder);
        assert_eq!(controller.host().open_zones(), &[id]);

        controller.close_zone(id).unwrap();
        assert!(controller.host().open_zones().is_empty());
    }
}

//! Tray controller and coordination layer
//!
//! The controller owns the global settings, the open zones and the store.
//! Every user-facing operation goes through it so the global and local edit
//! protocols never interleave. Persistence failures are logged and the
//! in-memory state stays authoritative.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::customizer::{ControlChange, Customizer, CustomizerTarget};
use crate::app::host::ZoneHost;
use crate::app::zone::{Zone, ZoneId};
use crate::config::{
    ConfigStore, FieldValue, LocalOutcome, SettingsError, SettingsField, SettingsRecord, StoreError,
    numbered_zone_name, sanitize_zone_name,
};
use crate::domain::core::Rect;
use crate::platform::PlatformError;

/// Errors returned by controller operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown {0}")]
    UnknownZone(ZoneId),

    #[error("{0} is not ready")]
    ZoneNotReady(ZoneId),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Main application controller
pub struct TrayController<H: ZoneHost> {
    global: SettingsRecord,
    zones: Vec<Zone>,
    store: ConfigStore,
    host: H,
    next_id: u32,
    click_through: bool,
}

impl<H: ZoneHost> TrayController<H> {
    /// Loads the global settings and restores every persisted zone
    pub fn start(store: ConfigStore, host: H) -> Self {
        let global = store.load_global();
        let mut controller = Self {
            global,
            zones: Vec::new(),
            store,
            host,
            next_id: 1,
            click_through: false,
        };

        let work_area = controller.host.work_area();
        for record in controller.store.load_all_zones() {
            let id = controller.allocate_id();
            let zone = Zone::from_record(id, record, &controller.global, work_area);
            controller.open(zone);
        }

        log::info!(
            "Started with {} zone(s) from {}",
            controller.zones.len(),
            controller.store.root().display()
        );
        controller
    }

    fn allocate_id(&mut self) -> ZoneId {
        let id = ZoneId(self.next_id);
        self.next_id += 1;
        id
    }

    fn open(&mut self, zone: Zone) {
        if let Err(err) = self.host.zone_opened(&zone) {
            log::error!("Cannot show {} '{}': {err}", zone.id(), zone.name());
        }
        self.zones.push(zone);
    }

    pub fn global(&self) -> &SettingsRecord {
        &self.global
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id() == id)
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_click_through(&self) -> bool {
        self.click_through
    }

    /// Creates a zone for `folder`, persists it and shows it
    ///
    /// A name whose file is already taken gets a number, e.g. `Docs 2`.
    pub fn add_zone(&mut self, folder: PathBuf) -> ZoneId {
        let id = self.allocate_id();
        let mut zone = Zone::from_folder(id, folder, &self.global, self.host.work_area());
        let name = self.unique_zone_name(zone.name(), None);
        zone.rename(&name);
        log::info!("Adding {id} '{}'", zone.name());
        persist_zone(&self.store, &zone);
        self.open(zone);
        id
    }

    /// Closes a zone; its file stays on disk and restores it next start
    pub fn close_zone(&mut self, id: ZoneId) -> Result<(), AppError> {
        let index = self
            .zones
            .iter()
            .position(|zone| zone.id() == id)
            .ok_or(AppError::UnknownZone(id))?;

        let mut zone = self.zones.remove(index);
        persist_zone(&self.store, &zone);
        zone.close();
        self.host.zone_closed(id);
        log::info!("Closed {id} '{}'", zone.name());
        Ok(())
    }

    /// Renames a zone and moves its file to the new name
    ///
    /// # Returns
    /// `true` when the name changed
    pub fn rename_zone(&mut self, id: ZoneId, name: &str) -> Result<bool, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let name = self.unique_zone_name(name, Some(id));
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let Some(old_name) = zone.rename(&name) else {
            return Ok(false);
        };

        persist_zone(&self.store, zone);
        if self.store.zone_file_path(&old_name) != self.store.zone_file_path(zone.name()) {
            if let Err(err) = self.store.remove_zone_file(&old_name) {
                log::warn!("Cannot remove stale file of '{old_name}': {err}");
            }
        }
        self.host.zone_changed(zone);
        Ok(true)
    }

    /// `name`, numbered if another zone already owns its file
    fn unique_zone_name(&self, name: &str, renaming: Option<ZoneId>) -> String {
        if !self.is_zone_name_taken(name, renaming) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = numbered_zone_name(name, n);
            if !self.is_zone_name_taken(&candidate, renaming) {
                log::info!("'{name}' is taken, using '{candidate}'");
                return candidate;
            }
            n += 1;
        }
    }

    /// Whether saving a zone called `name` would overwrite another zone's file
    ///
    /// File stems compare case-insensitively. Files of closed zones count,
    /// since they are restored on the next start.
    fn is_zone_name_taken(&self, name: &str, renaming: Option<ZoneId>) -> bool {
        let stem = sanitize_zone_name(name).to_lowercase();
        let same_stem = |zone: &Zone| sanitize_zone_name(zone.name()).to_lowercase() == stem;

        let other_open = self
            .zones
            .iter()
            .filter(|zone| Some(zone.id()) != renaming)
            .any(|zone| same_stem(zone));
        if other_open {
            return true;
        }

        let own_file = renaming
            .and_then(|id| self.zone(id))
            .is_some_and(|zone| same_stem(zone));
        !own_file && self.store.zone_file_path(name).exists()
    }

    pub fn change_folder(&mut self, id: ZoneId, folder: PathBuf) -> Result<(), AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        zone.change_folder(folder);
        persist_zone(&self.store, zone);
        self.host.zone_changed(zone);
        Ok(())
    }

    /// Records a finished drag or resize
    ///
    /// The host is always told, so a locked zone snaps back.
    pub fn move_zone(&mut self, id: ZoneId, rect: Rect) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let moved = zone.set_geometry(rect);
        if moved {
            persist_zone(&self.store, zone);
        }
        self.host.zone_changed(zone);
        Ok(moved)
    }

    pub fn toggle_lock(&mut self, id: ZoneId) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let locked = zone.toggle_lock();
        self.host.zone_changed(zone);
        Ok(locked)
    }

    pub fn toggle_collapse(&mut self, id: ZoneId) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let collapsed = zone.toggle_collapse();
        self.host.zone_changed(zone);
        Ok(collapsed)
    }

    pub fn toggle_search(&mut self, id: ZoneId) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let open = zone.toggle_search();
        self.host.zone_changed(zone);
        Ok(open)
    }

    pub fn set_search_query(&mut self, id: ZoneId, text: &str) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let applied = zone.set_search_query(text);
        if applied {
            self.host.zone_changed(zone);
        }
        Ok(applied)
    }

    pub fn scroll(&mut self, id: ZoneId, rows: i32) -> Result<u32, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let before = zone.scroll_row();
        let after = zone.scroll_by(rows);
        if after != before {
            self.host.zone_changed(zone);
        }
        Ok(after)
    }

    /// Opens the entry shown in `slot` with its default handler
    ///
    /// # Returns
    /// `false` when the slot is empty
    pub fn launch(&mut self, id: ZoneId, slot: usize) -> Result<bool, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let Some(path) = zone.entry_at_slot(slot).map(|entry| entry.path.clone()) else {
            return Ok(false);
        };
        log::debug!("Launching {}", path.display());
        self.host.open_path(&path)?;
        Ok(true)
    }

    pub fn set_click_through(&mut self, enabled: bool) {
        self.click_through = enabled;
        self.host.set_click_through(enabled);
        log::info!("Click-through {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn open_global_customizer(&self) -> Customizer {
        Customizer::for_global(&self.global)
    }

    pub fn open_zone_customizer(&self, id: ZoneId) -> Result<Customizer, AppError> {
        let zone = self.zone(id).ok_or(AppError::UnknownZone(id))?;
        if !zone.state().is_ready() {
            return Err(AppError::ZoneNotReady(id));
        }
        Ok(Customizer::for_zone(id, zone.settings(), zone.overrides()))
    }

    /// Live-applies one customizer control change
    pub fn apply_change(&mut self, customizer: &mut Customizer, change: ControlChange) -> Result<(), AppError> {
        let unchecked = matches!(change, ControlChange::Override { checked: false, .. });
        let change = customizer.update(change);
        match customizer.target() {
            CustomizerTarget::Global => match change.value {
                Some(value) => {
                    self.edit_global(change.field, value)?;
                    customizer.reflect_if_adjusted(change.field, &self.global);
                }
                None => log::debug!("Keeping global {} until the input is valid", change.field),
            },
            CustomizerTarget::Zone(id) => {
                let outcome = self.edit_local(id, change.field, change.value, change.override_enabled)?;
                if let Some(zone) = self.zone(id) {
                    match outcome {
                        LocalOutcome::Reverted if unchecked => {
                            customizer.reflect_field(change.field, zone.settings());
                        }
                        LocalOutcome::Overridden if change.value.is_some() => {
                            customizer.reflect_if_adjusted(change.field, zone.settings());
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Sets a global field and pushes it to every zone that does not override it
    ///
    /// # Returns
    /// Number of zones that took the new value
    pub fn edit_global(&mut self, field: SettingsField, value: FieldValue) -> Result<usize, AppError> {
        self.global.set(field, value)?;
        if let Err(err) = self.store.save_global(&self.global) {
            log::error!("Cannot save global settings: {err}");
        }

        let mut updated = 0;
        for zone in self.zones.iter_mut().filter(|zone| zone.state().is_ready()) {
            if zone.apply_global_field(&self.global, field) {
                persist_zone(&self.store, zone);
                self.host.zone_changed(zone);
                updated += 1;
            }
        }
        log::debug!("Global {field} = {value}, applied to {updated} zone(s)");
        Ok(updated)
    }

    /// Applies a local edit to one zone
    pub fn edit_local(
        &mut self,
        id: ZoneId,
        field: SettingsField,
        value: Option<FieldValue>,
        override_enabled: bool,
    ) -> Result<LocalOutcome, AppError> {
        let zone = ready_zone_mut(&mut self.zones, id)?;
        let outcome = zone.apply_local_edit(&self.global, field, value, override_enabled)?;
        persist_zone(&self.store, zone);
        self.host.zone_changed(zone);
        Ok(outcome)
    }

    /// Persists every open zone and the global settings
    pub fn quit(&mut self) {
        for zone in self.zones.iter().filter(|zone| zone.state().is_ready()) {
            persist_zone(&self.store, zone);
        }
        if let Err(err) = self.store.save_global(&self.global) {
            log::error!("Cannot save global settings: {err}");
        }
        log::info!("Saved {} zone(s), exiting", self.zones.len());
    }
}

fn ready_zone_mut(zones: &mut [Zone], id: ZoneId) -> Result<&mut Zone, AppError> {
    let zone = zones
        .iter_mut()
        .find(|zone| zone.id() == id)
        .ok_or(AppError::UnknownZone(id))?;
    if zone.state().is_ready() {
        Ok(zone)
    } else {
        Err(AppError::ZoneNotReady(id))
    }
}

fn persist_zone(store: &ConfigStore, zone: &Zone) {
    if let Err(err) = store.save_zone(&zone.to_record()) {
        log::error!("Cannot save {} '{}': {err}", zone.id(), zone.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::host::recording::{HostCall, RecordingHost};
    use crate::config::{HexColor, ZoneRecord};
    use tempfile::TempDir;
    use std::fs;

    fn controller(scratch: &TempDir) -> TrayController<RecordingHost> {
        TrayController::start(ConfigStore::new(scratch.path().join("store")), RecordingHost::default())
    }

    fn folder(scratch: &TempDir, name: &str, files: &[&str]) -> PathBuf {
        let folder = scratch.path().join(name);
        fs::create_dir_all(&folder).unwrap();
        for file in files {
            fs::write(folder.join(file), b"data").unwrap();
        }
        folder
    }

    fn rows_of(controller: &TrayController<RecordingHost>, id: ZoneId) -> i32 {
        controller.zone(id).unwrap().settings().rows
    }

    #[test]
    fn global_and_local_edits_end_to_end() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        assert_eq!(controller.global().rows, 5);

        let ids: Vec<ZoneId> = ["One", "Two", "Three"]
            .iter()
            .map(|name| controller.add_zone(folder(&scratch, name, &[])))
            .collect();

        assert_eq!(controller.edit_global(SettingsField::Rows, FieldValue::Integer(8)).unwrap(), 3);
        for id in &ids {
            assert_eq!(rows_of(&controller, *id), 8);
        }

        let outcome = controller
            .edit_local(ids[1], SettingsField::Rows, Some(FieldValue::Integer(3)), true)
            .unwrap();
        assert_eq!(outcome, LocalOutcome::Overridden);

        assert_eq!(controller.edit_global(SettingsField::Rows, FieldValue::Integer(10)).unwrap(), 2);
        assert_eq!(rows_of(&controller, ids[0]), 10);
        assert_eq!(rows_of(&controller, ids[1]), 3);
        assert_eq!(rows_of(&controller, ids[2]), 10);

        let outcome = controller
            .edit_local(ids[1], SettingsField::Rows, Some(FieldValue::Integer(3)), false)
            .unwrap();
        assert_eq!(outcome, LocalOutcome::Reverted);
        assert_eq!(rows_of(&controller, ids[1]), 10);
        assert!(controller.zone(ids[1]).unwrap().overrides().is_empty());
    }

    #[test]
    fn overrides_survive_restart() {
        let scratch = TempDir::new().unwrap();
        let id = {
            let mut controller = controller(&scratch);
            let id = controller.add_zone(folder(&scratch, "Docs", &["a.txt"]));
            controller
                .edit_local(
                    id,
                    SettingsField::TitleBg,
                    Some(FieldValue::Color(HexColor::rgb(0, 128, 0))),
                    true,
                )
                .unwrap();
            controller.edit_global(SettingsField::Cols, FieldValue::Integer(6)).unwrap();
            controller.quit();
            id
        };

        let restarted = controller(&scratch);
        assert_eq!(restarted.zones().len(), 1);
        let zone = &restarted.zones()[0];
        assert_eq!(zone.id(), id);
        assert_eq!(zone.name(), "Docs");
        assert_eq!(zone.settings().title_bg, HexColor::rgb(0, 128, 0));
        assert_eq!(zone.settings().cols, 6);
        assert!(zone.overrides().contains(SettingsField::TitleBg));
        assert_eq!(zone.entries().len(), 1);
        assert_eq!(restarted.global().cols, 6);
        assert!(restarted.host().calls.contains(&HostCall::Opened(id)));
    }

    #[test]
    fn restored_zone_follows_newer_global_values() {
        let scratch = TempDir::new().unwrap();
        let store = ConfigStore::new(scratch.path().join("store"));
        store
            .save_zone(&ZoneRecord::new(
                "Stale",
                "",
                SettingsRecord {
                    rows: 2,
                    ..SettingsRecord::default()
                },
            ))
            .unwrap();
        store
            .save_global(&SettingsRecord {
                rows: 7,
                ..SettingsRecord::default()
            })
            .unwrap();

        let controller = TrayController::start(store, RecordingHost::default());
        assert_eq!(controller.zones()[0].settings().rows, 7);
    }

    #[test]
    fn corrupt_zone_file_is_skipped_at_start() {
        let scratch = TempDir::new().unwrap();
        let store = ConfigStore::new(scratch.path().join("store"));
        store.save_zone(&ZoneRecord::new("Good", "", SettingsRecord::default())).unwrap();
        fs::write(store.zones_dir().join("Bad.json"), "{{{").unwrap();

        let controller = TrayController::start(store, RecordingHost::default());
        let names: Vec<_> = controller.zones().iter().map(|zone| zone.name()).collect();
        assert_eq!(names, vec!["Good"]);
    }

    #[test]
    fn rename_moves_the_zone_file() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Old Name", &[]));
        let old_path = controller.store().zone_file_path("Old Name");
        assert!(old_path.exists());

        assert!(controller.rename_zone(id, "New/Name").unwrap());
        assert!(!old_path.exists());
        assert!(controller.store().zone_file_path("NewName").exists());
        assert!(!controller.rename_zone(id, "  ").unwrap());

        let names: Vec<_> = controller
            .store()
            .load_all_zones()
            .into_iter()
            .map(|record| record.zone_name)
            .collect();
        assert_eq!(names, vec!["New/Name"]);
    }

    #[test]
    fn rename_to_same_file_stem_keeps_the_file() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "My Zone", &[]));

        assert!(controller.rename_zone(id, "My_Zone").unwrap());
        assert!(controller.store().zone_file_path("My_Zone").exists());
    }

    #[test]
    fn close_keeps_file_and_rejects_later_events() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Temp", &[]));

        controller.close_zone(id).unwrap();
        assert!(controller.zones().is_empty());
        assert!(controller.store().zone_file_path("Temp").exists());
        assert!(controller.host().calls.contains(&HostCall::Closed(id)));

        assert!(matches!(controller.toggle_lock(id), Err(AppError::UnknownZone(_))));
        assert!(matches!(controller.close_zone(id), Err(AppError::UnknownZone(_))));
    }

    #[test]
    fn global_customizer_applies_live() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));
        let mut customizer = controller.open_global_customizer();

        controller
            .apply_change(
                &mut customizer,
                ControlChange::Text {
                    field: SettingsField::BgColor,
                    text: "#10".into(),
                },
            )
            .unwrap();
        assert_eq!(controller.global().bg_color, SettingsRecord::DEFAULT.bg_color);

        controller
            .apply_change(
                &mut customizer,
                ControlChange::Text {
                    field: SettingsField::BgColor,
                    text: "#102030".into(),
                },
            )
            .unwrap();
        assert_eq!(controller.global().bg_color, HexColor::rgb(0x10, 0x20, 0x30));
        assert_eq!(
            controller.zone(id).unwrap().settings().bg_color,
            HexColor::rgb(0x10, 0x20, 0x30)
        );
        assert_eq!(controller.store().load_global().bg_color, HexColor::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn zone_customizer_override_and_revert() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));
        let mut customizer = controller.open_zone_customizer(id).unwrap();

        controller
            .apply_change(
                &mut customizer,
                ControlChange::Text {
                    field: SettingsField::Cols,
                    text: "2".into(),
                },
            )
            .unwrap();
        // unchecked override: typed value is discarded
        assert_eq!(controller.zone(id).unwrap().settings().cols, 4);

        controller
            .apply_change(
                &mut customizer,
                ControlChange::Override {
                    field: SettingsField::Cols,
                    checked: true,
                },
            )
            .unwrap();
        assert_eq!(controller.zone(id).unwrap().settings().cols, 2);
        assert!(controller.zone(id).unwrap().overrides().contains(SettingsField::Cols));

        controller
            .apply_change(
                &mut customizer,
                ControlChange::Override {
                    field: SettingsField::Cols,
                    checked: false,
                },
            )
            .unwrap();
        assert_eq!(controller.zone(id).unwrap().settings().cols, 4);
        assert_eq!(customizer.control(SettingsField::Cols).unwrap().text, "4");
    }

    #[test]
    fn checked_override_with_invalid_color_records_override() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));

        controller
            .edit_local(id, SettingsField::NameColor, None, true)
            .unwrap();
        let zone = controller.zone(id).unwrap();
        assert!(zone.overrides().contains(SettingsField::NameColor));
        assert_eq!(zone.settings().name_color, SettingsRecord::DEFAULT.name_color);
    }

    #[test]
    fn locked_move_is_refused_but_reported() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));
        let start = controller.zone(id).unwrap().geometry();

        controller.toggle_lock(id).unwrap();
        let changes = controller.host().changes_for(id);
        assert!(!controller.move_zone(id, Rect::new(1, 1, start.w, start.h)).unwrap());
        assert_eq!(controller.zone(id).unwrap().geometry(), start);
        assert_eq!(controller.host().changes_for(id), changes + 1);

        controller.toggle_lock(id).unwrap();
        assert!(controller.move_zone(id, Rect::new(1, 1, start.w, start.h)).unwrap());
        let saved = controller.store().load_all_zones();
        assert_eq!(saved[0].geometry, Some(Rect::new(1, 1, start.w, start.h)));
    }

    #[test]
    fn launch_opens_entry_under_slot() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let docs = folder(&scratch, "Docs", &["b.txt", "a.txt"]);
        let id = controller.add_zone(docs.clone());

        assert!(controller.launch(id, 1).unwrap());
        assert!(!controller.launch(id, 5).unwrap());
        assert!(
            controller
                .host()
                .calls
                .contains(&HostCall::Launched(docs.join("b.txt")))
        );
    }

    #[test]
    fn search_and_scroll_notify_host() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Docs", &["alpha.txt", "beta.txt"]));

        assert!(!controller.set_search_query(id, "al").unwrap());
        assert!(controller.toggle_search(id).unwrap());
        assert!(controller.set_search_query(id, "al").unwrap());
        assert_eq!(controller.zone(id).unwrap().visible_entries().len(), 1);
        assert_eq!(controller.scroll(id, 3).unwrap(), 0);
        assert!(controller.toggle_collapse(id).unwrap());
    }

    #[test]
    fn click_through_is_forwarded() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        controller.set_click_through(true);
        assert!(controller.is_click_through());
        assert_eq!(controller.host().calls, vec![HostCall::ClickThrough(true)]);
    }

    #[test]
    fn new_zone_is_centred_on_work_area() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));
        assert_eq!(controller.zone(id).unwrap().geometry(), Rect::new(810, 329, 299, 382));
    }

    #[test]
    fn zones_from_same_named_folders_keep_separate_files() {
        let scratch = TempDir::new().unwrap();
        let (first, second) = {
            let mut controller = controller(&scratch);
            let first = controller.add_zone(folder(&scratch, "x/Docs", &[]));
            let second = controller.add_zone(folder(&scratch, "y/Docs", &[]));
            assert_eq!(controller.zone(first).unwrap().name(), "Docs");
            assert_eq!(controller.zone(second).unwrap().name(), "Docs 2");
            controller.quit();
            (first, second)
        };
        assert_ne!(first, second);

        let restarted = controller(&scratch);
        let mut folders: Vec<_> = restarted
            .zones()
            .iter()
            .filter_map(|zone| zone.folder().map(PathBuf::from))
            .collect();
        folders.sort();
        assert_eq!(folders, vec![scratch.path().join("x/Docs"), scratch.path().join("y/Docs")]);
    }

    #[test]
    fn rename_onto_another_zone_gets_a_number() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let one = controller.add_zone(folder(&scratch, "One", &[]));
        let two = controller.add_zone(folder(&scratch, "Two", &[]));

        assert!(controller.rename_zone(two, "one").unwrap());
        assert_eq!(controller.zone(two).unwrap().name(), "one 2");
        assert!(controller.store().zone_file_path("One").exists());
        assert!(!controller.store().zone_file_path("Two").exists());
        assert_eq!(controller.zone(one).unwrap().name(), "One");
        assert_eq!(controller.store().load_all_zones().len(), 2);
    }

    #[test]
    fn new_zone_does_not_take_a_closed_zone_file() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let closed = controller.add_zone(folder(&scratch, "a/Music", &[]));
        controller.close_zone(closed).unwrap();

        let id = controller.add_zone(folder(&scratch, "b/Music", &[]));
        assert_eq!(controller.zone(id).unwrap().name(), "Music 2");
        assert_eq!(controller.store().load_all_zones().len(), 2);
    }

    #[test]
    fn unwritable_store_keeps_memory_authoritative() {
        let scratch = TempDir::new().unwrap();
        let root = scratch.path().join("store");
        fs::write(&root, b"not a directory").unwrap();

        let mut controller = TrayController::start(ConfigStore::new(&root), RecordingHost::default());
        let id = controller.add_zone(folder(&scratch, "Docs", &["a.txt"]));
        assert_eq!(controller.zones().len(), 1);
        assert!(controller.host().calls.contains(&HostCall::Opened(id)));

        assert_eq!(controller.edit_global(SettingsField::Rows, FieldValue::Integer(9)).unwrap(), 1);
        assert_eq!(controller.global().rows, 9);
        assert_eq!(rows_of(&controller, id), 9);

        assert!(controller.rename_zone(id, "Papers").unwrap());
        assert_eq!(controller.zone(id).unwrap().name(), "Papers");
        controller.quit();
        assert!(root.is_file());
    }

    #[test]
    fn clamped_customizer_input_is_shown_as_applied() {
        let scratch = TempDir::new().unwrap();
        let mut controller = controller(&scratch);
        let id = controller.add_zone(folder(&scratch, "Z", &[]));

        let mut global = controller.open_global_customizer();
        controller
            .apply_change(&mut global, ControlChange::Text {
                field: SettingsField::Rows,
                text: "500".into(),
            })
            .unwrap();
        assert_eq!(controller.global().rows, 50);
        assert_eq!(global.control(SettingsField::Rows).unwrap().text, "50");

        let mut local = controller.open_zone_customizer(id).unwrap();
        controller
            .apply_change(&mut local, ControlChange::Override {
                field: SettingsField::Cols,
                checked: true,
            })
            .unwrap();
        controller
            .apply_change(&mut local, ControlChange::Text {
                field: SettingsField::Cols,
                text: "-3".into(),
            })
            .unwrap();
        assert_eq!(controller.zone(id).unwrap().settings().cols, 1);
        assert_eq!(local.control(SettingsField::Cols).unwrap().text, "1");
    }
}

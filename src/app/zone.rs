//! In-memory zone model
//!
//! A zone owns its settings record, override set, folder entries and
//! geometry, plus the cosmetic state (lock, collapse, search, scroll) that is
//! never persisted. The controller drives it; windows only render it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::app::state::{LoadSource, StateMachine, ZoneEvent, ZoneState};
use crate::config::{
    FieldValue, LocalOutcome, OverrideSet, SettingsError, SettingsField, SettingsRecord, ZoneRecord,
    apply_local_edit, propagate_field, sync_with_global,
};
use crate::domain::core::Rect;
use crate::domain::entries::{ZoneEntry, enumerate_folder};
use crate::domain::grid::ZoneGrid;

/// Identifier of a zone for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone #{}", self.0)
    }
}

/// Default display name for a zone created from `folder`
pub fn zone_name_for_folder(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Zone".to_string())
}

#[derive(Debug, Clone)]
pub struct Zone {
    id: ZoneId,
    name: String,
    folder: Option<PathBuf>,
    settings: SettingsRecord,
    overrides: OverrideSet,
    geometry: Rect,
    entries: Vec<ZoneEntry>,
    state: ZoneState,
    locked: bool,
    collapsed: bool,
    search: Option<String>,
    scroll_row: u32,
    grid: ZoneGrid,
    refresh_count: u64,
}

impl Zone {
    /// Creates a zone for a freshly chosen folder
    ///
    /// Settings are seeded from the global record, the name comes from the
    /// folder, and the window is centred on `work_area`.
    pub fn from_folder(id: ZoneId, folder: PathBuf, global: &SettingsRecord, work_area: Rect) -> Self {
        let mut zone = Self::unloaded(id, zone_name_for_folder(&folder), global.clone());
        zone.transition(ZoneEvent::BeginLoad(LoadSource::Folder));

        zone.folder = Some(folder);
        zone.reload_entries();
        let (w, h) = zone.grid.window_size(zone.entries.len());
        zone.geometry = work_area.centered(w, h);

        zone.transition(ZoneEvent::LoadFinished);
        zone
    }

    /// Restores a zone from its persisted record
    ///
    /// Fields the record does not override follow the current global values.
    /// A persisted geometry is kept as is; without one the zone is centred.
    pub fn from_record(id: ZoneId, record: ZoneRecord, global: &SettingsRecord, work_area: Rect) -> Self {
        let ZoneRecord {
            zone_name,
            folder,
            mut settings,
            local_overrides,
            geometry,
        } = record;

        sync_with_global(&mut settings, &local_overrides, global);

        let mut zone = Self::unloaded(id, zone_name, settings);
        zone.transition(ZoneEvent::BeginLoad(LoadSource::Record));

        zone.overrides = local_overrides;
        zone.folder = (!folder.trim().is_empty()).then(|| PathBuf::from(folder));
        zone.reload_entries();
        zone.geometry = match geometry {
            Some(rect) => rect,
            None => {
                let (w, h) = zone.grid.window_size(zone.entries.len());
                work_area.centered(w, h)
            }
        };

        zone.transition(ZoneEvent::LoadFinished);
        zone
    }

    fn unloaded(id: ZoneId, name: String, settings: SettingsRecord) -> Self {
        let grid = ZoneGrid::from_settings(&settings);
        Self {
            id,
            name,
            folder: None,
            settings,
            overrides: OverrideSet::new(),
            geometry: Rect::new(0, 0, 0, 0),
            entries: Vec::new(),
            state: ZoneState::Unloaded,
            locked: false,
            collapsed: false,
            search: None,
            scroll_row: 0,
            grid,
            refresh_count: 0,
        }
    }

    fn transition(&mut self, event: ZoneEvent) {
        self.state = StateMachine::process_event(self.state, event);
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn entries(&self) -> &[ZoneEntry] {
        &self.entries
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Current search text, when the search row is open
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn scroll_row(&self) -> u32 {
        self.scroll_row
    }

    pub fn grid(&self) -> &ZoneGrid {
        &self.grid
    }

    /// Number of times the derived visual state has been rebuilt
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Persisted form of this zone
    pub fn to_record(&self) -> ZoneRecord {
        ZoneRecord {
            zone_name: self.name.clone(),
            folder: self
                .folder
                .as_ref()
                .map(|folder| folder.to_string_lossy().into_owned())
                .unwrap_or_default(),
            settings: self.settings.clone(),
            local_overrides: self.overrides.clone(),
            geometry: Some(self.geometry),
        }
    }

    /// Re-reads the folder and rebuilds the derived state
    ///
    /// An unreadable folder leaves the zone empty.
    pub fn reload_entries(&mut self) {
        self.entries = match &self.folder {
            Some(folder) => enumerate_folder(folder).unwrap_or_else(|err| {
                log::warn!("Cannot list {} for {}: {err}", folder.display(), self.id);
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.refresh();
    }

    /// Rebuilds the derived visual state from the settings
    ///
    /// The grid is recomputed, the window is resized in place and the scroll
    /// position is clamped to the new page.
    pub fn refresh(&mut self) {
        self.grid = ZoneGrid::from_settings(&self.settings).with_search_row(self.search.is_some());
        let (w, h) = self.window_size();
        self.geometry = self.geometry.with_size(w, h);
        self.scroll_row = self.scroll_row.min(self.max_scroll());
        self.refresh_count += 1;
    }

    fn window_size(&self) -> (i32, i32) {
        let (w, h) = self.grid.window_size(self.entries.len());
        if self.collapsed {
            (w, self.grid.title_height())
        } else {
            (w, h)
        }
    }

    /// Renames the zone; blank names are ignored
    ///
    /// # Returns
    /// The previous name when the name changed
    pub fn rename(&mut self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || name == self.name {
            return None;
        }
        Some(std::mem::replace(&mut self.name, name.to_string()))
    }

    /// Points the zone at another folder and reloads its entries
    pub fn change_folder(&mut self, folder: PathBuf) {
        self.folder = Some(folder);
        self.scroll_row = 0;
        self.reload_entries();
    }

    /// Applies a window move or resize
    ///
    /// A locked zone keeps its position; size changes still apply.
    ///
    /// # Returns
    /// `true` when the geometry changed
    pub fn set_geometry(&mut self, rect: Rect) -> bool {
        let target = if self.locked {
            self.geometry.with_size(rect.w, rect.h)
        } else {
            rect
        };
        if target == self.geometry {
            return false;
        }
        self.geometry = target;
        true
    }

    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    pub fn toggle_collapse(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.refresh();
        self.collapsed
    }

    /// Opens or closes the search row; closing clears the filter
    pub fn toggle_search(&mut self) -> bool {
        self.search = match self.search {
            Some(_) => None,
            None => Some(String::new()),
        };
        self.scroll_row = 0;
        self.refresh();
        self.search.is_some()
    }

    /// Updates the filter text; ignored while the search row is closed
    pub fn set_search_query(&mut self, text: &str) -> bool {
        match &mut self.search {
            Some(query) => {
                *query = text.to_string();
                self.scroll_row = 0;
                true
            }
            None => false,
        }
    }

    /// Scrolls by whole rows, clamped to the available range
    pub fn scroll_by(&mut self, rows: i32) -> u32 {
        let target = self.scroll_row as i64 + rows as i64;
        self.scroll_row = target.clamp(0, self.max_scroll() as i64) as u32;
        self.scroll_row
    }

    fn max_scroll(&self) -> u32 {
        self.grid.max_scroll(self.filtered().count())
    }

    fn filtered(&self) -> impl Iterator<Item = &ZoneEntry> + '_ {
        let query = self.search.as_deref().unwrap_or("");
        self.entries.iter().filter(move |entry| entry.matches(query))
    }

    /// Entries on the current page with their grid slots
    pub fn visible_entries(&self) -> Vec<(usize, &ZoneEntry)> {
        if self.collapsed {
            return Vec::new();
        }
        let filtered: Vec<&ZoneEntry> = self.filtered().collect();
        let range = self.grid.visible_range(self.scroll_row, filtered.len());
        filtered[range].iter().copied().enumerate().collect()
    }

    /// Entry drawn in `slot` of the current page
    pub fn entry_at_slot(&self, slot: usize) -> Option<&ZoneEntry> {
        self.visible_entries()
            .into_iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, entry)| entry)
    }

    /// Takes the global value of `field` unless it is overridden
    ///
    /// # Returns
    /// `true` when the zone changed and was refreshed
    pub fn apply_global_field(&mut self, global: &SettingsRecord, field: SettingsField) -> bool {
        let applied = propagate_field(&mut self.settings, &self.overrides, global, field);
        if applied {
            self.refresh();
        }
        applied
    }

    /// Applies a local customization of `field`
    pub fn apply_local_edit(
        &mut self,
        global: &SettingsRecord,
        field: SettingsField,
        value: Option<FieldValue>,
        override_enabled: bool,
    ) -> Result<LocalOutcome, SettingsError> {
        let outcome = apply_local_edit(
            &mut self.settings,
            &mut self.overrides,
            global,
            field,
            value,
            override_enabled,
        )?;
        self.refresh();
        Ok(outcome)
    }

    /// Moves the zone to its terminal state
    pub fn close(&mut self) {
        self.transition(ZoneEvent::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HexColor;
    use tempfile::TempDir;
    use std::fs;

    const WORK_AREA: Rect = Rect {
        x: 0,
        y: 0,
        w: 1920,
        h: 1080,
    };

    fn folder_with_files(scratch: &TempDir, count: usize) -> PathBuf {
        let folder = scratch.path().join("Desktop Stuff");
        fs::create_dir_all(&folder).unwrap();
        for i in 0..count {
            fs::write(folder.join(format!("file{i:02}.txt")), b"x").unwrap();
        }
        folder
    }

    #[test]
    fn zone_from_folder_is_ready_and_centred() {
        let scratch = TempDir::new().unwrap();
        let folder = folder_with_files(&scratch, 3);
        let zone = Zone::from_folder(ZoneId(1), folder, &SettingsRecord::default(), WORK_AREA);

        assert!(zone.state().is_ready());
        assert_eq!(zone.name(), "Desktop Stuff");
        assert_eq!(zone.entries().len(), 3);
        assert_eq!(zone.geometry(), Rect::new(810, 349, 299, 382));
        assert!(zone.overrides().is_empty());
    }

    #[test]
    fn unreadable_folder_gives_empty_zone() {
        let scratch = TempDir::new().unwrap();
        let zone = Zone::from_folder(
            ZoneId(1),
            scratch.path().join("missing"),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        assert!(zone.state().is_ready());
        assert!(zone.entries().is_empty());
    }

    #[test]
    fn record_restores_overrides_and_follows_global_elsewhere() {
        let global = SettingsRecord {
            rows: 8,
            title_bg: HexColor::rgb(0, 0, 0),
            ..SettingsRecord::default()
        };
        let mut record = ZoneRecord::new(
            "Work",
            "",
            SettingsRecord {
                rows: 3,
                cols: 2,
                ..SettingsRecord::default()
            },
        );
        record.local_overrides.insert(SettingsField::Rows);
        record.geometry = Some(Rect::new(5, 6, 700, 800));

        let zone = Zone::from_record(ZoneId(2), record, &global, WORK_AREA);

        assert!(zone.state().is_ready());
        assert_eq!(zone.settings().rows, 3);
        assert_eq!(zone.settings().cols, 4);
        assert_eq!(zone.settings().title_bg, HexColor::rgb(0, 0, 0));
        assert_eq!(zone.geometry(), Rect::new(5, 6, 700, 800));
        assert_eq!(zone.folder(), None);
    }

    #[test]
    fn record_round_trip() {
        let scratch = TempDir::new().unwrap();
        let folder = folder_with_files(&scratch, 1);
        let mut zone = Zone::from_folder(ZoneId(1), folder, &SettingsRecord::default(), WORK_AREA);
        zone.apply_local_edit(
            &SettingsRecord::default(),
            SettingsField::TextSize,
            Some(FieldValue::Integer(12)),
            true,
        )
        .unwrap();

        let record = zone.to_record();
        let restored = Zone::from_record(ZoneId(7), record.clone(), &SettingsRecord::default(), WORK_AREA);
        assert_eq!(restored.to_record(), record);
    }

    #[test]
    fn settings_changes_resize_in_place() {
        let mut zone = Zone::from_record(
            ZoneId(1),
            ZoneRecord::new("Z", "", SettingsRecord::default()),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        let before = zone.geometry();
        let refreshes = zone.refresh_count();

        let global = SettingsRecord {
            cols: 3,
            ..SettingsRecord::default()
        };
        assert!(zone.apply_global_field(&global, SettingsField::Cols));

        assert_eq!(zone.refresh_count(), refreshes + 1);
        assert_eq!(zone.geometry().x, before.x);
        assert_eq!(zone.geometry().w, 3 * 64 + 2 * 8 + 2 + 17);
    }

    #[test]
    fn rename_ignores_blank_names() {
        let mut zone = Zone::from_record(
            ZoneId(1),
            ZoneRecord::new("Old", "", SettingsRecord::default()),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        assert_eq!(zone.rename("   "), None);
        assert_eq!(zone.rename("Old"), None);
        assert_eq!(zone.rename(" New "), Some("Old".to_string()));
        assert_eq!(zone.name(), "New");
    }

    #[test]
    fn locked_zone_keeps_position() {
        let mut zone = Zone::from_record(
            ZoneId(1),
            ZoneRecord::new("Z", "", SettingsRecord::default()),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        let start = zone.geometry();
        assert!(zone.toggle_lock());
        assert!(!zone.set_geometry(Rect::new(0, 0, start.w, start.h)));
        assert_eq!(zone.geometry(), start);

        assert!(!zone.toggle_lock());
        assert!(zone.set_geometry(Rect::new(0, 0, start.w, start.h)));
        assert_eq!(zone.geometry().x, 0);
    }

    #[test]
    fn collapse_shrinks_to_title_bar() {
        let mut zone = Zone::from_record(
            ZoneId(1),
            ZoneRecord::new("Z", "", SettingsRecord::default()),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        assert!(zone.toggle_collapse());
        assert_eq!(zone.geometry().h, 28);
        assert!(zone.visible_entries().is_empty());
        assert!(!zone.toggle_collapse());
        assert_eq!(zone.geometry().h, 382);
    }

    #[test]
    fn search_filters_visible_entries() {
        let scratch = TempDir::new().unwrap();
        let folder = folder_with_files(&scratch, 12);
        let mut zone = Zone::from_folder(ZoneId(1), folder, &SettingsRecord::default(), WORK_AREA);

        assert!(!zone.set_search_query("file1"));
        assert!(zone.toggle_search());
        assert!(zone.set_search_query("FILE1"));

        let names: Vec<_> = zone
            .visible_entries()
            .into_iter()
            .map(|(_, entry)| entry.display_name.clone())
            .collect();
        assert_eq!(names, vec!["file10.txt", "file11.txt"]);
        assert_eq!(zone.entry_at_slot(1).map(|e| e.display_name.as_str()), Some("file11.txt"));

        assert!(!zone.toggle_search());
        assert_eq!(zone.visible_entries().len(), 12);
    }

    #[test]
    fn scrolling_is_clamped() {
        let scratch = TempDir::new().unwrap();
        let folder = folder_with_files(&scratch, 30);
        let mut zone = Zone::from_folder(ZoneId(1), folder, &SettingsRecord::default(), WORK_AREA);

        // 30 entries in 4 columns need 8 rows; 5 fit on a page
        assert_eq!(zone.scroll_by(10), 3);
        assert_eq!(zone.visible_entries().len(), 18);
        assert_eq!(zone.visible_entries()[0].1.display_name, "file12.txt");
        assert_eq!(zone.scroll_by(-1), 2);
        assert_eq!(zone.scroll_by(-10), 0);
    }

    #[test]
    fn close_is_terminal() {
        let mut zone = Zone::from_record(
            ZoneId(1),
            ZoneRecord::new("Z", "", SettingsRecord::default()),
            &SettingsRecord::default(),
            WORK_AREA,
        );
        zone.close();
        assert!(zone.state().is_closed());
    }
}

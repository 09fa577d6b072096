//! Command dispatch for a running tray session
//!
//! The main loop hands every drained [`UiCommand`] to [`Session::handle`].
//! Interactions that need a modal answer (folder picker, rename prompt) or a
//! customizer window go through the [`Dialogs`] seam so dispatch runs the
//! same way headless.

use std::path::PathBuf;

use crate::app::commands::{TitleAction, TrayCommand, UiCommand, ZoneCommand};
use crate::app::controller::{AppError, TrayController};
use crate::app::customizer::{Customizer, CustomizerTarget};
use crate::app::host::ZoneHost;
use crate::app::zone::ZoneId;

/// Modal prompts and the customizer window
pub trait Dialogs {
    /// Asks for a folder; None when cancelled
    fn pick_folder(&mut self, title: &str) -> Option<PathBuf>;

    /// Asks for a line of text; None when cancelled
    fn prompt_text(&mut self, title: &str, label: &str, initial: &str) -> Option<String>;

    fn show_customizer(&mut self, customizer: &Customizer);

    /// Rows of the open customizer changed programmatically
    fn refresh_customizer(&mut self, customizer: &Customizer);

    fn close_customizer(&mut self);
}

/// Whether the main loop keeps running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<H: ZoneHost> {
    controller: TrayController<H>,
    customizer: Option<Customizer>,
}

impl<H: ZoneHost> Session<H> {
    pub fn new(controller: TrayController<H>) -> Self {
        Self {
            controller,
            customizer: None,
        }
    }

    pub fn controller(&self) -> &TrayController<H> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TrayController<H> {
        &mut self.controller
    }

    /// The open customizer, if any
    pub fn customizer(&self) -> Option<&Customizer> {
        self.customizer.as_ref()
    }

    /// Runs one command; failures are logged and the session continues
    pub fn handle(&mut self, command: UiCommand, dialogs: &mut impl Dialogs) -> Flow {
        log::debug!("Handling {command:?}");
        let result = match command {
            UiCommand::Tray(TrayCommand::Quit) => {
                if self.customizer.take().is_some() {
                    dialogs.close_customizer();
                }
                self.controller.quit();
                return Flow::Quit;
            }
            UiCommand::Tray(command) => self.handle_tray(command, dialogs),
            UiCommand::Zone(id, command) => self.handle_zone(id, command, dialogs),
            UiCommand::Customizer(change) => match self.customizer.as_mut() {
                Some(customizer) => {
                    let result = self.controller.apply_change(customizer, change);
                    dialogs.refresh_customizer(customizer);
                    result
                }
                None => {
                    log::debug!("Dropping customizer change with no customizer open");
                    Ok(())
                }
            },
            UiCommand::CustomizerClosed => {
                self.customizer = None;
                Ok(())
            }
        };

        if let Err(err) = result {
            log::warn!("Command failed: {err}");
        }
        Flow::Continue
    }

    fn handle_tray(&mut self, command: TrayCommand, dialogs: &mut impl Dialogs) -> Result<(), AppError> {
        match command {
            TrayCommand::AddZone => {
                if let Some(folder) = dialogs.pick_folder("Select a folder for the new zone") {
                    self.controller.add_zone(folder);
                }
            }
            TrayCommand::GlobalCustomize => {
                let customizer = self.controller.open_global_customizer();
                self.open_customizer(customizer, dialogs);
            }
            TrayCommand::ToggleClickThrough => {
                let enabled = !self.controller.is_click_through();
                self.controller.set_click_through(enabled);
            }
            TrayCommand::Quit => {}
        }
        Ok(())
    }

    fn handle_zone(&mut self, id: ZoneId, command: ZoneCommand, dialogs: &mut impl Dialogs) -> Result<(), AppError> {
        match command {
            ZoneCommand::Moved(rect) => {
                self.controller.move_zone(id, rect)?;
            }
            ZoneCommand::Title(action) => self.handle_title(id, action, dialogs)?,
            ZoneCommand::ToggleSearch => {
                self.controller.toggle_search(id)?;
            }
            ZoneCommand::Search(key) => {
                let zone = self.controller.zone(id).ok_or(AppError::UnknownZone(id))?;
                let Some(query) = zone.search().map(str::to_string) else {
                    return Ok(());
                };
                match key.apply(&query) {
                    Some(text) => {
                        self.controller.set_search_query(id, &text)?;
                    }
                    None => {
                        self.controller.toggle_search(id)?;
                    }
                }
            }
            ZoneCommand::Launch { slot } => {
                self.controller.launch(id, slot)?;
            }
            ZoneCommand::ToggleCollapse => {
                self.controller.toggle_collapse(id)?;
            }
            ZoneCommand::Scroll(rows) => {
                self.controller.scroll(id, rows)?;
            }
        }
        Ok(())
    }

    fn handle_title(&mut self, id: ZoneId, action: TitleAction, dialogs: &mut impl Dialogs) -> Result<(), AppError> {
        match action {
            TitleAction::ChangeFolder => {
                if let Some(folder) = dialogs.pick_folder("Select a folder for this zone") {
                    self.controller.change_folder(id, folder)?;
                }
            }
            TitleAction::Rename => {
                let current = self
                    .controller
                    .zone(id)
                    .map(|zone| zone.name().to_string())
                    .ok_or(AppError::UnknownZone(id))?;
                if let Some(name) = dialogs.prompt_text("Rename Zone", "Zone name:", &current) {
                    self.controller.rename_zone(id, &name)?;
                }
            }
            TitleAction::ToggleLock => {
                self.controller.toggle_lock(id)?;
            }
            TitleAction::Customize => {
                let customizer = self.controller.open_zone_customizer(id)?;
                self.open_customizer(customizer, dialogs);
            }
            TitleAction::Close => {
                self.controller.close_zone(id)?;
                if self
                    .customizer
                    .as_ref()
                    .is_some_and(|customizer| customizer.target() == CustomizerTarget::Zone(id))
                {
                    self.customizer = None;
                    dialogs.close_customizer();
                }
            }
        }
        Ok(())
    }

    /// Replaces any open customizer; only one is shown at a time
    fn open_customizer(&mut self, customizer: Customizer, dialogs: &mut impl Dialogs) {
        if self.customizer.take().is_some() {
            dialogs.close_customizer();
        }
        dialogs.show_customizer(&customizer);
        self.customizer = Some(customizer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::SearchKey;
    use crate::app::customizer::ControlChange;
    use crate::app::host::recording::{HostCall, RecordingHost};
    use crate::config::{ConfigStore, SettingsField};
    use crate::domain::core::Rect;
    use tempfile::TempDir;
    use std::collections::VecDeque;
    use std::fs;

    /// Dialogs answering from a script
    #[derive(Default)]
    struct ScriptedDialogs {
        folders: VecDeque<Option<PathBuf>>,
        texts: VecDeque<Option<String>>,
        shown: Vec<&'static str>,
        refreshed: usize,
        closed: usize,
    }

    impl Dialogs for ScriptedDialogs {
        fn pick_folder(&mut self, _title: &str) -> Option<PathBuf> {
            self.folders.pop_front().flatten()
        }

        fn prompt_text(&mut self, _title: &str, _label: &str, _initial: &str) -> Option<String> {
            self.texts.pop_front().flatten()
        }

        fn show_customizer(&mut self, customizer: &Customizer) {
            self.shown.push(customizer.title());
        }

        fn refresh_customizer(&mut self, _customizer: &Customizer) {
            self.refreshed += 1;
        }

        fn close_customizer(&mut self) {
            self.closed += 1;
        }
    }

    fn session(scratch: &TempDir) -> Session<RecordingHost> {
        let store = ConfigStore::new(scratch.path().join("store"));
        Session::new(TrayController::start(store, RecordingHost::default()))
    }

    fn folder(scratch: &TempDir, name: &str, files: &[&str]) -> PathBuf {
        let folder = scratch.path().join(name);
        fs::create_dir_all(&folder).unwrap();
        for file in files {
            fs::write(folder.join(file), b"data").unwrap();
        }
        folder
    }

    fn add_zone(session: &mut Session<RecordingHost>, dialogs: &mut ScriptedDialogs, folder: PathBuf) -> ZoneId {
        dialogs.folders.push_back(Some(folder));
        session.handle(UiCommand::Tray(TrayCommand::AddZone), dialogs);
        session.controller().zones().last().unwrap().id()
    }

    #[test]
    fn add_zone_uses_picked_folder() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();

        dialogs.folders.push_back(None);
        session.handle(UiCommand::Tray(TrayCommand::AddZone), &mut dialogs);
        assert!(session.controller().zones().is_empty());

        let id = add_zone(&mut session, &mut dialogs, folder(&scratch, "Games", &["a.exe"]));
        assert_eq!(session.controller().zone(id).unwrap().name(), "Games");
    }

    #[test]
    fn rename_goes_through_prompt() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();
        let id = add_zone(&mut session, &mut dialogs, folder(&scratch, "Old", &[]));

        dialogs.texts.push_back(None);
        session.handle(UiCommand::Zone(id, ZoneCommand::Title(TitleAction::Rename)), &mut dialogs);
        assert_eq!(session.controller().zone(id).unwrap().name(), "Old");

        dialogs.texts.push_back(Some("Projects".into()));
        session.handle(UiCommand::Zone(id, ZoneCommand::Title(TitleAction::Rename)), &mut dialogs);
        assert_eq!(session.controller().zone(id).unwrap().name(), "Projects");
        assert!(session.controller().store().zone_file_path("Projects").exists());
    }

    #[test]
    fn search_keys_edit_the_query() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();
        let id = add_zone(&mut session, &mut dialogs, folder(&scratch, "Docs", &["alpha.txt", "beta.txt"]));

        // ignored while the search row is closed
        session.handle(UiCommand::Zone(id, ZoneCommand::Search(SearchKey::Char('x'))), &mut dialogs);
        assert_eq!(session.controller().zone(id).unwrap().search(), None);

        session.handle(UiCommand::Zone(id, ZoneCommand::ToggleSearch), &mut dialogs);
        for key in [SearchKey::Char('B'), SearchKey::Char('e'), SearchKey::Char('x'), SearchKey::Backspace] {
            session.handle(UiCommand::Zone(id, ZoneCommand::Search(key)), &mut dialogs);
        }
        let zone = session.controller().zone(id).unwrap();
        assert_eq!(zone.search(), Some("Be"));
        assert_eq!(zone.visible_entries().len(), 1);

        session.handle(UiCommand::Zone(id, ZoneCommand::Search(SearchKey::Escape)), &mut dialogs);
        let zone = session.controller().zone(id).unwrap();
        assert_eq!(zone.search(), None);
        assert_eq!(zone.visible_entries().len(), 2);
    }

    #[test]
    fn customizer_changes_are_applied_and_refreshed() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();
        let id = add_zone(&mut session, &mut dialogs, folder(&scratch, "Z", &[]));

        // no customizer open yet
        session.handle(
            UiCommand::Customizer(ControlChange::Text {
                field: SettingsField::Rows,
                text: "7".into(),
            }),
            &mut dialogs,
        );
        assert_eq!(session.controller().global().rows, 5);

        session.handle(UiCommand::Tray(TrayCommand::GlobalCustomize), &mut dialogs);
        session.handle(
            UiCommand::Customizer(ControlChange::Text {
                field: SettingsField::Rows,
                text: "7".into(),
            }),
            &mut dialogs,
        );
        assert_eq!(session.controller().global().rows, 7);
        assert_eq!(session.controller().zone(id).unwrap().settings().rows, 7);
        assert_eq!(dialogs.refreshed, 1);

        // opening the zone customizer replaces the global one
        session.handle(UiCommand::Zone(id, ZoneCommand::Title(TitleAction::Customize)), &mut dialogs);
        assert_eq!(dialogs.shown, vec!["Global Customizer", "Local Customizer"]);
        assert_eq!(dialogs.closed, 1);

        session.handle(
            UiCommand::Customizer(ControlChange::Override {
                field: SettingsField::Rows,
                checked: true,
            }),
            &mut dialogs,
        );
        assert!(session.controller().zone(id).unwrap().overrides().contains(SettingsField::Rows));

        session.handle(UiCommand::Zone(id, ZoneCommand::Title(TitleAction::Close)), &mut dialogs);
        assert!(session.customizer().is_none());
        assert_eq!(dialogs.closed, 2);
    }

    #[test]
    fn failures_do_not_stop_the_session() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();

        let flow = session.handle(
            UiCommand::Zone(ZoneId(42), ZoneCommand::Moved(Rect::new(0, 0, 10, 10))),
            &mut dialogs,
        );
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn click_through_toggles_and_quit_saves() {
        let scratch = TempDir::new().unwrap();
        let mut session = session(&scratch);
        let mut dialogs = ScriptedDialogs::default();

        session.handle(UiCommand::Tray(TrayCommand::ToggleClickThrough), &mut dialogs);
        session.handle(UiCommand::Tray(TrayCommand::ToggleClickThrough), &mut dialogs);
        assert_eq!(
            session.controller().host().calls,
            vec![HostCall::ClickThrough(true), HostCall::ClickThrough(false)]
        );

        assert_eq!(session.handle(UiCommand::Tray(TrayCommand::Quit), &mut dialogs), Flow::Quit);
        assert!(session.controller().store().global_file().exists());
    }
}

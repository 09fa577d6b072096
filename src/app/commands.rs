//! Typed UI commands queued by window procedures
//!
//! Window procedures run re-entrantly inside the message loop and must not
//! touch the controller. They post commands here; the main loop drains the
//! queue between messages and hands each command to the controller.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::app::customizer::ControlChange;
use crate::app::zone::ZoneId;
use crate::domain::core::Rect;

/// Entry picked from a zone's title bar menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleAction {
    ChangeFolder,
    Rename,
    ToggleLock,
    Customize,
    Close,
}

/// Keys routed to an open search row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Char(char),
    Backspace,
    Escape,
}

impl SearchKey {
    /// Maps a WM_CHAR character code; other control characters are dropped
    pub fn from_char_code(code: u32) -> Option<Self> {
        match code {
            0x08 => Some(SearchKey::Backspace),
            0x1b => Some(SearchKey::Escape),
            code => char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(SearchKey::Char),
        }
    }

    /// Applies the key to `query`
    ///
    /// # Returns
    /// The edited query, or None when the key closes the search row
    pub fn apply(self, query: &str) -> Option<String> {
        match self {
            SearchKey::Char(c) => Some(format!("{query}{c}")),
            SearchKey::Backspace => {
                let mut text = query.to_string();
                text.pop();
                Some(text)
            }
            SearchKey::Escape => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneCommand {
    /// Drag or resize finished with this window rectangle
    Moved(Rect),
    Title(TitleAction),
    /// Context menu on the grid area
    ToggleSearch,
    Search(SearchKey),
    /// Double click on a grid slot
    Launch { slot: usize },
    /// Double click on the title bar
    ToggleCollapse,
    /// Wheel movement in whole rows, positive scrolls down
    Scroll(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    AddZone,
    GlobalCustomize,
    ToggleClickThrough,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Zone(ZoneId, ZoneCommand),
    Tray(TrayCommand),
    Customizer(ControlChange),
    CustomizerClosed,
}

thread_local! {
    static QUEUE: RefCell<VecDeque<UiCommand>> = RefCell::new(VecDeque::new());
}

/// Queues a command for the main loop
pub fn post(command: UiCommand) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(command));
}

/// Takes every queued command in posting order
pub fn drain() -> Vec<UiCommand> {
    QUEUE.with(|queue| queue.borrow_mut().drain(..).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties_queue() {
        drain();
        post(UiCommand::Tray(TrayCommand::AddZone));
        post(UiCommand::Zone(ZoneId(1), ZoneCommand::Scroll(-1)));
        post(UiCommand::CustomizerClosed);

        assert_eq!(
            drain(),
            vec![
                UiCommand::Tray(TrayCommand::AddZone),
                UiCommand::Zone(ZoneId(1), ZoneCommand::Scroll(-1)),
                UiCommand::CustomizerClosed,
            ]
        );
        assert!(drain().is_empty());
    }

    #[test]
    fn char_codes_map_to_search_keys() {
        assert_eq!(SearchKey::from_char_code('a' as u32), Some(SearchKey::Char('a')));
        assert_eq!(SearchKey::from_char_code(0x08), Some(SearchKey::Backspace));
        assert_eq!(SearchKey::from_char_code(0x1b), Some(SearchKey::Escape));
        // Enter and Tab
        assert_eq!(SearchKey::from_char_code(0x0d), None);
        assert_eq!(SearchKey::from_char_code(0x09), None);
        assert_eq!(SearchKey::from_char_code(0xd800), None);
    }

    #[test]
    fn search_keys_edit_query() {
        assert_eq!(SearchKey::Char('é').apply("caf"), Some("café".to_string()));
        assert_eq!(SearchKey::Backspace.apply("café"), Some("caf".to_string()));
        assert_eq!(SearchKey::Backspace.apply(""), Some(String::new()));
        assert_eq!(SearchKey::Escape.apply("abc"), None);
    }

    #[test]
    fn queue_is_per_thread() {
        drain();
        post(UiCommand::Tray(TrayCommand::Quit));
        let other = std::thread::spawn(drain).join().unwrap();
        assert!(other.is_empty());
        assert_eq!(drain(), vec![UiCommand::Tray(TrayCommand::Quit)]);
    }
}

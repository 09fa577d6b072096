//! Zone lifecycle state
//!
//! A zone is created Unloaded, passes through Loading while its settings and
//! entries are assembled, and ends Ready. Closed is terminal.

/// Where a zone's initial settings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Freshly chosen folder, seeded from the global settings
    Folder,
    /// Persisted zone file
    Record,
}

/// Lifecycle state of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneState {
    #[default]
    Unloaded,
    Loading(LoadSource),
    /// Accepts rename, folder change, customization, move, search, lock,
    /// collapse and close
    Ready,
    Closed,
}

impl ZoneState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ZoneState::Ready)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ZoneState::Closed)
    }
}

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    BeginLoad(LoadSource),
    LoadFinished,
    Close,
}

/// State machine for zone lifecycle transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes an event and returns the new state
    ///
    /// Events that make no sense in the current state leave it unchanged.
    pub fn process_event(current: ZoneState, event: ZoneEvent) -> ZoneState {
        match (current, event) {
            (ZoneState::Unloaded, ZoneEvent::BeginLoad(source)) => ZoneState::Loading(source),
            (ZoneState::Loading(_), ZoneEvent::LoadFinished) => ZoneState::Ready,
            (ZoneState::Closed, event) => {
                log::debug!("Ignoring {event:?} on a closed zone");
                ZoneState::Closed
            }
            (_, ZoneEvent::Close) => ZoneState::Closed,

            // Invalid transitions - ignore event
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_unloaded() {
        assert_eq!(ZoneState::default(), ZoneState::Unloaded);
    }

    #[test]
    fn both_creation_paths_end_ready() {
        for source in [LoadSource::Folder, LoadSource::Record] {
            let state = StateMachine::process_event(ZoneState::Unloaded, ZoneEvent::BeginLoad(source));
            assert_eq!(state, ZoneState::Loading(source));
            let state = StateMachine::process_event(state, ZoneEvent::LoadFinished);
            assert!(state.is_ready());
        }
    }

    #[test]
    fn close_is_terminal() {
        let state = StateMachine::process_event(ZoneState::Ready, ZoneEvent::Close);
        assert!(state.is_closed());

        let state = StateMachine::process_event(state, ZoneEvent::BeginLoad(LoadSource::Folder));
        assert!(state.is_closed());
        let state = StateMachine::process_event(state, ZoneEvent::LoadFinished);
        assert!(state.is_closed());
    }

    #[test]
    fn invalid_transitions_are_ignored() {
        let state = StateMachine::process_event(ZoneState::Unloaded, ZoneEvent::LoadFinished);
        assert_eq!(state, ZoneState::Unloaded);

        let state = StateMachine::process_event(ZoneState::Ready, ZoneEvent::BeginLoad(LoadSource::Record));
        assert_eq!(state, ZoneState::Ready);
    }
}

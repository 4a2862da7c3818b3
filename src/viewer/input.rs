//! Keys and the browsing state machine.

use crate::approval::types::{Action, ActionSelection};
use crate::viewer::session::ViewerError;
use crate::viewer::viewport::ViewerState;
use std::collections::VecDeque;

/// A key event, reduced to what the viewer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Char(char),
    /// Ctrl-C or an external interrupt. Treated like `q`.
    Interrupt,
    /// The terminal changed size.
    Resize,
    Other,
}

/// Where keys come from. Reading blocks until the next key.
pub trait KeySource {
    fn next_key(&mut self) -> Result<Key, ViewerError>;
}

/// Replays a fixed list of keys, then reports an interrupt (for testing).
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Shorthand: each char becomes `Key::Char`, except `^`/`v` for up/down.
    pub fn from_script(script: &str) -> Self {
        Self::new(script.chars().map(|c| match c {
            '^' => Key::Up,
            'v' => Key::Down,
            c => Key::Char(c),
        }))
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Key, ViewerError> {
        Ok(self.keys.pop_front().unwrap_or(Key::Interrupt))
    }
}

/// Loop states. `Browsing` is the only non-terminal one.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    Browsing,
    Exited,
    ActionSelected(ActionSelection),
}

/// Apply one key to the viewer state.
///
/// Action keys on an empty list are ignored. Moving the selection clears the
/// status notice. Resize is left to the caller, which knows the new size.
pub fn handle_key(state: &mut ViewerState, key: Key) -> LoopState {
    match key {
        Key::Char('q') | Key::Interrupt => LoopState::Exited,
        Key::Up | Key::Char('k') => {
            state.clear_notice();
            state.move_up();
            LoopState::Browsing
        }
        Key::Down | Key::Char('j') => {
            state.clear_notice();
            state.move_down();
            LoopState::Browsing
        }
        Key::Char(c) => match (Action::from_key(c), state.selected()) {
            (Some(action), Some(request)) => LoopState::ActionSelected(ActionSelection {
                action,
                request: request.clone(),
            }),
            _ => LoopState::Browsing,
        },
        Key::Resize | Key::Other => LoopState::Browsing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::types::ApprovalRequest;

    fn state(n: usize) -> ViewerState {
        let records = (0..n)
            .map(|i| ApprovalRequest::new(format!("projects/p/approvalRequests/r{}", i)))
            .collect();
        ViewerState::new(records, 5)
    }

    #[test]
    fn test_quit_and_interrupt_exit() {
        let mut s = state(2);
        assert_eq!(handle_key(&mut s, Key::Char('q')), LoopState::Exited);
        assert_eq!(handle_key(&mut s, Key::Interrupt), LoopState::Exited);
    }

    #[test]
    fn test_navigation_stays_browsing() {
        let mut s = state(3);
        assert_eq!(handle_key(&mut s, Key::Down), LoopState::Browsing);
        assert_eq!(handle_key(&mut s, Key::Char('j')), LoopState::Browsing);
        assert_eq!(s.selected_index(), 2);
        assert_eq!(handle_key(&mut s, Key::Up), LoopState::Browsing);
        assert_eq!(s.selected_index(), 1);
    }

    #[test]
    fn test_action_selects_highlighted_record() {
        let mut s = state(3);
        handle_key(&mut s, Key::Down);
        match handle_key(&mut s, Key::Char('d')) {
            LoopState::ActionSelected(sel) => {
                assert_eq!(sel.action, Action::Dismiss);
                assert_eq!(sel.request.short_id(), "r1");
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_action_on_empty_is_ignored() {
        let mut s = state(0);
        for c in ['a', 'd', 'r'] {
            assert_eq!(handle_key(&mut s, Key::Char(c)), LoopState::Browsing);
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut s = state(2);
        assert_eq!(handle_key(&mut s, Key::Char('x')), LoopState::Browsing);
        assert_eq!(handle_key(&mut s, Key::Other), LoopState::Browsing);
        assert_eq!(s.selected_index(), 0);
    }

    #[test]
    fn test_scripted_keys_end_with_interrupt() {
        let mut keys = ScriptedKeys::from_script("v^a");
        assert_eq!(keys.next_key().unwrap(), Key::Down);
        assert_eq!(keys.next_key().unwrap(), Key::Up);
        assert_eq!(keys.next_key().unwrap(), Key::Char('a'));
        assert_eq!(keys.next_key().unwrap(), Key::Interrupt);
        assert_eq!(keys.remaining(), 0);
    }

    #[test]
    fn test_navigation_clears_notice() {
        let mut s = state(3);
        s.set_notice("✓ Request r0 approved");
        assert_eq!(handle_key(&mut s, Key::Char('x')), LoopState::Browsing);
        assert_eq!(s.notice(), Some("✓ Request r0 approved"));
        handle_key(&mut s, Key::Down);
        assert_eq!(s.notice(), None);
    }
}

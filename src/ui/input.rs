/// Input state tracker.
///
/// Tracks which keys are currently held down, so a steering key keeps
/// steering for as long as it is held, and two players can hold keys at
/// the same time.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::grid::Direction;
use crate::sim::menu::MenuKey;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Keys bound to the four headings of one steerable actor.
pub struct KeyMap {
    pub up: &'static [KeyCode],
    pub down: &'static [KeyCode],
    pub left: &'static [KeyCode],
    pub right: &'static [KeyCode],
}

pub const ARROWS: KeyMap = KeyMap {
    up: &[KeyCode::Up],
    down: &[KeyCode::Down],
    left: &[KeyCode::Left],
    right: &[KeyCode::Right],
};

pub const WASD: KeyMap = KeyMap {
    up: &[KeyCode::Char('w'), KeyCode::Char('W')],
    down: &[KeyCode::Char('s'), KeyCode::Char('S')],
    left: &[KeyCode::Char('a'), KeyCode::Char('A')],
    right: &[KeyCode::Char('d'), KeyCode::Char('D')],
};

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Held heading for one key map. Up wins over Down over Left over Right.
    pub fn direction(&self, keys: &KeyMap) -> Option<Direction> {
        let active = |codes: &[KeyCode]| self.any_held(codes) || self.any_pressed(codes);
        if active(keys.up) {
            Some(Direction::Up)
        } else if active(keys.down) {
            Some(Direction::Down)
        } else if active(keys.left) {
            Some(Direction::Left)
        } else if active(keys.right) {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Esc, q or Ctrl+C this frame.
    pub fn quit_requested(&self) -> bool {
        self.ctrl_c_pressed() || self.any_pressed(KEYS_QUIT)
    }

    /// Enter or Space this frame.
    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(KEYS_CONFIRM)
    }

    /// Fresh presses decoded for the setup menu, in arrival order.
    /// Ctrl+C overrides everything else as a single `Quit`.
    pub fn menu_keys(&self) -> Vec<MenuKey> {
        if self.ctrl_c_pressed() {
            return vec![MenuKey::Quit];
        }
        self.fresh_presses.iter().filter_map(|&code| menu_key(code)).collect()
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }
}

fn menu_key(code: KeyCode) -> Option<MenuKey> {
    let key = match code {
        KeyCode::Up => MenuKey::Up,
        KeyCode::Down => MenuKey::Down,
        KeyCode::Esc => MenuKey::Back,
        KeyCode::Char('q') | KeyCode::Char('Q') => MenuKey::Quit,
        c if KEYS_CONFIRM.contains(&c) => MenuKey::Confirm,
        KeyCode::Char(c) => MenuKey::Char(c),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(input: &mut InputState, code: KeyCode) {
        input.record(key(code, KeyEventKind::Press));
    }

    #[test]
    fn held_keys_steer_both_players() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Char('w'));
        assert_eq!(input.direction(&ARROWS), Some(Direction::Left));
        assert_eq!(input.direction(&WASD), Some(Direction::Up));
    }

    #[test]
    fn vertical_keys_take_priority() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Right);
        press(&mut input, KeyCode::Down);
        assert_eq!(input.direction(&ARROWS), Some(Direction::Down));
        press(&mut input, KeyCode::Up);
        assert_eq!(input.direction(&ARROWS), Some(Direction::Up));
    }

    #[test]
    fn release_only_counts_when_enhancement_is_on() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Up);
        input.record(key(KeyCode::Up, KeyEventKind::Release));
        assert!(input.is_held(KeyCode::Up));

        input.honor_release = true;
        input.record(key(KeyCode::Up, KeyEventKind::Release));
        assert!(!input.is_held(KeyCode::Up));
        assert_eq!(input.direction(&ARROWS), Some(Direction::Up), "still a fresh press this frame");
    }

    #[test]
    fn stale_keys_expire() {
        let mut input = InputState::new();
        if let Some(then) = Instant::now().checked_sub(HOLD_TIMEOUT * 2) {
            input.last_active.insert(KeyCode::Left, then);
            assert!(!input.is_held(KeyCode::Left));
            assert_eq!(input.direction(&ARROWS), None);
        }
    }

    #[test]
    fn menu_keys_in_arrival_order() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Char('1'));
        press(&mut input, KeyCode::Down);
        press(&mut input, KeyCode::Enter);
        press(&mut input, KeyCode::F(5));
        press(&mut input, KeyCode::Esc);
        assert_eq!(
            input.menu_keys(),
            vec![MenuKey::Char('1'), MenuKey::Down, MenuKey::Confirm, MenuKey::Back]
        );
        assert!(input.confirm_pressed());

        let mut input = InputState::new();
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        press(&mut input, KeyCode::Char('Q'));
        assert_eq!(input.menu_keys(), vec![MenuKey::Quit]);
    }

    #[test]
    fn quit_keys() {
        let mut input = InputState::new();
        assert!(!input.quit_requested());
        press(&mut input, KeyCode::Char('q'));
        assert!(input.quit_requested());

        let mut input = InputState::new();
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
        assert!(input.quit_requested());
    }
}

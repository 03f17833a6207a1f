//! Input handling: key events in, one `TickInput` per tick out
//!
//! Movement keys are level-triggered. Many terminals never report key
//! releases, so a key counts as held while its repeat events keep arriving
//! within `KEY_TIMEOUT`. A single tap moves exactly once: continuous movement
//! starts only after the terminal begins auto-repeating.
//!
//! Rotate, force-next, restart and quit are edge-triggered latches, each
//! consumed by the next tick.

use crate::game::TickInput;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::warn;

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(150);

/// Key bindings, parsed - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub move_down: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub force_next: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        warn!("Ignoring unknown key name {:?}", s);
                        return None;
                    }
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            move_down: Self::parse_keys(&settings.keys.move_down),
            rotate: Self::parse_keys(&settings.keys.rotate),
            force_next: Self::parse_keys(&settings.keys.force_next),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Held-key tracking for one level-triggered action
#[derive(Debug, Clone, Default)]
struct HeldKey {
    /// An event arrived since the last tick
    pending: bool,
    /// Most recent press/repeat; None once released or timed out
    last_seen: Option<Instant>,
    /// A second event arrived while still held (terminal auto-repeat)
    repeating: bool,
}

impl HeldKey {
    fn press(&mut self, now: Instant) {
        if self.last_seen.is_some() {
            self.repeating = true;
        }
        self.pending = true;
        self.last_seen = Some(now);
    }

    fn release(&mut self) {
        self.last_seen = None;
        self.repeating = false;
    }

    /// Whether the key counts as held for this tick
    fn sample(&mut self, now: Instant) -> bool {
        let alive = self
            .last_seen
            .is_some_and(|seen| now.duration_since(seen) <= KEY_TIMEOUT);
        if !alive {
            self.release();
        }
        let held = self.pending || (alive && self.repeating);
        self.pending = false;
        held
    }
}

/// Edge-triggered requests latched since the last tick
#[derive(Debug, Clone, Copy, Default)]
struct Latches {
    rotate: bool,
    force_next: bool,
    restart: bool,
    quit: bool,
}

/// Turns key events into per-tick input
pub struct InputHandler {
    left: HeldKey,
    right: HeldKey,
    down: HeldKey,
    latches: Latches,
    /// Key bindings
    bindings: KeyBindings,
}

impl InputHandler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            left: HeldKey::default(),
            right: HeldKey::default(),
            down: HeldKey::default(),
            latches: Latches::default(),
            bindings,
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(KeyBindings::from_settings(settings))
    }

    /// Record a key event
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        // Ctrl+C always quits
        if key.kind == KeyEventKind::Press
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            self.latches.quit = true;
            return;
        }

        let code = normalize_key(key.code);

        if let Some(held) = self.held_for(code) {
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => held.press(now),
                KeyEventKind::Release => held.release(),
            }
            return;
        }

        // Edge-triggered: only a fresh press fires, never a repeat or release
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.bindings.rotate.contains(&code) {
            self.latches.rotate = true;
        } else if self.bindings.force_next.contains(&code) {
            self.latches.force_next = true;
        } else if self.bindings.restart.contains(&code) {
            self.latches.restart = true;
        } else if self.bindings.quit.contains(&code) {
            self.latches.quit = true;
        }
    }

    fn held_for(&mut self, code: KeyCode) -> Option<&mut HeldKey> {
        if self.bindings.move_left.contains(&code) {
            Some(&mut self.left)
        } else if self.bindings.move_right.contains(&code) {
            Some(&mut self.right)
        } else if self.bindings.move_down.contains(&code) {
            Some(&mut self.down)
        } else {
            None
        }
    }

    /// Build the input for one tick and consume the latches
    pub fn tick_input(&mut self, now: Instant, gravity: bool) -> TickInput {
        TickInput {
            left: self.left.sample(now),
            right: self.right.sample(now),
            down: self.down.sample(now),
            rotate: std::mem::take(&mut self.latches.rotate),
            force_next: std::mem::take(&mut self.latches.force_next),
            quit: std::mem::take(&mut self.latches.quit),
            gravity,
        }
    }

    /// Whether restart was pressed since the last call
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.latches.restart)
    }

    /// Quit pressed while no game is ticking (e.g. game over screen)
    pub fn take_quit(&mut self) -> bool {
        std::mem::take(&mut self.latches.quit)
    }

    /// Clear all held keys and pending requests
    pub fn clear(&mut self) {
        self.left = HeldKey::default();
        self.right = HeldKey::default();
        self.down = HeldKey::default();
        self.latches = Latches::default();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

/// Periodic gravity signal, independent of the frame rate
#[derive(Debug, Clone)]
pub struct GravityTimer {
    period: Duration,
    last: Instant,
}

impl GravityTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    /// True at most once per call when a period has elapsed
    ///
    /// Missed periods are not replayed: a long stall yields one step.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn event(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tap_moves_once() {
        let mut input = InputHandler::default();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Left), t0);
        assert!(input.tick_input(t0 + ms(10), false).left);
        assert!(!input.tick_input(t0 + ms(60), false).left);
        assert!(!input.tick_input(t0 + ms(500), false).left);
    }

    #[test]
    fn test_auto_repeat_counts_as_held() {
        let mut input = InputHandler::default();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Down), t0);
        input.handle_key(press(KeyCode::Down), t0 + ms(30));
        // Held on every tick while repeats keep arriving
        for i in 1..=4 {
            let now = t0 + ms(30 + i * 20);
            assert!(input.tick_input(now, false).down, "tick {}", i);
        }
        input.handle_key(press(KeyCode::Down), t0 + ms(100));
        assert!(input.tick_input(t0 + ms(140), false).down);
        // Repeats stopped: released after the timeout
        assert!(!input.tick_input(t0 + ms(400), false).down);
    }

    #[test]
    fn test_release_event_stops_holding() {
        let mut input = InputHandler::default();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Right), t0);
        input.handle_key(event(KeyCode::Right, KeyEventKind::Repeat), t0 + ms(20));
        assert!(input.tick_input(t0 + ms(30), false).right);
        input.handle_key(event(KeyCode::Right, KeyEventKind::Release), t0 + ms(40));
        assert!(!input.tick_input(t0 + ms(50), false).right);
    }

    #[test]
    fn test_rotate_fires_once_per_press() {
        let mut input = InputHandler::default();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        input.handle_key(event(KeyCode::Up, KeyEventKind::Repeat), t0 + ms(5));
        assert!(input.tick_input(t0 + ms(10), false).rotate);
        input.handle_key(event(KeyCode::Up, KeyEventKind::Repeat), t0 + ms(20));
        assert!(!input.tick_input(t0 + ms(30), false).rotate);
        input.handle_key(event(KeyCode::Up, KeyEventKind::Release), t0 + ms(35));
        input.handle_key(press(KeyCode::Up), t0 + ms(40));
        assert!(input.tick_input(t0 + ms(50), false).rotate);
    }

    #[test]
    fn test_edge_latches_and_gravity_flag() {
        let mut input = InputHandler::default();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Char('N')), t0);
        let tick = input.tick_input(t0, true);
        assert!(tick.force_next);
        assert!(tick.gravity);
        assert!(!tick.quit);

        input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), t0);
        assert!(input.tick_input(t0, false).quit);

        input.handle_key(press(KeyCode::Char('r')), t0);
        let tick = input.tick_input(t0, false);
        assert_eq!(tick, TickInput::default());
        assert!(input.take_restart());
        assert!(!input.take_restart());
    }

    #[test]
    fn test_custom_bindings() {
        let mut settings = Settings::default();
        settings.keys.rotate = vec!["x".to_string(), "bogus-key".to_string()];
        let bindings = KeyBindings::from_settings(&settings);
        assert_eq!(bindings.rotate, vec![KeyCode::Char('x')]);

        let mut input = InputHandler::from_settings(&settings);
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        assert!(!input.tick_input(t0, false).rotate);
        input.handle_key(press(KeyCode::Char('x')), t0);
        assert!(input.tick_input(t0, false).rotate);
    }

    #[test]
    fn test_gravity_timer() {
        let t0 = Instant::now();
        let mut timer = GravityTimer::new(ms(100), t0);
        assert!(!timer.poll(t0 + ms(50)));
        assert!(timer.poll(t0 + ms(100)));
        assert!(!timer.poll(t0 + ms(150)));
        // A long stall yields a single step
        assert!(timer.poll(t0 + ms(1000)));
        assert!(!timer.poll(t0 + ms(1050)));
        timer.reset(t0 + ms(1090));
        assert!(!timer.poll(t0 + ms(1150)));
        assert!(timer.poll(t0 + ms(1190)));
    }
}

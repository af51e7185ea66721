use chip8_vm::emulator::keypad::NUM_KEYS;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A thread-safe record of which keypad keys are held.
///
/// Terminals report key presses (and repeats) but not releases, so a key
/// counts as held for `hold` after its most recent press event.
/// Wrap it in an `std::sync::Arc` to share it between the listener and the emulator.
pub struct KeyState {
    hold: Duration,
    pressed_at: Mutex<[Option<Instant>; NUM_KEYS]>,
}

impl KeyState {
    pub fn new(hold: Duration) -> KeyState {
        KeyState {
            hold,
            pressed_at: Mutex::new([None; NUM_KEYS]),
        }
    }

    /// Record a press of a keypad key.
    pub fn press(&self, key: u8) {
        if let Some(slot) = self.pressed_at.lock().unwrap().get_mut(key as usize) {
            *slot = Some(Instant::now());
        }
    }

    /// Which keys are held right now.
    pub fn snapshot(&self) -> [bool; NUM_KEYS] {
        self.snapshot_at(Instant::now())
    }

    fn snapshot_at(&self, now: Instant) -> [bool; NUM_KEYS] {
        let pressed_at = self.pressed_at.lock().unwrap();
        let mut keys = [false; NUM_KEYS];
        for (held, at) in keys.iter_mut().zip(pressed_at.iter()) {
            *held = at.map_or(false, |at| now.duration_since(at) < self.hold);
        }
        keys
    }
}

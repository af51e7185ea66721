pub const NUM_KEYS: usize = 16;

/// The hexadecimal keypad, keys 0x0 to 0xF.
///
/// Besides the current state of each key, the keypad remembers which keys
/// went from released to pressed since the edges were last taken. That is what
/// lets `Fx0A` tell a new press apart from a key that is being held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    pressed: [bool; NUM_KEYS],
    edges: u16,
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Replace the state of every key at once, latching any new presses.
    pub fn set_all(&mut self, keys: [bool; NUM_KEYS]) {
        for (key, &down) in keys.iter().enumerate() {
            self.set(key as u8, down);
        }
    }

    /// Set a single key. Keys outside 0x0..=0xF are ignored.
    pub fn set(&mut self, key: u8, down: bool) {
        let key = key as usize;
        if key >= NUM_KEYS {
            return;
        }
        if down && !self.pressed[key] {
            self.edges |= 1 << key;
        }
        self.pressed[key] = down;
    }

    /// Whether a key is held. Only the low nibble of `key` is used.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed[(key & 0xF) as usize]
    }

    pub fn state(&self) -> [bool; NUM_KEYS] {
        self.pressed
    }

    /// Forget every press seen so far.
    pub fn clear_edges(&mut self) {
        self.edges = 0;
    }

    /// Take the lowest key that was newly pressed, if any, and clear all latched edges.
    pub fn take_new_press(&mut self) -> Option<u8> {
        if self.edges == 0 {
            return None;
        }
        let key = self.edges.trailing_zeros() as u8;
        self.edges = 0;
        Some(key)
    }
}

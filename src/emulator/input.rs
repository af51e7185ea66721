use crate::emulator::keypad::NUM_KEYS;

/// Represents an input device that is capable of reporting the state of keys 0x0..=0xF.
pub trait EmulatorInput {
    /// Called before every instruction cycle.
    /// Returns the state of all 16 keys, or `None` if nothing changed.
    fn poll(&mut self) -> Option<[bool; NUM_KEYS]>;
}

/// An input device that never provides any input
pub struct DummyInput;

impl EmulatorInput for DummyInput {
    fn poll(&mut self) -> Option<[bool; NUM_KEYS]> {
        None
    }
}

/// Replays a fixed sequence of key states, one per poll, then reports no changes.
pub struct ScriptedInput {
    frames: std::vec::IntoIter<[bool; NUM_KEYS]>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<[bool; NUM_KEYS]>) -> ScriptedInput {
        ScriptedInput {
            frames: frames.into_iter(),
        }
    }
}

impl EmulatorInput for ScriptedInput {
    fn poll(&mut self) -> Option<[bool; NUM_KEYS]> {
        self.frames.next()
    }
}

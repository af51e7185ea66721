use crate::emulator::framebuffer::Framebuffer;

/// Represents a screen and a speaker that can be written to.
/// Neither is ever read back by the emulator.
pub trait EmulatorOutput {
    /// Show a finished frame.
    fn present(&mut self, screen: &Framebuffer);
    /// Start or stop the tone. Called whenever the timers tick.
    fn set_tone(&mut self, on: bool);
}

/// A simple output device that keeps track of what it was given.
pub struct DummyOutput {
    last_frame: Framebuffer,
    frames: usize,
    tone: bool,
}

impl DummyOutput {
    pub fn new() -> DummyOutput {
        DummyOutput {
            last_frame: Framebuffer::new(),
            frames: 0,
            tone: false,
        }
    }

    pub fn last_frame(&self) -> &Framebuffer {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> usize {
        self.frames
    }

    pub fn tone(&self) -> bool {
        self.tone
    }
}

impl Default for DummyOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorOutput for DummyOutput {
    fn present(&mut self, screen: &Framebuffer) {
        self.last_frame.clone_from(screen);
        self.frames += 1;
    }

    fn set_tone(&mut self, on: bool) {
        self.tone = on;
    }
}

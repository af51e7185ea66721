use chip8_vm::emulator::framebuffer::{Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8_vm::emulator::input::EmulatorInput;
use chip8_vm::emulator::keypad::NUM_KEYS;
use chip8_vm::emulator::output::EmulatorOutput;

use super::key_state::KeyState;

use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, ExecutableCommand, QueueableCommand};
use std::io::{self, stdout, Stdout, Write};
use std::sync::Arc;

// Every pixel is two characters wide, to look roughly square.
const CELL_WIDTH: u16 = 2;

pub struct CrosstermInput {
    keys: Arc<KeyState>,
}

impl CrosstermInput {
    pub fn new(keys: Arc<KeyState>) -> CrosstermInput {
        CrosstermInput { keys }
    }
}

impl EmulatorInput for CrosstermInput {
    fn poll(&mut self) -> Option<[bool; NUM_KEYS]> {
        Some(self.keys.snapshot())
    }
}

pub struct CrosstermOutput {
    stdout: Stdout,
    // What is currently on the terminal, or None before the first frame.
    shown: Option<Framebuffer>,
    tone: bool,
}

impl CrosstermOutput {
    pub fn new() -> crossterm::Result<CrosstermOutput> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        stdout
            .execute(EnterAlternateScreen)?
            .execute(cursor::Hide)?
            .execute(Clear(ClearType::All))?;

        let mut output = CrosstermOutput {
            stdout,
            shown: None,
            tone: false,
        };
        output.draw_border()?;
        Ok(output)
    }

    fn draw_border(&mut self) -> crossterm::Result<()> {
        let right = SCREEN_WIDTH as u16 * CELL_WIDTH + 1;
        let bottom = SCREEN_HEIGHT as u16 + 1;
        let horizontal = "━".repeat(right as usize - 1);
        self.stdout
            .queue(cursor::MoveTo(0, 0))?
            .queue(Print(format!("┏{}┓", horizontal)))?
            .queue(cursor::MoveTo(0, bottom))?
            .queue(Print(format!("┗{}┛", horizontal)))?;
        for y in 1..bottom {
            self.stdout
                .queue(cursor::MoveTo(0, y))?
                .queue(Print("┃"))?
                .queue(cursor::MoveTo(right, y))?
                .queue(Print("┃"))?;
        }
        self.stdout
            .queue(cursor::MoveTo(0, bottom + 1))?
            .queue(Print("Esc to quit"))?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Redraw only the pixels that changed since the last frame.
    fn draw(&mut self, screen: &Framebuffer) -> crossterm::Result<()> {
        for (y, row) in screen.rows().enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                let unchanged = self.shown.as_ref().map_or(false, |shown| shown.get(x, y) == pixel);
                if unchanged {
                    continue;
                }
                self.stdout
                    .queue(cursor::MoveTo(x as u16 * CELL_WIDTH + 1, y as u16 + 1))?
                    .queue(Print(if pixel == 1 { "██" } else { "  " }))?;
            }
        }
        self.stdout.flush()?;
        self.shown = Some(screen.clone());
        Ok(())
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl EmulatorOutput for CrosstermOutput {
    fn present(&mut self, screen: &Framebuffer) {
        if self.shown.as_ref() == Some(screen) {
            return;
        }
        if let Err(error) = self.draw(screen) {
            log::warn!("Could not draw frame: {}", error);
        }
    }

    // The terminal bell is the only sound a terminal can make, so ring it when the tone starts.
    fn set_tone(&mut self, on: bool) {
        if on && !self.tone {
            if let Err(error) = ring_bell(&mut self.stdout) {
                log::warn!("Could not ring bell: {}", error);
            }
        }
        self.tone = on;
    }
}

fn ring_bell<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x07")?;
    out.flush()
}

//! The CHIP-8 machine state as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use crate::emulator::framebuffer::Framebuffer;
use crate::emulator::keypad::Keypad;
use crate::error::{Error, Result};

pub const MEM_SIZE: usize = 4096;
pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const PC_START: u16 = 0x200;
pub const FONT_START: u16 = 0x050;
pub const FONT_GLYPH_SIZE: u16 = 5;
pub const FLAG_REGISTER: usize = 0xF;

pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// All mutable state of a CHIP-8 machine.
///
/// The machine has no behavior of its own beyond keeping its invariants:
/// the stack never holds more than `STACK_SIZE` addresses, and every
/// memory access stays inside the 4 KiB address space.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: [u8; MEM_SIZE],
    pub registers: [u8; NUM_REGISTERS],
    pub i: u16,
    pub program_counter: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    stack_pointer: usize,
    stack: [u16; STACK_SIZE],
    pub screen: Framebuffer,
    pub keypad: Keypad,
}

impl Machine {
    /// Create a machine with the font loaded and everything else zeroed.
    pub fn new() -> Machine {
        let mut machine = Machine {
            memory: [0; MEM_SIZE],
            registers: [0; NUM_REGISTERS],
            i: 0,
            program_counter: PC_START,
            delay_timer: 0,
            sound_timer: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            screen: Framebuffer::new(),
            keypad: Keypad::new(),
        };
        machine.initialize();
        machine
    }

    /// Reset to the power-on state.
    pub fn initialize(&mut self) {
        self.memory = [0; MEM_SIZE];
        let font_start = FONT_START as usize;
        self.memory[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
        self.registers = [0; NUM_REGISTERS];
        self.i = 0;
        self.program_counter = PC_START;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.screen.clear();
        self.keypad = Keypad::new();
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.stack_pointer >= STACK_SIZE {
            return Err(Error::StackOverflow {
                pc: self.program_counter,
            });
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(Error::StackUnderflow {
                pc: self.program_counter,
            });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer
    }

    /// Decrement both timers towards zero. Meant to be called at 60 Hz.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Whether the audio layer should be emitting a tone.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.memory
            .get(addr)
            .copied()
            .ok_or_else(|| self.fault(addr))
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        let fault = self.fault(addr);
        let slot = self.memory.get_mut(addr).ok_or(fault)?;
        *slot = value;
        Ok(())
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn read_slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let end = addr.checked_add(len).filter(|end| *end <= MEM_SIZE);
        match end {
            Some(end) => Ok(&self.memory[addr..end]),
            None => Err(self.fault(addr.max(MEM_SIZE))),
        }
    }

    /// Copy `data` into memory starting at `addr`.
    pub fn write_slice(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        let end = addr.checked_add(data.len()).filter(|end| *end <= MEM_SIZE);
        match end {
            Some(end) => {
                self.memory[addr..end].copy_from_slice(data);
                Ok(())
            }
            None => Err(self.fault(addr.max(MEM_SIZE))),
        }
    }

    /// Fetch the big-endian word at the program counter.
    pub fn fetch(&self) -> Result<u16> {
        let pc = self.program_counter as usize;
        let high = self.read_byte(pc)?;
        let low = self.read_byte(pc + 1)?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn register(&self, x: u8) -> u8 {
        self.registers[(x & 0xF) as usize]
    }

    pub fn set_register(&mut self, x: u8, value: u8) {
        self.registers[(x & 0xF) as usize] = value;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    /// Address of the font glyph for a hexadecimal digit. Only the low nibble is used.
    pub fn font_address(digit: u8) -> u16 {
        FONT_START + (digit & 0xF) as u16 * FONT_GLYPH_SIZE
    }

    fn fault(&self, address: usize) -> Error {
        Error::MemoryAccessFault {
            pc: self.program_counter,
            address,
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

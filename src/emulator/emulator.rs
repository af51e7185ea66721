//! The instruction engine: fetch, decode and execute on top of a [`Machine`].

use crate::emulator::input::{DummyInput, EmulatorInput};
use crate::emulator::instruction::*;
use crate::emulator::machine::{Machine, MEM_SIZE, PC_START};
use crate::emulator::opcode::Opcode;
use crate::emulator::output::{DummyOutput, EmulatorOutput};
use crate::emulator::scheduler::Due;
use crate::error::{Error, Result};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Behaviors that differ between CHIP-8 interpreters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `FX1E` sets VF to 1 when I + VX goes past 0x0FFF, and to 0 otherwise.
    /// When off, VF is left alone.
    pub index_overflow_flag: bool,
}

/// What a single call to [`Emulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An instruction ran to completion.
    Executed(Instruction),
    /// The emulator is parked on `FX0A`, waiting for a key press.
    AwaitingKey,
    /// The program jumped to itself, which is how CHIP-8 programs stop.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    AwaitingKey(Reg),
}

pub struct Emulator<I: EmulatorInput, O: EmulatorOutput> {
    machine: Machine,
    quirks: Quirks,
    rng: StdRng,
    state: State,

    input: I,
    output: O,
}

impl Emulator<DummyInput, DummyOutput> {
    /// Create a new emulator with dummy input and output
    pub fn new() -> Emulator<DummyInput, DummyOutput> {
        Emulator::with_io(DummyInput, DummyOutput::new())
    }
}

impl Default for Emulator<DummyInput, DummyOutput> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: EmulatorInput, O: EmulatorOutput> Emulator<I, O> {
    /// Create a new emulator with input and output
    pub fn with_io(input: I, output: O) -> Emulator<I, O> {
        Emulator {
            machine: Machine::new(),
            quirks: Quirks::default(),
            rng: StdRng::from_entropy(),
            state: State::Running,
            input,
            output,
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    /// Make `CXKK` deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Copy a program into memory at 0x200.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        let max_size = MEM_SIZE - PC_START as usize;
        if program.len() > max_size {
            return Err(Error::RomTooLarge {
                size: program.len(),
                max_size,
            });
        }
        log::debug!("Loading {} bytes at {:#05x}", program.len(), PC_START);
        self.machine.write_slice(PC_START as usize, program)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, State::AwaitingKey(_))
    }

    /// Perform a single cycle: read the keys, then load an instruction and execute it.
    /// While waiting on `FX0A` no instruction is fetched until a key is newly pressed.
    pub fn step(&mut self) -> Result<Step> {
        if let Some(keys) = self.input.poll() {
            self.machine.keypad.set_all(keys);
        }

        let result = match self.state {
            State::AwaitingKey(reg) => Ok(self.resume_key_wait(reg)),
            State::Running => self.fetch_and_execute(),
        };
        if let Err(error) = &result {
            log::error!("{}", error);
        }
        result
    }

    /// Count both timers down by one tick, and tell the output whether to sound.
    pub fn tick_timers(&mut self) {
        self.machine.tick_timers();
        self.output.set_tone(self.machine.sound_active());
    }

    /// Hand the current screen to the output.
    pub fn present(&mut self) {
        self.output.present(&self.machine.screen);
    }

    /// Run the cycles and timer ticks that a [`Scheduler`](crate::emulator::scheduler::Scheduler)
    /// reported as due, presenting a frame if any timer tick happened.
    /// Returns `true` if the program halted.
    pub fn run_due(&mut self, due: Due) -> Result<bool> {
        let mut halted = false;
        for _ in 0..due.cycles {
            if self.step()? == Step::Halted {
                halted = true;
                break;
            }
        }
        for _ in 0..due.timer_ticks {
            self.tick_timers();
        }
        if due.timer_ticks > 0 {
            self.present();
        }
        Ok(halted)
    }

    /// Execute instructions one after another, ignoring the program counter.
    pub fn execute_many(&mut self, instructions: &[Instruction]) -> Result<()> {
        for instruction in instructions {
            self.execute_single(*instruction)?;
        }
        Ok(())
    }

    fn fetch_and_execute(&mut self) -> Result<Step> {
        let pc = self.machine.program_counter;
        let opcode = self.machine.fetch()?;
        let instruction =
            Instruction::decode(Opcode(opcode)).ok_or(Error::IllegalOpcode { pc, opcode })?;

        log::trace!("{:#05x}: {:04X} {:?}", pc, opcode, instruction);

        self.execute_single(instruction)
    }

    fn resume_key_wait(&mut self, Reg(x): Reg) -> Step {
        match self.machine.keypad.take_new_press() {
            Some(key) => {
                log::debug!("Key {:X} pressed, resuming", key);
                self.machine.set_register(x, key);
                self.machine.program_counter = self.machine.program_counter.wrapping_add(2);
                self.state = State::Running;
                Step::Executed(Instruction::SetRegToGetKey(Reg(x)))
            }
            None => Step::AwaitingKey,
        }
    }

    /// Execute a single instruction at the current program counter.
    /// On error the program counter is left pointing at the faulting instruction.
    pub fn execute_single(&mut self, instruction: Instruction) -> Result<Step> {
        let pc = self.machine.program_counter;
        let skip = pc.wrapping_add(4);
        let mut next = pc.wrapping_add(2);
        let m = &mut self.machine;

        match instruction {
            // Clear the screen
            Instruction::ClearScreen => m.screen.clear(),

            // Return to the previous call site via the stack.
            Instruction::Return => next = m.pop()?,

            // A jump to itself never ends, so report it rather than spin.
            Instruction::Goto(Addr(addr)) if addr == pc => return Ok(Step::Halted),

            Instruction::Goto(Addr(addr)) => next = addr,

            // Store the return address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                m.push(next)?;
                next = addr;
            }

            Instruction::IfRegEqConst(Reg(x), Const(n)) => {
                if m.register(x) == n {
                    next = skip;
                }
            }

            Instruction::IfRegNeqConst(Reg(x), Const(n)) => {
                if m.register(x) != n {
                    next = skip;
                }
            }

            Instruction::IfRegEqReg(Reg(x), Reg(y)) => {
                if m.register(x) == m.register(y) {
                    next = skip;
                }
            }

            Instruction::SetRegToConst(Reg(x), Const(n)) => m.set_register(x, n),

            // Wraps, and leaves VF alone.
            Instruction::IncRegByConst(Reg(x), Const(n)) => {
                m.set_register(x, m.register(x).wrapping_add(n));
            }

            Instruction::SetRegToReg(Reg(x), Reg(y)) => m.set_register(x, m.register(y)),

            Instruction::BitwiseOr(Reg(x), Reg(y)) => {
                m.set_register(x, m.register(x) | m.register(y));
            }

            Instruction::BitwiseAnd(Reg(x), Reg(y)) => {
                m.set_register(x, m.register(x) & m.register(y));
            }

            Instruction::BitwiseXor(Reg(x), Reg(y)) => {
                m.set_register(x, m.register(x) ^ m.register(y));
            }

            // The flag is written last, so it wins when X is F.
            Instruction::IncRegByReg(Reg(x), Reg(y)) => {
                let (sum, carry) = m.register(x).overflowing_add(m.register(y));
                m.set_register(x, sum);
                m.set_flag(carry);
            }

            // VF is 1 when there is no borrow.
            Instruction::DecRegByReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (m.register(x), m.register(y));
                m.set_register(x, vx.wrapping_sub(vy));
                m.set_flag(vx >= vy);
            }

            Instruction::BitshiftRight(Reg(x)) => {
                let vx = m.register(x);
                m.set_register(x, vx >> 1);
                m.set_flag(vx & 1 == 1);
            }

            Instruction::SetVxVyMinusVx(Reg(x), Reg(y)) => {
                let (vx, vy) = (m.register(x), m.register(y));
                m.set_register(x, vy.wrapping_sub(vx));
                m.set_flag(vy >= vx);
            }

            Instruction::BitshiftLeft(Reg(x)) => {
                let vx = m.register(x);
                m.set_register(x, vx << 1);
                m.set_flag(vx >> 7 == 1);
            }

            Instruction::IfRegNeqReg(Reg(x), Reg(y)) => {
                if m.register(x) != m.register(y) {
                    next = skip;
                }
            }

            Instruction::SetI(Addr(addr)) => m.i = addr,

            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                next = addr.wrapping_add(m.register(0) as u16);
            }

            Instruction::SetVxRand(Reg(x), Const(n)) => {
                let byte: u8 = self.rng.gen();
                m.set_register(x, byte & n);
            }

            Instruction::Draw(Reg(x), Reg(y), Const(sprite_height)) => {
                // Get coordinates
                let x_coord = m.register(x) as usize;
                let y_coord = m.register(y) as usize;

                // Get sprite, each row is 8 bits
                let height = (sprite_height & 0xF) as usize;
                let mut sprite = [0u8; 15];
                sprite[..height].copy_from_slice(m.read_slice(m.i as usize, height)?);

                let mut any_collisions = false;
                for (row_offset, row) in sprite[..height].iter().enumerate() {
                    any_collisions |= m.screen.draw_row(x_coord, y_coord + row_offset, *row);
                }

                // Set VF collision flag
                m.set_flag(any_collisions);
            }

            Instruction::IfKeyEqVx(Reg(x)) => {
                if m.keypad.is_pressed(m.register(x)) {
                    next = skip;
                }
            }

            Instruction::IfKeyNeqVx(Reg(x)) => {
                if !m.keypad.is_pressed(m.register(x)) {
                    next = skip;
                }
            }

            Instruction::SetRegToDelayTimer(Reg(x)) => m.set_register(x, m.delay_timer),

            // Park until a key goes down. Presses from before the wait do not count.
            Instruction::SetRegToGetKey(reg) => {
                log::debug!("Waiting for key press at {:#05x}", pc);
                m.keypad.clear_edges();
                self.state = State::AwaitingKey(reg);
                return Ok(Step::AwaitingKey);
            }

            Instruction::SetDelayTimerToReg(Reg(x)) => m.delay_timer = m.register(x),

            Instruction::SetSoundTimerToReg(Reg(x)) => m.sound_timer = m.register(x),

            Instruction::AddRegToI(Reg(x)) => {
                let sum = m.i as u32 + m.register(x) as u32;
                m.i = sum as u16;
                if self.quirks.index_overflow_flag {
                    m.set_flag(sum > 0x0FFF);
                }
            }

            // Set i to character address. Each font element is 5 bytes wide.
            Instruction::SetIToSpriteAddrVx(Reg(x)) => m.i = Machine::font_address(m.register(x)),

            Instruction::SetIToBcdOfReg(Reg(x)) => {
                let value = m.register(x);
                let digits = [value / 100, value / 10 % 10, value % 10];
                m.write_slice(m.i as usize, &digits)?;
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                let registers = m.registers;
                m.write_slice(m.i as usize, &registers[..=(x & 0xF) as usize])?;
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                let count = (x & 0xF) as usize + 1;
                let mut values = [0u8; 16];
                values[..count].copy_from_slice(m.read_slice(m.i as usize, count)?);
                m.registers[..count].copy_from_slice(&values[..count]);
            }
        };

        self.machine.program_counter = next;
        Ok(Step::Executed(instruction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::input::ScriptedInput;
    use crate::emulator::keypad::NUM_KEYS;
    use crate::emulator::machine::{FONT_START, STACK_SIZE};
    use proptest::prelude::*;
    use test_case::test_case;

    fn emulator() -> Emulator<DummyInput, DummyOutput> {
        Emulator::new().with_seed(0)
    }

    fn with_registers(values: &[(u8, u8)]) -> Emulator<DummyInput, DummyOutput> {
        let mut emulator = emulator();
        for (reg, value) in values {
            emulator.machine.set_register(*reg, *value);
        }
        emulator
    }

    fn run(emulator: &mut Emulator<DummyInput, DummyOutput>, instruction: Instruction) {
        emulator.execute_single(instruction).unwrap();
    }

    fn keys(pressed: &[u8]) -> [bool; NUM_KEYS] {
        let mut keys = [false; NUM_KEYS];
        for key in pressed {
            keys[*key as usize] = true;
        }
        keys
    }

    #[test]
    fn goto_goes_to() {
        let mut emulator = emulator();
        run(&mut emulator, Instruction::Goto(Addr(0x250)));
        assert_eq!(emulator.machine.program_counter, 0x250);
    }

    #[test]
    fn goto_self_halts() {
        let mut emulator = emulator();
        emulator.load(&[0x12, 0x00]).unwrap();
        assert_eq!(emulator.step().unwrap(), Step::Halted);
        assert_eq!(emulator.machine.program_counter, 0x200);
    }

    #[test]
    fn return_after_call_is_neutral() {
        // Create emulator
        let mut emulator = emulator();
        assert_eq!(emulator.machine.program_counter, 0x200);

        // Write program with call and return
        let program = [
            0x22, 0x06, // 0x00, call 0x206
            0x00, 0x00, // 0x02
            0x00, 0x00, // 0x04
            0x00, 0xEE, // 0x06, return
        ];
        emulator.load(&program).unwrap();

        // Run the program
        emulator.step().unwrap(); // Call 0x206
        assert_eq!(emulator.machine.program_counter, 0x206);
        assert_eq!(emulator.machine.stack_pointer(), 1);
        emulator.step().unwrap(); // Return to 202
        assert_eq!(emulator.machine.program_counter, 0x202);
        assert_eq!(emulator.machine.stack_pointer(), 0);
    }

    #[test]
    fn seventeenth_nested_call_overflows() {
        let mut emulator = emulator();
        for _ in 0..STACK_SIZE {
            emulator.execute_single(Instruction::Call(Addr(0x300))).unwrap();
        }
        let error = emulator.execute_single(Instruction::Call(Addr(0x300))).unwrap_err();
        assert!(matches!(error, Error::StackOverflow { pc: 0x300 }));
        assert_eq!(emulator.machine.program_counter, 0x300);
    }

    #[test]
    fn return_with_empty_stack_underflows() {
        let mut emulator = emulator();
        emulator.load(&[0x00, 0xEE]).unwrap();
        assert!(matches!(emulator.step(), Err(Error::StackUnderflow { pc: 0x200 })));
        assert_eq!(emulator.machine.program_counter, 0x200);
    }

    #[test]
    fn illegal_opcode_reports_pc_and_opcode() {
        let mut emulator = emulator();
        emulator.load(&[0x60, 0x01, 0xFF, 0xFF]).unwrap();
        emulator.step().unwrap();
        let error = emulator.step().unwrap_err();
        assert!(matches!(error, Error::IllegalOpcode { pc: 0x202, opcode: 0xFFFF }));
    }

    #[test]
    fn fetch_past_end_of_memory_faults() {
        let mut emulator = emulator();
        emulator.machine.program_counter = 0xFFF;
        assert!(matches!(
            emulator.step(),
            Err(Error::MemoryAccessFault { pc: 0xFFF, address: 0x1000 })
        ));
    }

    #[test]
    fn clear_screen_clears_screen() {
        let mut emulator = emulator();
        emulator.machine.screen.draw_row(3, 4, 0xFF);
        run(&mut emulator, Instruction::ClearScreen);
        assert!(emulator.machine.screen.is_blank());
        assert_eq!(emulator.machine.program_counter, 0x202);
    }

    #[test_case(Instruction::IfRegEqConst(Reg(1), Const(7)), 0x204 ; "eq const taken")]
    #[test_case(Instruction::IfRegEqConst(Reg(1), Const(8)), 0x202 ; "eq const not taken")]
    #[test_case(Instruction::IfRegNeqConst(Reg(1), Const(8)), 0x204 ; "neq const taken")]
    #[test_case(Instruction::IfRegNeqConst(Reg(1), Const(7)), 0x202 ; "neq const not taken")]
    #[test_case(Instruction::IfRegEqReg(Reg(1), Reg(2)), 0x204 ; "eq reg taken")]
    #[test_case(Instruction::IfRegEqReg(Reg(1), Reg(3)), 0x202 ; "eq reg not taken")]
    #[test_case(Instruction::IfRegNeqReg(Reg(1), Reg(3)), 0x204 ; "neq reg taken")]
    #[test_case(Instruction::IfRegNeqReg(Reg(1), Reg(2)), 0x202 ; "neq reg not taken")]
    fn skips(instruction: Instruction, expected_pc: u16) {
        let mut emulator = with_registers(&[(1, 7), (2, 7), (3, 9)]);
        run(&mut emulator, instruction);
        assert_eq!(emulator.machine.program_counter, expected_pc);
    }

    #[test_case(Instruction::SetRegToConst(Reg(4), Const(0x42)) => 0x42 ; "set const")]
    #[test_case(Instruction::IncRegByConst(Reg(4), Const(0x02)) => 0xF2 ; "add const")]
    #[test_case(Instruction::IncRegByConst(Reg(4), Const(0x20)) => 0x10 ; "add const wraps")]
    #[test_case(Instruction::SetRegToReg(Reg(4), Reg(5)) => 0x0F ; "set reg")]
    #[test_case(Instruction::BitwiseOr(Reg(4), Reg(5)) => 0xFF ; "or")]
    #[test_case(Instruction::BitwiseAnd(Reg(4), Reg(5)) => 0x00 ; "and")]
    #[test_case(Instruction::BitwiseXor(Reg(4), Reg(5)) => 0xFF ; "xor")]
    fn register_operations(instruction: Instruction) -> u8 {
        let mut emulator = with_registers(&[(4, 0xF0), (5, 0x0F), (0xF, 0xAA)]);
        run(&mut emulator, instruction);
        assert_eq!(emulator.machine.register(0xF), 0xAA, "VF must be untouched");
        emulator.machine.register(4)
    }

    #[test_case(0xFF, 0x01, Instruction::IncRegByReg(Reg(0xF), Reg(1)) => 1 ; "add carry")]
    #[test_case(0x05, 0x03, Instruction::DecRegByReg(Reg(0xF), Reg(1)) => 1 ; "sub no borrow")]
    #[test_case(0x03, 0x05, Instruction::DecRegByReg(Reg(0xF), Reg(1)) => 0 ; "sub borrow")]
    #[test_case(0x80, 0x00, Instruction::BitshiftRight(Reg(0xF)) => 0 ; "right shift")]
    #[test_case(0x03, 0x05, Instruction::SetVxVyMinusVx(Reg(0xF), Reg(1)) => 1 ; "reverse sub no borrow")]
    #[test_case(0x05, 0x03, Instruction::SetVxVyMinusVx(Reg(0xF), Reg(1)) => 0 ; "reverse sub borrow")]
    #[test_case(0x81, 0x00, Instruction::BitshiftLeft(Reg(0xF)) => 1 ; "left shift")]
    fn flag_wins_when_target_is_vf(vf: u8, v1: u8, instruction: Instruction) -> u8 {
        let mut emulator = with_registers(&[(0xF, vf), (1, v1)]);
        run(&mut emulator, instruction);
        emulator.machine.register(0xF)
    }

    #[test_case(0b1000_0001, Instruction::BitshiftRight(Reg(2)) => (0b0100_0000, 1) ; "right shift out one")]
    #[test_case(0b1000_0000, Instruction::BitshiftRight(Reg(2)) => (0b0100_0000, 0) ; "right shift out zero")]
    #[test_case(0b1000_0001, Instruction::BitshiftLeft(Reg(2)) => (0b0000_0010, 1) ; "left shift out one")]
    #[test_case(0b0100_0001, Instruction::BitshiftLeft(Reg(2)) => (0b1000_0010, 0) ; "left shift out zero")]
    fn shifts(value: u8, instruction: Instruction) -> (u8, u8) {
        let mut emulator = with_registers(&[(2, value), (3, 0xFF)]);
        run(&mut emulator, instruction);
        (emulator.machine.register(2), emulator.machine.register(0xF))
    }

    #[test]
    fn set_i_and_jump_with_offset() {
        let mut emulator = with_registers(&[(0, 0x10)]);
        run(&mut emulator, Instruction::SetI(Addr(0x345)));
        assert_eq!(emulator.machine.i, 0x345);
        run(&mut emulator, Instruction::SetPcToV0PlusAddr(Addr(0x300)));
        assert_eq!(emulator.machine.program_counter, 0x310);
    }

    #[test]
    fn random_is_masked_and_reproducible() {
        let mut first = emulator().with_seed(42);
        let mut second = emulator().with_seed(42);
        for _ in 0..20 {
            run(&mut first, Instruction::SetVxRand(Reg(3), Const(0x0F)));
            run(&mut second, Instruction::SetVxRand(Reg(3), Const(0x0F)));
            assert!(first.machine.register(3) <= 0x0F);
            assert_eq!(first.machine.register(3), second.machine.register(3));
        }
        run(&mut first, Instruction::SetVxRand(Reg(3), Const(0)));
        assert_eq!(first.machine.register(3), 0);
    }

    #[test]
    fn draw_font_glyph() {
        let mut emulator = with_registers(&[(0, 0xA), (1, 2), (2, 3)]);
        run(&mut emulator, Instruction::SetIToSpriteAddrVx(Reg(0)));
        assert_eq!(emulator.machine.i, FONT_START + 50);
        run(&mut emulator, Instruction::Draw(Reg(1), Reg(2), Const(5)));

        // The glyph for A is F0 90 F0 90 90.
        let row = |y: usize| -> Vec<u8> { (2..6).map(|x| emulator.machine.screen.get(x, y)).collect() };
        assert_eq!(row(3), vec![1, 1, 1, 1]);
        assert_eq!(row(4), vec![1, 0, 0, 1]);
        assert_eq!(row(5), vec![1, 1, 1, 1]);
        assert_eq!(row(7), vec![1, 0, 0, 1]);
        assert_eq!(emulator.machine.register(0xF), 0);
    }

    #[test]
    fn drawing_twice_erases_and_reports_collision() {
        let mut emulator = with_registers(&[(1, 20), (2, 10)]);
        emulator.machine.write_slice(0x300, &[0xFF, 0x81, 0xFF]).unwrap();
        run(&mut emulator, Instruction::SetI(Addr(0x300)));

        run(&mut emulator, Instruction::Draw(Reg(1), Reg(2), Const(3)));
        assert_eq!(emulator.machine.register(0xF), 0);
        assert!(!emulator.machine.screen.is_blank());

        run(&mut emulator, Instruction::Draw(Reg(1), Reg(2), Const(3)));
        assert_eq!(emulator.machine.register(0xF), 1);
        assert!(emulator.machine.screen.is_blank());
    }

    #[test]
    fn draw_wraps_around_the_screen() {
        let mut emulator = with_registers(&[(1, 62), (2, 31)]);
        emulator.machine.write_slice(0x300, &[0xC0, 0xC0]).unwrap();
        run(&mut emulator, Instruction::SetI(Addr(0x300)));
        run(&mut emulator, Instruction::Draw(Reg(1), Reg(2), Const(2)));
        let screen = &emulator.machine.screen;
        assert_eq!((screen.get(62, 31), screen.get(63, 31)), (1, 1));
        assert_eq!((screen.get(62, 0), screen.get(63, 0)), (1, 1));
    }

    #[test]
    fn draw_reading_past_memory_faults() {
        let mut emulator = emulator();
        run(&mut emulator, Instruction::SetI(Addr(0xFFE)));
        let error = emulator.execute_single(Instruction::Draw(Reg(0), Reg(0), Const(3))).unwrap_err();
        assert!(matches!(error, Error::MemoryAccessFault { address: 0x1000, .. }));
    }

    #[test]
    fn key_skips_follow_keypad() {
        let mut emulator = with_registers(&[(0, 0xB)]);
        run(&mut emulator, Instruction::IfKeyEqVx(Reg(0)));
        assert_eq!(emulator.machine.program_counter, 0x202);
        run(&mut emulator, Instruction::IfKeyNeqVx(Reg(0)));
        assert_eq!(emulator.machine.program_counter, 0x206);

        emulator.machine.keypad.set(0xB, true);
        run(&mut emulator, Instruction::IfKeyEqVx(Reg(0)));
        assert_eq!(emulator.machine.program_counter, 0x20A);
        run(&mut emulator, Instruction::IfKeyNeqVx(Reg(0)));
        assert_eq!(emulator.machine.program_counter, 0x20C);
    }

    #[test]
    fn wait_for_key_parks_until_new_press() {
        // 7 is held before the wait starts, 5 is pressed during it.
        let frames = vec![keys(&[7]), keys(&[7]), keys(&[7]), keys(&[7, 5])];
        let mut emulator = Emulator::with_io(ScriptedInput::new(frames), DummyOutput::new());
        emulator.load(&[0xF3, 0x0A, 0x61, 0x01]).unwrap();

        assert_eq!(emulator.step().unwrap(), Step::AwaitingKey);
        assert!(emulator.is_awaiting_key());
        assert_eq!(emulator.step().unwrap(), Step::AwaitingKey);
        assert_eq!(emulator.step().unwrap(), Step::AwaitingKey);
        assert_eq!(emulator.machine().program_counter, 0x200);

        assert_eq!(
            emulator.step().unwrap(),
            Step::Executed(Instruction::SetRegToGetKey(Reg(3)))
        );
        assert_eq!(emulator.machine().register(3), 5);
        assert_eq!(emulator.machine().program_counter, 0x202);
        assert!(!emulator.is_awaiting_key());

        emulator.step().unwrap();
        assert_eq!(emulator.machine().register(1), 1);
    }

    #[test]
    fn timers_keep_running_while_waiting_for_key() {
        let mut emulator = emulator();
        emulator.load(&[0xF0, 0x0A]).unwrap();
        emulator.machine.delay_timer = 3;
        emulator.machine.sound_timer = 2;
        emulator.step().unwrap();
        emulator.tick_timers();
        assert!(emulator.output().tone());
        emulator.tick_timers();
        assert!(!emulator.output().tone());
        assert_eq!(emulator.machine.delay_timer, 1);
        assert_eq!(emulator.step().unwrap(), Step::AwaitingKey);
    }

    #[test]
    fn timer_registers() {
        let mut emulator = with_registers(&[(2, 30), (3, 4)]);
        run(&mut emulator, Instruction::SetDelayTimerToReg(Reg(2)));
        run(&mut emulator, Instruction::SetSoundTimerToReg(Reg(3)));
        assert_eq!((emulator.machine.delay_timer, emulator.machine.sound_timer), (30, 4));
        emulator.tick_timers();
        run(&mut emulator, Instruction::SetRegToDelayTimer(Reg(5)));
        assert_eq!(emulator.machine.register(5), 29);
    }

    #[test_case(false, 0x0FFF, 0x01 => (0x1000, 0xAA) ; "flag quirk off")]
    #[test_case(true, 0x0FFF, 0x01 => (0x1000, 1) ; "flag quirk on overflow")]
    #[test_case(true, 0x0FF0, 0x01 => (0x0FF1, 0) ; "flag quirk on no overflow")]
    #[test_case(false, 0xFFFF, 0x02 => (0x0001, 0xAA) ; "wraps at 16 bits")]
    fn add_to_index(index_overflow_flag: bool, i: u16, vx: u8) -> (u16, u8) {
        let mut emulator = with_registers(&[(1, vx), (0xF, 0xAA)])
            .with_quirks(Quirks { index_overflow_flag });
        emulator.machine.i = i;
        run(&mut emulator, Instruction::AddRegToI(Reg(1)));
        (emulator.machine.i, emulator.machine.register(0xF))
    }

    #[test_case(255 => vec![2, 5, 5] ; "max")]
    #[test_case(0 => vec![0, 0, 0] ; "zero")]
    #[test_case(107 => vec![1, 0, 7] ; "middle zero")]
    #[test_case(42 => vec![0, 4, 2] ; "two digits")]
    fn bcd(value: u8) -> Vec<u8> {
        let mut emulator = with_registers(&[(6, value)]);
        run(&mut emulator, Instruction::SetI(Addr(0x400)));
        run(&mut emulator, Instruction::SetIToBcdOfReg(Reg(6)));
        emulator.machine.read_slice(0x400, 3).unwrap().to_vec()
    }

    #[test]
    fn dump_and_load_registers_inclusive() {
        let mut emulator = with_registers(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        run(&mut emulator, Instruction::SetI(Addr(0x500)));
        run(&mut emulator, Instruction::RegDump(Reg(2)));
        assert_eq!(emulator.machine.read_slice(0x500, 4).unwrap(), &[1, 2, 3, 0][..]);
        assert_eq!(emulator.machine.i, 0x500);

        emulator.machine.registers = [0; 16];
        run(&mut emulator, Instruction::RegLoad(Reg(2)));
        assert_eq!(&emulator.machine.registers[..4], &[1, 2, 3, 0][..]);
    }

    #[test]
    fn load_rejects_oversized_rom() {
        let mut emulator = emulator();
        assert!(emulator.load(&[0; 4096 - 0x200]).is_ok());
        assert!(matches!(
            emulator.load(&[0; 4096 - 0x200 + 1]),
            Err(Error::RomTooLarge { size: 3585, max_size: 3584 })
        ));
    }

    #[test]
    fn run_due_ticks_timers_and_presents() {
        let mut emulator = emulator();
        emulator.load(&[0x70, 0x01, 0x70, 0x01, 0x12, 0x04]).unwrap();
        emulator.machine.delay_timer = 5;
        let halted = emulator.run_due(Due { cycles: 10, timer_ticks: 2 }).unwrap();
        assert!(halted);
        assert_eq!(emulator.machine.register(0), 2);
        assert_eq!(emulator.machine.delay_timer, 3);
        assert_eq!(emulator.output().frames_presented(), 1);
    }

    proptest! {
        #[test]
        fn add_sets_carry(vx in any::<u8>(), vy in any::<u8>()) {
            let mut emulator = with_registers(&[(1, vx), (2, vy)]);
            run(&mut emulator, Instruction::IncRegByReg(Reg(1), Reg(2)));
            prop_assert_eq!(emulator.machine.register(1), ((vx as u16 + vy as u16) % 256) as u8);
            prop_assert_eq!(emulator.machine.register(0xF), (vx as u16 + vy as u16 > 255) as u8);
        }

        #[test]
        fn sub_sets_no_borrow(vx in any::<u8>(), vy in any::<u8>()) {
            let mut emulator = with_registers(&[(1, vx), (2, vy)]);
            run(&mut emulator, Instruction::DecRegByReg(Reg(1), Reg(2)));
            prop_assert_eq!(emulator.machine.register(1), vx.wrapping_sub(vy));
            prop_assert_eq!(emulator.machine.register(0xF), (vx >= vy) as u8);
        }

        #[test]
        fn reverse_sub_sets_no_borrow(vx in any::<u8>(), vy in any::<u8>()) {
            let mut emulator = with_registers(&[(1, vx), (2, vy)]);
            run(&mut emulator, Instruction::SetVxVyMinusVx(Reg(1), Reg(2)));
            prop_assert_eq!(emulator.machine.register(1), vy.wrapping_sub(vx));
            prop_assert_eq!(emulator.machine.register(0xF), (vy >= vx) as u8);
        }

        #[test]
        fn bcd_digits_recombine(value in any::<u8>()) {
            let mut emulator = with_registers(&[(0, value)]);
            run(&mut emulator, Instruction::SetI(Addr(0x600)));
            run(&mut emulator, Instruction::SetIToBcdOfReg(Reg(0)));
            let digits = emulator.machine.read_slice(0x600, 3).unwrap();
            prop_assert!(digits.iter().all(|d| *d < 10));
            prop_assert_eq!(digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16, value as u16);
        }
    }
}

/*!

A CHIP-8 virtual machine as specified at https://en.wikipedia.org/wiki/CHIP-8.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <program>`.
Keys map to the hexadecimal keypad in the usual layout (`1234`, `qwer`, `asdf`, `zxcv`),
and `Esc` quits.

For a headless run, `cargo run --release --bin chip8 -- <program>` executes a program
until it halts or faults, which is handy together with `RUST_LOG=trace`.

# Library

If you are not interested in handling input (key presses and such),
then you can use `Emulator::new()` to get an emulator to work with.

The main way of running a program is to load instructions as bytes.

```rust
use chip8_vm::emulator::Emulator;

let mut emulator = Emulator::new();

// Load a program at address 0x200.
let program = [0x60, 0x05, 0x70, 0x03]; // V0 = 5, V0 += 3
emulator.load(&program)?;
emulator.step()?;
emulator.step()?;

assert_eq!(emulator.machine().register(0), 8);
assert_eq!(emulator.machine().program_counter, 0x204);
# Ok::<(), chip8_vm::Error>(())
```

Alternatively, you can experiment by executing instructions manually.

```rust
use chip8_vm::emulator::Emulator;
use chip8_vm::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new();

// Execute instructions manually
emulator.execute_single(Instruction::ClearScreen)?;

// Or many sequentially
emulator.execute_many(&[
    Instruction::Goto(Addr(0x250)),
    Instruction::SetRegToConst(Reg(0xA), Const(35)),
    Instruction::SetRegToReg(Reg(0xB), Reg(0xA))
])?;
assert_eq!(emulator.machine().register(0xB), 35);
# Ok::<(), chip8_vm::Error>(())
```

## Timing

Instructions and timers run on separate clocks. A `Scheduler` turns elapsed time into
a number of instruction cycles and 60 Hz timer ticks, which `Emulator::run_due` performs.

```rust
use std::time::Duration;
use chip8_vm::emulator::Emulator;
use chip8_vm::emulator::scheduler::Scheduler;

let mut emulator = Emulator::new();
emulator.load(&[0x12, 0x00])?; // Jump to self, i.e. halt
let mut scheduler = Scheduler::new(700);
let halted = emulator.run_due(scheduler.advance(Duration::from_millis(20)))?;
assert!(halted);
# Ok::<(), chip8_vm::Error>(())
```

## Custom input and output

To get keypresses, you must implement `EmulatorInput` and `EmulatorOutput`,
which represent somewhere to get keyboard input from and a screen with a speaker respectively.
Take a look at `src/emulator/input.rs` and `src/emulator/output.rs` to see how to implement this, then do the following.

```ignore
use chip8_vm::emulator::Emulator;

let mut emulator = Emulator::with_io(MyInput::new(), MyOutput::new());
```

You can then implement the emulator using your own custom frontend, as done with crossterm in crossterm_frontend.
*/

pub mod emulator;
pub mod error;
pub mod rom;

pub use error::{Error, Result};

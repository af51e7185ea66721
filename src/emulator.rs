//! The CHIP-8 virtual machine and the collaborators it talks to.

pub mod emulator;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod keypad;
pub mod machine;
pub mod opcode;
pub mod output;
pub mod scheduler;

pub use emulator::{Emulator, Quirks, Step};

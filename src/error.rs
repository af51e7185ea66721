//! Everything that can stop a CHIP-8 run.
//!
//! There is no recoverable error path: a CHIP-8 program is trusted bytecode,
//! so each of these is a fault in the ROM or in how the host was started.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The fetched word matches no instruction.
    #[error("illegal opcode {opcode:#06x} at {pc:#05x}")]
    IllegalOpcode { pc: u16, opcode: u16 },

    /// A call was made with all 16 stack slots in use.
    #[error("stack overflow at {pc:#05x}")]
    StackOverflow { pc: u16 },

    /// A return was made with an empty stack.
    #[error("stack underflow at {pc:#05x}")]
    StackUnderflow { pc: u16 },

    /// The program touched memory outside 0x000..=0xFFF.
    #[error("memory access fault at {address:#06x} (pc {pc:#05x})")]
    MemoryAccessFault { pc: u16, address: usize },

    #[error("rom is {size} bytes, but at most {max_size} bytes fit in memory")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("rom not found: {}", path.display())]
    RomNotFound { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

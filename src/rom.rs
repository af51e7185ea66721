//! Reading programs from disk.

use crate::emulator::machine::{MEM_SIZE, PC_START};
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;

/// The largest program that fits between 0x200 and the end of memory.
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PC_START as usize;

/// Read a ROM file, checking that it fits in memory.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => Error::RomNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(error),
    })?;

    if bytes.len() > MAX_ROM_SIZE {
        return Err(Error::RomTooLarge {
            size: bytes.len(),
            max_size: MAX_ROM_SIZE,
        });
    }

    log::info!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(bytes)
}

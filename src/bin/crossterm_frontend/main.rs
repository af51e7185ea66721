use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use structopt::StructOpt;

use chip8_vm::emulator::scheduler::Scheduler;
use chip8_vm::emulator::{Emulator, Quirks};
use chip8_vm::rom;

mod crossterm_io;
mod key_manager;
mod key_state;
use crossterm_io::{CrosstermInput, CrosstermOutput};
use key_manager::KeyManager;

/// The program options.
#[derive(StructOpt)]
struct Opt {
    /// Instructions executed per second
    #[structopt(long, default_value = "700")]
    ips: u32,

    /// Let FX1E set VF when I goes past 0x0FFF
    #[structopt(long)]
    index_overflow_flag: bool,

    /// Seed for CXKK, for reproducible runs
    #[structopt(long)]
    seed: Option<u64>,

    /// The program to execute
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    log::info!("Executing {:?}", &opt.rom);
    let program = rom::read(&opt.rom)?;

    let key_manager = KeyManager::new();

    // Load instructions into emulator memory
    let mut emulator = Emulator::with_io(CrosstermInput::new(key_manager.keys()), CrosstermOutput::new()?)
        .with_quirks(Quirks {
            index_overflow_flag: opt.index_overflow_flag,
        });
    if let Some(seed) = opt.seed {
        emulator = emulator.with_seed(seed);
    }
    emulator.load(&program)?;

    // Start execution. A halted program stays on screen until Esc.
    let mut scheduler = Scheduler::new(opt.ips);
    let mut last = Instant::now();
    let result = loop {
        if key_manager.quit_requested() {
            break Ok(());
        }
        thread::sleep(scheduler.until_next());
        let now = Instant::now();
        let due = scheduler.advance(now - last);
        last = now;
        if let Err(error) = emulator.run_due(due) {
            break Err(error);
        }
    };

    // Restore the terminal before reporting anything
    drop(emulator);
    result?;
    Ok(())
}

use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use log::LevelFilter;
use structopt::StructOpt;

use chip8_vm::emulator::scheduler::Scheduler;
use chip8_vm::emulator::{Emulator, Quirks};
use chip8_vm::rom;

/// Run a CHIP-8 program without a screen.
#[derive(StructOpt, Debug)]
#[structopt(name = "chip8")]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Instructions executed per second
    #[structopt(long, default_value = "700")]
    ips: u32,

    /// Let FX1E set VF when I goes past 0x0FFF
    #[structopt(long)]
    index_overflow_flag: bool,

    /// Seed for CXKK, for reproducible runs
    #[structopt(long)]
    seed: Option<u64>,

    /// Stop after this many instructions
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Print the screen to stdout when the program stops
    #[structopt(long)]
    print_screen: bool,

    /// The program to execute
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.init();
}

fn run(opt: &Opt) -> chip8_vm::Result<()> {
    let program = rom::read(&opt.rom)?;

    let mut emulator = Emulator::new().with_quirks(Quirks {
        index_overflow_flag: opt.index_overflow_flag,
    });
    if let Some(seed) = opt.seed {
        emulator = emulator.with_seed(seed);
    }
    emulator.load(&program)?;

    let mut scheduler = Scheduler::new(opt.ips);
    let mut executed: u64 = 0;
    let mut last = Instant::now();
    loop {
        thread::sleep(scheduler.until_next());
        let now = Instant::now();
        let mut due = scheduler.advance(now - last);
        last = now;

        if let Some(max_cycles) = opt.max_cycles {
            let remaining = max_cycles.saturating_sub(executed);
            due.cycles = due.cycles.min(remaining.min(u32::MAX as u64) as u32);
        }

        if emulator.run_due(due)? {
            log::info!("Program halted at {:#05x}", emulator.machine().program_counter);
            break;
        }

        executed += due.cycles as u64;
        if opt.max_cycles.map_or(false, |max_cycles| executed >= max_cycles) {
            log::info!("Stopped after {} instructions", executed);
            break;
        }
    }

    if opt.print_screen {
        print!("{}", emulator.machine().screen);
    }
    Ok(())
}

fn main() {
    // Get configuration
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    log::info!("Executing {:?}", &opt.rom);

    if let Err(error) = run(&opt) {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

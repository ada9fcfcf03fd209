use anyhow::{Context, Result};
use clap::Parser;
use color_print::cprintln;
use log::LevelFilter;
use std::process::ExitCode;
use tvm_arch::image::Image;
use tvm_arch::reg::Reg;
use tvm_emu::hooks::{dump::Dump, trace::Trace, Hook};
use tvm_emu::{Error, Machine, DEFAULT_BUDGET};

#[derive(Parser, Debug)]
#[clap(name = "TVM Emulator", version, about = "Interpreter for TVM images")]
struct Args {
    /// Maximum number of instructions to execute
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// YAML file selecting the addresses to dump state at
    #[arg(short, long)]
    dump_cfg: Option<String>,

    /// Dump registers after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Write the final machine state as a snapshot image
    #[arg(short, long)]
    save: Option<String>,

    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(default_value = "main.tvm")]
    input_file: String,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        3.. => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(log_level)
        .without_timestamps()
        .init()?;

    println!("TVM Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Load image
    let bin = std::fs::read(&args.input_file)
        .with_context(|| format!("Failed to open file: {}", args.input_file))?;
    let image = Image::from_bytes(&bin)
        .with_context(|| format!("Invalid image: {}", args.input_file))?;
    let mut machine = Machine::from_image(&image);

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let mut hooks: Vec<Box<dyn Hook>> = vec![
        Box::new(Dump::arg(args.dump_cfg, args.dump_all)?),
        Box::new(Trace),
    ];

    // ------------------------------------------------------------------------
    // Main loop
    let budget = args.tmax.unwrap_or(DEFAULT_BUDGET);
    let result = machine.run_with(budget, &mut hooks);

    println!("=================================================");
    let status = match &result {
        Ok(code) => {
            cprintln!("<green,bold>halt</>: exit code {}", code);
            ExitCode::SUCCESS
        }
        Err(err @ Error::Runaway(_)) => {
            cprintln!("<yellow,bold>runaway</>: {}", err);
            ExitCode::from(2)
        }
        Err(err) => {
            cprintln!("<red,bold>fault</>: {}", err);
            ExitCode::FAILURE
        }
    };
    println!(
        " R0: {:0>2X} | R1: {:0>2X} | SP: {:0>2X} | PC: {:0>2X} | FLAG: {:0>2X}",
        machine.get(Reg::R0),
        machine.get(Reg::R1),
        machine.get(Reg::SP),
        machine.get(Reg::PC),
        machine.flag(),
    );

    if let Some(path) = &args.save {
        let snapshot = Image::Stateful(machine.snapshot());
        std::fs::write(path, snapshot.to_bytes())
            .with_context(|| format!("Failed to write file: {}", path))?;
        println!("  > {}", path);
    }

    Ok(status)
}

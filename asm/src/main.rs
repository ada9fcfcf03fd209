use anyhow::{Context, Result};
use color_print::cprintln;
use log::{info, LevelFilter};
use std::process::ExitCode;
use tvm_asm::{util, Assembler};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.asm")]
    input: String,

    /// Output image file
    #[clap(short, long, default_value = "main.tvm")]
    output: String,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    use clap::Parser;

    let args: Args = Args::parse();
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

    println!("TVM Assembler");

    println!("1. Read Source");
    println!("  < {}", args.input);
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to open file: {}", args.input))?;

    println!("2. Parse & Generate Binary");
    let assembler = Assembler::new()?;
    let program = match assembler.assemble_str(&args.input, &source) {
        Ok(program) => program,
        Err(err) => {
            err.print_diag(&args.input, &source);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(
        "{} data labels, {} text labels, {} text bytes",
        program.data_labels.len(),
        program.text_labels.len(),
        program.text_len
    );

    println!("  > {}", args.output);
    std::fs::write(&args.output, program.image().to_bytes())
        .with_context(|| format!("Failed to write file: {}", args.output))?;

    if args.dump {
        util::print_dump(&program);
    }

    cprintln!("<green,bold>done</>");
    Ok(ExitCode::SUCCESS)
}

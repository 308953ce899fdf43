//! quack3200 CLI - assemble a Quack3200 source file, list it, and run it.

use clap::Parser as ClapParser;
use quack3200::listing::{ErrorCount, ErrorListing, SymbolListing, TranslationListing};
use quack3200::{Console, Outcome, RunOptions, assemble_file, execute};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "quack3200")]
#[command(author = "nand2tetris")]
#[command(version = "1.0.0")]
#[command(about = "Two-pass assembler and emulator for the Quack3200 machine")]
struct Args {
    /// Assembly source file
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Log every classified line, symbol and branch to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the symbol table and translation listings
    #[arg(short, long)]
    quiet: bool,

    /// Assemble and list only
    #[arg(long)]
    no_run: bool,

    /// Stop the emulator after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `Ok(false)` when any assembly or run-time error was recorded.
fn run(args: &Args) -> quack3200::Result<bool> {
    let assembly = assemble_file(&args.source)?;

    if !args.quiet {
        println!("{}", SymbolListing(&assembly.symbols));
        println!();
        println!("{}", TranslationListing(&assembly.translation));
    }

    if !assembly.is_ok() {
        println!("{}", ErrorCount(&assembly.errors));
        print!("{}", ErrorListing(&assembly.errors));
        return Ok(false);
    }
    if args.no_run {
        return Ok(true);
    }

    println!("RESULTS FROM EMULATING PROGRAM:");
    println!();

    let options = RunOptions {
        max_steps: args.max_steps,
    };
    let mut console = Console::stdio();
    let Some(execution) = execute(&assembly, &mut console, &options)? else {
        return Ok(false);
    };

    match execution.outcome {
        Outcome::Halted => {
            println!();
            println!("END OF EMULATION");
            Ok(true)
        }
        Outcome::RuntimeError => {
            println!();
            print!("RUN-TIME {}", ErrorListing(&execution.errors));
            Ok(false)
        }
        Outcome::RanOffEnd => {
            eprintln!("Error: execution ran past location 99999 without HALT");
            Ok(false)
        }
        Outcome::StepLimit => {
            eprintln!(
                "Error: stopped after {} instructions without HALT",
                execution.emulator.steps()
            );
            Ok(false)
        }
    }
}

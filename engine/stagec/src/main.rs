//! Stage CLI
//!
//! Loads a persisted project, migrates it, and runs it for a number of ticks.

mod commands;

use commands::{migrate_file, parse_run_options, run_file};

fn main() {
    commands::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "run" => {
            let options = match parse_run_options(&args[2..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("error: {message}");
                    eprintln!("Usage: stage run <project.json> [--ticks N] [--dt SECONDS]");
                    std::process::exit(1);
                }
            };
            run_file(&options);
        }
        "migrate" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: stage migrate <project.json>");
                std::process::exit(1);
            };
            migrate_file(path);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("stage {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Stage sprite engine");
    println!();
    println!("Usage: stage <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>       Load a project and run it");
    println!("      --ticks N    Number of ticks to run (default: 60)");
    println!("      --dt S       Seconds per tick (default: 1/60)");
    println!("  migrate <file>   Print the project upgraded to the current language version");
    println!("  help             Show this message");
    println!("  version          Show version information");
    println!();
    println!("Environment:");
    println!("  RUST_LOG           Enable logging, e.g. RUST_LOG=stage_runtime=debug");
    println!("  STAGE_MAX_CLONES   Maximum number of live clones (default: 300)");
}

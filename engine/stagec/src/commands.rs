//! Command implementations.

use std::sync::Once;

use stage_formula::migrate_project;
use stage_ir::{ProjectFile, Value};
use stage_runtime::{Loaded, RuntimeBuilder, RuntimeConfig};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber. Only active when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Options of `stage run`.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub path: String,
    pub ticks: u64,
    pub delta: f64,
}

const DEFAULT_TICKS: u64 = 60;
const DEFAULT_DELTA: f64 = 1.0 / 60.0;

/// Parse the arguments following `run`. Flags accept `--flag value` and
/// `--flag=value`.
pub fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let mut path = None;
    let mut ticks = DEFAULT_TICKS;
    let mut delta = DEFAULT_DELTA;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg, None),
        };
        match flag {
            "--ticks" | "--dt" => {
                let value = match inline {
                    Some(value) => value,
                    None => {
                        i += 1;
                        args.get(i)
                            .map(String::as_str)
                            .ok_or_else(|| format!("`{flag}` needs a value"))?
                    }
                };
                if flag == "--ticks" {
                    ticks = value
                        .parse()
                        .map_err(|_| format!("invalid tick count `{value}`"))?;
                } else {
                    delta = value
                        .parse()
                        .ok()
                        .filter(|dt: &f64| dt.is_finite() && *dt >= 0.0)
                        .ok_or_else(|| format!("invalid time step `{value}`"))?;
                }
            }
            _ if flag.starts_with('-') => return Err(format!("unknown option `{arg}`")),
            _ if path.is_none() => path = Some(arg.to_owned()),
            _ => return Err(format!("unexpected argument `{arg}`")),
        }
        i += 1;
    }

    let path = path.ok_or_else(|| "missing project file".to_owned())?;
    Ok(RunOptions { path, ticks, delta })
}

fn read_project(path: &str) -> ProjectFile {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&content) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("'{path}' is not a valid project: {e}");
            std::process::exit(1);
        }
    }
}

/// `stage run`: load, run the requested ticks, and print a summary.
pub fn run_file(options: &RunOptions) {
    let project = read_project(&options.path);
    tracing::debug!(
        path = %options.path,
        ticks = options.ticks,
        delta = options.delta,
        "running project"
    );
    let builder = RuntimeBuilder::new().config(RuntimeConfig::from_env());
    let Loaded {
        mut runtime,
        migration,
    } = match builder.load(project) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: cannot load '{}': {e}", options.path);
            std::process::exit(1);
        }
    };
    for (sprite, issue) in &migration.issues {
        eprintln!("warning: sprite `{sprite}`: {issue}");
    }

    let mut faults = 0;
    for _ in 0..options.ticks {
        let report = runtime.tick(options.delta);
        for fault in &report.faults {
            let name = runtime.world().name_of(fault.sprite).unwrap_or("<removed>");
            eprintln!(
                "tick {}: script {} of `{name}` stopped: {}",
                report.tick, fault.script, fault.error
            );
        }
        faults += report.faults.len();
    }

    println!("ran {} ticks of {}s", runtime.ticks(), options.delta);
    let snapshot = runtime.snapshot();
    for entry in &snapshot.scene.data.project_variables {
        println!("{} = {}", entry.name, entry.value);
    }
    for entry in &snapshot.scene.data.project_lists {
        println!("{} = [{}]", entry.name, join(&entry.items));
    }
    for locals in &snapshot.scene.data.sprite_locals {
        for entry in &locals.variables {
            println!("{}.{} = {}", locals.sprite, entry.name, entry.value);
        }
        for entry in &locals.lists {
            println!("{}.{} = [{}]", locals.sprite, entry.name, join(&entry.items));
        }
    }
    if faults > 0 {
        eprintln!("{faults} script(s) stopped with errors");
        std::process::exit(1);
    }
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `stage migrate`: print the migrated project as JSON.
pub fn migrate_file(path: &str) {
    let mut project = read_project(path);
    let report = migrate_project(&mut project);
    for (sprite, issue) in &report.issues {
        eprintln!("warning: sprite `{sprite}`: {issue}");
    }
    match serde_json::to_string_pretty(&project) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: cannot write project: {e}");
            std::process::exit(1);
        }
    }
    eprintln!(
        "migrated {} collision formula(s), {} left unresolved",
        report.migrated,
        report.issues.len()
    );
}

use std::path::PathBuf;
use std::process::ExitCode;

use engravekit::{init_logging, load_config, process_pattern, BUILD_DATE, VERSION};

const USAGE: &str = "usage: engravekit <pattern.json> [--config <file>] [--regenerate]";

struct Options {
    pattern: PathBuf,
    config: Option<PathBuf>,
    regenerate: bool,
}

enum Action {
    Run(Options),
    Help,
    Version,
}

fn parse_args() -> Result<Action, String> {
    let mut args = std::env::args().skip(1);
    let mut pattern = None;
    let mut config = None;
    let mut regenerate = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Action::Help),
            "-V" | "--version" => return Ok(Action::Version),
            "-r" | "--regenerate" => regenerate = true,
            "-c" | "--config" => {
                let file = args.next().ok_or_else(|| format!("--config needs a file\n{USAGE}"))?;
                config = Some(PathBuf::from(file));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}\n{USAGE}")),
            file if pattern.is_none() => pattern = Some(PathBuf::from(file)),
            _ => return Err(USAGE.into()),
        }
    }

    let pattern = pattern.ok_or_else(|| USAGE.to_string())?;
    Ok(Action::Run(Options {
        pattern,
        config,
        regenerate,
    }))
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = load_config(options.config.as_deref())?;
    let stats = process_pattern(&options.pattern, &config, options.regenerate)?;
    println!("{}: {}", options.pattern.display(), stats);
    Ok(())
}

fn main() -> ExitCode {
    let action = match parse_args() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match action {
        Action::Help => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Action::Version => {
            println!("engravekit {VERSION} (built {BUILD_DATE})");
            ExitCode::SUCCESS
        }
        Action::Run(options) => {
            if let Err(e) = init_logging() {
                eprintln!("{e:#}");
            }
            match run(&options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

mod debug_report;

use brian::{Options, run};
use std::io::{self, IsTerminal};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let source = match std::fs::read_to_string(&config.path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read '{}': {err}", config.path);
            std::process::exit(1);
        }
    };

    let report = run(&source, &config.options);
    debug_report::print_run(&config.path, &report, config.color, config.trace);

    if !report.errors.is_empty() {
        std::process::exit(1);
    }
}

struct CliConfig {
    path: String,
    options: Options,
    color: bool,
    trace: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut path: Option<String> = None;
    let mut options = Options::default();
    let mut color = io::stdout().is_terminal();
    let mut trace = false;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("brian {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--trace" => trace = true,
            "--no-gate" => options.gate_rules = false,
            "--max-steps" => {
                let value = args.next().ok_or_else(|| "error: --max-steps expects a value".to_string())?;
                options.max_steps = parse_max_steps(&value)?;
            }
            _ if arg.starts_with("--max-steps=") => {
                options.max_steps = parse_max_steps(arg.trim_start_matches("--max-steps="))?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'\n\n{}", help_text()));
            }
            _ => {
                if path.is_some() {
                    return Err(format!("error: expected exactly one program file\n\n{}", help_text()));
                }
                path = Some(arg);
            }
        }
    }

    let Some(path) = path else {
        return Err(format!("error: no program file provided\n\n{}", help_text()));
    };

    Ok(CliConfig { path, options, color, trace })
}

fn parse_max_steps(value: &str) -> Result<usize, String> {
    value.parse::<usize>().map_err(|_| format!("error: invalid --max-steps '{value}' (expected a whole number)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "brian {version}

Rule language front end and term rewriter.

Usage:
  brian [OPTIONS] <programfile>

Options:
  --max-steps <n>    Rewrite steps allowed per query. Default: {default_steps}
  --no-gate          Try every rule on every query (disables head gating).
  --trace            Print each rewrite step.
  --color            Force ANSI color output.
  --no-color         Disable ANSI color output.
  -h, --help         Show this help message.
  -V, --version      Print version information.

Exit codes:
  0  Success.
  1  Unreadable program file, or a statement failed to parse.
  2  Invalid arguments or missing program file.

Set BRIAN_DEBUG_REWRITE=1 for engine traces on stderr.
",
        version = env!("CARGO_PKG_VERSION"),
        default_steps = Options::default().max_steps
    )
}

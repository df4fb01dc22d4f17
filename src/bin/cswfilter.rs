//! cswfilter - translate CQL constraints into catalog queries
//!
//! Usage: cswfilter [-c config.toml] [-t type]... [-e cql]
//!
//! Commands:
//!   :help       - Show help
//!   :quit       - Exit REPL
//!   :types X    - Scope queries to record types
//!   :sort F d   - Sort by field F (asc|desc)
//!   :ast        - Toggle echo of the parsed filter
//!   :reset      - Reset session settings

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing_subscriber::EnvFilter;

use cswfilter::repl::{InputResult, MetaCommand, ReplState};
use cswfilter::TranslatorConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "cql> ";
const CONTINUATION: &str = "...  ";

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    types: Vec<String>,
    eval: Option<String>,
}

/// Parse command line arguments.
///
/// Options:
///   -c, --config <toml>  Load translator settings from a TOML file
///   -t, --type <name>    Scope queries to a record type (repeatable)
///   -e, --eval <cql>     Translate one constraint and exit
///   -h, --help           Show help and exit
///   -v, --version        Show version and exit
fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", name))
        };
        match arg.as_str() {
            "-c" | "--config" => parsed.config = Some(PathBuf::from(value(arg)?)),
            "-t" | "--type" => parsed.types.push(value(arg)?),
            "-e" | "--eval" => parsed.eval = Some(value(arg)?),
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                println!("cswfilter v{}", VERSION);
                std::process::exit(0);
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }

    Ok(parsed)
}

fn print_usage() {
    println!("cswfilter v{} - CQL to catalog query translator", VERSION);
    println!();
    println!("Usage: cswfilter [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <toml>  Load translator settings from a TOML file");
    println!("  -t, --type <name>    Scope queries to a record type (repeatable)");
    println!("  -e, --eval <cql>     Translate one constraint and exit");
    println!("  -h, --help           Show this help message");
    println!("  -v, --version        Show version");
    println!();
    println!("Examples:");
    println!("  cswfilter -e \"Title LIKE 'VM%'\"");
    println!("  cswfilter -t csw:Record -e \"BBOX(ows:BoundingBox, -10, 40, 10, 50)\"");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try 'cswfilter --help' for usage information");
            return ExitCode::FAILURE;
        }
    };

    let config = match &args.config {
        Some(path) => match TranslatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => TranslatorConfig::default(),
    };

    let mut state = ReplState::new(config);
    state.set_types(&args.types);

    if let Some(cql) = &args.eval {
        return if handle_cql(&state, cql) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    println!("cswfilter v{} - CQL to catalog query translator", VERSION);
    println!("Type :help for help, :quit to exit\n");

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to create line editor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let history_path = dirs_history_path();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = if state.input_buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION
        };

        match rl.readline(prompt) {
            Ok(line) => match state.process_line(&line) {
                InputResult::MetaCommand(cmd) => {
                    if !handle_command(&mut state, cmd) {
                        break; // :quit
                    }
                }
                InputResult::Cql(cql) => {
                    handle_cql(&state, &cql);
                }
                InputResult::Incomplete | InputResult::Empty => {}
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C - clear current buffer
                if !state.input_buffer.is_empty() {
                    state.input_buffer.clear();
                    println!("^C");
                } else {
                    println!("Use :quit or Ctrl-D to exit");
                }
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - submit buffer or quit
                if let Some(cql) = state.force_submit() {
                    handle_cql(&state, &cql);
                } else {
                    println!("\nGoodbye!");
                    break;
                }
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }
    ExitCode::SUCCESS
}

/// Translate and print one constraint. Returns false on error.
fn handle_cql(state: &ReplState, cql: &str) -> bool {
    match state.execute_cql(cql) {
        Ok(result) => {
            print!("{}", state.format_result(&result));
            true
        }
        Err(e) => {
            eprintln!("{}: {}", e.code, e.message);
            false
        }
    }
}

/// Handle a meta-command. Returns false if we should exit.
fn handle_command(state: &mut ReplState, cmd: MetaCommand) -> bool {
    match cmd {
        MetaCommand::Help => print_help(),
        MetaCommand::Quit => {
            println!("Goodbye!");
            return false;
        }
        MetaCommand::Types(names) => {
            state.set_types(&names);
            if state.type_names.is_empty() {
                println!("Type scope cleared");
            } else {
                let names: Vec<String> = state.type_names.iter().map(|t| t.to_string()).collect();
                println!("Scoped to {}", names.join(", "));
            }
        }
        MetaCommand::Version(None) => match state.version {
            Some(v) => println!("Filter version {}", v),
            None => println!("Filter version unset (temporal operators allowed)"),
        },
        MetaCommand::Version(Some(v)) => match state.set_version(&v) {
            Ok(()) => println!("Filter version {}", v),
            Err(e) => eprintln!("{}: {}", e.code, e.message),
        },
        MetaCommand::Sort(args) => match state.set_sort(&args) {
            Ok(()) if state.sort.is_empty() => println!("Sort cleared"),
            Ok(()) => {
                for field in state.translator.sort_fields(&state.sort) {
                    let order = if field.descending { "desc" } else { "asc" };
                    println!("Sort by {} {}", field.field, order);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        MetaCommand::Ast => {
            state.show_ast = !state.show_ast;
            println!("AST echo {}", if state.show_ast { "on" } else { "off" });
        }
        MetaCommand::Reset => {
            state.reset();
            println!("Session reset");
        }
        MetaCommand::Unknown(msg) => {
            eprintln!("{}", msg);
            eprintln!("Type :help for available commands");
        }
    }
    true
}

fn print_help() {
    println!("Commands:");
    println!();
    println!("  :help                    Show this help");
    println!("  :quit                    Exit the REPL");
    println!("  :types [names...]        Scope queries to record types (none clears)");
    println!("  :version [1.0.0|1.1.0|2.0.0]  Show or set the filter version");
    println!("  :sort [field [asc|desc]]...   Set sort criteria (none clears)");
    println!("  :ast                     Toggle echo of the parsed filter");
    println!("  :reset                   Reset session settings");
    println!();
    println!("Anything else is translated as CQL. End a line with \\ to continue it.");
    println!();
    println!("Examples:");
    println!("  Title = 'VM' AND Modified AFTER 2007-06-02T00:00:00Z");
    println!("  BBOX(BoundingBox, -10, 40, 10, 50) AND Subject LIKE 'ocean%'");
    println!("  DWITHIN(BoundingBox, POINT(2.35 48.85), 10, kilometers)");
}

/// Get the history file path
fn dirs_history_path() -> Option<PathBuf> {
    dirs_config_dir().map(|mut path| {
        path.push("cswfilter");
        path.push("history");
        path
    })
}

/// Get the config directory (cross-platform)
fn dirs_config_dir() -> Option<PathBuf> {
    // HOME/.config on Unix, APPDATA on Windows
    #[cfg(unix)]
    {
        std::env::var("HOME").ok().map(|h| {
            let mut p = PathBuf::from(h);
            p.push(".config");
            p
        })
    }
    #[cfg(windows)]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }
    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

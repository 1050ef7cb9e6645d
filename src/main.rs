//! filecache - command-line access to a filesystem cache directory

use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use filecache::{Cacher, FileStore, StoreConfig};

/// CLI command
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Store a value with an expiry
    SetTtl {
        key: String,
        value: String,
        ttl: Duration,
    },
    /// Report whether a key is present
    Has { key: String },
    /// Remove a key
    Delete { key: String },
    /// Remove the whole cache directory
    Clear,
    /// Show help
    Help,
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    /// Root directory from `--dir`, if given
    dir: Option<PathBuf>,
    command: Command,
}

fn print_help() {
    eprintln!(
        r#"filecache - Filesystem-backed key/value cache

USAGE:
    filecache [--dir <path>] get <key>
    filecache [--dir <path>] set <key> <value>
    filecache [--dir <path>] set-ttl <key> <value> <seconds>
    filecache [--dir <path>] has <key>
    filecache [--dir <path>] delete <key>
    filecache [--dir <path>] clear
    filecache help

COMMANDS:
    get      Print the value stored under <key>
    set      Store <value> under <key>
    set-ttl  Store <value> under <key> with an expiry <seconds> from now
             (recorded only, never enforced)
    has      Print "true" or "false"
    delete   Remove <key>
    clear    Remove the cache directory and everything in it
    help     Show this help message

ENVIRONMENT:
    FILECACHE_DIR    Cache directory (overridden by --dir)
    RUST_LOG         Log level (trace, debug, info, warn, error)
"#
    );
}

fn usage(form: &str) -> anyhow::Error {
    anyhow!("Usage: filecache {}", form)
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut dir = None;
    let mut rest = args;

    while let Some(first) = rest.first() {
        if first != "--dir" {
            break;
        }
        let path = rest.get(1).ok_or_else(|| anyhow!("--dir requires a path"))?;
        dir = Some(PathBuf::from(path));
        rest = &rest[2..];
    }

    let Some(name) = rest.first() else {
        return Ok(Invocation {
            dir,
            command: Command::Help,
        });
    };

    let command = match name.as_str() {
        "get" => match rest {
            [_, key] => Command::Get { key: key.clone() },
            _ => return Err(usage("get <key>")),
        },
        "set" => match rest {
            [_, key, value] => Command::Set {
                key: key.clone(),
                value: value.clone(),
            },
            _ => return Err(usage("set <key> <value>")),
        },
        "set-ttl" => match rest {
            [_, key, value, secs] => {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("Invalid TTL seconds: {}", secs))?;
                Command::SetTtl {
                    key: key.clone(),
                    value: value.clone(),
                    ttl: Duration::from_secs(secs),
                }
            }
            _ => return Err(usage("set-ttl <key> <value> <seconds>")),
        },
        "has" => match rest {
            [_, key] => Command::Has { key: key.clone() },
            _ => return Err(usage("has <key>")),
        },
        "delete" => match rest {
            [_, key] => Command::Delete { key: key.clone() },
            _ => return Err(usage("delete <key>")),
        },
        "clear" => Command::Clear,
        "help" | "--help" | "-h" => Command::Help,
        other => return Err(anyhow!("Unknown command: {}", other)),
    };

    Ok(Invocation { dir, command })
}

/// Open the store named by `--dir`, or the configured default
fn open_store(dir: Option<PathBuf>) -> Result<FileStore> {
    let config = match dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::from_env(),
    };
    config
        .open()
        .with_context(|| format!("Failed to open cache at {}", config.root.display()))
}

fn run(invocation: Invocation) -> Result<()> {
    let Invocation { dir, command } = invocation;

    match command {
        Command::Help => print_help(),
        Command::Get { key } => {
            let value = open_store(dir)?.get(&key)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&value)?;
            stdout.write_all(b"\n")?;
        }
        Command::Set { key, value } => {
            open_store(dir)?.set(&key, value.as_bytes())?;
        }
        Command::SetTtl { key, value, ttl } => {
            open_store(dir)?.set_with_ttl(&key, value.as_bytes(), ttl)?;
        }
        Command::Has { key } => {
            println!("{}", open_store(dir)?.has(&key));
        }
        Command::Delete { key } => {
            open_store(dir)?.delete(&key)?;
        }
        Command::Clear => {
            open_store(dir)?.clear()?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout only carries values)
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(invocation) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

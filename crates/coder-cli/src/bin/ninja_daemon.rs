//! `ninja-daemon [start|stop|status|restart] [module]`: the controller
//! for the long-lived per-module HTTP/SSE servers. With no `module`
//! argument, the command applies to every module in the published table
//! (`coder`, `researcher`, `secretary`, `resources`, `prompts`).

use clap::{Parser, Subcommand};
use coder_daemon::{ModuleStatus, KNOWN_MODULES};

mod exit {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 1;
}

#[derive(Parser, Debug)]
#[command(name = "ninja-daemon", about = "Lifecycle controller for ninja-coder module daemons")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Start { module: Option<String> },
    Stop { module: Option<String> },
    Status { module: Option<String> },
    Restart { module: Option<String> },
}

fn targets(module: Option<String>) -> Vec<String> {
    match module {
        Some(m) => vec![m],
        None => KNOWN_MODULES.iter().map(|s| s.to_string()).collect(),
    }
}

fn print_status(status: &ModuleStatus) {
    println!(
        "{:<12} running={:<5} pid={:<8} port={:<6} url={:<28} log={}",
        status.module,
        status.running,
        status.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        status.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        status.url.clone().unwrap_or_else(|| "-".to_string()),
        status.log_path.display(),
    );
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    std::process::exit(run(args).await);
}

async fn run(args: Args) -> i32 {
    let mut had_error = false;

    match args.command {
        Command::Start { module } => {
            for module in targets(module) {
                match coder_daemon::start(&module) {
                    Ok(status) => print_status(&status),
                    Err(error) => {
                        eprintln!("failed to start '{module}': {error}");
                        had_error = true;
                    }
                }
            }
        }
        Command::Stop { module } => {
            for module in targets(module) {
                match coder_daemon::stop(&module).await {
                    Ok(()) => println!("{module}: stopped"),
                    Err(error) => {
                        eprintln!("failed to stop '{module}': {error}");
                        had_error = true;
                    }
                }
            }
        }
        Command::Status { module } => {
            for module in targets(module) {
                match coder_daemon::status(&module) {
                    Ok(status) => print_status(&status),
                    Err(error) => {
                        eprintln!("failed to read status for '{module}': {error}");
                        had_error = true;
                    }
                }
            }
        }
        Command::Restart { module } => {
            for module in targets(module) {
                match coder_daemon::restart(&module).await {
                    Ok(status) => print_status(&status),
                    Err(error) => {
                        eprintln!("failed to restart '{module}': {error}");
                        had_error = true;
                    }
                }
            }
        }
    }

    if had_error {
        exit::USER_ERROR
    } else {
        exit::SUCCESS
    }
}

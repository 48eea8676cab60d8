//! `ninja-config [get|set|validate|migrate|setup-claude|doctor]`: the
//! typed-config and credential CLI. Secrets never touch `config.json` —
//! `set credential` goes to `coder-credentials`, everything else to
//! `coder-config`'s `ConfigStore`.

use clap::{Parser, Subcommand};
use coder_core::{ComponentConfig, ModelsConfig, Operator};
use coder_credentials::CredentialStore;
use std::collections::BTreeMap;
use std::str::FromStr;

mod exit {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 1;
    pub const ENVIRONMENT: i32 = 2;
    pub const INTERNAL: i32 = 3;
}

#[derive(Parser, Debug)]
#[command(name = "ninja-config", about = "Typed configuration and credential store CLI")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full config document, or one component of it.
    Get { component: Option<String> },
    /// Set a component's operator/model routing, or a credential value.
    Set {
        #[command(subcommand)]
        target: SetTarget,
    },
    /// Validate the saved config: operator registration and binary availability.
    Validate,
    /// One-shot migration from a legacy `KEY=VALUE` env-file.
    Migrate {
        #[arg(long)]
        env_file: String,
    },
    /// Print an MCP client registration snippet for the coder module.
    SetupClaude,
    /// Diagnostic sweep: config validity, credential store reachability,
    /// operator binaries, daemon status per module.
    Doctor,
}

#[derive(Subcommand, Debug)]
enum SetTarget {
    Component {
        name: String,
        #[arg(long)]
        operator: String,
        #[arg(long = "model-default")]
        model_default: Option<String>,
        #[arg(long = "model-quick")]
        model_quick: Option<String>,
        #[arg(long = "model-heavy")]
        model_heavy: Option<String>,
        #[arg(long = "model-parallel")]
        model_parallel: Option<String>,
    },
    Credential {
        name: String,
        value: String,
        #[arg(long)]
        provider: Option<String>,
    },
}

fn main() {
    coder_logging::init_console_subscriber();
    std::process::exit(run(Args::parse()));
}

fn component_slot<'a>(
    doc: &'a mut coder_core::ConfigDocument,
    name: &str,
) -> Option<&'a mut Option<ComponentConfig>> {
    match name {
        "coder" => Some(&mut doc.coder),
        "researcher" => Some(&mut doc.researcher),
        "secretary" => Some(&mut doc.secretary),
        _ => None,
    }
}

fn run(args: Args) -> i32 {
    match args.command {
        Command::Get { component } => cmd_get(component),
        Command::Set { target } => cmd_set(target),
        Command::Validate => cmd_validate(),
        Command::Migrate { env_file } => cmd_migrate(&env_file),
        Command::SetupClaude => cmd_setup_claude(),
        Command::Doctor => cmd_doctor(),
    }
}

fn cmd_get(component: Option<String>) -> i32 {
    let store = coder_config::ConfigStore::at_default_path();
    let doc = match store.load() {
        Ok(doc) => doc,
        Err(error) => {
            eprintln!("failed to load config: {error}");
            return exit::INTERNAL;
        }
    };
    let value = match component.as_deref() {
        None => serde_json::to_value(&doc),
        Some("coder") => serde_json::to_value(&doc.coder),
        Some("researcher") => serde_json::to_value(&doc.researcher),
        Some("secretary") => serde_json::to_value(&doc.secretary),
        Some(other) => {
            eprintln!("unknown component '{other}'");
            return exit::USER_ERROR;
        }
    };
    match value {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            exit::SUCCESS
        }
        Err(error) => {
            eprintln!("failed to serialize config: {error}");
            exit::INTERNAL
        }
    }
}

fn cmd_set(target: SetTarget) -> i32 {
    match target {
        SetTarget::Component {
            name,
            operator,
            model_default,
            model_quick,
            model_heavy,
            model_parallel,
        } => {
            let Ok(operator) = Operator::from_str(&operator) else {
                eprintln!("unknown operator '{operator}'");
                return exit::USER_ERROR;
            };
            let store = coder_config::ConfigStore::at_default_path();
            let mut doc = match store.load() {
                Ok(doc) => doc,
                Err(error) => {
                    eprintln!("failed to load config: {error}");
                    return exit::INTERNAL;
                }
            };
            let Some(slot) = component_slot(&mut doc, &name) else {
                eprintln!("unknown component '{name}'");
                return exit::USER_ERROR;
            };
            let existing = slot.take().unwrap_or_else(|| ComponentConfig {
                operator,
                operator_settings: BTreeMap::new(),
                models: ModelsConfig::default(),
            });
            *slot = Some(ComponentConfig {
                operator,
                operator_settings: existing.operator_settings,
                models: ModelsConfig {
                    default: model_default.or(existing.models.default),
                    quick: model_quick.or(existing.models.quick),
                    heavy: model_heavy.or(existing.models.heavy),
                    parallel: model_parallel.or(existing.models.parallel),
                },
            });
            match store.save(&doc) {
                Ok(()) => {
                    println!("saved component '{name}'");
                    exit::SUCCESS
                }
                Err(error) => {
                    eprintln!("failed to save config: {error}");
                    exit::INTERNAL
                }
            }
        }
        SetTarget::Credential { name, value, provider } => {
            let store = match open_credential_store() {
                Ok(store) => store,
                Err(code) => return code,
            };
            match store.set(&name, &value, provider.as_deref()) {
                Ok(()) => {
                    println!("saved credential '{name}'");
                    exit::SUCCESS
                }
                Err(error) => {
                    eprintln!("failed to save credential: {error}");
                    exit::USER_ERROR
                }
            }
        }
    }
}

fn cmd_validate() -> i32 {
    let store = coder_config::ConfigStore::at_default_path();
    let doc = match store.load() {
        Ok(doc) => doc,
        Err(error) => {
            eprintln!("config is invalid: {error}");
            return exit::USER_ERROR;
        }
    };
    let mut ok = true;
    for (name, component) in [
        ("coder", &doc.coder),
        ("researcher", &doc.researcher),
        ("secretary", &doc.secretary),
    ] {
        let Some(component) = component else { continue };
        let available = coder_config::operator_binary_available(
            component.operator,
            component.operator_settings.get("bin_override").map(String::as_str),
        );
        println!(
            "{name}: operator={} binary_available={available}",
            component.operator
        );
        ok &= available;
    }
    if ok {
        exit::SUCCESS
    } else {
        eprintln!("one or more configured operator binaries are not on PATH");
        exit::USER_ERROR
    }
}

fn cmd_migrate(env_file: &str) -> i32 {
    let env_path = std::path::PathBuf::from(env_file);
    let config_store = coder_config::ConfigStore::at_default_path();
    let credential_store = match open_credential_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let backup_dir = coder_config::default_backup_dir();
    let migrations_dir = coder_config::default_migrations_dir();

    match coder_config::migrate_from_legacy(
        &config_store,
        &env_path,
        &credential_store,
        &backup_dir,
        &migrations_dir,
    ) {
        Ok(coder_config::MigrationOutcome::Skipped) => {
            println!("migration skipped: config.json already exists or env-file is absent");
            exit::SUCCESS
        }
        Ok(coder_config::MigrationOutcome::Migrated(log)) => {
            println!(
                "migrated {} credential(s), {} config key(s), {} warning(s)",
                log.credentials_migrated.len(),
                log.config_keys_mapped.len(),
                log.warnings.len()
            );
            for warning in &log.warnings {
                eprintln!("warning: {warning}");
            }
            exit::SUCCESS
        }
        Err(error) => {
            eprintln!("migration failed: {error}");
            exit::INTERNAL
        }
    }
}

fn cmd_setup_claude() -> i32 {
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.with_file_name("ninja-coder").to_str().map(str::to_string))
        .unwrap_or_else(|| "ninja-coder".to_string());
    let snippet = serde_json::json!({
        "mcpServers": {
            "ninja-coder": {
                "command": exe,
                "args": ["--stdio"],
            }
        }
    });
    println!("{}", serde_json::to_string_pretty(&snippet).unwrap_or_default());
    exit::SUCCESS
}

fn cmd_doctor() -> i32 {
    let mut ok = true;

    let store = coder_config::ConfigStore::at_default_path();
    match store.load() {
        Ok(doc) => {
            println!("config: ok ({})", store.path().display());
            for (name, component) in [("coder", &doc.coder), ("researcher", &doc.researcher), ("secretary", &doc.secretary)] {
                if let Some(component) = component {
                    let available = coder_config::operator_binary_available(component.operator, None);
                    println!("  {name}: operator={} binary_available={available}", component.operator);
                    ok &= available;
                }
            }
        }
        Err(error) => {
            println!("config: FAIL ({error})");
            ok = false;
        }
    }

    match open_credential_store() {
        Ok(store) => match store.list() {
            Ok(creds) => println!("credentials: ok ({} stored)", creds.len()),
            Err(error) => {
                println!("credentials: FAIL ({error})");
                ok = false;
            }
        },
        Err(_) => {
            println!("credentials: FAIL (could not open store)");
            ok = false;
        }
    }

    for module in coder_daemon::KNOWN_MODULES {
        match coder_daemon::status(module) {
            Ok(status) => println!(
                "daemon {module}: running={} port={}",
                status.running,
                status.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
            ),
            Err(error) => println!("daemon {module}: FAIL ({error})"),
        }
    }

    if ok {
        exit::SUCCESS
    } else {
        exit::ENVIRONMENT
    }
}

fn open_credential_store() -> Result<CredentialStore, i32> {
    let passphrase = std::env::var("NINJA_CREDENTIAL_PASSWORD").ok();
    CredentialStore::open(&coder_credentials::default_db_path(), passphrase.as_deref()).map_err(|error| {
        eprintln!("failed to open credential store: {error}");
        exit::INTERNAL
    })
}

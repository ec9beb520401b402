//! analytics-runner: headless front end for the action analytics engine.
//!
//! Usage:
//!   analytics-runner --actions actions.json next login
//!   analytics-runner --actions actions.json referral
//!   analytics-runner --actions actions.json --users users.json user 1
//!   analytics-runner --actions actions.json --users users.json --db run.db import
//!   analytics-runner --db run.db count 1
//!   analytics-runner --actions actions.json --ipc-mode

use action_analytics_core::{
    analytics::ActionAnalytics,
    config::AnalyticsConfig,
    snapshot::ActionSnapshot,
    source::ActionSource,
    store::AnalyticsStore,
    types::UserId,
    users::{UserDirectory, UserSnapshot},
};
use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--actions", "--users", "--config", "--db"];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    NextAction { action_type: String },
    ReferralIndex,
    ActionCount { user_id: UserId },
    User { user_id: UserId },
    Quit,
}

#[derive(Debug, PartialEq)]
enum Command {
    Next(String),
    Referral,
    Count(UserId),
    User(UserId),
    Import,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let actions_path = flag_value(&args, "--actions").unwrap_or("./data/actions.json");
    let users_path = flag_value(&args, "--users").unwrap_or("./data/users.json");
    let db = flag_value(&args, "--db");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let config = match flag_value(&args, "--config") {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    if ipc_mode {
        return match db {
            Some(db) => {
                let store = open_store(db)?;
                let users = store.reopen()?;
                run_ipc_loop(&ActionAnalytics::new(store, config), &users)
            }
            None => {
                let analytics =
                    ActionAnalytics::new(ActionSnapshot::from_json_file(actions_path)?, config);
                run_ipc_loop(&analytics, &load_users(users_path)?)
            }
        };
    }

    let command = parse_command(&args)?;

    if let Command::Import = command {
        let db = db.ok_or_else(|| anyhow::anyhow!("import requires --db <path>"))?;
        return import(db, actions_path, users_path);
    }

    match db {
        Some(db) => {
            let store = open_store(db)?;
            let users = store.reopen()?;
            run_command(&ActionAnalytics::new(store, config), &users, command)
        }
        None => {
            let analytics =
                ActionAnalytics::new(ActionSnapshot::from_json_file(actions_path)?, config);
            if let Command::User(_) = command {
                run_command(&analytics, &load_users(users_path)?, command)
            } else {
                run_command(&analytics, &UserSnapshot::default(), command)
            }
        }
    }
}

fn run_command<S: ActionSource>(
    analytics: &ActionAnalytics<S>,
    users: &dyn UserDirectory,
    command: Command,
) -> Result<()> {
    let output = match command {
        Command::Next(action_type) => serde_json::to_value(
            analytics.next_action_probabilities(&action_type.to_uppercase())?,
        )?,
        Command::Referral => serde_json::to_value(analytics.referral_index()?)?,
        Command::Count(user_id) => {
            serde_json::json!({ "count": analytics.user_action_count(user_id)? })
        }
        Command::User(user_id) => match users.user_by_id(user_id)? {
            Some(user) => serde_json::to_value(user)?,
            None => anyhow::bail!("User not found: {user_id}"),
        },
        Command::Import => anyhow::bail!("import runs against --db, not an analytics source"),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_ipc_loop<S: ActionSource>(
    analytics: &ActionAnalytics<S>,
    users: &dyn UserDirectory,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if let IpcRequest::Quit = request {
            break;
        }

        let response = match handle_request(analytics, users, request) {
            Ok(value) => value,
            Err(e) => {
                log::error!("ipc: request failed: {e}");
                serde_json::json!({ "error": "Internal server error" })
            }
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_request<S: ActionSource>(
    analytics: &ActionAnalytics<S>,
    users: &dyn UserDirectory,
    request: IpcRequest,
) -> Result<serde_json::Value> {
    let value = match request {
        IpcRequest::NextAction { action_type } => serde_json::to_value(
            analytics.next_action_probabilities(&action_type.to_uppercase())?,
        )?,
        IpcRequest::ReferralIndex => serde_json::to_value(analytics.referral_index()?)?,
        IpcRequest::ActionCount { user_id } => {
            serde_json::json!({ "count": analytics.user_action_count(user_id)? })
        }
        IpcRequest::User { user_id } => match users.user_by_id(user_id)? {
            Some(user) => serde_json::to_value(user)?,
            None => serde_json::json!({ "error": "User not found" }),
        },
        IpcRequest::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn import(db: &str, actions_path: &str, users_path: &str) -> Result<()> {
    let store = open_store(db)?;
    let actions = ActionSnapshot::from_json_file(actions_path)?.all_actions()?;
    store.import_actions(&actions)?;

    if Path::new(users_path).exists() {
        let users = UserSnapshot::from_json_file(users_path)?.all_users()?;
        store.import_users(&users)?;
    } else {
        log::warn!("import: {users_path} not found, skipping users");
    }

    println!("=== IMPORT SUMMARY ===");
    println!("  db:       {db}");
    println!("  actions:  {}", store.action_count()?);
    println!("  users:    {}", store.user_count()?);
    Ok(())
}

fn open_store(db: &str) -> Result<AnalyticsStore> {
    let store = AnalyticsStore::open(db)?;
    store.migrate()?;
    Ok(store)
}

fn load_users(path: &str) -> Result<UserSnapshot> {
    if Path::new(path).exists() {
        Ok(UserSnapshot::from_json_file(path)?)
    } else {
        log::warn!("users file {path} not found, user lookups will find nobody");
        Ok(UserSnapshot::default())
    }
}

fn parse_command(args: &[String]) -> Result<Command> {
    let positional = positional_args(args);
    let name = positional
        .first()
        .ok_or_else(|| anyhow::anyhow!("missing command: next | referral | count | user | import"))?;

    let user_arg = || -> Result<UserId> {
        let raw = positional
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("{name} requires a user id"))?;
        raw.parse()
            .map_err(|_| anyhow::anyhow!("Invalid user ID: {raw}"))
    };

    match name.as_str() {
        "next" => positional
            .get(1)
            .map(|t| Command::Next(t.to_string()))
            .ok_or_else(|| anyhow::anyhow!("next requires an action type")),
        "referral" => Ok(Command::Referral),
        "count" => Ok(Command::Count(user_arg()?)),
        "user" => Ok(Command::User(user_arg()?)),
        "import" => Ok(Command::Import),
        other => anyhow::bail!("unknown command: {other}"),
    }
}

/// Arguments that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<&String> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            positional.push(arg);
        }
    }
    positional
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        std::iter::once("analytics-runner")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect()
    }

    #[test]
    fn flag_values_are_not_positional() {
        let argv = args("--actions a.json --db run.db next login --ipc-mode");
        let positional: Vec<&str> = positional_args(&argv)
            .into_iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(positional, vec!["next", "login"]);
    }

    #[test]
    fn flag_value_reads_following_argument() {
        let argv = args("--users u.json --db run.db referral");
        assert_eq!(flag_value(&argv, "--db"), Some("run.db"));
        assert_eq!(flag_value(&argv, "--users"), Some("u.json"));
        assert_eq!(flag_value(&argv, "--config"), None);
    }

    #[test]
    fn commands_parse_around_flags() {
        assert_eq!(
            parse_command(&args("next view_profile --actions a.json")).unwrap(),
            Command::Next("view_profile".into())
        );
        assert_eq!(
            parse_command(&args("--config c.json referral")).unwrap(),
            Command::Referral
        );
        assert_eq!(
            parse_command(&args("--db run.db import")).unwrap(),
            Command::Import
        );
    }

    #[test]
    fn user_and_count_take_numeric_ids() {
        assert_eq!(
            parse_command(&args("--users u.json user 2")).unwrap(),
            Command::User(2)
        );
        assert_eq!(parse_command(&args("count 7")).unwrap(), Command::Count(7));

        let err = parse_command(&args("user abc")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid user ID: abc");
        assert!(parse_command(&args("count")).is_err());
    }

    #[test]
    fn missing_or_unknown_commands_are_rejected() {
        assert!(parse_command(&args("--db run.db")).is_err());
        assert!(parse_command(&args("next")).is_err());
        let err = parse_command(&args("purge")).unwrap_err();
        assert_eq!(err.to_string(), "unknown command: purge");
    }
}

use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use todolist_cli::cli::display::{render_history, render_tasks, task_json};
use todolist_cli::cli::{Cli, Command, ListCommand, collect_config_overrides};
use todolist_core::{TaskRepository, task_api};
use todolist_core::clock::{Clock, SystemClock};
use todolist_core::config::{Config, load_config_with_fallback, merge_overrides};
use todolist_core::error::AppError;
use todolist_core::history::HistoryFilter;
use todolist_core::model::Task;
use todolist_core::storage::JsonFileStore;
use todolist_core::timestamp::parse_date;
use todolist_core::view::SortKind;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TODOLIST_LOG";

/// Logs go to stderr so stdout stays machine-readable under `--json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_task(task: &Task, json: bool, label: &str, now: time::OffsetDateTime) {
    if json {
        println!("{}", task_json(task, now));
    } else {
        println!("{}: {} ({})", label, task.text, task.id);
    }
}

fn print_missing(id: u64, json: bool) {
    if json {
        println!("null");
    } else {
        println!("No task with id {id}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = merge_overrides(&loaded.config, &overrides);
    tracing::debug!(?config, "resolved config");
    Ok(config)
}

fn open_repository(
    config: &Config,
) -> Result<TaskRepository<JsonFileStore, SystemClock>, AppError> {
    let repository = task_api::open_default()?;
    Ok(repository.with_history_limit(config.history_limit()))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let mut repository = open_repository(&config)?;
    let now = repository.clock().now();
    let json = cli.json;

    match cli.command {
        Command::Add { text, deadline } => {
            let text = text.unwrap_or_default();
            match repository.add_task(&text, deadline.as_deref())? {
                Some(task) => print_task(&task, json, "Added task", now),
                None if json => println!("null"),
                None => println!("Nothing to add"),
            }
        }
        Command::Done { id } => match repository.set_completed(id, true)? {
            Some(task) => print_task(&task, json, "Completed task", now),
            None => print_missing(id, json),
        },
        Command::Undo { id } => match repository.set_completed(id, false)? {
            Some(task) => print_task(&task, json, "Uncompleted task", now),
            None => print_missing(id, json),
        },
        Command::Toggle { id } => match repository.toggle_completed(id)? {
            Some(task) if task.completed => print_task(&task, json, "Completed task", now),
            Some(task) => print_task(&task, json, "Uncompleted task", now),
            None => print_missing(id, json),
        },
        Command::Delete { id } => match repository.delete_task(id)? {
            Some(task) => print_task(&task, json, "Deleted task", now),
            None => print_missing(id, json),
        },
        Command::Show { id } => match repository.get_task(id) {
            Some(task) if json => println!("{}", task_json(task, now)),
            Some(task) => {
                let rendered = render_tasks(std::slice::from_ref(task), now, &config.palette());
                println!("{rendered}");
            }
            None => print_missing(id, json),
        },
        Command::List { view, sort } => {
            let view = view.unwrap_or(ListCommand::Tasks).view();
            let sort = sort
                .as_deref()
                .map(SortKind::from)
                .unwrap_or_else(|| config.sort_for(view));
            tracing::debug!(view = view.as_str(), sort = sort.as_str(), "listing tasks");
            let tasks = repository.view(view, sort);

            if json {
                let payload: Vec<serde_json::Value> =
                    tasks.iter().map(|task| task_json(task, now)).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else if tasks.is_empty() {
                println!("No {} tasks", view.as_str());
            } else {
                println!("{}", render_tasks(&tasks, now, &config.palette()));
            }
        }
        Command::History { kind, date } => {
            let date = match date.as_deref() {
                Some(raw) => Some(
                    parse_date(raw)
                        .ok_or_else(|| AppError::invalid_input("date must be YYYY-MM-DD"))?,
                ),
                None => None,
            };
            let filter = HistoryFilter::from_names(kind.as_deref(), date);
            let entries = repository.history_view(&filter);

            if json {
                let payload = serde_json::to_value(&entries)?;
                println!("{payload}");
            } else if entries.is_empty() {
                println!("No history");
            } else {
                println!("{}", render_history(&entries, now));
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todolist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

use clap::{CommandFactory, Parser};
use serde_json::Value;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::UtcOffset;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracker_cli::cli::{Cli, Command, collect_config_overrides};
use tracker_core::config::{self, Config, Palette, palette_for_theme};
use tracker_core::error::AppError;
use tracker_core::filter::TaskQuery;
use tracker_core::model::{Task, TaskStatus};
use tracker_core::stats::TaskStats;
use tracker_core::validate::TaskDraft;

const LOG_ENV_VAR: &str = "TRACKER_LOG";
const EMPTY_LIST_MESSAGE: &str = "No tasks found matching the current filters";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: u8,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Due / Completed")]
    end: String,
}

#[derive(Tabled)]
struct PriorityRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Time Lapsed (h)")]
    time_lapsed: i64,
    #[tabled(rename = "Estimated Time Left (h)")]
    estimated_time_left: i64,
}

fn format_time(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn task_row(task: &Task) -> Result<TaskRow, AppError> {
    Ok(TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority.value(),
        status: task.status.as_str(),
        start: format_time(task.start_time)?,
        end: format_time(task.end_time)?,
    })
}

fn print_tasks_table(tasks: &[Task]) -> Result<(), AppError> {
    if tasks.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
        return Ok(());
    }

    let rows = tasks.iter().map(task_row).collect::<Result<Vec<_>, _>>()?;
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
    Ok(())
}

fn print_task_detail(task: &Task, palette: &Palette) -> Result<(), AppError> {
    let end_label = match task.status {
        TaskStatus::Finished => "Completed",
        TaskStatus::Pending => "Due",
    };
    println!("{}", palette.accentize(&task.title));
    println!("{}", palette.mutedize(&format!("id: {}", task.id)));
    println!("Priority: {}", task.priority);
    println!("Status: {}", task.status);
    println!("Start: {}", format_time(task.start_time)?);
    println!("{}: {}", end_label, format_time(task.end_time)?);
    println!("Created: {}", format_time(task.created_at)?);
    Ok(())
}

fn print_stats(stats: &TaskStats, palette: &Palette) {
    println!("{} {}", palette.accentize("Total Tasks:"), stats.total_tasks);
    println!(
        "{} {:.1}%",
        palette.accentize("Completed:"),
        stats.completed_percentage
    );
    println!(
        "{} {:.1}%",
        palette.accentize("Pending:"),
        stats.pending_percentage
    );
    println!();
    println!("{}", palette.accentize("Time Statistics by Priority"));

    let rows = stats.time_stats.iter().map(|entry| PriorityRow {
        priority: format!("Priority {}", entry.priority),
        time_lapsed: entry.time_lapsed,
        estimated_time_left: entry.estimated_time_left,
    });
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
    println!();
    println!(
        "{} {:.1} hours",
        palette.accentize("Average Completion Time:"),
        stats.average_completion_time
    );
}

fn print_json(value: &Value) {
    println!("{value}");
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    let overrides = collect_config_overrides(&cli.config_override)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
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
                args.push(std::mem::take(&mut current));
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

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let palette = palette_for_theme(config.theme.as_deref());
    tracing::debug!(command = ?cli.command, "running command");

    match cli.command {
        Command::Add {
            title,
            start,
            end,
            priority,
        } => {
            let draft = TaskDraft {
                title: title.unwrap_or_default(),
                start_time: start,
                end_time: end,
                priority: Some(priority),
            };
            let task = tracker_core::task_api::add_task(&draft)?;
            if cli.json {
                print_json(&to_json(&task)?);
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::List {
            status,
            priority,
            sort,
        } => {
            let defaults = config.default_query();
            let query = TaskQuery {
                status: status.unwrap_or(defaults.status),
                priority: priority.unwrap_or(defaults.priority),
                sort: sort.unwrap_or(defaults.sort),
            };
            let tasks = tracker_core::task_api::query_tasks(&query)?;
            if cli.json {
                print_json(&to_json(&tasks)?);
            } else {
                print_tasks_table(&tasks)?;
            }
        }
        Command::Show { id } => {
            let task = tracker_core::task_api::get_task(&id)?;
            if cli.json {
                print_json(&to_json(&task)?);
            } else {
                print_task_detail(&task, &palette)?;
            }
        }
        Command::Done { id } => {
            let task = tracker_core::task_api::update_task_status(&id, TaskStatus::Finished)?;
            if cli.json {
                print_json(&to_json(&task)?);
            } else {
                println!("Finished task: {} ({})", task.title, task.id);
            }
        }
        Command::Reopen { id } => {
            let task = tracker_core::task_api::update_task_status(&id, TaskStatus::Pending)?;
            if cli.json {
                print_json(&to_json(&task)?);
            } else {
                println!("Reopened task: {} ({})", task.title, task.id);
            }
        }
        Command::Stats => {
            let stats = tracker_core::task_api::task_stats()?;
            if cli.json {
                print_json(&to_json(&stats)?);
            } else {
                print_stats(&stats, &palette);
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

        let argv = std::iter::once("tracker".to_string()).chain(args);
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

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

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
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

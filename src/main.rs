use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use task_manager_client::{
    auth::{LoginRequest, RegisterRequest},
    platform::TerminalPlatform,
    state::{AppState, Config},
    store::Action,
    ClientError,
    task::{CreateTaskRequest, Task, TaskFilter, TaskPriority, UpdateTaskRequest},
    view::Theme,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "task-manager-client")]
#[command(about = "Manage your tasks from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long, env = "TASKS_PASSWORD")]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, env = "TASKS_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List tasks
    List {
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long, default_value_t = TaskFilter::DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = TaskFilter::DEFAULT_LIMIT)]
        limit: u32,
        /// Only show tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one task
    Show { id: Uuid },
    /// Add a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Due date, YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
    },
    /// Change a task
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },
    /// Flip a task between done and pending
    Toggle { id: Uuid },
    /// Delete a task
    Rm { id: Uuid },
    /// Show or set the theme preference
    Theme { theme: Option<Theme> },
}

fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", raw))
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    let due = task
        .due_date
        .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!("[{}] {} {:<6} {}{}", mark, task.id, task.priority.to_string(), task.title, due);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,task_manager_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env();
    let platform = Arc::new(TerminalPlatform::open(TerminalPlatform::default_path()));
    tracing::debug!("Using API at {}, state in {}", config.api_url, platform.path().display());

    let app = AppState::new(config, platform).context("failed to build HTTP client")?;

    match run(cli.command, &app).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<ClientError>() {
            Some(client_error) => {
                // Surfaced errors were already printed by the platform.
                if !client_error.was_surfaced() {
                    eprintln!("error: {}", client_error.user_message());
                }
                if let Some(fields) = client_error.field_errors() {
                    for (field, messages) in fields {
                        eprintln!("  {}: {}", field, messages.join(", "));
                    }
                }
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

async fn run(command: Commands, app: &AppState) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            let session = app
                .auth_service
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                })
                .await?;
            app.store.sign_in(&session);
            println!("Welcome, {}!", session.user.name);
        }
        Commands::Login { email, password } => {
            let session = app
                .auth_service
                .login(&LoginRequest { email, password })
                .await?;
            app.store.sign_in(&session);
            println!("Signed in as {}", session.user.email);
        }
        Commands::Logout => {
            app.logout();
            println!("Signed out");
        }
        Commands::List {
            completed,
            priority,
            page,
            limit,
            search,
        } => {
            let filter = TaskFilter {
                completed,
                priority,
                page: Some(page),
                limit: Some(limit),
            };
            let result = app.task_queries.list(&filter).await?;
            let needle = search.unwrap_or_default();
            for task in result.data.iter().filter(|t| t.matches_search(&needle)) {
                print_task(task);
            }
            println!(
                "-- page {} of {} ({} tasks)",
                result.page,
                result.total_pages().max(1),
                result.total
            );
        }
        Commands::Show { id } => {
            let task = app.task_queries.get(id).await?;
            print_task(&task);
            if let Some(description) = &task.description {
                println!("\n{}", description);
            }
            println!(
                "\ncreated {}  updated {}",
                task.created_at.format("%Y-%m-%d %H:%M"),
                task.updated_at.format("%Y-%m-%d %H:%M")
            );
        }
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => {
            let task = app
                .task_queries
                .create(&CreateTaskRequest {
                    title,
                    description,
                    priority,
                    due_date: due,
                })
                .await?;
            print_task(&task);
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
            due,
            clear_description,
            clear_due,
        } => {
            let payload = UpdateTaskRequest {
                title,
                description: if clear_description { Some(None) } else { description.map(Some) },
                completed: None,
                priority,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            if payload.is_empty() {
                return Err(anyhow!(
                    "nothing to change; pass --title, --description, --priority, --due or a --clear-* flag"
                ));
            }
            let task = app.task_queries.update(id, &payload).await?;
            print_task(&task);
        }
        Commands::Toggle { id } => {
            let task = app.task_queries.get(id).await?;
            let task = app.task_queries.toggle_complete(&task).await?;
            print_task(&task);
        }
        Commands::Rm { id } => {
            app.task_queries.delete(id).await?;
        }
        Commands::Theme { theme } => match theme {
            Some(theme) => {
                app.store.dispatch(Action::SetTheme(theme));
                println!("Theme set to {}", theme);
            }
            None => println!("{}", app.theme.get()),
        },
    }

    Ok(())
}

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shared::{
    EquipmentStatus, ExportFormat, NewSchedule, NewUser, Role, ScheduleQuery, ScheduleStatus,
    UserQuery, View,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod config;
mod session;
mod views;

use api::{ApiClient, ApiError};
use auth::HttpAuthService;
use session::{FileSnapshotStore, SessionStore};

type Session = SessionStore<FileSnapshotStore>;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Tracker installation scheduling from the terminal")]
#[command(version)]
struct Cli {
    /// Server URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login to the tracker server
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Logout from the tracker server
    Logout,
    /// Show current login status
    Whoami,
    /// Show reachable views, or where a path leads
    Nav {
        path: Option<String>,
    },
    /// Totals and recent schedules
    Dashboard,
    /// Installation schedules
    Schedules {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// User management (admin only)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// List customers
    Customers,
    /// List equipment
    Equipment {
        #[arg(long)]
        status: Option<EquipmentStatus>,
    },
    /// List technicians
    Technicians,
    /// Schedule statistics
    Reports,
    /// Download all schedules
    Export {
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Defaults to the name suggested by the server
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ScheduleStatus>,
    },
    Create {
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "")]
        customer: String,
        #[arg(long, default_value = "")]
        technician: String,
        #[arg(long, default_value = "")]
        equipment: String,
        #[arg(long)]
        observations: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, default_value = "")]
        password: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (server, timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Config { action } = cli.command {
        return handle_config_command(action);
    }

    let config = config::Config::load().unwrap_or_default();
    let server = cli.server.unwrap_or_else(|| config.server());
    let timeout = cli.timeout.map(Duration::from_secs).unwrap_or_else(|| config.timeout());
    let api = ApiClient::new(&server, timeout)?;

    let mut session = SessionStore::new(FileSnapshotStore::new(config::Config::data_dir()?));
    session.restore();

    match run(cli.command, &api, &mut session).await {
        Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized(_))) => {
            // Token expired or revoked elsewhere
            session.discard()?;
            eprintln!("\x1b[33m🔐 Session expired.\x1b[0m");
            eprintln!("   Run '\x1b[1mtracker login\x1b[0m' to authenticate.");
            Ok(())
        }
        other => other,
    }
}

async fn run(command: Commands, api: &ApiClient, session: &mut Session) -> Result<()> {
    let auth = HttpAuthService::new(api.clone());

    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            auth::login(session, &auth, &email, &password).await
        }
        Commands::Logout => auth::logout(session, &auth).await,
        Commands::Whoami => auth::whoami(session, api).await,
        Commands::Nav { path } => {
            show_navigation(session, path.as_deref());
            Ok(())
        }
        Commands::Dashboard => match authorized(session, api, View::Dashboard) {
            Some(api) => views::dashboard(&api).await,
            None => Ok(()),
        },
        Commands::Schedules { action } => {
            let Some(api) = authorized(session, api, View::Schedules) else {
                return Ok(());
            };
            match action {
                ScheduleAction::List { search, status } => {
                    views::list_schedules(&api, &ScheduleQuery { search, status }).await
                }
                ScheduleAction::Create {
                    date,
                    time,
                    customer,
                    technician,
                    equipment,
                    observations,
                } => {
                    let time = time
                        .filter(|t| !t.trim().is_empty())
                        .map(|t| chrono::NaiveTime::parse_from_str(t.trim(), "%H:%M"))
                        .transpose()
                        .map_err(|_| anyhow::anyhow!("Time must be HH:MM"))?;
                    let schedule = NewSchedule {
                        date,
                        time,
                        customer_id: customer,
                        technician_id: technician,
                        equipment_id: equipment,
                        observations: shared::validate::non_blank(observations),
                    };
                    views::create_schedule(&api, schedule).await
                }
            }
        }
        Commands::Users { action } => {
            let Some(api) = authorized(session, api, View::Users) else {
                return Ok(());
            };
            match action {
                UserAction::List { search, role } => views::list_users(&api, &UserQuery { search, role }).await,
                UserAction::Create {
                    name,
                    email,
                    phone,
                    role,
                    password,
                } => {
                    let user = NewUser {
                        name,
                        email,
                        phone: shared::validate::non_blank(phone),
                        role,
                        password,
                    };
                    views::create_user(&api, user).await
                }
            }
        }
        Commands::Customers => match authorized(session, api, View::Schedules) {
            Some(api) => views::customers(&api).await,
            None => Ok(()),
        },
        Commands::Equipment { status } => match authorized(session, api, View::Schedules) {
            Some(api) => views::equipment(&api, status).await,
            None => Ok(()),
        },
        Commands::Technicians => match authorized(session, api, View::Schedules) {
            Some(api) => views::technicians(&api).await,
            None => Ok(()),
        },
        Commands::Reports => match authorized(session, api, View::Reports) {
            Some(api) => views::report(&api).await,
            None => Ok(()),
        },
        Commands::Export { format, output } => match authorized(session, api, View::Reports) {
            Some(api) => views::export(&api, format, output).await,
            None => Ok(()),
        },
        Commands::Config { action } => handle_config_command(action),
    }
}

/// Client for `view` when the session may reach it; explains why not otherwise
fn authorized(session: &Session, api: &ApiClient, view: View) -> Option<ApiClient> {
    let resolved = session.resolve(view.path());
    match (resolved, session.token()) {
        (View::Login, _) | (_, None) => {
            eprintln!("\x1b[33m🔐 Not logged in.\x1b[0m");
            eprintln!("   Run '\x1b[1mtracker login\x1b[0m' to authenticate.");
            None
        }
        (resolved, Some(token)) if resolved == view => Some(api.with_token(token)),
        (resolved, _) => {
            eprintln!("\x1b[31m✗ {}\x1b[0m", resolved.label());
            None
        }
    }
}

fn show_navigation(session: &Session, path: Option<&str>) {
    match session.current() {
        Some(user) => println!("{} · {}", user.name, user.role.label()),
        None => println!("\x1b[33m✗ Not logged in\x1b[0m"),
    }
    for item in session.navigation() {
        println!("  {:<14} {}", item.label, item.path);
    }
    if let Some(path) = path {
        let view = session.resolve(path);
        println!("{} → {} ({})", path, view.label(), view.path());
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = config::Config::load().unwrap_or_default();
            config.set(&key, value)?;
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = config::Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Show => {
            let config = config::Config::load()?;
            println!("server: {}", config.server());
            println!("timeout_secs: {}", config.timeout().as_secs());
        }
        ConfigAction::Path => {
            let path = config::Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

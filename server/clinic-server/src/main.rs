use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::{
    field::RecordFields,
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

use clinic_server::{create_app, ClinicConfig, ClinicServer};
use database_layer::models::{Role, User};
use database_layer::{DatabasePool, PoolOptions};

/// AfyaCare clinic HTTP server
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(about = "Role-scoped clinic management API server")]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "clinic-server.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve(ServeArgs),
    /// Apply pending database migrations and exit
    Migrate,
    /// Print a bearer token for an existing user
    IssueToken {
        #[arg(long)]
        user_id: Uuid,
    },
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// Server bind address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Server port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep every record in memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose)?;

    let config = ClinicConfig::load(&args.config)?;
    match args.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(serve_args) => serve(config, serve_args).await,
        Command::Migrate => migrate(&config).await,
        Command::IssueToken { user_id } => issue_token(config, user_id).await,
    }
}

async fn serve(mut config: ClinicConfig, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("🏥 {}", "Starting AfyaCare clinic server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("🌐 Bind address: {}", config.bind_address().bright_yellow());

    if config.uses_development_secret() {
        warn!("auth.jwt_secret is the development default; set CLINIC__AUTH__JWT_SECRET before deploying");
    }

    let server = if args.in_memory {
        let server = ClinicServer::in_memory(config);
        seed_admin(&server).await?;
        server
    } else {
        ClinicServer::connect(config).await?
    };

    let addr = server.config.bind_address();
    let database = server.database.clone();
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("🚀 {}", format!("Clinic server running on http://{addr}").bright_green());
    info!("📋 {}", format!("Health check available at: http://{addr}/health").bright_blue());
    info!("📋 {}", format!("API v1 available at: http://{addr}/api/v1").bright_blue());
    info!("📖 {}", format!("API docs available at: http://{addr}/docs").bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(pool) = database {
        pool.close().await;
    }
    info!("Clinic server stopped");
    Ok(())
}

/// In-memory runs start empty; an admin account makes the API reachable.
async fn seed_admin(server: &ClinicServer) -> Result<()> {
    let admin = server
        .repos
        .users
        .insert(User::new("admin", Role::Admin))
        .await?;
    let token = server.jwt.issue(&admin).context("Failed to issue admin token")?;

    warn!("Running with in-memory storage; records are lost on shutdown");
    info!(user_id = %admin.id, "🔑 Seeded admin account");
    info!("🔑 Admin token: {}", token.bright_white());
    Ok(())
}

async fn migrate(config: &ClinicConfig) -> Result<()> {
    let options = PoolOptions {
        max_connections: 1,
        ..PoolOptions::default()
    };
    let pool = DatabasePool::new(&config.database.url, &options).await?;
    pool.migrate().await?;
    pool.close().await;
    info!("✅ {}", "Schema is up to date".bright_green());
    Ok(())
}

async fn issue_token(config: ClinicConfig, user_id: Uuid) -> Result<()> {
    let server = ClinicServer::connect(config).await?;
    let user = server
        .repos
        .users
        .get(user_id)
        .await?
        .with_context(|| format!("No user with id {user_id}"))?;
    let token = server.jwt.issue(&user).context("Failed to issue token")?;

    println!("{token}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let is_development =
        env::var("CLINIC_ENV").unwrap_or_else(|_| "development".to_string()) == "development";
    let use_colors = env::var("NO_COLOR").is_err() && atty::is(atty::Stream::Stdout);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clinic_server={level},database_layer={level},auth_policy={level},tower_http=info,sqlx=warn").into()
    });

    if is_development && use_colors {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .event_format(ColoredFormatter)
                    .fmt_fields(ColoredFieldFormatter),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;

        print_startup_banner();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(())
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                      🏥 AFYACARE CLINIC                      ║".bright_cyan());
    println!("{}", "║        Patients · Appointments · Billing · Ward Care         ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

// Development log lines: time, level, module, message, fields
struct ColoredFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ColoredFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        write!(writer, "{} ", chrono::Utc::now().format("%H:%M:%S%.3f").to_string().bright_black())?;

        let level = match *metadata.level() {
            Level::TRACE => "TRACE".bright_purple(),
            Level::DEBUG => "DEBUG".bright_blue(),
            Level::INFO => " INFO".bright_green(),
            Level::WARN => " WARN".bright_yellow(),
            Level::ERROR => "ERROR".bright_red(),
        };
        write!(writer, "[{level}] ")?;

        if let Some(target) = metadata.target().rsplit("::").next() {
            write!(writer, "{:<15} ", target.bright_cyan())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;

        if metadata.level() <= &Level::DEBUG {
            if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
                let file_short = file.rsplit('/').next().unwrap_or(file);
                write!(writer, " {}", format!("({file_short}:{line})").bright_black())?;
            }
        }

        writeln!(writer)
    }
}

struct ColoredFieldFormatter;

impl<'a> FormatFields<'a> for ColoredFieldFormatter {
    fn format_fields<R: RecordFields>(
        &self,
        writer: tracing_subscriber::fmt::format::Writer<'_>,
        fields: R,
    ) -> std::fmt::Result {
        let mut visitor = ColoredFieldVisitor { writer, is_first: true };
        fields.record(&mut visitor);
        Ok(())
    }
}

struct ColoredFieldVisitor<'a> {
    writer: tracing_subscriber::fmt::format::Writer<'a>,
    is_first: bool,
}

impl ColoredFieldVisitor<'_> {
    fn write_field(&mut self, name: &str, value: &str) {
        if name == "message" {
            let _ = write!(self.writer, "{}", value.white().bold());
        } else {
            let separator = if self.is_first { "" } else { " " };
            let _ = write!(self.writer, "{separator}{}={}", name.bright_yellow(), value.bright_white());
        }
        self.is_first = false;
    }
}

impl tracing::field::Visit for ColoredFieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.write_field(field.name(), &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.write_field(field.name(), value);
    }
}

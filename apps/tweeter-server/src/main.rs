use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tweets::TweetsModule;
use url::Url;
use users::{UsersConfig, UsersModule};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNS: u32 = 10;
/// Effectively forever; sea-orm falls back to sqlx's finite defaults when unset.
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Tweeter Server - a minimal social posting backend
#[derive(Parser)]
#[command(name = "tweeter-server")]
#[command(about = "Tweeter Server - a minimal social posting backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", redacted(&config).to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Tweeter Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
    }
}

/// Typed module sections, validated up front so bad config fails before any I/O.
struct ModuleConfigs {
    ingress: ApiIngressConfig,
    users: UsersConfig,
}

fn module_configs(config: &AppConfig) -> Result<ModuleConfigs> {
    let ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    let users: UsersConfig = config.module_config("users")?;
    users.validate()?;
    Ok(ModuleConfigs { ingress, users })
}

/// Copy of the config that is safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut out = config.clone();
    if let Some(secret) = out
        .modules
        .get_mut("users")
        .and_then(|users| users.get_mut("token_secret"))
    {
        if secret.as_str().is_some_and(|s| !s.is_empty()) {
            *secret = serde_json::Value::from("<redacted>");
        }
    }
    out
}

/// Detect DB backend from URL scheme. Only backends compiled into sea-orm are accepted.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_database(config: &AppConfig, mock: bool) -> Result<DatabaseConnection> {
    let (dsn, backend, max_conns) = if mock {
        (MEMORY_DSN.to_string(), "sqlite", 1)
    } else {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("No database configuration found"))?;
        let backend = detect_from_dsn(db_config)?;

        // Absolutize sqlite DSNs to avoid cwd issues
        let dsn = if backend == "sqlite" {
            absolutize_sqlite_dsn(db_config.url.trim(), Path::new(&config.server.home_dir), true)?
        } else {
            db_config.url.trim().to_owned()
        };

        // Every pooled connection would get its own empty in-memory database.
        let max_conns = if dsn == MEMORY_DSN {
            1
        } else {
            db_config.max_conns.unwrap_or(DEFAULT_MAX_CONNS)
        };
        (dsn, backend, max_conns)
    };

    let opts = pool_options(dsn, max_conns);

    tracing::info!(backend, max_conns, mock, "Connecting to database");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {backend} database"))?;
    tracing::info!("Connected DB backend: {}", backend);
    Ok(db)
}

/// Pool settings for a DSN. An in-memory database lives only as long as its single
/// connection, so that connection is pinned open instead of being reaped and replaced.
fn pool_options(dsn: String, max_conns: u32) -> ConnectOptions {
    let memory = dsn == MEMORY_DSN;
    let mut opts = ConnectOptions::new(dsn);
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if memory {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME);
    }
    opts
}

async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Invalid bind address {host}:{port}"))?
        .next()
        .ok_or_else(|| anyhow!("Bind address {host}:{port} resolved to nothing"))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let modules = module_configs(&config)?;
    let addr = resolve_bind_addr(&config.server.host, config.server.port).await?;
    let db = connect_database(&config, args.mock).await?;

    tracing::info!("Initializing modules...");
    let users = UsersModule::new();
    let tweets = TweetsModule::new();

    users.migrate(&db).await?;
    tweets.migrate(&db).await?;

    users.init(db.clone(), modules.users)?;
    tweets.init(db, users.client()?)?;

    let routes = users.register_rest(axum::Router::new())?;
    let routes = tweets.register_rest(routes, users.auth_gate()?)?;

    let mut openapi = UsersModule::openapi();
    openapi.merge(TweetsModule::openapi());
    openapi.info.title = "Tweeter API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

    let ingress = ApiIngress::new(modules.ingress);
    let app = ingress.build_router(routes, Some(openapi))?;

    ingress
        .serve(addr, app, async {
            if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "shutdown signal listener failed");
            }
        })
        .await?;

    tracing::info!("Tweeter Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    module_configs(config)?;
    if !args.mock {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("No database configuration found"))?;
        let backend = detect_from_dsn(db_config)?;
        tracing::info!(backend, "Database DSN accepted");
    }

    tracing::info!("Configuration is valid");
    println!("Configuration is valid");
    println!("{}", redacted(config).to_yaml()?);
    Ok(())
}

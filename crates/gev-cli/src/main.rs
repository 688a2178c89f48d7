use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gev")]
#[command(about = "Gas price / EV registration monthly reconciliation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: ingest, reconcile, write artifacts, persist.
    Run {
        /// Layered config paths in merge order (base -> overrides)
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Database commands
    Db {
        /// SQLite URL; falls back to GEV_DATABASE_URL
        #[arg(long, global = true)]
        url: Option<String>,

        #[command(subcommand)]
        cmd: DbCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations.
    Migrate,

    /// Print persisted merged rows, ascending by period.
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Run { config_paths } => commands::run::run(&config_paths).await?,

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = gev_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Db { url, cmd } => {
            let pool = commands::db::connect(url.as_deref()).await?;
            match cmd {
                DbCmd::Status => commands::db::status(&pool).await?,
                DbCmd::Migrate => {
                    gev_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
                DbCmd::Show => commands::db::show(&pool).await?,
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so stdout stays key=value only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

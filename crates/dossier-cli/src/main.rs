use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dossier_config::DossierConfig;
use dossier_core::{AgentStore, CodenameGenerator};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "dossier", version, about = "Dossier - secret agent registry")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// API key clients must send as a bearer token
        #[arg(long, env = "DOSSIER_API_KEY")]
        api_key: Option<String>,
    },
    /// List agents
    Ls {
        /// Only codenames containing this text (case-insensitive)
        #[arg(short, long)]
        query: Option<String>,
        /// Only agents with this access level
        #[arg(short, long)]
        level: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a new agent: CODENAME CONTACT EMAIL, or CONTACT EMAIL with --generate
    Add {
        /// Codename (unless --generate), contact number, email
        #[arg(num_args = 2..=3, value_names = ["CODENAME", "CONTACT", "EMAIL"])]
        values: Vec<String>,
        /// Pick a random unused codename
        #[arg(short, long)]
        generate: bool,
        /// Access level (defaults to Secret)
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Show one agent's dossier
    Show {
        /// Agent id
        id: i64,
    },
    /// Change an agent; fields left out keep their current values
    Edit {
        /// Agent id
        id: i64,
        #[arg(long)]
        codename: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Remove an agent
    Rm {
        /// Agent id
        id: i64,
    },
    /// Remove every agent
    Nuke,
    /// Suggest a codename that is not taken yet
    Codename {
        /// Uniqueness checks before settling for an unchecked name
        #[arg(short, long)]
        attempts: Option<usize>,
    },
    /// Show effective configuration
    Config,
}

fn find_config() -> Option<PathBuf> {
    // 1. DOSSIER_CONFIG environment variable
    if let Ok(path) = std::env::var("DOSSIER_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. dossier.yaml in current directory
    let cwd_config = PathBuf::from("dossier.yaml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. ~/.config/dossier/config.yaml
    if let Some(home) = dirs_next::home_dir() {
        let home_config = home.join(".config/dossier/config.yaml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

fn load_config(cli: &Cli) -> Result<DossierConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config.clone().or_else(find_config) {
        Some(path) => DossierConfig::from_file(&path)?,
        None => DossierConfig::default(),
    };

    if let Some(db) = &cli.db {
        config.database.path = db.to_string_lossy().into_owned();
        config.database.in_memory = false;
    }

    config.validate_or_err()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    logging::init(&config.logging)?;
    tracing::debug!(database = %config.database.path, "configuration loaded");

    let open_store = || AgentStore::from_config(&config.database);
    let generator = CodenameGenerator::new(config.codename.max_attempts);

    // Execute command
    match cli.command {
        Commands::Serve {
            host,
            port,
            api_key,
        } => {
            commands::serve::run(open_store()?, &config, host, port, api_key).await?;
        }
        Commands::Ls { query, level, json } => {
            commands::ls::run(&open_store()?, query, level, json)?;
        }
        Commands::Add {
            values,
            generate,
            level,
        } => {
            commands::add::run(&open_store()?, generator, values, generate, level)?;
        }
        Commands::Show { id } => {
            commands::show::run(&open_store()?, id)?;
        }
        Commands::Edit {
            id,
            codename,
            contact,
            email,
            level,
        } => {
            let changes = commands::edit::Changes {
                codename,
                contact_number: contact,
                email,
                access_level: level,
            };
            commands::edit::run(&open_store()?, id, changes)?;
        }
        Commands::Rm { id } => {
            commands::rm::run(&open_store()?, id)?;
        }
        Commands::Nuke => {
            commands::nuke::run(&open_store()?)?;
        }
        Commands::Codename { attempts } => {
            let generator = attempts.map(CodenameGenerator::new).unwrap_or(generator);
            commands::codename::run(&open_store()?, generator)?;
        }
        Commands::Config => {
            commands::config::run(&config)?;
        }
    }

    Ok(())
}

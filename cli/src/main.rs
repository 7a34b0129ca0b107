mod load;
mod search;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder recipe catalog tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a recipe spreadsheet into the Postgres catalog
    Load {
        /// Table to load (xlsx, xls, ods, csv, tsv or json)
        path: PathBuf,
        /// Remove existing recipes first (bookmarks are kept)
        #[arg(long)]
        replace: bool,
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: String,
    },
    /// Show which column feeds each recipe field
    Columns {
        path: PathBuf,
    },
    /// Rank recipes against a set of ingredients
    Search {
        /// Ingredient on hand (repeatable)
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Required tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Search a table loaded into memory instead of Postgres
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,
    },
    /// Print one recipe from the Postgres catalog as JSON
    Show {
        id: i64,
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: String,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            path,
            replace,
            database_url,
        } => {
            load::load(&path, replace, &database_url)?;
        }
        Commands::Columns { path } => {
            load::columns(&path)?;
        }
        Commands::Search {
            ingredients,
            tags,
            limit,
            file,
            database_url,
        } => {
            search::search(
                &ingredients,
                &tags,
                limit,
                file.as_deref(),
                database_url.as_deref(),
            )?;
        }
        Commands::Show { id, database_url } => {
            search::show(id, &database_url)?;
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Phonebook CLI - browse and edit contacts on the phonebook service", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    login: LoginArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, env = "PHONEBOOK_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "PHONEBOOK_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of records
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Field to sort by
        #[arg(long)]
        sort_by: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Field filter, repeatable (e.g. --filter city=Almaty)
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
    /// Create a record
    Create {
        /// Field value, repeatable (e.g. --field phone=+77001234567)
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Replace a record
    Update {
        id: i64,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Delete a record
    Delete { id: i64 },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let app = commands::connect(cli.config.as_deref(), &cli.login).await?;

    match cli.command {
        Commands::List {
            page,
            sort_by,
            desc,
            filters,
        } => commands::records::list(&app, page, sort_by, desc, &filters).await?,
        Commands::Create { fields } => commands::records::create(&app, &fields).await?,
        Commands::Update { id, fields } => commands::records::update(&app, id, &fields).await?,
        Commands::Delete { id } => commands::records::delete(&app, id).await?,
    }

    Ok(())
}

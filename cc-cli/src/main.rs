//! cc-cli - ClosetClear wardrobe manager
//!
//! Signs in against the backend, manages clothing items and outfits, and
//! asks the cc-ai service for item analysis, outfit ideas and wardrobe
//! insights. The session token is kept in the data folder so successive
//! runs stay signed in.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cc_cli::ai_client::AiClient;
use cc_cli::session::SessionStore;
use cc_cli::sort::ClosetSort;
use cc_common::ai_types::Disposition;
use cc_common::config::{default_config_path, read_toml_config, ConfigResolver};
use cc_common::models::{Category, Color, Season, Size};
use cc_store::{PocketBase, StoreError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cc-cli")]
#[command(about = "ClosetClear wardrobe manager")]
#[command(version)]
struct Cli {
    /// Backend URL (overrides CLOSETCLEAR_BACKEND_URL / POCKETBASE_URL and the config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// AI service URL (overrides CLOSETCLEAR_AI_URL and the config file)
    #[arg(long, global = true)]
    ai_url: Option<String>,

    /// Folder holding the session file
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    /// Config file (default: <config dir>/closetclear/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CLOSETCLEAR_PASSWORD")]
        password: Option<String>,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, env = "CLOSETCLEAR_PASSWORD")]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Email a password-reset link
    ResetPassword { email: String },
    /// Wardrobe summary
    Dashboard,
    /// Browse the closet
    List {
        /// Matches name, brand, category and color
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        color: Option<Color>,
        #[arg(long)]
        season: Option<Season>,
        #[arg(long, value_enum, default_value_t = ClosetSort::Newest)]
        sort: ClosetSort,
    },
    /// Show one item
    Show { id: String },
    /// Add an item
    Add(AddArgs),
    /// Record that an item was worn today
    Wear { id: String },
    /// Change an item's details
    Edit(EditArgs),
    /// Delete an item
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print item changes as they happen
    Watch,
    /// Outfit ideas built around one item
    Suggest {
        id: String,
        #[arg(short, long)]
        occasion: Option<String>,
        /// Save the Nth suggestion as an outfit
        #[arg(long)]
        save: Option<usize>,
    },
    /// Saved outfits
    Outfits {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Keep / donate / sell review of the whole wardrobe
    Insights {
        #[arg(long, value_enum)]
        filter: Option<DecisionFilter>,
    },
}

#[derive(Args, Debug, Default)]
struct AddArgs {
    /// Item name (may come from --analyze)
    name: Option<String>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    color: Option<Color>,
    #[arg(long)]
    size: Option<Size>,
    #[arg(long)]
    season: Option<Season>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated
    #[arg(long)]
    tags: Option<String>,
    /// Photo to upload
    #[arg(long)]
    image: Option<PathBuf>,
    /// Fill missing fields from an AI analysis of the photo
    #[arg(long, requires = "image")]
    analyze: bool,
}

#[derive(Args, Debug, Default)]
struct EditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    color: Option<Color>,
    #[arg(long)]
    size: Option<Size>,
    #[arg(long)]
    season: Option<Season>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated; replaces the existing tags
    #[arg(long)]
    tags: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecisionFilter {
    Keep,
    Donate,
    Sell,
}

impl From<DecisionFilter> for Disposition {
    fn from(filter: DecisionFilter) -> Self {
        match filter {
            DecisionFilter::Keep => Disposition::Keep,
            DecisionFilter::Donate => Disposition::Donate,
            DecisionFilter::Sell => Disposition::Sell,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let (toml_config, config_load) = read_toml_config(config_path.as_deref());
    let resolver = ConfigResolver::new(toml_config);

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cc_cli={0},cc_store={0},cc_common={0}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    config_load.report();

    let backend_url = resolver.backend_url(cli.backend_url.as_deref());
    let ai_url = resolver.ai_service_url(cli.ai_url.as_deref());
    let data_folder = resolver.data_folder(cli.data_folder.as_deref());
    debug!(backend = %backend_url, ai = %ai_url, data = %data_folder.display(), "Resolved configuration");

    let pb = PocketBase::new(backend_url).context("Failed to create backend client")?;
    let session = SessionStore::in_folder(&data_folder);
    if let Some(state) = session.load() {
        if state.is_valid() {
            pb.set_auth(state);
        } else {
            info!("Saved session expired");
            session.clear().context("Failed to clear expired session")?;
        }
    }
    let auth_before = pb.auth_state();

    let ctx = commands::Context {
        pb,
        ai: AiClient::new(ai_url),
    };
    let result = commands::run(&ctx, cli.command).await;

    let auth_after = ctx.pb.auth_state();
    if auth_after != auth_before {
        session.sync(&auth_after).context("Failed to save session")?;
    }

    result.map_err(explain)
}

/// Friendlier wording for the errors users hit most
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::NotAuthenticated) => {
            anyhow::anyhow!("Not signed in. Run `cc-cli login <email>` first.")
        }
        Some(e) if e.status() == Some(401) || e.status() == Some(403) => {
            anyhow::anyhow!("Session rejected by the backend. Sign in again with `cc-cli login <email>`.")
        }
        _ => err,
    }
}

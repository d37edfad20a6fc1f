use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "trk")]
#[command(about = "Storefront order tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track an order live: fetch it, follow push updates, re-render on
    /// every change until Ctrl-C
    Track {
        #[arg(long)]
        order_id: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Fetch an order once and render it. Exits non-zero on failure.
    Fetch {
        #[arg(long)]
        order_id: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the timeline colour for a status label
    StatusColor { status: String },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (defaults -> env -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// Where to fetch from and how to render.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Layered config paths in merge order. Built-in defaults when omitted.
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// Overrides api.base_url (and TRK_API_BASE_URL)
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Overrides push.url (and TRK_PUSH_URL)
    #[arg(long)]
    pub push_url: Option<String>,

    /// Plain output even when display.ansi_colors is set
    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing file is fine.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Track { order_id, source } => commands::track::run(&order_id, &source).await,
        Commands::Fetch { order_id, source } => commands::fetch::run(&order_id, &source).await,
        Commands::StatusColor { status } => {
            let color = trk_timeline::status_color(&status);
            println!("color={} hex={}", color.name(), color.hex());
            Ok(())
        }
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = trk_config::load_layered_yaml(&path_refs)?;
            let report = trk_config::report_unused_keys(
                &loaded.config_json,
                trk_config::UnusedKeyPolicy::Warn,
            )?;
            println!("config_hash={}", loaded.config_hash);
            if !report.is_clean() {
                println!("unused_keys={}", report.unused_leaf_pointers.join(","));
            }
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout carries only the rendered panel.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

use addonarc_cli::{commands, CliContext, CliDeletedFilter};
use addonarc_pipeline::CatalogEndpoints;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about = "Archives every published add-on and keeps its history")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(
        long,
        global = true,
        env = "ADDONARC_DATA_DIR",
        default_value = addonarc_config::DEFAULT_DATA_DIR
    )]
    data_dir: Utf8PathBuf,
    #[arg(
        long,
        global = true,
        env = "ADDONARC_CATALOG_URL",
        default_value = addonarc_config::DEFAULT_CATALOG_URL
    )]
    catalog_url: String,
    #[arg(
        long,
        global = true,
        env = "ADDONARC_DOWNLOAD_URL",
        default_value = addonarc_config::DEFAULT_DOWNLOAD_URL_TEMPLATE,
        help = "Jar URL template, {uuid} is substituted"
    )]
    download_url: String,
    #[arg(
        long,
        global = true,
        env = "ADDONARC_ICON_URL",
        default_value = addonarc_config::DEFAULT_ICON_URL_TEMPLATE,
        help = "Icon URL template, {uuid} is substituted"
    )]
    icon_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog, download new/updated add-ons and save the archive
    Update,
    /// Show what `update` would change without downloading or saving
    Check,
    /// Print archived add-ons grouped by version
    List {
        #[arg(long, help = "Only this version bucket")]
        version: Option<String>,
        #[arg(long, value_enum, default_value_t = CliDeletedFilter::Include)]
        deleted: CliDeletedFilter,
    },
    /// Print every archived record carrying this uuid
    Show { uuid: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = CliContext {
        data_dir: cli.data_dir,
        endpoints: CatalogEndpoints {
            catalog_url: cli.catalog_url,
            download_url_template: cli.download_url,
            icon_url_template: cli.icon_url,
        },
    };

    match cli.command {
        Commands::Update => {
            commands::cmd_update(&ctx).await?;
        }
        Commands::Check => {
            commands::cmd_check(&ctx).await?;
        }
        Commands::List { version, deleted } => {
            commands::cmd_list(&ctx, version.as_deref(), deleted)?
        }
        Commands::Show { uuid } => commands::cmd_show(&ctx, &uuid)?,
    }

    Ok(())
}

//! Quotation Server - entry point

use anyhow::Result;
use clap::Parser;
use quotation_server::settings::DEFAULT_SETTINGS_FILE;
use quotation_server::{start_server, ServerSettings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "quotation-server", version, about = "Quotation document server")]
struct Cli {
    /// Port to listen on
    port: Option<u16>,

    /// Settings file path
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Word template to fill
    #[arg(short, long, env = "QUOTATION_TEMPLATE")]
    template: Option<PathBuf>,

    /// Directory for generated quotations
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory with the web form
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    /// Command line values take precedence over the settings file
    fn apply(self, mut settings: ServerSettings) -> ServerSettings {
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(template) = self.template {
            settings.template = template;
        }
        if let Some(output_dir) = self.output_dir {
            settings.output_dir = output_dir;
        }
        if self.static_dir.is_some() {
            settings.static_dir = self.static_dir;
        }
        settings
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = ServerSettings::load(&cli.config)?;
    let settings = cli.apply(settings);
    tracing::info!("Starting quotation server v{}", env!("CARGO_PKG_VERSION"));

    start_server(settings).await
}

//! Quotation Server - HTTP endpoint for quotation documents
//!
//! Accepts quotation data as JSON, fills the Word template and serves the
//! generated file for download.
//!
//! | Route | |
//! |---|---|
//! | `POST /generate-quotation` | generate a quotation, returns its file name |
//! | `GET /download/:filename` | download a generated quotation |
//! | `GET /health` | liveness check |

pub mod error;
pub mod handlers;
pub mod settings;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use docx_template::{list_controls, DocxPackage, XmlDocument};
use quotation::{ControlMap, QuotationGenerator};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::AppError;
pub use settings::ServerSettings;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ServerSettings>,
    pub generator: Arc<QuotationGenerator>,
}

impl AppState {
    /// Build the state, loading the control mapping file if one is set
    pub fn new(settings: ServerSettings) -> quotation::Result<Self> {
        let generator = QuotationGenerator::new(settings.generator_options()?);
        Ok(Self {
            settings: Arc::new(settings),
            generator: Arc::new(generator),
        })
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let static_dir = state.settings.static_dir.clone();

    let mut router = Router::new()
        .route("/generate-quotation", post(handlers::generate_quotation))
        .route("/download/:filename", get(handlers::download))
        .route("/health", get(handlers::health))
        .with_state(state);

    if let Some(dir) = static_dir {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Log the template's content controls that have no binding
///
/// A missing or unreadable template is only warned about: the server still
/// starts and requests fail until the file is in place.
pub fn check_template(settings: &ServerSettings, controls: &ControlMap) {
    let package = match DocxPackage::open(&settings.template) {
        Ok(package) => package,
        Err(e) => {
            tracing::warn!("Template {} not usable: {}", settings.template.display(), e);
            return;
        }
    };

    let mut total = 0;
    let mut unbound: Vec<String> = Vec::new();
    for part in package.fillable_parts() {
        let Ok(doc) = package
            .part_as_string(&part)
            .and_then(|xml| XmlDocument::parse(&xml))
        else {
            continue;
        };
        for control in list_controls(&doc) {
            total += 1;
            if controls.lookup(&control.name).is_none() && !unbound.contains(&control.name) {
                unbound.push(control.name);
            }
        }
    }

    info!(
        "Template {} has {} content controls",
        settings.template.display(),
        total
    );
    if !unbound.is_empty() {
        tracing::warn!("Controls without a binding: {}", unbound.join(", "));
    }
}

/// Start the quotation server and run until Ctrl+C
pub async fn start_server(settings: ServerSettings) -> Result<()> {
    let state = AppState::new(settings)?;
    check_template(&state.settings, &state.generator.options().controls);

    let addr = state.settings.socket_addr();
    info!("Starting quotation server on {}", addr);
    info!(
        "Template: {}, output directory: {}",
        state.settings.template.display(),
        state.settings.output_dir.display()
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

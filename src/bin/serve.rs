//! HTTP shell around the generation pipeline: accepts a multipart WSDL
//! upload plus free-text requirements and streams back the generated
//! SoapUI project as a downloadable XML attachment. Producing a document
//! is the contract; any failure answers a minimal XML error stub.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use wsdl2soapui::core::ConfigProvider;
use wsdl2soapui::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use wsdl2soapui::utils::{error::Result, logger};
use wsdl2soapui::{GeneratorEngine, TestGenPipeline};

const ERROR_STUB: &str = "<error>No XML generated</error>";

#[derive(Debug, Clone, Parser)]
#[command(name = "serve")]
#[command(about = "HTTP API for generating SoapUI test projects from WSDL uploads")]
struct ServeConfig {
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: String,

    #[arg(long, default_value = "http://localhost:11434")]
    ollama_url: String,

    #[arg(long, default_value = "mistral")]
    model: String,

    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

impl ConfigProvider for ServeConfig {
    fn ollama_base_url(&self) -> &str {
        &self.ollama_url
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn output_path(&self) -> &str {
        "./output"
    }
}

impl Validate for ServeConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("listen", &self.listen)?;
        validate_url("ollama_url", &self.ollama_url)?;
        validate_non_empty_string("model", &self.model)?;
        validate_positive_number("timeout_secs", self.timeout_secs, 1)?;
        Ok(())
    }
}

type SharedEngine = Arc<GeneratorEngine<TestGenPipeline>>;

async fn health() -> &'static str {
    "ok"
}

async fn generate_project(
    State(engine): State<SharedEngine>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut wsdl_text: Option<String> = None;
    let mut user_input = String::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("wsdl_file") => {
                wsdl_text = field.text().await.ok();
            }
            Some("user_input") => {
                user_input = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    let document = match wsdl_text {
        Some(wsdl_text) => match engine.run(&wsdl_text, &user_input).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Project generation failed: {}", e);
                ERROR_STUB.to_string()
            }
        },
        None => {
            tracing::warn!("Upload request without a wsdl_file part");
            ERROR_STUB.to_string()
        }
    };

    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=soapui-project.xml",
            ),
        ],
        document,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServeConfig::parse();

    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let engine: SharedEngine = Arc::new(GeneratorEngine::new(TestGenPipeline::new(&config)));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/generate-soapui-project", post(generate_project))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(engine);

    tracing::info!("serve listening on {}", config.listen);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

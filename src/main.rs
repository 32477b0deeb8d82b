use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};

use contentgen::config::AppConfig;
use contentgen::core::generation::{
    ContentPipeline, ErrorKind, GenerationRequest, InboundRequest, OutboundResponse,
};
use contentgen::core::logging::{self, GenerationReport};

#[derive(Parser, Debug)]
#[command(
    name = "contentgen",
    version,
    about = "Generate a structured document from a short content request"
)]
struct Cli {
    /// Content type (article, guide, tutorial, landing_page, faq, checklist, comparison).
    #[arg(long = "type", value_name = "TYPE")]
    content_type: Option<String>,

    /// What the document is about.
    #[arg(long)]
    topic: Option<String>,

    /// Desired length from 0 (very brief) to 100 (extensive).
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=100))]
    length: Option<i64>,

    /// Ground the content in web research.
    #[arg(long)]
    research: bool,

    /// Cross-check multiple sources (implies --research).
    #[arg(long)]
    deep_research: bool,

    /// Read an inbound JSON request from a file, or `-` for stdin. Overrides the flags above.
    #[arg(long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// Model override.
    #[arg(long, env = "CONTENTGEN_MODEL")]
    model: Option<String>,

    /// Config file (defaults to the XDG config location).
    #[arg(long, env = "CONTENTGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter override (e.g. `debug`, `contentgen=trace`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn inbound_request(&self) -> miette::Result<InboundRequest> {
        if let Some(path) = &self.request {
            let raw = if path.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .into_diagnostic()
                    .wrap_err("Failed to read request from stdin")?;
                buf
            } else {
                std::fs::read_to_string(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to read request from {}", path.display()))?
            };
            return serde_json::from_str(&raw)
                .into_diagnostic()
                .wrap_err("Request is not a valid JSON object");
        }

        Ok(InboundRequest {
            content_type: self.content_type.clone(),
            topic: self.topic.clone(),
            include_web_research: self.research || self.deep_research,
            deep_research: self.deep_research,
            length: self.length,
        })
    }
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::MissingInput => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path).into_diagnostic()?,
        None => AppConfig::load(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let log_guard = logging::init(&config.logging);
    log::info!("{} v{} starting", contentgen::NAME, contentgen::VERSION);

    let inbound = cli.inbound_request()?;

    let mut provider_config = config.provider_config();
    if let Some(model) = &cli.model {
        provider_config.model = Some(model.clone());
    }
    let provider = provider_config
        .create_provider()
        .into_diagnostic()
        .wrap_err("Failed to configure the model provider")?;

    let pipeline = ContentPipeline::new(provider)
        .with_templates(Arc::new(config.template_registry()))
        .with_settings(config.generation.clone())
        .with_budget(config.budget.clone());

    let result = match GenerationRequest::try_from(inbound) {
        Ok(request) => pipeline.generate(&request).await,
        Err(failure) => Err(failure),
    };
    let report = result.as_ref().err().map(GenerationReport::from);

    let response = OutboundResponse::from(result);
    println!(
        "{}",
        serde_json::to_string_pretty(&response).into_diagnostic()?
    );

    if let Some(report) = report {
        let code = exit_code(report.kind);
        eprintln!("{:?}", miette::Report::new(report));
        drop(log_guard);
        std::process::exit(code);
    }

    Ok(())
}

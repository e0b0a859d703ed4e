//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into the service, run.
//! No business logic here.

use dotenv::dotenv;
use reddit_feedback::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use reddit_feedback::adapters::export::FsExporter;
use reddit_feedback::adapters::reddit::RedditGateway;
use reddit_feedback::ports::{AiPort, ExportPort, ForumGateway};
use reddit_feedback::shared::config::AppConfig;
use reddit_feedback::usecases::FeedbackService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load()?;
    let settings = cfg.pipeline_settings()?;
    info!(
        sources = ?settings.sources,
        posts_per_source = settings.posts_per_source,
        batch_size = settings.classifier.batch_size,
        max_retries = settings.classifier.max_retries,
        "configuration loaded"
    );

    // --- Reddit ---
    let Some(credentials) = cfg.reddit_credentials() else {
        anyhow::bail!(
            "Set REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_USERNAME and REDDIT_PASSWORD \
             (env or .env). Create a script app at https://www.reddit.com/prefs/apps"
        );
    };
    let forum: Arc<dyn ForumGateway> =
        Arc::new(RedditGateway::new(credentials, cfg.request_timeout())?);

    // --- AI ---
    let ai: Arc<dyn AiPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "AI classification enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
            cfg.request_timeout(),
        )?)
    } else {
        warn!("OPENAI_API_KEY not set, using mock AI adapter");
        Arc::new(MockAiAdapter::new())
    };

    // --- Export ---
    let paths = cfg.output_paths();
    let exporter: Arc<dyn ExportPort> =
        Arc::new(FsExporter::new(paths.export_path, paths.summary_path));

    let service = FeedbackService::new(forum, ai, exporter, settings);
    let stats = service.run().await?;

    if let Some(path) = &stats.export_path {
        println!("\nExported categorized comments to {}", path.display());
    }
    if let Some(path) = &stats.summary_path {
        println!("Summary written to {}", path.display());
    }
    if stats.failed_batches > 0 {
        warn!(
            failed_batches = stats.failed_batches,
            "some batches could not be classified; export is partial"
        );
    }

    Ok(())
}

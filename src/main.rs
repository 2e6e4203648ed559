use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use shastho_bondhu::api::app_routes;
use shastho_bondhu::channels::{NoopSender, SmsSender, TwilioSender};
use shastho_bondhu::config::AppConfig;
use shastho_bondhu::llm::create_provider;
use shastho_bondhu::service::TriageService;
use shastho_bondhu::store::Stores;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  export PERPLEXITY_API_KEY=pplx-...");
            std::process::exit(1);
        }
    };

    // Keep the guard alive so the file writer flushes on exit.
    let _log_guard = init_tracing(&config);

    eprintln!("🩺 ShasthoBondhu v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Data: {}", config.data_dir.display());
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    let llm = create_provider(&config.llm)?;

    let sms: Arc<dyn SmsSender> = match config.twilio.clone() {
        Some(twilio) => {
            eprintln!("   SMS: twilio ({})", twilio.from_number);
            Arc::new(TwilioSender::new(twilio))
        }
        None => {
            eprintln!("   SMS: disabled (replies are logged, not sent)");
            Arc::new(NoopSender)
        }
    };

    let stores = Stores::open(&config.data_dir);
    let service = Arc::new(TriageService::new(llm, sms, stores));
    let app = app_routes(service);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(port = config.port, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer().with_target(false);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "shastho-bondhu.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr)
                .init();
            None
        }
    }
}

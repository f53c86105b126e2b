use std::process::ExitCode;

use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

const SERVICE: &str = "movie_reviews";

/// Multi-thread runtime sized by `server.worker_threads`.
fn build_runtime(cfg: &AppConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    builder.build()
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(service = SERVICE, event = "signal_unavailable", error = %e, "Ctrl+C handler failed, stopping");
    }
    info!(service = SERVICE, event = "shutdown_signal", "draining connections");
}

fn main() -> ExitCode {
    // .env first so RUST_LOG and DATABASE_URL apply
    dotenv().ok();

    let (cfg, fallback) = match server::load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            common::utils::logging::init_logging(false);
            error!(service = SERVICE, event = "config_invalid", error = %e, "no usable configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);
    if let Some(reason) = fallback {
        warn!(service = SERVICE, event = "config_fallback", %reason, "config.toml unusable, using environment");
    }

    let instance = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = SERVICE, event = "panic", %instance, message = %info, "unhandled panic");
    }));

    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = SERVICE, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = SERVICE,
        event = "start",
        %instance,
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "movie catalog service starting"
    );

    match rt.block_on(server::run(cfg, ctrl_c())) {
        Ok(()) => {
            info!(service = SERVICE, event = "stop", %instance, "server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = SERVICE, event = "run_failed", error = %e, "server exited with an error");
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // Config decides the log format, so it is read before logging exists
    let cfg = match server::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "inventory", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "inventory",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "inventory", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "inventory",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        backend = ?cfg.database.backend,
        "inventory service starting"
    );

    match rt.block_on(server::serve(cfg, server::shutdown_signal())) {
        Ok(()) => {
            info!(service = "inventory", event = "stop", %service_id, pid, "inventory service stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "inventory", event = "run_failed", %service_id, error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

//! Native messaging host binary.
//!
//! Started by the browser with stdin/stdout connected to the extension.
//! Exits 0 when the browser closes the connection, 1 on a fatal error.

use std::process::ExitCode;

use c8y_session_host::logging::init_logging;
use c8y_session_host::{CredentialSource, HostConfig, MemorySource, NativeHostBuilder, OpCliSource};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (config, warnings) = HostConfig::from_env();
    init_logging(&config.log_level);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Starting session host (pid {})", std::process::id());
    tracing::debug!("Configuration: {:?}", config);

    let source: Box<dyn CredentialSource> = match &config.sessions_file {
        Some(path) => match MemorySource::from_json_file(path) {
            Ok(source) => Box::new(source),
            Err(e) => {
                tracing::error!("Failed to load sessions from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(OpCliSource::new(config.op_cli())),
    };

    let host = NativeHostBuilder::from_config(&config).build(source);

    match host.serve(tokio::io::stdin(), tokio::io::stdout()).await {
        Ok(()) => {
            tracing::info!("Browser closed the connection");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Session host stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

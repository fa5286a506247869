use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "users_api=debug,axum=info,tower_http=info";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter, `LOG_FORMAT=json` switches to
/// line-delimited JSON output.
pub fn init() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(env_filter))
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(env_filter))
            .init();
    }
}

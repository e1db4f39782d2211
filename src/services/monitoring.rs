// Error tracking with Sentry
use tracing::info;

/// Initialises Sentry when a DSN is configured.
///
/// The returned guard flushes pending events on drop and must be held for the
/// lifetime of the process.
pub fn init_error_tracking(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn.map(str::trim).filter(|d| !d.is_empty());
    let Some(dsn) = dsn else {
        info!("Sentry DSN not configured");
        return None;
    };

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(
                std::env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string())
                    .into(),
            ),
            traces_sample_rate: 0.0,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        info!("Sentry initialized successfully");
    }
    Some(guard)
}

use std::sync::Once;

/// Used when neither the config nor `RUST_LOG` names a filter. The graphics
/// stack is chatty at info level.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger setup for the demo binaries.
///
/// `filter` uses `env_logger` directive syntax, e.g.
/// `"prism_engine=debug,prism::gpu=trace"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Explicit filter, else `rust_log`, else [`DEFAULT_FILTER`].
    fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.filter
            .clone()
            .or(rust_log.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the `log` backend. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .try_init();

        // A test harness may have installed a logger already.
        match installed {
            Ok(()) => log::debug!("logging initialized ({filter})"),
            Err(err) => log::debug!("logger already installed: {err}"),
        }
    });
}

use crate::domain::error::TranslateError;
use crate::infrastructure::config::Logging;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Map the config's level name to an `EnvFilter` directive.
pub fn level_directive(level: &str) -> &'static str {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level.
pub fn init_logging(logging: &Logging) -> Result<(), TranslateError> {
    if !logging.enable {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&logging.level)));

    let installed = match logging.path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    installed.map_err(|e| TranslateError::Config(format!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_directives() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("verbose"), "warn");
    }

    #[test]
    fn disabled_logging_is_a_no_op() {
        let logging = Logging {
            enable: false,
            path: Some("/nonexistent/dir/log.txt".to_string()),
            level: "DEBUG".to_string(),
        };
        assert!(init_logging(&logging).is_ok());
    }
}

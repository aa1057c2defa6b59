//! Log subscriber setup

use std::str::FromStr;

use tracing::Level;

use crate::config::LoggingConfig;
use crate::EvalError;

/// Least to most verbose
const LEVELS: [Level; 5] = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];

/// Install the global `tracing` subscriber.
///
/// Each `verbose` step raises the configured level by one (info -> debug -> trace).
pub fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<(), EvalError> {
    let base = Level::from_str(&config.level).map_err(|_| EvalError::InvalidSetting {
        key: "logging.level",
        value: config.level.clone(),
    })?;
    let rank = LEVELS.iter().position(|l| *l == base).unwrap_or(2);
    let level = LEVELS[(rank + usize::from(verbose)).min(LEVELS.len() - 1)];

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EvalError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            json: false,
        };
        assert!(matches!(
            init_logging(&config, 0),
            Err(EvalError::InvalidSetting { key: "logging.level", .. })
        ));
    }
}

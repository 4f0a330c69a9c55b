//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Override log format (pretty/compact/json)
    #[arg(long)]
    pub log_format: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    if let Some(v) = &overrides.log_format {
        config.logging.format = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_logging_fields() {
        let mut config = Config::default();
        config.logging.level = Some("info".into());
        let overrides = CliOverrides {
            log_level: Some("debug".into()),
            log_format: None,
        };
        apply_overrides(&mut config, &overrides);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.logging.format.is_none());
    }
}

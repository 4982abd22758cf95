use anyhow::Context;
use log::LevelFilter;
use unveil_core::config::EnhanceConfig;

/// Reads page configuration. `None` or a blank string means stock behavior.
pub fn load_config(json: Option<&str>) -> anyhow::Result<EnhanceConfig> {
    match json.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(EnhanceConfig::default()),
        Some(raw) => EnhanceConfig::from_json(raw).context("invalid unveil configuration"),
    }
}

/// Maps a level name to a filter, defaulting to `Info`.
pub fn parse_log_level(name: Option<&str>) -> LevelFilter {
    name.and_then(|n| n.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_is_default() {
        let cfg = load_config(Some("  ")).unwrap();
        assert_eq!(cfg.reveal.reveal_class, "animate-in");
        assert_eq!(load_config(None).unwrap().navbar.anchor_offset_px, 80.0);
    }

    #[test]
    fn config_errors_carry_context() {
        let err = load_config(Some(r#"{"reveal":{"threshold":3}}"#)).unwrap_err();
        assert_eq!(err.to_string(), "invalid unveil configuration");
        assert!(format!("{err:#}").contains("threshold"));
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_log_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_log_level(Some("chatty")), LevelFilter::Info);
        assert_eq!(parse_log_level(None), LevelFilter::Info);
    }
}

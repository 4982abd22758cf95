//! Page configuration. Every field has a default, so an empty JSON object
//! (or no configuration at all) reproduces the stock behavior.

use std::time::Duration;

use serde::Deserialize;

use crate::animation::{AnimationSpec, Easing};
use crate::error::ConfigError;
use crate::host::{ObserverOptions, RootMargin};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnhanceConfig {
    pub reveal: RevealConfig,
    pub navbar: NavbarConfig,
    pub notify: NotifyConfig,
    pub loading: LoadingConfig,
}

impl EnhanceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: EnhanceConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.reveal.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::OutOfRange {
                field: "reveal.threshold",
                range: "[0, 1]",
                value: t,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    /// Visible fraction that triggers a class reveal.
    pub threshold: f64,
    /// How far the viewport's bottom edge is pulled in for class reveals.
    pub bottom_margin_px: f64,
    pub reveal_class: String,
    pub reveal_selector: String,
    pub counter_selector: String,
    /// Checked in order; the first present attribute wins.
    pub counter_attributes: Vec<String>,
    pub counter_duration_ms: u64,
    pub counter_easing: Easing,
    pub progress_selector: String,
    pub progress_attribute: String,
    pub progress_reset_width: String,
    pub progress_delay_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin_px: 50.0,
            reveal_class: "animate-in".into(),
            reveal_selector: ".feature-card, .step-card, .stats-card".into(),
            counter_selector: "[data-count], [data-counter]".into(),
            counter_attributes: vec!["data-count".into(), "data-counter".into()],
            counter_duration_ms: 2000,
            counter_easing: Easing::Linear,
            progress_selector: ".progress-bar".into(),
            progress_attribute: "data-progress".into(),
            progress_reset_width: "0%".into(),
            progress_delay_ms: 200,
        }
    }
}

impl RevealConfig {
    pub fn class_observer(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold,
            root_margin: RootMargin::shrink_bottom(self.bottom_margin_px),
        }
    }

    pub fn counter_spec(&self) -> AnimationSpec {
        AnimationSpec::tween(
            Duration::from_millis(self.counter_duration_ms),
            self.counter_easing,
        )
    }

    pub fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.progress_delay_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavbarConfig {
    pub selector: String,
    pub scrolled_class: String,
    pub scroll_threshold_px: f64,
    pub anchor_selector: String,
    /// Height of the fixed navbar, subtracted from anchor targets.
    pub anchor_offset_px: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            selector: ".navbar".into(),
            scrolled_class: "navbar-scrolled".into(),
            scroll_threshold_px: 50.0,
            anchor_selector: "a[href^=\"#\"]".into(),
            anchor_offset_px: 80.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifyConfig {
    pub default_duration_ms: u64,
    pub clipboard_duration_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 5000,
            clipboard_duration_ms: 3000,
        }
    }
}

impl NotifyConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    pub fn clipboard_duration(&self) -> Duration {
        Duration::from_millis(self.clipboard_duration_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadingConfig {
    pub text: String,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            text: "Loading...".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_stock_behavior() {
        let cfg = EnhanceConfig::from_json("{}").unwrap();
        assert_eq!(cfg.reveal.threshold, 0.1);
        assert_eq!(cfg.reveal.class_observer().root_margin.to_css(), "0px 0px -50px 0px");
        assert_eq!(cfg.reveal.counter_spec().duration, Duration::from_millis(2000));
        assert_eq!(cfg.navbar.anchor_offset_px, 80.0);
        assert_eq!(cfg.loading.text, "Loading...");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = EnhanceConfig::from_json(
            r#"{"reveal": {"counterDurationMs": 500, "counterEasing": "easeOut"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.reveal.counter_duration_ms, 500);
        assert_eq!(cfg.reveal.counter_easing, Easing::EaseOut);
        assert_eq!(cfg.reveal.progress_delay_ms, 200);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = EnhanceConfig::from_json(r#"{"reveal": {"threshold": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "reveal.threshold", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EnhanceConfig::from_json("{").unwrap_err(),
            ConfigError::Json(_)
        ));
    }
}

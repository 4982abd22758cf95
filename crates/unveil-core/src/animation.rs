use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve. Every curve is
    /// monotone, so ramps driven by it never step backwards.
    pub fn interpolate(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::EaseInOut,
            delay: Duration::ZERO,
        }
    }
}

impl AnimationSpec {
    pub fn tween(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    /// Counter default: linear over two seconds.
    pub fn counter() -> Self {
        Self::tween(Duration::from_millis(2000), Easing::Linear)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Eased progress after `elapsed`, clamped to `[0, 1]`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = (running.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.easing.interpolate(t)
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.delay + self.duration
    }
}

/// Time source shared with frame timestamps.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RampSample {
    pub value: u64,
    pub done: bool,
}

/// Integer ramp from zero to `target`.
#[derive(Clone, Copy, Debug)]
pub struct CounterRamp {
    target: u64,
    started_at: Duration,
    spec: AnimationSpec,
}

impl CounterRamp {
    pub fn new(target: u64, started_at: Duration, spec: AnimationSpec) -> Self {
        Self {
            target,
            started_at,
            spec,
        }
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Value to display at `now`. Frames stamped before the start count as
    /// zero elapsed; the final sample is exactly the target.
    pub fn sample(&self, now: Duration) -> RampSample {
        let elapsed = now.saturating_sub(self.started_at);
        if self.spec.is_complete(elapsed) {
            return RampSample {
                value: self.target,
                done: true,
            };
        }
        let progress = self.spec.progress(elapsed);
        let value = ((progress * self.target as f64).floor() as u64).min(self.target);
        RampSample { value, done: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn progress_clamps_and_honors_delay() {
        let spec = AnimationSpec::tween(ms(1000), Easing::Linear).with_delay(ms(200));
        assert_eq!(spec.progress(ms(0)), 0.0);
        assert_eq!(spec.progress(ms(200)), 0.0);
        assert!((spec.progress(ms(700)) - 0.5).abs() < 1e-9);
        assert_eq!(spec.progress(ms(5000)), 1.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let spec = AnimationSpec::tween(Duration::ZERO, Easing::Linear);
        assert_eq!(spec.progress(Duration::ZERO), 1.0);
        let ramp = CounterRamp::new(7, ms(10), spec);
        assert_eq!(ramp.sample(ms(10)), RampSample { value: 7, done: true });
    }

    #[test]
    fn counter_ramp_hits_target_exactly() {
        let ramp = CounterRamp::new(150, ms(1000), AnimationSpec::counter());
        assert_eq!(ramp.sample(ms(1000)).value, 0);
        assert_eq!(ramp.sample(ms(2000)).value, 75);
        assert_eq!(ramp.sample(ms(3000)), RampSample { value: 150, done: true });
        // frame stamped before the trigger
        assert_eq!(ramp.sample(ms(990)).value, 0);
    }

    #[test]
    fn counter_ramp_is_monotone_for_every_easing() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            let ramp = CounterRamp::new(999, Duration::ZERO, AnimationSpec::tween(ms(2000), easing));
            let mut last = 0;
            for t in (0..=2100).step_by(7) {
                let s = ramp.sample(ms(t));
                assert!(s.value >= last, "{easing:?} stepped back at {t}ms");
                assert!(s.value <= 999);
                last = s.value;
            }
            assert_eq!(last, 999);
        }
    }

    #[test]
    fn truncation_never_leaves_count_short() {
        let ramp = CounterRamp::new(3, Duration::ZERO, AnimationSpec::tween(ms(3), Easing::Linear));
        assert!(ramp.sample(ms(2)).value <= 2);
        assert!(!ramp.sample(ms(2)).done);
        assert_eq!(ramp.sample(ms(3)), RampSample { value: 3, done: true });
    }
}

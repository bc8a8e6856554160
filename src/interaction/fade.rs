use serde::{Deserialize, Serialize};

/// Linear opacity animation between two values.
///
/// Retargeting starts from whatever opacity holds at that instant, so the
/// latest transition always wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTrack {
    from: f64,
    to: f64,
    start_ms: f64,
    duration_ms: f64,
}

impl FadeTrack {
    #[must_use]
    pub fn settled(opacity: f64) -> Self {
        Self {
            from: opacity,
            to: opacity,
            start_ms: 0.0,
            duration_ms: 0.0,
        }
    }

    #[must_use]
    pub fn target(self) -> f64 {
        self.to
    }

    #[must_use]
    pub fn opacity_at(self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 || now_ms >= self.start_ms + self.duration_ms {
            return self.to;
        }
        if now_ms <= self.start_ms {
            return self.from;
        }
        let progress = (now_ms - self.start_ms) / self.duration_ms;
        self.from + (self.to - self.from) * progress
    }

    #[must_use]
    pub fn is_settled(self, now_ms: f64) -> bool {
        self.opacity_at(now_ms) == self.to
    }

    pub fn retarget(&mut self, to: f64, now_ms: f64, duration_ms: f64) {
        let current = self.opacity_at(now_ms);
        *self = Self {
            from: current,
            to,
            start_ms: now_ms,
            duration_ms: duration_ms.max(0.0),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::FadeTrack;
    use approx::assert_relative_eq;

    #[test]
    fn retarget_mid_fade_starts_from_current_opacity() {
        let mut track = FadeTrack::settled(0.0);
        track.retarget(1.0, 0.0, 200.0);
        assert_relative_eq!(track.opacity_at(50.0), 0.25);

        track.retarget(0.0, 50.0, 200.0);
        assert_relative_eq!(track.opacity_at(50.0), 0.25);
        assert_relative_eq!(track.opacity_at(150.0), 0.125);
        assert_relative_eq!(track.opacity_at(250.0), 0.0);
        assert!(track.is_settled(250.0));
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut track = FadeTrack::settled(0.2);
        track.retarget(0.9, 10.0, 0.0);
        assert_relative_eq!(track.opacity_at(10.0), 0.9);
    }
}

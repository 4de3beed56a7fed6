//! Exponential moving average for damping per-cycle signal jitter.

/// Exponential smoothing with an explicit unset state.
///
/// The filter must be reset whenever the underlying signal disappears
/// (e.g. face lost) so a stale history cannot bias a fresh capture.
pub struct ExponentialSmoother {
    prev_weight: f64,
    last: Option<f64>,
}

impl ExponentialSmoother {
    /// `prev_weight` is the weight of the previous smoothed value; the raw
    /// sample contributes `1 - prev_weight`.
    #[must_use]
    pub fn new(prev_weight: f64) -> Self {
        assert!(
            prev_weight > 0.0 && prev_weight < 1.0,
            "Previous-value weight must be in (0, 1)"
        );
        Self {
            prev_weight,
            last: None,
        }
    }

    /// Feed a raw sample and get the smoothed value. The first sample after a
    /// reset passes through unchanged.
    pub fn update(&mut self, raw: f64) -> f64 {
        let smoothed = match self.last {
            Some(last) => self.prev_weight * last + (1.0 - self.prev_weight) * raw,
            None => raw,
        };
        self.last = Some(smoothed);
        smoothed
    }

    /// Forget all history; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Most recent smoothed value, if any sample has been seen since reset.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

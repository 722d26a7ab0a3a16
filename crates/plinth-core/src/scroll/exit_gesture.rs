//! L4 Atomic Layer: "Scroll up past the top" detector for content mode

/// Accumulates upward wheel distance while the content area sits at its
/// top edge. Any downward movement or leaving the top is a hard reset.
#[derive(Debug, Clone)]
pub struct ExitGesture {
    threshold: f64,
    accumulated: f64,
}

impl ExitGesture {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accumulated: 0.0,
        }
    }

    #[inline]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    /// Feed one wheel delta (positive = down). Returns true exactly once
    /// when the accumulated upward distance exceeds the threshold.
    pub fn feed(&mut self, delta: f64, at_top: bool) -> bool {
        if !at_top || !delta.is_finite() || delta > 0.0 {
            self.reset();
            return false;
        }
        self.accumulated += -delta;
        if self.accumulated > self.threshold {
            self.reset();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_past_threshold() {
        let mut gesture = ExitGesture::new(50.0);
        assert!(!gesture.feed(-30.0, true));
        assert!(gesture.feed(-30.0, true));
        assert_eq!(gesture.accumulated(), 0.0);
        assert!(!gesture.feed(-10.0, true));
    }

    #[test]
    fn test_exactly_threshold_does_not_fire() {
        let mut gesture = ExitGesture::new(50.0);
        assert!(!gesture.feed(-50.0, true));
        assert!(gesture.feed(-0.5, true));
    }

    #[test]
    fn test_downward_delta_is_hard_reset() {
        let mut gesture = ExitGesture::new(50.0);
        for _ in 0..7 {
            assert!(!gesture.feed(-7.0, true));
        }
        assert_eq!(gesture.accumulated(), 49.0);
        assert!(!gesture.feed(1.0, true));
        assert_eq!(gesture.accumulated(), 0.0);
        for _ in 0..7 {
            assert!(!gesture.feed(-7.0, true));
        }
        assert_eq!(gesture.accumulated(), 49.0);
    }

    #[test]
    fn test_leaving_top_resets() {
        let mut gesture = ExitGesture::new(50.0);
        gesture.feed(-40.0, true);
        assert!(!gesture.feed(-40.0, false));
        assert_eq!(gesture.accumulated(), 0.0);
    }
}

//! Trigger state machine
//!
//! The trigger owns the capture phase: Idle until a run request, then
//! either Capturing immediately or one of the armed states waiting for a
//! threshold crossing. A single [`TriggerMode`] value serves as both the
//! arm selector and the current run phase; CHECK reports it verbatim.
//!
//! Edge semantics: on every armed cycle the current source value is
//! compared against the threshold, and against the previous cycle's
//! baseline. A crossing occurred when the two sides of the threshold
//! differ; whether it fires depends on the armed direction. The baseline
//! is refreshed every cycle whether or not the trigger fires, so a slow
//! drift through the threshold still registers as exactly one edge.

use crate::types::{ChannelBinding, TriggerMode};

/// Trigger configuration and run phase
#[derive(Debug, Clone)]
pub struct Trigger {
    mode: TriggerMode,
    source: Option<ChannelBinding>,
    threshold: f64,
    baseline: f64,
}

impl Trigger {
    /// Create an idle trigger with no source
    pub fn new() -> Self {
        Self {
            mode: TriggerMode::Idle,
            source: None,
            threshold: 0.0,
            baseline: 0.0,
        }
    }

    /// Current mode; the pure read behind CHECK
    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// The entry the trigger watches, if one is configured
    pub fn source(&self) -> Option<ChannelBinding> {
        self.source
    }

    /// Threshold the armed modes compare against
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Select the trigger source; forces the mode back to Idle
    ///
    /// Does not start a capture by itself.
    pub fn configure(&mut self, source: Option<ChannelBinding>) {
        self.source = source;
        self.mode = TriggerMode::Idle;
    }

    /// Start a run in the requested mode
    ///
    /// `start_value` is the source value read at call time; it seeds the
    /// baseline for edge detection. With `Capturing` the capture starts on
    /// the next cycle; with an armed mode it starts one cycle after the
    /// edge fires.
    pub fn run(&mut self, requested: TriggerMode, threshold: f64, start_value: f64) {
        self.threshold = threshold;
        self.baseline = start_value;
        self.mode = requested;
    }

    /// Force the trigger back to Idle
    pub fn stop(&mut self) {
        self.mode = TriggerMode::Idle;
    }

    /// Mark the capture complete (ring full)
    pub fn complete(&mut self) {
        self.mode = TriggerMode::Complete;
    }

    /// Evaluate one armed cycle against the current source value
    ///
    /// Returns true when the edge fired and the mode moved to Capturing.
    /// The capture itself begins on the following cycle. No-op unless the
    /// trigger is in an armed mode.
    pub fn evaluate(&mut self, now: f64) -> bool {
        let armed = self.mode;
        if !armed.is_armed() {
            return false;
        }

        let was_above = self.baseline >= self.threshold;
        let is_above = now >= self.threshold;
        self.baseline = now;

        if was_above == is_above {
            return false;
        }
        let fired = match armed {
            TriggerMode::ArmedChange => true,
            TriggerMode::ArmedHigh => is_above,
            TriggerMode::ArmedLow => !is_above,
            _ => false,
        };
        if fired {
            self.mode = TriggerMode::Capturing;
        }
        fired
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DirectoryHandle, SourceKind};

    fn armed(mode: TriggerMode, threshold: f64, baseline: f64) -> Trigger {
        let mut trigger = Trigger::new();
        trigger.configure(Some(ChannelBinding {
            handle: DirectoryHandle(0x1000),
            kind: SourceKind::Pin,
        }));
        trigger.run(mode, threshold, baseline);
        trigger
    }

    #[test]
    fn test_initial_state_is_idle() {
        let trigger = Trigger::new();
        assert_eq!(trigger.mode(), TriggerMode::Idle);
        assert!(trigger.source().is_none());
    }

    #[test]
    fn test_configure_forces_idle() {
        let mut trigger = armed(TriggerMode::ArmedHigh, 5.0, 0.0);
        assert_eq!(trigger.mode(), TriggerMode::ArmedHigh);
        trigger.configure(None);
        assert_eq!(trigger.mode(), TriggerMode::Idle);
    }

    #[test]
    fn test_armed_high_fires_on_upward_crossing_only() {
        let mut trigger = armed(TriggerMode::ArmedHigh, 5.0, 7.0);
        // Downward crossing: 7.0 -> 3.0 must not fire ArmedHigh
        assert!(!trigger.evaluate(3.0));
        assert_eq!(trigger.mode(), TriggerMode::ArmedHigh);
        // Upward crossing: 3.0 -> 6.0 fires
        assert!(trigger.evaluate(6.0));
        assert_eq!(trigger.mode(), TriggerMode::Capturing);
    }

    #[test]
    fn test_armed_low_fires_on_downward_crossing_only() {
        let mut trigger = armed(TriggerMode::ArmedLow, 5.0, 1.0);
        assert!(!trigger.evaluate(8.0));
        assert_eq!(trigger.mode(), TriggerMode::ArmedLow);
        assert!(trigger.evaluate(2.0));
        assert_eq!(trigger.mode(), TriggerMode::Capturing);
    }

    #[test]
    fn test_armed_change_fires_on_either_direction() {
        let mut up = armed(TriggerMode::ArmedChange, 5.0, 1.0);
        assert!(up.evaluate(9.0));

        let mut down = armed(TriggerMode::ArmedChange, 5.0, 9.0);
        assert!(down.evaluate(1.0));
    }

    #[test]
    fn test_no_fire_without_crossing() {
        let mut trigger = armed(TriggerMode::ArmedHigh, 5.0, 1.0);
        assert!(!trigger.evaluate(2.0));
        assert!(!trigger.evaluate(4.9));
        assert!(!trigger.evaluate(0.0));
        assert_eq!(trigger.mode(), TriggerMode::ArmedHigh);
    }

    #[test]
    fn test_baseline_refreshes_every_cycle() {
        // The failed downward crossing re-baselines below the threshold,
        // so the next upward move is a crossing.
        let mut trigger = armed(TriggerMode::ArmedHigh, 5.0, 7.0);
        assert!(!trigger.evaluate(3.0));
        assert!(trigger.evaluate(5.0));
    }

    #[test]
    fn test_evaluate_is_a_no_op_outside_armed_modes() {
        let mut trigger = Trigger::new();
        assert!(!trigger.evaluate(100.0));
        assert_eq!(trigger.mode(), TriggerMode::Idle);

        trigger.run(TriggerMode::Capturing, 0.0, 0.0);
        assert!(!trigger.evaluate(100.0));
        assert_eq!(trigger.mode(), TriggerMode::Capturing);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    /// Reference: the first index i >= 1 where v[i-1] and v[i] straddle the
    /// threshold in the armed direction.
    fn first_crossing(values: &[f64], threshold: f64, mode: TriggerMode) -> Option<usize> {
        for i in 1..values.len() {
            let was = values[i - 1] >= threshold;
            let is = values[i] >= threshold;
            if was == is {
                continue;
            }
            let fires = match mode {
                TriggerMode::ArmedChange => true,
                TriggerMode::ArmedHigh => is,
                TriggerMode::ArmedLow => !is,
                _ => false,
            };
            if fires {
                return Some(i);
            }
        }
        None
    }

    proptest! {
        #[test]
        fn test_fires_at_first_matching_crossing(
            values in prop::collection::vec(-10.0f64..10.0, 2..40),
            threshold in -5.0f64..5.0,
            mode_sel in 0u8..3,
        ) {
            let mode = match mode_sel {
                0 => TriggerMode::ArmedHigh,
                1 => TriggerMode::ArmedLow,
                _ => TriggerMode::ArmedChange,
            };
            let mut trigger = armed(mode, threshold, values[0]);
            let expected = first_crossing(&values, threshold, mode);

            let mut fired_at = None;
            for (i, &v) in values.iter().enumerate().skip(1) {
                if trigger.evaluate(v) {
                    fired_at = Some(i);
                    break;
                }
            }
            prop_assert_eq!(fired_at, expected);
        }
    }
}

//! Rain state change notifications
//!
//! Tracks the last rain state that was reported and emits a transition
//! only when the observed state differs from it for `debounce_cycles`
//! consecutive observations. The reported state starts dry, so rain at the
//! first observation is reported as started.

/// Direction of a reported rain state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RainTransition {
    Started,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RainAlert {
    reported: bool,
    streak: u8,
    debounce_cycles: u8,
}

impl RainAlert {
    /// `debounce_cycles` of 0 behaves like 1
    pub const fn new(debounce_cycles: u8) -> Self {
        Self {
            reported: false,
            streak: 0,
            debounce_cycles,
        }
    }

    pub fn observe(&mut self, is_raining: bool) -> Option<RainTransition> {
        if is_raining == self.reported {
            self.streak = 0;
            return None;
        }

        self.streak = self.streak.saturating_add(1);
        if self.streak < self.debounce_cycles.max(1) {
            return None;
        }

        self.reported = is_raining;
        self.streak = 0;

        Some(if is_raining {
            RainTransition::Started
        } else {
            RainTransition::Stopped
        })
    }

    /// Last reported state
    pub fn is_raining(&self) -> bool {
        self.reported
    }
}

impl Default for RainAlert {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_transitions() {
        let mut alert = RainAlert::default();

        assert_eq!(alert.observe(false), None);
        assert_eq!(alert.observe(true), Some(RainTransition::Started));
        assert_eq!(alert.observe(true), None);
        assert_eq!(alert.observe(false), Some(RainTransition::Stopped));
    }

    #[test]
    fn debounce_ignores_flicker() {
        let mut alert = RainAlert::new(2);

        assert_eq!(alert.observe(true), None);
        assert_eq!(alert.observe(false), None);
        assert_eq!(alert.observe(true), None);
        assert_eq!(alert.observe(true), Some(RainTransition::Started));
        assert!(alert.is_raining());
    }
}

//! Failover phase and hysteresis counters.
//!
//! The state only counts; it never performs I/O. The controller feeds it
//! one primary probe result per cycle and acts on the returned [`Step`].

use std::fmt;
use std::time::Duration;

/// Belief about the primary's health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Failover IPs point at the primary.
    #[default]
    Up,
    /// Failover IPs were moved to the backup.
    Down,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Up => "up",
            Phase::Down => "down",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed thresholds that drive the state machine.
#[derive(Debug, Clone)]
pub struct FailoverPolicy {
    /// Consecutive failed primary probes before failing over.
    pub down_threshold: u32,
    /// Consecutive successful primary probes before switching back.
    pub up_threshold: u32,
    /// Pause between two cycles.
    pub poll_interval: Duration,
    /// Successful checks between two "still up" notices.
    pub stable_log_interval: u32,
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            down_threshold: 3,
            up_threshold: 3,
            poll_interval: Duration::from_secs(2),
            stable_log_interval: 15,
        }
    }
}

/// What the controller has to do after a primary probe was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Primary reachable while up. `notice` is set once every
    /// `stable_log_interval` successful checks.
    Healthy { notice: bool },
    /// Primary reachable while down, not yet trusted again.
    Recovering { successes: u32 },
    /// Primary reached the up threshold; switch the IPs back.
    Recovered,
    /// Primary unreachable while up, below the down threshold.
    Suspect { failures: u32 },
    /// Down threshold reached. The backup must be probed before switching.
    FailoverDue { failures: u32 },
    /// Primary still unreachable while down.
    StillDown,
}

/// Phase plus the two hysteresis counters.
///
/// Only one counter is active at a time: `consecutive_count` while up,
/// `stable_count` while down. Entering a phase clears both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverState {
    phase: Phase,
    consecutive_count: u32,
    stable_count: u32,
    healthy_checks: u32,
}

impl FailoverState {
    /// A fresh state always assumes the primary is up.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consecutive failed probes counted toward `Down`.
    pub fn consecutive_count(&self) -> u32 {
        self.consecutive_count
    }

    /// Consecutive successful probes counted toward `Up`.
    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    /// Record a reachable primary.
    pub fn record_success(&mut self, policy: &FailoverPolicy) -> Step {
        match self.phase {
            Phase::Up => {
                self.consecutive_count = 0;
                self.healthy_checks += 1;
                let notice = self.healthy_checks >= policy.stable_log_interval;
                if notice {
                    self.healthy_checks = 0;
                }
                Step::Healthy { notice }
            }
            Phase::Down => {
                self.stable_count = self.stable_count.saturating_add(1);
                if self.stable_count >= policy.up_threshold {
                    Step::Recovered
                } else {
                    Step::Recovering {
                        successes: self.stable_count,
                    }
                }
            }
        }
    }

    /// Record an unreachable primary.
    ///
    /// While up, the failure counter saturates at the threshold so that a
    /// suppressed failover is re-evaluated on every following failure.
    pub fn record_failure(&mut self, policy: &FailoverPolicy) -> Step {
        match self.phase {
            Phase::Up => {
                self.consecutive_count = (self.consecutive_count + 1).min(policy.down_threshold);
                if self.consecutive_count >= policy.down_threshold {
                    Step::FailoverDue {
                        failures: self.consecutive_count,
                    }
                } else {
                    Step::Suspect {
                        failures: self.consecutive_count,
                    }
                }
            }
            Phase::Down => {
                self.stable_count = 0;
                Step::StillDown
            }
        }
    }

    /// Commit the move to the backup.
    pub fn enter_down(&mut self) {
        self.enter(Phase::Down);
    }

    /// Commit the move back to the primary.
    pub fn enter_up(&mut self) {
        self.enter(Phase::Up);
    }

    fn enter(&mut self, phase: Phase) {
        *self = Self {
            phase,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FailoverPolicy {
        FailoverPolicy::default()
    }

    #[test]
    fn test_starts_up() {
        let state = FailoverState::new();
        assert_eq!(state.phase(), Phase::Up);
        assert_eq!(state.consecutive_count(), 0);
        assert_eq!(state.stable_count(), 0);
    }

    #[test]
    fn test_failures_below_threshold_are_suspect() {
        let mut state = FailoverState::new();
        assert_eq!(
            state.record_failure(&policy()),
            Step::Suspect { failures: 1 }
        );
        assert_eq!(
            state.record_failure(&policy()),
            Step::Suspect { failures: 2 }
        );
        assert_eq!(state.phase(), Phase::Up);
    }

    #[test]
    fn test_third_failure_is_due() {
        let mut state = FailoverState::new();
        state.record_failure(&policy());
        state.record_failure(&policy());
        assert_eq!(
            state.record_failure(&policy()),
            Step::FailoverDue { failures: 3 }
        );
        // The state does not move until the controller commits.
        assert_eq!(state.phase(), Phase::Up);
    }

    #[test]
    fn test_failures_saturate_while_failover_suppressed() {
        let mut state = FailoverState::new();
        for _ in 0..10 {
            state.record_failure(&policy());
        }
        assert_eq!(state.consecutive_count(), 3);
        assert_eq!(
            state.record_failure(&policy()),
            Step::FailoverDue { failures: 3 }
        );
    }

    #[test]
    fn test_success_resets_failures() {
        let mut state = FailoverState::new();
        state.record_failure(&policy());
        state.record_failure(&policy());
        state.record_success(&policy());
        assert_eq!(state.consecutive_count(), 0);
        assert_eq!(
            state.record_failure(&policy()),
            Step::Suspect { failures: 1 }
        );
    }

    #[test]
    fn test_enter_down_clears_counters() {
        let mut state = FailoverState::new();
        for _ in 0..3 {
            state.record_failure(&policy());
        }
        state.enter_down();
        assert_eq!(state.phase(), Phase::Down);
        assert_eq!(state.consecutive_count(), 0);
        assert_eq!(state.stable_count(), 0);
    }

    #[test]
    fn test_recovery_needs_consecutive_successes() {
        let mut state = FailoverState::new();
        state.enter_down();

        assert_eq!(
            state.record_success(&policy()),
            Step::Recovering { successes: 1 }
        );
        assert_eq!(
            state.record_success(&policy()),
            Step::Recovering { successes: 2 }
        );
        // A failure in between starts the streak over.
        assert_eq!(state.record_failure(&policy()), Step::StillDown);
        assert_eq!(state.stable_count(), 0);

        state.record_success(&policy());
        state.record_success(&policy());
        assert_eq!(state.record_success(&policy()), Step::Recovered);
        assert_eq!(state.phase(), Phase::Down);

        state.enter_up();
        assert_eq!(state.phase(), Phase::Up);
        assert_eq!(state.stable_count(), 0);
    }

    #[test]
    fn test_stable_notice_every_interval() {
        let policy = FailoverPolicy {
            stable_log_interval: 4,
            ..FailoverPolicy::default()
        };
        let mut state = FailoverState::new();

        let notices: Vec<bool> = (0..12)
            .map(|_| match state.record_success(&policy) {
                Step::Healthy { notice } => notice,
                other => panic!("unexpected step {:?}", other),
            })
            .collect();

        let expected: Vec<bool> = (1..=12).map(|i| i % 4 == 0).collect();
        assert_eq!(notices, expected);
    }

    #[test]
    fn test_transition_resets_stable_notice() {
        let policy = FailoverPolicy {
            stable_log_interval: 3,
            ..FailoverPolicy::default()
        };
        let mut state = FailoverState::new();
        state.record_success(&policy);
        state.record_success(&policy);
        state.enter_down();
        state.enter_up();
        assert_eq!(state.record_success(&policy), Step::Healthy { notice: false });
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Up.to_string(), "up");
        assert_eq!(Phase::Down.to_string(), "down");
    }
}

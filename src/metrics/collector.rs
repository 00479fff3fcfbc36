//! Metrics collector using prometheus-client.
//!
//! Tracks probe results, switch calls, phase transitions and the current
//! phase of the failover controller.

use crate::failover::Phase;
use crate::target::Role;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Labels for probe metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProbeLabels {
    pub role: RoleLabel,
    pub result: Outcome,
}

/// Labels for switch metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct SwitchLabels {
    pub direction: RoleLabel,
    pub result: Outcome,
}

/// Labels for phase transition metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TransitionLabels {
    pub phase: PhaseLabel,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum RoleLabel {
    Primary,
    Backup,
}

impl From<Role> for RoleLabel {
    fn from(role: Role) -> Self {
        match role {
            Role::Primary => RoleLabel::Primary,
            Role::Backup => RoleLabel::Backup,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum PhaseLabel {
    Up,
    Down,
}

impl From<Phase> for PhaseLabel {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Up => PhaseLabel::Up,
            Phase::Down => PhaseLabel::Down,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        if success {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Collects and stores all metrics.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsCollectorInner>,
}

struct MetricsCollectorInner {
    /// Probe results per target role.
    probes_total: Family<ProbeLabels, Counter>,
    /// Switch calls per direction.
    switches_total: Family<SwitchLabels, Counter>,
    /// Duration of single switch calls (in seconds).
    switch_duration_seconds: Family<SwitchLabels, Histogram>,
    /// Committed phase transitions.
    transitions_total: Family<TransitionLabels, Counter>,
    /// Failovers skipped because the backup was unreachable too.
    suppressed_total: Counter,
    /// Current phase (1 = up, 0 = down).
    phase: Gauge,
    /// Number of managed failover IPs.
    managed_ips: Gauge,
    /// The prometheus registry.
    registry: Registry,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let probes_total = Family::<ProbeLabels, Counter>::default();
        let switches_total = Family::<SwitchLabels, Counter>::default();
        let switch_duration_seconds = Family::<SwitchLabels, Histogram>::new_with_constructor(|| {
            // Buckets: 100ms .. ~100s, switch calls may take up to a minute
            Histogram::new(exponential_buckets(0.1, 2.0, 11))
        });
        let transitions_total = Family::<TransitionLabels, Counter>::default();
        let suppressed_total = Counter::default();
        let phase = Gauge::default();
        let managed_ips = Gauge::default();

        phase.set(1);

        registry.register(
            "failoverd_probes",
            "Total number of health probes by target role and result",
            probes_total.clone(),
        );
        registry.register(
            "failoverd_switches",
            "Total number of failover IP switch calls by direction and result",
            switches_total.clone(),
        );
        registry.register(
            "failoverd_switch_duration_seconds",
            "Duration of failover IP switch calls in seconds",
            switch_duration_seconds.clone(),
        );
        registry.register(
            "failoverd_transitions",
            "Total number of committed phase transitions",
            transitions_total.clone(),
        );
        registry.register(
            "failoverd_failover_suppressed",
            "Failovers skipped because primary and backup were both unreachable",
            suppressed_total.clone(),
        );
        registry.register(
            "failoverd_phase",
            "Current belief about the primary (1=up, 0=down)",
            phase.clone(),
        );
        registry.register(
            "failoverd_managed_ips",
            "Number of failover IPs managed by this process",
            managed_ips.clone(),
        );

        Self {
            inner: Arc::new(MetricsCollectorInner {
                probes_total,
                switches_total,
                switch_duration_seconds,
                transitions_total,
                suppressed_total,
                phase,
                managed_ips,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record a probe result.
    pub fn record_probe(&self, role: Role, reachable: bool) {
        let labels = ProbeLabels {
            role: role.into(),
            result: reachable.into(),
        };
        self.inner.probes_total.get_or_create(&labels).inc();
    }

    /// Record a single switch call toward `direction`.
    pub fn record_switch(&self, direction: Role, success: bool, duration: Duration) {
        let labels = SwitchLabels {
            direction: direction.into(),
            result: success.into(),
        };
        self.inner.switches_total.get_or_create(&labels).inc();
        self.inner
            .switch_duration_seconds
            .get_or_create(&labels)
            .observe(duration.as_secs_f64());
    }

    /// Record a committed transition into `phase`.
    pub fn record_transition(&self, phase: Phase) {
        let labels = TransitionLabels {
            phase: phase.into(),
        };
        self.inner.transitions_total.get_or_create(&labels).inc();
        self.inner
            .phase
            .set(if phase == Phase::Up { 1 } else { 0 });
    }

    /// Record a failover that was not performed.
    pub fn record_suppressed(&self) {
        self.inner.suppressed_total.inc();
    }

    /// Set the number of managed failover IPs.
    pub fn set_managed_ips(&self, count: usize) {
        self.inner.managed_ips.set(count as i64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

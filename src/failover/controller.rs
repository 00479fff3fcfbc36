//! The failover control loop.
//!
//! One cycle probes the primary, feeds the result into [`FailoverState`] and,
//! on a committed transition, re-routes every managed IP. Everything is
//! awaited in order inside a single task; the controller owns its state.

use crate::failover::{FailoverPolicy, FailoverState, Phase, Step};
use crate::health::HealthProbe;
use crate::metrics::MetricsCollector;
use crate::provider::{ManagedIps, SwitchService};
use crate::target::{Role, Target};
use std::net::IpAddr;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result of one switch call within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub ip: IpAddr,
    pub success: bool,
}

/// All switch calls issued for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBatch {
    pub id: Uuid,
    /// Side the IPs were moved to.
    pub direction: Role,
    pub target: IpAddr,
    pub outcomes: Vec<SwitchOutcome>,
}

impl SwitchBatch {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No transition.
    Steady,
    /// Moved to the backup.
    FailedOver(SwitchBatch),
    /// Moved back to the primary.
    Recovered(SwitchBatch),
    /// Down threshold reached but the backup was unreachable too.
    Suppressed,
}

/// Watches the primary and moves the managed IPs between the two targets.
pub struct FailoverController<P, S> {
    primary: Target,
    backup: Target,
    managed_ips: ManagedIps,
    prober: P,
    switcher: S,
    policy: FailoverPolicy,
    state: FailoverState,
    metrics: MetricsCollector,
}

impl<P, S> FailoverController<P, S>
where
    P: HealthProbe,
    S: SwitchService,
{
    /// Create a controller. The primary is assumed to be up.
    pub fn new(
        primary: Target,
        backup: Target,
        managed_ips: ManagedIps,
        prober: P,
        switcher: S,
        policy: FailoverPolicy,
        metrics: MetricsCollector,
    ) -> Self {
        metrics.set_managed_ips(managed_ips.len());
        Self {
            primary,
            backup,
            managed_ips,
            prober,
            switcher,
            policy,
            state: FailoverState::new(),
            metrics,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &FailoverState {
        &self.state
    }

    pub fn managed_ips(&self) -> &ManagedIps {
        &self.managed_ips
    }

    /// Run cycles until a shutdown signal arrives.
    ///
    /// A cycle in progress is always finished, so a switch batch is never
    /// cut short.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            primary = %self.primary.hostname,
            backup = %self.backup.hostname,
            managed_ips = self.managed_ips.len(),
            interval = ?self.policy.poll_interval,
            "started host checking"
        );

        loop {
            self.tick().await;

            tokio::select! {
                _ = sleep(self.policy.poll_interval) => {}
                _ = shutdown.recv() => {
                    info!(phase = %self.phase(), "failover controller shutting down");
                    break;
                }
            }
        }
    }

    /// Run one cycle without sleeping.
    pub async fn tick(&mut self) -> TickOutcome {
        let reachable = self.probe(Role::Primary).await;
        let step = if reachable {
            self.state.record_success(&self.policy)
        } else {
            self.state.record_failure(&self.policy)
        };

        let host = self.primary.hostname.as_str();
        match step {
            Step::Healthy { notice } => {
                if notice {
                    info!(
                        host = %host,
                        checks = self.policy.stable_log_interval,
                        "{} was up for the last {} checks",
                        host,
                        self.policy.stable_log_interval
                    );
                }
                TickOutcome::Steady
            }
            Step::Recovering { successes } => {
                warn!(
                    host = %host,
                    successes,
                    required = self.policy.up_threshold,
                    "{} is reachable again, waiting before switching back",
                    host
                );
                TickOutcome::Steady
            }
            Step::Recovered => {
                info!(host = %host, "{} is back up, switching failover IPs back", host);
                let batch = self.switch_all(Role::Primary).await;
                self.state.enter_up();
                self.metrics.record_transition(Phase::Up);
                TickOutcome::Recovered(batch)
            }
            Step::Suspect { failures } => {
                warn!(
                    host = %host,
                    attempt = failures,
                    threshold = self.policy.down_threshold,
                    "could not reach {}",
                    host
                );
                TickOutcome::Steady
            }
            Step::FailoverDue { failures } => {
                if self.probe(Role::Backup).await {
                    error!(
                        host = %host,
                        failures,
                        backup = %self.backup.hostname,
                        "{} is down, switching failover IPs to backup",
                        host
                    );
                    let batch = self.switch_all(Role::Backup).await;
                    self.state.enter_down();
                    self.metrics.record_transition(Phase::Down);
                    TickOutcome::FailedOver(batch)
                } else {
                    error!(
                        severity = "critical",
                        primary = %host,
                        backup = %self.backup.hostname,
                        "all load balancers are down, not switching failover IPs"
                    );
                    self.metrics.record_suppressed();
                    TickOutcome::Suppressed
                }
            }
            Step::StillDown => {
                error!(host = %host, "{} is still down", host);
                TickOutcome::Steady
            }
        }
    }

    fn target(&self, role: Role) -> &Target {
        match role {
            Role::Primary => &self.primary,
            Role::Backup => &self.backup,
        }
    }

    async fn probe(&self, role: Role) -> bool {
        let target = self.target(role);
        let reachable = self.prober.probe(&target.check_url).await;
        self.metrics.record_probe(role, reachable);
        debug!(role = %role, host = %target.hostname, reachable, "probed");
        reachable
    }

    /// Point every managed IP at the target with `role`.
    ///
    /// Each IP gets exactly one attempt; a failure does not stop the batch.
    async fn switch_all(&self, role: Role) -> SwitchBatch {
        let id = Uuid::new_v4();
        let target = self.target(role).address;
        let mut outcomes = Vec::with_capacity(self.managed_ips.len());

        for &ip in &self.managed_ips {
            let started = Instant::now();
            let success = self.switcher.switch(ip, target).await;
            self.metrics.record_switch(role, success, started.elapsed());
            if !success {
                warn!(batch_id = %id, ip = %ip, target = %target, "switch failed, continuing with remaining IPs");
            }
            outcomes.push(SwitchOutcome { ip, success });
        }

        let batch = SwitchBatch {
            id,
            direction: role,
            target,
            outcomes,
        };
        info!(
            batch_id = %id,
            direction = %role,
            target = %target,
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            "switch batch finished"
        );
        batch
    }
}

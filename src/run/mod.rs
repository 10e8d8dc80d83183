use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::config::{Config, VmBackend};
use crate::lockclear::{HypervisorProcessClearer, LockClearer};
use crate::orchestrator::Orchestrator;

/// Deployment phase as shown to the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Launching = 1,
    Success = 2,
    Error = 3,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Launching => "launching",
            Phase::Success => "success",
            Phase::Error => "error",
        }
    }

    fn from_u8(v: u8) -> Phase {
        match v {
            1 => Phase::Launching,
            2 => Phase::Success,
            3 => Phase::Error,
            _ => Phase::Idle,
        }
    }
}

/// Outcome of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started,
    AlreadyRunning,
}

/// Owns the run state: at most one orchestration pass in flight. Launch
/// is a compare-and-set on the phase, so "reject if already running" has
/// no read-then-write race; rejected launches are never queued.
pub struct Supervisor {
    phase: AtomicU8,
    orchestrator: Arc<Orchestrator>,
}

impl Supervisor {
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        // Only VMware-backed labs suffer host-side VM-file lock stalls.
        let lock_clearer: Option<Arc<dyn LockClearer>> = match config.backend {
            VmBackend::Vmware => Some(Arc::new(HypervisorProcessClearer::default())),
            VmBackend::Virtualbox => None,
        };
        let orchestrator = Arc::new(Orchestrator::new(config, lock_clearer)?);
        Ok(Self::with_orchestrator(orchestrator))
    }

    pub fn with_orchestrator(orchestrator: Arc<Orchestrator>) -> Arc<Self> {
        Arc::new(Self {
            phase: AtomicU8::new(Phase::Idle as u8),
            orchestrator,
        })
    }

    pub fn status(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Start one orchestration pass on a background task, unless one is
    /// already in flight.
    pub fn launch(self: &Arc<Self>) -> LaunchOutcome {
        if !self.try_begin() {
            tracing::warn!("Launch rejected, a deployment pass is already running");
            return LaunchOutcome::AlreadyRunning;
        }

        tracing::info!("Starting lab deployment pass");
        let sup = self.clone();
        tokio::spawn(async move {
            let phase = match sup.orchestrator.run().await {
                Ok(()) => {
                    tracing::info!("Lab deployment finished successfully");
                    Phase::Success
                }
                Err(e) => {
                    tracing::error!("Lab deployment failed: {}", e);
                    Phase::Error
                }
            };
            sup.phase.store(phase as u8, Ordering::Release);
        });
        LaunchOutcome::Started
    }

    fn try_begin(&self) -> bool {
        loop {
            let current = self.phase.load(Ordering::Acquire);
            if current == Phase::Launching as u8 {
                return false;
            }
            if self
                .phase
                .compare_exchange(
                    current,
                    Phase::Launching as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return true;
            }
        }
    }
}

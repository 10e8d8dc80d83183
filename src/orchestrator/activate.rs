use std::sync::Arc;

use tokio::time::{sleep, Instant};

use crate::config::{StartStrategy, Timing};
use crate::controller::types::{node_status, NodeInfo};
use crate::controller::ControllerClient;
use crate::lockclear::LockClearer;

use super::{DeployedLab, OrchestrateError};

/// Brings lab nodes up according to the configured strategy. Owns the
/// only state machine in the system: per-node
/// unstarted -> starting -> ready, with no way back to unstarted.
pub struct NodeActivator<'a> {
    client: &'a ControllerClient,
    timing: &'a Timing,
    lock_clearer: Option<Arc<dyn LockClearer>>,
}

impl<'a> NodeActivator<'a> {
    pub fn new(
        client: &'a ControllerClient,
        timing: &'a Timing,
        lock_clearer: Option<Arc<dyn LockClearer>>,
    ) -> Self {
        Self {
            client,
            timing,
            lock_clearer,
        }
    }

    pub async fn activate(
        &self,
        project_id: &str,
        deployed: &DeployedLab,
        strategy: StartStrategy,
    ) -> Result<(), OrchestrateError> {
        match strategy {
            StartStrategy::BoundedRetry => self.start_all_with_retry(project_id).await,
            StartStrategy::Sequential => self.start_sequential(project_id, deployed).await,
        }
    }

    /// Best-effort start of every node in the project, in no particular
    /// dependency order. 409 conflicts are retried with linear backoff; a
    /// node that exhausts its attempts is logged and skipped — partial
    /// lab startup is an accepted degraded outcome. Any other error
    /// aborts the run.
    async fn start_all_with_retry(&self, project_id: &str) -> Result<(), OrchestrateError> {
        if let Some(clearer) = &self.lock_clearer {
            clearer.clear_locks().await;
        }

        tracing::info!(
            "Waiting {:?} for the hypervisor to settle before powering on",
            self.timing.settle_delay
        );
        sleep(self.timing.settle_delay).await;

        let nodes = self.client.nodes(project_id).await?;
        for node in &nodes {
            if !self.start_with_retry(project_id, node).await? {
                tracing::error!(
                    node = %node.name,
                    attempts = self.timing.start_attempts,
                    "Node failed to start after all attempts, skipping"
                );
            }
        }
        Ok(())
    }

    /// One node, up to `start_attempts` tries. Ok(false) means every
    /// attempt hit a conflict.
    async fn start_with_retry(
        &self,
        project_id: &str,
        node: &NodeInfo,
    ) -> Result<bool, OrchestrateError> {
        for attempt in 0..self.timing.start_attempts {
            match self.client.start_node(project_id, &node.node_id).await {
                Ok(()) => {
                    tracing::info!(node = %node.name, attempt = attempt + 1, "Node started");
                    return Ok(true);
                }
                Err(e) if e.is_conflict() => {
                    let wait = self.timing.retry_base * (attempt + 1);
                    tracing::warn!(
                        node = %node.name,
                        attempt = attempt + 1,
                        "Hypervisor busy (409), retrying in {:?}",
                        wait
                    );
                    sleep(wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(false)
    }

    /// Strict ordering: the switch must converge before any VM is
    /// started, then each VM is started and awaited in definition order.
    /// No conflict retry here — a start either succeeds or is a real
    /// failure, and polling alone resolves "not ready yet".
    async fn start_sequential(
        &self,
        project_id: &str,
        deployed: &DeployedLab,
    ) -> Result<(), OrchestrateError> {
        self.start_and_wait(project_id, &deployed.switch_name, &deployed.switch_id)
            .await?;
        for (name, node_id) in &deployed.vm_ids {
            self.start_and_wait(project_id, name, node_id).await?;
        }
        Ok(())
    }

    async fn start_and_wait(
        &self,
        project_id: &str,
        name: &str,
        node_id: &str,
    ) -> Result<(), OrchestrateError> {
        tracing::info!(node = name, "Starting node");
        self.client.start_node(project_id, node_id).await?;
        self.wait_for_status(project_id, name, node_id, node_status::STARTED)
            .await
    }

    /// Poll the node until it reports `desired` or the convergence
    /// timeout elapses. The timeout bounds the polling loop only, never
    /// an in-flight request.
    async fn wait_for_status(
        &self,
        project_id: &str,
        name: &str,
        node_id: &str,
        desired: &str,
    ) -> Result<(), OrchestrateError> {
        let deadline = Instant::now() + self.timing.convergence_timeout;
        loop {
            let node = self.client.node(project_id, node_id).await?;
            if node.status == desired {
                tracing::info!(node = name, status = desired, "Node converged");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(OrchestrateError::ConvergenceTimeout {
                    node: name.to_string(),
                    desired: desired.to_string(),
                    elapsed: self.timing.convergence_timeout,
                });
            }
            tracing::debug!(node = name, status = %node.status, "Waiting for node to converge");
            sleep(self.timing.poll_interval).await;
        }
    }
}

//! The lab orchestration pass: resolve templates, replace any stale
//! project, deploy the topology, wire links, start nodes, and always
//! close the project on the way out so re-runs find a clean controller.

mod activate;
mod project;
mod templates;
mod topology;

pub use activate::NodeActivator;
pub use project::ensure_clean_project;
pub use templates::{find_template, resolve_template};
pub use topology::DeployedLab;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, VmBackend};
use crate::controller::{ControllerClient, ControllerError};
use crate::lab::{LabDefinition, SWITCH_TEMPLATE_TYPE};
use crate::lockclear::LockClearer;

#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error("template '{name}' of type '{kind}' not found")]
    TemplateNotFound { name: String, kind: String },

    #[error("node '{name}' missing from project after deployment")]
    NodeNotFound { name: String },

    #[error("no compute nodes available on the controller")]
    NoComputeAvailable,

    #[error("node '{node}' did not reach status '{desired}' within {elapsed:?}")]
    ConvergenceTimeout {
        node: String,
        desired: String,
        elapsed: Duration,
    },

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Template ids resolved for the lab; `vms` is parallel to the
/// definition's VM roles.
#[derive(Debug)]
pub struct ResolvedTemplates {
    pub switch: String,
    pub vms: Vec<String>,
}

/// Runs one orchestration pass against the controller. The pass is
/// strictly sequential; the only suspension points are retry backoffs,
/// poll intervals and the settle delays.
pub struct Orchestrator {
    client: ControllerClient,
    config: Config,
    lock_clearer: Option<Arc<dyn LockClearer>>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        lock_clearer: Option<Arc<dyn LockClearer>>,
    ) -> Result<Self, ControllerError> {
        let client = ControllerClient::new(&config.controller_url)?;
        Ok(Self {
            client,
            config,
            lock_clearer,
        })
    }

    /// Run the full pass. Whatever happens after project creation, the
    /// project is closed before returning; close failures are logged and
    /// swallowed so the original error (if any) wins.
    pub async fn run(&self) -> Result<(), OrchestrateError> {
        let lab = LabDefinition::from_config(&self.config);

        let version = self.client.version().await?;
        tracing::info!("Connected to controller version {}", version.version);

        let templates = self.resolve_templates(&lab).await?;
        let compute_id = self.detect_compute().await?;

        let project_id = ensure_clean_project(
            &self.client,
            &self.config.project_name,
            self.config.projects_dir.as_deref(),
            &self.config.timing,
        )
        .await?;

        let result = self
            .provision(&project_id, &lab, &templates, &compute_id)
            .await;

        if let Err(e) = self.client.close_project(&project_id).await {
            tracing::warn!(project_id = %project_id, "Failed to close project: {}", e);
        } else {
            tracing::info!(project_id = %project_id, "Project closed");
        }

        result
    }

    /// Everything that needs the project to exist: nodes, links, starts.
    async fn provision(
        &self,
        project_id: &str,
        lab: &LabDefinition,
        templates: &ResolvedTemplates,
        compute_id: &str,
    ) -> Result<(), OrchestrateError> {
        let deployed =
            topology::deploy(&self.client, project_id, lab, templates, compute_id).await?;
        topology::wire_links(&self.client, project_id, lab, &deployed).await?;

        let activator = NodeActivator::new(
            &self.client,
            &self.config.timing,
            self.lock_clearer.clone(),
        );
        activator
            .activate(project_id, &deployed, self.config.strategy)
            .await?;

        tracing::info!("Lab deployed and started");
        Ok(())
    }

    async fn resolve_templates(
        &self,
        lab: &LabDefinition,
    ) -> Result<ResolvedTemplates, OrchestrateError> {
        let switch =
            resolve_template(&self.client, &lab.switch_template, SWITCH_TEMPLATE_TYPE).await?;

        let vm_type = self.config.backend.template_type();
        let mut vms = Vec::with_capacity(lab.vms.len());
        for role in &lab.vms {
            vms.push(resolve_template(&self.client, &role.template_name, vm_type).await?);
        }

        Ok(ResolvedTemplates { switch, vms })
    }

    /// Pick the execution target: the controller's first compute for
    /// vmware-backed labs, the literal "local" compute for virtualbox.
    async fn detect_compute(&self) -> Result<String, OrchestrateError> {
        match self.config.backend {
            VmBackend::Virtualbox => Ok("local".to_string()),
            VmBackend::Vmware => {
                let computes = self.client.computes().await?;
                let first = computes
                    .into_iter()
                    .next()
                    .ok_or(OrchestrateError::NoComputeAvailable)?;
                tracing::info!("Using compute {}", first.compute_id);
                Ok(first.compute_id)
            }
        }
    }
}

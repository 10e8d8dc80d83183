use crate::controller::types::{LinkEndpoint, NodeCreate, NodeInfo};
use crate::controller::ControllerClient;
use crate::lab::LabDefinition;

use super::{OrchestrateError, ResolvedTemplates};

/// Controller-assigned runtime ids for the deployed lab. `vm_ids` is
/// `(node name, node_id)` in definition order.
#[derive(Debug)]
pub struct DeployedLab {
    pub switch_name: String,
    pub switch_id: String,
    pub vm_ids: Vec<(String, String)>,
}

/// Instantiate one node from a template at a fixed canvas position.
/// Creation errors are never retried — a conflict here is a real problem.
async fn create_node(
    client: &ControllerClient,
    project_id: &str,
    name: &str,
    template_id: &str,
    x: i32,
    y: i32,
    compute_id: &str,
) -> Result<NodeInfo, OrchestrateError> {
    let node = client
        .create_node_from_template(
            project_id,
            template_id,
            &NodeCreate {
                name: name.to_string(),
                x,
                y,
                compute_id: compute_id.to_string(),
            },
        )
        .await?;
    tracing::info!(node = name, node_id = %node.node_id, "Deployed node");
    Ok(node)
}

/// Create every node in the lab, then re-fetch the node list and resolve
/// each role name to its assigned id. A role missing from the list means
/// an earlier creation silently failed, and that is fatal.
pub async fn deploy(
    client: &ControllerClient,
    project_id: &str,
    lab: &LabDefinition,
    templates: &ResolvedTemplates,
    compute_id: &str,
) -> Result<DeployedLab, OrchestrateError> {
    create_node(client, project_id, &lab.switch_name, &templates.switch, 0, 0, compute_id).await?;
    for (role, template_id) in lab.vms.iter().zip(&templates.vms) {
        create_node(
            client,
            project_id,
            &role.node_name,
            template_id,
            role.x,
            role.y,
            compute_id,
        )
        .await?;
    }

    let nodes = client.nodes(project_id).await?;
    let switch_id = node_id_by_name(&nodes, &lab.switch_name)?;
    let mut vm_ids = Vec::with_capacity(lab.vms.len());
    for role in &lab.vms {
        vm_ids.push((role.node_name.clone(), node_id_by_name(&nodes, &role.node_name)?));
    }

    Ok(DeployedLab {
        switch_name: lab.switch_name.clone(),
        switch_id,
        vm_ids,
    })
}

/// Wire the star: each VM's adapter 0/port 0 to its assigned switch port.
/// Only called once every endpoint id is resolved.
pub async fn wire_links(
    client: &ControllerClient,
    project_id: &str,
    lab: &LabDefinition,
    deployed: &DeployedLab,
) -> Result<(), OrchestrateError> {
    for (role, (name, node_id)) in lab.vms.iter().zip(&deployed.vm_ids) {
        client
            .create_link(
                project_id,
                LinkEndpoint {
                    node_id: node_id.clone(),
                    adapter_number: 0,
                    port_number: 0,
                },
                LinkEndpoint {
                    node_id: deployed.switch_id.clone(),
                    adapter_number: 0,
                    port_number: role.switch_port,
                },
            )
            .await?;
        tracing::info!(node = %name, switch_port = role.switch_port, "Linked node to switch");
    }
    Ok(())
}

fn node_id_by_name(nodes: &[NodeInfo], name: &str) -> Result<String, OrchestrateError> {
    nodes
        .iter()
        .find(|n| n.name == name)
        .map(|n| n.node_id.clone())
        .ok_or_else(|| OrchestrateError::NodeNotFound {
            name: name.to_string(),
        })
}

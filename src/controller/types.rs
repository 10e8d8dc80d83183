use serde::{Deserialize, Serialize};

// --- Controller /v2 API types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub template_id: String,
    pub name: String,
    pub template_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compute {
    pub compute_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectCreate {
    pub name: String,
}

/// Payload for instantiating a node from a template.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeCreate {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub compute_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub node_id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// One side of a point-to-point link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub node_id: String,
    pub adapter_number: u32,
    pub port_number: u32,
}

/// Link creation payload: exactly two endpoints, order irrelevant.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkCreate {
    pub nodes: Vec<LinkEndpoint>,
}

/// Node lifecycle statuses reported by the controller. This system only
/// ever reads them; transitions are the controller's business.
pub mod node_status {
    pub const STOPPED: &str = "stopped";
    pub const STARTING: &str = "starting";
    pub const STARTED: &str = "started";
}

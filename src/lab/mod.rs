use crate::config::Config;

pub const SWITCH_NODE_NAME: &str = "Lab-Switch";
pub const RED_NODE_NAME: &str = "Red-Team-VM";
pub const BLUE_NODE_NAME: &str = "Blue-Team-VM";
pub const TARGET_NODE_NAME: &str = "Target-VM";

/// Template type for the switch hub, independent of the VM backend.
pub const SWITCH_TEMPLATE_TYPE: &str = "ethernet_switch";

/// One VM role in the lab: display name, the template it instantiates,
/// canvas placement and the switch port it plugs into.
#[derive(Debug, Clone)]
pub struct VmRole {
    pub node_name: String,
    pub template_name: String,
    pub x: i32,
    pub y: i32,
    pub switch_port: u32,
}

/// The fixed lab topology: one Ethernet switch as the sole hub plus the
/// VM roles, star-wired to distinct switch ports. In-memory only; the
/// controller's project is the persistent form.
#[derive(Debug, Clone)]
pub struct LabDefinition {
    pub switch_name: String,
    pub switch_template: String,
    pub vms: Vec<VmRole>,
}

impl LabDefinition {
    /// Build the red/blue star lab: switch at the origin, red and blue on
    /// either side, optional target VM above on switch port 2.
    pub fn from_config(cfg: &Config) -> Self {
        let mut vms = vec![
            VmRole {
                node_name: RED_NODE_NAME.to_string(),
                template_name: cfg.red_template.clone(),
                x: -200,
                y: -100,
                switch_port: 0,
            },
            VmRole {
                node_name: BLUE_NODE_NAME.to_string(),
                template_name: cfg.blue_template.clone(),
                x: 200,
                y: -100,
                switch_port: 1,
            },
        ];

        if let Some(target) = &cfg.target_template {
            vms.push(VmRole {
                node_name: TARGET_NODE_NAME.to_string(),
                template_name: target.clone(),
                x: 0,
                y: -200,
                switch_port: 2,
            });
        }

        Self {
            switch_name: SWITCH_NODE_NAME.to_string(),
            switch_template: cfg.switch_template.clone(),
            vms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, StartStrategy, Timing, VmBackend};

    fn base_config() -> Config {
        Config {
            controller_url: "http://localhost:3080".into(),
            listen_addr: "127.0.0.1:0".into(),
            project_name: "Red vs Blue Lab 1".into(),
            switch_template: "Ethernet switch".into(),
            red_template: "Red-VM".into(),
            blue_template: "Blue-VM".into(),
            target_template: None,
            backend: VmBackend::Vmware,
            strategy: StartStrategy::BoundedRetry,
            projects_dir: None,
            timing: Timing::default(),
        }
    }

    #[test]
    fn default_lab_is_red_blue_star() {
        let lab = LabDefinition::from_config(&base_config());
        assert_eq!(lab.switch_name, SWITCH_NODE_NAME);
        assert_eq!(lab.vms.len(), 2);
        assert_eq!(lab.vms[0].node_name, RED_NODE_NAME);
        assert_eq!(lab.vms[1].node_name, BLUE_NODE_NAME);
    }

    #[test]
    fn vm_roles_use_distinct_switch_ports() {
        let mut cfg = base_config();
        cfg.target_template = Some("Target-VM-Template".into());
        let lab = LabDefinition::from_config(&cfg);
        assert_eq!(lab.vms.len(), 3);

        let mut ports: Vec<u32> = lab.vms.iter().map(|r| r.switch_port).collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), lab.vms.len());
    }
}

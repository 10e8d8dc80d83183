use std::env;
use std::time::Duration;

/// Which hypervisor backs the VM templates. The profile decides the
/// template type string, the compute target and the default start strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmBackend {
    Vmware,
    Virtualbox,
}

impl VmBackend {
    /// Template type string the controller catalog uses for this backend.
    pub fn template_type(self) -> &'static str {
        match self {
            VmBackend::Vmware => "vmware",
            VmBackend::Virtualbox => "virtualbox",
        }
    }

    pub fn default_strategy(self) -> StartStrategy {
        match self {
            // VMware holds host-level VM-file locks; starts must tolerate 409s.
            VmBackend::Vmware => StartStrategy::BoundedRetry,
            VmBackend::Virtualbox => StartStrategy::Sequential,
        }
    }
}

/// How the activator brings nodes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStrategy {
    /// Start every node, retrying 409 conflicts with linear backoff.
    /// A node that exhausts its retries is skipped, not fatal.
    BoundedRetry,
    /// Start the switch first and poll it to "started" before touching
    /// any VM, then each VM in turn. Convergence timeouts are fatal.
    Sequential,
}

/// Delays and bounds for the orchestration pass. Injected through Config
/// so tests can run with millisecond values.
#[derive(Debug, Clone)]
pub struct Timing {
    /// One-time hypervisor warm-up delay before the first start attempt.
    pub settle_delay: Duration,
    /// Backoff unit for 409 retries: attempt n waits `retry_base * (n + 1)`.
    pub retry_base: Duration,
    pub start_attempts: u32,
    pub poll_interval: Duration,
    pub convergence_timeout: Duration,
    /// Pause after closing a stale project, before deleting it.
    pub close_settle: Duration,
    /// Pause after deleting a stale project, before recreating it.
    pub delete_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(15),
            retry_base: Duration::from_secs(5),
            start_attempts: 5,
            poll_interval: Duration::from_secs(5),
            convergence_timeout: Duration::from_secs(180),
            close_settle: Duration::from_secs(1),
            delete_settle: Duration::from_secs(2),
        }
    }
}

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub controller_url: String,
    pub listen_addr: String,
    pub project_name: String,
    pub switch_template: String,
    pub red_template: String,
    pub blue_template: String,
    /// Optional third VM role; absent when unset.
    pub target_template: Option<String>,
    pub backend: VmBackend,
    pub strategy: StartStrategy,
    /// Controller's on-disk project storage root. When set, stale project
    /// directories are purged during cleanup.
    pub projects_dir: Option<String>,
    pub timing: Timing,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        let backend = match get_env("VM_BACKEND", "vmware").as_str() {
            "virtualbox" => VmBackend::Virtualbox,
            _ => VmBackend::Vmware,
        };
        let strategy = match env::var("START_STRATEGY").ok().as_deref() {
            Some("retry") => StartStrategy::BoundedRetry,
            Some("sequential") => StartStrategy::Sequential,
            _ => backend.default_strategy(),
        };

        Self {
            controller_url: get_env("CONTROLLER_URL", "http://localhost:3080"),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            project_name: get_env("PROJECT_NAME", "Red vs Blue Lab 1"),
            switch_template: get_env("SWITCH_TEMPLATE", "Ethernet switch"),
            red_template: get_env("RED_TEMPLATE", "Red-VM"),
            blue_template: get_env("BLUE_TEMPLATE", "Blue-VM"),
            target_template: env::var("TARGET_TEMPLATE").ok().filter(|s| !s.is_empty()),
            backend,
            strategy,
            projects_dir: env::var("PROJECTS_DIR").ok().filter(|s| !s.is_empty()),
            timing: Timing {
                settle_delay: secs_env("SETTLE_DELAY_SECS", 15),
                retry_base: secs_env("RETRY_BASE_SECS", 5),
                start_attempts: get_env("START_ATTEMPTS", "5").parse().unwrap_or(5),
                poll_interval: secs_env("POLL_INTERVAL_SECS", 5),
                convergence_timeout: secs_env("CONVERGENCE_TIMEOUT_SECS", 180),
                ..Timing::default()
            },
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn secs_env(key: &str, default: u64) -> Duration {
    Duration::from_secs(get_env(key, &default.to_string()).parse().unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_template_types() {
        assert_eq!(VmBackend::Vmware.template_type(), "vmware");
        assert_eq!(VmBackend::Virtualbox.template_type(), "virtualbox");
    }

    #[test]
    fn backend_default_strategies() {
        assert_eq!(VmBackend::Vmware.default_strategy(), StartStrategy::BoundedRetry);
        assert_eq!(VmBackend::Virtualbox.default_strategy(), StartStrategy::Sequential);
    }
}

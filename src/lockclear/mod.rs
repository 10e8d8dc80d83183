use async_trait::async_trait;

/// Pre-start hook that clears stale hypervisor VM-file locks. Entirely
/// best-effort: implementations log failures and never return errors, so
/// the activator's retry logic stays independent of host inspection.
#[async_trait]
pub trait LockClearer: Send + Sync {
    async fn clear_locks(&self);
}

/// For backends without host-side lock problems.
pub struct NoopLockClearer;

#[async_trait]
impl LockClearer for NoopLockClearer {
    async fn clear_locks(&self) {}
}

/// Kills stray hypervisor worker processes that hold exclusive VM-file
/// locks and cause spurious 409s on node start.
pub struct HypervisorProcessClearer {
    process_names: Vec<String>,
}

impl HypervisorProcessClearer {
    pub fn new(process_names: Vec<String>) -> Self {
        Self { process_names }
    }
}

impl Default for HypervisorProcessClearer {
    fn default() -> Self {
        Self::new(vec!["vmware-vmx".to_string()])
    }
}

#[async_trait]
impl LockClearer for HypervisorProcessClearer {
    async fn clear_locks(&self) {
        #[cfg(unix)]
        {
            let names = self.process_names.clone();
            // /proc scanning is blocking filesystem I/O
            if let Err(e) = tokio::task::spawn_blocking(move || kill_matching(&names)).await {
                tracing::warn!("Hypervisor process scan task failed: {}", e);
            }
        }
        #[cfg(not(unix))]
        tracing::warn!(
            "Hypervisor lock clearing is not supported on this platform, skipping"
        );
    }
}

#[cfg(unix)]
fn kill_matching(names: &[String]) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let entries = match std::fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot scan /proc for hypervisor workers: {}", e);
            return;
        }
    };

    let mut found = false;
    for entry in entries.flatten() {
        let pid: i32 = match entry.file_name().to_string_lossy().parse() {
            Ok(pid) => pid,
            Err(_) => continue,
        };
        let comm = match std::fs::read_to_string(entry.path().join("comm")) {
            Ok(comm) => comm.trim().to_lowercase(),
            Err(_) => continue,
        };
        if !names.iter().any(|n| comm.contains(&n.to_lowercase())) {
            continue;
        }

        found = true;
        tracing::warn!(pid, process = %comm, "Hypervisor worker holds VM locks, killing it");
        match kill(Pid::from_raw(pid), Signal::SIGKILL) {
            Ok(()) => tracing::info!(pid, "Killed {}", comm),
            Err(e) => tracing::warn!(pid, "Failed to kill {}: {}", comm, e),
        }
    }

    if !found {
        tracing::info!("No hypervisor worker processes detected, safe to continue");
    }
}

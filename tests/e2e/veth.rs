//! veth pair test helpers

use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique interface names
static VETH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A veth pair that is deleted again on drop. Requires CAP_NET_ADMIN.
pub struct VethPair {
    pub left: String,
    pub right: String,
}

impl VethPair {
    /// Create and bring up a pair with names that fit IFNAMSIZ
    pub fn create() -> Result<Self, String> {
        let id = format!(
            "{}{}",
            std::process::id() % 10000,
            VETH_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        let pair = Self {
            left: format!("pl{}", id),
            right: format!("pr{}", id),
        };

        ip(&[
            "link", "add", &pair.left, "type", "veth", "peer", "name", &pair.right,
        ])?;
        ip(&["link", "set", &pair.left, "up"])?;
        ip(&["link", "set", &pair.right, "up"])?;

        Ok(pair)
    }
}

impl Drop for VethPair {
    fn drop(&mut self) {
        // Deleting one end removes both
        let _ = ip(&["link", "del", &self.left]);
    }
}

fn ip(args: &[&str]) -> Result<(), String> {
    let output = Command::new("ip")
        .args(args)
        .output()
        .map_err(|e| format!("Failed to run ip: {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "ip {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    Ok(())
}

/// Interface attribute as reported by sysfs
pub fn sysfs(interface: &str, attribute: &str) -> String {
    std::fs::read_to_string(format!("/sys/class/net/{}/{}", interface, attribute))
        .unwrap_or_else(|e| panic!("read {} of {}: {}", attribute, interface, e))
        .trim()
        .to_string()
}

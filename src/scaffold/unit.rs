//! systemd unit that brings the compose stack up at boot.
use std::path::Path;

/// Render the unit for a project rooted at `root`.
#[must_use]
pub fn render(root: &Path) -> String {
    format!(
        "[Unit]
Description=Healing platform data stores
Requires=docker.service
After=docker.service network-online.target

[Service]
Type=oneshot
RemainAfterExit=yes
WorkingDirectory={root}
ExecStart=/usr/bin/docker compose up -d
ExecStop=/usr/bin/docker compose down
TimeoutStartSec=0

[Install]
WantedBy=multi-user.target
",
        root = root.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_binds_to_docker_and_root() {
        let unit = render(Path::new("/home/dev/healing-platform"));
        assert!(unit.contains("Requires=docker.service"));
        assert!(unit.contains("WorkingDirectory=/home/dev/healing-platform\n"));
        assert!(unit.contains("ExecStart=/usr/bin/docker compose up -d"));
        assert!(unit.contains("ExecStop=/usr/bin/docker compose down"));
        assert!(unit.ends_with("WantedBy=multi-user.target\n"));
    }
}

//! Project README.
use std::fmt::Write as _;

use super::compose::ADMIN_SERVICE;
use super::{SERVICES, UNIT_NAME};
use crate::config::Settings;

/// Render `README.md` for `settings`.
#[must_use]
pub fn render(settings: &Settings) -> String {
    let host = settings.preset.bind_address().unwrap_or("localhost");
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Healing Platform\n");
    let _ = writeln!(
        out,
        "Local development environment (`{}` preset) generated by `healing-setup`.\n",
        settings.preset
    );

    let _ = writeln!(out, "## Data stores\n");
    let _ = writeln!(out, "| Container | Address |");
    let _ = writeln!(out, "|-----------|---------|");
    for (name, port) in [("mongodb", 27017), ("timescaledb", 5432), ("redis", 6379)] {
        let _ = writeln!(out, "| {name} | {host}:{port} |");
    }
    if settings.admin_ui {
        let _ = writeln!(out, "| {ADMIN_SERVICE} | http://{host}:8080 |");
    }

    let _ = writeln!(out, "\n## Services\n");
    for svc in &SERVICES {
        let _ = writeln!(
            out,
            "- `services/{}` on port {} (`GET /health`)",
            svc.name, svc.port
        );
    }
    let _ = writeln!(
        out,
        "- `dashboard/src/HealthDashboard.jsx` polls each service's health endpoint"
    );

    let _ = writeln!(out, "\n## Usage\n");
    let _ = writeln!(out, "```sh");
    let _ = writeln!(out, "./start.sh    # containers + services, PIDs in .pids/");
    let _ = writeln!(out, "./status.sh   # container state and health probes");
    let _ = writeln!(out, "./stop.sh     # stop services and containers");
    let _ = writeln!(out, "```");

    if settings.preset.registers_unit() {
        let _ = writeln!(
            out,
            "\nThe containers are also managed by `{UNIT_NAME}` \
             (`sudo systemctl start {UNIT_NAME}`)."
        );
    }

    let _ = writeln!(out, "\n## Credentials\n");
    let _ = writeln!(
        out,
        "The defaults in `docker-compose.yml` are for local development only. \
         Change them before exposing any port beyond this machine."
    );
    let _ = writeln!(
        out,
        "\nLog out and back in after the first install so the `docker` group \
         membership takes effect."
    );
    out
}

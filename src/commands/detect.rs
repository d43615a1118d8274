//! Command: print what host detection resolves.
use crate::exec::SystemExecutor;
use crate::operations::SystemFileSystemOps;
use crate::platform::HostProfile;

/// Detect the host and print the result to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let host = HostProfile::detect(&SystemExecutor, &SystemFileSystemOps);
    print!("{}", report(&host));
}

/// Two-line report of the package manager and distribution.
#[must_use]
pub fn report(host: &HostProfile) -> String {
    let manager = host
        .manager
        .map_or_else(|| "none (unsupported)".to_string(), |pm| pm.to_string());
    let codename = host
        .distro
        .codename
        .as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default();
    format!(
        "package manager: {manager}\ndistribution: {}{codename}\n",
        host.distro
    )
}

//! Launcher, stop and status scripts.
//!
//! The scripts locate the project through their own path, so their content
//! does not depend on the configured root.
use super::{Payload, SERVICES};

const START: &str = r#"#!/usr/bin/env bash
# Start the data stores and every service in the background.
set -euo pipefail
cd "$(dirname "$0")"
mkdir -p .pids logs

docker compose up -d

for svc in @SERVICES@; do
    pidfile=".pids/$svc.pid"
    if [ -f "$pidfile" ] && kill -0 "$(cat "$pidfile")" 2>/dev/null; then
        echo "$svc already running (pid $(cat "$pidfile"))"
        continue
    fi
    if [ ! -d "services/$svc/node_modules" ]; then
        (cd "services/$svc" && npm install --silent)
    fi
    (cd "services/$svc" && nohup npm start >"../../logs/$svc.log" 2>&1 & echo $! >"../../.pids/$svc.pid")
    echo "started $svc (pid $(cat "$pidfile"))"
done
"#;

const STOP: &str = r#"#!/usr/bin/env bash
# Stop every service recorded in .pids/ and the data stores.
set -uo pipefail
cd "$(dirname "$0")"

for pidfile in .pids/*.pid; do
    [ -e "$pidfile" ] || continue
    svc="$(basename "$pidfile" .pid)"
    if kill "$(cat "$pidfile")" 2>/dev/null; then
        echo "stopped $svc"
    fi
    rm -f "$pidfile"
done

docker compose stop
"#;

const STATUS: &str = r#"#!/usr/bin/env bash
# Show container state and probe each service's /health endpoint.
set -uo pipefail
cd "$(dirname "$0")"

docker compose ps

for entry in @PORTS@; do
    svc="${entry%%:*}"
    port="${entry##*:}"
    pidfile=".pids/$svc.pid"
    if [ -f "$pidfile" ] && kill -0 "$(cat "$pidfile")" 2>/dev/null; then
        state="running (pid $(cat "$pidfile"))"
    else
        state="stopped"
    fi
    health="$(curl -fsS "http://localhost:$port/health" 2>/dev/null || echo unreachable)"
    echo "$svc: $state, health: $health"
done
"#;

/// The three scripts, executable.
#[must_use]
pub fn payloads() -> Vec<Payload> {
    let names: Vec<&str> = SERVICES.iter().map(|s| s.name).collect();
    let ports: Vec<String> = SERVICES
        .iter()
        .map(|s| format!("{}:{}", s.name, s.port))
        .collect();
    vec![
        Payload::executable("start.sh", START.replace("@SERVICES@", &names.join(" "))),
        Payload::executable("stop.sh", STOP),
        Payload::executable("status.sh", STATUS.replace("@PORTS@", &ports.join(" "))),
    ]
}

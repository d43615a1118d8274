//! `docker-compose.yml` for the platform's data stores.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Settings;

/// Shared network declared by the standard preset.
pub const NETWORK: &str = "healing-net";

/// Services every descriptor contains.
pub const CORE_SERVICES: [&str; 3] = ["mongodb", "timescaledb", "redis"];

/// Optional database admin UI.
pub const ADMIN_SERVICE: &str = "adminer";

const HEADER: &str = "# Generated by healing-setup. Local development credentials only.\n";

/// Top-level compose document.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeFile {
    /// Containers by service name.
    pub services: BTreeMap<String, ComposeService>,
    /// Named volumes.
    pub volumes: BTreeMap<String, Volume>,
    /// Networks (standard preset only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, Network>,
}

/// One container.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeService {
    /// Image reference.
    pub image: String,
    /// Fixed container name.
    pub container_name: String,
    /// Restart policy.
    pub restart: String,
    /// Command override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Published ports (`[host_ip:]host:container`).
    pub ports: Vec<String>,
    /// Volume mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Services started first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Attached networks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
}

/// Named volume with default driver (rendered as an empty entry).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Volume;

/// Network definition.
#[derive(Debug, Clone, Serialize)]
pub struct Network {
    /// Network driver.
    pub driver: String,
}

struct ServiceDef {
    name: &'static str,
    image: &'static str,
    port: u16,
    command: Option<&'static str>,
    env: &'static [(&'static str, &'static str)],
    volume: Option<(&'static str, &'static str)>,
    depends_on: &'static [&'static str],
}

const MONGODB: ServiceDef = ServiceDef {
    name: "mongodb",
    image: "mongo:7.0",
    port: 27017,
    command: None,
    env: &[
        ("MONGO_INITDB_DATABASE", "healing"),
        ("MONGO_INITDB_ROOT_PASSWORD", "healing123"),
        ("MONGO_INITDB_ROOT_USERNAME", "admin"),
    ],
    volume: Some(("mongodb_data", "/data/db")),
    depends_on: &[],
};

const TIMESCALEDB: ServiceDef = ServiceDef {
    name: "timescaledb",
    image: "timescale/timescaledb:latest-pg15",
    port: 5432,
    command: None,
    env: &[
        ("POSTGRES_DB", "healing_metrics"),
        ("POSTGRES_PASSWORD", "healing123"),
        ("POSTGRES_USER", "healing"),
    ],
    volume: Some(("timescaledb_data", "/var/lib/postgresql/data")),
    depends_on: &[],
};

const REDIS: ServiceDef = ServiceDef {
    name: "redis",
    image: "redis:7-alpine",
    port: 6379,
    command: Some("redis-server --appendonly yes"),
    env: &[],
    volume: Some(("redis_data", "/data")),
    depends_on: &[],
};

const ADMINER: ServiceDef = ServiceDef {
    name: ADMIN_SERVICE,
    image: "adminer:4",
    port: 8080,
    command: None,
    env: &[("ADMINER_DEFAULT_SERVER", "timescaledb")],
    volume: None,
    depends_on: &["timescaledb"],
};

impl ComposeFile {
    /// Build the descriptor for `settings`.
    #[must_use]
    pub fn build(settings: &Settings) -> Self {
        let preset = settings.preset;
        let mut defs = vec![MONGODB, TIMESCALEDB, REDIS];
        if settings.admin_ui {
            defs.push(ADMINER);
        }

        let mut services = BTreeMap::new();
        let mut volumes = BTreeMap::new();
        for def in defs {
            let port = preset.bind_address().map_or_else(
                || format!("{0}:{0}", def.port),
                |addr| format!("{addr}:{0}:{0}", def.port),
            );
            let mounts = def.volume.map_or_else(Vec::new, |(volume, target)| {
                volumes.insert(volume.to_string(), Volume);
                vec![format!("{volume}:{target}")]
            });
            let service = ComposeService {
                image: def.image.to_string(),
                container_name: format!("healing-{}", def.name),
                restart: "unless-stopped".to_string(),
                command: def.command.map(ToString::to_string),
                environment: def
                    .env
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                ports: vec![port],
                volumes: mounts,
                depends_on: def.depends_on.iter().map(ToString::to_string).collect(),
                networks: if preset.uses_network() {
                    vec![NETWORK.to_string()]
                } else {
                    Vec::new()
                },
            };
            services.insert(def.name.to_string(), service);
        }

        let mut networks = BTreeMap::new();
        if preset.uses_network() {
            networks.insert(
                NETWORK.to_string(),
                Network {
                    driver: "bridge".to_string(),
                },
            );
        }

        Self {
            services,
            volumes,
            networks,
        }
    }
}

/// Render `docker-compose.yml` for `settings`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render(settings: &Settings) -> Result<String, serde_yaml::Error> {
    let body = serde_yaml::to_string(&ComposeFile::build(settings))?;
    Ok(format!("{HEADER}{body}"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use std::path::Path;

    fn settings(preset: Preset, admin_ui: bool) -> Settings {
        Settings {
            preset,
            admin_ui,
            ..Settings::defaults(Path::new("/home/dev"))
        }
    }

    fn parsed(settings: &Settings) -> serde_yaml::Value {
        serde_yaml::from_str(&render(settings).unwrap()).unwrap()
    }

    #[test]
    fn three_core_services_each_with_named_volume() {
        let doc = parsed(&settings(Preset::Standard, false));
        let services = doc["services"].as_mapping().unwrap();
        assert_eq!(services.len(), 3);
        for name in CORE_SERVICES {
            let svc = &doc["services"][name];
            let mount = svc["volumes"][0].as_str().unwrap();
            let volume = mount.split(':').next().unwrap();
            assert!(
                doc["volumes"].get(volume).is_some(),
                "{name} mounts undeclared volume {volume}"
            );
        }
    }

    #[test]
    fn admin_ui_adds_fourth_service() {
        let doc = parsed(&settings(Preset::Standard, true));
        assert_eq!(doc["services"].as_mapping().unwrap().len(), 4);
        assert_eq!(doc["services"]["adminer"]["image"].as_str(), Some("adminer:4"));
        assert_eq!(doc["volumes"].as_mapping().unwrap().len(), 3);
    }

    #[test]
    fn declared_images_and_ports() {
        let doc = parsed(&settings(Preset::Standard, true));
        let expect = [
            ("mongodb", "mongo:7.0", "27017:27017"),
            ("timescaledb", "timescale/timescaledb:latest-pg15", "5432:5432"),
            ("redis", "redis:7-alpine", "6379:6379"),
            ("adminer", "adminer:4", "8080:8080"),
        ];
        for (name, image, port) in expect {
            assert_eq!(doc["services"][name]["image"].as_str(), Some(image));
            assert_eq!(doc["services"][name]["ports"][0].as_str(), Some(port));
        }
    }

    #[test]
    fn standard_declares_network() {
        let doc = parsed(&settings(Preset::Standard, false));
        assert_eq!(doc["networks"][NETWORK]["driver"].as_str(), Some("bridge"));
        assert_eq!(doc["services"]["redis"]["networks"][0].as_str(), Some(NETWORK));
    }

    #[test]
    fn minimal_binds_loopback_without_network() {
        let doc = parsed(&settings(Preset::Minimal, false));
        assert!(doc.get("networks").is_none());
        assert_eq!(
            doc["services"]["mongodb"]["ports"][0].as_str(),
            Some("127.0.0.1:27017:27017")
        );
        assert!(doc["services"]["mongodb"].get("networks").is_none());
    }

    #[test]
    fn credentials_are_plaintext_environment() {
        let doc = parsed(&settings(Preset::Standard, false));
        assert_eq!(
            doc["services"]["timescaledb"]["environment"]["POSTGRES_USER"].as_str(),
            Some("healing")
        );
    }

    #[test]
    fn render_is_deterministic() {
        let s = settings(Preset::Standard, true);
        assert_eq!(render(&s).unwrap(), render(&s).unwrap());
        assert!(render(&s).unwrap().starts_with("# Generated by healing-setup"));
    }
}

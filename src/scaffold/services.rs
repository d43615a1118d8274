//! Placeholder Node.js services and the dashboard component.
use serde_json::json;

use super::{Payload, SERVICES, ServiceSpec};

const EXPRESS: &str = "^4.18.2";
const CORS: &str = "^2.8.5";
const SOCKET_IO: &str = "^4.7.2";

const SERVER_HEAD: &str = r"const express = require('express');
const cors = require('cors');

const SERVICE = '@NAME@';
const PORT = process.env.PORT || @PORT@;

const app = express();
app.use(cors());
app.use(express.json());

app.get('/health', (req, res) => {
  res.json({ status: 'ok', service: SERVICE, timestamp: new Date().toISOString() });
});
";

const AUTH_ROUTES: &str = r"
app.post('/api/auth/login', (req, res) => {
  res.json({ token: 'placeholder-token', user: { id: 1, username: req.body.username || 'demo' } });
});

app.get('/api/auth/verify', (req, res) => {
  res.json({ valid: true });
});

app.listen(PORT, () => console.log(`${SERVICE} listening on ${PORT}`));
";

const PROTOCOL_ROUTES: &str = r"
app.get('/api/protocols', (req, res) => {
  res.json([]);
});

app.post('/api/protocols', (req, res) => {
  res.status(201).json({ id: Date.now(), ...req.body });
});

app.listen(PORT, () => console.log(`${SERVICE} listening on ${PORT}`));
";

const SESSION_ROUTES: &str = r"
app.get('/api/sessions', (req, res) => {
  res.json([]);
});

const server = require('http').createServer(app);
const io = require('socket.io')(server, { cors: { origin: '*' } });

io.on('connection', (socket) => {
  socket.on('message', (msg) => socket.emit('message', msg));
});

server.listen(PORT, () => console.log(`${SERVICE} listening on ${PORT}`));
";

const DASHBOARD: &str = r"import React, { useEffect, useState } from 'react';

const SERVICES = [@ENDPOINTS@];

export default function HealthDashboard() {
  const [health, setHealth] = useState({});

  useEffect(() => {
    const poll = () =>
      SERVICES.forEach(({ name, url }) =>
        fetch(url)
          .then((r) => r.json())
          .then((body) => setHealth((h) => ({ ...h, [name]: body.status })))
          .catch(() => setHealth((h) => ({ ...h, [name]: 'down' })))
      );
    poll();
    const id = setInterval(poll, 5000);
    return () => clearInterval(id);
  }, []);

  return (
    <ul>
      {SERVICES.map(({ name }) => (
        <li key={name}>
          {name}: {health[name] || 'unknown'}
        </li>
      ))}
    </ul>
  );
}
";

fn routes(service: &ServiceSpec) -> &'static str {
    match service.name {
        "auth-service" => AUTH_ROUTES,
        "session-service" => SESSION_ROUTES,
        _ => PROTOCOL_ROUTES,
    }
}

/// `package.json` for `service`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn package_json(service: &ServiceSpec) -> Result<String, serde_json::Error> {
    let mut dependencies = json!({ "cors": CORS, "express": EXPRESS });
    if service.name == "session-service"
        && let Some(deps) = dependencies.as_object_mut()
    {
        deps.insert("socket.io".to_string(), json!(SOCKET_IO));
    }
    let manifest = json!({
        "name": service.name,
        "version": "0.1.0",
        "private": true,
        "main": "index.js",
        "scripts": { "start": "node index.js" },
        "dependencies": dependencies,
    });
    let mut text = serde_json::to_string_pretty(&manifest)?;
    text.push('\n');
    Ok(text)
}

/// `index.js` for `service`.
#[must_use]
pub fn index_js(service: &ServiceSpec) -> String {
    let head = SERVER_HEAD
        .replace("@NAME@", service.name)
        .replace("@PORT@", &service.port.to_string());
    format!("{head}{}", routes(service))
}

/// Dashboard component polling every service's `/health`.
#[must_use]
pub fn dashboard() -> String {
    let endpoints: Vec<String> = SERVICES
        .iter()
        .map(|s| {
            format!(
                "\n  {{ name: '{}', url: 'http://localhost:{}/health' }}",
                s.name, s.port
            )
        })
        .collect();
    DASHBOARD.replace("@ENDPOINTS@", &format!("{},\n", endpoints.join(",")))
}

/// Every service and dashboard file, relative to the project root.
///
/// # Errors
///
/// Returns an error if a `package.json` cannot be serialized.
pub fn payloads() -> Result<Vec<Payload>, serde_json::Error> {
    let mut files = Vec::new();
    for service in &SERVICES {
        let dir = format!("services/{}", service.name);
        files.push(Payload::new(
            format!("{dir}/package.json"),
            package_json(service)?,
        ));
        files.push(Payload::new(format!("{dir}/index.js"), index_js(service)));
    }
    files.push(Payload::new("dashboard/src/HealthDashboard.jsx", dashboard()));
    Ok(files)
}

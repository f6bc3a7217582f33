use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use axum::http::Method;
use serde_json::Value;
use tracing::warn;

/// Security scheme kinds the dispatcher knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Basic,
    Bearer,
}

/// One entry of an operation's `security` array: a scheme name plus the
/// scopes that scheme must grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub scheme: String,
    pub scopes: Vec<String>,
}

/// Parsed view of the OpenAPI document loaded at startup.
///
/// Only the parts the service acts on are modeled: which operations are
/// declared, which security requirements they carry, and what kind each
/// named security scheme is. The full document is kept verbatim so it can
/// be served back to clients.
#[derive(Debug)]
pub struct ApiSpec {
    document: Value,
    // key = "GET /users/:username" (router template syntax)
    operations: HashMap<String, Vec<Requirement>>,
    schemes: HashMap<String, SchemeKind>,
}

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "patch", "head", "options", "trace",
];

impl ApiSpec {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("read OpenAPI document {}", path.as_ref().display()))?;
        let document: Value = serde_json::from_str(&raw).context("parse OpenAPI document")?;
        Self::parse(document)
    }

    pub fn parse(document: Value) -> anyhow::Result<Self> {
        anyhow::ensure!(document.is_object(), "OpenAPI document must be a JSON object");

        let mut operations = HashMap::new();
        if let Some(paths) = document.get("paths").and_then(Value::as_object) {
            for (template, item) in paths {
                let Some(item) = item.as_object() else { continue };
                for (method, op) in item {
                    if !METHODS.contains(&method.as_str()) {
                        continue;
                    }
                    let key = operation_key(&method.to_uppercase(), &route_template(template));
                    operations.insert(key, parse_security(op));
                }
            }
        }

        let mut schemes = HashMap::new();
        if let Some(defs) = document
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
        {
            for (name, def) in defs {
                let kind = match (
                    def.get("type").and_then(Value::as_str),
                    def.get("scheme").and_then(Value::as_str),
                ) {
                    (Some("http"), Some("basic")) => SchemeKind::Basic,
                    (Some("http"), Some("bearer")) => SchemeKind::Bearer,
                    _ => {
                        warn!(scheme = %name, "unsupported security scheme, ignoring");
                        continue;
                    }
                };
                schemes.insert(name.clone(), kind);
            }
        }

        Ok(Self {
            document,
            operations,
            schemes,
        })
    }

    /// The document as loaded, for serving back to clients.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Security requirements of a declared operation, or `None` when the
    /// route is not in the document at all. `Some(&[])` means declared but
    /// open. `route_path` uses the router's template syntax (`:param`).
    pub fn security_for(&self, method: &Method, route_path: &str) -> Option<&[Requirement]> {
        self.operations
            .get(&operation_key(method.as_str(), route_path))
            .map(Vec::as_slice)
    }

    pub fn scheme(&self, name: &str) -> Option<SchemeKind> {
        self.schemes.get(name).copied()
    }
}

fn operation_key(method: &str, route_path: &str) -> String {
    format!("{method} {route_path}")
}

fn parse_security(op: &Value) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    if let Some(security) = op.get("security").and_then(Value::as_array) {
        for alternative in security {
            let Some(alternative) = alternative.as_object() else { continue };
            for (scheme, scopes) in alternative {
                let scopes = scopes
                    .as_array()
                    .map(|a| a.iter().filter_map(Value::as_str).map(str::to_owned).collect())
                    .unwrap_or_default();
                requirements.push(Requirement {
                    scheme: scheme.clone(),
                    scopes,
                });
            }
        }
    }
    requirements
}

/// Converts an OpenAPI path template (`/users/{username}`) to the router's
/// syntax (`/users/:username`).
fn route_template(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|name| format!(":{name}"))
                .unwrap_or_else(|| segment.to_owned())
        })
        .collect::<Vec<_>>()
        .join("/")
}

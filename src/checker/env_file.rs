//! `KEY=VALUE` environment file parsing

use std::collections::HashMap;

use tracing::debug;

/// Parse dotenv content without touching the process environment.
///
/// Quotes and a leading `export` are handled by `dotenvy`. Lines it rejects,
/// such as ones without `=`, are skipped. Later duplicates win.
#[inline]
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    dotenvy::from_read_iter(content.as_bytes())
        .filter_map(|item| match item {
            Ok(pair) => Some(pair),
            Err(e) => {
                debug!("Skipping env line: {}", e);
                None
            }
        })
        .collect()
}

/// Required variables that are absent, and those still holding a placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvAudit {
    pub missing: Vec<String>,
    pub placeholders: Vec<String>,
}

impl EnvAudit {
    #[inline]
    pub fn new(vars: &HashMap<String, String>, required: &[String], placeholder_prefix: &str) -> Self {
        let mut audit = Self::default();
        for name in required {
            match vars.get(name) {
                None => audit.missing.push(name.clone()),
                Some(value) if value.starts_with(placeholder_prefix) => {
                    audit.placeholders.push(name.clone());
                }
                Some(_) => {}
            }
        }
        audit
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.placeholders.is_empty()
    }
}

//! Dashboard page templates.
//!
//! The syntax is deliberately small: `{{field}}` inserts an HTML-escaped value
//! and `{{#services}} ... {{/services}}` repeats its body once per service.
//! Inside the section, service fields shadow top-level ones.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use shared::types::ServiceStatus;
use super::view::{service_field, DashboardView};

const TEMPLATE_FILE: &str = "dashboard.html";
const SERVICES_SECTION: &str = "services";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Field(String),
    Services(Vec<Node>),
}

#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

/// Locations checked for the dashboard template, in priority order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        // Local development
        PathBuf::from("templates").join(TEMPLATE_FILE),
        // System install
        PathBuf::from("/usr/share/homelab-dashboard/templates").join(TEMPLATE_FILE),
    ];

    // Installed under a prefix next to the binary, e.g. a Nix store path
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        paths.push(dir.join("../share/homelab-dashboard/templates").join(TEMPLATE_FILE));
    }

    paths
}

/// Load the first template in `paths` that exists and parses.
pub fn locate(paths: &[PathBuf]) -> Result<Template> {
    for path in paths.iter().filter(|p| p.is_file()) {
        match Template::from_file(path) {
            Ok(template) => return Ok(template),
            Err(e) => tracing::warn!("Skipping template {}: {:#}", path.display(), e),
        }
    }

    bail!("Template not found in any location")
}

impl Template {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;

        Template::parse(&source)
            .with_context(|| format!("Failed to parse template: {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        // Bottom entry collects top-level nodes; each open section pushes one more.
        let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                push(&mut stack, Node::Text(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| anyhow!("Unterminated tag at byte {}", source.len() - rest.len() + start))?;
            let tag = after[..end].trim();
            rest = &after[end + 2..];

            if let Some(name) = tag.strip_prefix('#') {
                if name.trim() != SERVICES_SECTION {
                    bail!("Unknown section: {}", name.trim());
                }
                if stack.len() > 1 {
                    bail!("Nested {} sections are not supported", SERVICES_SECTION);
                }
                stack.push(Vec::new());
            } else if let Some(name) = tag.strip_prefix('/') {
                if name.trim() != SERVICES_SECTION || stack.len() < 2 {
                    bail!("Unexpected closing tag: {}", name.trim());
                }
                let body = stack.pop().unwrap_or_default();
                push(&mut stack, Node::Services(body));
            } else if tag.is_empty() {
                bail!("Empty tag");
            } else {
                push(&mut stack, Node::Field(tag.to_string()));
            }
        }

        if !rest.is_empty() {
            push(&mut stack, Node::Text(rest.to_string()));
        }

        if stack.len() != 1 {
            bail!("Unclosed {} section", SERVICES_SECTION);
        }

        Ok(Self {
            nodes: stack.pop().unwrap_or_default(),
        })
    }

    /// Render into a fresh buffer; nothing is returned unless the whole page rendered.
    pub fn render(&self, view: &DashboardView) -> Result<String> {
        let mut out = String::with_capacity(8192);
        render_nodes(&self.nodes, view, None, &mut out)?;
        Ok(out)
    }
}

fn push(stack: &mut [Vec<Node>], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.push(node);
    }
}

fn render_nodes(
    nodes: &[Node],
    view: &DashboardView,
    service: Option<&ServiceStatus>,
    out: &mut String,
) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(name) => {
                let value = service
                    .and_then(|s| service_field(s, name))
                    .or_else(|| view.field(name))
                    .ok_or_else(|| anyhow!("Unknown template field: {}", name))?;
                out.push_str(&escape_html(&value));
            }
            Node::Services(body) => {
                for s in &view.services {
                    render_nodes(body, view, Some(s), out)?;
                }
            }
        }
    }
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

//! Tenant resolution — classify an inbound host header into a tenant scope.
//!
//! A pure decision function over the host, the path, and a read-only
//! registry snapshot. The snapshot is explicit, versioned state built from
//! the tenant table and swapped on a defined reload boundary — never queried
//! live per request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// ─── Registry snapshot ───────────────────────────────────────────────────────

/// An immutable snapshot of all registered tenant subdomains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
  /// Monotonic version, bumped on each reload.
  pub version: u64,
  subdomains:  HashSet<String>,
}

impl RegistrySnapshot {
  pub fn new(version: u64, subdomains: impl IntoIterator<Item = String>) -> Self {
    Self {
      version,
      subdomains: subdomains.into_iter().collect(),
    }
  }

  pub fn contains(&self, subdomain: &str) -> bool {
    self.subdomains.contains(subdomain)
  }

  pub fn len(&self) -> usize { self.subdomains.len() }

  pub fn is_empty(&self) -> bool { self.subdomains.is_empty() }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Static resolver configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
  /// The platform's own root domains; requests for these are served
  /// unscoped (e.g. `tudominio.com`, `localhost`).
  pub bare_domains:      Vec<String>,
  /// Path prefixes never subjected to resolution (static assets, the API
  /// mount, internal endpoints).
  pub excluded_prefixes: Vec<String>,
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The routing decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Serve within a tenant namespace; the path is rewritten to
  /// `/{subdomain}{original_path}`.
  Scoped {
    subdomain: String,
    path:      String,
  },
  /// Serve the unscoped app.
  PassThrough,
  /// Unknown or malformed host; 404 with no content.
  NotFound,
}

/// Classify one request. Side-effect free; fatal only to this request.
pub fn resolve(
  host: &str,
  path: &str,
  registry: &RegistrySnapshot,
  config: &ResolverConfig,
) -> Resolution {
  if config
    .excluded_prefixes
    .iter()
    .any(|prefix| path.starts_with(prefix.as_str()))
  {
    return Resolution::PassThrough;
  }

  let Some(subdomain) = candidate_subdomain(host) else {
    return Resolution::NotFound;
  };

  if is_bare_domain(host, config) && !registry.contains(subdomain) {
    return Resolution::PassThrough;
  }

  if registry.contains(subdomain) {
    Resolution::Scoped {
      subdomain: subdomain.to_owned(),
      path:      format!("/{subdomain}{path}"),
    }
  } else {
    Resolution::NotFound
  }
}

/// The label preceding the first `.` in `host`, or before `:` if there is no
/// dot (bare hostnames like `localhost:3000`), or the whole string if
/// neither. `None` when the label is empty.
fn candidate_subdomain(host: &str) -> Option<&str> {
  let label = match host.split_once('.') {
    Some((label, _)) => label,
    None => host.split(':').next().unwrap_or(host),
  };
  if label.is_empty() { None } else { Some(label) }
}

fn is_bare_domain(host: &str, config: &ResolverConfig) -> bool {
  let without_port = host.rsplit_once(':').map_or(host, |(h, _)| h);
  config
    .bare_domains
    .iter()
    .any(|d| d == host || d == without_port)
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster DNS topology discovery.
//!
//! This module answers three questions about the cluster the operator runs in:
//!
//! - Which DNS domain do in-cluster services live under? ([`get_cluster_domain`])
//! - Which names is a given service reachable by? ([`get_service_dns_names`])
//! - Which `Service` fronts the cluster DNS pods? ([`get_cluster_dns_service`])
//!
//! # Example
//!
//! ```rust,no_run
//! use calico_dns_tiers::constants::DEFAULT_RESOLV_CONF_PATH;
//! use calico_dns_tiers::dns::{cluster_domain_or_default, get_service_dns_names};
//!
//! let domain = cluster_domain_or_default(DEFAULT_RESOLV_CONF_PATH);
//! let names = get_service_dns_names("tigera-api", "tigera-system", &domain);
//! assert_eq!(names[1], "tigera-api.tigera-system");
//! ```

use crate::constants::{DEFAULT_CLUSTER_DOMAIN, KUBE_DNS_SERVICE_NAME, OPENSHIFT_DNS_SERVICE_NAME};
use crate::dns_errors::ClusterDomainError;
use k8s_openapi::api::core::v1::Service;
use kube::Api;
use regex::bytes::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Matches `search` directives listing a `svc.<domain>` entry and captures `<domain>`.
///
/// Lines are matched as raw bytes with ASCII-only whitespace classes, so bytes
/// that are not UTF-8 elsewhere on a line (comments in Latin-1, say) never stop
/// the scan.
static SEARCH_SVC_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^search.*?\ssvc\.(\S*)").expect("cluster domain pattern is valid")
});

/// Reads the cluster domain from a resolver configuration file.
///
/// Every line is scanned. Lines that start with `search` and contain a
/// whitespace-separated `svc.<domain>` entry yield `<domain>`. When several
/// lines match, the last one wins.
///
/// # Arguments
///
/// * `path` - Path to the resolver configuration, usually
///   [`DEFAULT_RESOLV_CONF_PATH`](crate::constants::DEFAULT_RESOLV_CONF_PATH)
///
/// # Errors
///
/// - [`ClusterDomainError::Open`] if the file cannot be opened
/// - [`ClusterDomainError::Scan`] if reading the file fails part way through
/// - [`ClusterDomainError::NotFound`] if no line matches, or the last match is
///   a bare `svc.` with an empty domain
pub fn get_cluster_domain(path: impl AsRef<Path>) -> Result<String, ClusterDomainError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ClusterDomainError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut cluster_domain = String::new();
    for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = line.map_err(|source| ClusterDomainError::Scan {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;

        if let Some(captures) = SEARCH_SVC_DOMAIN.captures(&line) {
            cluster_domain = String::from_utf8_lossy(&captures[1]).into_owned();
            debug!(
                line = index + 1,
                cluster_domain = %cluster_domain,
                "Matched search directive"
            );
        }
    }

    if cluster_domain.is_empty() {
        return Err(ClusterDomainError::NotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(cluster_domain)
}

/// Reads the cluster domain, falling back to [`DEFAULT_CLUSTER_DOMAIN`] on any error.
///
/// The error is logged at `warn` level and otherwise swallowed.
#[must_use]
pub fn cluster_domain_or_default(path: impl AsRef<Path>) -> String {
    match get_cluster_domain(path) {
        Ok(domain) => domain,
        Err(e) => {
            warn!(
                "Unable to determine cluster domain, using default {}: {}",
                DEFAULT_CLUSTER_DOMAIN, e
            );
            DEFAULT_CLUSTER_DOMAIN.to_string()
        }
    }
}

/// Returns the DNS names a service is reachable by, least qualified first:
///
/// - `<name>`
/// - `<name>.<namespace>`
/// - `<name>.<namespace>.svc`
/// - `<name>.<namespace>.svc.<cluster_domain>`
///
/// Inputs are not validated.
#[must_use]
pub fn get_service_dns_names(name: &str, namespace: &str, cluster_domain: &str) -> [String; 4] {
    [
        name.to_string(),
        format!("{name}.{namespace}"),
        format!("{name}.{namespace}.svc"),
        format!("{name}.{namespace}.svc.{cluster_domain}"),
    ]
}

/// Name of the cluster DNS service for the given platform.
#[must_use]
pub fn cluster_dns_service_name(is_openshift: bool) -> &'static str {
    if is_openshift {
        OPENSHIFT_DNS_SERVICE_NAME
    } else {
        KUBE_DNS_SERVICE_NAME
    }
}

/// Lookup of `Service` objects by name.
///
/// The directory decides its own scope; callers of
/// [`get_cluster_dns_service`] never add a namespace.
#[async_trait::async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Error returned by the lookup.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the service with the given name.
    async fn get_service(&self, name: &str) -> Result<Service, Self::Error>;
}

#[async_trait::async_trait]
impl ServiceDirectory for Api<Service> {
    type Error = kube::Error;

    async fn get_service(&self, name: &str) -> Result<Service, Self::Error> {
        self.get(name).await
    }
}

/// Fetches the cluster DNS service (`kube-dns`, or `openshift-dns` on `OpenShift`).
///
/// Issues exactly one lookup.
///
/// # Errors
///
/// Returns whatever error the directory returns, unchanged.
pub async fn get_cluster_dns_service<D>(
    directory: &D,
    is_openshift: bool,
) -> Result<Service, D::Error>
where
    D: ServiceDirectory + ?Sized,
{
    let name = cluster_dns_service_name(is_openshift);
    debug!("Looking up cluster DNS service {}", name);
    directory.get_service(name).await
}

/// Whether a per-node DNS cache is intercepting queries to the cluster DNS service.
///
/// Built by the caller's detection routine once per reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeLocalCacheState {
    /// True when the node-local cache is active
    pub enabled: bool,
    /// Cluster IP of the cluster DNS service; only meaningful when `enabled`
    pub cluster_dns_service_ip: String,
}

impl NodeLocalCacheState {
    /// State for an active cache in front of the given cluster DNS service IP.
    #[must_use]
    pub fn enabled(cluster_dns_service_ip: impl Into<String>) -> Self {
        Self {
            enabled: true,
            cluster_dns_service_ip: cluster_dns_service_ip.into(),
        }
    }
}

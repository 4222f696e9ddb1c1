// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for cluster DNS discovery and the DNS policy tier.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Resolver Constants
// ============================================================================

/// Default location of the resolver configuration file
pub const DEFAULT_RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Cluster domain used by Kubernetes unless the kubelet is configured otherwise
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

// ============================================================================
// Cluster DNS Service Constants
// ============================================================================

/// Name of the cluster DNS service on upstream Kubernetes
pub const KUBE_DNS_SERVICE_NAME: &str = "kube-dns";

/// Name of the cluster DNS service on `OpenShift`
pub const OPENSHIFT_DNS_SERVICE_NAME: &str = "openshift-dns";

/// Namespace running the cluster DNS pods on upstream Kubernetes
pub const KUBE_DNS_NAMESPACE: &str = "kube-system";

/// Namespace running the cluster DNS pods on `OpenShift`
pub const OPENSHIFT_DNS_NAMESPACE: &str = "openshift-dns";

// ============================================================================
// Calico API Constants
// ============================================================================

/// Fully qualified API version (group/version)
pub const CALICO_API_GROUP_VERSION: &str = "projectcalico.org/v3";

/// Kind name for the Calico `Tier` resource
pub const KIND_TIER: &str = "Tier";

/// Kind name for the Calico `NetworkPolicy` resource
pub const KIND_NETWORK_POLICY: &str = "NetworkPolicy";

// ============================================================================
// Policy Tier Constants
// ============================================================================

/// Name of the tier holding all component policies
pub const TIGERA_COMPONENT_TIER_NAME: &str = "allow-tigera";

/// Every policy in the component tier is named with this prefix
pub const TIGERA_COMPONENT_POLICY_PREFIX: &str = "allow-tigera.";

/// Order of the component tier relative to other tiers
pub const DEFAULT_TIER_ORDER: f64 = 100.0;

/// Order given to every synthesized policy so it is evaluated first within the tier
pub const HIGH_PRECEDENCE_ORDER: f64 = 1.0;

/// Name of the policy granting DNS access through the cluster DNS service
pub const CLUSTER_DNS_POLICY_NAME: &str = "allow-tigera.cluster-dns";

/// Name of the policy granting access to the node-local DNS cache
pub const LOCAL_DNS_CACHE_ACCESS_POLICY_NAME: &str = "allow-tigera.local-dns-access";

/// Name of the policy letting cluster DNS pods accept requests forwarded by the node-local cache
pub const CLUSTER_FROM_LOCAL_DNS_ACCESS_POLICY_NAME: &str =
    "allow-tigera.cluster-from-local-dns-access";

/// Selector matching every namespace
pub const ALL_NAMESPACES_SELECTOR: &str = "all()";

// ============================================================================
// System Namespaces Allowed To Query Cluster DNS
// ============================================================================

/// Namespaces whose pods may always reach the cluster DNS service
pub const DEFAULT_DNS_INGRESS_NAMESPACES: &[&str] = &[
    "tigera-guardian",
    "tigera-compliance",
    "tigera-dex",
    "tigera-elasticsearch",
    "tigera-fluentd",
    "tigera-intrusion-detection",
    "tigera-kibana",
    "tigera-manager",
    "tigera-prometheus",
    "tigera-skraper",
    "tigera-system",
];

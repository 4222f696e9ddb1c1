// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys and selector expressions used by the synthesized Calico resources.

// ============================================================================
// Calico Labels
// ============================================================================

/// Label marking a tier as owned by the platform rather than by users
pub const CALICO_SYSTEM_TIER_LABEL: &str = "projectcalico.org/system-tier";

/// Label Calico attaches to every workload carrying its namespace name
pub const CALICO_NAMESPACE_LABEL: &str = "projectcalico.org/namespace";

// ============================================================================
// Cluster DNS Pod Selectors
// ============================================================================

/// Selector for the cluster DNS pods on upstream Kubernetes
pub const KUBE_DNS_POD_SELECTOR: &str = "k8s-app == 'kube-dns'";

/// Selector for the cluster DNS pods on `OpenShift`
pub const OPENSHIFT_DNS_POD_SELECTOR: &str = "dns.operator.openshift.io/daemonset-dns == 'default'";

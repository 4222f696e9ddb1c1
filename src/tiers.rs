// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS access policy tier synthesis.
//!
//! Computes the Calico objects that grant inbound DNS access to the cluster DNS
//! pods. Access is granted in exactly one of two modes:
//!
//! - [`DnsAccessMode::ClusterDns`] - pods query the cluster DNS service directly
//! - [`DnsAccessMode::NodeLocalCache`] - a per-node cache sits in front of it
//!
//! The objects belonging to the inactive mode are always returned for deletion,
//! so switching modes never leaves both sets of policies in place.
//!
//! # Example
//!
//! ```rust
//! use calico_dns_tiers::dns::NodeLocalCacheState;
//! use calico_dns_tiers::tiers::{Component, DnsIngressAllowList, TierConfig, TiersComponent};
//!
//! let config = TierConfig::new(false, Some(NodeLocalCacheState::enabled("10.96.0.10")));
//! let component = TiersComponent::new(config, DnsIngressAllowList::default());
//!
//! let (to_create, to_delete) = component.objects();
//! assert_eq!(to_create.len(), 3);
//! assert_eq!(to_delete.len(), 1);
//! ```

use crate::constants::{
    ALL_NAMESPACES_SELECTOR, CLUSTER_DNS_POLICY_NAME, CLUSTER_FROM_LOCAL_DNS_ACCESS_POLICY_NAME,
    DEFAULT_DNS_INGRESS_NAMESPACES, DEFAULT_TIER_ORDER, HIGH_PRECEDENCE_ORDER, KUBE_DNS_NAMESPACE,
    LOCAL_DNS_CACHE_ACCESS_POLICY_NAME, OPENSHIFT_DNS_NAMESPACE, TIGERA_COMPONENT_TIER_NAME,
};
use crate::crd::{
    Action, EntityRule, NetworkPolicy, NetworkPolicySpec, PolicyObject, PolicyType, Rule, Tier,
    TierSpec,
};
use crate::dns::NodeLocalCacheState;
use crate::labels::{
    CALICO_NAMESPACE_LABEL, CALICO_SYSTEM_TIER_LABEL, KUBE_DNS_POD_SELECTOR,
    OPENSHIFT_DNS_POD_SELECTOR,
};
use std::collections::BTreeMap;
use tracing::debug;

/// A renderable set of cluster objects.
pub trait Component {
    /// Objects to create (or update) and objects to delete, in apply order.
    fn objects(&self) -> (Vec<PolicyObject>, Vec<PolicyObject>);

    /// Whether the component's prerequisites are in place.
    fn ready(&self) -> bool;
}

/// How inbound DNS access to the cluster DNS pods is granted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DnsAccessMode {
    /// No node-local cache; pods talk to the cluster DNS service directly
    ClusterDns,
    /// A node-local cache forwards to the cluster DNS service at this IP
    NodeLocalCache { cluster_dns_service_ip: String },
}

impl From<Option<&NodeLocalCacheState>> for DnsAccessMode {
    /// Presence of a state selects the node-local mode, whatever its `enabled` flag says.
    fn from(state: Option<&NodeLocalCacheState>) -> Self {
        match state {
            Some(state) => Self::NodeLocalCache {
                cluster_dns_service_ip: state.cluster_dns_service_ip.clone(),
            },
            None => Self::ClusterDns,
        }
    }
}

/// Input to the tier synthesizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierConfig {
    /// True when running on `OpenShift`
    pub openshift: bool,
    /// Selected DNS access mode
    pub access_mode: DnsAccessMode,
}

impl TierConfig {
    /// Builds a config from the node-local cache detection result.
    #[must_use]
    pub fn new(openshift: bool, dns_local_cache_state: Option<NodeLocalCacheState>) -> Self {
        Self {
            openshift,
            access_mode: DnsAccessMode::from(dns_local_cache_state.as_ref()),
        }
    }
}

/// Namespaces whose pods may always query the cluster DNS service.
///
/// The Calico selector is rendered once, when the list is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsIngressAllowList {
    namespaces: Vec<String>,
    selector: String,
}

impl DnsIngressAllowList {
    /// Builds an allow-list from namespace names, keeping their order.
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namespaces: Vec<String> = namespaces.into_iter().map(Into::into).collect();
        let selector = build_namespace_selector(&namespaces);
        Self {
            namespaces,
            selector,
        }
    }

    /// Allowed namespace names.
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Selector matching workloads in any allowed namespace.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl Default for DnsIngressAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_INGRESS_NAMESPACES.iter().copied())
    }
}

/// Renders `projectcalico.org/namespace in {'a','b'}`.
fn build_namespace_selector(namespaces: &[String]) -> String {
    let mut selector = format!("{CALICO_NAMESPACE_LABEL} in {{");
    for (idx, namespace) in namespaces.iter().enumerate() {
        if idx > 0 {
            selector.push(',');
        }
        selector.push('\'');
        selector.push_str(namespace);
        selector.push('\'');
    }
    selector.push('}');
    selector
}

/// Synthesizes the `allow-tigera` tier and its DNS access policies.
#[derive(Clone, Debug)]
pub struct TiersComponent {
    config: TierConfig,
    allow_list: DnsIngressAllowList,
}

impl TiersComponent {
    /// Creates the component for a config and the namespaces allowed to query cluster DNS.
    #[must_use]
    pub fn new(config: TierConfig, allow_list: DnsIngressAllowList) -> Self {
        Self { config, allow_list }
    }

    /// Config the objects are synthesized from.
    #[must_use]
    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    fn allow_tigera_tier() -> Tier {
        let mut tier = Tier::new(
            TIGERA_COMPONENT_TIER_NAME,
            TierSpec {
                order: Some(DEFAULT_TIER_ORDER),
            },
        );
        tier.metadata.labels = Some(BTreeMap::from([(
            CALICO_SYSTEM_TIER_LABEL.to_string(),
            "true".to_string(),
        )]));
        tier
    }

    /// Cluster DNS pods' namespace and selector for the configured platform.
    fn dns_namespace_and_selector(&self) -> (&'static str, &'static str) {
        if self.config.openshift {
            (OPENSHIFT_DNS_NAMESPACE, OPENSHIFT_DNS_POD_SELECTOR)
        } else {
            (KUBE_DNS_NAMESPACE, KUBE_DNS_POD_SELECTOR)
        }
    }

    /// Skeleton shared by every DNS access policy.
    fn dns_policy(&self, name: &str, spec: NetworkPolicySpec) -> NetworkPolicy {
        let (namespace, selector) = self.dns_namespace_and_selector();
        let mut policy = NetworkPolicy::new(
            name,
            NetworkPolicySpec {
                order: Some(HIGH_PRECEDENCE_ORDER),
                tier: Some(TIGERA_COMPONENT_TIER_NAME.to_string()),
                selector: selector.to_string(),
                ..spec
            },
        );
        policy.metadata.namespace = Some(namespace.to_string());
        policy
    }

    /// Allows the system namespaces in, passes everything else to the next tier.
    fn allow_tigera_cluster_dns_policy(&self) -> NetworkPolicy {
        self.dns_policy(
            CLUSTER_DNS_POLICY_NAME,
            NetworkPolicySpec {
                ingress: vec![
                    Rule {
                        action: Action::Allow,
                        source: Some(EntityRule {
                            namespace_selector: Some(ALL_NAMESPACES_SELECTOR.to_string()),
                            selector: Some(self.allow_list.selector().to_string()),
                        }),
                        destination: None,
                    },
                    Rule::action(Action::Pass),
                ],
                egress: vec![Rule::action(Action::Allow)],
                types: vec![PolicyType::Ingress, PolicyType::Egress],
                ..Default::default()
            },
        )
    }

    fn allow_tigera_node_local_cache_policies(&self) -> [NetworkPolicy; 2] {
        [
            self.dns_policy(LOCAL_DNS_CACHE_ACCESS_POLICY_NAME, NetworkPolicySpec::default()),
            self.dns_policy(
                CLUSTER_FROM_LOCAL_DNS_ACCESS_POLICY_NAME,
                NetworkPolicySpec::default(),
            ),
        ]
    }
}

impl Component for TiersComponent {
    fn objects(&self) -> (Vec<PolicyObject>, Vec<PolicyObject>) {
        let mut to_create = vec![PolicyObject::from(Self::allow_tigera_tier())];
        let mut to_delete = Vec::new();

        let cluster_dns = PolicyObject::from(self.allow_tigera_cluster_dns_policy());
        let node_local = self
            .allow_tigera_node_local_cache_policies()
            .map(PolicyObject::from);

        match &self.config.access_mode {
            DnsAccessMode::NodeLocalCache {
                cluster_dns_service_ip,
            } => {
                debug!(
                    "Node-local DNS cache active in front of {}, granting access via the cache",
                    cluster_dns_service_ip
                );
                to_create.extend(node_local);
                to_delete.push(cluster_dns);
            }
            DnsAccessMode::ClusterDns => {
                debug!("No node-local DNS cache, granting DNS access through cluster DNS");
                to_create.push(cluster_dns);
                to_delete.extend(node_local);
            }
        }

        (to_create, to_delete)
    }

    fn ready(&self) -> bool {
        true
    }
}

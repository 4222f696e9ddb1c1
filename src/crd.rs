// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed Calico (`projectcalico.org/v3`) resources produced by the tier synthesizer.
//!
//! Only the fields the synthesizer sets are modelled. The CRDs themselves are
//! owned and installed by Calico; these types exist so the desired objects can
//! be built, compared, and serialized into manifests with a stable identity.
//!
//! # Resource Types
//!
//! - [`Tier`] - Cluster-scoped ordered group of policies
//! - [`NetworkPolicy`] - Namespaced policy belonging to a tier
//! - [`PolicyObject`] - Either of the above, as handed to an applier
//!
//! # Example
//!
//! ```rust
//! use calico_dns_tiers::crd::{Action, NetworkPolicy, NetworkPolicySpec, PolicyType, Rule};
//!
//! let policy = NetworkPolicy::new(
//!     "allow-tigera.example",
//!     NetworkPolicySpec {
//!         order: Some(1.0),
//!         tier: Some("allow-tigera".to_string()),
//!         selector: "k8s-app == 'kube-dns'".to_string(),
//!         ingress: vec![Rule::action(Action::Pass)],
//!         egress: vec![Rule::action(Action::Allow)],
//!         types: vec![PolicyType::Ingress, PolicyType::Egress],
//!     },
//! );
//! assert_eq!(policy.spec.ingress.len(), 1);
//! ```

use crate::constants::{KIND_NETWORK_POLICY, KIND_TIER};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tier specification.
///
/// Tiers are evaluated in ascending `order`. Policies in a tier that end with
/// a `Pass` rule defer to the next tier.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projectcalico.org",
    version = "v3",
    kind = "Tier",
    plural = "tiers",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct TierSpec {
    /// Position of the tier relative to other tiers. Lower orders are evaluated first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

/// Network policy specification.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projectcalico.org",
    version = "v3",
    kind = "NetworkPolicy",
    plural = "networkpolicies",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    /// Position of the policy within its tier. Lower orders are evaluated first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,

    /// Name of the tier this policy belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,

    /// Calico selector expression choosing the endpoints this policy applies to.
    pub selector: String,

    /// Ordered ingress rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<Rule>,

    /// Ordered egress rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub egress: Vec<Rule>,

    /// Directions this policy applies to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<PolicyType>,
}

/// A single policy rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Outcome when the rule matches.
    pub action: Action,

    /// Match on the traffic source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityRule>,

    /// Match on the traffic destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<EntityRule>,
}

impl Rule {
    /// A rule matching all traffic with the given action.
    #[must_use]
    pub fn action(action: Action) -> Self {
        Self {
            action,
            source: None,
            destination: None,
        }
    }
}

/// Endpoint match used as the source or destination of a [`Rule`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityRule {
    /// Selector over namespace labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<String>,

    /// Selector over endpoint labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// Rule outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Action {
    Allow,
    Deny,
    Log,
    /// Skip the rest of this tier and continue with the next one
    Pass,
}

/// Traffic direction a policy applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PolicyType {
    Ingress,
    Egress,
}

/// A synthesized resource, ready to be created or deleted by an applier.
///
/// Serializes as the bare manifest of the wrapped resource.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PolicyObject {
    Tier(Tier),
    NetworkPolicy(NetworkPolicy),
}

impl PolicyObject {
    /// Resource kind (`Tier` or `NetworkPolicy`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tier(_) => KIND_TIER,
            Self::NetworkPolicy(_) => KIND_NETWORK_POLICY,
        }
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Tier(tier) => tier.name_any(),
            Self::NetworkPolicy(policy) => policy.name_any(),
        }
    }

    /// Resource namespace, `None` for cluster-scoped resources.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        match self {
            Self::Tier(tier) => tier.namespace(),
            Self::NetworkPolicy(policy) => policy.namespace(),
        }
    }

    /// Identity an applier uses to match this object against live state.
    #[must_use]
    pub fn identity(&self) -> (&'static str, String, Option<String>) {
        (self.kind(), self.name(), self.namespace())
    }

    /// The wrapped policy, if this object is a `NetworkPolicy`.
    #[must_use]
    pub fn as_network_policy(&self) -> Option<&NetworkPolicy> {
        match self {
            Self::NetworkPolicy(policy) => Some(policy),
            Self::Tier(_) => None,
        }
    }
}

impl From<Tier> for PolicyObject {
    fn from(tier: Tier) -> Self {
        Self::Tier(tier)
    }
}

impl From<NetworkPolicy> for PolicyObject {
    fn from(policy: NetworkPolicy) -> Self {
        Self::NetworkPolicy(policy)
    }
}

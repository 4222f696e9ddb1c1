// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # calico-dns-tiers - Cluster DNS discovery and DNS access policy tiers
//!
//! Building blocks for a Kubernetes operator that secures access to the
//! cluster DNS service with Calico policy.
//!
//! ## Overview
//!
//! - Discover the cluster domain from the resolver configuration
//! - Derive the DNS names a service is reachable by
//! - Look up the cluster DNS `Service`
//! - Compute the `allow-tigera` tier and the DNS access policies to create and delete
//!
//! ## Modules
//!
//! - [`dns`] - Cluster DNS topology discovery
//! - [`tiers`] - DNS access policy tier synthesis
//! - [`crd`] - Typed Calico `Tier` and `NetworkPolicy` resources
//! - [`dns_errors`] - Error types for cluster DNS discovery
//! - [`constants`] - Names, orders and defaults
//! - [`labels`] - Label keys and selectors
//!
//! ## Example
//!
//! ```rust,no_run
//! use calico_dns_tiers::constants::DEFAULT_RESOLV_CONF_PATH;
//! use calico_dns_tiers::dns::get_cluster_domain;
//! use calico_dns_tiers::tiers::{Component, DnsIngressAllowList, TierConfig, TiersComponent};
//!
//! let domain = get_cluster_domain(DEFAULT_RESOLV_CONF_PATH).unwrap();
//! println!("cluster domain: {domain}");
//!
//! let config = TierConfig::new(false, None);
//! let component = TiersComponent::new(config, DnsIngressAllowList::default());
//! let (to_create, to_delete) = component.objects();
//! ```

pub mod constants;
pub mod crd;
pub mod dns;
pub mod dns_errors;
pub mod labels;
pub mod tiers;

#[cfg(test)]
mod tiers_tests;

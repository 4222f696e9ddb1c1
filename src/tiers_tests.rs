// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `tiers.rs`

#[cfg(test)]
mod tests {
    use crate::constants::TIGERA_COMPONENT_POLICY_PREFIX;
    use crate::crd::{Action, PolicyObject, PolicyType};
    use crate::dns::NodeLocalCacheState;
    use crate::tiers::{Component, DnsAccessMode, DnsIngressAllowList, TierConfig, TiersComponent};
    use std::collections::BTreeSet;

    const TIER: (&str, &str) = ("Tier", "allow-tigera");
    const CLUSTER_DNS: (&str, &str) = ("NetworkPolicy", "allow-tigera.cluster-dns");
    const LOCAL_DNS: (&str, &str) = ("NetworkPolicy", "allow-tigera.local-dns-access");
    const CLUSTER_FROM_LOCAL: (&str, &str) =
        ("NetworkPolicy", "allow-tigera.cluster-from-local-dns-access");

    fn all_configs() -> Vec<TierConfig> {
        vec![
            TierConfig::new(false, None),
            TierConfig::new(true, None),
            TierConfig::new(false, Some(NodeLocalCacheState::enabled("10.96.0.10"))),
            TierConfig::new(true, Some(NodeLocalCacheState::enabled("172.30.0.10"))),
        ]
    }

    fn objects_for(config: TierConfig) -> (Vec<PolicyObject>, Vec<PolicyObject>) {
        TiersComponent::new(config, DnsIngressAllowList::default()).objects()
    }

    fn kinds_and_names(objects: &[PolicyObject]) -> Vec<(&'static str, String)> {
        objects.iter().map(|o| (o.kind(), o.name())).collect()
    }

    fn named(id: (&'static str, &str)) -> (&'static str, String) {
        (id.0, id.1.to_string())
    }

    #[test]
    fn test_cluster_dns_mode_objects() {
        let (to_create, to_delete) = objects_for(TierConfig::new(false, None));

        assert_eq!(
            kinds_and_names(&to_create),
            vec![named(TIER), named(CLUSTER_DNS)]
        );
        assert_eq!(
            kinds_and_names(&to_delete),
            vec![named(LOCAL_DNS), named(CLUSTER_FROM_LOCAL)]
        );
    }

    #[test]
    fn test_node_local_cache_mode_objects() {
        let state = NodeLocalCacheState::enabled("10.96.0.10");
        let (to_create, to_delete) = objects_for(TierConfig::new(false, Some(state)));

        assert_eq!(
            kinds_and_names(&to_create),
            vec![named(TIER), named(LOCAL_DNS), named(CLUSTER_FROM_LOCAL)]
        );
        assert_eq!(kinds_and_names(&to_delete), vec![named(CLUSTER_DNS)]);
    }

    #[test]
    fn test_presence_not_enabled_flag_selects_mode() {
        let state = NodeLocalCacheState {
            enabled: false,
            cluster_dns_service_ip: String::new(),
        };
        let config = TierConfig::new(false, Some(state));

        assert!(matches!(config.access_mode, DnsAccessMode::NodeLocalCache { .. }));
        let (to_create, _) = objects_for(config);
        assert_eq!(to_create.len(), 3);
    }

    #[test]
    fn test_tier_always_created_never_deleted() {
        for config in all_configs() {
            let (to_create, to_delete) = objects_for(config);

            assert_eq!(to_create[0].identity(), ("Tier", "allow-tigera".to_string(), None));
            assert!(to_delete.iter().all(|o| o.kind() != "Tier"));
        }
    }

    #[test]
    fn test_create_and_delete_are_disjoint_and_complete() {
        let expected: BTreeSet<_> = [TIER, CLUSTER_DNS, LOCAL_DNS, CLUSTER_FROM_LOCAL]
            .into_iter()
            .map(named)
            .collect();

        for config in all_configs() {
            let (to_create, to_delete) = objects_for(config);
            let created: BTreeSet<_> = kinds_and_names(&to_create).into_iter().collect();
            let deleted: BTreeSet<_> = kinds_and_names(&to_delete).into_iter().collect();

            assert!(created.is_disjoint(&deleted));
            assert_eq!(&created | &deleted, expected);

            // Exactly one access mode is created
            let cluster_dns_created = created.contains(&named(CLUSTER_DNS));
            let node_local_created = created.contains(&named(LOCAL_DNS))
                && created.contains(&named(CLUSTER_FROM_LOCAL));
            assert_ne!(cluster_dns_created, node_local_created);
        }
    }

    #[test]
    fn test_kubernetes_namespace_and_selector() {
        let (to_create, to_delete) = objects_for(TierConfig::new(false, None));

        for policy in to_create
            .iter()
            .chain(&to_delete)
            .filter_map(PolicyObject::as_network_policy)
        {
            assert_eq!(policy.metadata.namespace.as_deref(), Some("kube-system"));
            assert_eq!(policy.spec.selector, "k8s-app == 'kube-dns'");
        }
    }

    #[test]
    fn test_openshift_toggle_moves_every_policy() {
        for local_cache in [None, Some(NodeLocalCacheState::enabled("172.30.0.10"))] {
            let (to_create, to_delete) = objects_for(TierConfig::new(true, local_cache));
            let policies: Vec<_> = to_create
                .iter()
                .chain(&to_delete)
                .filter_map(PolicyObject::as_network_policy)
                .collect();

            assert_eq!(policies.len(), 3);
            for policy in policies {
                assert_eq!(policy.metadata.namespace.as_deref(), Some("openshift-dns"));
                assert_eq!(
                    policy.spec.selector,
                    "dns.operator.openshift.io/daemonset-dns == 'default'"
                );
            }
        }
    }

    #[test]
    fn test_all_policies_high_precedence_in_tier() {
        for config in all_configs() {
            let (to_create, to_delete) = objects_for(config);

            for policy in to_create
                .iter()
                .chain(&to_delete)
                .filter_map(PolicyObject::as_network_policy)
            {
                assert_eq!(policy.spec.order, Some(1.0));
                assert_eq!(policy.spec.tier.as_deref(), Some("allow-tigera"));
                assert!(policy
                    .metadata
                    .name
                    .as_deref()
                    .is_some_and(|n| n.starts_with(TIGERA_COMPONENT_POLICY_PREFIX)));
            }
        }
    }

    #[test]
    fn test_tier_object() {
        let (to_create, _) = objects_for(TierConfig::new(false, None));

        let PolicyObject::Tier(tier) = &to_create[0] else {
            panic!("First object should be the tier");
        };
        assert_eq!(tier.spec.order, Some(100.0));
        assert_eq!(
            tier.metadata
                .labels
                .as_ref()
                .and_then(|l| l.get("projectcalico.org/system-tier"))
                .map(String::as_str),
            Some("true")
        );
        assert!(tier.metadata.namespace.is_none());
    }

    #[test]
    fn test_cluster_dns_policy_rules() {
        let (to_create, _) = objects_for(TierConfig::new(false, None));
        let policy = to_create[1].as_network_policy().unwrap();

        assert_eq!(policy.spec.ingress.len(), 2);
        let allow = &policy.spec.ingress[0];
        assert_eq!(allow.action, Action::Allow);
        let source = allow.source.as_ref().unwrap();
        assert_eq!(source.namespace_selector.as_deref(), Some("all()"));
        assert_eq!(
            source.selector.as_deref(),
            Some(DnsIngressAllowList::default().selector())
        );

        // Everything else is deferred to the next tier, not denied
        assert_eq!(policy.spec.ingress[1].action, Action::Pass);
        assert!(policy.spec.ingress[1].source.is_none());

        assert_eq!(policy.spec.egress.len(), 1);
        assert_eq!(policy.spec.egress[0].action, Action::Allow);
        assert_eq!(
            policy.spec.types,
            vec![PolicyType::Ingress, PolicyType::Egress]
        );
    }

    #[test]
    fn test_node_local_cache_policies_carry_no_rules() {
        let state = NodeLocalCacheState::enabled("10.96.0.10");
        let (to_create, _) = objects_for(TierConfig::new(false, Some(state)));

        for policy in to_create[1..].iter().filter_map(PolicyObject::as_network_policy) {
            assert!(policy.spec.ingress.is_empty());
            assert!(policy.spec.egress.is_empty());
            assert!(policy.spec.types.is_empty());
        }
    }

    #[test]
    fn test_objects_are_deterministic() {
        for config in all_configs() {
            let component = TiersComponent::new(config, DnsIngressAllowList::default());

            assert_eq!(component.objects(), component.objects());
        }
    }

    #[test]
    fn test_injected_allow_list_reaches_cluster_dns_policy() {
        let allow_list = DnsIngressAllowList::new(["team-a", "team-b"]);
        let component = TiersComponent::new(TierConfig::new(false, None), allow_list);

        let (to_create, _) = component.objects();
        let policy = to_create[1].as_network_policy().unwrap();
        assert_eq!(
            policy.spec.ingress[0].source.as_ref().unwrap().selector.as_deref(),
            Some("projectcalico.org/namespace in {'team-a','team-b'}")
        );
    }

    #[test]
    fn test_default_allow_list_selector() {
        let allow_list = DnsIngressAllowList::default();

        assert_eq!(allow_list.namespaces().len(), 11);
        assert_eq!(
            allow_list.selector(),
            "projectcalico.org/namespace in {'tigera-guardian','tigera-compliance','tigera-dex',\
             'tigera-elasticsearch','tigera-fluentd','tigera-intrusion-detection','tigera-kibana',\
             'tigera-manager','tigera-prometheus','tigera-skraper','tigera-system'}"
        );
    }

    #[test]
    fn test_empty_allow_list_selector() {
        let allow_list = DnsIngressAllowList::new(Vec::<String>::new());

        assert_eq!(allow_list.selector(), "projectcalico.org/namespace in {}");
    }

    #[test]
    fn test_component_is_ready() {
        let component =
            TiersComponent::new(TierConfig::new(false, None), DnsIngressAllowList::default());

        assert!(component.ready());
        assert_eq!(component.config().access_mode, DnsAccessMode::ClusterDns);
    }
}

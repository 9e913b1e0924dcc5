use super::*;

fn descriptor(id: &str, kind: ProviderKind, priority: i32) -> ProviderDescriptor {
    ProviderDescriptor::new(id, format!("Provider {}", id), kind, priority)
}

#[test]
fn test_provider_kind_serialization() {
    let json = serde_json::to_string(&ProviderKind::OpenAI).unwrap();
    assert_eq!(json, r#""openai""#);

    let deserialized: ProviderKind = serde_json::from_str(r#""placeholder""#).unwrap();
    assert_eq!(deserialized, ProviderKind::Placeholder);
}

#[test]
fn test_provider_kind_category() {
    assert_eq!(ProviderKind::Doubao.category(), ProviderCategory::Api);
    assert_eq!(ProviderKind::OpenAI.category(), ProviderCategory::Api);
    assert_eq!(ProviderKind::Mock.category(), ProviderCategory::Mock);
    assert_eq!(
        ProviderKind::Placeholder.category(),
        ProviderCategory::Placeholder
    );
}

#[test]
fn test_descriptor_defaults() {
    let provider = descriptor("p1", ProviderKind::Doubao, 1);
    assert!(provider.enabled);
    assert_eq!(provider.settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(provider.settings.latency_ms, (1000, 3000));
    assert!(provider.settings.endpoint.is_none());
}

#[test]
fn test_add_provider_and_count() {
    let registry = ProviderRegistry::new();
    registry
        .add_provider(descriptor("p1", ProviderKind::Mock, 1))
        .unwrap();
    registry
        .add_provider(descriptor("p2", ProviderKind::Placeholder, 2))
        .unwrap();

    assert_eq!(registry.provider_count(), 2);
    assert_eq!(registry.get_provider("p2").unwrap().priority, 2);
    assert!(registry.get_provider("missing").is_none());
}

#[test]
fn test_add_duplicate_provider_fails() {
    let registry = ProviderRegistry::new();
    registry
        .add_provider(descriptor("p1", ProviderKind::Mock, 1))
        .unwrap();

    let result = registry.add_provider(descriptor("p1", ProviderKind::Placeholder, 2));
    assert!(matches!(result, Err(RegistryError::DuplicateProvider(ref id)) if id == "p1"));
    assert_eq!(registry.provider_count(), 1);
}

#[test]
fn test_from_descriptors_rejects_duplicates() {
    let result = ProviderRegistry::from_descriptors(vec![
        descriptor("dup", ProviderKind::Mock, 1),
        descriptor("dup", ProviderKind::Mock, 2),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_list_enabled_sorted_by_priority() {
    let registry = ProviderRegistry::from_descriptors(vec![
        descriptor("low", ProviderKind::Placeholder, 6),
        descriptor("high", ProviderKind::Doubao, 1),
        descriptor("mid", ProviderKind::Mock, 5),
    ])
    .unwrap();

    let ids: Vec<_> = registry.list_enabled().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["high", "mid", "low"]);
}

#[test]
fn test_list_enabled_ties_keep_registry_order() {
    let registry = ProviderRegistry::from_descriptors(vec![
        descriptor("b", ProviderKind::Mock, 3),
        descriptor("a", ProviderKind::Mock, 3),
        descriptor("c", ProviderKind::Mock, 1),
        descriptor("d", ProviderKind::Mock, 3),
    ])
    .unwrap();

    let ids: Vec<_> = registry.list_enabled().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["c", "b", "a", "d"]);
}

#[test]
fn test_list_enabled_excludes_disabled() {
    let registry = ProviderRegistry::from_descriptors(vec![
        descriptor("api", ProviderKind::OpenAI, 1).disabled(),
        descriptor("mock", ProviderKind::Mock, 5),
    ])
    .unwrap();

    let enabled = registry.list_enabled();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].id, "mock");
    assert_eq!(registry.list_all().len(), 2);
}

#[test]
fn test_list_enabled_empty_registry() {
    let registry = ProviderRegistry::new();
    assert!(registry.list_enabled().is_empty());
}

#[test]
fn test_set_enabled_toggles_selection() {
    let registry = ProviderRegistry::from_descriptors(vec![
        descriptor("api", ProviderKind::OpenAI, 1).disabled(),
        descriptor("mock", ProviderKind::Mock, 5),
    ])
    .unwrap();

    registry.set_enabled("api", true).unwrap();
    registry.set_enabled("mock", false).unwrap();

    let ids: Vec<_> = registry.list_enabled().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["api"]);
}

#[test]
fn test_set_priority_reorders() {
    let registry = ProviderRegistry::from_descriptors(vec![
        descriptor("first", ProviderKind::Mock, 1),
        descriptor("second", ProviderKind::Placeholder, 2),
    ])
    .unwrap();

    registry.set_priority("first", 10).unwrap();

    let ids: Vec<_> = registry.list_enabled().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["second", "first"]);
}

#[test]
fn test_toggle_unknown_provider_fails() {
    let registry = ProviderRegistry::new();
    assert!(matches!(
        registry.set_enabled("ghost", true),
        Err(RegistryError::ProviderNotFound(_))
    ));
    assert!(matches!(
        registry.set_priority("ghost", 1),
        Err(RegistryError::ProviderNotFound(_))
    ));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_list_enabled_never_contains_disabled(
            flags in proptest::collection::vec((any::<bool>(), -5i32..5), 0..20)
        ) {
            let registry = ProviderRegistry::new();
            for (i, (enabled, priority)) in flags.iter().enumerate() {
                let mut provider = descriptor(&format!("p{}", i), ProviderKind::Mock, *priority);
                provider.enabled = *enabled;
                registry.add_provider(provider).unwrap();
            }

            let enabled = registry.list_enabled();
            prop_assert!(enabled.iter().all(|p| p.enabled));
            prop_assert_eq!(enabled.len(), flags.iter().filter(|(e, _)| *e).count());
            prop_assert!(enabled.windows(2).all(|w| w[0].priority <= w[1].priority));
        }
    }
}

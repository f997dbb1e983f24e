//! ENS lookups through the sign-in facade.

use super::helpers::*;
use crate::*;
use std::sync::Arc;

const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

fn chain() -> MockChain {
    MockChain {
        forward: vec![("vitalik.eth".to_string(), VITALIK.to_string())],
        reverse: vec![
            (VITALIK.to_string(), "vitalik.eth".to_string()),
            (ADDRESS.to_lowercase(), "vitalik.eth".to_string()),
        ],
        ..MockChain::default()
    }
}

#[tokio::test]
async fn test_forward_and_reverse() {
    let (service, _, _) = create_test_service(ens_config(), chain());

    assert_eq!(
        service.resolve_ens_forward("vitalik.eth").await.as_deref(),
        Some(VITALIK)
    );
    assert_eq!(
        service.resolve_ens_reverse(VITALIK).await.as_deref(),
        Some("vitalik.eth")
    );
    assert_eq!(service.resolve_ens_forward("unknown.eth").await, None);
}

#[tokio::test]
async fn test_spoofed_reverse_record_is_ignored() {
    let (service, _, _) = create_test_service(ens_config(), chain());

    // ADDRESS claims vitalik.eth, which resolves elsewhere
    assert_eq!(service.resolve_ens_reverse(ADDRESS).await, None);
}

#[tokio::test]
async fn test_failures_become_none() {
    let (service, _, _) = create_test_service(
        ens_config(),
        MockChain {
            failing: true,
            ..chain()
        },
    );

    assert_eq!(service.resolve_ens_forward("vitalik.eth").await, None);
    assert_eq!(service.resolve_ens_reverse(VITALIK).await, None);
    assert_eq!(service.resolve_ens_reverse("not an address").await, None);
}

#[tokio::test]
async fn test_disabled_without_providers() {
    let (service, _, _) = create_test_service(test_config(), chain());

    assert_eq!(service.resolve_ens_forward("vitalik.eth").await, None);
    assert_eq!(service.resolve_ens_reverse(VITALIK).await, None);
    service.clear_ens_cache("vitalik.eth").await.unwrap();
}

#[tokio::test]
async fn test_clear_cache_forces_new_lookup() {
    let chain = Arc::new(chain());
    let (service, _, _) = create_test_service_on(ens_config(), Arc::clone(&chain));

    service.resolve_ens_forward("vitalik.eth").await;
    let after_first = chain.call_count();
    service.resolve_ens_forward("vitalik.eth").await;
    assert_eq!(chain.call_count(), after_first);

    service.clear_ens_cache("vitalik.eth").await.unwrap();
    assert_eq!(
        service.resolve_ens_forward("vitalik.eth").await.as_deref(),
        Some(VITALIK)
    );
    assert!(chain.call_count() > after_first);
}

#[test]
fn test_invalid_provider_rejected() {
    let mut config = ens_config();
    config.rpc.providers = vec!["::not a url::".to_string()];

    let storage = Arc::new(web3_auth_storage::MemoryStorage::new());
    let result = Web3AuthService::new(
        config,
        storage,
        Arc::new(MockChain::default()),
        Arc::new(web3_auth_crypto::SystemClock),
    );
    assert!(matches!(result, Err(AuthError::Configuration(_))));
}

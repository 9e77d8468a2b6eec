mod support;

use std::sync::Arc;

use scs_engine::EndpointResolver;
use scs_types::{EndpointKind, ResolveError, ScsError};
use support::{FakeClient, FakePlatform, journal};

fn resolver(platform: FakePlatform, client: Arc<FakeClient>) -> EndpointResolver {
    EndpointResolver::new(Arc::new(platform), client, "scs-service-broker.")
}

#[tokio::test]
async fn v2_service_instance_url_always_ends_with_one_slash() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("p-config-server", "https://b.x.y/z/guid");
    let client = Arc::new(FakeClient::new(journal).reply(200, r#"{"credentials":{"uri":"https://svc/"}}"#));

    let params = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::ServiceInstance)
        .await
        .expect("resolve");

    assert_eq!(params.url, "https://svc/");
    assert_eq!(params.offering_name, "p-config-server");
    assert_eq!(params.plan_name, "standard");
}

#[tokio::test]
async fn v2_probe_not_found_means_legacy_broker() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("p-config-server", "https://b.x.y/z/guid");
    let client = Arc::new(FakeClient::new(journal).reply(404, ""));

    let err = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::ServiceInstance)
        .await
        .unwrap_err();

    assert!(matches!(err, ScsError::Resolve(ResolveError::LegacyBrokerUnsupported)));
    assert_eq!(err.to_string(), "The /cli/instance endpoint could not be found.");
}

#[tokio::test]
async fn v2_probe_with_empty_uri_is_rejected() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("p-service-registry", "https://b.x.y/z/guid");
    let client = Arc::new(FakeClient::new(journal).reply(200, r#"{"credentials":{"uri":""}}"#));

    let err = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::ServiceInstance)
        .await
        .unwrap_err();

    assert!(matches!(err, ScsError::Resolve(ResolveError::EmptyServiceUri { .. })));
}

#[tokio::test]
async fn v2_probe_with_malformed_body_is_a_protocol_error() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("p-config-server", "https://b.x.y/z/guid");
    let client = Arc::new(FakeClient::new(journal).reply(200, "<html>"));

    let err = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::ServiceInstance)
        .await
        .unwrap_err();

    assert!(matches!(err, ScsError::Protocol(_)), "{err:?}");
    assert!(err.to_string().contains("<html>"));
}

#[tokio::test]
async fn management_urls_need_no_probe() {
    for offering in ["p-config-server", "scs-config"] {
        let journal = journal();
        let platform = FakePlatform::new(journal.clone()).with_service(offering, "https://dash.example:8443/dashboard/instances/abc/");
        let client = Arc::new(FakeClient::new(journal));

        let params = resolver(platform, client.clone())
            .resolve("svc", "tok", EndpointKind::Management)
            .await
            .expect("resolve");

        assert_eq!(params.url, "https://dash.example:8443/cli/instances/abc");
        assert!(client.requests().is_empty());
    }
}

#[tokio::test]
async fn v2_lifecycle_uses_the_management_url() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("p-config-server", "https://b.x.y/z/guid");
    let client = Arc::new(FakeClient::new(journal));

    let params = resolver(platform, client.clone())
        .resolve("svc", "tok", EndpointKind::Lifecycle)
        .await
        .expect("resolve");

    assert_eq!(params.url, "https://b.x.y/cli/instances/guid");
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn v3_service_instance_url_is_the_dashboard_root() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("scs-config", "https://config-abc.apps.example/dashboard");
    let client = Arc::new(FakeClient::new(journal));

    let params = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::ServiceInstance)
        .await
        .expect("resolve");

    assert_eq!(params.url, "https://config-abc.apps.example/");
}

#[tokio::test]
async fn v3_lifecycle_falls_back_to_management_url_without_a_broker() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("scs-config", "https://dash.example/dashboard/g1");
    let client = Arc::new(FakeClient::new(journal).reply(404, ""));

    let params = resolver(platform, client.clone())
        .resolve("svc", "tok", EndpointKind::Lifecycle)
        .await
        .expect("resolve");

    assert_eq!(params.url, "https://dash.example/cli/instances/g1");
    assert_eq!(client.requests()[0].url, "https://scs-service-broker.sys.example/actuator/info");
}

#[tokio::test]
async fn v3_lifecycle_probe_failure_status_is_reported() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("scs-config", "https://dash.example/dashboard/g1");
    let client = Arc::new(FakeClient::new(journal).reply(503, ""));

    let err = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::Lifecycle)
        .await
        .unwrap_err();

    assert!(matches!(err, ScsError::Resolve(ResolveError::BrokerProbe { status: 503, .. })));
}

#[tokio::test]
async fn v3_lifecycle_probe_transport_error_propagates() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("scs-config", "https://dash.example/dashboard/g1");
    let client = Arc::new(FakeClient::new(journal));

    let err = resolver(platform, client)
        .resolve("svc", "tok", EndpointKind::Lifecycle)
        .await
        .unwrap_err();

    assert!(matches!(err, ScsError::Transport(_)));
}

#[tokio::test]
async fn configured_broker_prefix_is_used() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone()).with_service("scs-config", "https://dash.example/dashboard/g1");
    let client = Arc::new(FakeClient::new(journal).reply(200, "{}"));

    let params = EndpointResolver::new(Arc::new(platform), client, "broker.")
        .resolve("svc", "tok", EndpointKind::Lifecycle)
        .await
        .expect("resolve");

    assert_eq!(params.url, "https://broker.sys.example/cli/instances/g1");
}

#[tokio::test]
async fn unknown_service_is_a_lookup_error() {
    let journal = journal();
    let platform = FakePlatform::new(journal.clone());
    let client = Arc::new(FakeClient::new(journal));

    let err = resolver(platform, client)
        .resolve("missing", "tok", EndpointKind::Management)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Service instance missing not found: "), "{err}");
}

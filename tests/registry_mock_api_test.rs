//! Registry tests against wiremock servers.
//!
//! Each test builds a registry over one or two mock servers and checks the
//! requests the proxies send.

use siumai_exchange::{
    BodyType, HttpService, HttpServiceError, HttpServiceProxyRegistry, MethodDescriptor,
    ReturnType, ServiceDescriptor, ServiceProxy,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct GreetingService(ServiceProxy);

impl HttpService for GreetingService {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new().method(
            MethodDescriptor::get("get_greeting", "/greeting")
                .returns(ReturnType::Body(BodyType::Text)),
        )
    }

    fn from_proxy(proxy: ServiceProxy) -> Self {
        Self(proxy)
    }
}

impl GreetingService {
    async fn get_greeting(&self) -> Result<Option<String>, HttpServiceError> {
        self.0.exchange_for_body("get_greeting", vec![]).await
    }
}

struct EchoService(ServiceProxy);

impl HttpService for EchoService {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new().method(MethodDescriptor::post("ping", "/ping"))
    }

    fn from_proxy(proxy: ServiceProxy) -> Self {
        Self(proxy)
    }
}

impl EchoService {
    async fn ping(&self) -> Result<(), HttpServiceError> {
        self.0.exchange("ping", vec![]).await
    }
}

async fn greeting_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/greeting"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/plain"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn greeting_carries_client_and_factory_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/greeting"))
        .and(header("Base-Header", "h0"))
        .and(header("Some-Header", "h1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello, world!"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = HttpServiceProxyRegistry::builder()
        .group(&server.uri())
        .unwrap()
        .configure_client(|client| client.default_header("Base-Header", "h0"))
        .unwrap()
        .configure_proxy_factory(|factory| factory.default_header("Some-Header", "h1"))
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .build()
        .unwrap();

    let greeting = registry.get_client::<GreetingService>().unwrap().unwrap();
    assert_eq!(
        greeting.get_greeting().await.unwrap().as_deref(),
        Some("Hello, world!")
    );
}

#[tokio::test]
async fn same_service_in_two_groups_is_ambiguous() {
    let first = greeting_server("from first").await;
    let second = greeting_server("from second").await;

    let registry = HttpServiceProxyRegistry::builder()
        .named_group("first", &first.uri())
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .named_group("second", &second.uri())
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .build()
        .unwrap();

    let err = registry.get_client::<GreetingService>().err().unwrap();
    assert!(matches!(err, HttpServiceError::AmbiguousClient { .. }));
    assert!(err.is_configuration_error());

    let one = registry
        .get_client_in_group::<GreetingService>("first")
        .unwrap();
    let two = registry
        .get_client_in_group::<GreetingService>("second")
        .unwrap();
    assert_eq!(one.get_greeting().await.unwrap().as_deref(), Some("from first"));
    assert_eq!(two.get_greeting().await.unwrap().as_deref(), Some("from second"));
    assert!(registry.get_client_in_group::<GreetingService>("third").is_none());
}

#[tokio::test]
async fn apply_adds_basic_auth_to_existing_groups() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .and(header("Authorization", "Basic am9objoxMjM="))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let registry = HttpServiceProxyRegistry::builder()
        .group(&server.uri())
        .unwrap()
        .http_service::<EchoService>()
        .unwrap()
        .apply(|group| {
            group.configure_client(|client| client.basic_auth("john", "123"));
        })
        .build()
        .unwrap();

    let echo = registry.get_client::<EchoService>().unwrap().unwrap();
    echo.ping().await.unwrap();
}

#[tokio::test]
async fn groups_keep_their_own_headers() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for (server, value) in [(&first, "one"), (&second, "two")] {
        Mock::given(method("POST"))
            .and(path("/ping"))
            .and(header("X-Group", value))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(server)
            .await;
    }

    let registry = HttpServiceProxyRegistry::builder()
        .named_group("one", &first.uri())
        .unwrap()
        .configure_client(|client| client.default_header("X-Group", "one"))
        .unwrap()
        .http_service::<EchoService>()
        .unwrap()
        .named_group("two", &second.uri())
        .unwrap()
        .configure_client(|client| client.default_header("X-Group", "two"))
        .unwrap()
        .http_service::<EchoService>()
        .unwrap()
        .build()
        .unwrap();

    for name in registry.group_names() {
        let echo = registry.get_client_in_group::<EchoService>(name).unwrap();
        echo.ping().await.unwrap();
    }
}

#[tokio::test]
async fn error_status_surfaces_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/greeting"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let registry = HttpServiceProxyRegistry::builder()
        .group(&server.uri())
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .build()
        .unwrap();

    let greeting = registry.get_client::<GreetingService>().unwrap().unwrap();
    let err = greeting.get_greeting().await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn duplicate_registration_yields_one_proxy() {
    let server = greeting_server("hi").await;
    let registry = HttpServiceProxyRegistry::builder()
        .group(&server.uri())
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .http_service::<GreetingService>()
        .unwrap()
        .build()
        .unwrap();

    let group = registry.proxy_group(&server.uri()).unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group.base_url(), server.uri());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn duplicate_group_name_fails_before_any_request() {
    let result = HttpServiceProxyRegistry::builder()
        .named_group("api", "http://localhost:1")
        .unwrap()
        .named_group("api", "http://localhost:2");
    assert!(result.unwrap_err().is_configuration_error());
}

//! Mock external services for integration tests
//!
//! Provides wiremock-based mocks for:
//! - The two ingresses (gateway and the proxy in front of it), each serving `/echo`
//! - Azure Key Vault secret lookups and the Entra ID token endpoint
//!
//! and a raw TCP server for responses wiremock cannot produce.

use std::net::SocketAddr;

use gateway_conformance::ingress::{ClientConfig, Endpoint, IngressRegistry};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Two ingress mocks named `api-management` and `application-gateway`.
pub struct GatewayMocks {
    pub api_management: MockServer,
    pub application_gateway: MockServer,
}

impl GatewayMocks {
    /// Both ingresses return 200 for `?subscription-key=<key>&foo=bar` and
    /// 401 for anything else on `/echo`.
    pub async fn start_accepting(key: &str) -> Self {
        let mocks = Self {
            api_management: MockServer::start().await,
            application_gateway: MockServer::start().await,
        };
        mount_echo(&mocks.api_management, key).await;
        mount_echo(&mocks.application_gateway, key).await;
        mocks
    }

    /// Each ingress answers every `/echo` request with a fixed status.
    pub async fn start_with_status(api_management: u16, application_gateway: u16) -> Self {
        let mocks = Self {
            api_management: MockServer::start().await,
            application_gateway: MockServer::start().await,
        };
        mount_status(&mocks.api_management, api_management).await;
        mount_status(&mocks.application_gateway, application_gateway).await;
        mocks
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::parse("api-management", &self.api_management.uri()).unwrap(),
            Endpoint::parse("application-gateway", &self.application_gateway.uri()).unwrap(),
        ]
    }

    pub fn registry(&self) -> IngressRegistry {
        IngressRegistry::from_endpoints(self.endpoints(), &ClientConfig::default()).unwrap()
    }
}

async fn mount_echo(server: &MockServer, key: &str) {
    Mock::given(method("GET"))
        .and(path("/echo"))
        .and(query_param("subscription-key", key))
        .and(query_param("foo", "bar"))
        .respond_with(|req: &Request| {
            ResponseTemplate::new(200).set_body_json(json!({
                "path": req.url.path(),
                "foo": "bar",
            }))
        })
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": "Access denied due to missing subscription key.",
        })))
        .with_priority(10)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Request targets (`/path?query`) received by `server`, in arrival order.
pub async fn received_targets(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| match req.url.query() {
            Some(query) => format!("{}?{}", req.url.path(), query),
            None => req.url.path().to_string(),
        })
        .collect()
}

/// Serve `value` as Key Vault secret `name` to callers presenting `token`.
pub async fn mount_key_vault_secret(server: &MockServer, name: &str, value: &str, token: &str) {
    let id = format!("{}/secrets/{}/4387e9f3d6e14c459867679a90fd0f79", server.uri(), name);
    Mock::given(method("GET"))
        .and(path(format!("/secrets/{}", name)))
        .and(query_param("api-version", "7.4"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": value,
            "id": id,
            "attributes": { "enabled": true },
        })))
        .mount(server)
        .await;
}

/// Key Vault answers every secret lookup with `status` and an error body.
pub async fn mount_key_vault_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/secrets/.+"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": "Error", "message": "mocked failure" }
        })))
        .mount(server)
        .await;
}

/// Entra ID token endpoint issuing `token` for `client_id` in `tenant`.
pub async fn mount_token_endpoint(server: &MockServer, tenant: &str, client_id: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", tenant)))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains(format!("client_id={}", client_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": token,
        })))
        .mount(server)
        .await;
}

/// Accepts connections and answers each with fixed raw bytes, then closes.
pub struct RawHttpServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RawHttpServer {
    pub async fn start(response: &'static [u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(response).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, handle }
    }

    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RawHttpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

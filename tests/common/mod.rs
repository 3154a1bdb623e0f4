//! Shared helpers for the gateway integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
    routing,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use okta_gateway::{app, config::Config};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const AUDIENCE: &str = "api://default";
pub const ISSUER: &str = "https://dev-123.okta.com/oauth2/default";
pub const ISSUER_KID: &str = "issuer-key-1";
pub const ROGUE_KID: &str = "rogue-key-1";

pub const ISSUER_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/issuer_private.pem");
pub const ISSUER_PUBLIC_PEM: &str = include_str!("../fixtures/issuer_public.pem");
pub const ROGUE_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/rogue_private.pem");
pub const ISSUER_JWKS: &str = include_str!("../fixtures/jwks_issuer.json");
pub const ROTATED_JWKS: &str = include_str!("../fixtures/jwks_rotated.json");

/// Config with the required values filled in; `extra` overrides or adds.
pub fn config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OKTA_DOMAIN".to_string(), ISSUER.to_string()),
        ("AUDIENCE".to_string(), AUDIENCE.to_string()),
        ("ACCESS_TOKEN_LEEWAY_SECONDS".to_string(), "0".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_vars(|key| vars.get(key).cloned()).expect("test config")
}

/// Gateway keyed to the issuer's public key (no JWKS fetching).
pub fn static_key_config() -> Config {
    config(&[("OKTA_PUBLIC_KEY_PEM", ISSUER_PUBLIC_PEM)])
}

pub async fn gateway(config: &Config) -> Router {
    let state = app::build_state(config).await.expect("state");
    app::build_router(state, config)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn claims() -> Value {
    json!({
        "ver": 1,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "alice@example.com",
        "uid": "00u1ab2cd3",
        "scp": ["openid", "users"],
        "iat": now(),
        "exp": now() + 3600
    })
}

pub fn sign(claims: &Value, private_pem: &[u8], kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(private_pem).expect("fixture key");
    jsonwebtoken::encode(&header, claims, &key).expect("sign")
}

pub fn issuer_token() -> String {
    sign(&claims(), ISSUER_PRIVATE_PEM, Some(ISSUER_KID))
}

pub fn get(path: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    }
}

/// Throwaway JWKS endpoint with a switchable body and a hit counter.
pub struct FakeProvider {
    response: Mutex<(StatusCode, &'static str)>,
    hits: AtomicUsize,
}

impl FakeProvider {
    pub fn set(&self, status: StatusCode, body: &'static str) {
        *self.response.lock().unwrap() = (status, body);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn serve_jwks(body: &'static str) -> (String, Arc<FakeProvider>) {
    let provider = Arc::new(FakeProvider {
        response: Mutex::new((StatusCode::OK, body)),
        hits: AtomicUsize::new(0),
    });

    let shared = provider.clone();
    let app = Router::new().route(
        "/oauth2/default/v1/keys",
        routing::get(move || {
            let provider = shared.clone();
            async move {
                provider.hits.fetch_add(1, Ordering::SeqCst);
                let (status, body) = *provider.response.lock().unwrap();
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/oauth2/default/v1/keys"), provider)
}

/// JWKS endpoint that never answers in time; only the hit counter is used.
pub async fn serve_hanging_jwks() -> (String, Arc<FakeProvider>) {
    let provider = Arc::new(FakeProvider {
        response: Mutex::new((StatusCode::OK, ISSUER_JWKS)),
        hits: AtomicUsize::new(0),
    });

    let shared = provider.clone();
    let app = Router::new().route(
        "/oauth2/default/v1/keys",
        routing::get(move || {
            let provider = shared.clone();
            async move {
                provider.hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                let (status, body) = *provider.response.lock().unwrap();
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/oauth2/default/v1/keys"), provider)
}

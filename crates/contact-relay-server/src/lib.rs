//! HTTP surface for the Contact Relay intake endpoint.
//!
//! A single POST endpoint (JSON or form-encoded body) plus a liveness
//! route. CORS is fully open by design: this is a single-purpose public
//! contact form, and the endpoint carries no credentials or state worth
//! protecting from cross-origin reads. OPTIONS preflights answer 200 with
//! an empty body.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use asupersync::http::h1::listener::Http1Listener;
use asupersync::http::h1::types::{
    Method as Http1Method, Request as Http1Request, Response as Http1Response, default_reason,
};
use asupersync::runtime::RuntimeBuilder;
use chrono::Utc;
use contact_relay_core::models::SubmissionOutcome;
use contact_relay_core::Config;
use tracing::info;

pub mod audit;
pub mod intake;
pub mod mail;
pub mod net;
pub mod ratelimit;

pub use intake::Intake;
pub use mail::{CapturingDispatcher, MailDispatcher, SendmailDispatcher};

/// Methods advertised on CORS responses.
const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
/// Headers advertised on CORS responses.
const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Bind the listener and serve submissions until the process exits.
pub fn run_http(config: &Config) -> std::io::Result<()> {
    let dispatcher = Arc::new(SendmailDispatcher::from_config(config));
    let state = Arc::new(HttpState::new(config.clone(), dispatcher));

    let addr = format!("{}:{}", config.http_host, config.http_port);
    info!(addr = %addr, path = %config.http_path, "starting contact intake endpoint");

    let runtime = RuntimeBuilder::new()
        .build()
        .map_err(|e| std::io::Error::other(format!("runtime: {e}")))?;
    let handle = runtime.handle();
    runtime.block_on(async move {
        let handler_state = Arc::clone(&state);
        let listener = Http1Listener::bind(addr, move |req| {
            let inner = Arc::clone(&handler_state);
            async move { inner.handle(req).await }
        })
        .await?;

        listener.run(&handle).await?;
        Ok::<(), std::io::Error>(())
    })
}

/// Per-process HTTP state: configuration plus the intake pipeline.
pub struct HttpState {
    config: Config,
    intake: Intake,
}

impl HttpState {
    #[must_use]
    pub fn new(config: Config, dispatcher: Arc<dyn mail::MailDispatcher>) -> Self {
        let intake = Intake::new(config.clone(), dispatcher);
        Self { config, intake }
    }

    #[allow(clippy::unused_async)] // Required for Http1Listener interface
    pub async fn handle(&self, req: Http1Request) -> Http1Response {
        let start = Instant::now();
        let method = req.method.clone();
        let path = split_path_query(&req.uri).0;
        let client_ip = req
            .peer_addr
            .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());

        let resp = self.handle_inner(req);

        let duration_ms =
            u64::try_from(start.elapsed().as_millis().min(u128::from(u64::MAX))).unwrap_or(u64::MAX);
        info!(
            method = method.as_str(),
            path = %path,
            status = resp.status,
            duration_ms,
            client_ip = %client_ip,
            "http request"
        );
        resp
    }

    fn handle_inner(&self, req: Http1Request) -> Http1Response {
        if matches!(req.method, Http1Method::Options) {
            // Preflight: 200, empty body, open CORS.
            let mut resp = Http1Response::new(200, default_reason(200), Vec::new());
            apply_cors_headers(&mut resp);
            return resp;
        }

        let (path, _query) = split_path_query(&req.uri);

        if path == "/health/liveness" {
            if !matches!(req.method, Http1Method::Get) {
                return error_response(405, "Method Not Allowed");
            }
            return json_response(200, &serde_json::json!({"status": "alive"}));
        }

        if path != self.config.http_path {
            return error_response(404, "Not Found");
        }

        let now = Utc::now();
        if !matches!(req.method, Http1Method::Post) {
            let err = contact_relay_core::Error::MethodNotAllowed(format!(
                "only POST is accepted, got {}",
                req.method.as_str()
            ));
            return outcome_response(&SubmissionOutcome::failure(&err, now));
        }

        let actor = net::resolve_actor_addr(&req.headers, req.peer_addr);
        let content_type = header_value(&req, "content-type");
        let outcome = self
            .intake
            .handle_submission(&req.body, content_type, &actor, now);
        outcome_response(&outcome)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn outcome_response(outcome: &SubmissionOutcome) -> Http1Response {
    json_response(
        outcome.http_status(),
        &serde_json::to_value(outcome).unwrap_or_default(),
    )
}

fn json_response(status: u16, value: &serde_json::Value) -> Http1Response {
    let mut resp = Http1Response::new(
        status,
        default_reason(status),
        serde_json::to_vec(value).unwrap_or_default(),
    );
    resp.headers.push((
        "content-type".to_string(),
        "application/json; charset=utf-8".to_string(),
    ));
    apply_cors_headers(&mut resp);
    resp
}

fn error_response(status: u16, message: &str) -> Http1Response {
    json_response(
        status,
        &serde_json::json!({
            "success": false,
            "error": message,
            "code": status,
            "timestamp": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }),
    )
}

fn apply_cors_headers(resp: &mut Http1Response) {
    resp.headers
        .push(("access-control-allow-origin".to_string(), "*".to_string()));
    resp.headers.push((
        "access-control-allow-methods".to_string(),
        CORS_ALLOW_METHODS.to_string(),
    ));
    resp.headers.push((
        "access-control-allow-headers".to_string(),
        CORS_ALLOW_HEADERS.to_string(),
    ));
}

fn split_path_query(uri: &str) -> (String, Option<String>) {
    let mut parts = uri.splitn(2, '?');
    let path = parts.next().unwrap_or("/").to_string();
    let query = parts.next().map(std::string::ToString::to_string);
    (path, query)
}

fn header_value<'a>(req: &'a Http1Request, name: &str) -> Option<&'a str> {
    req.headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

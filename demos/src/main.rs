//! A runnable mutating admission webhook built on the `admission` crate.
//!
//! Registers a single capability (`addLabel`) and serves it over HTTPS at
//! `/mutate`, with a `/healthz` liveness probe. Mirrors the teacher
//! crate's own `examples/admission_controller.rs` transport shape,
//! generalized to dispatch through [`admission::processor::process`]
//! instead of a single hardcoded `mutate` function.
use std::{net::SocketAddr, sync::Arc, time::Duration};

use admission::{
    core::{
        admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
        DynamicObject, GroupVersionKind,
    },
    Capability, ModuleConfig, ProcessorError,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};

/// Shared, immutable state handed to every request handler. Cloning an
/// `Arc<AppState>` is the only per-request cost; `config` and
/// `capabilities` themselves are never mutated after startup.
struct AppState {
    config: ModuleConfig,
    capabilities: Vec<Capability>,
}

/// The admission timeout budget enforced by [`mutate_handler`]'s
/// fail-open wrapper, comfortably inside the ~10s the API server grants
/// a webhook by default.
const ADMISSION_DEADLINE: Duration = Duration::from_secs(8);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let bundle_hash = module_bundle_hash();
    info!(bundle_hash = %bundle_hash, "starting admission module");

    let state = Arc::new(build_state());

    let app = Router::new()
        .route("/mutate", post(mutate_handler))
        .route("/healthz", get(healthz))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(Level::INFO)),
        )
        .with_state(state);

    let port: u16 = std::env::var("ADMISSION_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    axum_server::bind_rustls(
        addr,
        RustlsConfig::from_pem_file("admission-controller-tls.crt", "admission-controller-tls.key")
            .await
            .unwrap(),
    )
    .serve(app.into_make_service())
    .await
    .unwrap();
}

/// Build the module's configuration and capability set. A real module
/// would likely load `ModuleConfig` from a mounted YAML file via
/// [`ModuleConfig::from_reader`]; this demo builds it programmatically to
/// keep the example self-contained.
fn build_state() -> AppState {
    let config = ModuleConfig::builder("hello-admission")
        .description("demo module: rejects 'illegal' labels, stamps the rest")
        .reject_on_error(false)
        .build();

    let mut add_label = Capability::new("addLabel");
    add_label
        .when(GroupVersionKind::kind_only("Pod"))
        .is_created_or_updated()
        .then(|wrapper| {
            if wrapper.labels().contains_key("illegal") {
                return Err("resource contained 'illegal' label".into());
            }
            if !wrapper.labels().contains_key("admission") {
                wrapper
                    .labels_mut()
                    .insert("admission".into(), "modified-by-admission-controller".into());
            }
            Ok(())
        });

    AppState {
        config,
        capabilities: vec![add_label],
    }
}

/// `POST /mutate`. A body that isn't a well-formed `AdmissionReview` yields
/// `AdmissionResponse::invalid` rather than an HTTP error status, since the
/// API server expects a well-formed `AdmissionReview` back even on failure.
/// A well-formed review whose `request` is missing an object it requires
/// (`ProcessorError::MalformedRequest`) is a different failure mode and is
/// reported as a plain HTTP 400, since there is no usable request to build
/// an `AdmissionReview` response around.
async fn mutate_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Response {
    let req: AdmissionRequest<_> = match body.try_into() {
        Ok(req) => req,
        Err(err) => {
            error!(error = %err, "invalid admission review");
            return Json(AdmissionResponse::invalid(err.to_string()).into_review()).into_response();
        }
    };

    let uid = req.uid.clone();
    let name = req.name.clone();
    let kind = req.kind.kind.clone();
    let operation = req.operation;

    let outcome = tokio::time::timeout(
        ADMISSION_DEADLINE,
        run_processor(state, req),
    )
    .await;

    let response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(ProcessorError::MalformedRequest(reason))) => {
            warn!(%kind, %name, ?operation, %reason, "rejecting malformed admission request");
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
        Ok(Err(err)) => {
            error!(%kind, %name, ?operation, error = %err, "processor error");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
        Err(_) => {
            warn!(%kind, %name, ?operation, "admission deadline exceeded, failing open");
            AdmissionResponse {
                uid,
                allowed: true,
                result: None,
                patch: None,
                patch_type: None,
                warnings: vec!["admission deadline exceeded; request allowed unmodified".into()],
            }
        }
    };

    info!(%kind, %name, ?operation, allowed = response.allowed, "processed admission request");
    Json(response.into_review()).into_response()
}

async fn run_processor(
    state: Arc<AppState>,
    request: AdmissionRequest<DynamicObject>,
) -> Result<AdmissionResponse, ProcessorError> {
    admission::process(&state.config, &state.capabilities, request)
}

/// `GET /healthz`. Returns `200 OK` unconditionally once the process has
/// reached a point where its capabilities are registered, which for this
/// binary is true as soon as the router is constructed.
async fn healthz() -> impl IntoResponse {
    "ok"
}

/// SHA-256 of this binary's own bytes, logged at startup for audit
/// correlation with the module bundle a deployment pipeline recorded.
fn module_bundle_hash() -> String {
    use sha2::{Digest, Sha256};

    let path = std::env::current_exe().ok();
    let bytes = path.and_then(|p| std::fs::read(p).ok()).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

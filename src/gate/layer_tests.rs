//! Tests for the tower middleware.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, RETRY_AFTER};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use tower::{Layer, Service, ServiceExt, service_fn};

use super::{MaintenanceGate, MaintenanceLayer};
use crate::bypass::Identity;
use crate::control::MaintenanceSwitch;
use crate::options::{OptionsBuilder, PathMatchMode};
use crate::response::{DEFAULT_DOCUMENT, HostingEnvironment, MaintenanceResponse, TextEncoding};

const APP_BODY: &str = "application";

fn layer(switch: &Arc<MaintenanceSwitch>, options: &OptionsBuilder) -> MaintenanceLayer {
    let env = HostingEnvironment::new("wwwroot", ".");
    MaintenanceGate::new(Arc::clone(switch), &env, options)
        .unwrap()
        .into_layer()
}

/// Downstream application that counts its invocations.
#[derive(Clone)]
struct App {
    calls: Arc<AtomicUsize>,
}

impl tower::Service<Request<()>> for App {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<()>) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(Response::new(Full::new(Bytes::from_static(
            APP_BODY.as_bytes(),
        )))))
    }
}

fn app(calls: &Arc<AtomicUsize>) -> App {
    App {
        calls: Arc::clone(calls),
    }
}

async fn body_bytes<B>(body: B) -> Bytes
where
    B: hyper::body::Body,
    B::Error: std::fmt::Debug,
{
    body.collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn forwards_when_maintenance_off() {
    let switch = Arc::new(MaintenanceSwitch::new(false));
    let calls = Arc::new(AtomicUsize::new(0));
    let svc = layer(&switch, &OptionsBuilder::new()).layer(app(&calls));

    let response = svc.oneshot(Request::get("/anything").body(()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, APP_BODY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn serves_default_document_during_maintenance() {
    let switch = Arc::new(MaintenanceSwitch::new(true));
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionsBuilder::new().retry_interval(120).use_default_response();
    let svc = layer(&switch, &options).layer(app(&calls));

    let response = svc.oneshot(Request::get("/anything").body(()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[RETRY_AFTER], "120");
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
    assert_eq!(body_bytes(response.into_body()).await, DEFAULT_DOCUMENT.as_bytes());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn extension_bypass_reaches_application() {
    let switch = Arc::new(MaintenanceSwitch::new(true));
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionsBuilder::new()
        .bypass_extension("css")
        .bypass_role("Admin");
    let svc = layer(&switch, &options).layer(app(&calls));

    let response = svc
        .oneshot(Request::get("/site/style.css").body(()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn username_bypass_depends_on_identity() {
    let switch = Arc::new(MaintenanceSwitch::new(true));
    let calls = Arc::new(AtomicUsize::new(0));
    let maintenance = layer(&switch, &OptionsBuilder::new().bypass_username("admin"));

    let mut as_admin = Request::get("/dashboard").body(()).unwrap();
    as_admin.extensions_mut().insert(Identity::authenticated("admin"));
    let mut as_bob = Request::get("/dashboard").body(()).unwrap();
    as_bob.extensions_mut().insert(Identity::authenticated("bob"));

    let admin_res = maintenance.layer(app(&calls)).oneshot(as_admin).await.unwrap();
    let bob_res = maintenance.layer(app(&calls)).oneshot(as_bob).await.unwrap();

    assert_eq!(admin_res.status(), StatusCode::OK);
    assert_eq!(bob_res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn body_is_sent_byte_for_byte() {
    let switch = Arc::new(MaintenanceSwitch::new(true));
    let calls = Arc::new(AtomicUsize::new(0));
    let explicit = MaintenanceResponse::from_text(
        crate::response::ContentType::Text,
        TextEncoding::Utf16Be,
        "Wartung",
    );
    let options = OptionsBuilder::new()
        .use_response(explicit.clone())
        .retry_interval(30);
    let svc = layer(&switch, &options).layer(app(&calls));

    let response = svc.oneshot(Request::get("/").body(()).unwrap()).await.unwrap();

    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(response.into_body()).await, explicit.bytes);
}

#[tokio::test]
async fn path_bypass_with_switch_toggled_between_requests() {
    let switch = Arc::new(MaintenanceSwitch::new(false));
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionsBuilder::new().bypass_path_prefix("/health", PathMatchMode::IgnoreCase);
    let maintenance = layer(&switch, &options);

    let before = maintenance
        .layer(app(&calls))
        .oneshot(Request::get("/shop").body(()).unwrap())
        .await
        .unwrap();
    switch.enter();
    let blocked = maintenance
        .layer(app(&calls))
        .oneshot(Request::get("/shop").body(()).unwrap())
        .await
        .unwrap();
    let health = maintenance
        .layer(app(&calls))
        .oneshot(Request::get("/health/ready").body(()).unwrap())
        .await
        .unwrap();

    assert_eq!(before.status(), StatusCode::OK);
    assert_eq!(blocked.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(blocked.headers()[RETRY_AFTER], "5300");
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn inner_errors_propagate_unchanged() {
    let switch = Arc::new(MaintenanceSwitch::new(false));
    let failing = service_fn(|_req: Request<()>| async {
        Err::<Response<Full<Bytes>>, &'static str>("downstream failed")
    });
    let svc = layer(&switch, &OptionsBuilder::new()).layer(failing);

    let result = svc.oneshot(Request::get("/").body(()).unwrap()).await;

    let Err(err) = result else {
        panic!("expected the downstream error");
    };
    assert_eq!(err, "downstream failed");
}

/// Downstream service that holds a slot from `poll_ready` until it is called
/// or dropped. Clones start without a slot.
struct SlotApp {
    slots: Arc<()>,
    held: Option<Arc<()>>,
}

impl Clone for SlotApp {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            held: None,
        }
    }
}

impl tower::Service<Request<()>> for SlotApp {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.held = Some(Arc::clone(&self.slots));
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<()>) -> Self::Future {
        self.held = None;
        std::future::ready(Ok(Response::new(Full::new(Bytes::new()))))
    }
}

/// Slots currently held by ready-but-uncalled instances.
fn held_slots(slots: &Arc<()>) -> usize {
    // One reference is the test's own handle, one is the service's `slots`
    Arc::strong_count(slots) - 2
}

#[tokio::test]
async fn maintenance_releases_inner_readiness() {
    let switch = Arc::new(MaintenanceSwitch::new(true));
    let slots = Arc::new(());
    let mut svc = layer(&switch, &OptionsBuilder::new()).layer(SlotApp {
        slots: Arc::clone(&slots),
        held: None,
    });

    let response = svc
        .ready()
        .await
        .unwrap()
        .call(Request::get("/").body(()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(held_slots(&slots), 0);
}

#[tokio::test]
async fn pass_through_consumes_inner_readiness() {
    let switch = Arc::new(MaintenanceSwitch::new(false));
    let slots = Arc::new(());
    let mut svc = layer(&switch, &OptionsBuilder::new()).layer(SlotApp {
        slots: Arc::clone(&slots),
        held: None,
    });

    let response = svc
        .ready()
        .await
        .unwrap()
        .call(Request::get("/").body(()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(held_slots(&slots), 0);
}

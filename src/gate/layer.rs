//! Tower middleware around [`MaintenanceGate`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{Either, Full};
use tower::{Layer, Service};

use super::{Decision, MaintenanceGate};

/// Layer that applies a shared [`MaintenanceGate`] to a service.
#[derive(Debug, Clone)]
pub struct MaintenanceLayer {
    gate: Arc<MaintenanceGate>,
}

impl MaintenanceLayer {
    /// Creates a layer from a constructed gate.
    #[must_use]
    pub const fn new(gate: Arc<MaintenanceGate>) -> Self {
        Self { gate }
    }

    /// The shared gate.
    #[must_use]
    pub fn gate(&self) -> &MaintenanceGate {
        &self.gate
    }
}

impl<S> Layer<S> for MaintenanceLayer {
    type Service = MaintenanceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MaintenanceService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Service that answers 503 during maintenance and otherwise forwards to
/// the inner service.
///
/// Errors from the inner service are returned unchanged.
///
/// Each call takes the inner service that was driven ready and leaves a fresh
/// clone in its place. On the maintenance branch the ready instance is
/// dropped, so a reserved slot (e.g. from `tower::buffer` or a concurrency
/// limit) is released rather than held until the next request.
#[derive(Debug, Clone)]
pub struct MaintenanceService<S> {
    inner: S,
    gate: Arc<MaintenanceGate>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MaintenanceService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<Either<ResBody, Full<Bytes>>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        match self.gate.decide(&req) {
            Decision::PassThrough(reason) => {
                tracing::debug!(path = %req.uri().path(), %reason, "Forwarding request");
                let fut = inner.call(req);
                Box::pin(async move { fut.await.map(|res| res.map(Either::Left)) })
            }
            Decision::Maintenance { retry_after } => {
                tracing::debug!(path = %req.uri().path(), retry_after, "Serving maintenance response");
                drop(inner);
                let res = self.gate.maintenance_response(retry_after).map(Either::Right);
                Box::pin(async move { Ok::<_, S::Error>(res) })
            }
        }
    }
}

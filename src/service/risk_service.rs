use std::pin::Pin;
use std::sync::Arc;

use futures::task::{Context, Poll};
use futures::Future;
use serde::{Deserialize, Serialize};
use tower::Service;

use crate::analyzer::{AnalysisResult, Analyzer};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Exposes an [`Analyzer`] as a `tower::Service` for query front-ends.
#[derive(Clone)]
pub struct RiskService {
    inner: Arc<Analyzer>,
}

impl RiskService {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            inner: Arc::new(analyzer),
        }
    }

    pub fn from_shared(analyzer: Arc<Analyzer>) -> Self {
        Self { inner: analyzer }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.inner
    }
}

impl Service<Coordinate> for RiskService {
    type Response = AnalysisResult;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Coordinate) -> Self::Future {
        // The lookup is a synchronous read, so resolve it before boxing.
        let result = self.inner.analyze(req.latitude, req.longitude);
        Box::pin(async move { result })
    }
}

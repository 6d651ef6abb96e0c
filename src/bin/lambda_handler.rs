//! AWS Lambda handler for net worth projections
//!
//! Accepts a portfolio and projection parameters as JSON and returns the full
//! projection result. Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Request, Response};
use lambda_runtime::Error;
use log::{info, warn};
use serde::Deserialize;

use networth_projection::calculators::UnpaidInterest;
use networth_projection::{
    Asset, Granularity, Horizon, Liability, Month, ProjectionConfig, ProjectionEngine, ProjectionMode,
    ProjectionRequest, Snapshot,
};

/// Request body
#[derive(Debug, Deserialize)]
pub struct LambdaRequest {
    #[serde(default)]
    pub assets: Vec<Asset>,

    #[serde(default)]
    pub liabilities: Vec<Liability>,

    #[serde(default)]
    pub snapshots: Vec<Snapshot>,

    /// `{"months": 24}` or `{"years": 5}` (default: 5 years)
    #[serde(default = "default_horizon")]
    pub horizon: Horizon,

    #[serde(default = "default_mode")]
    pub mode: ProjectionMode,

    #[serde(default)]
    pub granularity: Granularity,

    /// Month treated as "now"; defaults to the current month
    #[serde(default)]
    pub now: Option<Month>,

    #[serde(default)]
    pub unpaid_interest: UnpaidInterest,
}

fn default_horizon() -> Horizon { Horizon::Years(5) }
fn default_mode() -> ProjectionMode { ProjectionMode::Future }

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(cors(Response::builder().status(status))
        .header("Content-Type", "application/json")
        .body(Body::Text(body.to_string()))?)
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(cors(Response::builder().status(200)).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: LambdaRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let engine = ProjectionEngine::new(ProjectionConfig {
        unpaid_interest: request.unpaid_interest,
        ..Default::default()
    });
    let now = request.now.unwrap_or_else(Month::current);
    let projection = ProjectionRequest::new(request.horizon, request.mode, request.granularity);

    let result = match engine.project(
        &request.assets,
        &request.liabilities,
        &request.snapshots,
        &projection,
        now,
    ) {
        Ok(r) => r,
        Err(e) => {
            warn!("rejected projection request: {}", e);
            return error_response(400, &e.to_string());
        }
    };

    info!(
        "projected {} points ({} payoffs) in {} ms",
        result.timeline.len(),
        result.payoff_events.len(),
        start.elapsed().as_millis()
    );

    let body = match serde_json::to_string(&result) {
        Ok(b) => b,
        Err(e) => return error_response(500, &format!("Failed to serialize result: {}", e)),
    };

    Ok(cors(Response::builder().status(200))
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

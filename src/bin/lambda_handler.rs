//! AWS Lambda handler for running historical-cycle simulations
//!
//! Accepts a JSON `SimulationParams` body via a Lambda Function URL and returns
//! the cycle results with aggregate statistics.

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{error, info};
use retirement_cycles::{
    history::DEFAULT_SERIES_PATH, CsvSource, SimulationError, SimulationParams, SimulationRunner,
    SweepResult,
};
use serde::Serialize;
use std::collections::HashMap;

/// HTTP response shape understood by Function URLs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionUrlResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationResponse {
    #[serde(flatten)]
    result: SweepResult,
    execution_time_ms: u64,
}

fn data_path() -> String {
    std::env::var("HISTORICAL_DATA_PATH").unwrap_or_else(|_| DEFAULT_SERIES_PATH.to_string())
}

fn cors_headers() -> HashMap<String, String> {
    HashMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Methods".to_string(), "POST, OPTIONS".to_string()),
        ("Access-Control-Allow-Headers".to_string(), "Content-Type".to_string()),
    ])
}

fn error_response(status: u16, message: &str) -> FunctionUrlResponse {
    FunctionUrlResponse {
        status_code: status,
        headers: cors_headers(),
        body: serde_json::json!({ "error": message }).to_string(),
    }
}

/// Request errors are the caller's fault; data-source failures are ours
fn status_for(err: &SimulationError) -> u16 {
    match err {
        SimulationError::DataSource(_) => 500,
        _ => 400,
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<FunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    if request.is_base64_encoded {
        return Ok(error_response(400, "binary request bodies are not supported"));
    }

    let body = request.body.unwrap_or_default();
    let params: SimulationParams = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    let runner = SimulationRunner::new(CsvSource::new(data_path()));
    let result = match runner.run(&params) {
        Ok(r) => r,
        Err(e) => {
            error!("Simulation failed: {}", e);
            return Ok(error_response(status_for(&e), &e.to_string()));
        }
    };

    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "Simulated {} cycles in {} ms ({:.1}% success)",
        result.cycles.len(),
        execution_time_ms,
        result.success_rate_pct
    );

    let response = SimulationResponse {
        result,
        execution_time_ms,
    };

    Ok(FunctionUrlResponse {
        status_code: 200,
        headers: cors_headers(),
        body: serde_json::to_string(&response)?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

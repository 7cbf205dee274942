use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use std::collections::HashMap;
use yard_checkin::core::sweep::{ExpirySweep, SweepReport, SweepResponse};
use yard_checkin::utils::{logger, validation::Validate};
use yard_checkin::{LambdaConfig, SupabaseStore};

/// Proxy-integration response understood by API Gateway and function URLs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Response {
    fn json(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body,
        }
    }
}

async fn sweep() -> yard_checkin::Result<SweepReport> {
    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let store = SupabaseStore::from_config(&lambda_config)?;
    ExpirySweep::new(store).run(Utc::now()).await
}

// 排程觸發，不讀取請求內容
async fn function_handler(_event: LambdaEvent<serde_json::Value>) -> Result<Response, Error> {
    tracing::info!("Running cleanup-prebookings");

    let result = sweep().await;
    let response = SweepResponse::from_result(&result);
    Ok(Response::json(response.status_code, response.body_json()?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    AgeRange, CalcError, Calculation, INPUT_FIELDS, InputField, Inputs, SweepPoint, calculate,
};

mod cli;

pub use cli::{CalcArgs, Cli, Command, ServeArgs, run_calc};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Calculation(#[from] CalcError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) | Self::Calculation(_) => StatusCode::BAD_REQUEST,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, &self.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    monthly_contribution: Option<f64>,
    current_pension_benefit: Option<f64>,
    life_after_retirement: Option<u32>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    average_real_return: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    inputs: Inputs,
    pension_increase_per_contribution: f64,
    capital_at_retirement: f64,
    annual_withdrawal: f64,
    beneficial_ages: Option<AgeRange>,
    sweep: Vec<SweepPoint>,
}

#[derive(Debug, Serialize)]
struct FieldsResponse {
    fields: &'static [InputField],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(host: IpAddr, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from((host, port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "pension calculator listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/fields", get(fields_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn fields_handler() -> Response {
    json_response(
        StatusCode::OK,
        FieldsResponse {
            fields: &INPUT_FIELDS,
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    debug!(?payload, "calculation request");
    let result = inputs_from_payload(payload).and_then(|inputs| {
        let calc = calculate(&inputs)?;
        Ok(build_calculate_response(inputs, calc))
    });

    match result {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!(error = %err, "rejected calculation request");
            err.into_response()
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<Inputs, ApiError> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid API JSON payload: {e}")))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: CalculatePayload) -> Result<Inputs, ApiError> {
    let mut args = CalcArgs::default();

    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.current_pension_benefit {
        args.current_pension_benefit = v;
    }
    if let Some(v) = payload.life_after_retirement {
        args.life_after_retirement = v;
    }
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.average_real_return {
        args.average_real_return = v;
    }

    cli::build_inputs(&args)
}

fn build_calculate_response(inputs: Inputs, calc: Calculation) -> CalculateResponse {
    CalculateResponse {
        inputs,
        pension_increase_per_contribution: calc.summary.pension_increase_per_contribution,
        capital_at_retirement: calc.summary.capital_at_retirement,
        annual_withdrawal: calc.summary.annual_withdrawal,
        beneficial_ages: calc.beneficial_ages,
        sweep: calc.sweep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    #[test]
    fn empty_payload_uses_form_defaults() {
        let inputs = inputs_from_json("{}").expect("defaults are valid");
        assert_eq!(inputs, Inputs::default());
    }

    #[test]
    fn payload_overrides_only_supplied_fields() {
        let inputs = inputs_from_json(
            r#"{
                "monthlyContribution": 17000,
                "retirementAge": 70,
                "averageRealReturn": -1.5
            }"#,
        )
        .expect("valid payload");

        assert_approx(inputs.monthly_contribution, 17_000.0);
        assert_eq!(inputs.retirement_age, 70);
        assert_approx(inputs.average_real_return, -1.5);
        assert_eq!(inputs.current_age, 40);
        assert_eq!(inputs.life_after_retirement, 40);
        assert_approx(inputs.current_pension_benefit, 795_000.0);
    }

    #[test]
    fn payload_rejects_fractional_ages() {
        let err = inputs_from_json(r#"{"currentAge": 40.5}"#).expect_err("ages are integers");
        assert!(err.to_string().contains("Invalid API JSON payload"));
    }

    #[test]
    fn payload_rejects_non_finite_amounts() {
        let payload = CalculatePayload {
            monthly_contribution: Some(f64::NAN),
            ..CalculatePayload::default()
        };
        let err = inputs_from_payload(payload).expect_err("NaN must be rejected");
        assert!(err.to_string().contains("--monthly-contribution"));
    }

    #[test]
    fn response_serialization_contains_expected_fields() {
        let inputs = Inputs::default();
        let calc = calculate(&inputs).expect("defaults are valid");
        let json = serde_json::to_string(&build_calculate_response(inputs, calc))
            .expect("response should serialize");

        assert!(json.contains("\"pensionIncreasePerContribution\""));
        assert!(json.contains("\"capitalAtRetirement\""));
        assert!(json.contains("\"annualWithdrawal\""));
        assert!(json.contains("\"beneficialAges\""));
        assert!(json.contains("\"sweep\""));
        assert!(json.contains("\"lifeAfterRetirement\""));
    }

    #[tokio::test]
    async fn calculate_get_returns_summary_and_sweep() {
        let (status, body) = send(get_request("/api/calculate?retirementAge=30")).await;

        assert_eq!(status, StatusCode::OK);
        assert_approx(
            body["pensionIncreasePerContribution"]
                .as_f64()
                .expect("number"),
            1_656.25,
        );
        let sweep = body["sweep"].as_array().expect("sweep array");
        assert_eq!(sweep.len(), 10);
        assert_eq!(sweep[0]["age"], 20);
        assert_eq!(sweep[9]["age"], 29);
        assert_eq!(body["inputs"]["retirementAge"], 30);
    }

    #[tokio::test]
    async fn calculate_post_matches_reference_scenario() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"currentAge": 40, "retirementAge": 65}"#))
            .expect("valid request");
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_approx(
            body["capitalAtRetirement"].as_f64().expect("number"),
            44_039.616_196_172_21,
        );
        assert_approx(
            body["annualWithdrawal"].as_f64().expect("number"),
            2_225.035_078_738_957_5,
        );
        assert_eq!(body["beneficialAges"]["first"], 20);
        assert_eq!(body["beneficialAges"]["last"], 47);
        assert_eq!(body["sweep"].as_array().map(Vec::len), Some(45));
    }

    #[tokio::test]
    async fn calculate_with_inverted_ages_returns_empty_sweep() {
        let (status, body) =
            send(get_request("/api/calculate?currentAge=40&retirementAge=20")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sweep"].as_array().map(Vec::len), Some(0));
        assert!(body["beneficialAges"].is_null());
    }

    #[tokio::test]
    async fn calculate_rejects_zero_payout_horizon() {
        let (status, body) = send(get_request("/api/calculate?lifeAfterRetirement=0")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let msg = body["error"].as_str().expect("error message");
        assert!(msg.contains("payout horizon"));
    }

    #[tokio::test]
    async fn calculate_rejects_out_of_range_retirement_age() {
        let (status, body) = send(get_request(
            "/api/calculate?retirementAge=4294967295&averageRealReturn=0",
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "--retirement-age must be <= 150");
    }

    #[tokio::test]
    async fn calculate_reports_beneficial_ages_for_negative_returns() {
        let (status, body) = send(get_request(
            "/api/calculate?averageRealReturn=-2&currentPensionBenefit=100000",
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["beneficialAges"]["first"], 53);
        assert_eq!(body["beneficialAges"]["last"], 64);
    }

    #[tokio::test]
    async fn calculate_rejects_nan_query_values() {
        let (status, body) = send(get_request("/api/calculate?averageRealReturn=NaN")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error message")
                .contains("--average-real-return")
        );
    }

    #[tokio::test]
    async fn fields_endpoint_lists_form_inputs_in_order() {
        let (status, body) = send(get_request("/api/fields")).await;

        assert_eq!(status, StatusCode::OK);
        let fields = body["fields"].as_array().expect("fields array");
        let keys: Vec<_> = fields.iter().filter_map(|f| f["key"].as_str()).collect();
        assert_eq!(
            keys,
            [
                "monthlyContribution",
                "currentPensionBenefit",
                "lifeAfterRetirement",
                "currentAge",
                "retirementAge",
                "averageRealReturn",
            ]
        );
        assert_approx(fields[5]["step"].as_f64().expect("number"), 0.1);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let (status, body) = send(get_request("/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}

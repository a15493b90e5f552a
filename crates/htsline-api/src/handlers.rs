//! HTTP handlers and request/response types for htsline-api.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use htsline_catalog::{Catalog, SemanticMatcher};
use htsline_core::{defaults, DutyRates, MatchCandidate, RateSourceResult};
use htsline_duty::{compute_duty, form_fields, money, EntryMeta, FeeSchedule};
use htsline_rates::RateAggregator;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub matcher: Arc<SemanticMatcher>,
    pub aggregator: Arc<RateAggregator>,
    pub schedule: FeeSchedule,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/search-hs-code", post(search_hs_code))
        .route("/api/calculate-all-tariffs", post(calculate_all_tariffs))
        .route("/api/calculate-duty", post(calculate_duty))
        .route("/api/entry-form", post(entry_form))
        .with_state(state)
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP-facing error wrapper around the core error type.
pub enum ApiError {
    Internal(htsline_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<htsline_core::Error> for ApiError {
    fn from(err: htsline_core::Error) -> Self {
        match err {
            htsline_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            htsline_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

// =============================================================================
// FLEXIBLE NUMBERS
// =============================================================================

/// Monetary/rate input that callers send as either a JSON number or a
/// numeric string (spreadsheet exports produce strings).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Result<f64, String> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("not a number: {:?}", s)),
        }
    }
}

fn zero() -> NumberOrString {
    NumberOrString::Number(0.0)
}

// =============================================================================
// CLASSIFICATION SEARCH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchHsCodeRequest {
    pub description: Option<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    defaults::SEARCH_TOP_N
}

#[derive(Debug, Serialize)]
pub struct SearchHsCodeResponse {
    pub results: Vec<MatchCandidate>,
}

async fn search_hs_code(
    State(state): State<AppState>,
    Json(req): Json<SearchHsCodeRequest>,
) -> Result<Json<SearchHsCodeResponse>, ApiError> {
    let description = req
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing product description".to_string()))?;

    let results = state.matcher.search(&description, req.top_n).await?;
    Ok(Json(SearchHsCodeResponse { results }))
}

// =============================================================================
// RATE AGGREGATION
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CalculateTariffsRequest {
    pub hs_code: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_country")]
    pub country_of_origin: String,
}

fn default_country() -> String {
    defaults::SUPPORTED_COUNTRY.to_string()
}

#[derive(Debug, Serialize)]
pub struct CalculateTariffsResponse {
    pub hs_code: String,
    pub description: String,
    pub country_of_origin: String,
    pub general_rate: f64,
    pub section_301_rate: f64,
    pub ieepa_rate: f64,
    pub reciprocal_rate: f64,
    pub total_rate: f64,
    pub tariff_sources: Vec<RateSourceResult>,
    pub status: String,
}

async fn calculate_all_tariffs(
    State(state): State<AppState>,
    Json(req): Json<CalculateTariffsRequest>,
) -> Result<Json<CalculateTariffsResponse>, ApiError> {
    let hs_code = req
        .hs_code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing HS code".to_string()))?;

    let set = state
        .aggregator
        .aggregate(&hs_code, &req.description, &req.country_of_origin)
        .await;

    Ok(Json(CalculateTariffsResponse {
        total_rate: set.total_rate(),
        hs_code: set.hs_code,
        description: set.description,
        country_of_origin: set.country_of_origin,
        general_rate: set.general_rate,
        section_301_rate: set.section_301_rate,
        ieepa_rate: set.ieepa_rate,
        reciprocal_rate: set.reciprocal_rate,
        tariff_sources: set.sources,
        status: set.status,
    }))
}

// =============================================================================
// DUTY CALCULATION
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CalculateDutyRequest {
    pub value: NumberOrString,
    #[serde(default = "zero")]
    pub basic_duty_rate: NumberOrString,
    #[serde(default = "zero")]
    pub section_301_rate: NumberOrString,
    #[serde(default = "zero")]
    pub other_rate: NumberOrString,
}

/// All monetary fields as 2-decimal strings.
#[derive(Debug, Serialize)]
pub struct CalculateDutyResponse {
    pub basic_duty: String,
    pub section_301_duty: String,
    pub other_duty: String,
    pub total_duty: String,
    pub mpf: String,
    pub hmf: String,
    pub total_other_fees: String,
    pub total_payable: String,
}

async fn calculate_duty(
    State(state): State<AppState>,
    Json(req): Json<CalculateDutyRequest>,
) -> Result<Json<CalculateDutyResponse>, ApiError> {
    let value = req.value.as_f64().map_err(ApiError::BadRequest)?;
    let rates = DutyRates::new(
        req.basic_duty_rate.as_f64().map_err(ApiError::BadRequest)?,
        req.section_301_rate.as_f64().map_err(ApiError::BadRequest)?,
        req.other_rate.as_f64().map_err(ApiError::BadRequest)?,
    );

    let item = compute_duty(value, &rates, &state.schedule)?;

    Ok(Json(CalculateDutyResponse {
        basic_duty: money(item.basic_duty),
        section_301_duty: money(item.section_301_duty),
        other_duty: money(item.other_duty),
        total_duty: money(item.total_duty()),
        mpf: money(item.mpf),
        hmf: money(item.hmf),
        total_other_fees: money(item.total_other_fees()),
        total_payable: money(item.total_payable()),
    }))
}

// =============================================================================
// ENTRY FORM
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EntryFormRequest {
    pub items: Vec<EntryFormItem>,
}

#[derive(Debug, Deserialize)]
pub struct EntryFormItem {
    #[serde(default)]
    pub id: Option<String>,
    pub hts_number: String,
    #[serde(default)]
    pub description: String,
    pub value: NumberOrString,
    #[serde(default = "zero")]
    pub basic_duty_rate: NumberOrString,
    #[serde(default = "zero")]
    pub section_301_rate: NumberOrString,
    #[serde(default = "zero")]
    pub other_rate: NumberOrString,
    #[serde(default)]
    pub gross_weight: Option<String>,
    #[serde(default)]
    pub manifest_qty: Option<String>,
    #[serde(default)]
    pub net_quantity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryFormResponse {
    pub status: String,
    pub forms: Vec<EntryFormResult>,
}

/// One item's form outcome. A bad value on one item degrades that item to a
/// status message without failing the batch.
#[derive(Debug, Serialize)]
pub struct EntryFormResult {
    pub id: String,
    pub hts_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

async fn entry_form(
    State(state): State<AppState>,
    Json(req): Json<EntryFormRequest>,
) -> Result<Json<EntryFormResponse>, ApiError> {
    if req.items.is_empty() {
        return Err(ApiError::BadRequest("Missing or invalid items data".to_string()));
    }

    let mut forms = Vec::with_capacity(req.items.len());
    for (index, item) in req.items.iter().enumerate() {
        let id = item
            .id
            .clone()
            .unwrap_or_else(|| (index + 1).to_string());
        forms.push(build_form(&state, item, id));
    }

    let generated = forms.iter().filter(|f| f.fields.is_some()).count();
    Ok(Json(EntryFormResponse {
        status: format!("Generated {} of {} entry forms", generated, forms.len()),
        forms,
    }))
}

fn build_form(state: &AppState, item: &EntryFormItem, id: String) -> EntryFormResult {
    let numbers = (|| -> Result<(f64, DutyRates), String> {
        let value = item.value.as_f64()?;
        let rates = DutyRates::new(
            item.basic_duty_rate.as_f64()?,
            item.section_301_rate.as_f64()?,
            item.other_rate.as_f64()?,
        );
        Ok((value, rates))
    })();

    let (value, rates) = match numbers {
        Ok(parsed) => parsed,
        Err(msg) => {
            return EntryFormResult {
                id,
                hts_number: item.hts_number.clone(),
                status: format!("Invalid value: {}", msg),
                fields: None,
            }
        }
    };

    let line_item = match compute_duty(value, &rates, &state.schedule) {
        Ok(line_item) => line_item,
        Err(e) => {
            return EntryFormResult {
                id,
                hts_number: item.hts_number.clone(),
                status: e.to_string(),
                fields: None,
            }
        }
    };

    let mut meta = EntryMeta {
        id: id.clone(),
        ..EntryMeta::default()
    };
    if let Some(ref gross_weight) = item.gross_weight {
        meta.gross_weight = gross_weight.clone();
    }
    if let Some(ref manifest_qty) = item.manifest_qty {
        meta.manifest_qty = manifest_qty.clone();
    }
    if let Some(ref net_quantity) = item.net_quantity {
        meta.net_quantity = net_quantity.clone();
    }

    let mut fields = form_fields(
        &line_item,
        &rates,
        &meta,
        &item.hts_number,
        &item.description,
    );
    htsline_duty::form::resolve_dates(&mut fields);

    EntryFormResult {
        id,
        hts_number: item.hts_number.clone(),
        status: "success".to_string(),
        fields: Some(fields),
    }
}

// =============================================================================
// HEALTH
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub catalog_loaded: bool,
    pub catalog_size: usize,
    pub embedding_model: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        catalog_loaded: !state.catalog.is_empty(),
        catalog_size: state.catalog.len(),
        embedding_model: state.matcher.model_name().to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use htsline_core::{HtsRecord, RateQuote, RateSource, Result as CoreResult};
    use htsline_inference::mock::{MockEmbeddingBackend, MockGenerationBackend};
    use htsline_rates::SurchargeSource;
    use tower::ServiceExt;

    /// Remedy stub so handler tests never touch the network.
    struct StubRemedy {
        rate: f64,
    }

    #[async_trait]
    impl RateSource for StubRemedy {
        fn name(&self) -> &str {
            "section_301"
        }

        fn display_name(&self) -> &str {
            "Section 301 tariff"
        }

        async fn lookup(&self, _hs_code: &str, _description: &str) -> CoreResult<RateQuote> {
            Ok(RateQuote {
                rate: self.rate,
                note: None,
            })
        }
    }

    fn test_state() -> AppState {
        let catalog = Arc::new(
            Catalog::from_records(vec![
                HtsRecord {
                    htsno: "9401.61.0000".to_string(),
                    description: "Upholstered seats with wooden frames".to_string(),
                    general: "Free".to_string(),
                    embedding: vec![1.0, 0.0],
                },
                HtsRecord {
                    htsno: "3304.10.0000".to_string(),
                    description: "Lip make-up preparations".to_string(),
                    general: "2.5%".to_string(),
                    embedding: vec![0.0, 1.0],
                },
            ])
            .unwrap(),
        );

        let embedder = Arc::new(
            MockEmbeddingBackend::new(2)
                .with_vector_for("lipstick in a twist-up tube", vec![0.0, 1.0]),
        );
        let generator = Arc::new(MockGenerationBackend::new(
            "```json\n{\"applicable\": \"Y\", \"rate\": \"20%\", \"explanation\": \"blanket action\"}\n```",
        ));

        let matcher = Arc::new(SemanticMatcher::new(catalog.clone(), embedder));
        let aggregator = Arc::new(RateAggregator::new(
            catalog.clone(),
            Arc::new(StubRemedy { rate: 7.5 }),
            Arc::new(SurchargeSource::emergency_powers(generator.clone())),
            Arc::new(SurchargeSource::reciprocal(generator)),
        ));

        AppState {
            catalog,
            matcher,
            aggregator,
            schedule: FeeSchedule::default(),
        }
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_catalog() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["catalog_loaded"], true);
        assert_eq!(json["catalog_size"], 2);
    }

    #[tokio::test]
    async fn search_returns_ranked_results() {
        let (status, json) = post_json(
            "/api/search-hs-code",
            serde_json::json!({"description": "lipstick in a twist-up tube", "top_n": 2}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["hs_code"], "3304.10.0000");
        assert_eq!(results[0]["general_rate"], 2.5);
        assert!(
            results[0]["similarity_score"].as_f64().unwrap()
                >= results[1]["similarity_score"].as_f64().unwrap()
        );
    }

    #[tokio::test]
    async fn search_without_description_is_bad_request() {
        let (status, json) = post_json("/api/search-hs-code", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing product description");
    }

    #[tokio::test]
    async fn tariffs_sum_all_sources() {
        let (status, json) = post_json(
            "/api/calculate-all-tariffs",
            serde_json::json!({
                "hs_code": "3304.10.0000",
                "description": "Lipstick",
                "country_of_origin": "CN"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["general_rate"], 2.5);
        assert_eq!(json["section_301_rate"], 7.5);
        assert_eq!(json["ieepa_rate"], 20.0);
        assert_eq!(json["reciprocal_rate"], 20.0);
        assert_eq!(json["total_rate"], 50.0);
        assert_eq!(json["status"], "success");
        assert_eq!(json["tariff_sources"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn tariffs_unsupported_country_is_zero_with_status() {
        let (status, json) = post_json(
            "/api/calculate-all-tariffs",
            serde_json::json!({"hs_code": "3304.10.0000", "country_of_origin": "DE"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_rate"], 0.0);
        assert!(json["status"].as_str().unwrap().contains("CN"));
    }

    #[tokio::test]
    async fn tariffs_without_code_is_bad_request() {
        let (status, _) =
            post_json("/api/calculate-all-tariffs", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duty_computes_reference_vector() {
        let (status, json) = post_json(
            "/api/calculate-duty",
            serde_json::json!({
                "value": 1000000,
                "basic_duty_rate": 2.5,
                "section_301_rate": 7.5,
                "other_rate": 0
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["basic_duty"], "25000.00");
        assert_eq!(json["section_301_duty"], "75000.00");
        assert_eq!(json["total_duty"], "100000.00");
        assert_eq!(json["mpf"], "575.16");
        assert_eq!(json["hmf"], "1250.00");
        assert_eq!(json["total_payable"], "101825.16");
    }

    #[tokio::test]
    async fn duty_accepts_string_numbers() {
        let (status, json) = post_json(
            "/api/calculate-duty",
            serde_json::json!({"value": "5100", "basic_duty_rate": "2.5"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["basic_duty"], "127.50");
        assert_eq!(json["mpf"], "29.66");
    }

    #[tokio::test]
    async fn duty_rejects_negative_value() {
        let (status, json) = post_json(
            "/api/calculate-duty",
            serde_json::json!({"value": -5.0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("non-negative"));
    }

    #[tokio::test]
    async fn duty_rejects_unparseable_value() {
        let (status, _) = post_json(
            "/api/calculate-duty",
            serde_json::json!({"value": "lots"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn entry_form_builds_field_map() {
        let (status, json) = post_json(
            "/api/entry-form",
            serde_json::json!({
                "items": [{
                    "id": "item-1",
                    "hts_number": "9401.61.0000",
                    "description": "Three-seater sofa with removable cushions",
                    "value": "5100",
                    "basic_duty_rate": "2.5",
                    "section_301_rate": "7.5",
                    "other_rate": "0",
                    "gross_weight": "75.50",
                    "manifest_qty": "1",
                    "net_quantity": "1"
                }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let forms = json["forms"].as_array().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["status"], "success");
        let fields = &forms[0]["fields"];
        assert_eq!(fields["duty37[0]"], "510.00");
        assert_eq!(fields["amount1[2]"], "29.66");
        assert!(fields["descriptiona1[1]"]
            .as_str()
            .unwrap()
            .contains("9401.61.0000"));
        // Dates resolved, no placeholder left.
        assert_ne!(fields["entryDate[0]"], "TODAY");
    }

    #[tokio::test]
    async fn entry_form_bad_item_degrades_not_fails() {
        let (status, json) = post_json(
            "/api/entry-form",
            serde_json::json!({
                "items": [
                    {"hts_number": "9401.61.0000", "value": "not-a-number"},
                    {"hts_number": "3304.10.0000", "value": 100}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let forms = json["forms"].as_array().unwrap();
        assert_eq!(forms.len(), 2);
        assert!(forms[0]["status"]
            .as_str()
            .unwrap()
            .contains("Invalid value"));
        assert!(forms[0]["fields"].is_null());
        assert_eq!(forms[1]["status"], "success");
    }

    #[tokio::test]
    async fn entry_form_empty_items_is_bad_request() {
        let (status, _) = post_json("/api/entry-form", serde_json::json!({"items": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn aggregation_survives_generation_failure() {
        // Swap in a failing generation backend; the endpoint still answers
        // with the remedy and base contributions.
        let catalog = test_state().catalog;
        let embedder = Arc::new(MockEmbeddingBackend::new(2));
        let generator =
            Arc::new(MockGenerationBackend::new("unused").with_failure("model offline"));

        let state = AppState {
            catalog: catalog.clone(),
            matcher: Arc::new(SemanticMatcher::new(catalog.clone(), embedder)),
            aggregator: Arc::new(RateAggregator::new(
                catalog,
                Arc::new(StubRemedy { rate: 7.5 }),
                Arc::new(SurchargeSource::emergency_powers(generator.clone())),
                Arc::new(SurchargeSource::reciprocal(generator)),
            )),
            schedule: FeeSchedule::default(),
        };

        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/calculate-all-tariffs")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"hs_code": "3304.10.0000"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["total_rate"], 10.0); // 2.5 base + 7.5 remedy
        assert_eq!(json["ieepa_rate"], 0.0);
        assert_eq!(json["status"], "success");

        let failed: Vec<_> = json["tariff_sources"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|s| s["succeeded"] == false)
            .collect();
        assert_eq!(failed.len(), 2);
    }
}

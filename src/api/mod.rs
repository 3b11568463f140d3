use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    FilingStatus, ScenarioSnapshot, TaxTrapResult, calculate_tax, distance_to_next_bracket,
    effective_rate, evaluate_traps, size_conversion,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
    QualifyingWidow,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJoint => FilingStatus::MarriedJoint,
            CliFilingStatus::MarriedSeparate => FilingStatus::MarriedSeparate,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
            CliFilingStatus::QualifyingWidow => FilingStatus::QualifyingWidow,
        }
    }
}

/// Legacy spellings from older payloads are folded into the canonical set
/// here, at the boundary; `married` means a joint return.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(
        alias = "married",
        alias = "joint",
        alias = "married_joint",
        alias = "marriedJoint"
    )]
    MarriedJoint,
    #[serde(alias = "married_separate", alias = "marriedSeparate")]
    MarriedSeparate,
    #[serde(alias = "head_of_household", alias = "headOfHousehold")]
    HeadOfHousehold,
    #[serde(alias = "qualifying_widow", alias = "qualifyingWidow")]
    QualifyingWidow,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::MarriedJoint => CliFilingStatus::MarriedJoint,
            ApiFilingStatus::MarriedSeparate => CliFilingStatus::MarriedSeparate,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
            ApiFilingStatus::QualifyingWidow => CliFilingStatus::QualifyingWidow,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bracketeer",
    about = "Tax bracket, tax trap, and Roth conversion sizing API"
)]
struct Cli {
    #[arg(long, default_value_t = 2023, help = "Tax year for bracket tables")]
    tax_year: u32,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 0.0, help = "Adjusted gross income")]
    agi: f64,
    #[arg(long, help = "Modified AGI; defaults to --agi")]
    magi: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    total_income: f64,
    #[arg(long, default_value_t = 0.0)]
    taxable_income: f64,
    #[arg(long, default_value_t = 0.0)]
    long_term_capital_gains: f64,
    #[arg(long, default_value_t = 0.0)]
    short_term_capital_gains: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual Social Security benefits")]
    social_security_amount: f64,
    #[arg(long, default_value_t = 1, help = "Household size for FPL lookups")]
    household_size: u32,
    #[arg(long, default_value_t = false)]
    medicare_enrolled: bool,
    #[arg(long, default_value_t = false)]
    aca_enrolled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    scenario_id: Option<String>,
    tax_year: Option<u32>,
    filing_status: Option<ApiFilingStatus>,
    agi: Option<f64>,
    magi: Option<f64>,
    total_income: Option<f64>,
    taxable_income: Option<f64>,
    long_term_capital_gains: Option<f64>,
    short_term_capital_gains: Option<f64>,
    social_security_amount: Option<f64>,
    household_size: Option<u32>,
    medicare_enrolled: Option<bool>,
    aca_enrolled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    income: Option<f64>,
    tax_year: Option<u32>,
    filing_status: Option<ApiFilingStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConversionPayload {
    current_income: Option<f64>,
    tax_year: Option<u32>,
    filing_status: Option<ApiFilingStatus>,
    fill_percent: Option<f64>,
    available_balance: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    tax_year: u32,
    filing_status: &'static str,
    income: f64,
    tax: f64,
    effective_rate: f64,
    next_threshold: Option<f64>,
    distance_to_next_bracket: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionResponse {
    tax_year: u32,
    filing_status: &'static str,
    current_income: f64,
    fill_percent: f64,
    available_balance: f64,
    next_threshold: Option<f64>,
    recommended_conversion: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_scenario(cli: Cli) -> Result<ScenarioSnapshot, String> {
    if cli.household_size == 0 {
        return Err("--household-size must be >= 1".to_string());
    }

    for (name, value) in [
        ("--agi", cli.agi),
        ("--total-income", cli.total_income),
        ("--taxable-income", cli.taxable_income),
        ("--long-term-capital-gains", cli.long_term_capital_gains),
        ("--short-term-capital-gains", cli.short_term_capital_gains),
        ("--social-security-amount", cli.social_security_amount),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be a finite amount >= 0"));
        }
    }

    if let Some(magi) = cli.magi {
        if !magi.is_finite() || magi < 0.0 {
            return Err("--magi must be a finite amount >= 0".to_string());
        }
    }

    Ok(ScenarioSnapshot {
        tax_year: cli.tax_year,
        filing_status: cli.filing_status.into(),
        agi: cli.agi,
        magi: cli.magi.unwrap_or(cli.agi),
        total_income: cli.total_income,
        taxable_income: cli.taxable_income,
        long_term_capital_gains: cli.long_term_capital_gains,
        short_term_capital_gains: cli.short_term_capital_gains,
        social_security_amount: cli.social_security_amount,
        household_size: cli.household_size,
        medicare_enrolled: cli.medicare_enrolled,
        aca_enrolled: cli.aca_enrolled,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        tax_year: 2023,
        filing_status: CliFilingStatus::Single,
        agi: 0.0,
        magi: None,
        total_income: 0.0,
        taxable_income: 0.0,
        long_term_capital_gains: 0.0,
        short_term_capital_gains: 0.0,
        social_security_amount: 0.0,
        household_size: 1,
        medicare_enrolled: false,
        aca_enrolled: false,
    }
}

fn scenario_from_payload(payload: ScenarioPayload) -> Result<(String, ScenarioSnapshot), String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.tax_year {
        cli.tax_year = v;
    }
    if let Some(v) = payload.filing_status {
        cli.filing_status = v.into();
    }
    if let Some(v) = payload.agi {
        cli.agi = v;
    }
    if let Some(v) = payload.magi {
        cli.magi = Some(v);
    }
    if let Some(v) = payload.total_income {
        cli.total_income = v;
    }
    if let Some(v) = payload.taxable_income {
        cli.taxable_income = v;
    }
    if let Some(v) = payload.long_term_capital_gains {
        cli.long_term_capital_gains = v;
    }
    if let Some(v) = payload.short_term_capital_gains {
        cli.short_term_capital_gains = v;
    }
    if let Some(v) = payload.social_security_amount {
        cli.social_security_amount = v;
    }
    if let Some(v) = payload.household_size {
        cli.household_size = v;
    }
    if let Some(v) = payload.medicare_enrolled {
        cli.medicare_enrolled = v;
    }
    if let Some(v) = payload.aca_enrolled {
        cli.aca_enrolled = v;
    }

    let scenario_id = payload
        .scenario_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| "ad-hoc".to_string());
    let scenario = build_scenario(cli)?;
    Ok((scenario_id, scenario))
}

fn traps_result_from_payload(payload: ScenarioPayload) -> Result<TaxTrapResult, String> {
    let (scenario_id, scenario) = scenario_from_payload(payload)?;
    Ok(evaluate_traps(&scenario_id, &scenario))
}

fn tax_response_from_payload(payload: TaxPayload) -> Result<TaxResponse, String> {
    let income = payload.income.unwrap_or(0.0);
    if !income.is_finite() {
        return Err("income must be a finite amount".to_string());
    }
    let tax_year = payload.tax_year.unwrap_or(2023);
    let status: FilingStatus =
        CliFilingStatus::from(payload.filing_status.unwrap_or(ApiFilingStatus::Single)).into();

    let tax = calculate_tax(income, tax_year, status);
    let next = distance_to_next_bracket(income, tax_year, status);
    Ok(TaxResponse {
        tax_year,
        filing_status: status.as_str(),
        income,
        tax,
        effective_rate: effective_rate(tax, income),
        next_threshold: next.next_threshold.is_finite().then_some(next.next_threshold),
        distance_to_next_bracket: next.distance.is_finite().then_some(next.distance),
    })
}

fn conversion_response_from_payload(payload: ConversionPayload) -> Result<ConversionResponse, String> {
    let current_income = payload.current_income.unwrap_or(0.0);
    let fill_percent = payload.fill_percent.unwrap_or(100.0);
    let available_balance = payload.available_balance.unwrap_or(0.0);

    if !current_income.is_finite() {
        return Err("currentIncome must be a finite amount".to_string());
    }
    if !(0.0..=100.0).contains(&fill_percent) {
        return Err("fillPercent must be between 0 and 100".to_string());
    }
    if !available_balance.is_finite() || available_balance < 0.0 {
        return Err("availableBalance must be a finite amount >= 0".to_string());
    }

    let tax_year = payload.tax_year.unwrap_or(2023);
    let status: FilingStatus =
        CliFilingStatus::from(payload.filing_status.unwrap_or(ApiFilingStatus::Single)).into();

    let next = distance_to_next_bracket(current_income, tax_year, status);
    let recommended = size_conversion(
        current_income,
        tax_year,
        status,
        fill_percent,
        available_balance,
    );
    Ok(ConversionResponse {
        tax_year,
        filing_status: status.as_str(),
        current_income,
        fill_percent,
        available_balance,
        next_threshold: next.next_threshold.is_finite().then_some(next.next_threshold),
        recommended_conversion: recommended,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/traps", get(traps_get_handler).post(traps_post_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route(
            "/api/conversion",
            get(conversion_get_handler).post(conversion_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Bracketeer HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/traps");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn traps_get_handler(Query(payload): Query<ScenarioPayload>) -> Response {
    respond(traps_result_from_payload(payload))
}

async fn traps_post_handler(Json(payload): Json<ScenarioPayload>) -> Response {
    respond(traps_result_from_payload(payload))
}

async fn tax_get_handler(Query(payload): Query<TaxPayload>) -> Response {
    respond(tax_response_from_payload(payload))
}

async fn tax_post_handler(Json(payload): Json<TaxPayload>) -> Response {
    respond(tax_response_from_payload(payload))
}

async fn conversion_get_handler(Query(payload): Query<ConversionPayload>) -> Response {
    respond(conversion_response_from_payload(payload))
}

async fn conversion_post_handler(Json(payload): Json<ConversionPayload>) -> Response {
    respond(conversion_response_from_payload(payload))
}

fn respond<T: Serialize>(result: Result<T, String>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

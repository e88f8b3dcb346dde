use axum::{
    Router,
    extract::{Json, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    BreakevenPoint, CashFlow, FilingStatus, FundAllocation, MonteCarloConfig, MonteCarloResult,
    RateDistribution, RateInput, ScenarioParameters, ScenarioSummary, SimulationResult,
    SurvivorBenefit, WithdrawalStrategy, add_months, breakeven, cash_flow, combine_household,
    cumulative_delta, expense_schedule, run_monte_carlo, scenario_summary, simulate,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSurvivorBenefit {
    None,
    Partial,
    Full,
}

impl From<CliSurvivorBenefit> for SurvivorBenefit {
    fn from(value: CliSurvivorBenefit) -> Self {
        match value {
            CliSurvivorBenefit::None => SurvivorBenefit::None,
            CliSurvivorBenefit::Partial => SurvivorBenefit::Partial,
            CliSurvivorBenefit::Full => SurvivorBenefit::Full,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliWithdrawalStrategy {
    FixedPercentage,
    RequiredMinimum,
    GreaterOfBoth,
}

impl From<CliWithdrawalStrategy> for WithdrawalStrategy {
    fn from(value: CliWithdrawalStrategy) -> Self {
        match value {
            CliWithdrawalStrategy::FixedPercentage => WithdrawalStrategy::FixedPercentage,
            CliWithdrawalStrategy::RequiredMinimum => WithdrawalStrategy::RequiredMinimum,
            CliWithdrawalStrategy::GreaterOfBoth => WithdrawalStrategy::GreaterOfBoth,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    Married,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::Married => FilingStatus::Married,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSurvivorBenefit {
    None,
    Partial,
    Full,
}

impl From<ApiSurvivorBenefit> for CliSurvivorBenefit {
    fn from(value: ApiSurvivorBenefit) -> Self {
        match value {
            ApiSurvivorBenefit::None => CliSurvivorBenefit::None,
            ApiSurvivorBenefit::Partial => CliSurvivorBenefit::Partial,
            ApiSurvivorBenefit::Full => CliSurvivorBenefit::Full,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiWithdrawalStrategy {
    #[serde(alias = "fixedPercentage", alias = "fixed_percentage")]
    FixedPercentage,
    #[serde(alias = "requiredMinimum", alias = "required_minimum", alias = "irs-rmd")]
    RequiredMinimum,
    #[serde(alias = "greaterOfBoth", alias = "greater_of_both")]
    GreaterOfBoth,
}

impl From<ApiWithdrawalStrategy> for CliWithdrawalStrategy {
    fn from(value: ApiWithdrawalStrategy) -> Self {
        match value {
            ApiWithdrawalStrategy::FixedPercentage => CliWithdrawalStrategy::FixedPercentage,
            ApiWithdrawalStrategy::RequiredMinimum => CliWithdrawalStrategy::RequiredMinimum,
            ApiWithdrawalStrategy::GreaterOfBoth => CliWithdrawalStrategy::GreaterOfBoth,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    Married,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::Married => CliFilingStatus::Married,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDistributionKind {
    Normal,
    #[serde(alias = "logNormal", alias = "log_normal")]
    Lognormal,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fers", about = "Federal retirement income simulator")]
pub struct Cli {
    #[arg(long, default_value = "1965-02-25")]
    birth_date: NaiveDate,
    #[arg(long, default_value = "1987-06-22")]
    service_start: NaiveDate,
    #[arg(long, default_value = "2025-08-01")]
    retirement_date: NaiveDate,
    #[arg(long, default_value_t = 179_000.0, help = "High-3 average salary in dollars")]
    high3_salary: f64,
    #[arg(long, default_value_t = 1_800_000.0, help = "Starting savings-plan balance")]
    starting_balance: f64,
    #[arg(long, default_value_t = 0.0)]
    sick_leave_hours: f64,
    #[arg(long, default_value_t = 67, help = "Social Security claim age, 62-70")]
    claim_age: u32,
    #[arg(long, value_enum, default_value_t = CliSurvivorBenefit::None)]
    survivor_benefit: CliSurvivorBenefit,
    #[arg(long, default_value_t = 0.02, help = "Annual COLA as a fraction")]
    cola: f64,
    #[arg(long, default_value_t = 0.05, help = "Annual savings growth as a fraction")]
    growth: f64,
    #[arg(long, default_value_t = 0.04, help = "Annual withdrawal rate as a fraction")]
    withdrawal_rate: f64,
    #[arg(long, value_enum, default_value_t = CliWithdrawalStrategy::GreaterOfBoth)]
    withdrawal_strategy: CliWithdrawalStrategy,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    tax_exempt_resident: bool,
    #[arg(long, default_value_t = 200.0, help = "Monthly health premium in dollars")]
    health_premium: f64,
    #[arg(long, default_value_t = 0.05)]
    premium_growth_rate: f64,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 25, help = "Years simulated past retirement")]
    horizon_years: u32,
    #[arg(long, default_value_t = 0.0)]
    biweekly_contribution: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    employer_match: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    include_medicare: bool,
    #[arg(long)]
    current_salary: Option<f64>,
    #[arg(long)]
    g_fund_pct: Option<f64>,
    #[arg(long)]
    f_fund_pct: Option<f64>,
    #[arg(long)]
    c_fund_pct: Option<f64>,
    #[arg(long)]
    s_fund_pct: Option<f64>,
    #[arg(long)]
    i_fund_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulatePayload {
    birth_date: Option<NaiveDate>,
    service_start: Option<NaiveDate>,
    retirement_date: Option<NaiveDate>,
    high3_salary: Option<f64>,
    starting_balance: Option<f64>,
    sick_leave_hours: Option<f64>,
    claim_age: Option<u32>,
    survivor_benefit: Option<ApiSurvivorBenefit>,
    cola: Option<f64>,
    cola_path: Option<Vec<f64>>,
    growth: Option<f64>,
    growth_path: Option<Vec<f64>>,
    withdrawal_rate: Option<f64>,
    withdrawal_strategy: Option<ApiWithdrawalStrategy>,
    tax_exempt_resident: Option<bool>,
    health_premium: Option<f64>,
    premium_growth_rate: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    horizon_years: Option<u32>,
    biweekly_contribution: Option<f64>,
    employer_match: Option<bool>,
    include_medicare: Option<bool>,
    fund_allocation: Option<ApiFundAllocation>,
    current_salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFundAllocation {
    #[serde(default)]
    g_fund_pct: f64,
    #[serde(default)]
    f_fund_pct: f64,
    #[serde(default)]
    c_fund_pct: f64,
    #[serde(default)]
    s_fund_pct: f64,
    #[serde(default)]
    i_fund_pct: f64,
}

impl From<ApiFundAllocation> for FundAllocation {
    fn from(value: ApiFundAllocation) -> Self {
        FundAllocation {
            g_fund_pct: value.g_fund_pct,
            f_fund_pct: value.f_fund_pct,
            c_fund_pct: value.c_fund_pct,
            s_fund_pct: value.s_fund_pct,
            i_fund_pct: value.i_fund_pct,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonteCarloPayload {
    #[serde(flatten)]
    scenario: SimulatePayload,
    cola_mean: Option<f64>,
    cola_std: Option<f64>,
    cola_distribution: Option<ApiDistributionKind>,
    growth_mean: Option<f64>,
    growth_std: Option<f64>,
    growth_distribution: Option<ApiDistributionKind>,
    num_paths: Option<usize>,
    seed: Option<u64>,
    depletion_threshold: Option<f64>,
    track_balances: Option<bool>,
    keep_paths: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComparePayload {
    a: SimulatePayload,
    b: SimulatePayload,
    pre_retirement_expenses: Option<f64>,
    post_retirement_expenses: Option<f64>,
    expense_inflation: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonteCarloResponse {
    #[serde(flatten)]
    result: MonteCarloResult,
    summary: Option<ScenarioSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    a: SimulationResult,
    b: SimulationResult,
    combined: SimulationResult,
    breakeven: Option<BreakevenPoint>,
    cumulative_delta: Vec<f64>,
    household_cash_flow: Option<CashFlow>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli() -> Cli {
    Cli {
        birth_date: ymd(1965, 2, 25),
        service_start: ymd(1987, 6, 22),
        retirement_date: ymd(2025, 8, 1),
        high3_salary: 179_000.0,
        starting_balance: 1_800_000.0,
        sick_leave_hours: 0.0,
        claim_age: 67,
        survivor_benefit: CliSurvivorBenefit::None,
        cola: 0.02,
        growth: 0.05,
        withdrawal_rate: 0.04,
        withdrawal_strategy: CliWithdrawalStrategy::GreaterOfBoth,
        tax_exempt_resident: true,
        health_premium: 200.0,
        premium_growth_rate: 0.05,
        filing_status: CliFilingStatus::Single,
        horizon_years: 25,
        biweekly_contribution: 0.0,
        employer_match: true,
        include_medicare: true,
        current_salary: None,
        g_fund_pct: None,
        f_fund_pct: None,
        c_fund_pct: None,
        s_fund_pct: None,
        i_fund_pct: None,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn build_params(cli: &Cli) -> ScenarioParameters {
    let fund_allocation = if cli.g_fund_pct.is_some()
        || cli.f_fund_pct.is_some()
        || cli.c_fund_pct.is_some()
        || cli.s_fund_pct.is_some()
        || cli.i_fund_pct.is_some()
    {
        Some(FundAllocation {
            g_fund_pct: cli.g_fund_pct.unwrap_or(0.0),
            f_fund_pct: cli.f_fund_pct.unwrap_or(0.0),
            c_fund_pct: cli.c_fund_pct.unwrap_or(0.0),
            s_fund_pct: cli.s_fund_pct.unwrap_or(0.0),
            i_fund_pct: cli.i_fund_pct.unwrap_or(0.0),
        })
    } else {
        None
    };

    ScenarioParameters {
        birth_date: cli.birth_date,
        service_start: cli.service_start,
        retirement_date: cli.retirement_date,
        high3_salary: cli.high3_salary,
        starting_balance: cli.starting_balance,
        sick_leave_hours: cli.sick_leave_hours,
        claim_age: cli.claim_age,
        survivor_benefit: cli.survivor_benefit.into(),
        cola: RateInput::Scalar(cli.cola),
        growth: RateInput::Scalar(cli.growth),
        withdrawal_rate: cli.withdrawal_rate,
        withdrawal_strategy: cli.withdrawal_strategy.into(),
        tax_exempt_resident: cli.tax_exempt_resident,
        health_premium: cli.health_premium,
        premium_growth_rate: cli.premium_growth_rate,
        filing_status: cli.filing_status.into(),
        horizon_years: cli.horizon_years,
        biweekly_contribution: cli.biweekly_contribution,
        employer_match: cli.employer_match,
        include_medicare: cli.include_medicare,
        fund_allocation,
        current_salary: cli.current_salary,
    }
}

fn scenario_from_payload(payload: &SimulatePayload) -> ScenarioParameters {
    let mut cli = default_cli();

    if let Some(v) = payload.birth_date {
        cli.birth_date = v;
    }
    if let Some(v) = payload.service_start {
        cli.service_start = v;
    }
    if let Some(v) = payload.retirement_date {
        cli.retirement_date = v;
    }
    if let Some(v) = payload.high3_salary {
        cli.high3_salary = v;
    }
    if let Some(v) = payload.starting_balance {
        cli.starting_balance = v;
    }
    if let Some(v) = payload.sick_leave_hours {
        cli.sick_leave_hours = v;
    }
    if let Some(v) = payload.claim_age {
        cli.claim_age = v;
    }
    if let Some(v) = payload.survivor_benefit {
        cli.survivor_benefit = v.into();
    }
    if let Some(v) = payload.cola {
        cli.cola = v;
    }
    if let Some(v) = payload.growth {
        cli.growth = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }
    if let Some(v) = payload.withdrawal_strategy {
        cli.withdrawal_strategy = v.into();
    }
    if let Some(v) = payload.tax_exempt_resident {
        cli.tax_exempt_resident = v;
    }
    if let Some(v) = payload.health_premium {
        cli.health_premium = v;
    }
    if let Some(v) = payload.premium_growth_rate {
        cli.premium_growth_rate = v;
    }
    if let Some(v) = payload.filing_status {
        cli.filing_status = v.into();
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.biweekly_contribution {
        cli.biweekly_contribution = v;
    }
    if let Some(v) = payload.employer_match {
        cli.employer_match = v;
    }
    if let Some(v) = payload.include_medicare {
        cli.include_medicare = v;
    }
    if let Some(v) = payload.current_salary {
        cli.current_salary = Some(v);
    }

    let mut params = build_params(&cli);
    if let Some(path) = &payload.cola_path {
        params.cola = RateInput::Path(path.clone());
    }
    if let Some(path) = &payload.growth_path {
        params.growth = RateInput::Path(path.clone());
    }
    if let Some(allocation) = payload.fund_allocation {
        params.fund_allocation = Some(allocation.into());
    }
    params
}

fn monte_carlo_config_from_payload(payload: &MonteCarloPayload) -> MonteCarloConfig {
    let defaults = MonteCarloConfig::default();

    let cola_mean = payload.cola_mean.unwrap_or(0.02);
    let cola_std = payload.cola_std.unwrap_or(0.005);
    let growth_mean = payload.growth_mean.unwrap_or(0.05);
    let growth_std = payload.growth_std.unwrap_or(0.10);

    let distribution = |kind: Option<ApiDistributionKind>, mean: f64, std_dev: f64| match kind {
        Some(ApiDistributionKind::Lognormal) => RateDistribution::LogNormal { mean, std_dev },
        _ => RateDistribution::Normal { mean, std_dev },
    };

    MonteCarloConfig {
        cola: distribution(payload.cola_distribution, cola_mean, cola_std),
        growth: distribution(payload.growth_distribution, growth_mean, growth_std),
        num_paths: payload.num_paths.unwrap_or(defaults.num_paths),
        seed: payload.seed,
        depletion_threshold: payload
            .depletion_threshold
            .unwrap_or(defaults.depletion_threshold),
        track_balances: payload.track_balances.unwrap_or(defaults.track_balances),
        keep_paths: payload.keep_paths.unwrap_or(defaults.keep_paths),
    }
}

/// One-shot CLI entry: parses scenario flags, runs the simulation, and
/// returns the result as pretty JSON.
pub fn run_cli_simulation(args: &[String]) -> Result<String, String> {
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let params = build_params(&cli);
    let result = simulate(&params).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/monte-carlo", post(monte_carlo_handler))
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement simulator API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let params = scenario_from_payload(&payload);
    match simulate(&params) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn monte_carlo_handler(Json(payload): Json<MonteCarloPayload>) -> Response {
    let params = scenario_from_payload(&payload.scenario);
    let config = monte_carlo_config_from_payload(&payload);

    let result = run_monte_carlo(&params, &config);
    let claim_date = add_months(params.birth_date, params.claim_age * 12);
    let summary = scenario_summary(&result, params.retirement_date, claim_date);

    (StatusCode::OK, Json(MonteCarloResponse { result, summary })).into_response()
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    let params_a = scenario_from_payload(&payload.a);
    let params_b = scenario_from_payload(&payload.b);

    let a = match simulate(&params_a) {
        Ok(result) => result,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("scenario A: {err}"));
        }
    };
    let b = match simulate(&params_b) {
        Ok(result) => result,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("scenario B: {err}"));
        }
    };

    let combined = combine_household(&a, &b);
    let household_cash_flow = match (
        payload.pre_retirement_expenses,
        payload.post_retirement_expenses,
    ) {
        (Some(pre), Some(post)) => {
            let months: Vec<NaiveDate> = combined.months.iter().map(|r| r.month).collect();
            let expenses = expense_schedule(
                &months,
                params_a.retirement_date,
                pre,
                post,
                payload.expense_inflation.unwrap_or(0.0),
            );
            Some(cash_flow(&combined, &expenses))
        }
        _ => None,
    };

    let response = CompareResponse {
        breakeven: breakeven(&a, &b),
        cumulative_delta: cumulative_delta(&a, &b),
        combined,
        household_cash_flow,
        a,
        b,
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cli_builds_a_valid_scenario() {
        let params = build_params(&default_cli());
        let result = simulate(&params).expect("defaults must simulate");
        assert!(!result.months.is_empty());
    }

    #[test]
    fn payload_overrides_replace_cli_defaults() {
        let payload: SimulatePayload = serde_json::from_str(
            r#"{
                "high3Salary": 120000,
                "claimAge": 64,
                "survivorBenefit": "partial",
                "withdrawalStrategy": "fixed-percentage",
                "filingStatus": "married",
                "horizonYears": 5
            }"#,
        )
        .expect("payload parses");

        let params = scenario_from_payload(&payload);
        assert!((params.high3_salary - 120_000.0).abs() <= 1e-9);
        assert_eq!(params.claim_age, 64);
        assert_eq!(params.survivor_benefit, SurvivorBenefit::Partial);
        assert_eq!(
            params.withdrawal_strategy,
            WithdrawalStrategy::FixedPercentage
        );
        assert_eq!(params.filing_status, FilingStatus::Married);
        assert_eq!(params.horizon_years, 5);
    }

    #[test]
    fn payload_accepts_camel_case_enum_aliases() {
        let payload: SimulatePayload = serde_json::from_str(
            r#"{"withdrawalStrategy": "greaterOfBoth"}"#,
        )
        .expect("alias parses");
        let params = scenario_from_payload(&payload);
        assert_eq!(params.withdrawal_strategy, WithdrawalStrategy::GreaterOfBoth);
    }

    #[test]
    fn rate_paths_in_the_payload_win_over_scalars() {
        let payload: SimulatePayload = serde_json::from_str(
            r#"{"cola": 0.02, "colaPath": [0.01, 0.02, 0.03]}"#,
        )
        .expect("payload parses");

        let params = scenario_from_payload(&payload);
        assert_eq!(params.cola, RateInput::Path(vec![0.01, 0.02, 0.03]));
    }

    #[test]
    fn fund_allocation_defaults_missing_buckets_to_zero() {
        let payload: SimulatePayload = serde_json::from_str(
            r#"{"fundAllocation": {"cFundPct": 60, "gFundPct": 40}}"#,
        )
        .expect("payload parses");

        let params = scenario_from_payload(&payload);
        let allocation = params.fund_allocation.expect("allocation set");
        assert!((allocation.c_fund_pct - 60.0).abs() <= 1e-9);
        assert!((allocation.s_fund_pct - 0.0).abs() <= 1e-9);
    }

    #[test]
    fn monte_carlo_payload_selects_distributions_per_variable() {
        let payload: MonteCarloPayload = serde_json::from_str(
            r#"{
                "colaMean": 0.025,
                "colaStd": 0.004,
                "colaDistribution": "lognormal",
                "growthMean": 0.06,
                "numPaths": 250,
                "seed": 9
            }"#,
        )
        .expect("payload parses");

        let config = monte_carlo_config_from_payload(&payload);
        assert!(matches!(
            config.cola,
            RateDistribution::LogNormal { mean, .. } if (mean - 0.025).abs() <= 1e-9
        ));
        assert!(matches!(
            config.growth,
            RateDistribution::Normal { mean, .. } if (mean - 0.06).abs() <= 1e-9
        ));
        assert_eq!(config.num_paths, 250);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn cli_simulation_rejects_invalid_flags_with_a_message() {
        let args: Vec<String> = ["fers", "--high3-salary=-10"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = run_cli_simulation(&args).expect_err("negative salary must fail");
        assert!(err.contains("high-3"), "got: {err}");
    }

    #[test]
    fn cli_simulation_emits_json_for_valid_flags() {
        let args: Vec<String> = ["fers", "--horizon-years", "2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = run_cli_simulation(&args).expect("valid run");
        assert!(output.contains("cumulativeIncome"));
    }
}

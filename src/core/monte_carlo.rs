//! Monte Carlo layer: runs the simulator across randomized COLA and
//! growth-rate paths and reduces the batch to percentile bands and risk
//! metrics.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use tracing::warn;

use super::engine::{add_months, month_grid, simulate};
use super::types::{RateInput, ScenarioParameters, SimulationResult};

pub type SampleFn = Arc<dyn Fn(&mut dyn RngCore) -> f64 + Send + Sync>;

#[derive(Clone)]
pub enum RateDistribution {
    Normal { mean: f64, std_dev: f64 },
    LogNormal { mean: f64, std_dev: f64 },
    Custom(SampleFn),
}

impl fmt::Debug for RateDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateDistribution::Normal { mean, std_dev } => f
                .debug_struct("Normal")
                .field("mean", mean)
                .field("std_dev", std_dev)
                .finish(),
            RateDistribution::LogNormal { mean, std_dev } => f
                .debug_struct("LogNormal")
                .field("mean", mean)
                .field("std_dev", std_dev)
                .finish(),
            RateDistribution::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    pub cola: RateDistribution,
    pub growth: RateDistribution,
    pub num_paths: usize,
    pub seed: Option<u64>,
    pub depletion_threshold: f64,
    pub track_balances: bool,
    pub keep_paths: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            cola: RateDistribution::Normal {
                mean: 0.02,
                std_dev: 0.005,
            },
            growth: RateDistribution::Normal {
                mean: 0.05,
                std_dev: 0.10,
            },
            num_paths: 100,
            seed: None,
            depletion_threshold: 0.0,
            track_balances: true,
            keep_paths: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBands {
    pub p5: Vec<f64>,
    pub p10: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p90: Vec<f64>,
    pub p95: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathError {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub depletion_risk_pct: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub income_below_start_pct: f64,
    pub significant_drop_risk_pct: f64,
    pub failed_paths: Vec<PathError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub months: Vec<NaiveDate>,
    pub income: PercentileBands,
    pub balances: Option<PercentileBands>,
    pub metrics: RiskMetrics,
    pub paths: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPoint {
    pub month: NaiveDate,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub at_retirement: SummaryPoint,
    pub at_claim_start: Option<SummaryPoint>,
    pub ten_years_after_retirement: SummaryPoint,
    pub end_of_simulation: SummaryPoint,
}

/// Runs `num_paths` independent simulations under sampled rate paths.
/// Never fails: a path whose simulation rejects its inputs is logged and
/// excluded from aggregation, and with zero surviving paths every
/// percentile cell is NaN.
pub fn run_monte_carlo(params: &ScenarioParameters, config: &MonteCarloConfig) -> MonteCarloResult {
    let months = month_grid(params);
    let month_count = months.len();

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    // Every path's draws are pre-generated into its own rows so workers
    // share no RNG state.
    let mut cola_rows = Vec::with_capacity(config.num_paths);
    let mut growth_rows = Vec::with_capacity(config.num_paths);
    for _ in 0..config.num_paths {
        cola_rows.push(draw_row(&config.cola, month_count, &mut rng));
        growth_rows.push(draw_row(&config.growth, month_count, &mut rng));
    }

    let outcomes: Vec<_> = cola_rows
        .into_par_iter()
        .zip(growth_rows.into_par_iter())
        .map(|(cola_row, growth_row)| {
            let mut path_params = params.clone();
            path_params.cola = RateInput::Path(cola_row);
            path_params.growth = RateInput::Path(growth_row);
            // The sampled growth path must drive the balance, not a
            // fixed fund mix.
            path_params.fund_allocation = None;
            simulate(&path_params)
        })
        .collect();

    let mut failed_paths = Vec::new();
    let mut successes: Vec<SimulationResult> = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(result) => successes.push(result),
            Err(err) => {
                let message = err.to_string();
                warn!(path = index, %message, "monte carlo path failed");
                failed_paths.push(PathError { index, message });
            }
        }
    }

    let income_series: Vec<Vec<f64>> = successes
        .iter()
        .map(|r| r.months.iter().map(|m| m.total_income).collect())
        .collect();
    let balance_series: Vec<Vec<f64>> = successes
        .iter()
        .map(|r| r.months.iter().map(|m| m.balance).collect())
        .collect();

    let depleted = balance_series
        .iter()
        .filter(|series| series.iter().any(|b| *b < config.depletion_threshold))
        .count();
    let depletion_risk_pct = if balance_series.is_empty() {
        f64::NAN
    } else {
        depleted as f64 / balance_series.len() as f64 * 100.0
    };

    let income = bands(&income_series, month_count);
    let balances = config
        .track_balances
        .then(|| bands(&balance_series, month_count));

    let max_drawdown = series_min(&income.p5);
    let volatility = sample_std_dev(&income.p50);
    let (income_below_start_pct, significant_drop_risk_pct) =
        drop_metrics(&income.p50, &income.p25);

    MonteCarloResult {
        months,
        income,
        balances,
        metrics: RiskMetrics {
            depletion_risk_pct,
            max_drawdown,
            volatility,
            income_below_start_pct,
            significant_drop_risk_pct,
            failed_paths,
        },
        paths: config.keep_paths.then_some(income_series),
    }
}

/// Income snapshots at the scenario's key dates, clamped to the simulated
/// range; claim start is omitted when it precedes the first month.
pub fn scenario_summary(
    result: &MonteCarloResult,
    retirement_date: NaiveDate,
    claim_date: NaiveDate,
) -> Option<ScenarioSummary> {
    let first = *result.months.first()?;
    let point = |idx: usize| SummaryPoint {
        month: result.months[idx],
        median: result.income.p50[idx],
        p10: result.income.p10[idx],
        p90: result.income.p90[idx],
    };

    let at_claim_start =
        (claim_date >= first).then(|| point(nearest_index(&result.months, claim_date)));

    Some(ScenarioSummary {
        at_retirement: point(nearest_index(&result.months, retirement_date)),
        at_claim_start,
        ten_years_after_retirement: point(nearest_index(
            &result.months,
            add_months(retirement_date, 120),
        )),
        end_of_simulation: point(result.months.len() - 1),
    })
}

fn nearest_index(months: &[NaiveDate], target: NaiveDate) -> usize {
    months
        .iter()
        .enumerate()
        .min_by_key(|(_, month)| (**month - target).num_days().abs())
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn draw_row(dist: &RateDistribution, month_count: usize, rng: &mut SmallRng) -> Vec<f64> {
    match dist {
        RateDistribution::Normal { mean, std_dev } => {
            let normal = Normal::new(*mean, *std_dev).ok();
            (0..month_count)
                .map(|_| {
                    normal
                        .map(|d| d.sample(rng))
                        .unwrap_or(*mean)
                        .max(0.0)
                })
                .collect()
        }
        RateDistribution::LogNormal { mean, std_dev } => {
            let lognormal = lognormal_matching(*mean, *std_dev);
            (0..month_count)
                .map(|_| {
                    lognormal
                        .map(|d| d.sample(rng))
                        .unwrap_or(*mean)
                        .max(0.0)
                })
                .collect()
        }
        RateDistribution::Custom(sampler) => {
            (0..month_count).map(|_| sampler(rng).max(0.0)).collect()
        }
    }
}

// Derives log-space parameters so the sample mean and standard deviation
// match the requested values in real space.
fn lognormal_matching(mean: f64, std_dev: f64) -> Option<LogNormal<f64>> {
    if mean <= 0.0 {
        return None;
    }
    let variance_ratio = (std_dev / mean).powi(2);
    let sigma = (1.0 + variance_ratio).ln().sqrt();
    let mu = mean.ln() - sigma * sigma / 2.0;
    LogNormal::new(mu, sigma).ok()
}

fn bands(series_by_path: &[Vec<f64>], month_count: usize) -> PercentileBands {
    let mut result = PercentileBands {
        p5: Vec::with_capacity(month_count),
        p10: Vec::with_capacity(month_count),
        p25: Vec::with_capacity(month_count),
        p50: Vec::with_capacity(month_count),
        p75: Vec::with_capacity(month_count),
        p90: Vec::with_capacity(month_count),
        p95: Vec::with_capacity(month_count),
    };

    for month_idx in 0..month_count {
        let mut values: Vec<f64> = series_by_path
            .iter()
            .filter_map(|series| series.get(month_idx).copied())
            .collect();

        if values.is_empty() {
            result.p5.push(f64::NAN);
            result.p10.push(f64::NAN);
            result.p25.push(f64::NAN);
            result.p50.push(f64::NAN);
            result.p75.push(f64::NAN);
            result.p90.push(f64::NAN);
            result.p95.push(f64::NAN);
            continue;
        }

        result.p5.push(percentile(&mut values, 5.0));
        result.p10.push(percentile(&mut values, 10.0));
        result.p25.push(percentile(&mut values, 25.0));
        result.p50.push(percentile(&mut values, 50.0));
        result.p75.push(percentile(&mut values, 75.0));
        result.p90.push(percentile(&mut values, 90.0));
        result.p95.push(percentile(&mut values, 95.0));
    }

    result
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

fn series_min(series: &[f64]) -> f64 {
    series
        .iter()
        .copied()
        .fold(f64::NAN, |acc, v| if acc.is_nan() { v } else { acc.min(v) })
}

fn sample_std_dev(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let sum_sq = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (sum_sq / (n - 1) as f64).sqrt()
}

// Share of months with the median below the starting median, and with
// the lower quartile below 80% of it.
fn drop_metrics(p50: &[f64], p25: &[f64]) -> (f64, f64) {
    let Some(starting) = p50.first().copied() else {
        return (f64::NAN, f64::NAN);
    };
    if starting.is_nan() {
        return (f64::NAN, f64::NAN);
    }

    let below_start = p50.iter().filter(|v| **v < starting).count();
    let significant = p25.iter().filter(|v| **v < starting * 0.8).count();
    (
        below_start as f64 / p50.len() as f64 * 100.0,
        significant as f64 / p25.len() as f64 * 100.0,
    )
}

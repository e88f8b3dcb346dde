use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SurvivorBenefit {
    None,
    Partial,
    Full,
}

impl SurvivorBenefit {
    pub fn annuity_reduction(self) -> f64 {
        match self {
            SurvivorBenefit::None => 0.0,
            SurvivorBenefit::Partial => 0.05,
            SurvivorBenefit::Full => 0.10,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WithdrawalStrategy {
    FixedPercentage,
    RequiredMinimum,
    GreaterOfBoth,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilingStatus {
    Single,
    Married,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateInput {
    Scalar(f64),
    Path(Vec<f64>),
}

impl RateInput {
    /// Resolves to one rate per simulated month; a short path holds its
    /// last element for all later months.
    pub fn resolve(&self, month_count: usize) -> Vec<f64> {
        match self {
            RateInput::Scalar(value) => vec![*value; month_count],
            RateInput::Path(path) => {
                let last = path.last().copied().unwrap_or(0.0);
                (0..month_count)
                    .map(|idx| path.get(idx).copied().unwrap_or(last))
                    .collect()
            }
        }
    }

    pub fn has_negative(&self) -> bool {
        match self {
            RateInput::Scalar(value) => *value < 0.0,
            RateInput::Path(path) => path.iter().any(|v| *v < 0.0),
        }
    }

    pub fn is_empty_path(&self) -> bool {
        matches!(self, RateInput::Path(path) if path.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundAllocation {
    pub g_fund_pct: f64,
    pub f_fund_pct: f64,
    pub c_fund_pct: f64,
    pub s_fund_pct: f64,
    pub i_fund_pct: f64,
}

impl FundAllocation {
    pub fn total(&self) -> f64 {
        self.g_fund_pct + self.f_fund_pct + self.c_fund_pct + self.s_fund_pct + self.i_fund_pct
    }

    pub fn has_negative(&self) -> bool {
        self.g_fund_pct < 0.0
            || self.f_fund_pct < 0.0
            || self.c_fund_pct < 0.0
            || self.s_fund_pct < 0.0
            || self.i_fund_pct < 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioParameters {
    pub birth_date: NaiveDate,
    pub service_start: NaiveDate,
    pub retirement_date: NaiveDate,
    pub high3_salary: f64,
    pub starting_balance: f64,
    pub sick_leave_hours: f64,
    pub claim_age: u32,
    pub survivor_benefit: SurvivorBenefit,
    pub cola: RateInput,
    pub growth: RateInput,
    pub withdrawal_rate: f64,
    pub withdrawal_strategy: WithdrawalStrategy,
    pub tax_exempt_resident: bool,
    pub health_premium: f64,
    pub premium_growth_rate: f64,
    pub filing_status: FilingStatus,
    pub horizon_years: u32,
    pub biweekly_contribution: f64,
    pub employer_match: bool,
    pub include_medicare: bool,
    pub fund_allocation: Option<FundAllocation>,
    pub current_salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: NaiveDate,
    pub salary: f64,
    pub annuity: f64,
    pub supplement: f64,
    pub savings_withdrawal: f64,
    pub social_security: f64,
    pub health_premium: f64,
    pub medicare_premium: f64,
    pub total_income: f64,
    pub balance: f64,
    pub rmd: f64,
}

impl MonthlyRecord {
    pub fn component_sum(&self) -> f64 {
        self.salary
            + self.annuity
            + self.supplement
            + self.savings_withdrawal
            + self.social_security
            + self.health_premium
            + self.medicare_premium
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub months: Vec<MonthlyRecord>,
    pub cumulative_income: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid scenario parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),
}

impl SimulationError {
    pub fn violations(&self) -> &[String] {
        match self {
            SimulationError::InvalidParameters(violations) => violations,
        }
    }
}

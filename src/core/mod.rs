mod benefits;
mod compare;
mod engine;
mod monte_carlo;
mod tax;
mod types;

pub use benefits::{
    MEDICARE_PART_B_PREMIUM, MEDICARE_PART_D_PREMIUM, age_at, fers_supplement, monthly_rmd,
    service_years, social_security_benefit, weighted_fund_growth,
};
pub use compare::{
    BreakevenPoint, CashFlow, breakeven, cash_flow, combine_household, cumulative_delta,
    expense_schedule,
};
pub use engine::simulate;
pub(crate) use engine::add_months;
pub use monte_carlo::{
    MonteCarloConfig, MonteCarloResult, PathError, PercentileBands, RateDistribution, RiskMetrics,
    SampleFn, ScenarioSummary, SummaryPoint, run_monte_carlo, scenario_summary,
};
pub use tax::{federal_tax, state_tax};
pub use types::{
    FilingStatus, FundAllocation, MonthlyRecord, RateInput, ScenarioParameters, SimulationError,
    SimulationResult, SurvivorBenefit, WithdrawalStrategy,
};

use chrono::{Datelike, Months, NaiveDate};

use super::benefits::{
    MEDICARE_PART_B_PREMIUM, MEDICARE_PART_D_PREMIUM, age_at, fers_supplement, monthly_rmd,
    service_years, social_security_benefit, weighted_fund_growth,
};
use super::tax::{STATE_FLAT_RATE, effective_monthly_rate};
use super::types::{
    FilingStatus, MonthlyRecord, RateInput, ScenarioParameters, SimulationError, SimulationResult,
    WithdrawalStrategy,
};

// Annuity accrual per year of service, with the age-62/20-year bonus tier.
const BASE_MULTIPLIER: f64 = 0.01;
const BONUS_MULTIPLIER: f64 = 0.011;

const PAY_PERIODS_PER_YEAR: f64 = 26.0;

#[derive(Debug)]
struct ScenarioContext {
    birth_date: NaiveDate,
    retirement_date: NaiveDate,
    age_62_date: NaiveDate,
    claim_date: NaiveDate,
    high3: f64,
    current_salary: f64,
    gross_annuity: f64,
    service_years: f64,
    state_rate: f64,
    salary_effective_rate: f64,
    ss_benefit: f64,
    ss_benefit_62: f64,
    filing_status: FilingStatus,
    withdrawal_rate: f64,
    withdrawal_strategy: WithdrawalStrategy,
    health_premium: f64,
    premium_growth_rate: f64,
    biweekly_contribution: f64,
    employer_match: bool,
    include_medicare: bool,
}

#[derive(Debug, Clone, Copy)]
struct RetiredMonthValues {
    annuity: f64,
    supplement: f64,
    withdrawal_net: f64,
    draw_gross: f64,
    social_security: f64,
    health_premium: f64,
    medicare_premium: f64,
    rmd: f64,
}

/// Produces the month-by-month income series for one scenario, from
/// January of the retirement year through `retirement_date` plus the
/// configured horizon. Deterministic for identical parameters.
pub fn simulate(params: &ScenarioParameters) -> Result<SimulationResult, SimulationError> {
    let violations = validate_parameters(params);
    if !violations.is_empty() {
        return Err(SimulationError::InvalidParameters(violations));
    }

    // A fund allocation, when present, replaces the scalar growth input.
    let growth_input = match &params.fund_allocation {
        Some(allocation) => RateInput::Scalar(weighted_fund_growth(allocation)),
        None => params.growth.clone(),
    };

    let months = month_grid(params);
    let cola_by_month = params.cola.resolve(months.len());
    let growth_by_month = growth_input.resolve(months.len());

    let ctx = build_context(params);
    let retirement_month = first_of_month(params.retirement_date);

    let mut balance = params.starting_balance;
    let mut records = Vec::with_capacity(months.len());

    for (idx, month) in months.iter().copied().enumerate() {
        let cola = cola_by_month[idx];
        let growth = growth_by_month[idx];

        let record = if month < retirement_month {
            working_month(&ctx, month, growth, &mut balance)
        } else if month == retirement_month && params.retirement_date.day() > 1 {
            transition_month(&ctx, month, cola, growth, &mut balance)
        } else {
            retired_month(&ctx, month, cola, growth, &mut balance)
        };
        records.push(record);
    }

    enforce_zero_salary_after_retirement(&mut records, retirement_month);

    let mut cumulative_income = Vec::with_capacity(records.len());
    let mut running = 0.0;
    for record in &records {
        running += record.total_income;
        cumulative_income.push(running);
    }

    Ok(SimulationResult {
        months: records,
        cumulative_income,
    })
}

fn build_context(params: &ScenarioParameters) -> ScenarioContext {
    let service_years = service_years(
        params.service_start,
        params.retirement_date,
        params.sick_leave_hours,
    );
    let age_62_date = add_months(params.birth_date, 62 * 12);
    let claim_date = add_months(params.birth_date, params.claim_age * 12);

    let multiplier = if params.retirement_date >= age_62_date && service_years >= 20.0 {
        BONUS_MULTIPLIER
    } else {
        BASE_MULTIPLIER
    };
    let gross_annuity = multiplier
        * service_years
        * params.high3_salary
        * (1.0 - params.survivor_benefit.annuity_reduction());

    let state_rate = if params.tax_exempt_resident {
        0.0
    } else {
        STATE_FLAT_RATE
    };

    ScenarioContext {
        birth_date: params.birth_date,
        retirement_date: params.retirement_date,
        age_62_date,
        claim_date,
        high3: params.high3_salary,
        current_salary: params.current_salary.unwrap_or(params.high3_salary),
        gross_annuity,
        service_years,
        state_rate,
        salary_effective_rate: effective_monthly_rate(params.high3_salary, params.filing_status),
        ss_benefit: social_security_benefit(params.claim_age, None),
        ss_benefit_62: social_security_benefit(62, None),
        filing_status: params.filing_status,
        withdrawal_rate: params.withdrawal_rate,
        withdrawal_strategy: params.withdrawal_strategy,
        health_premium: params.health_premium,
        premium_growth_rate: params.premium_growth_rate,
        biweekly_contribution: params.biweekly_contribution,
        employer_match: params.employer_match,
        include_medicare: params.include_medicare,
    }
}

fn working_month(
    ctx: &ScenarioContext,
    month: NaiveDate,
    growth: f64,
    balance: &mut f64,
) -> MonthlyRecord {
    let salary = net_monthly_salary(ctx);
    let contribution = monthly_contribution(ctx);
    *balance = (*balance + contribution) * (1.0 + growth / 12.0);

    MonthlyRecord {
        month,
        salary,
        annuity: 0.0,
        supplement: 0.0,
        savings_withdrawal: 0.0,
        social_security: 0.0,
        health_premium: 0.0,
        medicare_premium: 0.0,
        total_income: salary,
        balance: *balance,
        rmd: 0.0,
    }
}

fn retired_month(
    ctx: &ScenarioContext,
    month: NaiveDate,
    cola: f64,
    growth: f64,
    balance: &mut f64,
) -> MonthlyRecord {
    let years_retired = year_month_diff(ctx.retirement_date, month);
    let values = retired_values(ctx, month, cola, years_retired, *balance);
    *balance = ((*balance - values.draw_gross) * (1.0 + growth / 12.0)).max(0.0);

    let total_income = values.annuity
        + values.supplement
        + values.withdrawal_net
        + values.social_security
        + values.health_premium
        + values.medicare_premium;

    MonthlyRecord {
        month,
        salary: 0.0,
        annuity: values.annuity,
        supplement: values.supplement,
        savings_withdrawal: values.withdrawal_net,
        social_security: values.social_security,
        health_premium: values.health_premium,
        medicare_premium: values.medicare_premium,
        total_income,
        balance: *balance,
        rmd: values.rmd,
    }
}

// The calendar month containing the retirement date blends both phases:
// salary accrues through the day before retirement, every retired-phase
// amount accrues for the remainder, split by calendar days.
fn transition_month(
    ctx: &ScenarioContext,
    month: NaiveDate,
    cola: f64,
    growth: f64,
    balance: &mut f64,
) -> MonthlyRecord {
    let days = days_in_month(month.year(), month.month());
    let working_ratio = f64::from(ctx.retirement_date.day() - 1) / days;
    let retired_ratio = 1.0 - working_ratio;

    let salary = net_monthly_salary(ctx) * working_ratio;
    let values = retired_values(ctx, month, cola, 0.0, *balance);

    let contribution = monthly_contribution(ctx) * working_ratio;
    let draw = values.draw_gross * retired_ratio;
    *balance = ((*balance + contribution - draw) * (1.0 + growth / 12.0)).max(0.0);

    let annuity = values.annuity * retired_ratio;
    let supplement = values.supplement * retired_ratio;
    let withdrawal = values.withdrawal_net * retired_ratio;
    let social_security = values.social_security * retired_ratio;
    let health_premium = values.health_premium * retired_ratio;
    let medicare_premium = values.medicare_premium * retired_ratio;

    MonthlyRecord {
        month,
        salary,
        annuity,
        supplement,
        savings_withdrawal: withdrawal,
        social_security,
        health_premium,
        medicare_premium,
        total_income: salary
            + annuity
            + supplement
            + withdrawal
            + social_security
            + health_premium
            + medicare_premium,
        balance: *balance,
        rmd: values.rmd,
    }
}

fn retired_values(
    ctx: &ScenarioContext,
    month: NaiveDate,
    cola: f64,
    years_retired: f64,
    balance: f64,
) -> RetiredMonthValues {
    let monthly_annuity = apply_cola(ctx.gross_annuity / 12.0, cola, years_retired);
    let annuity_rate = effective_monthly_rate(monthly_annuity * 12.0, ctx.filing_status);
    let annuity = monthly_annuity * (1.0 - annuity_rate);

    let supplement = if month < ctx.age_62_date && ctx.service_years >= 20.0 {
        fers_supplement(ctx.service_years, ctx.ss_benefit_62) * (1.0 - annuity_rate)
    } else {
        0.0
    };

    let age = age_at(ctx.birth_date, month);
    let rmd = monthly_rmd(age, balance);

    let rmd_rate = if balance > 0.0 { rmd / balance } else { 0.0 };
    let withdrawal_rate = match ctx.withdrawal_strategy {
        WithdrawalStrategy::FixedPercentage => ctx.withdrawal_rate / 12.0,
        WithdrawalStrategy::RequiredMinimum => rmd_rate,
        WithdrawalStrategy::GreaterOfBoth => (ctx.withdrawal_rate / 12.0).max(rmd_rate),
    };
    let draw_gross = if balance > 0.0 {
        balance * withdrawal_rate
    } else {
        0.0
    };
    let draw_rate = effective_monthly_rate(draw_gross * 12.0, ctx.filing_status);
    let withdrawal_net = draw_gross * (1.0 - draw_rate);

    let social_security = if month >= ctx.claim_date {
        let years_on_benefit = year_month_diff(ctx.claim_date, month);
        let monthly_ss = apply_cola(ctx.ss_benefit, cola, years_on_benefit);

        // Simplified taxable-portion rule keyed to combined monthly income.
        let combined = monthly_annuity + draw_gross + monthly_ss;
        let taxable_portion = if combined > 5_000.0 {
            0.85
        } else if combined > 3_000.0 {
            0.50
        } else {
            0.0
        };
        (monthly_ss - monthly_ss * taxable_portion * annuity_rate).max(0.0)
    } else {
        0.0
    };

    let premium_factor = (1.0 + ctx.premium_growth_rate).powi(years_retired.floor() as i32);
    let health_premium = -ctx.health_premium * premium_factor;

    let medicare_premium = if ctx.include_medicare && age >= 65 {
        -(MEDICARE_PART_B_PREMIUM + MEDICARE_PART_D_PREMIUM)
    } else {
        0.0
    };

    RetiredMonthValues {
        annuity,
        supplement,
        withdrawal_net,
        draw_gross,
        social_security,
        health_premium,
        medicare_premium,
        rmd,
    }
}

fn net_monthly_salary(ctx: &ScenarioContext) -> f64 {
    let monthly_gross = ctx.high3 / 12.0;
    monthly_gross * (1.0 - ctx.salary_effective_rate - ctx.state_rate)
}

fn monthly_contribution(ctx: &ScenarioContext) -> f64 {
    if ctx.biweekly_contribution <= 0.0 {
        return 0.0;
    }
    let biweekly_salary = ctx.current_salary / PAY_PERIODS_PER_YEAR;
    let match_amount =
        employer_match_amount(biweekly_salary, ctx.biweekly_contribution, ctx.employer_match);
    (ctx.biweekly_contribution + match_amount) * PAY_PERIODS_PER_YEAR / 12.0
}

// Automatic 1% of pay, dollar-for-dollar on the first 3%, fifty cents on
// the dollar for the next 2%.
fn employer_match_amount(biweekly_salary: f64, contribution: f64, matching_enabled: bool) -> f64 {
    if !matching_enabled || biweekly_salary <= 0.0 {
        return 0.0;
    }

    let contribution_pct = contribution / biweekly_salary * 100.0;
    let mut amount = biweekly_salary * 0.01;
    if contribution_pct >= 3.0 {
        amount += biweekly_salary * 0.03;
    } else {
        amount += biweekly_salary * contribution_pct / 100.0;
    }
    if contribution_pct >= 5.0 {
        amount += biweekly_salary * 0.01;
    } else if contribution_pct > 3.0 {
        amount += biweekly_salary * (contribution_pct - 3.0) / 100.0 * 0.5;
    }
    amount
}

fn apply_cola(base: f64, rate: f64, years: f64) -> f64 {
    base * (1.0 + rate).powi(years.floor() as i32)
}

// Salary must be exactly zero for every month strictly after the
// retirement month; any violation is zeroed and the month's total
// recomputed from the remaining components.
fn enforce_zero_salary_after_retirement(
    records: &mut [MonthlyRecord],
    retirement_month: NaiveDate,
) {
    for record in records.iter_mut() {
        if record.month > retirement_month && record.salary != 0.0 {
            record.salary = 0.0;
            record.total_income = record.component_sum();
        }
    }
}

fn validate_parameters(params: &ScenarioParameters) -> Vec<String> {
    let mut errors = Vec::new();

    let non_negative = |errors: &mut Vec<String>, value: f64, label: &str| {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{label} cannot be negative"));
        }
    };

    non_negative(&mut errors, params.high3_salary, "high-3 salary");
    non_negative(&mut errors, params.starting_balance, "starting savings balance");
    non_negative(&mut errors, params.sick_leave_hours, "sick leave hours");
    non_negative(&mut errors, params.withdrawal_rate, "withdrawal rate");
    non_negative(&mut errors, params.health_premium, "health premium");
    non_negative(&mut errors, params.premium_growth_rate, "premium growth rate");
    non_negative(&mut errors, params.biweekly_contribution, "bi-weekly contribution");
    if let Some(salary) = params.current_salary {
        non_negative(&mut errors, salary, "current salary");
    }

    if !(62..=70).contains(&params.claim_age) {
        errors.push("Social Security claim age must be between 62 and 70".to_string());
    }

    check_rate_input(&mut errors, &params.cola, "COLA");
    check_rate_input(&mut errors, &params.growth, "savings growth rate");

    if params.horizon_years < 1 {
        errors.push("simulation horizon must be at least one year".to_string());
    }

    if params.birth_date >= params.service_start {
        errors.push("birth date must come before the service start date".to_string());
    }
    if params.retirement_date <= params.service_start {
        errors.push("retirement date must come after the service start date".to_string());
    }

    if let Some(allocation) = &params.fund_allocation {
        if allocation.has_negative() {
            errors.push("fund allocation percentages cannot be negative".to_string());
        }
        if (allocation.total() - 100.0).abs() > 1e-6 {
            errors.push("fund allocation percentages must sum to 100".to_string());
        }
    }

    errors
}

fn check_rate_input(errors: &mut Vec<String>, input: &RateInput, label: &str) {
    if input.is_empty_path() {
        errors.push(format!("{label} path must contain at least one rate"));
        return;
    }
    if input.has_negative() {
        errors.push(format!("{label} cannot be negative"));
    }
    let non_finite = match input {
        RateInput::Scalar(value) => !value.is_finite(),
        RateInput::Path(path) => path.iter().any(|v| !v.is_finite()),
    };
    if non_finite {
        errors.push(format!("{label} must be finite"));
    }
}

// The simulation grid starts at January of the retirement year so the
// series captures the final working months, and runs through the
// retirement date plus the horizon.
pub(crate) fn month_grid(params: &ScenarioParameters) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(params.retirement_date.year(), 1, 1)
        .unwrap_or(params.retirement_date);
    let end = add_months(params.retirement_date, params.horizon_years * 12);

    let mut months = Vec::new();
    let mut date = first_of_month(start);
    while date <= end {
        months.push(date);
        date = add_months(date, 1);
    }
    months
}

pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> f64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31.0,
        4 | 6 | 9 | 11 => 30.0,
        _ => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29.0
            } else {
                28.0
            }
        }
    }
}

// Elapsed time in fractional years, counted in whole calendar months.
fn year_month_diff(from: NaiveDate, to: NaiveDate) -> f64 {
    f64::from(to.year() - from.year()) + f64::from(to.month() as i32 - from.month() as i32) / 12.0
}

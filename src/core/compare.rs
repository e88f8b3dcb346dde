use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::types::{MonthlyRecord, SimulationResult};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenPoint {
    pub month_index: usize,
    pub month: NaiveDate,
    pub cumulative_income: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub months: Vec<NaiveDate>,
    pub expenses: Vec<f64>,
    pub net: Vec<f64>,
    pub cumulative: Vec<f64>,
}

/// First month at which the cumulative-income gap between two scenarios
/// changes sign, or `None` if scenario B never crosses scenario A.
pub fn breakeven(a: &SimulationResult, b: &SimulationResult) -> Option<BreakevenPoint> {
    let len = a.cumulative_income.len().min(b.cumulative_income.len());
    let delta: Vec<f64> = (0..len)
        .map(|idx| b.cumulative_income[idx] - a.cumulative_income[idx])
        .collect();

    let month_index = breakeven_index(&delta)?;
    Some(BreakevenPoint {
        month_index,
        month: a.months[month_index].month,
        cumulative_income: a.cumulative_income[month_index],
    })
}

fn breakeven_index(delta: &[f64]) -> Option<usize> {
    let crosses = delta.iter().any(|d| *d <= 0.0) && delta.iter().any(|d| *d >= 0.0);
    if !crosses {
        return None;
    }

    for idx in 1..delta.len() {
        let previous = delta[idx - 1];
        let current = delta[idx];
        if (previous <= 0.0 && current > 0.0) || (previous >= 0.0 && current < 0.0) {
            return Some(idx);
        }
    }
    None
}

/// Month-by-month gap in cumulative income, B minus A, over the shared
/// horizon.
pub fn cumulative_delta(a: &SimulationResult, b: &SimulationResult) -> Vec<f64> {
    let len = a.cumulative_income.len().min(b.cumulative_income.len());
    (0..len)
        .map(|idx| b.cumulative_income[idx] - a.cumulative_income[idx])
        .collect()
}

/// Component-wise sum of two scenarios over their shared months; the
/// calendar comes from scenario A.
pub fn combine_household(a: &SimulationResult, b: &SimulationResult) -> SimulationResult {
    let len = a.months.len().min(b.months.len());

    let mut months = Vec::with_capacity(len);
    let mut cumulative_income = Vec::with_capacity(len);
    let mut running = 0.0;

    for idx in 0..len {
        let (ra, rb) = (&a.months[idx], &b.months[idx]);
        let record = MonthlyRecord {
            month: ra.month,
            salary: ra.salary + rb.salary,
            annuity: ra.annuity + rb.annuity,
            supplement: ra.supplement + rb.supplement,
            savings_withdrawal: ra.savings_withdrawal + rb.savings_withdrawal,
            social_security: ra.social_security + rb.social_security,
            health_premium: ra.health_premium + rb.health_premium,
            medicare_premium: ra.medicare_premium + rb.medicare_premium,
            total_income: ra.total_income + rb.total_income,
            balance: ra.balance + rb.balance,
            rmd: ra.rmd + rb.rmd,
        };
        running += record.total_income;
        months.push(record);
        cumulative_income.push(running);
    }

    SimulationResult {
        months,
        cumulative_income,
    }
}

/// Inflation-adjusted monthly expenses: the base amount switches at the
/// retirement date and compounds by fractional years from the first
/// month.
pub fn expense_schedule(
    months: &[NaiveDate],
    retirement_date: NaiveDate,
    pre_retirement_monthly: f64,
    post_retirement_monthly: f64,
    annual_inflation: f64,
) -> Vec<f64> {
    let Some(first) = months.first().copied() else {
        return Vec::new();
    };

    months
        .iter()
        .map(|date| {
            let base = if *date < retirement_date {
                pre_retirement_monthly
            } else {
                post_retirement_monthly
            };
            let years_from_start = f64::from(date.year() - first.year())
                + f64::from(date.month() as i32 - first.month() as i32) / 12.0;
            base * (1.0 + annual_inflation).powf(years_from_start)
        })
        .collect()
}

/// Net and cumulative cash flow of a simulation against an expense
/// schedule, truncated to the shorter of the two.
pub fn cash_flow(result: &SimulationResult, expenses: &[f64]) -> CashFlow {
    let len = result.months.len().min(expenses.len());

    let months: Vec<NaiveDate> = result.months[..len].iter().map(|r| r.month).collect();
    let expenses = expenses[..len].to_vec();
    let net: Vec<f64> = result.months[..len]
        .iter()
        .zip(&expenses)
        .map(|(record, expense)| record.total_income - expense)
        .collect();

    let mut cumulative = Vec::with_capacity(len);
    let mut running = 0.0;
    for value in &net {
        running += value;
        cumulative.push(running);
    }

    CashFlow {
        months,
        expenses,
        net,
        cumulative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn result_from_cumulative(cumulative: Vec<f64>) -> SimulationResult {
        let months = cumulative
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                let month = date(2025, 1 + idx as u32, 1);
                MonthlyRecord {
                    month,
                    salary: 0.0,
                    annuity: 0.0,
                    supplement: 0.0,
                    savings_withdrawal: 0.0,
                    social_security: 0.0,
                    health_premium: 0.0,
                    medicare_premium: 0.0,
                    total_income: 0.0,
                    balance: 0.0,
                    rmd: 0.0,
                }
            })
            .collect();
        SimulationResult {
            months,
            cumulative_income: cumulative,
        }
    }

    #[test]
    fn breakeven_finds_the_first_sign_flip() {
        let a = result_from_cumulative(vec![100.0, 200.0, 300.0, 400.0]);
        let b = result_from_cumulative(vec![50.0, 180.0, 320.0, 500.0]);

        let point = breakeven(&a, &b).expect("crossing exists");
        assert_eq!(point.month_index, 2);
        assert_eq!(point.month, date(2025, 3, 1));
        assert!((point.cumulative_income - 300.0).abs() <= 1e-9);
    }

    #[test]
    fn breakeven_detects_a_downward_crossing() {
        let a = result_from_cumulative(vec![50.0, 180.0, 320.0, 500.0]);
        let b = result_from_cumulative(vec![100.0, 200.0, 300.0, 400.0]);

        let point = breakeven(&a, &b).expect("crossing exists");
        assert_eq!(point.month_index, 2);
    }

    #[test]
    fn breakeven_is_none_when_one_scenario_always_leads() {
        let a = result_from_cumulative(vec![100.0, 200.0, 300.0]);
        let b = result_from_cumulative(vec![150.0, 280.0, 420.0]);
        assert!(breakeven(&a, &b).is_none());
    }

    #[test]
    fn breakeven_truncates_to_the_shared_horizon() {
        let a = result_from_cumulative(vec![100.0, 200.0]);
        let b = result_from_cumulative(vec![50.0, 250.0, 900.0, 1_200.0]);

        let point = breakeven(&a, &b).expect("crossing inside overlap");
        assert_eq!(point.month_index, 1);
    }

    #[test]
    fn cumulative_delta_is_b_minus_a() {
        let a = result_from_cumulative(vec![100.0, 200.0, 300.0]);
        let b = result_from_cumulative(vec![50.0, 180.0, 320.0]);
        assert_eq!(cumulative_delta(&a, &b), vec![-50.0, -20.0, 20.0]);
    }

    fn record(month: NaiveDate, salary: f64, annuity: f64, premium: f64) -> MonthlyRecord {
        MonthlyRecord {
            month,
            salary,
            annuity,
            supplement: 0.0,
            savings_withdrawal: 0.0,
            social_security: 0.0,
            health_premium: premium,
            medicare_premium: 0.0,
            total_income: salary + annuity + premium,
            balance: 1_000.0,
            rmd: 0.0,
        }
    }

    #[test]
    fn combine_household_sums_every_component() {
        let m = date(2025, 1, 1);
        let a = SimulationResult {
            months: vec![record(m, 4_000.0, 0.0, -100.0)],
            cumulative_income: vec![3_900.0],
        };
        let b = SimulationResult {
            months: vec![record(m, 0.0, 2_500.0, -200.0)],
            cumulative_income: vec![2_300.0],
        };

        let combined = combine_household(&a, &b);
        assert_eq!(combined.months.len(), 1);
        let joint = &combined.months[0];
        assert!((joint.salary - 4_000.0).abs() <= 1e-9);
        assert!((joint.annuity - 2_500.0).abs() <= 1e-9);
        assert!((joint.health_premium + 300.0).abs() <= 1e-9);
        assert!((joint.total_income - 6_200.0).abs() <= 1e-9);
        assert!((joint.balance - 2_000.0).abs() <= 1e-9);
        assert!((combined.cumulative_income[0] - 6_200.0).abs() <= 1e-9);
    }

    #[test]
    fn combine_household_truncates_to_the_shared_months() {
        let a = result_from_cumulative(vec![1.0, 2.0, 3.0]);
        let b = result_from_cumulative(vec![1.0]);
        assert_eq!(combine_household(&a, &b).months.len(), 1);
    }

    #[test]
    fn expense_schedule_switches_base_at_retirement_and_inflates() {
        let months = vec![
            date(2025, 1, 1),
            date(2025, 6, 1),
            date(2025, 7, 1),
            date(2026, 1, 1),
        ];
        let schedule = expense_schedule(&months, date(2025, 7, 1), 5_000.0, 4_000.0, 0.03);

        assert!((schedule[0] - 5_000.0).abs() <= 1e-9);
        assert!((schedule[1] - 5_000.0 * 1.03f64.powf(5.0 / 12.0)).abs() <= 1e-6);
        assert!((schedule[2] - 4_000.0 * 1.03f64.powf(6.0 / 12.0)).abs() <= 1e-6);
        assert!((schedule[3] - 4_000.0 * 1.03).abs() <= 1e-6);
    }

    #[test]
    fn cash_flow_cumulates_income_minus_expenses() {
        let m1 = date(2025, 1, 1);
        let m2 = date(2025, 2, 1);
        let result = SimulationResult {
            months: vec![record(m1, 5_000.0, 0.0, 0.0), record(m2, 5_000.0, 0.0, 0.0)],
            cumulative_income: vec![5_000.0, 10_000.0],
        };

        let flow = cash_flow(&result, &[4_000.0, 6_000.0]);
        assert_eq!(flow.net, vec![1_000.0, -1_000.0]);
        assert_eq!(flow.cumulative, vec![1_000.0, 0.0]);
    }
}

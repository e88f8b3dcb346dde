use chrono::{Datelike, NaiveDate};

use super::types::FundAllocation;

pub const MEDICARE_PART_B_PREMIUM: f64 = 174.70;
pub const MEDICARE_PART_D_PREMIUM: f64 = 35.00;

const FULL_RETIREMENT_AGE: u32 = 67;

// 174 paid hours convert to one credited month of service.
const SICK_LEAVE_HOURS_PER_MONTH: f64 = 174.0;

// Historical average fund returns: G, F, C, S, I.
const FUND_RETURNS: [f64; 5] = [0.025, 0.035, 0.07, 0.08, 0.065];

// Uniform lifetime divisors for ages 73..=120.
const LIFE_EXPECTANCY_FACTORS: [f64; 48] = [
    26.5, 25.5, 24.6, 23.7, 22.9, 22.0, 21.1, 20.2, 19.4, 18.5, 17.7, 16.8, 16.0, 15.2, 14.4,
    13.7, 12.9, 12.2, 11.5, 10.8, 10.1, 9.5, 8.9, 8.4, 7.8, 7.3, 6.8, 6.4, 6.0, 5.6, 5.2, 4.9,
    4.6, 4.3, 4.1, 3.9, 3.7, 3.5, 3.4, 3.3, 3.1, 3.0, 2.9, 2.8, 2.7, 2.5, 2.3, 2.0,
];

const FALLBACK_LIFE_EXPECTANCY: f64 = 15.0;

fn statement_benefit(claim_age: u32) -> f64 {
    match claim_age {
        62 => 2_795.0,
        63 => 2_985.0,
        64 => 3_191.0,
        65 => 3_464.0,
        66 => 3_738.0,
        67 => 4_012.0,
        68 => 4_314.0,
        69 => 4_643.0,
        70 => 5_000.0,
        _ => 4_012.0,
    }
}

/// Monthly Social Security benefit for a claiming age. With no override
/// the fixed statement table applies; an explicit base benefit (stated at
/// full retirement age 67) is adjusted actuarially: 5/9% per month for the
/// first 36 months early, 5/12% per month beyond that, +8% per year
/// delayed.
pub fn social_security_benefit(claim_age: u32, base_benefit: Option<f64>) -> f64 {
    let Some(base) = base_benefit else {
        return statement_benefit(claim_age);
    };

    if claim_age < FULL_RETIREMENT_AGE {
        let months_early = (FULL_RETIREMENT_AGE - claim_age) * 12;
        let reduction = if months_early <= 36 {
            f64::from(months_early) * (5.0 / 9.0) / 100.0
        } else {
            36.0 * (5.0 / 9.0) / 100.0 + f64::from(months_early - 36) * (5.0 / 12.0) / 100.0
        };
        base * (1.0 - reduction)
    } else if claim_age > FULL_RETIREMENT_AGE {
        let years_delayed = f64::from(claim_age - FULL_RETIREMENT_AGE);
        base * (1.0 + years_delayed * 0.08)
    } else {
        base
    }
}

/// Supplemental annuity bridging retirement to age 62: each year of
/// service earns 1/40th of the age-62 benefit, capped at 40 years.
pub fn fers_supplement(service_years: f64, age62_benefit: f64) -> f64 {
    let service_factor = service_years.min(40.0) / 40.0;
    age62_benefit * service_factor
}

/// Monthly required minimum distribution; zero before age 73.
pub fn monthly_rmd(age: i32, balance: f64) -> f64 {
    if age < 73 {
        return 0.0;
    }

    let factor = usize::try_from(age - 73)
        .ok()
        .and_then(|idx| LIFE_EXPECTANCY_FACTORS.get(idx).copied())
        .unwrap_or(FALLBACK_LIFE_EXPECTANCY);

    balance / factor / 12.0
}

/// Weighted growth rate across the five funds.
pub fn weighted_fund_growth(allocation: &FundAllocation) -> f64 {
    let weights = [
        allocation.g_fund_pct,
        allocation.f_fund_pct,
        allocation.c_fund_pct,
        allocation.s_fund_pct,
        allocation.i_fund_pct,
    ];

    weights
        .iter()
        .zip(FUND_RETURNS.iter())
        .map(|(pct, ret)| pct / 100.0 * ret)
        .sum()
}

/// Credited service in fractional years: whole months between the dates
/// plus sick-leave hours converted at 174 hours per credited month.
pub fn service_years(start: NaiveDate, end: NaiveDate, sick_leave_hours: f64) -> f64 {
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let sick_leave_months = sick_leave_hours / SICK_LEAVE_HOURS_PER_MONTH;
    f64::from(months) / 12.0 + sick_leave_months / 12.0
}

/// Whole years of age on a given date, month/day aware.
pub fn age_at(birth_date: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn statement_table_covers_claim_ages_and_defaults_to_67() {
        assert_approx(social_security_benefit(62, None), 2_795.0, 1e-9);
        assert_approx(social_security_benefit(70, None), 5_000.0, 1e-9);
        assert_approx(social_security_benefit(75, None), 4_012.0, 1e-9);
    }

    #[test]
    fn override_base_reduces_five_ninths_per_early_month() {
        // 24 months early: 24 * 5/9 % = 13.333...%
        let expected = 3_000.0 * (1.0 - 24.0 * (5.0 / 9.0) / 100.0);
        assert_approx(social_security_benefit(65, Some(3_000.0)), expected, 1e-6);
    }

    #[test]
    fn override_base_beyond_36_months_uses_five_twelfths() {
        // Age 62 is 60 months early: 36 at 5/9% plus 24 at 5/12%.
        let reduction = 36.0 * (5.0 / 9.0) / 100.0 + 24.0 * (5.0 / 12.0) / 100.0;
        let expected = 3_000.0 * (1.0 - reduction);
        assert_approx(social_security_benefit(62, Some(3_000.0)), expected, 1e-6);
    }

    #[test]
    fn override_base_grows_eight_percent_per_delayed_year() {
        assert_approx(
            social_security_benefit(70, Some(3_000.0)),
            3_000.0 * 1.24,
            1e-6,
        );
        assert_approx(social_security_benefit(67, Some(3_000.0)), 3_000.0, 1e-9);
    }

    #[test]
    fn supplement_scales_with_service_and_caps_at_forty_years() {
        assert_approx(fers_supplement(20.0, 2_795.0), 2_795.0 * 0.5, 1e-9);
        assert_approx(fers_supplement(50.0, 2_795.0), 2_795.0, 1e-9);
        assert_approx(fers_supplement(0.0, 2_795.0), 0.0, 1e-12);
    }

    #[test]
    fn rmd_is_zero_before_seventy_three() {
        assert_approx(monthly_rmd(72, 1_000_000.0), 0.0, 1e-12);
        assert_approx(monthly_rmd(30, 1_000_000.0), 0.0, 1e-12);
    }

    #[test]
    fn rmd_at_seventy_three_divides_by_26_5() {
        assert_approx(monthly_rmd(73, 265_000.0), 265_000.0 / 26.5 / 12.0, 1e-9);
        assert_approx(monthly_rmd(73, 265_000.0), 833.33, 1e-2);
    }

    #[test]
    fn rmd_divisors_shrink_with_age() {
        let balance = 500_000.0;
        let mut last = monthly_rmd(73, balance);
        for age in 74..=120 {
            let current = monthly_rmd(age, balance);
            assert!(current > last, "divisor must shrink at age {age}");
            last = current;
        }
    }

    #[test]
    fn rmd_past_table_end_uses_fallback_factor() {
        assert_approx(
            monthly_rmd(121, 180_000.0),
            180_000.0 / FALLBACK_LIFE_EXPECTANCY / 12.0,
            1e-9,
        );
    }

    #[test]
    fn weighted_fund_growth_blends_the_five_funds() {
        let all_g = FundAllocation {
            g_fund_pct: 100.0,
            f_fund_pct: 0.0,
            c_fund_pct: 0.0,
            s_fund_pct: 0.0,
            i_fund_pct: 0.0,
        };
        assert_approx(weighted_fund_growth(&all_g), 0.025, 1e-12);

        let mixed = FundAllocation {
            g_fund_pct: 20.0,
            f_fund_pct: 20.0,
            c_fund_pct: 20.0,
            s_fund_pct: 20.0,
            i_fund_pct: 20.0,
        };
        let expected = 0.2 * (0.025 + 0.035 + 0.07 + 0.08 + 0.065);
        assert_approx(weighted_fund_growth(&mixed), expected, 1e-12);
    }

    #[test]
    fn service_years_counts_whole_months_and_sick_leave() {
        let years = service_years(date(1987, 6, 22), date(2025, 8, 1), 0.0);
        let expected_months = (2025 - 1987) * 12 + 8 - 6;
        assert_approx(years, f64::from(expected_months) / 12.0, 1e-9);

        // 1,044 hours is six credited months.
        let with_leave = service_years(date(1987, 6, 22), date(2025, 8, 1), 1_044.0);
        assert_approx(with_leave - years, 0.5, 1e-9);
    }

    #[test]
    fn age_counts_whole_years_only_after_the_birthday() {
        let birth = date(1965, 2, 25);
        assert_eq!(age_at(birth, date(2027, 2, 24)), 61);
        assert_eq!(age_at(birth, date(2027, 2, 25)), 62);
        assert_eq!(age_at(birth, date(2027, 3, 1)), 62);
    }
}

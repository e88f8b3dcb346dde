use super::types::FilingStatus;

pub const STATE_FLAT_RATE: f64 = 0.03;

// 2024 brackets as (floor, ceiling, marginal rate).
const SINGLE_BRACKETS: [(f64, f64, f64); 7] = [
    (0.0, 11_600.0, 0.10),
    (11_600.0, 47_150.0, 0.12),
    (47_150.0, 100_525.0, 0.22),
    (100_525.0, 191_950.0, 0.24),
    (191_950.0, 243_725.0, 0.32),
    (243_725.0, 609_350.0, 0.35),
    (609_350.0, f64::INFINITY, 0.37),
];

const MARRIED_BRACKETS: [(f64, f64, f64); 7] = [
    (0.0, 23_200.0, 0.10),
    (23_200.0, 94_300.0, 0.12),
    (94_300.0, 201_050.0, 0.22),
    (201_050.0, 383_900.0, 0.24),
    (383_900.0, 487_450.0, 0.32),
    (487_450.0, 731_200.0, 0.35),
    (731_200.0, f64::INFINITY, 0.37),
];

/// Progressive federal tax on annual income via marginal bracket
/// integration.
pub fn federal_tax(annual_income: f64, filing_status: FilingStatus) -> f64 {
    let brackets = match filing_status {
        FilingStatus::Single => &SINGLE_BRACKETS,
        FilingStatus::Married => &MARRIED_BRACKETS,
    };

    let mut tax = 0.0;
    for (floor, ceiling, rate) in brackets {
        if annual_income > *floor {
            tax += (annual_income.min(*ceiling) - floor) * rate;
        }
    }
    tax
}

/// Flat state tax; exempt residents owe nothing. Extension point for
/// other jurisdictions.
pub fn state_tax(tax_exempt_resident: bool, income: f64) -> f64 {
    if tax_exempt_resident {
        return 0.0;
    }
    income * STATE_FLAT_RATE
}

/// Effective monthly rate for a progressively-taxed annual income.
pub fn effective_monthly_rate(annual_income: f64, filing_status: FilingStatus) -> f64 {
    if annual_income <= 0.0 {
        return 0.0;
    }
    federal_tax(annual_income, filing_status) / annual_income
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn federal_tax_single_50k_matches_bracket_arithmetic() {
        // 0-11,600 @10%, 11,600-47,150 @12%, 47,150-50,000 @22%
        let expected = 11_600.0 * 0.10 + 35_550.0 * 0.12 + 2_850.0 * 0.22;
        assert_approx(federal_tax(50_000.0, FilingStatus::Single), expected, 1e-2);
        assert_approx(federal_tax(50_000.0, FilingStatus::Single), 6_053.0, 1e-2);
    }

    #[test]
    fn federal_tax_is_zero_at_zero_income() {
        assert_approx(federal_tax(0.0, FilingStatus::Single), 0.0, 1e-12);
        assert_approx(federal_tax(0.0, FilingStatus::Married), 0.0, 1e-12);
    }

    #[test]
    fn federal_tax_married_widens_the_lower_brackets() {
        let single = federal_tax(100_000.0, FilingStatus::Single);
        let married = federal_tax(100_000.0, FilingStatus::Married);
        assert!(married < single);
    }

    #[test]
    fn federal_tax_top_bracket_applies_marginally() {
        let income = 700_000.0;
        let below = federal_tax(609_350.0, FilingStatus::Single);
        let expected = below + (income - 609_350.0) * 0.37;
        assert_approx(federal_tax(income, FilingStatus::Single), expected, 1e-6);
    }

    #[test]
    fn state_tax_exempt_resident_owes_nothing() {
        assert_approx(state_tax(true, 100_000.0), 0.0, 1e-12);
        assert_approx(state_tax(false, 100_000.0), 3_000.0, 1e-9);
    }

    #[test]
    fn effective_monthly_rate_is_average_not_marginal() {
        let rate = effective_monthly_rate(50_000.0, FilingStatus::Single);
        assert_approx(rate, 6_053.0 / 50_000.0, 1e-6);
        assert_approx(effective_monthly_rate(0.0, FilingStatus::Single), 0.0, 1e-12);
    }
}

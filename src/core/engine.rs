use std::panic::{AssertUnwindSafe, catch_unwind};

use super::tables;
use super::types::{
    AcaDetail, BracketDistance, BracketTier, BracketType, CapitalGainsDetail, FilingStatus,
    IrmaaDetail, ScenarioSnapshot, Severity, SocialSecurityDetail, TaxTrapResult, TaxTrapWarning,
    TrapDetails, TrapType,
};

/// Marginal rate assumed when pricing the Social Security warning. A fixed
/// simplification carried over from the source planner; feeding the
/// scenario's actual marginal rate instead would reorder all impact-sorted
/// output.
pub const SS_IMPACT_MARGINAL_RATE: f64 = 0.22;

/// Distance to the next LTCG tier below which the capital gains rule warns.
pub const CAPITAL_GAINS_WATCH_DISTANCE: f64 = 25_000.0;

/// The ACA rule only speaks up near the 400% FPL cliff; the window bounds
/// are UI calibration, not derived from the subsidy formula.
pub const ACA_RISK_WINDOW_MIN_FPL_PCT: f64 = 360.0;
pub const ACA_RISK_WINDOW_MAX_FPL_PCT: f64 = 410.0;
pub const ACA_CLIFF_FPL_PCT: f64 = 400.0;

/// Marginal tier-by-tier stacking over an explicit tier slice: each tier
/// taxes only the portion of income that falls inside it. Negative income
/// is treated as no income.
pub fn tax_from_tiers(income: f64, tiers: &[BracketTier]) -> f64 {
    let income = income.max(0.0);
    let mut tax = 0.0;
    for tier in tiers {
        if income <= tier.min {
            break;
        }
        let taxed_in_tier = (income.min(tier.max) - tier.min).max(0.0);
        tax += taxed_in_tier * tier.rate;
    }
    tax
}

pub fn calculate_tax(income: f64, year: u32, status: FilingStatus) -> f64 {
    tax_from_tiers(
        income,
        tables::get_brackets(year, status, BracketType::Ordinary),
    )
}

pub fn effective_rate(tax: f64, income: f64) -> f64 {
    if income <= 0.0 { 0.0 } else { tax / income }
}

/// Where the next ordinary-income bracket begins and how far away it is.
/// A tier boundary belongs to the upper tier, so an income sitting exactly
/// on one reports the boundary after it.
pub fn distance_to_next_bracket(income: f64, year: u32, status: FilingStatus) -> BracketDistance {
    let income = income.max(0.0);
    let tiers = tables::get_brackets(year, status, BracketType::Ordinary);
    for tier in tiers {
        if income < tier.max {
            if tier.max.is_finite() {
                return BracketDistance {
                    next_threshold: tier.max,
                    distance: tier.max - income,
                };
            }
            break;
        }
    }
    BracketDistance {
        next_threshold: f64::INFINITY,
        distance: f64::INFINITY,
    }
}

/// Sizes a Roth conversion that fills `fill_percent` of the headroom left in
/// the current ordinary bracket. In the unbounded top tier there is no
/// ceiling to respect and the full balance is available.
pub fn size_conversion(
    current_income: f64,
    year: u32,
    status: FilingStatus,
    fill_percent: f64,
    available_balance: f64,
) -> f64 {
    let balance = available_balance.max(0.0);
    let fill = fill_percent.clamp(0.0, 100.0);
    let next = distance_to_next_bracket(current_income, year, status);
    if !next.next_threshold.is_finite() {
        return balance;
    }
    (next.distance * fill / 100.0).min(balance)
}

pub fn evaluate_irmaa(scenario: &ScenarioSnapshot) -> Option<(TaxTrapWarning, IrmaaDetail)> {
    if !scenario.medicare_enrolled {
        return None;
    }
    let magi = scenario.magi.max(0.0);
    let tiers = tables::irmaa_tiers(scenario.tax_year, scenario.filing_status);
    let tier = tiers
        .iter()
        .find(|tier| magi >= tier.magi_min && magi < tier.magi_max)?;
    let monthly_surcharge = tier.part_b_monthly + tier.part_d_monthly;
    if monthly_surcharge <= 0.0 {
        return None;
    }

    let annual_impact = monthly_surcharge * 12.0;
    let severity = if annual_impact > 3_000.0 {
        Severity::High
    } else {
        Severity::Medium
    };
    let warning = TaxTrapWarning {
        trap_type: TrapType::Irmaa,
        severity,
        title: "Medicare premium surcharge (IRMAA)".to_string(),
        description: format!(
            "MAGI of ${magi:.0} triggers an extra ${:.2}/month for Part B and ${:.2}/month for Part D.",
            tier.part_b_monthly, tier.part_d_monthly
        ),
        estimated_annual_impact: annual_impact,
    };
    let detail = IrmaaDetail {
        magi,
        tier_min: tier.magi_min,
        tier_max: tier.magi_max.is_finite().then_some(tier.magi_max),
        part_b_monthly: tier.part_b_monthly,
        part_d_monthly: tier.part_d_monthly,
        annual_surcharge: annual_impact,
    };
    Some((warning, detail))
}

pub fn evaluate_capital_gains(
    scenario: &ScenarioSnapshot,
) -> Option<(TaxTrapWarning, CapitalGainsDetail)> {
    let gains = scenario.long_term_capital_gains;
    if gains <= 0.0 {
        return None;
    }
    let taxable = scenario.taxable_income.max(0.0);
    let tiers = tables::get_brackets(
        scenario.tax_year,
        scenario.filing_status,
        BracketType::LongTermCapitalGains,
    );
    let index = tiers
        .iter()
        .position(|tier| taxable < tier.max)
        .unwrap_or(tiers.len() - 1);
    let current = tiers[index];
    // Already at the top preferential rate: no higher tier to cross into.
    let next = tiers.get(index + 1)?;

    let distance = next.min - taxable;
    if distance >= CAPITAL_GAINS_WATCH_DISTANCE {
        return None;
    }

    let next_rate = if current.rate == 0.0 { 0.15 } else { 0.20 };
    let projected_increase = gains * (next_rate - current.rate);
    let warning = TaxTrapWarning {
        trap_type: TrapType::CapitalGains,
        severity: Severity::Medium,
        title: "Close to a higher capital gains rate".to_string(),
        description: format!(
            "Taxable income is ${distance:.0} below the {:.0}% long-term capital gains tier.",
            next_rate * 100.0
        ),
        estimated_annual_impact: projected_increase,
    };
    let detail = CapitalGainsDetail {
        taxable_income: taxable,
        current_rate: current.rate,
        next_rate,
        next_tier_min: next.min,
        distance_to_next_tier: distance,
        projected_tax_increase: projected_increase,
    };
    Some((warning, detail))
}

/// IRS two-threshold worksheet, each component floored at zero and the total
/// capped at 85% of benefits.
fn taxable_social_security(
    benefits: f64,
    provisional_income: f64,
    thresholds: tables::SocialSecurityThresholds,
) -> f64 {
    if provisional_income <= thresholds.lower {
        return 0.0;
    }
    if provisional_income <= thresholds.upper {
        return (0.5 * benefits)
            .min(0.5 * (provisional_income - thresholds.lower))
            .max(0.0);
    }
    let base = (0.5 * benefits)
        .min(0.5 * (thresholds.upper - thresholds.lower))
        .max(0.0);
    let additional = (0.85 * benefits - base)
        .min(0.85 * (provisional_income - thresholds.upper))
        .max(0.0);
    (base + additional).min(0.85 * benefits)
}

pub fn evaluate_social_security(
    scenario: &ScenarioSnapshot,
) -> Option<(TaxTrapWarning, SocialSecurityDetail)> {
    let benefits = scenario.social_security_amount;
    if benefits <= 0.0 {
        return None;
    }
    let thresholds = tables::social_security_thresholds(scenario.filing_status);
    let other_income = scenario.total_income - benefits;
    let provisional_income = other_income + 0.5 * benefits;
    let taxable_benefits = taxable_social_security(benefits, provisional_income, thresholds);
    let taxable_percent = taxable_benefits / benefits * 100.0;
    if taxable_percent <= 50.0 {
        return None;
    }

    let severity = if taxable_percent > 80.0 {
        Severity::High
    } else {
        Severity::Medium
    };
    let annual_impact = taxable_benefits * SS_IMPACT_MARGINAL_RATE;
    let warning = TaxTrapWarning {
        trap_type: TrapType::SocialSecurity,
        severity,
        title: "Social Security benefits heavily taxed".to_string(),
        description: format!(
            "Provisional income of ${provisional_income:.0} makes {taxable_percent:.0}% of benefits taxable."
        ),
        estimated_annual_impact: annual_impact,
    };
    let detail = SocialSecurityDetail {
        provisional_income,
        lower_threshold: thresholds.lower,
        upper_threshold: thresholds.upper,
        taxable_benefits,
        taxable_percent,
        assumed_marginal_rate: SS_IMPACT_MARGINAL_RATE,
    };
    Some((warning, detail))
}

fn estimated_annual_subsidy(income: f64, fpl_percent: f64, household_size: u32) -> f64 {
    let applicable_percent = tables::aca_applicable_percent(fpl_percent);
    let benchmark = tables::ACA_BENCHMARK_BASE_ANNUAL
        + tables::ACA_BENCHMARK_PER_MEMBER_ANNUAL * (household_size.max(1) - 1) as f64;
    (benchmark - income * applicable_percent / 100.0).max(0.0)
}

pub fn evaluate_aca(scenario: &ScenarioSnapshot) -> Option<(TaxTrapWarning, AcaDetail)> {
    if !scenario.aca_enrolled {
        return None;
    }
    let income = scenario.magi.max(0.0);
    let fpl = tables::household_fpl(scenario.tax_year, scenario.household_size);
    if fpl <= 0.0 {
        return None;
    }
    let fpl_percent = income / fpl * 100.0;
    if !(ACA_RISK_WINDOW_MIN_FPL_PCT..=ACA_RISK_WINDOW_MAX_FPL_PCT).contains(&fpl_percent) {
        return None;
    }

    let cliff_income = fpl * ACA_CLIFF_FPL_PCT / 100.0;
    let distance_to_cliff = cliff_income - income;
    // Unlike the other rules this impact is the whole subsidy at stake, not
    // a marginal delta.
    let subsidy = estimated_annual_subsidy(income, fpl_percent, scenario.household_size);
    let (severity, title, description) = if distance_to_cliff > 0.0 {
        (
            Severity::Medium,
            "Approaching the ACA subsidy cliff".to_string(),
            format!(
                "Income is ${distance_to_cliff:.0} below 400% of the federal poverty level; crossing it forfeits the subsidy."
            ),
        )
    } else {
        (
            Severity::High,
            "Over the ACA subsidy cliff".to_string(),
            format!(
                "Income exceeds 400% of the federal poverty level by ${:.0}; the subsidy is forfeited.",
                -distance_to_cliff
            ),
        )
    };
    let warning = TaxTrapWarning {
        trap_type: TrapType::Aca,
        severity,
        title,
        description,
        estimated_annual_impact: subsidy,
    };
    let detail = AcaDetail {
        fpl_percent,
        cliff_income,
        distance_to_cliff,
        estimated_annual_subsidy: subsidy,
    };
    Some((warning, detail))
}

/// A rule that panics degrades to "no warning from this rule" instead of
/// taking the other rules down with it.
fn isolated<T>(rule: impl FnOnce() -> Option<T>) -> Option<T> {
    catch_unwind(AssertUnwindSafe(rule)).unwrap_or(None)
}

/// Runs every applicable rule, collects warnings, and sorts them by
/// descending estimated annual impact.
pub fn evaluate_traps(scenario_id: &str, scenario: &ScenarioSnapshot) -> TaxTrapResult {
    let mut warnings = Vec::new();
    let mut details = TrapDetails::default();

    if let Some((warning, detail)) = isolated(|| evaluate_irmaa(scenario)) {
        warnings.push(warning);
        details.irmaa = Some(detail);
    }
    if let Some((warning, detail)) = isolated(|| evaluate_capital_gains(scenario)) {
        warnings.push(warning);
        details.capital_gains = Some(detail);
    }
    if let Some((warning, detail)) = isolated(|| evaluate_social_security(scenario)) {
        warnings.push(warning);
        details.social_security = Some(detail);
    }
    if let Some((warning, detail)) = isolated(|| evaluate_aca(scenario)) {
        warnings.push(warning);
        details.aca = Some(detail);
    }

    warnings.sort_by(|a, b| {
        b.estimated_annual_impact
            .total_cmp(&a.estimated_annual_impact)
    });

    TaxTrapResult {
        scenario_id: scenario_id.to_string(),
        warnings,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_scenario() -> ScenarioSnapshot {
        ScenarioSnapshot {
            tax_year: 2023,
            filing_status: FilingStatus::Single,
            agi: 150_000.0,
            magi: 150_000.0,
            total_income: 150_000.0,
            taxable_income: 136_150.0,
            long_term_capital_gains: 0.0,
            short_term_capital_gains: 0.0,
            social_security_amount: 0.0,
            household_size: 1,
            medicare_enrolled: false,
            aca_enrolled: false,
        }
    }

    #[test]
    fn tax_stacks_progressively_across_tiers() {
        let tiers = [
            BracketTier { min: 0.0, max: 10_000.0, rate: 0.10 },
            BracketTier { min: 10_000.0, max: 50_000.0, rate: 0.12 },
        ];
        // 10% of the first 10k plus 12% of the next 20k, not 12% of all 30k.
        assert_approx(tax_from_tiers(30_000.0, &tiers), 3_400.0);
    }

    #[test]
    fn tax_on_boundary_income_taxes_lower_tiers_in_full() {
        let tiers = [
            BracketTier { min: 0.0, max: 10_000.0, rate: 0.10 },
            BracketTier { min: 10_000.0, max: f64::INFINITY, rate: 0.12 },
        ];
        assert_approx(tax_from_tiers(10_000.0, &tiers), 1_000.0);
    }

    #[test]
    fn negative_income_is_treated_as_zero() {
        assert_approx(calculate_tax(-5_000.0, 2023, FilingStatus::Single), 0.0);
    }

    #[test]
    fn calculate_tax_matches_published_2023_single_brackets() {
        assert_approx(calculate_tax(11_000.0, 2023, FilingStatus::Single), 1_100.0);
        // 1,100 + 12% of (44,725 - 11,000) = 5,147
        assert_approx(calculate_tax(44_725.0, 2023, FilingStatus::Single), 5_147.0);
    }

    #[test]
    fn effective_rate_is_zero_for_non_positive_income() {
        assert_approx(effective_rate(1_234.0, 0.0), 0.0);
        assert_approx(effective_rate(1_234.0, -10.0), 0.0);
        assert_approx(effective_rate(5_000.0, 50_000.0), 0.10);
    }

    #[test]
    fn top_bracket_distance_is_infinite() {
        let distance = distance_to_next_bracket(1_000_000.0, 2023, FilingStatus::Single);
        assert!(distance.next_threshold.is_infinite());
        assert!(distance.distance.is_infinite());
    }

    #[test]
    fn boundary_income_belongs_to_the_upper_tier() {
        let distance = distance_to_next_bracket(11_000.0, 2023, FilingStatus::Single);
        assert_approx(distance.next_threshold, 44_725.0);
        assert_approx(distance.distance, 33_725.0);
    }

    #[test]
    fn conversion_fills_requested_share_of_bracket_headroom() {
        // Single 2023, income 40,000: next threshold 44,725, headroom 4,725.
        let sized = size_conversion(40_000.0, 2023, FilingStatus::Single, 100.0, 1_000_000.0);
        assert_approx(sized, 4_725.0);
        let half = size_conversion(40_000.0, 2023, FilingStatus::Single, 50.0, 1_000_000.0);
        assert_approx(half, 2_362.5);
    }

    #[test]
    fn conversion_is_capped_by_available_balance() {
        let sized = size_conversion(40_000.0, 2023, FilingStatus::Single, 100.0, 1_500.0);
        assert_approx(sized, 1_500.0);
    }

    #[test]
    fn conversion_in_top_bracket_returns_full_balance() {
        let sized = size_conversion(700_000.0, 2023, FilingStatus::Single, 10.0, 80_000.0);
        assert_approx(sized, 80_000.0);
    }

    #[test]
    fn irmaa_rule_requires_medicare_enrollment() {
        let scenario = sample_scenario();
        assert!(evaluate_irmaa(&scenario).is_none());
    }

    #[test]
    fn irmaa_rule_stays_quiet_below_first_surcharge_tier() {
        let mut scenario = sample_scenario();
        scenario.medicare_enrolled = true;
        scenario.magi = 90_000.0;
        assert!(evaluate_irmaa(&scenario).is_none());
    }

    #[test]
    fn irmaa_high_severity_above_impact_cutoff() {
        let mut scenario = sample_scenario();
        scenario.medicare_enrolled = true;
        scenario.magi = 200_000.0;
        let (warning, _) = evaluate_irmaa(&scenario).expect("tier 5 surcharge");
        assert_eq!(warning.severity, Severity::High);
        assert_approx(warning.estimated_annual_impact, (362.60 + 70.00) * 12.0);
    }

    #[test]
    fn capital_gains_rule_requires_gains() {
        let mut scenario = sample_scenario();
        scenario.taxable_income = 540_000.0;
        scenario.filing_status = FilingStatus::MarriedJoint;
        assert!(evaluate_capital_gains(&scenario).is_none());
    }

    #[test]
    fn capital_gains_quiet_when_next_tier_is_far() {
        // Joint, taxable 500k sits 53,850 below the 20% tier, beyond the
        // watch distance.
        let mut scenario = sample_scenario();
        scenario.filing_status = FilingStatus::MarriedJoint;
        scenario.taxable_income = 500_000.0;
        scenario.long_term_capital_gains = 50_000.0;
        assert!(evaluate_capital_gains(&scenario).is_none());
    }

    #[test]
    fn capital_gains_warns_near_tier_boundary() {
        let mut scenario = sample_scenario();
        scenario.filing_status = FilingStatus::MarriedJoint;
        scenario.taxable_income = 540_000.0;
        scenario.long_term_capital_gains = 50_000.0;
        let (warning, detail) = evaluate_capital_gains(&scenario).expect("within 25k of 20% tier");
        assert_eq!(warning.severity, Severity::Medium);
        assert_approx(detail.distance_to_next_tier, 13_850.0);
        assert_approx(detail.current_rate, 0.15);
        assert_approx(detail.next_rate, 0.20);
        assert_approx(warning.estimated_annual_impact, 50_000.0 * 0.05);
    }

    #[test]
    fn capital_gains_zero_rate_tier_projects_fifteen_percent() {
        let mut scenario = sample_scenario();
        scenario.taxable_income = 40_000.0;
        scenario.long_term_capital_gains = 10_000.0;
        let (warning, detail) = evaluate_capital_gains(&scenario).expect("4,625 below 15% tier");
        assert_approx(detail.current_rate, 0.0);
        assert_approx(detail.next_rate, 0.15);
        assert_approx(warning.estimated_annual_impact, 1_500.0);
    }

    #[test]
    fn capital_gains_silent_in_top_preferential_tier() {
        let mut scenario = sample_scenario();
        scenario.taxable_income = 600_000.0;
        scenario.long_term_capital_gains = 100_000.0;
        assert!(evaluate_capital_gains(&scenario).is_none());
    }

    #[test]
    fn taxable_social_security_follows_two_threshold_worksheet() {
        let thresholds = tables::social_security_thresholds(FilingStatus::Single);
        // Below the lower threshold nothing is taxable.
        assert_approx(taxable_social_security(10_000.0, 15_000.0, thresholds), 0.0);
        // Between the thresholds: min(50% of benefits, 50% of the excess).
        assert_approx(
            taxable_social_security(10_000.0, 30_000.0, thresholds),
            2_500.0,
        );
        // Above the upper threshold the 85% tier applies on top of the base.
        assert_approx(
            taxable_social_security(20_000.0, 70_000.0, thresholds),
            17_000.0,
        );
        // Cap at 85% of benefits.
        assert_approx(
            taxable_social_security(20_000.0, 500_000.0, thresholds),
            17_000.0,
        );
    }

    #[test]
    fn separate_filers_always_have_taxable_benefits() {
        // threshold1 = threshold2 = 0 is the statutory rule, not a bug.
        let mut scenario = sample_scenario();
        scenario.filing_status = FilingStatus::MarriedSeparate;
        scenario.total_income = 30_000.0;
        scenario.social_security_amount = 10_000.0;
        let (warning, detail) = evaluate_social_security(&scenario).expect("always taxable");
        assert!(detail.taxable_percent > 0.0);
        assert_approx(detail.taxable_benefits, 8_500.0);
        assert_eq!(warning.severity, Severity::High);
        assert_approx(warning.estimated_annual_impact, 8_500.0 * 0.22);
    }

    #[test]
    fn social_security_rule_quiet_at_or_below_half_taxable() {
        let mut scenario = sample_scenario();
        scenario.total_income = 35_000.0;
        scenario.social_security_amount = 10_000.0;
        // Provisional 30,000: only 2,500 (25%) taxable, below the 50% bar.
        assert!(evaluate_social_security(&scenario).is_none());
    }

    #[test]
    fn social_security_high_severity_above_eighty_percent() {
        let mut scenario = sample_scenario();
        scenario.total_income = 80_000.0;
        scenario.social_security_amount = 20_000.0;
        let (warning, detail) = evaluate_social_security(&scenario).expect("85% taxable");
        assert_approx(detail.taxable_percent, 85.0);
        assert_eq!(warning.severity, Severity::High);
        assert_approx(warning.estimated_annual_impact, 17_000.0 * 0.22);
    }

    #[test]
    fn aca_rule_requires_enrollment_and_risk_window() {
        let mut scenario = sample_scenario();
        scenario.magi = 57_000.0;
        assert!(evaluate_aca(&scenario).is_none());

        scenario.aca_enrolled = true;
        scenario.magi = 50_000.0; // 343% FPL, below the window
        assert!(evaluate_aca(&scenario).is_none());
        scenario.magi = 60_000.0; // 412% FPL, past the window
        assert!(evaluate_aca(&scenario).is_none());
    }

    #[test]
    fn aca_warns_medium_when_approaching_the_cliff() {
        let mut scenario = sample_scenario();
        scenario.aca_enrolled = true;
        scenario.magi = 57_000.0; // 390.9% FPL for a single household in 2023
        let (warning, detail) = evaluate_aca(&scenario).expect("inside the risk window");
        assert_eq!(warning.severity, Severity::Medium);
        assert_approx(detail.cliff_income, 58_320.0);
        assert_approx(detail.distance_to_cliff, 1_320.0);
        // Full subsidy at risk: benchmark 6,000 minus 8.5% of income.
        assert_approx(warning.estimated_annual_impact, 6_000.0 - 57_000.0 * 0.085);
    }

    #[test]
    fn aca_warns_high_when_over_the_cliff() {
        let mut scenario = sample_scenario();
        scenario.aca_enrolled = true;
        scenario.magi = 59_000.0;
        let (warning, detail) = evaluate_aca(&scenario).expect("over the cliff, inside window");
        assert_eq!(warning.severity, Severity::High);
        assert!(detail.distance_to_cliff < 0.0);
    }

    fn all_rules_scenario() -> ScenarioSnapshot {
        ScenarioSnapshot {
            tax_year: 2023,
            filing_status: FilingStatus::Single,
            agi: 119_000.0,
            magi: 119_000.0,
            total_income: 119_000.0,
            taxable_income: 40_000.0,
            long_term_capital_gains: 5_000.0,
            short_term_capital_gains: 0.0,
            social_security_amount: 20_000.0,
            household_size: 4,
            medicare_enrolled: true,
            aca_enrolled: true,
        }
    }

    #[test]
    fn aggregator_sorts_warnings_by_descending_impact() {
        let result = evaluate_traps("all-rules", &all_rules_scenario());
        assert_eq!(result.warnings.len(), 4);
        for pair in result.warnings.windows(2) {
            assert!(pair[0].estimated_annual_impact >= pair[1].estimated_annual_impact);
        }
        // Household of four: FPL 30,000, so 119,000 sits in the risk window
        // and the whole subsidy dwarfs the marginal estimates.
        assert_eq!(result.warnings[0].trap_type, TrapType::Aca);
        assert!(result.details.irmaa.is_some());
        assert!(result.details.capital_gains.is_some());
        assert!(result.details.social_security.is_some());
        assert!(result.details.aca.is_some());
    }

    #[test]
    fn disabling_medicare_only_removes_the_irmaa_warning() {
        let enrolled = evaluate_traps("s", &all_rules_scenario());
        let mut scenario = all_rules_scenario();
        scenario.medicare_enrolled = false;
        let not_enrolled = evaluate_traps("s", &scenario);

        assert_eq!(enrolled.warnings.len(), 4);
        assert_eq!(not_enrolled.warnings.len(), 3);
        assert!(not_enrolled.details.irmaa.is_none());
        assert_eq!(enrolled.details.capital_gains, not_enrolled.details.capital_gains);
        assert_eq!(
            enrolled.details.social_security,
            not_enrolled.details.social_security
        );
        assert_eq!(enrolled.details.aca, not_enrolled.details.aca);

        let without_irmaa: Vec<_> = enrolled
            .warnings
            .iter()
            .filter(|w| w.trap_type != TrapType::Irmaa)
            .cloned()
            .collect();
        assert_eq!(without_irmaa, not_enrolled.warnings);
    }

    #[test]
    fn single_filer_at_150k_magi_gets_exactly_one_medium_irmaa_warning() {
        let mut scenario = sample_scenario();
        scenario.medicare_enrolled = true;
        let result = evaluate_traps("single-150k", &scenario);

        assert_eq!(result.warnings.len(), 1);
        let warning = &result.warnings[0];
        assert_eq!(warning.trap_type, TrapType::Irmaa);
        assert_eq!(warning.severity, Severity::Medium);
        assert_approx(warning.estimated_annual_impact, 2_355.60);

        let detail = result.details.irmaa.as_ref().expect("irmaa detail");
        assert_approx(detail.part_b_monthly, 164.80);
        assert_approx(detail.part_d_monthly, 31.50);
        assert_approx(detail.tier_min, 123_000.0);
        assert_eq!(detail.tier_max, Some(153_000.0));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_conversion_never_exceeds_balance(
            income in 0u32..2_000_000,
            fill_pct in 0u32..=100,
            balance in 0u32..1_000_000,
        ) {
            let sized = size_conversion(
                income as f64,
                2023,
                FilingStatus::Single,
                fill_pct as f64,
                balance as f64,
            );
            prop_assert!(sized >= 0.0);
            prop_assert!(sized <= balance as f64);
        }

        #[test]
        fn prop_tax_is_monotone_in_income(
            low in 0u32..1_000_000,
            bump in 0u32..500_000,
        ) {
            let a = calculate_tax(low as f64, 2023, FilingStatus::MarriedJoint);
            let b = calculate_tax((low + bump) as f64, 2023, FilingStatus::MarriedJoint);
            prop_assert!(b + 1e-9 >= a);
        }

        #[test]
        fn prop_warnings_are_sorted_for_arbitrary_scenarios(
            magi in 0u32..700_000,
            total_income in 0u32..400_000,
            taxable_income in 0u32..700_000,
            gains in 0u32..200_000,
            benefits in 0u32..60_000,
            household_size in 1u32..8,
            medicare in proptest::bool::ANY,
            aca in proptest::bool::ANY,
        ) {
            let scenario = ScenarioSnapshot {
                tax_year: 2023,
                filing_status: FilingStatus::MarriedJoint,
                agi: magi as f64,
                magi: magi as f64,
                total_income: total_income as f64,
                taxable_income: taxable_income as f64,
                long_term_capital_gains: gains as f64,
                short_term_capital_gains: 0.0,
                social_security_amount: benefits as f64,
                household_size,
                medicare_enrolled: medicare,
                aca_enrolled: aca,
            };
            let result = evaluate_traps("prop", &scenario);
            for pair in result.warnings.windows(2) {
                prop_assert!(
                    pair[0].estimated_annual_impact >= pair[1].estimated_annual_impact
                );
            }
        }

        #[test]
        fn prop_effective_rate_stays_below_top_marginal_rate(
            income in 1u32..5_000_000,
        ) {
            let tax = calculate_tax(income as f64, 2023, FilingStatus::Single);
            let rate = effective_rate(tax, income as f64);
            prop_assert!(rate >= 0.0);
            prop_assert!(rate < 0.37);
        }
    }
}

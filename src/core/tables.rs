use super::types::{BracketTier, BracketType, FilingStatus};

/// Tax years with published tables, ascending. Lookups for other years fall
/// back to the nearest year at or below the request (earliest year when the
/// request predates all data) so the engine always answers.
pub const KNOWN_YEARS: [u32; 2] = [2023, 2024];

const INF: f64 = f64::INFINITY;

const ORDINARY_2023_SINGLE: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 11_000.0, rate: 0.10 },
    BracketTier { min: 11_000.0, max: 44_725.0, rate: 0.12 },
    BracketTier { min: 44_725.0, max: 95_375.0, rate: 0.22 },
    BracketTier { min: 95_375.0, max: 182_100.0, rate: 0.24 },
    BracketTier { min: 182_100.0, max: 231_250.0, rate: 0.32 },
    BracketTier { min: 231_250.0, max: 578_125.0, rate: 0.35 },
    BracketTier { min: 578_125.0, max: INF, rate: 0.37 },
];

const ORDINARY_2023_JOINT: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 22_000.0, rate: 0.10 },
    BracketTier { min: 22_000.0, max: 89_450.0, rate: 0.12 },
    BracketTier { min: 89_450.0, max: 190_750.0, rate: 0.22 },
    BracketTier { min: 190_750.0, max: 364_200.0, rate: 0.24 },
    BracketTier { min: 364_200.0, max: 462_500.0, rate: 0.32 },
    BracketTier { min: 462_500.0, max: 693_750.0, rate: 0.35 },
    BracketTier { min: 693_750.0, max: INF, rate: 0.37 },
];

const ORDINARY_2023_SEPARATE: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 11_000.0, rate: 0.10 },
    BracketTier { min: 11_000.0, max: 44_725.0, rate: 0.12 },
    BracketTier { min: 44_725.0, max: 95_375.0, rate: 0.22 },
    BracketTier { min: 95_375.0, max: 182_100.0, rate: 0.24 },
    BracketTier { min: 182_100.0, max: 231_250.0, rate: 0.32 },
    BracketTier { min: 231_250.0, max: 346_875.0, rate: 0.35 },
    BracketTier { min: 346_875.0, max: INF, rate: 0.37 },
];

const ORDINARY_2023_HOH: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 15_700.0, rate: 0.10 },
    BracketTier { min: 15_700.0, max: 59_850.0, rate: 0.12 },
    BracketTier { min: 59_850.0, max: 95_350.0, rate: 0.22 },
    BracketTier { min: 95_350.0, max: 182_100.0, rate: 0.24 },
    BracketTier { min: 182_100.0, max: 231_250.0, rate: 0.32 },
    BracketTier { min: 231_250.0, max: 578_100.0, rate: 0.35 },
    BracketTier { min: 578_100.0, max: INF, rate: 0.37 },
];

const ORDINARY_2024_SINGLE: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 11_600.0, rate: 0.10 },
    BracketTier { min: 11_600.0, max: 47_150.0, rate: 0.12 },
    BracketTier { min: 47_150.0, max: 100_525.0, rate: 0.22 },
    BracketTier { min: 100_525.0, max: 191_950.0, rate: 0.24 },
    BracketTier { min: 191_950.0, max: 243_725.0, rate: 0.32 },
    BracketTier { min: 243_725.0, max: 609_350.0, rate: 0.35 },
    BracketTier { min: 609_350.0, max: INF, rate: 0.37 },
];

const ORDINARY_2024_JOINT: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 23_200.0, rate: 0.10 },
    BracketTier { min: 23_200.0, max: 94_300.0, rate: 0.12 },
    BracketTier { min: 94_300.0, max: 201_050.0, rate: 0.22 },
    BracketTier { min: 201_050.0, max: 383_900.0, rate: 0.24 },
    BracketTier { min: 383_900.0, max: 487_450.0, rate: 0.32 },
    BracketTier { min: 487_450.0, max: 731_200.0, rate: 0.35 },
    BracketTier { min: 731_200.0, max: INF, rate: 0.37 },
];

const ORDINARY_2024_SEPARATE: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 11_600.0, rate: 0.10 },
    BracketTier { min: 11_600.0, max: 47_150.0, rate: 0.12 },
    BracketTier { min: 47_150.0, max: 100_525.0, rate: 0.22 },
    BracketTier { min: 100_525.0, max: 191_950.0, rate: 0.24 },
    BracketTier { min: 191_950.0, max: 243_725.0, rate: 0.32 },
    BracketTier { min: 243_725.0, max: 365_600.0, rate: 0.35 },
    BracketTier { min: 365_600.0, max: INF, rate: 0.37 },
];

const ORDINARY_2024_HOH: [BracketTier; 7] = [
    BracketTier { min: 0.0, max: 16_550.0, rate: 0.10 },
    BracketTier { min: 16_550.0, max: 63_100.0, rate: 0.12 },
    BracketTier { min: 63_100.0, max: 100_500.0, rate: 0.22 },
    BracketTier { min: 100_500.0, max: 191_950.0, rate: 0.24 },
    BracketTier { min: 191_950.0, max: 243_700.0, rate: 0.32 },
    BracketTier { min: 243_700.0, max: 609_350.0, rate: 0.35 },
    BracketTier { min: 609_350.0, max: INF, rate: 0.37 },
];

const LTCG_2023_SINGLE: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 44_625.0, rate: 0.0 },
    BracketTier { min: 44_625.0, max: 492_300.0, rate: 0.15 },
    BracketTier { min: 492_300.0, max: INF, rate: 0.20 },
];

const LTCG_2023_JOINT: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 89_250.0, rate: 0.0 },
    BracketTier { min: 89_250.0, max: 553_850.0, rate: 0.15 },
    BracketTier { min: 553_850.0, max: INF, rate: 0.20 },
];

const LTCG_2023_SEPARATE: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 44_625.0, rate: 0.0 },
    BracketTier { min: 44_625.0, max: 276_900.0, rate: 0.15 },
    BracketTier { min: 276_900.0, max: INF, rate: 0.20 },
];

const LTCG_2023_HOH: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 59_750.0, rate: 0.0 },
    BracketTier { min: 59_750.0, max: 523_050.0, rate: 0.15 },
    BracketTier { min: 523_050.0, max: INF, rate: 0.20 },
];

const LTCG_2024_SINGLE: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 47_025.0, rate: 0.0 },
    BracketTier { min: 47_025.0, max: 518_900.0, rate: 0.15 },
    BracketTier { min: 518_900.0, max: INF, rate: 0.20 },
];

const LTCG_2024_JOINT: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 94_050.0, rate: 0.0 },
    BracketTier { min: 94_050.0, max: 583_750.0, rate: 0.15 },
    BracketTier { min: 583_750.0, max: INF, rate: 0.20 },
];

const LTCG_2024_SEPARATE: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 47_025.0, rate: 0.0 },
    BracketTier { min: 47_025.0, max: 291_850.0, rate: 0.15 },
    BracketTier { min: 291_850.0, max: INF, rate: 0.20 },
];

const LTCG_2024_HOH: [BracketTier; 3] = [
    BracketTier { min: 0.0, max: 63_000.0, rate: 0.0 },
    BracketTier { min: 63_000.0, max: 551_350.0, rate: 0.15 },
    BracketTier { min: 551_350.0, max: INF, rate: 0.20 },
];

/// Nearest known year at or below the request; the earliest known year when
/// the request predates all data.
pub fn resolve_year(year: u32) -> u32 {
    KNOWN_YEARS
        .iter()
        .copied()
        .filter(|known| *known <= year)
        .max()
        .unwrap_or(KNOWN_YEARS[0])
}

pub fn get_brackets(
    year: u32,
    status: FilingStatus,
    bracket_type: BracketType,
) -> &'static [BracketTier] {
    // Qualifying widow(er)s use the joint return tables.
    let status = match status {
        FilingStatus::QualifyingWidow => FilingStatus::MarriedJoint,
        other => other,
    };
    match (resolve_year(year), bracket_type, status) {
        (2024, BracketType::Ordinary, FilingStatus::Single) => &ORDINARY_2024_SINGLE,
        (2024, BracketType::Ordinary, FilingStatus::MarriedJoint) => &ORDINARY_2024_JOINT,
        (2024, BracketType::Ordinary, FilingStatus::MarriedSeparate) => &ORDINARY_2024_SEPARATE,
        (2024, BracketType::Ordinary, FilingStatus::HeadOfHousehold) => &ORDINARY_2024_HOH,
        (2024, BracketType::LongTermCapitalGains, FilingStatus::Single) => &LTCG_2024_SINGLE,
        (2024, BracketType::LongTermCapitalGains, FilingStatus::MarriedJoint) => &LTCG_2024_JOINT,
        (2024, BracketType::LongTermCapitalGains, FilingStatus::MarriedSeparate) => {
            &LTCG_2024_SEPARATE
        }
        (2024, BracketType::LongTermCapitalGains, FilingStatus::HeadOfHousehold) => &LTCG_2024_HOH,
        (_, BracketType::Ordinary, FilingStatus::MarriedJoint) => &ORDINARY_2023_JOINT,
        (_, BracketType::Ordinary, FilingStatus::MarriedSeparate) => &ORDINARY_2023_SEPARATE,
        (_, BracketType::Ordinary, FilingStatus::HeadOfHousehold) => &ORDINARY_2023_HOH,
        (_, BracketType::Ordinary, _) => &ORDINARY_2023_SINGLE,
        (_, BracketType::LongTermCapitalGains, FilingStatus::MarriedJoint) => &LTCG_2023_JOINT,
        (_, BracketType::LongTermCapitalGains, FilingStatus::MarriedSeparate) => {
            &LTCG_2023_SEPARATE
        }
        (_, BracketType::LongTermCapitalGains, FilingStatus::HeadOfHousehold) => &LTCG_2023_HOH,
        (_, BracketType::LongTermCapitalGains, _) => &LTCG_2023_SINGLE,
    }
}

/// Strict variant: errors on a year without published tables instead of
/// degrading to the nearest-year fallback.
pub fn get_brackets_strict(
    year: u32,
    status: FilingStatus,
    bracket_type: BracketType,
) -> Result<&'static [BracketTier], String> {
    if !KNOWN_YEARS.contains(&year) {
        return Err(format!("no bracket tables published for tax year {year}"));
    }
    Ok(get_brackets(year, status, bracket_type))
}

/// IRMAA thresholds are only published for single and joint returns.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IrmaaFilingKey {
    Single,
    Joint,
}

/// Named fallback: joint returns use the joint schedule, every other status
/// (including separate filers and qualifying widows) the single schedule.
pub fn irmaa_filing_key(status: FilingStatus) -> IrmaaFilingKey {
    match status {
        FilingStatus::MarriedJoint => IrmaaFilingKey::Joint,
        _ => IrmaaFilingKey::Single,
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IrmaaTier {
    pub magi_min: f64,
    pub magi_max: f64,
    pub part_b_monthly: f64,
    pub part_d_monthly: f64,
}

const IRMAA_2023_SINGLE: [IrmaaTier; 6] = [
    IrmaaTier { magi_min: 0.0, magi_max: 97_000.0, part_b_monthly: 0.0, part_d_monthly: 0.0 },
    IrmaaTier { magi_min: 97_000.0, magi_max: 123_000.0, part_b_monthly: 65.90, part_d_monthly: 12.20 },
    IrmaaTier { magi_min: 123_000.0, magi_max: 153_000.0, part_b_monthly: 164.80, part_d_monthly: 31.50 },
    IrmaaTier { magi_min: 153_000.0, magi_max: 183_000.0, part_b_monthly: 263.70, part_d_monthly: 50.70 },
    IrmaaTier { magi_min: 183_000.0, magi_max: 500_000.0, part_b_monthly: 362.60, part_d_monthly: 70.00 },
    IrmaaTier { magi_min: 500_000.0, magi_max: INF, part_b_monthly: 395.60, part_d_monthly: 76.40 },
];

const IRMAA_2023_JOINT: [IrmaaTier; 6] = [
    IrmaaTier { magi_min: 0.0, magi_max: 194_000.0, part_b_monthly: 0.0, part_d_monthly: 0.0 },
    IrmaaTier { magi_min: 194_000.0, magi_max: 246_000.0, part_b_monthly: 65.90, part_d_monthly: 12.20 },
    IrmaaTier { magi_min: 246_000.0, magi_max: 306_000.0, part_b_monthly: 164.80, part_d_monthly: 31.50 },
    IrmaaTier { magi_min: 306_000.0, magi_max: 366_000.0, part_b_monthly: 263.70, part_d_monthly: 50.70 },
    IrmaaTier { magi_min: 366_000.0, magi_max: 750_000.0, part_b_monthly: 362.60, part_d_monthly: 70.00 },
    IrmaaTier { magi_min: 750_000.0, magi_max: INF, part_b_monthly: 395.60, part_d_monthly: 76.40 },
];

const IRMAA_2024_SINGLE: [IrmaaTier; 6] = [
    IrmaaTier { magi_min: 0.0, magi_max: 103_000.0, part_b_monthly: 0.0, part_d_monthly: 0.0 },
    IrmaaTier { magi_min: 103_000.0, magi_max: 129_000.0, part_b_monthly: 69.90, part_d_monthly: 12.90 },
    IrmaaTier { magi_min: 129_000.0, magi_max: 161_000.0, part_b_monthly: 174.70, part_d_monthly: 33.30 },
    IrmaaTier { magi_min: 161_000.0, magi_max: 193_000.0, part_b_monthly: 279.50, part_d_monthly: 53.80 },
    IrmaaTier { magi_min: 193_000.0, magi_max: 500_000.0, part_b_monthly: 384.30, part_d_monthly: 74.20 },
    IrmaaTier { magi_min: 500_000.0, magi_max: INF, part_b_monthly: 419.30, part_d_monthly: 81.00 },
];

const IRMAA_2024_JOINT: [IrmaaTier; 6] = [
    IrmaaTier { magi_min: 0.0, magi_max: 206_000.0, part_b_monthly: 0.0, part_d_monthly: 0.0 },
    IrmaaTier { magi_min: 206_000.0, magi_max: 258_000.0, part_b_monthly: 69.90, part_d_monthly: 12.90 },
    IrmaaTier { magi_min: 258_000.0, magi_max: 322_000.0, part_b_monthly: 174.70, part_d_monthly: 33.30 },
    IrmaaTier { magi_min: 322_000.0, magi_max: 386_000.0, part_b_monthly: 279.50, part_d_monthly: 53.80 },
    IrmaaTier { magi_min: 386_000.0, magi_max: 750_000.0, part_b_monthly: 384.30, part_d_monthly: 74.20 },
    IrmaaTier { magi_min: 750_000.0, magi_max: INF, part_b_monthly: 419.30, part_d_monthly: 81.00 },
];

pub fn irmaa_tiers(year: u32, status: FilingStatus) -> &'static [IrmaaTier] {
    match (resolve_year(year), irmaa_filing_key(status)) {
        (2024, IrmaaFilingKey::Single) => &IRMAA_2024_SINGLE,
        (2024, IrmaaFilingKey::Joint) => &IRMAA_2024_JOINT,
        (_, IrmaaFilingKey::Joint) => &IRMAA_2023_JOINT,
        (_, IrmaaFilingKey::Single) => &IRMAA_2023_SINGLE,
    }
}

pub fn irmaa_tiers_strict(year: u32, status: FilingStatus) -> Result<&'static [IrmaaTier], String> {
    if !KNOWN_YEARS.contains(&year) {
        return Err(format!("no IRMAA tiers published for year {year}"));
    }
    Ok(irmaa_tiers(year, status))
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SocialSecurityThresholds {
    pub lower: f64,
    pub upper: f64,
}

/// Statutory provisional-income thresholds; unchanged since enactment, so
/// not year-indexed. Separate filers have no exclusion thresholds at all.
pub fn social_security_thresholds(status: FilingStatus) -> SocialSecurityThresholds {
    match status {
        FilingStatus::MarriedJoint => SocialSecurityThresholds {
            lower: 32_000.0,
            upper: 44_000.0,
        },
        FilingStatus::MarriedSeparate => SocialSecurityThresholds {
            lower: 0.0,
            upper: 0.0,
        },
        FilingStatus::Single | FilingStatus::HeadOfHousehold | FilingStatus::QualifyingWidow => {
            SocialSecurityThresholds {
                lower: 25_000.0,
                upper: 34_000.0,
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FplSchedule {
    pub base: f64,
    pub per_additional_member: f64,
}

pub fn fpl_schedule(year: u32) -> FplSchedule {
    match resolve_year(year) {
        2024 => FplSchedule {
            base: 15_060.0,
            per_additional_member: 5_380.0,
        },
        _ => FplSchedule {
            base: 14_580.0,
            per_additional_member: 5_140.0,
        },
    }
}

pub fn household_fpl(year: u32, household_size: u32) -> f64 {
    let schedule = fpl_schedule(year);
    schedule.base + schedule.per_additional_member * (household_size.max(1) - 1) as f64
}

/// Calibration constants for the simplified subsidy estimate: a flat
/// benchmark silver-plan premium by household size.
pub const ACA_BENCHMARK_BASE_ANNUAL: f64 = 6_000.0;
pub const ACA_BENCHMARK_PER_MEMBER_ANNUAL: f64 = 4_500.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AffordabilityBand {
    pub fpl_min: f64,
    pub fpl_max: f64,
    pub applicable_percent: f64,
}

const ACA_AFFORDABILITY_BANDS: [AffordabilityBand; 5] = [
    AffordabilityBand { fpl_min: 0.0, fpl_max: 150.0, applicable_percent: 0.0 },
    AffordabilityBand { fpl_min: 150.0, fpl_max: 200.0, applicable_percent: 2.0 },
    AffordabilityBand { fpl_min: 200.0, fpl_max: 250.0, applicable_percent: 4.0 },
    AffordabilityBand { fpl_min: 250.0, fpl_max: 300.0, applicable_percent: 6.0 },
    AffordabilityBand { fpl_min: 300.0, fpl_max: INF, applicable_percent: 8.5 },
];

/// Expected premium contribution as a percentage of income for a household
/// at the given FPL percentage.
pub fn aca_applicable_percent(fpl_percent: f64) -> f64 {
    let fpl_percent = fpl_percent.max(0.0);
    ACA_AFFORDABILITY_BANDS
        .iter()
        .find(|band| fpl_percent < band.fpl_max)
        .map(|band| band.applicable_percent)
        .unwrap_or(ACA_AFFORDABILITY_BANDS[ACA_AFFORDABILITY_BANDS.len() - 1].applicable_percent)
}

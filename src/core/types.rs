use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    /// Accepts canonical and legacy spellings. `married` means a joint
    /// return; the other legacy names map to their canonical variant.
    pub fn normalize(raw: &str) -> Option<FilingStatus> {
        let key = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "single" => Some(FilingStatus::Single),
            "married" | "married_joint" | "joint" => Some(FilingStatus::MarriedJoint),
            "married_separate" => Some(FilingStatus::MarriedSeparate),
            "head_of_household" => Some(FilingStatus::HeadOfHousehold),
            "qualifying_widow" => Some(FilingStatus::QualifyingWidow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedJoint => "married_joint",
            FilingStatus::MarriedSeparate => "married_separate",
            FilingStatus::HeadOfHousehold => "head_of_household",
            FilingStatus::QualifyingWidow => "qualifying_widow",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BracketType {
    Ordinary,
    LongTermCapitalGains,
}

/// One progressive-rate tier. `min` is inclusive, `max` exclusive; the top
/// tier carries `f64::INFINITY` as its `max`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BracketTier {
    pub min: f64,
    pub max: f64,
    pub rate: f64,
}

/// Everything one evaluation call needs. Built fresh per request and never
/// stored; the engine holds no state between calls.
#[derive(Debug, Clone)]
pub struct ScenarioSnapshot {
    pub tax_year: u32,
    pub filing_status: FilingStatus,
    pub agi: f64,
    pub magi: f64,
    pub total_income: f64,
    pub taxable_income: f64,
    pub long_term_capital_gains: f64,
    pub short_term_capital_gains: f64,
    pub social_security_amount: f64,
    pub household_size: u32,
    pub medicare_enrolled: bool,
    pub aca_enrolled: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrapType {
    Irmaa,
    CapitalGains,
    SocialSecurity,
    Aca,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTrapWarning {
    pub trap_type: TrapType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub estimated_annual_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrmaaDetail {
    pub magi: f64,
    pub tier_min: f64,
    pub tier_max: Option<f64>,
    pub part_b_monthly: f64,
    pub part_d_monthly: f64,
    pub annual_surcharge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsDetail {
    pub taxable_income: f64,
    pub current_rate: f64,
    pub next_rate: f64,
    pub next_tier_min: f64,
    pub distance_to_next_tier: f64,
    pub projected_tax_increase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSecurityDetail {
    pub provisional_income: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub taxable_benefits: f64,
    pub taxable_percent: f64,
    pub assumed_marginal_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcaDetail {
    pub fpl_percent: f64,
    pub cliff_income: f64,
    pub distance_to_cliff: f64,
    pub estimated_annual_subsidy: f64,
}

/// Structured data per triggered rule; a slot stays `None` when its rule did
/// not fire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapDetails {
    pub irmaa: Option<IrmaaDetail>,
    pub capital_gains: Option<CapitalGainsDetail>,
    pub social_security: Option<SocialSecurityDetail>,
    pub aca: Option<AcaDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTrapResult {
    pub scenario_id: String,
    pub warnings: Vec<TaxTrapWarning>,
    pub details: TrapDetails,
}

/// Distance from an income to the next bracket boundary. Both fields are
/// `f64::INFINITY` when the income already sits in the unbounded top tier.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BracketDistance {
    pub next_threshold: f64,
    pub distance: f64,
}

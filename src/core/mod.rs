mod engine;
pub mod tables;
mod types;

pub use engine::{
    ACA_CLIFF_FPL_PCT, ACA_RISK_WINDOW_MAX_FPL_PCT, ACA_RISK_WINDOW_MIN_FPL_PCT,
    CAPITAL_GAINS_WATCH_DISTANCE, SS_IMPACT_MARGINAL_RATE, calculate_tax,
    distance_to_next_bracket, effective_rate, evaluate_aca, evaluate_capital_gains,
    evaluate_irmaa, evaluate_social_security, evaluate_traps, size_conversion, tax_from_tiers,
};
pub use types::{
    AcaDetail, BracketDistance, BracketTier, BracketType, CapitalGainsDetail, FilingStatus,
    IrmaaDetail, ScenarioSnapshot, Severity, SocialSecurityDetail, TaxTrapResult, TaxTrapWarning,
    TrapDetails, TrapType,
};

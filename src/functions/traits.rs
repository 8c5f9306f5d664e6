use crate::types::{Bar, Decision};

/// Hyperparameter tuple of one rule (window lengths, thresholds)
pub type RuleParams = Vec<usize>;

/// Trading rule: maps a trailing price window to a decision.
///
/// `window` holds every bar up to and including "today" in ascending order.
/// Rules are stateless across calls; everything they need is fixed at
/// construction. A window shorter than [`Rule::lookback`] yields `Hold`.
pub trait Rule: Send + Sync {
    /// Short identifier used in logs and reports
    fn alias(&self) -> &'static str;

    /// Display name
    fn ui_name(&self) -> &'static str;

    /// Construction parameters, in constructor order
    fn params(&self) -> RuleParams;

    /// Number of trailing bars needed to emit anything but `Hold`
    fn lookback(&self) -> usize;

    fn decide(&self, window: &[Bar]) -> Decision;
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:?}", self.alias(), self.params())
    }
}

//! Financial risk detection
//!
//! Three independent scans append to one ordered list: payment terms on the
//! full text, liability wording inside clauses labeled as financial liability,
//! and penalty language on the full text. Rules never short-circuit each other,
//! so one clause can produce several entries and nothing is deduplicated.

use regex::Regex;
use tracing::debug;

use super::models::{
    Exposure, FinancialAssessment, FinancialImpact, FinancialRisk, RiskCategory, RiskItem,
    Severity,
};

/// What makes a rule fire, evaluated against lower-cased text
#[derive(Debug, Clone)]
enum Trigger {
    Pattern(Regex),
    AnyPhrase(&'static [&'static str]),
}

impl Trigger {
    fn fires(&self, lowered: &str) -> bool {
        match self {
            Trigger::Pattern(regex) => regex.is_match(lowered),
            Trigger::AnyPhrase(phrases) => phrases.iter().any(|p| lowered.contains(p)),
        }
    }
}

/// One predicate and the risk it emits
#[derive(Debug, Clone)]
struct DetectionRule {
    trigger: Trigger,
    risk: FinancialRisk,
}

impl DetectionRule {
    fn new(trigger: Trigger, risk: FinancialRisk) -> Self {
        Self { trigger, risk }
    }

    fn apply(&self, lowered: &str, out: &mut Vec<FinancialRisk>) {
        if self.trigger.fires(lowered) {
            out.push(self.risk.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct FinancialRiskDetector {
    payment_rules: Vec<DetectionRule>,
    liability_rules: Vec<DetectionRule>,
    penalty_amount: Regex,
    penalty_vocabulary: &'static [&'static str],
}

impl Default for FinancialRiskDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialRiskDetector {
    pub fn new() -> Self {
        let net_60 = Regex::new(r"net[- ]?60|60\)?\s*days|sixty\s+(?:\(60\)\s*)?days")
            .expect("Invalid Net-60 regex");
        let net_90 = Regex::new(r"net[- ]?90|90\)?\s*days|ninety\s+(?:\(90\)\s*)?days")
            .expect("Invalid Net-90 regex");
        let penalty_amount = Regex::new(
            r"\$\s*([0-9,]+(?:\.\d{2})?)\s*(?:penalty|fine|liquidated damages)",
        )
        .expect("Invalid penalty amount regex");

        let payment_rules = vec![
            DetectionRule::new(
                Trigger::Pattern(net_60),
                FinancialRisk::new(
                    "Extended Payment Terms",
                    "Net-60 payment terms create cash flow risk",
                    Severity::Medium,
                    FinancialImpact::Moderate,
                ),
            ),
            DetectionRule::new(
                Trigger::Pattern(net_90),
                FinancialRisk::new(
                    "Extended Payment Terms",
                    "Net-90 payment terms create significant cash flow risk",
                    Severity::High,
                    FinancialImpact::High,
                ),
            ),
            DetectionRule::new(
                Trigger::AnyPhrase(&["subject to approval", "may withhold"]),
                FinancialRisk::new(
                    "Conditional Payment",
                    "Payments subject to discretionary approval",
                    Severity::High,
                    FinancialImpact::High,
                ),
            ),
        ];

        let liability_rules = vec![
            DetectionRule::new(
                Trigger::AnyPhrase(&["unlimited", "all damages"]),
                FinancialRisk::new(
                    "Unlimited Liability",
                    "No cap on financial liability exposure",
                    Severity::Critical,
                    FinancialImpact::Critical,
                ),
            ),
            DetectionRule::new(
                Trigger::AnyPhrase(&["indemnify", "hold harmless"]),
                FinancialRisk::new(
                    "Indemnification Obligation",
                    "Broad indemnification may lead to unexpected costs",
                    Severity::High,
                    FinancialImpact::High,
                ),
            ),
        ];

        Self {
            payment_rules,
            liability_rules,
            penalty_amount,
            penalty_vocabulary: &["penalty", "liquidated damages", "forfeit"],
        }
    }

    pub fn detect(&self, risks: &[RiskItem], full_text: &str) -> FinancialAssessment {
        let lowered = full_text.to_lowercase();
        let mut found = Vec::new();

        for rule in &self.payment_rules {
            rule.apply(&lowered, &mut found);
        }

        for item in risks
            .iter()
            .filter(|r| r.category == RiskCategory::FinancialLiability)
        {
            let clause = item.clause.to_lowercase();
            for rule in &self.liability_rules {
                rule.apply(&clause, &mut found);
            }
        }

        if let Some(penalty) = self.find_penalty(&lowered) {
            found.push(penalty);
        }

        let estimated_exposure = exposure_for(&found);
        let severity = overall_severity(found.len(), estimated_exposure);

        debug!(
            "Detected {} financial risks, exposure={}, severity={}",
            found.len(),
            estimated_exposure,
            severity
        );

        FinancialAssessment {
            total_risk_count: found.len(),
            risks: found,
            estimated_exposure,
            severity,
        }
    }

    /// Amount-bearing penalties take precedence over generic penalty vocabulary
    fn find_penalty(&self, lowered: &str) -> Option<FinancialRisk> {
        if self.penalty_amount.is_match(lowered) {
            Some(FinancialRisk::new(
                "Penalty Clause",
                "Contract includes penalty provisions",
                Severity::Medium,
                FinancialImpact::Moderate,
            ))
        } else if self.penalty_vocabulary.iter().any(|w| lowered.contains(w)) {
            Some(FinancialRisk::new(
                "Penalty Provisions",
                "Contract contains penalty language",
                Severity::Medium,
                FinancialImpact::Moderate,
            ))
        } else {
            None
        }
    }
}

/// Map the summed severity weight to an exposure band
pub fn exposure_for(risks: &[FinancialRisk]) -> Exposure {
    let total: u32 = risks.iter().map(|r| r.severity.weight()).sum();
    match total {
        t if t >= 10 => Exposure::VeryHigh,
        t if t >= 7 => Exposure::High,
        t if t >= 4 => Exposure::Moderate,
        _ => Exposure::Low,
    }
}

pub fn overall_severity(count: usize, exposure: Exposure) -> Severity {
    if exposure == Exposure::VeryHigh || count >= 5 {
        Severity::Critical
    } else if exposure == Exposure::High || count >= 3 {
        Severity::High
    } else if count >= 1 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liability(clause: &str) -> RiskItem {
        RiskItem {
            clause: clause.to_string(),
            category: RiskCategory::FinancialLiability,
            confidence: 0.9,
            risk_level: RiskCategory::FinancialLiability.risk_level(),
            explanation: String::new(),
        }
    }

    fn types(assessment: &FinancialAssessment) -> Vec<&str> {
        assessment.risks.iter().map(|r| r.risk_type.as_str()).collect()
    }

    #[test]
    fn test_no_risks() {
        let assessment = FinancialRiskDetector::new().detect(&[], "The parties shall cooperate.");
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.total_risk_count, 0);
        assert_eq!(assessment.estimated_exposure, Exposure::Low);
        assert_eq!(assessment.severity, Severity::Low);
    }

    #[test]
    fn test_net_60_and_net_90_both_fire() {
        let assessment = FinancialRiskDetector::new().detect(
            &[],
            "Invoices are Net-60. Disputed invoices are paid within 90 days.",
        );
        assert_eq!(
            types(&assessment),
            vec!["Extended Payment Terms", "Extended Payment Terms"]
        );
        assert_eq!(assessment.risks[0].severity, Severity::Medium);
        assert_eq!(assessment.risks[1].severity, Severity::High);
    }

    #[test]
    fn test_payment_terms_match_inside_longer_numbers() {
        let detector = FinancialRiskDetector::new();

        let assessment = detector.detect(&[], "Rebates are settled within 160 days.");
        assert_eq!(types(&assessment), vec!["Extended Payment Terms"]);
        assert!(assessment.risks[0].description.contains("Net-60"));

        let assessment = detector.detect(&[], "The warranty runs for 190 days.");
        assert_eq!(types(&assessment), vec!["Extended Payment Terms"]);
        assert!(assessment.risks[0].description.contains("Net-90"));

        let assessment = detector.detect(&[], "Invoices are payable within 30 days.");
        assert!(assessment.risks.is_empty());
    }

    #[test]
    fn test_spelled_out_payment_delay() {
        let assessment = FinancialRiskDetector::new()
            .detect(&[], "Company shall pay Contractor within sixty (60) days.");
        assert_eq!(types(&assessment), vec!["Extended Payment Terms"]);
    }

    #[test]
    fn test_conditional_payment_co_fires() {
        let assessment = FinancialRiskDetector::new().detect(
            &[],
            "Payment is net 60 and subject to approval. Company may withhold fees.",
        );
        assert_eq!(
            types(&assessment),
            vec!["Extended Payment Terms", "Conditional Payment"]
        );
    }

    #[test]
    fn test_liability_scan_only_uses_financial_liability_items() {
        let mut other = liability("Contractor shall indemnify Company for unlimited losses.");
        other.category = RiskCategory::Indemnification;
        let assessment = FinancialRiskDetector::new().detect(&[other], "No payment terms here.");
        assert!(assessment.risks.is_empty());
    }

    #[test]
    fn test_single_clause_contributes_both_liability_risks() {
        let items = vec![liability(
            "Contractor agrees to indemnify the Company for unlimited liability.",
        )];
        let assessment = FinancialRiskDetector::new().detect(&items, "");
        assert_eq!(
            types(&assessment),
            vec!["Unlimited Liability", "Indemnification Obligation"]
        );
        assert_eq!(assessment.risks[0].severity, Severity::Critical);
        // 4 + 3 = 7
        assert_eq!(assessment.estimated_exposure, Exposure::High);
        assert_eq!(assessment.severity, Severity::High);
    }

    #[test]
    fn test_penalty_amount_excludes_generic_penalty() {
        let assessment = FinancialRiskDetector::new()
            .detect(&[], "Late delivery incurs a $5,000.00 penalty and other penalty terms.");
        assert_eq!(types(&assessment), vec!["Penalty Clause"]);
    }

    #[test]
    fn test_generic_penalty_language() {
        let assessment = FinancialRiskDetector::new()
            .detect(&[], "Contractor shall forfeit the deposit upon breach.");
        assert_eq!(types(&assessment), vec!["Penalty Provisions"]);
        assert_eq!(assessment.severity, Severity::Medium);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let items = vec![
            liability("Contractor is liable for all damages."),
            liability("Contractor bears unlimited exposure."),
        ];
        let assessment = FinancialRiskDetector::new().detect(&items, "");
        assert_eq!(
            types(&assessment),
            vec!["Unlimited Liability", "Unlimited Liability"]
        );
        assert_eq!(assessment.total_risk_count, 2);
        assert_eq!(assessment.estimated_exposure, Exposure::High);
    }

    #[test]
    fn test_exposure_thresholds() {
        let risk = |severity| FinancialRisk::new("X", "x", severity, FinancialImpact::Low);
        assert_eq!(exposure_for(&[risk(Severity::Low)]), Exposure::Low);
        assert_eq!(exposure_for(&[risk(Severity::Critical)]), Exposure::Moderate);
        assert_eq!(
            exposure_for(&[risk(Severity::Critical), risk(Severity::High)]),
            Exposure::High
        );
        assert_eq!(
            exposure_for(&[risk(Severity::Critical), risk(Severity::Critical), risk(Severity::Medium)]),
            Exposure::VeryHigh
        );
    }

    #[test]
    fn test_overall_severity() {
        assert_eq!(overall_severity(0, Exposure::Low), Severity::Low);
        assert_eq!(overall_severity(1, Exposure::Low), Severity::Medium);
        assert_eq!(overall_severity(3, Exposure::Moderate), Severity::High);
        assert_eq!(overall_severity(2, Exposure::High), Severity::High);
        assert_eq!(overall_severity(5, Exposure::Low), Severity::Critical);
        assert_eq!(overall_severity(1, Exposure::VeryHigh), Severity::Critical);
    }
}

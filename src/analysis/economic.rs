//! Economic impact model
//!
//! Converts the financial risk list into dollar estimates, a risk-adjusted
//! contract value and recommendations. Opportunity bonuses and recommendation
//! rules are ordered lists evaluated without short-circuiting.

use indexmap::IndexMap;

use super::models::{EconomicImpact, EconomicViability, FinancialRisk};

pub const DEFAULT_CONTRACT_VALUE: f64 = 10_000.0;
/// Base cost for risk types missing from the table
pub const DEFAULT_BASE_COST: f64 = 1_000.0;

const FALLBACK_RECOMMENDATION: &str = "Standard contract terms - minimal concerns";

/// Base cost of one risk type, either flat or split into tiers
#[derive(Debug, Clone, PartialEq)]
pub enum CostEstimate {
    Flat(f64),
    Tiered(IndexMap<String, f64>),
}

impl CostEstimate {
    /// Tiered entries always resolve to their first tier, whichever tier applies
    pub fn base(&self) -> f64 {
        match self {
            CostEstimate::Flat(cost) => *cost,
            CostEstimate::Tiered(tiers) => tiers
                .values()
                .next()
                .copied()
                .unwrap_or(DEFAULT_BASE_COST),
        }
    }
}

fn default_cost_table() -> IndexMap<String, CostEstimate> {
    let tiers = IndexMap::from([("Net-60".to_string(), 500.0), ("Net-90".to_string(), 1_000.0)]);

    IndexMap::from([
        ("Extended Payment Terms".to_string(), CostEstimate::Tiered(tiers)),
        ("Conditional Payment".to_string(), CostEstimate::Flat(2_000.0)),
        ("Unlimited Liability".to_string(), CostEstimate::Flat(10_000.0)),
        ("Indemnification Obligation".to_string(), CostEstimate::Flat(5_000.0)),
        ("Penalty Clause".to_string(), CostEstimate::Flat(1_500.0)),
        ("Non-Compete".to_string(), CostEstimate::Flat(3_000.0)),
        ("Termination Risk".to_string(), CostEstimate::Flat(2_500.0)),
    ])
}

/// Fixed bonus added once per risk whose type contains `needle`
struct OpportunityRule {
    needle: &'static str,
    bonus: f64,
}

static OPPORTUNITY_RULES: [OpportunityRule; 3] = [
    OpportunityRule {
        needle: "Non-Compete",
        bonus: 3_000.0,
    },
    OpportunityRule {
        needle: "Extended Payment",
        bonus: 300.0,
    },
    OpportunityRule {
        needle: "Termination",
        bonus: 1_500.0,
    },
];

/// What a recommendation rule looks at
enum Condition {
    AnyTypeContains(&'static str),
    TotalCostAbove(f64),
    CountAtLeast(usize),
}

struct RecommendationRule {
    condition: Condition,
    text: &'static str,
}

impl RecommendationRule {
    fn applies(&self, risks: &[FinancialRisk], total_cost: f64) -> bool {
        match self.condition {
            Condition::AnyTypeContains(needle) => {
                risks.iter().any(|r| r.risk_type.contains(needle))
            }
            Condition::TotalCostAbove(limit) => total_cost > limit,
            Condition::CountAtLeast(n) => risks.len() >= n,
        }
    }
}

static RECOMMENDATION_RULES: [RecommendationRule; 5] = [
    RecommendationRule {
        condition: Condition::AnyTypeContains("Payment"),
        text: "Negotiate for shorter payment terms (Net-30 instead of Net-60/90)",
    },
    RecommendationRule {
        condition: Condition::AnyTypeContains("Liability"),
        text: "Request a liability cap or obtain insurance coverage",
    },
    RecommendationRule {
        condition: Condition::AnyTypeContains("Termination"),
        text: "Seek longer notice period or termination fee provisions",
    },
    RecommendationRule {
        condition: Condition::TotalCostAbove(5_000.0),
        text: "Consider requesting contract value increase to offset risks",
    },
    RecommendationRule {
        condition: Condition::CountAtLeast(4),
        text: "Comprehensive legal review recommended before signing",
    },
];

#[derive(Debug, Clone)]
pub struct EconomicImpactModel {
    cost_table: IndexMap<String, CostEstimate>,
}

impl Default for EconomicImpactModel {
    fn default() -> Self {
        Self {
            cost_table: default_cost_table(),
        }
    }
}

impl EconomicImpactModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost_table(cost_table: IndexMap<String, CostEstimate>) -> Self {
        Self { cost_table }
    }

    pub fn calculate(&self, risks: &[FinancialRisk], contract_value: f64) -> EconomicImpact {
        let direct = self.direct_costs(risks);
        let opportunity = opportunity_costs(risks);
        let total = direct + opportunity;
        let percentage = if contract_value > 0.0 {
            total / contract_value * 100.0
        } else {
            0.0
        };

        EconomicImpact {
            contract_value,
            estimated_direct_costs: round2(direct),
            estimated_opportunity_costs: round2(opportunity),
            total_risk_cost: round2(total),
            risk_adjusted_value: round2(contract_value - total),
            risk_percentage: round2(percentage),
            economic_viability: viability(percentage),
            recommendations: recommendations(risks, total),
        }
    }

    fn direct_costs(&self, risks: &[FinancialRisk]) -> f64 {
        risks
            .iter()
            .map(|risk| {
                let base = self
                    .cost_table
                    .get(&risk.risk_type)
                    .map_or(DEFAULT_BASE_COST, CostEstimate::base);
                base * risk.severity.cost_multiplier()
            })
            .sum()
    }
}

fn opportunity_costs(risks: &[FinancialRisk]) -> f64 {
    risks
        .iter()
        .flat_map(|risk| {
            OPPORTUNITY_RULES
                .iter()
                .filter(move |rule| risk.risk_type.contains(rule.needle))
        })
        .map(|rule| rule.bonus)
        .sum()
}

pub fn viability(risk_percentage: f64) -> EconomicViability {
    if risk_percentage >= 50.0 {
        EconomicViability::NotRecommended
    } else if risk_percentage >= 30.0 {
        EconomicViability::CautionAdvised
    } else if risk_percentage >= 15.0 {
        EconomicViability::AcceptableWithNegotiations
    } else {
        EconomicViability::EconomicallyViable
    }
}

fn recommendations(risks: &[FinancialRisk], total_cost: f64) -> Vec<String> {
    let mut out: Vec<String> = RECOMMENDATION_RULES
        .iter()
        .filter(|rule| rule.applies(risks, total_cost))
        .map(|rule| rule.text.to_string())
        .collect();

    if out.is_empty() {
        out.push(FALLBACK_RECOMMENDATION.to_string());
    }
    out
}

/// Round a dollar or percentage figure to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{FinancialImpact, Severity};

    fn risk(risk_type: &str, severity: Severity) -> FinancialRisk {
        FinancialRisk::new(risk_type, "test", severity, FinancialImpact::Moderate)
    }

    #[test]
    fn test_no_risks_is_viable() {
        let impact = EconomicImpactModel::new().calculate(&[], DEFAULT_CONTRACT_VALUE);
        assert_eq!(impact.total_risk_cost, 0.0);
        assert_eq!(impact.risk_adjusted_value, 10_000.0);
        assert_eq!(impact.economic_viability, EconomicViability::EconomicallyViable);
        assert_eq!(
            impact.recommendations,
            vec!["Standard contract terms - minimal concerns"]
        );
    }

    #[test]
    fn test_tiered_cost_uses_first_tier() {
        // A Net-90 finding still costs the Net-60 base.
        let impact = EconomicImpactModel::new()
            .calculate(&[risk("Extended Payment Terms", Severity::High)], 10_000.0);
        assert_eq!(impact.estimated_direct_costs, 1_000.0);
        assert_eq!(impact.estimated_opportunity_costs, 300.0);
        assert_eq!(impact.total_risk_cost, 1_300.0);
        assert_eq!(impact.risk_percentage, 13.0);
    }

    #[test]
    fn test_unknown_type_uses_default_cost() {
        let impact = EconomicImpactModel::new()
            .calculate(&[risk("Penalty Provisions", Severity::Medium)], 10_000.0);
        assert_eq!(impact.estimated_direct_costs, 1_500.0);
        assert_eq!(impact.estimated_opportunity_costs, 0.0);
    }

    #[test]
    fn test_zero_contract_value_has_zero_percentage() {
        let impact = EconomicImpactModel::new()
            .calculate(&[risk("Unlimited Liability", Severity::Critical)], 0.0);
        assert_eq!(impact.risk_percentage, 0.0);
        assert_eq!(impact.risk_adjusted_value, -30_000.0);
        assert_eq!(impact.economic_viability, EconomicViability::EconomicallyViable);
    }

    #[test]
    fn test_multiple_opportunity_bonuses_accumulate() {
        let impact = EconomicImpactModel::new().calculate(
            &[risk("Non-Compete after Termination", Severity::Low)],
            100_000.0,
        );
        assert_eq!(impact.estimated_opportunity_costs, 4_500.0);
    }

    #[test]
    fn test_risk_adjusted_value_may_be_negative() {
        let risks = vec![
            risk("Unlimited Liability", Severity::Critical),
            risk("Indemnification Obligation", Severity::High),
        ];
        let impact = EconomicImpactModel::new().calculate(&risks, 10_000.0);
        assert_eq!(impact.total_risk_cost, 40_000.0);
        assert_eq!(impact.risk_adjusted_value, -30_000.0);
        assert_eq!(impact.risk_percentage, 400.0);
        assert_eq!(impact.economic_viability, EconomicViability::NotRecommended);
    }

    #[test]
    fn test_recommendations_fire_in_order() {
        let risks = vec![
            risk("Extended Payment Terms", Severity::Medium),
            risk("Unlimited Liability", Severity::Critical),
            risk("Termination Risk", Severity::High),
            risk("Penalty Clause", Severity::Medium),
        ];
        let impact = EconomicImpactModel::new().calculate(&risks, 10_000.0);
        assert_eq!(
            impact.recommendations,
            vec![
                "Negotiate for shorter payment terms (Net-30 instead of Net-60/90)",
                "Request a liability cap or obtain insurance coverage",
                "Seek longer notice period or termination fee provisions",
                "Consider requesting contract value increase to offset risks",
                "Comprehensive legal review recommended before signing",
            ]
        );
    }

    #[test]
    fn test_viability_thresholds() {
        assert_eq!(viability(50.0), EconomicViability::NotRecommended);
        assert_eq!(viability(30.0), EconomicViability::CautionAdvised);
        assert_eq!(viability(15.0), EconomicViability::AcceptableWithNegotiations);
        assert_eq!(viability(14.99), EconomicViability::EconomicallyViable);
    }

    #[test]
    fn test_custom_cost_table() {
        let model = EconomicImpactModel::with_cost_table(IndexMap::from([(
            "Penalty Clause".to_string(),
            CostEstimate::Flat(100.0),
        )]));
        let impact = model.calculate(&[risk("Penalty Clause", Severity::Low)], 1_000.0);
        assert_eq!(impact.estimated_direct_costs, 100.0);
        assert_eq!(impact.risk_percentage, 10.0);
    }
}

//! Data models for contract risk assessment

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum trimmed length (exclusive) for a clause to be kept
pub const MIN_CLAUSE_LEN: usize = 10;

/// One segmented unit of contract text
///
/// Always trimmed and longer than [`MIN_CLAUSE_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause(String);

impl Clause {
    /// Build a clause from raw text, returning `None` when the trimmed text is too short
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.chars().count() > MIN_CLAUSE_LEN {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Clause {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category assigned to a clause by the labeler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseCategory {
    #[serde(rename = "Financial Liability")]
    FinancialLiability,
    #[serde(rename = "Termination and Cancellation")]
    TerminationAndCancellation,
    #[serde(rename = "Payment Terms")]
    PaymentTerms,
    #[serde(rename = "Intellectual Property Ownership")]
    IntellectualPropertyOwnership,
    #[serde(rename = "Confidentiality")]
    Confidentiality,
    #[serde(rename = "Indemnification")]
    Indemnification,
    #[serde(rename = "Safe Clause")]
    SafeClause,
}

impl ClauseCategory {
    /// All categories in the fixed candidate-label order
    pub const ALL: [ClauseCategory; 7] = [
        ClauseCategory::FinancialLiability,
        ClauseCategory::TerminationAndCancellation,
        ClauseCategory::PaymentTerms,
        ClauseCategory::IntellectualPropertyOwnership,
        ClauseCategory::Confidentiality,
        ClauseCategory::Indemnification,
        ClauseCategory::SafeClause,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClauseCategory::FinancialLiability => "Financial Liability",
            ClauseCategory::TerminationAndCancellation => "Termination and Cancellation",
            ClauseCategory::PaymentTerms => "Payment Terms",
            ClauseCategory::IntellectualPropertyOwnership => "Intellectual Property Ownership",
            ClauseCategory::Confidentiality => "Confidentiality",
            ClauseCategory::Indemnification => "Indemnification",
            ClauseCategory::SafeClause => "Safe Clause",
        }
    }

    /// Parse a labeler output label (exact match)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// The risk category, or `None` for safe clauses
    pub fn as_risk(&self) -> Option<RiskCategory> {
        match self {
            ClauseCategory::FinancialLiability => Some(RiskCategory::FinancialLiability),
            ClauseCategory::TerminationAndCancellation => {
                Some(RiskCategory::TerminationAndCancellation)
            }
            ClauseCategory::PaymentTerms => Some(RiskCategory::PaymentTerms),
            ClauseCategory::IntellectualPropertyOwnership => {
                Some(RiskCategory::IntellectualPropertyOwnership)
            }
            ClauseCategory::Confidentiality => Some(RiskCategory::Confidentiality),
            ClauseCategory::Indemnification => Some(RiskCategory::Indemnification),
            ClauseCategory::SafeClause => None,
        }
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk-bearing categories (every category except the safe one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Financial Liability")]
    FinancialLiability,
    #[serde(rename = "Termination and Cancellation")]
    TerminationAndCancellation,
    #[serde(rename = "Payment Terms")]
    PaymentTerms,
    #[serde(rename = "Intellectual Property Ownership")]
    IntellectualPropertyOwnership,
    #[serde(rename = "Confidentiality")]
    Confidentiality,
    #[serde(rename = "Indemnification")]
    Indemnification,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::FinancialLiability => "Financial Liability",
            RiskCategory::TerminationAndCancellation => "Termination and Cancellation",
            RiskCategory::PaymentTerms => "Payment Terms",
            RiskCategory::IntellectualPropertyOwnership => "Intellectual Property Ownership",
            RiskCategory::Confidentiality => "Confidentiality",
            RiskCategory::Indemnification => "Indemnification",
        }
    }

    /// Risk tier, a pure function of the category
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            RiskCategory::FinancialLiability
            | RiskCategory::Indemnification
            | RiskCategory::TerminationAndCancellation => RiskLevel::High,
            RiskCategory::PaymentTerms
            | RiskCategory::IntellectualPropertyOwnership
            | RiskCategory::Confidentiality => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Low,
}

/// Top prediction of the labeler for one clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseLabel {
    pub clause: Clause,
    pub category: ClauseCategory,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// A risky clause retained by the risk filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub clause: String,
    pub category: RiskCategory,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// One deduction applied by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub category: RiskCategory,
    /// First 50 characters of the clause followed by "..."
    pub clause: String,
    /// Always negative
    pub penalty: i32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    /// Clamped to [0, 100]
    pub total_score: u8,
    pub breakdown: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "Employment Agreement")]
    Employment,
    #[serde(rename = "Independent Contractor Agreement")]
    IndependentContractor,
    #[serde(rename = "Non-Disclosure Agreement")]
    NonDisclosure,
    #[serde(rename = "Service Agreement")]
    Service,
    #[serde(rename = "Partnership Agreement")]
    Partnership,
    #[serde(rename = "License Agreement")]
    License,
    #[serde(rename = "General Agreement")]
    General,
}

impl ContractType {
    /// Named contract types in detection order
    pub const NAMED: [ContractType; 6] = [
        ContractType::Employment,
        ContractType::IndependentContractor,
        ContractType::NonDisclosure,
        ContractType::Service,
        ContractType::Partnership,
        ContractType::License,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContractType::Employment => "Employment Agreement",
            ContractType::IndependentContractor => "Independent Contractor Agreement",
            ContractType::NonDisclosure => "Non-Disclosure Agreement",
            ContractType::Service => "Service Agreement",
            ContractType::Partnership => "Partnership Agreement",
            ContractType::License => "License Agreement",
            ContractType::General => "General Agreement",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTerm {
    pub duration: String,
    pub has_fixed_term: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureQuality {
    Comprehensive,
    Standard,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalStructure {
    pub contract_type: ContractType,
    /// Role name to party name, in detection order
    pub parties: IndexMap<String, String>,
    pub key_sections: Vec<String>,
    pub term: ContractTerm,
    pub total_obligations: usize,
    pub structure_quality: StructureQuality,
}

/// Ordinal severity shared by individual financial risks and the aggregate assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Severity {
    /// Weight used for exposure aggregation
    pub fn weight(&self) -> u32 {
        *self as u32
    }

    /// Direct-cost multiplier used by the economic model
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            Severity::Critical => 3.0,
            Severity::High => 2.0,
            Severity::Medium => 1.5,
            Severity::Low => 1.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// Informational impact tag attached to a financial risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialImpact {
    Critical,
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRisk {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub description: String,
    pub severity: Severity,
    pub financial_impact: FinancialImpact,
}

impl FinancialRisk {
    pub fn new(
        risk_type: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        financial_impact: FinancialImpact,
    ) -> Self {
        Self {
            risk_type: risk_type.into(),
            description: description.into(),
            severity,
            financial_impact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exposure {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Exposure::Low => "Low",
            Exposure::Moderate => "Moderate",
            Exposure::High => "High",
            Exposure::VeryHigh => "Very High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAssessment {
    pub risks: Vec<FinancialRisk>,
    /// Always equal to `risks.len()`
    pub total_risk_count: usize,
    pub estimated_exposure: Exposure,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EconomicViability {
    #[serde(rename = "Not Recommended - High Risk to Value Ratio")]
    NotRecommended,
    #[serde(rename = "Caution Advised - Significant Risk Exposure")]
    CautionAdvised,
    #[serde(rename = "Acceptable with Negotiations")]
    AcceptableWithNegotiations,
    #[serde(rename = "Economically Viable")]
    EconomicallyViable,
}

impl fmt::Display for EconomicViability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EconomicViability::NotRecommended => "Not Recommended - High Risk to Value Ratio",
            EconomicViability::CautionAdvised => "Caution Advised - Significant Risk Exposure",
            EconomicViability::AcceptableWithNegotiations => "Acceptable with Negotiations",
            EconomicViability::EconomicallyViable => "Economically Viable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicImpact {
    pub contract_value: f64,
    pub estimated_direct_costs: f64,
    pub estimated_opportunity_costs: f64,
    pub total_risk_cost: f64,
    /// May be negative
    pub risk_adjusted_value: f64,
    pub risk_percentage: f64,
    pub economic_viability: EconomicViability,
    pub recommendations: Vec<String>,
}

/// Complete result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub risk_score: u8,
    pub score_breakdown: Vec<ScoreEntry>,
    pub risks: Vec<RiskItem>,
    pub total_clauses_analyzed: usize,
    pub legal_structure: LegalStructure,
    pub financial_risks: FinancialAssessment,
    pub economic_impact: EconomicImpact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_length_floor() {
        assert!(Clause::new("   1.  ").is_none());
        assert!(Clause::new("0123456789").is_none());
        let clause = Clause::new("  First point.  ").unwrap();
        assert_eq!(clause.as_str(), "First point.");
    }

    #[test]
    fn test_category_label_round_trip() {
        for category in ClauseCategory::ALL {
            assert_eq!(ClauseCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(ClauseCategory::from_label("financial liability"), None);
    }

    #[test]
    fn test_safe_clause_has_no_risk_category() {
        assert_eq!(ClauseCategory::SafeClause.as_risk(), None);
        assert_eq!(
            ClauseCategory::FinancialLiability.as_risk(),
            Some(RiskCategory::FinancialLiability)
        );
    }

    #[test]
    fn test_risk_level_mapping() {
        assert_eq!(RiskCategory::FinancialLiability.risk_level(), RiskLevel::High);
        assert_eq!(RiskCategory::Indemnification.risk_level(), RiskLevel::High);
        assert_eq!(
            RiskCategory::TerminationAndCancellation.risk_level(),
            RiskLevel::High
        );
        assert_eq!(RiskCategory::PaymentTerms.risk_level(), RiskLevel::Low);
        assert_eq!(RiskCategory::Confidentiality.risk_level(), RiskLevel::Low);
        assert_eq!(
            RiskCategory::IntellectualPropertyOwnership.risk_level(),
            RiskLevel::Low
        );
    }

    #[test]
    fn test_wire_names() {
        let risk = FinancialRisk::new(
            "Unlimited Liability",
            "No cap",
            Severity::Critical,
            FinancialImpact::Critical,
        );
        let json = serde_json::to_value(&risk).unwrap();
        assert_eq!(json["type"], "Unlimited Liability");
        assert_eq!(json["severity"], "Critical");
        assert_eq!(json["financialImpact"], "critical");

        assert_eq!(
            serde_json::to_value(Exposure::VeryHigh).unwrap(),
            "Very High"
        );
        assert_eq!(
            serde_json::to_value(RiskCategory::PaymentTerms).unwrap(),
            "Payment Terms"
        );
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::Critical.weight(), 4);
        assert_eq!(Severity::High.weight(), 3);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::Low.weight(), 1);
    }
}

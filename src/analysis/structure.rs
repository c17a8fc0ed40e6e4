//! Legal structure analysis
//!
//! Full-text scans for contract type, parties, key sections and term length.
//! Every sub-scan is independent of the others.

use indexmap::IndexMap;
use regex::Regex;

use super::models::{Clause, ContractTerm, ContractType, LegalStructure, StructureQuality};

/// Section keywords in reporting order
pub const SECTION_KEYWORDS: [&str; 10] = [
    "Payment",
    "Compensation",
    "Termination",
    "Confidentiality",
    "Intellectual Property",
    "Non-Compete",
    "Indemnification",
    "Liability",
    "Warranties",
    "Governing Law",
];

const CRITICAL_SECTIONS: [&str; 3] = ["Payment", "Termination", "Liability"];

#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    company_regex: Regex,
    contractor_regex: Regex,
    duration_regex: Regex,
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureAnalyzer {
    pub fn new() -> Self {
        // Party names are capitalised and case-sensitive, corporate suffix optional.
        let company_regex = Regex::new(r"Company[:\s]*([A-Z][a-z\s&]+(?:Inc\.|LLC|Corp\.|Ltd\.)?)")
            .expect("Invalid company regex");
        let contractor_regex =
            Regex::new(r"Contractor[:\s]*([A-Z][a-z\s]+)").expect("Invalid contractor regex");
        let duration_regex =
            Regex::new(r"(?i)(\d+)\s*(year|month|day)s?").expect("Invalid duration regex");

        Self {
            company_regex,
            contractor_regex,
            duration_regex,
        }
    }

    pub fn analyze(&self, full_text: &str, clauses: &[Clause]) -> LegalStructure {
        let lowered = full_text.to_lowercase();
        let key_sections = identify_sections(&lowered);
        let structure_quality = assess_quality(&key_sections);

        LegalStructure {
            contract_type: detect_contract_type(&lowered),
            parties: self.extract_parties(full_text),
            key_sections,
            term: self.analyze_term(full_text),
            total_obligations: clauses.len(),
            structure_quality,
        }
    }

    fn extract_parties(&self, text: &str) -> IndexMap<String, String> {
        let mut parties = IndexMap::new();

        if let Some(name) = first_capture(&self.company_regex, text) {
            parties.insert("company".to_string(), name);
        }
        if let Some(name) = first_capture(&self.contractor_regex, text) {
            parties.insert("contractor".to_string(), name);
        }

        if parties.is_empty() {
            parties.insert("party_1".to_string(), "First Party".to_string());
            parties.insert("party_2".to_string(), "Second Party".to_string());
        }
        parties
    }

    fn analyze_term(&self, text: &str) -> ContractTerm {
        match self.duration_regex.captures(text) {
            Some(caps) => ContractTerm {
                duration: format!("{} {}(s)", &caps[1], caps[2].to_lowercase()),
                has_fixed_term: true,
            },
            None => ContractTerm {
                duration: "Undefined".to_string(),
                has_fixed_term: false,
            },
        }
    }
}

fn first_capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

fn detect_contract_type(lowered: &str) -> ContractType {
    if let Some(named) = ContractType::NAMED
        .iter()
        .find(|t| lowered.contains(&t.label().to_lowercase()))
    {
        return *named;
    }

    if lowered.contains("employment") || lowered.contains("employee") {
        ContractType::Employment
    } else if lowered.contains("contractor") || lowered.contains("independent") {
        ContractType::IndependentContractor
    } else if lowered.contains("confidential") && lowered.contains("nda") {
        ContractType::NonDisclosure
    } else {
        ContractType::General
    }
}

fn identify_sections(lowered: &str) -> Vec<String> {
    SECTION_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .collect()
}

fn assess_quality(sections: &[String]) -> StructureQuality {
    let critical = sections
        .iter()
        .filter(|s| CRITICAL_SECTIONS.contains(&s.as_str()))
        .count();

    if critical >= 3 && sections.len() >= 5 {
        StructureQuality::Comprehensive
    } else if critical >= 2 {
        StructureQuality::Standard
    } else {
        StructureQuality::Basic
    }
}

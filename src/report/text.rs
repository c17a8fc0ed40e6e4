//! Paginated plain-text intelligence report
//!
//! Every major section starts on a new page. Pages hold at most
//! `lines_per_page` lines including the footer and are separated by a form feed.

use chrono::{DateTime, Local, TimeZone};
use std::path::Path;
use tracing::debug;

use super::{ensure_parent, DocumentRenderer, RenderError};
use crate::analysis::models::Assessment;

const FORM_FEED: char = '\u{c}';
const WRAP_WIDTH: usize = 88;
const MAX_FINANCIAL_RISKS: usize = 10;
const MAX_DETAILED_RISKS: usize = 15;
const CLAUSE_EXCERPT_CHARS: usize = 200;
const KEY_SECTIONS_CHARS: usize = 100;
/// Blank separator line plus the page footer
const FOOTER_LINES: usize = 2;

#[derive(Debug, Clone)]
pub struct TextReportRenderer {
    lines_per_page: usize,
}

impl Default for TextReportRenderer {
    fn default() -> Self {
        Self::new(56)
    }
}

impl TextReportRenderer {
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(FOOTER_LINES + 1),
        }
    }

    pub fn render_to_string<Tz>(&self, assessment: &Assessment, generated_at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut sections = vec![summary_section(assessment, generated_at)];
        sections.push(legal_section(assessment));
        if assessment.financial_risks.total_risk_count > 0 {
            sections.push(financial_section(assessment));
        }
        sections.push(economic_section(assessment));
        if !assessment.risks.is_empty() {
            sections.push(detailed_risks_section(assessment));
        }

        self.paginate(sections)
    }

    fn paginate(&self, sections: Vec<Vec<String>>) -> String {
        let body = self.lines_per_page - FOOTER_LINES;
        let pages: Vec<&[String]> = sections
            .iter()
            .flat_map(|section| section.chunks(body))
            .collect();
        let total = pages.len();

        pages
            .iter()
            .enumerate()
            .map(|(i, lines)| {
                let mut page = lines.join("\n");
                page.push_str(&format!("\n\nPage {} of {}\n", i + 1, total));
                page
            })
            .collect::<Vec<_>>()
            .join(&FORM_FEED.to_string())
    }
}

impl DocumentRenderer for TextReportRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, assessment: &Assessment, output: &Path) -> Result<(), RenderError> {
        let content = self.render_to_string(assessment, &Local::now());
        ensure_parent(output)?;
        std::fs::write(output, content)?;
        debug!("Wrote text report to {}", output.display());
        Ok(())
    }
}

/// Risk band for the overall score
pub fn interpret_score(score: u8) -> &'static str {
    if score >= 70 {
        "HIGH RISK"
    } else if score >= 40 {
        "MEDIUM RISK"
    } else {
        "LOW RISK"
    }
}

fn summary_section<Tz>(assessment: &Assessment, generated_at: &DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    vec![
        "CONTRACT INTELLIGENCE REPORT".to_string(),
        format!(
            "Generated: {}",
            generated_at.format("%B %d, %Y at %I:%M %p")
        ),
        String::new(),
        "RISK ASSESSMENT".to_string(),
        format!("Overall Risk Score (0-100): {}", assessment.risk_score),
        format!("Interpretation: {}", interpret_score(assessment.risk_score)),
        format!("Clauses Analyzed: {}", assessment.total_clauses_analyzed),
    ]
}

fn legal_section(assessment: &Assessment) -> Vec<String> {
    let legal = &assessment.legal_structure;
    let sections: String = legal
        .key_sections
        .join(", ")
        .chars()
        .take(KEY_SECTIONS_CHARS)
        .collect();
    let parties = legal
        .parties
        .iter()
        .map(|(role, name)| format!("{}: {}", role, name))
        .collect::<Vec<_>>()
        .join("; ");

    vec![
        "LEGAL STRUCTURE ANALYSIS".to_string(),
        String::new(),
        format!("Contract Type:      {}", legal.contract_type),
        format!("Structure Quality:  {:?}", legal.structure_quality),
        format!("Term:               {}", legal.term.duration),
        format!("Key Sections:       {}", sections),
        format!("Parties:            {}", parties),
        format!("Total Obligations:  {}", legal.total_obligations),
    ]
}

fn financial_section(assessment: &Assessment) -> Vec<String> {
    let fin = &assessment.financial_risks;
    let mut lines = vec![
        "FINANCIAL RISK DETECTION".to_string(),
        String::new(),
        format!("Total Financial Risks:  {}", fin.total_risk_count),
        format!("Estimated Exposure:     {}", fin.estimated_exposure),
        format!("Severity:               {}", fin.severity),
        String::new(),
        "Detected Risks:".to_string(),
    ];

    for (idx, risk) in fin.risks.iter().take(MAX_FINANCIAL_RISKS).enumerate() {
        lines.push(format!("{}. {} [{}]", idx + 1, risk.risk_type, risk.severity));
        lines.extend(wrap(&risk.description, "   "));
    }
    lines
}

fn economic_section(assessment: &Assessment) -> Vec<String> {
    let econ = &assessment.economic_impact;
    let mut lines = vec![
        "ECONOMIC IMPACT ANALYSIS".to_string(),
        String::new(),
        format!("Contract Value:       {}", format_money(econ.contract_value)),
        format!("Direct Costs:         {}", format_money(econ.estimated_direct_costs)),
        format!("Opportunity Costs:    {}", format_money(econ.estimated_opportunity_costs)),
        format!("Total Risk Cost:      {}", format_money(econ.total_risk_cost)),
        format!("Risk-Adjusted Value:  {}", format_money(econ.risk_adjusted_value)),
        format!("Risk Percentage:      {:.2}%", econ.risk_percentage),
        format!("Economic Viability:   {}", econ.economic_viability),
    ];

    if !econ.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("RECOMMENDATIONS".to_string());
        for (idx, rec) in econ.recommendations.iter().enumerate() {
            lines.extend(wrap(&format!("{}. {}", idx + 1, rec), ""));
        }
    }
    lines
}

fn detailed_risks_section(assessment: &Assessment) -> Vec<String> {
    let mut lines = vec!["IDENTIFIED RISKS (DETAILED)".to_string(), String::new()];

    for (idx, risk) in assessment.risks.iter().take(MAX_DETAILED_RISKS).enumerate() {
        lines.push(format!(
            "{}. {} - Confidence: {:.1}%",
            idx + 1,
            risk.category,
            risk.confidence * 100.0
        ));
        let excerpt: String = risk.clause.chars().take(CLAUSE_EXCERPT_CHARS).collect();
        lines.extend(wrap(&format!("Clause: {}...", excerpt), "   "));
        lines.extend(wrap(&risk.explanation, "   "));
        lines.push(String::new());
    }
    lines
}

/// Greedy word wrap with a fixed indent on every line
fn wrap(text: &str, indent: &str) -> Vec<String> {
    let width = WRAP_WIDTH.saturating_sub(indent.len()).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(format!("{}{}", indent, current));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(format!("{}{}", indent, current));
    }
    lines
}

/// Dollar amount with thousands separators and cents
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

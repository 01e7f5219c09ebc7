use std::fmt::Write;

use contractscan_core::comparison::Differences;
use contractscan_core::contract::ContractStats;
use contractscan_core::{Comparison, Contract, ContractComparison, Severity};

fn risk_label(risk: Option<Severity>) -> &'static str {
    risk.map(|r| r.as_str()).unwrap_or("-")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

pub fn contract(c: &Contract) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", c.title, c.id);
    let _ = writeln!(
        out,
        "risk: {}  type: {}  source: {}  created: {}",
        risk_label(c.risk_level),
        c.contract_type,
        c.source,
        c.created_at.format("%Y-%m-%d %H:%M")
    );

    if !c.issues.is_empty() {
        let _ = writeln!(out, "\nIssues:");
        for (i, issue) in c.issues.iter().enumerate() {
            let label = if issue.label.is_empty() {
                issue.category.display_name()
            } else {
                issue.label.as_str()
            };
            let _ = writeln!(
                out,
                "{}. [{} {}/10] {}",
                i + 1,
                issue.severity.as_str(),
                issue.severity_score,
                label
            );
            if !issue.text.is_empty() {
                let _ = writeln!(out, "   clause:     \"{}\"", truncate(&issue.text, 100));
            }
            if !issue.explanation.is_empty() {
                let _ = writeln!(out, "   why:        {}", issue.explanation);
            }
            if !issue.suggestion.is_empty() {
                let _ = writeln!(out, "   suggestion: {}", issue.suggestion);
            }
        }
    }

    for (heading, items) in [
        ("Recommended actions", &c.recommended_actions),
        ("Compliance flags", &c.compliance_flags),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}:");
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    out.trim_end().to_string()
}

pub fn contract_table(contracts: &[Contract]) -> String {
    if contracts.is_empty() {
        return "No contracts found.".to_string();
    }
    let mut out = format!(
        "{:<38} {:<9} {:<10} {:>6}  {:<17} TITLE\n",
        "ID", "RISK", "SOURCE", "ISSUES", "CREATED"
    );
    for c in contracts {
        let _ = writeln!(
            out,
            "{:<38} {:<9} {:<10} {:>6}  {:<17} {}",
            c.id,
            risk_label(c.risk_level),
            c.source.as_str(),
            c.issues.len(),
            c.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&c.title, 40)
        );
    }
    out.trim_end().to_string()
}

pub fn stats(s: &ContractStats) -> String {
    format!(
        "contracts: {}\nissues:    {}\ncritical:  {}\nhigh:      {}\nmedium:    {}\nlow:       {}",
        s.total_contracts, s.total_issues, s.critical, s.high, s.medium, s.low
    )
}

fn differences(out: &mut String, d: &Differences) {
    if d.is_empty() {
        let _ = writeln!(out, "No differences reported.");
        return;
    }
    for added in &d.added {
        let _ = writeln!(out, "+ {added}");
    }
    for removed in &d.removed {
        let _ = writeln!(out, "- {removed}");
    }
    for m in &d.modified {
        let _ = writeln!(out, "~ {} -> {}", truncate(&m.original, 60), truncate(&m.revised, 60));
        if !m.explanation.is_empty() {
            let _ = writeln!(out, "  {}", m.explanation);
        }
    }
}

pub fn comparison(c: &ContractComparison) -> String {
    let mut out = String::new();
    let risk = &c.risk_assessment;
    let _ = writeln!(
        out,
        "risk: {} -> {}",
        risk.original_risk.as_str(),
        risk.revised_risk.as_str()
    );
    if !c.summary.is_empty() {
        let _ = writeln!(out, "\n{}", c.summary);
    }
    let _ = writeln!(out);
    differences(&mut out, &c.differences);
    for (heading, items) in [("Improvements", &risk.improvements), ("Concerns", &risk.concerns)] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}:");
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    out.trim_end().to_string()
}

pub fn stored_comparison(c: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "comparison {}", c.id);
    let _ = writeln!(
        out,
        "original: {}\nrevised:  {}",
        c.original_contract_id, c.revised_contract_id
    );
    if !c.summary.is_empty() {
        let _ = writeln!(out, "\n{}", c.summary);
    }
    let _ = writeln!(out);
    differences(&mut out, &c.differences);
    out.trim_end().to_string()
}

pub fn comparison_table(comparisons: &[Comparison]) -> String {
    if comparisons.is_empty() {
        return "No comparisons found.".to_string();
    }
    let mut out = format!("{:<38} {:<17} SUMMARY\n", "ID", "CREATED");
    for c in comparisons {
        let _ = writeln!(
            out,
            "{:<38} {:<17} {}",
            c.id,
            c.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&c.summary, 60)
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contractscan_core::comparison::{ModifiedClause, RiskAssessment};
    use contractscan_core::{ContractIssue, ContractSource, ContractType, IssueType};

    fn sample_contract() -> Contract {
        Contract {
            id: "c1".into(),
            user_id: "default".into(),
            title: "Acme MSA".into(),
            original_text: "text".into(),
            source: ContractSource::Analyzed,
            risk_level: Some(Severity::High),
            contract_type: ContractType::Service,
            recommended_actions: vec!["Add a kill fee".into()],
            compliance_flags: vec![],
            issues: vec![ContractIssue {
                category: IssueType::Termination,
                label: String::new(),
                text: "Client may cancel at any time".into(),
                explanation: "No compensation for work done".into(),
                suggestion: "Add a 25% kill fee".into(),
                severity: Severity::High,
                severity_score: 8,
                industry_relevance: vec!["general".into()],
                metadata: serde_json::Map::new(),
            }],
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn contract_lists_issues_and_actions() {
        let text = contract(&sample_contract());
        assert!(text.starts_with("Acme MSA (c1)"));
        assert!(text.contains("risk: HIGH"));
        assert!(text.contains("1. [HIGH 8/10] Termination"));
        assert!(text.contains("suggestion: Add a 25% kill fee"));
        assert!(text.contains("Recommended actions:\n- Add a kill fee"));
        assert!(!text.contains("Compliance flags"));
    }

    #[test]
    fn generated_contract_has_no_risk() {
        let mut c = sample_contract();
        c.risk_level = None;
        c.source = ContractSource::Generated;
        let table = contract_table(&[c]);
        assert!(table.contains(" -  "));
        assert!(table.contains("generated"));
    }

    #[test]
    fn empty_tables() {
        assert_eq!(contract_table(&[]), "No contracts found.");
        assert_eq!(comparison_table(&[]), "No comparisons found.");
    }

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn comparison_shows_risk_change_and_diffs() {
        let c = ContractComparison {
            differences: Differences {
                added: vec!["Kill fee".into()],
                removed: vec!["Unlimited revisions".into()],
                modified: vec![ModifiedClause {
                    original: "Net 90".into(),
                    revised: "Net 30".into(),
                    explanation: "Faster payment".into(),
                }],
            },
            summary: "Better for the freelancer.".into(),
            risk_assessment: RiskAssessment {
                original_risk: Severity::High,
                revised_risk: Severity::Low,
                improvements: vec!["Payment terms".into()],
                concerns: vec![],
            },
        };
        let text = comparison(&c);
        assert!(text.starts_with("risk: HIGH -> LOW"));
        assert!(text.contains("+ Kill fee"));
        assert!(text.contains("- Unlimited revisions"));
        assert!(text.contains("~ Net 90 -> Net 30"));
        assert!(text.contains("Improvements:\n- Payment terms"));
        assert!(!text.contains("Concerns"));
    }
}

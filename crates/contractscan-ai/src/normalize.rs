//! Coerce raw model output into typed results.
//!
//! Analysis normalization never fails: output that cannot be read as a JSON
//! object yields a degraded fallback analysis. Comparison normalization
//! reports `MalformedResponse` instead, since there is no useful fallback
//! diff.

use std::collections::BTreeMap;

use contractscan_core::comparison::{Differences, ModifiedClause, RiskAssessment};
use contractscan_core::{
    ContractAnalysis, ContractComparison, ContractIssue, ContractType, IssueType, Severity,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{extract, AiError};

pub const FALLBACK_ACTION: &str = "Try again or contact support";
const DEFAULT_RELEVANCE: &str = "general";

/// Parse the first `{...}` candidate in `raw` that is a JSON object,
/// repairing trailing commas. Brace-wrapped prose before it is skipped.
pub fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    extract::json_objects(raw).find_map(parse_candidate)
}

fn parse_candidate(candidate: &str) -> Option<Map<String, Value>> {
    let value = serde_json::from_str::<Value>(candidate)
        .or_else(|_| serde_json::from_str::<Value>(&extract::strip_trailing_commas(candidate)))
        .ok()?;
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Normalize an analysis response. Always returns a valid analysis.
pub fn analysis(raw: &str) -> ContractAnalysis {
    match parse_object(raw) {
        Some(obj) => analysis_from(unwrap_envelope(obj, "analysis")),
        None => {
            warn!("analysis response was not a JSON object ({} chars), using fallback", raw.len());
            fallback_analysis()
        }
    }
}

/// The analysis returned when model output is unusable.
pub fn fallback_analysis() -> ContractAnalysis {
    ContractAnalysis {
        risk_level: Severity::Medium,
        contract_type: ContractType::Other,
        recommended_actions: vec![FALLBACK_ACTION.to_string()],
        compliance_flags: vec![],
        issues: vec![ContractIssue {
            category: IssueType::Other,
            label: "API Error".into(),
            text: "Error processing contract".into(),
            explanation: "We encountered an error while analyzing your contract. \
                          Our system wasn't able to process it correctly."
                .into(),
            suggestion: "Please try again with a simpler contract text or contact support \
                         if the issue persists."
                .into(),
            severity: Severity::Medium,
            severity_score: Severity::Medium.default_score(),
            industry_relevance: vec![DEFAULT_RELEVANCE.to_string()],
            metadata: Map::new(),
        }],
        industry_risk: BTreeMap::new(),
        degraded: true,
    }
}

fn analysis_from(obj: Map<String, Value>) -> ContractAnalysis {
    let risk_level = Severity::coerce(field(&obj, &["riskLevel", "risk_level"]));
    let contract_type = ContractType::coerce(field(&obj, &["type", "contractType", "contract_type"]));

    let issues = match field(&obj, &["issues"]) {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(issue_from)
            .collect(),
        _ => Vec::new(),
    };

    let industry_risk = match field(&obj, &["industrySpecificRisk", "industryRisk", "industry_risk"]) {
        Value::Object(m) => m
            .iter()
            .filter(|(k, _)| !k.trim().is_empty())
            .filter_map(|(k, v)| number(v).map(|n| (k.trim().to_string(), clamp(n, 0, 10))))
            .collect(),
        _ => BTreeMap::new(),
    };

    ContractAnalysis {
        risk_level,
        contract_type,
        recommended_actions: string_list(field(&obj, &["recommendedActions", "recommended_actions"])),
        compliance_flags: string_list(field(&obj, &["complianceFlags", "compliance_flags"])),
        issues,
        industry_risk,
        degraded: false,
    }
}

fn issue_from(obj: &Map<String, Value>) -> ContractIssue {
    let label = text(obj, &["type", "category", "title"]);
    let category = if label.is_empty() {
        IssueType::Other
    } else {
        IssueType::classify(&label)
    };

    let score = number(field(obj, &["severityScore", "severity_score", "score"]));
    let severity = field(obj, &["severity"])
        .as_str()
        .and_then(Severity::parse_str)
        .or_else(|| score.map(|s| Severity::from_score(clamp(s, 1, 10))))
        .unwrap_or(Severity::Medium);
    let severity_score = score
        .map(|s| clamp(s, 1, 10))
        .unwrap_or_else(|| severity.default_score());

    let mut industry_relevance = match field(obj, &["industryRelevance", "industry_relevance"]) {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        v => string_list(v),
    };
    if industry_relevance.is_empty() {
        industry_relevance.push(DEFAULT_RELEVANCE.to_string());
    }

    let metadata = match field(obj, &["metadata"]) {
        Value::Object(m) => m.clone(),
        _ => Map::new(),
    };

    ContractIssue {
        category,
        label,
        text: text(obj, &["text", "clause"]),
        explanation: text(obj, &["explanation"]),
        suggestion: text(obj, &["suggestion"]),
        severity,
        severity_score,
        industry_relevance,
        metadata,
    }
}

/// Normalize a comparison response.
pub fn comparison(raw: &str) -> Result<ContractComparison, AiError> {
    let obj = parse_object(raw)
        .ok_or_else(|| AiError::MalformedResponse("no JSON object in comparison response".into()))?;
    let obj = unwrap_envelope(obj, "comparison");

    let known = ["differences", "summary", "riskAssessment", "risk_assessment"];
    if !known.iter().any(|k| obj.contains_key(*k)) {
        return Err(AiError::MalformedResponse(
            "comparison response has none of differences, summary, riskAssessment".into(),
        ));
    }

    let differences = match field(&obj, &["differences"]) {
        Value::Object(d) => Differences {
            added: string_list(field(d, &["added"])),
            removed: string_list(field(d, &["removed"])),
            modified: match field(d, &["modified"]) {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|m| ModifiedClause {
                        original: text(m, &["original"]),
                        revised: text(m, &["revised"]),
                        explanation: text(m, &["explanation"]),
                    })
                    .filter(|m| !(m.original.is_empty() && m.revised.is_empty()))
                    .collect(),
                _ => Vec::new(),
            },
        },
        _ => Differences::default(),
    };

    let risk_assessment = match field(&obj, &["riskAssessment", "risk_assessment"]) {
        Value::Object(r) => RiskAssessment {
            original_risk: Severity::coerce(field(r, &["originalRisk", "original_risk"])),
            revised_risk: Severity::coerce(field(r, &["revisedRisk", "revised_risk"])),
            improvements: string_list(field(r, &["improvements"])),
            concerns: string_list(field(r, &["concerns"])),
        },
        _ => RiskAssessment {
            original_risk: Severity::Medium,
            revised_risk: Severity::Medium,
            improvements: vec![],
            concerns: vec![],
        },
    };

    Ok(ContractComparison {
        differences,
        summary: text(&obj, &["summary"]),
        risk_assessment,
    })
}

/// Some models nest the payload one level down, e.g. `{"analysis": {...}}`.
fn unwrap_envelope(mut obj: Map<String, Value>, key: &str) -> Map<String, Value> {
    if obj.len() == 1 {
        if let Some(Value::Object(inner)) = obj.remove(key) {
            return inner;
        }
    }
    obj
}

static NULL: Value = Value::Null;

/// First present key among `names`, else `Null`.
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> &'a Value {
    names.iter().find_map(|n| obj.get(*n)).unwrap_or(&NULL)
}

fn text(obj: &Map<String, Value>, names: &[&str]) -> String {
    field(obj, names).as_str().map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Arrays keep their non-blank string elements; anything else is empty.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// JSON numbers and numeric strings ("7", "7.5").
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn clamp(n: f64, lo: u8, hi: u8) -> u8 {
    n.round().clamp(f64::from(lo), f64::from(hi)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> String {
        v.to_string()
    }

    #[test]
    fn braces_in_leading_prose_are_skipped() {
        let a = analysis("Analysis for {Client}:\n{\"riskLevel\": \"HIGH\", \"type\": \"NDA\"}");
        assert!(!a.degraded);
        assert_eq!(a.risk_level, Severity::High);
        assert_eq!(a.contract_type, ContractType::Nda);

        let c = comparison(
            "Changes to {Section 2}: {\"summary\": \"Net 30 now\", \"riskAssessment\": \
             {\"originalRisk\": \"HIGH\", \"revisedRisk\": \"LOW\"}}",
        )
        .unwrap();
        assert_eq!(c.summary, "Net 30 now");
        assert_eq!(c.risk_assessment.revised_risk, Severity::Low);
    }

    #[test]
    fn well_formed_analysis() {
        let a = analysis(&raw(json!({
            "riskLevel": "HIGH",
            "type": "SERVICE",
            "recommendedActions": ["Negotiate a kill fee"],
            "complianceFlags": ["NY Freelance Isn't Free Act"],
            "issues": [{
                "type": "PAYMENT",
                "text": "Payment within 90 days",
                "explanation": "Too long",
                "suggestion": "Net 15",
                "severity": "HIGH",
                "severityScore": 8,
                "industryRelevance": ["web_development"]
            }],
            "industrySpecificRisk": {"web_development": 7}
        })));
        assert!(!a.degraded);
        assert_eq!(a.risk_level, Severity::High);
        assert_eq!(a.contract_type, ContractType::Service);
        assert_eq!(a.recommended_actions, vec!["Negotiate a kill fee"]);
        assert_eq!(a.compliance_flags.len(), 1);
        let i = &a.issues[0];
        assert_eq!(i.category, IssueType::Payment);
        assert_eq!(i.label, "PAYMENT");
        assert_eq!(i.severity, Severity::High);
        assert_eq!(i.severity_score, 8);
        assert_eq!(i.industry_relevance, vec!["web_development"]);
        assert_eq!(a.industry_risk.get("web_development"), Some(&7));
    }

    #[test]
    fn garbage_yields_fallback() {
        for input in ["", "I cannot help with that.", "[1, 2, 3]", "{\"riskLevel\": "] {
            let a = analysis(input);
            assert!(a.degraded, "input {input:?}");
            assert_eq!(a.risk_level, Severity::Medium);
            assert_eq!(a.contract_type, ContractType::Other);
            assert_eq!(a.recommended_actions, vec![FALLBACK_ACTION]);
            assert_eq!(a.issues.len(), 1);
            assert_eq!(a.issues[0].label, "API Error");
            assert_eq!(a.issues[0].severity_score, 5);
        }
    }

    #[test]
    fn fenced_json_with_trailing_commas() {
        let input = "Sure! Here you go:\n```json\n{\"riskLevel\": \"low\", \"issues\": [],}\n```";
        let a = analysis(input);
        assert!(!a.degraded);
        assert_eq!(a.risk_level, Severity::Low);
    }

    #[test]
    fn unknown_enums_default() {
        let a = analysis(&raw(json!({"riskLevel": "SEVERE", "type": "LEASE"})));
        assert_eq!(a.risk_level, Severity::Medium);
        assert_eq!(a.contract_type, ContractType::Other);
        assert!(a.issues.is_empty());
        assert!(a.recommended_actions.is_empty());
    }

    #[test]
    fn wrong_shapes_become_empty() {
        let a = analysis(&raw(json!({
            "riskLevel": 9,
            "recommendedActions": "call a lawyer",
            "complianceFlags": {"a": 1},
            "issues": "none",
            "industrySpecificRisk": ["x"]
        })));
        assert_eq!(a.risk_level, Severity::Medium);
        assert!(a.recommended_actions.is_empty());
        assert!(a.compliance_flags.is_empty());
        assert!(a.issues.is_empty());
        assert!(a.industry_risk.is_empty());
    }

    #[test]
    fn list_filters_non_strings_and_blanks() {
        let a = analysis(&raw(json!({
            "recommendedActions": ["  Ask for deposit  ", "", 3, null, "Cap revisions"]
        })));
        assert_eq!(a.recommended_actions, vec!["Ask for deposit", "Cap revisions"]);
    }

    #[test]
    fn issues_non_objects_dropped_and_defaults_filled() {
        let a = analysis(&raw(json!({"issues": ["oops", 4, {}]})));
        assert_eq!(a.issues.len(), 1);
        let i = &a.issues[0];
        assert_eq!(i.category, IssueType::Other);
        assert_eq!(i.label, "");
        assert_eq!(i.text, "");
        assert_eq!(i.severity, Severity::Medium);
        assert_eq!(i.severity_score, 5);
        assert_eq!(i.industry_relevance, vec!["general"]);
        assert!(i.metadata.is_empty());
    }

    #[test]
    fn severity_and_score_derive_from_each_other() {
        let a = analysis(&raw(json!({"issues": [
            {"type": "Copyright", "severityScore": 9.6},
            {"type": "Kill fee", "severity": "low"},
            {"type": "Scope", "severity": "bogus", "severityScore": "2"},
            {"type": "Indemnification", "severityScore": 42},
            {"type": "Payment Terms", "severityScore": -3, "severity": "CRITICAL"}
        ]})));
        let i = &a.issues;
        assert_eq!((i[0].category, i[0].severity, i[0].severity_score), (IssueType::Ip, Severity::Critical, 10));
        assert_eq!((i[1].category, i[1].severity, i[1].severity_score), (IssueType::Termination, Severity::Low, 3));
        assert_eq!((i[2].category, i[2].severity, i[2].severity_score), (IssueType::Scope, Severity::Low, 2));
        assert_eq!((i[3].category, i[3].severity, i[3].severity_score), (IssueType::Liability, Severity::Critical, 10));
        assert_eq!((i[4].category, i[4].severity, i[4].severity_score), (IssueType::Payment, Severity::Critical, 1));
        assert!(i.iter().all(|x| (1..=10).contains(&x.severity_score)));
    }

    #[test]
    fn relevance_accepts_single_string() {
        let a = analysis(&raw(json!({"issues": [
            {"industryRelevance": "graphic_design"},
            {"industryRelevance": []},
            {"industryRelevance": ["", "  "]}
        ]})));
        assert_eq!(a.issues[0].industry_relevance, vec!["graphic_design"]);
        assert_eq!(a.issues[1].industry_relevance, vec!["general"]);
        assert_eq!(a.issues[2].industry_relevance, vec!["general"]);
    }

    #[test]
    fn issue_metadata_kept_when_object() {
        let a = analysis(&raw(json!({"issues": [
            {"metadata": {"clause": 4}},
            {"metadata": "x"}
        ]})));
        assert_eq!(a.issues[0].metadata.get("clause"), Some(&json!(4)));
        assert!(a.issues[1].metadata.is_empty());
    }

    #[test]
    fn industry_risk_clamped() {
        let a = analysis(&raw(json!({"industrySpecificRisk": {
            "web": 14, "design": -2, "content": "6", "bad": "high", "": 4
        }})));
        assert_eq!(a.industry_risk.get("web"), Some(&10));
        assert_eq!(a.industry_risk.get("design"), Some(&0));
        assert_eq!(a.industry_risk.get("content"), Some(&6));
        assert_eq!(a.industry_risk.len(), 3);
    }

    #[test]
    fn snake_case_and_envelope_accepted() {
        let a = analysis(&raw(json!({"analysis": {
            "risk_level": "critical",
            "contract_type": "nda",
            "recommended_actions": ["x"]
        }})));
        assert_eq!(a.risk_level, Severity::Critical);
        assert_eq!(a.contract_type, ContractType::Nda);
        assert_eq!(a.recommended_actions, vec!["x"]);
    }

    #[test]
    fn comparison_well_formed() {
        let c = comparison(&raw(json!({
            "differences": {
                "added": ["Kill fee of 25%"],
                "removed": ["Unlimited revisions"],
                "modified": [
                    {"original": "Net 60", "revised": "Net 15", "explanation": "Faster payment"},
                    {"original": "", "revised": ""},
                    "junk"
                ]
            },
            "summary": "Revised terms favour the freelancer.",
            "riskAssessment": {
                "originalRisk": "high",
                "revisedRisk": "LOW",
                "improvements": ["Payment terms"],
                "concerns": []
            }
        })))
        .unwrap();
        assert_eq!(c.differences.added, vec!["Kill fee of 25%"]);
        assert_eq!(c.differences.removed, vec!["Unlimited revisions"]);
        assert_eq!(c.differences.modified.len(), 1);
        assert_eq!(c.differences.modified[0].revised, "Net 15");
        assert_eq!(c.risk_assessment.original_risk, Severity::High);
        assert_eq!(c.risk_assessment.revised_risk, Severity::Low);
        assert_eq!(c.summary, "Revised terms favour the freelancer.");
    }

    #[test]
    fn comparison_partial_fills_defaults() {
        let c = comparison(&raw(json!({"summary": "Minor wording changes"}))).unwrap();
        assert!(c.differences.is_empty());
        assert_eq!(c.risk_assessment.original_risk, Severity::Medium);
        assert_eq!(c.risk_assessment.revised_risk, Severity::Medium);
    }

    #[test]
    fn comparison_malformed() {
        assert!(matches!(comparison("no idea"), Err(AiError::MalformedResponse(_))));
        assert!(matches!(comparison("{\"foo\": 1}"), Err(AiError::MalformedResponse(_))));
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Risk level of a whole contract or of a single flagged clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: &[Severity] = &[
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Case-insensitive parse. Surrounding whitespace is ignored.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Coerce an arbitrary JSON value, falling back to `Medium`.
    pub fn coerce(value: &Value) -> Self {
        value
            .as_str()
            .and_then(Severity::parse_str)
            .unwrap_or(Severity::Medium)
    }

    /// Map a 1..=10 severity score onto a level.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Severity::Low,
            4..=6 => Severity::Medium,
            7..=8 => Severity::High,
            _ => Severity::Critical,
        }
    }

    /// Score used when the model gave a level but no number.
    pub fn default_score(&self) -> u8 {
        match self {
            Severity::Low => 3,
            Severity::Medium => 5,
            Severity::High => 8,
            Severity::Critical => 10,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
    Service,
    Employment,
    Nda,
    Other,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Service => "SERVICE",
            ContractType::Employment => "EMPLOYMENT",
            ContractType::Nda => "NDA",
            ContractType::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ContractType::Service => "Service",
            ContractType::Employment => "Employment",
            ContractType::Nda => "NDA",
            ContractType::Other => "Other",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SERVICE" => Some(ContractType::Service),
            "EMPLOYMENT" => Some(ContractType::Employment),
            "NDA" => Some(ContractType::Nda),
            "OTHER" => Some(ContractType::Other),
            _ => None,
        }
    }

    /// Coerce an arbitrary JSON value, falling back to `Other`.
    pub fn coerce(value: &Value) -> Self {
        value
            .as_str()
            .and_then(ContractType::parse_str)
            .unwrap_or(ContractType::Other)
    }
}

impl Default for ContractType {
    fn default() -> Self {
        ContractType::Other
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Category of a flagged clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueType {
    Payment,
    Ip,
    Scope,
    Termination,
    Liability,
    Other,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Payment => "PAYMENT",
            IssueType::Ip => "IP",
            IssueType::Scope => "SCOPE",
            IssueType::Termination => "TERMINATION",
            IssueType::Liability => "LIABILITY",
            IssueType::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IssueType::Payment => "Payment",
            IssueType::Ip => "Intellectual Property",
            IssueType::Scope => "Scope",
            IssueType::Termination => "Termination",
            IssueType::Liability => "Liability",
            IssueType::Other => "Other",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAYMENT" => Some(IssueType::Payment),
            "IP" => Some(IssueType::Ip),
            "SCOPE" => Some(IssueType::Scope),
            "TERMINATION" => Some(IssueType::Termination),
            "LIABILITY" => Some(IssueType::Liability),
            "OTHER" => Some(IssueType::Other),
            _ => None,
        }
    }

    /// Classify a free-form label such as "Revision Policy".
    ///
    /// Exact enum names win; otherwise the first keyword group that matches
    /// decides. Termination is checked before payment so that "Kill fee"
    /// lands in termination. Keywords match whole words; a trailing `*`
    /// matches a word prefix, and a space-separated keyword matches
    /// consecutive words.
    pub fn classify(label: &str) -> Self {
        if let Some(exact) = IssueType::parse_str(label) {
            return exact;
        }
        let upper = label.to_ascii_uppercase();
        let words: Vec<&str> = upper
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        const GROUPS: &[(IssueType, &[&str])] = &[
            (IssueType::Termination, &["TERMINAT*", "CANCEL*", "KILL", "NOTICE PERIOD"]),
            (IssueType::Liability, &["LIABIL*", "INDEMN*", "WARRANT*", "INSURANCE", "DAMAGE*"]),
            (
                IssueType::Ip,
                &[
                    "IP",
                    "INTELLECTUAL",
                    "COPYRIGHT*",
                    "OWNERSHIP",
                    "LICENS*",
                    "PORTFOLIO",
                    "ATTRIBUTION",
                    "WORK FOR HIRE",
                ],
            ),
            (IssueType::Payment, &["PAY*", "INVOIC*", "FEE", "FEES", "COMPENSATION"]),
            (
                IssueType::Scope,
                &["SCOPE", "REVISION*", "DELIVERABLE*", "TIMELINE*", "FEEDBACK", "CHANGE REQUEST*"],
            ),
        ];

        GROUPS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| matches_keyword(&words, k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(IssueType::Other)
    }

    /// Coerce an arbitrary JSON value; non-strings become `Other`.
    pub fn coerce(value: &Value) -> Self {
        value.as_str().map(IssueType::classify).unwrap_or(IssueType::Other)
    }
}

fn matches_keyword(words: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).all(|(word, part)| match part.strip_suffix('*') {
            Some(stem) => word.starts_with(stem),
            None => word == part,
        })
    })
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Other
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse_str("high"), Some(Severity::High));
        assert_eq!(Severity::parse_str(" Critical "), Some(Severity::Critical));
        assert_eq!(Severity::parse_str("LOW"), Some(Severity::Low));
        assert_eq!(Severity::parse_str("severe"), None);
        assert_eq!(Severity::parse_str(""), None);
    }

    #[test]
    fn severity_coerce_defaults_to_medium() {
        assert_eq!(Severity::coerce(&json!("HIGH")), Severity::High);
        assert_eq!(Severity::coerce(&json!("unknown")), Severity::Medium);
        assert_eq!(Severity::coerce(&json!(7)), Severity::Medium);
        assert_eq!(Severity::coerce(&Value::Null), Severity::Medium);
    }

    #[test]
    fn severity_score_bands() {
        assert_eq!(Severity::from_score(1), Severity::Low);
        assert_eq!(Severity::from_score(3), Severity::Low);
        assert_eq!(Severity::from_score(4), Severity::Medium);
        assert_eq!(Severity::from_score(6), Severity::Medium);
        assert_eq!(Severity::from_score(7), Severity::High);
        assert_eq!(Severity::from_score(8), Severity::High);
        assert_eq!(Severity::from_score(9), Severity::Critical);
        assert_eq!(Severity::from_score(10), Severity::Critical);
        for s in Severity::ALL {
            assert_eq!(Severity::from_score(s.default_score()), *s);
        }
    }

    #[test]
    fn severity_orders_by_risk() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Critical));
    }

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Severity::Critical).unwrap(), json!("CRITICAL"));
        let s: Severity = serde_json::from_value(json!("LOW")).unwrap();
        assert_eq!(s, Severity::Low);
    }

    #[test]
    fn contract_type_coerce() {
        assert_eq!(ContractType::coerce(&json!("nda")), ContractType::Nda);
        assert_eq!(ContractType::coerce(&json!("SERVICE")), ContractType::Service);
        assert_eq!(ContractType::coerce(&json!("LEASE")), ContractType::Other);
        assert_eq!(ContractType::coerce(&json!("GENERATED")), ContractType::Other);
        assert_eq!(ContractType::coerce(&json!(["SERVICE"])), ContractType::Other);
    }

    #[test]
    fn issue_type_exact_names() {
        assert_eq!(IssueType::classify("PAYMENT"), IssueType::Payment);
        assert_eq!(IssueType::classify("ip"), IssueType::Ip);
        assert_eq!(IssueType::classify("Termination"), IssueType::Termination);
    }

    #[test]
    fn issue_type_keyword_labels() {
        assert_eq!(IssueType::classify("Payment Terms"), IssueType::Payment);
        assert_eq!(IssueType::classify("Late invoice penalties"), IssueType::Payment);
        assert_eq!(IssueType::classify("Copyright transfer"), IssueType::Ip);
        assert_eq!(IssueType::classify("IP Ownership"), IssueType::Ip);
        assert_eq!(IssueType::classify("Revision Policy"), IssueType::Scope);
        assert_eq!(IssueType::classify("Kill fee missing"), IssueType::Termination);
        assert_eq!(IssueType::classify("Indemnification"), IssueType::Liability);
        assert_eq!(IssueType::classify("Non-compete"), IssueType::Other);
    }

    #[test]
    fn display_uses_human_names() {
        assert_eq!(Severity::High.to_string(), "High");
        assert_eq!(ContractType::Service.to_string(), "Service");
        assert_eq!(ContractType::Nda.to_string(), "NDA");
        assert_eq!(IssueType::Ip.to_string(), "Intellectual Property");
        assert_eq!(ContractType::Service.as_str(), "SERVICE");
    }

    #[test]
    fn classify_matches_whole_words() {
        assert_eq!(IssueType::classify("Client Feedback Rounds"), IssueType::Scope);
        assert_eq!(IssueType::classify("Late fees"), IssueType::Payment);
        assert_eq!(IssueType::classify("Work-for-hire clause"), IssueType::Ip);
        assert_eq!(IssueType::classify("30 day notice period"), IssueType::Termination);
        assert_eq!(IssueType::classify("Feeling of the parties"), IssueType::Other);
        assert_eq!(IssueType::classify("Unpaid feedback sessions"), IssueType::Scope);
    }

    #[test]
    fn issue_type_ip_needs_whole_word() {
        // "shipping" contains "IP" but is not about intellectual property
        assert_eq!(IssueType::classify("Shipping"), IssueType::Other);
    }

    #[test]
    fn issue_type_coerce_non_string() {
        assert_eq!(IssueType::coerce(&json!(3)), IssueType::Other);
        assert_eq!(IssueType::coerce(&json!({"type": "IP"})), IssueType::Other);
    }
}

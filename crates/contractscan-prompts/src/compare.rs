use crate::PromptPair;

const RESPONSE_SHAPE: &str = r#"{
  "differences": {
    "added": ["string"],
    "removed": ["string"],
    "modified": [
      {
        "original": "string",
        "revised": "string",
        "explanation": "string"
      }
    ]
  },
  "summary": "string",
  "riskAssessment": {
    "originalRisk": "LOW|MEDIUM|HIGH|CRITICAL",
    "revisedRisk": "LOW|MEDIUM|HIGH|CRITICAL",
    "improvements": ["string"],
    "concerns": ["string"]
  }
}"#;

/// Build the prompt that diffs two versions of a contract.
pub fn build(original: &str, revised: &str) -> PromptPair {
    let mut prompt = String::from(
        "Compare these two contract versions from the freelancer's point of view and \
         provide a detailed analysis in JSON format.\n\n",
    );
    prompt.push_str("## Original Contract\n\n");
    prompt.push_str(original);
    prompt.push_str("\n\n## Revised Contract\n\n");
    prompt.push_str(revised);
    prompt.push_str("\n\nProvide the comparison in this exact JSON format:\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push('\n');

    PromptPair {
        system: "You are a contract analysis expert for freelancers. You will respond with JSON only."
            .into(),
        user: prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_versions_in_order() {
        let p = build("ORIGINAL BODY", "REVISED BODY");
        let o = p.user.find("ORIGINAL BODY").unwrap();
        let r = p.user.find("REVISED BODY").unwrap();
        assert!(o < r);
        assert!(p.user.contains("\"riskAssessment\""));
    }
}

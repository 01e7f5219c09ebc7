use crate::{industry, PromptPair};

/// Everything needed to build an analysis prompt.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub contract_text: String,
    pub industry: String,
    pub region: String,
}

const RESPONSE_SHAPE: &str = r#"{
  "riskLevel": "LOW|MEDIUM|HIGH|CRITICAL",
  "type": "SERVICE|EMPLOYMENT|NDA|OTHER",
  "recommendedActions": [
    "Specific, actionable steps the freelancer should take"
  ],
  "complianceFlags": [
    "Jurisdiction-specific regulatory concerns"
  ],
  "issues": [
    {
      "type": "PAYMENT|IP|SCOPE|TERMINATION|LIABILITY|OTHER",
      "text": "The specific clause quoted from the contract",
      "explanation": "Why this is problematic for freelancers, in plain language",
      "suggestion": "Alternative wording that would be more fair",
      "severity": "LOW|MEDIUM|HIGH|CRITICAL",
      "severityScore": 1,
      "industryRelevance": ["general"]
    }
  ],
  "industrySpecificRisk": {
    "industryName": 0
  }
}"#;

fn system_prompt(industry: &str) -> String {
    format!(
        "You are a legal expert specializing in freelancer contracts in the {industry} industry, \
         with deep knowledge of common issues and best practices for freelancers. Provide clear, \
         actionable advice focused on protecting freelancer interests. You will respond with JSON only."
    )
}

fn append_categories(prompt: &mut String) {
    prompt.push_str(
        "Focus on issues that commonly affect freelancers, including:\n\n\
         1. Payment Terms and Conditions\n\
         \x20  - Payment schedule and deadlines\n\
         \x20  - Late payment penalties\n\
         \x20  - Payment methods and currency\n\
         \x20  - Invoice requirements\n\n\
         2. Intellectual Property Rights\n\
         \x20  - Ownership of work\n\
         \x20  - Usage rights\n\
         \x20  - Attribution requirements\n\
         \x20  - Portfolio rights\n\n\
         3. Scope of Work\n\
         \x20  - Project deliverables\n\
         \x20  - Timeline expectations\n\
         \x20  - Revision policies\n\
         \x20  - Additional work compensation\n\n\
         4. Termination and Cancellation\n\
         \x20  - Notice periods\n\
         \x20  - Kill fees\n\
         \x20  - Project cancellation terms\n\
         \x20  - Final payment conditions\n\n\
         5. Liability and Insurance\n\
         \x20  - Indemnification clauses\n\
         \x20  - Insurance requirements\n\
         \x20  - Liability limitations\n\
         \x20  - Warranty terms\n\n",
    );
}

/// Build the analysis prompt for one contract.
pub fn build(ctx: &AnalysisContext) -> PromptPair {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "As a legal expert specializing in freelancer contracts in the {} industry (region: {}), \
         analyze the following contract and provide a detailed analysis in JSON format.\n\n",
        ctx.industry, ctx.region
    ));
    append_categories(&mut prompt);

    prompt.push_str("## Industry Focus\n\n");
    prompt.push_str(&industry::focus_for(&ctx.industry, &ctx.region));
    prompt.push('\n');

    prompt.push_str(
        "For each issue found:\n\
         - Quote the exact problematic text\n\
         - Explain in plain language why it's problematic\n\
         - Suggest alternative language that would be more fair\n\
         - Rate the severity and give a severityScore from 1 (minor) to 10 (critical)\n\n",
    );

    prompt.push_str("Provide the analysis in this JSON format:\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push_str("\n\nIMPORTANT: You must respond with a JSON object only, no additional text.\n\n");

    prompt.push_str("Contract:\n");
    prompt.push_str(&ctx.contract_text);
    prompt.push('\n');

    PromptPair {
        system: system_prompt(&ctx.industry),
        user: prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AnalysisContext {
        AnalysisContext {
            contract_text: "The Freelancer grants all rights in perpetuity.".into(),
            industry: "graphic_design".into(),
            region: "EU".into(),
        }
    }

    #[test]
    fn prompt_contains_contract_text_last() {
        let p = build(&ctx());
        assert!(p.user.trim_end().ends_with("The Freelancer grants all rights in perpetuity."));
    }

    #[test]
    fn prompt_contains_shape_and_focus() {
        let p = build(&ctx());
        assert!(p.user.contains("\"riskLevel\": \"LOW|MEDIUM|HIGH|CRITICAL\""));
        assert!(p.user.contains("Requirements to provide source files"));
        assert!(p.user.contains("moral rights"));
        assert!(p.user.contains("4. Termination and Cancellation"));
    }

    #[test]
    fn system_prompt_names_industry_and_json() {
        let p = build(&ctx());
        assert!(p.system.contains("graphic_design industry"));
        assert!(p.system.contains("JSON only"));
    }
}

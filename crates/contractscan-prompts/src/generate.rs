use contractscan_core::ContractRequirements;

use crate::{templates, PromptPair};

/// Build the contract generation prompt from structured requirements.
pub fn build(req: &ContractRequirements) -> PromptPair {
    let template = templates::template_for(&req.industry, &req.project_type, &req.region);
    let deliverables = if req.deliverables.is_empty() {
        "(to be agreed)".to_string()
    } else {
        req.deliverables.join(", ")
    };

    let mut prompt = format!(
        "You are an expert contract generator for freelancers in the {} industry.\n\
         Create a professional contract based on the following requirements:\n\n",
        req.industry
    );
    prompt.push_str(&format!("Client Name: {}\n", req.client_name));
    prompt.push_str(&format!("Freelancer Name: {}\n", req.freelancer_name));
    prompt.push_str(&format!("Project Description: {}\n", req.project_description));
    prompt.push_str(&format!("Deliverables: {deliverables}\n"));
    prompt.push_str(&format!("Timeline: {}\n", req.timeline));
    prompt.push_str(&format!("Payment Terms: {}\n", req.payment_terms));
    prompt.push_str(&format!("Region: {}\n\n", req.region));

    prompt.push_str(
        "Use the following contract template as a starting point, but customize it \
         to the specific project requirements:\n\n",
    );
    prompt.push_str(&template);
    prompt.push_str("\n\nMake sure the contract includes:\n");
    prompt.push_str(
        "1. Clear scope of work with specific deliverables\n\
         2. Well-defined payment terms with milestones\n\
         3. Reasonable revision limits (max 2-3 rounds)\n\
         4. Fair intellectual property terms that protect the freelancer\n\
         5. Clear process for change requests\n\
         6. Termination clauses that protect both parties\n",
    );
    prompt.push_str(&format!(
        "7. Compliance with {} freelancer protection laws\n\n",
        req.region
    ));
    prompt.push_str(
        "Format the contract professionally with proper legal structure and numbering. \
         Output only the contract text.\n",
    );

    PromptPair {
        system: "You are a contract generation expert for freelancers. Generate a professional, \
                 legally-sound contract."
            .into(),
        user: prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> ContractRequirements {
        ContractRequirements {
            industry: "web_development".into(),
            project_type: "hourly".into(),
            client_name: "Acme Corp".into(),
            freelancer_name: "Sam Lee".into(),
            project_description: "Rebuild the marketing site".into(),
            deliverables: vec!["Homepage".into(), "Blog".into()],
            timeline: "6 weeks".into(),
            payment_terms: "Net 15".into(),
            region: "US".into(),
        }
    }

    #[test]
    fn includes_requirements_and_template() {
        let p = build(&req());
        assert!(p.user.contains("Client Name: Acme Corp"));
        assert!(p.user.contains("Deliverables: Homepage, Blog"));
        assert!(p.user.contains("WEB DEVELOPMENT SERVICES AGREEMENT"));
        assert!(p.user.contains("7. Compliance with US freelancer protection laws"));
    }

    #[test]
    fn empty_deliverables_placeholder() {
        let mut r = req();
        r.deliverables.clear();
        assert!(build(&r).user.contains("Deliverables: (to be agreed)"));
    }
}

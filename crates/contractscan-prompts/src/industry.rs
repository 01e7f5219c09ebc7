use crate::{industry_key, region_key};

struct IndustryFocus {
    key: &'static str,
    red_flags: &'static [&'static str],
    common_issues: &'static [&'static str],
    us_note: &'static str,
    eu_note: &'static str,
}

const US_FREELANCE_LAWS: &str =
    "Check for compliance with California FWPA and NY Freelance Isn't Free Act";

const INDUSTRIES: &[IndustryFocus] = &[
    IndustryFocus {
        key: "web_development",
        red_flags: &[
            "Unlimited revisions without additional payment",
            "Ownership of code and intellectual property rights",
            "Vague project scope that enables scope creep",
            "Payment terms longer than 15 days or with unclear milestones",
            "Hosting and maintenance responsibilities",
            "Warranty periods and liability for bugs/issues",
            "Browser/device compatibility requirements",
        ],
        common_issues: &[
            "Unclear definition of \"project completion\"",
            "Missing provisions for third-party integrations",
            "Ambiguous acceptance testing procedures",
            "Lack of clear change request process",
        ],
        us_note: US_FREELANCE_LAWS,
        eu_note: "Check for GDPR compliance requirements and data processing clauses",
    },
    IndustryFocus {
        key: "graphic_design",
        red_flags: &[
            "Unlimited revisions without additional payment",
            "Full copyright transfer without adequate compensation",
            "Vague deliverable descriptions",
            "Usage rights limitations",
            "Client's ability to reject work subjectively",
            "Requirements to provide source files without additional payment",
            "Lack of kill fee or cancellation terms",
        ],
        common_issues: &[
            "Unclear ownership of unused concepts",
            "Missing provisions for additional usage rights",
            "Ambiguous approval processes",
            "Lack of clear revision limits",
        ],
        us_note: US_FREELANCE_LAWS,
        eu_note: "Check for moral rights provisions and copyright assignment limitations",
    },
    IndustryFocus {
        key: "content_creation",
        red_flags: &[
            "Work-for-hire clauses without adequate compensation",
            "Byline and credit requirements",
            "Exclusivity clauses",
            "Reuse and republication rights",
            "Indemnification for factual accuracy",
            "Editing and revision expectations",
            "Kill fees and cancellation terms",
        ],
        common_issues: &[
            "Unclear ownership of research materials",
            "Missing provisions for additional usage",
            "Ambiguous word count requirements",
            "Lack of clear revision limits",
        ],
        us_note: US_FREELANCE_LAWS,
        eu_note: "Check for moral rights provisions and right to be identified as author",
    },
    IndustryFocus {
        key: "general",
        red_flags: &[
            "Unlimited revisions without additional payment",
            "Full copyright transfer without adequate compensation",
            "Vague deliverable descriptions that enable scope creep",
            "Payment terms longer than 30 days or with unclear milestones",
            "Overly restrictive non-compete clauses",
            "Client ability to terminate without compensation",
            "Indemnification clauses that create unreasonable liability",
        ],
        common_issues: &[
            "Unclear intellectual property rights",
            "Missing provisions for additional work",
            "Ambiguous completion criteria",
            "Lack of clear payment terms",
        ],
        us_note: US_FREELANCE_LAWS,
        eu_note: "Check for compliance with EU freelancer protection regulations",
    },
];

fn lookup(industry: &str) -> &'static IndustryFocus {
    let key = industry_key(industry);
    INDUSTRIES
        .iter()
        .find(|f| f.key == key)
        .unwrap_or(&INDUSTRIES[INDUSTRIES.len() - 1])
}

/// Render the industry focus block, with a region note for US or EU.
pub fn focus_for(industry: &str, region: &str) -> String {
    let focus = lookup(industry);
    let mut out = String::from("Focus specifically on identifying these red flags:\n");
    for (i, flag) in focus.red_flags.iter().enumerate() {
        out.push_str(&format!("{}. {flag}\n", i + 1));
    }
    out.push_str("\nCommon issues in ");
    if focus.key == "general" {
        out.push_str("freelance");
    } else {
        out.push_str(&focus.key.replace('_', " "));
    }
    out.push_str(" contracts:\n");
    for issue in focus.common_issues {
        out.push_str(&format!("- {issue}\n"));
    }

    let note = match region_key(region).as_str() {
        "US" => Some(focus.us_note),
        "EU" => Some(focus.eu_note),
        _ => None,
    };
    if let Some(note) = note {
        out.push('\n');
        out.push_str(note);
        out.push('\n');
    }
    out
}

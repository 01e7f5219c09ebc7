//! Starter contract templates handed to the generator.
//!
//! Templates are assembled from shared sections. Each industry profile picks
//! the party name, the acceptance wording and the EU compliance clause, and
//! the billing mode picks payment and termination wording.

use crate::{industry_key, region_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Billing {
    FixedPrice,
    Hourly,
}

impl Billing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Billing::FixedPrice => "fixed_price",
            Billing::Hourly => "hourly",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match industry_key(s).as_str() {
            "fixed_price" | "fixed" => Some(Billing::FixedPrice),
            "hourly" => Some(Billing::Hourly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EuClause {
    Gdpr,
    MoralRights,
    DataAndAttribution,
}

#[derive(Debug)]
struct Profile {
    key: &'static str,
    heading: &'static str,
    hourly_heading: Option<&'static str>,
    party: &'static str,
    services: &'static str,
    visual_work: bool,
    eu: EuClause,
}

const PROFILES: &[Profile] = &[
    Profile {
        key: "web_development",
        heading: "WEB DEVELOPMENT AGREEMENT",
        hourly_heading: Some("WEB DEVELOPMENT SERVICES AGREEMENT"),
        party: "Developer",
        services: "web development",
        visual_work: false,
        eu: EuClause::Gdpr,
    },
    Profile {
        key: "graphic_design",
        heading: "GRAPHIC DESIGN AGREEMENT",
        hourly_heading: None,
        party: "Designer",
        services: "graphic design",
        visual_work: true,
        eu: EuClause::MoralRights,
    },
    Profile {
        key: "content_creation",
        heading: "CONTENT CREATION AGREEMENT",
        hourly_heading: None,
        party: "Creator",
        services: "content creation",
        visual_work: true,
        eu: EuClause::MoralRights,
    },
    // fallback, keep last
    Profile {
        key: "general",
        heading: "FREELANCE SERVICES AGREEMENT",
        hourly_heading: Some("FREELANCE SERVICES AGREEMENT (HOURLY)"),
        party: "Freelancer",
        services: "freelance",
        visual_work: false,
        eu: EuClause::DataAndAttribution,
    },
];

fn profile_for(industry: &str) -> &'static Profile {
    let key = industry_key(industry);
    PROFILES
        .iter()
        .find(|p| p.key == key)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}

/// Resolve the (industry, billing) pair a template will actually be built
/// for. Unknown industries fall back to `general`; billing modes an industry
/// has no template for fall back to fixed price.
pub fn resolve(industry: &str, project_type: &str) -> (&'static str, Billing) {
    let profile = profile_for(industry);
    let billing = match Billing::parse_str(project_type) {
        Some(Billing::Hourly) if profile.hourly_heading.is_some() => Billing::Hourly,
        _ => Billing::FixedPrice,
    };
    (profile.key, billing)
}

/// Full template text, including the regional compliance section for US
/// and EU. Other regions get the base template only.
pub fn template_for(industry: &str, project_type: &str, region: &str) -> String {
    let profile = profile_for(industry);
    let (_, billing) = resolve(industry, project_type);
    let mut out = String::new();
    append_header(&mut out, profile, billing);
    append_services(&mut out, profile, billing);
    append_payment(&mut out, profile, billing);
    append_revisions(&mut out, profile, billing);
    append_ip(&mut out, profile);
    append_acceptance(&mut out, profile);
    append_termination(&mut out, profile, billing);
    append_general(&mut out, profile);
    append_region(&mut out, profile, billing, &region_key(region));
    out
}

fn placeholder(party: &str, field: &str) -> String {
    format!("[{}_{}]", party.to_ascii_uppercase(), field)
}

fn append_header(out: &mut String, p: &Profile, billing: Billing) {
    let heading = match billing {
        Billing::Hourly => p.hourly_heading.unwrap_or(p.heading),
        Billing::FixedPrice => p.heading,
    };
    let title = title_case(heading.trim_end_matches(" (HOURLY)"));
    out.push_str(&format!("# {heading}\n\n"));
    out.push_str(&format!(
        "This {title} (the \"Agreement\") is entered into as of [DATE], by and between:\n\n"
    ));
    out.push_str(
        "**Client:** [CLIENT_NAME], with a principal place of business at [CLIENT_ADDRESS] (\"Client\")\n\n",
    );
    out.push_str(&format!(
        "**{party}:** {name}, with a principal place of business at {addr} (\"{party}\")\n\n",
        party = p.party,
        name = placeholder(p.party, "NAME"),
        addr = placeholder(p.party, "ADDRESS"),
    ));
}

fn append_services(out: &mut String, p: &Profile, billing: Billing) {
    out.push_str("## 1. SERVICES\n\n");
    out.push_str(&format!(
        "{} agrees to provide the following {} services (the \"Services\") to Client:\n\n[PROJECT_DESCRIPTION]\n\n",
        p.party, p.services
    ));
    out.push_str("### 1.1 Deliverables\n\n");
    out.push_str(&format!(
        "{} shall deliver the following deliverables (the \"Deliverables\"):\n\n[DELIVERABLES]\n\n",
        p.party
    ));
    out.push_str("## 2. TIMELINE\n\n");
    match billing {
        Billing::FixedPrice => out.push_str(&format!(
            "{} shall complete the Services according to the following timeline:\n\n[TIMELINE]\n\n",
            p.party
        )),
        Billing::Hourly => out.push_str(&format!(
            "{} shall provide the Services according to the following estimated timeline:\n\n[TIMELINE]\n\n",
            p.party
        )),
    }
}

fn append_payment(out: &mut String, p: &Profile, billing: Billing) {
    out.push_str("## 3. PAYMENT TERMS\n\n");
    let late = match billing {
        Billing::FixedPrice => {
            out.push_str(&format!(
                "### 3.1 Fee\n\nClient agrees to pay {} a fixed fee of [AMOUNT] for the Services.\n\n",
                p.party
            ));
            out.push_str(
                "### 3.2 Payment Schedule\n\nPayment shall be made according to the following schedule:\n\n[PAYMENT_TERMS]\n\n",
            );
            "3.3"
        }
        Billing::Hourly => {
            out.push_str(&format!(
                "### 3.1 Hourly Rate\n\nClient agrees to pay {} at the rate of [HOURLY_RATE] per hour for the Services.\n\n",
                p.party
            ));
            out.push_str(&format!(
                "### 3.2 Estimates\n\n{} will provide Client with estimates for specific tasks, but actual billing will be based on hours worked.\n\n",
                p.party
            ));
            out.push_str(&format!(
                "### 3.3 Payment Schedule\n\n{} will invoice Client [PAYMENT_TERMS]. Invoices shall include a detailed breakdown of hours worked and tasks performed.\n\n",
                p.party
            ));
            "3.4"
        }
    };
    out.push_str(&format!(
        "### {late} Late Payments\n\nPayments not received within 15 days of the due date will be subject to a late fee of 1.5% per month or the maximum allowed by law, whichever is less.\n\n"
    ));
}

fn append_revisions(out: &mut String, p: &Profile, billing: Billing) {
    out.push_str("## 4. REVISIONS AND CHANGES\n\n");
    match billing {
        Billing::FixedPrice => {
            out.push_str("### 4.1 Included Revisions\n\nThe fixed fee includes up to two (2) rounds of revisions to the Deliverables.\n\n");
            out.push_str(&format!(
                "### 4.2 Additional Revisions\n\nAdditional revisions or changes to the project scope will be billed at {}'s standard hourly rate of [HOURLY_RATE] per hour.\n\n",
                p.party
            ));
        }
        Billing::Hourly => {
            out.push_str("### 4.1 Revisions\n\nRevisions are billed at the hourly rate in Section 3.1.\n\n");
            out.push_str(&format!(
                "### 4.2 Scope Changes\n\n{} will notify Client before undertaking work that is expected to exceed the current estimate.\n\n",
                p.party
            ));
        }
    }
    out.push_str(&format!(
        "### 4.3 Change Request Process\n\nAll change requests must be submitted in writing. {} will evaluate each change request and provide Client with an estimate of the additional time and cost required, if any.\n\n",
        p.party
    ));
}

fn append_ip(out: &mut String, p: &Profile) {
    out.push_str("## 5. INTELLECTUAL PROPERTY RIGHTS\n\n");
    out.push_str(&format!(
        "### 5.1 Client Content\n\nClient retains all ownership rights to content provided to {} for use in the Deliverables.\n\n",
        p.party
    ));
    out.push_str(&format!(
        "### 5.2 {}'s Work\n\nUpon receipt of full payment, {} grants Client a non-exclusive, worldwide license to use the Deliverables.\n\n",
        p.party, p.party
    ));
    if p.visual_work {
        out.push_str("### 5.3 Usage Rights\n\nThe Deliverables may be used by Client for the following purposes:\n\n- [SPECIFY USAGE RIGHTS]\n\nAny additional usage rights must be negotiated separately and may require additional fees.\n\n");
        out.push_str(&format!(
            "### 5.4 Portfolio Rights\n\n{} retains the right to display the Deliverables in {}'s portfolio and promotional materials.\n\n",
            p.party, p.party
        ));
    } else {
        out.push_str(&format!(
            "### 5.3 Third-Party Materials\n\n{} will identify any third-party materials incorporated into the Deliverables, and Client shall be responsible for obtaining licenses for such materials if necessary.\n\n",
            p.party
        ));
    }
}

fn append_acceptance(out: &mut String, p: &Profile) {
    if p.visual_work {
        out.push_str("## 6. APPROVAL PROCESS\n\n");
        out.push_str("### 6.1 Approval Period\n\nClient shall have 7 days from delivery to review and approve the Deliverables.\n\n");
        out.push_str("### 6.2 Acceptance\n\nIf Client does not request revisions within the approval period, the Deliverables shall be deemed accepted.\n\n");
    } else {
        out.push_str("## 6. ACCEPTANCE TESTING\n\n");
        out.push_str("### 6.1 Testing Period\n\nClient shall have 7 days from delivery to inspect and test the Deliverables.\n\n");
        out.push_str("### 6.2 Acceptance\n\nIf Client does not report any issues within the testing period, the Deliverables shall be deemed accepted.\n\n");
    }
}

fn append_termination(out: &mut String, p: &Profile, billing: Billing) {
    out.push_str("## 7. TERMINATION\n\n");
    let owed = match billing {
        Billing::FixedPrice => "all Services performed up to the date of termination, plus a kill fee of 25% of the remaining contract value",
        Billing::Hourly => "all hours worked up to the date of termination",
    };
    out.push_str(&format!(
        "### 7.1 Termination by Client\n\nClient may terminate this Agreement at any time by providing written notice to {}. Upon termination, Client shall pay for {owed}.\n\n",
        p.party
    ));
    out.push_str(&format!(
        "### 7.2 Termination by {party}\n\n{party} may terminate this Agreement if Client fails to make any payment when due or breaches any material term of this Agreement.\n\n",
        party = p.party
    ));
}

fn append_general(out: &mut String, p: &Profile) {
    let party = p.party;
    out.push_str("## 8. WARRANTIES AND LIMITATIONS\n\n");
    out.push_str(&format!(
        "### 8.1 {party}'s Warranty\n\n{party} warrants that the Deliverables will substantially conform to the specifications for a period of 30 days after acceptance.\n\n"
    ));
    out.push_str(&format!(
        "### 8.2 Limitation of Liability\n\n{party}'s liability shall be limited to the amount paid by Client under this Agreement.\n\n"
    ));
    out.push_str("## 9. GENERAL PROVISIONS\n\n");
    out.push_str(&format!(
        "### 9.1 Independent Contractor\n\n{party} is an independent contractor, not an employee of Client.\n\n"
    ));
    out.push_str("### 9.2 Governing Law\n\nThis Agreement shall be governed by the laws of [JURISDICTION].\n\n");
    out.push_str("### 9.3 Entire Agreement\n\nThis Agreement constitutes the entire agreement between the parties and supersedes all prior discussions and agreements.\n\n");
    out.push_str("IN WITNESS WHEREOF, the parties have executed this Agreement as of the date first written above.\n\n");
    out.push_str("CLIENT: ________________________\n[CLIENT_NAME]\n\n");
    out.push_str(&format!(
        "{}: ________________________\n{}\n",
        party.to_ascii_uppercase(),
        placeholder(party, "NAME")
    ));
}

fn append_region(out: &mut String, p: &Profile, billing: Billing, region: &str) {
    let party = p.party;
    match region {
        "US" => {
            out.push_str("\n## 10. COMPLIANCE WITH LAWS\n\n");
            out.push_str("### 10.1 Freelance Worker Protection\n\nThis Agreement is designed to comply with applicable freelancer protection laws, including the California Freelance Worker Protection Act and the New York Freelance Isn't Free Act.\n\n");
            let trigger = match billing {
                Billing::FixedPrice => "invoice submission or milestone completion",
                Billing::Hourly => "invoice submission",
            };
            out.push_str(&format!(
                "### 10.2 Payment Timeline\n\nIn accordance with these laws, all payments shall be made within 15 days of {trigger}.\n"
            ));
        }
        "EU" => {
            out.push_str("\n## 10. COMPLIANCE WITH LAWS\n\n");
            match p.eu {
                EuClause::Gdpr => {
                    out.push_str(&format!(
                        "### 10.1 GDPR Compliance\n\n{party} shall comply with all applicable data protection laws, including the General Data Protection Regulation (GDPR).\n\n"
                    ));
                    out.push_str("### 10.2 Data Processing\n\nIf the Services involve processing personal data, the parties shall enter into a separate Data Processing Agreement.\n");
                }
                EuClause::MoralRights => {
                    out.push_str(&format!(
                        "### 10.1 Moral Rights\n\n{party} retains the moral rights in the Deliverables to the extent they cannot be waived under applicable law.\n\n"
                    ));
                    out.push_str(&format!(
                        "### 10.2 Right of Attribution\n\n{party}'s right to be identified as the creator of the Deliverables is acknowledged in accordance with applicable laws.\n"
                    ));
                }
                EuClause::DataAndAttribution => {
                    out.push_str(&format!(
                        "### 10.1 Data Protection\n\n{party} shall comply with all applicable data protection laws, including the General Data Protection Regulation (GDPR).\n\n"
                    ));
                    out.push_str(&format!(
                        "### 10.2 Right of Attribution\n\n{party}'s right to be identified as the creator of the Deliverables is acknowledged in accordance with applicable laws.\n"
                    ));
                }
            }
        }
        _ => {}
    }
}

fn title_case(heading: &str) -> String {
    heading
        .split(' ')
        .map(|w| {
            let lower = w.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back() {
        assert_eq!(resolve("web_development", "hourly"), ("web_development", Billing::Hourly));
        assert_eq!(resolve("graphic_design", "hourly"), ("graphic_design", Billing::FixedPrice));
        assert_eq!(resolve("underwater basket weaving", "hourly"), ("general", Billing::Hourly));
        assert_eq!(resolve("general", "retainer"), ("general", Billing::FixedPrice));
        assert_eq!(resolve("Web Development", "Hourly"), ("web_development", Billing::Hourly));
    }

    #[test]
    fn headings_per_profile() {
        assert!(template_for("web_development", "fixed_price", "US").starts_with("# WEB DEVELOPMENT AGREEMENT"));
        assert!(template_for("web_development", "hourly", "US").starts_with("# WEB DEVELOPMENT SERVICES AGREEMENT"));
        assert!(template_for("general", "hourly", "US").starts_with("# FREELANCE SERVICES AGREEMENT (HOURLY)"));
        assert!(template_for("nope", "nope", "US").starts_with("# FREELANCE SERVICES AGREEMENT\n"));
    }

    #[test]
    fn intro_uses_title_case() {
        let t = template_for("graphic_design", "fixed_price", "US");
        assert!(t.contains("This Graphic Design Agreement (the \"Agreement\")"));
        assert!(t.contains("**Designer:** [DESIGNER_NAME]"));
        assert!(t.contains("DESIGNER: ________________________\n[DESIGNER_NAME]"));
    }

    #[test]
    fn billing_changes_payment_and_termination() {
        let fixed = template_for("general", "fixed_price", "US");
        let hourly = template_for("general", "hourly", "US");
        assert!(fixed.contains("fixed fee of [AMOUNT]"));
        assert!(fixed.contains("kill fee of 25%"));
        assert!(fixed.contains("### 3.3 Late Payments"));
        assert!(hourly.contains("[HOURLY_RATE] per hour for the Services"));
        assert!(hourly.contains("all hours worked up to the date of termination"));
        assert!(hourly.contains("### 3.4 Late Payments"));
        assert!(!hourly.contains("kill fee"));
    }

    #[test]
    fn region_sections() {
        let us = template_for("web_development", "fixed_price", "us");
        assert!(us.contains("## 10. COMPLIANCE WITH LAWS"));
        assert!(us.contains("Freelance Isn't Free Act"));
        assert!(us.contains("or milestone completion"));
        let us_hourly = template_for("web_development", "hourly", "US");
        assert!(us_hourly.contains("within 15 days of invoice submission.\n"));

        let eu_web = template_for("web_development", "fixed_price", "EU");
        assert!(eu_web.contains("Data Processing Agreement"));

        let eu_design = template_for("graphic_design", "fixed_price", "EU");
        assert!(eu_design.contains("### 10.1 Moral Rights"));
        assert!(eu_design.contains("Right of Attribution"));

        let eu_general = template_for("general", "fixed_price", "EU");
        assert!(eu_general.contains("### 10.1 Data Protection"));
        assert!(eu_general.contains("Right of Attribution"));

        let other = template_for("general", "fixed_price", "APAC");
        assert!(!other.contains("## 10."));
    }

    #[test]
    fn visual_work_gets_portfolio_rights() {
        let t = template_for("content_creation", "fixed_price", "US");
        assert!(t.contains("Portfolio Rights"));
        assert!(t.contains("## 6. APPROVAL PROCESS"));
        let w = template_for("web_development", "fixed_price", "US");
        assert!(w.contains("Third-Party Materials"));
        assert!(w.contains("## 6. ACCEPTANCE TESTING"));
    }
}

// Backend-agnostic integration tests for the Database trait.
//
// Each public async function takes `&dyn Database` so the same assertions run
// against both the SQLite and Postgres backends.

use contractscan_core::comparison::{Differences, ModifiedClause, NewComparison};
use contractscan_core::contract::{ContractFilter, NewContract};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{ContractIssue, ContractSource, ContractType, IssueType, Severity};
use contractscan_db::{Database, DbError};
use serde_json::{json, Map};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_issue(category: IssueType, severity: Severity) -> ContractIssue {
    let mut metadata = Map::new();
    metadata.insert("clause".into(), json!("4.2"));
    ContractIssue {
        category,
        label: category.display_name().to_string(),
        text: "Payment is due within 90 days of invoice.".into(),
        explanation: "Long payment terms hurt cash flow.".into(),
        suggestion: "Payment is due within 15 days of invoice.".into(),
        severity,
        severity_score: severity.default_score(),
        industry_relevance: vec!["web_development".into(), "general".into()],
        metadata,
    }
}

fn make_contract(user: &str, title: &str, risk: Option<Severity>) -> NewContract {
    let mut metadata = Map::new();
    metadata.insert("industry".into(), json!("web_development"));
    metadata.insert("region".into(), json!("US"));
    NewContract {
        user_id: user.to_string(),
        title: title.to_string(),
        original_text: format!("{title}: the Developer shall build a website."),
        source: ContractSource::Analyzed,
        risk_level: risk,
        contract_type: ContractType::Service,
        recommended_actions: vec!["Negotiate net-15 payment".into()],
        compliance_flags: vec!["NY Freelance Isn't Free Act".into()],
        issues: vec![
            make_issue(IssueType::Payment, Severity::High),
            make_issue(IssueType::Ip, Severity::Medium),
        ],
        metadata,
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Create, read back, delete; every stored field survives the round trip.
pub async fn test_contract_crud(db: &dyn Database) {
    let input = make_contract("alice", "Website build", Some(Severity::High));
    let created = db.create_contract(&input).await.unwrap();
    assert_eq!(created.user_id, "alice");
    assert_eq!(created.title, "Website build");
    assert_eq!(created.source, ContractSource::Analyzed);
    assert_eq!(created.risk_level, Some(Severity::High));
    assert_eq!(created.contract_type, ContractType::Service);
    assert_eq!(created.recommended_actions, input.recommended_actions);
    assert_eq!(created.compliance_flags, input.compliance_flags);
    assert_eq!(created.metadata.get("industry"), Some(&json!("web_development")));
    assert_eq!(created.issues, input.issues);

    let fetched = db.get_contract("alice", &created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.issues.len(), 2);
    assert_eq!(fetched.issues[0].category, IssueType::Payment);
    assert_eq!(fetched.issues[1].category, IssueType::Ip);

    db.delete_contract("alice", &created.id).await.unwrap();
    assert!(matches!(
        db.get_contract("alice", &created.id).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(
        db.delete_contract("alice", &created.id).await,
        Err(DbError::NotFound(_))
    ));
}

/// Generated contracts carry no risk level.
pub async fn test_contract_without_risk(db: &dyn Database) {
    let mut input = make_contract("alice", "Generated", None);
    input.source = ContractSource::Generated;
    input.contract_type = ContractType::Other;
    input.issues.clear();
    let created = db.create_contract(&input).await.unwrap();
    assert_eq!(created.risk_level, None);
    assert_eq!(created.source, ContractSource::Generated);
    assert!(created.issues.is_empty());
}

/// Other users' contracts are invisible.
pub async fn test_contract_ownership(db: &dyn Database) {
    let mine = db
        .create_contract(&make_contract("alice", "Mine", Some(Severity::Low)))
        .await
        .unwrap();
    assert!(matches!(
        db.get_contract("bob", &mine.id).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(
        db.delete_contract("bob", &mine.id).await,
        Err(DbError::NotFound(_))
    ));
    assert!(db
        .list_contracts("bob", &ContractFilter::default())
        .await
        .unwrap()
        .is_empty());
    // still there for the owner
    db.get_contract("alice", &mine.id).await.unwrap();
}

/// Newest first, with risk/source/limit filters.
pub async fn test_contract_listing(db: &dyn Database) {
    let first = db
        .create_contract(&make_contract("carol", "First", Some(Severity::Low)))
        .await
        .unwrap();
    let second = db
        .create_contract(&make_contract("carol", "Second", Some(Severity::High)))
        .await
        .unwrap();
    let mut generated = make_contract("carol", "Third", None);
    generated.source = ContractSource::Generated;
    let third = db.create_contract(&generated).await.unwrap();

    let all = db
        .list_contracts("carol", &ContractFilter::default())
        .await
        .unwrap();
    let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
    assert_eq!(all[1].issues.len(), 2);

    let high = db
        .list_contracts(
            "carol",
            &ContractFilter {
                risk_level: Some(Severity::High),
                ..ContractFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, second.id);

    let generated_only = db
        .list_contracts(
            "carol",
            &ContractFilter {
                source: Some(ContractSource::Generated),
                ..ContractFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(generated_only.len(), 1);
    assert_eq!(generated_only[0].id, third.id);

    let limited = db
        .list_contracts(
            "carol",
            &ContractFilter {
                limit: Some(2),
                ..ContractFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, third.id);
}

/// Dashboard counters per risk level.
pub async fn test_contract_stats(db: &dyn Database) {
    let empty = db.contract_stats("dave").await.unwrap();
    assert_eq!(empty.total_contracts, 0);
    assert_eq!(empty.total_issues, 0);

    for risk in [Severity::High, Severity::High, Severity::Critical] {
        db.create_contract(&make_contract("dave", "c", Some(risk)))
            .await
            .unwrap();
    }
    db.create_contract(&make_contract("erin", "other user", Some(Severity::Low)))
        .await
        .unwrap();

    let stats = db.contract_stats("dave").await.unwrap();
    assert_eq!(stats.total_contracts, 3);
    assert_eq!(stats.total_issues, 6);
    assert_eq!(stats.high, 2);
    assert_eq!(stats.critical, 1);
    assert_eq!(stats.low, 0);
    assert_eq!(stats.medium, 0);
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

pub async fn test_comparison_crud(db: &dyn Database) {
    let mut original = make_contract("frank", "Original Contract", Some(Severity::High));
    original.source = ContractSource::Compared;
    let mut revised = make_contract("frank", "Revised Contract", Some(Severity::Low));
    revised.source = ContractSource::Compared;
    let original = db.create_contract(&original).await.unwrap();
    let revised = db.create_contract(&revised).await.unwrap();

    let differences = Differences {
        added: vec!["Kill fee of 25%".into()],
        removed: vec!["Unlimited revisions".into()],
        modified: vec![ModifiedClause {
            original: "Net 60".into(),
            revised: "Net 15".into(),
            explanation: "Faster payment".into(),
        }],
    };
    let created = db
        .create_comparison(&NewComparison {
            user_id: "frank".into(),
            original_contract_id: original.id.clone(),
            revised_contract_id: revised.id.clone(),
            differences: differences.clone(),
            summary: "The revision is friendlier to the freelancer.".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.differences, differences);
    assert_eq!(created.original_contract_id, original.id);

    let fetched = db.get_comparison("frank", &created.id).await.unwrap();
    assert_eq!(fetched.summary, "The revision is friendlier to the freelancer.");
    assert!(matches!(
        db.get_comparison("grace", &created.id).await,
        Err(DbError::NotFound(_))
    ));

    let listed = db.list_comparisons("frank").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(db.list_comparisons("grace").await.unwrap().is_empty());

    // deleting a compared contract removes the comparison with it
    db.delete_contract("frank", &original.id).await.unwrap();
    assert!(matches!(
        db.get_comparison("frank", &created.id).await,
        Err(DbError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

pub async fn test_preferences(db: &dyn Database) {
    let defaults = db.get_preferences("heidi").await.unwrap();
    assert_eq!(defaults.industry, "general");
    assert_eq!(defaults.region, "US");
    assert!(defaults.updated_at.is_none());

    let updated = db
        .upsert_preferences(
            "heidi",
            &UpdatePreferences {
                industry: Some("graphic_design".into()),
                region: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.industry, "graphic_design");
    assert_eq!(updated.region, "US");
    assert!(updated.updated_at.is_some());

    let updated = db
        .upsert_preferences(
            "heidi",
            &UpdatePreferences {
                industry: None,
                region: Some("EU".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.industry, "graphic_design");
    assert_eq!(updated.region, "EU");

    let fetched = db.get_preferences("heidi").await.unwrap();
    assert_eq!(fetched.industry, "graphic_design");
    assert_eq!(fetched.region, "EU");

    // other users unaffected
    assert_eq!(db.get_preferences("ivan").await.unwrap().industry, "general");
}

// ---------------------------------------------------------------------------
// API keys
// ---------------------------------------------------------------------------

pub async fn test_api_key_crud(db: &dyn Database) {
    assert!(!db.has_api_keys().await.unwrap());

    let key = db.insert_api_key("laptop", "judy", "hash123").await.unwrap();
    assert_eq!(key.name, "laptop");
    assert_eq!(key.user_id, "judy");
    assert_eq!(key.key_hash, "hash123");
    assert!(key.last_used_at.is_none());

    let found = db.find_api_key_by_hash("hash123").await.unwrap().unwrap();
    assert_eq!(found.id, key.id);
    assert!(db.find_api_key_by_hash("nope").await.unwrap().is_none());
    assert!(db.has_api_keys().await.unwrap());

    db.touch_api_key(&key.id).await.unwrap();
    let touched = db.find_api_key_by_hash("hash123").await.unwrap().unwrap();
    assert!(touched.last_used_at.is_some());

    assert_eq!(db.list_api_keys().await.unwrap().len(), 1);

    db.delete_api_key(&key.id).await.unwrap();
    assert!(!db.has_api_keys().await.unwrap());
    assert!(matches!(
        db.delete_api_key(&key.id).await,
        Err(DbError::NotFound(_))
    ));
}

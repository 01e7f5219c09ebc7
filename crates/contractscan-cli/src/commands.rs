use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use contractscan_core::comparison::CompareContracts;
use contractscan_core::contract::{AnalyzeContract, ContractFilter};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{ContractRequirements, ContractSource, Severity};
use contractscan_service::{ContractService, HttpService};
use serde::Serialize;
use tracing::debug;

use crate::render;
use crate::Command;

pub async fn run(service: &HttpService, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Health => {
            service
                .health_check()
                .await
                .with_context(|| format!("server at {}", service.base_url()))?;
            println!("ok");
        }
        Command::Analyze {
            file,
            title,
            industry,
            region,
        } => {
            let contract_text = read_input(&file)?;
            debug!("analyzing {} chars from {}", contract_text.len(), file.display());
            let title = title.or_else(|| default_title(&file));
            let contract = service
                .analyze_contract(&AnalyzeContract {
                    title,
                    contract_text,
                    industry,
                    region,
                })
                .await?;
            emit(json, &contract, || render::contract(&contract))?;
        }
        Command::List {
            risk,
            source,
            limit,
        } => {
            let filter = parse_filter(risk.as_deref(), source.as_deref(), limit)?;
            let contracts = service.list_contracts(&filter).await?;
            emit(json, &contracts, || render::contract_table(&contracts))?;
        }
        Command::Show { id } => {
            let contract = service.get_contract(&id).await?;
            emit(json, &contract, || render::contract(&contract))?;
        }
        Command::Delete { id } => {
            service.delete_contract(&id).await?;
            eprintln!("Deleted contract {id}");
        }
        Command::Stats => {
            let stats = service.contract_stats().await?;
            emit(json, &stats, || render::stats(&stats))?;
        }
        Command::Compare { original, revised } => {
            let outcome = service
                .compare_contracts(&CompareContracts {
                    original_text: read_input(&original)?,
                    revised_text: read_input(&revised)?,
                    original_title: default_title(&original),
                    revised_title: default_title(&revised),
                })
                .await?;
            emit(json, &outcome, || render::comparison(&outcome.analysis))?;
        }
        Command::Comparisons => {
            let comparisons = service.list_comparisons().await?;
            emit(json, &comparisons, || render::comparison_table(&comparisons))?;
        }
        Command::Comparison { id } => {
            let comparison = service.get_comparison(&id).await?;
            emit(json, &comparison, || render::stored_comparison(&comparison))?;
        }
        Command::Generate {
            client,
            freelancer,
            description,
            deliverables,
            timeline,
            payment_terms,
            industry,
            project_type,
            region,
            out,
        } => {
            let req = ContractRequirements {
                industry,
                project_type,
                client_name: client,
                freelancer_name: freelancer,
                project_description: description,
                deliverables,
                timeline,
                payment_terms,
                region,
            };
            let generated = service.generate_contract(&req).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &generated.contract_text)
                        .with_context(|| format!("write {}", path.display()))?;
                    eprintln!(
                        "Saved contract {} to {}",
                        generated.contract_id,
                        path.display()
                    );
                }
                None => emit(json, &generated, || generated.contract_text.clone())?,
            }
        }
        Command::Prefs { industry, region } => {
            let prefs = if industry.is_none() && region.is_none() {
                service.get_preferences().await?
            } else {
                service
                    .update_preferences(&UpdatePreferences { industry, region })
                    .await?
            };
            emit(json, &prefs, || {
                format!("industry: {}\nregion:   {}", prefs.industry, prefs.region)
            })?;
        }
    }
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

/// Read a contract from a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    if text.trim().is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(text)
}

/// File stem as a title, e.g. `acme-msa.txt` -> `acme-msa`.
fn default_title(path: &Path) -> Option<String> {
    if path.as_os_str() == "-" {
        return None;
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

pub fn parse_filter(
    risk: Option<&str>,
    source: Option<&str>,
    limit: Option<i64>,
) -> Result<ContractFilter> {
    let risk_level = match risk {
        Some(r) => match Severity::parse_str(r) {
            Some(level) => Some(level),
            None => bail!("unknown risk level {r:?} (expected LOW, MEDIUM, HIGH or CRITICAL)"),
        },
        None => None,
    };
    let source = match source {
        Some(s) => match ContractSource::parse_str(&s.to_ascii_lowercase()) {
            Some(src) => Some(src),
            None => bail!("unknown source {s:?} (expected analyzed, compared or generated)"),
        },
        None => None,
    };
    Ok(ContractFilter {
        risk_level,
        source,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_filter_accepts_any_case() {
        let f = parse_filter(Some("critical"), Some("Generated"), Some(3)).unwrap();
        assert_eq!(f.risk_level, Some(Severity::Critical));
        assert_eq!(f.source, Some(ContractSource::Generated));
        assert_eq!(f.limit, Some(3));
    }

    #[test]
    fn parse_filter_rejects_unknown() {
        assert!(parse_filter(Some("severe"), None, None).is_err());
        assert!(parse_filter(None, Some("uploaded"), None).is_err());
        assert!(parse_filter(None, None, None).unwrap().risk_level.is_none());
    }

    #[test]
    fn read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "The Client shall pay within 30 days.").unwrap();
        let text = read_input(file.path()).unwrap();
        assert!(text.contains("30 days"));
    }

    #[test]
    fn read_input_rejects_blank_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_input(file.path()).is_err());
        assert!(read_input(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn default_title_uses_file_stem() {
        assert_eq!(
            default_title(Path::new("contracts/acme-msa.txt")).as_deref(),
            Some("acme-msa")
        );
        assert_eq!(default_title(Path::new("-")), None);
    }
}

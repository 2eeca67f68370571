//! Seed the onboarding database with stores from a YAML file.
//!
//! ```yaml
//! stores:
//!   - name: Corner Cafe
//!     region: Gauteng
//!     stage: warm
//!     contact_email: owner@cornercafe.co.za
//!     launch_at: 2024-03-01
//!   - name: Cafe Corner Express
//!     region: Gauteng
//!     confirm_duplicates: true
//! ```
//!
//! Entries go through the same duplicate gate as the API: an entry similar
//! to an existing store is held back unless it sets `confirm_duplicates`.
//! A dry run never connects to the database, so it only compares entries
//! against each other.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info, warn};

use onboarding_admin::config::{duplicate_threshold_from_env, get_database_url};
use onboarding_admin::db;
use onboarding_admin::models::StoreCandidate;
use onboarding_admin::services::{
    CreateStoreInput, DuplicateDetector, InMemoryStoreDirectory, SaveOutcome, StoreService,
};

/// Top-level YAML document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub stores: Vec<CreateStoreInput>,
}

/// Summary of a seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub inserted: usize,
    /// Entries held back, with the stores they resemble.
    pub held: Vec<(String, Vec<StoreCandidate>)>,
    pub errors: Vec<(String, String)>,
}

/// Validate every entry, returning one message per invalid entry.
#[must_use]
pub fn validate_file(file: &SeedFile) -> Vec<String> {
    file.stores
        .iter()
        .enumerate()
        .filter_map(|(i, input)| {
            input
                .validate()
                .err()
                .map(|e| format!("entry {} ({}): {e}", i + 1, input.name))
        })
        .collect()
}

/// Simulate seeding against an empty in-memory directory.
pub async fn preview(file: &SeedFile, threshold: u8) -> SeedResult {
    let mut directory = InMemoryStoreDirectory::default();
    let mut result = SeedResult::default();

    for input in &file.stores {
        let new_store = match input.validate() {
            Ok(new_store) => new_store,
            Err(e) => {
                result.errors.push((input.name.clone(), e.to_string()));
                continue;
            }
        };

        if !input.confirm_duplicates {
            let matches = DuplicateDetector::new(&directory)
                .with_threshold(threshold)
                .check_duplicates(&new_store.name, new_store.region.as_str(), None)
                .await;
            if !matches.is_empty() {
                result.held.push((new_store.name, matches));
                continue;
            }
        }

        directory.insert(StoreCandidate {
            id: None,
            name: new_store.name,
            region: new_store.region.to_string(),
        });
        result.inserted += 1;
    }

    result
}

async fn insert_all(
    database_url: &SecretString,
    file: &SeedFile,
    threshold: u8,
) -> Result<SeedResult, sqlx::Error> {
    let pool = db::create_pool(database_url).await?;
    info!("Connected to database");

    let service = StoreService::new(&pool).with_threshold(threshold);
    let mut result = SeedResult::default();

    for input in &file.stores {
        match service.create(input).await {
            Ok(SaveOutcome::Saved(store)) => {
                info!(store_id = %store.id, name = %store.name, "Inserted store");
                result.inserted += 1;
            }
            Ok(SaveOutcome::NeedsConfirmation(matches)) => {
                result.held.push((input.name.clone(), matches));
            }
            Err(e) => result.errors.push((input.name.clone(), e.to_string())),
        }
    }

    Ok(result)
}

/// Seed stores from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `dry_run` - Validate and preview without connecting to the database
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or the database connection fails.
pub async fn stores(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading stores from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    info!(stores = file.stores.len(), "Parsed seed file");

    let errors = validate_file(&file);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let threshold = duplicate_threshold_from_env()?;
    let result = if dry_run {
        info!("Dry run: comparing entries against each other only");
        preview(&file, threshold).await
    } else {
        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        insert_all(&database_url, &file, threshold).await?
    };

    let verb = if dry_run { "Would insert" } else { "Inserted" };
    info!("Seeding complete!");
    info!("  {verb}: {}", result.inserted);

    if !result.held.is_empty() {
        warn!("  Held for duplicate confirmation: {}", result.held.len());
        for (name, matches) in &result.held {
            let similar: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
            warn!("    - {name} resembles {}", similar.join(", "));
        }
    }

    if !result.errors.is_empty() {
        error!("  Errors: {}", result.errors.len());
        for (name, err) in &result.errors {
            error!("    - {name}: {err}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use onboarding_admin::services::DEFAULT_DUPLICATE_THRESHOLD;

    const SEED: &str = r"
stores:
  - name: Corner Cafe
    region: Gauteng
    stage: warm
    launch_at: 2024-03-01
  - name: Cafe Corner
    region: Gauteng
  - name: Cafe Corner
    region: Western Cape
  - name: The Corner Cafe Rosebank
    region: Gauteng
    confirm_duplicates: true
";

    #[test]
    fn test_parse_seed_file() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(file.stores.len(), 4);
        assert!(file.stores[3].confirm_duplicates);
        assert!(validate_file(&file).is_empty());
    }

    #[test]
    fn test_validate_file_reports_entries() {
        let file: SeedFile = serde_yaml::from_str(
            r"
stores:
  - name: Corner Cafe
    region: gauteng
  - name: ''
    region: Limpopo
",
        )
        .unwrap();

        let errors = validate_file(&file);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("entry 1 (Corner Cafe)"));
        assert!(errors[1].starts_with("entry 2"));
    }

    #[tokio::test]
    async fn test_preview_holds_in_file_duplicates() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let result = preview(&file, DEFAULT_DUPLICATE_THRESHOLD).await;

        assert_eq!(result.inserted, 3);
        assert_eq!(result.held.len(), 1);
        assert_eq!(result.held[0].0, "Cafe Corner");
        assert_eq!(result.held[0].1[0].name, "Corner Cafe");
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_preview_applies_threshold() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();

        // Reordered names score exactly 100, which never exceeds 100
        let result = preview(&file, 100).await;
        assert_eq!(result.inserted, 4);
        assert!(result.held.is_empty());
    }
}

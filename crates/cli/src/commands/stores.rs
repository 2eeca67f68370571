//! Ad-hoc store inspection commands.

use tracing::warn;

use onboarding_admin::config::{duplicate_threshold_from_env, get_database_url};
use onboarding_admin::db::{self, StoreRepository};
use onboarding_admin::services::{DuplicateCheck, DuplicateDetector};
use onboarding_core::StoreId;

/// Print the stores in `region` whose names resemble `name`.
///
/// # Errors
///
/// Returns an error if the database URL is missing, `DUPLICATE_THRESHOLD`
/// is invalid, or the pool cannot be created. A failing query is reported as a warning, not an error.
pub async fn check_duplicates(
    name: &str,
    region: &str,
    exclude: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let threshold = duplicate_threshold_from_env()?;
    let database_url = get_database_url("ADMIN_DATABASE_URL")?;
    let pool = db::create_pool(&database_url).await?;

    let exclude = exclude.map(StoreId::from);
    let detector = DuplicateDetector::new(StoreRepository::new(&pool)).with_threshold(threshold);
    let check = detector.check(name, region, exclude.as_ref()).await;

    #[allow(clippy::print_stdout)]
    match check {
        DuplicateCheck::Skipped => println!("Nothing to check: name and region are required"),
        DuplicateCheck::NotFound => println!("No similar stores in {region}"),
        DuplicateCheck::Found(matches) => {
            println!("{} similar store(s) in {region}:", matches.len());
            for candidate in matches {
                let id = candidate.id.as_ref().map_or("-", StoreId::as_str);
                println!("  {id}  {}", candidate.name);
            }
        }
        DuplicateCheck::Unavailable => {
            warn!("Store lookup failed; duplicates could not be checked");
        }
    }

    Ok(())
}

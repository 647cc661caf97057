//! Seed the catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - id: 1
//!   name: Lavender Bar
//!   price: "3.50"
//!   type: Bar
//!   description: Cold-process soap with lavender oil.
//!   picture: lavender.jpg
//!   featured: true
//! ```
//!
//! Prices are quoted decimal strings. The whole file is validated before
//! anything is written; products are upserted by `id`, so re-running a seed
//! updates prices and descriptions in place.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use suds_core::{Money, ProductId};
use suds_storefront::db::{CatalogStore, PgStore, create_pool};
use suds_storefront::models::Product;

use super::{CommandError, database_url};

/// One product as written in the catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Parse a catalog file's contents.
///
/// # Errors
///
/// Returns the YAML error if the document is not a list of entries.
pub fn parse_catalog(content: &str) -> Result<Vec<CatalogEntry>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Check every entry, returning one message per problem.
#[must_use]
pub fn validate_catalog(entries: &[CatalogEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.id) {
            errors.push(format!("product {}: duplicate id", entry.id));
        }
        if entry.name.trim().is_empty() {
            errors.push(format!("product {}: name is required", entry.id));
        }
        if entry.product_type.trim().is_empty() {
            errors.push(format!("product {}: type is required", entry.id));
        }
        if let Err(e) = Money::new(entry.price) {
            errors.push(format!("product {}: {e}", entry.id));
        }
    }

    errors
}

/// Convert validated entries into products.
fn into_products(entries: Vec<CatalogEntry>) -> Vec<Product> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let price = Money::new(entry.price).ok()?;
            Some(Product {
                id: ProductId::new(entry.id),
                name: entry.name.trim().to_string(),
                price,
                product_type: entry.product_type.trim().to_string(),
                description: entry.description,
                picture: entry.picture,
                featured: entry.featured,
            })
        })
        .collect()
}

/// Seed catalog products from a YAML file.
///
/// With `check_only`, stops after validation.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or a database write fails.
pub async fn catalog(path: &Path, check_only: bool) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let entries = parse_catalog(&content)?;
    info!(products = entries.len(), "Parsed catalog");

    let errors = validate_catalog(&entries);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::InvalidCatalog(errors.len()));
    }
    info!("Catalog validated successfully");

    if check_only {
        return Ok(());
    }

    let pool = create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);
    info!("Connected to database");

    let products = into_products(entries);
    for product in &products {
        store.upsert_product(product).await?;
    }

    info!(upserted = products.len(), "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
- id: 1
  name: Lavender Bar
  price: "3.50"
  type: Bar
  description: Cold-process soap.
  picture: lavender.jpg
  featured: true
- id: 2
  name: Citrus Wash
  price: "12.00"
  type: Liquid
"#;

    #[test]
    fn test_parse_reads_optional_fields() {
        let entries = parse_catalog(CATALOG).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product_type, "Bar");
        assert!(entries[0].featured);
        assert_eq!(entries[1].picture, None);
        assert_eq!(entries[1].description, "");
        assert!(validate_catalog(&entries).is_empty());
    }

    #[test]
    fn test_validate_rejects_negative_price_and_duplicates() {
        let mut entries = parse_catalog(CATALOG).unwrap();
        entries[1].id = 1;
        entries[1].price = Decimal::new(-100, 2);

        let errors = validate_catalog(&entries);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("duplicate id"));
        assert!(errors[1].contains("negative"));
    }

    #[test]
    fn test_into_products_trims_names() {
        let mut entries = parse_catalog(CATALOG).unwrap();
        entries[0].name = "  Lavender Bar ".into();

        let products = into_products(entries);
        assert_eq!(products[0].name, "Lavender Bar");
        assert_eq!(products[0].price.display(), "3.50");
        assert_eq!(products[1].id, ProductId::new(2));
    }
}

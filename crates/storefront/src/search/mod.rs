//! Catalog search: free-text term, type filter and sort order.
//!
//! [`SearchQuery`] is the parsed, validated form of the `/search` URL
//! parameters. [`query_builder`] turns it into parameterized SQL; the same
//! query also knows how to match and order products in memory.

pub mod query_builder;

use std::cmp::Ordering;

use crate::models::Product;

/// Product type filter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// All product types.
    #[default]
    None,
    /// Exact match on the product's type tag.
    ByType(String),
}

impl ProductFilter {
    /// Parse from URL parameter value.
    ///
    /// `bar` and `liquid` map to the catalog's `Bar` and `Liquid` tags; any
    /// other non-empty value is used as a type tag verbatim.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" => Self::None,
            "bar" => Self::ByType("Bar".to_string()),
            "liquid" => Self::ByType("Liquid".to_string()),
            other => Self::ByType(other.to_string()),
        }
    }

    fn admits(&self, product: &Product) -> bool {
        match self {
            Self::None => true,
            Self::ByType(tag) => product.product_type == *tag,
        }
    }
}

/// Search sort order.
///
/// Every order breaks ties on product ID ascending, so equal keys always come
/// back in the same order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    /// Catalog order (product ID ascending).
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    /// Case-insensitive name order.
    NameAsc,
}

impl SearchSort {
    /// Parse from URL parameter value. Unknown values fall back to relevance.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "ascending" | "price_asc" => Self::PriceAsc,
            "descending" | "price_desc" => Self::PriceDesc,
            "alpha" | "name" => Self::NameAsc,
            _ => Self::Relevance,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "ascending",
            Self::PriceDesc => "descending",
            Self::NameAsc => "alpha",
        }
    }

    /// The `ORDER BY` clause for this sort. Always a fixed string.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Relevance => "id ASC",
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id ASC",
            Self::NameAsc => r#"lower(name) COLLATE "C" ASC, id ASC"#,
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        let primary = match self {
            Self::Relevance => Ordering::Equal,
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// A catalog search request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Trimmed search term; empty matches every product.
    pub term: String,
    pub filter: ProductFilter,
    pub sort: SearchSort,
}

impl SearchQuery {
    #[must_use]
    pub fn new(term: &str, filter: ProductFilter, sort: SearchSort) -> Self {
        Self {
            term: term.trim().to_string(),
            filter,
            sort,
        }
    }

    /// Build from raw URL parameters. Missing parameters take their defaults.
    #[must_use]
    pub fn from_params(term: Option<&str>, filter: Option<&str>, sort: Option<&str>) -> Self {
        Self::new(
            term.unwrap_or_default(),
            filter.map(ProductFilter::parse).unwrap_or_default(),
            sort.map(SearchSort::parse).unwrap_or_default(),
        )
    }

    /// Whether `product` satisfies the term and the filter.
    ///
    /// The term matches name or description as a case-insensitive substring.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.filter.admits(product) {
            return false;
        }
        if self.term.is_empty() {
            return true;
        }
        let needle = self.term.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }

    /// Total order of two products under this query's sort.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.sort.compare(a, b)
    }
}

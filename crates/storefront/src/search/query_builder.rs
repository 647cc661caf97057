//! Parameterized SQL for catalog search.
//!
//! Every user-supplied value is pushed as a bind parameter. The only text
//! appended to the statement is fixed: column lists, predicate templates and
//! the `ORDER BY` clause chosen by [`SearchSort::order_by`].
//!
//! [`SearchSort::order_by`]: super::SearchSort::order_by

use sqlx::{Postgres, QueryBuilder};

use super::{ProductFilter, SearchQuery};

const SELECT_PRODUCTS: &str = "SELECT id, name, price, product_type, description, picture, featured \
     FROM storefront.product WHERE TRUE";

/// Build the search statement for `query`.
///
/// `strpos` is used instead of `LIKE` so `%` and `_` in the term match
/// literally.
#[must_use]
pub fn build(query: &SearchQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_PRODUCTS);

    if !query.term.is_empty() {
        builder.push(" AND (strpos(lower(name), lower(");
        builder.push_bind(query.term.clone());
        builder.push(")) > 0 OR strpos(lower(description), lower(");
        builder.push_bind(query.term.clone());
        builder.push(")) > 0)");
    }

    if let ProductFilter::ByType(tag) = &query.filter {
        builder.push(" AND product_type = ");
        builder.push_bind(tag.clone());
    }

    builder.push(" ORDER BY ");
    builder.push(query.sort.order_by());
    builder
}

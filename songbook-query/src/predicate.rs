//! Turns a populated filter into a parameterized SELECT.
//!
//! ```rust
//! use songbook_query::{FilterValue, PredicateBuilder, SongFilter};
//!
//! let filter = SongFilter::new().group("Muse").release_date("").page(1);
//! let query = PredicateBuilder::sqlite().build(&filter);
//!
//! assert!(query.sql.contains(r#"JOIN "groups" g ON s."groupId" = g."id""#));
//! assert!(query.sql.contains(r#" WHERE g."name" = ?"#));
//! assert!(!query.sql.contains("releaseDate\" ="));
//! assert!(query.sql.ends_with("LIMIT 10 OFFSET 0"));
//! assert_eq!(query.params, vec![FilterValue::String("Muse".into())]);
//! ```

use tracing::debug;

use crate::descriptor::{FilterSchema, MatchMode, Target};
use crate::filter::{Filter, FilterValue};
use crate::pagination::Pagination;
use crate::query::QueryFilter;
use crate::sql::{DatabaseType, SqlBuilder};

/// A statement and the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// SQL text with placeholders.
    pub sql: String,
    /// Bound values.
    pub params: Vec<FilterValue>,
}

/// Builds SELECT statements for any [`QueryFilter`].
///
/// Pure: holds only the target dialect, performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateBuilder {
    db_type: DatabaseType,
}

impl PredicateBuilder {
    /// Create a builder for `db_type`.
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }

    /// Create a SQLite builder.
    pub fn sqlite() -> Self {
        Self::new(DatabaseType::SQLite)
    }

    /// Create a PostgreSQL builder.
    pub fn postgres() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }

    /// The abstract predicate list for `filter`.
    ///
    /// One predicate per populated, non-excluded field, in declared order.
    pub fn predicates<F: QueryFilter + ?Sized>(&self, filter: &F) -> Filter {
        let schema = filter.schema();
        Filter::and(schema.predicate_fields().filter_map(|field| {
            let value = field.transform.apply(filter.value(field.name)?);
            let column = schema.column(field);
            match field.mode {
                MatchMode::Equals => Some(Filter::Equals(column, FilterValue::String(value))),
                MatchMode::Substring => Some(Filter::Contains(column, value)),
                MatchMode::Excluded => None,
            }
        }))
    }

    /// The full search statement: select, join, predicates, order and window.
    pub fn build<F: QueryFilter + ?Sized>(&self, filter: &F) -> BuiltQuery {
        let schema = filter.schema();
        let predicates = self.predicates(filter);
        let pagination = Pagination::for_search(filter.page(), filter.limit());

        let mut builder = self.select(schema);
        predicates.write_where(&mut builder);
        self.order_by_key(schema, &mut builder);
        if let Some(pagination) = pagination {
            builder.push(" ");
            builder.push(pagination.to_sql());
        }

        let (sql, params) = builder.build();
        debug!(
            model = schema.model,
            predicates = predicates.len(),
            paginated = pagination.is_some(),
            sql = %sql,
            "Built search query"
        );
        BuiltQuery { sql, params }
    }

    /// Select a single row by primary key, with the same columns as a search.
    pub fn by_id(&self, schema: &FilterSchema, id: i64) -> BuiltQuery {
        let mut builder = self.select(schema);
        let key = schema.key_column();
        builder
            .push(" WHERE ")
            .push_column(key.alias, key.name)
            .push(" = ")
            .push_param(id);
        let (sql, params) = builder.build();
        BuiltQuery { sql, params }
    }

    /// `SELECT <columns> FROM <primary> [JOIN <joined> ON ...]`.
    fn select(&self, schema: &FilterSchema) -> SqlBuilder {
        let mut builder = SqlBuilder::new(self.db_type);
        builder.push("SELECT ");
        for (i, col) in schema.select.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_column(schema.alias(col.target), col.column);
        }
        builder
            .push(" FROM ")
            .push_identifier(schema.primary.name)
            .push(" ")
            .push(schema.primary.alias);

        if let Some(join) = schema.join {
            builder
                .push(" JOIN ")
                .push_identifier(join.table.name)
                .push(" ")
                .push(join.table.alias)
                .push(" ON ")
                .push_column(schema.alias(Target::Primary), join.local_column)
                .push(" = ")
                .push_column(join.table.alias, join.foreign_column);
        }
        builder
    }

    fn order_by_key(&self, schema: &FilterSchema, builder: &mut SqlBuilder) {
        let key = schema.key_column();
        builder.push(" ORDER BY ").push_column(key.alias, key.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SONG_SCHEMA;
    use crate::query::{GroupFilter, SongFilter};
    use pretty_assertions::assert_eq;

    const SONG_SELECT: &str = "SELECT s.\"id\", s.\"name\", s.\"releaseDate\", s.\"text\", \
        s.\"link\", s.\"groupId\", g.\"name\" FROM \"songs\" s \
        JOIN \"groups\" g ON s.\"groupId\" = g.\"id\"";

    #[test]
    fn test_empty_filter_has_no_where() {
        let query = PredicateBuilder::sqlite().build(&SongFilter::new());
        assert_eq!(query.sql, format!("{} ORDER BY s.\"id\"", SONG_SELECT));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_group_and_empty_date_with_first_page() {
        let filter = SongFilter::new().group("Muse").release_date("").page(1);
        let query = PredicateBuilder::sqlite().build(&filter);
        assert_eq!(
            query.sql,
            format!(
                "{} WHERE g.\"name\" = ? ORDER BY s.\"id\" LIMIT 10 OFFSET 0",
                SONG_SELECT
            )
        );
        assert_eq!(query.params, vec![FilterValue::from("Muse")]);
    }

    #[test]
    fn test_all_fields_in_declared_order() {
        let filter = SongFilter::new()
            .link("https://example.com/x")
            .text("night")
            .release_date("16.07.2006")
            .group("Muse")
            .name("Uprising");
        let query = PredicateBuilder::postgres().build(&filter);
        assert_eq!(
            query.sql,
            format!(
                "{} WHERE s.\"name\" = $1 AND g.\"name\" = $2 AND s.\"releaseDate\" = $3 \
                 AND s.\"text\" LIKE $4 ESCAPE '\\' AND s.\"link\" = $5 ORDER BY s.\"id\"",
                SONG_SELECT
            )
        );
        assert_eq!(
            query.params,
            vec![
                FilterValue::from("Uprising"),
                FilterValue::from("Muse"),
                FilterValue::from("2006-07-16"),
                FilterValue::from("%night%"),
                FilterValue::from("https://example.com/x"),
            ]
        );
    }

    #[test]
    fn test_page_zero_is_unpaginated_even_with_limit() {
        let filter = SongFilter::new().page(0).limit(3);
        let query = PredicateBuilder::sqlite().build(&filter);
        assert!(!query.sql.contains("LIMIT"));
    }

    #[test]
    fn test_explicit_limit_and_page() {
        let filter = SongFilter::new().page(3).limit(4);
        let query = PredicateBuilder::sqlite().build(&filter);
        assert!(query.sql.ends_with("LIMIT 4 OFFSET 8"));
    }

    #[test]
    fn test_values_are_never_inlined() {
        let filter = SongFilter::new().name("x' OR '1'='1").text("%");
        let query = PredicateBuilder::sqlite().build(&filter);
        assert!(!query.sql.contains("OR '1'"));
        assert_eq!(query.params[1], FilterValue::from("%\\%%"));
    }

    #[test]
    fn test_group_filter_is_substring_without_join() {
        let query = PredicateBuilder::sqlite().build(&GroupFilter::name("Mu"));
        assert_eq!(
            query.sql,
            "SELECT g.\"id\", g.\"name\" FROM \"groups\" g \
             WHERE g.\"name\" LIKE ? ESCAPE '\\' ORDER BY g.\"id\""
        );
        assert_eq!(query.params, vec![FilterValue::from("%Mu%")]);
    }

    #[test]
    fn test_by_id() {
        let query = PredicateBuilder::postgres().by_id(&SONG_SCHEMA, 7);
        assert_eq!(query.sql, format!("{} WHERE s.\"id\" = $1", SONG_SELECT));
        assert_eq!(query.params, vec![FilterValue::Int(7)]);
    }

    #[test]
    fn test_predicate_count_matches_populated_fields() {
        let builder = PredicateBuilder::sqlite();
        assert_eq!(builder.predicates(&SongFilter::new()).len(), 0);
        assert_eq!(builder.predicates(&SongFilter::new().text("a")).len(), 1);
        assert_eq!(
            builder
                .predicates(&SongFilter::new().text("a").group("b").page(2))
                .len(),
            2
        );
    }
}

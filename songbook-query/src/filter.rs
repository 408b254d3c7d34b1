//! Predicate types for building WHERE clauses.
//!
//! A [`Filter`] is the abstract predicate list produced from a populated
//! search filter. It never contains user values inline: rendering it through
//! a [`SqlBuilder`] emits placeholders and collects the values to bind.

use crate::sql::{LIKE_ESCAPE, SqlBuilder, escape_like};

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Integer value.
    Int(i64),
    /// String value.
    String(String),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// An alias-qualified column, rendered as `alias."name"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Table alias.
    pub alias: &'static str,
    /// Column name.
    pub name: &'static str,
}

impl Column {
    /// Create a column reference.
    pub const fn new(alias: &'static str, name: &'static str) -> Self {
        Self { alias, name }
    }
}

/// A predicate tree that can be rendered to SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// No filter (always true).
    None,
    /// Equals comparison.
    Equals(Column, FilterValue),
    /// Substring match (`LIKE %value%`), value matched literally.
    Contains(Column, String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Combine filters with AND, dropping empty ones and flattening nested ANDs.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut flat = Vec::new();
        for filter in filters {
            match filter {
                Self::None => {}
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::None,
            1 => flat.pop().unwrap_or(Self::None),
            _ => Self::And(flat),
        }
    }

    /// The individual predicates in declaration order.
    pub fn predicates(&self) -> &[Filter] {
        match self {
            Self::None => &[],
            Self::And(inner) => inner,
            single => std::slice::from_ref(single),
        }
    }

    /// Number of leaf predicates.
    pub fn len(&self) -> usize {
        self.predicates().len()
    }

    /// Check if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.is_none()
    }

    /// Write a single predicate expression.
    pub fn write_sql(&self, builder: &mut SqlBuilder) {
        match self {
            Self::None => {
                builder.push("1=1");
            }
            Self::Equals(col, value) if value.is_null() => {
                builder.push_column(col.alias, col.name).push(" IS NULL");
            }
            Self::Equals(col, value) => {
                builder
                    .push_column(col.alias, col.name)
                    .push(" = ")
                    .push_param(value.clone());
            }
            Self::Contains(col, value) => {
                builder
                    .push_column(col.alias, col.name)
                    .push(" LIKE ")
                    .push_param(format!("%{}%", escape_like(value)))
                    .push(format!(" ESCAPE '{}'", LIKE_ESCAPE));
            }
            Self::And(inner) => {
                for (i, filter) in inner.iter().enumerate() {
                    if i > 0 {
                        builder.push(" AND ");
                    }
                    filter.write_sql(builder);
                }
            }
        }
    }

    /// Write ` WHERE p1 AND p2 ...`, or nothing for an empty filter.
    pub fn write_where(&self, builder: &mut SqlBuilder) {
        for (i, predicate) in self.predicates().iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.write_sql(builder);
        }
    }
}

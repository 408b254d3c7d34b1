//! Static field descriptor tables.
//!
//! Every searchable entity has one [`FilterSchema`]: the tables it reads,
//! the columns it selects, and an ordered list of [`FieldDescriptor`]s that
//! say how each filter field turns into a predicate. The tables are plain
//! `static` data built at compile time and shared read-only by every request.
//!
//! ```rust
//! use songbook_query::descriptor::{MatchMode, SONG_SCHEMA, Target};
//!
//! let group = SONG_SCHEMA.field("group").unwrap();
//! assert_eq!(group.target, Target::Joined);
//! assert_eq!(group.mode, MatchMode::Equals);
//!
//! let text = SONG_SCHEMA.field("text").unwrap();
//! assert_eq!(text.mode, MatchMode::Substring);
//! ```

use crate::filter::Column;

/// How a populated field becomes a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `column = value`.
    Equals,
    /// Column contains the value anywhere, case-sensitively.
    Substring,
    /// Never part of the predicate (pagination controls).
    Excluded,
}

/// Which table in the query a field refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The entity's own table.
    Primary,
    /// The table joined in by [`JoinSpec`].
    Joined,
}

/// Named format rules checked before a query reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// `DD.MM.YYYY`, digit grouping only.
    Date,
    /// `http(s)://` URL.
    Url,
}

impl ValidationRule {
    /// Rule name as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Url => "url",
        }
    }

    /// Short description of the expected format.
    pub fn expectation(&self) -> &'static str {
        match self {
            Self::Date => "a date in DD.MM.YYYY format",
            Self::Url => "an http(s) URL",
        }
    }
}

/// Rewriting applied to a field's value before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTransform {
    /// Bind the value unchanged.
    AsIs,
    /// `DD.MM.YYYY` to the stored `YYYY-MM-DD` form.
    DottedDateToIso,
}

impl ValueTransform {
    /// Apply the transform.
    ///
    /// Values not in dotted form pass through untouched; validation is the
    /// place that rejects them.
    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::AsIs => value.to_string(),
            Self::DottedDateToIso => {
                let mut parts = value.split('.');
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(day), Some(month), Some(year), None) => {
                        format!("{}-{}-{}", year, month, day)
                    }
                    _ => value.to_string(),
                }
            }
        }
    }
}

/// A table and the alias it is read under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef {
    /// Table name.
    pub name: &'static str,
    /// Alias used in generated SQL.
    pub alias: &'static str,
}

/// `primary.local_column = joined.foreign_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    /// The joined table.
    pub table: TableRef,
    /// Column on the primary table.
    pub local_column: &'static str,
    /// Column on the joined table.
    pub foreign_column: &'static str,
}

/// A column in the SELECT list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectColumn {
    /// Table the column lives in.
    pub target: Target,
    /// Column name.
    pub column: &'static str,
}

/// Describes one field of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, as used in query strings and error messages.
    pub name: &'static str,
    /// Column the predicate targets.
    pub column: &'static str,
    /// Table the column lives in.
    pub target: Target,
    /// How the predicate compares.
    pub mode: MatchMode,
    /// Format rule, if any.
    pub rule: Option<ValidationRule>,
    /// Rewriting applied before binding.
    pub transform: ValueTransform,
}

impl FieldDescriptor {
    const fn new(name: &'static str, column: &'static str, target: Target, mode: MatchMode) -> Self {
        Self {
            name,
            column,
            target,
            mode,
            rule: None,
            transform: ValueTransform::AsIs,
        }
    }

    const fn excluded(name: &'static str) -> Self {
        Self::new(name, "", Target::Primary, MatchMode::Excluded)
    }

    const fn rule(mut self, rule: ValidationRule) -> Self {
        self.rule = Some(rule);
        self
    }

    const fn transform(mut self, transform: ValueTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Whether this field ever produces a predicate.
    pub fn is_predicate(&self) -> bool {
        self.mode != MatchMode::Excluded
    }
}

/// The full static description of one searchable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSchema {
    /// Model name used in errors and logs.
    pub model: &'static str,
    /// The entity's own table.
    pub primary: TableRef,
    /// Primary key column on the primary table.
    pub key: &'static str,
    /// Optional joined table.
    pub join: Option<JoinSpec>,
    /// Columns selected, in row order.
    pub select: &'static [SelectColumn],
    /// Filter fields, in predicate order.
    pub fields: &'static [FieldDescriptor],
}

impl FilterSchema {
    /// Alias for a target table.
    ///
    /// A `Joined` target on a schema without a join falls back to the
    /// primary alias.
    pub fn alias(&self, target: Target) -> &'static str {
        match (target, self.join) {
            (Target::Joined, Some(join)) => join.table.alias,
            _ => self.primary.alias,
        }
    }

    /// Qualified column for a field.
    pub fn column(&self, field: &FieldDescriptor) -> Column {
        Column::new(self.alias(field.target), field.column)
    }

    /// The primary key column.
    pub fn key_column(&self) -> Column {
        Column::new(self.primary.alias, self.key)
    }

    /// Look a field up by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that produce predicates, in declared order.
    pub fn predicate_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_predicate())
    }

    /// Fields that carry a validation rule.
    pub fn validated_fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, ValidationRule)> {
        self.fields.iter().filter_map(|f| f.rule.map(|rule| (f, rule)))
    }
}

const SONGS: TableRef = TableRef {
    name: "songs",
    alias: "s",
};

const GROUPS: TableRef = TableRef {
    name: "groups",
    alias: "g",
};

/// Songs joined to their group.
pub static SONG_SCHEMA: FilterSchema = FilterSchema {
    model: "Song",
    primary: SONGS,
    key: "id",
    join: Some(JoinSpec {
        table: GROUPS,
        local_column: "groupId",
        foreign_column: "id",
    }),
    select: &[
        SelectColumn { target: Target::Primary, column: "id" },
        SelectColumn { target: Target::Primary, column: "name" },
        SelectColumn { target: Target::Primary, column: "releaseDate" },
        SelectColumn { target: Target::Primary, column: "text" },
        SelectColumn { target: Target::Primary, column: "link" },
        SelectColumn { target: Target::Primary, column: "groupId" },
        SelectColumn { target: Target::Joined, column: "name" },
    ],
    fields: &[
        FieldDescriptor::new("name", "name", Target::Primary, MatchMode::Equals),
        FieldDescriptor::new("group", "name", Target::Joined, MatchMode::Equals),
        FieldDescriptor::new("releaseDate", "releaseDate", Target::Primary, MatchMode::Equals)
            .rule(ValidationRule::Date)
            .transform(ValueTransform::DottedDateToIso),
        FieldDescriptor::new("text", "text", Target::Primary, MatchMode::Substring),
        FieldDescriptor::new("link", "link", Target::Primary, MatchMode::Equals)
            .rule(ValidationRule::Url),
        FieldDescriptor::excluded("page"),
        FieldDescriptor::excluded("limit"),
    ],
};

/// Groups, matched by name substring.
pub static GROUP_SCHEMA: FilterSchema = FilterSchema {
    model: "Group",
    primary: GROUPS,
    key: "id",
    join: None,
    select: &[
        SelectColumn { target: Target::Primary, column: "id" },
        SelectColumn { target: Target::Primary, column: "name" },
    ],
    fields: &[FieldDescriptor::new("name", "name", Target::Primary, MatchMode::Substring)],
};

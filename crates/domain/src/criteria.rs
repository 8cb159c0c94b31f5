use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SortDirection;

/// Upper bound for the number of rows a list request may ask for.
pub const MAX_LIMIT: usize = 500;

/// Caps a requested result limit; zero and negative requests mean "no limit".
#[must_use]
pub fn cap_limit(requested: i64) -> Option<usize> {
    if requested <= 0 {
        return None;
    }

    Some(usize::try_from(requested).map_or(MAX_LIMIT, |value| value.min(MAX_LIMIT)))
}

/// Normalizes a requested offset; zero and negative requests mean "no offset".
#[must_use]
pub fn normalize_offset(requested: i64) -> Option<usize> {
    if requested <= 0 {
        return None;
    }

    usize::try_from(requested).ok()
}

/// Repository-agnostic condition on record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Field is absent or null.
    IsNull {
        /// Field name.
        field: String,
    },
    /// Field contains the substring, case-insensitively.
    Contains {
        /// Field name.
        field: String,
        /// Substring to look for.
        value: String,
    },
    /// Field equals the JSON value.
    Equals {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field differs from the JSON value.
    NotEquals {
        /// Field name.
        field: String,
        /// Rejected value.
        value: Value,
    },
    /// Every nested predicate matches.
    All(Vec<Predicate>),
    /// At least one nested predicate matches.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Builds a null check.
    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    /// Builds a substring check.
    #[must_use]
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds an equality check.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds an inequality check.
    #[must_use]
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluates the predicate against a record's fields.
    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        match self {
            Self::IsNull { field } => fields.get(field).is_none_or(Value::is_null),
            Self::Contains { field, value } => fields
                .get(field)
                .and_then(searchable_text)
                .is_some_and(|text| text.to_lowercase().contains(&value.to_lowercase())),
            Self::Equals { field, value } => fields.get(field).unwrap_or(&Value::Null) == value,
            Self::NotEquals { field, value } => fields.get(field).unwrap_or(&Value::Null) != value,
            Self::All(predicates) => predicates.iter().all(|predicate| predicate.matches(fields)),
            Self::Any(predicates) => predicates.iter().any(|predicate| predicate.matches(fields)),
        }
    }
}

fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One ordering instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    /// Field name.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Finalized sort, filter and pagination intent for a repository query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Criteria {
    sort: Vec<SortDirective>,
    predicates: Vec<Predicate>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl Criteria {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }

    /// Returns the ordering instructions.
    #[must_use]
    pub fn sort(&self) -> &[SortDirective] {
        self.sort.as_slice()
    }

    /// Returns the predicates; all of them must match.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        self.predicates.as_slice()
    }

    /// Returns the number of skipped rows.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns the maximum number of rows.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns whether a record's fields satisfy every predicate.
    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(fields))
    }

    /// Returns the same filter without ordering and pagination, as used for counts.
    #[must_use]
    pub fn for_count(&self) -> Self {
        Self {
            sort: Vec::new(),
            predicates: self.predicates.clone(),
            offset: None,
            limit: None,
        }
    }
}

/// Accumulates criteria parts before they are frozen into [`Criteria`].
#[derive(Debug, Clone, Default)]
pub struct CriteriaBuilder {
    sort: Vec<SortDirective>,
    predicates: Vec<Predicate>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl CriteriaBuilder {
    /// Adds a predicate that must hold.
    #[must_use]
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Replaces the ordering instructions.
    #[must_use]
    pub fn order_by(mut self, sort: Vec<SortDirective>) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the number of skipped rows.
    #[must_use]
    pub fn first_result(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the maximum number of rows, capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn max_results(mut self, limit: usize) -> Self {
        self.limit = Some(limit.min(MAX_LIMIT));
        self
    }

    /// Freezes the accumulated parts.
    #[must_use]
    pub fn build(self) -> Criteria {
        Criteria {
            sort: self.sort,
            predicates: self.predicates,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

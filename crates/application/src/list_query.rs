//! Translation of list query strings into repository criteria.
//!
//! `?sort[createdAt]=DESC&filter[email]=jane&search=doe&offset=20&limit=50`
//! becomes a [`Criteria`] against the resource's [`ListSchema`]. Input that
//! does not fit the schema is dropped, never rejected.

use backoffice_domain::{
    Criteria, DELETED_AT_FIELD, ListSchema, Predicate, SortDirection, SortDirective, cap_limit,
    normalize_offset,
};

#[cfg(test)]
mod tests;

/// One decoded query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Scalar value, e.g. `search=foo`.
    Text(String),
    /// Bracketed values, e.g. `sort[name]=ASC`, in arrival order.
    Map(Vec<(String, QueryValue)>),
}

impl QueryValue {
    /// Returns the scalar value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Map(_) => None,
        }
    }

    /// Returns the nested entries.
    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, QueryValue)]> {
        match self {
            Self::Text(_) => None,
            Self::Map(entries) => Some(entries.as_slice()),
        }
    }
}

/// Ordered query-string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Wraps already-decoded parameters.
    #[must_use]
    pub fn from_entries(entries: Vec<(String, QueryValue)>) -> Self {
        Self { entries }
    }

    /// Decodes a raw `application/x-www-form-urlencoded` query string.
    ///
    /// `base[a][b]=v` nests under `base`, which keeps the position of its
    /// first appearance; a repeated scalar key keeps its last value. Keys
    /// nested deeper than [`MAX_KEY_DEPTH`] are dropped.
    #[must_use]
    pub fn parse(raw_query: &str) -> Self {
        let mut entries = Vec::new();

        for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
            let Some(path) = split_key(key.as_ref()) else {
                tracing::debug!(key_length = key.len(), "dropped over-nested query key");
                continue;
            };
            insert_value(&mut entries, &path, value.into_owned());
        }

        Self { entries }
    }

    /// Returns the parameters in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Returns one top-level parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns whether no parameter was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deepest accepted bracket nesting; deeper keys are dropped.
pub const MAX_KEY_DEPTH: usize = 64;

/// Splits `base[a][b]` into its path. Malformed brackets keep the key as a
/// plain name; `None` when the nesting exceeds [`MAX_KEY_DEPTH`].
fn split_key(key: &str) -> Option<Vec<String>> {
    let plain = || Some(vec![key.to_owned()]);
    let Some(open) = key.find('[') else {
        return plain();
    };
    if open == 0 {
        return plain();
    }

    let mut path = vec![key[..open].to_owned()];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return plain();
        };
        if path.len() > MAX_KEY_DEPTH {
            return None;
        }
        path.push(stripped[..close].to_owned());
        rest = &stripped[close + 1..];
    }

    if !rest.is_empty() {
        return plain();
    }

    Some(path)
}

fn segment_name(segment: &str, level: &[(String, QueryValue)]) -> String {
    if segment.is_empty() {
        level.len().to_string()
    } else {
        segment.to_owned()
    }
}

fn insert_value(entries: &mut Vec<(String, QueryValue)>, path: &[String], value: String) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut level = entries;
    for segment in parents {
        let name = segment_name(segment, level);
        let index = match level.iter().position(|(existing, _)| *existing == name) {
            Some(index) => index,
            None => {
                level.push((name, QueryValue::Map(Vec::new())));
                level.len() - 1
            }
        };

        let slot = &mut level[index].1;
        if !matches!(slot, QueryValue::Map(_)) {
            *slot = QueryValue::Map(Vec::new());
        }
        let QueryValue::Map(nested) = slot else {
            return;
        };
        level = nested;
    }

    let name = segment_name(last, level);
    match level.iter().position(|(existing, _)| *existing == name) {
        Some(index) => level[index].1 = QueryValue::Text(value),
        None => level.push((name, QueryValue::Text(value))),
    }
}

/// Coerces text to an integer the way a loose numeric cast does.
///
/// Leading whitespace and one sign are accepted, then the leading digits are
/// read; text without leading digits is `0`. Overflow saturates.
#[must_use]
pub fn coerce_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |accumulator, digit| {
            accumulator
                .saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// Builds list criteria from query parameters.
///
/// Soft-deletable resources always exclude deleted records. Filter and
/// search predicates share one conjunctive group, so a search term must be
/// found in every searchable field. An explicit `sort*` parameter replaces
/// the schema default even when none of its fields survive validation.
#[must_use]
pub fn build_criteria(
    schema: &ListSchema,
    params: &QueryParams,
    supports_soft_delete: bool,
) -> Criteria {
    let mut builder = Criteria::builder();
    if supports_soft_delete {
        builder = builder.and_where(Predicate::is_null(DELETED_AT_FIELD));
    }

    let mut explicit_sort: Option<Vec<SortDirective>> = None;
    let mut filters = Vec::new();

    for (key, value) in params.iter() {
        if key.starts_with("sort") {
            explicit_sort = Some(collect_sort(schema, value));
        } else if key.starts_with("filter") {
            filters.extend(collect_filters(schema, value));
        } else if key == "search" {
            if let Some(term) = value.as_text() {
                filters.extend(
                    schema
                        .searchable_elements()
                        .map(|element| Predicate::contains(element.name(), term)),
                );
            }
        } else if key == "offset" {
            if let Some(offset) = value
                .as_text()
                .map(coerce_integer)
                .and_then(normalize_offset)
            {
                builder = builder.first_result(offset);
            }
        } else if key == "limit" {
            if let Some(limit) = value.as_text().map(coerce_integer).and_then(cap_limit) {
                builder = builder.max_results(limit);
            }
        }
    }

    if !filters.is_empty() {
        builder = builder.and_where(Predicate::All(filters));
    }

    let sort = explicit_sort.unwrap_or_else(|| {
        schema
            .default_sort()
            .map(|default_sort| {
                vec![SortDirective {
                    field: default_sort.field().to_owned(),
                    direction: default_sort.direction(),
                }]
            })
            .unwrap_or_default()
    });

    builder.order_by(sort).build()
}

fn collect_sort(schema: &ListSchema, value: &QueryValue) -> Vec<SortDirective> {
    let mut sort: Vec<SortDirective> = Vec::new();

    for (field, direction) in value.as_map().unwrap_or_default() {
        if !schema.has(field) {
            continue;
        }
        // Any text other than `ASC` sorts descending; nested values are dropped.
        let Some(direction) = direction.as_text().map(|direction| {
            if direction.eq_ignore_ascii_case("asc") {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            }
        }) else {
            continue;
        };

        match sort.iter_mut().find(|directive| directive.field == *field) {
            Some(directive) => directive.direction = direction,
            None => sort.push(SortDirective {
                field: field.clone(),
                direction,
            }),
        }
    }

    sort
}

fn collect_filters(schema: &ListSchema, value: &QueryValue) -> Vec<Predicate> {
    value
        .as_map()
        .unwrap_or_default()
        .iter()
        .filter_map(|(field, filter_value)| {
            let term = filter_value.as_text()?;
            let element = schema.element(field)?;
            element
                .searchable()
                .then(|| Predicate::contains(element.name(), term))
        })
        .collect()
}

use backoffice_domain::{
    DefaultSort, ListElement, ListSchema, MAX_LIMIT, Predicate, SortDirection, SortDirective,
};

use super::{MAX_KEY_DEPTH, QueryParams, QueryValue, build_criteria, coerce_integer};

fn user_schema() -> ListSchema {
    let elements = vec![
        ListElement::new("email", true),
        ListElement::new("role", true),
        ListElement::new("createdAt", false),
    ]
    .into_iter()
    .collect::<Result<Vec<_>, _>>();

    let schema = elements.and_then(|elements| {
        ListSchema::new(
            elements,
            Some(DefaultSort::new("createdAt", SortDirection::Desc)?),
        )
    });

    match schema {
        Ok(schema) => schema,
        Err(error) => panic!("invalid test schema: {error}"),
    }
}

fn directive(field: &str, direction: SortDirection) -> SortDirective {
    SortDirective {
        field: field.to_owned(),
        direction,
    }
}

#[test]
fn parse_nests_bracketed_keys_in_arrival_order() {
    let params = QueryParams::parse("sort[email]=ASC&search=jane&sort[role]=DESC&limit=5");
    let keys: Vec<&str> = params.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["sort", "search", "limit"]);
    assert_eq!(
        params.get("sort"),
        Some(&QueryValue::Map(vec![
            ("email".to_owned(), QueryValue::Text("ASC".to_owned())),
            ("role".to_owned(), QueryValue::Text("DESC".to_owned())),
        ]))
    );
}

#[test]
fn parse_decodes_percent_encoding() {
    let params = QueryParams::parse("filter%5Bemail%5D=jane%40example.com&search=a+b");
    assert_eq!(
        params.get("filter"),
        Some(&QueryValue::Map(vec![(
            "email".to_owned(),
            QueryValue::Text("jane@example.com".to_owned())
        )]))
    );
    assert_eq!(
        params.get("search"),
        Some(&QueryValue::Text("a b".to_owned()))
    );
}

#[test]
fn parse_keeps_malformed_brackets_as_plain_keys() {
    let params = QueryParams::parse("sort[email=ASC");
    assert_eq!(
        params.get("sort[email"),
        Some(&QueryValue::Text("ASC".to_owned()))
    );
}

#[test]
fn parse_keeps_keys_up_to_the_nesting_limit() {
    let key = format!("filter{}[email]", "[a]".repeat(MAX_KEY_DEPTH - 1));
    let params = QueryParams::parse(&format!("{key}=jane&search=doe"));

    let mut value = params.get("filter");
    for _ in 0..MAX_KEY_DEPTH - 1 {
        value = value
            .and_then(QueryValue::as_map)
            .and_then(|entries| entries.first())
            .map(|(_, nested)| nested);
    }
    let leaf = value
        .and_then(QueryValue::as_map)
        .and_then(|entries| entries.first());
    assert_eq!(
        leaf,
        Some(&("email".to_owned(), QueryValue::Text("jane".to_owned())))
    );

    let too_deep = format!("filter{}=jane&search=doe", "[a]".repeat(MAX_KEY_DEPTH + 1));
    let params = QueryParams::parse(&too_deep);
    assert_eq!(params.get("filter"), None);
    assert_eq!(params.get("search"), Some(&QueryValue::Text("doe".to_owned())));
}

#[test]
fn deeply_nested_keys_do_not_exhaust_a_small_stack() {
    let query = format!("sort{}=ASC&limit=5", "[a]".repeat(20_000));
    let worker = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let params = QueryParams::parse(&query);
            build_criteria(&user_schema(), &params, true)
        });
    let Ok(worker) = worker else {
        panic!("worker thread should start");
    };
    let Ok(criteria) = worker.join() else {
        panic!("parsing should not abort the worker");
    };

    assert_eq!(criteria.limit(), Some(5));
    assert_eq!(
        criteria.sort(),
        &[directive("createdAt", SortDirection::Desc)]
    );
}

#[test]
fn coerce_integer_reads_leading_digits() {
    assert_eq!(coerce_integer("42"), 42);
    assert_eq!(coerce_integer("  17abc"), 17);
    assert_eq!(coerce_integer("-8"), -8);
    assert_eq!(coerce_integer("abc"), 0);
    assert_eq!(coerce_integer(""), 0);
    assert_eq!(coerce_integer("99999999999999999999999"), i64::MAX);
}

#[test]
fn empty_query_applies_soft_delete_and_default_sort() {
    let criteria = build_criteria(&user_schema(), &QueryParams::default(), true);
    assert_eq!(criteria.predicates(), &[Predicate::is_null("deletedAt")]);
    assert_eq!(
        criteria.sort(),
        &[directive("createdAt", SortDirection::Desc)]
    );
    assert_eq!(criteria.offset(), None);
    assert_eq!(criteria.limit(), None);
}

#[test]
fn resources_without_soft_delete_get_no_implicit_predicate() {
    let criteria = build_criteria(&user_schema(), &QueryParams::default(), false);
    assert!(criteria.predicates().is_empty());
}

#[test]
fn limit_is_capped() {
    let criteria = build_criteria(&user_schema(), &QueryParams::parse("limit=10000"), false);
    assert_eq!(criteria.limit(), Some(MAX_LIMIT));
}

#[test]
fn zero_limit_and_offset_are_ignored() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("limit=0&offset=0"),
        false,
    );
    assert_eq!(criteria.limit(), None);
    assert_eq!(criteria.offset(), None);
}

#[test]
fn offset_and_limit_are_coerced() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("offset=20&limit=15items"),
        false,
    );
    assert_eq!(criteria.offset(), Some(20));
    assert_eq!(criteria.limit(), Some(15));
}

#[test]
fn negative_offset_and_limit_are_ignored() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("offset=-5&limit=-1"),
        false,
    );
    assert_eq!(criteria.offset(), None);
    assert_eq!(criteria.limit(), None);
}

#[test]
fn unknown_sort_fields_are_dropped() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("sort[unknownField]=ASC&sort[email]=asc"),
        false,
    );
    assert_eq!(criteria.sort(), &[directive("email", SortDirection::Asc)]);
}

#[test]
fn explicit_sort_replaces_default() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("sort[createdAt]=ASC"),
        false,
    );
    assert_eq!(
        criteria.sort(),
        &[directive("createdAt", SortDirection::Asc)]
    );
}

#[test]
fn empty_explicit_sort_blocks_default() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("sort[unknownField]=ASC"),
        false,
    );
    assert!(criteria.sort().is_empty());
}

#[test]
fn unrecognized_sort_directions_sort_descending() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("sort[email]=sideways&sort[role]=asc&sort[createdAt][x]=ASC"),
        false,
    );
    assert_eq!(
        criteria.sort(),
        &[
            directive("email", SortDirection::Desc),
            directive("role", SortDirection::Asc),
        ]
    );
}

#[test]
fn later_sort_parameters_overwrite_earlier_ones() {
    let params = QueryParams::from_entries(vec![
        (
            "sort".to_owned(),
            QueryValue::Map(vec![("email".to_owned(), QueryValue::Text("ASC".to_owned()))]),
        ),
        (
            "sorting".to_owned(),
            QueryValue::Map(vec![("role".to_owned(), QueryValue::Text("DESC".to_owned()))]),
        ),
    ]);
    let criteria = build_criteria(&user_schema(), &params, false);
    assert_eq!(criteria.sort(), &[directive("role", SortDirection::Desc)]);
}

#[test]
fn filters_require_searchable_schema_fields() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("filter[email]=jane&filter[createdAt]=2024&filter[password]=x"),
        false,
    );
    assert_eq!(
        criteria.predicates(),
        &[Predicate::All(vec![Predicate::contains("email", "jane")])]
    );
}

#[test]
fn non_searchable_filter_field_produces_no_predicate() {
    let elements = vec![ListElement::new("email", false)]
        .into_iter()
        .collect::<Result<Vec<_>, _>>();
    let Ok(schema) = elements.and_then(|elements| ListSchema::new(elements, None)) else {
        panic!("schema should be valid");
    };

    let criteria = build_criteria(&schema, &QueryParams::parse("filter[email]=foo"), false);
    assert!(criteria.predicates().is_empty());
}

#[test]
fn non_string_filter_values_are_dropped() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("filter[email][nested]=jane&filter[role]=editor"),
        false,
    );
    assert_eq!(
        criteria.predicates(),
        &[Predicate::All(vec![Predicate::contains("role", "editor")])]
    );
}

#[test]
fn search_joins_every_searchable_field_into_the_filter_group() {
    let criteria = build_criteria(
        &user_schema(),
        &QueryParams::parse("filter[role]=editor&search=jane"),
        true,
    );
    assert_eq!(
        criteria.predicates(),
        &[
            Predicate::is_null("deletedAt"),
            Predicate::All(vec![
                Predicate::contains("role", "editor"),
                Predicate::contains("email", "jane"),
                Predicate::contains("role", "jane"),
            ]),
        ]
    );
}

#[test]
fn search_with_nested_value_is_ignored() {
    let criteria = build_criteria(&user_schema(), &QueryParams::parse("search[x]=jane"), false);
    assert!(criteria.predicates().is_empty());
}

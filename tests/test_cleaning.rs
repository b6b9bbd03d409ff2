// Cleaning transform tests
// Author: Gabriel Demetrios Lafis

use sparkly_data_engine::{
    data::{Dataset, Row, Value},
    processing::{remove_null_rows, split_column, split_column_name, ProcessingError},
};

fn tags(values: Vec<Value>) -> Dataset {
    let rows = values
        .into_iter()
        .map(|v| vec![("tag", v)].into_iter().collect::<Row>())
        .collect();
    Dataset::new("tags", vec!["tag".to_string()], rows)
}

fn strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_remove_null_rows() {
    let rows = vec![
        vec![("a", Value::from("1")), ("b", Value::Null)].into_iter().collect::<Row>(),
        vec![("a", Value::Null), ("b", Value::from(""))].into_iter().collect::<Row>(),
        vec![("a", Value::from("")), ("b", Value::from("x"))].into_iter().collect::<Row>(),
        Row::new(),
    ];
    let dataset = Dataset::new("sparse", strings(&["a", "b"]), rows);

    let result = remove_null_rows(&dataset);

    assert_eq!(result.rows_removed, 2);
    assert_eq!(result.dataset.rows.len(), 2);
    assert_eq!(result.dataset.row_count, 2);
    assert_eq!(result.dataset.columns, dataset.columns);
    assert!(result.dataset.cleaned);
    assert!(result.dataset.rows.iter().all(|row| !row.is_blank()));

    // the input snapshot is untouched
    assert_eq!(dataset.row_count, 4);
    assert!(!dataset.cleaned);
}

#[test]
fn test_remove_null_rows_keeps_zero_and_false() {
    let dataset = tags(vec![Value::Integer(0), Value::Boolean(false), Value::from(" ")]);

    let result = remove_null_rows(&dataset);
    assert_eq!(result.rows_removed, 0);
    assert_eq!(result.dataset.rows, dataset.rows);
    assert!(result.dataset.cleaned);
}

#[test]
fn test_remove_null_rows_is_monotonic() {
    let dataset = tags(vec![Value::Null, Value::from("a"), Value::from(""), Value::Null]);

    let once = remove_null_rows(&dataset);
    assert!(once.dataset.rows.len() <= dataset.rows.len());

    let twice = remove_null_rows(&once.dataset);
    assert_eq!(twice.rows_removed, 0);
    assert_eq!(twice.dataset.rows, once.dataset.rows);
}

#[test]
fn test_split_column_example() {
    let dataset = tags(vec![Value::from("a;b"), Value::from("c")]);

    let result = split_column(&dataset, "tag", ";").unwrap();
    let split = &result.dataset;

    assert_eq!(split.columns, strings(&["tag", "tag_1", "tag_2"]));
    assert_eq!(result.new_columns, strings(&["tag_1", "tag_2"]));
    assert_eq!(result.max_parts, 2);

    let expected: Row = vec![("tag", "a;b"), ("tag_1", "a"), ("tag_2", "b")].into_iter().collect();
    assert_eq!(split.rows[0], expected);

    assert_eq!(split.rows[1], vec![("tag", "c")].into_iter().collect::<Row>());
    assert!(!split.rows[1].contains("tag_1"));
    assert_eq!(split.rows[1].get("tag_2"), &Value::Null);

    assert!(split.cleaned);
    assert_eq!(split.id, dataset.id);
    assert_eq!(split.row_count, 2);
}

#[test]
fn test_split_trims_parts_and_uses_widest_row() {
    let dataset = tags(vec![
        Value::from("red , green"),
        Value::from("x,y,z"),
        Value::from("solo"),
    ]);

    let result = split_column(&dataset, "tag", ",").unwrap();
    let split = &result.dataset;

    assert_eq!(split.columns, strings(&["tag", "tag_1", "tag_2", "tag_3"]));
    assert_eq!(split.rows[0].get("tag_1"), &Value::from("red"));
    assert_eq!(split.rows[0].get("tag_2"), &Value::from("green"));
    assert!(!split.rows[0].contains("tag_3"));
    assert_eq!(split.rows[1].get("tag_3"), &Value::from("z"));
}

#[test]
fn test_split_twice_is_stable() {
    let dataset = tags(vec![Value::from("a;b"), Value::from("c")]);

    let first = split_column(&dataset, "tag", ";").unwrap();
    let second = split_column(&first.dataset, "tag", ";").unwrap();

    assert_eq!(second.dataset.columns, first.dataset.columns);
    assert_eq!(second.dataset.rows, first.dataset.rows);
    assert_eq!(second.dataset.row_count, first.dataset.row_count);
    assert!(second.new_columns.is_empty());
}

#[test]
fn test_split_leaves_non_string_values_alone() {
    let dataset = tags(vec![Value::Integer(12), Value::Null, Value::from("p-q")]);

    let result = split_column(&dataset, "tag", "-").unwrap();

    assert_eq!(result.dataset.rows[0], dataset.rows[0]);
    assert_eq!(result.dataset.rows[1], dataset.rows[1]);
    assert_eq!(result.dataset.rows[2].get("tag_2"), &Value::from("q"));
}

#[test]
fn test_split_without_matches_adds_no_columns() {
    let dataset = tags(vec![Value::from("a"), Value::from("b")]);

    let result = split_column(&dataset, "tag", "|").unwrap();

    assert_eq!(result.dataset.columns, dataset.columns);
    assert_eq!(result.dataset.rows, dataset.rows);
    assert!(result.new_columns.is_empty());
    assert!(result.dataset.cleaned);
}

#[test]
fn test_split_does_not_duplicate_existing_columns() {
    let rows = vec![vec![("tag", "a b"), ("tag_1", "old")].into_iter().collect::<Row>()];
    let dataset = Dataset::new("tags", strings(&["tag", "tag_1"]), rows);

    let result = split_column(&dataset, "tag", " ").unwrap();

    assert_eq!(result.dataset.columns, strings(&["tag", "tag_1", "tag_2"]));
    assert_eq!(result.new_columns, strings(&["tag_2"]));
    assert_eq!(result.dataset.rows[0].get("tag_1"), &Value::from("a"));
}

#[test]
fn test_split_rejects_bad_arguments() {
    let dataset = tags(vec![Value::from("a;b")]);

    let err = split_column(&dataset, "label", ";").unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidArgument(_)));

    let err = split_column(&dataset, "tag", "").unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidArgument(_)));
}

#[test]
fn test_split_column_name() {
    assert_eq!(split_column_name("full_name", 1), "full_name_1");
}

use super::*;
use crate::sql;

const POS: PlaceholderStyle = PlaceholderStyle::Positional;
const NUM: PlaceholderStyle = PlaceholderStyle::Numbered;

#[test]
fn builds_placeholders_in_order() {
    let mut q = Template::new("SELECT * FROM users WHERE a = ");
    q.push_bind(1).push(" AND b = ").push_bind("x");

    assert_eq!(q.to_sql(NUM), "SELECT * FROM users WHERE a = $1 AND b = $2");
    assert_eq!(q.to_sql(POS), "SELECT * FROM users WHERE a = ? AND b = ?");
    assert_eq!(q.values(), &[Value::Int(1), Value::Text("x".into())]);
}

#[test]
fn from_parts_interleaves_fragments_and_values() {
    let t = Template::from_parts(
        ["SELECT * FROM t WHERE a = ", " AND b = ", ""],
        [Value::Int(1), Value::Int(2)],
    )
    .unwrap();

    let stmt = t.build(NUM);
    assert_eq!(stmt.sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
    assert_eq!(stmt.values, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn from_parts_without_values_is_plain_sql() {
    let t = Template::from_parts(["SELECT * FROM contents"], Vec::<Value>::new()).unwrap();
    let stmt = t.build(POS);
    assert_eq!(stmt.sql, "SELECT * FROM contents");
    assert!(stmt.values.is_empty());
}

#[test]
fn from_parts_rejects_miscounted_fragments() {
    let too_few = Template::from_parts(["a = "], [Value::Int(1)]);
    assert!(too_few.unwrap_err().is_shape());

    let too_many = Template::from_parts(["a", "b", "c"], [Value::Int(1)]);
    assert!(too_many.unwrap_err().is_shape());

    let none = Template::from_parts(Vec::<&str>::new(), Vec::<Value>::new());
    assert!(none.unwrap_err().is_shape());
}

#[test]
fn placeholder_count_matches_values_for_many_params() {
    let fragments: Vec<String> = (0..=12).map(|i| format!(" f{i} ")).collect();
    let values: Vec<i64> = (0..12).collect();
    let t = Template::from_parts(&fragments, values.clone()).unwrap();

    let pos = t.build(POS);
    assert_eq!(pos.sql.matches('?').count(), 12);
    assert_eq!(pos.values, values.iter().map(|v| Value::Int(*v)).collect::<Vec<_>>());

    let num = t.build(NUM);
    assert!(num.sql.contains("$12"));
    assert!(!num.sql.contains("$13"));
    assert_eq!(num.sql.matches('$').count(), 12);
}

#[test]
fn macro_matches_from_parts() {
    let id = 7_i64;
    let title = "hello";
    let from_macro = sql!("SELECT * FROM contents WHERE id = " {id} " AND title = " {title});
    let from_parts = Template::from_parts(
        ["SELECT * FROM contents WHERE id = ", " AND title = ", ""],
        [Value::from(id), Value::from(title)],
    )
    .unwrap();

    assert_eq!(from_macro.build(NUM), from_parts.build(NUM));
}

#[test]
fn macro_allows_adjacent_values() {
    let t = sql!("VALUES (" {1} ", " {2} {3} ")");
    assert_eq!(t.to_sql(NUM), "VALUES ($1, $2$3)");
    assert_eq!(t.param_count(), 3);
}

#[test]
fn macro_without_values() {
    let t = sql!("DELETE FROM contents");
    assert_eq!(t.build(NUM), Statement::new("DELETE FROM contents", vec![]));
}

#[test]
fn interpolated_text_is_never_spliced() {
    let hostile = "x'; DROP TABLE contents; --";
    let stmt = sql!("SELECT * FROM contents WHERE title = " {hostile}).build(POS);
    assert_eq!(stmt.sql, "SELECT * FROM contents WHERE title = ?");
    assert_eq!(stmt.values, vec![Value::Text(hostile.into())]);
}

#[test]
fn push_template_continues_numbering() {
    let mut w = Template::empty();
    w.push(" WHERE id = ").push_bind(42);

    let mut q = sql!("UPDATE t SET a = " {1});
    q.push_template(w);

    assert_eq!(q.to_sql(NUM), "UPDATE t SET a = $1 WHERE id = $2");
    assert_eq!(q.values(), &[Value::Int(1), Value::Int(42)]);
}

#[test]
fn bind_list_renders_commas() {
    let mut q = sql("SELECT * FROM users WHERE id IN (");
    q.push_bind_list(vec![1, 2, 3]).push(")");
    assert_eq!(q.to_sql(NUM), "SELECT * FROM users WHERE id IN ($1, $2, $3)");
    assert_eq!(q.param_count(), 3);
}

#[test]
fn bind_list_empty_is_valid_sql() {
    let mut q = sql("SELECT * FROM users WHERE id IN (");
    q.push_bind_list(Vec::<i32>::new()).push(")");
    assert_eq!(q.to_sql(POS), "SELECT * FROM users WHERE id IN (NULL)");
    assert_eq!(q.param_count(), 0);
}

#[test]
fn rendering_is_deterministic() {
    let t = sql!("SELECT * FROM t WHERE a = " {1} " AND b = " {"two"});
    assert_eq!(t.build(NUM), t.build(NUM));
    assert_eq!(t.clone().into_statement(POS), t.build(POS));
}

use super::*;

fn ann() -> Student {
    Student::new(1, "Ann", "ann01", "s3cret", 4)
}

#[test]
fn insert_renders_fields_in_column_order() {
    let stmt = build_insert(&ann());
    assert_eq!(stmt.kind(), StatementKind::Insert);
    assert_eq!(
        stmt.sql(),
        "INSERT INTO students (id, name, login, password, group_id) \
         VALUES (1, 'Ann', 'ann01', 's3cret', 4);"
    );

    let sql = stmt.sql();
    let positions: Vec<usize> = ["(1,", "'Ann'", "'ann01'", "'s3cret'", " 4);"]
        .iter()
        .map(|v| sql.find(v).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn insert_doubles_embedded_quotes() {
    let s = Student::new(2, "O'Brien", "obrien", "it's", 1);
    assert_eq!(
        build_insert(&s).sql(),
        "INSERT INTO students (id, name, login, password, group_id) \
         VALUES (2, 'O''Brien', 'obrien', 'it''s', 1);"
    );
}

#[test]
fn insert_keeps_negative_ids() {
    let s = Student::new(-5, "", "", "", 0);
    assert_eq!(
        build_insert(&s).sql(),
        "INSERT INTO students (id, name, login, password, group_id) VALUES (-5, '', '', '', 0);"
    );
}

#[test]
fn select_without_condition_is_bare_template() {
    let stmt = build_select(None).unwrap();
    assert_eq!(stmt.sql(), SELECT_TEMPLATE);
    assert_eq!(stmt.sql(), "SELECT * FROM students");
    assert_eq!(stmt.kind(), StatementKind::Select);
}

#[test]
fn select_with_condition_appends_where() {
    let stmt = build_select(Some("group_id=3")).unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM students WHERE group_id=3");
}

#[test]
fn select_value_may_contain_equals() {
    let stmt = build_select(Some("login='a=b'")).unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM students WHERE login='a=b'");
}

#[test]
fn select_rejects_condition_without_equals() {
    let err = build_select(Some("idonly")).unwrap_err();
    assert!(err.is_malformed_condition());
}

#[test]
fn update_interpolates_fragments_verbatim() {
    let stmt = build_update("name=X", "id=1");
    assert_eq!(stmt.sql(), "UPDATE students SET name=X WHERE id=1");
    assert_eq!(stmt.kind(), StatementKind::Update);

    let spec = UpdateSpec::new("name='Bo', group_id=2", "id=1 OR id=2");
    assert_eq!(
        build_update_spec(&spec).sql(),
        "UPDATE students SET name='Bo', group_id=2 WHERE id=1 OR id=2"
    );
}

#[test]
fn delete_renders_equality() {
    let stmt = build_delete("id=7").unwrap();
    assert_eq!(stmt.sql(), "DELETE FROM students WHERE id = 7;");
    assert_eq!(stmt.kind(), StatementKind::Delete);
}

#[test]
fn delete_rejects_condition_without_equals() {
    assert!(build_delete("idonly").unwrap_err().is_malformed_condition());
}

#[test]
fn builder_kind_ignores_select_inside_values() {
    let stmt = build_delete("name='SELECT'").unwrap();
    assert_eq!(stmt.kind(), StatementKind::Delete);
    assert!(!stmt.kind().returns_rows());

    let stmt = build_update("name='SHOW ME'", "id=1");
    assert!(!stmt.kind().returns_rows());
}

#[test]
fn raw_statements_classify_by_leading_keyword() {
    let cases = [
        ("SELECT 1", StatementKind::Select),
        ("  select * from students", StatementKind::Select),
        ("-- all rows\nSELECT * FROM students", StatementKind::Select),
        ("/* c */ (SELECT 1)", StatementKind::Select),
        ("WITH t AS (SELECT 1) SELECT * FROM t", StatementKind::Select),
        (
            "WITH gone AS (SELECT id FROM students WHERE group_id = 3) \
             DELETE FROM students WHERE id IN (SELECT id FROM gone)",
            StatementKind::Delete,
        ),
        (
            "with recursive n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 3) \
             INSERT INTO students (id, name, login, password, group_id) \
             SELECT x, 'n', 'n', 'n', 1 FROM n",
            StatementKind::Insert,
        ),
        (
            "WITH \"delete\" AS (SELECT ')') /* UPDATE */ UPDATE students SET group_id = 1",
            StatementKind::Update,
        ),
        ("WITH t AS (DELETE FROM students RETURNING *) SELECT * FROM t", StatementKind::Select),
        ("EXPLAIN SELECT * FROM students", StatementKind::Explain),
        ("explain analyze DELETE FROM students", StatementKind::Explain),
        ("VALUES (1), (2)", StatementKind::Select),
        ("SHOW server_version", StatementKind::Show),
        ("INSERT INTO students VALUES (1)", StatementKind::Insert),
        ("update students set name='SELECT'", StatementKind::Update),
        ("DELETE FROM students WHERE name = 'SELECT'", StatementKind::Delete),
        ("CREATE TABLE t (id int)", StatementKind::Other),
        ("-- only a comment", StatementKind::Other),
        ("", StatementKind::Other),
        ("SHOWx", StatementKind::Other),
        ("TABLESAMPLE", StatementKind::Other),
        ("selection", StatementKind::Other),
        ("SELECT*FROM students", StatementKind::Select),
        ("TABLE students", StatementKind::Select),
    ];
    for (sql, expected) in cases {
        assert_eq!(Statement::raw(sql).kind(), expected, "sql: {sql:?}");
    }
}

#[test]
fn only_reads_return_rows_and_only_dml_is_transactional() {
    assert!(StatementKind::Select.returns_rows());
    assert!(StatementKind::Show.returns_rows());
    assert!(StatementKind::Explain.returns_rows());
    assert!(StatementKind::Explain.is_transactional());
    assert!(!StatementKind::Insert.returns_rows());
    assert!(!StatementKind::Other.returns_rows());

    assert!(StatementKind::Delete.is_transactional());
    assert!(!StatementKind::Show.is_transactional());
    assert!(!StatementKind::Other.is_transactional());
}

#[test]
fn fill_template_substitutes_left_to_right() {
    assert_eq!(fill_template("{} + {} = {}", &["1", "2", "3"]), "1 + 2 = 3");
    assert_eq!(fill_template("no slots", &[] as &[&str]), "no slots");
}

#[test]
fn display_matches_sql() {
    let stmt = build_update("a=1", "b=2");
    assert_eq!(stmt.to_string(), stmt.sql());
    assert_eq!(stmt.clone().into_sql(), "UPDATE students SET a=1 WHERE b=2");
}

#[test]
fn keyword_match_requires_word_boundary() {
    assert!(starts_with_keyword("SHOW all", "SHOW"));
    assert!(starts_with_keyword("show", "SHOW"));
    assert!(starts_with_keyword("SELECT(1)", "SELECT"));
    assert!(!starts_with_keyword("SHOWx", "SHOW"));
    assert!(!starts_with_keyword("TABLESAMPLE", "TABLE"));
    assert!(!starts_with_keyword("with_ids", "WITH"));
    assert!(!starts_with_keyword("SEL", "SELECT"));
}

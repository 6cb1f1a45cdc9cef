use super::*;

fn quality_config(yaml: &str) -> QualityConfig {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_builtin_checks_order_and_severity() {
    let checks = builtin_checks();
    assert_eq!(checks.len(), 12);
    assert_eq!(checks[0].name, "artist_keys_not_null");
    assert_eq!(checks[5].name, "dim_artists_populated");
    assert_eq!(checks[11].name, "stream_totals_preserved");
    assert!(checks.iter().all(|c| c.severity == Severity::Warn));
}

#[test]
fn test_builtin_names_unique() {
    let checks = builtin_checks();
    let names: HashSet<&str> = checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.len(), checks.len());
}

#[test]
fn test_null_key_check_sql() {
    let checks = builtin_checks();
    assert_eq!(
        checks[1].sql,
        "SELECT COUNT(song_id) FROM dim_songs WHERE song_id IS NULL"
    );
    assert_eq!(checks[1].expected, Expected::Literal(ScalarValue::Integer(0)));
}

#[test]
fn test_empty_config_gives_builtins() {
    let checks = checks_from_config(&QualityConfig::default()).unwrap();
    assert_eq!(checks.len(), builtin_checks().len());
}

#[test]
fn test_severity_override() {
    let config = quality_config("severity_overrides: { artist_keys_not_null: error }");
    let checks = checks_from_config(&config).unwrap();

    assert_eq!(checks[0].severity, Severity::Error);
    assert_eq!(checks[1].severity, Severity::Warn);
}

#[test]
fn test_override_unknown_check() {
    let config = quality_config("severity_overrides: { no_such_check: error }");
    let err = checks_from_config(&config).unwrap_err();
    assert!(matches!(err, QualityError::UnknownCheck { ref name } if name == "no_such_check"));
}

#[test]
fn test_config_checks_appended() {
    let config = quality_config(
        r#"
checks:
  - name: charts_have_continent
    sql: "SELECT COUNT(*) FROM dim_charts WHERE continent IS NULL"
    expected: { literal: 0 }
    severity: error
  - name: one_calendar_row_per_date
    sql: "SELECT COUNT(DISTINCT chart_date) FROM dim_calendar"
    expected: { query: "SELECT COUNT(*) FROM dim_calendar" }
    severity: warn
"#,
    );
    let checks = checks_from_config(&config).unwrap();

    assert_eq!(checks.len(), 14);
    let custom = &checks[12];
    assert_eq!(custom.name, "charts_have_continent");
    assert_eq!(custom.expected, Expected::Literal(ScalarValue::Integer(0)));
    assert_eq!(custom.severity, Severity::Error);
    assert_eq!(
        checks[13].expected,
        Expected::Query("SELECT COUNT(*) FROM dim_calendar".to_string())
    );
}

#[test]
fn test_config_check_shadowing_builtin() {
    let config = quality_config(
        r#"
checks:
  - name: stream_totals_preserved
    sql: "SELECT 1"
    expected: { literal: 1 }
    severity: warn
"#,
    );
    assert!(matches!(
        checks_from_config(&config).unwrap_err(),
        QualityError::DuplicateCheck { .. }
    ));
}

#[test]
fn test_literal_kinds() {
    let parse = |yaml: &str| literal_from_yaml(&serde_yaml::from_str(yaml).unwrap());

    assert_eq!(parse("~").unwrap(), ScalarValue::Null);
    assert_eq!(parse("true").unwrap(), ScalarValue::Boolean(true));
    assert_eq!(parse("-3").unwrap(), ScalarValue::Integer(-3));
    assert_eq!(parse("2.5").unwrap(), ScalarValue::Float(2.5));
    assert_eq!(parse("Europe").unwrap(), ScalarValue::from("Europe"));
    assert!(parse("[1, 2]").is_err());
}

#[test]
fn test_invalid_literal_in_config() {
    let config = quality_config(
        r#"
checks:
  - name: bad
    sql: "SELECT 1"
    expected: { literal: { a: 1 } }
    severity: warn
"#,
    );
    assert!(matches!(
        checks_from_config(&config).unwrap_err(),
        QualityError::InvalidLiteral { ref name, .. } if name == "bad"
    ));
}

use super::*;
use crate::schema::SchemaManager;
use cf_core::SchemaConfig;
use cf_db::{DuckDbBackend, ScalarValue};
use std::path::PathBuf;

fn record(id: &str, value: Option<&str>) -> ReferenceRecord {
    ReferenceRecord {
        country_id: id.to_string(),
        value: value.map(str::to_string),
    }
}

fn sources_in(dir: &Path) -> SourcesConfig {
    SourcesConfig {
        continent: dir.join("continent.json"),
        country: dir.join("names.json"),
        artist_rank: dir.join("artists.csv"),
        chart: dir.join("charts.csv"),
    }
}

async fn warehouse() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    let config = SchemaConfig::default();
    SchemaManager::new(&db, &config).create_all().await.unwrap();
    db
}

#[test]
fn test_parse_single_line_object() {
    let records =
        parse_reference_records(r#"{"US": "North America", "FR": "Europe"}"#, "inline").unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.contains(&record("US", Some("North America"))));
    assert!(records.contains(&record("FR", Some("Europe"))));
}

#[test]
fn test_parse_multiple_lines_and_blanks() {
    let content = "{\"US\": \"United States\"}\n\n{\"BR\": null, \"JP\": 81}\n";
    let records = parse_reference_records(content, "inline").unwrap();
    assert_eq!(records[0], record("US", Some("United States")));
    assert!(records.contains(&record("BR", None)));
    assert!(records.contains(&record("JP", Some("81"))));
}

#[test]
fn test_parse_rejects_non_object() {
    let err = parse_reference_records("{\"US\": \"x\"}\n[1, 2]\n", "names.json").unwrap_err();
    assert!(matches!(
        err,
        WarehouseError::MalformedReference { line: 2, ref path, .. } if path == "names.json"
    ));
}

#[test]
fn test_parse_rejects_nested_value() {
    let err = parse_reference_records(r#"{"US": {"name": "x"}}"#, "inline").unwrap_err();
    assert!(err.to_string().contains("not a scalar"));
}

#[test]
fn test_join_is_left_outer() {
    let countries = vec![
        record("US", Some("United States")),
        record("XK", Some("Kosovo")),
    ];
    let continents = vec![record("US", Some("North America")), record("FR", Some("Europe"))];

    let rows = join_countries(&countries, &continents);
    assert_eq!(
        rows,
        vec![
            CountryRow {
                country_id: "US".to_string(),
                country_name: Some("United States".to_string()),
                continent: Some("North America".to_string()),
            },
            CountryRow {
                country_id: "XK".to_string(),
                country_name: Some("Kosovo".to_string()),
                continent: None,
            },
        ]
    );
}

#[test]
fn test_join_duplicate_continent_records() {
    let countries = vec![record("RU", Some("Russia"))];
    let continents = vec![record("RU", Some("Europe")), record("RU", Some("Asia"))];

    let rows = join_countries(&countries, &continents);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].continent.as_deref(), Some("Europe"));
    assert_eq!(rows[1].continent.as_deref(), Some("Asia"));
}

#[test]
fn test_join_with_no_continents() {
    let countries = vec![record("US", Some("United States"))];
    let rows = join_countries(&countries, &[]);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].continent.is_none());
}

#[tokio::test]
async fn test_load_reference_join_inserts_rows() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("continent.json"), r#"{"US": "North America"}"#).unwrap();
    std::fs::write(
        dir.path().join("names.json"),
        r#"{"US": "United States", "XK": "Kosovo"}"#,
    )
    .unwrap();

    let db = warehouse().await;
    let sources = sources_in(dir.path());
    let loader = StagingLoader::new(&db, &sources);

    let inserted = loader
        .load_reference_join(&sources.continent, &sources.country)
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let missing = db
        .query_scalar("SELECT country_name FROM staging_countries WHERE continent IS NULL")
        .await
        .unwrap();
    assert_eq!(missing, ScalarValue::from("Kosovo"));
}

#[tokio::test]
async fn test_load_reference_join_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = warehouse().await;
    let sources = sources_in(dir.path());
    let loader = StagingLoader::new(&db, &sources);

    let err = loader
        .load_reference_join(&sources.continent, &sources.country)
        .await
        .unwrap_err();
    assert!(matches!(err, WarehouseError::SourceNotFound { .. }));
    assert_eq!(
        db.query_count("SELECT * FROM staging_countries").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_bulk_load_charts() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("charts.csv");
    std::fs::write(
        &csv,
        "title,rank,date,artist,url,region,chart,trend,streams\n\
         Song A,1,2024-01-01,X,https://open.spotify.com/track/aaa,US,top200,MOVE_UP,100\n\
         Song B,2,2024-01-01,Y,https://open.spotify.com/track/bbb,US,top200,SAME_POSITION,\n",
    )
    .unwrap();

    let db = warehouse().await;
    let sources = sources_in(dir.path());
    let loader = StagingLoader::new(&db, &sources);

    let added = loader
        .bulk_load(&TableName::new("staging_charts"), &csv)
        .await
        .unwrap();
    assert_eq!(added, 2);

    let null_streams = db
        .query_scalar("SELECT COUNT(*) FROM staging_charts WHERE streams IS NULL")
        .await
        .unwrap();
    assert_eq!(null_streams, ScalarValue::Integer(1));
}

#[tokio::test]
async fn test_bulk_load_missing_source() {
    let db = warehouse().await;
    let sources = sources_in(&PathBuf::from("/nonexistent"));
    let loader = StagingLoader::new(&db, &sources);

    let err = loader
        .bulk_load(&TableName::new("staging_artists"), &sources.artist_rank)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WarehouseError::SourceNotFound { ref table, .. } if table == "staging_artists"
    ));
}

#[tokio::test]
async fn test_load_all_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("continent.json"), r#"{"US": "North America"}"#).unwrap();
    std::fs::write(dir.path().join("names.json"), r#"{"US": "United States"}"#).unwrap();
    std::fs::write(
        dir.path().join("artists.csv"),
        "mbid,artist_mb,artist_lastfm,country_mb,country_lastfm,tags_mb,tags_lastfm,listeners_lastfm,scrobbles_lastfm,ambiguous_artist\n\
         m1,X,X,United States,United States,Pop,pop,10,20,false\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("charts.csv"),
        "title,rank,date,artist,url,region,chart,trend,streams\n\
         Song A,1,2024-01-01,X,https://open.spotify.com/track/aaa,United States,top200,MOVE_UP,100\n",
    )
    .unwrap();

    let db = warehouse().await;
    let sources = sources_in(dir.path());
    let report = StagingLoader::new(&db, &sources).load_all().await.unwrap();

    assert_eq!(report.countries, 1);
    assert_eq!(report.artists, 1);
    assert_eq!(report.charts, 1);
}

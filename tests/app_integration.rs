use chrono::{Days, Local, NaiveDate, NaiveTime};
use premtrack::core::Artifact;
use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_chart(server: &MockServer, symbol: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_nav(server: &MockServer, scheme_code: u32, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/mf/{scheme_code}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }
}

fn days_ago(n: u64) -> NaiveDate {
    Local::now()
        .date_naive()
        .checked_sub_days(Days::new(n))
        .unwrap()
}

fn chart_body(points: &[(NaiveDate, f64)]) -> String {
    let timestamps: Vec<String> = points
        .iter()
        .map(|(d, _)| d.and_time(NaiveTime::MIN).and_utc().timestamp().to_string())
        .collect();
    let closes: Vec<String> = points.iter().map(|(_, v)| v.to_string()).collect();
    format!(
        r#"{{"chart": {{"result": [{{"meta": {{"currency": "INR", "gmtoffset": 0}}, "timestamp": [{}], "indicators": {{"quote": [{{"close": [{}]}}]}}}}], "error": null}}}}"#,
        timestamps.join(","),
        closes.join(",")
    )
}

fn nav_body(points: &[(NaiveDate, f64)]) -> String {
    let records: Vec<String> = points
        .iter()
        .rev()
        .map(|(d, v)| format!(r#"{{"date": "{}", "nav": "{v:.5}"}}"#, d.format("%d-%m-%Y")))
        .collect();
    format!(
        r#"{{"meta": {{"scheme_code": 114984}}, "data": [{}], "status": "SUCCESS"}}"#,
        records.join(",")
    )
}

fn write_config(dir: &Path, base_url: &str, output: &Path) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
providers:
  yahoo:
    base_url: "{base_url}"
  mfapi:
    base_url: "{base_url}"
lookback_days: 10
output_path: "{}"
http:
  timeout_secs: 5
  retries: 0
"#,
        output.display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    let day1 = days_ago(3);
    let day2 = days_ago(2);
    let day3 = days_ago(1);

    test_utils::mount_chart(
        &mock_server,
        "MON100.NS",
        chart_body(&[(day1, 100.0), (day2, 102.0), (day3, 101.0)]),
    )
    .await;
    test_utils::mount_chart(
        &mock_server,
        "USDINR=X",
        chart_body(&[(day1, 83.0), (day2, 84.0), (day3, 84.0)]),
    )
    .await;
    // No NAV on day 2: carried forward with its own day's FX rate.
    test_utils::mount_nav(&mock_server, 114984, nav_body(&[(day1, 98.0), (day3, 99.0)])).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("site").join("premium_data.json");
    let config_path = write_config(dir.path(), &mock_server.uri(), &output);

    let result = premtrack::run_command(
        premtrack::AppCommand::Fetch {
            lookback_days: None,
            output: None,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Fetch command failed with: {:?}",
        result.err()
    );

    let artifact = Artifact::load(&output).expect("Artifact should be written");
    info!(data_points = artifact.data_points, "Loaded artifact");

    assert_eq!(artifact.data_points, 3);
    assert_eq!(artifact.dates, vec![day1, day2, day3]);
    assert_eq!(artifact.prices, vec![100.0, 102.0, 101.0]);
    assert_eq!(artifact.navs, vec![98.0, 98.0, 99.0]);
    assert_eq!(artifact.adjusted_inavs, vec![98.0, 99.18, 99.0]);
    assert_eq!(artifact.usdinr, vec![83.0, 84.0, 84.0]);
    assert_eq!(artifact.premiums, vec![2.0, 2.8, 2.0]);
    assert_eq!(artifact.stats.current, 2.0);
    assert_eq!(artifact.stats.max, 2.8);
    assert_eq!(artifact.stats.median, 2.0);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["dates"][0], day1.format("%Y-%m-%d").to_string());
    assert_eq!(json["data_points"], 3);

    let show = premtrack::run_command(
        premtrack::AppCommand::Show { input: None },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(show.is_ok(), "Show command failed with: {:?}", show.err());
}

#[test_log::test(tokio::test)]
async fn test_empty_nav_source_writes_nothing() {
    let mock_server = wiremock::MockServer::start().await;
    let day1 = days_ago(2);
    let day2 = days_ago(1);

    test_utils::mount_chart(
        &mock_server,
        "MON100.NS",
        chart_body(&[(day1, 100.0), (day2, 102.0)]),
    )
    .await;
    test_utils::mount_chart(
        &mock_server,
        "USDINR=X",
        chart_body(&[(day1, 83.0), (day2, 84.0)]),
    )
    .await;
    test_utils::mount_nav(&mock_server, 114984, nav_body(&[])).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("premium_data.json");
    let config_path = write_config(dir.path(), &mock_server.uri(), &output);

    let result = premtrack::run_command(
        premtrack::AppCommand::Fetch {
            lookback_days: Some(5),
            output: None,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Fetch should fail without NAV data");
    let pipeline_err = err
        .downcast_ref::<premtrack::core::PipelineError>()
        .expect("Root cause should be a pipeline error");
    assert!(matches!(
        pipeline_err,
        premtrack::core::PipelineError::SourceUnavailable {
            series: premtrack::core::SeriesId::OfficialNav,
            ..
        }
    ));
    assert!(!output.exists());
    assert!(!dir.path().join("premium_data.json.tmp").exists());
}

#[test_log::test(tokio::test)]
async fn test_show_missing_artifact_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("missing.json");
    let config_path = write_config(dir.path(), "http://127.0.0.1:9", &output);

    let result = premtrack::run_command(
        premtrack::AppCommand::Show { input: None },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read artifact")
    );
}

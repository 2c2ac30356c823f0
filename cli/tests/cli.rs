use anyhow::Result;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::query_param;

fn permit_finder(home: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("permit-finder")?;
    cmd.env("PERMIT_FINDER_HOME", home)
        .env_remove("PERMIT_FINDER_APP_TOKEN")
        .env("NO_COLOR", "1");
    Ok(cmd)
}

#[test]
fn help_lists_commands() -> Result<()> {
    let home = TempDir::new()?;
    permit_finder(home.path())?
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("address"))
        .stdout(contains("pivot"))
        .stdout(contains("shell"));
    Ok(())
}

#[test]
fn blank_house_number_is_rejected_before_any_request() -> Result<()> {
    let home = TempDir::new()?;
    permit_finder(home.path())?
        .args(["--api-url", "http://127.0.0.1:1/permits.json"])
        .args(["address", "", "Main", "St"])
        .assert()
        .failure()
        .stderr(contains("House Number and Street Name are required."));
    Ok(())
}

#[test]
fn offline_search_fails_without_fallback() -> Result<()> {
    let home = TempDir::new()?;
    permit_finder(home.path())?
        .args(["--offline", "address", "100", "Main", "St"])
        .assert()
        .failure()
        .stderr(contains("Network offline. Cannot fetch permits."));
    Ok(())
}

#[test]
fn offline_flag_can_come_from_the_config_file() -> Result<()> {
    let home = TempDir::new()?;
    std::fs::write(
        home.path().join("config.toml"),
        "[source]\noffline = true\n",
    )?;
    permit_finder(home.path())?
        .args(["pivot", "owner_name", "ACME"])
        .assert()
        .failure()
        .stdout(contains("Parameter: owner name = ACME"))
        .stderr(contains("Network offline. Cannot fetch permits."));
    Ok(())
}

#[test]
fn invalid_radius_is_a_config_error() -> Result<()> {
    let home = TempDir::new()?;
    permit_finder(home.path())?
        .args(["--offline", "--radius", "0", "address", "100", "Main"])
        .assert()
        .failure()
        .stderr(contains("invalid [search] config"));
    Ok(())
}

#[test]
fn missing_explicit_config_is_reported() -> Result<()> {
    let home = TempDir::new()?;
    let missing = home.path().join("nope.toml");
    permit_finder(home.path())?
        .arg("--config")
        .arg(&missing)
        .args(["address", "100", "Main"])
        .assert()
        .failure()
        .stderr(contains("failed to read config"));
    Ok(())
}

#[test]
fn shell_handles_commands_without_network() -> Result<()> {
    let home = TempDir::new()?;
    let output = permit_finder(home.path())?
        .args(["--offline", "shell"])
        .write_stdin("help\ncolumns\nhide job_filing_number\nhide borough\nhistory\nbogus\nquit\n")
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("[x] job_filing_number (Job Filing #) always visible"));
    assert!(stdout.contains("No searches yet."));
    assert!(stderr.contains("column 'Job Filing #' is always visible"));
    assert!(stderr.contains("unknown command 'bogus'"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn address_search_prints_json_view() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("$limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "job_filing_number": "B00123-I1",
                "borough": "BROOKLYN",
                "house_no": "100",
                "street_name": "MAIN ST",
                "work_type": "Plumbing",
                "issued_date": "2023-04-05T00:00:00.000",
                "permit_status": "ISSUED",
                "permittee_s_first_name": "JANE",
                "permittee_s_last_name": "DOE"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new()?;
    let api_url = format!("{}/resource/rbx6-tga4.json", server.uri());
    let output = permit_finder(home.path())?
        .args(["--api-url", &api_url, "--json", "address", "100", "Main", "St"])
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let view: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(view["title"], json!("Address: 100 Main St"));
    assert_eq!(view["total_rows"], json!(1));
    assert_eq!(
        view["rows"][0]["cells"],
        json!([
            "B00123-I1",
            "BROOKLYN",
            "100",
            "MAIN ST",
            "Plumbing",
            "04/05/2023",
            "JANE DOE",
            "ISSUED"
        ])
    );
    assert_eq!(view["status"]["severity"], json!("success"));
    Ok(())
}

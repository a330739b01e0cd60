use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

mod common;

use common::{mount_login, setup_test_client};
use unifi_reports::{ReportAttribute, ReportInterval, ReportType, UniFiClient, UniFiError};

#[tokio::test]
async fn test_site_report_sends_session_headers_and_body() -> Result<(), UniFiError> {
    // What it tests: the full path from builder to controller. Login material (cookie without
    // attributes, CSRF token) is attached, the site comes from the client, and the JSON body
    // carries the window in epoch milliseconds.
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/hourly.ap"))
        .and(header("cookie", "unifises=test-cookie"))
        .and(header("x-csrf-token", "test-csrf"))
        .and(body_json(json!({
            "attributes": ["bytes", "num_sta", "time"],
            "start": start.timestamp_millis(),
            "end": end.timestamp_millis(),
            "macs": ["00:11:22:33:44:55"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [
                { "ap": "00:11:22:33:44:55", "bytes": 5120.0, "num_sta": 3, "time": 1714521600000_i64 },
                { "ap": "00:11:22:33:44:55", "bytes": 4096.0, "num_sta": 2, "time": 1714525200000_i64 }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let report = client
        .reports()
        .site_report(ReportInterval::Hourly, ReportType::AccessPoint)
        .window(start, end)
        .attributes([ReportAttribute::Bytes, ReportAttribute::NumSta, ReportAttribute::Time])
        .filter_mac("00:11:22:33:44:55")
        .send()
        .await?;

    assert_eq!(report.meta.rc, "ok");
    assert_eq!(report.data.len(), 2);
    assert_eq!(report.data[0]["num_sta"], json!(3));
    assert_eq!(report.data[1]["time"], json!(1714525200000_i64));

    Ok(())
}

#[tokio::test]
async fn test_site_override_and_speed_test_path() -> Result<(), UniFiError> {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/s/site1/stat/report/archive.speedtest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "xput_download": 912.4, "xput_upload": 41.7, "latency": 9, "time": 1714521600000_i64 }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let report = client
        .reports()
        .site_report("daily", "speedtest")
        .site("site1")
        .send()
        .await?;

    assert_eq!(report.data[0]["latency"], json!(9));

    let requests = mock_server.received_requests().await.unwrap();
    let report_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/s/site1/stat/report/archive.speedtest")
        .expect("report request not recorded");
    let body: serde_json::Value = serde_json::from_slice(&report_request.body).unwrap();
    assert_eq!(
        body["attributes"],
        json!(["xput_download", "xput_upload", "latency", "time"])
    );
    assert_eq!(
        body["end"].as_i64().unwrap() - body["start"].as_i64().unwrap(),
        7 * 24 * 60 * 60 * 1000
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_query_never_reaches_controller() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let err = client
        .reports()
        .site_report("hourly", "site")
        .attributes(["bytes", "bogus"])
        .send()
        .await
        .unwrap_err();

    match err {
        UniFiError::InvalidAttribute(token) => assert_eq!(token, "bogus"),
        other => panic!("expected InvalidAttribute, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_response_maps_to_not_authenticated() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/5minutes.user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let err = client
        .reports()
        .site_report(ReportInterval::FiveMinutes, ReportType::User)
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, UniFiError::NotAuthenticated));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/hourly.site"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let err = client
        .reports()
        .site_report("hourly", "site")
        .send()
        .await
        .unwrap_err();

    match err {
        UniFiError::ApiError(msg) => assert!(msg.contains("500"), "unexpected message: {msg}"),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_serialization_error() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/hourly.site"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let err = client
        .reports()
        .site_report("hourly", "site")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, UniFiError::SerializationError(_)));
}

#[tokio::test]
async fn test_failed_login_is_an_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.Invalid" },
            "data": []
        })))
        .mount(&mock_server)
        .await;

    let err = UniFiClient::builder()
        .controller_url(mock_server.uri())
        .username("test-user")
        .password("wrong-password")
        .build()
        .await
        .unwrap_err();

    match err {
        UniFiError::AuthenticationError(msg) => assert!(msg.contains("400")),
        other => panic!("expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejected_by_meta_is_an_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "meta": { "rc": "error", "msg": "api.err.LoginRequired" },
                    "data": []
                }))
                .insert_header("set-cookie", "unifises=test-cookie"),
        )
        .mount(&mock_server)
        .await;

    let err = UniFiClient::builder()
        .controller_url(mock_server.uri())
        .username("test-user")
        .password("test-password")
        .build()
        .await
        .unwrap_err();

    match err {
        UniFiError::AuthenticationError(msg) => assert_eq!(msg, "api.err.LoginRequired"),
        other => panic!("expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_cookie_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": []
        })))
        .mount(&mock_server)
        .await;

    let err = UniFiClient::builder()
        .controller_url(mock_server.uri())
        .username("test-user")
        .password("test-password")
        .build()
        .await
        .unwrap_err();

    match err {
        UniFiError::AuthenticationError(msg) => {
            assert_eq!(msg, "No cookies received from server")
        }
        other => panic!("expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_builder_appends_attributes_and_device_filters() -> Result<(), UniFiError> {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/daily.user"))
        .and(body_json(json!({
            "attributes": ["rx_bytes", "tx_bytes", "time"],
            "start": start.timestamp_millis(),
            "end": end.timestamp_millis(),
            "macs": ["00:11:22:33:44:55", "aa:bb:cc:dd:ee:ff", "66:77:88:99:aa:bb"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;

    let builder = client
        .reports()
        .site_report(ReportInterval::Daily, ReportType::User)
        .start(start)
        .end(end)
        .attribute(ReportAttribute::RxBytes)
        .attribute("tx_bytes")
        .attribute(ReportAttribute::Time)
        .filter_macs(["00:11:22:33:44:55", "aa:bb:cc:dd:ee:ff"])
        .filter_mac("66:77:88:99:aa:bb");

    let query = builder.query();
    assert_eq!(query.site, "default");
    assert_eq!(query.attributes, vec!["rx_bytes", "tx_bytes", "time"]);
    assert_eq!(query.filter_macs.len(), 3);

    let report = builder.send().await?;
    assert!(report.data.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejected_session_logs_in_again_on_next_request() {
    // What it tests: a 401 fails the current call without a retry, and the following call
    // starts a fresh session instead of resending the rejected cookie.
    let mock_server = MockServer::start().await;

    let login_count = Arc::new(AtomicUsize::new(0));
    let login_count_clone = Arc::clone(&login_count);

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(move |_: &Request| {
            let attempt = login_count_clone.fetch_add(1, Ordering::SeqCst) + 1;

            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "meta": { "rc": "ok" },
                    "data": []
                }))
                .insert_header("set-cookie", format!("unifises=cookie-{attempt}").as_str())
        })
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/hourly.site"))
        .and(header("cookie", "unifises=cookie-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/report/hourly.site"))
        .and(header("cookie", "unifises=cookie-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{ "bytes": 42.0, "time": 1714521600000_i64 }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_test_client(&mock_server.uri()).await;
    assert_eq!(login_count.load(Ordering::SeqCst), 1);

    let err = client
        .reports()
        .site_report(ReportInterval::Hourly, ReportType::Site)
        .send()
        .await
        .unwrap_err();
    assert!(matches!(err, UniFiError::NotAuthenticated));
    assert_eq!(
        login_count.load(Ordering::SeqCst),
        1,
        "a rejected request must not be retried"
    );

    let report = client
        .reports()
        .site_report(ReportInterval::Hourly, ReportType::Site)
        .send()
        .await
        .unwrap();

    assert_eq!(report.data.len(), 1);
    assert_eq!(login_count.load(Ordering::SeqCst), 2);
}

use serde_json::json;
use unifi_reports::UniFiClient;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a successful `/api/login` handler that hands out `unifises=test-cookie`.
#[allow(dead_code)]
pub async fn mount_login(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({
            "username": "test-user",
            "password": "test-password"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "meta": { "rc": "ok" },
                    "data": []
                }))
                .insert_header("set-cookie", "unifises=test-cookie; Path=/")
                .insert_header("x-csrf-token", "test-csrf"),
        )
        .mount(mock_server)
        .await;
}

/// Builds a logged-in client against the mock controller.
#[allow(dead_code)]
pub async fn setup_test_client(mock_server_uri: &str) -> UniFiClient {
    let _ = env_logger::builder().is_test(true).try_init();

    UniFiClient::builder()
        .username("test-user")
        .password("test-password")
        .controller_url(mock_server_uri)
        .site("default")
        .build()
        .await
        .expect("Failed to build UniFiClient")
}

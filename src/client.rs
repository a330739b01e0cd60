use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "default-client")]
use arc_swap::ArcSwapOption;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{Method, StatusCode};
use log::debug;
#[cfg(feature = "default-client")]
use once_cell::sync::Lazy;
use reqwest::Client as ReqwestClient;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::api::report::ReportHandler;
use crate::models::{ApiResponse, EmptyResponse};
use crate::{models, UniFiError, UniFiResult};

#[cfg(feature = "default-client")]
static UNIFI_CLIENT: Lazy<ArcSwapOption<UniFiClient>> = Lazy::new(|| ArcSwapOption::empty());

/// Installs `client` as the process-wide UniFi client.
///
/// Calling it again replaces the previous client for all subsequent
/// [`instance`] calls.
#[cfg(feature = "default-client")]
pub fn initialize(client: UniFiClient) {
    UNIFI_CLIENT.store(Some(Arc::new(client)));
}

/// Returns the process-wide UniFi client, if one has been initialized.
#[cfg(feature = "default-client")]
pub fn instance() -> Option<Arc<UniFiClient>> {
    UNIFI_CLIENT.load_full()
}

/// Builder for UniFi client.
///
/// This builder provides a fluent API for creating UniFi clients
/// with validation at build time.
#[derive(Default)]
pub struct UniFiClientBuilder {
    controller_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    password_env: Option<String>,
    site: Option<String>,
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    http_client: Option<ReqwestClient>,
}

impl UniFiClientBuilder {
    /// Sets the controller URL.
    pub fn controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = Some(url.into());
        self
    }

    /// Sets the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password for authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Reads the password from the environment variable `var_name` when the
    /// client is built.
    ///
    /// An explicit [`password`](Self::password) takes precedence.
    pub fn password_from_env(mut self, var_name: impl Into<String>) -> Self {
        self.password_env = Some(var_name.into());
        self
    }

    /// Sets the default site used by report requests.
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Accept self-signed or otherwise invalid TLS certificates.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets a custom reqwest client (e.g., for testing or custom middleware).
    pub fn http_client(mut self, http_client: ReqwestClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Validates the configuration, then logs in to the controller.
    pub async fn build(self) -> UniFiResult<UniFiClient> {
        let site = self.site.unwrap_or_else(|| "default".to_string());

        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let username = self
            .username
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| UniFiError::ConfigurationError("Username is required".into()))?;

        let password = match (self.password, self.password_env) {
            (Some(password), _) => password,
            (None, Some(var_name)) => std::env::var(&var_name).map(SecretString::from).map_err(
                |e| {
                    UniFiError::ConfigurationError(format!(
                        "Failed to read environment variable '{var_name}': {e}"
                    ))
                },
            )?,
            (None, None) => {
                return Err(UniFiError::ConfigurationError("Password is required".into()))
            }
        };
        if password.expose_secret().trim().is_empty() {
            return Err(UniFiError::ConfigurationError("Password is required".into()));
        }

        let controller_url = self
            .controller_url
            .ok_or_else(|| UniFiError::ConfigurationError("Controller URL is required".into()))
            .and_then(|url_str| {
                Url::parse(&url_str).map_err(|e| {
                    UniFiError::ConfigurationError(format!("Invalid controller URL: {e}"))
                })
            })?;

        let user_agent = self
            .user_agent
            .as_deref()
            .unwrap_or(concat!("unifi-reports/", env!("CARGO_PKG_VERSION")));

        let http_client = if let Some(custom_client) = self.http_client {
            custom_client
        } else {
            ReqwestClient::builder()
                .timeout(timeout)
                .danger_accept_invalid_certs(self.accept_invalid_certs)
                .cookie_store(true)
                .user_agent(user_agent)
                .build()
                .map_err(|e| {
                    UniFiError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
                })?
        };

        let client = UniFiClient {
            controller_url,
            username,
            password: Arc::new(password),
            site,
            http_client,
            auth_state: Arc::new(Mutex::new(None)),
        };
        client.login().await?;
        Ok(client)
    }
}

/// Authentication state for the client.
#[derive(Clone, Debug)]
struct AuthState {
    cookies: String,
    csrf_token: Option<String>,
}

/// The main UniFi client for interacting with the UniFi Controller API.
///
/// This client manages the controller session and provides access to the
/// report endpoints. Clones share the same session.
#[derive(Clone)]
pub struct UniFiClient {
    controller_url: Url,
    username: String,
    password: Arc<SecretString>,
    site: String,
    http_client: ReqwestClient,
    auth_state: Arc<Mutex<Option<AuthState>>>,
}

impl fmt::Debug for UniFiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authenticated = self
            .auth_state
            .try_lock()
            .map(|state| state.is_some())
            .unwrap_or(false);

        f.debug_struct("UniFiClient")
            .field("controller_url", &self.controller_url)
            .field("username", &self.username)
            .field("site", &self.site)
            .field("authenticated", &authenticated)
            .finish()
    }
}

impl UniFiClient {
    pub fn builder() -> UniFiClientBuilder {
        UniFiClientBuilder::default()
    }

    async fn login(&self) -> UniFiResult<()> {
        let login_url = self.controller_url.join("/api/login")?;

        let login_data = models::auth::LoginRequest {
            username: &self.username,
            password: self.password.expose_secret(),
        };

        debug!("logging in to {} as {}", self.controller_url, self.username);
        let response = self.http_client.post(login_url).json(&login_data).send().await?;

        if !response.status().is_success() {
            return Err(UniFiError::AuthenticationError(format!(
                "Authentication failed with status code: {}",
                response.status()
            )));
        }

        let cookie_header = response
            .headers()
            .get(SET_COOKIE)
            .ok_or_else(|| {
                UniFiError::AuthenticationError("No cookies received from server".into())
            })?
            .to_str()
            .map_err(|e| UniFiError::AuthenticationError(format!("Invalid cookie header: {e}")))?
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string();

        let csrf_token = response
            .headers()
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let login_response: ApiResponse<Vec<EmptyResponse>> = response.json().await?;

        if login_response.meta.rc != "ok" {
            return Err(UniFiError::AuthenticationError(
                login_response.meta.msg.unwrap_or_else(|| "Unknown error".into()),
            ));
        }

        let mut auth_state = self.auth_state.lock().await;
        *auth_state = Some(AuthState {
            cookies: cookie_header,
            csrf_token,
        });

        Ok(())
    }

    /// Logs in if no session has been established yet.
    async fn ensure_authenticated(&self) -> UniFiResult<()> {
        if self.auth_state.lock().await.is_none() {
            return self.login().await;
        }
        Ok(())
    }

    // Helper to get authentication headers
    async fn get_auth_headers(&self) -> UniFiResult<HeaderMap> {
        let auth_state = self.auth_state.lock().await;
        let auth_state = auth_state.as_ref().ok_or(UniFiError::NotAuthenticated)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&auth_state.cookies)
                .map_err(|e| UniFiError::ApiError(format!("Invalid cookie header: {e}")))?,
        );

        if let Some(token) = &auth_state.csrf_token {
            headers.insert(
                "x-csrf-token",
                HeaderValue::from_str(token)
                    .map_err(|e| UniFiError::ApiError(format!("Invalid CSRF token: {e}")))?,
            );
        }

        Ok(headers)
    }

    /// Sends an authenticated request and decodes the whole JSON body.
    ///
    /// The response envelope is returned as-is; `meta.rc` is not inspected.
    ///
    /// # Errors
    ///
    /// - [`UniFiError::NotAuthenticated`] if the controller answers 401. The
    ///   session is discarded and the next request logs in again.
    /// - [`UniFiError::ApiError`] for any other non-success status.
    /// - [`UniFiError::HttpError`] if the request cannot be sent or read.
    /// - [`UniFiError::SerializationError`] if the body is not valid JSON.
    pub(crate) async fn request_json<T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<T>,
    ) -> UniFiResult<Value>
    where
        T: Serialize,
    {
        self.ensure_authenticated().await?;

        let url = self.controller_url.join(endpoint)?;

        let mut request = self.http_client.request(method, url);

        request = request.headers(self.get_auth_headers().await?);

        // Add JSON body if provided
        if let Some(data) = body {
            request = request.json(&data).header(CONTENT_TYPE, "application/json");
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Drop the expired session so the next request logs in again.
            debug!("session rejected by {}, clearing credentials", self.controller_url);
            *self.auth_state.lock().await = None;
            return Err(UniFiError::NotAuthenticated);
        }

        if !response.status().is_success() {
            return Err(UniFiError::ApiError(format!(
                "API request failed with status code: {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Gets the default site for report requests.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Gets the historical report API interface.
    pub fn reports(&self) -> ReportHandler {
        ReportHandler::new(self.clone())
    }
}

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use launcher_core::{
    ClientError, ClientFactory, ClientHandle, ConnectionSettings, Credentials, RemoteClient,
};
use launcher_logging::{launcher_debug, launcher_info};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct RestSettings {
    /// Path of the versioned API below the endpoint address.
    pub api_prefix: String,
    /// Path of the OAuth token exchange below the endpoint address.
    pub token_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// `maxResults` requested per page.
    pub page_size: usize,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            api_prefix: "/rest/v1".to_string(),
            token_path: "/rest/oauth/token".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            page_size: 50,
        }
    }
}

/// Connects [`RestClient`]s. Owns the runtime every client blocks on.
pub struct RestClientFactory {
    runtime: Arc<Runtime>,
    settings: RestSettings,
}

impl RestClientFactory {
    pub fn new(settings: RestSettings) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("launcher-http")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: Arc::new(runtime),
            settings,
        })
    }
}

impl ClientFactory for RestClientFactory {
    fn connect(&self, connection: &ConnectionSettings) -> Result<ClientHandle, ClientError> {
        let settings = self.settings.clone();
        let base_url = connection.url.clone();
        let credentials = connection.credentials();

        let (http, auth) = self.runtime.block_on(async {
            let http = reqwest::Client::builder()
                .connect_timeout(settings.connect_timeout)
                .timeout(settings.request_timeout)
                .build()
                .map_err(transport_error)?;
            let auth = match credentials {
                Credentials::Basic { username, password } => Auth::Basic { username, password },
                Credentials::OAuth {
                    client_id,
                    client_secret,
                } => {
                    let token_url = format!("{base_url}{}", settings.token_path);
                    Auth::Bearer(fetch_token(&http, &token_url, &client_id, &client_secret).await?)
                }
            };
            Ok::<_, ClientError>((http, auth))
        })?;

        launcher_info!("connected client for {}", base_url);
        Ok(Arc::new(RestClient {
            http,
            base_url,
            auth,
            runtime: Arc::clone(&self.runtime),
            settings,
        }))
    }
}

enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Auth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Blocking client for a paged JSON REST API.
///
/// Usable from any thread that is not itself driving an async runtime.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
    runtime: Arc<Runtime>,
    settings: RestSettings,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    fn api_url(&self, resource: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.settings.api_prefix,
            resource.trim_start_matches('/')
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        let request = self.http.get(url);
        let request = match &self.auth {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Bearer(token) => request.bearer_auth(token),
        };
        let response = request.send().await.map_err(transport_error)?;
        check_status(response.status())?;
        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|err| ClientError::Malformed(err.to_string()))
    }

    async fn fetch_all(&self, resource: &str) -> Result<Vec<Value>, ClientError> {
        let mut items = Vec::new();
        loop {
            let mut url = url::Url::parse(&self.api_url(resource))
                .map_err(|err| ClientError::Malformed(err.to_string()))?;
            url.query_pairs_mut()
                .append_pair("startAt", &items.len().to_string())
                .append_pair("maxResults", &self.settings.page_size.to_string());

            let body = self.get_json(url.as_str()).await?;
            let page = body
                .get("data")
                .and_then(Value::as_array)
                .ok_or_else(|| ClientError::Malformed(format!("{resource}: page without data")))?;
            let total = body
                .pointer("/meta/pageInfo/totalResults")
                .and_then(Value::as_u64);
            launcher_debug!(
                "{}: fetched {} items at offset {}",
                resource,
                page.len(),
                items.len()
            );
            let page_len = page.len();
            items.extend(page.iter().cloned());

            match total {
                Some(total) if page_len > 0 && (items.len() as u64) < total => continue,
                _ => break,
            }
        }
        Ok(items)
    }
}

impl RemoteClient for RestClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn available_endpoints(&self) -> Result<Vec<String>, ClientError> {
        let body = self.runtime.block_on(self.get_json(&self.api_url("")))?;
        endpoint_names(&body)
    }

    fn get_all(&self, resource: &str) -> Result<Vec<Value>, ClientError> {
        self.runtime.block_on(self.fetch_all(resource))
    }
}

async fn fetch_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, ClientError> {
    let response = http
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("grant_type=client_credentials")
        .send()
        .await
        .map_err(transport_error)?;
    check_status(response.status())?;
    let body = response.bytes().await.map_err(transport_error)?;
    let json: Value =
        serde_json::from_slice(&body).map_err(|err| ClientError::Malformed(err.to_string()))?;
    json.get("access_token")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| ClientError::Malformed("token response without access_token".into()))
}

fn endpoint_names(body: &Value) -> Result<Vec<String>, ClientError> {
    match body.get("data") {
        Some(Value::Array(entries)) => Ok(entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                other => other.get("name").and_then(Value::as_str).map(ToOwned::to_owned),
            })
            .collect()),
        Some(Value::Object(map)) => Ok(map.keys().cloned().collect()),
        _ => Err(ClientError::Malformed(
            "discovery response without data".into(),
        )),
    }
}

fn check_status(status: StatusCode) -> Result<(), ClientError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ClientError::Unauthorized(status.as_u16()))
    } else {
        Err(ClientError::Status(status.as_u16()))
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Transport(format!("timed out: {err}"));
    }
    ClientError::Transport(err.to_string())
}

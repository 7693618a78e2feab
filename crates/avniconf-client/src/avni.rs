use async_trait::async_trait;
use avniconf_core::{
    AppError, Created, EntityDefinition, EntityKind, HttpConfig, Lookup, NameMatch,
    RemoteEntityGateway,
};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::payload::build_payload;
use crate::response::{find_match, normalize_records};

/// Page size requested from listing endpoints, large enough to hold every
/// address level type or web entity of an organisation.
const LISTING_PAGE_SIZE: &str = "1000";

const AUTH_TOKEN_HEADER: &str = "AUTH-TOKEN";
const USER_NAME_HEADER: &str = "USER-NAME";
const IMPLEMENTATION_COOKIE: &str = "IMPLEMENTATION-NAME";

/// How existence is looked up for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupRoute {
    /// Fetch the whole collection and filter client-side.
    Listing,
    /// `<collection>/search/find?<param>=<name>`.
    Search { param: &'static str },
}

fn collection_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::AddressLevelTypes => "addressLevelType",
        EntityKind::Locations => "locations",
        EntityKind::Catchments => "catchment",
        EntityKind::SubjectTypes => "web/subjectType",
        EntityKind::Programs => "web/program",
        EntityKind::EncounterTypes => "web/encounterType",
    }
}

fn lookup_route(kind: EntityKind) -> LookupRoute {
    match kind {
        EntityKind::Locations => LookupRoute::Search { param: "title" },
        EntityKind::Catchments => LookupRoute::Search { param: "name" },
        _ => LookupRoute::Listing,
    }
}

/// HTTP gateway to an Avni server.
///
/// Every request carries the auth token. The user name and the organisation
/// (sent as the `IMPLEMENTATION-NAME` cookie) are attached when set.
///
/// Lookups are retried on transient failures (network errors, timeouts,
/// 429 and 5xx). Creations are sent exactly once: the server gives no
/// guarantee that a failed POST had no effect.
///
/// # Examples
///
/// ```no_run
/// use avniconf_client::AvniClient;
/// use avniconf_core::{EntityKind, RemoteEntityGateway};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AvniClient::new("https://staging.avniproject.org", "my-token")?
///     .with_org_name(Some("demo".to_string()));
/// let lookup = client.exists(EntityKind::AddressLevelTypes, "State", None).await?;
/// println!("State exists: {}", lookup.found);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AvniClient {
    client: Client,
    base_url: Url,
    auth_token: String,
    user_name: Option<String>,
    org_name: Option<String>,
    http: HttpConfig,
    name_match: NameMatch,
}

impl AvniClient {
    /// Creates a client for the server at `base_url_str`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is invalid or malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str, auth_token: impl Into<String>) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url_str)
            .map_err(|_| AppError::InvalidUrl(base_url_str.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(base_url_str.to_string()));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("avniconf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.into(),
            user_name: None,
            org_name: None,
            http: HttpConfig::default(),
            name_match: NameMatch::default(),
        })
    }

    pub fn with_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_user_name(mut self, user_name: Option<String>) -> Self {
        self.user_name = user_name.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_org_name(mut self, org_name: Option<String>) -> Self {
        self.org_name = org_name.filter(|o| !o.trim().is_empty());
        self
    }

    pub fn with_name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> Result<Url, AppError> {
        self.base_url
            .join(collection_path(kind))
            .map_err(|e| AppError::InvalidUrl(e.to_string()))
    }

    fn lookup_url(&self, kind: EntityKind, name: &str) -> Result<Url, AppError> {
        match lookup_route(kind) {
            LookupRoute::Listing => {
                let mut url = self.collection_url(kind)?;
                url.query_pairs_mut().append_pair("size", LISTING_PAGE_SIZE);
                Ok(url)
            }
            LookupRoute::Search { param } => {
                let mut url = self
                    .base_url
                    .join(&format!("{}/search/find", collection_path(kind)))
                    .map_err(|e| AppError::InvalidUrl(e.to_string()))?;
                url.query_pairs_mut().append_pair(param, name.trim());
                Ok(url)
            }
        }
    }

    /// Attaches credentials and organisation context.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request
            .header(AUTH_TOKEN_HEADER, &self.auth_token)
            .header(ACCEPT, "application/json");
        if let Some(user_name) = &self.user_name {
            request = request.header(USER_NAME_HEADER, user_name);
        }
        if let Some(org_name) = &self.org_name {
            request = request.header(COOKIE, format!("{}={}", IMPLEMENTATION_COOKIE, org_name));
        }
        request
    }

    /// Makes an HTTP GET request with automatic retry on transient failures.
    ///
    /// Retries on:
    /// - Network errors
    /// - Timeouts
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    ///
    /// Any other non-2xx status fails immediately with `AppError::RemoteStatus`.
    async fn get_with_retry(&self, url: &Url) -> Result<Value, AppError> {
        let max_attempts = self.http.max_retries.max(1);
        let base_delay = self.http.retry_base_delay;
        let mut last_error = AppError::Generic("No attempts made".to_string());

        for attempt in 1..=max_attempts {
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);
            let request = self
                .authorize(self.client.get(url.clone()))
                .timeout(self.http.read_timeout);

            let error = match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let body = read_body(resp, self.http.read_timeout).await?;
                        return parse_json(&body);
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        AppError::RateLimitExceeded
                    } else {
                        AppError::RemoteStatus {
                            status: status.as_u16(),
                            body: read_body(resp, self.http.read_timeout)
                                .await
                                .unwrap_or_default(),
                        }
                    }
                }
                Err(e) => transport_error(e, self.http.read_timeout),
            };

            if !error.is_retryable() {
                return Err(error);
            }
            if attempt < max_attempts {
                let delay = match error {
                    AppError::RateLimitExceeded => base_delay * 2_u32.pow(attempt),
                    _ => base_delay * attempt,
                };
                debug!("Retrying {} in {:?}: {}", url, delay, error);
                sleep(delay).await;
            }
            last_error = error;
        }

        Err(last_error)
    }
}

async fn read_body(resp: reqwest::Response, timeout: Duration) -> Result<String, AppError> {
    resp.text().await.map_err(|e| transport_error(e, timeout))
}

fn parse_json(body: &str) -> Result<Value, AppError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| AppError::UnexpectedResponse(format!("invalid JSON: {}", e)))
}

/// The record returned with a 2xx creation. The entity exists once the
/// server has accepted it, so an unreadable body gives `Null` and an
/// unparseable one is kept as text.
fn created_record(body: Result<String, AppError>) -> Value {
    match body {
        Ok(text) => parse_json(&text).unwrap_or(Value::String(text)),
        Err(e) => {
            warn!("Created, but the response body could not be read: {}", e);
            Value::Null
        }
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout.as_secs())
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {}", e))
    } else {
        AppError::ClientError(e.to_string())
    }
}

#[async_trait]
impl RemoteEntityGateway for AvniClient {
    async fn exists(
        &self,
        kind: EntityKind,
        name: &str,
        uuid: Option<&str>,
    ) -> Result<Lookup, AppError> {
        let url = self.lookup_url(kind, name)?;
        let body = self.get_with_retry(&url).await?;
        let records = normalize_records(body)?;
        debug!("{} lookup for '{}' returned {} records", kind, name, records.len());

        Ok(match find_match(records, kind, name, uuid, self.name_match) {
            Some(record) => Lookup::found(record),
            None => Lookup::not_found(),
        })
    }

    async fn create(&self, definition: &EntityDefinition) -> Result<Created, AppError> {
        let url = self.collection_url(definition.kind())?;
        let payload = build_payload(definition)?;
        debug!("POST {} for {} '{}'", url, definition.kind(), definition.name());

        let resp = self
            .authorize(self.client.post(url))
            .timeout(self.http.write_timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(e, self.http.write_timeout))?;

        let status = resp.status();
        let body = read_body(resp, self.http.write_timeout).await;
        if !status.is_success() {
            return Err(AppError::RemoteStatus {
                status: status.as_u16(),
                body: body.unwrap_or_default(),
            });
        }

        Ok(Created {
            status_code: status.as_u16(),
            record: created_record(body),
        })
    }
}

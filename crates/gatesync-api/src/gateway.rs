// Hand-crafted async HTTP client for the gateway list API (v4 envelope).
//
// Base path: /client/v4/accounts/{account_id}/gateway/
// Auth: X-Auth-Email + X-Auth-Key headers

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::Error;

// ── Wire types ───────────────────────────────────────────────────────

/// A remote gateway list: the target of one group's reconciliation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// One entry currently present on a gateway list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListItem {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Response envelope ────────────────────────────────────────────────

/// The v4 `{success, errors, result}` envelope. `result` is null when
/// a list has no items, so it deserializes through `Option`.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<EnvelopeError>,
    result: Option<T>,
}

#[derive(Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the gateway list API, scoped to one account.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    account_id: String,
}

impl GatewayClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from account credentials and transport config.
    ///
    /// Injects `X-Auth-Email` and `X-Auth-Key` as default headers on
    /// every request; the key header is marked sensitive.
    pub fn from_credentials(
        base_url: &str,
        account_id: &str,
        auth_email: &str,
        api_key: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        let email_value = HeaderValue::from_str(auth_email).map_err(|e| Error::Authentication {
            message: format!("invalid auth email header value: {e}"),
        })?;
        headers.insert("X-Auth-Email", email_value);

        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-Auth-Key", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            account_id: account_id.to_owned(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        account_id: &str,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            account_id: account_id.to_owned(),
        })
    }

    /// The account this client is scoped to.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Normalize the base URL so relative joins under `/client/v4/` work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/client/v4") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/client/v4/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"gateway/lists"`) onto the account scope.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/client/v4/`, so joining works.
        self.base_url
            .join(&format!("accounts/{}/{path}", self.account_id))
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path);
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })?;

        if !envelope.success {
            let (message, code) = envelope
                .errors
                .into_iter()
                .next()
                .map_or_else(|| (status.to_string(), None), |e| (e.message, e.code));
            return Err(Error::Api {
                message,
                code,
                status: status.as_u16(),
            });
        }

        Ok(envelope.result)
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Error::Authentication {
                message: format!("credentials rejected (HTTP {})", status.as_u16()),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&raw) {
            if let Some(err) = envelope.errors.into_iter().next() {
                return Error::Api {
                    message: err.message,
                    code: err.code,
                    status: status.as_u16(),
                };
            }
        }

        Error::Api {
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: None,
            status: status.as_u16(),
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch every gateway list defined for the account.
    ///
    /// A null `result` (no lists provisioned) yields an empty vec.
    pub async fn list_lists(&self) -> Result<Vec<GatewayList>, Error> {
        Ok(self.get("gateway/lists").await?.unwrap_or_default())
    }

    /// Fetch the current entries of one list by id.
    ///
    /// The API returns a null `result` for an empty list.
    pub async fn list_items(&self, list_id: &str) -> Result<Vec<ListItem>, Error> {
        Ok(self
            .get(&format!("gateway/lists/{list_id}/items"))
            .await?
            .unwrap_or_default())
    }

    /// Apply an append/remove payload to a list in one PATCH call.
    ///
    /// The body is the caller's wire payload
    /// (`{"remove": [...], "append": [...]}`); the updated list object
    /// in the response is discarded.
    pub async fn update_list<B: Serialize + Sync>(
        &self,
        list_id: &str,
        body: &B,
    ) -> Result<(), Error> {
        self.patch::<serde_json::Value, B>(&format!("gateway/lists/{list_id}"), body)
            .await?;
        Ok(())
    }
}

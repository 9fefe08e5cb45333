// Minimal HTTP object store client for the input datasets and the
// persisted diff artifacts.
//
// Objects live under `{base_url}/{key}`; GET retrieves, PUT stores.
// Auth is an optional bearer token for stores that require one.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;

/// Async client for the dataset bucket.
///
/// A missing object is a distinguishable outcome
/// ([`Error::ObjectNotFound`]), not a generic API failure: the sync
/// engine short-circuits a run when an input dataset is absent.
pub struct ObjectStore {
    http: reqwest::Client,
    base_url: Url,
}

impl ObjectStore {
    /// Build from the bucket base URL and an optional bearer token.
    pub fn new(
        base_url: &str,
        token: Option<&secrecy::SecretString>,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let http = if let Some(token) = token {
            let mut headers = HeaderMap::new();
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: format!("invalid bearer token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            transport.build_client_with_headers(headers)?
        } else {
            transport.build_client()?
        };

        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    fn url(&self, key: &str) -> Url {
        self.base_url
            .join(key)
            .expect("object key should be a valid relative URL")
    }

    /// Fetch an object and deserialize it as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, Error> {
        let url = self.url(key);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ObjectNotFound {
                key: key.to_owned(),
            });
        }
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Store a value as a JSON object under the given key.
    pub async fn put_json<B: Serialize + Sync>(&self, key: &str, body: &B) -> Result<(), Error> {
        let url = self.url(key);
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

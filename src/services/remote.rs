use crate::config::RemoteConfig;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("invalid remote url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request to data service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Read-only client for a hosted PostgREST table (Supabase-style `rest/v1`).
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("resepi/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: table_endpoint(&config.url, &config.table)?,
            api_key: config.resolve_api_key(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch every row of the table, projecting `columns`, in ascending id order.
    pub async fn select<T: DeserializeOwned>(&self, columns: &str) -> Result<Vec<T>, RemoteError> {
        let url = select_url(&self.endpoint, columns);

        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        Ok(response.json::<Vec<T>>().await?)
    }
}

/// `{base}/rest/v1/{table}`, tolerating a trailing slash or an explicit `rest/v1` on the base.
pub fn table_endpoint(base: &str, table: &str) -> Result<Url, RemoteError> {
    let mut base = Url::parse(base)?;
    let trimmed = base.path().trim_end_matches('/').to_string();
    let path = if trimmed.ends_with("/rest/v1") {
        format!("{}/", trimmed)
    } else {
        format!("{}/rest/v1/", trimmed)
    };
    base.set_path(&path);
    Ok(base.join(table.trim_matches('/'))?)
}

pub fn select_url(endpoint: &Url, columns: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("select", columns)
        .append_pair("order", "id.asc");
    url
}

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::{
    AdminEndpoint, ApiError, Backend, DataResponse, Envelope, Item, ItemEndpoint, OpsEndpoint,
    QueryParams, TimeSpan,
};

/// [`Backend`] over `reqwest` (browser `fetch` on wasm32).
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// `base` must be absolute and end with `/` so endpoint names join beneath it.
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Absolute URL of an endpoint, e.g. the download form's action.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    async fn get(&self, path: &str, params: &QueryParams) -> Result<Response, ApiError> {
        let url = self.endpoint_url(path)?;
        debug!(%url, params = params.len(), "GET");
        let response = self.client.get(url).query(&params.to_pairs()).send().await?;
        check_status(path, response)
    }

    async fn post(&self, path: &str, params: &QueryParams) -> Result<Response, ApiError> {
        let url = self.endpoint_url(path)?;
        debug!(%url, params = params.len(), "POST");
        let response = self.client.post(url).json(params).send().await?;
        check_status(path, response)
    }

    async fn enveloped<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let envelope: Envelope<T> = response.json().await?;
        unwrap_envelope(envelope)
    }
}

fn check_status(path: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(endpoint = path, status = status.as_u16(), "request failed");
        Err(ApiError::from_status(status.as_u16()))
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
    match envelope {
        Envelope {
            status: 200,
            data: Some(data),
        } => Ok(data),
        Envelope { status, .. } => Err(ApiError::EmptyEnvelope { status }),
    }
}

impl Backend for HttpBackend {
    async fn items(
        &self,
        endpoint: ItemEndpoint,
        params: &QueryParams,
    ) -> Result<Vec<Item>, ApiError> {
        let response = if endpoint.is_get() {
            self.get(endpoint.path(), params).await?
        } else {
            self.post(endpoint.path(), params).await?
        };
        Self::enveloped(response).await
    }

    async fn operations(
        &self,
        endpoint: OpsEndpoint,
        params: &QueryParams,
    ) -> Result<Vec<String>, ApiError> {
        let response = self.get(endpoint.path(), params).await?;
        Self::enveloped(response).await
    }

    async fn data(&self, params: &QueryParams) -> Result<DataResponse, ApiError> {
        let response = self.post("getData", params).await?;
        let data: DataResponse = response.json().await?;
        if data.status != 200 {
            return Err(ApiError::EmptyEnvelope {
                status: data.status,
            });
        }
        Ok(data)
    }

    async fn time_span(&self, params: &QueryParams) -> Result<TimeSpan, ApiError> {
        let response = self.get("getTimeSpan", params).await?;
        Ok(response.json().await?)
    }

    async fn instance(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        let params = QueryParams::new().with("id", id);
        let response = self.get("instance", &params).await?;
        Ok(response.json().await?)
    }

    async fn admin(
        &self,
        endpoint: AdminEndpoint,
        params: &QueryParams,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self.get(endpoint.path(), params).await?;
        Self::enveloped(response).await
    }
}

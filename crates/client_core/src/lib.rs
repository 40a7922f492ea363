use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{HistoryFormat, PlaybookId},
    error::GatewayError,
    protocol::{
        AckReply, ContentReply, Endpoint, ExportQuery, HostsForm, PlaybookForm,
        PlaybooksDirForm, Routes, RunReply, SystemStatusReply, ThemeReply,
    },
};
use tracing::debug;
use url::Url;

/// Backend operations the console controllers depend on.
///
/// A reply that parsed is always `Ok`, even when it only carries an `error`
/// field; `Err` is reserved for exchanges that produced no structured payload.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn run_playbook(&self, playbook: &PlaybookId) -> Result<RunReply, GatewayError>;
    async fn show_playbook(&self, playbook: &PlaybookId) -> Result<ContentReply, GatewayError>;
    async fn get_hosts(&self) -> Result<ContentReply, GatewayError>;
    async fn save_hosts(&self, content: &str) -> Result<AckReply, GatewayError>;
    async fn system_status(&self) -> Result<SystemStatusReply, GatewayError>;
    async fn clear_history(&self) -> Result<AckReply, GatewayError>;
    async fn toggle_theme(&self) -> Result<ThemeReply, GatewayError>;
    async fn update_playbooks_dir(&self, playbooks_dir: &str) -> Result<AckReply, GatewayError>;
    async fn export_history(&self, format: HistoryFormat) -> Result<String, GatewayError>;
    /// Upload a history file; the backend picks the parser from `filename`.
    async fn import_history(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<AckReply, GatewayError>;
}

#[async_trait]
impl<G> Gateway for Arc<G>
where
    G: Gateway + ?Sized,
{
    async fn run_playbook(&self, playbook: &PlaybookId) -> Result<RunReply, GatewayError> {
        (**self).run_playbook(playbook).await
    }

    async fn show_playbook(&self, playbook: &PlaybookId) -> Result<ContentReply, GatewayError> {
        (**self).show_playbook(playbook).await
    }

    async fn get_hosts(&self) -> Result<ContentReply, GatewayError> {
        (**self).get_hosts().await
    }

    async fn save_hosts(&self, content: &str) -> Result<AckReply, GatewayError> {
        (**self).save_hosts(content).await
    }

    async fn system_status(&self) -> Result<SystemStatusReply, GatewayError> {
        (**self).system_status().await
    }

    async fn clear_history(&self) -> Result<AckReply, GatewayError> {
        (**self).clear_history().await
    }

    async fn toggle_theme(&self) -> Result<ThemeReply, GatewayError> {
        (**self).toggle_theme().await
    }

    async fn update_playbooks_dir(&self, playbooks_dir: &str) -> Result<AckReply, GatewayError> {
        (**self).update_playbooks_dir(playbooks_dir).await
    }

    async fn export_history(&self, format: HistoryFormat) -> Result<String, GatewayError> {
        (**self).export_history(format).await
    }

    async fn import_history(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<AckReply, GatewayError> {
        (**self).import_history(filename, contents).await
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub server_url: String,
    pub routes: Routes,
    /// `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl GatewayConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            routes: Routes::default(),
            request_timeout: None,
        }
    }
}

/// [`Gateway`] over HTTP: form-encoded requests, JSON replies.
pub struct HttpGateway {
    http: Client,
    base_url: Url,
    routes: Routes,
}

impl HttpGateway {
    pub fn new(server_url: &str) -> Result<Self, GatewayError> {
        Self::with_config(GatewayConfig::new(server_url))
    }

    pub fn with_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| GatewayError::Client(err.to_string()))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.server_url)?,
            routes: config.routes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, GatewayError> {
        let path = self.routes.path(endpoint).trim_start_matches('/');
        self.base_url
            .join(path)
            .map_err(|_| GatewayError::InvalidUrl(format!("{}{path}", self.base_url)))
    }

    fn request(&self, endpoint: Endpoint) -> Result<RequestBuilder, GatewayError> {
        let url = self.endpoint_url(endpoint)?;
        Ok(if endpoint.is_post() {
            self.http.post(url)
        } else {
            self.http.get(url)
        })
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(endpoint, err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(endpoint, err))?;
        debug!(
            endpoint = endpoint.name(),
            status = status.as_u16(),
            bytes = body.len(),
            "backend replied"
        );

        // Error payloads arrive with 4xx/5xx codes, so the body is read regardless.
        serde_json::from_slice(&body)
            .map_err(|err| GatewayError::decode(endpoint, format!("status {status}: {err}")))
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, GatewayError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|_| GatewayError::InvalidUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn transport_error(endpoint: Endpoint, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout { endpoint }
    } else {
        GatewayError::transport(endpoint, err.to_string())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn run_playbook(&self, playbook: &PlaybookId) -> Result<RunReply, GatewayError> {
        let endpoint = Endpoint::RunPlaybook;
        let request = self.request(endpoint)?.form(&PlaybookForm::from(playbook));
        self.exchange(endpoint, request).await
    }

    async fn show_playbook(&self, playbook: &PlaybookId) -> Result<ContentReply, GatewayError> {
        let endpoint = Endpoint::ShowPlaybook;
        let request = self.request(endpoint)?.form(&PlaybookForm::from(playbook));
        self.exchange(endpoint, request).await
    }

    async fn get_hosts(&self) -> Result<ContentReply, GatewayError> {
        let endpoint = Endpoint::GetHosts;
        self.exchange(endpoint, self.request(endpoint)?).await
    }

    async fn save_hosts(&self, content: &str) -> Result<AckReply, GatewayError> {
        let endpoint = Endpoint::SaveHosts;
        let request = self.request(endpoint)?.form(&HostsForm {
            content: content.to_string(),
        });
        self.exchange(endpoint, request).await
    }

    async fn system_status(&self) -> Result<SystemStatusReply, GatewayError> {
        let endpoint = Endpoint::SystemStatus;
        self.exchange(endpoint, self.request(endpoint)?).await
    }

    async fn clear_history(&self) -> Result<AckReply, GatewayError> {
        let endpoint = Endpoint::ClearHistory;
        self.exchange(endpoint, self.request(endpoint)?).await
    }

    async fn toggle_theme(&self) -> Result<ThemeReply, GatewayError> {
        let endpoint = Endpoint::ToggleTheme;
        self.exchange(endpoint, self.request(endpoint)?).await
    }

    async fn update_playbooks_dir(&self, playbooks_dir: &str) -> Result<AckReply, GatewayError> {
        let endpoint = Endpoint::UpdatePlaybooksDir;
        let request = self.request(endpoint)?.form(&PlaybooksDirForm {
            playbooks_dir: playbooks_dir.to_string(),
        });
        self.exchange(endpoint, request).await
    }

    async fn export_history(&self, format: HistoryFormat) -> Result<String, GatewayError> {
        let endpoint = Endpoint::ExportHistory;
        let response = self
            .request(endpoint)?
            .query(&ExportQuery {
                format: format.as_query().to_string(),
            })
            .send()
            .await
            .map_err(|err| transport_error(endpoint, err))?
            .error_for_status()
            .map_err(|err| transport_error(endpoint, err))?;
        response
            .text()
            .await
            .map_err(|err| transport_error(endpoint, err))
    }

    async fn import_history(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<AckReply, GatewayError> {
        let endpoint = Endpoint::ImportHistory;
        let file = Part::bytes(contents).file_name(filename.to_string());
        let request = self
            .request(endpoint)?
            .multipart(Form::new().part("file", file));
        self.exchange(endpoint, request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

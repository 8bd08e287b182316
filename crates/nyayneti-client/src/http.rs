//! HTTP implementation of the drafting backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use nyayneti_core::{
    defaults, AnalyzeContextRequest, AnalyzeContextResponse, DocumentList, DocumentSummary,
    DraftResult, DraftingBackend, Error, ExtractedFields, GenerateDraftRequest, Result, Template,
    TemplateCatalog,
};

use crate::config::ClientConfig;
use crate::error::to_core_error;

/// Generation slower than this is logged as slow (milliseconds).
const SLOW_GENERATION_MS: u64 = 60_000;

/// Drafting backend reached over the REST API.
pub struct HttpDraftingBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpDraftingBackend {
    /// Create a backend from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.generate_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Initializing drafting backend client: url={}", config.base_url);

        Ok(Self { client, config })
    }

    /// Create from the default config file or environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::load()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder, timeout_secs: u64) -> Result<Response> {
        let response = request
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(to_core_error(status, &body));
        }

        Ok(response)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))
    }

    /// Check if the backend is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url(defaults::HEALTH_PATH))
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Backend health check passed");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Backend health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Backend health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Fetch the bytes of a generated artifact.
    #[instrument(skip(self), fields(subsystem = "client", component = "http_backend", op = "download_draft"))]
    pub async fn download_draft(&self, filename: &str) -> Result<Vec<u8>> {
        if filename.is_empty() {
            return Err(Error::InvalidInput("filename cannot be empty".to_string()));
        }

        let request = self.client.get(self.download_url(filename));
        let response = self.send(request, self.config.timeout_secs).await?;
        let bytes = response.bytes().await?;

        debug!(bytes = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }

    /// Download a generated artifact into `dir`, keeping its filename.
    pub async fn download_draft_to(&self, filename: &str, dir: &Path) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("invalid filename: {}", filename)))?;
        let bytes = self.download_draft(filename).await?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(name);
        std::fs::write(&path, bytes)?;

        info!("Saved draft to {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl DraftingBackend for HttpDraftingBackend {
    #[instrument(skip(self), fields(subsystem = "client", component = "http_backend", op = "list_templates"))]
    async fn list_templates(&self) -> Result<Vec<Template>> {
        let request = self.client.get(self.url(defaults::TEMPLATES_PATH));
        let response = self.send(request, self.config.timeout_secs).await?;
        let catalog: TemplateCatalog = Self::parse(response).await?;
        let templates = catalog.into_templates();

        debug!(result_count = templates.len(), "Template catalog loaded");
        Ok(templates)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http_backend", op = "list_documents"))]
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let request = self.client.get(self.url(defaults::DOCUMENTS_PATH));
        let response = self.send(request, self.config.timeout_secs).await?;
        let list: DocumentList = Self::parse(response).await?;

        debug!(result_count = list.documents.len(), "Document catalog loaded");
        Ok(list.documents)
    }

    #[instrument(skip(self, request), fields(subsystem = "client", component = "http_backend", op = "analyze_context", doc_id = %request.doc_id, template_id = %request.template_type))]
    async fn analyze_context(&self, request: &AnalyzeContextRequest) -> Result<ExtractedFields> {
        let start = Instant::now();

        let builder = self
            .client
            .post(self.url(defaults::ANALYZE_CONTEXT_PATH))
            .json(request);
        let response = self.send(builder, self.config.analyze_timeout_secs).await?;
        let body: AnalyzeContextResponse = Self::parse(response).await?;
        let fields = body.into_extracted()?;

        debug!(
            result_count = fields.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Context analysis complete"
        );
        Ok(fields)
    }

    #[instrument(skip(self, request), fields(subsystem = "client", component = "http_backend", op = "generate_draft", template_id = %request.template_type, populated = request.user_inputs.len()))]
    async fn generate_draft(&self, request: &GenerateDraftRequest) -> Result<DraftResult> {
        let start = Instant::now();

        let builder = self.client.post(self.url(defaults::GENERATE_PATH)).json(request);
        let response = self.send(builder, self.config.generate_timeout_secs).await?;
        let body: serde_json::Value = Self::parse(response).await?;
        let draft = DraftResult::from_response(body)?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            filename = %draft.filename,
            citations = draft.citation_count(),
            duration_ms = elapsed,
            "Draft generation complete"
        );
        if elapsed > SLOW_GENERATION_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow generation operation");
        }
        Ok(draft)
    }

    fn download_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.url(defaults::DOWNLOAD_PATH),
            urlencoding::encode(filename)
        )
    }
}

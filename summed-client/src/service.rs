use async_trait::async_trait;
use reqwest::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    models::{
        ExtractedMetadata, MessageRequest, MessageResponse, SummaryRequest, UploadFile,
        UploadResponse,
    },
};

pub const UPLOAD_ENDPOINT: &str = "/upload";
pub const SUMMARY_ENDPOINT: &str = "/handle_summary";
pub const MESSAGE_ENDPOINT: &str = "/handle_message";
pub const IMAGES_ENDPOINT: &str = "/images";

/// The remote backend that parses papers, summarizes them and answers chat messages
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload a paper and get back its title and extracted metadata
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse>;

    /// Fetch the metadata of a previously uploaded paper by its source file name
    async fn fetch_summary(&self, file_name: &str) -> Result<ExtractedMetadata>;

    /// Send a chat message and return the bot's reply
    async fn send_message(&self, text: &str) -> Result<String>;

    /// Download an extracted table or figure
    async fn fetch_image(&self, name: &str) -> Result<Vec<u8>>;
}

/// `DocumentService` over HTTP
#[derive(Clone, Debug)]
pub struct HttpDocumentService {
    client: Client,
    base_url: String,
}

impl HttpDocumentService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Address of an extracted image, as the view would reference it
    pub fn image_url(&self, name: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            IMAGES_ENDPOINT,
            urlencoding::encode(name)
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse> {
        info!(
            "Uploading {} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );

        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint(UPLOAD_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::transport(UPLOAD_ENDPOINT, e))?;

        decode_json(UPLOAD_ENDPOINT, response).await
    }

    async fn fetch_summary(&self, file_name: &str) -> Result<ExtractedMetadata> {
        info!("Requesting summary for {}", file_name);

        let response = self
            .client
            .post(self.endpoint(SUMMARY_ENDPOINT))
            .json(&SummaryRequest {
                file_name: file_name.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::transport(SUMMARY_ENDPOINT, e))?;

        decode_json(SUMMARY_ENDPOINT, response).await
    }

    async fn send_message(&self, text: &str) -> Result<String> {
        debug!("Sending chat message ({} characters)", text.len());

        let response = self
            .client
            .post(self.endpoint(MESSAGE_ENDPOINT))
            .json(&MessageRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::transport(MESSAGE_ENDPOINT, e))?;

        let reply: MessageResponse = decode_json(MESSAGE_ENDPOINT, response).await?;
        Ok(reply.text)
    }

    async fn fetch_image(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.image_url(name);
        debug!("Fetching image {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport(IMAGES_ENDPOINT, e))?;

        let response = ensure_ok(IMAGES_ENDPOINT, response)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(IMAGES_ENDPOINT, e))?;

        Ok(bytes.to_vec())
    }
}

/// Anything other than 200 counts as a failure, matching the backend's contract
fn ensure_ok(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.as_u16() != 200 {
        error!("{} returned {}", endpoint, status);
        return Err(ClientError::status(endpoint, status.as_u16()));
    }
    Ok(response)
}

async fn decode_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    let response = ensure_ok(endpoint, response)?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::decode(endpoint, e.to_string()))
}

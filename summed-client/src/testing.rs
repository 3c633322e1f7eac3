//! In-process `DocumentService` used by the unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    error::{ClientError, Result},
    models::{ExtractedMetadata, UploadFile, UploadResponse},
    service::DocumentService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    Summary(String),
    Message(String),
    Image(String),
}

/// Canned outcome for one request
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16),
    Network,
}

impl<T> Reply<T> {
    fn into_result(self, endpoint: &str) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status) => Err(ClientError::status(endpoint, status)),
            Reply::Network => Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<Call>>,
    uploads: Mutex<VecDeque<Reply<UploadResponse>>>,
    upload_delays: Mutex<HashMap<String, Duration>>,
    summaries: Mutex<HashMap<String, (Reply<ExtractedMetadata>, Duration)>>,
    messages: Mutex<VecDeque<Reply<String>>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, reply: Reply<UploadResponse>) {
        self.uploads.lock().unwrap().push_back(reply);
    }

    /// Hold the upload of `file_name` for `delay` before replying
    pub fn set_upload_delay(&self, file_name: &str, delay: Duration) {
        self.upload_delays
            .lock()
            .unwrap()
            .insert(file_name.to_string(), delay);
    }

    pub fn set_summary(&self, file_name: &str, reply: Reply<ExtractedMetadata>, delay: Duration) {
        self.summaries
            .lock()
            .unwrap()
            .insert(file_name.to_string(), (reply, delay));
    }

    pub fn push_message(&self, reply: Reply<String>) {
        self.messages.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn upload_response(title: &str, summary: &str) -> UploadResponse {
    UploadResponse {
        title: title.to_string(),
        metadata: metadata(summary),
    }
}

pub fn metadata(summary: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        summary: summary.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl DocumentService for FakeService {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse> {
        self.record(Call::Upload(file.file_name.clone()));
        let reply = self.uploads.lock().unwrap().pop_front().unwrap_or(Reply::Network);
        let delay = self
            .upload_delays
            .lock()
            .unwrap()
            .get(&file.file_name)
            .copied()
            .unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.into_result("/upload")
    }

    async fn fetch_summary(&self, file_name: &str) -> Result<ExtractedMetadata> {
        self.record(Call::Summary(file_name.to_string()));
        let scripted = self.summaries.lock().unwrap().get(file_name).cloned();
        let (reply, delay) = scripted.unwrap_or((Reply::Status(404), Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.into_result("/handle_summary")
    }

    async fn send_message(&self, text: &str) -> Result<String> {
        self.record(Call::Message(text.to_string()));
        let reply = self.messages.lock().unwrap().pop_front().unwrap_or(Reply::Network);
        reply.into_result("/handle_message")
    }

    async fn fetch_image(&self, name: &str) -> Result<Vec<u8>> {
        self.record(Call::Image(name.to_string()));
        Ok(Vec::new())
    }
}

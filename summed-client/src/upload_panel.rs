use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    latency::LatencyPolicy,
    models::{ExtractedMetadata, UploadFile, UploadedDocument},
    sections::{Accordion, AccordionSection, DropdownMenus, ResourceMenu},
    service::DocumentService,
    store::{FetchState, MetadataStore},
};

pub const EMPTY_DOCUMENTS_PLACEHOLDER: &str = "None file is uploaded yet";

/// Spinner and banner flags for the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStatus {
    pub is_uploading: bool,
    pub is_upload_success: bool,
    pub is_summary_loading: bool,
}

/// Everything the results view needs, read under one lock
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub documents: Vec<UploadedDocument>,
    pub selected: Option<usize>,
    pub status: UploadStatus,
    pub metadata: Option<ExtractedMetadata>,
    pub open_section: Option<AccordionSection>,
    pub visible_menu: Option<ResourceMenu>,
}

impl PanelView {
    /// Thumbnails stay hidden while the displayed document is still loading
    pub fn show_images(&self) -> bool {
        !self.status.is_summary_loading
    }

    /// Images listed by the visible menu, if any
    pub fn menu_images(&self) -> &[String] {
        match (self.visible_menu, &self.metadata) {
            (Some(ResourceMenu::Tables), Some(metadata)) if self.show_images() => {
                metadata.tables.as_slice()
            }
            (Some(ResourceMenu::Figures), Some(metadata)) if self.show_images() => {
                metadata.figures.as_slice()
            }
            _ => &[],
        }
    }
}

#[derive(Debug, Default)]
struct PanelState {
    documents: Vec<UploadedDocument>,
    selected: Option<usize>,
    /// Source file name whose metadata is on screen
    displayed: Option<String>,
    uploads_in_flight: usize,
    upload_success: bool,
    /// Bumped on every successful upload; a banner timer only clears its own generation
    banner_generation: u64,
    accordion: Accordion,
    menus: DropdownMenus,
    alerts: Vec<String>,
}

/// Upload surface, document list and results viewer
pub struct UploadPanel {
    service: Arc<dyn DocumentService>,
    latency: LatencyPolicy,
    success_banner: Duration,
    store: MetadataStore,
    state: Arc<RwLock<PanelState>>,
    banner_timer: Mutex<Option<JoinHandle<()>>>,
}

impl UploadPanel {
    pub fn new(service: Arc<dyn DocumentService>, config: &ClientConfig) -> Self {
        Self {
            service,
            latency: LatencyPolicy::fixed(config.simulated_latency),
            success_banner: config.success_banner,
            store: MetadataStore::new(),
            state: Arc::new(RwLock::new(PanelState::default())),
            banner_timer: Mutex::new(None),
        }
    }

    pub fn with_latency(mut self, latency: LatencyPolicy) -> Self {
        self.latency = latency;
        self
    }

    /// Handle a drop; only the first file is uploaded and an empty drop does nothing
    pub async fn on_drop(&self, files: Vec<UploadFile>) -> Option<Result<UploadedDocument>> {
        let file = files.into_iter().next()?;
        Some(self.submit_upload(file).await)
    }

    pub async fn submit_upload(&self, file: UploadFile) -> Result<UploadedDocument> {
        self.state.write().await.uploads_in_flight += 1;

        let outcome = self
            .latency
            .dispatch("upload", self.service.upload(&file))
            .await;

        let mut state = self.state.write().await;
        state.uploads_in_flight = state.uploads_in_flight.saturating_sub(1);

        match outcome {
            Ok(response) => {
                let document = UploadedDocument {
                    title: response.title,
                    source_file_name: file.file_name,
                };
                info!(
                    "Uploaded '{}' as {}",
                    document.title, document.source_file_name
                );

                self.store
                    .put(document.source_file_name.clone(), response.metadata);
                state.displayed = Some(document.source_file_name.clone());
                state.documents.push(document.clone());
                state.upload_success = true;
                state.banner_generation += 1;
                let generation = state.banner_generation;
                drop(state);

                self.raise_success_banner(generation).await;
                Ok(document)
            }
            Err(e) => {
                error!("Upload of {} failed: {}", file.file_name, e);
                state.alerts.push(upload_alert(&e).to_string());
                Err(e)
            }
        }
    }

    /// Show the document at `index`, fetching its metadata by source file name
    pub async fn select_document(&self, index: usize) -> Result<ExtractedMetadata> {
        let (file_name, ticket) = {
            let mut state = self.state.write().await;
            let file_name = state
                .documents
                .get(index)
                .map(|document| document.source_file_name.clone())
                .ok_or(ClientError::DocumentNotFound(index))?;

            state.selected = Some(index);
            state.displayed = Some(file_name.clone());
            let ticket = self.store.begin(file_name.clone());
            (file_name, ticket)
        };

        let outcome = self
            .latency
            .dispatch("summary", self.service.fetch_summary(&file_name))
            .await;

        match outcome {
            Ok(metadata) => {
                self.store.complete(&file_name, ticket, Ok(metadata.clone()));
                Ok(metadata)
            }
            Err(e) => {
                error!("Summary for {} failed: {}", file_name, e);
                self.store.complete(&file_name, ticket, Err(e.to_string()));
                self.alert(summary_alert(&e)).await;
                Err(e)
            }
        }
    }

    pub async fn toggle_accordion_section(&self, section: AccordionSection) {
        self.state.write().await.accordion.toggle(section);
    }

    pub async fn toggle_dropdown_menu(&self, slot: usize) {
        self.state.write().await.menus.toggle(slot);
    }

    pub async fn documents(&self) -> Vec<UploadedDocument> {
        self.state.read().await.documents.clone()
    }

    pub async fn status(&self) -> UploadStatus {
        let state = self.state.read().await;
        self.status_of(&state)
    }

    /// Metadata of the displayed document
    pub async fn current_metadata(&self) -> Option<ExtractedMetadata> {
        let state = self.state.read().await;
        self.displayed_state(&state)
            .and_then(|fetch| fetch.metadata().cloned())
    }

    pub async fn view(&self) -> PanelView {
        let state = self.state.read().await;
        PanelView {
            documents: state.documents.clone(),
            selected: state.selected,
            status: self.status_of(&state),
            metadata: self
                .displayed_state(&state)
                .and_then(|fetch| fetch.metadata().cloned()),
            open_section: state.accordion.open_section(),
            visible_menu: state.menus.visible(),
        }
    }

    /// Drain alerts queued for the user, oldest first
    pub async fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut self.state.write().await.alerts)
    }

    fn status_of(&self, state: &PanelState) -> UploadStatus {
        UploadStatus {
            is_uploading: state.uploads_in_flight > 0,
            is_upload_success: state.upload_success,
            is_summary_loading: self
                .displayed_state(state)
                .is_some_and(|fetch| fetch.is_pending()),
        }
    }

    fn displayed_state(&self, state: &PanelState) -> Option<FetchState> {
        state
            .displayed
            .as_deref()
            .and_then(|key| self.store.get(key))
    }

    async fn alert(&self, message: impl Into<String>) {
        self.state.write().await.alerts.push(message.into());
    }

    /// Keep the banner up for a fixed window, restarting it on every success
    async fn raise_success_banner(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let banner = self.success_banner;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(banner).await;
            let mut state = state.write().await;
            if state.banner_generation == generation {
                state.upload_success = false;
            }
        });

        if let Some(previous) = self.banner_timer.lock().await.replace(timer) {
            previous.abort();
        }
    }
}

impl Drop for UploadPanel {
    fn drop(&mut self) {
        if let Some(timer) = self.banner_timer.get_mut().take() {
            timer.abort();
        }
    }
}

fn upload_alert(error: &ClientError) -> &'static str {
    match error {
        ClientError::Status { .. } => "Failed to upload PDF file",
        _ => "An error occurred while uploading the PDF file",
    }
}

fn summary_alert(error: &ClientError) -> &'static str {
    match error {
        ClientError::Status { .. } => "Failed to get summary",
        _ => "An error occurred while getting the summary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeService, Reply, metadata, upload_response};

    fn panel_with(service: Arc<FakeService>) -> UploadPanel {
        let config = ClientConfig::default().with_simulated_latency(Duration::ZERO);
        UploadPanel::new(service, &config)
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, b"%PDF-1.4".to_vec())
    }

    #[tokio::test]
    async fn test_drop_uploads_and_displays_metadata() {
        let service = Arc::new(FakeService::new());
        let mut response = upload_response("Paper A", "S");
        response.metadata.key_concepts = "K".to_string();
        service.push_upload(Reply::Ok(response));
        let panel = panel_with(service.clone());

        let uploaded = panel.on_drop(vec![pdf("paper_a.pdf")]).await.unwrap().unwrap();
        assert_eq!(uploaded.title, "Paper A");

        let view = panel.view().await;
        let titles: Vec<_> = view.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Paper A"]);
        let shown = view.metadata.unwrap();
        assert_eq!(shown.summary, "S");
        assert_eq!(shown.key_concepts, "K");
        assert!(!view.status.is_uploading);
        assert!(view.status.is_upload_success);
        assert_eq!(service.calls(), vec![Call::Upload("paper_a.pdf".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_drop_is_noop() {
        let service = Arc::new(FakeService::new());
        let panel = panel_with(service.clone());

        assert!(panel.on_drop(Vec::new()).await.is_none());
        assert!(service.calls().is_empty());
        assert!(panel.documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_documents_follow_successful_responses() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("First", "1")));
        service.push_upload(Reply::Status(500));
        service.push_upload(Reply::Ok(upload_response("Second", "2")));
        let panel = panel_with(service.clone());

        assert!(panel.submit_upload(pdf("one.pdf")).await.is_ok());
        assert!(panel.submit_upload(pdf("two.pdf")).await.is_err());
        assert!(panel.submit_upload(pdf("three.pdf")).await.is_ok());

        let documents = panel.documents().await;
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].title, "First");
        assert_eq!(documents[1].source_file_name, "three.pdf");
        assert_eq!(panel.take_alerts().await, vec!["Failed to upload PDF file"]);
    }

    #[tokio::test]
    async fn test_network_failure_leaves_state_untouched() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Paper A", "S")));
        service.push_upload(Reply::Network);
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        let before = panel.view().await;

        assert!(panel.submit_upload(pdf("b.pdf")).await.is_err());

        let after = panel.view().await;
        assert_eq!(after.documents, before.documents);
        assert_eq!(after.metadata, before.metadata);
        assert!(!after.status.is_uploading);
        assert_eq!(
            panel.take_alerts().await,
            vec!["An error occurred while uploading the PDF file"]
        );
        assert!(panel.take_alerts().await.is_empty());
    }

    #[tokio::test]
    async fn test_any_file_type_is_sent_to_the_service() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Notes", "N")));
        service.push_upload(Reply::Status(500));
        let panel = panel_with(service.clone());

        let notes = panel
            .submit_upload(UploadFile::new("notes.docx", b"x".to_vec()))
            .await
            .unwrap();
        assert_eq!(notes.source_file_name, "notes.docx");

        let result = panel
            .submit_upload(UploadFile::new("paper", b"x".to_vec()))
            .await;
        assert!(matches!(result, Err(ClientError::Status { status: 500, .. })));

        assert_eq!(
            service.calls(),
            vec![
                Call::Upload("notes.docx".to_string()),
                Call::Upload("paper".to_string()),
            ]
        );
        assert_eq!(panel.take_alerts().await, vec!["Failed to upload PDF file"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_uploads_land_in_response_order() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Slow", "s")));
        service.push_upload(Reply::Ok(upload_response("Fast", "f")));
        service.set_upload_delay("slow.pdf", Duration::from_secs(5));
        service.set_upload_delay("fast.pdf", Duration::from_secs(1));
        let panel = Arc::new(panel_with(service));

        let slow = tokio::spawn({
            let panel = Arc::clone(&panel);
            async move { panel.submit_upload(pdf("slow.pdf")).await }
        });
        tokio::task::yield_now().await;
        let fast = tokio::spawn({
            let panel = Arc::clone(&panel);
            async move { panel.submit_upload(pdf("fast.pdf")).await }
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(panel.status().await.is_uploading);

        fast.await.unwrap().unwrap();
        assert!(panel.status().await.is_uploading);

        slow.await.unwrap().unwrap();
        assert!(!panel.status().await.is_uploading);

        let order: Vec<_> = panel
            .documents()
            .await
            .into_iter()
            .map(|document| document.source_file_name)
            .collect();
        assert_eq!(order, vec!["fast.pdf", "slow.pdf"]);
    }

    #[tokio::test]
    async fn test_select_requests_summary_by_file_name() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("A Study of Things", "upload")));
        service.set_summary("study.pdf", Reply::Ok(metadata("fetched")), Duration::ZERO);
        let panel = panel_with(service.clone());

        panel.submit_upload(pdf("study.pdf")).await.unwrap();
        let fetched = panel.select_document(0).await.unwrap();

        assert_eq!(fetched.summary, "fetched");
        assert_eq!(
            service.calls().last(),
            Some(&Call::Summary("study.pdf".to_string()))
        );
        let view = panel.view().await;
        assert_eq!(view.selected, Some(0));
        assert_eq!(view.metadata.unwrap().summary, "fetched");
        assert!(!view.status.is_summary_loading);
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let panel = panel_with(Arc::new(FakeService::new()));
        assert!(matches!(
            panel.select_document(3).await,
            Err(ClientError::DocumentNotFound(3))
        ));
        assert_eq!(panel.view().await.selected, None);
    }

    #[tokio::test]
    async fn test_summary_failure_alerts_and_keeps_metadata() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Paper A", "S")));
        service.set_summary("a.pdf", Reply::Network, Duration::ZERO);
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        assert!(panel.select_document(0).await.is_err());

        let view = panel.view().await;
        assert!(!view.status.is_summary_loading);
        assert_eq!(view.metadata.unwrap().summary, "S");
        assert_eq!(
            panel.take_alerts().await,
            vec!["An error occurred while getting the summary"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_summary_does_not_overwrite_newer_selection() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("A", "a-upload")));
        service.push_upload(Reply::Ok(upload_response("B", "b-upload")));
        service.set_summary("a.pdf", Reply::Ok(metadata("A")), Duration::from_secs(5));
        service.set_summary("b.pdf", Reply::Ok(metadata("B")), Duration::from_secs(1));
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        panel.submit_upload(pdf("b.pdf")).await.unwrap();

        let (a, b) = tokio::join!(panel.select_document(0), async {
            tokio::task::yield_now().await;
            panel.select_document(1).await
        });
        assert!(a.is_ok() && b.is_ok());

        let view = panel.view().await;
        assert_eq!(view.selected, Some(1));
        assert_eq!(view.metadata.unwrap().summary, "B");
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_wait_for_simulated_latency() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Paper A", "S")));
        let panel = Arc::new(UploadPanel::new(service.clone(), &ClientConfig::default()));

        let task = tokio::spawn({
            let panel = Arc::clone(&panel);
            async move { panel.submit_upload(pdf("a.pdf")).await }
        });

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(service.calls().is_empty());
        assert!(panel.status().await.is_uploading);

        task.await.unwrap().unwrap();
        assert_eq!(service.calls().len(), 1);
        assert!(!panel.status().await.is_uploading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_banner_clears_after_window() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("Paper A", "S")));
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        assert!(panel.status().await.is_upload_success);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(panel.status().await.is_upload_success);

        tokio::time::sleep(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(!panel.status().await.is_upload_success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_upload_restarts_banner_window() {
        let service = Arc::new(FakeService::new());
        service.push_upload(Reply::Ok(upload_response("A", "a")));
        service.push_upload(Reply::Ok(upload_response("B", "b")));
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        panel.submit_upload(pdf("b.pdf")).await.unwrap();

        // past the first window, inside the second
        tokio::time::sleep(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert!(panel.status().await.is_upload_success);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;
        assert!(!panel.status().await.is_upload_success);
    }

    #[tokio::test]
    async fn test_accordion_and_menus_are_exclusive() {
        let panel = panel_with(Arc::new(FakeService::new()));

        panel.toggle_accordion_section(AccordionSection::Summary).await;
        panel.toggle_accordion_section(AccordionSection::Highlights).await;
        panel.toggle_dropdown_menu(0).await;
        panel.toggle_dropdown_menu(1).await;

        let view = panel.view().await;
        assert_eq!(view.open_section, Some(AccordionSection::Highlights));
        assert_eq!(view.visible_menu, Some(ResourceMenu::Figures));

        panel.toggle_accordion_section(AccordionSection::Highlights).await;
        assert_eq!(panel.view().await.open_section, None);
        // menus are independent of the accordion
        assert_eq!(panel.view().await.visible_menu, Some(ResourceMenu::Figures));
    }

    #[tokio::test]
    async fn test_menu_images_follow_visible_menu() {
        let service = Arc::new(FakeService::new());
        let mut response = upload_response("Paper A", "S");
        response.metadata.tables = vec!["a*t1.png".to_string()];
        response.metadata.figures = vec!["a*f1.png".to_string(), "a*f2.png".to_string()];
        service.push_upload(Reply::Ok(response));
        let panel = panel_with(service);

        panel.submit_upload(pdf("a.pdf")).await.unwrap();
        assert!(panel.view().await.menu_images().is_empty());

        panel.toggle_dropdown_menu(1).await;
        assert_eq!(panel.view().await.menu_images().len(), 2);

        panel.toggle_dropdown_menu(0).await;
        assert_eq!(panel.view().await.menu_images(), ["a*t1.png".to_string()]);
    }
}

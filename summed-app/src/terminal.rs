use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use summed_client::{
    ChatWidget, ClientConfig, DocumentService, HttpDocumentService, ImageAsset, ImageCanvas,
    NavBar, UploadFile, UploadPanel,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::command::{self, CanvasCommand, Command, HELP};
use crate::view;

pub enum Flow {
    Continue,
    Quit,
}

/// One terminal session: every component of the page, driven by typed commands
pub struct Terminal {
    service: Arc<HttpDocumentService>,
    panel: Arc<UploadPanel>,
    chat: ChatWidget,
    canvas: ImageCanvas,
    nav: NavBar,
}

impl Terminal {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let service = Arc::new(
            HttpDocumentService::new(config)
                .context("Failed to set up the document service client")?,
        );
        let panel = Arc::new(UploadPanel::new(service.clone(), config));
        let chat = ChatWidget::new(service.clone());

        Ok(Self {
            service,
            panel,
            chat,
            canvas: ImageCanvas::new(),
            nav: NavBar::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Using document service at {}", self.service.base_url());
        println!("{}", view::render_nav(&self.nav));
        for message in self.chat.transcript().await {
            println!("{}", view::render_message(&message));
        }
        println!("Type 'help' for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => println!("error: {:#}", e),
            }
            self.print_alerts().await;
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match command::parse(line)? {
            Command::Empty => {}
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => println!("{}", HELP),
            Command::Upload(path) => {
                self.upload(&path).await?;
            }
            Command::Docs => println!("{}", view::render_documents(&self.panel.view().await)),
            Command::Select(index) => {
                self.select(index).await?;
            }
            Command::Section(section) => {
                self.panel.toggle_accordion_section(section).await;
                println!("{}", view::render_panel(&self.panel.view().await));
            }
            Command::Menu(slot) => {
                self.panel.toggle_dropdown_menu(slot).await;
                println!("{}", view::render_panel(&self.panel.view().await));
            }
            Command::Show => println!("{}", view::render_panel(&self.panel.view().await)),
            Command::Image { name, dir } => self.download_image(&name, dir.as_deref()).await?,
            Command::Chat(text) => self.chat(&text).await,
            Command::Transcript => {
                for message in self.chat.transcript().await {
                    println!("{}", view::render_message(&message));
                }
            }
            Command::Canvas(action) => self.canvas(action).await?,
            Command::Nav(item) => {
                self.nav.click(item);
                println!("{}", view::render_nav(&self.nav));
            }
            Command::NavMenu => {
                self.nav.toggle_menu();
                println!("{}", view::render_nav(&self.nav));
            }
            Command::Status => {
                let status = self.panel.status().await;
                println!(
                    "uploading: {}  uploaded: {}  loading summary: {}",
                    status.is_uploading, status.is_upload_success, status.is_summary_loading
                );
            }
        }
        Ok(Flow::Continue)
    }

    /// Uploads run in the background so the prompt stays usable. The task
    /// prints its outcome, alerts included, as soon as the request settles.
    async fn upload(&self, path: &Path) -> Result<JoinHandle<Vec<String>>> {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let panel = Arc::clone(&self.panel);

        println!("Uploading file...");
        Ok(tokio::spawn(async move {
            let lines = match panel.on_drop(vec![file]).await {
                Some(Ok(document)) => {
                    vec![format!("File uploaded successfully! '{}'", document.title)]
                }
                Some(Err(_)) => alert_lines(&panel).await,
                None => Vec::new(),
            };
            print_lines(&lines);
            lines
        }))
    }

    async fn select(&self, index: usize) -> Result<JoinHandle<Vec<String>>> {
        let document = self
            .panel
            .documents()
            .await
            .get(index)
            .cloned()
            .ok_or(summed_client::ClientError::DocumentNotFound(index))?;
        let panel = Arc::clone(&self.panel);

        println!("Loading summary for '{}'...", document.title);
        Ok(tokio::spawn(async move {
            let lines = match panel.select_document(index).await {
                Ok(_) => vec![format!("Summary for '{}' is ready, type 'show'", document.title)],
                Err(_) => alert_lines(&panel).await,
            };
            print_lines(&lines);
            lines
        }))
    }

    async fn download_image(&self, name: &str, dir: Option<&Path>) -> Result<()> {
        let asset = ImageAsset::parse(name)?;
        let bytes = self.service.fetch_image(&asset.name).await?;

        let dir = dir.unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(&asset.file);
        tokio::fs::write(&target, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;

        println!(
            "Saved {} ({} bytes) from {}",
            target.display(),
            bytes.len(),
            self.service.image_url(&asset.name)
        );
        Ok(())
    }

    async fn chat(&self, text: &str) {
        let before = self.chat.transcript().await.len();
        self.chat.send_message(text).await;

        for message in self.chat.transcript().await.iter().skip(before) {
            println!("{}", view::render_message(message));
        }
        if let Some(e) = self.chat.last_error().await {
            error!("Last chat message got no reply: {}", e);
        }
    }

    async fn canvas(&mut self, action: CanvasCommand) -> Result<()> {
        match action {
            CanvasCommand::Load(path) => {
                self.canvas
                    .load_image_file(&path)
                    .await
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                let (width, height) = self.canvas.dimensions();
                println!("Canvas is now {}x{}", width, height);
            }
            CanvasCommand::Text(text) => self.canvas.set_text(text),
            CanvasCommand::Draw => {
                self.canvas.overlay_text();
                println!("{} overlay(s) drawn", self.canvas.overlays().len());
            }
            CanvasCommand::Save(path) => {
                self.canvas.save_png(&path).await?;
                println!("Saved {}", path.display());
            }
            CanvasCommand::Info => {
                let (width, height) = self.canvas.dimensions();
                println!(
                    "{}x{}, text buffer: '{}', overlays: {:?}",
                    width,
                    height,
                    self.canvas.text(),
                    self.canvas.overlays()
                );
            }
        }
        Ok(())
    }

    async fn print_alerts(&self) {
        print_lines(&alert_lines(&self.panel).await);
    }
}

async fn alert_lines(panel: &UploadPanel) -> Vec<String> {
    panel
        .take_alerts()
        .await
        .into_iter()
        .map(|alert| format!("!! {}", alert))
        .collect()
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

use std::fmt::Write as _;

use summed_client::{
    AccordionSection, ChatMessage, ExtractedMetadata, NavBar, NavItem, PanelView, ResourceMenu,
    Sender, upload_panel::EMPTY_DOCUMENTS_PLACEHOLDER,
};

pub fn render_nav(nav: &NavBar) -> String {
    let items: Vec<String> = NavItem::NAV
        .into_iter()
        .chain(NavItem::AUTH)
        .map(|item| {
            if nav.is_active(item) {
                format!("[{}]", item.label())
            } else {
                item.label().to_string()
            }
        })
        .collect();

    let menu = if nav.is_menu_open() { " (menu open)" } else { "" };
    format!("Summed | {}{}", items.join("  "), menu)
}

pub fn render_documents(view: &PanelView) -> String {
    if view.documents.is_empty() {
        return EMPTY_DOCUMENTS_PLACEHOLDER.to_string();
    }

    let mut out = String::new();
    for (i, document) in view.documents.iter().enumerate() {
        let marker = if view.selected == Some(i) { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {}. {} ({})",
            marker,
            i + 1,
            document.title,
            document.source_file_name
        );
    }
    out.trim_end().to_string()
}

pub fn render_panel(view: &PanelView) -> String {
    let mut out = String::new();

    if view.status.is_uploading {
        out.push_str("Uploading file...\n");
    }
    if view.status.is_upload_success {
        out.push_str("File uploaded successfully!\n");
    }

    for section in AccordionSection::ALL {
        let open = view.open_section == Some(section);
        let _ = writeln!(out, "{} {}", if open { 'v' } else { '>' }, section.label());
        if open {
            let body = match &view.metadata {
                Some(metadata) => section_body(section, metadata, view.show_images()),
                None if view.status.is_summary_loading => "Loading...".to_string(),
                None => "Nothing to show yet".to_string(),
            };
            for line in body.lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
    }

    out.push_str("Extracted Resources\n");
    for menu in [ResourceMenu::Tables, ResourceMenu::Figures] {
        let _ = writeln!(out, "  [{}]", menu.label());
        if view.visible_menu == Some(menu) {
            for name in view.menu_images() {
                let _ = writeln!(out, "    - {}", name);
            }
        }
    }

    out.trim_end().to_string()
}

fn section_body(
    section: AccordionSection,
    metadata: &ExtractedMetadata,
    show_images: bool,
) -> String {
    let list = |names: &[String]| {
        if !show_images {
            "Loading...".to_string()
        } else if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join("\n")
        }
    };

    match section {
        AccordionSection::KeyConcepts => metadata.key_concepts.clone(),
        AccordionSection::Highlights => metadata.highlights.clone(),
        AccordionSection::Summary => metadata.summary.clone(),
        AccordionSection::Limitations => metadata.limitations.clone(),
        AccordionSection::Authors => metadata.authors.clone(),
        AccordionSection::Tables => list(&metadata.tables),
        AccordionSection::Figures => list(&metadata.figures),
        AccordionSection::References => "(not provided by the service)".to_string(),
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    format!("[{}] {}: {}", message.sent_at.format("%H:%M:%S"), who, message.text)
}

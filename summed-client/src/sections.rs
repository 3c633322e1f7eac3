use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// One collapsible category of extracted metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccordionSection {
    KeyConcepts,
    Highlights,
    Summary,
    Tables,
    Figures,
    Limitations,
    References,
    Authors,
}

impl AccordionSection {
    pub const ALL: [AccordionSection; 8] = [
        AccordionSection::KeyConcepts,
        AccordionSection::Highlights,
        AccordionSection::Summary,
        AccordionSection::Tables,
        AccordionSection::Figures,
        AccordionSection::Limitations,
        AccordionSection::References,
        AccordionSection::Authors,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccordionSection::KeyConcepts => "Key Concepts",
            AccordionSection::Highlights => "Highlights",
            AccordionSection::Summary => "Summary",
            AccordionSection::Tables => "Tables",
            AccordionSection::Figures => "Figures",
            AccordionSection::Limitations => "Limitations",
            AccordionSection::References => "References",
            AccordionSection::Authors => "Authors",
        }
    }
}

impl fmt::Display for AccordionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccordionSection {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        AccordionSection::ALL
            .into_iter()
            .find(|section| section.label().replace(' ', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown section '{}'", s)))
    }
}

/// Single-open accordion: at most one section is expanded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accordion {
    open: Option<AccordionSection>,
}

impl Accordion {
    /// Clicking the open section closes it; clicking any other opens it alone
    pub fn toggle(&mut self, section: AccordionSection) {
        self.open = if self.open == Some(section) {
            None
        } else {
            Some(section)
        };
    }

    pub fn open_section(&self) -> Option<AccordionSection> {
        self.open
    }

    pub fn is_open(&self, section: AccordionSection) -> bool {
        self.open == Some(section)
    }
}

/// A menu listing extracted images of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMenu {
    Tables,
    Figures,
}

impl ResourceMenu {
    /// Number of menu slots. Slot 2 is reserved and never shows anything.
    pub const SLOTS: usize = 3;

    pub fn from_slot(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(ResourceMenu::Tables),
            1 => Some(ResourceMenu::Figures),
            _ => None,
        }
    }

    pub fn slot(&self) -> usize {
        match self {
            ResourceMenu::Tables => 0,
            ResourceMenu::Figures => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceMenu::Tables => "Tables",
            ResourceMenu::Figures => "Figures",
        }
    }
}

impl FromStr for ResourceMenu {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tables" | "table" => Ok(ResourceMenu::Tables),
            "figures" | "figure" => Ok(ResourceMenu::Figures),
            other => Err(ClientError::InvalidInput(format!("unknown menu '{}'", other))),
        }
    }
}

/// Exclusive dropdown selection over the fixed menu slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropdownMenus {
    selected: Option<usize>,
}

impl DropdownMenus {
    /// Select exactly one slot and close the rest. Selecting an open slot keeps it open.
    pub fn toggle(&mut self, slot: usize) {
        self.selected = if slot < ResourceMenu::SLOTS {
            Some(slot)
        } else {
            None
        };
    }

    pub fn visible(&self) -> Option<ResourceMenu> {
        self.selected.and_then(ResourceMenu::from_slot)
    }

    pub fn is_visible(&self, menu: ResourceMenu) -> bool {
        self.visible() == Some(menu)
    }
}

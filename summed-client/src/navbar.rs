use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavItem {
    Home,
    Presentations,
    AboutUs,
    Login,
    SignUp,
}

impl NavItem {
    pub const NAV: [NavItem; 3] = [NavItem::Home, NavItem::Presentations, NavItem::AboutUs];
    pub const AUTH: [NavItem; 2] = [NavItem::Login, NavItem::SignUp];

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::Presentations => "Presentations",
            NavItem::AboutUs => "About Us",
            NavItem::Login => "Login",
            NavItem::SignUp => "Sign up",
        }
    }

    pub fn is_auth(&self) -> bool {
        Self::AUTH.contains(self)
    }
}

impl fmt::Display for NavItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NavItem {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace([' ', '-', '_'], "").to_ascii_lowercase();
        Self::NAV
            .into_iter()
            .chain(Self::AUTH)
            .find(|item| item.label().replace(' ', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown nav item '{}'", s)))
    }
}

/// Which item is highlighted, and whether the mobile menu is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavBar {
    active: NavItem,
    menu_open: bool,
}

impl Default for NavBar {
    fn default() -> Self {
        Self {
            active: NavItem::Home,
            menu_open: false,
        }
    }
}

impl NavBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `item` and close the mobile menu
    pub fn click(&mut self, item: NavItem) {
        self.active = item;
        self.menu_open = false;
    }

    pub fn active(&self) -> NavItem {
        self.active
    }

    pub fn is_active(&self, item: NavItem) -> bool {
        self.active == item
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn open_menu(&mut self) {
        self.menu_open = true;
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }
}

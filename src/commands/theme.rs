//! Colour theme for the terminal view
//!
//! The preference is the persisted `darkMode` flag. It only changes which
//! colours the view uses.

use crate::cli::ThemeMode;
use crate::error::Result;
use crate::storage::{dark_mode, set_dark_mode, KeyValueStore};
use colored::{ColoredString, Colorize};

/// Colours used by the terminal view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    dark: bool,
}

impl Palette {
    /// Palette for the given preference
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    /// Palette matching the stored preference
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::new(dark_mode(store))
    }

    /// Persist this palette as the preference
    pub fn save(self, store: &dyn KeyValueStore) -> Result<()> {
        set_dark_mode(store, self.dark)
    }

    /// Whether this is the dark palette
    pub fn is_dark(self) -> bool {
        self.dark
    }

    /// The other palette
    pub fn toggled(self) -> Self {
        Self::new(!self.dark)
    }

    /// "dark" or "light"
    pub fn name(self) -> &'static str {
        if self.dark {
            "dark"
        } else {
            "light"
        }
    }

    /// Highlight for prompts, positions, and URLs
    pub fn accent(self, text: &str) -> ColoredString {
        if self.dark {
            text.cyan()
        } else {
            text.blue()
        }
    }

    /// Secondary text such as hints
    pub fn muted(self, text: &str) -> ColoredString {
        if self.dark {
            text.bright_black()
        } else {
            text.dimmed()
        }
    }

    /// Section headings
    pub fn heading(self, text: &str) -> ColoredString {
        self.accent(text).bold()
    }

    /// The readline prompt
    pub fn prompt(self) -> String {
        format!("{} ", self.accent("ask>").bold())
    }
}

/// Handle `askverse theme [dark|light]`
///
/// Prints the current theme when `mode` is `None`, otherwise stores it.
pub fn handle_theme(store: &dyn KeyValueStore, mode: Option<ThemeMode>) -> Result<()> {
    match mode {
        None => {
            let palette = Palette::load(store);
            println!("Current theme: {}", palette.accent(palette.name()));
        }
        Some(mode) => {
            let palette = Palette::new(mode.is_dark());
            palette.save(store)?;
            tracing::debug!(theme = palette.name(), "Theme saved");
            println!("Theme set to {}", palette.accent(palette.name()));
        }
    }
    Ok(())
}

//! Demo configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in defaults matching the 21-item demo list
//! 2. **Configuration file** – `.smartlist.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `SMARTLIST_ITEM_HEIGHT`,
//!    `SMARTLIST_SCROLL_OFFSET`, and so on
//! 4. **Command-line arguments** – `--item-height`, `--scroll-offset`, ...
//!
//! # Configuration File
//!
//! ```toml
//! item_height = 24
//! page_size = 3
//! item_count = 21
//! viewport_height = 300
//! scroll_offset = 500
//! append_count = 1
//! retain_pages = 12
//! ```

use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::cache::EvictionPolicy;
use crate::error::SmartListError;
use crate::geometry::DEFAULT_MAX_ELEMENT_HEIGHT;
use crate::viewport::{InitialLoad, Viewport, ViewportOptions};
use crate::window::DEFAULT_LOOKAHEAD_PAGES;

const DEFAULT_ITEM_HEIGHT: u32 = 24;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 300;
const DEFAULT_VIEWPORT_WIDTH: u32 = 600;
const DEFAULT_PAGE_SIZE: usize = 3;
const DEFAULT_ITEM_COUNT: usize = 21;

/// Settings for the `smartlist` demo binary.
///
/// # Environment Variables
///
/// Every field can be set with its upper-cased name prefixed by
/// `SMARTLIST_`, e.g. `SMARTLIST_PAGE_SIZE=5`. Boolean flags are only read
/// from the CLI and configuration files.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use smartlist::SmartListConfig;
///
/// let config = SmartListConfig::load().expect("failed to load configuration");
/// let options = config.viewport_options().expect("invalid configuration");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "SMARTLIST",
    discovery(
        dotfile_name = ".smartlist.toml",
        config_file_name = "smartlist.toml",
        app_name = "smartlist"
    )
)]
pub struct SmartListConfig {
    /// Fixed height of every item, in pixels.
    #[ortho_config()]
    pub item_height: u32,

    /// Pages kept on each side of the visible pages.
    #[ortho_config(cli_short = 'l')]
    pub lookahead_page_count: usize,

    /// Ceiling for a single filler block, in pixels.
    #[ortho_config()]
    pub max_element_height: u64,

    /// Viewport height, in pixels.
    #[ortho_config()]
    pub viewport_height: u32,

    /// Viewport width, in pixels.
    #[ortho_config()]
    pub viewport_width: u32,

    /// Items per page served by the demo source.
    #[ortho_config(cli_short = 'p')]
    pub page_size: usize,

    /// Number of items the demo source starts with.
    #[ortho_config(cli_short = 'n')]
    pub item_count: usize,

    /// Scroll offset applied after initialisation, in pixels.
    #[ortho_config(cli_short = 's')]
    pub scroll_offset: i64,

    /// Items appended to the source after scrolling.
    #[ortho_config(cli_short = 'a')]
    pub append_count: usize,

    /// Keeps up to this many pages resident instead of only the window.
    #[ortho_config()]
    pub retain_pages: Option<usize>,

    /// Loads only the visible window on start-up instead of every page.
    #[ortho_config()]
    pub visible_window_only: bool,

    /// Prints the render model as JSON.
    #[ortho_config(cli_short = 'j')]
    pub json: bool,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for SmartListConfig {
    fn default() -> Self {
        Self {
            item_height: DEFAULT_ITEM_HEIGHT,
            lookahead_page_count: DEFAULT_LOOKAHEAD_PAGES,
            max_element_height: DEFAULT_MAX_ELEMENT_HEIGHT.get(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            page_size: DEFAULT_PAGE_SIZE,
            item_count: DEFAULT_ITEM_COUNT,
            scroll_offset: 0,
            append_count: 0,
            retain_pages: None,
            visible_window_only: false,
            json: false,
            telemetry: false,
        }
    }
}

impl SmartListConfig {
    /// Checks that every size the engine divides by is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`SmartListError::Configuration`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), SmartListError> {
        self.viewport_options()?;
        self.page_size()?;
        Ok(())
    }

    /// Builds controller options from the configured values.
    ///
    /// # Errors
    ///
    /// Returns [`SmartListError::Configuration`] when the item height or
    /// maximum element height is zero.
    pub fn viewport_options(&self) -> Result<ViewportOptions, SmartListError> {
        let item_height = NonZeroU32::new(self.item_height)
            .ok_or_else(|| invalid("item_height must be greater than zero"))?;
        let max_element_height = NonZeroU64::new(self.max_element_height)
            .ok_or_else(|| invalid("max_element_height must be greater than zero"))?;

        let eviction = self
            .retain_pages
            .map_or(EvictionPolicy::WindowOnly, |max_pages| {
                EvictionPolicy::Retain { max_pages }
            });
        let initial_load = if self.visible_window_only {
            InitialLoad::VisibleWindow
        } else {
            InitialLoad::FullRange
        };

        Ok(ViewportOptions::new(item_height)
            .with_lookahead(self.lookahead_page_count)
            .with_max_element_height(max_element_height)
            .with_eviction(eviction)
            .with_initial_load(initial_load))
    }

    /// Returns the demo source's page size.
    ///
    /// # Errors
    ///
    /// Returns [`SmartListError::Configuration`] when the page size is zero.
    pub fn page_size(&self) -> Result<NonZeroUsize, SmartListError> {
        NonZeroUsize::new(self.page_size)
            .ok_or_else(|| invalid("page_size must be greater than zero"))
    }

    /// Returns the configured viewport, scrolled to `scroll_offset`.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: self.scroll_offset,
            height: self.viewport_height,
            width: self.viewport_width,
        }
    }
}

fn invalid(message: &str) -> SmartListError {
    SmartListError::Configuration {
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests;

//! Tag color assignment.
//!
//! # Responsibility
//! - Own the persisted tag-name -> color map.
//! - Assign palette colors lazily the first time a tag name is seen.
//!
//! # Invariants
//! - Map keys are `normalize_name` keys.
//! - `color_for` always yields a color; a missing entry is assigned on demand.
//! - Writes are skipped when nothing changed.
//! - Store failures are logged and swallowed; the in-memory map stays
//!   authoritative.

use crate::model::tag::{normalize_name, ColorId};
use crate::repo::library_store::{ColorMap, LibraryStore};
use log::{debug, error, warn};
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Named palette entry offered to color pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorOption {
    pub name: String,
    pub color: ColorId,
}

impl ColorOption {
    pub fn new(name: impl Into<String>, color: ColorId) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Palette construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    Empty,
}

impl Display for PaletteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tag color palette must contain at least one color"),
        }
    }
}

impl Error for PaletteError {}

/// Fixed, ordered, non-empty list of tag colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    options: Vec<ColorOption>,
}

impl ColorPalette {
    pub fn new(options: Vec<ColorOption>) -> Result<Self, PaletteError> {
        if options.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &[ColorOption] {
        &self.options
    }

    fn random_color(&self) -> ColorId {
        let index = rand::thread_rng().gen_range(0..self.options.len());
        self.options[index].color
    }

    fn first_color(&self) -> ColorId {
        self.options[0].color
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        let names = [
            "Red", "Orange", "Yellow", "Green", "Teal", "Blue", "Indigo", "Purple", "Pink", "Gray",
        ];
        Self {
            options: names
                .iter()
                .zip(0..)
                .map(|(name, color)| ColorOption::new(*name, color))
                .collect(),
        }
    }
}

/// Owner of the persisted color map.
pub struct ColorAssigner {
    palette: ColorPalette,
    colors: ColorMap,
    store: Rc<dyn LibraryStore>,
}

impl ColorAssigner {
    /// Loads the color map from `store`; a failed load starts from an empty map.
    pub fn load(palette: ColorPalette, store: Rc<dyn LibraryStore>) -> Self {
        let loaded = match store.load_color_map() {
            Ok(colors) => colors,
            Err(err) => {
                error!("event=color_map_load module=color status=error error={err}");
                ColorMap::new()
            }
        };

        // Older documents may carry case-variant keys; fold them, first wins.
        let mut colors = ColorMap::new();
        for (name, color) in loaded {
            let key = normalize_name(&name);
            if !key.is_empty() {
                colors.entry(key).or_insert(color);
            }
        }

        Self {
            palette,
            colors,
            store,
        }
    }

    /// Returns the color for `name`, assigning a random palette color if absent.
    ///
    /// A name that trims to empty gets the first palette color and is not stored.
    pub fn color_for(&mut self, name: &str) -> ColorId {
        let key = normalize_name(name);
        if key.is_empty() {
            return self.palette.first_color();
        }
        if let Some(color) = self.colors.get(&key) {
            return *color;
        }

        let color = self.palette.random_color();
        debug!("event=color_assign module=color status=ok color={color}");
        self.colors.insert(key, color);
        self.persist();
        color
    }

    /// Returns the stored color without assigning one.
    pub fn peek_color(&self, name: &str) -> Option<ColorId> {
        self.colors.get(&normalize_name(name)).copied()
    }

    /// Overwrites the color for `name`. Blank names are ignored.
    pub fn set_color(&mut self, name: &str, color: ColorId) {
        let key = normalize_name(name);
        if key.is_empty() {
            return;
        }
        if !self.palette.options().iter().any(|option| option.color == color) {
            warn!("event=color_set module=color status=warn reason=off_palette color={color}");
        }
        if self.colors.insert(key, color) != Some(color) {
            self.persist();
        }
    }

    /// Drops every entry whose key is not among `used_names`.
    ///
    /// Returns the number of removed entries.
    pub fn cleanup_unused<I, S>(&mut self, used_names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let used: HashSet<String> = used_names
            .into_iter()
            .map(|name| normalize_name(name.as_ref()))
            .collect();
        let before = self.colors.len();
        self.colors.retain(|key, _| used.contains(key));
        let removed = before - self.colors.len();
        if removed > 0 {
            debug!("event=color_cleanup module=color status=ok removed={removed}");
            self.persist();
        }
        removed
    }

    pub fn available_colors(&self) -> &[ColorOption] {
        self.palette.options()
    }

    fn persist(&self) {
        if let Err(err) = self.store.save_color_map(&self.colors) {
            error!(
                "event=color_map_save module=color status=error entries={} error={err}",
                self.colors.len()
            );
        }
    }
}

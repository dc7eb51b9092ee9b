//! Response types for workspace operations.
//!
//! Every response carries the image [`Counts`] next to its payload. The
//! types serialize to JSON for programmatic use and implement `Display`
//! for terminal output.

use serde::Serialize;
use std::fmt;

use crate::query::{Counts, LabelCount, Page};

/// A schema label with its display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelOption {
    pub label: String,
    pub display: String,
}

/// The next image to label, or none when everything is labeled.
#[derive(Clone, Debug, Serialize)]
pub struct NextView {
    pub counts: Counts,
    pub item: Option<String>,
    pub choices: Vec<LabelOption>,
}

/// One image in a labeled listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabeledItem {
    pub path: String,
    pub labels: Vec<String>,
}

/// A page of labeled images, optionally filtered by label.
#[derive(Clone, Debug, Serialize)]
pub struct LabeledPage {
    pub counts: Counts,
    /// Labels the listing was filtered by; empty means unfiltered.
    pub selected: Vec<String>,
    /// Images matching the filter, across all pages.
    pub found: usize,
    pub page: Page<LabeledItem>,
    /// Per-label counts over all labeled images, most common first.
    pub label_counts: Vec<LabelCount>,
    pub display: Vec<LabelOption>,
}

/// A page of unlabeled images in catalog order.
#[derive(Clone, Debug, Serialize)]
pub struct UnlabeledPage {
    pub counts: Counts,
    pub page: Page<String>,
}

/// A single image with its current labels, for editing.
#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub counts: Counts,
    pub path: String,
    pub labels: Vec<String>,
    pub choices: Vec<LabelOption>,
}

/// Per-label usage in schema order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelUsage {
    pub label: String,
    pub display: String,
    pub count: usize,
}

/// Summary of the annotation state.
#[derive(Clone, Debug, Serialize)]
pub struct StatsView {
    pub counts: Counts,
    pub missed: usize,
    pub labels: Vec<LabelUsage>,
    /// Labels found in the annotation but absent from the schema.
    pub unknown_labels: Vec<LabelCount>,
}

/// Raw image bytes with dimensions when the header could be read.
#[derive(Clone, Debug, Serialize)]
pub struct ImagePayload {
    pub path: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size: usize,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

fn fmt_counts(f: &mut fmt::Formatter<'_>, counts: &Counts) -> fmt::Result {
    writeln!(
        f,
        "Images: {} total, {} labeled, {} unlabeled",
        counts.total, counts.labeled, counts.unlabeled
    )
}

fn fmt_page_footer<T>(f: &mut fmt::Formatter<'_>, page: &Page<T>) -> fmt::Result {
    writeln!(
        f,
        "Page {}/{} ({} per page)",
        page.page, page.max_page, page.per_page
    )
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, self)
    }
}

impl fmt::Display for NextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, &self.counts)?;
        match &self.item {
            Some(item) => {
                writeln!(f, "Next: {}", item)?;
                let names: Vec<&str> = self.choices.iter().map(|c| c.display.as_str()).collect();
                writeln!(f, "Labels: {}", names.join(", "))
            }
            None => writeln!(f, "All images are labeled"),
        }
    }
}

impl fmt::Display for LabeledPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, &self.counts)?;
        if !self.selected.is_empty() {
            writeln!(f, "Filter: {}", self.selected.join(", "))?;
        }
        writeln!(f, "Found: {}", self.found)?;
        writeln!(f)?;
        for item in &self.page.items {
            writeln!(f, "  {}  [{}]", item.path, item.labels.join(", "))?;
        }
        if !self.page.items.is_empty() {
            writeln!(f)?;
        }
        fmt_page_footer(f, &self.page)
    }
}

impl fmt::Display for UnlabeledPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, &self.counts)?;
        writeln!(f)?;
        for path in &self.page.items {
            writeln!(f, "  {}", path)?;
        }
        if !self.page.items.is_empty() {
            writeln!(f)?;
        }
        fmt_page_footer(f, &self.page)
    }
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, &self.counts)?;
        writeln!(f, "Image: {}", self.path)?;
        for choice in &self.choices {
            let mark = if self.labels.contains(&choice.label) {
                "x"
            } else {
                " "
            };
            writeln!(f, "  [{}] {}", mark, choice.display)?;
        }
        Ok(())
    }
}

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_counts(f, &self.counts)?;
        writeln!(f, "Missed: {}", self.missed)?;
        writeln!(f)?;

        let width = self
            .labels
            .iter()
            .map(|usage| usage.display.chars().count())
            .max()
            .unwrap_or(0);
        for usage in &self.labels {
            writeln!(f, "  {:<width$}  {:>6}", usage.display, usage.count)?;
        }

        if !self.unknown_labels.is_empty() {
            writeln!(f)?;
            writeln!(f, "Not in schema:")?;
            for entry in &self.unknown_labels {
                writeln!(f, "  {}  {}", entry.label, entry.count)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image: {}", self.path)?;
        writeln!(f, "Size: {} bytes", self.size)?;
        match (self.width, self.height) {
            (Some(width), Some(height)) => writeln!(f, "Dimensions: {}x{}", width, height),
            _ => writeln!(f, "Dimensions: unknown"),
        }
    }
}

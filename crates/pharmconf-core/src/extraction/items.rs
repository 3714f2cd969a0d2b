//! Attended item extraction.

use tracing::{debug, trace};

use super::patterns::ITEM_LINE;
use super::LineExtractor;
use crate::models::order::LineItem;

/// Items found in the attended section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemScan {
    /// Items in order of appearance.
    pub items: Vec<LineItem>,
    /// Lines inside the section that did not match the item pattern.
    pub skipped_lines: usize,
    /// Whether the start marker was seen at all.
    pub section_found: bool,
}

/// Extracts line items between the section markers.
pub struct ItemExtractor {
    start_marker: String,
    end_marker: String,
}

impl ItemExtractor {
    pub fn new(start_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            start_marker: start_marker.into(),
            end_marker: end_marker.into(),
        }
    }

    /// Walk the line stream, capturing items only inside the attended section.
    pub fn scan<'a, I>(&self, lines: I) -> ItemScan
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut scan = ItemScan::default();
        let mut capturing = false;

        for line in lines {
            let line = line.trim();

            if line.starts_with(&self.start_marker) {
                debug!("Entering attended items section");
                capturing = true;
                scan.section_found = true;
                continue;
            }
            if line.starts_with(&self.end_marker) {
                debug!("Leaving attended items section");
                capturing = false;
                continue;
            }
            if !capturing {
                continue;
            }

            match self.extract_line(line) {
                Some(item) => scan.items.push(item),
                None => {
                    trace!("Skipping line in items section: {:?}", line);
                    scan.skipped_lines += 1;
                }
            }
        }

        scan
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new("ITENS ATENDIDOS", "ITENS NÃO ATENDIDOS")
    }
}

impl LineExtractor for ItemExtractor {
    type Output = LineItem;

    fn extract_line(&self, line: &str) -> Option<LineItem> {
        let caps = ITEM_LINE.captures(line.trim())?;

        Some(LineItem {
            sequence: caps[1].parse().ok()?,
            active_ingredient_code: caps[2].parse().ok()?,
            name: caps[3].trim().to_string(),
            batch_lot: caps[4].to_string(),
            unit: caps[5].to_string(),
            quantity_requested: caps[6].parse().ok()?,
            quantity_available: String::new(),
        })
    }
}

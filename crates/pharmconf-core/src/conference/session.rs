//! Cursor-based review session over an order.

use serde::Serialize;
use tracing::debug;

use super::classification::{classify, Classification, ClassificationCounts};
use crate::error::SessionError;
use crate::models::order::{LineItem, Order};

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Review progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Zero-based cursor position.
    pub position: usize,
    /// Number of items in the order.
    pub total: usize,
    /// `floor((position + 1) / total * 100)`.
    pub progress_percent: u8,
}

impl Summary {
    /// Progress caption, e.g. `"3 de 10"`.
    pub fn label(&self) -> String {
        format!("{} de {}", self.position + 1, self.total)
    }
}

/// A conference in progress.
///
/// Owns the order and the cursor. Only one session mutates an order, and
/// the position always stays within `0..order.len()`.
#[derive(Debug, Clone)]
pub struct ConferenceSession {
    order: Order,
    position: usize,
}

impl ConferenceSession {
    /// Start reviewing at the first item.
    ///
    /// Fails with [`SessionError::NothingLoaded`] when the order is empty.
    pub fn start(order: Order) -> Result<Self> {
        if order.is_empty() {
            return Err(SessionError::NothingLoaded);
        }
        debug!("Starting conference of {} items", order.len());
        Ok(Self { order, position: 0 })
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// The item under the cursor.
    pub fn current(&self) -> &LineItem {
        &self.order.items[self.position]
    }

    /// Classification of the item under the cursor.
    pub fn current_classification(&self) -> Classification {
        classify(self.current())
    }

    /// Store the operator's text for an item, verbatim.
    pub fn set_available(&mut self, position: usize, text: impl Into<String>) -> Result<()> {
        let total = self.total();
        let item = self
            .order
            .items
            .get_mut(position)
            .ok_or(SessionError::PositionOutOfRange { position, total })?;
        item.quantity_available = text.into();
        debug!("Item {} available quantity set to {:?}", position, item.quantity_available);
        Ok(())
    }

    /// Store the operator's text for the item under the cursor.
    pub fn set_current_available(&mut self, text: impl Into<String>) {
        let item = &mut self.order.items[self.position];
        item.quantity_available = text.into();
    }

    /// Advance to the next item. No-op on the last item.
    ///
    /// Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.position + 1 < self.total() {
            self.position += 1;
            debug!("Cursor moved to {}", self.position);
            true
        } else {
            false
        }
    }

    /// Go back to the previous item. No-op on the first item.
    ///
    /// Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            debug!("Cursor moved to {}", self.position);
            true
        } else {
            false
        }
    }

    pub fn summary(&self) -> Summary {
        let total = self.total();
        Summary {
            position: self.position,
            total,
            progress_percent: ((self.position + 1) * 100 / total) as u8,
        }
    }

    /// Classification counts over the whole order.
    pub fn counts(&self) -> ClassificationCounts {
        ClassificationCounts::from_items(&self.order.items)
    }
}

//! Dispensing order data models.

use serde::{Deserialize, Serialize};

/// A dispensing order: header metadata plus the attended line items.
///
/// Created once per parsed document. After extraction the item list has a
/// fixed length and only [`LineItem::quantity_available`] changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order header information.
    pub header: OrderHeader,

    /// Attended items, in order of appearance.
    pub items: Vec<LineItem>,
}

impl Order {
    /// Create an order from a header and its items.
    pub fn new(header: OrderHeader, items: Vec<LineItem>) -> Self {
        Self { header, items }
    }

    /// Number of items in the order.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the order has nothing to review.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Header fields taken from the header signature line.
///
/// Every field is kept as the literal text found in the document; missing
/// fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    /// Numeric order identifier (seven or more digits).
    pub order_number: String,

    /// Requesting order code (tokens before the first hyphenated token).
    pub requester_code: String,

    /// Requesting unit name.
    pub requesting_unit: String,

    /// Requested stock / location name.
    pub requested_stock: String,

    /// `DD/MM/YYYY HH:MM:SS`, verbatim.
    pub timestamp: String,
}

impl OrderHeader {
    /// Report labels for the header fields, in their defined order.
    pub const LABELS: [&'static str; 5] = [
        "Número do Pedido",
        "Ped. Solicitante",
        "Unidade Solicitante",
        "Estoque Solicitado",
        "Data/Hora",
    ];

    /// Header fields paired with their report labels, in their defined order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (Self::LABELS[0], self.order_number.as_str()),
            (Self::LABELS[1], self.requester_code.as_str()),
            (Self::LABELS[2], self.requesting_unit.as_str()),
            (Self::LABELS[3], self.requested_stock.as_str()),
            (Self::LABELS[4], self.timestamp.as_str()),
        ]
    }
}

/// A single attended item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Ordinal number as printed (may repeat or skip).
    pub sequence: u64,

    /// Active ingredient code.
    pub active_ingredient_code: u64,

    /// Active ingredient / product description.
    pub name: String,

    /// Batch or lot code.
    pub batch_lot: String,

    /// Unit of measure.
    pub unit: String,

    /// Quantity to withdraw.
    pub quantity_requested: u64,

    /// Quantity the operator found, as typed. Empty until reviewed.
    #[serde(default)]
    pub quantity_available: String,
}

impl LineItem {
    /// Text shown in the report for the available quantity.
    pub fn available_display(&self) -> &str {
        match self.quantity_available.trim() {
            "" => "-",
            value => value,
        }
    }
}

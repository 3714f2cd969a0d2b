//! Per-item fulfillment classification.

use serde::{Deserialize, Serialize};

use crate::models::order::LineItem;

/// Fulfillment status of an item, derived from the operator's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Nothing entered yet, or the entry is not an integer.
    Unset,
    /// Nothing available.
    Zero,
    /// Less than requested.
    Partial,
    /// At least the requested quantity.
    Complete,
}

impl Classification {
    /// Short Portuguese label, as used in the report summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unset => "Pendente",
            Self::Zero => "Zerado",
            Self::Partial => "Parcial",
            Self::Complete => "Completo",
        }
    }
}

/// Classify an item from its available quantity.
///
/// This is the only place the available quantity text is parsed.
pub fn classify(item: &LineItem) -> Classification {
    // i128 covers every requested quantity and negative input alike.
    let Ok(available) = item.quantity_available.trim().parse::<i128>() else {
        return Classification::Unset;
    };

    if available == 0 {
        Classification::Zero
    } else if available < i128::from(item.quantity_requested) {
        Classification::Partial
    } else {
        Classification::Complete
    }
}

/// Aggregate classification counts for an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub complete: usize,
    pub partial: usize,
    pub zero: usize,
    pub unset: usize,
}

impl ClassificationCounts {
    /// Count classifications over a list of items.
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().map(classify).fold(Self::default(), |mut counts, class| {
            match class {
                Classification::Complete => counts.complete += 1,
                Classification::Partial => counts.partial += 1,
                Classification::Zero => counts.zero += 1,
                Classification::Unset => counts.unset += 1,
            }
            counts
        })
    }

    /// Total number of items counted.
    pub fn total(&self) -> usize {
        self.complete + self.partial + self.zero + self.unset
    }

    /// Number of items with a usable quantity.
    pub fn reviewed(&self) -> usize {
        self.complete + self.partial + self.zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(requested: u64, available: &str) -> LineItem {
        LineItem {
            sequence: 12,
            active_ingredient_code: 345,
            name: "AMOXICILINA 500MG".to_string(),
            batch_lot: "LT2024A".to_string(),
            unit: "CP".to_string(),
            quantity_requested: requested,
            quantity_available: available.to_string(),
        }
    }

    #[test]
    fn test_classify_example_values() {
        assert_eq!(classify(&item(100, "")), Classification::Unset);
        assert_eq!(classify(&item(100, "0")), Classification::Zero);
        assert_eq!(classify(&item(100, "50")), Classification::Partial);
        assert_eq!(classify(&item(100, "100")), Classification::Complete);
        assert_eq!(classify(&item(100, "150")), Classification::Complete);
    }

    #[test]
    fn test_classify_non_numeric_is_unset() {
        assert_eq!(classify(&item(10, "dez")), Classification::Unset);
        assert_eq!(classify(&item(10, "5.5")), Classification::Unset);
        assert_eq!(classify(&item(10, "   ")), Classification::Unset);
    }

    #[test]
    fn test_classify_trims_whitespace() {
        assert_eq!(classify(&item(10, " 10 ")), Classification::Complete);
    }

    #[test]
    fn test_classify_beyond_u32_range() {
        assert_eq!(classify(&item(5_000_000_000, "4999999999")), Classification::Partial);
        assert_eq!(classify(&item(5_000_000_000, "5000000000")), Classification::Complete);
    }

    #[test]
    fn test_classify_zero_requested() {
        assert_eq!(classify(&item(0, "0")), Classification::Zero);
        assert_eq!(classify(&item(0, "3")), Classification::Complete);
    }

    #[test]
    fn test_classify_is_total_over_small_grid() {
        for requested in 0..6u64 {
            for available in 0..8u64 {
                let class = classify(&item(requested, &available.to_string()));
                if available == 0 {
                    assert_eq!(class, Classification::Zero);
                } else if available >= requested {
                    assert_eq!(class, Classification::Complete);
                } else {
                    assert_eq!(class, Classification::Partial);
                }
            }
        }
    }

    #[test]
    fn test_counts_add_up() {
        let items = vec![item(10, ""), item(10, "0"), item(10, "4"), item(10, "10"), item(10, "x")];
        let counts = ClassificationCounts::from_items(&items);

        assert_eq!(counts.complete, 1);
        assert_eq!(counts.partial, 1);
        assert_eq!(counts.zero, 1);
        assert_eq!(counts.unset, 2);
        assert_eq!(counts.total(), items.len());
        assert_eq!(counts.reviewed(), 3);
    }
}

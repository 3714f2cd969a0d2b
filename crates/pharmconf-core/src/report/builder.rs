//! Report content: what goes on the audit document, before layout.

use chrono::NaiveDateTime;

use crate::conference::{classify, Classification, ClassificationCounts};
use crate::models::config::ReportConfig;
use crate::models::order::{LineItem, Order};

/// Item table column titles.
pub const TABLE_HEADERS: [&str; 6] = [
    "#",
    "Princípio Ativo",
    "Lote",
    "Und.",
    "Qtd. p/Retirar",
    "Qtd. Disponível",
];

/// Background color of an item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFill {
    White,
    Red,
    Orange,
    Green,
}

impl RowFill {
    pub fn for_classification(class: Classification) -> Self {
        match class {
            Classification::Unset => Self::White,
            Classification::Zero => Self::Red,
            Classification::Partial => Self::Orange,
            Classification::Complete => Self::Green,
        }
    }

    /// RGB components in `0.0..=1.0`.
    pub fn rgb(&self) -> [f32; 3] {
        match self {
            Self::White => [1.0, 1.0, 1.0],
            Self::Red => [1.0, 0.0, 0.0],
            Self::Orange => [1.0, 0.647, 0.0],
            Self::Green => [0.565, 0.933, 0.565],
        }
    }
}

/// One row of the item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub cells: [String; 6],
    pub classification: Classification,
    pub fill: RowFill,
}

impl ReportRow {
    fn from_item(item: &LineItem) -> Self {
        let classification = classify(item);
        Self {
            cells: [
                item.sequence.to_string(),
                item.name.clone(),
                item.batch_lot.clone(),
                item.unit.clone(),
                item.quantity_requested.to_string(),
                item.available_display().to_string(),
            ],
            classification,
            fill: RowFill::for_classification(classification),
        }
    }
}

/// Everything printed on the audit report.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    /// `(label, value)` for each header field, in their defined order.
    pub header_fields: Vec<(String, String)>,
    pub counts: ClassificationCounts,
    pub rows: Vec<ReportRow>,
    /// One signature line per entry.
    pub signatures: Vec<String>,
    /// Stamped into the PDF metadata when present.
    pub generated_at: Option<NaiveDateTime>,
}

impl ReportDocument {
    pub fn total_items(&self) -> usize {
        self.rows.len()
    }

    /// Summary block lines, in print order.
    pub fn summary_lines(&self) -> [(&'static str, usize); 4] {
        [
            ("Total de Itens", self.total_items()),
            ("Completos", self.counts.complete),
            ("Parciais", self.counts.partial),
            ("Zerados", self.counts.zero),
        ]
    }

    /// Signature line text, e.g. `"Assinatura do Conferente: ____"`.
    pub fn signature_lines(&self) -> Vec<String> {
        self.signatures
            .iter()
            .map(|who| format!("Assinatura do {}: _____________________________________", who))
            .collect()
    }

    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }
}

/// Collect the report content for an order. Read-only over the order.
pub fn build_report(order: &Order, config: &ReportConfig) -> ReportDocument {
    ReportDocument {
        title: config.title.clone(),
        header_fields: order
            .header
            .fields()
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect(),
        counts: ClassificationCounts::from_items(&order.items),
        rows: order.items.iter().map(ReportRow::from_item).collect(),
        signatures: config.signatures.clone(),
        generated_at: None,
    }
}

/// Plain-text listing of the whole conference, one block per item.
pub fn render_text_review(order: &Order) -> String {
    let mut output = String::new();

    for (i, item) in order.items.iter().enumerate() {
        let available = match item.available_display() {
            "-" => "—",
            value => value,
        };
        output.push_str(&format!("{}. {}\n", i + 1, item.name));
        output.push_str(&format!("   Lote: {} | Und.: {}\n", item.batch_lot, item.unit));
        output.push_str(&format!(
            "   Solicitado: {} | Disponível: {} [{}]\n",
            item.quantity_requested,
            available,
            classify(item).label()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderHeader;
    use pretty_assertions::assert_eq;

    fn item(sequence: u64, requested: u64, available: &str) -> LineItem {
        LineItem {
            sequence,
            active_ingredient_code: 1,
            name: format!("MEDICAMENTO {}", sequence),
            batch_lot: "LT1".to_string(),
            unit: "CP".to_string(),
            quantity_requested: requested,
            quantity_available: available.to_string(),
        }
    }

    fn sample_order() -> Order {
        Order::new(
            OrderHeader {
                order_number: "1234567".to_string(),
                requester_code: "12".to_string(),
                requesting_unit: "12 UTI-1".to_string(),
                requested_stock: "CAF".to_string(),
                timestamp: "01/02/2024 08:00:00".to_string(),
            },
            vec![
                item(1, 10, ""),
                item(2, 10, "0"),
                item(3, 10, "5"),
                item(4, 10, "10"),
                item(5, 10, "n/d"),
            ],
        )
    }

    #[test]
    fn test_rows_and_fills() {
        let report = build_report(&sample_order(), &ReportConfig::default());
        let fills: Vec<RowFill> = report.rows.iter().map(|r| r.fill).collect();

        assert_eq!(
            fills,
            vec![RowFill::White, RowFill::Red, RowFill::Orange, RowFill::Green, RowFill::White]
        );
        assert_eq!(
            report.rows[0].cells,
            ["1", "MEDICAMENTO 1", "LT1", "CP", "10", "-"].map(String::from)
        );
        assert_eq!(report.rows[4].cells[5], "n/d");
    }

    #[test]
    fn test_summary_excludes_unset() {
        let report = build_report(&sample_order(), &ReportConfig::default());

        assert_eq!(
            report.summary_lines(),
            [("Total de Itens", 5), ("Completos", 1), ("Parciais", 1), ("Zerados", 1)]
        );
        assert_eq!(report.counts.unset, 2);
        assert_eq!(report.counts.total(), report.total_items());
    }

    #[test]
    fn test_header_fields_in_order() {
        let report = build_report(&sample_order(), &ReportConfig::default());
        let labels: Vec<&str> = report.header_fields.iter().map(|(l, _)| l.as_str()).collect();

        assert_eq!(labels, OrderHeader::LABELS.to_vec());
        assert_eq!(report.header_fields[3].1, "CAF");
    }

    #[test]
    fn test_build_does_not_touch_order() {
        let order = sample_order();
        let before = order.clone();
        let _ = build_report(&order, &ReportConfig::default());
        assert_eq!(order, before);
    }

    #[test]
    fn test_signature_lines() {
        let report = build_report(&sample_order(), &ReportConfig::default());
        let lines = report.signature_lines();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Assinatura do Conferente:"));
        assert!(lines[1].starts_with("Assinatura do Recebedor:"));
    }

    #[test]
    fn test_text_review() {
        let review = render_text_review(&sample_order());

        assert!(review.contains("1. MEDICAMENTO 1\n"));
        assert!(review.contains("Solicitado: 10 | Disponível: — [Pendente]"));
        assert!(review.contains("Solicitado: 10 | Disponível: 5 [Parcial]"));
    }
}

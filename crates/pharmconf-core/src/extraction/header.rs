//! Header extraction from the order's signature line.

use tracing::debug;

use super::patterns::HEADER_SIGNATURE;
use super::LineExtractor;
use crate::models::order::OrderHeader;

/// Largest number of trailing tokens tested for a stock keyword.
const MAX_STOCK_WINDOW: usize = 3;

/// Outcome of scanning a document for its header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderScan {
    /// Header from the last matching line (all empty if none matched).
    pub header: OrderHeader,
    /// How many lines matched the signature.
    pub matches: usize,
}

/// Header signature line extractor.
pub struct HeaderExtractor {
    /// Upper-cased stock keywords.
    stock_keywords: Vec<String>,
}

impl HeaderExtractor {
    pub fn new<I, S>(stock_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stock_keywords: stock_keywords
                .into_iter()
                .map(|k| k.as_ref().to_uppercase())
                .collect(),
        }
    }

    /// Fold the line stream into a header; the last matching line wins.
    pub fn scan<'a, I>(&self, lines: I) -> HeaderScan
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.extract_line(line))
            .fold(HeaderScan::default(), |scan, header| {
                if scan.matches > 0 {
                    debug!(
                        "Header line for order {} replaces order {}",
                        header.order_number, scan.header.order_number
                    );
                }
                HeaderScan {
                    header,
                    matches: scan.matches + 1,
                }
            })
    }

    /// Split the interior tokens into (requesting unit, requested stock).
    ///
    /// Windows of 3, 2 and 1 trailing tokens are tested in that order; the
    /// first one containing a keyword is the stock.
    fn split_unit_and_stock(&self, interior: &[&str]) -> (String, String) {
        for size in (1..=MAX_STOCK_WINDOW).rev() {
            let start = interior.len().saturating_sub(size);
            let window = interior[start..].join(" ").to_uppercase();
            if self.stock_keywords.iter().any(|k| window.contains(k.as_str())) {
                return (interior[..start].join(" "), window);
            }
        }
        (interior.join(" "), String::new())
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new(["CAF", "GGE", "FARMÁCIA", "GERAL", "CENTRAL"])
    }
}

impl LineExtractor for HeaderExtractor {
    type Output = OrderHeader;

    fn extract_line(&self, line: &str) -> Option<OrderHeader> {
        let line = line.trim();
        if !HEADER_SIGNATURE.is_match(line) {
            return None;
        }

        // The signature guarantees at least four tokens; the interior may be empty.
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let n = tokens.len();
        if n < 4 {
            return None;
        }

        let interior = &tokens[1..n - 3];
        let (requesting_unit, requested_stock) = self.split_unit_and_stock(interior);

        // No hyphenated token means no requester code; there is no fallback.
        let requester_code = interior
            .iter()
            .position(|token| token.contains('-'))
            .map(|idx| interior[..idx].join(" "))
            .unwrap_or_default();

        let header = OrderHeader {
            order_number: tokens[0].to_string(),
            requester_code,
            requesting_unit,
            requested_stock,
            timestamp: format!("{} {}", tokens[n - 3], tokens[n - 2]),
        };

        debug!("Matched header line for order {}", header.order_number);
        Some(header)
    }
}

//! CLI commands.

pub mod conference;
pub mod config;
pub mod extract;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use pharmconf_core::extraction::{DispensingOrderParser, OrderParser};
use pharmconf_core::models::config::PharmconfConfig;
use pharmconf_core::models::order::Order;
use pharmconf_core::workflow::upload_document;

/// Read an order from a PDF, or from a UTF-8 text dump with `text_input`.
pub fn load_order(
    input: &Path,
    text_input: bool,
    config: &PharmconfConfig,
) -> anyhow::Result<Order> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    if text_input {
        let text = fs::read_to_string(input)?;
        let result = DispensingOrderParser::from_config(&config.extraction).parse_text(&text);
        for warning in &result.warnings {
            warn!("{}", warning);
        }
        debug!("Parsed text input in {}ms", result.processing_time_ms);
        return Ok(result.order);
    }

    let data = fs::read(input)?;
    Ok(upload_document(&data, config)?)
}

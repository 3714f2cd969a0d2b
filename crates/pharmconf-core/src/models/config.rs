//! Configuration structures for the conference pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PharmconfError;

/// Main configuration for the pharmconf pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PharmconfConfig {
    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// Order extraction configuration.
    pub extraction: ExtractionConfig,

    /// Audit report configuration.
    pub report: ReportConfig,
}

/// PDF text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Read text page by page before falling back to whole-document text.
    pub prefer_per_page_text: bool,

    /// Minimum text length to consider the PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_per_page_text: false,
            min_text_length: 50,
        }
    }
}

/// Order extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keywords identifying the requested stock at the end of the header line.
    pub stock_keywords: Vec<String>,

    /// Line prefix opening the attended items section.
    pub items_start_marker: String,

    /// Line prefix closing the attended items section.
    pub items_end_marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            stock_keywords: ["CAF", "GGE", "FARMÁCIA", "GERAL", "CENTRAL"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            items_start_marker: "ITENS ATENDIDOS".to_string(),
            items_end_marker: "ITENS NÃO ATENDIDOS".to_string(),
        }
    }
}

/// Audit report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Document title.
    pub title: String,

    /// Suggested file name for the rendered report.
    pub file_name: String,

    /// Font size used in the item table.
    pub table_font_size: f32,

    /// Font size used for header fields, summary and signatures.
    pub body_font_size: f32,

    /// Who signs the report, one signature line each.
    pub signatures: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Relatório de Conferência de Medicamentos".to_string(),
            file_name: "relatorio_conferencia.pdf".to_string(),
            table_font_size: 8.0,
            body_font_size: 10.0,
            signatures: vec!["Conferente".to_string(), "Recebedor".to_string()],
        }
    }
}

impl PharmconfConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |msg: &str| Err(PharmconfError::Config(msg.to_string()));

        if self.extraction.items_start_marker.trim().is_empty() {
            return invalid("extraction.items_start_marker must not be empty");
        }
        if self.extraction.items_end_marker.trim().is_empty() {
            return invalid("extraction.items_end_marker must not be empty");
        }
        if self.extraction.stock_keywords.iter().any(|k| k.trim().is_empty()) {
            // An empty keyword would match every window.
            return invalid("extraction.stock_keywords must not contain empty keywords");
        }
        if !(self.report.table_font_size > 0.0 && self.report.body_font_size > 0.0) {
            return invalid("report font sizes must be positive");
        }
        if self.report.file_name.trim().is_empty() {
            return invalid("report.file_name must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: PharmconfConfig =
            serde_json::from_str(r#"{"report":{"title":"Conferência"}}"#).unwrap();
        assert_eq!(config.report.title, "Conferência");
        assert_eq!(config.report.file_name, "relatorio_conferencia.pdf");
        assert_eq!(config.extraction.stock_keywords.len(), 5);
        assert_eq!(config.extraction.items_start_marker, "ITENS ATENDIDOS");
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("pharmconf-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = PharmconfConfig::default();
        config.extraction.stock_keywords.push("ALMOXARIFADO".to_string());
        config.save(&path).unwrap();

        let loaded = PharmconfConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.stock_keywords.last().unwrap(), "ALMOXARIFADO");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PharmconfConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PharmconfConfig::default();
        config.extraction.stock_keywords.push("  ".to_string());
        assert!(matches!(config.validate(), Err(PharmconfError::Config(_))));

        let mut config = PharmconfConfig::default();
        config.report.table_font_size = 0.0;
        assert!(matches!(config.validate(), Err(PharmconfError::Config(_))));

        let mut config = PharmconfConfig::default();
        config.extraction.items_start_marker.clear();
        assert!(matches!(config.validate(), Err(PharmconfError::Config(_))));
    }
}

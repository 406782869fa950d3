use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of a bidding announcement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Source {
    #[serde(rename = "PNCP (Servidor)")]
    Pncp,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Pncp => "PNCP (Servidor)",
        }
    }
}

/// One bidding announcement extracted from a rendered result card.
///
/// Serialized with the field names the portal front-end consumers expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRecord {
    #[serde(rename = "fonte")]
    pub source: Source,
    #[serde(rename = "objeto")]
    pub object_description: String,
    #[serde(rename = "orgao")]
    pub organ_entity: String,
    #[serde(rename = "modalidade")]
    pub modality: String,
    /// Display string as rendered by the portal; never parsed.
    #[serde(rename = "data_abertura_proposta")]
    pub opening_date_text: String,
    #[serde(rename = "link")]
    pub detail_url: String,
    #[serde(rename = "uf")]
    pub region_label: String,
}

/// Results of one query as written by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub niche: String,
    pub region: Option<String>,
    pub term: String,
    pub retrieved_at: DateTime<Utc>,
    pub results: Vec<ResultRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_portal_field_names() {
        let record = ResultRecord {
            source: Source::Pncp,
            object_description: "Contratação de curso".to_string(),
            organ_entity: "Prefeitura de Campinas".to_string(),
            modality: "Pregão Eletrônico".to_string(),
            opening_date_text: "10/11/2026".to_string(),
            detail_url: "https://pncp.gov.br/app/editais/1".to_string(),
            region_label: "Campinas/SP".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fonte"], "PNCP (Servidor)");
        assert_eq!(json["objeto"], "Contratação de curso");
        assert_eq!(json["orgao"], "Prefeitura de Campinas");
        assert_eq!(json["modalidade"], "Pregão Eletrônico");
        assert_eq!(json["data_abertura_proposta"], "10/11/2026");
        assert_eq!(json["link"], "https://pncp.gov.br/app/editais/1");
        assert_eq!(json["uf"], "Campinas/SP");
    }
}

// ============================================================
// MAPPING CSV PARSER
// ============================================================
// Parse source-to-FHIR mapping tables with encoding fallback

use crate::domain::error::{AppError, Result};
use crate::domain::mapping::MappingRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use std::collections::BTreeMap;
use std::path::Path;

/// Parser for mapping tables such as
/// `Source_Field,Target_FHIR_Resource,FHIR_Attribute,...`
pub struct MappingCsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for MappingCsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl MappingCsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a mapping file, decoding UTF-8 first and Windows-1252 otherwise
    pub fn parse_file(&self, path: &Path) -> Result<Vec<MappingRow>> {
        let content = read_mapping_text(path)?;
        self.parse_content(&content)
    }

    /// Parse mapping rows from CSV text. Rows shorter than the header are
    /// padded with empty values; blank lines are skipped.
    pub fn parse_content(&self, content: &str) -> Result<Vec<MappingRow>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read mapping headers: {}", e)))?
            .clone();
        if headers.iter().all(|header| header.is_empty()) {
            return Err(AppError::ValidationError(
                "Mapping CSV has no header row.".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse mapping row {}: {}", line + 1, e))
            })?;
            if record.iter().all(|value| value.is_empty()) {
                continue;
            }
            rows.push(build_row(rows.len(), &headers, &record));
        }

        Ok(rows)
    }
}

fn build_row(index: usize, headers: &StringRecord, record: &StringRecord) -> MappingRow {
    let values: BTreeMap<String, String> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty())
        .map(|(idx, header)| {
            (
                header.to_string(),
                record.get(idx).unwrap_or("").to_string(),
            )
        })
        .collect();
    MappingRow { index, values }
}

/// Mapping file contents, UTF-8 when valid and Windows-1252 otherwise.
pub fn read_mapping_text(path: &Path) -> Result<String> {
    let buffer = std::fs::read(path).map_err(|e| {
        AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    match String::from_utf8(buffer) {
        Ok(content) => Ok(content),
        Err(err) => {
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            tracing::debug!(path = %path.display(), "Mapping file is not UTF-8, decoded as Windows-1252");
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MAPPING: &str = "Source_Field,Target_FHIR_Resource,FHIR_Attribute,Transformation_Rule,Data_Type,Required\n\
PID.3,Patient,identifier,Direct mapping,Identifier,Yes\n\
PID.8,Patient,gender,Map gender codes,code,No";

    #[test]
    fn test_parse_mapping_rows() {
        let rows = MappingCsvParser::new().parse_content(MAPPING).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_field(), Some("PID.3"));
        assert_eq!(rows[1].fhir_attribute(), Some("gender"));
        assert_eq!(rows[1].get("Required"), Some("No"));
    }

    #[test]
    fn test_short_rows_and_blank_lines() {
        let content = "Source_Field, FHIR_Attribute ,Data_Type\n\nPID.7 , birthDate\n,,\n";
        let rows = MappingCsvParser::new().parse_content(content).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].fhir_attribute(), Some("birthDate"));
        assert_eq!(rows[0].get("Data_Type"), None);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let content = "Source_Field;FHIR_Attribute\nOBX.3;code";
        let rows = MappingCsvParser::new()
            .with_delimiter(b';')
            .parse_content(content)
            .unwrap();
        assert_eq!(rows[0].fhir_attribute(), Some("code"));
    }

    #[test]
    fn test_empty_content_is_rejected() {
        assert!(MappingCsvParser::new().parse_content("").is_err());
    }

    #[test]
    fn test_parse_file_falls_back_to_windows_1252() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Source_Field,Transformation_Rule\nPID.5,Caf\xe9 name\n")
            .unwrap();

        let rows = MappingCsvParser::new().parse_file(file.path()).unwrap();
        assert_eq!(rows[0].get("Transformation_Rule"), Some("Café name"));
    }
}

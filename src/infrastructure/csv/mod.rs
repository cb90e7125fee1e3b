mod mapping_parser;

pub use mapping_parser::{read_mapping_text, MappingCsvParser};

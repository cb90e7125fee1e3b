use crate::domain::mapping::MappingStats;
use crate::domain::test_case::{StatisticalSummary, Subtype, TestCaseRecord, TestCaseType};
use std::collections::BTreeMap;

/// Rough number of test cases a model writes per mapping row. Only used to
/// estimate `MappingRows` and `UniqueAttributes` when the mapping is unknown.
pub const ESTIMATED_CASES_PER_MAPPING_ROW: usize = 3;

/// Recomputes the summary from the records. Every known category and subtype
/// appears in the breakdowns, with zero when absent.
pub fn summarize(records: &[TestCaseRecord]) -> StatisticalSummary {
    let mut type_breakdown: BTreeMap<String, usize> = TestCaseType::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), 0))
        .collect();
    let mut subtype_breakdown: BTreeMap<String, usize> = Subtype::ALL
        .iter()
        .map(|subtype| (subtype.as_str().to_string(), 0))
        .collect();

    for record in records {
        *type_breakdown
            .entry(record.category.as_str().to_string())
            .or_insert(0) += 1;
        *subtype_breakdown
            .entry(record.subtype.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total = records.len();
    let estimate = total / ESTIMATED_CASES_PER_MAPPING_ROW;
    StatisticalSummary {
        total_test_cases: total,
        mapping_rows: estimate,
        unique_attributes: estimate,
        type_breakdown,
        subtype_breakdown,
        extra: serde_json::Map::new(),
    }
}

/// Replaces the estimated mapping counts with exact ones.
pub fn apply_mapping_stats(summary: &mut StatisticalSummary, stats: MappingStats) {
    summary.mapping_rows = stats.rows;
    summary.unique_attributes = stats.unique_attributes;
}

//! Naming utilities
//!
//! Model names, table names, constraint names and SQL identifier handling.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Name of the per-dataset root entity table suffix and model suffix
pub const ROOT_MODEL_NAME: &str = "CellSegment";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

static PLAIN_SQL_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("plain sql identifier regex"));

/// Check that a dataset or annotation type name is a usable identifier
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(Error::IdentifierError(format!(
            "{} {:?} must be a non-empty identifier of letters, digits and underscores",
            kind, name
        )))
    }
}

/// Uppercase the first character and lowercase the rest
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Registry key of an annotation model.
///
/// Names differing only by case collapse onto the same key.
pub fn model_name(dataset: &str, annotation_type: &str) -> String {
    format!("{}{}", capitalize(dataset), capitalize(annotation_type))
}

/// Registry key of a dataset's root entity model
pub fn root_model_name(dataset: &str) -> String {
    format!("{}{}", capitalize(dataset), ROOT_MODEL_NAME)
}

/// Table name of an annotation model
pub fn table_name(dataset: &str, annotation_type: &str) -> String {
    format!("{}_{}", dataset, annotation_type)
}

/// Table name of a dataset's root entity
pub fn root_table_name(dataset: &str) -> String {
    table_name(dataset, ROOT_MODEL_NAME)
}

/// Column name of a flattened nested sub-field
pub fn nested_column_name(field_name: &str, sub_field_name: &str) -> String {
    format!("{}_{}", field_name, sub_field_name)
}

/// Format a name according to a pattern with placeholders
pub fn format_name(pattern: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = pattern.to_string();

    for (placeholder, value) in replacements {
        result = result.replace(&format!("{{{}}}", placeholder), value);
    }

    result
}

/// Get index name for a single-column index according to pattern
pub fn get_index_name(pattern: &str, table_name: &str, column_name: &str) -> String {
    format_name(pattern, &[("table", table_name), ("column", column_name)])
}

/// Get foreign key constraint name according to pattern
pub fn get_foreign_key_name(pattern: &str, table_name: &str, column_name: &str) -> String {
    format_name(pattern, &[("table", table_name), ("column", column_name)])
}

/// Truncate an identifier to fit database limits
pub fn truncate_identifier(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        return name.to_string();
    }

    // Room for the underscore and 8 hash characters
    let keep_length = max_length.saturating_sub(9);
    let hash = format!("{:x}", md5::compute(name.as_bytes()));
    let prefix: String = name.chars().take(keep_length).collect();

    format!("{}_{}", prefix, &hash[0..8])
}

/// Check if a name is a reserved SQL keyword
pub fn is_sql_keyword(name: &str) -> bool {
    const SQL_KEYWORDS: &[&str] = &[
        "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "check",
        "column", "constraint", "create", "default", "delete", "desc", "distinct", "drop",
        "else", "end", "except", "exists", "foreign", "from", "full", "group", "having", "in",
        "index", "inner", "insert", "intersect", "into", "is", "join", "key", "left", "like",
        "limit", "not", "null", "on", "or", "order", "outer", "primary", "references", "right",
        "select", "set", "table", "to", "union", "unique", "update", "user", "values", "view",
        "where", "with",
    ];

    SQL_KEYWORDS.contains(&name.to_lowercase().as_str())
}

/// Quote a PostgreSQL identifier when case folding or keywords would change it
pub fn quote_identifier(name: &str) -> String {
    if PLAIN_SQL_IDENTIFIER.is_match(name) && !is_sql_keyword(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ds1", "Ds1")]
    #[case("pinky100", "Pinky100")]
    #[case("SYNAPSE", "Synapse")]
    #[case("cell_type_local", "Cell_type_local")]
    #[case("", "")]
    fn test_capitalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }

    #[test]
    fn test_model_and_table_names() {
        assert_eq!(model_name("ds1", "synapse"), "Ds1Synapse");
        assert_eq!(root_model_name("ds1"), "Ds1CellSegment");
        assert_eq!(table_name("ds1", "synapse"), "ds1_synapse");
        assert_eq!(root_table_name("ds1"), "ds1_CellSegment");
        assert_eq!(nested_column_name("pre_pt", "root_id"), "pre_pt_root_id");
    }

    #[test]
    fn test_model_names_alias_on_case() {
        assert_eq!(model_name("DS1", "Synapse"), model_name("ds1", "synapse"));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("dataset", "pinky100").is_ok());
        assert!(validate_identifier("dataset", "_private").is_ok());
        assert!(validate_identifier("dataset", "").is_err());
        assert!(validate_identifier("dataset", "1abc").is_err());
        assert!(matches!(
            validate_identifier("annotation type", "syn apse"),
            Err(Error::IdentifierError(_))
        ));
    }

    #[test]
    fn test_constraint_names() {
        assert_eq!(
            get_index_name("ix_{table}_{column}", "ds1_synapse", "size"),
            "ix_ds1_synapse_size"
        );
        assert_eq!(
            get_foreign_key_name("fk_{table}_{column}", "ds1_synapse", "pre_pt_root_id"),
            "fk_ds1_synapse_pre_pt_root_id"
        );
    }

    #[test]
    fn test_truncate_identifier() {
        let long_name = "ix_pinky100_postsynaptic_compartment_post_pt_supervoxel_id_extra";
        let truncated = truncate_identifier(long_name, 63);

        assert_eq!(truncated.len(), 63);
        assert!(truncated.starts_with("ix_pinky100_postsynaptic"));
        assert_eq!(truncate_identifier(long_name, 63), truncated);
        assert_eq!(truncate_identifier("ix_short", 63), "ix_short");
    }

    #[rstest]
    #[case("ds1_synapse", "ds1_synapse")]
    #[case("ds1_CellSegment", "\"ds1_CellSegment\"")]
    #[case("user", "\"user\"")]
    #[case("size", "size")]
    fn test_quote_identifier(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(quote_identifier(input), expected);
    }
}

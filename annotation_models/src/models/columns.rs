//! Field to column translation
//!
//! Scalar fields become one column each. Nested groups are flattened one
//! level into `{field}_{sub_field}` columns, with geometry sub-fields stored
//! as 3-D PostGIS columns and `root_id` sub-fields tied to the dataset's root
//! entity table.

use crate::config::NamingConfig;
use crate::error::{Error, Result};
use crate::models::table::{Column, ColumnType, ForeignKey, Index, Table, PRIMARY_KEY_COLUMN};
use crate::schema::{Field, FieldKind, NestedGroup, TARGET_ID_FIELD};
use crate::utils::naming;

/// Sub-field name that always references the root entity
pub const ROOT_ID_FIELD: &str = "root_id";

/// Dimension of generated geometry columns
pub const GEOMETRY_DIMENSION: u8 = 3;

/// Column type of a scalar field kind, `None` for everything else
pub fn scalar_column_type(kind: &FieldKind) -> Option<ColumnType> {
    match kind {
        FieldKind::Numeric => Some(ColumnType::Numeric),
        FieldKind::Integer => Some(ColumnType::Integer),
        FieldKind::Float => Some(ColumnType::Float),
        FieldKind::String => Some(ColumnType::String),
        FieldKind::Boolean => Some(ColumnType::Boolean),
        FieldKind::Nested(_) | FieldKind::List(_) | FieldKind::Other(_) => None,
    }
}

fn unsupported(field_name: &str, kind: &FieldKind) -> Error {
    Error::InvalidSchemaField(format!(
        "field {}: field type {} not supported",
        field_name, kind
    ))
}

/// Accumulates the table of one model
pub(crate) struct TableBuilder<'a> {
    dataset: &'a str,
    naming: &'a NamingConfig,
    table: Table,
}

impl<'a> TableBuilder<'a> {
    /// Start a table holding only the implicit `id` primary key
    pub fn new(dataset: &'a str, table_name: &str, naming: &'a NamingConfig) -> Self {
        Self {
            dataset,
            naming,
            table: Table::with_id_primary_key(table_name),
        }
    }

    /// Translate one schema field into zero or more columns
    pub fn add_field(&mut self, name: &str, field: &Field) -> Result<()> {
        if field.metadata.drop_column {
            return Ok(());
        }

        match &field.kind {
            FieldKind::Nested(group) => self.add_nested(name, group),
            kind => match scalar_column_type(kind) {
                Some(column_type) => {
                    self.add_column(name, column_type, field.metadata.index);
                    Ok(())
                }
                None => Err(unsupported(name, kind)),
            },
        }
    }

    fn add_nested(&mut self, name: &str, group: &NestedGroup) -> Result<()> {
        if group.many {
            return Err(Error::InvalidSchemaField(format!(
                "field {}: Nested(many=true) not supported",
                name
            )));
        }

        for (sub_name, sub_field) in &group.fields {
            let column_name = naming::nested_column_name(name, sub_name);

            if let Some(subtype) = sub_field
                .metadata
                .postgis_geometry
                .as_deref()
                .filter(|s| !s.is_empty())
            {
                self.table.upsert_column(Column::new(
                    &column_name,
                    ColumnType::geometry(subtype, GEOMETRY_DIMENSION),
                ));
                continue;
            }

            let column_type = match &sub_field.kind {
                FieldKind::Nested(_) => {
                    return Err(Error::InvalidSchemaField(format!(
                        "field {}.{}: nested groups are flattened one level only",
                        name, sub_name
                    )))
                }
                kind => scalar_column_type(kind)
                    .ok_or_else(|| unsupported(&format!("{}.{}", name, sub_name), kind))?,
            };

            self.add_column(&column_name, column_type, sub_field.metadata.index);

            if sub_name == ROOT_ID_FIELD {
                let root_table = naming::root_table_name(self.dataset);
                self.add_foreign_key(&column_name, root_table);
            }
        }

        Ok(())
    }

    /// Add or replace `target_id` as a foreign key to `{dataset}_{reference_type}.id`
    pub fn set_reference_target(&mut self, reference_type: &str) {
        self.table
            .upsert_column(Column::new(TARGET_ID_FIELD, ColumnType::Integer));
        let ref_table = naming::table_name(self.dataset, reference_type);
        self.add_foreign_key(TARGET_ID_FIELD, ref_table);
    }

    pub fn finish(self) -> Table {
        self.table
    }

    // A later column of the same name replaces the earlier one with its constraints.
    fn add_column(&mut self, name: &str, column_type: ColumnType, index: bool) {
        self.table.upsert_column(Column::new(name, column_type));
        if index {
            let index_name = naming::get_index_name(&self.naming.index_pattern, &self.table.name, name);
            self.table.add_index(Index {
                name: naming::truncate_identifier(&index_name, self.naming.max_identifier_length),
                columns: vec![name.to_string()],
                is_unique: false,
            });
        }
    }

    fn add_foreign_key(&mut self, column: &str, ref_table: String) {
        let fk_name =
            naming::get_foreign_key_name(&self.naming.constraint_pattern, &self.table.name, column);
        self.table.add_foreign_key(ForeignKey {
            name: naming::truncate_identifier(&fk_name, self.naming.max_identifier_length),
            columns: vec![column.to_string()],
            ref_table,
            ref_columns: vec![PRIMARY_KEY_COLUMN.to_string()],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn build(fields: &[(&str, Field)]) -> Result<Table> {
        let naming = NamingConfig::default();
        let mut builder = TableBuilder::new("ds1", "ds1_test", &naming);
        for (name, field) in fields {
            builder.add_field(name, field)?;
        }
        Ok(builder.finish())
    }

    fn group(fields: Vec<(&str, Field)>) -> IndexMap<String, Field> {
        fields
            .into_iter()
            .map(|(name, field)| (name.to_string(), field))
            .collect()
    }

    #[rstest]
    #[case(Field::numeric(), ColumnType::Numeric)]
    #[case(Field::integer(), ColumnType::Integer)]
    #[case(Field::float(), ColumnType::Float)]
    #[case(Field::string(), ColumnType::String)]
    #[case(Field::boolean(), ColumnType::Boolean)]
    fn test_scalar_mapping(#[case] field: Field, #[case] expected: ColumnType) {
        let table = build(&[("value", field)]).unwrap();
        assert_eq!(table.column("value").unwrap().column_type, expected);
        assert!(!table.is_indexed("value"));
    }

    #[test]
    fn test_index_metadata() {
        let table = build(&[("cell_type", Field::string().indexed())]).unwrap();
        assert!(table.is_indexed("cell_type"));
        assert_eq!(table.indexes[0].name, "ix_ds1_test_cell_type");
    }

    #[test]
    fn test_drop_column() {
        let table = build(&[
            ("kept", Field::integer()),
            ("dropped", Field::integer().drop_column()),
            (
                "dropped_pt",
                Field::nested(builtin::bound_spatial_point()).drop_column(),
            ),
        ])
        .unwrap();

        assert_eq!(
            table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["id", "kept"]
        );
        assert!(table.columns.iter().all(|c| !c.name.starts_with("dropped")));
    }

    #[test]
    fn test_nested_with_geometry() {
        let table = build(&[(
            "parent",
            Field::nested(group(vec![
                ("a", Field::integer()),
                ("b", Field::list(FieldKind::Integer).postgis_geometry("POINT")),
            ])),
        )])
        .unwrap();

        assert!(table.column("parent").is_none());
        assert_eq!(table.column("parent_a").unwrap().column_type, ColumnType::Integer);
        assert_eq!(
            table.column("parent_b").unwrap().column_type,
            ColumnType::Geometry {
                subtype: "POINT".to_string(),
                dimension: 3
            }
        );
        assert!(table.indexes.is_empty());
        assert!(table.foreign_keys.is_empty());
    }

    #[test]
    fn test_geometry_is_never_indexed_or_keyed() {
        let table = build(&[(
            "pt",
            Field::nested(group(vec![(
                "root_id",
                Field::numeric().indexed().postgis_geometry("POINT"),
            )])),
        )])
        .unwrap();

        assert!(table.column("pt_root_id").unwrap().column_type.is_spatial());
        assert!(table.indexes.is_empty());
        assert!(table.foreign_keys.is_empty());
    }

    #[rstest]
    #[case(IndexMap::new())]
    #[case(builtin::bound_spatial_point())]
    #[case(group(vec![("anything", Field::new(FieldKind::Other("Dict".to_string())))]))]
    fn test_nested_many_always_fails(#[case] fields: IndexMap<String, Field>) {
        let result = build(&[("pts", Field::nested_many(fields))]);
        assert!(matches!(result, Err(Error::InvalidSchemaField(_))));
    }

    #[rstest]
    #[case(Field::list(FieldKind::Integer))]
    #[case(Field::new(FieldKind::Other("DateTime".to_string())))]
    fn test_unsupported_top_level_kind(#[case] field: Field) {
        match build(&[("when", field)]) {
            Err(Error::InvalidSchemaField(message)) => assert!(message.contains("not supported")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_second_level_nesting_fails() {
        let inner = Field::nested(builtin::spatial_point());
        let result = build(&[("outer", Field::nested(group(vec![("inner", inner)])))]);
        assert!(matches!(result, Err(Error::InvalidSchemaField(_))));
    }

    #[rstest]
    #[case("pre_pt")]
    #[case("pt")]
    #[case("anything_at_all")]
    fn test_root_id_references_root_entity(#[case] parent: &str) {
        let table = build(&[(parent, Field::nested(builtin::bound_spatial_point()))]).unwrap();
        let column = format!("{}_root_id", parent);
        let fk = table.foreign_key_on(&column).unwrap();

        assert_eq!(fk.ref_table, "ds1_CellSegment");
        assert_eq!(fk.ref_columns, vec!["id".to_string()]);
        assert!(table.is_indexed(&column));
        assert!(table.foreign_key_on(&format!("{}_supervoxel_id", parent)).is_none());
    }

    #[test]
    fn test_later_column_of_same_name_wins() {
        let table = build(&[
            (
                "pt",
                Field::nested(group(vec![("root_id", Field::numeric().indexed())])),
            ),
            ("pt_root_id", Field::integer()),
        ])
        .unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "pt_root_id"]);
        assert_eq!(table.column("pt_root_id").unwrap().column_type, ColumnType::Integer);
        assert!(!table.is_indexed("pt_root_id"));
        assert!(table.foreign_key_on("pt_root_id").is_none());
    }

    #[test]
    fn test_reference_target_overrides_column() {
        let naming = NamingConfig::default();
        let mut builder = TableBuilder::new("ds1", "ds1_presynaptic_bouton_type", &naming);
        builder.add_field("target_id", &Field::integer().indexed()).unwrap();
        builder.add_field("bouton_type", &Field::string()).unwrap();
        builder.set_reference_target("synapse");
        let table = builder.finish();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "target_id", "bouton_type"]);
        assert!(!table.is_indexed("target_id"));
        let fk = table.foreign_key_on("target_id").unwrap();
        assert_eq!(fk.ref_table, "ds1_synapse");
        assert_eq!(fk.name, "fk_ds1_presynaptic_bouton_type_target_id");
    }
}

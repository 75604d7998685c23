//! Table description types
//!
//! The persisted layout of a generated model: columns, primary key, indexes
//! and foreign keys.

use serde::{Deserialize, Serialize};

/// Name of the implicit primary key column of every generated table
pub const PRIMARY_KEY_COLUMN: &str = "id";

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Create a table with the implicit integer `id` primary key
    pub fn with_id_primary_key(name: &str) -> Self {
        let mut table = Self::new(name);
        table.add_column(Column::new(PRIMARY_KEY_COLUMN, ColumnType::Integer).nullable(false));
        table.set_primary_key(PrimaryKey {
            name: None,
            columns: vec![PRIMARY_KEY_COLUMN.to_string()],
        });
        table
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Replace a column of the same name in place, or append it.
    ///
    /// Indexes and foreign keys on the replaced column are dropped.
    pub fn upsert_column(&mut self, column: Column) {
        let name = column.name.clone();
        match self.columns.iter().position(|c| c.name == name) {
            Some(pos) => {
                self.columns[pos] = column;
                self.indexes.retain(|idx| !idx.columns.contains(&name));
                self.foreign_keys.retain(|fk| !fk.columns.contains(&name));
            }
            None => self.add_column(column),
        }
    }

    /// Set the primary key for the table
    pub fn set_primary_key(&mut self, pk: PrimaryKey) {
        self.primary_key = Some(pk);
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Add a foreign key to the table
    pub fn add_foreign_key(&mut self, fk: ForeignKey) {
        self.foreign_keys.push(fk);
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Foreign key constraining the given column, if any
    pub fn foreign_key_on(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.columns.iter().any(|c| c == column))
    }

    /// Whether a single-column index exists on the given column
    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.columns.len() == 1 && idx.columns[0] == column)
    }
}

/// Represents a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create a new nullable column with the given name and type
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable: true,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// SQL column types generated models use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Integer,
    Float,
    String,
    Boolean,
    /// PostGIS geometry column
    Geometry { subtype: String, dimension: u8 },
}

impl ColumnType {
    pub fn geometry(subtype: &str, dimension: u8) -> Self {
        ColumnType::Geometry {
            subtype: subtype.to_string(),
            dimension,
        }
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, ColumnType::Geometry { .. })
    }

    /// PostgreSQL/PostGIS type used in DDL
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Numeric => "NUMERIC".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::String => "VARCHAR".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Geometry { subtype, dimension } => {
                let mut geometry_type = subtype.to_uppercase();
                let has_z = geometry_type.ends_with('Z') || geometry_type.ends_with("ZM");
                if *dimension == 3 && !has_z && !geometry_type.ends_with('M') {
                    geometry_type.push('Z');
                } else if *dimension == 4 && !geometry_type.ends_with("ZM") {
                    geometry_type.push_str("ZM");
                }
                format!("geometry({})", geometry_type)
            }
        }
    }
}

/// Represents a primary key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Represents an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

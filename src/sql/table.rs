//! Column metadata for the students table.

/// One mapped column: SQL name and its DDL type clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ddl: &'static str,
}

pub const STUDENT_COLUMNS: &[Column] = &[
    Column { name: "id", ddl: "BIGSERIAL PRIMARY KEY" },
    Column { name: "first_name", ddl: "TEXT NOT NULL" },
    Column { name: "last_name", ddl: "TEXT NOT NULL" },
    Column { name: "email", ddl: "TEXT NOT NULL" },
];

/// Schema-qualified students table.
#[derive(Clone, Debug)]
pub struct StudentTable {
    pub schema: String,
    pub name: &'static str,
    pub pk: &'static str,
    pub columns: &'static [Column],
}

impl StudentTable {
    pub fn new(schema: impl Into<String>) -> Self {
        StudentTable {
            schema: schema.into(),
            name: "students",
            pk: "id",
            columns: STUDENT_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns written on insert when the store assigns the key.
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.name != self.pk)
    }
}

impl Default for StudentTable {
    fn default() -> Self {
        StudentTable::new("public")
    }
}

//! Builds parameterized statements for the students table from its column metadata.

use crate::error::AppError;
use crate::sql::{NamedQuery, StudentTable};

/// Quote identifier for PostgreSQL (safe: only from table metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(table: &StudentTable) -> String {
    format!("{}.{}", quoted(&table.schema), quoted(table.name))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<String>,
}

impl QueryBuf {
    pub(crate) fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn push_param(&mut self, v: String) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// How a single-result name lookup is authored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStyle {
    /// Derived from column metadata, positional parameters.
    DeclarativeIndexed,
    /// Derived from column metadata, named parameters.
    DeclarativeNamed,
    /// Hand-written SQL, positional parameters.
    NativeIndexed,
    /// Hand-written SQL, named parameters.
    NativeNamed,
}

impl QueryStyle {
    pub const ALL: [QueryStyle; 4] = [
        QueryStyle::DeclarativeIndexed,
        QueryStyle::DeclarativeNamed,
        QueryStyle::NativeIndexed,
        QueryStyle::NativeNamed,
    ];
}

fn select_column_list(table: &StudentTable) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn checked_column<'a>(table: &'a StudentTable, name: &str) -> Result<&'a str, AppError> {
    table
        .column(name)
        .map(|c| c.name)
        .ok_or_else(|| AppError::Query(format!("unknown column: {}", name)))
}

/// SELECT with one equality predicate per filter, joined by AND. Positional params.
pub fn select_where_eq(table: &StudentTable, filters: &[(&str, String)]) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut clauses = Vec::with_capacity(filters.len());
    for (col, value) in filters {
        let col = checked_column(table, col)?;
        let n = q.push_param(value.clone());
        clauses.push(format!("{} = ${}", quoted(col), n));
    }
    q.sql = format!("SELECT {} FROM {}", select_column_list(table), qualified_table(table));
    if !clauses.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&clauses.join(" AND "));
    }
    Ok(q)
}

/// Same shape as [`select_where_eq`] but each predicate binds a `:name` placeholder.
/// Returns SQL for [`NamedQuery::compile`].
pub fn select_where_eq_named(table: &StudentTable, filters: &[(&str, &str)]) -> Result<String, AppError> {
    let mut clauses = Vec::with_capacity(filters.len());
    for (col, param) in filters {
        let col = checked_column(table, col)?;
        clauses.push(format!("{} = :{}", quoted(col), param));
    }
    let mut sql = format!("SELECT {} FROM {}", select_column_list(table), qualified_table(table));
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    Ok(sql)
}

/// Statement and parameters for looking a student up by exact first and last name.
pub fn name_lookup(
    table: &StudentTable,
    style: QueryStyle,
    first_name: &str,
    last_name: &str,
) -> Result<QueryBuf, AppError> {
    match style {
        QueryStyle::DeclarativeIndexed => select_where_eq(
            table,
            &[("first_name", first_name.to_string()), ("last_name", last_name.to_string())],
        ),
        QueryStyle::DeclarativeNamed => {
            let sql = select_where_eq_named(table, &[("first_name", "firstName"), ("last_name", "lastName")])?;
            NamedQuery::compile(
                &sql,
                &[("firstName", first_name.to_string()), ("lastName", last_name.to_string())],
            )
        }
        QueryStyle::NativeIndexed => {
            let mut q = QueryBuf::new();
            q.sql = format!(
                "SELECT * FROM {} s WHERE s.first_name = $1 AND s.last_name = $2",
                qualified_table(table)
            );
            q.push_param(first_name.to_string());
            q.push_param(last_name.to_string());
            Ok(q)
        }
        QueryStyle::NativeNamed => NamedQuery::compile(
            &format!(
                "SELECT * FROM {} s WHERE s.first_name = :firstName AND s.last_name = :lastName",
                qualified_table(table)
            ),
            &[("firstName", first_name.to_string()), ("lastName", last_name.to_string())],
        ),
    }
}

pub fn select_all(table: &StudentTable) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(table),
        qualified_table(table),
        quoted(table.pk)
    )
}

/// SELECT by primary key. Caller binds id as $1.
pub fn select_by_id(table: &StudentTable) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(table),
        qualified_table(table),
        quoted(table.pk)
    )
}

/// SELECT by email, lowest id first. Caller binds email as $1.
pub fn select_by_email(table: &StudentTable) -> String {
    format!(
        "SELECT {} FROM {} WHERE \"email\" = $1 ORDER BY {} LIMIT 1",
        select_column_list(table),
        qualified_table(table),
        quoted(table.pk)
    )
}

/// INSERT without the key; the store assigns it. Binds data columns in metadata order.
pub fn insert(table: &StudentTable) -> String {
    let cols: Vec<String> = table.data_columns().map(|c| quoted(c.name)).collect();
    let placeholders: Vec<String> = (1..=cols.len()).map(|n| format!("${}", n)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    )
}

/// INSERT with an explicit key, overwriting data columns on conflict. Binds key then data columns.
pub fn upsert(table: &StudentTable) -> String {
    let cols: Vec<String> = table.columns.iter().map(|c| quoted(c.name)).collect();
    let placeholders: Vec<String> = (1..=cols.len()).map(|n| format!("${}", n)).collect();
    let assignments: Vec<String> = table
        .data_columns()
        .map(|c| format!("{0} = EXCLUDED.{0}", quoted(c.name)))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING {}",
        qualified_table(table),
        cols.join(", "),
        placeholders.join(", "),
        quoted(table.pk),
        assignments.join(", "),
        select_column_list(table)
    )
}

/// Move the key sequence past the highest stored key so generated ids stay unused.
pub fn sync_key_sequence(table: &StudentTable) -> String {
    let full = qualified_table(table);
    format!(
        "SELECT setval(pg_get_serial_sequence('{}', '{}'), GREATEST((SELECT COALESCE(MAX({}), 0) FROM {}), 1))",
        full.replace('\'', "''"),
        table.pk,
        quoted(table.pk),
        full
    )
}

/// DELETE by primary key. Caller binds id as $1.
pub fn delete_by_id(table: &StudentTable) -> String {
    format!("DELETE FROM {} WHERE {} = $1", qualified_table(table), quoted(table.pk))
}

/// CREATE statements for the table and its lookup indexes.
pub fn create_table(table: &StudentTable) -> Vec<String> {
    let full = qualified_table(table);
    let defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quoted(c.name), c.ddl))
        .collect();
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&table.schema)),
        format!("CREATE TABLE IF NOT EXISTS {} ({})", full, defs.join(", ")),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (\"email\")",
            quoted(&format!("{}_email_idx", table.name)),
            full
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (\"first_name\", \"last_name\")",
            quoted(&format!("{}_name_idx", table.name)),
            full
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarative_indexed_lookup() {
        let q = name_lookup(&StudentTable::default(), QueryStyle::DeclarativeIndexed, "Fernando", "Salas").unwrap();
        assert_eq!(
            q.sql,
            r#"SELECT "id", "first_name", "last_name", "email" FROM "public"."students" WHERE "first_name" = $1 AND "last_name" = $2"#
        );
        assert_eq!(q.params, vec!["Fernando".to_string(), "Salas".to_string()]);
    }

    #[test]
    fn declarative_styles_compile_to_same_statement() {
        let table = StudentTable::new("school");
        let indexed = name_lookup(&table, QueryStyle::DeclarativeIndexed, "Claudia", "Ramos").unwrap();
        let named = name_lookup(&table, QueryStyle::DeclarativeNamed, "Claudia", "Ramos").unwrap();
        assert_eq!(indexed.sql, named.sql);
        assert_eq!(indexed.params, named.params);
    }

    #[test]
    fn native_styles_compile_to_same_statement() {
        let table = StudentTable::default();
        let indexed = name_lookup(&table, QueryStyle::NativeIndexed, "Claudia", "Ramos").unwrap();
        let named = name_lookup(&table, QueryStyle::NativeNamed, "Claudia", "Ramos").unwrap();
        assert_eq!(indexed.sql, named.sql);
        assert_eq!(indexed.params, named.params);
        assert!(indexed.sql.starts_with(r#"SELECT * FROM "public"."students" s"#));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = select_where_eq(&StudentTable::default(), &[("nickname", "x".into())]).unwrap_err();
        assert!(matches!(err, AppError::Query(_)));
    }

    #[test]
    fn insert_skips_key() {
        assert_eq!(
            insert(&StudentTable::default()),
            r#"INSERT INTO "public"."students" ("first_name", "last_name", "email") VALUES ($1, $2, $3) RETURNING "id", "first_name", "last_name", "email""#
        );
    }

    #[test]
    fn upsert_overwrites_data_columns() {
        let sql = upsert(&StudentTable::default());
        assert!(sql.contains(r#"ON CONFLICT ("id") DO UPDATE SET "first_name" = EXCLUDED."first_name", "last_name" = EXCLUDED."last_name", "email" = EXCLUDED."email""#));
        assert!(sql.contains("VALUES ($1, $2, $3, $4)"));
    }

    #[test]
    fn identifiers_are_quoted() {
        let table = StudentTable::new(r#"we"ird"#);
        assert_eq!(qualified_table(&table), r#""we""ird"."students""#);
    }
}

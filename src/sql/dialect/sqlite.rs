//! SQLite dialect.
//!
//! SQLite types are declared loosely; classification follows SQLite's
//! column affinity rules, with dates and times split out:
//! - ANSI identifier quoting (`"`)
//! - `?N` numbered bind parameters
//! - Catalog comes from `pragma_table_info` / `pragma_foreign_key_list`
//! - A database only ever holds the `main` and `temp` namespaces here

use super::helpers;
use super::{SqlDialect, TypeClass};

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn float_cast(&self, expr: &str) -> String {
        format!("CAST({} AS REAL)", expr)
    }

    fn default_namespace(&self) -> &'static str {
        "main"
    }

    // The pragma functions need a concrete schema.
    fn namespace_param(&self, requested: Option<&str>) -> Option<String> {
        Some(requested.unwrap_or(self.default_namespace()).to_string())
    }

    fn known_namespace(&self, namespace: &str) -> bool {
        namespace.eq_ignore_ascii_case("main") || namespace.eq_ignore_ascii_case("temp")
    }

    fn table_columns_sql(&self) -> String {
        let table = self.placeholder(1);
        let namespace = self.placeholder(2);
        format!(
            "SELECT \
                lower({ns}), \
                p.name, \
                p.type, \
                NULL, \
                NULL, \
                NULL, \
                CASE WHEN p.\"notnull\" = 0 AND p.pk = 0 THEN 1 ELSE 0 END, \
                p.cid + 1, \
                CASE WHEN p.pk > 0 THEN 1 ELSE 0 END, \
                CASE WHEN EXISTS (SELECT 1 FROM pragma_foreign_key_list({t}, {ns}) f WHERE f.\"from\" = p.name) THEN 1 ELSE 0 END, \
                CASE WHEN p.pk = 1 AND upper(p.type) = 'INTEGER' \
                    AND (SELECT COUNT(*) FROM pragma_table_info({t}, {ns}) k WHERE k.pk > 0) = 1 THEN 1 ELSE 0 END, \
                (SELECT m.name FROM sqlite_master m \
                    WHERE lower({ns}) = 'main' AND m.type IN ('table', 'view') AND m.name = {t} COLLATE NOCASE \
                 UNION ALL \
                 SELECT m.name FROM sqlite_temp_master m \
                    WHERE lower({ns}) = 'temp' AND m.type IN ('table', 'view') AND m.name = {t} COLLATE NOCASE \
                 LIMIT 1) \
            FROM pragma_table_info({t}, {ns}) p \
            ORDER BY p.cid",
            t = table,
            ns = namespace,
        )
    }

    fn classify_type(&self, declared_type: &str) -> TypeClass {
        let upper = declared_type.to_uppercase();
        let has = |needle: &str| upper.contains(needle);

        if has("BOOL") {
            TypeClass::Other
        } else if has("INT") {
            TypeClass::Numeric
        } else if has("CHAR") || has("CLOB") || has("TEXT") {
            TypeClass::Text
        } else if has("DATE") || has("TIME") {
            TypeClass::Temporal
        } else if has("REAL")
            || has("FLOA")
            || has("DOUB")
            || has("NUM")
            || has("DEC")
            || has("MONEY")
        {
            TypeClass::Numeric
        } else {
            TypeClass::Other
        }
    }
}

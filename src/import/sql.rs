//! SQL Import functionality
//!
//! Parses the DDL subset written by the SQL exporter: CREATE TABLE blocks
//! with column definitions, PRIMARY KEY (...) and FOREIGN KEY (...)
//! REFERENCES ...(...) clauses, standalone ALTER TABLE ... ADD FOREIGN KEY
//! statements and `-- suggested:` canonical-name comments. It is not a
//! general SQL parser; anything else is skipped or reported in
//! [`ImportResult::errors`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{ImportError, ImportResult};
use crate::models::{ColumnSpec, ForeignKeyRef, NormalizedSchema, SchemaKeys, SqlType};

const IDENT: &str = r#"(?:"(?:[^"]|"")+"|`[^`]+`|[A-Za-z_][\w$]*)"#;

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({IDENT})\s*\("
    ))
    .unwrap()
});

static ALTER_FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)\bALTER\s+TABLE\s+({IDENT})\s+ADD\s+(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+({IDENT})\s*\(([^)]*)\)"
    ))
    .unwrap()
});

static CONSTRAINT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^CONSTRAINT\s+{IDENT}\s+")).unwrap());

static PRIMARY_KEY_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^PRIMARY\s+KEY\s*\(([^)]*)\)$").unwrap());

static FOREIGN_KEY_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+({IDENT})\s*\(([^)]*)\)"
    ))
    .unwrap()
});

static OTHER_CONSTRAINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(UNIQUE|CHECK|INDEX|KEY)\b").unwrap());

static COLUMN_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^({IDENT})\s+(.+?)(\s+NOT\s+NULL|\s+NULL)?(\s+PRIMARY\s+KEY)?$"
    ))
    .unwrap()
});


/// One top-level item of a CREATE TABLE body with its trailing comment
#[derive(Debug, Default)]
struct BodyItem {
    text: String,
    comment: Option<String>,
}

/// SQL Importer - parses DDL written by the SQL exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLImporter;

impl SQLImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse DDL text into a schema and keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use schema_inference_sdk::import::SQLImporter;
    ///
    /// let sql = "CREATE TABLE users (\n  id INT NOT NULL,\n  PRIMARY KEY (id)\n);";
    /// let result = SQLImporter::new().parse(sql);
    /// assert!(result.errors.is_empty());
    /// assert_eq!(result.keys.selected_primary_key("users"), vec!["id"]);
    /// ```
    pub fn parse(&self, sql: &str) -> ImportResult {
        let mut schema = NormalizedSchema::new();
        let mut keys = SchemaKeys::new();
        let mut errors = Vec::new();

        let mut pos = 0;
        while let Some(caps) = CREATE_TABLE.captures(&sql[pos..]) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let table = unquote(name.as_str());
            let body_start = pos + whole.end();

            let Some((items, end)) = scan_body(sql, body_start) else {
                errors.push(ImportError::ParseError(format!(
                    "Unterminated CREATE TABLE statement for '{}'",
                    table
                )));
                break;
            };
            pos = end;

            let columns = parse_table_body(&table, items, &mut keys, &mut errors);
            if columns.is_empty() {
                errors.push(ImportError::ValidationError(format!(
                    "Table '{}' has no columns",
                    table
                )));
                continue;
            }
            debug!(table = %table, columns = columns.len(), "Parsed CREATE TABLE");
            schema.insert_table(table, columns);
        }

        let without_comments = strip_line_comments(sql);
        for caps in ALTER_FOREIGN_KEY.captures_iter(&without_comments) {
            let source_table = unquote(&caps[1]);
            let target_table = unquote(&caps[3]);
            push_foreign_keys(
                &mut keys,
                &mut errors,
                &source_table,
                &caps[2],
                &target_table,
                &caps[4],
            );
        }

        ImportResult {
            schema,
            keys,
            errors,
        }
    }
}

fn parse_table_body(
    table: &str,
    items: Vec<BodyItem>,
    keys: &mut SchemaKeys,
    errors: &mut Vec<ImportError>,
) -> IndexMap<String, ColumnSpec> {
    let mut columns: IndexMap<String, ColumnSpec> = IndexMap::new();
    let mut primary_key: Vec<String> = Vec::new();

    for item in items {
        let text = CONSTRAINT_PREFIX.replace(&item.text, "");
        let text = text.trim();

        if let Some(caps) = PRIMARY_KEY_CLAUSE.captures(text) {
            primary_key.extend(split_identifiers(&caps[1]));
            continue;
        }
        if let Some(caps) = FOREIGN_KEY_CLAUSE.captures(text) {
            let target = unquote(&caps[2]);
            push_foreign_keys(keys, errors, table, &caps[1], &target, &caps[3]);
            continue;
        }
        if OTHER_CONSTRAINT.is_match(text) {
            continue;
        }

        let Some(caps) = COLUMN_DEF.captures(text) else {
            errors.push(ImportError::ParseError(format!(
                "Unrecognized item in table '{}': {}",
                table, text
            )));
            continue;
        };
        let name = unquote(&caps[1]);
        let sql_type = match caps[2].parse::<SqlType>() {
            Ok(sql_type) => sql_type,
            Err(e) => {
                errors.push(ImportError::ParseError(format!(
                    "Invalid type for column '{}.{}': {}",
                    table, name, e
                )));
                continue;
            }
        };
        let not_null = caps
            .get(3)
            .is_some_and(|m| m.as_str().to_uppercase().contains("NOT"));
        let inline_pk = caps.get(4).is_some();
        if inline_pk {
            primary_key.push(name.clone());
        }

        let mut spec = ColumnSpec::new(sql_type, !(not_null || inline_pk));
        spec.canonical_name = item
            .comment
            .as_deref()
            .and_then(|c| c.strip_prefix("suggested:"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        columns.insert(name, spec);
    }

    for column in primary_key {
        if columns.contains_key(&column) {
            keys.add_primary_key(table, &column);
        } else {
            errors.push(ImportError::ValidationError(format!(
                "Primary key column '{}' not found in table '{}'",
                column, table
            )));
        }
    }
    columns
}

fn push_foreign_keys(
    keys: &mut SchemaKeys,
    errors: &mut Vec<ImportError>,
    source_table: &str,
    source_columns: &str,
    target_table: &str,
    target_columns: &str,
) {
    let sources = split_identifiers(source_columns);
    let targets = split_identifiers(target_columns);
    if sources.len() != targets.len() || sources.is_empty() {
        errors.push(ImportError::ValidationError(format!(
            "Foreign key column count mismatch: {}({}) -> {}({})",
            source_table, source_columns, target_table, target_columns
        )));
        return;
    }
    for (source, target) in sources.iter().zip(&targets) {
        let fk = ForeignKeyRef::new((source_table, source.as_str()), (target_table, target.as_str()));
        if !keys.foreign_keys.contains(&fk) {
            keys.foreign_keys.push(fk);
        }
    }
}

/// Split a CREATE TABLE body starting right after its opening parenthesis
/// into top-level items. Returns the items and the byte offset just past
/// the closing parenthesis.
fn scan_body(sql: &str, start: usize) -> Option<(Vec<BodyItem>, usize)> {
    let chars: Vec<(usize, char)> = sql[start..].char_indices().collect();
    let mut items: Vec<BodyItem> = Vec::new();
    let mut current = BodyItem::default();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        if let Some(q) = quote {
            current.text.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '`' | '\'' => {
                quote = Some(c);
                current.text.push(c);
            }
            '-' if chars.get(i + 1).is_some_and(|(_, next)| *next == '-') => {
                let mut j = i + 2;
                let mut comment = String::new();
                while j < chars.len() && chars[j].1 != '\n' {
                    comment.push(chars[j].1);
                    j += 1;
                }
                let comment = comment.trim().to_string();
                // A comment after the separator belongs to the previous item
                if current.text.trim().is_empty() {
                    if let Some(last) = items.last_mut() {
                        last.comment.get_or_insert(comment);
                    }
                } else {
                    current.comment.get_or_insert(comment);
                }
                i = j;
                continue;
            }
            '(' => {
                depth += 1;
                current.text.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    flush(&mut items, &mut current);
                    return Some((items, start + offset + c.len_utf8()));
                }
                current.text.push(c);
            }
            ',' if depth == 1 => flush(&mut items, &mut current),
            _ => current.text.push(c),
        }
        i += 1;
    }
    None
}

fn flush(items: &mut Vec<BodyItem>, current: &mut BodyItem) {
    let item = std::mem::take(current);
    let text = item.text.trim();
    if !text.is_empty() {
        items.push(BodyItem {
            text: text.to_string(),
            comment: item.comment,
        });
    }
}

/// Closing character of an identifier or string quote
fn closing_quote(c: char) -> Option<char> {
    match c {
        '"' | '`' | '\'' => Some(c),
        '[' => Some(']'),
        _ => None,
    }
}

/// Split a column list on commas outside quotes
fn split_identifiers(list: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in list.chars() {
        match quote {
            Some(close) => {
                if c == close {
                    quote = None;
                }
                current.push(c);
            }
            None if c == ',' => pieces.push(std::mem::take(&mut current)),
            None => {
                quote = closing_quote(c);
                current.push(c);
            }
        }
    }
    pieces.push(current);

    pieces
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(unquote)
        .collect()
}

/// Remove `--` line comments that sit outside quoted text
fn strip_line_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(close) = quote {
            if c == close {
                quote = None;
            }
            out.push(c);
            continue;
        }
        if c == '-' && chars.peek() == Some(&'-') {
            while chars.next_if(|next| *next != '\n').is_some() {}
            continue;
        }
        quote = closing_quote(c);
        out.push(c);
    }
    out
}

/// Strip identifier quotes and undo doubled quote escapes
fn unquote(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.len() >= 2 {
        if let Some(inner) = identifier
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
        {
            return inner.replace("\"\"", "\"");
        }
        if let Some(inner) = identifier
            .strip_prefix('`')
            .and_then(|s| s.strip_suffix('`'))
        {
            return inner.to_string();
        }
        if let Some(inner) = identifier
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            return inner.to_string();
        }
    }
    identifier.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_and_alter() {
        let sql = "CREATE TABLE customers (\n  id INT NOT NULL,\n  full_name VARCHAR(30) NULL, -- suggested: name\n  PRIMARY KEY (id)\n);\n\nCREATE TABLE orders (\n  order_id INT NOT NULL,\n  customer_id INT NOT NULL\n);\n\nALTER TABLE orders ADD FOREIGN KEY (customer_id) REFERENCES customers (id);\n";
        let result = SQLImporter::new().parse(sql);
        assert!(result.errors.is_empty(), "{:?}", result.errors);

        let customers = &result.schema.tables["customers"];
        assert_eq!(customers["id"].sql_type, SqlType::Int);
        assert!(!customers["id"].nullable);
        assert_eq!(customers["full_name"].sql_type, SqlType::Varchar(30));
        assert!(customers["full_name"].nullable);
        assert_eq!(customers["full_name"].canonical_name.as_deref(), Some("name"));

        assert_eq!(result.keys.selected_primary_key("customers"), vec!["id"]);
        assert!(result.keys.selected_primary_key("orders").is_empty());
        assert_eq!(
            result.keys.foreign_keys,
            vec![ForeignKeyRef::new(("orders", "customer_id"), ("customers", "id"))]
        );
    }

    #[test]
    fn test_comment_on_last_column() {
        let sql = "CREATE TABLE t (\n  a INT NOT NULL,\n  b TEXT NULL -- suggested: label\n);";
        let result = SQLImporter::new().parse(sql);
        let t = &result.schema.tables["t"];
        assert_eq!(t["b"].canonical_name.as_deref(), Some("label"));
        assert_eq!(t["a"].canonical_name, None);
    }

    #[test]
    fn test_inline_foreign_key_and_composite_primary_key() {
        let sql = r#"CREATE TABLE IF NOT EXISTS "order" (
  "Line No" INT NOT NULL,
  order_id INT NOT NULL,
  CONSTRAINT pk_order PRIMARY KEY ("Line No", order_id),
  FOREIGN KEY (order_id) REFERENCES orders (id)
);"#;
        let result = SQLImporter::new().parse(sql);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(
            result.keys.selected_primary_key("order"),
            vec!["Line No", "order_id"]
        );
        assert_eq!(result.keys.foreign_keys[0].target_table, "orders");
    }

    #[test]
    fn test_inline_primary_key() {
        let sql = "CREATE TABLE t (id BIGINT PRIMARY KEY, v TEXT);";
        let result = SQLImporter::new().parse(sql);
        assert_eq!(result.keys.selected_primary_key("t"), vec!["id"]);
        let t = &result.schema.tables["t"];
        assert_eq!(t["id"].sql_type, SqlType::Other("BIGINT".into()));
        assert!(!t["id"].nullable);
        assert!(t["v"].nullable);
    }

    #[test]
    fn test_errors_are_collected() {
        let sql = "CREATE TABLE a (\n  PRIMARY KEY (missing)\n);\nCREATE TABLE b (\n  x VARCHAR(abc) NULL,\n  y INT NULL\n);\nCREATE TABLE c (\n  z INT";
        let result = SQLImporter::new().parse(sql);
        assert!(!result.schema.contains_table("a"));
        assert!(result.schema.contains_column("b", "y"));
        assert!(!result.schema.contains_column("b", "x"));
        assert!(!result.schema.contains_table("c"));
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn test_quoted_comma_in_key_columns() {
        let sql = "CREATE TABLE t (\n  \"a,b\" INT NOT NULL,\n  c INT NOT NULL,\n  PRIMARY KEY (\"a,b\", c)\n);";
        let result = SQLImporter::new().parse(sql);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.keys.selected_primary_key("t"), vec!["a,b", "c"]);
    }

    #[test]
    fn test_dashes_inside_quoted_reference() {
        let sql = "CREATE TABLE \"x--y\" (\n  id INT NOT NULL,\n  PRIMARY KEY (id)\n);\n\nCREATE TABLE t (\n  ref INT NULL -- suggested: x_ref\n);\n\nALTER TABLE t ADD FOREIGN KEY (ref) REFERENCES \"x--y\" (id);\n";
        let result = SQLImporter::new().parse(sql);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.schema.contains_table("x--y"));
        assert_eq!(
            result.keys.foreign_keys,
            vec![ForeignKeyRef::new(("t", "ref"), ("x--y", "id"))]
        );
        assert_eq!(result.schema.tables["t"]["ref"].canonical_name.as_deref(), Some("x_ref"));
    }

    #[test]
    fn test_strip_line_comments() {
        assert_eq!(strip_line_comments("a -- note\nb"), "a \nb");
        assert_eq!(strip_line_comments("\"p--q\" -- c"), "\"p--q\" ");
        assert_eq!(split_identifiers("[x,y], `z`"), vec!["x,y", "z"]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"my \"\"col\"\"\""), "my \"col\"");
        assert_eq!(unquote("`tick`"), "tick");
        assert_eq!(unquote(" plain "), "plain");
    }
}

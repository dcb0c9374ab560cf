//! MySQL administration tools.
//!
//! Connection parameters come from [`MysqlConfig`] at construction time.
//! Every tool keeps the assistant's convention of shadowing database work
//! into a companion `.sql` file so sessions leave an auditable script behind.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use chrono::Utc;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Row};
use serde_json::{Value, json};

use factotum_core::config::MysqlConfig;
use factotum_core::schema::{ParamSpec, ParamType, ToolArgs, ToolSpec};
use factotum_core::tool::{FailureKind, Tool, ToolKind, ToolOutcome};

const SYSTEM_DATABASES: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];
const METADATA_TABLE: &str = "_database_metadata";

/// Keep only alphanumerics and underscores, lowercased. An empty result is
/// an invalid name.
fn sanitize_db_name(name: &str) -> Result<String, FailureKind> {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        return Err(FailureKind::InvalidInput {
            message: format!("invalid database name: '{name}'"),
        });
    }
    Ok(cleaned)
}

fn connect(config: &MysqlConfig, database: Option<&str>) -> Result<Conn, FailureKind> {
    let opts = OptsBuilder::new()
        .ip_or_hostname(Some(config.host.clone()))
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(database);
    Conn::new(opts).map_err(|e| FailureKind::Database {
        message: e.to_string(),
    })
}

fn sql_value_to_json(value: mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        mysql::Value::Int(i) => json!(i),
        mysql::Value::UInt(u) => json!(u),
        mysql::Value::Float(f) => json!(f),
        mysql::Value::Double(d) => json!(d),
        other => Value::String(format!("{other:?}")),
    }
}

fn sql_file_for(db_name: &str) -> PathBuf {
    PathBuf::from(format!("{db_name}.sql"))
}

fn statement_type(statement: &str) -> String {
    statement
        .split_whitespace()
        .next()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
}

// ---------------------------------------------------------------------------
// create_mysql_database
// ---------------------------------------------------------------------------

/// Create a database with a metadata table and a companion script file.
pub struct CreateMysqlDatabaseTool {
    config: MysqlConfig,
}

impl CreateMysqlDatabaseTool {
    pub fn new(config: MysqlConfig) -> Self {
        Self { config }
    }
}

impl Tool for CreateMysqlDatabaseTool {
    fn kind(&self) -> ToolKind {
        ToolKind::CreateMysqlDatabase
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Create a new MySQL database with metadata tracking")
            .with_param(ParamSpec::required(
                "database_name",
                ParamType::String,
                "Name of the MySQL database to create",
            ))
            .with_param(ParamSpec::optional(
                "description",
                ParamType::String,
                "Description of the database purpose",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let database_name = args.str_or("database_name", "");
        let description = args.str_or("description", "");

        let db_name = match sanitize_db_name(database_name) {
            Ok(name) => name,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let mut conn = match connect(&self.config, None) {
            Ok(conn) => conn,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let result = (|| -> Result<(), mysql::Error> {
            conn.query_drop(format!("CREATE DATABASE IF NOT EXISTS {db_name}"))?;
            conn.query_drop(format!("USE {db_name}"))?;
            conn.query_drop(format!(
                "CREATE TABLE IF NOT EXISTS {METADATA_TABLE} (
                    metadata_key VARCHAR(255) PRIMARY KEY,
                    metadata_value TEXT,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )"
            ))?;
            let upsert = format!(
                "INSERT INTO {METADATA_TABLE} (metadata_key, metadata_value)
                 VALUES (?, ?)
                 ON DUPLICATE KEY UPDATE metadata_value = VALUES(metadata_value)"
            );
            conn.exec_drop(&upsert, ("database_name", database_name))?;
            conn.exec_drop(&upsert, ("description", description))?;
            Ok(())
        })();
        if let Err(e) = result {
            return ToolOutcome::failed(FailureKind::Database {
                message: e.to_string(),
            });
        }

        let sql_file = sql_file_for(&db_name);
        let script = format!(
            "-- MySQL Database: {database_name}\n\
             -- Created: {}\n\
             -- Description: {description}\n\n\
             CREATE DATABASE IF NOT EXISTS {db_name};\n\
             USE {db_name};\n\n\
             -- Metadata table\n\
             CREATE TABLE IF NOT EXISTS {METADATA_TABLE} (\n\
             \x20   metadata_key VARCHAR(255) PRIMARY KEY,\n\
             \x20   metadata_value TEXT,\n\
             \x20   created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP);\n",
            Utc::now().to_rfc3339()
        );
        if let Err(e) = std::fs::write(&sql_file, script) {
            return ToolOutcome::failed(FailureKind::Io {
                message: format!("failed to write {}: {e}", sql_file.display()),
            });
        }

        ToolOutcome::success(json!({
            "database_name": database_name,
            "mysql_database": db_name,
            "sql_file": sql_file.display().to_string(),
            "description": description,
            "host": self.config.host,
            "created_at": Utc::now().to_rfc3339(),
            "status": "created",
        }))
    }
}

// ---------------------------------------------------------------------------
// execute_mysql_command
// ---------------------------------------------------------------------------

/// Run one or more SQL statements, reporting per-statement results.
pub struct ExecuteMysqlCommandTool {
    config: MysqlConfig,
}

impl ExecuteMysqlCommandTool {
    pub fn new(config: MysqlConfig) -> Self {
        Self { config }
    }
}

impl Tool for ExecuteMysqlCommandTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ExecuteMysqlCommand
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Execute SQL commands on MySQL database and save to .sql file",
        )
        .with_param(ParamSpec::required(
            "database_name",
            ParamType::String,
            "Name of the MySQL database",
        ))
        .with_param(ParamSpec::required(
            "sql_command",
            ParamType::String,
            "SQL command(s) to execute",
        ))
        .with_param(ParamSpec::optional(
            "save_to_file",
            ParamType::Boolean,
            "Whether to save commands to .sql file (default: true)",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let database_name = args.str_or("database_name", "");
        let sql_command = args.str_or("sql_command", "");
        let save_to_file = args.bool_or("save_to_file", true);

        let db_name = match sanitize_db_name(database_name) {
            Ok(name) => name,
            Err(reason) => return ToolOutcome::failed(reason),
        };
        let mut conn = match connect(&self.config, Some(&db_name)) {
            Ok(conn) => conn,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let statements: Vec<&str> = sql_command
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            // Per-statement failures are reported inline; later statements
            // still run.
            if statement_type(statement) == "SELECT" {
                match conn.query_iter(*statement) {
                    Ok(query_result) => {
                        let columns: Vec<String> = query_result
                            .columns()
                            .as_ref()
                            .iter()
                            .map(|c| c.name_str().into_owned())
                            .collect();
                        let mut rows: Vec<Value> = Vec::new();
                        let mut row_error = None;
                        for row in query_result {
                            match row {
                                Ok(row) => rows.push(Value::Array(
                                    Row::unwrap(row)
                                        .into_iter()
                                        .map(sql_value_to_json)
                                        .collect(),
                                )),
                                Err(e) => {
                                    row_error = Some(e.to_string());
                                    break;
                                }
                            }
                        }
                        match row_error {
                            None => results.push(json!({
                                "command": statement,
                                "type": "SELECT",
                                "rows": rows,
                                "columns": columns,
                                "row_count": rows.len(),
                            })),
                            Some(e) => results.push(json!({
                                "command": statement,
                                "error": e,
                                "success": false,
                            })),
                        }
                    }
                    Err(e) => results.push(json!({
                        "command": statement,
                        "error": e.to_string(),
                        "success": false,
                    })),
                }
            } else {
                match conn.query_drop(*statement) {
                    Ok(()) => results.push(json!({
                        "command": statement,
                        "type": statement_type(statement),
                        "rows_affected": conn.affected_rows(),
                        "success": true,
                    })),
                    Err(e) => results.push(json!({
                        "command": statement,
                        "error": e.to_string(),
                        "success": false,
                    })),
                }
            }
        }

        let mut sql_saved = false;
        if save_to_file {
            let sql_file = sql_file_for(&db_name);
            let appended = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&sql_file)
                .and_then(|mut f| {
                    writeln!(f, "\n-- Executed: {}", Utc::now().to_rfc3339())?;
                    writeln!(f, "{sql_command};")
                });
            match appended {
                Ok(()) => sql_saved = true,
                Err(e) => {
                    tracing::warn!(path = %sql_file.display(), error = %e, "Failed to append SQL log")
                }
            }
        }

        ToolOutcome::success(json!({
            "database_name": database_name,
            "mysql_database": db_name,
            "commands_executed": statements.len(),
            "results": results,
            "execution_time": Utc::now().to_rfc3339(),
            "sql_saved": sql_saved,
        }))
    }
}

// ---------------------------------------------------------------------------
// analyze_mysql_database_structure
// ---------------------------------------------------------------------------

/// Inspect a database's schema and grade its normalization.
pub struct AnalyzeMysqlDatabaseStructureTool {
    config: MysqlConfig,
}

impl AnalyzeMysqlDatabaseStructureTool {
    pub fn new(config: MysqlConfig) -> Self {
        Self { config }
    }
}

impl Tool for AnalyzeMysqlDatabaseStructureTool {
    fn kind(&self) -> ToolKind {
        ToolKind::AnalyzeMysqlDatabaseStructure
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Analyze MySQL database structure and provide educational insights about normalization",
        )
        .with_param(ParamSpec::required(
            "database_name",
            ParamType::String,
            "Name of the MySQL database to analyze",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let database_name = args.str_or("database_name", "");
        let db_name = match sanitize_db_name(database_name) {
            Ok(name) => name,
            Err(reason) => return ToolOutcome::failed(reason),
        };
        let mut conn = match connect(&self.config, Some(&db_name)) {
            Ok(conn) => conn,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let analysis = (|| -> Result<Value, mysql::Error> {
            let tables: Vec<String> = conn
                .query::<String, _>("SHOW TABLES")?
                .into_iter()
                .filter(|t| t != METADATA_TABLE)
                .collect();

            let mut table_info = Vec::new();
            let mut relationships = Vec::new();

            for table_name in &tables {
                let columns: Vec<Row> = conn.query(format!("DESCRIBE {table_name}"))?;
                let described: Vec<(String, String, String, String)> = columns
                    .into_iter()
                    .map(|row| {
                        let values = Row::unwrap(row);
                        let text = |idx: usize| match values.get(idx) {
                            Some(mysql::Value::Bytes(b)) => {
                                String::from_utf8_lossy(b).into_owned()
                            }
                            _ => String::new(),
                        };
                        (text(0), text(1), text(2), text(3))
                    })
                    .collect();

                let foreign_keys: Vec<(String, String, String)> = conn.exec(
                    "SELECT COLUMN_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME
                     FROM information_schema.KEY_COLUMN_USAGE
                     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
                       AND REFERENCED_TABLE_NAME IS NOT NULL",
                    (db_name.as_str(), table_name.as_str()),
                )?;

                let primary_keys: Vec<&String> = described
                    .iter()
                    .filter(|(_, _, _, key)| key == "PRI")
                    .map(|(name, _, _, _)| name)
                    .collect();
                let nullable_columns: Vec<&String> = described
                    .iter()
                    .filter(|(_, _, nullable, _)| nullable == "YES")
                    .map(|(name, _, _, _)| name)
                    .collect();

                for (column, ref_table, ref_column) in &foreign_keys {
                    relationships.push(json!({
                        "from_table": table_name,
                        "from_column": column,
                        "to_table": ref_table,
                        "to_column": ref_column,
                        "relationship_type": "foreign_key",
                    }));
                }

                table_info.push(json!({
                    "table_name": table_name,
                    "column_count": described.len(),
                    "columns": described.iter().map(|(name, ty, nullable, key)| json!({
                        "name": name,
                        "type": ty,
                        "nullable": nullable == "YES",
                        "key": key,
                    })).collect::<Vec<_>>(),
                    "primary_keys": primary_keys,
                    "foreign_keys": foreign_keys.iter().map(|(c, t, rc)| json!({
                        "column": c,
                        "references_table": t,
                        "references_column": rc,
                    })).collect::<Vec<_>>(),
                    "nullable_columns": nullable_columns,
                }));
            }

            let mut normalization_issues: Vec<String> = Vec::new();
            let mut good_practices: Vec<String> = Vec::new();
            for table in &table_info {
                let name = table["table_name"].as_str().unwrap_or_default();
                let column_count = table["column_count"].as_u64().unwrap_or(0);
                let pk_count = table["primary_keys"].as_array().map(Vec::len).unwrap_or(0);
                let has_fk = table["foreign_keys"]
                    .as_array()
                    .is_some_and(|fks| !fks.is_empty());

                if pk_count > 1 {
                    good_practices.push(format!(
                        "Table '{name}' uses composite primary key - excellent for junction tables and complex relationships"
                    ));
                }
                if has_fk {
                    good_practices.push(format!(
                        "Table '{name}' implements referential integrity through foreign key constraints"
                    ));
                }
                if column_count > 15 {
                    normalization_issues.push(format!(
                        "Table '{name}' has many columns ({column_count}) - consider decomposition for better normalization"
                    ));
                }
            }

            let total_relationships = relationships.len();
            let normalization_level = if total_relationships == 0 {
                "1NF"
            } else if !normalization_issues.is_empty() {
                "2NF"
            } else {
                "3NF"
            };
            let relationship_complexity = if total_relationships > 5 {
                "High"
            } else if total_relationships > 0 {
                "Medium"
            } else {
                "Simple"
            };

            Ok(json!({
                "database_name": database_name,
                "mysql_database": db_name,
                "total_tables": tables.len(),
                "total_relationships": total_relationships,
                "tables": table_info,
                "relationships": relationships,
                "educational_analysis": {
                    "normalization_level": normalization_level,
                    "normalization_explanation": format!(
                        "This database demonstrates {normalization_level} (Normal Form) principles"
                    ),
                    "design_strengths": good_practices,
                    "improvement_suggestions": normalization_issues.clone(),
                    "relationship_complexity": relationship_complexity,
                    "educational_summary": format!(
                        "Database shows {} design practices with proper table relationships and data integrity constraints.",
                        if normalization_issues.is_empty() { "excellent" } else { "good" }
                    ),
                },
                "analysis_timestamp": Utc::now().to_rfc3339(),
            }))
        })();

        match analysis {
            Ok(payload) => ToolOutcome::success(payload),
            Err(e) => ToolOutcome::failed(FailureKind::Database {
                message: e.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// list_mysql_databases
// ---------------------------------------------------------------------------

/// List non-system databases with table counts and metadata.
pub struct ListMysqlDatabasesTool {
    config: MysqlConfig,
}

impl ListMysqlDatabasesTool {
    pub fn new(config: MysqlConfig) -> Self {
        Self { config }
    }
}

impl Tool for ListMysqlDatabasesTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ListMysqlDatabases
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "List all MySQL databases with metadata")
    }

    fn call(&self, _args: ToolArgs) -> ToolOutcome {
        let mut conn = match connect(&self.config, None) {
            Ok(conn) => conn,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let listing = (|| -> Result<Vec<Value>, mysql::Error> {
            let databases: Vec<String> = conn.query("SHOW DATABASES")?;
            let mut info = Vec::new();

            for db_name in databases
                .iter()
                .filter(|db| !SYSTEM_DATABASES.contains(&db.as_str()))
            {
                // A database that disappears or denies access mid-listing is
                // skipped rather than failing the whole report.
                if conn.query_drop(format!("USE {db_name}")).is_err() {
                    continue;
                }
                let Ok(tables) = conn.query::<String, _>("SHOW TABLES") else {
                    continue;
                };

                let mut entry = json!({
                    "database_name": db_name,
                    "table_count": tables.len(),
                    "has_metadata": false,
                });

                if tables.iter().any(|t| t == METADATA_TABLE) {
                    entry["has_metadata"] = json!(true);
                    if let Ok(metadata) = conn.query::<(String, String), _>(format!(
                        "SELECT metadata_key, metadata_value FROM {METADATA_TABLE}"
                    )) {
                        entry["metadata"] = Value::Object(
                            metadata
                                .into_iter()
                                .map(|(k, v)| (k, Value::String(v)))
                                .collect(),
                        );
                    }
                }
                info.push(entry);
            }
            Ok(info)
        })();

        match listing {
            Ok(databases) => ToolOutcome::success(json!({
                "total_databases": databases.len(),
                "databases": databases,
                "mysql_host": self.config.host,
                "scan_timestamp": Utc::now().to_rfc3339(),
            })),
            Err(e) => ToolOutcome::failed(FailureKind::Database {
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_names_are_sanitized() {
        assert_eq!(sanitize_db_name("My-App DB!").unwrap(), "myappdb");
        assert_eq!(sanitize_db_name("shop_2024").unwrap(), "shop_2024");
        assert!(sanitize_db_name("!!!").is_err());
        assert!(sanitize_db_name("").is_err());
    }

    #[test]
    fn statement_types_come_from_first_word() {
        assert_eq!(statement_type("select * from t"), "SELECT");
        assert_eq!(statement_type("  INSERT INTO t VALUES (1)"), "INSERT");
        assert_eq!(statement_type(""), "UNKNOWN");
    }

    #[test]
    fn sql_values_become_json() {
        assert_eq!(sql_value_to_json(mysql::Value::NULL), Value::Null);
        assert_eq!(sql_value_to_json(mysql::Value::Int(-3)), json!(-3));
        assert_eq!(
            sql_value_to_json(mysql::Value::Bytes(b"abc".to_vec())),
            json!("abc")
        );
    }
}

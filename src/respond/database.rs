//! SQLite rule storage.

use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::respond::persist::RuleRepository;
use crate::respond::rule::{RoomId, Rule, Scope};

/// Rules persisted in a SQLite database.
pub struct RuleDatabase {
    conn: Mutex<Connection>,
}

impl RuleDatabase {
    /// Create a new in-memory database.
    pub fn new() -> Result<Self, String> {
        let conn = Connection::open_in_memory()
            .map_err(|e| format!("Failed to create in-memory database: {e}"))?;
        Self::with_connection(conn)
    }

    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, String> {
        let conn = Connection::open(path)
            .map_err(|e| format!("Failed to open database {:?}: {e}", path))?;
        let db = Self::with_connection(conn)?;

        info!("Opened rule database {:?} ({} rules)", path, db.count()?);
        Ok(db)
    }

    fn with_connection(conn: Connection) -> Result<Self, String> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_schema()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn.lock().map_err(|_| "Rule database lock poisoned".to_string())
    }

    fn init_schema(&self) -> Result<(), String> {
        let conn = self.lock()?;

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS rules (
                scope TEXT NOT NULL,
                room_id INTEGER NOT NULL DEFAULT 0,
                normalized_trigger TEXT NOT NULL,
                trigger TEXT NOT NULL,
                response_template TEXT NOT NULL,
                created_order INTEGER NOT NULL,
                saved_at TEXT NOT NULL,
                PRIMARY KEY (scope, room_id, normalized_trigger)
            );

            CREATE INDEX IF NOT EXISTS idx_rules_created_order ON rules(created_order);
        "#).map_err(|e| format!("Failed to initialize database schema: {e}"))
    }

    /// Number of stored rules.
    pub fn count(&self) -> Result<usize, String> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM rules", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| format!("Failed to count rules: {e}"))
    }
}

fn scope_columns(scope: Scope) -> (&'static str, i64) {
    match scope {
        Scope::Global => ("global", 0),
        Scope::Room(RoomId(id)) => ("room", id),
    }
}

fn scope_from_columns(kind: &str, room_id: i64) -> Option<Scope> {
    match kind {
        "global" => Some(Scope::Global),
        "room" => Some(Scope::Room(RoomId(room_id))),
        _ => None,
    }
}

impl RuleRepository for RuleDatabase {
    fn load(&self) -> Result<Vec<Rule>, String> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT scope, room_id, normalized_trigger, trigger, response_template, created_order
             FROM rules ORDER BY created_order ASC"
        ).map_err(|e| format!("Query error: {e}"))?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        }).map_err(|e| format!("Query execution error: {e}"))?;

        let mut rules = Vec::new();
        for row in rows {
            let (kind, room_id, normalized_trigger, trigger, response_template, created_order) =
                row.map_err(|e| format!("Row fetch error: {e}"))?;

            let Some(scope) = scope_from_columns(&kind, room_id) else {
                warn!("Skipping rule {:?} with unknown scope {:?}", trigger, kind);
                continue;
            };

            rules.push(Rule {
                trigger,
                normalized_trigger,
                response_template,
                scope,
                created_order: created_order as u64,
            });
        }

        Ok(rules)
    }

    fn save(&self, rules: &[Rule]) -> Result<(), String> {
        let mut conn = self.lock()?;
        let saved_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let tx = conn.transaction().map_err(|e| format!("Failed to begin transaction: {e}"))?;
        tx.execute("DELETE FROM rules", [])
            .map_err(|e| format!("Failed to clear rules: {e}"))?;

        for rule in rules {
            let (kind, room_id) = scope_columns(rule.scope);
            tx.execute(
                "INSERT OR REPLACE INTO rules (scope, room_id, normalized_trigger, trigger,
                     response_template, created_order, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    kind,
                    room_id,
                    rule.normalized_trigger,
                    rule.trigger,
                    rule.response_template,
                    rule.created_order as i64,
                    saved_at
                ]
            ).map_err(|e| format!("Failed to insert rule: {e}"))?;
        }

        tx.commit().map_err(|e| format!("Failed to commit rules: {e}"))
    }
}

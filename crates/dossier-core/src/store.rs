//! SQLite-backed agent store.
//!
//! One `agents` table with unique `codename` and `email` columns. The unique
//! constraints are the only guard against concurrent duplicate inserts; there
//! is no in-process uniqueness check before writing.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use dossier_config::DatabaseConfig;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::agent::{AccessLevel, Agent, AgentFields, AgentFilter};
use crate::error::StoreError;
use crate::traits::CodenameRegistry;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS agents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        codename TEXT NOT NULL UNIQUE,
        contact_number TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        access_level TEXT NOT NULL DEFAULT 'Secret'
            CHECK (access_level IN ('Secret', 'Top Secret', 'Most Secret'))
    );

    CREATE INDEX IF NOT EXISTS idx_agents_codename ON agents(codename);";

const SELECT_AGENT: &str = "SELECT id, codename, contact_number, email, access_level FROM agents";

/// Persistent collection of agents.
pub struct AgentStore {
    conn: Mutex<Connection>,
}

impl AgentStore {
    /// Open (or create) an agent store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;

        let store = Self::init(conn)?;
        info!("Opened agent store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open the store described by the `database` config section.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if config.in_memory {
            Self::in_memory()
        } else {
            Self::open(Path::new(&config.path))
        }
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Agents matching every constraint in `filter`, ordered by id.
    pub fn list(&self, filter: &AgentFilter) -> Result<Vec<Agent>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_AGENT}
             WHERE (?1 IS NULL OR instr(lower(codename), lower(?1)) > 0)
               AND (?2 IS NULL OR access_level = ?2)
             ORDER BY id ASC"
        ))?;

        let agents = stmt
            .query_map(
                params![
                    filter.codename_needle(),
                    filter.access_level.map(|l| l.as_str())
                ],
                agent_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(agents)
    }

    /// The agent with this id.
    pub fn get(&self, id: i64) -> Result<Agent, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_AGENT} WHERE id = ?1"),
            params![id],
            agent_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound(id))
    }

    /// Insert a new agent and return it with its assigned id.
    pub fn create(&self, fields: AgentFields) -> Result<Agent, StoreError> {
        fields.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO agents (codename, contact_number, email, access_level)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                fields.codename,
                fields.contact_number,
                fields.email,
                fields.access_level.as_str()
            ],
        )
        .map_err(|e| log_conflict(e.into(), "create"))?;

        let id = conn.last_insert_rowid();
        debug!("Agent created: id={} codename={}", id, fields.codename);
        Ok(Agent {
            id,
            codename: fields.codename,
            contact_number: fields.contact_number,
            email: fields.email,
            access_level: fields.access_level,
        })
    }

    /// Replace all four fields of an existing agent.
    pub fn update(&self, id: i64, fields: AgentFields) -> Result<Agent, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM agents WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound(id));
        }

        fields.validate()?;

        tx.execute(
            "UPDATE agents
             SET codename = ?1, contact_number = ?2, email = ?3, access_level = ?4
             WHERE id = ?5",
            params![
                fields.codename,
                fields.contact_number,
                fields.email,
                fields.access_level.as_str(),
                id
            ],
        )
        .map_err(|e| log_conflict(e.into(), "update"))?;
        tx.commit()?;

        debug!("Agent updated: id={} codename={}", id, fields.codename);
        Ok(Agent {
            id,
            codename: fields.codename,
            contact_number: fields.contact_number,
            email: fields.email,
            access_level: fields.access_level,
        })
    }

    /// Remove one agent.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Agent deleted: id={}", id);
        Ok(())
    }

    /// Remove every agent. Returns how many were removed.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM agents", [])?;
        warn!("Deleted all agents ({} records)", removed);
        Ok(removed)
    }

    /// Number of stored agents.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM agents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl CodenameRegistry for AgentStore {
    fn codename_taken(&self, candidate: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let taken = conn
            .query_row(
                "SELECT 1 FROM agents WHERE lower(codename) = lower(?1) LIMIT 1",
                params![candidate],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(taken)
    }
}

fn agent_from_row(row: &Row<'_>) -> rusqlite::Result<Agent> {
    let level: String = row.get(4)?;
    let access_level = level.parse::<AccessLevel>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Agent {
        id: row.get(0)?,
        codename: row.get(1)?,
        contact_number: row.get(2)?,
        email: row.get(3)?,
        access_level,
    })
}

fn log_conflict(err: StoreError, op: &str) -> StoreError {
    if let StoreError::Constraint { field } = &err {
        warn!("Agent {} rejected: duplicate {}", op, field);
    }
    err
}

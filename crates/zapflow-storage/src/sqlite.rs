//! SQLite implementation of [`FlowStore`].
//!
//! [`SqliteStore`] persists flows in a SQLite database with WAL mode,
//! atomic transactions on every write, and automatic schema migrations.
//! Node and edge lists are stored as JSON TEXT columns via serde_json.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;
use zapflow_core::{Edge, Flow, Node};

use crate::error::StorageError;
use crate::traits::FlowStore;
use crate::types::{
    AiSettings, ExecutionLogEntry, ExecutionRecord, ExecutionStatus, FlowRecord, InstanceRecord,
    LogRecord, MessageRecord,
};

/// SQLite-backed implementation of [`FlowStore`].
///
/// Every write operation is wrapped in a transaction for atomicity.
/// The database uses WAL mode for performance and foreign keys for
/// integrity; deleting a flow cascades to its operational records.
pub struct SqliteStore {
    conn: Connection,
}

/// Columns of a `flows` row before JSON and timestamp decoding.
struct RawFlowRow {
    id: String,
    name: String,
    description: String,
    selected_instance: Option<String>,
    is_active: bool,
    nodes_json: String,
    edges_json: String,
    created_at: String,
    updated_at: String,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn assert_flow_exists(&self, id: &str) -> Result<(), StorageError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM flows WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::FlowNotFound(id.to_string()));
        }
        Ok(())
    }

    fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, StorageError> {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Migration(format!("bad timestamp {text:?}: {e}")))
    }

    /// Extracts the raw column values of a flow row. rusqlite row closures
    /// can only surface `rusqlite::Error`, so JSON and timestamp decoding
    /// happens afterwards in [`Self::decode_flow_row`].
    fn flow_record_from_row(row: &Row<'_>) -> rusqlite::Result<RawFlowRow> {
        Ok(RawFlowRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            selected_instance: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            nodes_json: row.get(5)?,
            edges_json: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode_flow_row(raw: RawFlowRow) -> Result<FlowRecord, StorageError> {
        let nodes: Vec<Node> = serde_json::from_str(&raw.nodes_json)?;
        let edges: Vec<Edge> = serde_json::from_str(&raw.edges_json)?;
        Ok(FlowRecord {
            flow: Flow {
                id: Some(raw.id),
                name: raw.name,
                description: raw.description,
                selected_instance: raw.selected_instance,
                is_active: raw.is_active,
                nodes,
                edges,
            },
            created_at: Self::parse_timestamp(&raw.created_at)?,
            updated_at: Self::parse_timestamp(&raw.updated_at)?,
        })
    }

    fn insert_flow_row(
        &mut self,
        flow: &Flow,
        created_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let nodes_json = serde_json::to_string(&flow.nodes)?;
        let edges_json = serde_json::to_string(&flow.edges)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO flows (id, name, description, selected_instance, is_active, nodes_json, edges_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                flow.id.as_deref().unwrap_or_default(),
                flow.name,
                flow.description,
                flow.selected_instance,
                flow.is_active as i32,
                nodes_json,
                edges_json,
                created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update_flow_row(
        &mut self,
        flow: &Flow,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let nodes_json = serde_json::to_string(&flow.nodes)?;
        let edges_json = serde_json::to_string(&flow.edges)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE flows SET name = ?2, description = ?3, selected_instance = ?4, is_active = ?5, nodes_json = ?6, edges_json = ?7, updated_at = ?8 WHERE id = ?1",
            params![
                flow.id.as_deref().unwrap_or_default(),
                flow.name,
                flow.description,
                flow.selected_instance,
                flow.is_active as i32,
                nodes_json,
                edges_json,
                updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl FlowStore for SqliteStore {
    // -------------------------------------------------------------------
    // Flow CRUD
    // -------------------------------------------------------------------

    fn create_flow(&mut self, mut flow: Flow) -> Result<FlowRecord, StorageError> {
        flow.id = Some(Uuid::new_v4().to_string());
        let now = Utc::now();
        self.insert_flow_row(&flow, now)?;
        Ok(FlowRecord {
            flow,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_flow(&self, id: &str) -> Result<FlowRecord, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description, selected_instance, is_active, nodes_json, edges_json, created_at, updated_at FROM flows WHERE id = ?1",
                params![id],
                Self::flow_record_from_row,
            )
            .optional()?;
        match row {
            Some(raw) => Self::decode_flow_row(raw),
            None => Err(StorageError::FlowNotFound(id.to_string())),
        }
    }

    fn update_flow(&mut self, id: &str, mut flow: Flow) -> Result<FlowRecord, StorageError> {
        let existing = self.get_flow(id)?;
        flow.id = Some(id.to_string());
        let now = Utc::now();
        self.update_flow_row(&flow, now)?;
        Ok(FlowRecord {
            flow,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    fn delete_flow(&mut self, id: &str) -> Result<(), StorageError> {
        self.assert_flow_exists(id)?;
        let tx = self.conn.transaction()?;
        // ON DELETE CASCADE clears executions, messages, and logs.
        tx.execute("DELETE FROM flows WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn list_flows(&self) -> Result<Vec<FlowRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, description, selected_instance, is_active, nodes_json, edges_json, created_at, updated_at FROM flows ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], Self::flow_record_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(Self::decode_flow_row(row?)?);
        }
        Ok(result)
    }

    // -------------------------------------------------------------------
    // Executions
    // -------------------------------------------------------------------

    fn insert_execution(&mut self, execution: &ExecutionRecord) -> Result<(), StorageError> {
        let log_json = serde_json::to_string(&execution.log)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO executions (id, flow_id, status, current_node_id, started_at, completed_at, log_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                execution.id,
                execution.flow_id,
                execution.status.as_str(),
                execution.current_node_id,
                execution.started_at.to_rfc3339(),
                execution.completed_at.map(|t| t.to_rfc3339()),
                log_json,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_executions(&self, flow_id: &str) -> Result<Vec<ExecutionRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, flow_id, status, current_node_id, started_at, completed_at, log_json FROM executions WHERE flow_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![flow_id], |row| {
            let id: String = row.get(0)?;
            let flow_id: String = row.get(1)?;
            let status: String = row.get(2)?;
            let current_node_id: Option<String> = row.get(3)?;
            let started_at: String = row.get(4)?;
            let completed_at: Option<String> = row.get(5)?;
            let log_json: String = row.get(6)?;
            Ok((id, flow_id, status, current_node_id, started_at, completed_at, log_json))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (id, flow_id, status, current_node_id, started_at, completed_at, log_json) = row?;
            let log: Vec<ExecutionLogEntry> = serde_json::from_str(&log_json)?;
            let completed_at = match completed_at {
                Some(text) => Some(Self::parse_timestamp(&text)?),
                None => None,
            };
            result.push(ExecutionRecord {
                id,
                flow_id,
                status: ExecutionStatus::parse(&status),
                current_node_id,
                started_at: Self::parse_timestamp(&started_at)?,
                completed_at,
                log,
            });
        }
        Ok(result)
    }

    // -------------------------------------------------------------------
    // Messages and logs
    // -------------------------------------------------------------------

    fn append_message(&mut self, message: &MessageRecord) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO messages (id, flow_id, recipient, message_type, content, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.flow_id,
                message.recipient,
                message.message_type,
                message.content,
                message.timestamp.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_messages(&self, flow_id: &str) -> Result<Vec<MessageRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, flow_id, recipient, message_type, content, timestamp FROM messages WHERE flow_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![flow_id], |row| {
            let id: String = row.get(0)?;
            let flow_id: String = row.get(1)?;
            let recipient: String = row.get(2)?;
            let message_type: String = row.get(3)?;
            let content: String = row.get(4)?;
            let timestamp: String = row.get(5)?;
            Ok((id, flow_id, recipient, message_type, content, timestamp))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (id, flow_id, recipient, message_type, content, timestamp) = row?;
            result.push(MessageRecord {
                id,
                flow_id,
                recipient,
                message_type,
                content,
                timestamp: Self::parse_timestamp(&timestamp)?,
            });
        }
        Ok(result)
    }

    fn append_log(&mut self, log: &LogRecord) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO logs (id, flow_id, level, message, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                log.id,
                log.flow_id,
                log.level,
                log.message,
                log.timestamp.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_logs(&self, flow_id: &str) -> Result<Vec<LogRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, flow_id, level, message, timestamp FROM logs WHERE flow_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![flow_id], |row| {
            let id: String = row.get(0)?;
            let flow_id: String = row.get(1)?;
            let level: String = row.get(2)?;
            let message: String = row.get(3)?;
            let timestamp: String = row.get(4)?;
            Ok((id, flow_id, level, message, timestamp))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (id, flow_id, level, message, timestamp) = row?;
            result.push(LogRecord {
                id,
                flow_id,
                level,
                message,
                timestamp: Self::parse_timestamp(&timestamp)?,
            });
        }
        Ok(result)
    }

    // -------------------------------------------------------------------
    // Instances
    // -------------------------------------------------------------------

    fn insert_instance(&mut self, instance: &InstanceRecord) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO instances (id, instance_name, instance_key, qr_code, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                instance.id,
                instance.instance_name,
                instance.instance_key,
                instance.qr_code,
                instance.status,
                instance.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_instances(&self) -> Result<Vec<InstanceRecord>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, instance_name, instance_key, qr_code, status, created_at FROM instances ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let instance_name: String = row.get(1)?;
            let instance_key: String = row.get(2)?;
            let qr_code: Option<String> = row.get(3)?;
            let status: String = row.get(4)?;
            let created_at: String = row.get(5)?;
            Ok((id, instance_name, instance_key, qr_code, status, created_at))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (id, instance_name, instance_key, qr_code, status, created_at) = row?;
            result.push(InstanceRecord {
                id,
                instance_name,
                instance_key,
                qr_code,
                status,
                created_at: Self::parse_timestamp(&created_at)?,
            });
        }
        Ok(result)
    }

    fn update_instance_status(&mut self, name: &str, status: &str) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let rows = tx.execute(
            "UPDATE instances SET status = ?2 WHERE instance_name = ?1",
            params![name, status],
        )?;
        tx.commit()?;
        if rows == 0 {
            return Err(StorageError::InstanceNotFound(name.to_string()));
        }
        Ok(())
    }

    fn update_instance_qr(&mut self, name: &str, qr_code: &str) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let rows = tx.execute(
            "UPDATE instances SET qr_code = ?2 WHERE instance_name = ?1",
            params![name, qr_code],
        )?;
        tx.commit()?;
        if rows == 0 {
            return Err(StorageError::InstanceNotFound(name.to_string()));
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // AI settings
    // -------------------------------------------------------------------

    fn get_ai_settings(&self) -> Result<AiSettings, StorageError> {
        let row: Option<String> = self
            .conn
            .query_row(
                "SELECT settings_json FROM ai_settings WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(AiSettings::default()),
        }
    }

    fn put_ai_settings(&mut self, settings: &AiSettings) -> Result<(), StorageError> {
        let json = serde_json::to_string(settings)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO ai_settings (id, settings_json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET settings_json = excluded.settings_json",
            params![json],
        )?;
        tx.commit()?;
        Ok(())
    }
}

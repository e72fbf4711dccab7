#![forbid(unsafe_code)]

use super::{AuditAction, AuditListRequest, AuditRow, SqliteStore, StoreError, now_ms};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

const MAX_AUDIT_LIMIT: usize = 1000;

pub(super) struct AuditEntry<'a> {
    pub(super) actor: &'a str,
    pub(super) model: &'static str,
    pub(super) object_id: i64,
    pub(super) object_repr: &'a str,
    pub(super) action: AuditAction,
    pub(super) message: &'a str,
}

pub(super) fn log_entry(conn: &Connection, entry: AuditEntry<'_>) -> Result<(), StoreError> {
    conn.execute(
        r#"
        INSERT INTO audit_log(ts_ms, actor, model, object_id, object_repr, action, message)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            now_ms(),
            entry.actor,
            entry.model,
            entry.object_id,
            entry.object_repr,
            entry.action.as_str(),
            entry.message,
        ],
    )?;
    Ok(())
}

impl SqliteStore {
    /// Newest entries first.
    pub fn list_audit(&self, request: AuditListRequest) -> Result<Vec<AuditRow>, StoreError> {
        let limit = request.limit.clamp(1, MAX_AUDIT_LIMIT);
        let mut sql = String::from(
            "SELECT id, ts_ms, actor, model, object_id, object_repr, action, message FROM audit_log",
        );
        let mut clauses = Vec::new();
        let mut values = Vec::<Value>::new();
        if let Some(model) = request.model {
            clauses.push("model=?");
            values.push(Value::Text(model));
        }
        if let Some(object_id) = request.object_id {
            clauses.push("object_id=?");
            values.push(Value::Integer(object_id));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC LIMIT ?");
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let action: String = row.get(6)?;
            let action = AuditAction::parse(&action)
                .ok_or(StoreError::InvalidInput("audit_log.action has an unknown value"))?;
            out.push(AuditRow {
                id: row.get(0)?,
                ts_ms: row.get(1)?,
                actor: row.get(2)?,
                model: row.get(3)?,
                object_id: row.get(4)?,
                object_repr: row.get(5)?,
                action,
                message: row.get(7)?,
            });
        }
        Ok(out)
    }
}

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use tempo_core::types::Schedule;

use crate::db::init_db;
use crate::error::{Result, StoreError};

/// Durable record keeper for schedules.
///
/// The engine only ever calls `find_due` and `save`; the management API uses
/// the full surface. Implementations must be safe to share across tasks.
pub trait ScheduleStore: Send + Sync {
    /// Idempotent upsert by `id`. Returns the stored record.
    fn save(&self, schedule: &Schedule) -> Result<Schedule>;

    /// Fetch one schedule, `None` if the id is unknown.
    fn find_by_id(&self, id: &str) -> Result<Option<Schedule>>;

    /// All schedules, ordered by creation time.
    fn find_all(&self) -> Result<Vec<Schedule>>;

    /// Remove a schedule. `NotFound` if no row is deleted.
    fn delete(&self, id: &str) -> Result<()>;

    /// The due set: schedules with `executed = false` and
    /// `start_date_time <= now`, ordered by due time.
    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>>;
}

/// SQLite-backed store.
///
/// Wraps a single connection in a `Mutex`. The gateway opens one connection
/// per subsystem, so the engine's polling queries never contend with CRUD
/// traffic on the same handle.
pub struct SqliteScheduleStore {
    conn: Mutex<Connection>,
}

impl SqliteScheduleStore {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save(&self, schedule: &Schedule) -> Result<Schedule> {
        let info_json = serde_json::to_string(&schedule.info)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO schedules
             (id, name, start_date_time, create_date, update_date, info, executed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 start_date_time = excluded.start_date_time,
                 update_date = excluded.update_date,
                 info = excluded.info,
                 executed = excluded.executed",
            rusqlite::params![
                schedule.id,
                schedule.name,
                schedule.start_date_time.to_rfc3339(),
                schedule.create_date.to_rfc3339(),
                schedule.update_date.to_rfc3339(),
                info_json,
                schedule.executed as i64,
            ],
        )?;
        debug!(schedule_id = %schedule.id, "schedule saved");
        Ok(schedule.clone())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Schedule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, start_date_time, create_date, update_date, info, executed
             FROM schedules WHERE id = ?1",
        )?;
        match stmt.query_row([id], row_to_schedule) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_all(&self) -> Result<Vec<Schedule>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, start_date_time, create_date, update_date, info, executed
             FROM schedules ORDER BY create_date",
        )?;
        let schedules = stmt
            .query_map([], row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM schedules WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        debug!(schedule_id = %id, "schedule deleted");
        Ok(())
    }

    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let now_str = now.to_rfc3339();
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, start_date_time, create_date, update_date, info, executed
             FROM schedules
             WHERE executed = 0 AND start_date_time <= ?1
             ORDER BY start_date_time",
        )?;
        let schedules = stmt
            .query_map([&now_str], row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }
}

fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    let info_json: String = row.get(5)?;
    let info = serde_json::from_str(&info_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Schedule {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date_time: parse_ts(row, 2)?,
        create_date: parse_ts(row, 3)?,
        update_date: parse_ts(row, 4)?,
        info,
        executed: row.get::<_, i64>(6)? != 0,
    })
}

fn parse_ts(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempo_core::types::{Priority, ScheduleInfo};

    fn open_store() -> SqliteScheduleStore {
        let conn = Connection::open_in_memory().expect("in-memory db");
        SqliteScheduleStore::new(conn).expect("init schema")
    }

    fn sample(name: &str, start: DateTime<Utc>) -> Schedule {
        Schedule::new(
            name,
            start,
            ScheduleInfo {
                location: Some("room 4".into()),
                priority: Some(Priority::High),
                attendees: vec!["ana".into(), "bo".into()],
                ..ScheduleInfo::default()
            },
        )
    }

    #[test]
    fn save_then_find_by_id_roundtrips_payload() {
        let store = open_store();
        let s = sample("kickoff", Utc::now());
        store.save(&s).expect("save");

        let got = store.find_by_id(&s.id).expect("query").expect("present");
        assert_eq!(got.name, "kickoff");
        assert_eq!(got.info.attendees, vec!["ana", "bo"]);
        assert!(!got.executed);
    }

    #[test]
    fn find_by_id_unknown_is_none() {
        let store = open_store();
        assert!(store.find_by_id("no-such-id").expect("query").is_none());
    }

    #[test]
    fn save_is_an_upsert_by_id() {
        let store = open_store();
        let mut s = sample("v1", Utc::now());
        store.save(&s).expect("insert");

        s.name = "v2".into();
        s.executed = true;
        store.save(&s).expect("update");

        let all = store.find_all().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "v2");
        assert!(all[0].executed);
    }

    #[test]
    fn find_due_honours_both_predicates() {
        let store = open_store();
        let now = Utc::now();

        let past = sample("past", now - Duration::seconds(1));
        let boundary = sample("boundary", now);
        let future = sample("future", now + Duration::hours(1));
        let mut done = sample("done", now - Duration::minutes(5));
        done.executed = true;

        for s in [&past, &boundary, &future, &done] {
            store.save(s).expect("save");
        }

        let due = store.find_due(now).expect("due set");
        let names: Vec<_> = due.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["past", "boundary"]);
    }

    #[test]
    fn find_due_empty_store_is_empty() {
        let store = open_store();
        assert!(store.find_due(Utc::now()).expect("due set").is_empty());
    }

    #[test]
    fn delete_removes_row_and_flags_missing_id() {
        let store = open_store();
        let s = sample("gone", Utc::now());
        store.save(&s).expect("save");

        store.delete(&s.id).expect("delete");
        assert!(store.find_by_id(&s.id).expect("query").is_none());

        let err = store.delete(&s.id).expect_err("second delete");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}

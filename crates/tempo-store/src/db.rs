use rusqlite::Connection;

use crate::error::Result;

/// Initialise the schedule schema in `conn`.
///
/// Creates the `schedules` table (idempotent) and an index covering the
/// polling predicate so `find_due` stays efficient with thousands of rows.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schedules (
            id              TEXT    NOT NULL PRIMARY KEY,
            name            TEXT    NOT NULL,
            start_date_time TEXT    NOT NULL,   -- ISO-8601 UTC
            create_date     TEXT    NOT NULL,
            update_date     TEXT    NOT NULL,
            info            TEXT    NOT NULL,   -- opaque JSON payload
            executed        INTEGER NOT NULL DEFAULT 0
        ) STRICT;

        -- Efficient polling: WHERE executed = 0 AND start_date_time <= ?
        CREATE INDEX IF NOT EXISTS idx_schedules_due
            ON schedules (executed, start_date_time);
        ",
    )?;
    Ok(())
}

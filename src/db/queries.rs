use rusqlite::{params, Connection, OptionalExtension};

/// Local-storage style key used for the access token.
pub const ACCESS_TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub fn get_session_value(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM session WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_session_value(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO session (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn remove_session_value(conn: &Connection, key: &str) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM session WHERE key = ?1", params![key])?;
    Ok(())
}

pub fn clear_session(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM session", [])?;
    Ok(())
}

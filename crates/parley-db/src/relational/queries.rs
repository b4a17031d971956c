use rusqlite::{Connection, OptionalExtension, Row, params};

use parley_types::models::{Message, User};

use super::models::{MessageRow, UserRow, format_timestamp};
use crate::error::{StoreError, is_unique_violation};

const USER_COLUMNS: &str = "id, email, password, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, body, user_id, created_at, updated_at";

// -- Users --

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), StoreError> {
    if email_exists(conn, &user.email)? {
        return Err(StoreError::email_taken());
    }

    conn.execute(
        "INSERT INTO users (id, email, password, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id,
            user.email,
            user.password_hash,
            format_timestamp(user.created_at),
            format_timestamp(user.updated_at),
        ],
    )
    .map_err(|e| {
        // Another writer got the email between our check and the insert.
        if is_unique_violation(&e) {
            StoreError::email_taken()
        } else {
            e.into()
        }
    })?;

    Ok(())
}

fn email_exists(conn: &Connection, email: &str) -> Result<bool, StoreError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>, StoreError> {
    query_user(conn, "id", id)
}

pub fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, StoreError> {
    query_user(conn, "email", email)
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>, StoreError> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    let row = conn.query_row(&sql, [value], user_row).optional()?;
    row.map(User::try_from).transpose()
}

pub fn query_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], user_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(User::try_from).collect()
}

/// Returns the number of rows changed (0 or 1).
pub fn update_user(
    conn: &Connection,
    id: &str,
    email: &str,
    password_hash: &str,
    updated_at: &str,
) -> Result<usize, StoreError> {
    conn.execute(
        "UPDATE users SET email = ?1, password = ?2, updated_at = ?3 WHERE id = ?4",
        params![email, password_hash, updated_at, id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::email_taken()
        } else {
            e.into()
        }
    })
}

pub fn delete_user(conn: &Connection, id: &str) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?)
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

// -- Messages --

pub fn insert_message(conn: &Connection, message: &Message) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO messages (id, body, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.id,
            message.body,
            message.owner_id,
            format_timestamp(message.created_at),
            format_timestamp(message.updated_at),
        ],
    )?;
    Ok(())
}

pub fn query_message_by_id(conn: &Connection, id: &str) -> Result<Option<Message>, StoreError> {
    let sql = format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS);
    let row = conn.query_row(&sql, [id], message_row).optional()?;
    row.map(Message::try_from).transpose()
}

pub fn query_messages(conn: &Connection) -> Result<Vec<Message>, StoreError> {
    let sql = format!("SELECT {} FROM messages ORDER BY created_at, id", MESSAGE_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], message_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Message::try_from).collect()
}

/// Ownership-filtered update. Returns the number of rows changed.
pub fn update_message(
    conn: &Connection,
    id: &str,
    body: &str,
    owner_id: &str,
    updated_at: &str,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE messages SET body = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        params![body, updated_at, id, owner_id],
    )?)
}

/// Ownership-filtered delete. Returns the number of rows removed.
pub fn delete_message(conn: &Connection, id: &str, owner_id: &str) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
        params![id, owner_id],
    )?)
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        body: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

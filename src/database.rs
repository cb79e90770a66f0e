use mobc::{Manager, Pool};
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::EmailRecord;

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        debug!("Creating SqliteManager for path: {}", db_path);
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.db_path)?;

        // Some PRAGMA statements return a row, so execute() alone is not
        // enough for all of them.
        let exec_pragma =
            |conn: &Connection, pragma: &str| -> Result<(), rusqlite::Error> {
                match conn.execute(pragma, []) {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::ExecuteReturnedResults) => {
                        conn.query_row(pragma, [], |_| Ok(())).map(|_| ())
                    }
                    Err(e) => Err(e),
                }
            };

        exec_pragma(&conn, "PRAGMA journal_mode=WAL")?;
        exec_pragma(&conn, "PRAGMA synchronous=NORMAL")?;
        exec_pragma(&conn, "PRAGMA temp_store=memory")?;

        init_database(&conn)?;

        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(conn)
    }
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    create_messages_table(conn)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_date ON messages(date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_sent ON messages(mcsent DESC)",
        [],
    )?;

    Ok(())
}

fn create_messages_table(conn: &Connection) -> SqliteResult<()> {
    debug!("Creating messages table...");
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            dlm TEXT,
            date TEXT,
            alias TEXT,
            mcsent INTEGER,
            mcunsub INTEGER,
            subject TEXT,
            mcopened INTEGER,
            mcclicked INTEGER,
            plaintext TEXT,
            message_body TEXT,
            old_resource TEXT
        )
        "#,
        [],
    )?;
    Ok(())
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(
    db_path: &str,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    info!("✓ SQLite connection pool created: {}", db_path);
    Ok(pool)
}

/// Pulls the working record set from the messages table. `target_ids`
/// narrows the pull to specific campaign messages; an empty slice means
/// every row. Rows are validated here so the rest of the pipeline only
/// ever sees fully-shaped records: a NULL id or subject is a data error,
/// NULL counters coerce to 0 and NULL bodies to empty strings.
pub async fn fetch_email_records(
    pool: &DbPool,
    target_ids: &[String],
) -> Result<Vec<EmailRecord>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;

    let base = "SELECT id, subject, plaintext, message_body, \
                mcsent, mcopened, mcclicked, mcunsub FROM messages";

    let sql = if target_ids.is_empty() {
        format!("{} ORDER BY date", base)
    } else {
        let placeholders = vec!["?"; target_ids.len()].join(", ");
        format!("{} WHERE id IN ({}) ORDER BY date", base, placeholders)
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(target_ids.iter()), |row| {
        Ok(RawMessageRow {
            id: row.get(0)?,
            subject: row.get(1)?,
            plaintext: row.get(2)?,
            message_body: row.get(3)?,
            sent: row.get(4)?,
            opened: row.get(5)?,
            clicked: row.get(6)?,
            unsubscribed: row.get(7)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        let raw = row?;
        match raw.into_record() {
            Ok(record) => records.push(record),
            Err(e) => return Err(e.into()),
        }
    }

    if records.is_empty() {
        warn!("No email messages found in database");
    } else {
        info!(
            "Extracted {} email messages from database (filter: {} ids)",
            records.len(),
            target_ids.len()
        );
    }

    Ok(records)
}

struct RawMessageRow {
    id: Option<String>,
    subject: Option<String>,
    plaintext: Option<String>,
    message_body: Option<String>,
    sent: Option<i64>,
    opened: Option<i64>,
    clicked: Option<i64>,
    unsubscribed: Option<i64>,
}

impl RawMessageRow {
    fn into_record(self) -> Result<EmailRecord, String> {
        let id = self.id.ok_or("message row with NULL id")?;
        let subject = self
            .subject
            .ok_or_else(|| format!("message {} has no subject", id))?;

        Ok(EmailRecord {
            id,
            subject,
            plaintext: self.plaintext.unwrap_or_default(),
            message_body: self.message_body.unwrap_or_default(),
            sent: self.sent.unwrap_or(0),
            opened: self.opened.unwrap_or(0),
            clicked: self.clicked.unwrap_or(0),
            unsubscribed: self.unsubscribed.unwrap_or(0),
        })
    }
}

#[derive(Debug)]
pub struct MessageStats {
    pub total_messages: i64,
    pub messages_with_sends: i64,
    pub total_sent: i64,
    pub total_opened: i64,
    pub total_clicked: i64,
    pub total_unsubscribed: i64,
}

pub async fn get_message_stats(
    pool: &DbPool,
) -> Result<MessageStats, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;

    let total_messages: i64 =
        conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;

    let messages_with_sends: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE mcsent > 0",
        [],
        |row| row.get(0),
    )?;

    let (total_sent, total_opened, total_clicked, total_unsubscribed) = conn.query_row(
        "SELECT COALESCE(SUM(mcsent), 0), COALESCE(SUM(mcopened), 0), \
         COALESCE(SUM(mcclicked), 0), COALESCE(SUM(mcunsub), 0) FROM messages",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        },
    )?;

    Ok(MessageStats {
        total_messages,
        messages_with_sends,
        total_sent,
        total_opened,
        total_clicked,
        total_unsubscribed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        id: Option<&str>,
        subject: Option<&str>,
        sent: Option<i64>,
    ) -> RawMessageRow {
        RawMessageRow {
            id: id.map(String::from),
            subject: subject.map(String::from),
            plaintext: None,
            message_body: None,
            sent,
            opened: None,
            clicked: None,
            unsubscribed: None,
        }
    }

    #[test]
    fn null_counters_coerce_to_zero() {
        let record = row(Some("144"), Some("Welcome"), None).into_record().unwrap();
        assert_eq!(record.sent, 0);
        assert_eq!(record.opened, 0);
        assert_eq!(record.plaintext, "");
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(row(None, Some("Welcome"), Some(10)).into_record().is_err());
    }

    #[test]
    fn missing_subject_is_rejected() {
        let err = row(Some("144"), None, Some(10)).into_record().unwrap_err();
        assert!(err.contains("144"));
    }
}

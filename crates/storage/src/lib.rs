use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

use shared::domain::{Attendee, AttendeeStatus, EventDetails, EventId};

mod filter;

pub use filter::{AttendeeMatch, EventFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub id: EventId,
    pub details: EventDetails,
    pub organizer: String,
    pub attendees: Vec<Attendee>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddAttendeeOutcome {
    Added,
    AlreadyPresent,
    EventMissing,
}

/// Single-event operations the service relies on. Each mutation is one atomic
/// statement (or one transaction) against the backing engine.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn health_check(&self) -> Result<()>;
    async fn insert_event(&self, organizer: &str, details: &EventDetails) -> Result<StoredEvent>;
    async fn find_event(&self, event_id: EventId) -> Result<Option<StoredEvent>>;
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>>;
    async fn add_attendee_if_absent(
        &self,
        event_id: EventId,
        email: &str,
    ) -> Result<AddAttendeeOutcome>;
    /// Returns false when no non-organizer entry with that email exists on the event.
    async fn set_attendee_status(
        &self,
        event_id: EventId,
        email: &str,
        status: AttendeeStatus,
    ) -> Result<bool>;
    async fn delete_event_if_organizer(&self, event_id: EventId, organizer: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

const EVENT_COLUMNS: &str = "SELECT events.id AS id, events.title AS title, events.date AS date,
    events.time AS time, events.location AS location, events.description AS description,
    events.organizer AS organizer, events.created_at AS created_at FROM events";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = pool_options(database_url)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn load_attendees(&self, ids: &[EventId]) -> Result<HashMap<EventId, Vec<Attendee>>> {
        let mut grouped: HashMap<EventId, Vec<Attendee>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT event_id, email, status FROM attendees WHERE event_id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(") ORDER BY id ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("failed to load attendees")?;
        for row in rows {
            let event_id = parse_event_id(&row.get::<String, _>(0))?;
            let status = row
                .get::<String, _>(2)
                .parse::<AttendeeStatus>()
                .context("corrupt attendee status")?;
            grouped.entry(event_id).or_default().push(Attendee {
                email: row.get::<String, _>(1),
                status,
            });
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<SqliteRow>) -> Result<Vec<StoredEvent>> {
        let mut events = rows
            .iter()
            .map(event_from_row)
            .collect::<Result<Vec<_>>>()?;
        let ids: Vec<EventId> = events.iter().map(|event| event.id).collect();
        let mut attendees = self.load_attendees(&ids).await?;
        for event in &mut events {
            event.attendees = attendees.remove(&event.id).unwrap_or_default();
        }
        Ok(events)
    }
}

#[async_trait]
impl EventStore for Storage {
    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn insert_event(&self, organizer: &str, details: &EventDetails) -> Result<StoredEvent> {
        let event_id = EventId::new();
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO events (id, title, date, time, location, description,
                title_folded, description_folded, organizer, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event_id.to_string())
        .bind(&details.title)
        .bind(&details.date)
        .bind(&details.time)
        .bind(&details.location)
        .bind(&details.description)
        .bind(fold_case(&details.title))
        .bind(fold_case(&details.description))
        .bind(organizer)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .context("failed to insert event")?;

        sqlx::query("INSERT INTO attendees (event_id, email, status) VALUES (?, ?, ?)")
            .bind(event_id.to_string())
            .bind(organizer)
            .bind(AttendeeStatus::Organizer.as_str())
            .execute(&mut *tx)
            .await
            .context("failed to insert organizer attendee")?;

        tx.commit().await?;

        Ok(StoredEvent {
            id: event_id,
            details: details.clone(),
            organizer: organizer.to_string(),
            attendees: vec![Attendee::organizer(organizer)],
            created_at,
        })
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<StoredEvent>> {
        let sql = format!("{EVENT_COLUMNS} WHERE events.id = ?");
        let row = sqlx::query(&sql)
            .bind(event_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load event {event_id}"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        let mut qb = QueryBuilder::<Sqlite>::new(EVENT_COLUMNS);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY events.rowid ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("failed to query events")?;
        self.hydrate(rows).await
    }

    async fn add_attendee_if_absent(
        &self,
        event_id: EventId,
        email: &str,
    ) -> Result<AddAttendeeOutcome> {
        // One statement: the unique (event_id, email) key makes a repeat a no-op.
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO attendees (event_id, email, status)
             SELECT id, ?, ? FROM events WHERE id = ?",
        )
        .bind(email)
        .bind(AttendeeStatus::Pending.as_str())
        .bind(event_id.to_string())
        .execute(&self.pool)
        .await
        .context("failed to add attendee")?
        .rows_affected();

        if inserted > 0 {
            return Ok(AddAttendeeOutcome::Added);
        }

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM events WHERE id = ?")
            .bind(event_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(if exists > 0 {
            AddAttendeeOutcome::AlreadyPresent
        } else {
            AddAttendeeOutcome::EventMissing
        })
    }

    async fn set_attendee_status(
        &self,
        event_id: EventId,
        email: &str,
        status: AttendeeStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE attendees SET status = ?
             WHERE event_id = ? AND email = ? AND status <> ?",
        )
        .bind(status.as_str())
        .bind(event_id.to_string())
        .bind(email)
        .bind(AttendeeStatus::Organizer.as_str())
        .execute(&self.pool)
        .await
        .context("failed to update attendee status")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_event_if_organizer(&self, event_id: EventId, organizer: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND organizer = ?")
            .bind(event_id.to_string())
            .bind(organizer)
            .execute(&self.pool)
            .await
            .context("failed to delete event")?;

        Ok(result.rows_affected() > 0)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<StoredEvent> {
    Ok(StoredEvent {
        id: parse_event_id(&row.try_get::<String, _>("id")?)?,
        details: EventDetails {
            title: row.try_get("title")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
        },
        organizer: row.try_get("organizer")?,
        attendees: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

/// Case folding shared by stored search columns and search queries. SQLite's
/// `lower()` only maps ASCII, so folding happens here instead.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn parse_event_id(raw: &str) -> Result<EventId> {
    Uuid::parse_str(raw)
        .map(EventId)
        .with_context(|| format!("corrupt event id {raw:?}"))
}

/// Every connection to an in-memory database sees its own empty schema, so
/// such a pool holds exactly one connection and never recycles it.
fn pool_options(database_url: &str) -> SqlitePoolOptions {
    if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

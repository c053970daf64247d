use shared::domain::AttendeeStatus;
use sqlx::{QueryBuilder, Sqlite};

use crate::fold_case;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeMatch {
    pub email: String,
    pub status: AttendeeStatus,
}

/// Conjunction of predicates over an event and its attendee list. Unset
/// fields do not constrain the result, so `EventFilter::default()` matches
/// every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub organizer: Option<String>,
    pub organizer_not: Option<String>,
    pub with_attendee: Option<AttendeeMatch>,
    pub without_attendee: Option<AttendeeMatch>,
    pub text: Option<String>,
    pub date: Option<String>,
}

impl EventFilter {
    pub fn organized_by(mut self, email: &str) -> Self {
        self.organizer = Some(email.to_string());
        self
    }

    pub fn not_organized_by(mut self, email: &str) -> Self {
        self.organizer_not = Some(email.to_string());
        self
    }

    /// Some attendee entry has exactly this email and status.
    pub fn with_attendee(mut self, email: &str, status: AttendeeStatus) -> Self {
        self.with_attendee = Some(AttendeeMatch {
            email: email.to_string(),
            status,
        });
        self
    }

    /// No attendee entry has this email and status.
    pub fn without_attendee(mut self, email: &str, status: AttendeeStatus) -> Self {
        self.without_attendee = Some(AttendeeMatch {
            email: email.to_string(),
            status,
        });
        self
    }

    /// Case-insensitive substring match on title or description. An empty
    /// query leaves the filter unconstrained.
    pub fn matching_text(mut self, query: &str) -> Self {
        self.text = (!query.is_empty()).then(|| query.to_string());
        self
    }

    pub fn on_date(mut self, date: &str) -> Self {
        self.date = (!date.is_empty()).then(|| date.to_string());
        self
    }

    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(organizer) = &self.organizer {
            qb.push(" AND events.organizer = ").push_bind(organizer.clone());
        }
        if let Some(organizer) = &self.organizer_not {
            qb.push(" AND events.organizer <> ").push_bind(organizer.clone());
        }
        if let Some(m) = &self.with_attendee {
            qb.push(" AND EXISTS (");
            push_attendee_match(qb, m);
            qb.push(")");
        }
        if let Some(m) = &self.without_attendee {
            qb.push(" AND NOT EXISTS (");
            push_attendee_match(qb, m);
            qb.push(")");
        }
        if let Some(text) = &self.text {
            // instr keeps the query literal; LIKE would treat % and _ as wildcards.
            let folded = fold_case(text);
            qb.push(" AND (instr(events.title_folded, ")
                .push_bind(folded.clone())
                .push(") > 0 OR instr(events.description_folded, ")
                .push_bind(folded)
                .push(") > 0)");
        }
        if let Some(date) = &self.date {
            qb.push(" AND events.date = ").push_bind(date.clone());
        }
    }
}

fn push_attendee_match(qb: &mut QueryBuilder<'_, Sqlite>, m: &AttendeeMatch) {
    qb.push("SELECT 1 FROM attendees a WHERE a.event_id = events.id AND a.email = ")
        .push_bind(m.email.clone())
        .push(" AND a.status = ")
        .push_bind(m.status.as_str());
}

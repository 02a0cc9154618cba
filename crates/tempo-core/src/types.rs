use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rough grouping of what a schedule is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Work,
    Personal,
    Meeting,
    Appointment,
    Other,
}

/// Relative urgency attached to a schedule's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// How often a recurring schedule repeats.
///
/// Stored as data only: the execution engine never reads this field, and no
/// follow-up schedule is generated after a run. A recurrence step would hook
/// in after the completion recorder if it is ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
    None,
}

impl std::fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Biweekly => "biweekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Yearly => "yearly",
            RecurrencePattern::None => "none",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RecurrencePattern {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "biweekly" => Ok(RecurrencePattern::Biweekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "yearly" => Ok(RecurrencePattern::Yearly),
            "none" => Ok(RecurrencePattern::None),
            other => Err(format!("unknown recurrence pattern: {other}")),
        }
    }
}

/// Opaque payload bundle carried by a schedule.
///
/// The engine forwards this verbatim to the execution handler and never
/// interprets any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub location: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub notes: Option<String>,
}

/// A persisted schedule record — the unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// UUID v4 string — primary key, assigned at creation, never reused.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Due time: the instant at or after which the schedule is eligible.
    pub start_date_time: DateTime<Utc>,
    /// Creation timestamp.
    pub create_date: DateTime<Utc>,
    /// Refreshed on every mutation, including execution.
    pub update_date: DateTime<Utc>,
    /// Opaque payload forwarded to the execution handler.
    pub info: ScheduleInfo,
    /// Flipped false → true exactly once by the completion recorder.
    #[serde(default)]
    pub executed: bool,
}

impl Schedule {
    /// Build a fresh record with a generated id and `executed = false`.
    pub fn new(name: impl Into<String>, start_date_time: DateTime<Utc>, info: ScheduleInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start_date_time,
            create_date: now,
            update_date: now,
            info,
            executed: false,
        }
    }

    /// A schedule is eligible iff it has not run and its due time has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.executed && self.start_date_time <= now
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Stage of a Panchakarma treatment. Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Purvakarma,
    Pradhanakarma,
    Paschatkarma,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Purvakarma, Phase::Pradhanakarma, Phase::Paschatkarma];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Purvakarma => "PURVAKARMA",
            Phase::Pradhanakarma => "PRADHANAKARMA",
            Phase::Paschatkarma => "PASCHATKARMA",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "SCHEDULED",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(SessionStatus::Scheduled),
            "COMPLETED" => Ok(SessionStatus::Completed),
            "CANCELLED" => Ok(SessionStatus::Cancelled),
            other => Err(format!("Unknown session status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyPlan {
    pub id: i64,
    pub patient_id: i64,
    pub practitioner_id: i64,
    pub phase: Phase,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTherapyPlan {
    pub patient_id: i64,
    pub practitioner_id: i64,
    pub phase: Phase,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One scheduled occurrence of a procedure. Patient and practitioner come from the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapySession {
    pub id: i64,
    pub therapy_plan_id: i64,
    pub procedure_name: String,
    pub scheduled_date: NaiveDateTime,
    pub notes: Option<String>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTherapySession {
    pub therapy_plan_id: i64,
    pub procedure_name: String,
    pub scheduled_date: NaiveDateTime,
    pub notes: Option<String>,
    pub status: SessionStatus,
}

use std::env;
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
pub const DEFAULT_CONFLICT_WINDOW_MINUTES: i64 = 59;
pub const MAX_CONFLICT_WINDOW_MINUTES: i64 = 24 * 60;

/// Which repository implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    Memory,
    Supabase,
}

impl DatabaseBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Some(Self::Memory),
            "supabase" | "postgrest" => Some(Self::Supabase),
            _ => None,
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Memory => write!(f, "memory"),
            DatabaseBackend::Supabase => write!(f, "supabase"),
        }
    }
}

/// Patient population counted by the practitioner dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPatientScope {
    /// Only patients whose profile is assigned to the requesting practitioner.
    Assigned,
    /// Every patient profile in the clinic.
    All,
}

impl DashboardPatientScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assigned" => Some(Self::Assigned),
            "all" | "global" => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub database_backend: DatabaseBackend,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub conflict_window_minutes: i64,
    pub dashboard_patient_scope: DashboardPatientScope,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            jwt_secret: String::new(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            database_backend: DatabaseBackend::Memory,
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            conflict_window_minutes: DEFAULT_CONFLICT_WINDOW_MINUTES,
            dashboard_patient_scope: DashboardPatientScope::Assigned,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// defaults (with a warning) for anything missing or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port),
            jwt_secret: lookup("JWT_SECRET")
                .unwrap_or_else(|| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            jwt_expiration_hours: parse_or(
                &lookup,
                "JWT_EXPIRATION_HOURS",
                defaults.jwt_expiration_hours,
            ),
            database_backend: match lookup("DATABASE_BACKEND") {
                Some(value) => DatabaseBackend::parse(&value).unwrap_or_else(|| {
                    warn!("Unknown DATABASE_BACKEND '{}', using memory", value);
                    DatabaseBackend::Memory
                }),
                None => defaults.database_backend,
            },
            supabase_url: lookup("SUPABASE_URL").unwrap_or_default(),
            supabase_service_key: lookup("SUPABASE_SERVICE_KEY").unwrap_or_default(),
            conflict_window_minutes: conflict_window_or(&lookup, defaults.conflict_window_minutes),
            dashboard_patient_scope: match lookup("DASHBOARD_PATIENT_SCOPE") {
                Some(value) => DashboardPatientScope::parse(&value).unwrap_or_else(|| {
                    warn!("Unknown DASHBOARD_PATIENT_SCOPE '{}', using assigned", value);
                    DashboardPatientScope::Assigned
                }),
                None => defaults.dashboard_patient_scope,
            },
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
            && (self.database_backend == DatabaseBackend::Memory || self.is_supabase_configured())
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn conflict_window_or<F>(lookup: &F, default: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let key = "SESSION_CONFLICT_WINDOW_MINUTES";
    let minutes = parse_or(lookup, key, default);
    if (0..=MAX_CONFLICT_WINDOW_MINUTES).contains(&minutes) {
        minutes
    } else {
        warn!(
            "{} must be between 0 and {}, got {}, using default {}",
            key, MAX_CONFLICT_WINDOW_MINUTES, minutes, default
        );
        default
    }
}

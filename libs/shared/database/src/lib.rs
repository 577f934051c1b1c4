pub mod memory;
pub mod repository;
pub mod rest;
pub mod supabase;

use std::sync::Arc;

use shared_config::{AppConfig, DatabaseBackend};
use tracing::{info, warn};

use crate::memory::InMemoryStore;
use crate::repository::{
    FeedbackRepository, NotificationRepository, PatientProfileRepository,
    TherapyPlanRepository, TherapySessionRepository, UserRepository,
};
use crate::rest::SupabaseRepository;
use crate::supabase::SupabaseClient;

/// One handle per entity store. Cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn PatientProfileRepository>,
    pub plans: Arc<dyn TherapyPlanRepository>,
    pub sessions: Arc<dyn TherapySessionRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            profiles: store.clone(),
            plans: store.clone(),
            sessions: store.clone(),
            feedback: store.clone(),
            notifications: store,
        }
    }

    pub fn supabase(config: &AppConfig) -> Self {
        let store = Arc::new(SupabaseRepository::new(Arc::new(SupabaseClient::new(config))));
        Self {
            users: store.clone(),
            profiles: store.clone(),
            plans: store.clone(),
            sessions: store.clone(),
            feedback: store.clone(),
            notifications: store,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.database_backend {
            DatabaseBackend::Supabase if config.is_supabase_configured() => {
                info!("Using Supabase storage at {}", config.supabase_url);
                Self::supabase(config)
            }
            DatabaseBackend::Supabase => {
                warn!("Supabase backend selected but not configured, falling back to in-memory storage");
                Self::in_memory()
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory storage");
                Self::in_memory()
            }
        }
    }
}

use tracing::{debug, info, warn};

use shared_database::Repositories;
use shared_models::auth::Role;
use shared_models::therapy::NewTherapyPlan;
use shared_utils::state::AppState;

use crate::models::{CreatePlanRequest, TherapyError, TherapyPlanResponse};
use crate::services::mapper::ResponseMapper;

pub struct PlanService {
    repos: Repositories,
}

impl PlanService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
        }
    }

    pub async fn create_plan(
        &self,
        practitioner_id: i64,
        request: CreatePlanRequest,
    ) -> Result<TherapyPlanResponse, TherapyError> {
        debug!(
            "Practitioner {} creating {} plan for patient {}",
            practitioner_id, request.phase, request.patient_id
        );

        let patient = self
            .repos
            .users
            .find_by_id(request.patient_id)
            .await?
            .filter(|u| u.role == Role::Patient)
            .ok_or(TherapyError::PatientNotFound(request.patient_id))?;

        if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
            if end < start {
                warn!("Rejected plan with end date {} before start date {}", end, start);
                return Err(TherapyError::Validation(
                    "End date must not be before start date".to_string(),
                ));
            }
        }

        let plan = self
            .repos
            .plans
            .save(NewTherapyPlan {
                patient_id: patient.id,
                practitioner_id,
                phase: request.phase,
                description: request.description,
                start_date: request.start_date,
                end_date: request.end_date,
            })
            .await?;

        info!("Created therapy plan {} ({})", plan.id, plan.phase);

        let mut mapper = ResponseMapper::new(self.repos.clone());
        mapper.plan_response(plan).await
    }

    /// The caller's plans, newest first.
    pub async fn list_plans(
        &self,
        practitioner_id: i64,
    ) -> Result<Vec<TherapyPlanResponse>, TherapyError> {
        let mut plans = self.repos.plans.find_by_practitioner_id(practitioner_id).await?;
        plans.sort_by(|a, b| b.id.cmp(&a.id));

        let mut mapper = ResponseMapper::new(self.repos.clone());
        let mut responses = Vec::with_capacity(plans.len());
        for plan in plans {
            responses.push(mapper.plan_response(plan).await?);
        }
        Ok(responses)
    }
}

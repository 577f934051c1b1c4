use tracing::{debug, info, warn};

use notification_cell::NotificationService;
use shared_database::Repositories;
use shared_models::auth::Role;
use shared_models::patient::{NewPatientProfile, PatientProfile, PatientProfileChanges};
use shared_models::user::{NewUser, UserAccount};
use shared_utils::password::hash_password;
use shared_utils::state::AppState;
use shared_utils::validation::{normalize_email, require_email, require_not_blank, require_range};

use crate::models::{CreatePatientRequest, PatientError, PatientProfileResponse, UpdatePatientRequest};

pub struct PatientService {
    repos: Repositories,
    notifications: NotificationService,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
            notifications: NotificationService::mock_email(state.repos.notifications.clone()),
        }
    }

    /// Creates a PATIENT account and a profile assigned to `practitioner_id`.
    pub async fn create_patient(
        &self,
        practitioner_id: i64,
        request: CreatePatientRequest,
    ) -> Result<PatientProfileResponse, PatientError> {
        require_not_blank(&request.name, "Patient name")?;
        require_email(&request.email)?;
        require_not_blank(&request.password, "Password")?;
        if let Some(age) = request.age {
            require_range(age, 0, 150, "Age")?;
        }

        let email = normalize_email(&request.email);
        debug!("Practitioner {} creating patient {}", practitioner_id, email);

        if self.repos.users.exists_by_email(&email).await? {
            warn!("Patient creation rejected, email already in use: {}", email);
            return Err(PatientError::EmailAlreadyExists { email });
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| PatientError::Internal(e.to_string()))?;

        let user = self
            .repos
            .users
            .save(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
                role: Role::Patient,
            })
            .await?;

        let profile = self
            .repos
            .profiles
            .save(NewPatientProfile {
                user_id: user.id,
                practitioner_id: Some(practitioner_id),
                age: request.age,
                gender: request.gender,
                blood_group: request.blood_group,
                emergency_contact: request.emergency_contact,
                medical_history: request.medical_history,
                prakriti: request.prakriti,
                notes: request.notes,
            })
            .await?;

        info!("Created patient {} (profile {}) for practitioner {}", user.id, profile.id, practitioner_id);

        self.notifications.send_welcome(&user).await;

        self.to_response(profile).await
    }

    pub async fn list_patients(&self, practitioner_id: i64) -> Result<Vec<PatientProfileResponse>, PatientError> {
        debug!("Listing patients of practitioner {}", practitioner_id);

        let profiles = self.repos.profiles.find_by_practitioner_id(practitioner_id).await?;
        self.to_responses(profiles).await
    }

    /// Only the assigned practitioner may edit a profile.
    pub async fn update_patient(
        &self,
        practitioner_id: i64,
        patient_user_id: i64,
        request: UpdatePatientRequest,
    ) -> Result<PatientProfileResponse, PatientError> {
        if let Some(age) = request.age {
            require_range(age, 0, 150, "Age")?;
        }

        let profile = self
            .repos
            .profiles
            .find_by_user_id(patient_user_id)
            .await?
            .ok_or(PatientError::NotFound)?;

        if profile.practitioner_id != Some(practitioner_id) {
            warn!(
                "Practitioner {} tried to edit patient {} assigned to {:?}",
                practitioner_id, patient_user_id, profile.practitioner_id
            );
            return Err(PatientError::NotAssigned);
        }

        let changes = PatientProfileChanges::from(request);
        if changes.is_empty() {
            return self.to_response(profile).await;
        }

        let updated = self
            .repos
            .profiles
            .update(profile.id, changes)
            .await?
            .ok_or(PatientError::NotFound)?;

        info!("Updated profile {} of patient {}", updated.id, patient_user_id);

        self.to_response(updated).await
    }

    /// The caller's own profile. User fields are returned even before a
    /// profile exists.
    pub async fn my_profile(&self, user_id: i64) -> Result<PatientProfileResponse, PatientError> {
        let user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(PatientError::UserNotFound)?;

        let profile = self.repos.profiles.find_by_user_id(user_id).await?;
        let practitioner = self.practitioner_of(profile.as_ref()).await?;

        Ok(PatientProfileResponse::build(&user, profile, practitioner.as_ref()))
    }

    pub async fn to_response(&self, profile: PatientProfile) -> Result<PatientProfileResponse, PatientError> {
        let user = self
            .repos
            .users
            .find_by_id(profile.user_id)
            .await?
            .ok_or(PatientError::UserNotFound)?;
        let practitioner = self.practitioner_of(Some(&profile)).await?;

        Ok(PatientProfileResponse::build(&user, Some(profile), practitioner.as_ref()))
    }

    pub async fn to_responses(&self, profiles: Vec<PatientProfile>) -> Result<Vec<PatientProfileResponse>, PatientError> {
        let mut responses = Vec::with_capacity(profiles.len());
        for profile in profiles {
            responses.push(self.to_response(profile).await?);
        }
        Ok(responses)
    }

    async fn practitioner_of(&self, profile: Option<&PatientProfile>) -> Result<Option<UserAccount>, PatientError> {
        match profile.and_then(|p| p.practitioner_id) {
            Some(id) => Ok(self.repos.users.find_by_id(id).await?),
            None => Ok(None),
        }
    }
}

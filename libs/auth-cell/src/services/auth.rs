use std::sync::Arc;

use tracing::{debug, info, warn};

use notification_cell::NotificationService;
use shared_config::AppConfig;
use shared_database::repository::UserRepository;
use shared_models::user::{NewUser, UserAccount};
use shared_utils::jwt::issue_token;
use shared_utils::password::{hash_password, verify_password};
use shared_utils::state::AppState;
use shared_utils::validation::{normalize_email, require_email, require_not_blank};

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};

pub struct AuthService {
    config: Arc<AppConfig>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            users: state.repos.users.clone(),
            notifications: NotificationService::mock_email(state.repos.notifications.clone()),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        require_not_blank(&request.name, "Name")?;
        require_email(&request.email)?;
        require_not_blank(&request.password, "Password")?;

        let email = normalize_email(&request.email);
        debug!("Registering {} as {}", email, request.role);

        let taken = self
            .users
            .exists_by_email(&email)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;
        if taken {
            warn!("Registration rejected, email already in use: {}", email);
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .users
            .save(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
                role: request.role,
            })
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!("Registered user {} ({})", user.id, user.role);

        self.notifications.send_welcome(&user).await;

        self.respond(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        debug!("Login attempt for {}", email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        // A malformed stored hash is treated the same as a wrong password.
        let matches = verify_password(&request.password, &user.password_hash).unwrap_or(false);
        if !matches {
            warn!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.respond(&user)
    }

    fn respond(&self, user: &UserAccount) -> Result<AuthResponse, AuthError> {
        let token = issue_token(
            user.id,
            &user.email,
            user.role,
            &self.config.jwt_secret,
            self.config.jwt_expiration_hours,
        )
        .map_err(AuthError::Internal)?;

        Ok(AuthResponse::new(user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::auth::Role;
    use shared_utils::test_utils::TestConfig;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Dr Rao".to_string(),
            email: email.to_string(),
            password: "ghee-and-triphala".to_string(),
            role: Role::Practitioner,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = TestConfig::default().to_state();
        let service = AuthService::new(&state);

        let registered = service.register(register_request("Rao@Clinic.in")).await.unwrap();
        assert_eq!(registered.email, "rao@clinic.in");
        assert_eq!(registered.role, Role::Practitioner);

        let logged_in = service
            .login(LoginRequest {
                email: "rao@clinic.in".to_string(),
                password: "ghee-and-triphala".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user_id, registered.user_id);
    }

    #[tokio::test]
    async fn test_register_sends_welcome() {
        let state = TestConfig::default().to_state();
        let service = AuthService::new(&state);

        let registered = service.register(register_request("rao@clinic.in")).await.unwrap();

        let notifications = state
            .repos
            .notifications
            .find_by_user_id(registered.user_id)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].subject, "Welcome to AyurSutra!");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let state = TestConfig::default().to_state();
        let service = AuthService::new(&state);

        service.register(register_request("rao@clinic.in")).await.unwrap();
        let second = service.register(register_request("RAO@clinic.in")).await;

        assert_matches!(second, Err(AuthError::EmailAlreadyRegistered));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let state = TestConfig::default().to_state();
        let service = AuthService::new(&state);
        service.register(register_request("rao@clinic.in")).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "rao@clinic.in".to_string(),
                password: "nope".to_string(),
            })
            .await;
        let unknown = service
            .login(LoginRequest {
                email: "nobody@clinic.in".to_string(),
                password: "nope".to_string(),
            })
            .await;

        assert_matches!(wrong_password, Err(AuthError::InvalidCredentials));
        assert_matches!(unknown, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let state = TestConfig::default().to_state();
        let service = AuthService::new(&state);

        let result = service.register(register_request("not-an-email")).await;
        assert_matches!(result, Err(AuthError::Validation(msg)) if msg == "Invalid email format");
    }
}

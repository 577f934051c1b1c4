use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{info, warn};

use shared_database::repository::NotificationRepository;
use shared_models::notification::NewNotification;
use shared_models::user::UserAccount;

use crate::models::Message;
use crate::services::templates;

/// Outbound message seam. Delivery is fire-and-forget: implementations log
/// their own failures and never report them to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user: &UserAccount, subject: &str, body: &str);
}

/// Records every message in the notification log and prints it in place of
/// sending an email.
pub struct MockEmailNotifier {
    repository: Arc<dyn NotificationRepository>,
}

impl MockEmailNotifier {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Notifier for MockEmailNotifier {
    async fn notify(&self, user: &UserAccount, subject: &str, body: &str) {
        let record = NewNotification {
            user_id: user.id,
            subject: subject.to_string(),
            body: body.to_string(),
            sent: true,
        };

        if let Err(e) = self.repository.save(record).await {
            warn!("Failed to record notification '{}' for user {}: {}", subject, user.id, e);
            return;
        }

        info!(
            to = %user.email,
            recipient = %user.name,
            subject = %subject,
            "MOCK EMAIL SENT\n{}",
            body
        );
    }
}

/// Clinic-specific messages on top of a [`Notifier`].
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn mock_email(repository: Arc<dyn NotificationRepository>) -> Self {
        Self::new(Arc::new(MockEmailNotifier::new(repository)))
    }

    async fn deliver(&self, user: &UserAccount, message: Message) {
        self.notifier.notify(user, &message.subject, &message.body).await;
    }

    pub async fn send_welcome(&self, user: &UserAccount) {
        self.deliver(user, templates::welcome(&user.name, user.role)).await;
    }

    pub async fn send_session_reminder(&self, patient: &UserAccount, procedure: &str, scheduled: NaiveDateTime) {
        self.deliver(patient, templates::session_reminder(&patient.name, procedure, scheduled))
            .await;
    }

    pub async fn send_pre_procedure_instructions(&self, patient: &UserAccount, procedure: &str) {
        self.deliver(patient, templates::pre_procedure_instructions(&patient.name, procedure))
            .await;
    }

    pub async fn send_post_procedure_tips(&self, patient: &UserAccount, procedure: &str) {
        self.deliver(patient, templates::post_procedure_tips(&patient.name, procedure))
            .await;
    }

    pub async fn send_feedback_request(&self, patient: &UserAccount, procedure: &str) {
        self.deliver(patient, templates::feedback_request(&patient.name, procedure))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use mockall::mock;
    use mockall::predicate::eq;
    use shared_models::auth::Role;
    use shared_models::notification::Notification;

    mock! {
        pub Repo {}

        #[async_trait]
        impl NotificationRepository for Repo {
            async fn save(&self, notification: NewNotification) -> anyhow::Result<Notification>;
            async fn find_by_user_id(&self, user_id: i64) -> anyhow::Result<Vec<Notification>>;
        }
    }

    fn patient() -> UserAccount {
        UserAccount {
            id: 7,
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Patient,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_feedback_request_uses_template_subject() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|user, subject, body| {
                user.id == 7 && subject == "Feedback Request: Abhyanga" && body.contains("Meera")
            })
            .times(1)
            .return_const(());

        let service = NotificationService::new(Arc::new(notifier));
        service.send_feedback_request(&patient(), "Abhyanga").await;
    }

    #[tokio::test]
    async fn test_mock_email_records_sent_notification() {
        let mut repo = MockRepo::new();
        repo.expect_save()
            .withf(|n| n.user_id == 7 && n.sent && n.subject == "Welcome to AyurSutra!")
            .times(1)
            .returning(|n| {
                Ok(Notification {
                    id: 1,
                    user_id: n.user_id,
                    subject: n.subject,
                    body: n.body,
                    sent: n.sent,
                    created_at: chrono::Utc::now(),
                })
            });

        let service = NotificationService::mock_email(Arc::new(repo));
        service.send_welcome(&patient()).await;
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let mut repo = MockRepo::new();
        repo.expect_save()
            .times(1)
            .returning(|_| Err(anyhow!("connection refused")));
        repo.expect_find_by_user_id().with(eq(7)).never();

        let notifier = MockEmailNotifier::new(Arc::new(repo));
        notifier.notify(&patient(), "Subject", "Body").await;
    }
}

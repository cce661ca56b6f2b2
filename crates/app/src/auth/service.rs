//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{
        AuthServiceError, IssuedSession, Role, SessionRecord, SessionUuid, UserRecord, UserUuid,
        data::NewUser, format_session_token, generate_session_secret, hash_session_token,
        parse_session_token, repository::PgAuthRepository,
    },
    database::Db,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
        }
    }

    /// Register a user. New users always hold the customer role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the email is taken.
    #[tracing::instrument(
        name = "auth.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid),
        err
    )]
    pub async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.create_user(&mut tx, &user).await?;

        self.repository
            .grant_role(&mut tx, record.uuid, Role::Customer)
            .await?;

        tx.commit().await?;

        info!(user_uuid = %record.uuid, "created user");

        Ok(record)
    }

    /// Grant a role. Granting a role the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::InvalidReference`] for an unknown user.
    #[tracing::instrument(
        name = "auth.service.grant_role",
        skip(self),
        fields(user_uuid = %user, role = %role),
        err
    )]
    pub async fn grant_role(&self, user: UserUuid, role: Role) -> Result<(), AuthServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.grant_role(&mut tx, user, role).await?;

        tx.commit().await?;

        info!(user_uuid = %user, role = %role, "granted role");

        Ok(())
    }

    /// Issue a new bearer session for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the insert fails.
    #[tracing::instrument(
        name = "auth.service.issue_session",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    pub async fn issue_session(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedSession, AuthServiceError> {
        let secret = generate_session_secret();
        let token = format_session_token(&secret);
        let token_hash = hash_session_token(&token);

        let mut tx = self.db.begin().await?;

        self.repository.get_user(&mut tx, user).await?;

        let session = self
            .repository
            .create_session(&mut tx, SessionUuid::new(), user, &token_hash, expires_at)
            .await?;

        tx.commit().await?;

        info!(session_uuid = %session.uuid, "issued session");

        Ok(IssuedSession { token, session })
    }

    /// List every session of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_sessions(
        &self,
        user: UserUuid,
    ) -> Result<Vec<SessionRecord>, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let sessions = self.repository.list_sessions(&mut tx, user).await?;

        tx.commit().await?;

        Ok(sessions)
    }

    /// Revoke a session. Returns `true` if the session was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[tracing::instrument(
        name = "auth.service.revoke_session",
        skip(self),
        fields(session_uuid = %session),
        err
    )]
    pub async fn revoke_session(&self, session: SessionUuid) -> Result<bool, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let revoked = self.repository.revoke_session(&mut tx, session).await?;

        tx.commit().await?;

        Ok(revoked.is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError> {
        parse_session_token(bearer_token).map_err(|_invalid| AuthServiceError::NotFound)?;

        let token_hash = hash_session_token(bearer_token);

        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_active_session_user(&mut tx, &token_hash, Timestamp::now())
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        tx.commit().await?;

        Ok(user)
    }

    async fn has_role(&self, user: UserUuid, role: Role) -> Result<bool, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let held = self.repository.has_role(&mut tx, user, role).await?;

        tx.commit().await?;

        Ok(held)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the user of a live session.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError>;

    /// Whether the user currently holds `role`.
    async fn has_role(&self, user: UserUuid, role: Role) -> Result<bool, AuthServiceError>;

    /// Fail with [`AuthServiceError::Permission`] unless the user is an admin.
    async fn require_admin(&self, user: UserUuid) -> Result<(), AuthServiceError> {
        if self.has_role(user, Role::Admin).await? {
            Ok(())
        } else {
            Err(AuthServiceError::Permission)
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn issued_session_authenticates_its_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_customer("Wanjiku").await?;

        let issued = ctx.auth.issue_session(user.uuid, None).await?;

        assert_eq!(ctx.auth.authenticate_bearer(&issued.token).await?, user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn revoked_session_no_longer_authenticates() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_customer("Otieno").await?;
        let issued = ctx.auth.issue_session(user.uuid, None).await?;

        assert!(ctx.auth.revoke_session(issued.session.uuid).await?);
        assert!(!ctx.auth.revoke_session(issued.session.uuid).await?);

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn expired_session_does_not_authenticate() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_customer("Akinyi").await?;
        let expired = Timestamp::now().checked_sub(1.minute())?;
        let issued = ctx.auth.issue_session(user.uuid, Some(expired)).await?;

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn malformed_token_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("Bearer nonsense").await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn require_admin_checks_role_table() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Kamau").await?;
        let admin = ctx.create_admin("Njeri").await?;

        assert!(ctx.auth.has_role(customer.uuid, Role::Customer).await?);
        assert!(ctx.auth.require_admin(admin.uuid).await.is_ok());

        let result = ctx.auth.require_admin(customer.uuid).await;

        assert!(
            matches!(result, Err(AuthServiceError::Permission)),
            "expected Permission, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth
            .create_user(NewUser {
                uuid: UserUuid::new(),
                name: "Achieng".to_string(),
                email: "achieng@example.com".to_string(),
                phone: None,
            })
            .await?;

        let result = ctx
            .auth
            .create_user(NewUser {
                uuid: UserUuid::new(),
                name: "Achieng Two".to_string(),
                email: "achieng@example.com".to_string(),
                phone: None,
            })
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }
}

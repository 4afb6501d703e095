use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::admin::{self, normalize_email};
use crate::models::dto::{
    ChangePasswordRequest, LoginResponse, NewAdminRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use crate::services::conflict_on_unique;
use crate::services::email_service::EmailService;
use crate::utils::jwt::{JwtKeys, TokenError};
use crate::utils::{password, reset_token};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const ACCOUNT_DEACTIVATED: &str = "Your account has been deactivated. Please contact support.";
const ADMIN_NOT_FOUND: &str = "Admin not found";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";
const DUPLICATE_EMAIL: &str = "An admin with this email already exists";

/// Same answer whether or not the address belongs to an admin
pub const RESET_REQUESTED: &str = "If that email exists, a password reset link has been sent.";

/// Admin credentials, sessions and the password reset workflow
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    jwt: JwtKeys,
    email: EmailService,
    reset_ttl: Duration,
    hash_iterations: u32,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: &AuthConfig, email: EmailService) -> Self {
        AuthService {
            db,
            jwt: JwtKeys::new(config.jwt_secret.clone(), config.jwt_expiry_hours),
            email,
            reset_ttl: Duration::minutes(config.reset_token_ttl_minutes),
            hash_iterations: config.password_hash_iterations,
        }
    }

    /// Checks the credentials and issues a session token
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse> {
        // 1. Unknown email and wrong password share the same message
        let admin = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !self.check_password(password, &admin.password).await? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        // 2. Only a caller who proved the password learns the account is disabled
        if !admin.is_active {
            return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.to_string()));
        }

        // 3. Record the login
        let now = Utc::now();
        let mut active = admin.into_active_model();
        active.last_login = Set(Some(now));
        active.updated_at = Set(now);
        let admin = active.update(&self.db).await?;

        // 4. Issue the token
        let token = self
            .jwt
            .generate_token(admin.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(admin_id = %admin.id, "admin logged in");
        Ok(LoginResponse { admin, token })
    }

    /// Resolves a bearer token to an active admin. Runs on every authenticated request.
    pub async fn verify_token(&self, token: &str) -> Result<admin::Model> {
        let claims = self.jwt.verify_token(token).map_err(|e| match e {
            TokenError::Expired => AppError::Unauthorized("Authentication token has expired.".to_string()),
            _ => AppError::Unauthorized("Invalid authentication token.".to_string()),
        })?;

        let admin = admin::Entity::find_by_id(claims.sub)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Admin not found. Token is invalid.".to_string()))?;

        if !admin.is_active {
            return Err(AppError::Forbidden("Admin account is inactive.".to_string()));
        }

        Ok(admin)
    }

    pub async fn get_profile(&self, admin_id: Uuid) -> Result<admin::Model> {
        admin::Entity::find_by_id(admin_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(ADMIN_NOT_FOUND.to_string()))
    }

    pub async fn update_profile(&self, admin_id: Uuid, input: UpdateProfileRequest) -> Result<admin::Model> {
        let admin = self.get_profile(admin_id).await?;

        let mut active = admin.into_active_model();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn change_password(&self, admin_id: Uuid, input: ChangePasswordRequest) -> Result<()> {
        let admin = self.get_profile(admin_id).await?;

        if !self.check_password(&input.current_password, &admin.password).await? {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }

        let hash = self.hash(input.new_password).await?;
        let mut active = admin.into_active_model();
        active.password = Set(hash);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        tracing::info!(admin_id = %admin_id, "admin changed password");
        Ok(())
    }

    /// Never fails from the caller's point of view; see `RESET_REQUESTED`
    pub async fn request_password_reset(&self, email: &str) {
        if let Err(e) = self.issue_reset_token(email).await {
            tracing::error!(error = %e, "password reset request failed");
        }
    }

    async fn issue_reset_token(&self, email: &str) -> Result<()> {
        let Some(admin) = self.find_by_email(email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        // 1. Only the digest is stored
        let raw_token = reset_token::generate_reset_token();
        let now = Utc::now();
        let mut active = admin.into_active_model();
        active.reset_password_token = Set(Some(reset_token::hash_reset_token(&raw_token)));
        active.reset_password_expires = Set(Some(now + self.reset_ttl));
        active.updated_at = Set(now);
        let admin = active.update(&self.db).await?;

        // 2. Delivery problems stay in the logs
        if let Err(e) = self.email.send_password_reset(&admin, &raw_token).await {
            tracing::warn!(admin_id = %admin.id, error = %e, "failed to send password reset email");
        }
        Ok(())
    }

    pub async fn reset_password(&self, input: ResetPasswordRequest) -> Result<()> {
        // 1. Expiry is checked on the loaded row
        let admin = self
            .find_valid_reset(&input.email, &input.token)
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_RESET_TOKEN.to_string()))?;
        let hash = self.hash(input.new_password).await?;

        // 2. Consume: only the request that still sees the digest may write
        let result = admin::Entity::update_many()
            .col_expr(admin::Column::Password, Expr::value(hash))
            .col_expr(admin::Column::ResetPasswordToken, Expr::value(Option::<String>::None))
            .col_expr(
                admin::Column::ResetPasswordExpires,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(admin::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(admin::Column::Id.eq(admin.id))
            .filter(admin::Column::ResetPasswordToken.eq(reset_token::hash_reset_token(&input.token)))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::BadRequest(INVALID_RESET_TOKEN.to_string()));
        }

        tracing::info!(admin_id = %admin.id, "admin password reset");
        Ok(())
    }

    /// Read-only check of a reset link; internal failures read as invalid
    pub async fn verify_reset_token(&self, email: &str, token: &str) -> bool {
        match self.find_valid_reset(email, token).await {
            Ok(admin) => admin.is_some(),
            Err(e) => {
                tracing::error!(error = %e, "reset token verification failed");
                false
            }
        }
    }

    /// Creates an admin account; only used by the provisioning binary
    pub async fn provision_admin(&self, input: NewAdminRequest) -> Result<admin::Model> {
        let email = normalize_email(&input.email);
        let input = NewAdminRequest {
            email: email.clone(),
            ..input
        };
        input.validate()?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let hash = self.hash(input.password).await?;
        let now = Utc::now();
        let admin = admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password: Set(hash),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            is_active: Set(true),
            last_login: Set(None),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?;

        tracing::info!(admin_id = %admin.id, email = %admin.email, "admin account created");
        Ok(admin)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<admin::Model>> {
        Ok(admin::Entity::find()
            .filter(admin::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    /// Email + digest match and an expiry still in the future
    async fn find_valid_reset(&self, email: &str, token: &str) -> Result<Option<admin::Model>> {
        let admin = admin::Entity::find()
            .filter(admin::Column::Email.eq(normalize_email(email)))
            .filter(admin::Column::ResetPasswordToken.eq(reset_token::hash_reset_token(token)))
            .one(&self.db)
            .await?;

        let now = Utc::now();
        Ok(admin.filter(|a| a.reset_password_expires.is_some_and(|expires| expires > now)))
    }

    // PBKDF2 is CPU bound, keep it off the async workers
    async fn hash(&self, plain: String) -> Result<String> {
        let iterations = self.hash_iterations;
        tokio::task::spawn_blocking(move || password::hash_password(&plain, iterations))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn check_password(&self, plain: &str, stored: &str) -> Result<bool> {
        let (plain, stored) = (plain.to_string(), stored.to_string());
        tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use std::sync::Arc;

    async fn setup_with(mailer: Arc<RecordingMailer>) -> (AuthService, admin::Model, Arc<RecordingMailer>) {
        let config = test_config();
        let db = test_db().await;
        let auth = AuthService::new(db, &config.auth, email_service(&config, mailer.clone()));
        let admin = seed_admin(&auth, "Ada@Example.org ").await;
        (auth, admin, mailer)
    }

    async fn setup() -> (AuthService, admin::Model, Arc<RecordingMailer>) {
        setup_with(Arc::new(RecordingMailer::default())).await
    }

    async fn deactivate(auth: &AuthService, admin: &admin::Model) {
        let mut active = admin.clone().into_active_model();
        active.is_active = Set(false);
        active.update(&auth.db).await.unwrap();
    }

    fn token_from_link(text: &str) -> String {
        let start = text.find("token=").unwrap() + "token=".len();
        text[start..].split('&').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_provision_normalizes_email() {
        let (auth, admin, _) = setup().await;
        assert_eq!(admin.email, "ada@example.org");
        assert!(admin.is_active);
        assert!(admin.password.starts_with("pbkdf2:sha256:1000$"));

        let err = seed_admin_err(&auth, "ADA@example.org").await;
        assert!(matches!(err, AppError::Conflict(_)));
    }

    async fn seed_admin_err(auth: &AuthService, email: &str) -> AppError {
        auth.provision_admin(NewAdminRequest {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            first_name: "Dup".to_string(),
            last_name: "Licate".to_string(),
        })
        .await
        .unwrap_err()
    }

    #[tokio::test]
    async fn test_login_issues_a_verifiable_token() {
        let (auth, admin, _) = setup().await;

        let login = auth.authenticate("  ADA@example.org", TEST_PASSWORD).await.unwrap();
        assert_eq!(login.admin.id, admin.id);
        assert!(login.admin.last_login.is_some());

        let resolved = auth.verify_token(&login.token).await.unwrap();
        assert_eq!(resolved.id, admin.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let (auth, _, _) = setup().await;

        let wrong = auth.authenticate("ada@example.org", "not-the-password").await.unwrap_err();
        let unknown = auth.authenticate("nobody@example.org", TEST_PASSWORD).await.unwrap_err();
        assert_eq!(wrong.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
        assert!(matches!(wrong, AppError::Unauthorized(_)));
        assert!(matches!(unknown, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_inactive_account_is_only_revealed_with_the_right_password() {
        let (auth, admin, _) = setup().await;
        deactivate(&auth, &admin).await;

        let err = auth.authenticate("ada@example.org", TEST_PASSWORD).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = auth.authenticate("ada@example.org", "wrong-password").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_deactivation_blocks_an_issued_token() {
        let (auth, admin, _) = setup().await;
        let login = auth.authenticate("ada@example.org", TEST_PASSWORD).await.unwrap();

        deactivate(&auth, &admin).await;
        let err = auth.verify_token(&login.token).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (auth, _, _) = setup().await;
        let err = auth.verify_token("not.a.token").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (auth, admin, _) = setup().await;
        let updated = auth
            .update_profile(
                admin.id,
                UpdateProfileRequest {
                    first_name: Some("  Grace ".to_string()),
                    last_name: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.last_name, "Lovelace");

        let err = auth.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (auth, admin, _) = setup().await;

        let err = auth
            .change_password(
                admin.id,
                ChangePasswordRequest {
                    current_password: "wrong-password".to_string(),
                    new_password: "new-password-1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        auth.change_password(
            admin.id,
            ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_string(),
                new_password: "new-password-1".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(auth.authenticate("ada@example.org", TEST_PASSWORD).await.is_err());
        assert!(auth.authenticate("ada@example.org", "new-password-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let (auth, _, mailer) = setup().await;

        auth.request_password_reset("ada@example.org").await;
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.org");
        assert!(sent[0].text.contains("http://localhost:3000/reset-password?token="));
        assert!(sent[0].text.contains("email=ada%40example.org"));
        let token = token_from_link(&sent[0].text);

        assert!(auth.verify_reset_token("ada@example.org", &token).await);
        assert!(!auth.verify_reset_token("ada@example.org", "forged").await);

        let reset = || ResetPasswordRequest {
            email: "ada@example.org".to_string(),
            token: token.clone(),
            new_password: "brand-new-pass".to_string(),
        };
        auth.reset_password(reset()).await.unwrap();
        assert!(auth.authenticate("ada@example.org", "brand-new-pass").await.is_ok());

        let err = auth.reset_password(reset()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!auth.verify_reset_token("ada@example.org", &token).await);
    }

    #[tokio::test]
    async fn test_concurrent_resets_consume_the_token_once() {
        let (auth, _, mailer) = setup().await;
        auth.request_password_reset("ada@example.org").await;
        let token = token_from_link(&mailer.sent()[0].text);

        let reset = |new_password: &str| ResetPasswordRequest {
            email: "ada@example.org".to_string(),
            token: token.clone(),
            new_password: new_password.to_string(),
        };
        let (first, second) = tokio::join!(
            auth.reset_password(reset("first-new-pass")),
            auth.reset_password(reset("second-new-pass")),
        );

        let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let winning_password = if first.is_ok() { "first-new-pass" } else { "second-new-pass" };
        let losing_password = if first.is_ok() { "second-new-pass" } else { "first-new-pass" };
        assert!(auth.authenticate("ada@example.org", winning_password).await.is_ok());
        assert!(auth.authenticate("ada@example.org", losing_password).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_email_sends_nothing() {
        let (auth, _, mailer) = setup().await;
        auth.request_password_reset("ghost@example.org").await;
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_rejected() {
        let (auth, admin, mailer) = setup().await;
        auth.request_password_reset("ada@example.org").await;
        let token = token_from_link(&mailer.sent()[0].text);

        let stored = auth.get_profile(admin.id).await.unwrap();
        let mut active = stored.into_active_model();
        active.reset_password_expires = Set(Some(Utc::now() - Duration::minutes(1)));
        active.update(&auth.db).await.unwrap();

        assert!(!auth.verify_reset_token("ada@example.org", &token).await);
    }

    #[tokio::test]
    async fn test_email_failure_does_not_abort_the_reset_request() {
        let (auth, admin, mailer) = setup_with(Arc::new(RecordingMailer::failing())).await;
        auth.request_password_reset("ada@example.org").await;

        let token = token_from_link(&mailer.sent()[0].text);
        assert!(auth.verify_reset_token("ada@example.org", &token).await);
        let stored = auth.get_profile(admin.id).await.unwrap();
        assert!(stored.reset_password_token.is_some());
    }
}

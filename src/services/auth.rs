use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{refresh_token, RefreshToken, User, UserModel},
    services::email::EmailService,
    utils::{encode_access_token, encode_refresh_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: AuthConfig::from_env(),
        }
    }

    /// Register a new reporter account and send the verification email.
    /// Returns (user_model, access_token, refresh_token).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        email_service: &EmailService,
    ) -> AppResult<(UserModel, String, String)> {
        if self.user_exists(username, email).await? {
            return Err(AppError::Conflict(
                "Username or email already taken".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();
        let (email_verified, verification_token, verification_expires) =
            if self.config.require_email_verification {
                let token = uuid::Uuid::new_v4().to_string();
                let expires = now + chrono::Duration::hours(24);
                (false, Some(token), Some(expires))
            } else {
                (true, None, None)
            };

        let new_user = crate::models::user::ActiveModel {
            username: sea_orm::ActiveValue::Set(username.to_string()),
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            points: sea_orm::ActiveValue::Set(0),
            role: sea_orm::ActiveValue::Set("user".to_string()),
            is_verified_authority: sea_orm::ActiveValue::Set(false),
            email_verified: sea_orm::ActiveValue::Set(email_verified),
            email_verification_token: sea_orm::ActiveValue::Set(verification_token.clone()),
            email_verification_expires: sea_orm::ActiveValue::Set(verification_expires),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let user = new_user.insert(&self.db).await?;
        let (access_token, refresh_token) = self.issue_tokens_for_user(user.id).await?;

        if self.config.require_email_verification {
            if let Some(token) = verification_token {
                // Non-fatal; the account exists either way.
                if let Err(e) = email_service
                    .send_verification_email(&user.email, &token)
                    .await
                {
                    tracing::warn!("Failed to send verification email: {e}");
                }
            }
        }

        Ok((user, access_token, refresh_token))
    }

    /// Login with username or email.
    /// Returns (user_model, access_token, refresh_token).
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> AppResult<(UserModel, String, String)> {
        let user = self
            .find_by_identifier(identifier)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let is_valid = verify_password(password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Unauthorized);
        }

        let (access_token, refresh_token) = self.issue_tokens_for_user(user.id).await?;

        Ok((user, access_token, refresh_token))
    }

    pub async fn rotate_refresh_token(
        &self,
        user_id: i32,
        current_refresh_token: &str,
    ) -> AppResult<(String, String)> {
        let token_hash = crate::utils::jwt::hash_refresh_token(current_refresh_token);
        let now = chrono::Utc::now().naive_utc();

        let existing = RefreshToken::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Token.eq(token_hash))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if existing.expires_at <= now {
            let _ = RefreshToken::delete_by_id(existing.id).exec(&self.db).await;
            return Err(AppError::Unauthorized);
        }

        let txn = self.db.begin().await?;
        RefreshToken::delete_by_id(existing.id).exec(&txn).await?;
        let (access_token, refresh_token) = self.issue_tokens_for_user_txn(&txn, user_id).await?;
        txn.commit().await?;
        Ok((access_token, refresh_token))
    }

    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        let token_hash = crate::utils::jwt::hash_refresh_token(refresh_token);
        RefreshToken::delete_many()
            .filter(refresh_token::Column::Token.eq(token_hash))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        let user = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user)
    }

    async fn user_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                sea_orm::Condition::any()
                    .add(crate::models::user::Column::Username.eq(username))
                    .add(crate::models::user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<UserModel> {
        let column = if identifier.contains('@') {
            crate::models::user::Column::Email
        } else {
            crate::models::user::Column::Username
        };
        let user = User::find()
            .filter(column.eq(identifier))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user)
    }

    /// Verify email with token
    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        let user = User::find()
            .filter(crate::models::user::Column::EmailVerificationToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid verification token".to_string()))?;

        if let Some(expires) = user.email_verification_expires {
            if chrono::Utc::now().naive_utc() > expires {
                return Err(AppError::Validation(
                    "Verification token has expired".to_string(),
                ));
            }
        }

        let mut active: crate::models::user::ActiveModel = user.into();
        active.email_verified = sea_orm::ActiveValue::Set(true);
        active.email_verification_token = sea_orm::ActiveValue::Set(None);
        active.email_verification_expires = sea_orm::ActiveValue::Set(None);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Resend email verification token
    pub async fn resend_verification(
        &self,
        user_id: i32,
        email_service: &EmailService,
    ) -> AppResult<()> {
        let user = self.get_user_by_id(user_id).await?;
        if user.email_verified {
            return Err(AppError::Validation(
                "Email is already verified".to_string(),
            ));
        }
        let token = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().naive_utc();
        let expires = now + chrono::Duration::hours(24);

        let email = user.email.clone();
        let mut active: crate::models::user::ActiveModel = user.into();
        active.email_verification_token = sea_orm::ActiveValue::Set(Some(token.clone()));
        active.email_verification_expires = sea_orm::ActiveValue::Set(Some(expires));
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&self.db).await?;

        if let Err(e) = email_service.send_verification_email(&email, &token).await {
            tracing::warn!("Failed to send verification email: {e}");
        }

        Ok(())
    }

    async fn issue_tokens_for_user(&self, user_id: i32) -> AppResult<(String, String)> {
        self.issue_tokens_for_user_txn(&self.db, user_id).await
    }

    async fn issue_tokens_for_user_txn<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> AppResult<(String, String)> {
        let user_id_str = user_id.to_string();
        let access_token = encode_access_token(&user_id_str)?;
        let refresh_token = encode_refresh_token(&user_id_str)?;
        self.persist_refresh_token(conn, user_id, &refresh_token)
            .await?;
        Ok((access_token, refresh_token))
    }

    async fn persist_refresh_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        refresh_token: &str,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        let expires_at = now
            + chrono::Duration::seconds(crate::utils::jwt::refresh_token_expiry_seconds() as i64);

        let model = refresh_token::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            token: sea_orm::ActiveValue::Set(crate::utils::jwt::hash_refresh_token(refresh_token)),
            expires_at: sea_orm::ActiveValue::Set(expires_at),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        model.insert(conn).await?;
        Ok(())
    }
}

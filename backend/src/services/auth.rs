//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::UserProfile;
use shared::types::Language;
use shared::validation::{validate_email, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub preferred_language: Option<Language>,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub preferred_language: String,
    pub is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new account
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        if validate_email(&input.email).is_err() {
            return Err(AppError::Validation {
                field: "email".to_string(),
                message: "Please enter a valid email address".to_string(),
                message_vi: "Vui lòng nhập một địa chỉ email hợp lệ.".to_string(),
            });
        }

        if validate_password(&input.password).is_err() {
            return Err(AppError::Validation {
                field: "password".to_string(),
                message: "Password must be at least 6 characters".to_string(),
                message_vi: "Mật khẩu phải có ít nhất 6 ký tự.".to_string(),
            });
        }

        // Check if the email is already taken
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "email".to_string(),
                message: "Email is already in use".to_string(),
                message_vi: "Email này đã được sử dụng.".to_string(),
            });
        }

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let language = input.preferred_language.unwrap_or_default();

        let (user_id, created_at) = sqlx::query_as::<_, (Uuid, chrono::DateTime<Utc>)>(
            r#"
            INSERT INTO users (email, password_hash, preferred_language)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&input.email)
        .bind(&password_hash)
        .bind(language.code())
        .fetch_one(&self.db)
        .await?;

        // Generate tokens
        let tokens = self.generate_tokens(user_id, &input.email)?;

        // Store refresh token
        self.store_refresh_token(user_id, &tokens.refresh_token)
            .await?;

        Ok(RegisterResponse {
            user: UserProfile {
                id: user_id,
                email: input.email,
                preferred_language: language,
                created_at,
            },
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        })
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        // Find user by email
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, preferred_language, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid email or password".to_string(),
            message_vi: "Email hoặc mật khẩu không chính xác.".to_string(),
        })?;

        // Check if user is active
        if !user.is_active {
            return Err(AppError::Unauthorized {
                message: "Account is disabled".to_string(),
                message_vi: "Tài khoản đã bị vô hiệu hóa.".to_string(),
            });
        }

        // Verify password
        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized {
                message: "Invalid email or password".to_string(),
                message_vi: "Email hoặc mật khẩu không chính xác.".to_string(),
            });
        }

        // Update last login
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        // Generate tokens
        let tokens = self.generate_tokens(user.id, &user.email)?;

        // Store refresh token
        self.store_refresh_token(user.id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        // Hash the refresh token to look up
        let token_hash = Self::hash_token(refresh_token);

        // Find valid refresh token
        let token_record = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT rt.user_id, u.email
            FROM refresh_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid or expired refresh token".to_string(),
            message_vi: "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.".to_string(),
        })?;

        let (user_id, email) = token_record;

        // Revoke old refresh token
        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.db)
            .await?;

        // Generate new tokens
        let tokens = self.generate_tokens(user_id, &email)?;

        // Store new refresh token
        self.store_refresh_token(user_id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, email: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        // Access token claims
        let access_claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token (simple random token)
        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let token_hash = Self::hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Hash a token for storage
    fn hash_token(token: &str) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        use sha2::{Digest, Sha256};

        STANDARD.encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_deterministic() {
        let a = AuthService::hash_token("some-refresh-token");
        let b = AuthService::hash_token("some-refresh-token");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        let a = AuthService::hash_token("token-one");
        let b = AuthService::hash_token("token-two");
        assert_ne!(a, b);
        // SHA-256 digest encoded as base64 is 44 characters
        assert_eq!(a.len(), 44);
    }
}

//! User model, profile mirror, and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// User role (stored as user metadata and mirrored in profiles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (TEXT column)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Auth record as stored in the users table
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mirrored profile row; its role is authoritative for admin-only listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata attached to a user at sign-up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UserMetadata {
    pub role: Role,
    pub full_name: Option<String>,
}

/// Public view of the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub user_metadata: UserMetadata,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
            user_metadata: UserMetadata {
                role: user.role,
                full_name: user.full_name.clone(),
            },
        }
    }
}

impl From<&UserClaims> for UserInfo {
    fn from(claims: &UserClaims) -> Self {
        UserInfo {
            id: claims.user_id,
            email: claims.email.clone(),
            user_metadata: UserMetadata {
                role: claims.role,
                full_name: claims.full_name.clone(),
            },
        }
    }
}

/// Sign-up form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 6))]
    pub confirm_password: String,
    #[serde(default)]
    pub role: Role,
    /// Required when role is admin
    pub admin_code: Option<String>,
}

impl RegisterRequest {
    /// Field rules plus the cross-field checks
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if self.role == Role::Admin && self.admin_code().is_none() {
            return Err(AppError::Validation("Invalid admin code".to_string()));
        }
        Ok(())
    }

    /// Trimmed, non-empty admin code
    pub fn admin_code(&self) -> Option<&str> {
        self.admin_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Sign-in form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// JWT claims for an authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
    /// Token id, used for sign-out revocation
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Seconds until the token expires (zero once expired)
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

/// Entry returned by the admin user listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AdminUserEntry {
    pub id: Uuid,
    pub email: String,
    pub user_metadata: AdminUserMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AdminUserMetadata {
    pub role: Role,
    pub full_name: String,
}

impl AdminUserEntry {
    /// Case-insensitive match against email, role and name
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.email.to_lowercase().contains(&needle)
            || self.user_metadata.role.as_str().contains(&needle)
            || self.user_metadata.full_name.to_lowercase().contains(&needle)
    }
}

/// Combine auth records with profile roles.
///
/// Users without a profile are listed as members; a missing full name falls
/// back to the local part of the email address.
pub fn merge_with_profiles(users: &[User], profiles: &[Profile]) -> Vec<AdminUserEntry> {
    users
        .iter()
        .map(|user| {
            let role = profiles
                .iter()
                .find(|p| p.id == user.id)
                .map(|p| p.role)
                .unwrap_or(Role::Member);
            let full_name = user
                .full_name
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| {
                    user.email
                        .split('@')
                        .next()
                        .filter(|local| !local.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "Unknown".to_string());

            AdminUserEntry {
                id: user.id,
                email: user.email.clone(),
                user_metadata: AdminUserMetadata { role, full_name },
                created_at: user.created_at,
            }
        })
        .collect()
}

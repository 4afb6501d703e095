// ============================================================================
// MODEL : ADMINS
// ============================================================================
//
// Columns of the admins table:
//   - id (UUID, PRIMARY KEY)
//   - email (VARCHAR, UNIQUE, NOT NULL) - always stored lower-cased and trimmed
//   - password (VARCHAR, NOT NULL) - pbkdf2:sha256:iterations$salt$hash
//   - first_name / last_name (VARCHAR, NOT NULL)
//   - is_active (BOOLEAN, DEFAULT TRUE) - soft-disable flag, checked on every request
//   - last_login (TIMESTAMPTZ, NULL)
//   - reset_password_token (VARCHAR, NULL) - sha256 hex of the emailed token
//   - reset_password_expires (TIMESTAMPTZ, NULL) - issue time + 1 hour
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Password reset workflow:
//   1. POST /api/auth/forgot-password stores the digest + expiry here
//   2. The raw token only ever leaves the server inside the reset email
//   3. POST /api/auth/reset-password matches sha256(token) and a future expiry
//   4. Both reset columns are cleared, so the token cannot be replayed
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "admins")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub first_name: String,

    pub last_name: String,

    pub is_active: bool,

    pub last_login: Option<DateTimeUtc>,

    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_password_expires: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog::Entity")]
    Blog,

    #[sea_orm(has_many = "super::testimonial::Entity")]
    ApprovedTestimonial,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::testimonial::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovedTestimonial.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Name-only attribution shown to site visitors (blog author)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorByline {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Model> for AuthorByline {
    fn from(admin: &Model) -> Self {
        AuthorByline {
            id: admin.id,
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
        }
    }
}

/// Attribution for back-office readers (testimonial approver)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Model> for AdminSummary {
    fn from(admin: &Model) -> Self {
        AdminSummary {
            id: admin.id,
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Emails are compared and stored in this form
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

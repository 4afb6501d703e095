// Request / response shapes shared by the routes and the services
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::admin::{self, AdminSummary, AuthorByline};
use super::blog::{self, BlogStatus};
use super::blog_translation::{self, LanguageCode};
use super::testimonial;
use crate::error::FieldError;

// ============================================================================
// Envelope + pagination
// ============================================================================

/// `{success, message?, data?, pagination?, errors?}` returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            errors: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            message: Some(message.into()),
            ..Self::data(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
            errors: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn page(page: Page<T>) -> Self {
        ApiResponse {
            pagination: Some(page.pagination),
            ..Self::data(page.items)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const MAX_PAGE: u64 = 1_000_000;

/// 1-indexed page / limit pair, already clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn paginate(&self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            pages: total.div_ceil(self.limit),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub admin: admin::Model,
    pub token: String,
}

/// Only the names can be changed through the profile endpoint
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetTokenQuery {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenStatus {
    pub valid: bool,
}

/// Input of the admin provisioning tool
#[derive(Debug, Clone, Validate)]
pub struct NewAdminRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
}

// ============================================================================
// Blogs
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranslationInput {
    pub language_code: LanguageCode,
    #[validate(length(min = 1, max = 255, message = "Title is required and must be less than 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required for each translation"))]
    pub content: String,
    pub excerpt: Option<String>,
    #[validate(length(max = 160, message = "Meta description must be at most 160 characters"))]
    pub meta_description: Option<String>,
    #[validate(length(max = 255, message = "Meta keywords must be at most 255 characters"))]
    pub meta_keywords: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 255, message = "Slug must be between 1 and 255 characters"))]
    pub slug: Option<String>,
    pub status: Option<BlogStatus>,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(length(min = 1, message = "At least one translation is required"))]
    #[validate(nested)]
    pub translations: Vec<TranslationInput>,
}

/// Mutable blog fields; `translations`, when present, replaces the whole set
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBlogRequest {
    #[validate(length(min = 1, max = 255, message = "Slug must be between 1 and 255 characters"))]
    pub slug: Option<String>,
    pub status: Option<BlogStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub featured_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[validate(nested)]
    pub translations: Option<Vec<TranslationInput>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    #[validate(range(min = 1, max = 1000000, message = "Page must be between 1 and 1000000"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    pub status: Option<BlogStatus>,
    pub language_code: Option<LanguageCode>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub include_unpublished: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageQuery {
    pub language_code: Option<LanguageCode>,
}

/// A blog shell hydrated with its translations and author
#[derive(Debug, Clone, Serialize)]
pub struct BlogWithTranslations {
    #[serde(flatten)]
    pub blog: blog::Model,
    pub translations: Vec<blog_translation::Model>,
    pub author: Option<AuthorByline>,
}

// ============================================================================
// Contacts
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Subject must be less than 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
}

/// Request metadata captured alongside a contact submission
#[derive(Debug, Clone, Default)]
pub struct SubmitterInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateContactRequest {
    pub is_read: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactListQuery {
    #[validate(range(min = 1, max = 1000000, message = "Page must be between 1 and 1000000"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    pub is_read: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactStats {
    pub total: u64,
    pub read: u64,
    pub unread: u64,
}

// ============================================================================
// Testimonials
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestimonialRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub company: Option<String>,
    pub position: Option<String>,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTestimonialRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub position: Option<Option<String>>,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    pub is_approved: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialListQuery {
    #[validate(range(min = 1, max = 1000000, message = "Page must be between 1 and 1000000"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    pub is_approved: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// Public listing: approved testimonials only
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedTestimonialQuery {
    #[validate(range(min = 1, max = 1000000, message = "Page must be between 1 and 1000000"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestimonialWithApprover {
    #[serde(flatten)]
    pub testimonial: testimonial::Model,
    /// Only filled in for admin readers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<AdminSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestimonialStats {
    pub total: u64,
    pub approved: u64,
    pub pending: u64,
    pub featured: u64,
}

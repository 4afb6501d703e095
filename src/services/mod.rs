pub mod auth_service;
pub mod blog_service;
pub mod contact_service;
pub mod email_service;
pub mod testimonial_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::AuthService;
pub use blog_service::BlogService;
pub use contact_service::ContactService;
pub use email_service::{EmailSender, EmailService};
pub use testimonial_service::TestimonialService;

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, SqlErr, TransactionTrait};

use crate::error::AppError;

/// `%term%` with LIKE wildcards escaped, lower-cased; `None` for a blank term
pub(crate) fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Case-insensitive `LIKE` usable on both Postgres and SQLite
pub(crate) fn lower_like<C: IntoColumnRef>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Count and page queries of a listing see the same snapshot
pub(crate) async fn begin_snapshot(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    db.begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
        .await
}

/// Unique index violations become a 409 with the given message
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_string()),
        _ => AppError::Database(err),
    }
}

// ============================================================================
// MODEL : CONTACTS
// ============================================================================
//
// Columns of the contacts table:
//   - id (UUID, PRIMARY KEY)
//   - name, email (VARCHAR, NOT NULL)
//   - phone, subject (VARCHAR, NULL)
//   - message (TEXT, NOT NULL)
//   - ip_address, user_agent (VARCHAR, NULL) - captured when the form is submitted
//   - is_read (BOOLEAN, DEFAULT FALSE)
//   - read_at (TIMESTAMPTZ, NULL) - set / cleared together with is_read
//   - created_at / updated_at (TIMESTAMPTZ)
//
// A contact is immutable once submitted, except for its read state.
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "contacts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub email: String,

    pub phone: Option<String>,

    pub subject: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub ip_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    #[sea_orm(indexed)]
    pub is_read: bool,

    pub read_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ============================================================================
// MODEL : TESTIMONIALS
// ============================================================================
//
// Columns of the testimonials table:
//   - id (UUID, PRIMARY KEY)
//   - name, email (VARCHAR, NOT NULL)
//   - company, position (VARCHAR, NULL)
//   - message (TEXT, NOT NULL)
//   - rating (INTEGER, NULL) - 1 to 5
//   - avatar (VARCHAR, NULL) - image URL
//   - is_approved (BOOLEAN, DEFAULT FALSE)
//   - approved_at (TIMESTAMPTZ, NULL) \ both NULL or both set
//   - approved_by (UUID, NULL)        / FK -> admins, ON DELETE SET NULL
//   - featured (BOOLEAN, DEFAULT FALSE) - independent from approval
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Public listings only ever show approved rows, featured ones first.
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "testimonials")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub email: String,

    pub company: Option<String>,

    pub position: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub rating: Option<i32>,

    pub avatar: Option<String>,

    #[sea_orm(indexed)]
    pub is_approved: bool,

    pub approved_at: Option<DateTimeUtc>,

    pub approved_by: Option<Uuid>,

    #[sea_orm(indexed)]
    pub featured: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::ApprovedBy",
        to = "super::admin::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

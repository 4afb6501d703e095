// ============================================================================
// MODEL : BLOGS
// ============================================================================
//
// Columns of the blogs table:
//   - id (UUID, PRIMARY KEY)
//   - slug (VARCHAR, UNIQUE, NOT NULL) - letters, digits and hyphens only
//   - author_id (UUID, NOT NULL, FK -> admins)
//   - status (VARCHAR) - draft | published | archived
//   - featured_image (VARCHAR, NULL)
//   - category (VARCHAR, NULL) - default category, translations may override it
//   - tags (JSON array, DEFAULT []) - default tags, translations may override them
//   - view_count (INTEGER, DEFAULT 0) - only bumped by the slug lookup
//   - published_at (TIMESTAMPTZ, NULL) - stamped the first time status becomes published
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Notes:
//   - The readable content lives in blog_translations (one row per language)
//   - ON DELETE CASCADE on blog_translations.blog_id
//
// ============================================================================

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "blogs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub slug: String,

    pub author_id: Uuid,

    pub status: BlogStatus,

    pub featured_image: Option<String>,

    pub category: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Tags,

    pub view_count: i32,

    pub published_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl Default for BlogStatus {
    fn default() -> Self {
        BlogStatus::Draft
    }
}

/// Ordered list of tags, stored as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Tags(tags)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AuthorId",
        to = "super::admin::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::blog_translation::Entity")]
    Translations,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::blog_translation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Translations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

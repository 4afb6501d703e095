// ============================================================================
// MODEL : BLOG TRANSLATIONS
// ============================================================================
//
// Columns of the blog_translations table:
//   - id (UUID, PRIMARY KEY)
//   - blog_id (UUID, NOT NULL, FK -> blogs, ON DELETE CASCADE)
//   - language_code (VARCHAR(5)) - en | fr | es | de | rw | sw
//   - title (VARCHAR(255), NOT NULL)
//   - content (TEXT, NOT NULL)
//   - excerpt (TEXT, NULL)
//   - meta_description (VARCHAR(160), NULL)
//   - meta_keywords (VARCHAR(255), NULL)
//   - reading_time (INTEGER) - minutes, computed when the row is written
//   - category (VARCHAR, NULL) - per-language override of blogs.category
//   - tags (JSON array, DEFAULT []) - per-language override of blogs.tags
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Notes:
//   - UNIQUE (blog_id, language_code), index "unique_blog_language"
//   - Updates replace the whole set of rows of a blog, never merge
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::blog::Tags;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "blog_translations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub blog_id: Uuid,

    #[sea_orm(indexed)]
    pub language_code: LanguageCode,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    #[sea_orm(column_type = "String(StringLen::N(160))", nullable)]
    pub meta_description: Option<String>,

    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub meta_keywords: Option<String>,

    pub reading_time: i32,

    pub category: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Tags,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

/// Languages the site is published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(5))")]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[sea_orm(string_value = "en")]
    En,
    #[sea_orm(string_value = "fr")]
    Fr,
    #[sea_orm(string_value = "es")]
    Es,
    #[sea_orm(string_value = "de")]
    De,
    /// Kinyarwanda
    #[sea_orm(string_value = "rw")]
    Rw,
    /// Swahili
    #[sea_orm(string_value = "sw")]
    Sw,
}

impl LanguageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Fr => "fr",
            LanguageCode::Es => "es",
            LanguageCode::De => "de",
            LanguageCode::Rw => "rw",
            LanguageCode::Sw => "sw",
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        LanguageCode::En
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blog::Entity",
        from = "Column::BlogId",
        to = "super::blog::Column::Id",
        on_delete = "Cascade"
    )]
    Blog,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

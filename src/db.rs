// Database connection + schema bootstrap

use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::models::{admin, blog, blog_translation, contact, testimonial};

pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Creates missing tables and indexes from the entity definitions.
/// Parents are created before the tables referencing them.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, admin::Entity).await?;
    create_table(db, blog::Entity).await?;
    create_table(db, blog_translation::Entity).await?;
    create_table(db, contact::Entity).await?;
    create_table(db, testimonial::Entity).await?;

    // One translation per language and blog
    let unique_language = Index::create()
        .name("unique_blog_language")
        .table(blog_translation::Entity)
        .col(blog_translation::Column::BlogId)
        .col(blog_translation::Column::LanguageCode)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(db.get_database_backend().build(&unique_language)).await?;

    tracing::info!("database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    Ok(())
}

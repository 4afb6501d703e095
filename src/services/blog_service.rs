use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::admin::{self, AuthorByline};
use crate::models::blog::{self, BlogStatus, Tags};
use crate::models::blog_translation::{self, LanguageCode};
use crate::models::dto::{
    BlogListQuery, BlogWithTranslations, CreateBlogRequest, Page, PageRequest, TranslationInput,
    UpdateBlogRequest,
};
use crate::services::{begin_snapshot, conflict_on_unique, lower_like, search_pattern};
use crate::utils::slug::{generate_slug, is_valid_slug, reading_time};

const BLOG_NOT_FOUND: &str = "Blog not found";
const DUPLICATE_SLUG: &str = "A blog with this slug already exists";

/// Multilingual posts: one blog shell owning one translation per language
#[derive(Clone)]
pub struct BlogService {
    db: DatabaseConnection,
}

impl BlogService {
    pub fn new(db: DatabaseConnection) -> Self {
        BlogService { db }
    }

    pub async fn create(&self, input: CreateBlogRequest, author_id: Uuid) -> Result<BlogWithTranslations> {
        // 1. Translations
        ensure_translations(&input.translations)?;

        // 2. Slug, derived from the first title when absent
        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => generate_slug(&input.translations[0].title),
        };
        ensure_valid_slug(&slug)?;
        if self.slug_taken(&slug, None).await? {
            return Err(AppError::Conflict(DUPLICATE_SLUG.to_string()));
        }

        // 3. Shell + translations in one transaction
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let txn = self.db.begin().await?;

        let blog = blog::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(slug),
            author_id: Set(author_id),
            status: Set(status),
            featured_image: Set(input.featured_image),
            category: Set(input.category),
            tags: Set(Tags(input.tags.unwrap_or_default())),
            view_count: Set(0),
            published_at: Set((status == BlogStatus::Published).then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_SLUG))?;

        let translations = insert_translations(&txn, blog.id, &input.translations, now).await?;
        txn.commit().await?;

        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "blog created");
        self.hydrate(blog, translations).await
    }

    /// Updates the shell; a supplied translation list replaces the stored one entirely
    pub async fn update(&self, id: Uuid, input: UpdateBlogRequest) -> Result<BlogWithTranslations> {
        // 1. Existing blog
        let blog = self.find(id).await?;
        if let Some(translations) = &input.translations {
            ensure_translations(translations)?;
        }

        // 2. Slug uniqueness against the other blogs
        let new_slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if slug != blog.slug => {
                ensure_valid_slug(slug)?;
                if self.slug_taken(slug, Some(id)).await? {
                    return Err(AppError::Conflict(DUPLICATE_SLUG.to_string()));
                }
                Some(slug.to_string())
            }
            _ => None,
        };

        // 3. Field changes; published_at is only ever stamped once
        let now = Utc::now();
        let already_published = blog.published_at.is_some();
        let mut active = blog.into_active_model();
        if let Some(slug) = new_slug {
            active.slug = Set(slug);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
            if status == BlogStatus::Published && !already_published {
                active.published_at = Set(Some(now));
            }
        }
        if let Some(featured_image) = input.featured_image {
            active.featured_image = Set(featured_image);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(tags) = input.tags {
            active.tags = Set(Tags(tags));
        }
        active.updated_at = Set(now);

        // 4. Shell update + translation replacement commit together
        let txn = self.db.begin().await?;
        let blog = active
            .update(&txn)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_SLUG))?;

        let translations = match &input.translations {
            Some(inputs) => {
                blog_translation::Entity::delete_many()
                    .filter(blog_translation::Column::BlogId.eq(blog.id))
                    .exec(&txn)
                    .await?;
                insert_translations(&txn, blog.id, inputs, now).await?
            }
            None => load_translations(&txn, &[blog.id], None).await?,
        };
        txn.commit().await?;

        tracing::info!(blog_id = %blog.id, "blog updated");
        self.hydrate(blog, translations).await
    }

    /// Admin / preview read, never counted as a view
    pub async fn get_by_id(&self, id: Uuid, language: Option<LanguageCode>) -> Result<BlogWithTranslations> {
        let blog = self.find(id).await?;
        let translations = self.translations_for(&blog, language).await?;
        self.hydrate(blog, translations).await
    }

    /// Public read; counts one view per successful call
    pub async fn get_by_slug(&self, slug: &str, language: Option<LanguageCode>) -> Result<BlogWithTranslations> {
        let mut blog = blog::Entity::find()
            .filter(blog::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(BLOG_NOT_FOUND.to_string()))?;
        let translations = self.translations_for(&blog, language).await?;

        // Atomic increment, concurrent readers never lose a view
        blog::Entity::update_many()
            .col_expr(blog::Column::ViewCount, Expr::col(blog::Column::ViewCount).add(1))
            .filter(blog::Column::Id.eq(blog.id))
            .exec(&self.db)
            .await?;
        blog.view_count += 1;

        self.hydrate(blog, translations).await
    }

    /// Paginated listing. Anonymous callers only ever see published posts.
    pub async fn list(&self, query: BlogListQuery, is_admin: bool) -> Result<Page<BlogWithTranslations>> {
        let page = PageRequest::new(query.page, query.limit);

        let status = match (is_admin, query.status) {
            (false, Some(status)) if status != BlogStatus::Published => {
                return Ok(Page {
                    items: Vec::new(),
                    pagination: page.paginate(0),
                });
            }
            (false, _) => Some(BlogStatus::Published),
            (true, Some(status)) => Some(status),
            (true, None) if query.include_unpublished.unwrap_or(false) => None,
            (true, None) => Some(BlogStatus::Published),
        };

        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(blog::Column::Status.eq(status));
        }
        if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            condition = condition.add(blog::Column::Category.eq(category));
        }

        // Language and search narrow the set of blogs through their translations
        let pattern = search_pattern(query.search.as_deref());
        if query.language_code.is_some() || pattern.is_some() {
            let mut translation_filter = Condition::all();
            if let Some(language) = query.language_code {
                translation_filter = translation_filter.add(blog_translation::Column::LanguageCode.eq(language));
            }
            if let Some(pattern) = &pattern {
                translation_filter = translation_filter.add(
                    Condition::any()
                        .add(lower_like(blog_translation::Column::Title, pattern))
                        .add(lower_like(blog_translation::Column::Content, pattern))
                        .add(lower_like(blog_translation::Column::Excerpt, pattern)),
                );
            }
            condition = condition.add(
                blog::Column::Id.in_subquery(
                    Query::select()
                        .column(blog_translation::Column::BlogId)
                        .from(blog_translation::Entity)
                        .cond_where(translation_filter)
                        .to_owned(),
                ),
            );
        }

        let txn = begin_snapshot(&self.db).await?;
        let total = blog::Entity::find().filter(condition.clone()).count(&txn).await?;
        let blogs = blog::Entity::find()
            .filter(condition)
            .order_by_desc(blog::Column::CreatedAt)
            .order_by_desc(blog::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&txn)
            .await?;

        let ids: Vec<Uuid> = blogs.iter().map(|b| b.id).collect();
        let translations = load_translations(&txn, &ids, query.language_code).await?;
        let authors = load_authors(&txn, blogs.iter().map(|b| b.author_id)).await?;
        txn.commit().await?;

        Ok(Page {
            items: assemble(blogs, translations, &authors),
            pagination: page.paginate(total),
        })
    }

    /// Distinct categories of published posts in a language, sorted
    pub async fn categories(&self, language: LanguageCode) -> Result<Vec<String>> {
        let (blogs, translations) = self.published_with_translations(language).await?;

        let mut categories = BTreeSet::new();
        let candidates = translations
            .into_iter()
            .filter_map(|t| t.category)
            .chain(blogs.into_iter().filter_map(|b| b.category));
        for category in candidates {
            let category = category.trim();
            if !category.is_empty() {
                categories.insert(category.to_string());
            }
        }

        Ok(categories.into_iter().collect())
    }

    /// Distinct tags of published posts in a language, sorted
    pub async fn tags(&self, language: LanguageCode) -> Result<Vec<String>> {
        let (blogs, translations) = self.published_with_translations(language).await?;

        let mut tags = BTreeSet::new();
        let candidates = translations
            .into_iter()
            .flat_map(|t| t.tags.0)
            .chain(blogs.into_iter().flat_map(|b| b.tags.0));
        for tag in candidates {
            let tag = tag.trim();
            if !tag.is_empty() {
                tags.insert(tag.to_string());
            }
        }

        Ok(tags.into_iter().collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let blog = self.find(id).await?;

        let txn = self.db.begin().await?;
        blog_translation::Entity::delete_many()
            .filter(blog_translation::Column::BlogId.eq(blog.id))
            .exec(&txn)
            .await?;
        blog::Entity::delete_by_id(blog.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "blog deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<blog::Model> {
        blog::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(BLOG_NOT_FOUND.to_string()))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool> {
        let mut query = blog::Entity::find().filter(blog::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(blog::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// A post without the requested language is treated as missing
    async fn translations_for(
        &self,
        blog: &blog::Model,
        language: Option<LanguageCode>,
    ) -> Result<Vec<blog_translation::Model>> {
        let translations = load_translations(&self.db, &[blog.id], language).await?;
        if language.is_some() && translations.is_empty() {
            return Err(AppError::NotFound(BLOG_NOT_FOUND.to_string()));
        }
        Ok(translations)
    }

    async fn published_with_translations(
        &self,
        language: LanguageCode,
    ) -> Result<(Vec<blog::Model>, Vec<blog_translation::Model>)> {
        let blogs = blog::Entity::find()
            .filter(blog::Column::Status.eq(BlogStatus::Published))
            .all(&self.db)
            .await?;
        let ids: Vec<Uuid> = blogs.iter().map(|b| b.id).collect();
        let translations = load_translations(&self.db, &ids, Some(language)).await?;
        Ok((blogs, translations))
    }

    async fn hydrate(
        &self,
        blog: blog::Model,
        translations: Vec<blog_translation::Model>,
    ) -> Result<BlogWithTranslations> {
        let author = admin::Entity::find_by_id(blog.author_id)
            .one(&self.db)
            .await?
            .map(|a| AuthorByline::from(&a));

        Ok(BlogWithTranslations {
            blog,
            translations,
            author,
        })
    }
}

fn ensure_translations(translations: &[TranslationInput]) -> Result<()> {
    if translations.is_empty() {
        return Err(AppError::validation("translations", "At least one translation is required"));
    }

    let mut seen = HashSet::new();
    for translation in translations {
        if !seen.insert(translation.language_code) {
            return Err(AppError::validation(
                "translations",
                format!("Duplicate translation for language '{}'", translation.language_code.as_str()),
            ));
        }
    }
    Ok(())
}

fn ensure_valid_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(AppError::validation("slug", "Unable to derive a slug from the title"));
    }
    if !is_valid_slug(slug) {
        return Err(AppError::validation(
            "slug",
            "Slug can only contain letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

async fn insert_translations<C: ConnectionTrait>(
    conn: &C,
    blog_id: Uuid,
    inputs: &[TranslationInput],
    now: DateTime<Utc>,
) -> std::result::Result<Vec<blog_translation::Model>, DbErr> {
    let mut translations = Vec::with_capacity(inputs.len());
    for input in inputs {
        let translation = blog_translation::ActiveModel {
            id: Set(Uuid::new_v4()),
            blog_id: Set(blog_id),
            language_code: Set(input.language_code),
            title: Set(input.title.trim().to_string()),
            content: Set(input.content.clone()),
            excerpt: Set(input.excerpt.clone()),
            meta_description: Set(input.meta_description.clone()),
            meta_keywords: Set(input.meta_keywords.clone()),
            reading_time: Set(reading_time(&input.content)),
            category: Set(input.category.clone()),
            tags: Set(Tags(input.tags.clone().unwrap_or_default())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;
        translations.push(translation);
    }
    Ok(translations)
}

async fn load_translations<C: ConnectionTrait>(
    conn: &C,
    blog_ids: &[Uuid],
    language: Option<LanguageCode>,
) -> std::result::Result<Vec<blog_translation::Model>, DbErr> {
    if blog_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = blog_translation::Entity::find()
        .filter(blog_translation::Column::BlogId.is_in(blog_ids.iter().copied()));
    if let Some(language) = language {
        query = query.filter(blog_translation::Column::LanguageCode.eq(language));
    }
    query
        .order_by_asc(blog_translation::Column::LanguageCode)
        .all(conn)
        .await
}

async fn load_authors<C: ConnectionTrait>(
    conn: &C,
    author_ids: impl Iterator<Item = Uuid>,
) -> std::result::Result<HashMap<Uuid, AuthorByline>, DbErr> {
    let ids: HashSet<Uuid> = author_ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let authors = admin::Entity::find()
        .filter(admin::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(authors.iter().map(|a| (a.id, AuthorByline::from(a))).collect())
}

fn assemble(
    blogs: Vec<blog::Model>,
    translations: Vec<blog_translation::Model>,
    authors: &HashMap<Uuid, AuthorByline>,
) -> Vec<BlogWithTranslations> {
    let mut by_blog: HashMap<Uuid, Vec<blog_translation::Model>> = HashMap::new();
    for translation in translations {
        by_blog.entry(translation.blog_id).or_default().push(translation);
    }

    blogs
        .into_iter()
        .map(|blog| BlogWithTranslations {
            translations: by_blog.remove(&blog.id).unwrap_or_default(),
            author: authors.get(&blog.author_id).cloned(),
            blog,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    fn translation(language: LanguageCode, title: &str, content: &str) -> TranslationInput {
        TranslationInput {
            language_code: language,
            title: title.to_string(),
            content: content.to_string(),
            excerpt: None,
            meta_description: None,
            meta_keywords: None,
            category: None,
            tags: None,
        }
    }

    fn new_blog(title: &str, status: BlogStatus) -> CreateBlogRequest {
        CreateBlogRequest {
            slug: None,
            status: Some(status),
            featured_image: None,
            category: None,
            tags: None,
            translations: vec![translation(LanguageCode::En, title, "Some body text for the post")],
        }
    }

    async fn setup() -> (BlogService, admin::Model) {
        let db = test_db().await;
        let author = insert_admin(&db, "author@example.org").await;
        (BlogService::new(db), author)
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_reading_time() {
        let (service, author) = setup().await;

        let mut request = new_blog("Hello, World!", BlogStatus::Draft);
        request.translations[0].content = "word ".repeat(450);
        let created = service.create(request, author.id).await.unwrap();

        assert_eq!(created.blog.slug, "hello-world");
        assert_eq!(created.blog.status, BlogStatus::Draft);
        assert_eq!(created.blog.view_count, 0);
        assert!(created.blog.published_at.is_none());
        assert_eq!(created.translations.len(), 1);
        assert_eq!(created.translations[0].reading_time, 3);
        assert_eq!(created.author.unwrap().id, author.id);
    }

    #[tokio::test]
    async fn test_create_published_stamps_published_at() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Live", BlogStatus::Published), author.id).await.unwrap();
        assert!(created.blog.published_at.is_some());
    }

    #[tokio::test]
    async fn test_slug_collision_is_a_conflict() {
        let (service, author) = setup().await;
        service.create(new_blog("Same Title", BlogStatus::Draft), author.id).await.unwrap();

        let err = service.create(new_blog("Same   title", BlogStatus::Draft), author.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (service, author) = setup().await;

        let mut duplicated = new_blog("Twice", BlogStatus::Draft);
        duplicated.translations.push(translation(LanguageCode::En, "Again", "Body"));
        let err = service.create(duplicated, author.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.create(new_blog("!!!", BlogStatus::Draft), author.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut spaced = new_blog("Fine", BlogStatus::Draft);
        spaced.slug = Some("not a slug".to_string());
        let err = service.create(spaced, author.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_published_at_is_set_once() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Once", BlogStatus::Draft), author.id).await.unwrap();
        let publish = |status| UpdateBlogRequest {
            status: Some(status),
            ..Default::default()
        };

        let first = service.update(created.blog.id, publish(BlogStatus::Published)).await.unwrap();
        let first_stamp = first.blog.published_at.unwrap();

        service.update(created.blog.id, publish(BlogStatus::Archived)).await.unwrap();
        let again = service.update(created.blog.id, publish(BlogStatus::Published)).await.unwrap();
        assert_eq!(again.blog.published_at, Some(first_stamp));
    }

    #[tokio::test]
    async fn test_saving_a_published_post_keeps_published_at() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Live", BlogStatus::Published), author.id).await.unwrap();
        let stamp = created.blog.published_at.unwrap();

        let resaved = service
            .update(
                created.blog.id,
                UpdateBlogRequest {
                    status: Some(BlogStatus::Published),
                    category: Some(Some("news".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resaved.blog.status, BlogStatus::Published);
        assert_eq!(resaved.blog.published_at, Some(stamp));

        let untouched = service.update(created.blog.id, UpdateBlogRequest::default()).await.unwrap();
        assert_eq!(untouched.blog.published_at, Some(stamp));
    }

    #[tokio::test]
    async fn test_translation_replacement_drops_omitted_languages() {
        let (service, author) = setup().await;
        let mut request = new_blog("Bilingual", BlogStatus::Draft);
        request.translations.push(translation(LanguageCode::Fr, "Bilingue", "Du texte"));
        let created = service.create(request, author.id).await.unwrap();
        assert_eq!(created.translations.len(), 2);

        let updated = service
            .update(
                created.blog.id,
                UpdateBlogRequest {
                    translations: Some(vec![translation(LanguageCode::Fr, "Seulement", "Texte")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.translations.len(), 1);
        assert_eq!(updated.translations[0].language_code, LanguageCode::Fr);

        let err = service
            .get_by_id(created.blog.id, Some(LanguageCode::En))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_without_translations_keeps_them() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Keep", BlogStatus::Draft), author.id).await.unwrap();

        let updated = service
            .update(
                created.blog.id,
                UpdateBlogRequest {
                    category: Some(Some("News".to_string())),
                    featured_image: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.blog.category.as_deref(), Some("News"));
        assert_eq!(updated.translations.len(), 1);

        let err = service
            .update(
                created.blog.id,
                UpdateBlogRequest {
                    translations: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_slug_checks_other_blogs_only() {
        let (service, author) = setup().await;
        let first = service.create(new_blog("First", BlogStatus::Draft), author.id).await.unwrap();
        service.create(new_blog("Second", BlogStatus::Draft), author.id).await.unwrap();

        let rename = |slug: &str| UpdateBlogRequest {
            slug: Some(slug.to_string()),
            ..Default::default()
        };
        assert!(service.update(first.blog.id, rename("first")).await.is_ok());
        let err = service.update(first.blog.id, rename("second")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service.update(Uuid::new_v4(), rename("third")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_view_count_only_moves_on_slug_reads() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Counted", BlogStatus::Published), author.id).await.unwrap();

        let read = service.get_by_slug("counted", None).await.unwrap();
        assert_eq!(read.blog.view_count, 1);
        let read = service.get_by_slug("counted", Some(LanguageCode::En)).await.unwrap();
        assert_eq!(read.blog.view_count, 2);

        let by_id = service.get_by_id(created.blog.id, None).await.unwrap();
        assert_eq!(by_id.blog.view_count, 2);

        // Missing language: not found and not counted
        assert!(service.get_by_slug("counted", Some(LanguageCode::De)).await.is_err());
        let by_id = service.get_by_id(created.blog.id, None).await.unwrap();
        assert_eq!(by_id.blog.view_count, 2);

        let err = service.get_by_slug("missing", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (service, author) = setup().await;
        for i in 0..12 {
            service
                .create(new_blog(&format!("Post {}", i), BlogStatus::Published), author.id)
                .await
                .unwrap();
        }

        let page = service
            .list(
                BlogListQuery {
                    page: Some(2),
                    limit: Some(5),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.page, 2);
        assert!(page.items.iter().all(|b| b.author.is_some() && b.translations.len() == 1));
    }

    #[tokio::test]
    async fn test_list_visibility() {
        let (service, author) = setup().await;
        service.create(new_blog("Public", BlogStatus::Published), author.id).await.unwrap();
        service.create(new_blog("Hidden", BlogStatus::Draft), author.id).await.unwrap();

        let anonymous = service.list(BlogListQuery::default(), false).await.unwrap();
        assert_eq!(anonymous.pagination.total, 1);

        let sneaky = BlogListQuery {
            status: Some(BlogStatus::Draft),
            ..Default::default()
        };
        assert!(service.list(sneaky, false).await.unwrap().items.is_empty());

        let drafts = BlogListQuery {
            status: Some(BlogStatus::Draft),
            ..Default::default()
        };
        assert_eq!(service.list(drafts, true).await.unwrap().items[0].blog.slug, "hidden");

        let everything = BlogListQuery {
            include_unpublished: Some(true),
            ..Default::default()
        };
        assert_eq!(service.list(everything, true).await.unwrap().pagination.total, 2);
        assert_eq!(service.list(BlogListQuery::default(), true).await.unwrap().pagination.total, 1);
    }

    #[tokio::test]
    async fn test_list_search_and_language() {
        let (service, author) = setup().await;
        let mut request = new_blog("Children Education", BlogStatus::Published);
        request.translations.push(translation(LanguageCode::Fr, "Éducation des enfants", "Texte"));
        service.create(request, author.id).await.unwrap();
        service.create(new_blog("Water Wells", BlogStatus::Published), author.id).await.unwrap();

        let search = BlogListQuery {
            search: Some("EDUCATION".to_string()),
            ..Default::default()
        };
        let found = service.list(search, false).await.unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].translations.len(), 2);

        let french = BlogListQuery {
            language_code: Some(LanguageCode::Fr),
            ..Default::default()
        };
        let found = service.list(french, false).await.unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].translations.len(), 1);
        assert_eq!(found.items[0].translations[0].language_code, LanguageCode::Fr);

        let wildcard = BlogListQuery {
            search: Some("%".to_string()),
            ..Default::default()
        };
        assert!(service.list(wildcard, false).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_categories_and_tags() {
        let (service, author) = setup().await;

        let mut published = new_blog("Categorized", BlogStatus::Published);
        published.category = Some("Health".to_string());
        published.tags = Some(vec!["water".to_string(), "".to_string()]);
        published.translations[0].category = Some("Education".to_string());
        published.translations[0].tags = Some(vec!["school".to_string(), "water".to_string()]);
        service.create(published, author.id).await.unwrap();

        let mut draft = new_blog("Unpublished", BlogStatus::Draft);
        draft.category = Some("Secret".to_string());
        service.create(draft, author.id).await.unwrap();

        assert_eq!(service.categories(LanguageCode::En).await.unwrap(), vec!["Education", "Health"]);
        assert_eq!(service.tags(LanguageCode::En).await.unwrap(), vec!["school", "water"]);
        // No French translation: only the blog defaults remain
        assert_eq!(service.categories(LanguageCode::Fr).await.unwrap(), vec!["Health"]);
    }

    #[tokio::test]
    async fn test_delete_removes_translations() {
        let (service, author) = setup().await;
        let created = service.create(new_blog("Doomed", BlogStatus::Draft), author.id).await.unwrap();

        service.delete(created.blog.id).await.unwrap();

        let remaining = blog_translation::Entity::find().count(&service.db).await.unwrap();
        assert_eq!(remaining, 0);
        let err = service.delete(created.blog.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

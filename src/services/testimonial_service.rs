use chrono::{DateTime, Utc};
use sea_orm::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::admin::{self, AdminSummary};
use crate::models::dto::{
    ApprovedTestimonialQuery, CreateTestimonialRequest, Page, PageRequest, TestimonialListQuery,
    TestimonialStats, TestimonialWithApprover, UpdateTestimonialRequest,
};
use crate::models::testimonial;
use crate::services::email_service::EmailService;
use crate::services::{begin_snapshot, lower_like, search_pattern};

const TESTIMONIAL_NOT_FOUND: &str = "Testimonial not found";

/// Who a read is for; admin contact details never reach public readers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Admin,
    Public,
}

/// Visitor testimonials and their moderation
#[derive(Clone)]
pub struct TestimonialService {
    db: DatabaseConnection,
    email: EmailService,
}

impl TestimonialService {
    pub fn new(db: DatabaseConnection, email: EmailService) -> Self {
        TestimonialService { db, email }
    }

    /// Public submission, always starts unapproved and not featured
    pub async fn create(&self, input: CreateTestimonialRequest) -> Result<testimonial::Model> {
        let now = Utc::now();
        let testimonial = testimonial::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_lowercase()),
            company: Set(input.company),
            position: Set(input.position),
            message: Set(input.message.trim().to_string()),
            rating: Set(input.rating),
            avatar: Set(input.avatar),
            is_approved: Set(false),
            approved_at: Set(None),
            approved_by: Set(None),
            featured: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(testimonial_id = %testimonial.id, "testimonial submitted");

        if let Err(e) = self.email.send_testimonial_notification(&testimonial).await {
            tracing::warn!(testimonial_id = %testimonial.id, error = %e, "failed to send testimonial notification");
        }

        Ok(testimonial)
    }

    /// Admin listing, moderated or not
    pub async fn list(&self, query: TestimonialListQuery) -> Result<Page<TestimonialWithApprover>> {
        let mut condition = Condition::all();
        if let Some(is_approved) = query.is_approved {
            condition = condition.add(testimonial::Column::IsApproved.eq(is_approved));
        }
        if let Some(featured) = query.featured {
            condition = condition.add(testimonial::Column::Featured.eq(featured));
        }
        if let Some(pattern) = search_pattern(query.search.as_deref()) {
            condition = condition.add(
                Condition::any()
                    .add(lower_like(testimonial::Column::Name, &pattern))
                    .add(lower_like(testimonial::Column::Email, &pattern))
                    .add(lower_like(testimonial::Column::Company, &pattern))
                    .add(lower_like(testimonial::Column::Message, &pattern)),
            );
        }

        self.paginate(condition, PageRequest::new(query.page, query.limit), Audience::Admin).await
    }

    /// Public listing, featured testimonials first
    pub async fn list_approved(&self, query: ApprovedTestimonialQuery) -> Result<Page<TestimonialWithApprover>> {
        let mut condition = Condition::all().add(testimonial::Column::IsApproved.eq(true));
        if let Some(featured) = query.featured {
            condition = condition.add(testimonial::Column::Featured.eq(featured));
        }

        self.paginate(condition, PageRequest::new(query.page, query.limit), Audience::Public).await
    }

    /// Anonymous viewers only see approved testimonials, without the approver
    pub async fn get_by_id(&self, id: Uuid, viewer_is_admin: bool) -> Result<TestimonialWithApprover> {
        let testimonial = self.find(id).await?;
        if !viewer_is_admin && !testimonial.is_approved {
            return Err(AppError::NotFound(TESTIMONIAL_NOT_FOUND.to_string()));
        }
        let audience = if viewer_is_admin { Audience::Admin } else { Audience::Public };
        self.hydrate(testimonial, audience).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTestimonialRequest,
        admin_id: Uuid,
    ) -> Result<TestimonialWithApprover> {
        let testimonial = self.find(id).await?;
        let now = Utc::now();
        let was_approved = testimonial.is_approved;

        let mut active = testimonial.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = input.email {
            active.email = Set(email.trim().to_lowercase());
        }
        if let Some(company) = input.company {
            active.company = Set(company);
        }
        if let Some(position) = input.position {
            active.position = Set(position);
        }
        if let Some(message) = input.message {
            active.message = Set(message.trim().to_string());
        }
        if let Some(rating) = input.rating {
            active.rating = Set(Some(rating));
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(avatar);
        }
        if let Some(featured) = input.featured {
            active.featured = Set(featured);
        }
        if let Some(approve) = input.is_approved {
            apply_approval(&mut active, was_approved, approve, admin_id, now);
        }
        active.updated_at = Set(now);

        let testimonial = active.update(&self.db).await?;
        self.hydrate(testimonial, Audience::Admin).await
    }

    pub async fn approve(&self, id: Uuid, admin_id: Uuid) -> Result<TestimonialWithApprover> {
        self.set_approval(id, true, admin_id).await
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid) -> Result<TestimonialWithApprover> {
        self.set_approval(id, false, admin_id).await
    }

    /// Flips `featured`; approval is left as it is
    pub async fn toggle_featured(&self, id: Uuid) -> Result<TestimonialWithApprover> {
        let testimonial = self.find(id).await?;
        let featured = !testimonial.featured;

        let mut active = testimonial.into_active_model();
        active.featured = Set(featured);
        active.updated_at = Set(Utc::now());
        let testimonial = active.update(&self.db).await?;

        self.hydrate(testimonial, Audience::Admin).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = testimonial::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(TESTIMONIAL_NOT_FOUND.to_string()));
        }
        tracing::info!(testimonial_id = %id, "testimonial deleted");
        Ok(())
    }

    /// `featured` only counts testimonials that are also approved
    pub async fn stats(&self) -> Result<TestimonialStats> {
        let total = testimonial::Entity::find().count(&self.db).await?;
        let approved = testimonial::Entity::find()
            .filter(testimonial::Column::IsApproved.eq(true))
            .count(&self.db)
            .await?;
        let featured = testimonial::Entity::find()
            .filter(testimonial::Column::IsApproved.eq(true))
            .filter(testimonial::Column::Featured.eq(true))
            .count(&self.db)
            .await?;

        Ok(TestimonialStats {
            total,
            approved,
            pending: total - approved,
            featured,
        })
    }

    async fn set_approval(&self, id: Uuid, approve: bool, admin_id: Uuid) -> Result<TestimonialWithApprover> {
        let testimonial = self.find(id).await?;
        let was_approved = testimonial.is_approved;
        let now = Utc::now();

        let mut active = testimonial.into_active_model();
        apply_approval(&mut active, was_approved, approve, admin_id, now);
        active.updated_at = Set(now);
        let testimonial = active.update(&self.db).await?;

        tracing::info!(testimonial_id = %testimonial.id, approved = approve, admin_id = %admin_id, "testimonial moderated");
        self.hydrate(testimonial, Audience::Admin).await
    }

    async fn find(&self, id: Uuid) -> Result<testimonial::Model> {
        testimonial::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(TESTIMONIAL_NOT_FOUND.to_string()))
    }

    async fn paginate(
        &self,
        condition: Condition,
        page: PageRequest,
        audience: Audience,
    ) -> Result<Page<TestimonialWithApprover>> {
        let txn = begin_snapshot(&self.db).await?;
        let total = testimonial::Entity::find().filter(condition.clone()).count(&txn).await?;
        let testimonials = testimonial::Entity::find()
            .filter(condition)
            .order_by_desc(testimonial::Column::Featured)
            .order_by_desc(testimonial::Column::CreatedAt)
            .order_by_desc(testimonial::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&txn)
            .await?;
        let approvers = match audience {
            Audience::Admin => load_approvers(&txn, testimonials.iter().filter_map(|t| t.approved_by)).await?,
            Audience::Public => HashMap::new(),
        };
        txn.commit().await?;

        let items = testimonials
            .into_iter()
            .map(|testimonial| TestimonialWithApprover {
                approver: testimonial.approved_by.and_then(|id| approvers.get(&id).cloned()),
                testimonial,
            })
            .collect();

        Ok(Page {
            items,
            pagination: page.paginate(total),
        })
    }

    async fn hydrate(&self, testimonial: testimonial::Model, audience: Audience) -> Result<TestimonialWithApprover> {
        let approver = match (audience, testimonial.approved_by) {
            (Audience::Admin, Some(id)) => admin::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|a| AdminSummary::from(&a)),
            _ => None,
        };
        Ok(TestimonialWithApprover { testimonial, approver })
    }
}

/// is_approved, approved_at and approved_by move together.
/// Re-approving keeps the original approval stamp.
fn apply_approval(
    active: &mut testimonial::ActiveModel,
    was_approved: bool,
    approve: bool,
    admin_id: Uuid,
    now: DateTime<Utc>,
) {
    if approve {
        if !was_approved {
            active.is_approved = Set(true);
            active.approved_at = Set(Some(now));
            active.approved_by = Set(Some(admin_id));
        }
    } else {
        active.is_approved = Set(false);
        active.approved_at = Set(None);
        active.approved_by = Set(None);
    }
}

async fn load_approvers<C: ConnectionTrait>(
    conn: &C,
    approver_ids: impl Iterator<Item = Uuid>,
) -> std::result::Result<HashMap<Uuid, AdminSummary>, DbErr> {
    let ids: HashSet<Uuid> = approver_ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let approvers = admin::Entity::find()
        .filter(admin::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(approvers.iter().map(|a| (a.id, AdminSummary::from(a))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use std::sync::Arc;

    fn submission(name: &str, rating: Option<i32>) -> CreateTestimonialRequest {
        CreateTestimonialRequest {
            name: name.to_string(),
            email: "friend@example.org".to_string(),
            company: Some("Acme".to_string()),
            position: None,
            message: "Wonderful work with the children.".to_string(),
            rating,
            avatar: None,
        }
    }

    async fn setup() -> (TestimonialService, admin::Model, Arc<RecordingMailer>) {
        let config = test_config();
        let db = test_db().await;
        let admin = insert_admin(&db, "moderator@example.org").await;
        let mailer = Arc::new(RecordingMailer::default());
        (TestimonialService::new(db, email_service(&config, mailer.clone())), admin, mailer)
    }

    #[tokio::test]
    async fn test_create_starts_pending_and_notifies() {
        let (service, _, mailer) = setup().await;
        let created = service.create(submission("Kofi", Some(5))).await.unwrap();

        assert!(!created.is_approved);
        assert!(!created.featured);
        assert!(created.approved_at.is_none() && created.approved_by.is_none());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("★★★★★"));
    }

    #[tokio::test]
    async fn test_approve_and_reject_pair_the_stamp() {
        let (service, admin, _) = setup().await;
        let created = service.create(submission("Kofi", None)).await.unwrap();

        let approved = service.approve(created.id, admin.id).await.unwrap();
        assert!(approved.testimonial.is_approved);
        assert_eq!(approved.testimonial.approved_by, Some(admin.id));
        assert_eq!(approved.approver.as_ref().map(|a| a.id), Some(admin.id));
        let stamp = approved.testimonial.approved_at.unwrap();

        // Approving again keeps the first stamp
        let again = service.approve(created.id, admin.id).await.unwrap();
        assert_eq!(again.testimonial.approved_at, Some(stamp));

        let rejected = service.reject(created.id, admin.id).await.unwrap();
        assert!(!rejected.testimonial.is_approved);
        assert!(rejected.testimonial.approved_at.is_none());
        assert!(rejected.testimonial.approved_by.is_none());
        assert!(rejected.approver.is_none());
    }

    #[tokio::test]
    async fn test_update_through_is_approved() {
        let (service, admin, _) = setup().await;
        let created = service.create(submission("Kofi", None)).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdateTestimonialRequest {
                    is_approved: Some(true),
                    company: Some(None),
                    rating: Some(4),
                    ..Default::default()
                },
                admin.id,
            )
            .await
            .unwrap();
        assert!(updated.testimonial.is_approved);
        assert_eq!(updated.testimonial.approved_by, Some(admin.id));
        assert_eq!(updated.testimonial.company, None);
        assert_eq!(updated.testimonial.rating, Some(4));
    }

    #[tokio::test]
    async fn test_toggle_featured_leaves_approval_alone() {
        let (service, _, _) = setup().await;
        let created = service.create(submission("Kofi", None)).await.unwrap();

        let toggled = service.toggle_featured(created.id).await.unwrap();
        assert!(toggled.testimonial.featured);
        assert!(!toggled.testimonial.is_approved);

        let toggled = service.toggle_featured(created.id).await.unwrap();
        assert!(!toggled.testimonial.featured);
    }

    #[tokio::test]
    async fn test_public_views_only_show_approved() {
        let (service, admin, _) = setup().await;
        let pending = service.create(submission("Pending", None)).await.unwrap();
        let plain = service.create(submission("Plain", None)).await.unwrap();
        let starred = service.create(submission("Starred", None)).await.unwrap();
        service.approve(plain.id, admin.id).await.unwrap();
        service.approve(starred.id, admin.id).await.unwrap();
        service.toggle_featured(starred.id).await.unwrap();

        let public = service.list_approved(ApprovedTestimonialQuery::default()).await.unwrap();
        assert_eq!(public.pagination.total, 2);
        assert_eq!(public.items[0].testimonial.name, "Starred");

        let featured_only = service
            .list_approved(ApprovedTestimonialQuery {
                featured: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(featured_only.items.len(), 1);

        assert!(matches!(service.get_by_id(pending.id, false).await, Err(AppError::NotFound(_))));
        assert!(service.get_by_id(pending.id, true).await.is_ok());
        assert!(service.get_by_id(plain.id, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_public_reads_leave_out_the_approver() {
        let (service, admin, _) = setup().await;
        let created = service.create(submission("Kofi", None)).await.unwrap();
        service.approve(created.id, admin.id).await.unwrap();

        let public = service.list_approved(ApprovedTestimonialQuery::default()).await.unwrap();
        assert!(public.items[0].approver.is_none());
        assert!(service.get_by_id(created.id, false).await.unwrap().approver.is_none());

        let for_admin = service.get_by_id(created.id, true).await.unwrap();
        assert_eq!(for_admin.approver.map(|a| a.email), Some(admin.email.clone()));
        let listed = service.list(TestimonialListQuery::default()).await.unwrap();
        assert!(listed.items[0].approver.is_some());

        let body = serde_json::to_value(&public.items[0]).unwrap();
        assert!(body.get("approver").is_none());
    }

    #[tokio::test]
    async fn test_admin_list_and_stats() {
        let (service, admin, _) = setup().await;
        let first = service.create(submission("Abena", None)).await.unwrap();
        service.create(submission("Kwame", None)).await.unwrap();
        let third = service.create(submission("Yaw", None)).await.unwrap();
        service.approve(first.id, admin.id).await.unwrap();
        service.toggle_featured(first.id).await.unwrap();
        // Featured but not approved: not counted as featured
        service.toggle_featured(third.id).await.unwrap();

        let pending = service
            .list(TestimonialListQuery {
                is_approved: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.pagination.total, 2);

        let search = service
            .list(TestimonialListQuery {
                search: Some("kWaMe".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.items.len(), 1);

        assert_eq!(
            service.stats().await.unwrap(),
            TestimonialStats {
                total: 3,
                approved: 1,
                pending: 2,
                featured: 1
            }
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, _, _) = setup().await;
        let created = service.create(submission("Kofi", None)).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(matches!(service.delete(created.id).await, Err(AppError::NotFound(_))));
    }
}

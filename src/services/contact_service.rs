use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::contact;
use crate::models::dto::{
    ContactListQuery, ContactStats, CreateContactRequest, Page, PageRequest, SubmitterInfo,
    UpdateContactRequest,
};
use crate::services::email_service::EmailService;
use crate::services::{begin_snapshot, lower_like, search_pattern};

const CONTACT_NOT_FOUND: &str = "Contact not found";

/// Visitor messages from the public contact form
#[derive(Clone)]
pub struct ContactService {
    db: DatabaseConnection,
    email: EmailService,
}

impl ContactService {
    pub fn new(db: DatabaseConnection, email: EmailService) -> Self {
        ContactService { db, email }
    }

    pub async fn create(&self, input: CreateContactRequest, submitter: SubmitterInfo) -> Result<contact::Model> {
        let now = Utc::now();
        let contact = contact::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_lowercase()),
            phone: Set(non_blank(input.phone)),
            subject: Set(non_blank(input.subject)),
            message: Set(input.message.trim().to_string()),
            ip_address: Set(submitter.ip_address),
            user_agent: Set(submitter.user_agent),
            is_read: Set(false),
            read_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(contact_id = %contact.id, "contact message received");

        // The row is committed; a failed notification only gets logged
        if let Err(e) = self.email.send_contact_notification(&contact).await {
            tracing::warn!(contact_id = %contact.id, error = %e, "failed to send contact notification");
        }

        Ok(contact)
    }

    pub async fn list(&self, query: ContactListQuery) -> Result<Page<contact::Model>> {
        let page = PageRequest::new(query.page, query.limit);

        let mut condition = Condition::all();
        if let Some(is_read) = query.is_read {
            condition = condition.add(contact::Column::IsRead.eq(is_read));
        }
        if let Some(pattern) = search_pattern(query.search.as_deref()) {
            condition = condition.add(
                Condition::any()
                    .add(lower_like(contact::Column::Name, &pattern))
                    .add(lower_like(contact::Column::Email, &pattern))
                    .add(lower_like(contact::Column::Subject, &pattern))
                    .add(lower_like(contact::Column::Message, &pattern)),
            );
        }

        let txn = begin_snapshot(&self.db).await?;
        let total = contact::Entity::find().filter(condition.clone()).count(&txn).await?;
        let items = contact::Entity::find()
            .filter(condition)
            .order_by_desc(contact::Column::CreatedAt)
            .order_by_desc(contact::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(Page {
            items,
            pagination: page.paginate(total),
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<contact::Model> {
        contact::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(CONTACT_NOT_FOUND.to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateContactRequest) -> Result<contact::Model> {
        let contact = self.get_by_id(id).await?;
        match input.is_read {
            Some(is_read) => self.set_read(contact, is_read).await,
            None => Ok(contact),
        }
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<contact::Model> {
        let contact = self.get_by_id(id).await?;
        self.set_read(contact, true).await
    }

    pub async fn mark_as_unread(&self, id: Uuid) -> Result<contact::Model> {
        let contact = self.get_by_id(id).await?;
        self.set_read(contact, false).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = contact::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(CONTACT_NOT_FOUND.to_string()));
        }
        tracing::info!(contact_id = %id, "contact deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<ContactStats> {
        let total = contact::Entity::find().count(&self.db).await?;
        let unread = contact::Entity::find()
            .filter(contact::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;

        Ok(ContactStats {
            total,
            read: total - unread,
            unread,
        })
    }

    /// is_read and read_at move together; an already read message keeps its first read_at
    async fn set_read(&self, contact: contact::Model, is_read: bool) -> Result<contact::Model> {
        if contact.is_read == is_read {
            return Ok(contact);
        }

        let now = Utc::now();
        let mut active = contact.into_active_model();
        active.is_read = Set(is_read);
        active.read_at = Set(is_read.then_some(now));
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

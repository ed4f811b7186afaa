//! Contact form submissions and newsletter subscriptions.

use std::sync::Arc;

use chrono::Utc;
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::status::{ContactStatus, SubscriptionStatus};
use storefront_core::validation::{
    email_local_part, normalize_email, optional_text, require_name, require_text,
};
use storefront_db::models::contact::{ContactSubmission, NewContactSubmission};
use storefront_db::models::dashboard::InboxCounts;
use storefront_db::models::newsletter::{NewSubscription, NewsletterSubscription};
use storefront_db::store::InboxStore;

use crate::slugs::synthetic;

#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct Inbox {
    store: Arc<dyn InboxStore>,
}

fn contact_not_found(slug: &str) -> CoreError {
    CoreError::SlugNotFound {
        entity: "ContactSubmission",
        slug: slug.to_string(),
    }
}

/// Unique index on subscriber emails.
const EMAIL_CONSTRAINT: &str = "uq_newsletter_subscriptions_email";

fn already_subscribed() -> CoreError {
    CoreError::Validation("Email is already subscribed".into())
}

fn subscription_not_found(key: &str) -> CoreError {
    CoreError::SlugNotFound {
        entity: "NewsletterSubscription",
        slug: key.to_string(),
    }
}

impl Inbox {
    pub fn new(store: Arc<dyn InboxStore>) -> Self {
        Self { store }
    }

    // --- Contact ---

    pub async fn submit_contact(&self, input: ContactInput) -> CoreResult<ContactSubmission> {
        let name = require_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        let message = require_text("Message", &input.message)?;

        let new = NewContactSubmission {
            slug: synthetic(&name),
            name,
            email,
            phone: optional_text(input.phone.as_deref()),
            company: optional_text(input.company.as_deref()),
            subject: optional_text(input.subject.as_deref()),
            message,
        };
        let contact = self.store.insert_contact(&new).await?;
        tracing::info!(id = contact.id, slug = %contact.slug, "Contact submission received");
        Ok(contact)
    }

    pub async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> CoreResult<Vec<ContactSubmission>> {
        self.store.list_contacts(status).await
    }

    pub async fn get_contact(&self, slug: &str) -> CoreResult<ContactSubmission> {
        self.store
            .find_contact_by_slug(slug)
            .await?
            .ok_or_else(|| contact_not_found(slug))
    }

    pub async fn set_contact_status(
        &self,
        slug: &str,
        status: ContactStatus,
    ) -> CoreResult<ContactSubmission> {
        let contact = self.get_contact(slug).await?;
        self.store
            .set_contact_status(contact.id, status)
            .await?
            .ok_or_else(|| contact_not_found(slug))
    }

    pub async fn delete_contact(&self, slug: &str) -> CoreResult<()> {
        let contact = self.get_contact(slug).await?;
        if !self.store.delete_contact(contact.id).await? {
            return Err(contact_not_found(slug));
        }
        tracing::info!(id = contact.id, "Contact submission deleted");
        Ok(())
    }

    // --- Newsletter ---

    /// Subscribe `email`. A new address is stored active; an inactive one is
    /// reactivated; an active one is rejected.
    pub async fn subscribe(&self, email: &str) -> CoreResult<NewsletterSubscription> {
        let email = normalize_email(email)?;

        match self.store.find_subscription_by_email(&email).await? {
            Some(existing) if existing.status == SubscriptionStatus::Active => {
                Err(already_subscribed())
            }
            Some(mut existing) => {
                existing.status = SubscriptionStatus::Active;
                existing.subscribed_at = Utc::now();
                existing.unsubscribed_at = None;
                let saved = self
                    .store
                    .save_subscription(&existing)
                    .await?
                    .ok_or_else(|| subscription_not_found(&existing.slug))?;
                tracing::info!(id = saved.id, "Newsletter subscription reactivated");
                Ok(saved)
            }
            None => {
                let new = NewSubscription {
                    slug: synthetic(email_local_part(&email)),
                    email,
                };
                // A concurrent subscribe may insert the same email first.
                let created = self
                    .store
                    .insert_subscription(&new)
                    .await
                    .map_err(|e| match e {
                        CoreError::Conflict(msg) if msg.contains(EMAIL_CONSTRAINT) => {
                            already_subscribed()
                        }
                        other => other,
                    })?;
                tracing::info!(id = created.id, "Newsletter subscription created");
                Ok(created)
            }
        }
    }

    pub async fn unsubscribe(&self, email: &str) -> CoreResult<NewsletterSubscription> {
        let email = normalize_email(email)?;
        let sub = self
            .store
            .find_subscription_by_email(&email)
            .await?
            .ok_or_else(|| subscription_not_found(&email))?;
        self.deactivate(sub).await
    }

    pub async fn unsubscribe_by_slug(&self, slug: &str) -> CoreResult<NewsletterSubscription> {
        let sub = self.subscription(slug).await?;
        self.deactivate(sub).await
    }

    pub async fn list_subscriptions(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> CoreResult<Vec<NewsletterSubscription>> {
        self.store.list_subscriptions(status).await
    }

    /// Admin status change; follows the same lifecycle timestamps as
    /// subscribe / unsubscribe.
    pub async fn set_subscription_status(
        &self,
        slug: &str,
        status: SubscriptionStatus,
    ) -> CoreResult<NewsletterSubscription> {
        let mut sub = self.subscription(slug).await?;
        if sub.status == status {
            return Ok(sub);
        }
        match status {
            SubscriptionStatus::Inactive => self.deactivate(sub).await,
            SubscriptionStatus::Active => {
                sub.status = SubscriptionStatus::Active;
                sub.subscribed_at = Utc::now();
                sub.unsubscribed_at = None;
                self.store
                    .save_subscription(&sub)
                    .await?
                    .ok_or_else(|| subscription_not_found(slug))
            }
        }
    }

    pub async fn delete_subscription(&self, slug: &str) -> CoreResult<()> {
        let sub = self.subscription(slug).await?;
        if !self.store.delete_subscription(sub.id).await? {
            return Err(subscription_not_found(slug));
        }
        tracing::info!(id = sub.id, "Newsletter subscription deleted");
        Ok(())
    }

    pub async fn counts(&self) -> CoreResult<InboxCounts> {
        self.store.inbox_counts().await
    }

    async fn subscription(&self, slug: &str) -> CoreResult<NewsletterSubscription> {
        self.store
            .find_subscription_by_slug(slug)
            .await?
            .ok_or_else(|| subscription_not_found(slug))
    }

    /// Mark inactive. Already inactive records are returned unchanged.
    async fn deactivate(
        &self,
        mut sub: NewsletterSubscription,
    ) -> CoreResult<NewsletterSubscription> {
        if sub.status == SubscriptionStatus::Inactive {
            return Ok(sub);
        }
        sub.status = SubscriptionStatus::Inactive;
        sub.unsubscribed_at = Some(Utc::now());
        let saved = self
            .store
            .save_subscription(&sub)
            .await?
            .ok_or_else(|| subscription_not_found(&sub.slug))?;
        tracing::info!(id = saved.id, "Newsletter subscription deactivated");
        Ok(saved)
    }
}

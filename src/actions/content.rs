//! Content mutations and the contact form

use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::ActionResult;
use crate::auth::{CurrentUser, DemoGate, DEMO_READ_ONLY_MESSAGE};
use crate::cache::{list_path, Revalidator, DASHBOARD_PATH};
use crate::content::ContentRepository;
use crate::db::StoreError;
use crate::models::{
    AnnouncementPatch, ContentKind, EventPatch, NewAnnouncement, NewContactSubmission, NewEvent,
    NewResource, ResourcePatch, ValidationError,
};

const CONTACT_FALLBACK: &str = "Failed to submit contact form";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Create touches only the overview; the list page is left to expire
    fn stale_paths(&self, kind: ContentKind) -> Vec<&'static str> {
        match self {
            Self::Create => vec![DASHBOARD_PATH],
            Self::Update | Self::Delete => vec![DASHBOARD_PATH, list_path(kind)],
        }
    }
}

/// Failure inside an action body
#[derive(Debug, thiserror::Error)]
enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ActionError {
    fn message(&self) -> Option<String> {
        match self {
            Self::Validation(e) => Some(e.to_string()),
            Self::Store(e) => e.message(),
        }
    }
}

fn fallback_message(mutation: Mutation, kind: ContentKind) -> String {
    format!("Failed to {} {}", mutation.verb(), kind.entity_name())
}

pub struct ContentActions {
    repo: ContentRepository,
    /// Service-role handle, used only for public contact submissions
    admin_repo: ContentRepository,
    demo: DemoGate,
    revalidator: Arc<dyn Revalidator>,
}

impl ContentActions {
    pub fn new(
        repo: ContentRepository,
        admin_repo: ContentRepository,
        demo: DemoGate,
        revalidator: Arc<dyn Revalidator>,
    ) -> Self {
        Self {
            repo,
            admin_repo,
            demo,
            revalidator,
        }
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.repo
    }

    pub fn demo_gate(&self) -> &DemoGate {
        &self.demo
    }

    /// Gate, run `body`, normalize, invalidate.
    ///
    /// `body` is not polled for demo callers, so it never reaches the store.
    async fn perform<T, F>(
        &self,
        user: &CurrentUser,
        kind: ContentKind,
        mutation: Mutation,
        body: F,
    ) -> ActionResult
    where
        F: Future<Output = Result<T, ActionError>>,
    {
        let action = format!("{}_{}", mutation.verb(), kind.entity_name());

        if self.demo.is_demo(user) {
            warn!(action = %action, "Denied mutation from demo account");
            return ActionResult::failure(DEMO_READ_ONLY_MESSAGE);
        }

        match body.await {
            Ok(_) => {
                for path in mutation.stale_paths(kind) {
                    self.revalidator.revalidate_path(path);
                }
                info!(action = %action, "Action succeeded");
                ActionResult::Success
            }
            Err(err) => {
                let message = err
                    .message()
                    .unwrap_or_else(|| fallback_message(mutation, kind));
                warn!(action = %action, error = %message, "Action failed");
                ActionResult::failure(message)
            }
        }
    }

    // =========================================================================
    // Resources
    // =========================================================================

    pub async fn create_resource(&self, user: &CurrentUser, input: NewResource) -> ActionResult {
        self.perform(user, ContentKind::Resources, Mutation::Create, async move {
            let input = input.normalized();
            input.validate()?;
            let created = self.repo.create_resource(&input).await?;
            info!(id = %created.id, "Created resource");
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn update_resource(
        &self,
        user: &CurrentUser,
        id: &str,
        patch: ResourcePatch,
    ) -> ActionResult {
        self.perform(user, ContentKind::Resources, Mutation::Update, async move {
            let patch = patch.normalized();
            patch.validate()?;
            self.repo.update_resource(id, &patch).await?;
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn delete_resource(&self, user: &CurrentUser, id: &str) -> ActionResult {
        self.perform(user, ContentKind::Resources, Mutation::Delete, async move {
            Ok::<_, ActionError>(self.repo.delete_resource(id).await?)
        })
        .await
    }

    // =========================================================================
    // Announcements
    // =========================================================================

    pub async fn create_announcement(
        &self,
        user: &CurrentUser,
        input: NewAnnouncement,
    ) -> ActionResult {
        self.perform(user, ContentKind::Announcements, Mutation::Create, async move {
            let input = input.normalized();
            input.validate()?;
            let created = self.repo.create_announcement(&input).await?;
            info!(id = %created.id, "Created announcement");
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn update_announcement(
        &self,
        user: &CurrentUser,
        id: &str,
        patch: AnnouncementPatch,
    ) -> ActionResult {
        self.perform(user, ContentKind::Announcements, Mutation::Update, async move {
            let patch = patch.normalized();
            patch.validate()?;
            self.repo.update_announcement(id, &patch).await?;
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn delete_announcement(&self, user: &CurrentUser, id: &str) -> ActionResult {
        self.perform(user, ContentKind::Announcements, Mutation::Delete, async move {
            Ok::<_, ActionError>(self.repo.delete_announcement(id).await?)
        })
        .await
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub async fn create_event(&self, user: &CurrentUser, input: NewEvent) -> ActionResult {
        self.perform(user, ContentKind::Events, Mutation::Create, async move {
            let input = input.normalized();
            input.validate()?;
            let created = self.repo.create_event(&input).await?;
            info!(id = %created.id, "Created event");
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn update_event(
        &self,
        user: &CurrentUser,
        id: &str,
        patch: EventPatch,
    ) -> ActionResult {
        self.perform(user, ContentKind::Events, Mutation::Update, async move {
            let patch = patch.normalized();
            patch.validate()?;
            self.repo.update_event(id, &patch).await?;
            Ok::<_, ActionError>(())
        })
        .await
    }

    pub async fn delete_event(&self, user: &CurrentUser, id: &str) -> ActionResult {
        self.perform(user, ContentKind::Events, Mutation::Delete, async move {
            Ok::<_, ActionError>(self.repo.delete_event(id).await?)
        })
        .await
    }

    // =========================================================================
    // Contact form
    // =========================================================================

    /// Open to anyone, demo accounts included. Writes through the
    /// service-role handle and invalidates nothing.
    pub async fn submit_contact_form(&self, input: NewContactSubmission) -> ActionResult {
        let input = input.normalized();
        let result: Result<(), ActionError> = async {
            input.validate()?;
            self.admin_repo.create_contact_submission(&input).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Contact form submitted");
                ActionResult::Success
            }
            Err(err) => {
                let message = err.message().unwrap_or_else(|| CONTACT_FALLBACK.to_string());
                warn!(error = %message, "Contact form submission failed");
                ActionResult::failure(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            fallback_message(Mutation::Create, ContentKind::Resources),
            "Failed to create resource"
        );
        assert_eq!(
            fallback_message(Mutation::Update, ContentKind::Announcements),
            "Failed to update announcement"
        );
        assert_eq!(
            fallback_message(Mutation::Delete, ContentKind::Events),
            "Failed to delete event"
        );
    }

    #[test]
    fn test_stale_paths_asymmetry() {
        assert_eq!(
            Mutation::Create.stale_paths(ContentKind::Events),
            vec!["/dashboard"]
        );
        assert_eq!(
            Mutation::Delete.stale_paths(ContentKind::Resources),
            vec!["/dashboard", "/dashboard/resources"]
        );
    }
}

//! Action layer integration tests: demo gate, error normalization,
//! invalidation, payload normalization

mod common;

use bson::Bson;
use common::{demo, staff, Harness};
use commonground::actions::ActionResult;
use commonground::db::{StoreError, Table};
use commonground::models::{
    AnnouncementPatch, EventPatch, NewAnnouncement, NewContactSubmission, NewEvent, NewResource,
    ResourceCategory, ResourcePatch, Timestamp,
};

const DEMO_DENIED: &str = "Demo accounts are read-only.";

fn denied() -> ActionResult {
    ActionResult::failure(DEMO_DENIED)
}

#[tokio::test]
async fn test_demo_account_denied_for_all_mutations_without_store_calls() {
    let h = Harness::new();
    let user = demo();
    let start = Timestamp::now();

    let results = vec![
        h.actions
            .create_resource(&user, NewResource::new("Pantry", ResourceCategory::Food))
            .await,
        h.actions
            .update_resource(&user, "r1", ResourcePatch::default())
            .await,
        h.actions.delete_resource(&user, "r1").await,
        h.actions
            .create_announcement(&user, NewAnnouncement::new("Title", "Body"))
            .await,
        h.actions
            .update_announcement(&user, "a1", AnnouncementPatch::default())
            .await,
        h.actions.delete_announcement(&user, "a1").await,
        h.actions
            .create_event(&user, NewEvent::new("Fair", start))
            .await,
        h.actions
            .update_event(&user, "e1", EventPatch::default())
            .await,
        h.actions.delete_event(&user, "e1").await,
    ];

    assert_eq!(results.len(), 9);
    for result in results {
        assert_eq!(result, denied());
    }
    assert_eq!(h.store.calls(), 0);
    assert_eq!(h.admin_store.calls(), 0);
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_demo_denial_precedes_validation() {
    let h = Harness::new();
    // Invalid payload, but the gate answers first
    let result = h
        .actions
        .create_resource(&demo(), NewResource::new("", ResourceCategory::Food))
        .await;
    assert_eq!(result, denied());
}

#[tokio::test]
async fn test_no_demo_config_allows_everyone() {
    let h = Harness::with_demo(None);
    let result = h
        .actions
        .create_resource(&demo(), NewResource::new("Pantry", ResourceCategory::Food))
        .await;
    assert_eq!(result, ActionResult::Success);
    assert_eq!(h.store.calls(), 1);
}

#[tokio::test]
async fn test_store_message_passed_through() {
    let h = Harness::new();
    h.store.fail_with(StoreError::Backend(
        "duplicate key value violates unique constraint".into(),
    ));

    let result = h
        .actions
        .create_resource(&staff(), NewResource::new("Pantry", ResourceCategory::Food))
        .await;
    assert_eq!(
        result,
        ActionResult::failure("duplicate key value violates unique constraint")
    );
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_messageless_failure_uses_fallback() {
    let h = Harness::new();
    h.store.fail_with(StoreError::Opaque);
    let user = staff();
    let start = Timestamp::now();

    let cases = vec![
        (
            h.actions
                .create_resource(&user, NewResource::new("Pantry", ResourceCategory::Food))
                .await,
            "Failed to create resource",
        ),
        (
            h.actions
                .update_resource(&user, "r1", ResourcePatch::default())
                .await,
            "Failed to update resource",
        ),
        (
            h.actions.delete_resource(&user, "r1").await,
            "Failed to delete resource",
        ),
        (
            h.actions
                .create_announcement(&user, NewAnnouncement::new("T", "C"))
                .await,
            "Failed to create announcement",
        ),
        (
            h.actions
                .update_announcement(&user, "a1", AnnouncementPatch::default())
                .await,
            "Failed to update announcement",
        ),
        (
            h.actions.delete_announcement(&user, "a1").await,
            "Failed to delete announcement",
        ),
        (
            h.actions.create_event(&user, NewEvent::new("Fair", start)).await,
            "Failed to create event",
        ),
        (
            h.actions
                .update_event(&user, "e1", EventPatch::default())
                .await,
            "Failed to update event",
        ),
        (
            h.actions.delete_event(&user, "e1").await,
            "Failed to delete event",
        ),
    ];

    for (result, expected) in cases {
        assert_eq!(result, ActionResult::failure(expected));
    }
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_create_invalidates_overview_only() {
    let h = Harness::new();
    let user = staff();

    let result = h
        .actions
        .create_event(&user, NewEvent::new("Job fair", Timestamp::now()))
        .await;
    assert!(result.is_success());
    assert_eq!(h.revalidator.paths(), vec!["/dashboard"]);
}

#[tokio::test]
async fn test_update_and_delete_invalidate_overview_and_list() {
    let h = Harness::new();
    let user = staff();

    let created = h
        .repo
        .create_announcement(&NewAnnouncement::new("Closed Monday", "Holiday hours"))
        .await
        .unwrap();

    let patch = AnnouncementPatch {
        title: Some("Closed Tuesday".into()),
        ..Default::default()
    };
    assert!(h
        .actions
        .update_announcement(&user, &created.id, patch)
        .await
        .is_success());
    assert_eq!(
        h.revalidator.paths(),
        vec!["/dashboard", "/dashboard/announcements"]
    );

    h.revalidator.clear();
    assert!(h
        .actions
        .delete_announcement(&user, &created.id)
        .await
        .is_success());
    assert_eq!(
        h.revalidator.paths(),
        vec!["/dashboard", "/dashboard/announcements"]
    );
}

#[tokio::test]
async fn test_update_missing_row_reports_not_found() {
    let h = Harness::new();
    let result = h.actions.delete_resource(&staff(), "missing-id").await;
    assert_eq!(
        result,
        ActionResult::failure("No row in resources with id missing-id")
    );
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_update_resource_blank_phone_reaches_store_as_null() {
    let h = Harness::new();
    let created = h
        .repo
        .create_resource(&NewResource {
            phone: Some("555-0100".into()),
            ..NewResource::new("Pantry", ResourceCategory::Food)
        })
        .await
        .unwrap();

    let patch = ResourcePatch {
        phone: Some(Some(String::new())),
        ..Default::default()
    };
    let result = h.actions.update_resource(&staff(), &created.id, patch).await;
    assert!(result.is_success());

    let sent = h.store.last_update().unwrap();
    assert_eq!(sent.get("phone"), Some(&Bson::Null));
    // Untouched columns are not part of the patch
    assert!(sent.get("name").is_none());

    let stored = h.repo.get_resource_by_id(&created.id).await.unwrap();
    assert_eq!(stored.phone, None);
    assert_eq!(stored.name, "Pantry");
}

#[tokio::test]
async fn test_create_resource_blank_optionals_stored_as_null() {
    let h = Harness::new();
    let input = NewResource {
        website: Some(String::new()),
        address: Some("   ".into()),
        ..NewResource::new("City Food Bank", ResourceCategory::Food)
    };
    assert!(h.actions.create_resource(&staff(), input).await.is_success());

    let sent = h.store.last_insert().unwrap();
    for column in ["description", "website", "phone", "email", "address"] {
        assert_eq!(sent.get(column), Some(&Bson::Null), "{column}");
    }
}

#[tokio::test]
async fn test_non_blank_values_stored_as_submitted() {
    let h = Harness::new();
    let input = NewResource {
        phone: Some(" 555-0100 ".into()),
        address: Some("   ".into()),
        ..NewResource::new("  City Food Bank ", ResourceCategory::Food)
    };
    assert!(h.actions.create_resource(&staff(), input).await.is_success());

    let sent = h.store.last_insert().unwrap();
    assert_eq!(sent.get_str("name").ok(), Some("  City Food Bank "));
    assert_eq!(sent.get_str("phone").ok(), Some(" 555-0100 "));
    assert_eq!(sent.get("address"), Some(&Bson::Null));

    let created = h.repo.get_all_resources().await.unwrap();
    let patch = ResourcePatch {
        name: Some(" Renamed ".into()),
        ..Default::default()
    };
    assert!(h
        .actions
        .update_resource(&staff(), &created[0].id, patch)
        .await
        .is_success());
    assert_eq!(
        h.store.last_update().unwrap().get_str("name").ok(),
        Some(" Renamed ")
    );
}

#[tokio::test]
async fn test_validation_failure_skips_store() {
    let h = Harness::new();
    let start = Timestamp::now();
    let input = NewEvent {
        end_date: Some(start.offset_seconds(-3600)),
        ..NewEvent::new("Backwards", start)
    };

    let result = h.actions.create_event(&staff(), input).await;
    assert_eq!(
        result,
        ActionResult::failure("End date must be on or after the start date")
    );

    let result = h
        .actions
        .create_announcement(&staff(), NewAnnouncement::new("  ", "Body"))
        .await;
    assert_eq!(result, ActionResult::failure("Title is required"));
    assert_eq!(h.store.calls(), 0);
}

#[tokio::test]
async fn test_contact_form_bypasses_demo_gate_and_uses_admin_store() {
    let h = Harness::new();
    let input = NewContactSubmission {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        phone: Some(String::new()),
        organization: Some("Riverside Pantry".into()),
        message: "Do you help with rent?".into(),
    };

    let result = h.actions.submit_contact_form(input).await;
    assert_eq!(result, ActionResult::Success);
    assert_eq!(h.store.calls(), 0);
    assert_eq!(h.admin_store.calls(), 1);
    assert_eq!(h.admin_store.inner().len(Table::ContactSubmissions), 1);
    let sent = h.admin_store.last_insert().unwrap();
    assert_eq!(sent.get("phone"), Some(&Bson::Null));
    assert_eq!(sent.get_str("organization").ok(), Some("Riverside Pantry"));
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_contact_form_fallback_message() {
    let h = Harness::new();
    h.admin_store.fail_with(StoreError::Opaque);
    let input = NewContactSubmission {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        phone: None,
        organization: None,
        message: "Hello".into(),
    };
    assert_eq!(
        h.actions.submit_contact_form(input).await,
        ActionResult::failure("Failed to submit contact form")
    );
}

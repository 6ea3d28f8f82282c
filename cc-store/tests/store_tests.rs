//! Store client tests against an in-process fake backend

mod helpers;

use std::time::Duration;

use cc_common::models::{Category, Color, ItemUpdate, NewClothingItem, NewOutfit};
use cc_store::{Filter, ImageUpload, PocketBase, RecordAction, StoreError};
use futures::StreamExt;
use helpers::{spawn_backend, EMAIL, OTHER_USER_ID, PASSWORD, USER_ID};

async fn signed_in() -> (PocketBase, helpers::FakeBackend) {
    let (url, backend) = spawn_backend().await;
    let pb = PocketBase::new(url).unwrap();
    pb.auth_with_password(EMAIL, PASSWORD).await.unwrap();
    (pb, backend)
}

fn shirt_form() -> NewClothingItem {
    NewClothingItem {
        name: "  Linen Shirt ".into(),
        category: Some(Category::Tops),
        color: Some(Color::White),
        brand: "Uniqlo".into(),
        purchase_price: "29.90".into(),
        tags: "summer, casual,,".into(),
        ..NewClothingItem::default()
    }
}

#[tokio::test]
async fn test_sign_in_and_refresh() {
    let (url, _backend) = spawn_backend().await;
    let pb = PocketBase::new(url).unwrap();
    assert!(!pb.is_authenticated());

    let user = pb.auth_with_password(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(user.id, USER_ID);
    assert!(pb.is_authenticated());
    assert_eq!(pb.current_user().unwrap().email, EMAIL);

    let refreshed = pb.auth_refresh().await.unwrap();
    assert_eq!(refreshed.id, USER_ID);
    assert!(pb.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_leaves_signed_out() {
    let (url, _backend) = spawn_backend().await;
    let pb = PocketBase::new(url).unwrap();

    let err = pb.auth_with_password(EMAIL, "nope").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(!pb.is_authenticated());
}

#[tokio::test]
async fn test_register_and_password_reset() {
    let (url, backend) = spawn_backend().await;
    let pb = PocketBase::new(url).unwrap();

    let user = pb.register("New", "new@example.com", "password1", "password1").await.unwrap();
    assert_eq!(user.email, "new@example.com");
    assert!(!pb.is_authenticated());

    let mismatch = pb
        .register("New", "new@example.com", "password1", "password2")
        .await
        .unwrap_err();
    assert_eq!(mismatch.field_error_code("passwordConfirm"), Some("validation_values_mismatch"));

    pb.request_password_reset(EMAIL).await.unwrap();
    assert_eq!(backend.reset_requests(), vec![EMAIL.to_string()]);
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let (pb, backend) = signed_in().await;
    let before = backend.request_count();

    let blank_name = NewClothingItem {
        name: "   ".into(),
        ..NewClothingItem::default()
    };
    let err = pb.clothing_items().create(&blank_name, None).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(err.item_create_message(), "Item name is required");

    let no_color = NewClothingItem {
        name: "Scarf".into(),
        color: None,
        ..NewClothingItem::default()
    };
    let err = pb.clothing_items().create(&no_color, None).await.unwrap_err();
    assert_eq!(err.item_create_message(), "Please select a color");

    assert_eq!(backend.request_count(), before);
    assert_eq!(backend.item_count(), 0);
}

#[tokio::test]
async fn test_oversize_image_rejected_before_upload() {
    let (pb, backend) = signed_in().await;
    let before = backend.request_count();

    let image = ImageUpload {
        file_name: "huge.jpg".into(),
        mime_type: "image/jpeg".into(),
        bytes: vec![0u8; 6 * 1024 * 1024],
    };
    let err = pb.clothing_items().create(&shirt_form(), Some(&image)).await.unwrap_err();
    assert_eq!(err.item_create_message(), "Image size must be less than 5MB");

    let text = ImageUpload {
        file_name: "notes.txt".into(),
        mime_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    let err = pb.clothing_items().create(&shirt_form(), Some(&text)).await.unwrap_err();
    assert_eq!(err.item_create_message(), "Please select a valid image file");

    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_create_adds_one_owned_item() {
    let (pb, backend) = signed_in().await;

    let image = ImageUpload {
        file_name: "shirt.png".into(),
        mime_type: "image/png".into(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    };
    let item = pb.clothing_items().create(&shirt_form(), Some(&image)).await.unwrap();

    assert_eq!(item.name, "Linen Shirt");
    assert_eq!(item.user, USER_ID);
    assert_eq!(item.wear_count, 0);
    assert_eq!(item.purchase_price, Some(29.9));
    assert_eq!(item.tags, vec!["summer".to_string(), "casual".to_string()]);
    assert_eq!(item.image.as_deref(), Some("shirt.png"));

    let owned = backend.items_owned_by(USER_ID);
    assert_eq!(owned.len(), 1);
    assert_eq!(backend.item_count(), 1);

    let url = pb.clothing_items().image_url(&item, Some("300x300"));
    assert!(url.ends_with(&format!("/api/files/clothing_items/{}/shirt.png?thumb=300x300", item.id)));
}

#[tokio::test]
async fn test_create_requires_sign_in() {
    let (url, backend) = spawn_backend().await;
    let pb = PocketBase::new(url).unwrap();

    let err = pb.clothing_items().create(&shirt_form(), None).await.unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_lists_only_own_items() {
    let (pb, backend) = signed_in().await;
    backend.seed_item(USER_ID, "Jeans", 4);
    backend.seed_item(OTHER_USER_ID, "Not mine", 9);
    backend.seed_item(USER_ID, "Coat", 0);

    let all = pb.clothing_items().get_all_user_items().await.unwrap();
    let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Coat", "Jeans"]);

    let page = pb.clothing_items().get_user_items(1, 1, None, None).await.unwrap();
    assert_eq!(page.total_items, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);

    let filtered = pb
        .clothing_items()
        .get_user_items(1, 20, Some(&Filter::eq("category", "Tops")), Some("created"))
        .await
        .unwrap();
    assert_eq!(filtered.items[0].name, "Jeans");
}

#[tokio::test]
async fn test_wear_increment_and_update() {
    let (pb, backend) = signed_in().await;
    let id = backend.seed_item(USER_ID, "Jeans", 4);

    let now = chrono::Utc::now();
    let worn = pb.clothing_items().increment_wear_count(&id, now).await.unwrap();
    assert_eq!(worn.wear_count, 5);
    let last_worn = worn.last_worn.unwrap();
    assert!((last_worn - now).num_milliseconds().abs() < 1000);

    let renamed = pb
        .clothing_items()
        .update(
            &id,
            &ItemUpdate {
                name: Some("Blue Jeans".into()),
                ..ItemUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Blue Jeans");
    assert_eq!(renamed.wear_count, 5);
}

#[tokio::test]
async fn test_delete_and_missing_item() {
    let (pb, backend) = signed_in().await;
    let id = backend.seed_item(USER_ID, "Old Tee", 0);

    pb.clothing_items().delete(&id).await.unwrap();
    assert_eq!(backend.item_count(), 0);

    let err = pb.clothing_items().get_one(&id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(pb.clothing_items().delete(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (pb, backend) = signed_in().await;
    backend.seed_item(USER_ID, "Jeans", 4);
    backend.seed_item(USER_ID, "Coat", 11);
    backend.seed_item(OTHER_USER_ID, "Not mine", 50);

    let stats = pb.clothing_items().dashboard_stats(chrono::Utc::now()).await.unwrap();
    assert_eq!(stats.total_items, 2);
    // Seeded items were created in 2024 and never worn
    assert_eq!(stats.needs_attention, 2);
    assert_eq!(stats.recently_added, 0);
    assert_eq!(stats.most_worn.unwrap().name, "Coat");
}

#[tokio::test]
async fn test_outfits_are_owned_and_expanded() {
    let (pb, backend) = signed_in().await;
    let jeans = backend.seed_item(USER_ID, "Jeans", 1);
    let coat = backend.seed_item(USER_ID, "Coat", 2);

    let outfit = pb
        .outfits()
        .create(&NewOutfit {
            name: "Weekend".into(),
            occasion: "casual".into(),
            clothing_items: vec![jeans.clone(), coat.clone()],
            ..NewOutfit::default()
        })
        .await
        .unwrap();
    assert_eq!(outfit.user, USER_ID);

    let page = pb.outfits().get_user_outfits(1, 10, None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    let expanded = page.items[0].expand.as_ref().unwrap();
    let names: Vec<&str> = expanded.clothing_items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Jeans", "Coat"]);
}

#[tokio::test]
async fn test_realtime_delivers_own_changes() {
    let (pb, backend) = signed_in().await;
    let other = backend.seed_item(OTHER_USER_ID, "Not mine", 0);
    let mine = backend.seed_item(USER_ID, "Jeans", 0);

    let mut events = pb.clothing_items().subscribe().await.unwrap();

    // Another owner's change first; it must be skipped
    let writer = PocketBase::new(pb.base_url()).unwrap();
    writer.set_auth(pb.auth_state());
    writer.clothing_items().increment_wear_count(&other, chrono::Utc::now()).await.unwrap();
    writer.clothing_items().increment_wear_count(&mine, chrono::Utc::now()).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .expect("realtime event")
        .unwrap()
        .unwrap();
    assert_eq!(event.action, RecordAction::Update);
    assert_eq!(event.record.id, mine);
    assert_eq!(event.record.wear_count, 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (pb, _backend) = signed_in().await;
    pb.logout();
    assert!(!pb.is_authenticated());
    assert!(matches!(pb.auth_refresh().await, Err(StoreError::NotAuthenticated)));
}

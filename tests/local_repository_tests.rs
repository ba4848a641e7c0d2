//! Tests for the in-memory repository.
//!
//! These cover the data-access rules every backend must share: public
//! visibility filtering, soft-delete semantics, favorite validation, and
//! image ordering.

use bigdecimal::BigDecimal;
use chrono::Utc;
use housing_rust::db::repositories::LocalRepository;
use housing_rust::db::repository::{
    FavoriteRepository, ImageRepository, ListingRepository, RepositoryError, UniversityRepository,
    UserRepository,
};
use housing_rust::models::{ListingUpdate, NewListing, NewUniversity, User};

fn new_listing(title: &str, lat: Option<f64>, lng: Option<f64>) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "test".to_string(),
        location: "Davis".to_string(),
        address: Some("1 Main St".to_string()),
        city: "Davis".to_string(),
        state: "CA".to_string(),
        zip_code: Some("95616".to_string()),
        latitude: lat,
        longitude: lng,
        monthly_rent: BigDecimal::from(1500),
        bedrooms: "2".to_string(),
        bathrooms: "1".to_string(),
        square_feet: Some(800),
        room_type: "apartment".to_string(),
        amenities: "WiFi,Pool".to_string(),
        image_url: String::new(),
        available_from: None,
        owner_id: 1,
    }
}

#[tokio::test]
async fn active_list_excludes_inactive_and_ungeocoded() {
    let repo = LocalRepository::new();
    let visible = repo
        .create_listing(new_listing("visible", Some(38.5), Some(-121.7)))
        .await
        .unwrap();
    let no_coords = repo
        .create_listing(new_listing("no coords", None, Some(-121.7)))
        .await
        .unwrap();
    let deleted = repo
        .create_listing(new_listing("deleted", Some(38.5), Some(-121.7)))
        .await
        .unwrap();
    repo.soft_delete_listing(deleted.id).await.unwrap();

    let listed = repo.list_active_listings().await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![visible.id]);
    assert!(!ids.contains(&no_coords.id));
    assert!(listed
        .iter()
        .all(|l| l.is_active && l.latitude.is_some() && l.longitude.is_some()));
}

#[tokio::test]
async fn active_list_is_newest_first() {
    let repo = LocalRepository::new();
    let first = repo
        .create_listing(new_listing("first", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    let second = repo
        .create_listing(new_listing("second", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    let listed = repo.list_active_listings().await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn soft_delete_is_idempotent() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("unit", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    repo.soft_delete_listing(listing.id).await.unwrap();
    repo.soft_delete_listing(listing.id).await.unwrap();

    let row = repo.get_listing(listing.id).await.unwrap();
    assert!(!row.is_active);
    // Row survives the delete; only the public list hides it.
    assert!(repo.listing_exists(listing.id).await.unwrap());
}

#[tokio::test]
async fn soft_delete_of_unknown_listing_is_not_found() {
    let repo = LocalRepository::new();
    let err = repo.soft_delete_listing(999).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn owner_list_includes_inactive() {
    let repo = LocalRepository::new();
    let kept = repo
        .create_listing(new_listing("kept", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    let removed = repo
        .create_listing(new_listing("removed", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    repo.soft_delete_listing(removed.id).await.unwrap();

    let mine = repo.list_listings_by_owner(1).await.unwrap();
    let ids: Vec<i64> = mine.iter().map(|l| l.id).collect();
    assert!(ids.contains(&kept.id));
    assert!(ids.contains(&removed.id));
    assert!(repo.list_listings_by_owner(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_touches_only_supplied_fields() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("before", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    let updated = repo
        .update_listing(
            listing.id,
            ListingUpdate {
                title: Some("after".to_string()),
                square_feet: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "after");
    assert_eq!(updated.square_feet, None);
    assert_eq!(updated.city, "Davis");
    assert_eq!(updated.monthly_rent, BigDecimal::from(1500));
}

#[tokio::test]
async fn favorite_requires_existing_listing() {
    let repo = LocalRepository::new();
    let err = repo.create_favorite(1, 12345).await.unwrap_err();
    match err {
        RepositoryError::ValidationError { message, .. } => {
            assert_eq!(message, "Listing does not exist");
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_favorite_is_rejected() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("fav", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    repo.create_favorite(7, listing.id).await.unwrap();
    let err = repo.create_favorite(7, listing.id).await.unwrap_err();
    match err {
        RepositoryError::ValidationError { message, .. } => {
            assert_eq!(message, "Already in favorites");
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }

    // A different user may still favorite the same listing.
    repo.create_favorite(8, listing.id).await.unwrap();
    assert!(repo.favorite_exists(7, listing.id).await.unwrap());
    assert!(!repo.favorite_exists(9, listing.id).await.unwrap());
}

#[tokio::test]
async fn favorite_delete_round_trip() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("fav", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    let favorite = repo.create_favorite(3, listing.id).await.unwrap();

    repo.delete_favorite(favorite.id).await.unwrap();
    assert!(!repo.favorite_exists(3, listing.id).await.unwrap());
    let err = repo.delete_favorite(favorite.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn image_order_counts_up_from_zero() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("photos", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    for expected in 0..3 {
        let image = repo
            .create_image(listing.id, format!("https://img/{expected}.jpg"), None)
            .await
            .unwrap();
        assert_eq!(image.sort_order, expected);
    }

    let images = repo.list_images(listing.id).await.unwrap();
    let orders: Vec<i32> = images.iter().map(|i| i.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn image_order_is_not_renumbered_on_delete() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(new_listing("photos", Some(1.0), Some(1.0)))
        .await
        .unwrap();

    let first = repo
        .create_image(listing.id, "https://img/0.jpg".to_string(), None)
        .await
        .unwrap();
    repo.create_image(listing.id, "https://img/1.jpg".to_string(), None)
        .await
        .unwrap();
    repo.delete_image(first.id).await.unwrap();

    let images = repo.list_images(listing.id).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].sort_order, 1);

    // The next insert takes the current count, landing back on the gap.
    let next = repo
        .create_image(listing.id, "https://img/2.jpg".to_string(), None)
        .await
        .unwrap();
    assert_eq!(next.sort_order, 1);
}

#[tokio::test]
async fn batch_image_fetch_groups_by_listing() {
    let repo = LocalRepository::new();
    let a = repo
        .create_listing(new_listing("a", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    let b = repo
        .create_listing(new_listing("b", Some(1.0), Some(1.0)))
        .await
        .unwrap();
    repo.create_image(a.id, "https://img/a0.jpg".to_string(), None)
        .await
        .unwrap();
    repo.create_image(b.id, "https://img/b0.jpg".to_string(), Some("kitchen".to_string()))
        .await
        .unwrap();
    repo.create_image(b.id, "https://img/b1.jpg".to_string(), None)
        .await
        .unwrap();

    let grouped = repo
        .list_images_for_listings(&[a.id, b.id, 999])
        .await
        .unwrap();
    assert_eq!(grouped[&a.id].len(), 1);
    assert_eq!(grouped[&b.id].len(), 2);
    assert!(!grouped.contains_key(&999));
}

#[tokio::test]
async fn university_names_are_unique() {
    let repo = LocalRepository::new();
    let created = repo
        .create_university(NewUniversity {
            name: "UC Davis".to_string(),
            full_name: "University of California, Davis".to_string(),
            latitude: 38.5382,
            longitude: -121.7617,
        })
        .await
        .unwrap();
    assert!(created.is_some());

    let duplicate = repo
        .create_university(NewUniversity {
            name: "UC Davis".to_string(),
            full_name: "Duplicate".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let listed = repo.list_universities().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].full_name, "University of California, Davis");
}

#[tokio::test]
async fn universities_list_in_name_order() {
    let repo = LocalRepository::new();
    for name in ["UCLA", "Caltech", "SDSU"] {
        repo.create_university(NewUniversity {
            name: name.to_string(),
            full_name: name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap();
    }
    let names: Vec<String> = repo
        .list_universities()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Caltech", "SDSU", "UCLA"]);
}

#[tokio::test]
async fn missing_users_are_absent_not_errors() {
    let repo = LocalRepository::new();
    repo.insert_user(User {
        id: 1,
        username: "ndyponc".to_string(),
        email: "n@example.com".to_string(),
        join_date: Utc::now(),
        is_active: true,
    });

    assert!(repo.get_user(2).await.unwrap().is_none());
    let found = repo.get_users_by_ids(&[1, 2, 3]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[&1].username, "ndyponc");
}

//! Integration tests for catalog writes against the in-memory store and
//! asset backend.

use std::sync::Arc;

use assert_matches::assert_matches;
use storefront_assets::{MemoryAssetStore, Upload};
use storefront_catalog::{
    CatalogGraph, CategoryInput, CategoryPatch, ImageAttachment, ProductInput, ProductPatch,
    ProductQuery, SubcategoryInput, SubcategoryPatch,
};
use storefront_core::error::CoreError;
use storefront_core::reference::Reference;
use storefront_db::store::{CatalogStore, MemoryStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    graph: CatalogGraph,
    store: Arc<MemoryStore>,
    assets: Arc<MemoryAssetStore>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let assets = Arc::new(MemoryAssetStore::new());
    let images = ImageAttachment::new(assets.clone(), 1024 * 1024);
    Harness {
        graph: CatalogGraph::new(store.clone(), images),
        store,
        assets,
    }
}

fn jpg(name: &str) -> Upload {
    Upload::new(name, Some("image/jpeg".into()), vec![0xFF, 0xD8, 0xFF])
}

fn category(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.into(),
        ..Default::default()
    }
}

fn product(name: &str, category_id: i64, subcategory_id: Option<i64>) -> ProductInput {
    ProductInput {
        name: name.into(),
        price: 499.99,
        category_id,
        subcategory_id,
        main_image: Some(jpg("main.jpg")),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_delete_lifecycle() {
    let h = harness();

    // Create the hierarchy.
    let cameras = h.graph.create_category(category("Cameras")).await.unwrap();
    assert_eq!(cameras.slug, "cameras");

    let ptz = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ Cameras".into(),
            category_id: cameras.id,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ptz.slug, "ptz-cameras");

    let pro = h
        .graph
        .create_product(product("PTZ Pro", cameras.id, Some(ptz.id)))
        .await
        .unwrap();
    assert!(pro.in_stock);
    assert!(!pro.main_image.is_empty());
    assert_eq!(pro.slug, "ptz-pro");

    // Parent with dependents cannot go.
    assert_matches!(
        h.graph.delete_category(cameras.id).await,
        Err(CoreError::Conflict(_))
    );
    assert_eq!(h.graph.counts().await.unwrap().categories, 1);

    // Children first, then parents.
    h.graph.delete_product(pro.id).await.unwrap();
    h.graph.delete_subcategory(ptz.id).await.unwrap();
    h.graph.delete_category(cameras.id).await.unwrap();

    let counts = h.graph.counts().await.unwrap();
    assert_eq!((counts.categories, counts.subcategories, counts.products), (0, 0, 0));
    assert_eq!(h.assets.deletes(), vec![pro.main_image_public_id.unwrap()]);
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_category_name_or_slug_is_rejected() {
    let h = harness();
    h.graph.create_category(category("Cameras")).await.unwrap();

    assert_matches!(
        h.graph.create_category(category("Cameras")).await,
        Err(CoreError::Validation(_))
    );
    assert_matches!(
        h.graph
            .create_category(CategoryInput {
                name: "Other".into(),
                slug: Some("CAMERAS".into()),
                ..Default::default()
            })
            .await,
        Err(CoreError::Validation(_))
    );
    assert_eq!(h.graph.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let h = harness();
    assert_matches!(
        h.graph.create_category(category("   ")).await,
        Err(CoreError::Validation(_))
    );
    assert!(h.assets.uploads().is_empty());
}

#[tokio::test]
async fn category_slug_collision_on_update_is_conflict() {
    let h = harness();
    h.graph.create_category(category("Cameras")).await.unwrap();
    let audio = h.graph.create_category(category("Audio")).await.unwrap();

    let err = h
        .graph
        .update_category(
            audio.id,
            CategoryPatch {
                slug: Some("cameras".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[tokio::test]
async fn category_image_keep_replace_clear() {
    let h = harness();
    let cat = h
        .graph
        .create_category(CategoryInput {
            name: "Cameras".into(),
            image: Some(jpg("cover.jpg")),
            ..Default::default()
        })
        .await
        .unwrap();
    let first = cat.image_public_id.clone().unwrap();

    // Keep.
    let kept = h
        .graph
        .update_category(
            cat.id,
            CategoryPatch {
                description: Some("All cameras".into()),
                keep_current_image: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.image_public_id.as_deref(), Some(first.as_str()));
    assert_eq!(kept.description.as_deref(), Some("All cameras"));
    assert!(h.assets.deletes().is_empty());

    // Replace.
    let replaced = h
        .graph
        .update_category(
            cat.id,
            CategoryPatch {
                image: Some(jpg("new.jpg")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let second = replaced.image_public_id.clone().unwrap();
    assert_ne!(second, first);
    assert_eq!(h.assets.deletes(), vec![first.clone()]);

    // Clear.
    let cleared = h
        .graph
        .update_category(cat.id, CategoryPatch::default())
        .await
        .unwrap();
    assert!(cleared.image.is_none() && cleared.image_public_id.is_none());
    assert_eq!(h.assets.deletes(), vec![first, second]);
}

#[tokio::test]
async fn deleting_category_survives_asset_cleanup_failure() {
    let h = harness();
    let cat = h
        .graph
        .create_category(CategoryInput {
            name: "Cameras".into(),
            image: Some(jpg("cover.jpg")),
            ..Default::default()
        })
        .await
        .unwrap();
    h.assets.fail_deletes();

    h.graph.delete_category(cat.id).await.unwrap();
    assert!(h.store.find_category(cat.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subcategory_requires_existing_category() {
    let h = harness();
    let err = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: 999,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Category", id: 999 });
    assert_eq!(h.graph.counts().await.unwrap().subcategories, 0);
}

#[tokio::test]
async fn subcategory_with_products_cannot_be_deleted() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cat.id,
            ..Default::default()
        })
        .await
        .unwrap();
    h.graph
        .create_product(product("PTZ Pro", cat.id, Some(sub.id)))
        .await
        .unwrap();

    assert_matches!(
        h.graph.delete_subcategory(sub.id).await,
        Err(CoreError::Conflict(_))
    );
}

#[tokio::test]
async fn deleting_empty_subcategory_releases_image_once() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cat.id,
            image: Some(jpg("ptz.jpg")),
            ..Default::default()
        })
        .await
        .unwrap();

    h.graph.delete_subcategory(sub.id).await.unwrap();
    assert!(h.store.find_subcategory(sub.id).await.unwrap().is_none());
    assert_eq!(h.assets.deletes(), vec![sub.image_public_id.unwrap()]);
}

#[tokio::test]
async fn reparenting_subcategory_keeps_products_consistent() {
    let h = harness();
    let cameras = h.graph.create_category(category("Cameras")).await.unwrap();
    let video = h.graph.create_category(category("Video")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cameras.id,
            ..Default::default()
        })
        .await
        .unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cameras.id, Some(sub.id)))
        .await
        .unwrap();

    let moved = h
        .graph
        .update_subcategory(
            sub.id,
            SubcategoryPatch {
                category_id: Some(video.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category_id, video.id);
    assert_eq!(h.graph.get_product(pro.id).await.unwrap().category_id, video.id);

    // The old parent is now free to go.
    h.graph.delete_category(cameras.id).await.unwrap();
}

#[tokio::test]
async fn reparenting_to_missing_category_is_not_found() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cat.id,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_matches!(
        h.graph
            .update_subcategory(
                sub.id,
                SubcategoryPatch {
                    category_id: Some(404),
                    ..Default::default()
                },
            )
            .await,
        Err(CoreError::NotFound { entity: "Category", .. })
    );
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_without_main_image_is_rejected() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let mut input = product("PTZ Pro", cat.id, None);
    input.main_image = None;

    assert_matches!(
        h.graph.create_product(input).await,
        Err(CoreError::Validation(_))
    );
    assert_eq!(h.graph.counts().await.unwrap().products, 0);
}

#[tokio::test]
async fn product_with_invalid_price_is_rejected() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let mut input = product("PTZ Pro", cat.id, None);
    input.price = 0.0;
    assert_matches!(
        h.graph.create_product(input).await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn product_subcategory_must_belong_to_category() {
    let h = harness();
    let cameras = h.graph.create_category(category("Cameras")).await.unwrap();
    let audio = h.graph.create_category(category("Audio")).await.unwrap();
    let mics = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "Microphones".into(),
            category_id: audio.id,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_matches!(
        h.graph
            .create_product(product("PTZ Pro", cameras.id, Some(mics.id)))
            .await,
        Err(CoreError::Validation(_))
    );
    assert!(h.assets.uploads().is_empty());
}

#[tokio::test]
async fn failed_gallery_upload_aborts_create_and_cleans_up() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    h.assets.fail_uploads_named("broken.jpg");

    let mut input = product("PTZ Pro", cat.id, None);
    input.images = vec![jpg("one.jpg"), jpg("broken.jpg")];

    assert_matches!(
        h.graph.create_product(input).await,
        Err(CoreError::ExternalService(_))
    );
    assert_eq!(h.graph.counts().await.unwrap().products, 0);
    assert!(h.assets.live().is_empty());
}

#[tokio::test]
async fn keeping_main_image_does_not_release() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, None))
        .await
        .unwrap();

    let updated = h
        .graph
        .update_product(
            pro.id,
            ProductPatch {
                price: Some(450.0),
                keep_current_main_image: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.main_image, pro.main_image);
    assert_eq!(updated.price, 450.0);
    assert!(h.assets.deletes().is_empty());
}

#[tokio::test]
async fn replacing_main_image_releases_previous_handle() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, None))
        .await
        .unwrap();

    let updated = h
        .graph
        .update_product(
            pro.id,
            ProductPatch {
                main_image: Some(jpg("v2.jpg")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_ne!(updated.main_image_public_id, pro.main_image_public_id);
    assert_eq!(h.assets.deletes(), vec![pro.main_image_public_id.unwrap()]);
}

#[tokio::test]
async fn dropping_main_image_is_rejected() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, None))
        .await
        .unwrap();

    assert_matches!(
        h.graph.update_product(pro.id, ProductPatch::default()).await,
        Err(CoreError::Validation(_))
    );
    assert_eq!(
        h.graph.get_product(pro.id).await.unwrap().main_image,
        pro.main_image
    );
}

#[tokio::test]
async fn gallery_append_and_remove_by_index() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let mut input = product("PTZ Pro", cat.id, None);
    input.images = vec![jpg("a.jpg"), jpg("b.jpg"), jpg("c.jpg")];
    let pro = h.graph.create_product(input).await.unwrap();
    assert_eq!(pro.images.len(), 3);

    let updated = h
        .graph
        .update_product(
            pro.id,
            ProductPatch {
                keep_current_main_image: true,
                remove_image_indices: vec![1],
                images: vec![jpg("d.jpg")],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.images.len(), 3);
    assert_eq!(updated.images.len(), updated.image_public_ids.len());
    assert_eq!(updated.images[0], pro.images[0]);
    assert_eq!(updated.images[1], pro.images[2]);
    assert_eq!(
        h.assets.deletes(),
        vec![pro.image_public_ids[1].clone()]
    );
}

#[tokio::test]
async fn out_of_range_gallery_index_is_rejected() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, None))
        .await
        .unwrap();

    assert_matches!(
        h.graph
            .update_product(
                pro.id,
                ProductPatch {
                    keep_current_main_image: true,
                    remove_image_indices: vec![0],
                    ..Default::default()
                },
            )
            .await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn clearing_subcategory_detaches_product() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cat.id,
            ..Default::default()
        })
        .await
        .unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, Some(sub.id)))
        .await
        .unwrap();

    let updated = h
        .graph
        .update_product(
            pro.id,
            ProductPatch {
                keep_current_main_image: true,
                subcategory_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.subcategory_id, None);
    h.graph.delete_subcategory(sub.id).await.unwrap();
}

#[tokio::test]
async fn deleting_product_releases_every_asset() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let mut input = product("PTZ Pro", cat.id, None);
    input.images = vec![jpg("a.jpg"), jpg("b.jpg")];
    let pro = h.graph.create_product(input).await.unwrap();

    h.graph.delete_product(pro.id).await.unwrap();
    assert_eq!(h.assets.deletes().len(), 3);
    assert!(h.assets.live().is_empty());

    assert_matches!(
        h.graph.delete_product(pro.id).await,
        Err(CoreError::NotFound { entity: "Product", .. })
    );
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_detail_populates_parents_and_related() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let sub = h
        .graph
        .create_subcategory(SubcategoryInput {
            name: "PTZ".into(),
            category_id: cat.id,
            ..Default::default()
        })
        .await
        .unwrap();
    let pro = h
        .graph
        .create_product(product("PTZ Pro", cat.id, Some(sub.id)))
        .await
        .unwrap();
    h.graph
        .create_product(product("PTZ Mini", cat.id, Some(sub.id)))
        .await
        .unwrap();

    let detail = h.graph.product_detail(&pro.slug).await.unwrap();
    assert_eq!(detail.category.display_name(), "Cameras");
    assert_matches!(detail.subcategory, Some(Reference::Populated(ref s)) if s.id == sub.id);
    assert_eq!(detail.related.len(), 1);
    assert_eq!(detail.related[0].name, "PTZ Mini");

    assert_matches!(
        h.graph.product_detail("missing").await,
        Err(CoreError::SlugNotFound { entity: "Product", .. })
    );
}

#[tokio::test]
async fn search_by_category_slug() {
    let h = harness();
    let cameras = h.graph.create_category(category("Cameras")).await.unwrap();
    let audio = h.graph.create_category(category("Audio")).await.unwrap();
    h.graph
        .create_product(product("PTZ Pro", cameras.id, None))
        .await
        .unwrap();
    h.graph
        .create_product(product("Mic", audio.id, None))
        .await
        .unwrap();

    let found = h
        .graph
        .search_products(&ProductQuery {
            category: Some("audio".into()),
            limit: Some(10_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Mic");

    let detail = h.graph.category_detail("cameras").await.unwrap();
    assert_eq!(detail.products.len(), 1);
}

#[tokio::test]
async fn long_product_names_keep_distinct_slugs() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();
    let prefix = "Ultra HD Pan Tilt Zoom Outdoor Camera With Thirty Times Optical ".repeat(2);

    let black = h
        .graph
        .create_product(product(&format!("{prefix}Zoom Black"), cat.id, None))
        .await
        .unwrap();
    let white = h
        .graph
        .create_product(product(&format!("{prefix}Zoom White"), cat.id, None))
        .await
        .unwrap();

    assert!(black.slug.ends_with("-zoom-black"));
    assert!(white.slug.ends_with("-zoom-white"));
    assert_eq!(h.store.catalog_counts().await.unwrap().products, 2);
}

#[tokio::test]
async fn product_writes_run_on_spawned_tasks() {
    let h = harness();
    let cat = h.graph.create_category(category("Cameras")).await.unwrap();

    let graph = h.graph.clone();
    let created = tokio::spawn(async move {
        let input = ProductInput {
            images: vec![jpg("a.jpg"), jpg("b.jpg")],
            ..product("PTZ Pro", cat.id, None)
        };
        graph.create_product(input).await
    })
    .await
    .unwrap()
    .unwrap();

    let graph = h.graph.clone();
    let updated = tokio::spawn(async move {
        let patch = ProductPatch {
            keep_current_main_image: true,
            remove_image_indices: vec![0],
            images: vec![jpg("c.jpg")],
            ..Default::default()
        };
        graph.update_product(created.id, patch).await
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.images.len(), 2);
    assert_eq!(h.assets.deletes().len(), 1);
}

use std::sync::Arc;

use serde_json::{Value, json};
use stockroom_core::{backend::StoreBackendBuilder, query::Filter, store::DocumentStore};
use stockroom_memory::InMemoryStore;
use stockroom_models::{
    Inventory, MAX_RESULTS, ModelError, Repository,
    entities::{Product, Provider, SellStatus},
};

async fn inventory() -> Inventory<InMemoryStore> {
    Inventory::open(InMemoryStore::new()).await.unwrap()
}

fn provider(name: &str) -> Value {
    json!({
        "name": name,
        "email": "sales@acme.test",
        "phone": "555-0100",
        "address": "1 Main St",
    })
}

fn product(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Stoneware mug",
        "sku": "MUG-001",
        "barcode": "7501234567890",
        "price": 12.5,
        "stock": 40,
        "images": ["https://cdn.shop.test/mug.png"],
        "provider_id": "provider-1",
        "variants": [{ "name": "Red", "sku": "MUG-RED", "price": 13.0, "stock": 10 }],
    })
}

fn sell(code: &str, product_ids: &[&str]) -> Value {
    let products: Vec<Value> = product_ids
        .iter()
        .map(|id| json!({ "product_id": id, "name": "Mug", "quantity": 1, "price": 12.5 }))
        .collect();

    json!({
        "code": code,
        "seller_id": "seller-1",
        "date": "2024-05-02",
        "status": "completed",
        "total": 12.5,
        "products": products,
    })
}

#[tokio::test]
async fn create_then_lookup_by_unique_key_round_trips() {
    let inventory = inventory().await;
    let id = inventory.providers().create(&provider("Acme")).await.unwrap();

    let found = inventory
        .providers()
        .get_by_field("name", &json!("Acme"), "string")
        .await
        .unwrap();

    assert_eq!(
        found,
        vec![Provider {
            id,
            name: "Acme".to_string(),
            email: "sales@acme.test".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        }]
    );
}

#[tokio::test]
async fn product_round_trips_embedded_variants() {
    let inventory = inventory().await;
    let id = inventory.products().create(&product("Mug")).await.unwrap();

    let stored: Product = inventory.products().get(id).await.unwrap();
    assert_eq!(stored.variants.len(), 1);
    assert_eq!(stored.variants[0].sku, "MUG-RED");
    assert_eq!(stored.stock, 40.0);
    assert_eq!(stored.images, vec!["https://cdn.shop.test/mug.png"]);
}

#[tokio::test]
async fn missing_required_field_is_named() {
    let inventory = inventory().await;

    for missing in ["name", "email", "phone", "address"] {
        let mut payload = provider("Acme");
        payload.as_object_mut().unwrap().remove(missing);

        match inventory.providers().create(&payload).await {
            Err(ModelError::Validation(err)) => {
                assert_eq!(err.field, missing);
                assert_eq!(err.reason, "is required");
            }
            other => panic!("expected a validation error for {missing}, got {other:?}"),
        }
    }

    assert!(inventory.providers().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn first_failing_rule_is_reported() {
    let inventory = inventory().await;
    let mut payload = product("Mug");
    payload["images"] = json!(["https://cdn.shop.test/a.png", "https://cdn.shop.test/b.txt"]);

    let err = inventory.products().create(&payload).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(ref e) if e.field == "images[1]"));
}

#[tokio::test]
async fn duplicate_unique_key_is_rejected() {
    let inventory = inventory().await;
    inventory.providers().create(&provider("Acme")).await.unwrap();

    let err = inventory.providers().create(&provider("Acme")).await.unwrap_err();

    assert!(matches!(err, ModelError::Duplicate { field: "name", ref value, .. } if value == "Acme"));
    assert_eq!(err.to_string(), "Provider already exists");
    assert_eq!(inventory.providers().get_all().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_admit_one_record_per_key() {
    let inventory = Arc::new(inventory().await);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let inventory = Arc::clone(&inventory);
            tokio::spawn(async move { inventory.providers().create(&provider("Acme")).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, ModelError::Duplicate { .. })),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(inventory.providers().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_all_is_capped() {
    let inventory = inventory().await;

    for i in 0..MAX_RESULTS + 20 {
        inventory.providers().create(&provider(&format!("provider-{i}"))).await.unwrap();
    }

    let all = inventory.providers().get_all().await.unwrap();
    assert_eq!(all.len(), MAX_RESULTS);
    assert_eq!(all[0].name, "provider-0");
    assert_eq!(all[MAX_RESULTS - 1].name, format!("provider-{}", MAX_RESULTS - 1));
}

#[tokio::test]
async fn get_by_field_validates_type_and_value() {
    let inventory = inventory().await;
    inventory.products().create(&product("Mug")).await.unwrap();

    let err = inventory
        .products()
        .get_by_field("stock", &json!(true), "boolean")
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedType { ref field, .. } if field == "stock"));

    let err = inventory
        .products()
        .get_by_field("name", &json!("ab"), "string")
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let by_stock = inventory
        .products()
        .get_by_field("stock", &json!(40), "number")
        .await
        .unwrap();
    assert_eq!(by_stock.len(), 1);

    let none = inventory
        .products()
        .get_by_field("stock", &json!(41), "number")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn negative_stock_is_accepted() {
    // Known gap in the number rule: only zero is rejected.
    let inventory = inventory().await;
    let mut payload = product("Mug");
    payload["stock"] = json!(-5);

    let id = inventory.products().create(&payload).await.unwrap();
    assert_eq!(inventory.products().get(id).await.unwrap().stock, -5.0);
}

#[tokio::test]
async fn edit_replaces_every_field() {
    let inventory = inventory().await;
    let id = inventory.providers().create(&provider("Acme")).await.unwrap();

    let mut payload = provider("Acme Corp");
    payload["id"] = json!(id.to_string());
    payload["phone"] = json!("555-0199");
    inventory.providers().edit(&payload).await.unwrap();

    let stored = inventory.providers().get(id).await.unwrap();
    assert_eq!(stored.name, "Acme Corp");
    assert_eq!(stored.phone, "555-0199");
}

#[tokio::test]
async fn edit_is_a_full_replace() {
    let inventory = inventory().await;
    let id = inventory.providers().create(&provider("Acme")).await.unwrap();

    let payload = json!({ "id": id.to_string(), "name": "Acme Corp" });
    let err = inventory.providers().edit(&payload).await.unwrap_err();

    assert!(matches!(err, ModelError::Validation(ref e) if e.field == "email"));
    assert_eq!(inventory.providers().get(id).await.unwrap().name, "Acme");
}

#[tokio::test]
async fn edit_of_missing_record_fails_without_writing() {
    let inventory = inventory().await;
    inventory.providers().create(&provider("Acme")).await.unwrap();

    let mut payload = provider("Ghost");
    payload["id"] = json!(bson::Uuid::new().to_string());
    let err = inventory.providers().edit(&payload).await.unwrap_err();

    assert!(matches!(err, ModelError::NotFound { kind: "Provider", .. }));
    assert_eq!(err.to_string(), "Provider not found");

    let all = inventory.providers().get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Acme");
}

#[tokio::test]
async fn delete_removes_the_record() {
    let inventory = inventory().await;
    let id = inventory.providers().create(&provider("Acme")).await.unwrap();
    let payload = json!({ "id": id.to_string() });

    inventory.providers().delete(&payload).await.unwrap();

    assert!(matches!(
        inventory.providers().get(id).await,
        Err(ModelError::NotFound { .. })
    ));
    assert!(inventory
        .providers()
        .get_by_field("name", &json!("Acme"), "string")
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        inventory.providers().delete(&payload).await,
        Err(ModelError::NotFound { .. })
    ));

    // The key is free again once the record is gone.
    inventory.providers().create(&provider("Acme")).await.unwrap();
}

#[tokio::test]
async fn delete_validates_the_identifier() {
    let inventory = inventory().await;

    for payload in [json!({}), json!({ "id": "xyz-not-an-id" }), json!({ "id": 7 })] {
        let err = inventory.providers().delete(&payload).await.unwrap_err();
        assert!(matches!(err, ModelError::Validation(ref e) if e.field == "id"));
    }
}

#[tokio::test]
async fn sells_can_be_found_by_line_item_product() {
    let inventory = inventory().await;
    inventory.sells().create(&sell("S-001", &["prod-1", "prod-2"])).await.unwrap();
    inventory.sells().create(&sell("S-002", &["prod-2"])).await.unwrap();
    inventory.sells().create(&sell("S-003", &["prod-3"])).await.unwrap();

    let codes = |sells: Vec<stockroom_models::entities::Sell>| -> Vec<String> {
        sells.into_iter().map(|s| s.code).collect()
    };

    let with_two = inventory.sells().get_by_product(&json!("prod-2")).await.unwrap();
    assert_eq!(codes(with_two), ["S-001", "S-002"]);

    let with_one = inventory.sells().get_by_product(&json!("prod-1")).await.unwrap();
    assert_eq!(codes(with_one), ["S-001"]);

    let by_status = inventory
        .sells()
        .get_by_field("status", &json!("completed"), "string")
        .await
        .unwrap();
    assert_eq!(by_status.len(), 3);
    assert!(by_status.iter().all(|s| s.status == SellStatus::Completed));
}

#[tokio::test]
async fn variants_can_be_found_by_product() {
    let inventory = inventory().await;
    let variant = |name: &str, product_id: &str| {
        json!({
            "name": name,
            "product_id": product_id,
            "sku": "MUG-RED",
            "price": 13.0,
            "stock": 10,
            "image": "http://cdn.shop.test/red.webp",
        })
    };

    inventory.product_variants().create(&variant("Red", "prod-1")).await.unwrap();
    inventory.product_variants().create(&variant("Blue", "prod-1")).await.unwrap();
    inventory.product_variants().create(&variant("Green", "prod-2")).await.unwrap();

    let found = inventory.product_variants().get_by_product(&json!("prod-1")).await.unwrap();
    let names: Vec<&str> = found.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Red", "Blue"]);
}

#[tokio::test]
async fn seller_role_is_checked_on_edit() {
    let inventory = inventory().await;
    let mut payload = json!({
        "username": "jdoe",
        "name": "Jane Doe",
        "email": "jane@shop.test",
        "rol": "seller",
        "start_date": "2024-01-15",
    });
    let id = inventory.sellers().create(&payload).await.unwrap();

    payload["id"] = json!(id.to_string());
    payload["rol"] = json!("owner");
    let err = inventory.sellers().edit(&payload).await.unwrap_err();

    assert!(err.to_string().contains("owner"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn edit_cannot_take_another_records_key() {
    let inventory = inventory().await;
    inventory.providers().create(&provider("Acme")).await.unwrap();
    let other = inventory.providers().create(&provider("Other")).await.unwrap();

    let mut payload = provider("Acme");
    payload["id"] = json!(other.to_string());
    let err = inventory.providers().edit(&payload).await.unwrap_err();

    assert!(matches!(err, ModelError::Duplicate { field: "name", .. }));
    assert_eq!(inventory.providers().get(other).await.unwrap().name, "Other");

    let same_name = inventory
        .providers()
        .get_by_field("name", &json!("Acme"), "string")
        .await
        .unwrap();
    assert_eq!(same_name.len(), 1);

    // Keeping its own key is fine.
    let mut payload = provider("Other");
    payload["id"] = json!(other.to_string());
    payload["phone"] = json!("555-0199");
    inventory.providers().edit(&payload).await.unwrap();
    assert_eq!(inventory.providers().get(other).await.unwrap().phone, "555-0199");
}

#[tokio::test]
async fn delete_without_an_opened_inventory_is_not_found() {
    let store = DocumentStore::new(InMemoryStore::new());
    let providers = Repository::<_, Provider>::new(&store);

    let err = providers
        .delete(&json!({ "id": bson::Uuid::new().to_string() }))
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::NotFound { kind: "Provider", .. }));
}

#[tokio::test]
async fn find_by_id_returns_only_that_record() {
    let inventory = inventory().await;
    let acme = inventory.providers().create(&provider("Acme")).await.unwrap();
    inventory.providers().create(&provider("Other")).await.unwrap();

    let found = inventory.providers().find(Filter::eq("id", acme)).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Acme");
    assert_eq!(
        inventory.providers().find_one(Filter::ne("id", acme)).await.unwrap().unwrap().name,
        "Other"
    );
}

#[tokio::test]
async fn create_that_fails_to_persist_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("inventory.bson");
    let backend = InMemoryStore::builder()
        .with_snapshot_path(&path)
        .flush_on_write(true)
        .build()
        .await
        .unwrap();
    let store = DocumentStore::new(backend);
    let providers = Repository::<_, Provider>::new(&store);

    for _ in 0..2 {
        let err = providers.create(&provider("Acme")).await.unwrap_err();
        assert!(matches!(err, ModelError::Store(_)));
        assert!(!err.is_client_error());
    }

    assert!(providers.get_all().await.unwrap().is_empty());
}

use serde_json::json;
use stockroom::{memory::InMemoryStore, prelude::*};

#[tokio::test]
async fn a_sale_from_catalogue_to_lookup() {
    let inventory = Inventory::open(InMemoryStore::builder().build().await.unwrap())
        .await
        .unwrap();

    let provider_id = inventory
        .providers()
        .create(&json!({
            "name": "Acme",
            "email": "sales@acme.test",
            "phone": "555-0100",
            "address": "1 Main St",
        }))
        .await
        .unwrap();

    let product_id = inventory
        .products()
        .create(&json!({
            "name": "Mug",
            "description": "Stoneware mug",
            "sku": "MUG-001",
            "barcode": "7501234567890",
            "price": 12.5,
            "stock": 40,
            "images": [],
            "provider_id": provider_id.to_string(),
            "variants": [],
        }))
        .await
        .unwrap();

    let seller_id = inventory
        .sellers()
        .create(&json!({
            "username": "jdoe",
            "name": "Jane Doe",
            "email": "jane@shop.test",
            "rol": "seller",
            "start_date": "2024-01-15T09:00:00Z",
        }))
        .await
        .unwrap();

    inventory
        .sells()
        .create(&json!({
            "code": "S-0001",
            "seller_id": seller_id.to_string(),
            "date": "2024-05-02T15:30:00Z",
            "status": "pending",
            "total": 25.0,
            "products": [
                { "product_id": product_id.to_string(), "name": "Mug", "quantity": 2, "price": 12.5 },
            ],
        }))
        .await
        .unwrap();

    let sells = inventory
        .sells()
        .get_by_product(&json!(product_id.to_string()))
        .await
        .unwrap();
    assert_eq!(sells.len(), 1);
    assert_eq!(sells[0].status, SellStatus::Pending);
    assert_eq!(sells[0].seller_id, seller_id.to_string());

    let products: Vec<Product> = inventory
        .products()
        .get_by_field("provider_id", &json!(provider_id.to_string()), "string")
        .await
        .unwrap();
    assert_eq!(products[0].id, product_id);

    inventory.close().await.unwrap();
}

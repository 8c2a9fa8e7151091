//! Integration tests for listings, reviews, and checkout.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{Call, TestApp};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-pixels";

fn listing(title: &str, price: &str, country: &str) -> Vec<(&'static str, String)> {
    vec![
        ("title", title.to_string()),
        ("description", "Hand made".to_string()),
        ("price", price.to_string()),
        ("country", country.to_string()),
        ("stock", "3".to_string()),
        ("categories", "Home".to_string()),
    ]
}

async fn add_product(
    app: &TestApp,
    token: &str,
    fields: &[(&'static str, String)],
) -> helpers::TestResponse {
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    app.send(
        Call::new("POST", "/api/add-product")
            .token(token)
            .form(&fields, &[("lamp.png", "image/png", PNG)]),
    )
    .await
}

#[tokio::test]
async fn test_seller_lists_a_product() {
    let app = TestApp::new().await;
    let (seller_id, token) = app.sign_up("seller@x.com", "SELLER").await;

    let created = add_product(&app, &token, &listing("Brass lamp", "24.5", "Oman")).await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let product = created.data();
    assert_eq!(product["price"], "24.50");
    assert_eq!(product["priceCents"], 2450);
    assert_eq!(product["stock"], 3);
    assert_eq!(product["sellerId"], seller_id.to_string());
    let image = product["images"][0].as_str().unwrap();
    assert!(image.starts_with("/uploads/products/"), "{image}");
    assert!(image.ends_with(".png"));

    let id = product["id"].as_str().unwrap();
    let fetched = app.send(Call::new("GET", format!("/api/products/{id}")).token(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["title"], "Brass lamp");

    let mine = app.send(Call::new("GET", "/api/my-products").token(&token)).await;
    assert_eq!(mine.data()["totalItems"], 1);
}

#[tokio::test]
async fn test_listing_validation_reports_every_field() {
    let app = TestApp::new().await;
    let (_, token) = app.sign_up("seller@x.com", "SELLER").await;

    let fields = vec![("title", String::new()), ("price", "12.345".to_string())];
    let rejected = add_product(&app, &token, &fields).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    let details = &rejected.body["details"]["fields"];
    for field in ["title", "description", "price", "country"] {
        assert!(details[field].is_array(), "missing {field}: {details}");
    }
}

#[tokio::test]
async fn test_buyer_cannot_list_products() {
    let app = TestApp::new().await;
    let (_, token) = app.sign_up("buyer@x.com", "BUYER").await;

    let response = add_product(&app, &token, &listing("Rug", "10", "Iraq")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_catalog_filters_by_country() {
    let app = TestApp::new().await;
    let (_, seller) = app.sign_up("seller@x.com", "SELLER").await;
    let (_, buyer) = app.sign_up("buyer@x.com", "BUYER").await;
    add_product(&app, &seller, &listing("Lamp", "10", "Oman")).await;
    add_product(&app, &seller, &listing("Rug", "99.99", "Jordan")).await;

    let all = app.send(Call::new("GET", "/api/products").token(&buyer)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.data()["totalItems"], 2);

    let oman = app
        .send(Call::new("GET", "/api/products?country=Oman").token(&buyer))
        .await;
    assert_eq!(oman.data()["totalItems"], 1);
    assert_eq!(oman.data()["items"][0]["title"], "Lamp");
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let app = TestApp::new().await;
    let (_, seller) = app.sign_up("seller@x.com", "SELLER").await;
    add_product(&app, &seller, &listing("Lamp", "10", "Oman")).await;

    let response = app
        .send(Call::new("GET", format!("/api/products?page={}&perPage=100", u64::MAX)).token(&seller))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["items"], json!([]));
    assert_eq!(response.data()["totalItems"], 1);
    assert_eq!(response.data()["page"], 1_000_000);
}

#[tokio::test]
async fn test_only_owner_or_admin_deletes() {
    let app = TestApp::new().await;
    let (_, owner) = app.sign_up("owner@x.com", "SELLER").await;
    let (_, rival) = app.sign_up("rival@x.com", "SELLER").await;
    let (_, admin) = app.admin("root@x.com").await;

    let first = add_product(&app, &owner, &listing("Lamp", "10", "Oman")).await;
    let first = first.data()["id"].as_str().unwrap().to_string();
    let second = add_product(&app, &owner, &listing("Rug", "20", "Oman")).await;
    let second = second.data()["id"].as_str().unwrap().to_string();

    let by_rival = app
        .send(Call::new("DELETE", format!("/api/products/{first}")).token(&rival))
        .await;
    assert_eq!(by_rival.status, StatusCode::FORBIDDEN);

    let by_owner = app
        .send(Call::new("DELETE", format!("/api/products/{first}")).token(&owner))
        .await;
    assert_eq!(by_owner.status, StatusCode::OK);

    let by_admin = app
        .send(Call::new("DELETE", format!("/api/products/{second}")).token(&admin))
        .await;
    assert_eq!(by_admin.status, StatusCode::OK);

    let gone = app
        .send(Call::new("GET", format!("/api/products/{first}")).token(&owner))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_buyers_review_products() {
    let app = TestApp::new().await;
    let (_, seller) = app.sign_up("seller@x.com", "SELLER").await;
    let (buyer_id, buyer) = app.sign_up("buyer@x.com", "BUYER").await;
    let created = add_product(&app, &seller, &listing("Lamp", "10", "Oman")).await;
    let id = created.data()["id"].as_str().unwrap().to_string();

    let posted = app
        .send(
            Call::new("POST", format!("/api/products/{id}/reviews"))
                .token(&buyer)
                .json(json!({ "rating": 5, "comment": "Lovely" })),
        )
        .await;
    assert_eq!(posted.status, StatusCode::CREATED, "{:?}", posted.body);
    assert_eq!(posted.data()["userId"], buyer_id.to_string());

    let out_of_range = app
        .send(
            Call::new("POST", format!("/api/products/{id}/reviews"))
                .token(&buyer)
                .json(json!({ "rating": 9, "comment": "Too good" })),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let by_seller = app
        .send(
            Call::new("POST", format!("/api/products/{id}/reviews"))
                .token(&seller)
                .json(json!({ "rating": 5, "comment": "Mine is great" })),
        )
        .await;
    assert_eq!(by_seller.status, StatusCode::FORBIDDEN);

    let listed = app
        .send(Call::new("GET", format!("/api/products/{id}/reviews")).token(&buyer))
        .await;
    assert_eq!(listed.data()["totalItems"], 1);
    assert_eq!(listed.data()["items"][0]["comment"], "Lovely");
}

#[tokio::test]
async fn test_checkout_uses_catalog_prices() {
    let app = TestApp::new().await;
    let (_, seller) = app.sign_up("seller@x.com", "SELLER").await;
    let created = add_product(&app, &seller, &listing("Lamp", "24.50", "Oman")).await;
    let id = created.data()["id"].as_str().unwrap().to_string();

    let response = app
        .send(Call::new("POST", "/api/checkout").json(json!({
            "cart": [
                { "productId": id, "quantity": 2, "price": 1 },
            ],
        })))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["redirectUrl"], "https://pay.test/cs_test_42");
    assert_eq!(response.data()["sessionId"], "cs_test_42");

    let calls = app.gateway.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0].unit_amount, 2450);
    assert_eq!(calls[0][0].quantity, 2);
}

#[tokio::test]
async fn test_checkout_rejects_overselling() {
    let app = TestApp::new().await;
    let (_, seller) = app.sign_up("seller@x.com", "SELLER").await;
    let created = add_product(&app, &seller, &listing("Lamp", "5", "Oman")).await;
    let id = created.data()["id"].as_str().unwrap().to_string();

    let response = app
        .send(Call::new("POST", "/api/checkout").json(json!({
            "cart": [{ "productId": id, "quantity": 4 }],
        })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.gateway.calls.lock().await.is_empty());
}

use reqwest::StatusCode;
use serde_json::{json, Value};

use stockroom_api::app::{build_app, services::build_in_memory_services, AppServices};
use stockroom_core::PageLimits;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory backends, on an ephemeral port.
        let app = build_app(AppServices {
            services: build_in_memory_services(),
            page_limits: PageLimits::default(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.put(self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        read(req.send().await.unwrap()).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        read(self.client.get(self.url(path)).send().await.unwrap()).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        read(self.client.delete(self.url(path)).send().await.unwrap()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let text = res.text().await.unwrap();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, body)
}

fn product_body(name: &str, sku: &str, quantity: i64, threshold: i64) -> Value {
    json!({
        "name": name,
        "description": format!("{name} description"),
        "price": 899.99,
        "inventoryQuantity": quantity,
        "sku": sku,
        "lowStockThreshold": threshold,
    })
}

#[tokio::test]
async fn health_and_request_id() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let id = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn inventory_lifecycle_over_http() {
    let srv = TestServer::spawn().await;

    let (status, created) = srv
        .post("/api/products", product_body("Smartphone Pro", "PHONE-001", 50, 10))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["price"], json!(899.99));
    assert_eq!(created["lowStock"], json!(false));
    let id = created["id"].as_i64().unwrap();

    let (status, after) = srv
        .post(&format!("/api/products/{id}/inventory/decrease"), json!({"quantity": 45}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["inventoryQuantity"], json!(5));
    assert_eq!(after["lowStock"], json!(true));

    let (status, err) = srv
        .post(&format!("/api/products/{id}/inventory/decrease"), json!({"quantity": 10}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err["message"],
        json!("Cannot decrease inventory below zero. Current inventory: 5, Requested decrease: 10")
    );
    assert_eq!(err["path"], json!(format!("/api/products/{id}/inventory/decrease")));
    assert_eq!(err["error"], json!("Bad Request"));

    let (status, quantity) = srv.get(&format!("/api/products/{id}/inventory")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quantity, json!(5));

    let (status, set) = srv
        .put(&format!("/api/products/{id}/inventory"), Some(json!({"quantity": 100})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(set["lowStock"], json!(false));

    let (status, low) = srv.get("/api/products/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(low, json!([]));
}

#[tokio::test]
async fn validation_errors_list_every_field() {
    let srv = TestServer::spawn().await;
    let (status, err) = srv
        .post(
            "/api/products",
            json!({
                "name": " ",
                "description": "",
                "price": 0,
                "inventoryQuantity": -1,
                "sku": "X",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], json!("Validation failed"));
    let details = err["details"].as_object().unwrap();
    for field in ["name", "description", "price", "inventoryQuantity"] {
        assert!(details.contains_key(field), "missing {field}");
    }

    let (status, err) = srv
        .post("/api/products/1/inventory/increase", json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"]["quantity"], json!("Quantity is required"));
}

#[tokio::test]
async fn category_delete_guard_and_listing() {
    let srv = TestServer::spawn().await;
    let (status, cat) = srv
        .post("/api/categories", json!({"name": "Electronics", "description": "Gadgets"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let cat_id = cat["id"].as_i64().unwrap();

    let (_, p) = srv
        .post("/api/products", product_body("Laptop", "LAP-1", 5, 2))
        .await;
    let pid = p["id"].as_i64().unwrap();
    let (status, assigned) = srv
        .put(&format!("/api/products/{pid}/category?categoryId={cat_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["categoryName"], json!("Electronics"));

    let (status, err) = srv.delete(&format!("/api/categories/{cat_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        err["message"],
        json!("Cannot delete category with associated products. Remove products first or reassign them to another category.")
    );

    let (status, page) = srv.get(&format!("/api/categories/{cat_id}/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], json!(1));

    let (status, _) = srv.delete(&format!("/api/products/{pid}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = srv.delete(&format!("/api/categories/{cat_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, err) = srv.get(&format!("/api/categories/{cat_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], json!(format!("Category not found with id: {cat_id}")));
}

#[tokio::test]
async fn supplier_names_conflict_ignoring_case() {
    let srv = TestServer::spawn().await;
    let (status, acme) = srv
        .post("/api/suppliers", json!({"name": "Acme", "contactPerson": "Wile E."}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(acme["active"], json!(true));

    let (status, err) = srv
        .post("/api/suppliers", json!({"name": "ACME", "contactPerson": "Road Runner"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], json!("Supplier with name 'ACME' already exists"));

    let (status, exists) = srv.get("/api/suppliers/exists?name=acme").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exists, json!(true));

    let id = acme["id"].as_i64().unwrap();
    let (status, off) = srv.put(&format!("/api/suppliers/{id}/deactivate"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(off["active"], json!(false));

    let (_, dropdown) = srv.get("/api/suppliers/dropdown").await;
    assert_eq!(dropdown, json!([]));
}

#[tokio::test]
async fn supplier_search_and_paging() {
    let srv = TestServer::spawn().await;
    for (name, city) in [("Alpha Parts", "Oslo"), ("Beta Parts", "oslo"), ("Gamma", "Bergen")] {
        let (status, _) = srv
            .post(
                "/api/suppliers",
                json!({"name": name, "contactPerson": "Kari", "city": city}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = srv
        .get("/api/suppliers/search?name=parts&city=OSLO&sortDir=desc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], json!(2));
    assert_eq!(page["content"][0]["name"], json!("Beta Parts"));

    let (status, page) = srv.get("/api/suppliers?size=2&page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], json!(2));
    assert_eq!(page["content"].as_array().unwrap().len(), 1);

    let (status, err) = srv.get("/api/suppliers?sortBy=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn unknown_routes_and_bad_ids_render_error_bodies() {
    let srv = TestServer::spawn().await;
    let (status, err) = srv.get("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["path"], json!("/api/nothing-here"));

    let (status, err) = srv.get("/api/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["status"], json!(400));

    let (status, err) = srv.get("/api/products/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], json!("Product not found with id: 999"));
}

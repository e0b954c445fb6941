//! Shared test fixtures for the PIM SDK integration tests.
//!
//! Provides `MockTransport`, a scripted in-memory backend that records
//! every request, and small constructors for sample records.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pim_admin_sdk::models::{Category, ProductImage};
use pim_admin_sdk::transport::{Params, Transport};
use pim_admin_sdk::{PimError, PimSdk, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Ok(Value),
    Status(u16, Value),
}

/// Scripted transport. Unscripted routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method path` with `body` (replaces any earlier script).
    pub fn on(&self, method: Method, path: &str, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Ok(body));
    }

    /// Answer `method path` with an error status.
    pub fn fail(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Status(status, body));
    }

    /// Hold every response until [`release`](Self::release) is called.
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls_to(method, path).len()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.to_string(),
            params: params.to_vec(),
            body,
        });

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        let routes = self.routes.lock().unwrap();
        match routes.get(&(method, path.to_string())) {
            Some(Reply::Ok(body)) => Ok(body.clone()),
            Some(Reply::Status(status, body)) => Err(PimError::Api {
                status: *status,
                status_text: String::new(),
                body: Some(body.clone()),
            }),
            None => Err(PimError::Api {
                status: 404,
                status_text: "Not Found".into(),
                body: Some(json!({ "message": format!("no route for {}", path) })),
            }),
        }
    }
}

/// An SDK wired to `mock` with a page size of 20.
pub fn sdk(mock: &Arc<MockTransport>) -> PimSdk {
    PimSdk::builder()
        .transport(mock.clone())
        .page_size(20)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Sample records
// ---------------------------------------------------------------------------

pub fn category(id: i64, parent_id: Option<i64>, order: i64) -> Category {
    Category {
        id,
        name: format!("Category {}", id),
        slug: format!("category-{}", id),
        description: None,
        parent_id,
        order,
        active: true,
        created_at: None,
        updated_at: None,
    }
}

/// 1 Furniture
/// ├── 2 Chairs
/// │   └── 4 Office chairs
/// └── 3 Tables
/// 5 Lighting
pub fn sample_categories() -> Vec<Category> {
    vec![
        category(1, None, 0),
        category(2, Some(1), 0),
        category(3, Some(1), 1),
        category(4, Some(2), 0),
        category(5, None, 1),
    ]
}

pub fn categories_json(categories: &[Category]) -> Value {
    serde_json::to_value(categories).unwrap()
}

pub fn image(id: i64, product_id: i64, order: i64) -> ProductImage {
    ProductImage {
        id,
        product_id,
        url: format!("https://cdn.example.com/{}.jpg", id),
        alt_text: None,
        order,
    }
}

pub fn product_json(id: i64, title: &str, category_id: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "barcode": format!("BC-{}", id),
        "categoryId": category_id,
        "brandId": null,
        "status": "DRAFT",
        "attributes": [],
        "images": []
    })
}

/// `{content, totalElements, ...}` envelope around `items`.
pub fn spring_page(items: Vec<Value>, total: u64, number: u32, size: u32) -> Value {
    let total_pages = if size == 0 { 0 } else { total.div_ceil(size as u64) };
    json!({
        "content": items,
        "totalElements": total,
        "totalPages": total_pages,
        "size": size,
        "number": number
    })
}

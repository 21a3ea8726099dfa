#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use shark_api::{ApiError, Catalog, MemoryStore, ModelSchema, QueryOptions, Store};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn catalog() -> Arc<Catalog> {
    Arc::new(
        [
            ModelSchema::new("City").table("cities").column("name", "STRING"),
            ModelSchema::new("Person")
                .table("people")
                .column("name", "STRING")
                .column("CityId", "INTEGER")
                .belongs_to("City", "City", "CityId")
                .has_many("Cars", "Car", "PersonId"),
            ModelSchema::new("Car")
                .table("cars")
                .required_column("name", "STRING")
                .column("price", "FLOAT")
                .column("createdAt", "TIMESTAMP WITH TIME ZONE")
                .column("PersonId", "INTEGER")
                .belongs_to("Person", "Person", "PersonId")
                .has_many("Tyres", "Tyre", "CarId"),
            ModelSchema::new("Tyre").table("tyres").column("brand", "STRING").column("CarId", "INTEGER"),
        ]
        .into_iter()
        .collect(),
    )
}

pub fn memory_store(catalog: &Arc<Catalog>) -> MemoryStore {
    let store = MemoryStore::new(catalog.clone());
    store.seed("City", vec![json!({ "id": 1, "name": "Lisbon" })]);
    store.seed(
        "Person",
        vec![
            json!({ "id": 1, "name": "Ana", "CityId": 1 }),
            json!({ "id": 2, "name": "Rui", "CityId": 1 }),
        ],
    );
    store.seed(
        "Car",
        vec![
            json!({ "id": 1, "name": "Beetle", "price": 1000.0, "createdAt": "2024-01-03", "PersonId": 1 }),
            json!({ "id": 2, "name": "Golf", "price": 3000.0, "createdAt": "2024-01-01", "PersonId": 1 }),
            json!({ "id": 3, "name": "Polo", "price": 2000.0, "createdAt": "2024-01-02", "PersonId": 2 }),
        ],
    );
    store.seed(
        "Tyre",
        vec![
            json!({ "id": 1, "brand": "Michelin", "CarId": 1 }),
            json!({ "id": 2, "brand": "Pirelli", "CarId": 1 }),
        ],
    );
    store
}

/// Memory store that counts calls per operation.
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub finds: AtomicUsize,
    pub destroys: AtomicUsize,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        RecordingStore {
            inner,
            finds: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
        }
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn count(&self, model: &ModelSchema, options: &QueryOptions) -> Result<u64, ApiError> {
        self.inner.count(model, options).await
    }

    async fn find_all(&self, model: &ModelSchema, options: &QueryOptions) -> Result<Vec<Value>, ApiError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all(model, options).await
    }

    async fn find_by_key(
        &self,
        model: &ModelSchema,
        id: &Value,
        options: &QueryOptions,
    ) -> Result<Option<Value>, ApiError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_key(model, id, options).await
    }

    async fn create(&self, model: &ModelSchema, payload: Value) -> Result<Value, ApiError> {
        self.inner.create(model, payload).await
    }

    async fn save(&self, model: &ModelSchema, id: &Value, row: Value) -> Result<Value, ApiError> {
        self.inner.save(model, id, row).await
    }

    async fn destroy(&self, model: &ModelSchema, id: &Value, options: &QueryOptions) -> Result<(), ApiError> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy(model, id, options).await
    }
}

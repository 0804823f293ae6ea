//! In-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use api::{
    AdminEndpoint, ApiError, Backend, DataResponse, Item, ItemEndpoint, OpsEndpoint, QueryParams,
    TimeSpan,
};

type Hook = Box<dyn FnMut(ItemEndpoint)>;

/// Answers from fixed tables and records every call as `(path, params)`.
#[derive(Default)]
pub struct FakeBackend {
    pub items: HashMap<ItemEndpoint, Vec<Item>>,
    pub operations: HashMap<OpsEndpoint, Vec<String>>,
    pub failures: HashMap<ItemEndpoint, ApiError>,
    pub span: Option<TimeSpan>,
    pub data: DataResponse,
    pub calls: RefCell<Vec<(String, QueryParams)>>,
    /// Runs inside an item request, before it answers.
    pub on_items: RefCell<Option<Hook>>,
}

impl FakeBackend {
    pub fn with_items(mut self, endpoint: ItemEndpoint, names: &[&str]) -> Self {
        self.items
            .insert(endpoint, names.iter().map(|name| Item::named(*name)).collect());
        self
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(path, _)| path.clone()).collect()
    }

    pub fn params_for(&self, path: &str) -> Option<QueryParams> {
        self.calls
            .borrow()
            .iter()
            .find(|(called, _)| called == path)
            .map(|(_, params)| params.clone())
    }

    fn record(&self, path: &str, params: &QueryParams) {
        self.calls.borrow_mut().push((path.to_string(), params.clone()));
    }
}

impl Backend for FakeBackend {
    async fn items(&self, endpoint: ItemEndpoint, params: &QueryParams) -> Result<Vec<Item>, ApiError> {
        self.record(endpoint.path(), params);
        if let Some(hook) = self.on_items.borrow_mut().as_mut() {
            hook(endpoint);
        }
        if let Some(err) = self.failures.get(&endpoint) {
            return Err(err.clone());
        }
        Ok(self.items.get(&endpoint).cloned().unwrap_or_default())
    }

    async fn operations(
        &self,
        endpoint: OpsEndpoint,
        params: &QueryParams,
    ) -> Result<Vec<String>, ApiError> {
        self.record(endpoint.path(), params);
        Ok(self.operations.get(&endpoint).cloned().unwrap_or_default())
    }

    async fn data(&self, params: &QueryParams) -> Result<DataResponse, ApiError> {
        self.record("getData", params);
        Ok(self.data.clone())
    }

    async fn time_span(&self, params: &QueryParams) -> Result<TimeSpan, ApiError> {
        self.record("getTimeSpan", params);
        self.span.clone().ok_or(ApiError::Status(500))
    }

    async fn instance(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.record("instance", &QueryParams::new().with("id", id));
        Err(ApiError::NotFound)
    }

    async fn admin(
        &self,
        endpoint: AdminEndpoint,
        params: &QueryParams,
    ) -> Result<serde_json::Value, ApiError> {
        self.record(endpoint.path(), params);
        Ok(serde_json::Value::Null)
    }
}

use check_suite::domain::TestId;
use check_suite::error::{StoreError, StoreResult};
use check_suite::models::TestFunctionMeta;
use check_suite::store::DefinitionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock definition store for testing.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockDefinitionStore {
    definitions: Arc<Mutex<HashMap<TestId, (TestFunctionMeta, Vec<u8>)>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    fail_saves: Arc<Mutex<bool>>,
}

#[allow(dead_code)]
impl MockDefinitionStore {
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(Mutex::new(HashMap::new())),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            fail_saves: Arc::new(Mutex::new(false)),
        }
    }

    /// Seed a stored definition as if it had been saved elsewhere.
    pub fn add_definition(&self, meta: TestFunctionMeta) {
        let mut definitions = self.definitions.lock().unwrap();
        definitions.insert(meta.uuid.clone(), (meta, Vec::new()));
    }

    pub fn payload(&self, id: &TestId) -> Option<Vec<u8>> {
        let definitions = self.definitions.lock().unwrap();
        definitions.get(id).map(|(_, payload)| payload.clone())
    }

    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap() = fail;
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    pub fn reset_call_counts(&self) {
        let mut counts = self.call_counts.lock().unwrap();
        counts.clear();
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

impl Default for MockDefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore for MockDefinitionStore {
    fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>> {
        self.track_call("load");

        let definitions = self.definitions.lock().unwrap();
        Ok(definitions.get(id).map(|(meta, _)| meta.clone()))
    }

    fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32> {
        self.track_call("save");

        if *self.fail_saves.lock().unwrap() {
            return Err(StoreError::ApiError {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }

        let mut definitions = self.definitions.lock().unwrap();
        let version = definitions
            .get(&meta.uuid)
            .and_then(|(stored, _)| stored.version)
            .unwrap_or(0)
            + 1;
        definitions.insert(
            meta.uuid.clone(),
            (meta.with_version(version), payload.to_vec()),
        );
        Ok(version)
    }

    fn list(&self) -> StoreResult<Vec<TestFunctionMeta>> {
        self.track_call("list");

        let definitions = self.definitions.lock().unwrap();
        let mut metas: Vec<TestFunctionMeta> =
            definitions.values().map(|(meta, _)| meta.clone()).collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metas)
    }
}

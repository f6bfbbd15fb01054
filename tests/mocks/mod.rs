mod mock_definition_store;

pub use mock_definition_store::MockDefinitionStore;

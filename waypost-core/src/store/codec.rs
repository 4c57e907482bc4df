use crate::graph::ConfigGraph;
use crate::store::StoreError;

/// Parse one stored object.
pub fn decode(key: &str, bytes: &[u8]) -> Result<ConfigGraph, StoreError> {
    serde_yaml::from_slice(bytes).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Render one object. Absent optional fields are omitted, never written as
/// empty containers.
pub fn encode(key: &str, graph: &ConfigGraph) -> Result<Vec<u8>, StoreError> {
    serde_yaml::to_string(graph)
        .map(String::into_bytes)
        .map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })
}

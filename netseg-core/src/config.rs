//! Config - Load segment definitions from JSON files
//!
//! ```json
//! {
//!   "segments": [
//!     {
//!       "name": "app",
//!       "spec": {
//!         "network_id": "vpc-1",
//!         "address_block": "10.0.1.0/24",
//!         "zone": "us-east-1a",
//!         "routes": [
//!           { "destination_block": "0.0.0.0/0", "target_kind": "internet-gateway", "target_id": "igw-123" }
//!         ]
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SegmentResult;
use crate::graph::ResourceGraph;
use crate::segment::{NetworkSegment, NetworkSegmentSpec, define};

/// Errors that can occur when loading a definition file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, unknown fields, or an unsupported target kind
    #[error("Invalid definition file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Segment '{0}' is defined more than once")]
    DuplicateSegment(String),
}

/// One named segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentDefinition {
    pub name: String,
    pub spec: NetworkSegmentSpec,
}

/// Contents of a definition file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionFile {
    #[serde(default)]
    pub segments: Vec<SegmentDefinition>,
}

impl DefinitionFile {
    /// Define every segment, in file order
    pub fn define_all(&self) -> SegmentResult<Vec<NetworkSegment>> {
        self.segments
            .iter()
            .map(|d| define(&d.name, d.spec.clone()))
            .collect()
    }

    /// Define every segment and merge the results into one graph
    pub fn synthesize(&self) -> SegmentResult<ResourceGraph> {
        let mut graph = ResourceGraph::new();
        for segment in self.define_all()? {
            graph.extend(segment.into_graph())?;
        }
        Ok(graph)
    }
}

/// Parse a definition file from a JSON string
pub fn parse_definitions(content: &str) -> Result<DefinitionFile, ConfigError> {
    let file: DefinitionFile = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for segment in &file.segments {
        if !seen.insert(segment.name.as_str()) {
            return Err(ConfigError::DuplicateSegment(segment.name.clone()));
        }
    }

    Ok(file)
}

/// Read and parse a definition file
pub fn load_definitions(path: &Path) -> Result<DefinitionFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("loading definitions from {}", path.display());
    parse_definitions(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ROUTE, SUBNET};
    use crate::segment::TargetKind;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "segments": [
            {
                "name": "app",
                "spec": {
                    "network_id": "vpc-1",
                    "address_block": "10.0.1.0/24",
                    "zone": "us-east-1a",
                    "routes": [
                        { "destination_block": "0.0.0.0/0", "target_kind": "internet-gateway", "target_id": "igw-123" }
                    ],
                    "subnet_labels": { "env": "prod" }
                }
            },
            {
                "name": "data",
                "spec": {
                    "network_id": "vpc-1",
                    "address_block": "10.0.2.0/24",
                    "zone": "us-east-1b"
                }
            }
        ]
    }"#;

    #[test]
    fn parse_sample_file() {
        let file = parse_definitions(SAMPLE).unwrap();
        assert_eq!(file.segments.len(), 2);

        let app = &file.segments[0].spec;
        assert_eq!(app.routes.len(), 1);
        assert_eq!(app.routes[0].target_kind, TargetKind::InternetGateway);
        assert_eq!(
            app.subnet_labels.as_ref().and_then(|l| l.get("env")),
            Some(&"prod".to_string())
        );
        assert!(app.route_table_labels.is_none());

        let data = &file.segments[1].spec;
        assert!(data.routes.is_empty());
        assert!(data.subnet_labels.is_none());
    }

    #[test]
    fn unsupported_target_kind_fails_at_load() {
        let content = r#"{
            "segments": [{
                "name": "app",
                "spec": {
                    "network_id": "vpc-1",
                    "address_block": "10.0.1.0/24",
                    "zone": "us-east-1a",
                    "routes": [
                        { "destination_block": "0.0.0.0/0", "target_kind": "vpn-gateway", "target_id": "vgw-1" }
                    ]
                }
            }]
        }"#;

        let err = parse_definitions(content).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let message = err.to_string();
        assert!(message.contains("Unsupported target kind 'vpn-gateway'"), "{}", message);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let content = r#"{
            "segments": [{
                "name": "app",
                "spec": {
                    "network_id": "vpc-1",
                    "address_block": "10.0.1.0/24",
                    "zone": "us-east-1a",
                    "map_public_ip_on_launch": true
                }
            }]
        }"#;
        assert!(matches!(
            parse_definitions(content),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn duplicate_segment_names_are_rejected() {
        let content = r#"{
            "segments": [
                { "name": "app", "spec": { "network_id": "v", "address_block": "10.0.0.0/24", "zone": "a" } },
                { "name": "app", "spec": { "network_id": "v", "address_block": "10.0.1.0/24", "zone": "b" } }
            ]
        }"#;
        match parse_definitions(content) {
            Err(ConfigError::DuplicateSegment(name)) => assert_eq!(name, "app"),
            other => panic!("Expected DuplicateSegment, got {:?}", other),
        }
    }

    #[test]
    fn synthesize_merges_segments() {
        let graph = parse_definitions(SAMPLE).unwrap().synthesize().unwrap();
        assert_eq!(graph.count_of(SUBNET), 2);
        assert_eq!(graph.count_of(ROUTE), 1);
        assert_eq!(graph.len(), 7);
        assert!(graph.unresolved_references().is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let definitions = load_definitions(file.path()).unwrap();
        assert_eq!(definitions.segments[0].name, "app");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_definitions(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

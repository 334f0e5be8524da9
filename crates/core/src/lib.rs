//! Pipeview core types: pipeline versions, list requests and shaping helpers
//! shared by the GUI and CLI frontends.

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod columns;
pub mod format;
pub mod node_details;
pub mod pod;
pub mod routes;

/// Errors raised while shaping data for display.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Kind of resource addressed by a resource key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    #[default]
    UnknownResourceType,
    Experiment,
    Job,
    Pipeline,
    PipelineVersion,
    Namespace,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::UnknownResourceType => "UNKNOWN_RESOURCE_TYPE",
            ResourceType::Experiment => "EXPERIMENT",
            ResourceType::Job => "JOB",
            ResourceType::Pipeline => "PIPELINE",
            ResourceType::PipelineVersion => "PIPELINE_VERSION",
            ResourceType::Namespace => "NAMESPACE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResourceKey {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ResourceKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PackageUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_url: Option<String>,
}

/// A pipeline version as served by the pipeline service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PipelineVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<PackageUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_references: Option<Vec<ResourceReference>>,
}

/// One page of pipeline versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListPipelineVersionsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<PipelineVersion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<i32>,
}

/// Page request issued by a table reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub filter: Option<String>,
    pub order_ascending: Option<bool>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub sort_by: Option<String>,
}

/// Server-side sort keys for pipeline versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineVersionSortKey {
    Name,
    CreatedAt,
}

impl PipelineVersionSortKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PipelineVersionSortKey::Name => "name",
            PipelineVersionSortKey::CreatedAt => "created_at",
        }
    }
}

pub mod prelude {
    pub use super::{
        CoreError, CoreResult, ListPipelineVersionsResponse, ListRequest, PipelineVersion,
        PipelineVersionSortKey, ResourceType,
    };
    pub use crate::node_details::{NodeType, SelectedNodeInfo};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_response_with_missing_fields() {
        let body = r#"{"total_size": 0}"#;
        let resp: ListPipelineVersionsResponse = serde_json::from_str(body).expect("decode");
        assert!(resp.versions.is_none());
        assert!(resp.next_page_token.is_none());
        assert_eq!(resp.total_size, Some(0));
    }

    #[test]
    fn decodes_pipeline_version_fields() {
        let body = r#"{
            "id": "v-1",
            "name": "first",
            "description": "initial upload",
            "created_at": "2021-03-04T05:06:07Z",
            "resource_references": [
                {"key": {"type": "PIPELINE", "id": "p-1"}, "relationship": "OWNER"}
            ]
        }"#;
        let v: PipelineVersion = serde_json::from_str(body).expect("decode");
        assert_eq!(v.id.as_deref(), Some("v-1"));
        assert_eq!(v.created_at.map(|t| t.timestamp()), Some(1_614_834_367));
        let key = v.resource_references.unwrap()[0].key.clone().unwrap();
        assert_eq!(key.resource_type, Some(ResourceType::Pipeline));
        assert_eq!(key.id.as_deref(), Some("p-1"));
    }

    #[test]
    fn sort_keys_match_server_names() {
        assert_eq!(PipelineVersionSortKey::Name.as_str(), "name");
        assert_eq!(PipelineVersionSortKey::CreatedAt.as_str(), "created_at");
        assert_eq!(ResourceType::Pipeline.as_str(), "PIPELINE");
    }
}

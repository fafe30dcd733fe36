//! Architecture Definition File (ADF) model.
//!
//! Documents are validated at the boundary: a non-empty `name` and a
//! `c4Model.containers` array are required, and each container's
//! `repository` / `repositories` fields are resolved into one normalized list
//! of [`RepositorySpec`] while parsing.
//!
//! Serializing gives back the document as it was written: fields this model
//! does not name are kept in `extra`, the repository fields are emitted as
//! declared, and defaulted fields the document left out are omitted again.

use crate::{ArchMetricsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub c4_model: C4Model,
    /// Relationships declared next to `c4Model` rather than inside it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ArchitectureMetrics>,
    /// Owner applied to repositories that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Repository that hosts the architecture itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct C4Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContainer")]
pub struct Container {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// `repository` and `repositories` merged, in declaration order.
    #[serde(skip)]
    pub repositories: Vec<RepositorySpec>,
    /// `repository` exactly as the document wrote it.
    #[serde(rename = "repository", skip_serializing_if = "Option::is_none")]
    pub declared_repository: Option<Value>,
    #[serde(rename = "repositories", skip_serializing_if = "Option::is_none")]
    pub declared_repositories: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ContainerMetrics>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A repository as written in the document; the owner may still be implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySpec {
    pub owner: Option<String>,
    pub name: String,
}

impl RepositorySpec {
    fn from_value(container: &str, value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::String(raw) => Self::parse(container, raw),
            Value::Object(obj) => {
                let name = obj
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        format!("container '{container}': repository object requires a 'name'")
                    })?;
                let owner = match obj.get("owner").and_then(Value::as_str).map(str::trim) {
                    Some("") => {
                        return Err(format!(
                            "container '{container}': repository '{name}' has an empty owner"
                        ))
                    }
                    owner => owner.map(str::to_string),
                };
                Ok(Self {
                    owner,
                    name: name.to_string(),
                })
            }
            other => Err(format!(
                "container '{container}': repository must be a string or an {{owner, name}} object, got {}",
                json_kind(other)
            )),
        }
    }

    /// `owner/name` or a bare `name`; both halves are trimmed and must be non-empty.
    fn parse(container: &str, raw: &str) -> std::result::Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(format!("container '{container}': empty repository name"));
        }
        match raw.split_once('/') {
            Some((owner, name)) => {
                let (owner, name) = (owner.trim(), name.trim());
                if owner.is_empty() || name.is_empty() {
                    return Err(format!(
                        "container '{container}': repository '{raw}' needs both an owner and a name"
                    ));
                }
                Ok(Self {
                    owner: Some(owner.to_string()),
                    name: name.to_string(),
                })
            }
            None => Ok(Self {
                owner: None,
                name: raw.to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct RawContainer {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    repository: Option<Value>,
    #[serde(default)]
    repositories: Option<Value>,
    #[serde(default)]
    metrics: Option<ContainerMetrics>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawContainer> for Container {
    type Error = String;

    fn try_from(raw: RawContainer) -> std::result::Result<Self, Self::Error> {
        let label = if raw.id.is_empty() { raw.name.as_str() } else { raw.id.as_str() };
        let mut repositories = Vec::new();

        match &raw.repository {
            None | Some(Value::Null) => {}
            Some(value) => repositories.push(RepositorySpec::from_value(label, value)?),
        }

        match &raw.repositories {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    repositories.push(RepositorySpec::from_value(label, item)?);
                }
            }
            Some(other) => {
                return Err(format!(
                    "container '{label}': repositories must be an array, got {}",
                    json_kind(other)
                ))
            }
        }

        Ok(Container {
            id: raw.id,
            name: raw.name,
            kind: raw.kind,
            description: raw.description,
            organization: raw.organization,
            team: raw.team,
            repositories,
            declared_repository: raw.repository,
            declared_repositories: raw.repositories,
            metrics: raw.metrics,
            extra: raw.extra,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ArchitectureDefinition {
    /// Parses and validates a JSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ArchMetricsError::MalformedArchitecture(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ArchMetricsError::MalformedArchitecture("document must be a JSON object".into())
        })?;

        match obj.get("name").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => {}
            _ => {
                return Err(ArchMetricsError::MalformedArchitecture(
                    "missing required field 'name'".into(),
                ))
            }
        }

        let has_containers = obj
            .get("c4Model")
            .and_then(|m| m.get("containers"))
            .map(Value::is_array)
            .unwrap_or(false);
        if !has_containers {
            return Err(ArchMetricsError::MalformedArchitecture(
                "missing required array 'c4Model.containers'".into(),
            ));
        }

        let adf: Self = serde_json::from_value(value)
            .map_err(|e| ArchMetricsError::MalformedArchitecture(e.to_string()))?;

        if let Some(raw) = adf.repository.as_deref().filter(|r| !r.trim().is_empty()) {
            RepositorySpec::parse("", raw).map_err(|_| {
                ArchMetricsError::MalformedArchitecture(format!(
                    "top-level repository '{raw}' needs both an owner and a name"
                ))
            })?;
        }
        Ok(adf)
    }

    pub fn containers(&self) -> &[Container] {
        &self.c4_model.containers
    }

    /// Relationships from `c4Model` followed by top-level ones.
    pub fn all_relationships(&self) -> Vec<Relationship> {
        self.c4_model
            .relationships
            .iter()
            .chain(self.relationships.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(containers: Value) -> Value {
        json!({
            "name": "Demo",
            "version": "1.0.0",
            "description": "demo architecture",
            "c4Model": { "containers": containers, "relationships": [] }
        })
    }

    #[test]
    fn rejects_missing_name() {
        let err = ArchitectureDefinition::from_value(json!({"c4Model": {"containers": []}}))
            .unwrap_err();
        assert!(matches!(err, ArchMetricsError::MalformedArchitecture(m) if m.contains("name")));
    }

    #[test]
    fn rejects_missing_containers() {
        let err = ArchitectureDefinition::from_value(json!({"name": "x", "c4Model": {}}))
            .unwrap_err();
        assert!(
            matches!(err, ArchMetricsError::MalformedArchitecture(m) if m.contains("c4Model.containers"))
        );
    }

    #[test]
    fn rejects_invalid_json() {
        let err = ArchitectureDefinition::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, ArchMetricsError::MalformedArchitecture(_)));
    }

    #[test]
    fn normalizes_repository_shapes() {
        let adf = ArchitectureDefinition::from_value(doc(json!([
            { "id": "a", "name": "A", "repository": "acme/api" },
            { "id": "b", "name": "B", "repositories": ["ui", {"owner": "other", "name": "lib"}] },
            { "id": "c", "name": "C", "repository": {"name": "solo"}, "repositories": ["x/y"] },
            { "id": "d", "name": "D" }
        ])))
        .unwrap();

        let c = adf.containers();
        assert_eq!(c[0].repositories[0].owner.as_deref(), Some("acme"));
        assert_eq!(c[1].repositories.len(), 2);
        assert_eq!(c[1].repositories[0].owner, None);
        assert_eq!(c[1].repositories[1].owner.as_deref(), Some("other"));
        assert_eq!(c[2].repositories[0].name, "solo");
        assert_eq!(c[2].repositories[1].name, "y");
        assert!(c[3].repositories.is_empty());
    }

    #[test]
    fn rejects_wrong_repository_shape() {
        let err = ArchitectureDefinition::from_value(doc(json!([
            { "id": "a", "name": "A", "repository": 42 }
        ])))
        .unwrap_err();
        assert!(
            matches!(err, ArchMetricsError::MalformedArchitecture(m) if m.contains("container 'a'"))
        );

        let err = ArchitectureDefinition::from_value(doc(json!([
            { "id": "b", "name": "B", "repositories": "not-a-list" }
        ])))
        .unwrap_err();
        assert!(matches!(err, ArchMetricsError::MalformedArchitecture(m) if m.contains("array")));
    }

    #[test]
    fn preserves_unknown_fields_on_reserialize() {
        let adf = ArchitectureDefinition::from_value(json!({
            "name": "Demo",
            "owner": "platform-team",
            "c4Model": {
                "containers": [{ "id": "a", "name": "A", "packages": [{"name": "p"}], "repository": "acme/a" }]
            }
        }))
        .unwrap();

        let out = serde_json::to_value(&adf).unwrap();
        assert_eq!(out["owner"], "platform-team");
        assert_eq!(out["c4Model"]["containers"][0]["packages"][0]["name"], "p");
        assert_eq!(out["c4Model"]["containers"][0]["repository"], "acme/a");

        let reparsed = ArchitectureDefinition::from_value(out).unwrap();
        assert_eq!(reparsed.containers()[0].repositories, adf.containers()[0].repositories);
    }

    #[test]
    fn serializes_back_to_the_document_as_written() {
        let raw = json!({
            "name": "Demo",
            "version": "2.0.0",
            "c4Model": {
                "containers": [
                    { "id": "1", "name": "one", "repository": "acme/a" },
                    { "id": "2", "name": "two", "type": "ui", "description": "front end",
                      "repositories": ["b", { "owner": "x", "name": "c" }] },
                    { "id": "3", "name": "three", "repository": { "name": "d" }, "repositories": [] }
                ],
                "relationships": [{ "from": "1", "to": "2", "type": "calls" }, { "from": "2", "to": "3" }]
            }
        });

        let adf = ArchitectureDefinition::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&adf).unwrap(), raw);
    }

    #[test]
    fn rejects_slash_forms_missing_a_half() {
        for bad in ["acme/", "/api", " / "] {
            let err = ArchitectureDefinition::from_value(doc(json!([
                { "id": "a", "name": "A", "repositories": ["ok", bad] }
            ])))
            .unwrap_err();
            assert!(
                matches!(&err, ArchMetricsError::MalformedArchitecture(m) if m.contains("container 'a'")),
                "{bad:?} gave {err:?}"
            );
        }

        let err = ArchitectureDefinition::from_value(doc(json!([
            { "id": "b", "name": "B", "repository": { "owner": " ", "name": "api" } }
        ])))
        .unwrap_err();
        assert!(matches!(err, ArchMetricsError::MalformedArchitecture(m) if m.contains("empty owner")));

        let mut top = doc(json!([]));
        top["repository"] = json!("acme/");
        assert!(matches!(
            ArchitectureDefinition::from_value(top),
            Err(ArchMetricsError::MalformedArchitecture(_))
        ));
    }

    #[test]
    fn trims_both_halves() {
        let adf = ArchitectureDefinition::from_value(doc(json!([
            { "id": "a", "name": "A", "repository": " acme / api " }
        ])))
        .unwrap();
        let spec = &adf.containers()[0].repositories[0];
        assert_eq!(spec.owner.as_deref(), Some("acme"));
        assert_eq!(spec.name, "api");
    }

    #[test]
    fn concatenates_relationships() {
        let adf = ArchitectureDefinition::from_value(json!({
            "name": "Demo",
            "c4Model": {
                "containers": [],
                "relationships": [{"from": "a", "to": "b", "type": "depends_on"}]
            },
            "relationships": [{"from": "b", "to": "c", "type": "extends"}]
        }))
        .unwrap();

        let rels = adf.all_relationships();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].kind, "depends_on");
        assert_eq!(rels[1].from, "b");
    }
}

use crate::{ArchMetricsError, ArchitectureDefinition, Relationship, Result};
use std::fmt::Write as _;
use std::str::FromStr;

const DEFAULT_RELATIONSHIP: &str = "depends_on";
const C4_CONTAINER_INCLUDE: &str =
    "https://raw.githubusercontent.com/plantuml-stdlib/C4-PlantUML/master/C4_Container.puml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
    GraphMl,
    /// Container-level C4 diagram as a Mermaid flowchart.
    Mermaid,
    /// Container-level C4 diagram using the C4-PlantUML library.
    PlantUml,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "application/yaml",
            ExportFormat::GraphMl => "application/xml",
            ExportFormat::Mermaid | ExportFormat::PlantUml => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ArchMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "graphml" => Ok(ExportFormat::GraphMl),
            "mermaid" | "mmd" => Ok(ExportFormat::Mermaid),
            "plantuml" | "puml" => Ok(ExportFormat::PlantUml),
            other => Err(ArchMetricsError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn export(adf: &ArchitectureDefinition, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(adf)?),
        ExportFormat::Yaml => serde_yaml::to_string(adf)
            .map_err(|e| ArchMetricsError::Export(e.to_string())),
        ExportFormat::GraphMl => Ok(to_graphml(adf)),
        ExportFormat::Mermaid => Ok(to_mermaid(adf)),
        ExportFormat::PlantUml => Ok(to_plantuml(adf)),
    }
}

/// Containers become nodes, relationships become directed edges labelled
/// with their type.
fn to_graphml(adf: &ArchitectureDefinition) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    out.push_str("  <key id=\"label\" for=\"all\" attr.name=\"label\" attr.type=\"string\"/>\n");
    out.push_str(
        "  <key id=\"healthScore\" for=\"node\" attr.name=\"healthScore\" attr.type=\"double\"/>\n",
    );
    out.push_str("  <graph id=\"architecture\" edgedefault=\"directed\">\n");

    for container in adf.containers() {
        let _ = writeln!(out, "    <node id=\"{}\">", escape_xml(&container.id));
        let _ = writeln!(
            out,
            "      <data key=\"label\">{}</data>",
            escape_xml(&container.name)
        );
        if let Some(score) = container.metrics.as_ref().and_then(|m| m.health_score) {
            let _ = writeln!(out, "      <data key=\"healthScore\">{}</data>", score);
        }
        out.push_str("    </node>\n");
    }

    for (i, rel) in adf.all_relationships().iter().enumerate() {
        let _ = writeln!(
            out,
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\">",
            i,
            escape_xml(&rel.from),
            escape_xml(&rel.to)
        );
        if !rel.kind.is_empty() {
            let _ = writeln!(out, "      <data key=\"label\">{}</data>", escape_xml(&rel.kind));
        }
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

fn to_mermaid(adf: &ArchitectureDefinition) -> String {
    let mut out = String::from("graph TB\n");
    let _ = writeln!(out, "    subgraph System[\"{}\"]", mermaid_label(&adf.name));
    for container in adf.containers() {
        let _ = writeln!(
            out,
            "        {}[\"{}\"]",
            diagram_id(&container.id),
            mermaid_label(&container.name)
        );
    }
    out.push_str("    end\n");

    for rel in adf.all_relationships() {
        let _ = writeln!(
            out,
            "    {} -->|{}| {}",
            diagram_id(&rel.from),
            mermaid_label(relationship_label(&rel)),
            diagram_id(&rel.to)
        );
    }
    out
}

fn to_plantuml(adf: &ArchitectureDefinition) -> String {
    let mut out = String::from("@startuml\n");
    let _ = writeln!(out, "!include {}", C4_CONTAINER_INCLUDE);
    let _ = writeln!(out, "title {} - Container Diagram", plantuml_text(&adf.name));
    let _ = writeln!(out, "System_Boundary(system, \"{}\") {{", plantuml_text(&adf.name));
    for container in adf.containers() {
        let kind = if container.kind.is_empty() { "service" } else { &container.kind };
        let _ = writeln!(
            out,
            "    Container({}, \"{}\", \"{}\")",
            diagram_id(&container.id),
            plantuml_text(&container.name),
            plantuml_text(kind)
        );
    }
    out.push_str("}\n");

    for rel in adf.all_relationships() {
        let _ = writeln!(
            out,
            "Rel({}, {}, \"{}\")",
            diagram_id(&rel.from),
            diagram_id(&rel.to),
            plantuml_text(relationship_label(&rel))
        );
    }
    out.push_str("@enduml\n");
    out
}

fn relationship_label(rel: &Relationship) -> &str {
    if rel.kind.is_empty() {
        DEFAULT_RELATIONSHIP
    } else {
        &rel.kind
    }
}

/// Diagram identifiers only allow `[A-Za-z0-9_]`.
fn diagram_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn mermaid_label(raw: &str) -> String {
    raw.replace('"', "#quot;").replace('|', "#124;")
}

fn plantuml_text(raw: &str) -> String {
    raw.replace('"', "'")
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

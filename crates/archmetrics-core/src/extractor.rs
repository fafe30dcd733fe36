use crate::{ArchitectureDefinition, RepositoryRef};
use std::collections::HashSet;

/// Collects the repositories an architecture references, deduplicated by
/// `(owner, name)` in first-seen document order.
///
/// A container entry without an owner takes the container's `organization`,
/// else `default_org`. The document's `organization` only applies to the
/// top-level `repository`, which is emitted before any container repository.
pub fn extract(adf: &ArchitectureDefinition, default_org: &str) -> Vec<RepositoryRef> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    let mut push = |repo: RepositoryRef| {
        if seen.insert(repo.full_name()) {
            refs.push(repo);
        }
    };

    if let Some(raw) = adf.repository.as_deref().filter(|r| !r.trim().is_empty()) {
        let doc_org = adf.organization.as_deref().unwrap_or(default_org);
        push(RepositoryRef::parse(raw, doc_org));
    }

    for container in adf.containers() {
        let owner_default = container.organization.as_deref().unwrap_or(default_org);
        for spec in &container.repositories {
            let owner = spec.owner.as_deref().unwrap_or(owner_default);
            push(RepositoryRef::new(owner, spec.name.as_str()));
        }
    }

    refs
}

use crate::normalize::{normalize_method, normalize_path};
use apiscout_inference::EndpointCandidate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Identity of a canonical endpoint: normalized method plus normalized path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointKey {
    pub method: String,
    pub path: String,
}

impl EndpointKey {
    /// Build the key for a candidate, or `None` when method or path is
    /// missing. Missing means absent or blank; such candidates carry no
    /// identity and are dropped rather than guessed at.
    pub fn from_candidate(candidate: &EndpointCandidate) -> Option<Self> {
        if candidate.method.trim().is_empty() || candidate.path.trim().is_empty() {
            return None;
        }
        Some(Self {
            method: normalize_method(&candidate.method),
            path: normalize_path(&candidate.path),
        })
    }
}

/// A repository/file pair that reported an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub repo_name: String,
    pub file_path: String,
}

/// The merged record for one method/path across every scanned repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEndpoint {
    pub method: String,
    pub path: String,
    /// Repository of the first observation.
    pub repo_name: String,
    /// File of the first observation.
    pub file_path: String,
    /// Every other `(repo, file)` that reported the same endpoint.
    #[serde(default)]
    pub alternative_sources: Vec<SourceRef>,
}

impl CanonicalEndpoint {
    fn first_observation(key: &EndpointKey, candidate: &EndpointCandidate) -> Self {
        Self {
            method: key.method.clone(),
            path: key.path.clone(),
            repo_name: candidate.repo_name.clone(),
            file_path: candidate.file_path.clone(),
            alternative_sources: Vec::new(),
        }
    }

    /// Record another observation of this endpoint. The primary source never
    /// changes; a new `(repo, file)` pair is appended once.
    pub fn merge_source(&mut self, candidate: &EndpointCandidate) {
        if self.repo_name == candidate.repo_name && self.file_path == candidate.file_path {
            return;
        }
        let source = SourceRef {
            repo_name: candidate.repo_name.clone(),
            file_path: candidate.file_path.clone(),
        };
        if !self.alternative_sources.contains(&source) {
            self.alternative_sources.push(source);
        }
    }

    /// Stable identifier derived from the canonical method and path.
    pub fn endpoint_id(&self) -> String {
        let digest = Sha256::digest(format!("{}:{}", self.method, self.path).as_bytes());
        digest
            .iter()
            .take(16)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

/// Folds endpoint candidates into at most one record per normalized key.
///
/// Iteration order is the key order (method, then path), so two runs over
/// the same observations produce the same catalog in the same order no
/// matter how the observations were interleaved.
#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    endpoints: BTreeMap<EndpointKey, CanonicalEndpoint>,
}

impl EndpointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one candidate into the catalog.
    ///
    /// Returns `false` when the candidate was dropped for lacking a method
    /// or path.
    pub fn observe(&mut self, candidate: &EndpointCandidate) -> bool {
        let Some(key) = EndpointKey::from_candidate(candidate) else {
            log::debug!(
                "Dropping candidate without method/path from {}/{}",
                candidate.repo_name,
                candidate.file_path
            );
            return false;
        };
        match self.endpoints.entry(key) {
            Entry::Vacant(slot) => {
                let record = CanonicalEndpoint::first_observation(slot.key(), candidate);
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => slot.get_mut().merge_source(candidate),
        }
        true
    }

    /// Fold a batch; returns how many candidates were accepted.
    pub fn observe_all<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a EndpointCandidate>,
    ) -> usize {
        candidates
            .into_iter()
            .filter(|candidate| self.observe(candidate))
            .count()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints in canonical key order.
    pub fn endpoints(&self) -> impl Iterator<Item = &CanonicalEndpoint> {
        self.endpoints.values()
    }

    pub fn into_endpoints(self) -> Vec<CanonicalEndpoint> {
        self.endpoints.into_values().collect()
    }

    /// Merge another catalog into this one, preserving first-wins primaries
    /// by key order of the incoming catalog.
    pub fn absorb(&mut self, other: EndpointCatalog) {
        for (key, incoming) in other.endpoints {
            match self.endpoints.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(incoming);
                }
                Entry::Occupied(mut slot) => {
                    let record = slot.get_mut();
                    let primary = EndpointCandidate {
                        method: incoming.method.clone(),
                        path: incoming.path.clone(),
                        repo_name: incoming.repo_name.clone(),
                        file_path: incoming.file_path.clone(),
                    };
                    record.merge_source(&primary);
                    for source in incoming.alternative_sources {
                        record.merge_source(&EndpointCandidate {
                            method: incoming.method.clone(),
                            path: incoming.path.clone(),
                            repo_name: source.repo_name,
                            file_path: source.file_path,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(method: &str, path: &str, repo: &str, file: &str) -> EndpointCandidate {
        EndpointCandidate {
            method: method.to_string(),
            path: path.to_string(),
            repo_name: repo.to_string(),
            file_path: file.to_string(),
        }
    }

    #[test]
    fn same_endpoint_in_two_repos_merges_to_one_record() {
        let mut catalog = EndpointCatalog::new();
        catalog.observe(&candidate("GET", "/api/users", "svc-a", "routes/users.js"));
        catalog.observe(&candidate("get", "/api/users/", "svc-b", "api/users.py"));

        assert_eq!(catalog.len(), 1);
        let endpoint = catalog.endpoints().next().unwrap();
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.path, "/api/users");
        assert_eq!(endpoint.repo_name, "svc-a");
        assert_eq!(endpoint.file_path, "routes/users.js");
        assert_eq!(
            endpoint.alternative_sources,
            vec![SourceRef {
                repo_name: "svc-b".to_string(),
                file_path: "api/users.py".to_string(),
            }]
        );
    }

    #[test]
    fn repeat_observation_from_the_same_source_adds_nothing() {
        let mut catalog = EndpointCatalog::new();
        let first = candidate("GET", "/api/users", "svc-a", "routes/users.js");
        catalog.observe(&first);
        catalog.observe(&first);
        catalog.observe(&candidate("GET", "/api//users", "svc-a", "routes/users.js"));

        let endpoint = catalog.endpoints().next().unwrap();
        assert!(endpoint.alternative_sources.is_empty());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn duplicate_alternative_sources_are_not_repeated() {
        let mut catalog = EndpointCatalog::new();
        catalog.observe(&candidate("GET", "/u", "a", "f1"));
        catalog.observe(&candidate("GET", "/u", "b", "f2"));
        catalog.observe(&candidate("GET", "/u", "b", "f2"));

        let endpoint = catalog.endpoints().next().unwrap();
        assert_eq!(endpoint.alternative_sources.len(), 1);
    }

    #[test]
    fn candidates_without_identity_are_dropped() {
        let mut catalog = EndpointCatalog::new();
        assert!(!catalog.observe(&candidate("", "/x", "a", "f")));
        assert!(!catalog.observe(&candidate("GET", "", "a", "f")));
        assert!(!catalog.observe(&candidate("  ", "  ", "a", "f")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn iteration_is_ordered_by_method_then_path() {
        let mut catalog = EndpointCatalog::new();
        catalog.observe(&candidate("POST", "/b", "r", "f"));
        catalog.observe(&candidate("GET", "/z", "r", "f"));
        catalog.observe(&candidate("GET", "/a", "r", "f"));

        let keys: Vec<(String, String)> = catalog
            .endpoints()
            .map(|e| (e.method.clone(), e.path.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("GET".to_string(), "/a".to_string()),
                ("GET".to_string(), "/z".to_string()),
                ("POST".to_string(), "/b".to_string()),
            ]
        );
    }

    #[test]
    fn interleaving_does_not_change_the_catalog_shape() {
        let a = candidate("GET", "/api/users", "svc-a", "routes/users.js");
        let b = candidate("get", "api/users/", "svc-b", "api/users.py");
        let c = candidate("POST", "/api/users", "svc-a", "routes/users.js");

        let mut one = EndpointCatalog::new();
        one.observe_all([&a, &b, &c]);
        let mut two = EndpointCatalog::new();
        two.observe_all([&c, &b, &a]);

        assert_eq!(one.len(), two.len());
        let keys_one: Vec<String> = one.endpoints().map(CanonicalEndpoint::endpoint_id).collect();
        let keys_two: Vec<String> = two.endpoints().map(CanonicalEndpoint::endpoint_id).collect();
        assert_eq!(keys_one, keys_two);
    }

    #[test]
    fn observe_all_counts_accepted_candidates() {
        let mut catalog = EndpointCatalog::new();
        let good = candidate("GET", "/a", "r", "f");
        let bad = candidate("", "", "r", "f");
        assert_eq!(catalog.observe_all([&good, &bad, &good]), 2);
    }

    #[test]
    fn endpoint_id_is_stable_for_the_canonical_key() {
        let mut catalog = EndpointCatalog::new();
        catalog.observe(&candidate("get", "/api//users/", "a", "f"));
        let from_raw = catalog.endpoints().next().unwrap().endpoint_id();

        let mut clean = EndpointCatalog::new();
        clean.observe(&candidate("GET", "/api/users", "b", "g"));
        let from_clean = clean.endpoints().next().unwrap().endpoint_id();

        assert_eq!(from_raw, from_clean);
    }

    #[test]
    fn absorb_merges_catalogs_without_duplicates() {
        let mut left = EndpointCatalog::new();
        left.observe(&candidate("GET", "/u", "a", "f1"));

        let mut right = EndpointCatalog::new();
        right.observe(&candidate("GET", "/u", "b", "f2"));
        right.observe(&candidate("PUT", "/u", "b", "f2"));

        left.absorb(right);
        assert_eq!(left.len(), 2);
        let get = left.endpoints().next().unwrap();
        assert_eq!(get.repo_name, "a");
        assert_eq!(get.alternative_sources.len(), 1);
    }
}

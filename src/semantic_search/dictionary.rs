//! The process-wide translation dictionary: `Expand(term) → [synonyms]`
//! using forward abbreviations, an allowlisted reverse index, and small
//! domain clusters (spec.md §4.5, §9 "global state... lazy initialization
//! behind a guard").

use std::collections::HashMap;
use std::sync::OnceLock;

const FORWARD: &[(&str, &[&str])] = &[
    ("config", &["configuration"]),
    ("auth", &["authentication", "authorization"]),
    ("db", &["database"]),
    ("impl", &["implementation"]),
    ("init", &["initialize", "initialization"]),
    ("admin", &["administrator"]),
    ("repo", &["repository"]),
    ("env", &["environment"]),
    ("arg", &["argument"]),
    ("param", &["parameter"]),
    ("msg", &["message"]),
    ("req", &["request"]),
    ("res", &["response"]),
    ("ctx", &["context"]),
    ("err", &["error"]),
    ("util", &["utility"]),
    ("pkg", &["package"]),
    ("dir", &["directory"]),
    ("temp", &["temporary"]),
    ("calc", &["calculate", "calculation"]),
];

/// Fixed allowlist of variable-style abbreviations safe to reverse-map.
/// Deliberately small: an unrestricted reverse index would, e.g., expand
/// "user" to "udp" on a spurious substring match — spec.md §4.5 calls this
/// out explicitly as the failure mode to avoid.
const REVERSE_ALLOWLIST: &[(&str, &str)] = &[
    ("authentication", "auth"),
    ("authorization", "auth"),
    ("configuration", "config"),
    ("database", "db"),
    ("implementation", "impl"),
    ("initialize", "init"),
    ("initialization", "init"),
    ("repository", "repo"),
    ("environment", "env"),
    ("argument", "arg"),
    ("parameter", "param"),
    ("message", "msg"),
    ("request", "req"),
    ("response", "res"),
    ("context", "ctx"),
    ("error", "err"),
    ("utility", "util"),
    ("package", "pkg"),
    ("directory", "dir"),
    ("temporary", "temp"),
];

const DOMAIN_CLUSTERS: &[(&str, &[&str])] = &[
    ("get", &["fetch", "retrieve", "load", "read"]),
    ("set", &["put", "assign", "write"]),
    ("delete", &["remove", "destroy", "drop"]),
    ("create", &["make", "build", "new"]),
];

struct Dictionary {
    forward: HashMap<&'static str, &'static [&'static str]>,
    reverse: HashMap<&'static str, &'static str>,
    clusters: HashMap<&'static str, &'static [&'static str]>,
}

fn dictionary() -> &'static Dictionary {
    static DICT: OnceLock<Dictionary> = OnceLock::new();
    DICT.get_or_init(|| Dictionary {
        forward: FORWARD.iter().copied().collect(),
        reverse: REVERSE_ALLOWLIST.iter().copied().collect(),
        clusters: DOMAIN_CLUSTERS.iter().copied().collect(),
    })
}

/// Expands `term` (already lowercased by the caller's word-splitting pass)
/// into its known synonyms. `O(1)` per term once the dictionary's lazily
/// built reverse index exists.
pub fn expand(term: &str) -> Vec<String> {
    let dict = dictionary();
    let mut results = Vec::new();

    if let Some(synonyms) = dict.forward.get(term) {
        results.extend(synonyms.iter().map(|s| s.to_string()));
    }
    if let Some(abbrev) = dict.reverse.get(term) {
        results.push(abbrev.to_string());
    }
    if let Some(cluster) = dict.clusters.get(term) {
        results.extend(cluster.iter().map(|s| s.to_string()));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_abbreviation_expands() {
        assert!(expand("config").contains(&"configuration".to_string()));
    }

    #[test]
    fn reverse_allowlist_expands_back() {
        assert!(expand("authentication").contains(&"auth".to_string()));
    }

    #[test]
    fn unrelated_terms_do_not_spuriously_expand() {
        assert!(expand("user").is_empty());
    }

    #[test]
    fn domain_cluster_expands_related_verbs() {
        assert!(expand("get").contains(&"fetch".to_string()));
    }
}

//! Directory walker: `.gitignore`-aware traversal (via `ignore`/`walkdir`,
//! matching `codanna`'s `FileWalker`) plus a visited-real-path cycle guard
//! and component/full-path exclusion matching, per spec.md §4.2.

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Matches `path` against `patterns`: each pattern is tried as a glob
/// against every path component and against the full slash-normalized path;
/// a pattern that isn't valid glob syntax falls back to substring
/// containment, per spec.md §4.2.
pub fn is_excluded(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let normalized = path.to_string_lossy().replace('\\', "/");
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    patterns.iter().any(|pattern| {
        match glob_match(pattern, &normalized) {
            Some(matched) if matched => return true,
            Some(_) => {}
            None => return normalized.contains(pattern.as_str()),
        }
        components.iter().any(|component| match glob_match(pattern, component) {
            Some(matched) => matched,
            None => component.contains(pattern.as_str()),
        })
    })
}

/// Minimal glob matcher supporting `*` (any run of non-slash characters) and
/// `**` (any run of characters including slashes). Returns `None` if the
/// pattern contains no glob metacharacters, signaling "not a glob — use
/// substring fallback" per spec.md §4.2.
fn glob_match(pattern: &str, text: &str) -> Option<bool> {
    if !pattern.contains('*') && !pattern.contains('?') {
        return None;
    }
    Some(glob_match_inner(pattern.as_bytes(), text.as_bytes()))
}

fn glob_match_inner(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(b'*'), _) => {
            let rest = &pattern[1..];
            let double_star = rest.first() == Some(&b'*');
            let rest = if double_star { &rest[1..] } else { rest };
            for i in 0..=text.len() {
                if glob_match_inner(rest, &text[i..]) {
                    return true;
                }
                if !double_star && text.get(i) == Some(&b'/') {
                    break;
                }
            }
            false
        }
        (Some(b'?'), Some(_)) => glob_match_inner(&pattern[1..], &text[1..]),
        (Some(p), Some(t)) if p == t => glob_match_inner(&pattern[1..], &text[1..]),
        _ => false,
    }
}

/// Iterative `.gitignore`-aware walk rooted at `root`, honoring `exclude`
/// patterns in addition to VCS ignore files. Symlinked directories are
/// followed only if `follow_links` is set, and a visited-real-path set
/// prevents a symlink cycle from looping the scan forever regardless.
pub fn walk(root: &Path, exclude: &[String], follow_links: bool) -> Vec<PathBuf> {
    let mut overrides = OverrideBuilder::new(root);
    for pattern in exclude {
        // `ignore`'s override globs use `!` to mean "exclude"; passing our
        // patterns through is already exclusion-shaped, so negate them.
        let _ = overrides.add(&format!("!{pattern}"));
    }
    let overrides = overrides.build().unwrap_or_else(|_| {
        OverrideBuilder::new(root)
            .build()
            .expect("empty override set always builds")
    });

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(follow_links)
        .overrides(overrides)
        .build();

    let mut visited_real_paths = HashSet::new();
    let mut results = Vec::new();

    for entry in walker.flatten() {
        let path = entry.path();
        if let Ok(real) = path.canonicalize() {
            if !visited_real_paths.insert(real) {
                continue;
            }
        }
        if entry.file_type().is_some_and(|t| t.is_file()) && !is_excluded(path, exclude) {
            results.push(path.to_path_buf());
        }
    }

    results
}

/// Per-language test-file naming patterns used by [`find_test_files`], per
/// spec.md §9's open-question resolution: this is implemented rather than
/// left as a documented-but-empty stub.
fn candidate_test_names(base: &str, extension: &str) -> Vec<String> {
    match extension {
        "go" => vec![format!("{base}_test.go"), format!("test_{base}.go")],
        "py" => vec![format!("{base}_test.py"), format!("test_{base}.py"), format!("{base}_spec.py")],
        "js" | "jsx" => vec![format!("{base}.test.{extension}"), format!("{base}.spec.{extension}")],
        "ts" | "tsx" => vec![format!("{base}.test.{extension}"), format!("{base}.spec.{extension}")],
        "rs" => vec![format!("{base}_test.rs")],
        _ => Vec::new(),
    }
}

/// Finds files under `root` whose name matches one of `base`'s per-language
/// test-file conventions (spec.md §9). `extension` selects which pattern
/// family to try; `root` is searched non-recursively against the patterns'
/// literal file names via `candidates`.
pub fn find_test_files(candidates: &[PathBuf], base: &str, extension: &str) -> Vec<PathBuf> {
    let names: HashSet<String> = candidate_test_names(base, extension).into_iter().collect();
    candidates
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.contains(n))
        })
        .cloned()
        .collect()
}

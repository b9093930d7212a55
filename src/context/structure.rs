//! Structure-context section of `CodeObjectContext` (spec.md §4.7): file
//! location, imports/exports, type hierarchy, and composition-pattern
//! heuristics.

use crate::reference::ReferenceType;
use crate::symbol::Symbol;
use crate::tracker::ReferenceTracker;
use crate::types::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionPattern {
    DependencyInjection,
    Composition,
    Inheritance,
    Factory,
    Singleton,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEdge {
    pub module_path: CompactString,
    pub import_name: CompactString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub name: CompactString,
    pub cross_file_users: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureContext {
    pub file_path: String,
    pub module: String,
    pub package: String,
    pub imports: Vec<ImportEdge>,
    pub exports: Vec<ExportedSymbol>,
    pub implements: Vec<CompactString>,
    pub extends: Vec<CompactString>,
    pub composition_pattern: CompositionPattern,
}

/// Heuristic module name from a file path: the path without its extension,
/// using `/` components.
fn module_from_path(path: &str) -> String {
    path.rsplit_once('.')
        .map(|(stem, _ext)| stem.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Basename of the parent directory.
fn package_from_path(path: &str) -> String {
    let parent = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    parent.rsplit('/').next().unwrap_or("").to_string()
}

fn has_any_field(tracker: &ReferenceTracker, symbol: &Symbol) -> bool {
    tracker.symbols_in_file(symbol.file_id).iter().any(|candidate| {
        candidate.kind == crate::types::SymbolKind::Field
            && candidate
                .scope_chain
                .iter()
                .any(|s| s.name == symbol.name)
    })
}

fn detect_composition_pattern(tracker: &ReferenceTracker, symbol: &Symbol) -> CompositionPattern {
    const SINGLETON_NAMES: &[&str] =
        &["Instance", "GetInstance", "Shared", "GetShared", "GetSingleton", "Singleton"];

    if SINGLETON_NAMES.contains(&symbol.name.as_ref()) {
        return CompositionPattern::Singleton;
    }
    if symbol.kind.is_callable()
        && (symbol.name.starts_with("Create") || symbol.name.starts_with("Make") || symbol.name.starts_with("Build"))
    {
        return CompositionPattern::Factory;
    }
    if symbol.kind.is_callable() && symbol.name.starts_with("New") && symbol.parameter_count >= 1 {
        return CompositionPattern::DependencyInjection;
    }
    let has_inheritance_ref = symbol
        .outgoing_refs
        .iter()
        .any(|r| matches!(r.reference_type, ReferenceType::Inheritance | ReferenceType::Extends));
    if matches!(symbol.kind, crate::types::SymbolKind::Struct) && has_inheritance_ref {
        return CompositionPattern::Inheritance;
    }
    if matches!(symbol.kind, crate::types::SymbolKind::Struct) && has_any_field(tracker, symbol) {
        return CompositionPattern::Composition;
    }
    CompositionPattern::None
}

pub fn build(tracker: &ReferenceTracker, symbol: &Symbol, file_path: Option<String>) -> StructureContext {
    let file_path = file_path.unwrap_or_default();
    let module = module_from_path(&file_path);
    let package = package_from_path(&file_path);

    let mut seen_imports = HashSet::new();
    let imports: Vec<ImportEdge> = symbol
        .outgoing_refs
        .iter()
        .filter(|r| r.reference_type == ReferenceType::Import)
        .filter_map(|r| {
            let key = (file_path.clone(), r.referenced_name.to_string());
            seen_imports.insert(key).then(|| ImportEdge {
                module_path: file_path.clone().into(),
                import_name: r.referenced_name.clone(),
            })
        })
        .collect();

    let exports: Vec<ExportedSymbol> = tracker
        .symbols_in_file(symbol.file_id)
        .into_iter()
        .filter(|s| s.is_exported)
        .map(|s| {
            let cross_file_users = s
                .incoming_refs
                .iter()
                .filter(|r| r.file_id != s.file_id)
                .count() as u32;
            ExportedSymbol { name: s.name, cross_file_users }
        })
        .collect();

    let implements: Vec<CompactString> = symbol
        .outgoing_refs
        .iter()
        .filter(|r| r.reference_type == ReferenceType::Implements)
        .map(|r| r.referenced_name.clone())
        .collect();
    let extends: Vec<CompactString> = symbol
        .outgoing_refs
        .iter()
        .filter(|r| matches!(r.reference_type, ReferenceType::Inheritance | ReferenceType::Extends))
        .map(|r| r.referenced_name.clone())
        .collect();

    StructureContext {
        file_path,
        module,
        package,
        imports,
        exports,
        implements,
        extends,
        composition_pattern: detect_composition_pattern(tracker, symbol),
    }
}

//! Usage-analysis section of `CodeObjectContext` (spec.md §4.7).

use crate::context::relationships::RelatedObject;
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakingChangeRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageAnalysis {
    pub call_frequency: u64,
    pub fan_in: u32,
    pub fan_out: u32,
    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    pub nesting_depth: u32,
    pub line_count: u32,
    pub parameter_count: u32,
    pub breaking_change_risk: BreakingChangeRisk,
    pub impact_score: u32,
    pub is_public_api: bool,
}

/// Name-based multiplier applied to the outgoing-call count for
/// `CallFrequency` (spec.md §4.7): x10 for `main`/`handler`/`serve`, x3 for
/// `util`/`helper`, /2 for `test`/`spec`, else unchanged.
fn frequency_multiplier(name: &str) -> f64 {
    let lower = name.to_lowercase();
    if ["main", "handler", "serve"].iter().any(|kw| lower.contains(kw)) {
        10.0
    } else if ["util", "helper"].iter().any(|kw| lower.contains(kw)) {
        3.0
    } else if ["test", "spec"].iter().any(|kw| lower.contains(kw)) {
        0.5
    } else {
        1.0
    }
}

fn unique_by_name_and_file(objects: &[RelatedObject]) -> u32 {
    objects
        .iter()
        .map(|o| (o.name.clone(), o.file_id))
        .collect::<HashSet<_>>()
        .len() as u32
}

pub fn analyze(symbol: &Symbol, callers: &[RelatedObject], callees: &[RelatedObject]) -> UsageAnalysis {
    let base_call_count = callees.len() as f64;
    let call_frequency = (base_call_count * frequency_multiplier(&symbol.name)).round() as u64;

    let fan_in = unique_by_name_and_file(callers);
    let fan_out = unique_by_name_and_file(callees);

    let cyclomatic = symbol.complexity.max(1);
    let cognitive = cyclomatic;
    let nesting_depth = (cyclomatic / 2).max(1);

    let max_fan = fan_in.max(fan_out);
    let breaking_change_risk = if max_fan > 10 {
        BreakingChangeRisk::High
    } else if max_fan > 3 {
        BreakingChangeRisk::Medium
    } else {
        BreakingChangeRisk::Low
    };

    let is_public_api = symbol.looks_like_public_api();
    let impact_score = {
        let mut score = 1.0
            + (fan_in as f64 / 2.0).min(5.0)
            + (fan_out as f64 / 2.0).min(3.0)
            + if cyclomatic > 10 { 2.0 } else { 0.0 }
            + if is_public_api { 2.0 } else { 0.0 };
        score = score.min(10.0);
        score as u32
    };

    UsageAnalysis {
        call_frequency,
        fan_in,
        fan_out,
        cyclomatic_complexity: cyclomatic,
        cognitive_complexity: cognitive,
        nesting_depth,
        line_count: symbol.range.line_count(),
        parameter_count: symbol.parameter_count,
        breaking_change_risk,
        impact_score,
        is_public_api,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceType;
    use crate::types::{FileId, Range, SymbolId, SymbolKind};

    fn related(name: &str, file: u32) -> RelatedObject {
        RelatedObject {
            symbol_id: SymbolId::new(1).unwrap(),
            file_id: FileId::new(file).unwrap(),
            name: name.into(),
            kind: SymbolKind::Function,
            reference_type: ReferenceType::Call,
            confidence: 0.95,
        }
    }

    fn symbol(name: &str, complexity: u32) -> Symbol {
        let mut s = Symbol::new(SymbolId::new(1).unwrap(), FileId::new(1).unwrap(), name, SymbolKind::Function, Range::new(1, 0, 20, 0));
        s.complexity = complexity;
        s
    }

    #[test]
    fn handler_name_multiplies_call_frequency_by_ten() {
        let s = symbol("httpHandler", 1);
        let callees = vec![related("a", 1)];
        let analysis = analyze(&s, &[], &callees);
        assert_eq!(analysis.call_frequency, 10);
    }

    #[test]
    fn test_named_function_halves_call_frequency() {
        let s = symbol("test_something", 1);
        let callees = vec![related("a", 1), related("b", 1)];
        let analysis = analyze(&s, &[], &callees);
        assert_eq!(analysis.call_frequency, 1);
    }

    #[test]
    fn breaking_change_risk_thresholds() {
        let s = symbol("f", 1);
        let many_callers: Vec<RelatedObject> = (0..11).map(|i| related(&format!("c{i}"), 1)).collect();
        let analysis = analyze(&s, &many_callers, &[]);
        assert_eq!(analysis.breaking_change_risk, BreakingChangeRisk::High);
    }

    #[test]
    fn impact_score_is_capped_at_ten() {
        let s = symbol("PublicThing", 20);
        let many: Vec<RelatedObject> = (0..30).map(|i| related(&format!("c{i}"), 1)).collect();
        let analysis = analyze(&s, &many, &many);
        assert_eq!(analysis.impact_score, 10);
    }

    #[test]
    fn is_public_api_requires_uppercase_first_char() {
        let public = symbol("PublicThing", 1);
        let private = symbol("privateThing", 1);
        assert!(analyze(&public, &[], &[]).is_public_api);
        assert!(!analyze(&private, &[], &[]).is_public_api);
    }
}

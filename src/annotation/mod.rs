//! The `@lci:` structured annotation parser (spec.md §4.4).
//!
//! The directive regex is compiled once behind a `std::sync::OnceLock`, the
//! idiomatic replacement for `lazy_static` and the same lazy-guarded pattern
//! the teacher uses for its own process-wide registries (e.g.
//! `parsing/language.rs`'s `get_registry()`).

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"@lci:([A-Za-z][A-Za-z0-9_-]*)\[([^\]]*)\]").expect("static pattern is valid")
    })
}

/// Typed scalar value for `metrics[...]`/`attr[...]`, chosen by trying
/// int → float → bool → JSON → string in that order (spec.md §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(serde_json::Value),
    String(String),
}

fn parse_metric_value(raw: &str) -> MetricValue {
    if let Ok(i) = raw.parse::<i64>() {
        return MetricValue::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return MetricValue::Float(f);
    }
    match raw {
        "true" => return MetricValue::Bool(true),
        "false" => return MetricValue::Bool(false),
        _ => {}
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(raw) {
        return MetricValue::Json(json);
    }
    MetricValue::String(raw.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub dep_type: String,
    pub name: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationRule {
    pub attribute: String,
    pub direction: String,
    pub decay: f64,
    pub max_hops: u32,
    pub aggregation: String,
    pub condition: Option<String>,
}

const VALID_CALL_FREQUENCIES: &[&str] = &["rare", "occasional", "frequent", "hot"];

/// Structured record parsed from the `@lci:` directives preceding one
/// symbol. Unrecognized directive names are ignored, not an error (spec.md
/// §6: "reject unknown names without aborting").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub labels: Vec<String>,
    pub category: Option<String>,
    pub deps: Vec<Dependency>,
    pub provides: Vec<String>,
    pub tags: HashMap<String, String>,
    pub metrics: HashMap<String, MetricValue>,
    pub attr: HashMap<String, MetricValue>,
    pub propagate: Vec<PropagationRule>,
    pub excludes: Vec<String>,
    pub loop_weight: Option<f64>,
    pub loop_bounded: Option<u32>,
    pub call_frequency: Option<String>,
    pub propagation_weight: Option<f64>,
}

impl Annotation {
    /// `true` when `excludes` contains, case-insensitively, either `kind` or
    /// `"all"` (spec.md §4.4).
    pub fn is_excluded_from_analysis(&self, kind: &str) -> bool {
        self.excludes
            .iter()
            .any(|e| e.eq_ignore_ascii_case(kind) || e.eq_ignore_ascii_case("all"))
    }
}

fn split_list(payload: &str) -> Vec<String> {
    payload
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_kv_list(payload: &str) -> Vec<(String, String)> {
    payload
        .split(',')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            let (k, v) = pair.split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

/// Maximum number of lines the annotator looks back from a symbol's start
/// line for its preceding comment block (spec.md §4.4).
const MAX_LINES_BACK: usize = 10;

/// Collects the comment lines immediately preceding `symbol_line` (a
/// 1-indexed line number into `lines`), stopping at the first non-comment
/// line or after `MAX_LINES_BACK` lines, whichever comes first. Returned in
/// file order (oldest first), ready to pass to [`parse_comment_block`].
pub fn preceding_comment_lines<'a>(lines: &[&'a str], symbol_line: u32) -> Vec<&'a str> {
    let mut collected = Vec::new();
    if symbol_line < 2 {
        return collected;
    }

    let mut idx = (symbol_line - 2) as usize;
    loop {
        if collected.len() >= MAX_LINES_BACK {
            break;
        }
        let Some(line) = lines.get(idx) else { break };
        if !line.trim_start().starts_with("//") {
            break;
        }
        collected.push(*line);
        if idx == 0 {
            break;
        }
        idx -= 1;
    }

    collected.reverse();
    collected
}

/// Scans the up-to-`max_lines_back` comment lines immediately preceding a
/// symbol (already isolated by the caller — this function does not itself
/// locate comment boundaries) and parses every recognized `@lci:` directive
/// found.
pub fn parse_comment_block(comment_lines: &[&str]) -> Annotation {
    let mut annotation = Annotation::default();
    let re = directive_regex();

    for line in comment_lines {
        for caps in re.captures_iter(line) {
            let name = &caps[1];
            let payload = &caps[2];
            apply_directive(&mut annotation, name, payload);
        }
    }

    annotation
}

fn apply_directive(annotation: &mut Annotation, name: &str, payload: &str) {
    match name {
        "labels" => annotation.labels.extend(split_list(payload)),
        "category" => {
            if let Some(value) = split_list(payload).into_iter().next() {
                annotation.category = Some(value);
            }
        }
        "deps" => {
            for entry in split_list(payload) {
                let parts: Vec<&str> = entry.split(':').collect();
                let (dep_type, name) = match parts.as_slice() {
                    [t, n] => (t.to_string(), n.to_string()),
                    [n] => ("service".to_string(), n.to_string()),
                    [t, n, ..] => (t.to_string(), n.to_string()),
                    [] => continue,
                };
                let mode = match parts.as_slice() {
                    [_, _, m, ..] => m.to_string(),
                    _ => "read-write".to_string(),
                };
                annotation.deps.push(Dependency { dep_type, name, mode });
            }
        }
        "provides" => annotation.provides.extend(split_list(payload)),
        "tags" => {
            for (k, v) in split_kv_list(payload) {
                annotation.tags.insert(k, v);
            }
        }
        "metrics" => {
            for (k, v) in split_kv_list(payload) {
                annotation.metrics.insert(k, parse_metric_value(&v));
            }
        }
        "attr" => {
            for (k, v) in split_kv_list(payload) {
                annotation.attr.insert(k, parse_metric_value(&v));
            }
        }
        "propagate" => {
            let fields: HashMap<String, String> = split_kv_list(payload).into_iter().collect();
            let attribute = fields.get("attribute").cloned();
            let direction = fields.get("direction").cloned();
            if let (Some(attribute), Some(direction)) = (attribute, direction) {
                annotation.propagate.push(PropagationRule {
                    attribute,
                    direction,
                    decay: fields
                        .get("decay")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0.8),
                    max_hops: fields
                        .get("max_hops")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(3),
                    aggregation: fields
                        .get("aggregation")
                        .cloned()
                        .unwrap_or_else(|| "unique".to_string()),
                    condition: fields.get("condition").cloned(),
                });
            }
        }
        "exclude" => annotation.excludes.extend(split_list(payload)),
        "loop-weight" => {
            if let Some(v) = parse_non_negative_float(payload) {
                annotation.loop_weight = Some(v);
            }
        }
        "loop-bounded" => {
            if let Ok(v) = payload.trim().parse::<u32>() {
                annotation.loop_bounded = Some(v);
            }
        }
        "call-frequency" => {
            let value = payload.trim().to_lowercase();
            if VALID_CALL_FREQUENCIES.contains(&value.as_str()) {
                annotation.call_frequency = Some(value);
            }
            // invalid enum values are silently ignored, per spec.md §4.4
        }
        "propagation-weight" => {
            if let Some(v) = parse_non_negative_float(payload) {
                annotation.propagation_weight = Some(v.clamp(0.0, 1.0));
            }
        }
        _ => {}
    }
}

/// Negative numbers do not match the integer/float regex and are treated as
/// absent, per spec.md §4.4.
fn parse_non_negative_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

//! End-to-end join across the content store, reference tracker, and context
//! lookup engine: a loaded file's bytes, its parsed symbols/references, and
//! the assembled `CodeObjectContext` must all agree (spec.md §4.7, §8
//! invariant 3).

use codanna_lci::{ContentStore, ObjectId, ReferenceTracker};
use codanna_lci::context::ContextLookupEngine;
use codanna_lci::parser::{ParsedFile, RawReference, RawSymbol};
use codanna_lci::reference::ReferenceType;
use codanna_lci::types::SymbolKind;
use std::sync::Arc;

fn raw(name: &str, kind: SymbolKind, line: u32, end_line: u32) -> RawSymbol {
    RawSymbol {
        name: name.into(),
        kind,
        line,
        end_line,
        column: 0,
        end_column: 0,
        signature: Some(format!("fn {name}()").into()),
        doc_comment: None,
        complexity: 1,
        parameter_count: 0,
        visibility: Some(true),
    }
}

#[test]
fn loaded_file_bytes_and_context_agree_on_the_indexed_symbol() {
    let store = Arc::new(ContentStore::new());
    let tracker = Arc::new(ReferenceTracker::new());

    let source = b"fn caller() {\n    callee();\n}\n\nfn callee() {}\n".to_vec();
    let file_id = store.load_file("src/lib.rs", source.clone());

    let (bytes, _) = store.get_content(file_id);
    assert_eq!(bytes, source, "content store must return exactly what was loaded");
    assert_eq!(store.get_path(file_id).as_deref(), Some("src/lib.rs"));

    let parsed = ParsedFile {
        symbols: vec![
            raw("caller", SymbolKind::Function, 1, 3),
            raw("callee", SymbolKind::Function, 5, 5),
        ],
        scopes: vec![],
        references: vec![(
            0,
            vec![RawReference {
                reference_type: ReferenceType::Call,
                referenced_name: "callee".into(),
                line: 2,
                column: 4,
            }],
        )],
    };
    let ids = tracker.process_file(file_id, "src/lib.rs", parsed);
    tracker.process_all_references();

    // Invariant 3: every outgoing ref has a matching incoming ref.
    let caller = tracker.get_symbol(ids[0]).unwrap();
    let callee = tracker.get_symbol(ids[1]).unwrap();
    assert_eq!(caller.outgoing_refs.len(), 1);
    assert_eq!(callee.incoming_refs.len(), 1);
    assert_eq!(caller.outgoing_refs[0].referenced_name, callee.name);

    let engine = ContextLookupEngine::new(Arc::clone(&tracker), Arc::clone(&store));
    let object_id = ObjectId::new(file_id, ids[0], "caller", SymbolKind::Function);
    let context = engine.get_context(&object_id).unwrap();

    assert_eq!(context.basic_info.name.as_ref(), "caller");
    assert_eq!(context.direct_relationships.callees.len(), 1);
    assert_eq!(context.direct_relationships.callees[0].name.as_ref(), "callee");
    assert_eq!(context.usage_analysis.fan_out, 1);
}

use pretty_assertions::assert_eq;
use templar_trace::parser::{ParsedTrace, TraceReader};
use templar_trace::tree::{walk_tree, EntryRef, EntryVisitor};

/// A[B[C], D]
fn abcd() -> ParsedTrace {
    let xml = r#"<Trace>
<TemplateBegin><Context context="A"/></TemplateBegin>
<TemplateBegin><Context context="B"/></TemplateBegin>
<TemplateBegin><Context context="C"/></TemplateBegin>
<TemplateEnd/>
<TemplateEnd/>
<TemplateBegin><Context context="D"/></TemplateBegin>
<TemplateEnd/>
<TemplateEnd/>
</Trace>"#;
    TraceReader::new("/").read(xml.as_bytes()).unwrap()
}

fn contexts<'a>(entries: impl Iterator<Item = EntryRef<'a>>) -> Vec<&'a str> {
    entries.map(|entry| entry.entry().context.as_str()).collect()
}

#[test]
fn test_depth_first_order() {
    let parsed = abcd();
    assert_eq!(contexts(parsed.tree.depth_first()), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_iterator_reaches_end_after_last_entry() {
    let parsed = abcd();
    let mut iter = parsed.tree.depth_first();

    for _ in 0..3 {
        iter.next().unwrap();
    }
    assert_eq!(iter.current().unwrap().context, "D");
    assert_eq!(iter.next().unwrap().context, "D");
    assert!(iter.is_end());
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn test_traversal_is_restartable() {
    let parsed = abcd();
    let first = contexts(parsed.tree.depth_first());
    let second = contexts(parsed.tree.depth_first());
    assert_eq!(first, second);
}

#[test]
fn test_iterator_equality_is_current_node_identity() {
    let parsed = abcd();
    let root = parsed.tree.root();

    let mut a = root.depth_first();
    let mut b = root.depth_first();
    assert!(a == b);

    a.next();
    assert!(a != b);
    b.next();
    assert!(a == b);

    // Different starting points that land on the same node compare equal
    let c = parsed.tree.root().child(0).unwrap().depth_first();
    assert!(a == c);

    a.by_ref().for_each(drop);
    let mut d = parsed.tree.root().child(1).unwrap().depth_first();
    d.next();
    assert!(a == d);
}

#[test]
fn test_subtree_traversal_stops_at_its_root() {
    let parsed = abcd();
    let b = parsed.tree.root().child(0).unwrap();

    assert_eq!(contexts(b.depth_first()), vec!["B", "C"]);

    let c = b.child(0).unwrap();
    assert_eq!(contexts(c.depth_first()), vec!["C"]);
}

#[test]
fn test_deep_chain_traverses_without_recursion() {
    let depth = 5_000;
    let mut xml = String::from("<Trace>");
    for i in 0..depth {
        xml.push_str(&format!(
            r#"<TemplateBegin><Context context="n{}"/></TemplateBegin>"#,
            i
        ));
    }
    for _ in 0..depth {
        xml.push_str("<TemplateEnd/>");
    }
    xml.push_str("</Trace>");

    let parsed = TraceReader::new("/").read(xml.as_bytes()).unwrap();
    assert_eq!(parsed.tree.depth_first().count(), depth);

    let deepest = parsed.tree.depth_first().last().unwrap();
    assert_eq!(deepest.context, format!("n{}", depth - 1));
    assert_eq!(deepest.depth(), depth - 1);
}

struct DepthRecorder {
    depths: Vec<(String, usize)>,
}

impl EntryVisitor for DepthRecorder {
    type State = usize;

    fn visit(&mut self, depth: &usize, parent: EntryRef<'_>, child: EntryRef<'_>) -> usize {
        assert_eq!(child.parent().unwrap(), parent);
        self.depths.push((child.context.clone(), depth + 1));
        depth + 1
    }
}

#[test]
fn test_walker_matches_depth_first_order() {
    let parsed = abcd();
    let mut recorder = DepthRecorder { depths: Vec::new() };

    walk_tree(parsed.tree.root(), 0, &mut recorder);

    assert_eq!(
        recorder.depths,
        vec![
            ("B".to_string(), 1),
            ("C".to_string(), 2),
            ("D".to_string(), 1),
        ]
    );
}

//! Property-based tests for query evaluation.
use mql_lang::{Engine, LexerOptions, RuntimeValue};
use mql_markdown::{Heading, Node};
use proptest::prelude::*;

mod strategies {
    use super::*;

    pub fn word() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9]{0,8}"
    }

    pub fn heading() -> impl Strategy<Value = (u8, String)> {
        (1u8..=6, word())
    }

    pub fn document() -> impl Strategy<Value = Vec<(u8, String)>> {
        prop::collection::vec(heading(), 0..12)
    }
}

fn build(headings: &[(u8, String)]) -> Node {
    Node::root(
        headings
            .iter()
            .map(|(depth, text)| Node::Heading(Heading::new(*depth, vec![text.as_str().into()])))
            .collect(),
    )
}

fn texts(values: Vec<RuntimeValue<'_>>) -> Vec<String> {
    values.iter().map(RuntimeValue::to_text).collect()
}

proptest! {
    #[test]
    fn headings_keep_document_order(headings in strategies::document()) {
        let root = build(&headings);
        let values = Engine::default()
            .eval(".h | to_text", RuntimeValue::sequence_from(&root))
            .unwrap();

        let expected = headings.iter().map(|(_, text)| text.clone()).collect::<Vec<_>>();
        prop_assert_eq!(texts(values), expected);
    }

    #[test]
    fn depth_filter_matches_level_selector(headings in strategies::document(), depth in 1u8..=6) {
        let root = build(&headings);
        let engine = Engine::default();

        let by_selector = engine
            .eval(&format!(".h{depth}"), RuntimeValue::sequence_from(&root))
            .unwrap();
        let by_filter = engine
            .eval(&format!(".h | select(.depth == {depth})"), RuntimeValue::sequence_from(&root))
            .unwrap();

        prop_assert_eq!(by_selector, by_filter);
    }

    #[test]
    fn select_never_adds_values(headings in strategies::document(), needle in strategies::word()) {
        let root = build(&headings);
        let engine = Engine::default();
        let all = engine.eval(".h", RuntimeValue::sequence_from(&root)).unwrap();
        let selected = engine
            .eval(&format!(".h | select(contains({needle:?}))"), RuntimeValue::sequence_from(&root))
            .unwrap();

        prop_assert!(selected.len() <= all.len());
        prop_assert!(selected.iter().all(|v| all.contains(v)));
    }

    #[test]
    fn tokenize_never_panics(code in "\\PC{0,40}") {
        let _ = mql_lang::tokenize(&code, LexerOptions::default());
    }

    #[test]
    fn compile_never_panics(code in "[.a-z0-9|()\\[\\]\" ,=!<>&+-]{0,30}") {
        let _ = Engine::default().compile(&code);
    }

    #[test]
    fn compile_never_panics_on_deep_nesting(
        depth in 0usize..5_000,
        open in prop_oneof![Just("("), Just("!"), Just("-"), Just("not(")],
    ) {
        let close = if open.ends_with('(') { ")" } else { "" };
        let code = format!("{}.h1{}", open.repeat(depth), close.repeat(depth));
        let _ = Engine::default().compile(&code);
    }
}

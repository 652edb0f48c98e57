pub mod builtin;
pub mod error;
pub mod runtime_value;

use error::EvalError;
use mql_markdown::Node;
use runtime_value::{NodeRef, RuntimeValue};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::{
    ast::node::Literal,
    compiler::{Call, Pipeline, Stage},
    lexer::token::Token,
    selector::{AttrKind, Selector},
};

#[derive(Debug, Clone)]
pub struct Options {
    /// Drop `None` values between stages.
    pub filter_none: bool,
    pub max_call_stack_depth: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            filter_none: true,
            max_call_stack_depth: 256,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    pub(crate) options: Options,
}

impl Evaluator {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(stages = pipeline.len(), input = input.len()))]
    pub fn eval<'a>(
        &self,
        pipeline: &Pipeline,
        input: Vec<RuntimeValue<'a>>,
    ) -> Result<Vec<RuntimeValue<'a>>, EvalError> {
        let values = self.eval_pipeline(pipeline, input, 0)?;
        tracing::debug!(output = values.len(), "pipeline evaluated");
        Ok(values)
    }

    fn eval_pipeline<'a>(
        &self,
        pipeline: &Pipeline,
        input: Vec<RuntimeValue<'a>>,
        depth: u32,
    ) -> Result<Vec<RuntimeValue<'a>>, EvalError> {
        if depth > self.options.max_call_stack_depth {
            return Err(EvalError::RecursionError(self.options.max_call_stack_depth));
        }

        pipeline.stages.iter().try_fold(input, |values, stage| {
            let mut values = self.eval_stage(stage, values, depth)?;

            if self.options.filter_none {
                values.retain(|value| !value.is_none());
            }

            tracing::trace!(%stage, count = values.len(), "stage evaluated");
            Ok(values)
        })
    }

    fn eval_stage<'a>(
        &self,
        stage: &Stage,
        values: Vec<RuntimeValue<'a>>,
        depth: u32,
    ) -> Result<Vec<RuntimeValue<'a>>, EvalError> {
        match stage {
            Stage::Identity => Ok(values),
            Stage::Literal(literal) => Ok(values.iter().map(|_| literal_value(literal)).collect()),
            Stage::Selector(selector, token) => {
                let mut out = Vec::new();
                for value in &values {
                    select_nodes(value, selector, token, &mut out)?;
                }

                // Overlapping inputs (a node and one of its ancestors) select the same node twice.
                let mut seen = FxHashSet::default();
                out.retain(|value| match value {
                    RuntimeValue::Markdown(node) => seen.insert(node.path.clone()),
                    _ => true,
                });
                Ok(out)
            }
            Stage::Attribute(attr, token) => values
                .iter()
                .map(|value| read_attr(value, *attr, token))
                .collect(),
            Stage::Iterate(index, token) => {
                let mut out = Vec::new();
                for value in values {
                    iterate(value, *index, token, &mut out)?;
                }
                Ok(out)
            }
            Stage::Filter(predicate) => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    if self.eval_arg(predicate, &value, depth + 1)?.is_truthy() {
                        out.push(value);
                    }
                }
                Ok(out)
            }
            Stage::Call(call) => values
                .iter()
                .map(|value| self.eval_call(call, value, depth))
                .collect(),
            Stage::Group(pipeline) => {
                let mut out = Vec::new();
                for value in values {
                    out.extend(self.eval_pipeline(pipeline, vec![value], depth + 1)?);
                }
                Ok(out)
            }
        }
    }

    fn eval_call<'a>(
        &self,
        call: &Call,
        value: &RuntimeValue<'a>,
        depth: u32,
    ) -> Result<RuntimeValue<'a>, EvalError> {
        let mut args = Vec::with_capacity(call.args.len() + 1);
        if call.implicit_self {
            args.push(value.clone());
        }
        for arg in &call.args {
            args.push(self.eval_arg(arg, value, depth + 1)?);
        }

        builtin::eval_builtin(call.builtin, &call.ident, &args)
    }

    /// Runs an argument pipeline against a single value and collapses its results.
    fn eval_arg<'a>(
        &self,
        pipeline: &Pipeline,
        value: &RuntimeValue<'a>,
        depth: u32,
    ) -> Result<RuntimeValue<'a>, EvalError> {
        let mut values = self.eval_pipeline(pipeline, vec![value.clone()], depth)?;

        Ok(match values.len() {
            0 => RuntimeValue::None,
            1 => values.remove(0),
            _ => RuntimeValue::Array(values),
        })
    }
}

fn literal_value<'a>(literal: &Literal) -> RuntimeValue<'a> {
    match literal {
        Literal::String(s) => RuntimeValue::String(s.clone()),
        Literal::Number(n) => RuntimeValue::Number(*n),
        Literal::Bool(b) => RuntimeValue::Bool(*b),
        Literal::None => RuntimeValue::None,
    }
}

fn invalid_stage_input(stage: impl ToString, token: &Token, value: &RuntimeValue<'_>) -> EvalError {
    EvalError::InvalidStageInput {
        token: token.clone(),
        stage: SmolStr::new(stage.to_string()),
        value_type: SmolStr::new(value.name()),
    }
}

fn select_nodes<'a>(
    value: &RuntimeValue<'a>,
    selector: &Selector,
    token: &Token,
    out: &mut Vec<RuntimeValue<'a>>,
) -> Result<(), EvalError> {
    match value {
        RuntimeValue::Markdown(node) => {
            out.extend(
                node.descendants()
                    .filter(|n| selector.matches(n.node))
                    .map(RuntimeValue::Markdown),
            );
            Ok(())
        }
        RuntimeValue::Array(values) => {
            for value in values {
                select_nodes(value, selector, token, out)?;
            }
            Ok(())
        }
        RuntimeValue::None => Ok(()),
        value => Err(invalid_stage_input(selector, token, value)),
    }
}

fn read_attr<'a>(
    value: &RuntimeValue<'a>,
    attr: AttrKind,
    token: &Token,
) -> Result<RuntimeValue<'a>, EvalError> {
    match value {
        RuntimeValue::Markdown(node) => Ok(node.attr(attr)),
        RuntimeValue::Array(values) => values
            .iter()
            .map(|value| read_attr(value, attr, token))
            .collect::<Result<Vec<_>, _>>()
            .map(RuntimeValue::Array),
        RuntimeValue::None => Ok(RuntimeValue::None),
        value => Err(invalid_stage_input(attr, token, value)),
    }
}

fn iterate<'a>(
    value: RuntimeValue<'a>,
    index: Option<usize>,
    token: &Token,
    out: &mut Vec<RuntimeValue<'a>>,
) -> Result<(), EvalError> {
    match value {
        RuntimeValue::Markdown(node) => {
            out.extend(
                list_elements(&node)
                    .into_iter()
                    .filter(|item| index.is_none_or(|i| item_index(item.node) == Some(i)))
                    .map(RuntimeValue::Markdown),
            );
            Ok(())
        }
        RuntimeValue::Array(values) => {
            match index {
                None => out.extend(values),
                Some(i) => out.extend(values.into_iter().nth(i)),
            }
            Ok(())
        }
        RuntimeValue::None => Ok(()),
        value => {
            let stage = index.map_or_else(|| ".[]".to_string(), |i| format!(".[{}]", i));
            Err(invalid_stage_input(stage, token, &value))
        }
    }
}

/// The list elements a node holds.
///
/// Lists are flattened into runs of sibling items, so a list item is itself one
/// element of its list and a block container holds the items among its direct
/// children. Headings, paragraphs and inline nodes hold no list elements.
fn list_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    match node.node {
        Node::ListItem(_) => vec![node.clone()],
        parent => parent
            .children()
            .iter()
            .enumerate()
            .filter(|(_, child)| matches!(child, Node::ListItem(_)))
            .map(|(i, child)| NodeRef::new(child, node.path.child(i)))
            .collect(),
    }
}

fn item_index(node: &Node) -> Option<usize> {
    match node {
        Node::ListItem(item) => Some(item.index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parser::Parser;
    use crate::compiler::Compiler;
    use crate::lexer::{self, Lexer};
    use crate::number::Number;
    use crate::Shared;
    use mql_markdown::{Blockquote, Heading, ListItem, Path};
    use rstest::rstest;

    fn compile(code: &str) -> Pipeline {
        let tokens = Lexer::new(lexer::Options::default())
            .tokenize(code)
            .unwrap()
            .into_iter()
            .map(Shared::new)
            .collect::<Vec<_>>();
        let program = Parser::new(tokens.iter()).parse().unwrap();
        Compiler::new().compile(&program).unwrap()
    }

    fn item(text: &str, index: usize) -> Node {
        Node::ListItem(ListItem {
            values: vec![text.into()],
            ordered: false,
            index,
            level: 0,
            checked: None,
        })
    }

    fn document() -> Node {
        Node::root(vec![
            Node::Heading(Heading::new(1, vec!["Title".into()])),
            Node::paragraph(vec!["Some text".into()]),
            Node::Heading(Heading::new(2, vec!["Features".into()])),
            item("Item 1", 0),
            item("Item 2", 1),
            Node::Heading(Heading::new(2, vec!["Usage".into()])),
        ])
    }

    fn run(code: &str, root: &Node) -> Result<Vec<String>, EvalError> {
        Evaluator::default()
            .eval(&compile(code), RuntimeValue::sequence_from(root))
            .map(|values| values.iter().map(|v| v.to_string()).collect())
    }

    #[rstest]
    #[case::h1(".h1", vec!["# Title"])]
    #[case::h2(".h2", vec!["## Features", "## Usage"])]
    #[case::select_contains(".h2 | select(contains(\"Feature\"))", vec!["## Features"])]
    #[case::iterate(".[]", vec!["- Item 1", "- Item 2"])]
    #[case::index(".[1]", vec!["- Item 2"])]
    #[case::index_out_of_range(".[9]", vec![])]
    #[case::heading_holds_no_list(".h1 | .[]", vec![])]
    #[case::attribute(".h | .depth", vec!["1", "2", "2"])]
    #[case::attribute_filter(".h | select(.depth == 2) | to_text", vec!["Features", "Usage"])]
    #[case::none_dropped(".h | .lang", vec![])]
    #[case::negation(".h | select(!contains(\"Title\")) | upcase", vec!["FEATURES", "USAGE"])]
    #[case::literal_per_value(".h1 | \"x\"", vec!["x"])]
    #[case::group(".h1 | (to_text | len)", vec!["5"])]
    #[case::identity(". | .p", vec!["Some text"])]
    #[case::array_iterate(".h2 | to_text | split(\"a\") | .[]", vec!["Fe", "tures", "Us", "ge"])]
    #[case::array_index("\"a,b,c\" | split(\",\") | .[2]", vec!["c", "c", "c", "c", "c", "c"])]
    fn test_eval(#[case] code: &str, #[case] expected: Vec<&str>) {
        assert_eq!(run(code, &document()).unwrap(), expected);
    }

    #[test]
    fn test_eval_keeps_none_when_not_filtered() {
        let root = document();
        let values = Evaluator::new(Options {
            filter_none: false,
            ..Default::default()
        })
        .eval(&compile(".h1 | .lang"), RuntimeValue::sequence_from(&root))
        .unwrap();

        assert_eq!(values, vec![RuntimeValue::None]);
    }

    #[test]
    fn test_eval_selector_on_scalar() {
        let root = document();
        let err = run(".h1 | to_text | .h", &root).unwrap_err();

        assert!(matches!(
            err,
            EvalError::InvalidStageInput { stage, value_type, .. } if stage == ".h" && value_type == "string"
        ));
    }

    #[test]
    fn test_eval_recursion_limit() {
        let root = document();
        let err = Evaluator::new(Options {
            filter_none: true,
            max_call_stack_depth: 2,
        })
        .eval(
            &compile(".h1 | select(contains(upcase(to_text(.))))"),
            RuntimeValue::sequence_from(&root),
        )
        .unwrap_err();

        assert_eq!(err, EvalError::RecursionError(2));
    }

    #[test]
    fn test_eval_arguments_collapse() {
        let root = document();
        let values = Evaluator::default()
            .eval(&compile("len(.h)"), vec![RuntimeValue::Markdown(NodeRef::new(&root, Path::new()))])
            .unwrap();

        assert_eq!(values, vec![RuntimeValue::Number(Number::new(3.0))]);
    }

    fn two_lists() -> Node {
        Node::root(vec![
            item("a", 0),
            item("b", 1),
            Node::paragraph(vec!["between".into()]),
            item("c", 0),
            item("d", 1),
            Node::Blockquote(Blockquote {
                values: vec![item("e", 0), item("f", 1)],
            }),
        ])
    }

    #[rstest]
    #[case::iterate_top_level(".[]", vec!["- a", "- b", "- c", "- d", "- e", "- f"])]
    #[case::index_per_list(".[1]", vec!["- b", "- d", "- f"])]
    #[case::index_first(".[0]", vec!["- a", "- c", "- e"])]
    #[case::blockquote_items(".blockquote | .[]", vec!["- e", "- f"])]
    #[case::paragraph_holds_no_list(".p | .[]", vec![])]
    #[case::children_of_paragraph(".p | .children | .[]", vec!["between"])]
    fn test_eval_iterate_lists(#[case] code: &str, #[case] expected: Vec<&str>) {
        assert_eq!(run(code, &two_lists()).unwrap(), expected);
    }

    #[test]
    fn test_eval_iterate_root_takes_direct_items() {
        let root = two_lists();
        let values = Evaluator::default()
            .eval(&compile(".[] | to_text"), vec![RuntimeValue::Markdown(NodeRef::new(&root, Path::new()))])
            .unwrap();

        assert_eq!(
            values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_eval_selector_skips_nodes_already_selected() {
        let root = Node::root(vec![Node::Blockquote(Blockquote {
            values: vec![
                Node::paragraph(vec!["outer".into()]),
                Node::Blockquote(Blockquote {
                    values: vec![Node::paragraph(vec!["inner".into()])],
                }),
            ],
        })]);

        assert_eq!(
            run(".blockquote | .p | to_text", &root).unwrap(),
            vec!["outer", "inner"]
        );
    }
}

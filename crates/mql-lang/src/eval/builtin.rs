use std::sync::LazyLock;

use itertools::Itertools;
use regex_lite::Regex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::error::EvalError;
use super::runtime_value::RuntimeValue;
use crate::ast::node::Ident;
use crate::compiler::ValueType;
use crate::number::Number;
use crate::selector::AttrKind;

pub type BuiltinFn =
    for<'a> fn(&Ident, &[RuntimeValue<'a>]) -> Result<RuntimeValue<'a>, EvalError>;

#[derive(Clone, Debug)]
pub struct BuiltinFunction {
    pub num_params: ParamNum,
    pub returns: ValueType,
    pub func: BuiltinFn,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParamNum {
    None,
    Fixed(u8),
    Range(u8, u8),
}

impl ParamNum {
    pub fn to_num(&self) -> u8 {
        match self {
            ParamNum::None => 0,
            ParamNum::Fixed(n) => *n,
            ParamNum::Range(min, _) => *min,
        }
    }

    pub fn is_valid(&self, num_args: u8) -> bool {
        match self {
            ParamNum::None => num_args == 0,
            ParamNum::Fixed(n) => num_args == *n,
            ParamNum::Range(min, max) => num_args >= *min && num_args <= *max,
        }
    }

    /// Whether the call can be completed by passing the current value first.
    pub fn is_missing_one_params(&self, num_args: u8) -> bool {
        match self {
            ParamNum::Fixed(n) => *n > 0 && num_args == n - 1,
            _ => false,
        }
    }
}

impl BuiltinFunction {
    pub fn new(num_params: ParamNum, returns: ValueType, func: BuiltinFn) -> Self {
        BuiltinFunction {
            num_params,
            returns,
            func,
        }
    }
}

fn invalid_types(ident: &Ident, args: &[RuntimeValue<'_>]) -> EvalError {
    EvalError::InvalidTypes {
        token: (*ident.token).clone(),
        name: ident.name.clone(),
        args: args.iter().map(|a| SmolStr::new(a.name())).collect(),
    }
}

fn values_eq(a: &RuntimeValue<'_>, b: &RuntimeValue<'_>) -> bool {
    match (a, b) {
        (RuntimeValue::Markdown(node), RuntimeValue::String(s))
        | (RuntimeValue::String(s), RuntimeValue::Markdown(node)) => node.node.to_text() == *s,
        _ => a == b,
    }
}

fn string_predicate<'a>(
    ident: &Ident,
    args: &[RuntimeValue<'a>],
    f: fn(&str, &str) -> bool,
) -> Result<RuntimeValue<'a>, EvalError> {
    match args {
        [RuntimeValue::None, RuntimeValue::String(_)] => Ok(false.into()),
        [RuntimeValue::Array(values), RuntimeValue::String(s)] => Ok(values
            .iter()
            .any(|v| !v.is_none() && f(&v.to_text(), s))
            .into()),
        [value, RuntimeValue::String(s)] => Ok(f(&value.to_text(), s).into()),
        _ => Err(invalid_types(ident, args)),
    }
}

fn map_text<'a>(
    ident: &Ident,
    args: &[RuntimeValue<'a>],
    f: fn(&str) -> String,
) -> Result<RuntimeValue<'a>, EvalError> {
    match args {
        [RuntimeValue::None] => Ok(RuntimeValue::None),
        [RuntimeValue::String(s)] => Ok(f(s).into()),
        [value @ RuntimeValue::Markdown(_)] => Ok(f(&value.to_text()).into()),
        [RuntimeValue::Array(values)] => Ok(values
            .iter()
            .map(|v| match v {
                RuntimeValue::None => RuntimeValue::None,
                v => f(&v.to_text()).into(),
            })
            .collect::<Vec<_>>()
            .into()),
        _ => Err(invalid_types(ident, args)),
    }
}

fn compare<'a>(
    args: &[RuntimeValue<'a>],
    f: fn(std::cmp::Ordering) -> bool,
) -> Result<RuntimeValue<'a>, EvalError> {
    Ok(match args {
        [a, b] => a.partial_cmp(b).is_some_and(f).into(),
        _ => false.into(),
    })
}

pub static BUILTIN_FUNCTIONS: LazyLock<FxHashMap<SmolStr, BuiltinFunction>> =
    LazyLock::new(|| {
        let mut map = FxHashMap::default();

        map.insert(
            SmolStr::new("contains"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |ident, args| {
                match args {
                    [RuntimeValue::None, RuntimeValue::String(_)] => Ok(false.into()),
                    [RuntimeValue::Array(values), needle] => {
                        Ok(values.iter().any(|v| values_eq(v, needle)).into())
                    }
                    [value, RuntimeValue::String(s)] => {
                        Ok(value.to_string().contains(s.as_str()).into())
                    }
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("startswith"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |ident, args| {
                string_predicate(ident, args, |s, prefix| s.starts_with(prefix))
            }),
        );
        map.insert(
            SmolStr::new("endswith"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |ident, args| {
                string_predicate(ident, args, |s, suffix| s.ends_with(suffix))
            }),
        );
        map.insert(
            SmolStr::new("test"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |ident, args| {
                match args {
                    [RuntimeValue::None, RuntimeValue::String(_)] => Ok(false.into()),
                    [value, RuntimeValue::String(pattern)] => {
                        let re = Regex::new(pattern).map_err(|_| {
                            EvalError::InvalidRegularExpression(
                                (*ident.token).clone(),
                                pattern.clone(),
                            )
                        })?;
                        Ok(re.is_match(&value.to_text()).into())
                    }
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("is_mdx"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Bool, |_, args| {
                Ok(matches!(args, [RuntimeValue::Markdown(node)] if node.node.is_mdx()).into())
            }),
        );
        map.insert(
            SmolStr::new("upcase"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Any, |ident, args| {
                map_text(ident, args, str::to_uppercase)
            }),
        );
        map.insert(
            SmolStr::new("downcase"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Any, |ident, args| {
                map_text(ident, args, str::to_lowercase)
            }),
        );
        map.insert(
            SmolStr::new("trim"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Any, |ident, args| {
                map_text(ident, args, |s| s.trim().to_string())
            }),
        );
        map.insert(
            SmolStr::new("replace"),
            BuiltinFunction::new(ParamNum::Fixed(3), ValueType::String, |ident, args| {
                match args {
                    [RuntimeValue::None, RuntimeValue::String(_), RuntimeValue::String(_)] => {
                        Ok(RuntimeValue::None)
                    }
                    [value, RuntimeValue::String(from), RuntimeValue::String(to)]
                        if !matches!(value, RuntimeValue::Array(_)) =>
                    {
                        Ok(value.to_text().replace(from.as_str(), to).into())
                    }
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("split"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Array, |ident, args| {
                match args {
                    [value @ (RuntimeValue::String(_) | RuntimeValue::Markdown(_)), RuntimeValue::String(sep)] => {
                        Ok(value
                            .to_text()
                            .split(sep.as_str())
                            .map(RuntimeValue::from)
                            .collect::<Vec<_>>()
                            .into())
                    }
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("join"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::String, |ident, args| {
                match args {
                    [RuntimeValue::Array(values), RuntimeValue::String(sep)] => Ok(values
                        .iter()
                        .filter(|v| !v.is_none())
                        .map(RuntimeValue::to_text)
                        .join(sep)
                        .into()),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("to_text"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::String, |_, args| {
                Ok(match args {
                    [RuntimeValue::None] => RuntimeValue::None,
                    [value] => value.to_text().into(),
                    _ => RuntimeValue::None,
                })
            }),
        );
        let to_markdown = BuiltinFunction::new(ParamNum::Fixed(1), ValueType::String, |_, args| {
            Ok(match args {
                [RuntimeValue::None] => RuntimeValue::None,
                [value] => value.to_string().into(),
                _ => RuntimeValue::None,
            })
        });
        map.insert(SmolStr::new("to_markdown"), to_markdown.clone());
        map.insert(SmolStr::new("to_string"), to_markdown);
        map.insert(
            SmolStr::new("to_number"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Number, |ident, args| {
                match args {
                    [RuntimeValue::Number(n)] => Ok((*n).into()),
                    [RuntimeValue::Bool(b)] => Ok(Number::from(*b as u8).into()),
                    [value @ (RuntimeValue::String(_) | RuntimeValue::Markdown(_))] => value
                        .to_text()
                        .trim()
                        .parse::<f64>()
                        .map(|n| RuntimeValue::Number(Number::new(n)))
                        .map_err(|_| invalid_types(ident, args)),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("type"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::String, |_, args| {
                Ok(args.first().map_or("None", RuntimeValue::name).into())
            }),
        );
        map.insert(
            SmolStr::new("len"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Number, |_, args| {
                Ok(args.first().map_or(0, RuntimeValue::len).into())
            }),
        );
        map.insert(
            SmolStr::new("is_empty"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Bool, |_, args| {
                Ok(args.first().is_none_or(RuntimeValue::is_empty).into())
            }),
        );
        map.insert(
            SmolStr::new("first"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Any, |ident, args| {
                match args {
                    [RuntimeValue::Array(values)] => Ok(values.first().cloned().unwrap_or_default()),
                    [RuntimeValue::String(s)] => {
                        Ok(s.chars().next().map_or(RuntimeValue::None, |c| c.to_string().into()))
                    }
                    [RuntimeValue::Markdown(node)] => {
                        Ok(node.children().into_iter().next().unwrap_or_default())
                    }
                    [RuntimeValue::None] => Ok(RuntimeValue::None),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("last"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Any, |ident, args| {
                match args {
                    [RuntimeValue::Array(values)] => Ok(values.last().cloned().unwrap_or_default()),
                    [RuntimeValue::String(s)] => Ok(s
                        .chars()
                        .next_back()
                        .map_or(RuntimeValue::None, |c| c.to_string().into())),
                    [RuntimeValue::Markdown(node)] => {
                        Ok(node.children().into_iter().next_back().unwrap_or_default())
                    }
                    [RuntimeValue::None] => Ok(RuntimeValue::None),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("attr"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Any, |ident, args| {
                match args {
                    [RuntimeValue::Markdown(node), RuntimeValue::String(name)] => {
                        Ok(AttrKind::from_name(name.trim_start_matches('.'))
                            .map_or(RuntimeValue::None, |attr| node.attr(attr)))
                    }
                    [RuntimeValue::None, RuntimeValue::String(_)] => Ok(RuntimeValue::None),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("not"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Bool, |_, args| {
                Ok((!args.first().is_some_and(RuntimeValue::is_truthy)).into())
            }),
        );
        map.insert(
            SmolStr::new("and"),
            BuiltinFunction::new(ParamNum::Range(2, u8::MAX), ValueType::Bool, |_, args| {
                Ok(args.iter().all(RuntimeValue::is_truthy).into())
            }),
        );
        map.insert(
            SmolStr::new("or"),
            BuiltinFunction::new(ParamNum::Range(2, u8::MAX), ValueType::Bool, |_, args| {
                Ok(args.iter().any(RuntimeValue::is_truthy).into())
            }),
        );
        map.insert(
            SmolStr::new("eq"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                Ok(matches!(args, [a, b] if values_eq(a, b)).into())
            }),
        );
        map.insert(
            SmolStr::new("ne"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                Ok((!matches!(args, [a, b] if values_eq(a, b))).into())
            }),
        );
        map.insert(
            SmolStr::new("lt"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                compare(args, std::cmp::Ordering::is_lt)
            }),
        );
        map.insert(
            SmolStr::new("lte"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                compare(args, std::cmp::Ordering::is_le)
            }),
        );
        map.insert(
            SmolStr::new("gt"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                compare(args, std::cmp::Ordering::is_gt)
            }),
        );
        map.insert(
            SmolStr::new("gte"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Bool, |_, args| {
                compare(args, std::cmp::Ordering::is_ge)
            }),
        );
        map.insert(
            SmolStr::new("add"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Any, |ident, args| {
                match args {
                    [RuntimeValue::Number(a), RuntimeValue::Number(b)] => Ok((*a + *b).into()),
                    [RuntimeValue::Array(a), RuntimeValue::Array(b)] => {
                        Ok(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>().into())
                    }
                    [RuntimeValue::None, b] => Ok(b.clone()),
                    [a, RuntimeValue::None] => Ok(a.clone()),
                    [
                        a @ (RuntimeValue::String(_) | RuntimeValue::Markdown(_)),
                        b @ (RuntimeValue::String(_) | RuntimeValue::Markdown(_)),
                    ] => Ok(format!("{}{}", a.to_text(), b.to_text()).into()),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("sub"),
            BuiltinFunction::new(ParamNum::Fixed(2), ValueType::Number, |ident, args| {
                match args {
                    [RuntimeValue::Number(a), RuntimeValue::Number(b)] => Ok((*a - *b).into()),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );
        map.insert(
            SmolStr::new("negate"),
            BuiltinFunction::new(ParamNum::Fixed(1), ValueType::Number, |ident, args| {
                match args {
                    [RuntimeValue::Number(n)] => Ok((-*n).into()),
                    _ => Err(invalid_types(ident, args)),
                }
            }),
        );

        map
    });

/// Calls a builtin with arguments already adjusted to its arity.
pub fn eval_builtin<'a>(
    builtin: &BuiltinFunction,
    ident: &Ident,
    args: &[RuntimeValue<'a>],
) -> Result<RuntimeValue<'a>, EvalError> {
    (builtin.func)(ident, args)
}

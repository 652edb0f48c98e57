use crate::{
    compile,
    compiler::{Pipeline, ValueType},
    error::{self, InnerError},
    eval::{Evaluator, Options as EvalOptions, runtime_value::RuntimeValue},
};

#[derive(Debug, Clone)]
pub struct Options {
    /// Drop `None` results from each stage.
    pub filter_none: bool,
    /// Deepest nesting of sub-pipelines before evaluation fails.
    pub max_call_stack_depth: u32,
}

impl Default for Options {
    fn default() -> Self {
        let eval = EvalOptions::default();

        Self {
            filter_none: eval.filter_none,
            max_call_stack_depth: eval.max_call_stack_depth,
        }
    }
}

/// Compiles queries and runs them over value sequences.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub(crate) evaluator: Evaluator,
}

impl Engine {
    /// Creates an engine with the given evaluation options.
    pub fn new(options: Options) -> Self {
        Self {
            evaluator: Evaluator::new(EvalOptions {
                filter_none: options.filter_none,
                max_call_stack_depth: options.max_call_stack_depth,
            }),
        }
    }

    /// See [`Options::filter_none`].
    pub fn set_filter_none(&mut self, filter_none: bool) {
        self.evaluator.options.filter_none = filter_none;
    }

    /// See [`Options::max_call_stack_depth`].
    pub fn set_max_call_stack_depth(&mut self, depth: u32) {
        self.evaluator.options.max_call_stack_depth = depth;
    }

    /// Parses and compiles `code` without any input, checking stages against an unknown input type.
    #[allow(clippy::result_large_err)]
    pub fn compile(&self, code: &str) -> Result<Pipeline, error::Error> {
        let pipeline = compile(code)?;
        pipeline
            .check(ValueType::Any)
            .map_err(|e| error::Error::from_error(code, InnerError::Eval(e)))?;

        Ok(pipeline)
    }

    /// Compiles `code` and runs it over `input`.
    ///
    /// Each input value flows through the stages in order and the results of the
    /// last stage are returned. Compile and runtime failures both come back as an
    /// [`error::Error`] carrying a source span into `code`.
    #[allow(clippy::result_large_err)]
    pub fn eval<'a>(
        &self,
        code: &str,
        input: Vec<RuntimeValue<'a>>,
    ) -> Result<Vec<RuntimeValue<'a>>, error::Error> {
        let pipeline = self.compile(code)?;
        self.eval_pipeline(code, &pipeline, input)
    }

    /// Runs an already compiled pipeline. `code` is only used for diagnostics.
    ///
    /// The stages are checked again against the type of `input` before running.
    #[allow(clippy::result_large_err)]
    pub fn eval_pipeline<'a>(
        &self,
        code: &str,
        pipeline: &Pipeline,
        input: Vec<RuntimeValue<'a>>,
    ) -> Result<Vec<RuntimeValue<'a>>, error::Error> {
        pipeline
            .check(ValueType::of(&input))
            .map_err(|e| error::Error::from_error(code, InnerError::Eval(e)))?;

        self.evaluator
            .eval(pipeline, input)
            .map_err(|e| error::Error::from_error(code, InnerError::Eval(e)))
    }

    /// The crate version.
    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

use swc_core::ecma::ast::*;

/// Name of the marker, used both as a call wrapper and as a decorator.
pub const SENTINEL: &str = "transformToMobxFlow";

// -----------------------------------------------------------------------------
// Async oracle
// -----------------------------------------------------------------------------

/// Anything with a parameter list and a body that can be async.
#[derive(Clone, Copy)]
pub enum FunctionLike<'a> {
    Function(&'a Function),
    Arrow(&'a ArrowExpr),
}

impl FunctionLike<'_> {
    pub fn is_generator(&self) -> bool {
        match self {
            FunctionLike::Function(f) => f.is_generator,
            FunctionLike::Arrow(a) => a.is_generator,
        }
    }
}

/// Answers "is this function asynchronous". Injected into the transform so the
/// decision stays with whatever produced the tree.
pub trait AsyncOracle {
    fn is_async(&self, node: FunctionLike<'_>) -> bool;
}

/// Reads the `async` flag the SWC parser recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwcAsyncOracle;

impl AsyncOracle for SwcAsyncOracle {
    fn is_async(&self, node: FunctionLike<'_>) -> bool {
        match node {
            FunctionLike::Function(f) => f.is_async,
            FunctionLike::Arrow(a) => a.is_async,
        }
    }
}

/// Async, and not an async generator.
pub fn is_convertible<O: AsyncOracle + ?Sized>(oracle: &O, node: FunctionLike<'_>) -> bool {
    oracle.is_async(node) && !node.is_generator()
}

// -----------------------------------------------------------------------------
// Marked declarations
// -----------------------------------------------------------------------------

pub fn is_sentinel_ident(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(id) if id.sym.as_ref() == SENTINEL)
}

pub fn is_sentinel_decorator(decorator: &Decorator) -> bool {
    is_sentinel_ident(&decorator.expr)
}

pub fn has_sentinel_decorator(decorators: &[Decorator]) -> bool {
    decorators.iter().any(is_sentinel_decorator)
}

/// `transformToMobxFlow(<arg>, ...)`
pub fn is_wrapped_call(call: &CallExpr) -> bool {
    let callee_is_sentinel = match &call.callee {
        Callee::Expr(callee) => is_sentinel_ident(callee),
        _ => false,
    };
    callee_is_sentinel && !call.args.is_empty()
}

/// The function-like first argument of a wrapped call. `None` for spreads,
/// identifiers and everything else that is not a function expression.
pub fn wrapped_function(call: &CallExpr) -> Option<FunctionLike<'_>> {
    let first = call.args.first()?;
    if first.spread.is_some() {
        return None;
    }
    function_like_expr(&first.expr)
}

pub fn function_like_expr(expr: &Expr) -> Option<FunctionLike<'_>> {
    match expr {
        Expr::Fn(f) => Some(FunctionLike::Function(&f.function)),
        Expr::Arrow(a) => Some(FunctionLike::Arrow(a)),
        _ => None,
    }
}

pub fn is_marked_method(function: &Function) -> bool {
    function.body.is_some() && has_sentinel_decorator(&function.decorators)
}

pub fn is_marked_property(decorators: &[Decorator], value: Option<&Expr>) -> bool {
    value.is_some() && has_sentinel_decorator(decorators)
}

/// The three marked shapes, borrowed from the tree.
#[derive(Clone, Copy)]
pub enum Marked<'a> {
    WrappedCall(&'a CallExpr),
    DecoratedMethod(&'a Function),
    DecoratedProperty(Option<&'a Expr>),
}

impl<'a> Marked<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Marked::WrappedCall(_) => "wrapped-call",
            Marked::DecoratedMethod(_) => "decorated-method",
            Marked::DecoratedProperty(_) => "decorated-property",
        }
    }

    /// The function that gets rewritten, if there is one.
    pub fn function(&self) -> Option<FunctionLike<'a>> {
        match *self {
            Marked::WrappedCall(call) => wrapped_function(call),
            Marked::DecoratedMethod(f) => Some(FunctionLike::Function(f)),
            Marked::DecoratedProperty(value) => value.and_then(function_like_expr),
        }
    }

    pub fn is_convertible<O: AsyncOracle + ?Sized>(&self, oracle: &O) -> bool {
        self.function().is_some_and(|f| is_convertible(oracle, f))
    }
}

pub fn classify_call(call: &CallExpr) -> Option<Marked<'_>> {
    is_wrapped_call(call).then_some(Marked::WrappedCall(call))
}

pub fn classify_method(function: &Function) -> Option<Marked<'_>> {
    is_marked_method(function).then_some(Marked::DecoratedMethod(function))
}

pub fn classify_property<'a>(
    decorators: &'a [Decorator],
    value: Option<&'a Expr>,
) -> Option<Marked<'a>> {
    is_marked_property(decorators, value).then_some(Marked::DecoratedProperty(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::{SyntaxContext, DUMMY_SP};

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())))
    }

    fn arrow(is_async: bool, is_generator: bool) -> ArrowExpr {
        ArrowExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            params: vec![],
            body: Box::new(BlockStmtOrExpr::BlockStmt(BlockStmt {
                span: DUMMY_SP,
                ctxt: SyntaxContext::empty(),
                stmts: vec![],
            })),
            is_async,
            is_generator,
            type_params: None,
            return_type: None,
        }
    }

    fn call(callee: &str, args: Vec<Box<Expr>>) -> CallExpr {
        CallExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(ident(callee)),
            args: args
                .into_iter()
                .map(|expr| ExprOrSpread { spread: None, expr })
                .collect(),
            type_args: None,
        }
    }

    #[test]
    fn wrapped_call_needs_sentinel_callee_and_argument() {
        let arg = Box::new(Expr::Arrow(arrow(true, false)));
        assert!(is_wrapped_call(&call(SENTINEL, vec![arg.clone()])));
        assert!(!is_wrapped_call(&call(SENTINEL, vec![])));
        assert!(!is_wrapped_call(&call("flow", vec![arg])));
    }

    #[test]
    fn identifier_argument_is_not_function_like() {
        let c = call(SENTINEL, vec![ident("randomFunction")]);
        let marked = classify_call(&c).expect("marked");
        assert!(marked.function().is_none());
        assert!(!marked.is_convertible(&SwcAsyncOracle));
    }

    #[test]
    fn async_generators_are_rejected() {
        let oracle = SwcAsyncOracle;
        assert!(is_convertible(&oracle, FunctionLike::Arrow(&arrow(true, false))));
        assert!(!is_convertible(&oracle, FunctionLike::Arrow(&arrow(false, false))));
        assert!(!is_convertible(&oracle, FunctionLike::Arrow(&arrow(true, true))));
    }

    #[test]
    fn injected_oracle_decides() {
        struct Always;
        impl AsyncOracle for Always {
            fn is_async(&self, _: FunctionLike<'_>) -> bool {
                true
            }
        }
        assert!(is_convertible(&Always, FunctionLike::Arrow(&arrow(false, false))));
    }

    #[test]
    fn sentinel_decorator_must_be_bare() {
        let bare = Decorator { span: DUMMY_SP, expr: ident(SENTINEL) };
        let called = Decorator {
            span: DUMMY_SP,
            expr: Box::new(Expr::Call(call(SENTINEL, vec![]))),
        };
        assert!(has_sentinel_decorator(&[bare]));
        assert!(!has_sentinel_decorator(&[called]));
    }

    #[test]
    fn property_without_initializer_is_not_marked() {
        let decorators = vec![Decorator { span: DUMMY_SP, expr: ident(SENTINEL) }];
        assert!(classify_property(&decorators, None).is_none());
        let value = Expr::Arrow(arrow(true, false));
        assert_eq!(
            classify_property(&decorators, Some(&value)).map(|m| m.kind()),
            Some("decorated-property")
        );
    }
}

use std::iter;

use swc_core::{
    common::{sync::Lrc, SourceMapper, Span, Spanned},
    ecma::{
        ast::*,
        visit::{noop_visit_mut_type, noop_visit_type, Visit, VisitMut, VisitMutWith, VisitWith},
    },
};

use crate::{
    body::ForAwaitFinder,
    classify::{
        classify_call, classify_method, classify_property, is_wrapped_call, wrapped_function,
        AsyncOracle, FunctionLike, Marked, SwcAsyncOracle,
    },
    config::Config,
    error::{source_text, FlowError, FlowResult},
    names::{generator_base, key_name, private_key_name, UniqueNames, IMPORT_BASE},
    synth::{namespace_import, rewrite_arrow, rewrite_function, strip_sentinel},
};

// -----------------------------------------------------------------------------
// Transform state
// -----------------------------------------------------------------------------

/// Rewrites every `async` function marked with `transformToMobxFlow` in one
/// unit into a generator driven by `mobx.flow`. One instance per unit.
pub struct FlowTransform<O = SwcAsyncOracle> {
    config: Config,
    source_map: Option<Lrc<dyn SourceMapper>>,
    oracle: O,

    names: UniqueNames,
    // Allocated at the first rewrite, prepended as an import at the end.
    import_local: Option<String>,
    rewritten: usize,
}

impl FlowTransform {
    pub fn new(config: Config, source_map: Option<Lrc<dyn SourceMapper>>) -> Self {
        Self::with_oracle(config, source_map, SwcAsyncOracle)
    }
}

impl<O: AsyncOracle> FlowTransform<O> {
    pub fn with_oracle(
        config: Config,
        source_map: Option<Lrc<dyn SourceMapper>>,
        oracle: O,
    ) -> Self {
        Self {
            config,
            source_map,
            oracle,
            names: UniqueNames::default(),
            import_local: None,
            rewritten: 0,
        }
    }

    /// Runs the whole unit. Either every marked declaration is rewritten or
    /// the error for the first offending one is returned and nothing is.
    /// A unit without marked declarations comes back untouched.
    pub fn transform(self, program: Program) -> FlowResult<Program> {
        let marked = self.validate(&program)?;
        Ok(self.rewrite(program, marked))
    }

    /// Read-only check of every marked declaration; returns how many there are.
    pub(crate) fn validate(&self, program: &Program) -> FlowResult<usize> {
        let mut v = Validator {
            oracle: &self.oracle,
            source_map: self.source_map.as_ref(),
            marked: 0,
            error: None,
        };
        program.visit_with(&mut v);
        match v.error {
            Some(err) => Err(err),
            None => Ok(v.marked),
        }
    }

    /// Rewrites a unit `validate` accepted.
    pub(crate) fn rewrite(mut self, mut program: Program, marked: usize) -> Program {
        if marked == 0 {
            return program;
        }
        self.names = UniqueNames::collect(&program);
        program.visit_mut_with(&mut self);
        self.finalize(program)
    }

    fn finalize(&self, program: Program) -> Program {
        let Some(local) = self.import_local.as_deref().filter(|_| self.rewritten > 0) else {
            return program;
        };
        tracing::debug!(
            local,
            package = %self.config.mobx_package,
            rewritten = self.rewritten,
            "injecting flow import"
        );
        let import = namespace_import(local, &self.config.mobx_package);
        match program {
            Program::Module(mut module) => {
                module.body.insert(0, import);
                Program::Module(module)
            }
            // An import is only legal in a module.
            Program::Script(script) => Program::Module(Module {
                span: script.span,
                body: iter::once(import)
                    .chain(script.body.into_iter().map(ModuleItem::Stmt))
                    .collect(),
                shebang: script.shebang,
            }),
        }
    }

    // ---------- naming ----------

    fn import_local(&mut self) -> String {
        if let Some(local) = &self.import_local {
            return local.clone();
        }
        let local = self.names.reserve_numbered(IMPORT_BASE);
        self.import_local = Some(local.clone());
        local
    }

    fn generator_name(&mut self, base: Option<String>) -> Option<String> {
        base.map(|b| self.names.reserve(&generator_base(&b)))
    }

    // ---------- rewrites ----------

    /// Rewrites a function expression or arrow in place. `name` is the binding
    /// it is assigned to; an explicit function name wins over it.
    fn rewrite_function_like(&mut self, expr: &mut Expr, name: Option<String>, kind: &str) {
        match expr {
            Expr::Fn(f) => {
                let explicit = f.ident.as_ref().map(|i| i.sym.to_string());
                let import = self.import_local();
                let generator = self.generator_name(explicit.or(name));
                let yields = rewrite_function(&mut f.function, &import, generator.as_deref());
                self.record(kind, generator.as_deref(), yields);
            }
            Expr::Arrow(a) => {
                let import = self.import_local();
                let generator = self.generator_name(name);
                let yields = rewrite_arrow(a, &import, generator.as_deref());
                self.record(kind, generator.as_deref(), yields);
            }
            _ => {}
        }
    }

    /// `transformToMobxFlow(async () => ...)` becomes the rewritten function
    /// itself.
    fn rewrite_wrapped_call(&mut self, expr: &mut Expr, name: Option<String>) {
        let Expr::Call(call) = expr else {
            return;
        };
        if !is_wrapped_call(call) || wrapped_function(call).is_none() {
            return;
        }
        let mut function = call.args.remove(0).expr;
        self.rewrite_function_like(&mut function, name, "wrapped-call");
        *expr = *function;
    }

    fn rewrite_method(&mut self, function: &mut Function, name: Option<String>) {
        let import = self.import_local();
        let generator = self.generator_name(name);
        let yields = rewrite_function(function, &import, generator.as_deref());
        self.record("decorated-method", generator.as_deref(), yields);
    }

    fn rewrite_property(
        &mut self,
        decorators: &mut Vec<Decorator>,
        value: Option<&mut Expr>,
        name: Option<String>,
    ) {
        strip_sentinel(decorators);
        if let Some(value) = value {
            self.rewrite_function_like(value, name, "decorated-property");
        }
    }

    fn record(&mut self, kind: &str, generator: Option<&str>, yields: usize) {
        self.rewritten += 1;
        tracing::debug!(
            kind,
            generator = generator.unwrap_or("<anonymous>"),
            yields,
            "rewrote async function into flow generator"
        );
    }
}

impl<O: AsyncOracle> VisitMut for FlowTransform<O> {
    noop_visit_mut_type!();

    fn visit_mut_var_declarator(&mut self, d: &mut VarDeclarator) {
        if let (Pat::Ident(binding), Some(init)) = (&d.name, d.init.as_deref_mut()) {
            let name = binding.id.sym.to_string();
            self.rewrite_wrapped_call(init, Some(name));
        }
        d.visit_mut_children_with(self);
    }

    fn visit_mut_key_value_prop(&mut self, p: &mut KeyValueProp) {
        let name = key_name(&p.key);
        self.rewrite_wrapped_call(&mut p.value, name);
        p.visit_mut_children_with(self);
    }

    fn visit_mut_expr(&mut self, e: &mut Expr) {
        self.rewrite_wrapped_call(e, None);
        e.visit_mut_children_with(self);
    }

    fn visit_mut_class_method(&mut self, m: &mut ClassMethod) {
        if classify_method(&m.function).is_some() {
            let name = key_name(&m.key);
            self.rewrite_method(&mut m.function, name);
        }
        m.visit_mut_children_with(self);
    }

    fn visit_mut_private_method(&mut self, m: &mut PrivateMethod) {
        if classify_method(&m.function).is_some() {
            let name = private_key_name(&m.key);
            self.rewrite_method(&mut m.function, name);
        }
        m.visit_mut_children_with(self);
    }

    fn visit_mut_class_prop(&mut self, p: &mut ClassProp) {
        let name = key_name(&p.key);
        if classify_property(&p.decorators, p.value.as_deref()).is_some() {
            self.rewrite_property(&mut p.decorators, p.value.as_deref_mut(), name);
        } else if let Some(value) = p.value.as_deref_mut() {
            self.rewrite_wrapped_call(value, name);
        }
        p.visit_mut_children_with(self);
    }

    fn visit_mut_private_prop(&mut self, p: &mut PrivateProp) {
        let name = private_key_name(&p.key);
        if classify_property(&p.decorators, p.value.as_deref()).is_some() {
            self.rewrite_property(&mut p.decorators, p.value.as_deref_mut(), name);
        } else if let Some(value) = p.value.as_deref_mut() {
            self.rewrite_wrapped_call(value, name);
        }
        p.visit_mut_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Validation pass
// -----------------------------------------------------------------------------

/// Read-only sweep over the unit run before anything is rewritten: counts
/// marked declarations and keeps the first one that cannot be converted.
struct Validator<'a, O> {
    oracle: &'a O,
    source_map: Option<&'a Lrc<dyn SourceMapper>>,
    marked: usize,
    error: Option<FlowError>,
}

impl<O: AsyncOracle> Validator<'_, O> {
    fn check(&mut self, marked: Marked<'_>, span: Span) {
        self.marked += 1;
        tracing::trace!(kind = marked.kind(), "found marked declaration");
        if self.error.is_some() {
            return;
        }
        if !marked.is_convertible(self.oracle) {
            self.error = Some(FlowError::NotAsyncFunction {
                span,
                source_text: source_text(self.source_map, span),
            });
            return;
        }
        let for_await = match marked.function() {
            Some(FunctionLike::Function(f)) => f.body.as_ref().and_then(|b| ForAwaitFinder::find(b)),
            Some(FunctionLike::Arrow(a)) => ForAwaitFinder::find(&*a.body),
            None => None,
        };
        if let Some(span) = for_await {
            self.error = Some(FlowError::UnsupportedForAwait {
                span,
                source_text: source_text(self.source_map, span),
            });
        }
    }
}

impl<O: AsyncOracle> Visit for Validator<'_, O> {
    noop_visit_type!();

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(marked) = classify_call(n) {
            self.check(marked, n.span);
        }
        n.visit_children_with(self);
    }

    fn visit_class_method(&mut self, n: &ClassMethod) {
        if let Some(marked) = classify_method(&n.function) {
            self.check(marked, n.span);
        }
        n.visit_children_with(self);
    }

    fn visit_private_method(&mut self, n: &PrivateMethod) {
        if let Some(marked) = classify_method(&n.function) {
            self.check(marked, n.span);
        }
        n.visit_children_with(self);
    }

    fn visit_class_prop(&mut self, n: &ClassProp) {
        if let Some(marked) = classify_property(&n.decorators, n.value.as_deref()) {
            self.check(marked, n.span());
        }
        n.visit_children_with(self);
    }

    fn visit_private_prop(&mut self, n: &PrivateProp) {
        if let Some(marked) = classify_property(&n.decorators, n.value.as_deref()) {
            self.check(marked, n.span());
        }
        n.visit_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

/// A transformer with the default configuration and no source map.
pub fn flow_transform() -> FlowTransform {
    FlowTransform::new(Config::default(), None)
}

/// Runs one unit outside the plugin runtime.
///
/// `yield` binds looser than `await`, and no parentheses are added where an
/// `await` was an operand: `await a() || b` comes out as a `YieldExpr` on
/// the left of the `||`. Hosts printing the result must run SWC's `fixer`
/// pass first, as the plugin pipeline does after every plugin.
pub fn transform_program(
    program: Program,
    config: &Config,
    source_map: Option<Lrc<dyn SourceMapper>>,
) -> FlowResult<Program> {
    FlowTransform::new(config.clone(), source_map).transform(program)
}

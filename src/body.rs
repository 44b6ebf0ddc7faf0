use swc_core::{
    common::{util::take::Take, Span, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{noop_visit_mut_type, noop_visit_type, Visit, VisitMut, VisitMutWith, VisitWith},
    },
};

/// Turns every `await x` of one function body into `yield x`, leaving nested
/// functions alone: they keep their own `await`s and their own `async`.
#[derive(Default)]
pub struct AwaitToYield {
    pub converted: usize,
}

impl AwaitToYield {
    pub fn convert_block(block: &mut BlockStmt) -> usize {
        let mut v = Self::default();
        block.visit_mut_children_with(&mut v);
        v.converted
    }
}

impl VisitMut for AwaitToYield {
    noop_visit_mut_type!();

    fn visit_mut_expr(&mut self, e: &mut Expr) {
        if let Expr::Await(await_expr) = e {
            let yield_expr = Expr::Yield(YieldExpr {
                span: await_expr.span,
                arg: Some(await_expr.arg.take()),
                delegate: false,
            });
            *e = yield_expr;
            self.converted += 1;
        }
        e.visit_mut_children_with(self);
    }

    // Function boundaries. Params and bodies belong to the nested function;
    // decorators and computed keys are evaluated in the enclosing one.
    fn visit_mut_function(&mut self, f: &mut Function) {
        for decorator in &mut f.decorators {
            decorator.visit_mut_with(self);
        }
        for param in &mut f.params {
            for decorator in &mut param.decorators {
                decorator.visit_mut_with(self);
            }
        }
    }

    fn visit_mut_arrow_expr(&mut self, _: &mut ArrowExpr) {}

    fn visit_mut_constructor(&mut self, c: &mut Constructor) {
        for param in &mut c.params {
            let decorators = match param {
                ParamOrTsParamProp::Param(p) => &mut p.decorators,
                ParamOrTsParamProp::TsParamProp(p) => &mut p.decorators,
            };
            for decorator in decorators {
                decorator.visit_mut_with(self);
            }
        }
    }

    fn visit_mut_getter_prop(&mut self, n: &mut GetterProp) {
        n.key.visit_mut_with(self);
    }

    fn visit_mut_setter_prop(&mut self, n: &mut SetterProp) {
        n.key.visit_mut_with(self);
    }
}

/// Finds the first `for await` that belongs to the body itself, using the
/// same function boundaries as [AwaitToYield].
#[derive(Default)]
pub struct ForAwaitFinder {
    pub found: Option<Span>,
}

impl ForAwaitFinder {
    pub fn find<N: VisitWith<Self>>(body: &N) -> Option<Span> {
        let mut v = Self::default();
        body.visit_with(&mut v);
        v.found
    }
}

impl Visit for ForAwaitFinder {
    noop_visit_type!();

    fn visit_for_of_stmt(&mut self, n: &ForOfStmt) {
        if n.is_await && self.found.is_none() {
            self.found = Some(n.span);
        }
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_constructor(&mut self, _: &Constructor) {}
    fn visit_getter_prop(&mut self, _: &GetterProp) {}
    fn visit_setter_prop(&mut self, _: &SetterProp) {}
}

/// Body of an arrow as a block. A concise body becomes `{ return <expr>; }` so
/// the value it evaluated to is still what the flow resolves with.
pub fn into_block(body: BlockStmtOrExpr) -> BlockStmt {
    match body {
        BlockStmtOrExpr::BlockStmt(block) => block,
        BlockStmtOrExpr::Expr(expr) => BlockStmt {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            stmts: vec![Stmt::Return(ReturnStmt {
                span: DUMMY_SP,
                arg: Some(expr),
            })],
        },
    }
}

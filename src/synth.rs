use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::ast::*,
};

use crate::{
    body::{into_block, AwaitToYield},
    classify::is_sentinel_decorator,
};

/// Member of the helper module that drives the generator.
pub const FLOW_MEMBER: &str = "flow";

fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

// -----------------------------------------------------------------------------
// Building blocks
// -----------------------------------------------------------------------------

/// `import * as <local> from "<src>";`
pub fn namespace_import(local: &str, src: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![ImportSpecifier::Namespace(ImportStarAsSpecifier {
            span: DUMMY_SP,
            local: ident(local),
        })],
        src: Box::new(Str {
            span: DUMMY_SP,
            value: src.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// `function* <name>() { <body> }`
fn generator_expr(name: Option<&str>, body: BlockStmt) -> Expr {
    Expr::Fn(FnExpr {
        ident: name.map(ident),
        function: Box::new(Function {
            params: vec![],
            decorators: vec![],
            span: DUMMY_SP,
            body: Some(body),
            is_generator: true,
            is_async: false,
            type_params: None,
            return_type: None,
            ctxt: SyntaxContext::empty(),
        }),
    })
}

/// Replacement body for a rewritten function:
///
/// ```js
/// { return mobx_1.flow(function* name() { ...body }).call(this); }
/// ```
pub fn flow_block(import_local: &str, name: Option<&str>, body: BlockStmt) -> BlockStmt {
    // mobx_1.flow(function* name() { ... })
    let flow_call = Expr::Call(CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(Expr::Ident(ident(import_local))),
            prop: MemberProp::Ident(IdentName::new(FLOW_MEMBER.into(), DUMMY_SP)),
        }))),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(generator_expr(name, body)),
        }],
        type_args: None,
        ctxt: SyntaxContext::empty(),
    });

    // (...).call(this)
    let bound = Expr::Call(CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(flow_call),
            prop: MemberProp::Ident(IdentName::new("call".into(), DUMMY_SP)),
        }))),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(Expr::This(ThisExpr { span: DUMMY_SP })),
        }],
        type_args: None,
        ctxt: SyntaxContext::empty(),
    });

    BlockStmt {
        span: DUMMY_SP,
        stmts: vec![Stmt::Return(ReturnStmt {
            span: DUMMY_SP,
            arg: Some(Box::new(bound)),
        })],
        ctxt: SyntaxContext::empty(),
    }
}

// -----------------------------------------------------------------------------
// Rewrites of the function-like node itself
// -----------------------------------------------------------------------------

/// Drops the marker decorator, keeping the others in order.
pub fn strip_sentinel(decorators: &mut Vec<Decorator>) {
    decorators.retain(|d| !is_sentinel_decorator(d));
}

/// Rewrites a function expression or method in place. Returns the number of
/// suspension points converted.
pub fn rewrite_function(function: &mut Function, import_local: &str, name: Option<&str>) -> usize {
    function.is_async = false;
    strip_sentinel(&mut function.decorators);

    let Some(mut body) = function.body.take() else {
        return 0;
    };
    let converted = AwaitToYield::convert_block(&mut body);
    let span = body.span;
    let mut block = flow_block(import_local, name, body);
    block.span = span;
    function.body = Some(block);
    converted
}

/// Rewrites an arrow in place; it stays an arrow so `this` remains lexical.
pub fn rewrite_arrow(arrow: &mut ArrowExpr, import_local: &str, name: Option<&str>) -> usize {
    arrow.is_async = false;

    let placeholder = BlockStmtOrExpr::BlockStmt(BlockStmt {
        span: DUMMY_SP,
        stmts: vec![],
        ctxt: SyntaxContext::empty(),
    });
    let mut body = into_block(std::mem::replace(&mut *arrow.body, placeholder));
    let converted = AwaitToYield::convert_block(&mut body);
    *arrow.body = BlockStmtOrExpr::BlockStmt(flow_block(import_local, name, body));
    converted
}

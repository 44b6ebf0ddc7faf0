use swc_core::common::{errors::HANDLER, sync::Lrc, SourceMapper, Span};
use thiserror::Error;

/// Prefix attached to every message so the origin is clear when mixed with
/// other build errors.
pub const ERROR_TAG: &str = "[async-to-mobx-flow]";

#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// A marked declaration whose function is not `async`, is an async
    /// generator, or is not a function expression at all.
    #[error(
        "{tag}: Could not resolve expression as async function: {source_text}",
        tag = ERROR_TAG
    )]
    NotAsyncFunction { span: Span, source_text: String },

    /// `for await` has no counterpart inside a synchronous generator.
    #[error(
        "{tag}: `for await` is not supported inside transformToMobxFlow functions: {source_text}",
        tag = ERROR_TAG
    )]
    UnsupportedForAwait { span: Span, source_text: String },
}

pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    pub fn span(&self) -> Span {
        match self {
            FlowError::NotAsyncFunction { span, .. }
            | FlowError::UnsupportedForAwait { span, .. } => *span,
        }
    }

    /// Report through the host's diagnostic handler.
    pub fn emit(&self) {
        let msg = self.to_string();
        HANDLER.with(|handler| handler.struct_span_err(self.span(), &msg).emit());
    }
}

/// Exact source text for `span`, or `<unknown>` when there is nothing to
/// look it up in.
pub(crate) fn source_text(source_map: Option<&Lrc<dyn SourceMapper>>, span: Span) -> String {
    if span.is_dummy() {
        return "<unknown>".to_string();
    }
    source_map
        .and_then(|cm| cm.span_to_snippet(span).ok())
        .unwrap_or_else(|| "<unknown>".to_string())
}

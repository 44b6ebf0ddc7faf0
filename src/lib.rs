//! Rewrites `async` functions marked with `transformToMobxFlow` into generator
//! functions driven by MobX's `flow`, so MobX action tracking sees every step
//! of the asynchronous mutation.
//!
//! ```ts
//! // in
//! const fn = transformToMobxFlow(async input => {
//!   return await callApi(input);
//! });
//!
//! // out
//! import * as mobx_1 from "mobx";
//! const fn = input => {
//!   return mobx_1.flow(function* fn_mobxFlow() {
//!     return yield callApi(input);
//!   }).call(this);
//! };
//! ```
//!
//! The marker also works as a decorator on class methods and on class
//! properties initialized with an async function.

use swc_core::{
    common::{sync::Lrc, SourceMapper},
    ecma::ast::Program,
    plugin::{plugin_transform, proxies::TransformPluginProgramMetadata},
};

mod body;
mod classify;
mod config;
mod error;
mod names;
mod synth;
mod transform;


pub use classify::{AsyncOracle, FunctionLike, SwcAsyncOracle, SENTINEL};
pub use config::{Config, DEFAULT_MOBX_PACKAGE};
pub use error::{FlowError, FlowResult, ERROR_TAG};
pub use names::GENERATOR_SUFFIX;
pub use synth::FLOW_MEMBER;
pub use transform::{flow_transform, transform_program, FlowTransform};

pub const PLUGIN_NAME: &str = env!("CARGO_PKG_NAME");
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

#[plugin_transform]
pub fn process_transform(program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = metadata
        .get_transform_plugin_config()
        .map(|s| Config::from_json(&s))
        .unwrap_or_default();

    let source_map: Option<Lrc<dyn SourceMapper>> = Some(Lrc::new(metadata.source_map));

    let transform = FlowTransform::new(config, source_map);

    // A failing unit goes back as it came in.
    match transform.validate(&program) {
        Ok(marked) => transform.rewrite(program, marked),
        Err(err) => {
            err.emit();
            program
        }
    }
}

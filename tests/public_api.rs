use swc_core::{
    common::{sync::Lrc, FileName, SourceMap, SourceMapper},
    ecma::{
        ast::{EsVersion, ModuleDecl, ModuleItem, Program},
        parser::{parse_file_as_module, Syntax, TsSyntax},
    },
};
use swc_plugin_async_to_mobx_flow::{transform_program, Config, FlowError};

fn parse(src: &str) -> (Lrc<SourceMap>, Program) {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Custom("store.ts".into()).into(), src.to_string());
    let module = parse_file_as_module(
        &fm,
        Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        }),
        EsVersion::latest(),
        None,
        &mut vec![],
    )
    .expect("parse");
    (cm, Program::Module(module))
}

fn import_source(program: &Program) -> Option<String> {
    let Program::Module(module) = program else {
        return None;
    };
    match module.body.first()? {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
            Some(import.src.value.to_string())
        }
        _ => None,
    }
}

#[test]
fn host_config_selects_the_package() {
    let config = Config::from_json(r#"{ "mobxPackage": "mobx-custom" }"#);
    let (cm, program) = parse(
        "class S { @transformToMobxFlow async load() { await fetch('/'); } }",
    );
    let out = transform_program(program, &config, Some(cm as Lrc<dyn SourceMapper>))
        .expect("transform");
    assert_eq!(import_source(&out).as_deref(), Some("mobx-custom"));
}

#[test]
fn unmarked_program_has_no_import() {
    let (_, program) = parse("export async function f() { await g(); }");
    let out = transform_program(program.clone(), &Config::default(), None).expect("transform");
    assert_eq!(out, program);
}

#[test]
fn error_reports_offending_text() {
    let (cm, program) = parse("const f = transformToMobxFlow(randomFunction);");
    let err = transform_program(program, &Config::default(), Some(cm as Lrc<dyn SourceMapper>))
        .expect_err("not an async function");
    assert!(matches!(err, FlowError::NotAsyncFunction { .. }));
    assert_eq!(
        err.to_string(),
        "[async-to-mobx-flow]: Could not resolve expression as async function: \
         transformToMobxFlow(randomFunction)"
    );
}

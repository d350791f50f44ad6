use crate::core::models::CompilerOptions;
use crate::utils::{BundleError, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::{SemanticBuilder, SemanticBuilderReturn};
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use std::path::Path;

/// One module lowered to plain JavaScript
#[derive(Debug, Clone)]
pub struct TranspiledModule {
    pub code: String,
    /// Source map JSON, present when inline source maps were requested
    pub map: Option<String>,
}

/// Parse, optionally check, strip TypeScript/JSX and print a single module.
pub fn transpile(path: &Path, source: &str, options: &CompilerOptions) -> Result<TranspiledModule> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Err(BundleError::from_diagnostics(path, &parsed.errors));
    }
    let mut program = parsed.program;

    let SemanticBuilderReturn { semantic, errors } = SemanticBuilder::new()
        .with_check_syntax_error(options.check_js)
        .build(&program);
    if options.check_js && !errors.is_empty() {
        return Err(BundleError::from_diagnostics(path, &errors));
    }
    let scoping = semantic.into_scoping();

    let transformed = Transformer::new(&allocator, path, &TransformOptions::default())
        .build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(BundleError::from_diagnostics(path, &transformed.errors));
    }

    let codegen_options = CodegenOptions {
        source_map_path: options.inline_source_map.then(|| path.to_path_buf()),
        ..CodegenOptions::default()
    };
    let printed = Codegen::new().with_options(codegen_options).build(&program);

    Ok(TranspiledModule {
        code: printed.code,
        map: printed.map.map(|map| map.to_json_string()),
    })
}

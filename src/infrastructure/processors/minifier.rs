use crate::utils::{BundleError, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MinifiedCode {
    pub code: String,
    /// Maps minified positions back to the unminified bundle
    pub map: Option<String>,
}

/// JavaScript minification using oxc
pub struct OxcMinifier {
    options: MinifierOptions,
}

impl OxcMinifier {
    pub fn new() -> Self {
        Self {
            options: MinifierOptions::default(),
        }
    }

    pub fn minify(&self, source_code: &str, with_source_map: bool) -> Result<MinifiedCode> {
        let allocator = Allocator::default();

        let parse_result = Parser::new(&allocator, source_code, SourceType::mjs()).parse();
        if parse_result.panicked || !parse_result.errors.is_empty() {
            let errors: Vec<String> = parse_result
                .errors
                .iter()
                .map(|e| format!("Parse error: {}", e))
                .collect();
            return Err(BundleError::build(errors.join("\n")));
        }

        let mut program = parse_result.program;
        let minified = Minifier::new(self.options.clone()).minify(&allocator, &mut program);

        let codegen_options = CodegenOptions {
            source_map_path: with_source_map.then(|| PathBuf::from("bundle.js")),
            ..CodegenOptions::minify()
        };
        let printed = Codegen::new()
            .with_options(codegen_options)
            .with_scoping(minified.scoping)
            .build(&program);

        Ok(MinifiedCode {
            code: printed.code,
            map: printed.map.map(|map| map.to_json_string()),
        })
    }
}

impl Default for OxcMinifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Async wrapper for minification in the build pipeline
pub struct MinificationService {
    minifier: Arc<OxcMinifier>,
}

impl MinificationService {
    pub fn new() -> Self {
        Self {
            minifier: Arc::new(OxcMinifier::new()),
        }
    }

    /// Minify a bundle on the blocking pool since oxc is CPU-intensive
    pub async fn minify_bundle(&self, bundle: String, with_source_map: bool) -> Result<MinifiedCode> {
        let minifier = Arc::clone(&self.minifier);

        tokio::task::spawn_blocking(move || minifier.minify(&bundle, with_source_map))
            .await
            .map_err(|e| BundleError::build(format!("Minification task failed: {}", e)))?
    }
}

impl Default for MinificationService {
    fn default() -> Self {
        Self::new()
    }
}

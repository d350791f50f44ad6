// Rewrites a module's import/export statements into calls against the small
// module runtime emitted at the top of every bundle. Module requests are
// hoisted into a prelude; the statements themselves become blank lines, so
// per-module source maps keep pointing at the right lines.

use crate::utils::{BundleError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::{Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Statement};
use oxc_ast::AstKind;
use oxc_ecmascript::BoundNames;
use oxc_parser::Parser;
use oxc_semantic::{Semantic, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const DEFAULT_EXPORT: &str = "__default_export";

/// Name of the exports object parameter of every module factory
pub const EXPORTS: &str = "__exports";

/// A dependency evaluated before the module body, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `binding` is `None` for `import "x"` and `import {} from "x"`
    Import { specifier: String, binding: Option<String> },
    ReExport { specifier: String, binding: String },
    ReExportAll { specifier: String },
}

impl Request {
    pub fn specifier(&self) -> &str {
        match self {
            Request::Import { specifier, .. }
            | Request::ReExport { specifier, .. }
            | Request::ReExportAll { specifier } => specifier,
        }
    }
}

/// Replace `start..end` of the module body with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

/// Import/export shape of one transpiled module
#[derive(Debug, Clone, Default)]
pub struct ModuleLinkage {
    pub requests: Vec<Request>,
    /// Non-overlapping body rewrites, sorted by position
    pub edits: Vec<Edit>,
    /// Exported name -> expression producing its value inside the module
    pub exports: Vec<(String, String)>,
    /// Specifiers of `export * from` statements
    pub star_exports: Vec<String>,
    pub has_top_level_await: bool,
}

impl ModuleLinkage {
    /// Every specifier this module depends on, in source order
    pub fn specifiers(&self) -> impl Iterator<Item = &str> {
        self.requests.iter().map(Request::specifier)
    }

    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|(name, _)| name.as_str())
    }

    /// `__export(__exports, { ... });` line, if the module exports anything
    pub fn export_getters(&self) -> Option<String> {
        if self.exports.is_empty() {
            return None;
        }
        let getters = self
            .exports
            .iter()
            .map(|(name, value)| format!("{}: () => {}", property_key(name), value))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("__export({EXPORTS}, {{ {getters} }});"))
    }

    /// Requests as one line of statements. `targets` maps each specifier to
    /// the expression that yields its exports object.
    pub fn prelude(&self, targets: &HashMap<String, String>) -> Result<Option<String>> {
        if self.requests.is_empty() {
            return Ok(None);
        }

        let mut statements = Vec::with_capacity(self.requests.len());
        for request in &self.requests {
            let target = targets.get(request.specifier()).ok_or_else(|| {
                BundleError::build(format!("unlinked import '{}'", request.specifier()))
            })?;
            statements.push(match request {
                Request::Import { binding: None, .. } => format!("{target};"),
                Request::Import {
                    binding: Some(binding),
                    ..
                }
                | Request::ReExport { binding, .. } => format!("const {binding} = {target};"),
                Request::ReExportAll { .. } => format!("__reexport({EXPORTS}, {target});"),
            });
        }
        Ok(Some(statements.join(" ")))
    }

    /// Apply the body rewrites to `code`, padding with newlines wherever a
    /// rewrite is shorter in lines than what it replaced.
    pub fn render(&self, code: &str) -> String {
        let mut output = String::with_capacity(code.len() + 64);
        let mut cursor = 0usize;

        for edit in &self.edits {
            let start = edit.start as usize;
            let end = edit.end as usize;
            output.push_str(&code[cursor..start]);
            output.push_str(&edit.text);

            let original_lines = code[start..end].matches('\n').count();
            let replacement_lines = edit.text.matches('\n').count();
            output.push_str(&"\n".repeat(original_lines.saturating_sub(replacement_lines)));
            cursor = end;
        }

        output.push_str(&code[cursor..]);
        output
    }
}

/// Collect the import/export statements of already transpiled JavaScript.
pub fn scan(path: &Path, code: &str) -> Result<ModuleLinkage> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Err(BundleError::from_diagnostics(path, &parsed.errors));
    }
    let program = parsed.program;
    let semantic = SemanticBuilder::new().build(&program).semantic;

    let mut linkage = ModuleLinkage::default();
    // Import statements and `export ... from`/local export lists vanish
    // from the body; references inside them are not rewritten.
    let mut removed: Vec<Span> = Vec::new();
    // Imported local -> live expression on the imported exports object
    let mut imported: HashMap<String, String> = HashMap::new();
    let mut imported_symbols = Vec::new();

    for (index, statement) in program.body.iter().enumerate() {
        match statement {
            Statement::ImportDeclaration(decl) => {
                let binding = format!("__import_{index}");
                let specifiers = decl.specifiers.iter().flatten().collect::<Vec<_>>();
                for specifier in &specifiers {
                    let (local, expression) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (&s.local, format!("{binding}{}", member(s.imported.name().as_str())))
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (&s.local, format!("{binding}.default"))
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (&s.local, binding.clone())
                        }
                    };
                    imported.insert(local.name.to_string(), expression.clone());
                    imported_symbols.push((local.symbol_id(), local.name.to_string(), expression));
                }

                linkage.requests.push(Request::Import {
                    specifier: decl.source.value.to_string(),
                    binding: (!specifiers.is_empty()).then_some(binding),
                });
                removed.push(decl.span);
            }
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    for name in declared_names(declaration) {
                        linkage.exports.push((name.clone(), name));
                    }
                    linkage.edits.push(Edit {
                        start: decl.span.start,
                        end: declaration.span().start,
                        text: String::new(),
                    });
                } else if let Some(source) = &decl.source {
                    let binding = format!("__reexport_{index}");
                    for specifier in &decl.specifiers {
                        linkage.exports.push((
                            specifier.exported.name().to_string(),
                            format!("{binding}{}", member(specifier.local.name().as_str())),
                        ));
                    }
                    linkage.requests.push(Request::ReExport {
                        specifier: source.value.to_string(),
                        binding,
                    });
                    removed.push(decl.span);
                } else {
                    for specifier in &decl.specifiers {
                        linkage.exports.push((
                            specifier.exported.name().to_string(),
                            specifier.local.name().to_string(),
                        ));
                    }
                    removed.push(decl.span);
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                let value = decl.declaration.span();
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.id.as_ref(),
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => class.id.as_ref(),
                    _ => None,
                };

                let (export, prefix, suffix) = match named {
                    Some(id) => (id.name.to_string(), String::new(), None),
                    None => (
                        DEFAULT_EXPORT.to_string(),
                        format!("const {DEFAULT_EXPORT} = "),
                        Some(";".to_string()),
                    ),
                };
                linkage.exports.push(("default".to_string(), export));
                linkage.edits.push(Edit {
                    start: decl.span.start,
                    end: value.start,
                    text: prefix,
                });
                if let Some(text) = suffix {
                    linkage.edits.push(Edit {
                        start: value.end,
                        end: decl.span.end.max(value.end),
                        text,
                    });
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                let specifier = decl.source.value.to_string();
                match &decl.exported {
                    Some(exported) => {
                        let binding = format!("__reexport_{index}");
                        linkage.exports.push((exported.name().to_string(), binding.clone()));
                        linkage.requests.push(Request::ReExport { specifier, binding });
                    }
                    None => {
                        linkage.star_exports.push(specifier.clone());
                        linkage.requests.push(Request::ReExportAll { specifier });
                    }
                }
                removed.push(decl.span);
            }
            _ => {}
        }
    }

    // `export { a }` of an imported `a` exports the live import.
    for (_, value) in &mut linkage.exports {
        if let Some(expression) = imported.get(value.as_str()) {
            *value = expression.clone();
        }
    }

    linkage.edits.extend(removed.iter().map(|span| Edit {
        start: span.start,
        end: span.end,
        text: String::new(),
    }));
    linkage
        .edits
        .extend(import_references(&semantic, &imported_symbols, &removed));
    linkage.edits.sort_by_key(|edit| edit.start);
    linkage.has_top_level_await = has_top_level_await(&semantic);

    Ok(linkage)
}

/// Point every reference to an imported binding at the imported module's
/// exports object, so reads stay live across cycles and reassignments.
fn import_references(
    semantic: &Semantic<'_>,
    imported: &[(oxc_semantic::SymbolId, String, String)],
    removed: &[Span],
) -> Vec<Edit> {
    let shorthand: HashSet<u32> = semantic
        .nodes()
        .iter()
        .filter_map(|node| match node.kind() {
            AstKind::ObjectProperty(prop) if prop.shorthand => Some(prop.value.span().start),
            _ => None,
        })
        .collect();

    let mut edits = Vec::new();
    for (symbol_id, name, expression) in imported {
        for reference in semantic.symbol_references(*symbol_id) {
            let AstKind::IdentifierReference(ident) = semantic.nodes().kind(reference.node_id())
            else {
                continue;
            };
            let span = ident.span;
            if removed.iter().any(|r| r.start <= span.start && span.end <= r.end) {
                continue;
            }
            let text = if shorthand.contains(&span.start) {
                format!("{}: {expression}", property_key(name))
            } else {
                expression.clone()
            };
            edits.push(Edit {
                start: span.start,
                end: span.end,
                text,
            });
        }
    }
    edits
}

/// `await` (or `for await`) outside of any function
fn has_top_level_await(semantic: &Semantic<'_>) -> bool {
    let nodes = semantic.nodes();
    nodes.iter().any(|node| {
        let awaits = match node.kind() {
            AstKind::AwaitExpression(_) => true,
            AstKind::ForOfStatement(stmt) => stmt.r#await,
            _ => false,
        };
        awaits
            && !nodes.ancestors(node.id()).any(|ancestor| {
                matches!(
                    ancestor.kind(),
                    AstKind::Function(_) | AstKind::ArrowFunctionExpression(_)
                )
            })
    })
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    let mut names = Vec::new();
    declaration.bound_names(&mut |ident| names.push(ident.name.to_string()));
    names
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Double-quoted JavaScript string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Object key for `name`, quoted when it is not a plain identifier
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// `.name` or `["name"]`
fn member(name: &str) -> String {
    if is_identifier(name) {
        format!(".{name}")
    } else {
        format!("[{}]", string_literal(name))
    }
}

use crate::core::{interfaces::*, models::*};
use crate::infrastructure::module_resolver::{normalize_path, ModuleResolver, Resolution};
use crate::infrastructure::processors::linker::{self, property_key, string_literal, ModuleLinkage, EXPORTS};
use crate::infrastructure::processors::minifier::MinificationService;
use crate::infrastructure::processors::transpiler::{transpile, TranspiledModule};
use crate::utils::source_maps::{self, SourceMapJoiner};
use crate::utils::{BundleError, Logger, Result, Timer};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module registry shared by every bundle. Each module is a factory that
/// fills its exports object the first time it is required.
const RUNTIME_REGISTRY: &str = "var __modules = {};\nvar __cache = {};\n";

const RUNTIME_REQUIRE: &str = r#"function __require(id) {
  var cached = __cache[id];
  if (cached) return cached;
  var exports = (__cache[id] = {});
  __modules[id](exports);
  return exports;
}
"#;

/// Used when any module awaits at the top level. A cached module that is
/// still evaluating can only be an importer further up the current chain,
/// so it is returned without waiting, as a cycle does in ESM.
const RUNTIME_REQUIRE_ASYNC: &str = r#"async function __require(id) {
  var cached = __cache[id];
  if (cached) return cached;
  var exports = (__cache[id] = {});
  await __modules[id](exports);
  return exports;
}
"#;

const RUNTIME_HELPERS: &str = r#"function __export(target, getters) {
  Object.keys(getters).forEach(function (name) {
    Object.defineProperty(target, name, { get: getters[name], enumerable: true });
  });
}
function __reexport(target, source) {
  Object.keys(source).forEach(function (name) {
    if (name !== "default" && !Object.prototype.hasOwnProperty.call(target, name)) {
      Object.defineProperty(target, name, { get: function () { return source[name]; }, enumerable: true });
    }
  });
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Module(usize),
    External(usize),
}

impl Target {
    fn expression(self, is_async: bool) -> String {
        match self {
            Target::Module(id) if is_async => format!("await __require({id})"),
            Target::Module(id) => format!("__require({id})"),
            Target::External(index) => format!("__external_{index}"),
        }
    }
}

struct LoadedModule {
    path: PathBuf,
    source: String,
    transpiled: TranspiledModule,
    linkage: ModuleLinkage,
    targets: HashMap<String, Target>,
}

/// Every module reachable from the entry, indexed by module id (entry = 0)
struct ModuleGraph {
    modules: Vec<LoadedModule>,
    externals: Vec<String>,
}

struct EmittedBundle {
    code: String,
    source_map: Option<sourcemap::SourceMap>,
}

/// Bundles TypeScript/JavaScript module graphs with oxc
pub struct OxcBundler {
    fs_service: Arc<dyn FileSystemService>,
    resolver: ModuleResolver,
    minification: MinificationService,
}

#[async_trait::async_trait]
impl Bundler for OxcBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput> {
        let _timer = Timer::start("Bundling JavaScript modules");

        let graph = self.load_graph(request).await?;
        let emitted = emit(&graph, request)?;

        let (mut code, source_map) = if request.minify {
            let minified = self
                .minification
                .minify_bundle(emitted.code, emitted.source_map.is_some())
                .await?;
            let source_map = match (emitted.source_map, minified.map) {
                (Some(map), Some(minified_map)) => Some(source_maps::compose(map, &minified_map)?),
                (map, _) => map,
            };
            (minified.code, source_map)
        } else {
            (emitted.code, emitted.source_map)
        };

        if let Some(map) = &source_map {
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&source_maps::inline_comment(map)?);
            code.push('\n');
        }

        Ok(BundleOutput {
            code,
            modules: graph.modules.len(),
        })
    }
}

impl OxcBundler {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self {
            resolver: ModuleResolver::new(Arc::clone(&fs_service)),
            fs_service,
            minification: MinificationService::new(),
        }
    }

    async fn load_graph(&self, request: &BundleRequest) -> Result<ModuleGraph> {
        let entry = normalize_path(&request.entry_point);

        let mut ids: HashMap<PathBuf, usize> = HashMap::from([(entry.clone(), 0)]);
        let mut queue = VecDeque::from([entry]);
        let mut modules = Vec::new();
        let mut externals: Vec<String> = Vec::new();

        // Breadth-first, so module ids follow discovery order.
        while let Some(path) = queue.pop_front() {
            let source = self.fs_service.read_file(&path).await?;
            let transpiled = transpile(&path, &source, &request.compiler_options)?;
            let linkage = linker::scan(&path, &transpiled.code)?;
            Logger::module_loaded(&path, modules.len());

            let mut targets = HashMap::new();
            for specifier in linkage.specifiers() {
                if targets.contains_key(specifier) {
                    continue;
                }
                let target = match self.resolver.resolve(specifier, &path)? {
                    Resolution::Local(dependency) => {
                        let next_id = ids.len();
                        let id = *ids.entry(dependency).or_insert_with_key(|dependency| {
                            queue.push_back(dependency.clone());
                            next_id
                        });
                        Target::Module(id)
                    }
                    Resolution::External(specifier) => {
                        let index = match externals.iter().position(|known| *known == specifier) {
                            Some(index) => index,
                            None => {
                                Logger::external_module(&specifier);
                                externals.push(specifier);
                                externals.len() - 1
                            }
                        };
                        Target::External(index)
                    }
                };
                targets.insert(specifier.to_string(), target);
            }

            modules.push(LoadedModule {
                path,
                source,
                transpiled,
                linkage,
                targets,
            });
        }

        Ok(ModuleGraph { modules, externals })
    }
}

/// Bundle text plus the number of lines written so far
#[derive(Default)]
struct BundleWriter {
    code: String,
    lines: usize,
}

impl BundleWriter {
    fn push_str(&mut self, text: &str) {
        self.lines += text.matches('\n').count();
        self.code.push_str(text);
    }

    fn push_line(&mut self, line: &str) {
        self.push_str(line);
        self.push_str("\n");
    }
}

fn emit(graph: &ModuleGraph, request: &BundleRequest) -> Result<EmittedBundle> {
    let base_dir = request.entry_point.parent().map(normalize_path).unwrap_or_default();
    let is_async = graph.modules.iter().any(|module| module.linkage.has_top_level_await);
    let (async_keyword, await_keyword) = if is_async { ("async ", "await ") } else { ("", "") };
    let mut out = BundleWriter::default();

    match request.module_kind {
        ModuleKind::Esm => {
            for (index, specifier) in graph.externals.iter().enumerate() {
                out.push_line(&format!(
                    "import * as __external_{index} from {};",
                    string_literal(specifier)
                ));
            }
        }
        ModuleKind::Classic => {
            if let Some(specifier) = graph.externals.first() {
                return Err(BundleError::build(format!(
                    "'{specifier}' cannot be imported from a classic script bundle; use --type=esm"
                )));
            }
            out.push_line(&format!("({async_keyword}function () {{"));
        }
    }
    out.push_str(RUNTIME_REGISTRY);
    out.push_str(if is_async { RUNTIME_REQUIRE_ASYNC } else { RUNTIME_REQUIRE });
    out.push_str(RUNTIME_HELPERS);

    let mut joiner = request
        .compiler_options
        .inline_source_map
        .then(|| SourceMapJoiner::new(None));

    for (id, module) in graph.modules.iter().enumerate() {
        let name = display_name(&module.path, &base_dir);
        out.push_line(&format!("// {name}"));
        out.push_line(&format!("__modules[{id}] = {async_keyword}function ({EXPORTS}) {{"));
        if let Some(getters) = module.linkage.export_getters() {
            out.push_line(&getters);
        }

        let targets: HashMap<String, String> = module
            .targets
            .iter()
            .map(|(specifier, target)| (specifier.clone(), target.expression(is_async)))
            .collect();
        if let Some(prelude) = module.linkage.prelude(&targets)? {
            out.push_line(&prelude);
        }

        if let (Some(joiner), Some(map)) = (joiner.as_mut(), &module.transpiled.map) {
            let line_offset = u32::try_from(out.lines)
                .map_err(|_| BundleError::build("bundle too large for a source map"))?;
            joiner.add_module(map, line_offset, &name, &module.source)?;
        }

        let body = module.linkage.render(&module.transpiled.code);
        out.push_str(&body);
        if !body.ends_with('\n') {
            out.push_str("\n");
        }
        out.push_line("};");
    }

    match request.module_kind {
        ModuleKind::Esm => {
            out.push_line(&format!("const __entry = {await_keyword}__require(0);"));
            let exported = entry_exports(graph);
            if !exported.names.is_empty() {
                let mut specifiers = Vec::with_capacity(exported.names.len());
                for (index, name) in exported.names.iter().enumerate() {
                    out.push_line(&format!(
                        "const __entry_export_{index} = __entry[{}];",
                        string_literal(name)
                    ));
                    specifiers.push(format!("__entry_export_{index} as {}", property_key(name)));
                }
                out.push_line(&format!("export {{ {} }};", specifiers.join(", ")));
            }
            for specifier in &exported.external_stars {
                out.push_line(&format!("export * from {};", string_literal(specifier)));
            }
        }
        ModuleKind::Classic => {
            out.push_line(&format!("{await_keyword}__require(0);"));
            out.push_line("})();");
        }
    }

    Ok(EmittedBundle {
        code: out.code,
        source_map: joiner.map(SourceMapJoiner::finish),
    })
}

/// What the entry module exposes
#[derive(Debug, Default)]
struct EntryExports {
    names: Vec<String>,
    /// `export *` of external modules, re-exported as is
    external_stars: Vec<String>,
}

/// Names the entry module exposes, following `export *` through bundled
/// modules. Star re-exports of external modules are kept as specifiers since
/// their names are not known statically.
fn entry_exports(graph: &ModuleGraph) -> EntryExports {
    fn collect(
        graph: &ModuleGraph,
        id: usize,
        include_default: bool,
        visited: &mut HashSet<usize>,
        exports: &mut EntryExports,
    ) {
        if !visited.insert(id) {
            return;
        }
        let module = &graph.modules[id];
        for name in module.linkage.export_names() {
            if (include_default || name != "default") && !exports.names.iter().any(|known| known == name) {
                exports.names.push(name.to_string());
            }
        }
        for specifier in &module.linkage.star_exports {
            match module.targets.get(specifier) {
                Some(Target::Module(dependency)) => {
                    collect(graph, *dependency, false, visited, exports);
                }
                Some(Target::External(index)) => {
                    let external = &graph.externals[*index];
                    if !exports.external_stars.contains(external) {
                        exports.external_stars.push(external.clone());
                    }
                }
                None => {}
            }
        }
    }

    let mut exports = EntryExports::default();
    collect(graph, 0, true, &mut HashSet::new(), &mut exports);
    exports
}

fn display_name(path: &Path, base_dir: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

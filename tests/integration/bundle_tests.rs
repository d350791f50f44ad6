use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tsbundle::cli::{CliHandler, Outcome};
use tsbundle::config::{CheckerCommand, ToolchainConfig};
use tsbundle::core::interfaces::FileSystemService;
use tsbundle::core::models::{BundleConfig, ModuleKind};
use tsbundle::core::services::BundlePipeline;
use tsbundle::infrastructure::{OxcBundler, ProcessTypeChecker, TokioFileSystemService};
use tsbundle::utils::BundleError;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    dir
}

/// The entry path arrives as `$0` of the script.
fn shell_checker(script: &str) -> CheckerCommand {
    CheckerCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

fn pipeline(checker: CheckerCommand) -> BundlePipeline {
    let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
    BundlePipeline::new(
        fs_service.clone(),
        Arc::new(ProcessTypeChecker::new(checker)),
        Arc::new(OxcBundler::new(fs_service)),
    )
}

fn config(entry: &Path, outfile: PathBuf) -> BundleConfig {
    BundleConfig {
        entry_point: entry.to_path_buf(),
        outfile,
        module_kind: ModuleKind::Esm,
        minify: false,
        source_map: false,
        check: true,
    }
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

const MAIN_TS: &str = r#"import { greet } from "./greet.ts";

const name: string = "world";
console.log(greet(name));
"#;

const GREET_TS: &str = r#"export function greet(name: string): string {
  return `hello ${name}`;
}
"#;

#[cfg(unix)]
#[tokio::test]
async fn test_checked_entry_is_bundled_next_to_source() {
    let dir = project(&[("main.ts", MAIN_TS), ("greet.ts", GREET_TS)]);
    let toolchain = ToolchainConfig {
        checker: shell_checker("echo \"Check $0\""),
        ..ToolchainConfig::default()
    };

    let outcome = CliHandler::new(&toolchain)
        .run(&[arg(&dir.path().join("main.ts"))])
        .await;

    assert_eq!(outcome, Outcome::Completed);
    let bundle = std::fs::read_to_string(dir.path().join("main.js")).unwrap();
    assert!(bundle.contains("function greet(name)"));
    assert!(bundle.contains("console.log"));
    assert!(!bundle.contains(": string"));
    assert!(!bundle.contains("sourceMappingURL"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_check_reports_diagnostics_and_writes_nothing() {
    let dir = project(&[("bad.ts", "const count: string = 42;\n")]);
    let entry = dir.path().join("bad.ts");
    let checker = shell_checker("echo \"error: TS2322 [ERROR]: Type 'number' is not assignable\" >&2; exit 1");

    let err = pipeline(checker)
        .run(&config(&entry, dir.path().join("bad.js")))
        .await
        .unwrap_err();

    assert!(matches!(err, BundleError::TypeCheck { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Type-checking failed for"));
    assert!(message.contains("bad.ts"));
    assert!(message.contains("TS2322"));
    assert!(!dir.path().join("bad.js").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_check_off_never_spawns_checker() {
    let dir = project(&[("main.ts", MAIN_TS), ("greet.ts", GREET_TS)]);
    let marker = dir.path().join("checker-ran");
    let toolchain = ToolchainConfig {
        checker: shell_checker(&format!("touch '{}'; exit 1", marker.display())),
        ..ToolchainConfig::default()
    };

    let outcome = CliHandler::new(&toolchain)
        .run(&[
            arg(&dir.path().join("main.ts")),
            arg(&dir.path().join("out/app.js")),
            "--check=off".to_string(),
        ])
        .await;

    assert_eq!(outcome, Outcome::Completed);
    assert!(!marker.exists());
    assert!(dir.path().join("out/app.js").exists());
}

#[tokio::test]
async fn test_missing_checker_program_fails_run() {
    let dir = project(&[("main.ts", "console.log(1);\n")]);
    let entry = dir.path().join("main.ts");
    let checker = CheckerCommand {
        program: "tsbundle-no-such-checker".to_string(),
        args: Vec::new(),
    };

    let err = pipeline(checker)
        .run(&config(&entry, dir.path().join("main.js")))
        .await
        .unwrap_err();

    assert!(matches!(err, BundleError::Spawn { .. }));
    assert!(!dir.path().join("main.js").exists());
}

#[tokio::test]
async fn test_classic_minified_bundle_with_source_map() {
    let dir = project(&[("main.ts", MAIN_TS), ("greet.ts", GREET_TS)]);
    let entry = dir.path().join("main.ts");
    let outfile = dir.path().join("dist/bundle.js");
    let mut config = config(&entry, outfile.clone());
    config.module_kind = ModuleKind::Classic;
    config.minify = true;
    config.source_map = true;
    config.check = false;

    let written = pipeline(CheckerCommand::default()).run(&config).await.unwrap();

    assert_eq!(written, outfile);
    let bundle = std::fs::read_to_string(&outfile).unwrap();
    assert!(bundle.contains("//# sourceMappingURL=data:application/json;base64,"));
    assert!(!bundle.contains("export {"));
}

#[tokio::test]
async fn test_help_and_usage_errors_do_not_touch_disk() {
    let handler = CliHandler::new(&ToolchainConfig::default());

    assert_eq!(handler.run(&["-h"]).await, Outcome::HelpShown);
    assert_eq!(handler.run(&["missing.ts", "--help"]).await, Outcome::HelpShown);
    assert_eq!(handler.run(&["--minify"]).await, Outcome::UsageError);
    assert_eq!(Outcome::UsageError.exit_code(), 1);
}

/// Bundles that must behave like the unbundled modules when executed.
const RUNTIME_CASES: &[(&str, &[(&str, &str)], &str)] = &[
    (
        "cycle",
        &[
            ("main.ts", "import { b } from './b.ts';\nexport const a = () => 'A';\nconsole.log('cycle', b());\n"),
            ("b.ts", "import { a } from './main.ts';\nexport const b = () => 'B' + a();\n"),
        ],
        "cycle BA",
    ),
    (
        "live",
        &[
            ("main.ts", "import { count, inc } from './c.ts';\ninc();\nconsole.log('live', count);\n"),
            ("c.ts", "export let count = 0;\nexport function inc(): void { count += 1; }\n"),
        ],
        "live 1",
    ),
    (
        "hoist",
        &[
            ("main.ts", "console.log('hoist', (globalThis as any).order);\nimport './side.ts';\n"),
            ("side.ts", "(globalThis as any).order = 'side-first';\n"),
        ],
        "hoist side-first",
    ),
    (
        "top-level await",
        &[
            ("main.ts", "import { base } from './base.ts';\nconst x: number = await Promise.resolve(base);\nconsole.log('tla', x + 1);\n"),
            ("base.ts", "export const base = 41;\n"),
        ],
        "tla 42",
    ),
    (
        "exports shadowing",
        &[("main.ts", "const exports = { a: 1 };\nconsole.log('shadow', exports.a);\n")],
        "shadow 1",
    ),
];

#[tokio::test]
#[ignore = "needs `node` on PATH"]
async fn test_bundles_execute_like_modules() {
    for (name, files, expected) in RUNTIME_CASES {
        for minify in [false, true] {
            let dir = project(files);
            let outfile = dir.path().join("out.mjs");
            let mut config = config(&dir.path().join("main.ts"), outfile.clone());
            config.check = false;
            config.minify = minify;

            pipeline(CheckerCommand::default()).run(&config).await.unwrap();

            let output = tokio::process::Command::new("node")
                .arg(&outfile)
                .output()
                .await
                .unwrap();
            let stdout = String::from_utf8_lossy(&output.stdout);
            assert!(
                output.status.success(),
                "{name} (minify: {minify}) failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            assert_eq!(stdout.trim(), *expected, "{name} (minify: {minify})");
        }
    }
}

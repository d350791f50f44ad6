use crate::core::models::{BundleConfig, ModuleKind, ParsedArgs};
use crate::utils::{BundleError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static TS_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(ts|tsx)$").unwrap());

/// Parse `<entry> [<outfile>] [--type=esm|ife] [--check=on|off] [--minify] [--sourceMap]`.
///
/// `-h`/`--help` anywhere wins over everything else. Options are
/// `--key[=value]`; unknown keys and extra positionals are ignored.
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<ParsedArgs> {
    if tokens.iter().any(|t| matches!(t.as_ref(), "-h" | "--help")) {
        return Ok(ParsedArgs::Help);
    }

    let mut entry = String::new();
    let mut outfile = String::new();
    let mut module_kind = ModuleKind::Esm;
    let mut minify = false;
    let mut source_map = false;
    let mut check = true;

    for token in tokens.iter().map(AsRef::as_ref) {
        if let Some(option) = token.strip_prefix("--") {
            let mut parts = option.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next();

            match key {
                "type" => {
                    module_kind = if value == Some("ife") {
                        ModuleKind::Classic
                    } else {
                        ModuleKind::Esm
                    };
                }
                "check" => check = value != Some("off"),
                "minify" => minify = true,
                "sourceMap" => source_map = true,
                _ => {}
            }
        } else if entry.is_empty() {
            entry = token.to_string();
        } else if outfile.is_empty() {
            outfile = token.to_string();
        }
    }

    if entry.is_empty() {
        return Err(BundleError::missing_entry());
    }

    if outfile.is_empty() {
        outfile = default_outfile(&entry);
    }

    Ok(ParsedArgs::Run(BundleConfig {
        entry_point: PathBuf::from(entry),
        outfile: PathBuf::from(outfile),
        module_kind,
        minify,
        source_map,
        check,
    }))
}

/// `main.ts`/`main.tsx` -> `main.js`; any other name is kept as is.
pub fn default_outfile(entry: &str) -> String {
    TS_EXTENSION.replace(entry, ".js").into_owned()
}

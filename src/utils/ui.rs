use colored::*;

/// Usage text shown for `-h` / `--help`
pub fn help_text() -> String {
    format!(
        "
{usage}
  {entry}         The entry point file to bundle {required}.
  {outfile}    The output file (default: entryfile.js).
  {kind}      Module type: esm | ife (default: esm).
  {check}     Enable type checking: on | off (default: on).
  {minify}      Minify the output file.
  {source_map}   Generate source maps.

  Example:
    {example} main.ts main.js --type=esm --minify --sourceMap
",
        usage = "Usage:".bold(),
        entry = "<url>".cyan(),
        required = "(required)".bright_magenta(),
        outfile = "<outfile>?".cyan(),
        kind = "--type=?".cyan(),
        check = "--check=?".cyan(),
        minify = "--minify".cyan(),
        source_map = "--sourceMap".cyan(),
        example = "tsbundle".yellow(),
    )
}

pub fn show_help() {
    println!("{}", help_text());
}

pub fn show_usage_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

pub fn show_success() {
    println!("{}", "Process completed successfully!".green());
}

pub fn show_failure(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
    eprintln!("Process terminated due to errors.");
}

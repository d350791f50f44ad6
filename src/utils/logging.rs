use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Install the global subscriber. Falls back to the default filter when
    /// the configured directive does not parse.
    pub fn init(filter: &str) {
        let env_filter = EnvFilter::try_new(filter)
            .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

        // A second init (tests, embedding) keeps the first subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .without_time()
            .try_init();
    }

    pub fn type_check_start(entry: &Path) {
        debug!("🔍 Type-checking {}", entry.display());
    }

    pub fn type_check_passed(entry: &Path, stdout: &str) {
        info!("Type-checking successful for {}", entry.display());
        if !stdout.is_empty() {
            info!("{}", stdout.trim_end());
        }
    }

    pub fn type_check_skipped(entry: &Path) {
        debug!("⚡ Type-checking disabled for {}", entry.display());
    }

    pub fn bundling(entry: &Path, kind: &str) {
        debug!("📦 Bundling {} ({})", entry.display(), kind);
    }

    pub fn module_loaded(path: &Path, id: usize) {
        debug!("⚡ Loaded module #{}: {}", id, path.display());
    }

    pub fn external_module(specifier: &str) {
        debug!("🔗 Keeping external import: {}", specifier);
    }

    pub fn bundle_saved(outfile: &Path, modules: usize, bytes: usize) {
        debug!("📊 {} modules, {} bytes", modules, bytes);
        info!("Bundle saved to {}", outfile.display());
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}

//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};

/// Run `f` with a thread-local subscriber that writes to a temporary log
/// file, and return what was written.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn capture_log_file(f: impl FnOnce()) -> String {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let layer = subscriber::FileLayer::at(&path).expect("failed to create file layer");
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
    tracing::subscriber::with_default(subscriber, f);
    std::fs::read_to_string(&path).expect("log file should exist")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_formats_levels() {
        let contents = capture_log_file(|| {
            let log = Logger::new("test");
            log.stage("Install Node.js");
            log.debug("which node");
            log.dry_run("would install: Node.js");
            log.warn("\x1b[33mrefresh failed\x1b[0m");
        });
        assert!(contents.contains("healing-setup "));
        assert!(contents.contains("==> Install Node.js"));
        assert!(contents.contains("[debug] which node"));
        assert!(contents.contains("[dry run] would install: Node.js"));
        assert!(contents.contains("[warn] refresh failed"));
    }
}

use tracing::Level;
use tracing_subscriber::{
    filter::Targets,
    fmt::{
        self,
        format::{Format, Full},
        time::SystemTime,
    },
    prelude::*,
};

fn build_base_log_format() -> Format<Full, SystemTime> {
    fmt::format()
        .with_level(true)
        .with_ansi(false)
        .with_file(true)
        .with_target(true)
        .with_thread_names(true)
}

/// Installs the global subscriber for the command line tools.
///
/// Console output goes to stderr so it never interleaves with tables or the
/// prompt on stdout. When `base_log_dir` is set, every event at `DEBUG` and
/// above is also written to a daily plain-text file and a daily JSON file.
pub fn setup_logging(base_log_dir: Option<&str>, file_name: &str, verbose: bool) {
    let console_level = if verbose { Level::DEBUG } else { Level::WARN };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(build_base_log_format().with_ansi(true))
        .with_writer(std::io::stderr)
        .with_filter(
            Targets::new()
                .with_target("hyper_util", Level::INFO)
                .with_target("reqwest", Level::INFO)
                .with_default(console_level),
        );

    let subscriber = tracing_subscriber::registry().with(stderr_layer);

    match base_log_dir.filter(|dir| !dir.is_empty()) {
        Some(base_log_dir) => {
            let file_filter = Targets::new()
                .with_target("hyper_util", Level::INFO)
                .with_target("reqwest", Level::INFO)
                .with_default(Level::DEBUG);

            let log_file_layer = tracing_subscriber::fmt::layer()
                .event_format(build_base_log_format())
                .with_writer(tracing_appender::rolling::daily(base_log_dir, file_name))
                .with_filter(file_filter.clone());
            let json_file_layer = tracing_subscriber::fmt::layer()
                .event_format(build_base_log_format().json())
                .with_writer(tracing_appender::rolling::daily(
                    format!("{}/structured", base_log_dir),
                    file_name,
                ))
                .with_filter(file_filter);
            subscriber.with(log_file_layer).with(json_file_layer).init();
        }
        None => subscriber.init(),
    }
}

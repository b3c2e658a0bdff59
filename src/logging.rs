use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Install a stderr fmt layer. Stdout stays free for protocol frames and
/// command output.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(level: LevelFilter) -> bool {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

//! UCI front-end binary: installs a stderr-only tracing subscriber (so a
//! GUI driving the engine over stdio never sees log noise on stdout) and
//! runs the command loop.

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    corvus::uci::run();
}

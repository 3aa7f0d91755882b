use runner_sim::common::error::ConfigError;
use runner_sim::common::tunables::Tunables;

/// Optional first argument: path to a RON tunables file.
fn main() -> Result<(), ConfigError> {
    let tunables = match std::env::args_os().nth(1) {
        Some(path) => Tunables::load(path)?,
        None => Tunables::demo(),
    };
    runner_sim::game::run(tunables);
    Ok(())
}

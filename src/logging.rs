use std::io;

use crate::config::Config;

/// Install the global logger. Records look like `<pid> [LEVEL] target: message`
/// so output from a forked child can be told apart from the session's own.
pub fn init(config: &Config) -> Result<(), fern::InitError> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                std::process::id(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.log_level);

    let dispatch = match &config.log_file {
        Some(path) => dispatch.chain(fern::log_file(path)?),
        None => dispatch.chain(io::stderr()),
    };

    dispatch.apply()?;
    Ok(())
}

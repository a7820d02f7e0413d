#[cfg(not(unix))]
compile_error!("simple-shell drives fork/exec directly and only builds on Unix");

mod builtins;
mod config;
mod error;
mod executor;
mod job_control;
mod jobs;
mod logging;
mod parser;
mod redirect;
mod session;
mod signals;
mod status;

use std::io;

use config::Config;
use session::{Ended, Session};

fn main() {
    let config = Config::from_env();
    if let Err(e) = logging::init(&config) {
        eprintln!("simple-shell: logging disabled: {e}");
    }

    if let Err(e) = signals::install() {
        log::error!("{e}");
        println!("Could not bind signal handler");
        std::process::exit(1);
    }

    let mut session = Session::new();
    match session.run(io::stdin().lock()) {
        Ok(Ended::Exit) => std::process::exit(0),
        Ok(Ended::EndOfInput) => {
            log::info!("end of input");
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("{e}");
            println!("{e}");
            std::process::exit(1);
        }
    }
}

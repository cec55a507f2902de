mod args;
mod signals;

use clap::Parser;
use std::io::{self, Write};
use tracing::{debug, warn};

use args::Args;
use minils_core::{ListParams, Lister, LoggingConfig, MinilsConfig};

fn main() {
    let args = Args::parse();

    let loaded = MinilsConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    if let Err(e) = LoggingConfig::from_env()
        .with_fallbacks(config.log_level.as_deref(), config.log_file.as_ref())
        .init()
    {
        eprintln!("minils: logging disabled: {}", e);
    }
    if let Err(e) = &loaded {
        if MinilsConfig::exists() {
            warn!(target: "cli", error = %e, "ignoring config file");
        }
    }

    if let Err(e) = signals::block_terminal_stop() {
        warn!(target: "cli", error = %e, "could not block SIGTSTP");
    }

    let params = ListParams::new(args.path, args.long);
    debug!(target: "cli", directory = %params.directory.display(), long = params.long_format, "listing");

    let stdout = io::stdout();
    let stderr = io::stderr();
    let outcome = Lister::new(params).run(&mut stdout.lock(), &mut stderr.lock());
    if !outcome.is_completed() {
        debug!(target: "cli", ?outcome, "listing ended early");
    }

    let _ = io::stdout().flush();
}

use clap::Parser;
use std::path::PathBuf;

/// List directory contents
#[derive(Parser, Debug)]
#[command(name = "minils", version, about)]
pub struct Args {
    /// Long format: access, links, owner, group, size, access time, name
    #[arg(short = 'l')]
    pub long: bool,

    /// Directory to list
    #[arg(value_name = "name")]
    pub path: Option<PathBuf>,
}

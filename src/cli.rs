//! CLI domain: parse, route and output only.

mod output;
mod parse;
mod route;

pub use output::{map_error, render};
pub use parse::{parse_env_pair, Cli};
pub use route::{build_env, load_config, RunContext};

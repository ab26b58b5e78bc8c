use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally: typed, instrumented cache over Redis",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [store] and [cache] sections
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the Redis URL from the config
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Use a throwaway in-memory store instead of Redis
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a value, print its identifier, read it back and replay the calls
    Demo(DemoArgs),
    /// Store a value and print its identifier
    Store(StoreArgs),
    /// Read a value by identifier
    Get(GetArgs),
    /// Show the recorded call history of an operation
    Replay(ReplayArgs),
    /// Fetch a page through the page cache
    Fetch(FetchArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Do not flush the store before the demo
    #[arg(long)]
    pub keep: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ValueKind {
    Text,
    Bytes,
    Int,
    Float,
}

#[derive(Args)]
pub struct StoreArgs {
    pub value: String,
    #[arg(long, default_value = "text")]
    pub kind: ValueKind,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Decode {
    Raw,
    Str,
    Int,
    Float,
}

#[derive(Args)]
pub struct GetArgs {
    pub id: String,
    #[arg(long = "as", default_value = "raw")]
    pub decode: Decode,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[arg(default_value = tally_cache::STORE_OPERATION)]
    pub operation: String,
}

#[derive(Args)]
pub struct FetchArgs {
    pub url: String,
    /// Expiry in seconds (defaults to cache.page_ttl_secs)
    #[arg(long)]
    pub ttl: Option<u64>,
}

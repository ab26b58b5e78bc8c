use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use tally_cache::{Cache, CacheConfig, HttpFetcher, Identifier, PageCache, StoredValue};
use tally_instrument::{OperationKey, ReplayEngine};
use tally_store::{InMemoryStore, RedisStore, SharedStore};

use crate::cli::*;
use crate::config::AppConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::resolve(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.store.url = url.clone();
    }
    let store = open_store(&config, cli.memory)?;

    match cli.command {
        Command::Demo(args) => cmd_demo(store, &config, args, &cli.format),
        Command::Store(args) => cmd_store(store, &config, args, &cli.format),
        Command::Get(args) => cmd_get(store, &config, args, &cli.format),
        Command::Replay(args) => cmd_replay(store, args, &cli.format),
        Command::Fetch(args) => cmd_fetch(store, &config, args, &cli.format),
    }
}

fn open_store(config: &AppConfig, memory: bool) -> anyhow::Result<SharedStore> {
    if memory {
        return Ok(Arc::new(InMemoryStore::new()));
    }
    let store = RedisStore::connect(&config.store)
        .with_context(|| format!("connecting to {}", config.store.url))?;
    Ok(Arc::new(store))
}

/// Only the demo starts a fresh session; the other commands work against
/// whatever the store already holds.
fn session_cache(store: SharedStore, config: &CacheConfig, flush: bool) -> anyhow::Result<Cache> {
    let config = config.clone().with_flush_on_start(flush);
    Ok(Cache::with_config(store, &config)?)
}

fn cmd_demo(
    store: SharedStore,
    config: &AppConfig,
    args: DemoArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let flush = config.cache.flush_on_start && !args.keep;
    let cache = session_cache(store, &config.cache, flush)?;

    let key = cache.store(b"hello")?;
    let back = cache.get(&key)?;
    cache.store(123)?;
    cache.store("bar")?;
    let replay = cache.replay()?;

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "id": key.to_string(),
                "value": back.as_deref().map(String::from_utf8_lossy),
                "replay": replay,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{}", key.to_string().yellow());
            match back {
                Some(bytes) => println!("{}", StoredValue::Bytes(bytes).to_string()),
                None => println!("{}", "(absent)".dimmed()),
            }
            println!();
            print_replay_text(replay);
        }
    }
    Ok(())
}

fn cmd_store(
    store: SharedStore,
    config: &AppConfig,
    args: StoreArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let cache = session_cache(store, &config.cache, false)?;
    let value = parse_value(&args.value, args.kind)?;
    let kind = value.kind();
    let id = cache.store(value)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id.to_string(), "kind": kind })),
        OutputFormat::Text => println!("{}", id.to_string().yellow()),
    }
    Ok(())
}

fn parse_value(text: &str, kind: ValueKind) -> anyhow::Result<StoredValue> {
    Ok(match kind {
        ValueKind::Text => StoredValue::Text(text.to_string()),
        ValueKind::Bytes => StoredValue::Bytes(text.as_bytes().to_vec()),
        ValueKind::Int => StoredValue::Integer(
            text.parse().with_context(|| format!("{text:?} is not an integer"))?,
        ),
        ValueKind::Float => StoredValue::Float(
            text.parse().with_context(|| format!("{text:?} is not a number"))?,
        ),
    })
}

fn cmd_get(
    store: SharedStore,
    config: &AppConfig,
    args: GetArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let cache = session_cache(store, &config.cache, false)?;
    let id: Identifier = args.id.parse()?;

    let value: Option<serde_json::Value> = match args.decode {
        Decode::Raw => cache
            .get(&id)?
            .map(|bytes| StoredValue::Bytes(bytes).to_string().into()),
        Decode::Str => cache.get_str(&id)?.map(Into::into),
        Decode::Int => cache.get_int(&id)?.map(Into::into),
        Decode::Float => cache.get_float(&id)?.map(Into::into),
    };

    match (format, value) {
        (OutputFormat::Json, value) => {
            println!("{}", serde_json::json!({ "id": id.to_string(), "value": value }))
        }
        (OutputFormat::Text, Some(serde_json::Value::String(text))) => println!("{text}"),
        (OutputFormat::Text, Some(other)) => println!("{other}"),
        (OutputFormat::Text, None) => println!("{} {}", "absent:".red(), id),
    }
    Ok(())
}

fn cmd_replay(store: SharedStore, args: ReplayArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let operation: OperationKey = args.operation.parse()?;
    let replay = ReplayEngine::replay(store.as_ref(), &operation)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&replay)?),
        OutputFormat::Text => print_replay_text(replay),
    }
    Ok(())
}

fn print_replay_text(replay: tally_instrument::Replay) {
    let unpaired = replay.unpaired;
    let mut lines = replay.into_lines();
    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    for line in lines {
        println!("{line}");
    }
    if unpaired > 0 {
        println!("{} {unpaired} unpaired history entries", "warning:".yellow());
    }
}

fn cmd_fetch(
    store: SharedStore,
    config: &AppConfig,
    args: FetchArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(Duration::from_secs(30))?;
    let pages = PageCache::new(store, fetcher, config.cache.page_ttl());
    let ttl = args.ttl.map_or(pages.default_ttl(), Duration::from_secs);

    let body = pages.fetch_cached(&args.url, ttl)?;
    let count = pages.access_count(&args.url)?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "url": args.url, "access_count": count, "body": body })
        ),
        OutputFormat::Text => {
            println!("{body}");
            println!("{} {}", "Access count:".bold(), count);
        }
    }
    Ok(())
}

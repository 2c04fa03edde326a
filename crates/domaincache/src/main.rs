use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domaincache::{namespace_prefix, CacheConfig, CacheFacade, CacheValue};

/// domaincache - Inspect and manipulate a domain-namespaced cache
#[derive(Parser, Debug)]
#[command(name = "domaincache")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Store host [env: REDIS_HOST]
    #[arg(long, global = true)]
    host: Option<String>,

    /// Store port [env: REDIS_PORT]
    #[arg(long, short, global = true)]
    port: Option<u16>,

    /// AUTH password [env: REDIS_PASSWORD]
    #[arg(long, global = true)]
    password: Option<String>,

    /// Database index [env: REDIS_DB]
    #[arg(long, global = true)]
    db: Option<i64>,

    /// Domain the key namespace is derived from [env: CACHE_DOMAIN, BASE_URL]
    #[arg(long, short, global = true)]
    domain: Option<String>,

    /// Use a reconnecting connection [env: REDIS_PERSISTENT]
    #[arg(long, global = true)]
    persistent: bool,

    /// Never connect; every store command fails [env: REDIS_ACTIVE=false]
    #[arg(long, global = true)]
    inactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the namespace prefix for a domain (default: the configured one)
    Prefix {
        #[arg(value_name = "DOMAIN")]
        target: Option<String>,
    },
    /// Check that the store answers
    Ping,
    /// Read a value
    Get {
        key: String,
        /// Print the stored string without decoding it
        #[arg(long)]
        raw: bool,
    },
    /// Store a value
    Set {
        key: String,
        value: String,
        /// Time to live in seconds; 0 or absent means no expiry
        #[arg(long)]
        ttl: Option<u64>,
        /// Parse the value as JSON before storing it
        #[arg(long)]
        json: bool,
    },
    /// Delete a key
    Delete { key: String },
    /// Check whether a key exists
    Has { key: String },
    /// Print the remaining time to live of a key
    Ttl { key: String },
    /// Increment a counter
    Incr {
        key: String,
        #[arg(long, default_value_t = 1)]
        by: i64,
    },
    /// Decrement a counter
    Decr {
        key: String,
        #[arg(long, default_value_t = 1)]
        by: i64,
    },
    /// Set a hash field
    Hset {
        key: String,
        field: String,
        value: String,
    },
    /// Read a hash field
    Hget { key: String, field: String },
    /// Delete a hash field
    Hdel { key: String, field: String },
    /// Print every field of a hash
    Hgetall { key: String },
    /// Delete every key of the namespace matching a glob pattern
    DeletePattern { pattern: String },
    /// Drop the whole database, every namespace included
    Flush {
        /// Confirm the flush
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn config(&self) -> CacheConfig {
        let mut config = CacheConfig::from_env();
        if let Some(host) = &self.host {
            config = config.with_host(host);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(password) = &self.password {
            config = config.with_password(password);
        }
        if let Some(db) = self.db {
            config = config.with_database(db);
        }
        if let Some(domain) = &self.domain {
            config = config.with_domain(domain);
        }
        if self.persistent {
            config = config.with_persistent(true);
        }
        if self.inactive {
            config = config.with_active(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domaincache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config();

    // Printing a prefix needs no store connection.
    let cache = match &cli.command {
        Command::Prefix { .. } => CacheFacade::disabled(config.domain.as_deref()),
        _ => CacheFacade::connect(&config).await,
    };
    run(&cache, cli.command).await
}

/// Prefix for an explicit domain, or the cache's own one.
fn prefix_for(cache: &CacheFacade, target: Option<&str>) -> String {
    match target {
        Some(domain) => namespace_prefix(Some(domain)),
        None => cache.prefix().to_string(),
    }
}

async fn run(cache: &CacheFacade, command: Command) -> Result<()> {
    match command {
        Command::Prefix { target } => println!("{}", prefix_for(cache, target.as_deref())),
        Command::Ping => {
            if !cache.is_connected().await {
                bail!("store is not reachable");
            }
            println!("PONG");
        }
        Command::Get { key, raw } => {
            let value = if raw {
                cache.get_raw(&key).await?.map(CacheValue::raw)
            } else {
                cache.get(&key).await?
            };
            match value {
                Some(value) => println!("{}", value),
                None => bail!("key not found: {}", key),
            }
        }
        Command::Set {
            key,
            value,
            ttl,
            json,
        } => {
            let value = if json {
                let parsed: serde_json::Value =
                    serde_json::from_str(&value).context("value is not valid JSON")?;
                CacheValue::from(parsed)
            } else {
                CacheValue::from(value)
            };
            cache.set(&key, value, ttl.map(Duration::from_secs)).await?;
            println!("OK");
        }
        Command::Delete { key } => println!("{}", cache.delete(&key).await?),
        Command::Has { key } => println!("{}", cache.has(&key).await?),
        Command::Ttl { key } => match cache.ttl(&key).await? {
            Some(ttl) => println!("{}", ttl.as_secs()),
            None => println!("none"),
        },
        Command::Incr { key, by } => println!("{}", cache.increment(&key, by).await?),
        Command::Decr { key, by } => println!("{}", cache.decrement(&key, by).await?),
        Command::Hset { key, field, value } => {
            println!("{}", cache.hset(&key, &field, value).await?)
        }
        Command::Hget { key, field } => match cache.hget(&key, &field).await? {
            Some(value) => println!("{}", value),
            None => bail!("field not found: {} {}", key, field),
        },
        Command::Hdel { key, field } => println!("{}", cache.hdel(&key, &field).await?),
        Command::Hgetall { key } => {
            let mut fields: Vec<_> = cache.hgetall(&key).await?.into_iter().collect();
            fields.sort();
            for (field, value) in fields {
                println!("{}\t{}", field, value);
            }
        }
        Command::DeletePattern { pattern } => {
            println!("{}", cache.delete_by_pattern(&pattern).await?)
        }
        Command::Flush { yes } => {
            if !yes {
                bail!("flush drops every namespace in the database; pass --yes to confirm");
            }
            cache.flush_all().await?;
            println!("OK");
        }
    }
    Ok(())
}

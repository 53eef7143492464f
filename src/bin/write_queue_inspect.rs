use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::env;
use tokio::runtime::Runtime;
use verdant_sync::{
    AppConfig, ConnectionPool, DeadLetterRecord, DeadLetterStore, ReplayReport, ReplayTrigger,
    SqliteWriteQueueStore, SyncState, TriggerOutcome, WriteQueueStore, WriteRecord,
};

#[derive(Debug, Clone, Default)]
struct CliOptions {
    database_url: Option<String>,
    dead_letters: bool,
    pretty: bool,
    replay: bool,
    purge_dead_letters: bool,
}

#[derive(Debug, serde::Serialize)]
struct QueueReport {
    collected_at_ms: i64,
    pending_count: usize,
    pending: Vec<WriteRecord>,
    dead_letter_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dead_letters: Option<Vec<DeadLetterRecord>>,
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum ReplayJobReport {
    Completed { report: ReplayReport },
    Aborted { error: String },
    Skipped,
    Unreachable,
}

#[derive(Debug, serde::Serialize)]
struct PurgeReport {
    purged: u64,
}

fn usage() -> &'static str {
    "Usage: write_queue_inspect [--database-url <url>] [--dead-letters] [--pretty] \
     [--replay] [--purge-dead-letters]"
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(args)?;

    let mut config = AppConfig::from_env();
    if let Some(url) = &options.database_url {
        config.database.url = url.clone();
    }

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let payload = if options.replay {
        verdant_sync::init_logging();
        let report = rt.block_on(run_replay(&config))?;
        to_json(&report, options.pretty)?
    } else if options.purge_dead_letters {
        let report = rt.block_on(purge(&config))?;
        to_json(&report, options.pretty)?
    } else {
        let report = rt.block_on(collect_report(&config, options.dead_letters))?;
        to_json(&report, options.pretty)?
    };

    println!("{payload}");
    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<(ConnectionPool, SqliteWriteQueueStore)> {
    let url = &config.database.url;
    let pool = ConnectionPool::new(url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to connect to database at {url}"))?;
    pool.migrate()
        .await
        .with_context(|| format!("Failed to migrate database at {url}"))?;
    let store = SqliteWriteQueueStore::new(pool.get_pool().clone());
    Ok((pool, store))
}

async fn collect_report(config: &AppConfig, include_dead_letters: bool) -> Result<QueueReport> {
    let (pool, store) = open_store(config).await?;

    let pending = store
        .list_all()
        .await
        .context("Failed to list queued writes")?;
    let dead_letter_count = store
        .count_dead_letters()
        .await
        .context("Failed to count dead letters")?;
    let dead_letters = if include_dead_letters {
        Some(
            store
                .list_dead_letters()
                .await
                .context("Failed to list dead letters")?,
        )
    } else {
        None
    };
    pool.close().await;

    Ok(QueueReport {
        collected_at_ms: Utc::now().timestamp_millis(),
        pending_count: pending.len(),
        pending,
        dead_letter_count,
        dead_letters,
    })
}

async fn purge(config: &AppConfig) -> Result<PurgeReport> {
    let (pool, store) = open_store(config).await?;
    let purged = store
        .purge_dead_letters()
        .await
        .context("Failed to purge dead letters")?;
    pool.close().await;
    Ok(PurgeReport { purged })
}

async fn run_replay(config: &AppConfig) -> Result<ReplayJobReport> {
    let state = SyncState::connect(config)
        .await
        .context("Failed to initialize offline sync state")?;

    let outcome = state.scheduler.trigger(ReplayTrigger::Manual).await;
    state.close().await;

    Ok(match outcome {
        TriggerOutcome::Completed(report) => ReplayJobReport::Completed { report },
        TriggerOutcome::Aborted(error) => ReplayJobReport::Aborted { error },
        TriggerOutcome::Skipped => ReplayJobReport::Skipped,
        TriggerOutcome::Unreachable => ReplayJobReport::Unreachable,
    })
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--database-url" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--database-url requires a value\n{}", usage())
                })?;
                options.database_url = Some(value);
            }
            "--dead-letters" => options.dead_letters = true,
            "--pretty" => options.pretty = true,
            "--replay" => options.replay = true,
            "--purge-dead-letters" => options.purge_dead_letters = true,
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other => {
                bail!("Unknown argument: {other}\n{}", usage());
            }
        }
    }

    if options.replay && options.purge_dead_letters {
        bail!("--replay and --purge-dead-letters cannot be combined\n{}", usage());
    }

    Ok(options)
}

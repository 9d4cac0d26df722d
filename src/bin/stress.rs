//! AtlasKV MemTable stress tool
//!
//! Hammers a single memtable from many threads, then verifies every write.

use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use atlaskv_memtable::{
    AtlasError, Config, InternalIterator, InternalKey, InternalKeyKind, MemTable,
};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// AtlasKV MemTable stress tool
#[derive(Parser, Debug)]
#[command(name = "atlaskv-stress")]
#[command(about = "Concurrent write/read load against one memtable")]
#[command(version)]
struct Args {
    /// Number of writer threads
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Keys written per thread
    #[arg(short, long, default_value = "10000")]
    keys: usize,

    /// Value size in bytes
    #[arg(short, long, default_value = "64")]
    value_size: usize,

    /// Arena size in MB
    #[arg(short, long, default_value = "64")]
    arena_mb: usize,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlaskv_memtable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("AtlasKV MemTable stress v{}", atlaskv_memtable::VERSION);
    tracing::info!(
        threads = args.threads,
        keys = args.keys,
        value_size = args.value_size,
        arena_mb = args.arena_mb,
        "starting"
    );

    let config = Config::builder()
        .arena_size(args.arena_mb * 1024 * 1024)
        .build();
    let memtable = MemTable::new(&config);

    match run(&args, &memtable) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("stress run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn key_for(thread: usize, i: usize) -> Vec<u8> {
    format!("t{:03}-k{:08}", thread, i).into_bytes()
}

fn run(args: &Args, memtable: &MemTable) -> Result<(), AtlasError> {
    let seq = AtomicU64::new(1);
    let value = vec![0xA5u8; args.value_size];

    // Write phase
    let start = Instant::now();
    let written = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..args.threads)
            .map(|t| {
                let seq = &seq;
                let value = &value;
                s.spawn(move |_| -> Result<u64, AtlasError> {
                    for i in 0..args.keys {
                        let seq_num = seq.fetch_add(1, Ordering::Relaxed);
                        let key = InternalKey::new(key_for(t, i), seq_num, InternalKeyKind::Set);
                        memtable.set(&key, value)?;
                    }
                    Ok(args.keys as u64)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(res) => res,
                Err(_) => Err(AtlasError::Corruption("writer thread panicked".into())),
            })
            .sum::<Result<u64, AtlasError>>()
    })
    .map_err(|_| AtlasError::Corruption("writer scope panicked".into()))??;

    let elapsed = start.elapsed();
    tracing::info!(
        written,
        elapsed_ms = elapsed.as_millis() as u64,
        ops_per_sec = (written as f64 / elapsed.as_secs_f64()) as u64,
        memory = memtable.approximate_memory_usage(),
        "write phase done"
    );

    // Read phase
    let start = Instant::now();
    let read_seq = seq.load(Ordering::Relaxed);
    for t in 0..args.threads {
        for i in 0..args.keys {
            let got = memtable.get(&InternalKey::lookup(key_for(t, i), read_seq))?;
            if got != value.as_slice() {
                return Err(AtlasError::Corruption(format!(
                    "value mismatch for thread {} key {}",
                    t, i
                )));
            }
        }
    }
    let elapsed = start.elapsed();
    tracing::info!(
        read = written,
        elapsed_ms = elapsed.as_millis() as u64,
        "read phase done"
    );

    // Scan phase
    let mut iter = memtable.new_iter();
    let mut scanned = 0u64;
    iter.first();
    while iter.valid() {
        scanned += 1;
        iter.next();
    }
    iter.close()?;
    if scanned != written {
        return Err(AtlasError::Corruption(format!(
            "scan saw {} entries, expected {}",
            scanned, written
        )));
    }
    tracing::info!(scanned, "scan phase done");

    Ok(())
}

use std::io::{BufWriter, Write};
use std::num::IntErrorKind;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, ensure};
use chrono::Local;
use clap::{Parser, Subcommand};
use segsieve::{Error, MillerRabin, SieveConfig, SieveState, baseline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "segsieve")]
#[command(
    about = "Segmented prime sieve and deterministic 64-bit primality test",
    long_about = None
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = 16,
        env = "SEGSIEVE_BLOCK_SIZE_LOG2",
        help = "Segment width is 2^k numbers (2 to 16)"
    )]
    block_size_log2: u32,
    #[arg(
        long,
        global = true,
        default_value_t = 1024,
        env = "SEGSIEVE_MR_SMALL_THRESHOLD",
        help = "Inputs below this are decided by trial division"
    )]
    mr_small_threshold: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Count the primes below segments * 2^k")]
    Count {
        #[arg(short, long, help = "Number of segments to sieve")]
        segments: u64,
    },
    #[command(about = "Print every prime below segments * 2^k, one per line")]
    Primes {
        #[arg(short, long, help = "Number of segments to sieve")]
        segments: u64,
    },
    #[command(about = "Decide whether a 64-bit integer is prime")]
    IsPrime {
        #[arg(help = "The number to test")]
        n: String,
    },
    #[command(about = "Count primes with every strategy and compare timings")]
    Bench {
        #[arg(short, long, default_value = "10", help = "Number of segments to sieve")]
        segments: u64,
        #[arg(long, help = "Skip the trial division baseline")]
        skip_trial: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) => eprintln!("error [{}]: {}", err.kind(), err),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// LOG_FORMAT=json for machine-readable logs, human-readable otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SieveConfig::new(cli.block_size_log2, cli.mr_small_threshold)?;

    match cli.command {
        Commands::Count { segments } => {
            let start = Instant::now();
            let state = sieve(config, segments)?;
            let duration = start.elapsed();

            println!(
                "Total: {} primes below {}",
                state.count(),
                state.upper_bound()
            );
            print_duration("Execution time", duration);
        }
        Commands::Primes { segments } => {
            let state = sieve(config, segments)?;

            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let mut itoa_buf = itoa::Buffer::new();
            for prime in state.enumerate() {
                writer.write_all(itoa_buf.format(prime).as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        Commands::IsPrime { n } => {
            let value = parse_u64(&n)?;
            let tester = MillerRabin::from_config(&config);
            let verdict = if tester.is_prime(value) {
                "prime"
            } else {
                "not prime"
            };
            println!("{} is {}", value, verdict);
        }
        Commands::Bench {
            segments,
            skip_trial,
        } => bench(config, segments, skip_trial)?,
    }

    Ok(())
}

fn sieve(config: SieveConfig, segments: u64) -> segsieve::Result<SieveState> {
    let mut state = SieveState::init(config)?;
    state.run_segments(segments)?;
    info!(
        segments,
        count = state.count(),
        upper_bound = state.upper_bound(),
        "sieve finished"
    );
    Ok(state)
}

fn parse_u64(input: &str) -> anyhow::Result<u64> {
    match input.trim().parse::<u64>() {
        Ok(value) => Ok(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            Err(Error::InputOverflow(input.trim().to_string()).into())
        }
        Err(e) => Err(e).with_context(|| format!("invalid number {:?}", input)),
    }
}

fn print_duration(label: &str, duration: Duration) {
    let duration_us = duration.as_micros();
    println!(
        "{}: {}us ({:.2}ms)",
        label,
        duration_us,
        duration_us as f64 / 1000.0
    );
}

/// Count the primes below `segments * B` every way and report each timing.
fn bench(config: SieveConfig, segments: u64, skip_trial: bool) -> anyhow::Result<()> {
    config.check_segments(segments)?;
    let limit = segments * config.block_size();

    println!(
        "Benchmark run at {} (limit {}, block size {})",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        limit,
        config.block_size()
    );

    let mut counts = Vec::new();

    if skip_trial {
        println!("\n[trial division] skipped");
    } else {
        let start = Instant::now();
        let count = baseline::count_by_trial_division(limit) as u64;
        report("trial division", count, start.elapsed());
        counts.push(count);
    }

    let tester = MillerRabin::from_config(&config);
    let start = Instant::now();
    let count = baseline::count_by_primality_test(limit, &tester) as u64;
    report("miller-rabin", count, start.elapsed());
    counts.push(count);

    let start = Instant::now();
    let count = baseline::simple_sieve(limit).len() as u64;
    report("simple sieve", count, start.elapsed());
    counts.push(count);

    let start = Instant::now();
    let count = baseline::count_odd_sieve(limit) as u64;
    report("odd-only sieve", count, start.elapsed());
    counts.push(count);

    let start = Instant::now();
    let count = sieve(config, segments)?.count();
    report("segmented sieve", count, start.elapsed());
    counts.push(count);

    ensure!(
        counts.windows(2).all(|w| w[0] == w[1]),
        "strategies disagree on the prime count: {:?}",
        counts
    );
    Ok(())
}

fn report(name: &str, count: u64, duration: Duration) {
    println!("\n[{}]", name);
    println!("count: {}", count);
    print_duration("Execution time", duration);
}

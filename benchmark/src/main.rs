use clap::Parser;
use hdrhistogram::Histogram;
use otc_settle::calculate_trade_amounts;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of concurrent workers
    #[arg(short, long, default_value = "4")]
    concurrency: usize,

    /// Pause between quotes per worker, in microseconds
    #[arg(short, long, default_value = "0")]
    interval: u64,

    /// Duration of the benchmark in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Payment token scale used for every quote
    #[arg(short, long, default_value = "6")]
    scale: u32,
}

fn random_inputs(rng: &mut StdRng) -> (Decimal, Decimal, Decimal) {
    let amount = Decimal::new(rng.gen_range(1..100_000_000), rng.gen_range(0..=8));
    let price = Decimal::new(rng.gen_range(1..10_000_000), rng.gen_range(0..=2));
    let fee_rate = Decimal::new(rng.gen_range(0..10_000), 6);
    (amount, price, fee_rate)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let args = Args::parse();

    let histogram = Arc::new(Mutex::new(Histogram::<u64>::new(3)?));
    let total_quotes = Arc::new(Mutex::new(0u64));
    let total_errors = Arc::new(Mutex::new(0u64));

    println!(
        "Starting benchmark with {} concurrent workers, interval {} us, scale {}",
        args.concurrency, args.interval, args.scale
    );

    let mut handles = vec![];
    for worker in 0..args.concurrency {
        let histogram = histogram.clone();
        let total_quotes = total_quotes.clone();
        let total_errors = total_errors.clone();
        let interval = args.interval;
        let scale = args.scale;

        let handle = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(worker as u64);
            loop {
                let (amount, price, fee_rate) = random_inputs(&mut rng);
                let start = Instant::now();
                match calculate_trade_amounts(amount, price, fee_rate, scale) {
                    Ok(_) => {
                        let elapsed = start.elapsed();
                        let mut hist = histogram.lock().await;
                        if let Err(e) = hist.record(elapsed.as_nanos() as u64) {
                            log::warn!("failed to record latency: {}", e);
                        }
                        *total_quotes.lock().await += 1;
                    }
                    Err(e) => {
                        log::debug!("quote failed: {}", e);
                        *total_errors.lock().await += 1;
                    }
                }

                if interval > 0 {
                    sleep(Duration::from_micros(interval)).await;
                } else {
                    tokio::task::yield_now().await;
                }
            }
        });

        handles.push(handle);
    }

    sleep(Duration::from_secs(args.duration)).await;

    for handle in handles {
        handle.abort();
    }

    let total = *total_quotes.lock().await;
    let errors = *total_errors.lock().await;
    let hist = histogram.lock().await;

    println!("\nBenchmark Results:");
    println!("Total Quotes: {}", total);
    println!("Failed Quotes: {}", errors);
    println!("Average QPS: {:.2}", total as f64 / args.duration as f64);
    println!("\nLatency Distribution (nanoseconds):");
    println!("p50: {}", hist.value_at_percentile(50.0));
    println!("p90: {}", hist.value_at_percentile(90.0));
    println!("p95: {}", hist.value_at_percentile(95.0));
    println!("p99: {}", hist.value_at_percentile(99.0));
    println!("p99.9: {}", hist.value_at_percentile(99.9));

    Ok(())
}

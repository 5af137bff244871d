use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int32Builder, Int64Array, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;

use sweepscope::data::loader::AXIS_METADATA_KEY;
use sweepscope::data::model::{FrequencyAxis, Level, SENTINEL};

#[derive(Parser)]
#[command(name = "generate_sample", about = "Write a synthetic sweep batch to Parquet")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "sample_sweeps.parquet")]
    output: PathBuf,

    /// Number of sweeps
    #[arg(long, default_value_t = 1000)]
    sweeps: usize,

    /// Frequency bins per sweep
    #[arg(long, default_value_t = 201)]
    bins: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Carrier: (centre bin, width in bins, level above the noise floor in dB,
/// drift in bins per 1000 sweeps).
const CARRIERS: [(f64, f64, f64, f64); 4] = [
    (20.0, 1.5, 55.0, 0.0),
    (75.0, 2.5, 40.0, 3.0),
    (130.0, 1.0, 48.0, -2.0),
    (180.0, 3.0, 30.0, 0.5),
];

const NOISE_FLOOR_DB: f64 = -95.0;
const FAILED_READING_RATE: f64 = 0.01;

fn generate_levels(sweep: usize, bins: usize, rng: &mut SimpleRng) -> Vec<Level> {
    let scale = bins as f64 / 201.0;
    (0..bins)
        .map(|bin| {
            if rng.next_f64() < FAILED_READING_RATE {
                return SENTINEL;
            }
            let signal: f64 = CARRIERS
                .iter()
                .map(|&(centre, width, amp, drift)| {
                    let mu = (centre + drift * sweep as f64 / 1000.0) * scale;
                    let sigma = width * scale.max(1.0);
                    amp * (-(bin as f64 - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
                })
                .sum();
            let level = NOISE_FLOOR_DB + signal + rng.gauss(0.0, 2.0);
            // keep clear of the sentinel
            level.round().clamp(-127.0, 127.0) as Level
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let start_ms: i64 = 1_466_000_000_000;
    let mut timestamp = start_ms;

    let mut indices = Vec::with_capacity(args.sweeps);
    let mut timestamps = Vec::with_capacity(args.sweeps);
    let mut total_times = Vec::with_capacity(args.sweeps);
    let mut levels_builder = ListBuilder::new(Int32Builder::new());

    for sweep in 0..args.sweeps {
        let total_time_ms = 4800 + (rng.next_u64() % 400) as i64;

        indices.push(sweep as i64);
        timestamps.push(timestamp);
        total_times.push(total_time_ms);

        let values = levels_builder.values();
        for level in generate_levels(sweep, args.bins, &mut rng) {
            values.append_value(level);
        }
        levels_builder.append(true);

        timestamp += total_time_ms + 200;
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("sweep_index", DataType::Int64, false),
        Field::new("timestamp", DataType::Int64, false),
        Field::new("total_time_ms", DataType::Int64, false),
        Field::new(
            "levels",
            DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
            false,
        ),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(indices)),
            Arc::new(Int64Array::from(timestamps)),
            Arc::new(Int64Array::from(total_times)),
            Arc::new(levels_builder.finish()),
        ],
    )
    .context("building record batch")?;

    // 88–108 MHz broadcast band spread over the requested bins
    let step = if args.bins > 1 { 20.0 / (args.bins - 1) as f64 } else { 0.1 };
    let axis = FrequencyAxis {
        start: 88.0,
        stop: 88.0 + step * args.bins.saturating_sub(1) as f64,
        step,
        exp: 6,
    };
    let props = WriterProperties::builder()
        .set_key_value_metadata(Some(vec![KeyValue::new(
            AXIS_METADATA_KEY.to_string(),
            serde_json::to_string(&axis).context("encoding frequency axis")?,
        )]))
        .build();

    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).context("creating parquet writer")?;
    writer.write(&batch).context("writing sweeps")?;
    writer.close().context("closing parquet writer")?;

    info!("wrote {} sweeps to {}", args.sweeps, args.output.display());
    println!(
        "Wrote {} sweeps ({} bins each) to {}",
        args.sweeps,
        args.bins,
        args.output.display()
    );
    Ok(())
}

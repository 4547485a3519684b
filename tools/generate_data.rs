//! Governance Data Generator
//!
//! Writes synthetic training and test files in the canonical governance
//! layout for exercising the classifier.

use anyhow::{Context, Result};
use governance_classifier::{schema::DataSchema, GovernanceRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use tracing::info;

const TENANTS: [&str; 5] = ["contoso", "fabrikam", "northwind", "adventureworks", "tailspin"];
const TRACKS: [&str; 3] = ["Collaboration", "Security", "Compliance"];

/// Record generator for testing
struct RecordGenerator {
    rng: StdRng,
}

impl RecordGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a well governed tenant observation
    fn generate_good(&mut self) -> GovernanceRecord {
        let signals = [(); 6].map(|_| self.signal(0.9..3.0));
        self.record(signals, true, "owners assigned, policies applied")
    }

    /// Generate a poorly governed tenant observation
    fn generate_bad(&mut self) -> GovernanceRecord {
        let signals = [(); 6].map(|_| self.signal(0.0..1.6));
        self.record(signals, false, "orphaned sites, sharing unrestricted")
    }

    fn record(&mut self, signals: [f32; 6], label: bool, description: &str) -> GovernanceRecord {
        let mut record = GovernanceRecord::with_signals(self.random_choice(&TENANTS), signals)
            .labeled(label);
        record.track = self.random_choice(&TRACKS).to_string();
        record.description = description.to_string();
        record
    }

    fn signal(&mut self, range: std::ops::Range<f32>) -> f32 {
        (self.rng.gen_range(range) * 10.0).round() / 10.0
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn write_file(
    path: &Path,
    generator: &mut RecordGenerator,
    count: usize,
    good_rate: f64,
) -> Result<(usize, usize)> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(DataSchema::governance().header())?;

    let mut good = 0;
    for _ in 0..count {
        let record = if generator.rng.gen_bool(good_rate) {
            good += 1;
            generator.generate_good()
        } else {
            generator.generate_bad()
        };

        let [age, security, activity, protection, usage, change] =
            record.signals().map(|v| v.to_string());
        writer.write_record([
            record.tenant.as_str(),
            record.track.as_str(),
            age.as_str(),
            security.as_str(),
            activity.as_str(),
            protection.as_str(),
            usage.as_str(),
            change.as_str(),
            if record.label == Some(true) { "true" } else { "false" },
            record.description.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok((good, count - good))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_data=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or("Data");
    let train_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(200);
    let test_count: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(60);
    let seed: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
    let good_rate: f64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(0.6);

    info!(
        out_dir = %out_dir,
        train_count,
        test_count,
        seed,
        good_rate,
        "Configuration loaded"
    );

    let out_dir = Path::new(out_dir);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut generator = RecordGenerator::new(seed);
    for (name, count) in [("traindata.csv", train_count), ("testdata.csv", test_count)] {
        let path = out_dir.join(name);
        let (good, bad) = write_file(&path, &mut generator, count, good_rate)?;
        info!(path = %path.display(), good, bad, "Wrote governance data");
    }

    Ok(())
}

//! Mock production data.
//!
//! Generates products spread over three plants with a small fixed topology.
//! Status draws are weighted so most parts come out healthy.

use std::sync::Mutex;

use alerts::{Product, ProductSource};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const PLANTS: [&str; 3] = ["PLANT-A", "PLANT-B", "PLANT-C"];
pub const LINES_PER_PLANT: usize = 2;
pub const STATIONS_PER_LINE: usize = 3;
pub const PROGRAMS: [&str; 3] = ["PRG-100", "PRG-200", "PRG-300"];
pub const PARTS: [&str; 4] = ["PART-7A", "PART-7B", "PART-9C", "PART-12"];

pub const CONTROLLER_STATUSES: [(&str, u32); 3] = [("OK", 80), ("Warning", 15), ("Error", 5)];
pub const AI_STATUSES: [(&str, u32); 3] = [("Normal", 85), ("Anomaly", 10), ("Unknown", 5)];

pub const TEMPERATURE_RANGE: (f64, f64) = (60.0, 100.0);
pub const PRESSURE_RANGE: (f64, f64) = (1.0, 10.0);

/// Seedable product generator.
pub struct MockGenerator {
    rng: StdRng,
    sequence: u64,
}

impl MockGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, sequence: 0 }
    }

    /// `count` products, newest first, one second apart.
    pub fn products(&mut self, count: usize) -> Vec<Product> {
        let now = Utc::now();
        (0..count)
            .map(|offset| {
                let timestamp = now - Duration::seconds(offset as i64);
                self.product(timestamp)
            })
            .collect()
    }

    fn product(&mut self, timestamp: chrono::DateTime<Utc>) -> Product {
        self.sequence += 1;
        let plant = PLANTS[self.rng.gen_range(0..PLANTS.len())];
        let plant_suffix = plant.trim_start_matches("PLANT-");
        let line = self.rng.gen_range(1..=LINES_PER_PLANT);
        let station = self.rng.gen_range(1..=STATIONS_PER_LINE);

        Product {
            id: format!("P-{:06}", self.sequence),
            serial_number: format!("SN{}{:08}", plant_suffix, self.rng.gen_range(0..100_000_000u32)),
            timestamp,
            plant_id: plant.to_string(),
            line_id: format!("{plant_suffix}-L{line}"),
            station_id: format!("{plant_suffix}-L{line}-S{station}"),
            program_id: pick(&mut self.rng, &PROGRAMS),
            part_id: pick(&mut self.rng, &PARTS),
            controller_status: weighted(&mut self.rng, &CONTROLLER_STATUSES),
            ai_status: weighted(&mut self.rng, &AI_STATUSES),
            temperature: Some(round1(
                self.rng.gen_range(TEMPERATURE_RANGE.0..TEMPERATURE_RANGE.1),
            )),
            pressure: Some(round1(self.rng.gen_range(PRESSURE_RANGE.0..PRESSURE_RANGE.1))),
        }
    }
}

fn pick(rng: &mut StdRng, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

fn weighted(rng: &mut StdRng, values: &[(&str, u32)]) -> String {
    values
        .choose_weighted(rng, |(_, weight)| *weight)
        .map(|(value, _)| (*value).to_string())
        .unwrap_or_default()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Product source that regenerates its batch on every snapshot.
///
/// Time-based rules read from this between polling cycles, so they see
/// fresh data rather than the batch the last cycle used.
pub struct MockFeed {
    generator: Mutex<MockGenerator>,
    batch_size: usize,
}

impl MockFeed {
    pub fn new(seed: Option<u64>, batch_size: usize) -> Self {
        Self {
            generator: Mutex::new(MockGenerator::new(seed)),
            batch_size,
        }
    }

    pub fn next_batch(&self) -> Vec<Product> {
        self.generator
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .products(self.batch_size)
    }
}

impl ProductSource for MockFeed {
    fn snapshot(&self) -> Vec<Product> {
        self.next_batch()
    }
}

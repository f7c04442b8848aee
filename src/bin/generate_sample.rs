//! Writes `sample_sales.csv` and `sample_sales.xlsx`: a small sales ledger with
//! repeated rows, blank cells and a text column, for trying out the cleaner.

use anyhow::{Context, Result};

use tidy_panda::data::export::export;
use tidy_panda::{CellValue, Column, ExportFormat, Table};

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ROWS: usize = 40;
const MISSING_RATE: f64 = 0.15;
const DUPLICATE_RATE: f64 = 0.2;

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Doohickey"];

    let mut rows: Vec<[CellValue; 5]> = Vec::with_capacity(ROWS);
    let mut order_id: i64 = 1000;
    while rows.len() < ROWS {
        // Re-emit an earlier row verbatim now and then.
        if !rows.is_empty() && rng.chance(DUPLICATE_RATE) {
            let copy = rng.pick(&rows).clone();
            rows.push(copy);
            continue;
        }

        let units = (rng.next_f64() * 50.0).round() as i64 + 1;
        let price = (rng.next_f64() * 2000.0).round() / 100.0 + 1.0;
        let mut maybe = |value: CellValue| {
            if rng.chance(MISSING_RATE) {
                CellValue::Null
            } else {
                value
            }
        };
        let row = [
            CellValue::Integer(order_id),
            maybe(CellValue::Text(regions[order_id as usize % regions.len()].to_string())),
            maybe(CellValue::Text(products[order_id as usize % products.len()].to_string())),
            maybe(CellValue::Integer(units)),
            maybe(CellValue::Float(price)),
        ];
        rows.push(row);
        order_id += 1;
    }

    let names = ["order_id", "region", "product", "units", "unit_price"];
    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(*name, rows.iter().map(|r| r[i].clone()).collect()))
        .collect();
    let table = Table::from_columns(columns).context("assembling sample table")?;

    for format in ExportFormat::ALL {
        let download = export(&table, format, "sample_sales")
            .with_context(|| format!("serializing sample as {format}"))?;
        std::fs::write(&download.file_name, &download.bytes)
            .with_context(|| format!("writing {}", download.file_name))?;
        println!(
            "Wrote {} rows ({} distinct) to {}",
            table.len(),
            table.distinct_rows(),
            download.file_name
        );
    }
    Ok(())
}

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 400;
const CLASSES: [&str; 3] = ["First", "Second", "Third"];
const PORTS: [&str; 3] = ["Southampton", "Cherbourg", "Queenstown"];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One passenger-like record mixing integer, float and text columns.
struct Row {
    id: i64,
    class: &'static str,
    age: Option<f64>,
    fare: f64,
    port: Option<&'static str>,
    ticket: String,
    survived: i64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let class = rng.pick(&CLASSES);
            let base_fare = match class {
                "First" => 80.0,
                "Second" => 25.0,
                _ => 10.0,
            };
            let fare = (base_fare * rng.gauss(0.0, 0.4).exp() * 100.0).round() / 100.0;
            let age = (!rng.chance(0.2)).then(|| rng.gauss(30.0, 13.0).clamp(0.5, 80.0).round());
            let port = (!rng.chance(0.02)).then(|| rng.pick(&PORTS));
            let p_survive = match class {
                "First" => 0.63,
                "Second" => 0.47,
                _ => 0.24,
            };
            Row {
                id: i as i64 + 1,
                class,
                age,
                fare,
                port,
                ticket: format!("T{:05}", rng.next_u64() % 100_000),
                survived: rng.chance(p_survive) as i64,
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["id", "class", "age", "fare", "port", "ticket", "survived"])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.class.to_string(),
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            r.fare.to_string(),
            r.port.unwrap_or_default().to_string(),
            r.ticket.clone(),
            r.survived.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> anyhow::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("class", DataType::Utf8, false),
        Field::new("age", DataType::Float64, true),
        Field::new("fare", DataType::Float64, false),
        Field::new("port", DataType::Utf8, true),
        Field::new("ticket", DataType::Utf8, false),
        Field::new("survived", DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.class))),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.age).collect::<Vec<_>>())),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.fare))),
        Arc::new(StringArray::from(rows.iter().map(|r| r.port).collect::<Vec<_>>())),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.ticket.as_str()))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.survived))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_data.csv")?;
    write_parquet(&rows, "sample_data.parquet")?;

    let missing_age = rows.iter().filter(|r| r.age.is_none()).count();
    println!(
        "Wrote {} rows ({missing_age} without age) to sample_data.csv and sample_data.parquet",
        rows.len()
    );
    Ok(())
}

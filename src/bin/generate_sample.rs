use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CUSTOMERS: usize = 2000;
const OUTPUT_DIR: &str = "data/cleaned_data";

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<T: Copy>(&mut self, choices: &[(T, f64)]) -> T {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(value, weight) in choices {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        choices[choices.len() - 1].0
    }
}

#[derive(Debug, Serialize)]
struct Customer {
    customer_status: &'static str,
    age: i64,
    gender: &'static str,
    education_level: &'static str,
    marital_status: &'static str,
    income_category: &'static str,
    card_category: &'static str,
    no_of_products: i64,
    months_inactive_12_mon: i64,
    contacts_count_12_mon: i64,
    credit_limit: f64,
    total_trans_amt: f64,
    total_trans_ct: i64,
    avg_utilization_ratio: f64,
    utilization_cat: &'static str,
    age_bracket: &'static str,
}

fn age_bracket(age: i64) -> &'static str {
    match age {
        ..=35 => "26-35",
        36..=45 => "36-45",
        46..=55 => "46-55",
        56..=65 => "56-65",
        _ => "66+",
    }
}

fn utilization_cat(ratio: f64) -> &'static str {
    if ratio < 0.3 {
        "Low"
    } else if ratio < 0.7 {
        "Medium"
    } else {
        "High"
    }
}

fn customer(rng: &mut SimpleRng) -> Customer {
    let age = rng.gauss(46.0, 8.0).round().clamp(26.0, 73.0) as i64;
    let gender = if rng.next_f64() < 0.53 { "F" } else { "M" };
    let income_category = rng.weighted(&[
        ("Less than $40K", 0.35),
        ("$40K - $60K", 0.18),
        ("$60K - $80K", 0.14),
        ("$80K - $120K", 0.15),
        ("$120K +", 0.07),
        ("Unknown", 0.11),
    ]);
    let card_category = rng.weighted(&[("Blue", 0.93), ("Silver", 0.055), ("Gold", 0.012), ("Platinum", 0.003)]);

    let no_of_products = rng.int_in(1, 6);
    let months_inactive_12_mon = rng.weighted::<i64>(&[(0, 0.03), (1, 0.22), (2, 0.32), (3, 0.38), (4, 0.05)]);
    let contacts_count_12_mon = rng.int_in(0, 6);

    let credit_limit = (rng.gauss(8600.0, 6000.0).clamp(1438.3, 34516.0) / 10.0).round() * 10.0;
    let avg_utilization_ratio = (rng.next_f64().powf(1.6) * 1000.0).round() / 1000.0;

    // Disengaged customers churn more often.
    let mut risk: f64 = 0.05;
    risk += 0.08 * (months_inactive_12_mon as f64 - 1.0).max(0.0);
    risk += 0.04 * contacts_count_12_mon as f64;
    risk += if no_of_products <= 2 { 0.10 } else { 0.0 };
    risk += if avg_utilization_ratio < 0.1 { 0.08 } else { 0.0 };
    let attrited = rng.next_f64() < risk.min(0.9);

    let total_trans_ct = if attrited {
        rng.gauss(45.0, 15.0)
    } else {
        rng.gauss(68.0, 22.0)
    }
    .round()
    .clamp(10.0, 139.0) as i64;
    let total_trans_amt = (total_trans_ct as f64 * rng.gauss(65.0, 20.0).max(15.0)).round();

    Customer {
        customer_status: if attrited { "Attrited Customer" } else { "Existing Customer" },
        age,
        gender,
        education_level: rng.weighted(&[
            ("Graduate", 0.31),
            ("High School", 0.20),
            ("Unknown", 0.15),
            ("Uneducated", 0.15),
            ("College", 0.10),
            ("Post-Graduate", 0.05),
            ("Doctorate", 0.04),
        ]),
        marital_status: rng.weighted(&[("Married", 0.46), ("Single", 0.39), ("Divorced", 0.07), ("Unknown", 0.08)]),
        income_category,
        card_category,
        no_of_products,
        months_inactive_12_mon,
        contacts_count_12_mon,
        credit_limit,
        total_trans_amt,
        total_trans_ct,
        avg_utilization_ratio,
        utilization_cat: utilization_cat(avg_utilization_ratio),
        age_bracket: age_bracket(age),
    }
}

fn write_csv(path: &Path, customers: &[Customer]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for c in customers {
        writer.serialize(c)?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(customers: &[Customer]) -> Result<RecordBatch> {
    fn text(customers: &[Customer], f: impl Fn(&Customer) -> &'static str) -> ArrayRef {
        Arc::new(StringArray::from(customers.iter().map(f).collect::<Vec<_>>()))
    }
    fn int(customers: &[Customer], f: impl Fn(&Customer) -> i64) -> ArrayRef {
        Arc::new(Int64Array::from(customers.iter().map(f).collect::<Vec<_>>()))
    }
    fn float(customers: &[Customer], f: impl Fn(&Customer) -> f64) -> ArrayRef {
        Arc::new(Float64Array::from(customers.iter().map(f).collect::<Vec<_>>()))
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("customer_status", text(customers, |c| c.customer_status)),
        ("age", int(customers, |c| c.age)),
        ("gender", text(customers, |c| c.gender)),
        ("education_level", text(customers, |c| c.education_level)),
        ("marital_status", text(customers, |c| c.marital_status)),
        ("income_category", text(customers, |c| c.income_category)),
        ("card_category", text(customers, |c| c.card_category)),
        ("no_of_products", int(customers, |c| c.no_of_products)),
        ("months_inactive_12_mon", int(customers, |c| c.months_inactive_12_mon)),
        ("contacts_count_12_mon", int(customers, |c| c.contacts_count_12_mon)),
        ("credit_limit", float(customers, |c| c.credit_limit)),
        ("total_trans_amt", float(customers, |c| c.total_trans_amt)),
        ("total_trans_ct", int(customers, |c| c.total_trans_ct)),
        ("avg_utilization_ratio", float(customers, |c| c.avg_utilization_ratio)),
        ("utilization_cat", text(customers, |c| c.utilization_cat)),
        ("age_bracket", text(customers, |c| c.age_bracket)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let customers: Vec<Customer> = (0..CUSTOMERS).map(|_| customer(&mut rng)).collect();

    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let csv_path = dir.join("bankchurners.csv");
    write_csv(&csv_path, &customers)?;

    let batch = to_batch(&customers)?;
    let parquet_path = dir.join("bankchurners.parquet");
    write_parquet(&parquet_path, &batch)?;

    let attrited = customers
        .iter()
        .filter(|c| c.customer_status == "Attrited Customer")
        .count();
    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} customers ({attrited} attrited) to {} and {}",
        customers.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

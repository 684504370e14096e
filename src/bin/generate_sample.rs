use anyhow::{Context, Result};

const HEADER: &[&str] = &[
    "Timestamp",
    "Age",
    "Gender",
    "Country",
    "state",
    "self_employed",
    "family_history",
    "treatment",
    "work_interfere",
    "no_employees",
    "remote_work",
    "tech_company",
    "benefits",
    "care_options",
    "wellness_program",
    "seek_help",
    "anonymity",
    "leave",
    "mental_health_consequence",
    "phys_health_consequence",
    "coworkers",
    "supervisor",
    "mental_health_interview",
    "phys_health_interview",
    "mental_vs_physical",
    "obs_consequence",
    "comments",
];

/// Free-text genders as respondents actually typed them.
const GENDERS: &[&str] = &[
    "Male", "male", "M", "m", "Female", "female", "F", "Woman", "Cis Male", "Trans-female",
    "Agender", "non-binary", "Genderqueer", "Nah", "queer", "A little about you",
];
const COUNTRIES: &[(&str, &str)] = &[
    ("United States", "CA"),
    ("United States", "WA"),
    ("United States", "NY"),
    ("United Kingdom", "NA"),
    ("Canada", "NA"),
    ("Germany", "NA"),
    ("Netherlands", "NA"),
];
const WORK_INTERFERE: &[&str] = &["Often", "Rarely", "Never", "Sometimes", "NA"];
const NO_EMPLOYEES: &[&str] = &["1-5", "6-25", "26-100", "100-500", "500-1000", "More than 1000"];
const LEAVE: &[&str] = &[
    "Somewhat easy",
    "Don't know",
    "Somewhat difficult",
    "Very difficult",
    "Very easy",
];
/// Yes/No plus the off-scale answers the binary rule discards.
const ANSWERS: &[&str] = &["Yes", "No", "Yes", "No", "Don't know", "Maybe", "Not sure", "Some of them"];

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
}

/// Mostly plausible ages with the occasional typo or joke answer.
fn noisy_age(rng: &mut SimpleRng) -> String {
    let roll = rng.next_f64();
    if roll < 0.01 {
        "-29".to_string()
    } else if roll < 0.02 {
        "329".to_string()
    } else if roll < 0.025 {
        "99999999999".to_string()
    } else {
        format!("{}", rng.gauss(32.0, 7.0).round().clamp(11.0, 72.0) as i64)
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let n_rows: usize = std::env::args()
        .nth(1)
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("row count must be a positive integer")?
        .unwrap_or(1259);

    let output_path = "survey.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating survey.csv")?;
    writer.write_record(HEADER)?;

    for i in 0..n_rows {
        let (country, state) = COUNTRIES[(rng.next_u64() % COUNTRIES.len() as u64) as usize];
        let mut record: Vec<String> = vec![
            format!("2014-08-{:02} 11:{:02}:{:02}", 1 + i % 28, i % 60, (i * 7) % 60),
            noisy_age(&mut rng),
            rng.pick(GENDERS).to_string(),
            country.to_string(),
            state.to_string(),
            rng.pick(&["Yes", "No", "NA"]).to_string(),
            rng.pick(ANSWERS).to_string(),
            rng.pick(&["Yes", "No"]).to_string(),
            rng.pick(WORK_INTERFERE).to_string(),
            rng.pick(NO_EMPLOYEES).to_string(),
        ];
        record.extend(
            HEADER[10..17]
                .iter()
                .map(|_| rng.pick(ANSWERS).to_string()),
        );
        record.push(rng.pick(LEAVE).to_string());
        record.extend(
            HEADER[18..26]
                .iter()
                .map(|_| rng.pick(ANSWERS).to_string()),
        );
        record.push(if rng.next_f64() < 0.1 {
            "Happy to talk about it".to_string()
        } else {
            "NA".to_string()
        });
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {n_rows} survey responses to {output_path}");
    Ok(())
}

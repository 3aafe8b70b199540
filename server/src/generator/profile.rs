use crate::generator::template;
use anyhow::bail;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const PREFIXES: &[&str] = &["K", "W", "N", "VE", "DL", "G", "F", "EA", "JA", "VK", "PY", "ZS"];

/// Shape of a synthetic multi-antenna capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub antennas: usize,
    pub stations: usize,
    /// Dial frequencies in MHz, one per band to populate.
    pub dial_frequencies: Vec<f64>,
    pub callsign: String,
    pub seed: u64,
    pub noise_db: f64,
    /// Extra gain of antenna `n` over antenna `n - 1`.
    pub gain_step_db: f64,
    /// Chance that a given antenna logs a spot the station made on a band.
    pub hear_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            antennas: 3,
            stations: 40,
            dial_frequencies: vec![7.074, 14.074, 21.074, 28.074],
            callsign: "N0CALL".into(),
            seed: 0,
            noise_db: 3.0,
            gain_step_db: 2.0,
            hear_probability: 0.8,
        }
    }
}

/// One antenna's ADIF document.
#[derive(Debug, Clone)]
pub struct SyntheticLog {
    pub antenna: usize,
    pub content: String,
}

impl SyntheticLog {
    pub fn file_name(&self) -> String {
        format!("antenna-{}.adi", self.antenna)
    }
}

struct Station {
    call: String,
    grid: String,
    distance_km: f64,
    /// Bands (by index into the dial list) this station was active on.
    bands: Vec<usize>,
}

fn random_letters(rng: &mut StdRng, from: u8, to: u8, count: usize) -> String {
    (0..count).map(|_| rng.gen_range(from..=to) as char).collect()
}

fn random_station(rng: &mut StdRng, band_count: usize) -> Station {
    let prefix = PREFIXES[rng.gen_range(0..PREFIXES.len())];
    let suffix_len = rng.gen_range(2..=3);
    let call = format!(
        "{}{}{}",
        prefix,
        rng.gen_range(0..10),
        random_letters(rng, b'A', b'Z', suffix_len)
    );

    let mut grid = random_letters(rng, b'A', b'R', 2);
    grid.push_str(&format!("{:02}", rng.gen_range(0..100)));
    grid.push_str(&random_letters(rng, b'a', b'x', 2));
    if rng.gen_bool(0.5) {
        grid.push_str(&format!("{:02}", rng.gen_range(0..100)));
    }

    let bands = (0..band_count).filter(|_| rng.gen_bool(0.7)).collect();

    Station {
        call,
        grid,
        distance_km: rng.gen_range(300.0..15_000.0),
        bands,
    }
}

/// Simple path-loss shape: strong nearby, falling about 1 dB per 600 km.
fn base_snr(distance_km: f64) -> f64 {
    10.0 - distance_km / 600.0
}

pub fn build_logs(config: &GeneratorConfig) -> anyhow::Result<Vec<SyntheticLog>> {
    if config.antennas == 0 {
        bail!("generator needs at least one antenna");
    }
    if config.dial_frequencies.is_empty() {
        bail!("generator needs at least one dial frequency");
    }
    let hear = config.hear_probability.clamp(0.0, 1.0);
    let noise = config.noise_db.abs();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let stations: Vec<Station> = (0..config.stations)
        .map(|_| random_station(&mut rng, config.dial_frequencies.len()))
        .collect();

    let logs = (1..=config.antennas)
        .map(|antenna| {
            let call = format!("{}/{}", config.callsign, antenna);
            let gain = (antenna - 1) as f64 * config.gain_step_db;
            let mut content = template::header("antenna-server");

            for station in &stations {
                for &band in &station.bands {
                    if !rng.gen_bool(hear) {
                        continue;
                    }
                    let jitter = if noise > 0.0 {
                        rng.gen_range(-noise..noise)
                    } else {
                        0.0
                    };
                    let snr = (base_snr(station.distance_km) + gain + jitter).round();
                    let freq =
                        config.dial_frequencies[band] + rng.gen_range(300.0..2700.0) / 1_000_000.0;
                    content.push_str(&template::record(&[
                        ("FREQ", format!("{:.6}", freq)),
                        ("CALL", call.clone()),
                        ("OPERATOR", station.call.clone()),
                        ("GRIDSQUARE", station.grid.clone()),
                        ("APP_PSKREP_SNR", format!("{}", snr as i64)),
                        ("DISTANCE", format!("{:.0}", station.distance_km)),
                    ]));
                }
            }

            SyntheticLog { antenna, content }
        })
        .collect();

    Ok(logs)
}

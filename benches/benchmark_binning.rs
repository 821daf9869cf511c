use imbinning::models::feature_finding::MassTraceFeatureFinder;
use imbinning::{AdaptivePeakPicker, BinningConfig, BinningPipeline, PeakPickerConfig, Spectrum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::env;
use std::time::Instant;
use tracing::info;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

const NUM_SPECTRA: usize = 500;
const NUM_SPECIES: usize = 2_000;
const NUM_NOISE_PEAKS: usize = 5_000;

struct Species {
    mz: f64,
    mobility: f64,
    apex_rt: f64,
    height: f64,
}

/// Gaussian elution profiles plus uniform noise over the full range.
fn synthetic_run(seed: u64) -> Vec<Spectrum> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let species: Vec<Species> = (0..NUM_SPECIES)
        .map(|_| Species {
            mz: rng.gen_range(300.0..1500.0),
            mobility: rng.gen_range(0.7..1.3),
            apex_rt: rng.gen_range(0.0..NUM_SPECTRA as f64),
            height: rng.gen_range(1e3..1e6),
        })
        .collect();

    (0..NUM_SPECTRA)
        .map(|i| {
            let rt = i as f64;
            let mut spec = Spectrum::new(rt, 1);
            for s in species.iter() {
                let dist = rt - s.apex_rt;
                if dist.abs() > 15.0 {
                    continue;
                }
                let int = s.height * (-dist * dist / 20.0).exp();
                for k in -2..=2 {
                    spec.push(
                        s.mz + k as f64 * 0.002,
                        int / (1.0 + (k * k) as f64),
                        s.mobility + rng.gen_range(-0.005..0.005),
                    );
                }
            }
            for _ in 0..NUM_NOISE_PEAKS {
                spec.push(
                    rng.gen_range(300.0..1500.0),
                    rng.gen_range(1.0..200.0),
                    rng.gen_range(0.6..1.4),
                );
            }
            spec.sort_by_mz();
            spec
        })
        .collect()
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("imbinning".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber).expect("Setting default subscriber failed");

    let num_bins: usize = env::var("NUM_BINS")
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(4);

    let st = Instant::now();
    let spectra = synthetic_run(42);
    info!("Generated synthetic run in {:#?}", st.elapsed());

    let pipeline = BinningPipeline::new(BinningConfig::new(num_bins)).unwrap();

    let st = Instant::now();
    let experiment = pipeline.bin_spectra(&spectra).unwrap();
    println!("Binning elapsed: {:.2?}", st.elapsed());

    let picker = AdaptivePeakPicker::new(PeakPickerConfig::default()).unwrap();
    let st = Instant::now();
    let picked = picker.pick_spectra(&spectra).unwrap();
    println!(
        "Peak picking elapsed: {:.2?} ({} peaks left)",
        st.elapsed(),
        picked.iter().map(|x| x.len()).sum::<usize>()
    );

    let st = Instant::now();
    let outputs = pipeline
        .find_features(experiment, &MassTraceFeatureFinder::default())
        .unwrap();
    println!("Feature finding elapsed: {:.2?}", st.elapsed());
    for out in outputs {
        println!("Pass {}: {} features", out.pass.number(), out.num_features());
    }
}

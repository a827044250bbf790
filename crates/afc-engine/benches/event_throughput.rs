use afc_core::track::RawTrack;
use afc_engine::{Cumulants, CumulantsConfig, EtaGapConfig, Nl3Config, QcConfig};
use afc_stat::AccumulatorStore;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_event(multiplicity: usize, seed: u64) -> Vec<RawTrack> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..multiplicity)
        .map(|_| RawTrack::Reco {
            pt: rng.gen_range(0.4..2.5),
            eta: rng.gen_range(-0.9..0.9),
            phi: rng.gen_range(0.0..std::f64::consts::TAU),
            charge: if rng.gen_bool(0.5) { 1 } else { -1 },
        })
        .collect()
}

fn bench_event(c: &mut Criterion) {
    let mut config = CumulantsConfig::default();
    config.min_mult = 2;
    config.eta_gap = Some(EtaGapConfig::default());
    config.qc = Some(QcConfig::default());
    config.nl3 = Some(Nl3Config::default());
    let mut store = AccumulatorStore::new("bench");
    let mut engine = Cumulants::new(config, &mut store).unwrap();
    let event = random_event(60, 42);

    c.bench_function("event_all_methods", |b| {
        b.iter(|| {
            engine.set_event(&event, true, &mut store).unwrap();
            engine.run_all(&mut store).unwrap();
        })
    });
}

criterion_group!(benches, bench_event);
criterion_main!(benches);

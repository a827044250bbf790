use afc_core::track::RawTrack;
use afc_engine::{Cumulants, CumulantsConfig, EtaGapConfig, Nl3Config, Nl4Config, QcConfig};
use afc_stat::AccumulatorStore;

fn full_config() -> CumulantsConfig {
    let mut config = CumulantsConfig::default();
    config.min_mult = 2;
    config.eta_gap = Some(EtaGapConfig::default());
    config.qc = Some(QcConfig::default());
    config.nl4 = Some(Nl4Config::default());
    config.nl3 = Some(Nl3Config::default());
    config
}

fn event() -> Vec<RawTrack> {
    (0..8)
        .map(|i| RawTrack::Reco {
            pt: 0.5 + 0.2 * i as f64,
            eta: -0.8 + 0.2 * i as f64,
            phi: 0.77 * i as f64,
            charge: if i % 2 == 0 { 1 } else { -1 },
        })
        .collect()
}

#[test]
fn identical_events_yield_bit_identical_stores() {
    let mut store_a = AccumulatorStore::new("worker");
    let mut engine_a = Cumulants::new(full_config(), &mut store_a).expect("engine");
    engine_a.set_event(&event(), true, &mut store_a).expect("event");
    engine_a.run_all(&mut store_a).expect("run");

    let mut store_b = AccumulatorStore::new("worker");
    let mut engine_b = Cumulants::new(full_config(), &mut store_b).expect("engine");
    engine_b.set_event(&event(), true, &mut store_b).expect("event");
    engine_b.run_all(&mut store_b).expect("run");

    assert_eq!(store_a, store_b);
}

#[test]
fn reprocessing_the_same_event_preserves_means_exactly() {
    let mut store = AccumulatorStore::new("repeat");
    let mut engine = Cumulants::new(full_config(), &mut store).expect("engine");
    engine.set_event(&event(), true, &mut store).expect("event");
    engine.run_all(&mut store).expect("run");
    let first = store.profile("qc2").unwrap().mean(8);

    engine.set_event(&event(), true, &mut store).expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc2").unwrap().entries(8), 2);
    // the mean of two identical values is that value, bit for bit
    assert_eq!(store.profile("qc2").unwrap().mean(8), first);
}

#[test]
fn merged_worker_stores_match_sequential_processing() {
    // one worker per event, merged afterwards
    let mut merged = AccumulatorStore::new("worker");
    let mut engine = Cumulants::new(full_config(), &mut merged).expect("engine");
    engine.set_event(&event(), true, &mut merged).expect("event");
    engine.run_all(&mut merged).expect("run");

    let mut other = AccumulatorStore::new("worker");
    let mut engine_b = Cumulants::new(full_config(), &mut other).expect("engine");
    let mut second_event = event();
    second_event.rotate_left(3);
    engine_b
        .set_event(&second_event, true, &mut other)
        .expect("event");
    engine_b.run_all(&mut other).expect("run");

    // sequential reference: both events through one store
    let mut sequential = AccumulatorStore::new("worker");
    let mut engine_c = Cumulants::new(full_config(), &mut sequential).expect("engine");
    engine_c.set_event(&event(), true, &mut sequential).expect("event");
    engine_c.run_all(&mut sequential).expect("run");
    engine_c
        .set_event(&second_event, true, &mut sequential)
        .expect("event");
    engine_c.run_all(&mut sequential).expect("run");

    merged.merge(other).expect("merge");
    assert_eq!(merged, sequential);
}

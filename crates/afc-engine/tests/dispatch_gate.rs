use afc_core::track::RawTrack;
use afc_engine::{Cumulants, CumulantsConfig, EtaGapConfig, Nl3Config, Nl4Config, QcConfig};
use afc_stat::AccumulatorStore;

fn full_config(min_mult: u32) -> CumulantsConfig {
    let mut config = CumulantsConfig::default();
    config.min_mult = min_mult;
    config.eta_gap = Some(EtaGapConfig::default());
    config.qc = Some(QcConfig::default());
    config.nl4 = Some(Nl4Config::default());
    config.nl3 = Some(Nl3Config::default());
    config
}

fn spread_event(multiplicity: usize) -> Vec<RawTrack> {
    (0..multiplicity)
        .map(|i| RawTrack::Reco {
            pt: 1.0,
            eta: -0.9 + 1.8 * i as f64 / multiplicity.max(2) as f64,
            phi: std::f64::consts::TAU * i as f64 / multiplicity.max(2) as f64,
            charge: if i % 2 == 0 { 1 } else { -1 },
        })
        .collect()
}

fn profile_entry_total(store: &AccumulatorStore) -> u64 {
    let names: Vec<String> = store.names().map(str::to_string).collect();
    names
        .iter()
        .filter_map(|name| store.profile(name))
        .map(|profile| profile.total_entries())
        .sum()
}

#[test]
fn below_gate_events_touch_only_builder_counters() {
    let mut store = AccumulatorStore::new("gate");
    let mut engine = Cumulants::new(full_config(10), &mut store).expect("engine");
    let report = engine
        .set_event(&spread_event(5), false, &mut store)
        .expect("event");
    assert_eq!(report.counts.selected, 5);
    let run = engine.run_all(&mut store).expect("run");
    assert!(run.gated);
    assert!(run.timings.is_empty());

    assert_eq!(store.count("mult-raw").unwrap().count(5), 1);
    assert_eq!(store.count("mult-selected").unwrap().count(5), 1);
    assert_eq!(store.count("mult-used").unwrap().total(), 0);
    assert_eq!(store.count("mult-pos").unwrap().total(), 0);
    assert_eq!(store.count("mult-neg").unwrap().total(), 0);
    assert_eq!(profile_entry_total(&store), 0);
}

#[test]
fn passing_gate_fills_used_counter_and_runs_methods() {
    let mut store = AccumulatorStore::new("gate");
    let mut engine = Cumulants::new(full_config(4), &mut store).expect("engine");
    engine
        .set_event(&spread_event(6), false, &mut store)
        .expect("event");
    let run = engine.run_all(&mut store).expect("run");
    assert!(!run.gated);
    assert!(run.failures.is_empty());
    assert_eq!(store.count("mult-used").unwrap().count(6), 1);
    assert!(profile_entry_total(&store) > 0);
}

#[test]
fn two_particle_terms_need_at_least_two_tracks() {
    let mut store = AccumulatorStore::new("bounds");
    let mut engine = Cumulants::new(full_config(0), &mut store).expect("engine");
    engine
        .set_event(&spread_event(1), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc2").unwrap().total_entries(), 0);
    assert_eq!(store.profile("q2-re").unwrap().total_entries(), 0);

    engine
        .set_event(&spread_event(2), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc2").unwrap().entries(2), 1);
    assert_eq!(store.profile("qc4").unwrap().total_entries(), 0);
}

#[test]
fn four_particle_terms_need_more_than_three_tracks() {
    let mut store = AccumulatorStore::new("bounds");
    let mut engine = Cumulants::new(full_config(0), &mut store).expect("engine");
    engine
        .set_event(&spread_event(3), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc4").unwrap().total_entries(), 0);

    engine
        .set_event(&spread_event(4), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc4").unwrap().entries(4), 1);
    assert_eq!(store.profile("qc6").unwrap().total_entries(), 0);
}

#[test]
fn six_particle_term_needs_more_than_five_tracks() {
    let mut store = AccumulatorStore::new("bounds");
    let mut engine = Cumulants::new(full_config(0), &mut store).expect("engine");
    engine
        .set_event(&spread_event(5), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc6").unwrap().total_entries(), 0);

    engine
        .set_event(&spread_event(6), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    assert_eq!(store.profile("qc6").unwrap().entries(6), 1);
}

#[test]
fn nested_loops_respect_their_ceilings() {
    let mut store = AccumulatorStore::new("ceilings");
    let mut config = full_config(0);
    config.nl4 = Some(Nl4Config {
        max_mult: 5,
        min_gap: 0.0,
    });
    config.nl3 = Some(Nl3Config {
        max_mult: 5,
        min_gap: 0.0,
    });
    let mut engine = Cumulants::new(config, &mut store).expect("engine");
    engine
        .set_event(&spread_event(6), false, &mut store)
        .expect("event");
    engine.run_all(&mut store).expect("run");
    // above the ceiling both direct correlators skip, flow vectors still run
    assert_eq!(store.profile("nl4-qc4-g00").unwrap().total_entries(), 0);
    assert_eq!(store.profile("nl3-qc4-g00").unwrap().total_entries(), 0);
    assert_eq!(store.profile("qc4").unwrap().entries(6), 1);
}

//! Benchmarks for simulation steps.
//!
//! Run with: cargo bench -p unshape-rulecell

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use unshape_rulecell::{
    CellSchema, Moore, Neighborhood, Patch, Selector, Simulation, SimulationConfig,
};

const SIZE: usize = 64;

/// B3/S23 with closure selectors.
fn life_config(size: usize) -> SimulationConfig {
    let schema = CellSchema::new().with("alive", false).unwrap();
    SimulationConfig::builder(schema)
        .with_dimensions(size, size)
        .selector("alive", Selector::property_eq("alive", true))
        .selector(
            "born",
            Selector::from_fn(|ctx, cell| {
                Ok(!cell.bool("alive")? && ctx.count(Moore.offsets(), "alive", cell)? == 3)
            }),
        )
        .selector(
            "dies",
            Selector::from_fn(|ctx, cell| {
                let n = ctx.count(Moore.offsets(), "alive", cell)?;
                Ok(cell.bool("alive")? && !(2..=3).contains(&n))
            }),
        )
        .alias("alive", Patch::new().set("alive", true))
        .display_alias("#", "alive")
        .rule("born", Patch::new().set("alive", true))
        .rule("dies", Patch::new().set("alive", false))
        .build()
        .unwrap()
}

/// The same rules as a JSON definition with composed selectors.
const LIFE_JSON: &str = r##"{
    "meta": {"Rows": 64, "Cols": 64},
    "cell": {"alive": false},
    "selectors": {
        "alive": {"is": {"alive": true}},
        "born": {"all": [
            {"not": {"ref": "alive"}},
            {"count": {"dirs": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"], "of": {"ref": "alive"}, "in": [3]}}
        ]},
        "dies": {"all": [
            {"ref": "alive"},
            {"not": {"count": {"dirs": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"], "of": {"ref": "alive"}, "in": [2, 3]}}}
        ]}
    },
    "aliases": {"alive": {"alive": true}},
    "display": [{"name": "#", "selector": "alive"}],
    "rules": [
        {"selector": "born", "set": {"alive": true}},
        {"selector": "dies", "set": {"alive": false}}
    ]
}"##;

/// Fills roughly a quarter of the grid from a fixed LCG seed.
fn seed_soup(sim: &mut Simulation, seed: u64) {
    let meta = sim.meta();
    let mut state = seed;
    for r in 0..meta.rows {
        for c in 0..meta.cols {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            if state >> 62 == 0 {
                sim.update(r, c, "alive").unwrap();
            }
        }
    }
}

fn bench_step_closures(c: &mut Criterion) {
    let mut sim = Simulation::new(life_config(SIZE));
    seed_soup(&mut sim, 12345);

    c.bench_function("step_life_64x64", |b| {
        b.iter(|| black_box(sim.step().unwrap()));
    });
}

fn bench_step_json(c: &mut Criterion) {
    let mut sim = Simulation::from_json(LIFE_JSON).unwrap();
    seed_soup(&mut sim, 12345);

    c.bench_function("step_life_json_64x64", |b| {
        b.iter(|| black_box(sim.step().unwrap()));
    });
}

fn bench_frame(c: &mut Criterion) {
    let mut sim = Simulation::new(life_config(SIZE));
    seed_soup(&mut sim, 12345);

    c.bench_function("frame_64x64", |b| {
        b.iter(|| black_box(sim.frame().unwrap()));
    });
}

fn bench_load_json(c: &mut Criterion) {
    c.bench_function("load_life_json", |b| {
        b.iter(|| black_box(SimulationConfig::from_json(black_box(LIFE_JSON)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_step_closures,
    bench_step_json,
    bench_frame,
    bench_load_json
);
criterion_main!(benches);

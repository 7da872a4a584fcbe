#![no_main]

use libfuzzer_sys::fuzz_target;
use unshape_rulecell::SimulationConfig;

fuzz_target!(|data: &str| {
    // Loading a definition should never panic on any input
    let _ = SimulationConfig::from_json(data);
});

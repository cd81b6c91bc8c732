//! Self-loop scenario: one neuron driven every fifth step, re-exciting itself
//! six steps after each spike.

mod common;

use common::{run_recording, self_loop_network, spike_steps};
use snnk_core::Step;
use snnk_runtime::{Backend, BackendRegistry, SharedBackend};

const EXPECTED: [Step; 10] = [1, 6, 7, 11, 12, 13, 16, 17, 18, 19];

fn every_fifth_step(step: Step) -> Option<Vec<u32>> {
    (step % 5 == 0).then(|| vec![0])
}

fn run_self_loop(backend: SharedBackend) -> Vec<Step> {
    let _ = env_logger::builder().is_test(true).try_init();
    let network = self_loop_network();
    network.load(&backend);
    let recording = run_recording(&backend, &network, 20, every_fifth_step);
    assert_eq!(backend.lock().step_count(), 20);
    assert!(recording.spikes.iter().all(|(_, _, indexes)| indexes == &vec![0]));
    spike_steps(&recording)
}

#[test]
fn self_loop_on_sequential_backend() {
    let backend = BackendRegistry::with_builtin().load("cpu-single-threaded").unwrap();
    assert_eq!(run_self_loop(backend), EXPECTED);
}

#[cfg(feature = "parallel")]
#[test]
fn self_loop_on_parallel_backend() {
    let backend = BackendRegistry::with_builtin().load("cpu-multi-threaded").unwrap();
    assert_eq!(run_self_loop(backend), EXPECTED);
}

#[test]
fn spikes_are_visible_right_after_the_step() {
    let backend = BackendRegistry::with_builtin().load("cpu-single-threaded").unwrap();
    let network = self_loop_network();
    network.load(&backend);

    // Input at step 0 reaches the neuron at step 1; nothing fires at step 0.
    let recording = run_recording(&backend, &network, 2, |step| (step == 0).then(|| vec![0]));
    assert_eq!(spike_steps(&recording), vec![1]);
    assert_eq!(recording.impacts.len(), 1);
    assert_eq!(recording.impacts[0].0, 1);
}

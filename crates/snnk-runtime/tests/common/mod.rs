//! Network builders and recording helpers shared by the integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snnk_core::{
    AnyPopulation, AnyProjection, BlifatNeuron, DeltaSynapse, MessageHeader, OutputType,
    Population, Projection, SequentialUidGenerator, SpikeMessage, Step, SynapseRecord,
    SynapticImpactMessage, Uid, UidGenerator,
};
use snnk_runtime::{Backend, SharedBackend};

/// A network plus the UIDs a test drives and observes
pub struct TestNetwork {
    pub input: Uid,
    pub populations: Vec<AnyPopulation>,
    pub projections: Vec<AnyProjection>,
}

impl TestNetwork {
    pub fn population_uids(&self) -> Vec<Uid> {
        self.populations.iter().map(AnyPopulation::uid).collect()
    }

    pub fn projection_uids(&self) -> Vec<Uid> {
        self.projections.iter().map(AnyProjection::uid).collect()
    }

    pub fn load(&self, backend: &SharedBackend) {
        let mut backend = backend.lock();
        backend.load_populations(self.populations.clone()).unwrap();
        backend.load_projections(self.projections.clone()).unwrap();
    }
}

/// One neuron, an input projection (delay 1) and a self-loop (delay 6)
pub fn self_loop_network() -> TestNetwork {
    let gen = SequentialUidGenerator::new();
    let input = gen.generate();
    let population = Population::generate(&gen, 1, |_| BlifatNeuron::default());
    let pop_uid = population.uid();

    let input_projection = Projection::generate(&gen, input, pop_uid, 1, |_| {
        Some(SynapseRecord::new(DeltaSynapse::new(1.0, 1), 0, 0))
    });
    let loop_projection = Projection::generate(&gen, pop_uid, pop_uid, 1, |_| {
        Some(SynapseRecord::new(DeltaSynapse::new(1.0, 6), 0, 0))
    });

    TestNetwork {
        input,
        populations: vec![population.into()],
        projections: vec![input_projection.into(), loop_projection.into()],
    }
}

/// Layered network with random delta synapses, leaky neurons and inhibition
pub fn random_network(seed: u64, layers: usize, width: usize) -> TestNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    let gen = SequentialUidGenerator::new();
    let input = gen.generate();

    let neuron = BlifatNeuron::new(1.0, 0.5).unwrap();
    let populations: Vec<Population<BlifatNeuron>> = (0..layers)
        .map(|_| Population::generate(&gen, width, |_| neuron.clone()))
        .collect();

    let mut projections: Vec<AnyProjection> = Vec::new();
    let mut sources = vec![input];
    sources.extend(populations.iter().map(Population::uid));
    for (layer, population) in populations.iter().enumerate() {
        // Feed-forward from the previous layer plus a recurrent projection
        for &pre in [sources[layer], population.uid()].iter() {
            let synapses: Vec<SynapseRecord<DeltaSynapse>> = (0..width * width)
                .filter_map(|i| {
                    if rng.gen_bool(0.3) {
                        let weight = rng.gen_range(0.05f32..0.9);
                        let delay = rng.gen_range(1u32..4);
                        let output_type = if rng.gen_bool(0.2) {
                            OutputType::InhibitoryCurrent
                        } else {
                            OutputType::Excitatory
                        };
                        let synapse = DeltaSynapse::new(weight, delay).with_output_type(output_type);
                        Some(SynapseRecord::new(synapse, (i / width) as u32, (i % width) as u32))
                    } else {
                        None
                    }
                })
                .collect();
            projections.push(Projection::new(gen.generate(), pre, population.uid(), synapses).into());
        }
    }

    TestNetwork {
        input,
        populations: populations.into_iter().map(AnyPopulation::from).collect(),
        projections,
    }
}

/// One observed message: (send time, sender, payload summary)
pub type Record = (Step, Uid, Vec<u32>);

/// Everything observed on an output endpoint while stepping
#[derive(Debug, Default, PartialEq)]
pub struct Recording {
    pub spikes: Vec<Record>,
    pub impacts: Vec<Record>,
}

/// Step `backend` `steps` times, sending `input(step)` before each step
pub fn run_recording(
    backend: &SharedBackend,
    network: &TestNetwork,
    steps: Step,
    mut input: impl FnMut(Step) -> Option<Vec<u32>>,
) -> Recording {
    let bus = backend.lock().message_bus().clone();
    let input_sender = bus.sender();
    let mut output = bus.create_endpoint();
    let observer = Uid::from_u128(u128::MAX);
    output.subscribe_spikes(observer, network.population_uids());
    output.subscribe_impacts(observer, network.projection_uids());

    let mut recording = Recording::default();
    for step in 0..steps {
        if let Some(indexes) = input(step) {
            input_sender.send_message(SpikeMessage::new(MessageHeader::new(network.input, step), indexes));
        }
        backend.lock().step();

        output.receive_all_messages();
        for message in output.unload_messages::<SpikeMessage>(observer) {
            recording
                .spikes
                .push((message.header.send_time, message.header.sender_uid, message.neuron_indexes));
        }
        for message in output.unload_messages::<SynapticImpactMessage>(observer) {
            let targets = message.impacts.iter().map(|i| i.postsynaptic_neuron_index).collect();
            recording.impacts.push((message.header.send_time, message.header.sender_uid, targets));
        }
    }
    recording
}

/// Send times of every spike message, in observation order
pub fn spike_steps(recording: &Recording) -> Vec<Step> {
    recording.spikes.iter().map(|(step, _, _)| *step).collect()
}

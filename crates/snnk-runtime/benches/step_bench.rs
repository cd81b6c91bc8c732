use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use snnk_core::{
    AnyPopulation, AnyProjection, BlifatNeuron, DeltaSynapse, MessageHeader, Population, Projection,
    SequentialUidGenerator, SpikeMessage, SynapseRecord, Uid, UidGenerator,
};
use snnk_runtime::{Backend, BackendRegistry, SharedBackend};

/// Input channel feeding a chain of populations, each fully connected to the next
fn build_network(backend: &SharedBackend, populations: usize, width: usize, weight: f32) -> Uid {
    let gen = SequentialUidGenerator::new();
    let input = gen.generate();
    let layers: Vec<Population<BlifatNeuron>> = (0..populations)
        .map(|_| Population::generate(&gen, width, |_| BlifatNeuron::default()))
        .collect();

    let mut projections: Vec<AnyProjection> = Vec::new();
    let mut pre = input;
    for layer in &layers {
        // Keep this small in benches to avoid explosive edges
        let projection = Projection::generate(&gen, pre, layer.uid(), width * width, |i| {
            Some(SynapseRecord::new(DeltaSynapse::new(weight, 1), (i / width) as u32, (i % width) as u32))
        });
        projections.push(projection.into());
        pre = layer.uid();
    }

    let mut backend = backend.lock();
    backend
        .load_populations(layers.into_iter().map(AnyPopulation::from).collect())
        .expect("bench populations load");
    backend.load_projections(projections).expect("bench projections load");
    input
}

fn run_steps(backend: SharedBackend, input: Uid, width: usize, steps: u64) {
    let sender = backend.lock().message_bus().sender();
    let all: Vec<u32> = (0..width as u32).collect();
    let mut backend = backend.lock();
    for step in 0..steps {
        sender.send_message(SpikeMessage::new(MessageHeader::new(input, step), all.clone()));
        backend.step();
    }
}

fn bench_step(c: &mut Criterion) {
    let registry = BackendRegistry::with_builtin();
    let mut group = c.benchmark_group("snnk_step");
    let steps = 20;

    for name in registry.names() {
        for &width in &[8usize, 32, 64] {
            group.throughput(Throughput::Elements(steps * width as u64));
            group.bench_with_input(BenchmarkId::new(name, width), &width, |b, &width| {
                b.iter_batched(
                    || {
                        let backend = registry.load(name).expect("bench backend load");
                        let input = build_network(&backend, 4, width, 0.2);
                        (backend, input)
                    },
                    |(backend, input)| run_steps(backend, input, width, steps),
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);

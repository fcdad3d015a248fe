use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use splash::{
    animation::{SplashAnimator, SplashAttributes, SPLASH_ATTRIBUTE_SPECS},
    geometry::{build_instanced_geometry, BaseGeometry},
    options::AnimationOptions,
};

fn animator_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("animator_update");
    let source = Arc::new(BaseGeometry::default());

    for count in [2, 64, 1024, 16384] {
        let options = AnimationOptions {
            particle_count: count,
            ..AnimationOptions::default()
        };
        let mut geometry = build_instanced_geometry(&source, &SPLASH_ATTRIBUTE_SPECS, count);
        let Ok(slots) = SplashAttributes::resolve(&geometry) else {
            continue;
        };
        let mut animator = SplashAnimator::new(&options, count);
        let mut rng = StdRng::seed_from_u64(7);

        group.bench_function(format!("{count}_instances"), |b| {
            b.iter(|| black_box(animator.update(&mut geometry, &slots, &mut rng)));
        });
    }
    group.finish();
}

criterion_group!(benches, animator_update_benchmark);
criterion_main!(benches);

use crate::common::{BenchOptions, Criterion};

pub fn render_single(c: &mut Criterion) {
    BenchOptions::new("progressive single thread", false, false).get_benchmark()(c);
}

pub fn render_single_ert(c: &mut Criterion) {
    BenchOptions::new("progressive single thread ert", true, false).get_benchmark()(c);
}

pub fn render_parallel(c: &mut Criterion) {
    BenchOptions::new("progressive parallel", false, true).get_benchmark()(c);
}

pub fn render_parallel_ert(c: &mut Criterion) {
    BenchOptions::new("progressive parallel ert", true, true).get_benchmark()(c);
}

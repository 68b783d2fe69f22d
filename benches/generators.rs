use criterion::{criterion_group, criterion_main, Criterion};
use perfect_mazes::{
    maze::Maze,
    units::{ColumnsCount, RowsCount},
};

fn bench_recursive_backtracker_24(c: &mut Criterion) {
    let mut m = Maze::new(RowsCount(24), ColumnsCount(24)).unwrap();
    c.bench_function("recursive_backtracker_24", move |b| {
        b.iter(|| m.generate(Some(7)).unwrap())
    });
}

fn bench_recursive_backtracker_128(c: &mut Criterion) {
    let mut m = Maze::new(RowsCount(128), ColumnsCount(128)).unwrap();
    c.bench_function("recursive_backtracker_128", move |b| {
        b.iter(|| m.generate(Some(7)).unwrap())
    });
}

fn bench_recursive_backtracker_stepped_128(c: &mut Criterion) {
    let mut m = Maze::new(RowsCount(128), ColumnsCount(128)).unwrap();
    c.bench_function("recursive_backtracker_stepped_128", move |b| {
        b.iter(|| {
            let mut carver = m.carver(Some(7)).unwrap();
            let mut steps = 0;
            while carver.step().unwrap().is_some() {
                steps += 1;
            }
            steps
        })
    });
}

criterion_group!(
    benches,
    bench_recursive_backtracker_24,
    bench_recursive_backtracker_128,
    bench_recursive_backtracker_stepped_128
);
criterion_main!(benches);

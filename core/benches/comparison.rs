use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rowdelta_core::{CellValue, CompareOptions, Table, TableComparator};
use std::hint::black_box;

const COLUMNS: usize = 8;

fn create_table(nrows: usize, offset: usize, modulus: usize) -> Table {
    let mut columns = vec!["id".to_string()];
    columns.extend((1..COLUMNS).map(|c| format!("col_{c}")));

    let rows = (0..nrows)
        .map(|row| {
            let id = row + offset;
            let mut values = vec![CellValue::from(id)];
            values.extend((1..COLUMNS).map(|c| {
                if c % 2 == 0 {
                    CellValue::from(format!("value {}", (id * c) % modulus))
                } else {
                    CellValue::from(((id * c) % modulus) as f64)
                }
            }));
            values
        })
        .collect();

    Table::from_rows(columns, rows).expect("valid benchmark table")
}

fn bench_keyed_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_compare");
    group.sample_size(10);

    for &nrows in &[1_000usize, 10_000, 100_000] {
        let new = create_table(nrows, nrows / 10, 97);
        let old = create_table(nrows, 0, 89);
        group.throughput(Throughput::Elements(nrows as u64));

        for parallel in [true, false] {
            let mut options = CompareOptions::default().with_key("id");
            if !parallel {
                options = options.sequential();
            }
            let comparator = TableComparator::new(options);
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, nrows), &nrows, |b, _| {
                b.iter(|| black_box(comparator.compare(&new, &old).expect("compare")))
            });
        }
    }
    group.finish();
}

fn bench_positional_compare(c: &mut Criterion) {
    let new = create_table(50_000, 0, 101);
    let old = create_table(45_000, 0, 103);
    let comparator = TableComparator::new(CompareOptions::default());

    c.bench_function("positional_compare_50k", |b| {
        b.iter(|| black_box(comparator.compare(&new, &old).expect("compare")))
    });
}

criterion_group!(benches, bench_keyed_compare, bench_positional_compare);
criterion_main!(benches);

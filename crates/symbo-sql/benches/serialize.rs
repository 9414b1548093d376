use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput,
};
use std::time::Duration;
use symbo_sql::builder::*;
use symbo_sql::{serialize, GeneratorConfig, Node, NodeKind, Tree};

const LIST_SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn wide_in_query(size: usize) -> Node {
    let values: Vec<Expr> = (0..size as i64).map(lit).collect();
    select([star()])
        .from("t")
        .where_(col("x").in_list(values).expect("non-empty list"))
        .build()
}

fn report_query() -> Node {
    let recent = select([col("user_id"), col("amount")])
        .from("orders")
        .where_(col("ts").gte(date("2024-01-01").expect("valid date")))
        .build();
    select([
        col("users.name"),
        func("SUM", [col("recent.amount")]).alias("total"),
        func("ROW_NUMBER", Vec::<Expr>::new())
            .over(window().order_by([func("SUM", [col("recent.amount")]).desc()]))
            .alias("rank"),
    ])
    .with(with_([cte("recent", recent).expect("named cte")], false).expect("one cte"))
    .from("recent")
    .join("users", col("users.id").eq(col("recent.user_id")))
    .group_by(["users.name"])
    .having(func("SUM", [col("recent.amount")]).gt(lit(100)))
    .order_by([col("total").desc()])
    .limit(50)
    .build()
}

fn bench_serialize_in_list(c: &mut Criterion) {
    for size in LIST_SIZES {
        let query = wide_in_query(size);
        let config = GeneratorConfig::compact();
        let bytes = serialize(&query, &config).expect("serializes").len();

        let mut group = c.benchmark_group("serialize_in_list");
        group.sampling_mode(SamplingMode::Flat);
        group.throughput(Throughput::Bytes(bytes as u64));
        group.warm_up_time(Duration::from_secs(1));
        if size >= 100_000 {
            group.sample_size(15);
            group.measurement_time(Duration::from_secs(8));
        } else {
            group.sample_size(25);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &query, |b, query| {
            b.iter(|| serialize(black_box(query), &config).expect("serializes"));
        });
        group.finish();
    }
}

fn bench_serialize_modes(c: &mut Criterion) {
    let query = report_query();
    let mut group = c.benchmark_group("serialize_report");
    for (name, config) in [
        ("compact", GeneratorConfig::compact()),
        ("pretty", GeneratorConfig::pretty()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| serialize(black_box(&query), config).expect("serializes"));
        });
    }
    group.finish();
}

fn bench_find_and_replace(c: &mut Criterion) {
    let query = wide_in_query(10_000);
    c.bench_function("find_replace_literals_10000", |b| {
        b.iter_batched(
            || Tree::new(query.clone()),
            |mut tree| {
                tree.collection()
                    .find(&tree, NodeKind::IntegerLiteral)
                    .expect("find")
                    .replace_with(&mut tree, null().into_inner())
                    .expect("replace");
                tree
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_serialize_in_list,
    bench_serialize_modes,
    bench_find_and_replace
);
criterion_main!(benches);

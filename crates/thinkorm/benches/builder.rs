use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use thinkorm::{Builder, Options, Query, QueryConfig};

/// Declare `n` equality conditions plus a fan-out and a nested group:
/// SELECT * FROM think_user u WHERE u.c0 = ? AND ... AND (name LIKE ? OR nick LIKE ?) ...
fn declare(q: &mut Query, n: usize) {
    q.table("__USER__ u");
    for i in 0..n {
        q.r#where(&format!("u.c{i}"), i as i64);
    }
    q.where_op("name|nick", "like", "think%")
        .where_group(|g| {
            g.r#where("status", 1).where_or("role", "admin");
        })
        .order("u.id desc")
        .page(3, 20);
}

fn normalized(n: usize) -> Options {
    let mut q = Query::new(QueryConfig::new().with_prefix("think_"));
    declare(&mut q, n);
    q.normalize().expect("valid declaration")
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/render");
    let builder = Builder::generic().with_prefix("think_");

    for n in [1, 5, 10, 50, 100] {
        let options = normalized(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &options, |b, options| {
            b.iter(|| black_box(builder.select(options)));
        });
    }

    group.finish();
}

fn bench_declare_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/declare_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut q = Query::new(QueryConfig::new().with_prefix("think_"));
            b.iter(|| {
                declare(&mut q, n);
                black_box(q.select().expect("valid declaration"));
            });
        });
    }

    group.finish();
}

fn bench_real_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/to_real_sql");

    for n in [5, 20, 100, 500] {
        let mut q = Query::new(QueryConfig::default());
        q.table("t").where_in("id", 0..n as i64);
        let stmt = q.select().expect("valid declaration");
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.to_real_sql()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_declare_and_render, bench_real_sql);
criterion_main!(benches);

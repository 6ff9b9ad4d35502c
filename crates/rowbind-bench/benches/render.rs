//! Criteria rendering benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rowbind_bench::users_table;
use rowbind_core::dialect::{
    AnsiDialect, Dialect, MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect,
    SqliteDialect,
};
use rowbind_core::{build_count, build_select, render_criteria, Criteria};
use rowbind_proto::expr::{between, conjunction, desc, eq, func, ilike, in_values, not};
use rowbind_proto::{Expr, MatchMode};

fn dialects() -> Vec<(&'static str, Box<dyn Dialect>)> {
    let all: [(&'static str, Box<dyn Dialect>); 6] = [
        ("ansi", Box::new(AnsiDialect::new())),
        ("postgres", Box::new(PostgresDialect::new())),
        ("sqlserver", Box::new(SqlServerDialect::new())),
        ("mysql", Box::new(MySqlDialect::new())),
        ("sqlite", Box::new(SqliteDialect::new())),
        ("oracle", Box::new(OracleDialect::new())),
    ];
    all.into()
}

fn filter_tree() -> Expr {
    conjunction([
        eq("active", true),
        between("age", 18, 65),
        in_values("email", ["a@example.com", "b@example.com", "c@example.com"]),
        not(ilike("full_name", "adm", MatchMode::Start)),
        func("upper", [Expr::field("full_name")]).select(),
    ])
}

fn bench_render_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/expression");
    let table = users_table();
    let tree = filter_tree();

    for (name, dialect) in dialects() {
        group.bench_with_input(BenchmarkId::new("parameterized", name), &tree, |b, tree| {
            b.iter(|| {
                black_box(render_criteria(tree, dialect.as_ref(), Some(&*table), true).unwrap());
            });
        });
    }

    group.bench_function("inline/ansi", |b| {
        let dialect = AnsiDialect::new();
        b.iter(|| {
            black_box(render_criteria(&tree, &dialect, Some(&*table), false).unwrap());
        });
    });

    group.finish();
}

fn bench_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");
    let criteria = Criteria::new(users_table())
        .with_condition(eq("active", true))
        .with_condition(between("age", 18, 65))
        .with_order(desc("age"));

    for (name, dialect) in dialects() {
        group.bench_with_input(BenchmarkId::new("paginated", name), &criteria, |b, criteria| {
            b.iter(|| {
                black_box(build_select(criteria, dialect.as_ref(), Some(50), Some(100)).unwrap());
            });
        });
    }

    group.bench_function("count/ansi", |b| {
        let dialect = AnsiDialect::new();
        b.iter(|| {
            black_box(build_count(&criteria, &dialect).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render_expression, bench_build_select);
criterion_main!(benches);

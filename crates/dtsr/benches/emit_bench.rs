//! Benchmarks for the declaration emitter.
//!
//! Run with: cargo bench --bench emit_bench
//!
//! These benchmarks track end-to-end emission throughput (scan + infer +
//! process) and the parallel batch entry point.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dtsr::{process_batch, process_source};

/// Sample TypeScript source for basic benchmarking
const SMALL_SOURCE: &str = r#"
export const port = 3000;
export function add(a: number, b: number): number {
    return a + b;
}
export interface Options { verbose: boolean }
"#;

/// Medium-sized TypeScript source
const MEDIUM_SOURCE: &str = r#"
import { Observable, Subject } from 'rxjs';
import { Logger } from './logger';

interface User {
    id: number;
    name: string;
    roles: string[];
}

type UserRole = 'admin' | 'user' | 'guest';

export class UserService {
    private users: Map<number, User> = new Map();
    private destroy$ = new Subject<void>();

    constructor(private log: Logger) {}

    getUser(id: number): User | undefined {
        return this.users.get(id);
    }

    async fetchUser(id: number): Promise<User> {
        const response = await fetch(`/api/users/${id}`);
        return response.json();
    }

    watch(): Observable<User | null> {
        return null as any;
    }
}

export function hasRole(user: User, role: UserRole): boolean {
    return user.roles.includes(role);
}

export const defaults = { retries: 3, timeout: 5000 };
"#;

/// Generate a large synthetic TypeScript source
fn generate_large_source(lines: usize) -> String {
    let mut source = String::with_capacity(lines * 50);
    for i in 0..lines {
        match i % 5 {
            0 => source.push_str(&format!("export const var{i} = {i};\n")),
            1 => source.push_str(&format!("export const str{i}: string = \"value{i}\";\n")),
            2 => source.push_str(&format!(
                "export function fn{i}(x: number): number {{ return x * {i}; }}\n"
            )),
            3 => source.push_str(&format!(
                "export interface I{i} {{ value: number; name: string; }}\n"
            )),
            _ => source.push_str(&format!("export type T{i} = {{ id: {i}; data: string }};\n")),
        }
    }
    source
}

fn bench_emit_small(c: &mut Criterion) {
    c.bench_function("emit_small", |b| {
        b.iter(|| process_source(black_box(SMALL_SOURCE), false, false))
    });
}

fn bench_emit_medium(c: &mut Criterion) {
    c.bench_function("emit_medium", |b| {
        b.iter(|| process_source(black_box(MEDIUM_SOURCE), false, false))
    });
}

fn bench_emit_with_comments(c: &mut Criterion) {
    c.bench_function("emit_medium_keep_comments", |b| {
        b.iter(|| process_source(black_box(MEDIUM_SOURCE), true, false))
    });
}

fn bench_emit_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_throughput");
    for size in [100, 500, 1000, 5000].iter() {
        let source = generate_large_source(*size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| process_source(black_box(source), false, false))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let sources: Vec<String> = (0..64).map(|_| generate_large_source(200)).collect();
    c.bench_function("batch_64_files", |b| {
        b.iter(|| process_batch(black_box(&sources), false, 0))
    });
}

criterion_group!(
    benches,
    bench_emit_small,
    bench_emit_medium,
    bench_emit_with_comments,
    bench_emit_throughput,
    bench_batch
);
criterion_main!(benches);

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use proctop::system::error::SamplerError;
use proctop::system::process::{ProcessSnapshot, rank_by_memory};
use proctop::system::sampler::{ProcessHandle, ProcessTable, sample_processes};

struct SyntheticTable {
    n: u32,
}

struct SyntheticHandle(u32);

impl ProcessHandle for SyntheticHandle {
    fn module_name(&self) -> Result<String, SamplerError> {
        Ok(format!("proc_{}", self.0))
    }

    fn working_set_bytes(&self) -> Result<u64, SamplerError> {
        Ok(((self.0 as u64 * 7919) % 10_007) * 4096)
    }
}

impl ProcessTable for SyntheticTable {
    type Handle<'a>
        = SyntheticHandle
    where
        Self: 'a;

    fn process_ids(&mut self) -> Result<Vec<u32>, SamplerError> {
        Ok((1..=self.n).rev().collect())
    }

    fn open(&self, pid: u32) -> Result<SyntheticHandle, SamplerError> {
        if pid % 13 == 0 {
            return Err(SamplerError::ProcessAccessDenied { pid });
        }
        Ok(SyntheticHandle(pid))
    }
}

fn make_snapshots(n: usize) -> Vec<ProcessSnapshot> {
    (0..n)
        .map(|i| {
            let pid = i as u32 + 1;
            ProcessSnapshot::new(pid, Some("worker"), Some(((i as u64 * 7919) % 10_007) * 4096))
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_by_memory_256_512_1024");
    for size in [256usize, 512, 1024] {
        let snapshots = make_snapshots(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshots, |b, s| {
            b.iter(|| black_box(rank_by_memory(s.clone(), 10)));
        });
    }
    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_processes_256_512_1024");
    for size in [256u32, 512, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &n| {
            let mut table = SyntheticTable { n };
            b.iter(|| black_box(sample_processes(&mut table, 1024, 10)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rank, bench_sample);
criterion_main!(benches);

extern crate classic_bloom;
extern crate rand;
#[macro_use]
extern crate criterion;

use classic_bloom::{BloomFilter, DoubleHashing, SharedBloomFilter};
use criterion::{Criterion, Fun};
use rand::distributions::Standard;
use rand::{thread_rng, Rng};

fn random_items(count: usize) -> Vec<[u8; 8]> {
    thread_rng()
        .sample_iter(&Standard)
        .take(count)
        .map(|i: u64| i.to_le_bytes())
        .collect()
}

fn bench(c: &mut Criterion) {
    let seeded = Fun::new("seeded", |b, fp_rate| {
        let mut filter = BloomFilter::new_for_capacity(100, *fp_rate).unwrap();
        random_items(7).iter().for_each(|i| filter.insert(i));
        let items = random_items(7);
        b.iter(|| {
            items.iter().for_each(|i| {
                filter.contains(i);
            })
        })
    });

    let double = Fun::new("double_hashing", |b, fp_rate| {
        let params = classic_bloom::FilterParams::for_capacity(100, *fp_rate).unwrap();
        let mut filter = BloomFilter::with_params(params, DoubleHashing::default());
        random_items(7).iter().for_each(|i| filter.insert(i));
        let items = random_items(7);
        b.iter(|| {
            items.iter().for_each(|i| {
                filter.contains(i);
            })
        })
    });

    let shared = Fun::new("shared", |b, fp_rate| {
        let filter = SharedBloomFilter::new_for_capacity(100, *fp_rate).unwrap();
        random_items(7).iter().for_each(|i| filter.insert(i));
        let items = random_items(7);
        b.iter(|| {
            items.iter().for_each(|i| {
                filter.contains(i);
            })
        })
    });
    let functions = vec![seeded, double, shared];
    c.bench_functions("contains", functions, 0.03);
}

criterion_group!(benches, bench);
criterion_main!(benches);

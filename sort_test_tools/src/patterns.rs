//! Input patterns for testing and benchmarking sorts and sorted slice operations.
//!
//! All values are i32. Random patterns draw from one seed per process so that a failure can be
//! reproduced by setting `OVERRIDE_SEED`, see [`random_init_seed`].

use std::cmp::Reverse;
use std::env;
use std::str::FromStr;
use std::sync::Mutex;

use rand::distributions::Uniform;
use rand::prelude::*;

use zipf::ZipfDistribution;

// --- Unsorted ---

pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    let mut rng = new_rng();
    (0..len).map(|_| rng.gen::<i32>()).collect()
}

pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<Uniform<i32>>,
{
    // :.:.:.::

    let dist: Uniform<i32> = range.into();
    let mut rng = new_rng();
    (0..len).map(|_| dist.sample(&mut rng)).collect()
}

pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // Few values dominate, https://en.wikipedia.org/wiki/Zipf's_law

    if len == 0 {
        return Vec::new();
    }

    let dist = ZipfDistribution::new(len, exponent).unwrap();
    let mut rng = new_rng();
    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    // sorted  unsorted

    // An existing sorted slice with new unsorted values appended.
    let mut v = random(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;
    v[..sorted_len].sort_unstable();
    v
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; len]
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect()
}

pub fn saw_ascending(len: usize, saw_count: usize) -> Vec<i32> {
    //   .:  .:
    // .:::.:::

    saw(len, saw_count, |_| false)
}

pub fn saw_descending(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.
    // :::.:::.

    saw(len, saw_count, |_| true)
}

pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    let directions = random_uniform(saw_count.max(1) + 1, 0..=1);
    saw(len, saw_count, |i| directions.get(i).map_or(false, |&d| d == 1))
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut v = random(len);
    let (first_half, second_half) = v.split_at_mut(len / 2);
    first_half.sort_unstable();
    second_half.sort_unstable_by_key(|&e| Reverse(e));
    v
}

// --- Sorted ---

/// Sorted values drawn uniformly from `range`, so duplicates show up as soon as `len` approaches
/// the size of the range.
pub fn sorted_random<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<Uniform<i32>>,
{
    // ..:::
    // .::::::

    let mut v = random_uniform(len, range);
    v.sort_unstable();
    v
}

/// `count` sorted sources of random length in `0..=max_len`, all drawing from `range`.
pub fn sorted_sources<R>(count: usize, max_len: usize, range: R) -> Vec<Vec<i32>>
where
    R: Into<Uniform<i32>> + Clone,
{
    let lens = random_uniform(count, 0..=(max_len as i32));
    lens.into_iter()
        .map(|len| sorted_random(len as usize, range.clone()))
        .collect()
}

// --- Seed control ---

/// Makes every call to a random pattern use a fresh seed.
///
/// By default `patterns::random(4)` yields the same values for every call within one process.
/// Benchmarks should call this, so that they do not measure the same input over and over.
pub fn use_random_seed_each_time() {
    let (source, _) = seed_source_and_value();
    if source == SeedSource::ExternalOverride {
        panic!("Using use_random_seed_each_time conflicts with the external seed override.");
    }

    *SEED.lock().unwrap() = Some((SeedSource::RandomEachTime, 0));
}

/// Returns the seed used for random patterns in this process.
///
/// Taken from the `OVERRIDE_SEED` environment variable if set, random otherwise.
pub fn random_init_seed() -> u64 {
    seed_source_and_value().1
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum SeedSource {
    RandomEachTime,
    RandomOncePerProcess,
    ExternalOverride,
}

static SEED: Mutex<Option<(SeedSource, u64)>> = Mutex::new(None);

fn seed_source_and_value() -> (SeedSource, u64) {
    let (source, seed) = *SEED.lock().unwrap().get_or_insert_with(|| {
        match env::var("OVERRIDE_SEED").ok() {
            Some(seed) => (SeedSource::ExternalOverride, u64::from_str(&seed).unwrap()),
            None => (SeedSource::RandomOncePerProcess, thread_rng().gen()),
        }
    });

    match source {
        SeedSource::RandomEachTime => (source, thread_rng().gen()),
        _ => (source, seed),
    }
}

fn new_rng() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}

// Random values split into `saw_count` chunks, chunk `i` sorted descending if `descending(i)`.
fn saw(len: usize, saw_count: usize, descending: impl Fn(usize) -> bool) -> Vec<i32> {
    let mut v = random(len);
    if len == 0 {
        return v;
    }

    let chunk_len = (len / saw_count.max(1)).max(1);
    for (i, chunk) in v.chunks_mut(chunk_len).enumerate() {
        if descending(i) {
            chunk.sort_unstable_by_key(|&e| Reverse(e));
        } else {
            chunk.sort_unstable();
        }
    }

    v
}

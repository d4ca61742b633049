use sorted_slices::gallop::{gallop_left, gallop_right};
use sorted_slices::insertion::binary_insertion_sort;
use sorted_slices::run::{count_run_and_make_ascending, min_run_length};
use sorted_slices::{SortError, MIN_MERGE};

use sort_test_tools::patterns;

fn lt(a: &i32, b: &i32) -> bool {
    a < b
}

#[test]
fn gallop_equal_keys() {
    let run = [1, 3, 3, 3, 5, 7];

    for hint in 0..run.len() {
        assert_eq!(gallop_left(&3, &run, hint, &mut lt), Ok(1), "hint {hint}");
        assert_eq!(gallop_right(&3, &run, hint, &mut lt), Ok(4), "hint {hint}");

        assert_eq!(gallop_left(&0, &run, hint, &mut lt), Ok(0));
        assert_eq!(gallop_right(&0, &run, hint, &mut lt), Ok(0));
        assert_eq!(gallop_left(&8, &run, hint, &mut lt), Ok(6));
        assert_eq!(gallop_right(&8, &run, hint, &mut lt), Ok(6));
        assert_eq!(gallop_left(&4, &run, hint, &mut lt), Ok(4));
        assert_eq!(gallop_right(&7, &run, hint, &mut lt), Ok(6));
    }
}

#[test]
fn gallop_matches_partition_point() {
    for len in [1, 2, 3, 7, 8, 9, 31, 100, 1_000] {
        let run = patterns::sorted_random(len, 0..=(len as i32 / 3));
        let hints = [0, len / 4, len / 2, len - 1];

        for key in -1..=(len as i32 / 3 + 1) {
            let expected_left = run.partition_point(|x| x < &key);
            let expected_right = run.partition_point(|x| x <= &key);

            for hint in hints {
                assert_eq!(gallop_left(&key, &run, hint, &mut lt), Ok(expected_left));
                assert_eq!(gallop_right(&key, &run, hint, &mut lt), Ok(expected_right));
            }
        }
    }
}

#[test]
fn gallop_rejects_bad_hint() {
    let run = [1, 2, 3];
    assert_eq!(
        gallop_left(&2, &run, 3, &mut lt),
        Err(SortError::InvalidRange { lo: 3, hi: 3 })
    );
    assert_eq!(
        gallop_right(&2, &[], 0, &mut lt),
        Err(SortError::InvalidRange { lo: 0, hi: 0 })
    );
}

#[test]
fn run_detection() {
    let mut v = [1, 2, 2, 3, 1, 0];
    assert_eq!(count_run_and_make_ascending(&mut v, 0, 6, &mut lt), Ok(4));
    assert_eq!(v, [1, 2, 2, 3, 1, 0]);

    // Descending runs must be strict, otherwise reversing them would be unstable.
    let mut v = [5, 4, 3, 3, 1];
    assert_eq!(count_run_and_make_ascending(&mut v, 0, 5, &mut lt), Ok(3));
    assert_eq!(v, [3, 4, 5, 3, 1]);

    let mut v = [9, 5, 4, 3, 2, 1];
    assert_eq!(count_run_and_make_ascending(&mut v, 1, 6, &mut lt), Ok(5));
    assert_eq!(v, [9, 1, 2, 3, 4, 5]);

    let mut v = [7];
    assert_eq!(count_run_and_make_ascending(&mut v, 0, 1, &mut lt), Ok(1));

    assert_eq!(
        count_run_and_make_ascending(&mut [1, 2], 1, 1, &mut lt),
        Err(SortError::InvalidRange { lo: 1, hi: 1 })
    );
    assert_eq!(
        count_run_and_make_ascending(&mut [1, 2], 0, 3, &mut lt),
        Err(SortError::InvalidRange { lo: 0, hi: 3 })
    );
}

#[test]
fn min_run_length_bounds() {
    for n in 0..MIN_MERGE {
        assert_eq!(min_run_length(n), n);
    }

    assert_eq!(min_run_length(32), 16);
    assert_eq!(min_run_length(33), 17);
    assert_eq!(min_run_length(64), 16);
    assert_eq!(min_run_length(65), 17);
    assert_eq!(min_run_length(2_048), 16);

    for n in MIN_MERGE..100_000 {
        let k = min_run_length(n);
        assert!((MIN_MERGE / 2..=MIN_MERGE).contains(&k), "n {n} k {k}");
    }
}

#[test]
fn binary_insertion_sort_is_stable() {
    let keys = patterns::random_uniform(200, 0..10);
    let mut v: Vec<(i32, usize)> = keys.into_iter().enumerate().map(|(i, k)| (k, i)).collect();
    let len = v.len();

    // Sorted prefix of length 1, the rest is inserted one by one.
    binary_insertion_sort(&mut v, 0, len, 1, &mut |a, b| a.0 < b.0).unwrap();
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn binary_insertion_sort_keeps_sorted_prefix() {
    let mut v = [1, 4, 6, 9, 5, 0, 7, 100];
    binary_insertion_sort(&mut v, 0, 7, 4, &mut lt).unwrap();
    assert_eq!(v, [0, 1, 4, 5, 6, 7, 9, 100]);

    // Only the given range is touched.
    let mut v = [9, 3, 2, 1, 0];
    binary_insertion_sort(&mut v, 1, 4, 1, &mut lt).unwrap();
    assert_eq!(v, [9, 1, 2, 3, 0]);
}

#[test]
fn binary_insertion_sort_rejects_bad_ranges() {
    let mut v = [3, 2, 1];
    assert_eq!(
        binary_insertion_sort(&mut v, 2, 3, 1, &mut lt),
        Err(SortError::InvalidRange { lo: 2, hi: 3 })
    );
    assert_eq!(
        binary_insertion_sort(&mut v, 0, 2, 3, &mut lt),
        Err(SortError::InvalidRange { lo: 0, hi: 2 })
    );
    assert_eq!(
        binary_insertion_sort(&mut v, 0, 4, 1, &mut lt),
        Err(SortError::InvalidRange { lo: 0, hi: 4 })
    );
    assert_eq!(v, [3, 2, 1]);
}

#[test]
fn strictly_descending_is_one_reversal() {
    let mut comps = 0;
    let mut v = [5, 4, 3, 2, 1];
    sorted_slices::sort_by_less(&mut v, |a, b| {
        comps += 1;
        a < b
    })
    .unwrap();

    assert_eq!(v, [1, 2, 3, 4, 5]);
    assert_eq!(comps, 4);
}

#[test]
fn presorted_input_takes_linear_comparisons() {
    for len in [2, 10, 31, 32, 33, 100, 1_000, 10_000] {
        for mut v in [patterns::ascending(len), patterns::descending(len)] {
            let mut comps = 0;
            sorted_slices::sort_by_less(&mut v, |a, b| {
                comps += 1;
                a < b
            })
            .unwrap();

            assert_eq!(v, patterns::ascending(len));
            assert_eq!(comps, len - 1, "len {len}");
        }
    }
}

#[test]
fn sort_by_key_is_stable() {
    let mut v: Vec<(u8, usize)> = patterns::random_uniform(5_000, 0..50)
        .into_iter()
        .enumerate()
        .map(|(i, k)| (k as u8, i))
        .collect();

    sorted_slices::sort_by_key(&mut v, |&(k, _)| k).unwrap();
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn zero_sized_types_are_untouched() {
    let mut v = [(); 100];
    assert_eq!(sorted_slices::sort(&mut v), Ok(()));
    assert_eq!(sorted_slices::sort_by_less(&mut v, |_, _| panic!()), Ok(()));
}

#[test]
fn broken_comparator_is_reported() {
    // The comparison is consistent up to some point and claims that nothing is less than
    // anything after it. Flipping in the middle of a merge empties the wrong run.
    let input = patterns::random(5_000);
    let sum_before: i64 = input.iter().map(|&x| x as i64).sum();

    let mut total_comps = 0usize;
    let mut reference = input.clone();
    sorted_slices::sort_by_less(&mut reference, |a, b| {
        total_comps += 1;
        a < b
    })
    .unwrap();

    let mut errors = Vec::new();
    for flip_at in (0..total_comps).step_by((total_comps / 500).max(1)) {
        let mut v = input.clone();
        let mut comps = 0;
        let res = sorted_slices::sort_by_less(&mut v, |a, b| {
            comps += 1;
            comps <= flip_at && a < b
        });

        let sum_after: i64 = v.iter().map(|&x| x as i64).sum();
        assert_eq!(sum_before, sum_after, "flip at {flip_at}");

        if let Err(err) = res {
            assert!(err.is_comparator_fault(), "{err}");
            errors.push(err);
        }
    }

    assert!(!errors.is_empty());
    assert!(errors.contains(&SortError::ComparatorContractViolation));
}

#[test]
fn error_messages() {
    assert_eq!(
        SortError::InvalidRange { lo: 3, hi: 1 }.to_string(),
        "invalid range: lo=3 hi=1"
    );
    assert_eq!(
        SortError::ComparatorContractViolation.to_string(),
        "comparison method violates its general contract"
    );
    assert!(SortError::InvariantViolation("x").is_comparator_fault());
    assert!(!SortError::InvalidRange { lo: 0, hi: 0 }.is_comparator_fault());
}

//! Differential tests comparing RecordStack against a `Vec<Vec<u8>>` model
//!
//! Random operation sequences run against both; after every step the stack
//! must hold the same payloads in the same order and pass `verify`.

use proptest::prelude::*;
use recstack::{RecordStack, StackConfig, StackError};

#[derive(Clone, Debug)]
enum Step {
    Push(Vec<u8>),
    PushMany(Vec<Vec<u8>>),
    Pop,
    PopMany(usize),
    Swap,
    DropInside(usize, usize),
}

fn payload() -> impl Strategy<Value = Vec<u8>> {
    // Lengths straddle the one/two byte tag boundary at 128
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..8),
        proptest::collection::vec(any::<u8>(), 120..140),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => payload().prop_map(Step::Push),
        1 => proptest::collection::vec(payload(), 0..4).prop_map(Step::PushMany),
        2 => Just(Step::Pop),
        1 => (0usize..4).prop_map(Step::PopMany),
        3 => Just(Step::Swap),
        1 => (0usize..5, 0usize..4).prop_map(|(s, c)| Step::DropInside(s, c)),
    ]
}

/// Model stack: last element is the top
struct Model {
    records: Vec<Vec<u8>>,
    capacity: usize,
}

impl Model {
    fn occupied(&self) -> usize {
        self.records.iter().map(|r| record_size(r.len())).sum()
    }

    fn fits(&self, extra: usize) -> bool {
        self.occupied() + extra <= self.capacity
    }

    fn top_down(&self) -> Vec<Vec<u8>> {
        self.records.iter().rev().cloned().collect()
    }
}

fn record_size(len: usize) -> usize {
    len + recstack::encoding::tag_size(len)
}

fn apply(stack: &mut RecordStack, model: &mut Model, step: &Step) {
    match step {
        Step::Push(p) => {
            let result = stack.push(p);
            if model.fits(record_size(p.len())) {
                assert!(result.is_ok());
                model.records.push(p.clone());
            } else {
                assert!(matches!(result, Err(StackError::CapacityExceeded { .. })));
            }
        }
        Step::PushMany(ps) => {
            let result = stack.push_many(ps);
            let extra: usize = ps.iter().map(|p| record_size(p.len())).sum();
            if model.fits(extra) {
                assert!(result.is_ok());
                model.records.extend(ps.iter().cloned());
            } else {
                assert!(result.is_err());
            }
        }
        Step::Pop => match model.records.pop() {
            Some(expected) => assert_eq!(stack.pop().unwrap(), expected),
            None => assert!(stack.pop().is_err()),
        },
        Step::PopMany(n) => {
            let result = stack.pop_many(*n);
            if *n <= model.records.len() {
                let split = model.records.len() - n;
                let expected: Vec<Vec<u8>> = model.records.drain(split..).rev().collect();
                assert_eq!(result.unwrap(), expected);
            } else {
                assert!(result.is_err());
            }
        }
        Step::Swap => {
            let result = stack.swap();
            let len = model.records.len();
            if len >= 2 {
                assert!(result.is_ok());
                model.records.swap(len - 1, len - 2);
            } else {
                assert!(result.is_err());
            }
        }
        Step::DropInside(skip, count) => {
            let result = stack.drop_inside(*skip, *count);
            let len = model.records.len();
            if *skip == 0 || *count == 0 {
                assert!(result.is_ok());
            } else if *skip >= len || count > skip {
                assert!(result.is_err());
            } else {
                assert!(result.is_ok());
                // depths skip+1-count ..= skip, counted from the top
                let deepest = len - 1 - skip;
                model.records.drain(deepest..deepest + count);
            }
        }
    }
}

proptest! {
    #[test]
    fn stack_matches_model(
        capacity in 0usize..600,
        steps in proptest::collection::vec(step(), 0..40),
    ) {
        let mut stack = RecordStack::with_capacity(capacity).unwrap();
        let mut model = Model { records: Vec::new(), capacity };

        for step in &steps {
            apply(&mut stack, &mut model, step);
            let records: Vec<Vec<u8>> = stack.iter().map(|r| r.to_vec()).collect();
            prop_assert_eq!(records, model.top_down());
            prop_assert_eq!(stack.len(), model.records.len());
            prop_assert_eq!(stack.occupied(), model.occupied());
            prop_assert!(stack.verify().is_ok());
        }
    }

    #[test]
    fn growable_matches_fixed(
        payloads in proptest::collection::vec(payload(), 0..30),
        initial in 0usize..64,
    ) {
        let mut fixed = RecordStack::with_capacity(8192).unwrap();
        let mut growable = RecordStack::new(StackConfig::growable(initial, 8192)).unwrap();
        for p in &payloads {
            fixed.push(p).unwrap();
            growable.push(p).unwrap();
        }
        prop_assert_eq!(fixed.as_bytes(), growable.as_bytes());
        prop_assert!(growable.allocated() <= 8192);
    }

    #[test]
    fn swap_is_an_involution(
        payloads in proptest::collection::vec(payload(), 2..10),
    ) {
        let mut stack = RecordStack::with_capacity(4096).unwrap();
        stack.push_many(&payloads).unwrap();
        let before = stack.as_bytes().to_vec();
        let occupied = stack.occupied();

        stack.swap().unwrap();
        prop_assert_eq!(stack.occupied(), occupied);
        prop_assert_eq!(stack.len(), payloads.len());
        prop_assert_eq!(stack.peek().unwrap(), payloads[payloads.len() - 2].as_slice());

        // Records below the top two are byte-identical
        let top_two: usize = payloads[payloads.len() - 2..]
            .iter()
            .map(|p| record_size(p.len()))
            .sum();
        prop_assert_eq!(&stack.as_bytes()[top_two..], &before[top_two..]);

        stack.swap().unwrap();
        prop_assert_eq!(stack.as_bytes(), before.as_slice());
    }

    #[test]
    fn image_round_trips(
        payloads in proptest::collection::vec(payload(), 0..10),
    ) {
        let mut stack = RecordStack::with_capacity(4096).unwrap();
        stack.push_many(&payloads).unwrap();

        let restored = RecordStack::from_image(stack.as_bytes(), StackConfig::fixed(4096)).unwrap();
        prop_assert_eq!(restored.len(), stack.len());
        prop_assert_eq!(restored.as_bytes(), stack.as_bytes());

        let mut appended = RecordStack::with_capacity(4096).unwrap();
        appended.push_raw(stack.as_bytes()).unwrap();
        prop_assert_eq!(appended.as_bytes(), stack.as_bytes());
    }
}

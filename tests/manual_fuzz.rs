//! Quick manual fuzzer - run with: cargo test --release manual_fuzz -- --ignored --nocapture

use cswfilter::repl::ReplState;
use rand::prelude::*;
use std::time::Instant;

fn random_ascii_string(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.random_range(0x20u8..0x7F) as char).collect()
}

fn random_cql_like(rng: &mut impl Rng) -> String {
    let keywords = [
        "AND", "OR", "NOT", "LIKE", "IS", "NULL", "BETWEEN", "IN", "AFTER", "BEFORE", "DURING",
        "BBOX", "DWITHIN", "BEYOND", "INTERSECTS", "POINT", "POLYGON", "ENVELOPE",
    ];
    let ops = ["=", "<>", "<", ">", "<=", ">=", "(", ")", ",", "/", "-"];
    let atoms = [
        "Title", "Modified", "apiso:Subject", "'VM'", "'a%'", "'it''s'", "10", "-2.5",
        "2007-06-02", "2007-06-02T00:00:00Z", "\"During\"", "0 0", "meters",
    ];

    let mut s = String::new();
    let len = rng.random_range(1..120);
    for _ in 0..len {
        match rng.random_range(0..4) {
            0 => s.push_str(keywords.choose(rng).unwrap()),
            1 => s.push_str(ops.choose(rng).unwrap()),
            2 => s.push_str(atoms.choose(rng).unwrap()),
            _ => s.push(' '),
        }
        if rng.random_bool(0.4) {
            s.push(' ');
        }
    }
    s
}

#[test]
#[ignore]
fn manual_fuzz_parser() {
    let mut rng = rand::rng();
    let start = Instant::now();
    let mut count = 0;
    let mut errors = 0;

    while start.elapsed().as_secs() < 10 {
        let len = rng.random_range(1usize..300);
        let input = if rng.random_bool(0.3) {
            random_ascii_string(&mut rng, len)
        } else {
            random_cql_like(&mut rng)
        };

        let result = std::panic::catch_unwind(|| {
            let _ = cswfilter::parse_cql(&input);
        });

        if result.is_err() {
            eprintln!("PANIC on input: {:?}", input);
            errors += 1;
        }
        count += 1;
    }

    eprintln!("Ran {} iterations, {} panics", count, errors);
    assert_eq!(errors, 0, "Parser panicked on some inputs!");
}

#[test]
#[ignore]
fn manual_fuzz_repl() {
    let mut rng = rand::rng();
    let start = Instant::now();
    let mut count = 0;
    let mut errors = 0;
    let mut translated = 0;

    while start.elapsed().as_secs() < 10 {
        let input = random_cql_like(&mut rng);

        let result = std::panic::catch_unwind(|| {
            let state = ReplState::default();
            state.execute_cql(&input).is_ok()
        });

        match result {
            Ok(true) => translated += 1,
            Ok(false) => {}
            Err(_) => {
                eprintln!("PANIC on input: {:?}", input);
                errors += 1;
            }
        }
        count += 1;
    }

    eprintln!(
        "Ran {} iterations, {} translated, {} panics",
        count, translated, errors
    );
    assert_eq!(errors, 0, "REPL panicked on some inputs!");
}

/// Edge cases: deep nesting, huge literals, odd characters
#[test]
#[ignore]
fn manual_fuzz_edge_cases() {
    let mut rng = rand::rng();
    let start = Instant::now();
    let mut count = 0;
    let mut errors = 0;

    let edge_cases: Vec<fn(&mut _) -> String> = vec![
        // Deep nesting
        |rng: &mut rand::rngs::ThreadRng| {
            let depth = rng.random_range(10..100);
            let mut s = "(".repeat(depth);
            s.push_str("Title = 'x'");
            s.push_str(&")".repeat(depth));
            s
        },
        // Long NOT chains
        |rng: &mut rand::rngs::ThreadRng| {
            let depth = rng.random_range(10..100);
            format!("{}Title = 'x'", "NOT ".repeat(depth))
        },
        // Very long string literals
        |rng: &mut rand::rngs::ThreadRng| {
            let len = rng.random_range(1000..10000);
            format!("Title = '{}'", "a".repeat(len))
        },
        // Many OR operands
        |rng: &mut rand::rngs::ThreadRng| {
            let n = rng.random_range(50..500);
            (0..n)
                .map(|i| format!("Title = 't{}'", i))
                .collect::<Vec<_>>()
                .join(" OR ")
        },
        // Unicode
        |_rng: &mut rand::rngs::ThreadRng| "Titre = 'carte géologique 日本' AND 題名 LIKE '%'".to_string(),
        // Control characters inside literals
        |rng: &mut rand::rngs::ThreadRng| {
            let mut s = String::from("Title = '");
            for _ in 0..rng.random_range(1..50) {
                s.push(rng.random_range(0u8..32) as char);
            }
            s.push('\'');
            s
        },
        // Huge polygons
        |rng: &mut rand::rngs::ThreadRng| {
            let n = rng.random_range(10..2000);
            let ring = (0..n)
                .map(|i| format!("{} {}", i % 180, i % 90))
                .collect::<Vec<_>>()
                .join(", ");
            format!("INTERSECTS(geom, POLYGON(({})))", ring)
        },
        // Out-of-range numbers and dates
        |_rng: &mut rand::rngs::ThreadRng| {
            "Scale > 1e999 AND Modified BETWEEN 9999-99-99 AND 0000-00-00".to_string()
        },
    ];

    while start.elapsed().as_secs() < 30 {
        let gen_idx = rng.random_range(0..edge_cases.len());
        let input = edge_cases[gen_idx](&mut rng);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let state = ReplState::default();
            let _ = state.execute_cql(&input);
        }));

        if result.is_err() {
            let preview: String = input.chars().take(200).collect();
            eprintln!("PANIC on input (gen {}): {:?}", gen_idx, preview);
            errors += 1;
        }
        count += 1;
    }

    eprintln!("Ran {} edge-case iterations, {} panics", count, errors);
    assert_eq!(errors, 0, "REPL panicked on edge cases!");
}

//! Benchmarks for the pure reconciliation policy functions.
//!
//! These are the hot path of event handling: every actionable event is
//! applied against every unresolved candidate record, so the per-record
//! transforms need to stay cheap. Inputs are fixed for reproducibility.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tipsheet::domain::models::config::ReconciliationPolicy;
use tipsheet::services::reconciliation::{
    apply_event, classify_win_claim, implied_probability, matches_entity,
};
use tipsheet::{GameEvent, PlayerStatus, PredictionLeg, PredictionRecord};

fn bench_implied_probability(c: &mut Criterion) {
    let mut group = c.benchmark_group("implied_probability");

    group.bench_function("favorite", |b| b.iter(|| black_box(implied_probability(-150))));
    group.bench_function("underdog", |b| b.iter(|| black_box(implied_probability(200))));

    group.finish();
}

fn bench_text_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_matching");

    group.bench_function("entity_phrase_hit", |b| {
        b.iter(|| black_box(matches_entity("Los Angeles Lakers win tonight", "Lakers")))
    });

    group.bench_function("entity_miss", |b| {
        b.iter(|| black_box(matches_entity("Heat cover the spread", "Lakers")))
    });

    group.bench_function("win_claim_unambiguous", |b| {
        b.iter(|| black_box(classify_win_claim("Lakers win", "Lakers", "Heat")))
    });

    group.bench_function("win_claim_qualified", |b| {
        b.iter(|| black_box(classify_win_claim("Lakers win by 10", "Lakers", "Heat")))
    });

    group.finish();
}

fn bench_apply_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_event");
    let policy = ReconciliationPolicy::default();

    let single = PredictionRecord::single("Lakers win", 0.6, 0.8);
    let odds = GameEvent::OddsChanged {
        entity: "Lakers".to_string(),
        prev_odds: -150,
        new_odds: -110,
    };
    group.bench_function("odds_change_single", |b| {
        b.iter(|| black_box(apply_event(&single, &odds, &policy)))
    });

    let player_out = GameEvent::PlayerStatusChanged {
        player: "Smith".to_string(),
        prev_status: PlayerStatus::Active,
        new_status: PlayerStatus::Out,
    };
    let final_event = GameEvent::GameFinal {
        home: "Lakers".to_string(),
        away: "Heat".to_string(),
        home_score: 112,
        away_score: 104,
    };
    group.bench_function("game_final_single", |b| {
        b.iter(|| black_box(apply_event(&single, &final_event, &policy)))
    });

    // Parlay cost scales with leg count; measure a few sizes up to the
    // seven-leg limit.
    for leg_count in [2usize, 5, 7] {
        let legs: Vec<PredictionLeg> = (0..leg_count)
            .map(|i| {
                let text = if i % 2 == 0 {
                    format!("Smith scores {}+ points", 10 + i)
                } else {
                    "Lakers win".to_string()
                };
                PredictionLeg::new(text, 0.5)
            })
            .collect();
        let multi = PredictionRecord::multi(legs, 0.5);

        group.bench_with_input(
            BenchmarkId::new("player_out_multi", leg_count),
            &multi,
            |b, record| b.iter(|| black_box(apply_event(record, &player_out, &policy))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_implied_probability,
    bench_text_matching,
    bench_apply_event
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use brainplay_core::achievements::{evaluate, AchievementState};
use brainplay_core::score::ScoreChange;
use brainplay_core::store::MemoryStore;
use brainplay_core::{Answer, Difficulty, QuestionResult, QuestionType, ScoreManager};
use chrono::Utc;

fn make_history(rounds: usize) -> Vec<ScoreChange> {
    let mut score = 0;
    (0..rounds)
        .map(|i| {
            let delta = if i % 7 == 3 { -5 } else { 10 };
            let old = score;
            score += delta;
            ScoreChange {
                round: i as u32 + 1,
                points_added: delta,
                old_score: old,
                new_score: score,
                timestamp: Utc::now(),
            }
        })
        .collect()
}

fn bench_check_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_answer");
    let numeric = QuestionResult::new(
        "What is 12²?",
        Answer::Integer(144),
        QuestionType::Square,
        Difficulty::Normal,
    );
    let text = QuestionResult::new(
        "Name the root",
        Answer::Text("Twelve".into()),
        QuestionType::SquareRoot,
        Difficulty::Normal,
    );

    group.bench_function("numeric_correct", |b| {
        b.iter(|| numeric.check_answer(black_box(" 144 ")))
    });

    group.bench_function("numeric_unparseable", |b| {
        b.iter(|| numeric.check_answer(black_box("one hundred")))
    });

    group.bench_function("text", |b| {
        b.iter(|| text.check_answer(black_box("twelve")))
    });

    group.finish();
}

fn bench_achievements(c: &mut Criterion) {
    let mut group = c.benchmark_group("achievements");

    for rounds in [10, 100, 1000] {
        let history = make_history(rounds);
        let correct = history.iter().filter(|h| h.points_added > 0).count();
        let state = AchievementState {
            score: history.last().map(|h| h.new_score).unwrap_or(0),
            round_count: rounds as u32,
            accuracy: correct as f64 / rounds as f64 * 100.0,
            all_correct: correct == rounds,
            history: &history,
        };
        group.bench_function(format!("evaluate/{rounds}"), |b| {
            b.iter(|| evaluate(black_box(&state)))
        });
    }

    group.finish();
}

fn bench_add_points(c: &mut Criterion) {
    c.bench_function("score_manager/add_points", |b| {
        let mut manager = ScoreManager::new("bench", Box::new(MemoryStore::new()));
        b.iter(|| manager.add_points(black_box(10)))
    });
}

criterion_group!(benches, bench_check_answer, bench_achievements, bench_add_points);
criterion_main!(benches);

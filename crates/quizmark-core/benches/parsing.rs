use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::loader::{load_submission_str, load_test_str};

fn bench_test_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("test_parsing");

    for n in [5, 50, 500] {
        let content = generate_test_json(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| load_test_str(black_box(&content), black_box("bench.json".as_ref())))
        });
    }

    group.finish();
}

fn bench_submission_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("submission_parsing");

    for n in [5, 50, 500] {
        let content = generate_submission_json(n);
        group.bench_function(format!("{n}_answers"), |b| {
            b.iter(|| load_submission_str(black_box(&content), black_box("bench.json".as_ref())))
        });
    }

    group.finish();
}

fn generate_test_json(n: usize) -> String {
    let questions: Vec<String> = (0..n)
        .map(|i| match i % 3 {
            0 => format!(r#"{{"id": {i}, "type": "number", "points": 5, "answer": {i}}}"#),
            1 => format!(
                r#"{{"id": {i}, "type": "list-num", "points": 5,
                    "answer": {{"massiv": [1, 2, 3], "consistencyImportant": true}}}}"#
            ),
            _ => format!(
                r#"{{"id": {i}, "type": "pairs", "points": 5,
                    "answersByVariant": {{
                        "1": {{"pairs": [["a", 1], ["b", 2]]}},
                        "2": {{"pairs": [["c", 3], ["d", 4]]}}
                    }}}}"#
            ),
        })
        .collect();
    format!(r#"{{"id": "bench", "questions": [{}]}}"#, questions.join(","))
}

fn generate_submission_json(n: usize) -> String {
    let answers: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"question-id": {i}, "answer": [{i}, "x"]}}"#))
        .collect();
    format!(
        r#"{{"id-test": "bench", "variant": 1, "answers": [{}]}}"#,
        answers.join(",")
    )
}

criterion_group!(benches, bench_test_parsing, bench_submission_parsing);
criterion_main!(benches);

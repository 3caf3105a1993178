// Criterion benchmarks for Twinber

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use twinber::core::{calculate_compatibility, filter_archive, ArchiveCriteria, Demographics, GenderFilter, Matcher, SearchCriteria};
use twinber::i18n::{Locale, QuestionBank};
use twinber::models::{Answer, Gender, UserData, UserInfo};

const COUNTRIES: [&str; 4] = ["IT", "FR", "ES", "US"];

fn create_user(id: usize, question_count: usize) -> UserData {
    UserData {
        uid: format!("uid-{}", id),
        user_info: UserInfo {
            name: format!("User {}", id),
            age: Some(18 + (id % 50) as u8),
            gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
            country: COUNTRIES[id % COUNTRIES.len()].to_string(),
        },
        code: format!("{:08}", id),
        // cheap deterministic spread of answers
        answers: (0..question_count)
            .map(|q| if (id * 31 + q * 7) % 5 < 3 { Answer::Yes } else { Answer::No })
            .collect(),
    }
}

fn create_archive(size: usize, question_count: usize) -> Vec<UserData> {
    (0..size).map(|id| create_user(id, question_count)).collect()
}

fn bench_compatibility(c: &mut Criterion) {
    let bank = QuestionBank::load().unwrap();
    let questions = bank.questions(Locale::En);
    let a = create_user(1, questions.len()).answer_data();
    let b = create_user(2, questions.len()).answer_data();

    c.bench_function("calculate_compatibility", |bench| {
        bench.iter(|| calculate_compatibility(black_box(&a), black_box(&b), black_box(questions)));
    });
}

fn bench_search(c: &mut Criterion) {
    let bank = QuestionBank::load().unwrap();
    let questions = bank.questions(Locale::En);
    let matcher = Matcher::default();
    let criteria = SearchCriteria {
        gender: GenderFilter::Female,
        countries: vec!["IT".to_string(), "FR".to_string()],
        ..Default::default()
    };

    let mut group = c.benchmark_group("partner_search");

    for archive_size in [100, 1000, 10000].iter() {
        let archive = create_archive(*archive_size, questions.len());
        let reference = archive[0].clone();

        group.bench_with_input(
            BenchmarkId::new("search", archive_size),
            archive_size,
            |bench, _| {
                bench.iter(|| {
                    matcher.search(
                        black_box(&reference),
                        black_box(&archive),
                        black_box(questions),
                        black_box(&criteria),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_archive_filter(c: &mut Criterion) {
    let bank = QuestionBank::load().unwrap();
    let question_count = bank.question_count();
    let criteria = ArchiveCriteria {
        answer: Answer::Yes,
        questions: "1, 5, 12, 33".to_string(),
        demographics: Demographics {
            min_age: Some(25),
            max_age: Some(45),
            ..Default::default()
        },
    };

    let mut group = c.benchmark_group("archive_filter");

    for archive_size in [100, 1000, 10000].iter() {
        let archive = create_archive(*archive_size, question_count);

        group.bench_with_input(
            BenchmarkId::new("filter_archive", archive_size),
            archive_size,
            |bench, _| {
                bench.iter(|| filter_archive(black_box(&archive), black_box(&criteria), question_count));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compatibility, bench_search, bench_archive_filter);

criterion_main!(benches);

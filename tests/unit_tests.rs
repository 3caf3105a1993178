// Unit tests for Twinber

use std::collections::BTreeMap;
use twinber::core::{
    code::{decode_answers, encode_answers, generate_user_code, is_valid_code, normalize_code},
    conversation::{conversation_id, ordered_participants, validate_message_text},
    export::{archive_csv, filtered_users_csv, user_answers_csv, ExportError},
    filters::{country_allowed, parse_question_numbers, validate_question_numbers},
    summary::{ScoreBand, SummaryTone},
    calculate_compatibility, filter_archive, matches_demographics, summarize, ArchiveCriteria,
    Demographics, FilterError, GenderFilter, SummaryThresholds,
};
use twinber::i18n::{Locale, QuestionBank};
use twinber::models::{Answer, AnswerData, Category, Gender, UserData, UserInfo};

fn create_user(code: &str, age: Option<u8>, gender: Gender, country: &str, answers: Vec<Answer>) -> UserData {
    UserData {
        uid: format!("uid-{}", code.to_lowercase()),
        user_info: UserInfo {
            name: format!("User {}", code),
            age,
            gender,
            country: country.to_string(),
        },
        code: code.to_string(),
        answers,
    }
}

fn answers(pattern: &str) -> Vec<Answer> {
    pattern
        .chars()
        .map(|c| if c == '1' { Answer::Yes } else { Answer::No })
        .collect()
}

fn uniform(answer: Answer, n: usize) -> Vec<Answer> {
    vec![answer; n]
}

#[test]
fn test_question_bank_loads_every_locale() {
    let bank = QuestionBank::load().unwrap();
    assert_eq!(bank.question_count(), 40);

    for locale in Locale::ALL {
        assert_eq!(bank.questions(locale).len(), bank.question_count());
        assert_eq!(bank.category_names(locale).len(), Category::ALL.len());
    }
}

#[test]
fn test_question_categories_align_across_locales() {
    let bank = QuestionBank::load().unwrap();
    let english: Vec<Category> = bank.questions(Locale::En).iter().map(|q| q.category).collect();
    let italian: Vec<Category> = bank.questions(Locale::It).iter().map(|q| q.category).collect();
    assert_eq!(english, italian);
}

#[test]
fn test_translate_substitutes_placeholders() {
    let bank = QuestionBank::load().unwrap();

    let message = bank.translate(
        Locale::En,
        "admin_filter_error_out_of_range",
        &[("questionCount", "40".to_string())],
    );
    assert_eq!(message, "Question numbers must be between 1 and 40.");

    let italian = bank.translate(
        Locale::It,
        "admin_filter_error_out_of_range",
        &[("questionCount", "40".to_string())],
    );
    assert!(italian.ends_with("tra 1 e 40."));
}

#[test]
fn test_translate_falls_back_to_key() {
    let bank = QuestionBank::load().unwrap();
    assert_eq!(bank.translate(Locale::Fr, "no_such_key", &[]), "no_such_key");
}

#[test]
fn test_locale_resolution() {
    assert_eq!(Locale::resolve(Some("it")), Locale::It);
    assert_eq!(Locale::resolve(Some("pt-BR")), Locale::Pt);
    assert_eq!(Locale::resolve(Some("de")), Locale::En);
    assert_eq!(Locale::resolve(None), Locale::En);
}

#[test]
fn test_identical_answers_score_full_marks() {
    let bank = QuestionBank::load().unwrap();
    let questions = bank.questions(Locale::En);
    let data = AnswerData {
        code: "AAAAAAAA".to_string(),
        answers: uniform(Answer::Yes, questions.len()),
    };
    let other = AnswerData {
        code: "BBBBBBBB".to_string(),
        ..data.clone()
    };

    let report = calculate_compatibility(&data, &other, questions).unwrap();
    assert_eq!(report.overall_score, 100);
    assert_eq!(report.category_scores.len(), 20);
    assert!(report.category_scores.iter().all(|c| c.score == 100));
    assert_eq!(report.category_scores[0].category, Category::FoodAndDrink);
}

#[test]
fn test_score_is_symmetric() {
    let bank = QuestionBank::load().unwrap();
    let questions = bank.questions(Locale::En);
    let a = AnswerData {
        code: "AAAAAAAA".to_string(),
        answers: (0..questions.len())
            .map(|i| if i % 3 == 0 { Answer::No } else { Answer::Yes })
            .collect(),
    };
    let b = AnswerData {
        code: "BBBBBBBB".to_string(),
        answers: (0..questions.len())
            .map(|i| if i % 2 == 0 { Answer::No } else { Answer::Yes })
            .collect(),
    };

    let forward = calculate_compatibility(&a, &b, questions).unwrap();
    let backward = calculate_compatibility(&b, &a, questions).unwrap();
    assert_eq!(forward.overall_score, backward.overall_score);
    assert_eq!(forward.category_scores, backward.category_scores);
}

#[test]
fn test_summary_bands_and_tone() {
    let bank = QuestionBank::load().unwrap();
    let questions = bank.questions(Locale::En);
    let n = questions.len();

    // first half of the categories agree, the rest disagree
    let a = AnswerData {
        code: "AAAAAAAA".to_string(),
        answers: uniform(Answer::Yes, n),
    };
    let b = AnswerData {
        code: "BBBBBBBB".to_string(),
        answers: (0..n).map(|i| if i < n / 2 { Answer::Yes } else { Answer::No }).collect(),
    };

    let report = calculate_compatibility(&a, &b, questions).unwrap();
    assert_eq!(report.overall_score, 50);

    let summary = summarize(&report, &SummaryThresholds::default());
    assert_eq!(summary.band, ScoreBand::Moderate);
    assert_eq!(summary.tone, SummaryTone::Mixed);
    assert_eq!(summary.strengths.len(), 10);
    assert_eq!(summary.growth_areas.len(), 10);
}

#[test]
fn test_generated_codes_are_valid() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let code = generate_user_code(&mut rng);
        assert!(is_valid_code(&code), "bad code {}", code);
        assert!(!code.contains('0') && !code.contains('O') && !code.contains('I'));
    }
}

#[test]
fn test_normalize_code() {
    assert_eq!(normalize_code("  abcd2345 "), Some("ABCD2345".to_string()));
    assert_eq!(normalize_code("   "), None);
}

#[test]
fn test_share_token_roundtrip_and_rejection() {
    let data = AnswerData {
        code: "ABCD2345".to_string(),
        answers: answers("1010"),
    };
    let token = encode_answers(&data).unwrap();

    assert_eq!(decode_answers(&token, 4), Some(data));
    // wrong question count
    assert_eq!(decode_answers(&token, 5), None);
    assert_eq!(decode_answers("not base64!", 4), None);
}

#[test]
fn test_demographics_missing_age_fails_bounds() {
    let user = create_user("AAAAAAAA", None, Gender::Female, "IT", answers("1"));

    let unbounded = Demographics::default();
    assert!(matches_demographics(&user, &unbounded));

    let bounded = Demographics {
        min_age: Some(18),
        ..Default::default()
    };
    assert!(!matches_demographics(&user, &bounded));
}

#[test]
fn test_demographics_gender_and_country() {
    let user = create_user("AAAAAAAA", Some(30), Gender::Male, "FR", answers("1"));

    let female_only = Demographics {
        gender: GenderFilter::Female,
        ..Default::default()
    };
    assert!(!matches_demographics(&user, &female_only));

    let italy = Demographics {
        countries: vec!["IT".to_string()],
        ..Default::default()
    };
    assert!(!matches_demographics(&user, &italy));

    let world = Demographics {
        countries: vec!["IT".to_string(), "world".to_string()],
        ..Default::default()
    };
    assert!(matches_demographics(&user, &world));
    assert!(country_allowed(&[], "FR"));
}

#[test]
fn test_question_number_parsing() {
    assert_eq!(parse_question_numbers(" 3, 7,,12 ").unwrap(), vec![3, 7, 12]);
    assert_eq!(parse_question_numbers("").unwrap(), Vec::<i64>::new());
    assert_eq!(
        parse_question_numbers("3, seven"),
        Err(FilterError::InvalidQuestionNumber("seven".to_string()))
    );
    assert_eq!(
        parse_question_numbers("2.5"),
        Err(FilterError::InvalidQuestionNumber("2.5".to_string()))
    );

    assert_eq!(validate_question_numbers(&[1, 40], 40).unwrap(), vec![0, 39]);
    assert_eq!(
        validate_question_numbers(&[0], 40),
        Err(FilterError::QuestionOutOfRange { number: 0, question_count: 40 })
    );
    assert_eq!(
        validate_question_numbers(&[41], 40),
        Err(FilterError::QuestionOutOfRange { number: 41, question_count: 40 })
    );
}

#[test]
fn test_filter_archive_by_answers() {
    let archive = vec![
        create_user("AAAAAAAA", Some(25), Gender::Female, "IT", answers("1101")),
        create_user("BBBBBBBB", Some(31), Gender::Male, "IT", answers("1001")),
        create_user("CCCCCCCC", Some(40), Gender::Female, "FR", answers("0101")),
        create_user("DDDDDDDD", Some(22), Gender::Female, "IT", answers("1111")),
    ];

    let criteria = ArchiveCriteria {
        answer: Answer::Yes,
        questions: "1, 4".to_string(),
        demographics: Demographics::default(),
    };
    let codes: Vec<String> = filter_archive(&archive, &criteria, 4)
        .unwrap()
        .into_iter()
        .map(|u| u.code)
        .collect();
    assert_eq!(codes, vec!["AAAAAAAA", "BBBBBBBB", "DDDDDDDD"]);

    let no_on_three = ArchiveCriteria {
        answer: Answer::No,
        questions: "3".to_string(),
        demographics: Demographics {
            gender: GenderFilter::Female,
            max_age: Some(30),
            ..Default::default()
        },
    };
    let codes: Vec<String> = filter_archive(&archive, &no_on_three, 4)
        .unwrap()
        .into_iter()
        .map(|u| u.code)
        .collect();
    assert_eq!(codes, vec!["AAAAAAAA"]);
}

#[test]
fn test_filter_archive_rejects_bad_input() {
    let archive = vec![create_user("AAAAAAAA", Some(25), Gender::Female, "IT", answers("1101"))];

    let bad_ages = ArchiveCriteria {
        demographics: Demographics {
            min_age: Some(50),
            max_age: Some(20),
            ..Default::default()
        },
        ..Default::default()
    };
    assert_eq!(
        filter_archive(&archive, &bad_ages, 4),
        Err(FilterError::InvalidAgeRange { min: 50, max: 20 })
    );

    let out_of_range = ArchiveCriteria {
        questions: "5".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        filter_archive(&archive, &out_of_range, 4),
        Err(FilterError::QuestionOutOfRange { number: 5, .. })
    ));
}

#[test]
fn test_archive_criteria_wire_format() {
    let criteria: ArchiveCriteria = serde_json::from_str(
        r#"{"answer": 0, "questions": "2,3", "gender": "Female", "minAge": 20, "countries": ["IT"]}"#,
    )
    .unwrap();
    assert_eq!(criteria.answer, Answer::No);
    assert_eq!(criteria.demographics.gender, GenderFilter::Female);
    assert_eq!(criteria.demographics.min_age, Some(20));
    assert_eq!(criteria.demographics.max_age, None);

    assert!(serde_json::from_str::<ArchiveCriteria>(r#"{"answer": 2}"#).is_err());
}

#[test]
fn test_user_info_accepts_blank_age() {
    let info: UserInfo =
        serde_json::from_str(r#"{"name": "Ada", "age": "", "gender": "female", "country": "IT"}"#).unwrap();
    assert_eq!(info.age, None);

    let info: UserInfo =
        serde_json::from_str(r#"{"name": "Ada", "age": "34", "gender": "female", "country": "IT"}"#).unwrap();
    assert_eq!(info.age, Some(34));
}

#[test]
fn test_conversation_id_is_order_independent() {
    assert_eq!(conversation_id("uid-b", "uid-a"), "uid-a-uid-b");
    assert_eq!(conversation_id("uid-a", "uid-b"), conversation_id("uid-b", "uid-a"));

    let a = create_user("AAAAAAAA", Some(25), Gender::Female, "IT", answers("1"));
    let b = create_user("BBBBBBBB", Some(27), Gender::Male, "IT", answers("0"));
    let (first, second) = ordered_participants(&b, &a);
    assert_eq!(first.uid, a.uid);
    assert_eq!(second.code, "BBBBBBBB");
}

#[test]
fn test_message_validation() {
    assert_eq!(validate_message_text("  hello  "), Some("hello"));
    assert_eq!(validate_message_text("   "), None);
    assert!(validate_message_text(&"x".repeat(2000)).is_some());
    assert!(validate_message_text(&"x".repeat(2001)).is_none());
}

#[test]
fn test_archive_csv_layout() {
    let bank = QuestionBank::load().unwrap();
    let questions = &bank.questions(Locale::En)[..3];
    let archive = vec![create_user("AAAAAAAA", None, Gender::Female, "IT", answers("101"))];
    let countries = BTreeMap::from([("IT".to_string(), "Italy".to_string())]);

    let file = archive_csv(&archive, questions, &countries).unwrap();
    let lines: Vec<&str> = file.content.split("\r\n").collect();
    assert_eq!(lines[0], "Name,Age,Gender,Country,Code,Answer 1,Answer 2,Answer 3");
    assert_eq!(lines[1], "\"User AAAAAAAA\",,female,\"Italy\",AAAAAAAA,1,0,1");

    assert_eq!(archive_csv(&[], questions, &countries), Err(ExportError::Empty));
}

#[test]
fn test_user_answers_csv_uses_localized_labels() {
    let bank = QuestionBank::load().unwrap();
    let user = create_user("AAAAAAAA", Some(30), Gender::Male, "IT", uniform(Answer::Yes, 40));

    let file = user_answers_csv(&user, bank.questions(Locale::It), &bank.export_labels(Locale::It));
    assert_eq!(file.filename, "twinber_answers_User_AAAAAAAA.csv");

    let mut lines = file.content.lines();
    let labels = bank.export_labels(Locale::It);
    assert_eq!(
        lines.next().unwrap(),
        format!("{},{}", labels.question_header, labels.answer_header)
    );
    assert_eq!(lines.count(), 40);
}

#[test]
fn test_filtered_csv_escapes_quotes() {
    let bank = QuestionBank::load().unwrap();
    let mut user = create_user("AAAAAAAA", Some(30), Gender::Male, "XX", uniform(Answer::No, 40));
    user.user_info.name = "Ann \"Annie\" Lee".to_string();

    let file = filtered_users_csv(
        &[user],
        &[2, 5],
        bank.questions(Locale::En),
        &bank.export_labels(Locale::En),
        &BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(file.filename, "twinber_filtered_q2_5.csv");
    let row = file.content.lines().nth(1).unwrap();
    assert_eq!(row, "\"Ann \"\"Annie\"\" Lee\",30,male,\"XX\",AAAAAAAA,No,No");
}

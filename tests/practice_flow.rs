use std::time::{Duration, Instant};

use regex::Regex;
use tempfile::TempDir;

use mathdr::config::Config;
use mathdr::engine::checker::{HARD_TOLERANCE, check_answer};
use mathdr::engine::leaderboard::leaderboard;
use mathdr::engine::stats::ProfileStats;
use mathdr::engine::streak::record_practice;
use mathdr::generator::arithmetic::ProblemGenerator;
use mathdr::generator::problem::{Difficulty, Operation, OperationMode, format_answer};
use mathdr::session::practice::{PracticeState, SubmitOutcome};
use mathdr::session::result::SessionResult;
use mathdr::store::json_store::{JsonStore, StoreError};
use mathdr::store::schema::{ProfileData, SessionHistoryData};

fn problem_regex() -> Regex {
    Regex::new(r"^(\d+) (\S+) (\d+) = \?$").unwrap()
}

/// Parse "a op b = ?" back into its operands and operation.
fn parse_problem(re: &Regex, text: &str) -> (f64, Operation, f64) {
    let caps = re
        .captures(text)
        .unwrap_or_else(|| panic!("malformed problem {text:?}"));
    let a: f64 = caps[1].parse().unwrap();
    let op = Operation::from_symbol(&caps[2]).unwrap();
    let b: f64 = caps[3].parse().unwrap();
    (a, op, b)
}

#[test]
fn every_problem_evaluates_to_its_answer() {
    let re = problem_regex();
    let mut generator = ProblemGenerator::seeded(2024);

    for difficulty in Difficulty::ALL {
        for operation in Operation::ALL {
            for _ in 0..300 {
                let problem = generator.generate(difficulty, operation);
                let (a, op, b) = parse_problem(&re, problem.problem());
                assert_eq!(op, operation);

                let exact = match op {
                    Operation::Addition => a + b,
                    Operation::Subtraction => {
                        assert!(a >= b, "{problem} goes negative");
                        a - b
                    }
                    Operation::Multiplication => a * b,
                    Operation::Division => a / b,
                };

                if op == Operation::Division && exact.fract() != 0.0 {
                    assert_eq!(difficulty, Difficulty::Hard, "{problem} is not exact");
                    assert!((problem.answer() - exact).abs() <= HARD_TOLERANCE);
                    let hundredths = problem.answer() * 100.0;
                    assert!((hundredths - hundredths.round()).abs() < 1e-6);
                } else {
                    assert_eq!(problem.answer(), exact, "{problem}");
                }
                assert!(check_answer(exact, problem.answer(), difficulty), "{problem}");
            }
        }
    }
}

#[test]
fn mixed_mode_covers_every_operation() {
    let mut generator = ProblemGenerator::seeded(99);
    let mut seen = Vec::new();
    for _ in 0..200 {
        let op = generator
            .generate_for(Difficulty::Medium, OperationMode::Mixed)
            .operation();
        if !seen.contains(&op) {
            seen.push(op);
        }
    }
    assert_eq!(seen.len(), Operation::ALL.len());
}

fn play_session(seed: u64, difficulty: Difficulty, wrong_first: bool) -> SessionResult {
    let t0 = Instant::now();
    let mut generator = ProblemGenerator::seeded(seed);
    let mut practice = PracticeState::new(&mut generator, difficulty, OperationMode::Mixed, 5, t0);

    let mut clock = t0;
    while let Some(problem) = practice.current_problem().cloned() {
        clock += Duration::from_secs(3);
        if wrong_first {
            for ch in format_answer(problem.answer() + 1000.0).chars() {
                practice.type_char(ch);
            }
            assert_eq!(practice.submit(clock), SubmitOutcome::Incorrect);
            clock += Duration::from_secs(1);
            practice.tick(clock, Duration::from_millis(300));
        }
        for ch in format_answer(problem.answer()).chars() {
            practice.type_char(ch);
        }
        assert_eq!(practice.submit(clock), SubmitOutcome::Correct);
        assert_eq!(practice.submit(clock), SubmitOutcome::Advanced);
    }
    assert!(practice.is_complete());
    SessionResult::from_practice(&practice, false)
}

#[test]
fn finished_sessions_survive_export_and_import() {
    let clean = play_session(1, Difficulty::Hard, false);
    let sloppy = play_session(2, Difficulty::Hard, true);
    assert_eq!(clean.accuracy, 100.0);
    assert_eq!(sloppy.accuracy, 100.0);
    assert_eq!(sloppy.incorrect_attempts(), 5);
    assert!(clean.score > sloppy.score);

    let mut profile = ProfileData::default();
    for result in [&clean, &sloppy] {
        profile.total_score += result.score;
        profile.total_sessions += 1;
        record_practice(&mut profile, result.timestamp.date_naive());
    }

    let source_dir = TempDir::new().unwrap();
    let source = JsonStore::with_base_dir(source_dir.path().to_path_buf()).unwrap();
    source.save_profile(&profile).unwrap();
    source
        .save_history(&SessionHistoryData::new(vec![clean.clone(), sloppy.clone()]))
        .unwrap();

    let export_path = source_dir.path().join("backup.json");
    let config = Config {
        difficulty: Difficulty::Hard,
        ..Config::default()
    };
    source.export_to_file(&config, &export_path).unwrap();

    let target_dir = TempDir::new().unwrap();
    let target = JsonStore::with_base_dir(target_dir.path().to_path_buf()).unwrap();
    let data = JsonStore::read_export(&export_path).unwrap();
    assert_eq!(data.config.difficulty, Difficulty::Hard);
    target.import_all(&data).unwrap();
    assert!(!target.check_interrupted_import());

    let restored = target.load_profile().unwrap();
    assert_eq!(restored.total_sessions, 2);
    assert_eq!(restored.streak_days, 1);
    let history = target.load_history().sessions;
    assert_eq!(history.len(), 2);

    let stats = ProfileStats::from_history(&history);
    assert_eq!(stats.total_problems, 10);
    assert_eq!(stats.correct_answers, 10);

    let board = leaderboard(&history, Difficulty::Hard, 10);
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].rank, 1);
    assert!(board[0].average_time <= board[1].average_time);
    assert!(leaderboard(&history, Difficulty::Easy, 10).is_empty());
}

#[test]
fn import_rejects_unknown_export_version() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut data = store.export_all(&Config::default());
    data.mathdr_export_version = 99;

    match store.import_all(&data) {
        Err(StoreError::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, 99);
            assert_eq!(expected, 1);
        }
        other => panic!("expected version error, got {other:?}"),
    }
}

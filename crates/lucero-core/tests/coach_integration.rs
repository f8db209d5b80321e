//! Integration tests for the coaching pipeline.
//!
//! These drive the full path from episode history through debt, habits,
//! forecasting and the bandit to a final suggestion, including persistence
//! through the state store.

use chrono::{DateTime, Days, Duration, NaiveDate, Offset, TimeZone, Utc};
use lucero_core::coach::{build_context, DebtForecast, Forecaster};
use lucero_core::{
    Arm, DebtEngine, LinUcbBandit, RecommendationPolicy, SleepCoach, SleepEpisode, StateStore,
    SuggestionKind, UserProfile,
};

/// One sleep bout starting at the given local (UTC) clock time.
fn sleep(year: i32, month: u32, day: u32, hour: u32, minute: u32, hours: i64) -> SleepEpisode {
    let start = Utc
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap();
    SleepEpisode::new(start, start + Duration::hours(hours)).unwrap()
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
}

#[test]
fn test_short_sleeper_gets_bedtime_advance() {
    // A week of five-hour nights against an eight-hour ideal.
    let episodes: Vec<SleepEpisode> =
        (1..=7).map(|d| sleep(2026, 6, d, 23, 0, 5)).collect();
    let coach = SleepCoach::new(UserProfile::default(), Utc.fix());

    let suggestion = coach.suggest(at(2026, 6, 8, 9), &episodes, 0.0);

    match suggestion.kind {
        SuggestionKind::EarlierBedtime {
            debt_hours,
            target_bed_hour,
        } => {
            assert!((debt_hours - 3.0).abs() < 1e-9, "debt was {debt_hours}");
            assert_eq!(target_bed_hour, 22);
        }
        other => panic!("expected earlier bedtime, got {other:?}"),
    }
    assert!(!suggestion.rationale.is_empty());
}

#[test]
fn test_rested_sleeper_keeps_routine() {
    let episodes: Vec<SleepEpisode> =
        (1..=7).map(|d| sleep(2026, 6, d, 23, 0, 8)).collect();
    let coach = SleepCoach::new(UserProfile::default(), Utc.fix());

    let suggestion = coach.suggest(at(2026, 6, 8, 9), &episodes, 0.5);

    assert_eq!(suggestion.kind, SuggestionKind::KeepItUp);
}

#[test]
fn test_weekend_drift_gets_rhythm_correction() {
    // June 2026: the 1st is a Monday. Weeknights at 23:00, Friday and
    // Saturday nights drifting past 02:00, durations all at the ideal so
    // no debt rule can fire first.
    let mut episodes = Vec::new();
    for d in [1, 2, 3, 4, 7, 8, 9, 10, 11] {
        episodes.push(sleep(2026, 6, d, 23, 0, 8));
    }
    for d in [6, 7, 13, 14] {
        episodes.push(sleep(2026, 6, d, 2, 0, 8));
    }
    let coach = SleepCoach::new(UserProfile::default(), Utc.fix());

    let suggestion = coach.suggest(at(2026, 6, 14, 12), &episodes, 0.0);

    match suggestion.kind {
        SuggestionKind::RhythmCorrection {
            usual_wake_hour: _,
            shift_minutes,
        } => {
            assert!(
                (130.0..160.0).contains(&shift_minutes),
                "shift was {shift_minutes}"
            );
        }
        other => panic!("expected rhythm correction, got {other:?}"),
    }
}

/// Forecaster stub reporting a fixed breach on every upcoming day.
struct FixedForecast;

impl Forecaster for FixedForecast {
    fn predict(&self, _daily_debt_hours: &[f64]) -> Option<f64> {
        Some(0.0)
    }

    fn forecast_days(
        &self,
        from: NaiveDate,
        days: u32,
        _daily_debt_hours: &[f64],
    ) -> Vec<DebtForecast> {
        (1..=u64::from(days))
            .map(|ahead| DebtForecast {
                day: from + Days::new(ahead),
                debt_minutes: 200.0,
            })
            .collect()
    }
}

#[test]
fn test_injected_forecaster_triggers_preemptive_rest() {
    let episodes: Vec<SleepEpisode> =
        (1..=7).map(|d| sleep(2026, 6, d, 23, 0, 8)).collect();
    let profile = UserProfile::default();
    let tz = Utc.fix();
    let coach = SleepCoach::with_components(
        profile.clone(),
        tz,
        DebtEngine::new(profile.ideal_hours(), tz),
        LinUcbBandit::new(),
        RecommendationPolicy::new(),
        Box::new(FixedForecast),
    );

    let suggestion = coach.suggest(at(2026, 6, 8, 9), &episodes, 0.0);

    match suggestion.kind {
        SuggestionKind::PreemptiveRest {
            day,
            forecast_debt_minutes,
        } => {
            assert_eq!(day, NaiveDate::from_ymd_opt(2026, 6, 9).unwrap());
            assert!((forecast_debt_minutes - 200.0).abs() < 1e-9);
        }
        other => panic!("expected preemptive rest, got {other:?}"),
    }
}

#[test]
fn test_suggestion_feedback_loop_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::with_dir(dir.path());

    let episodes: Vec<SleepEpisode> =
        (1..=7).map(|d| sleep(2026, 6, d, 23, 0, 5)).collect();
    store.save_episodes(&episodes).unwrap();

    // Morning: suggest and persist both the suggestion and the bandit.
    let coach = SleepCoach::new(UserProfile::default(), Utc.fix());
    let history = store.load_episodes().unwrap();
    let suggestion = coach.suggest(at(2026, 6, 8, 9), &history, 0.5);
    store.save_last_suggestion(&suggestion).unwrap();
    store.save_bandit(&coach.export_bandit_state()).unwrap();

    // Next morning: a separate process feeds the observed outcome back.
    let restored = store.load_last_suggestion().unwrap().unwrap();
    assert_eq!(restored, suggestion);
    let mut bandit = LinUcbBandit::import_state(store.load_bandit().unwrap().unwrap()).unwrap();
    bandit.update(restored.arm, 0.8, &restored.context);
    store.save_bandit(&bandit.export_state()).unwrap();

    let reloaded = LinUcbBandit::import_state(store.load_bandit().unwrap().unwrap()).unwrap();
    assert_eq!(reloaded.total_updates(), 1);
}

#[test]
fn test_bandit_converges_on_rewarding_arm() {
    let mut bandit = LinUcbBandit::new();
    let context = build_context(Some(3600.0), 1.0, 1.0);

    let mut nap_pulls = 0;
    for _ in 0..40 {
        let arm = bandit.select_arm(&context);
        if arm == Arm::ShortNap {
            nap_pulls += 1;
        }
        let reward = if arm == Arm::ShortNap { 1.0 } else { 0.0 };
        bandit.update(arm, reward, &context);
    }

    assert!(nap_pulls >= 35, "nap pulled only {nap_pulls} of 40 rounds");
    assert_eq!(bandit.select_arm(&context), Arm::ShortNap);
}

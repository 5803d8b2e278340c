use chrono::NaiveDate;
use routinely_core::{
    assemble, AssembleError, BuiltinEngine, EngineGenerator, OutOfRangeError, PlannerSettings,
    RoutineDay, ScheduleGenerator, TopicCatalog,
};
use std::num::NonZeroU32;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn guitar_catalog() -> TopicCatalog {
    TopicCatalog::from_labels([
        "scales",
        "chords",
        "arpeggios",
        "finger picking",
        "alternate picking",
        "ear training",
        "song practice",
    ])
    .unwrap()
}

#[test]
fn resolves_labels_and_dates_across_leap_day() {
    let routine = assemble(&[vec![0, 2], vec![6]], &guitar_catalog(), ymd(2024, 2, 28)).unwrap();

    assert_eq!(
        routine.days(),
        &[
            RoutineDay {
                date: ymd(2024, 2, 28),
                topics: vec!["scales".to_string(), "arpeggios".to_string()],
            },
            RoutineDay {
                date: ymd(2024, 2, 29),
                topics: vec!["song practice".to_string()],
            },
        ]
    );
}

#[test]
fn consecutive_days_cross_month_boundary() {
    let output = vec![vec![1], vec![2], vec![3]];
    let routine = assemble(&output, &guitar_catalog(), ymd(2023, 1, 31)).unwrap();

    let dates: Vec<_> = routine.days().iter().map(|day| day.date).collect();
    assert_eq!(dates, vec![ymd(2023, 1, 31), ymd(2023, 2, 1), ymd(2023, 2, 2)]);
}

#[test]
fn topic_order_follows_generator_order_not_index_order() {
    let output = vec![vec![5, 0, 3]];
    let catalog = guitar_catalog();
    let routine = assemble(&output, &catalog, ymd(2024, 5, 1)).unwrap();

    for (position, &index) in output[0].iter().enumerate() {
        assert_eq!(routine.days()[0].topics[position], catalog.label_of(index).unwrap());
    }
}

#[test]
fn empty_output_yields_empty_routine() {
    let routine = assemble(&[], &guitar_catalog(), ymd(2024, 5, 1)).unwrap();
    assert!(routine.is_empty());
}

#[test]
fn out_of_range_index_fails_whole_assembly() {
    let err = assemble(&[vec![0], vec![99]], &guitar_catalog(), ymd(2024, 5, 1)).unwrap_err();
    assert_eq!(
        err,
        AssembleError::OutOfRange {
            day: 1,
            source: OutOfRangeError {
                index: 99,
                catalog_size: 7
            }
        }
    );

    let negative = assemble(&[vec![-3]], &guitar_catalog(), ymd(2024, 5, 1)).unwrap_err();
    assert!(matches!(negative, AssembleError::OutOfRange { day: 0, .. }));
}

#[test]
fn schedule_past_calendar_end_is_rejected() {
    let err = assemble(&[vec![0], vec![1]], &guitar_catalog(), NaiveDate::MAX).unwrap_err();
    assert!(matches!(err, AssembleError::CalendarOverflow { days: 2, .. }));
}

#[test]
fn routine_length_matches_generator_output_for_many_plan_sizes() {
    let generator = EngineGenerator::new(BuiltinEngine::new(PlannerSettings {
        seed: Some(42),
        ..PlannerSettings::default()
    }));
    let catalog = guitar_catalog();
    let today = ymd(2024, 12, 30);

    for plan_size in [1u32, 2, 7, 31, 60] {
        let output = generator.generate(NonZeroU32::new(plan_size).unwrap()).unwrap();
        let routine = assemble(&output, &catalog, today).unwrap();

        assert_eq!(routine.len(), output.len());
        for (offset, day) in routine.days().iter().enumerate() {
            assert_eq!(day.date, today + chrono::Days::new(offset as u64));
            assert_eq!(day.topics.len(), output[offset].len());
        }
    }
}

use chrono::{Duration, Local, NaiveDate, TimeZone};
use serde_json::json;
use tempfile::TempDir;

use usage_ledger::{pricing, DailyLedger, LedgerOptions, Metadata, UsageLedger};

fn meta(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

fn noon(date: NaiveDate) -> chrono::DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
}

#[test]
fn daily_total_is_left_fold_of_costs() {
    let dir = TempDir::new().unwrap();
    let ledger = UsageLedger::open(dir.path());
    let costs = [0.1, 0.2, 0.3, 0.0, 1.75, 0.003, 0.0015];

    for (i, cost) in costs.iter().enumerate() {
        ledger
            .record("OpenAI", "completion", *cost, meta(json!({ "seq": i })))
            .unwrap();
    }

    let day = ledger.daily_summary(None).unwrap();
    let expected = costs.iter().fold(0.0, |acc, c| acc + c);
    assert_eq!(day.daily_total, expected);
    let seq: Vec<_> = day.entries.iter().map(|e| e.metadata["seq"].clone()).collect();
    assert_eq!(seq, (0..costs.len()).map(|i| json!(i)).collect::<Vec<_>>());
}

#[test]
fn empty_day_reads_without_creating_files() {
    let dir = TempDir::new().unwrap();
    let ledger = UsageLedger::open(dir.path());
    let day = ledger
        .daily_summary(Some(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()))
        .unwrap();
    assert_eq!(day, DailyLedger::empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn persisted_file_has_expected_shape() {
    let dir = TempDir::new().unwrap();
    let ledger = UsageLedger::open(dir.path());
    let now = noon(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    ledger
        .record_at(now, "OpenAI", "completion", 0.03, meta(json!({"model": "gpt-4"})))
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("2025-04-02.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let top: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(top, vec!["entries", "daily_total"]);
    let entry = value["entries"][0].as_object().unwrap();
    let keys: Vec<_> = entry.keys().cloned().collect();
    assert_eq!(keys, vec!["timestamp", "service", "operation", "cost_usd", "metadata"]);
    assert_eq!(value["daily_total"], 0.03);
}

#[test]
fn service_summary_matches_per_service_sums() {
    let dir = TempDir::new().unwrap();
    let ledger = UsageLedger::open(dir.path());
    let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();

    // Entries on 3 of the 7 days; one more just outside the window.
    let plan: [(i64, &str, &str, f64); 6] = [
        (0, "OpenAI", "completion", 0.03),
        (0, "fal.ai (Images)", "image_generation", 0.003),
        (2, "OpenAI", "completion", 0.01),
        (6, "Suno", "music_generation", 0.1),
        (6, "OpenAI", "embedding", 0.002),
        (7, "OpenAI", "completion", 99.0),
    ];
    for (back, service, operation, cost) in plan {
        ledger
            .record_at(noon(today - Duration::days(back)), service, operation, cost, Metadata::new())
            .unwrap();
    }

    let summary = ledger.service_summary_ending(7, today).unwrap();
    assert_eq!(summary.total_calls(), 5);

    let openai = summary.get("OpenAI").unwrap();
    assert_eq!(openai.total_calls, 3);
    assert!((openai.total_cost - (0.03 + 0.01 + 0.002)).abs() < 1e-12);
    assert_eq!(openai.operations["completion"].count, 2);
    assert_eq!(openai.operations["embedding"].count, 1);
    assert_eq!(summary.get("Suno").unwrap().total_calls, 1);
    assert_eq!(summary.get("fal.ai (Images)").unwrap().total_calls, 1);

    let recent = ledger.daily_totals_ending(7, today).unwrap();
    let dates: Vec<_> = recent.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![today, today - Duration::days(2), today - Duration::days(6)]
    );
}

#[test]
fn helper_entry_for_flux_dev() {
    let dir = TempDir::new().unwrap();
    let ledger = UsageLedger::open(dir.path());
    let entry = ledger
        .record_charge(pricing::fal_image("cat astronaut", Some("flux-dev")))
        .unwrap();
    assert_eq!(entry.service, "fal.ai (Images)");
    assert_eq!(entry.operation, "image_generation");
    assert_eq!(entry.cost_usd, 0.003);
}

#[test]
fn concurrent_recorders_lose_no_entries() {
    let dir = TempDir::new().unwrap();
    let threads = 8;
    let per_thread = 10;

    std::thread::scope(|scope| {
        for t in 0..threads {
            // Separate instances, as separate processes would have.
            let ledger = UsageLedger::new(LedgerOptions {
                lock_timeout: std::time::Duration::from_secs(30),
                ..LedgerOptions::new(dir.path())
            });
            scope.spawn(move || {
                for i in 0..per_thread {
                    ledger
                        .record(
                            "Runway",
                            "video_generation",
                            0.125,
                            meta(json!({ "thread": t, "i": i })),
                        )
                        .unwrap();
                }
            });
        }
    });

    let day = UsageLedger::open(dir.path()).daily_summary(None).unwrap();
    assert_eq!(day.entries.len(), threads * per_thread);
    assert_eq!(day.daily_total, 0.125 * (threads * per_thread) as f64);

    // Each thread's entries stay in its own call order.
    for t in 0..threads {
        let seen: Vec<_> = day
            .entries
            .iter()
            .filter(|e| e.metadata["thread"] == t)
            .map(|e| e.metadata["i"].as_u64().unwrap())
            .collect();
        assert_eq!(seen, (0..per_thread as u64).collect::<Vec<_>>());
    }
}

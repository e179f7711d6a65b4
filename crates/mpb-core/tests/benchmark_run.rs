//! End-to-end engine tests against a fake benchmark binary (a shell script
//! that mimics the real one: reads the config it is handed, prints `<stats>`
//! markers and writes a results file to the configured log path).

#![cfg(unix)]

use mpb_core::report::progress::ProgressEvent;
use mpb_core::results::ResultsDoc;
use mpb_core::settings::Settings;
use mpb_core::{Benchmark, BinaryLocation, ExitOutcome, Pool, PoolOptions, RunOptions};
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Arc, Mutex};

const FAKE_PLANNER: &str = r#"#!/bin/sh
cfg="$1"
out=$(sed -n 's/.*"log_file": "\([^"]*\)".*/\1/p' "$cfg" | head -n 1)
planner=$(sed -n '/"planning"/,/}/p' "$cfg" | sed -n 's/.*"\([a-z_]*\)": true.*/\1/p' | head -n 1)
echo "planning with $planner"
echo "<stats> finished </stats>"
cat > "$out" <<EOF
{
  "settings": { "max_planning_time": 10.0 },
  "runs": [
    {
      "plans": {
        "$planner": {
          "stats": {
            "path_found": true,
            "path_collides": false,
            "exact_goal_path": true,
            "planning_time": 0.01
          }
        }
      }
    }
  ]
}
EOF
"#;

const SLEEPING_PLANNER: &str = "#!/bin/sh\necho starting up\nsleep 300\n";

fn install_binary(dir: &Path, body: &str) {
    let path = dir.join("benchmark");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn template(max_planning_time: f64, runs: u64) -> Settings {
    Settings::from_value(json!({
        "max_planning_time": max_planning_time,
        "benchmark": {
            "runs": runs,
            "log_file": "",
            "control_planners_on": false,
            "steer_functions": [0],
            "forward_propagations": [],
            "planning": { "alpha": true, "beta": true },
            "smoothing": {}
        },
        "env": {}
    }))
    .unwrap()
}

#[tokio::test]
async fn runs_every_planner_and_merges_fragments() {
    let dir = tempfile::tempdir().unwrap();
    install_binary(dir.path(), FAKE_PLANNER);

    let mut benchmark = Benchmark::new(template(10.0, 1), BinaryLocation::new(dir.path()));
    benchmark.set_id("smoke");
    benchmark.set_subfolder(dir.path().join("out"));

    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink: mpb_core::report::ProgressSink = {
        let events = events.clone();
        Arc::new(move |event: ProgressEvent| events.lock().unwrap().push(event))
    };
    let opts = RunOptions {
        shuffle_planners: false,
        ..RunOptions::default()
    };
    let outcome = benchmark.run(&opts, Some(sink)).await.unwrap();

    assert_eq!(outcome.overall(), ExitOutcome::Success);
    assert_eq!(outcome.planners.len(), 2);

    let results = ResultsDoc::load(&outcome.results_path).unwrap();
    assert_eq!(results.planners(), vec!["alpha", "beta"]);

    // The beta fragment was merged in and removed.
    assert!(!dir.path().join("out/smoke_results_beta.json").exists());

    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert_eq!(log.matches("<stats>").count(), 2);
    assert!(log.contains("planning with alpha"));

    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| e.planner == "alpha" && e.completed == 1));
    assert!(events.iter().all(|e| e.total == 2));
}

#[tokio::test]
async fn timeout_kills_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    install_binary(dir.path(), SLEEPING_PLANNER);

    let mut settings = template(0.05, 1);
    settings.set_planners(&["alpha"]).unwrap();
    let mut benchmark = Benchmark::new(settings, BinaryLocation::new(dir.path()));
    benchmark.set_id("stuck");
    benchmark.set_subfolder(dir.path().join("out"));

    let started = std::time::Instant::now();
    let outcome = benchmark
        .run(&RunOptions::default(), None)
        .await
        .unwrap();
    assert_eq!(outcome.overall(), ExitOutcome::Timeout);
    assert!(started.elapsed() < std::time::Duration::from_secs(60));

    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert!(log.contains("starting up"));
}

#[tokio::test]
async fn missing_binary_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut benchmark = Benchmark::new(template(1.0, 1), BinaryLocation::new(dir.path()));
    let err = benchmark.run(&RunOptions::default(), None).await.unwrap_err();
    assert!(err.to_string().contains("benchmark binary not found"));
}

#[tokio::test]
async fn pool_collects_outcomes_in_member_order() {
    let dir = tempfile::tempdir().unwrap();
    install_binary(dir.path(), FAKE_PLANNER);

    let mut pool = Pool::new();
    for i in 0..3 {
        let mut settings = template(10.0, 1);
        settings.set_planners(&["alpha"]).unwrap();
        let mut b = Benchmark::new(settings, BinaryLocation::new(dir.path()));
        b.set_id(format!("member_{i}"));
        b.set_subfolder(dir.path().join("pool"));
        pool.push(b);
    }
    let opts = PoolOptions {
        processes: 2,
        use_subfolder: false,
        // rlimits interfere with the host test process environment; the fake
        // planner needs none.
        limit_memory: false,
        ..PoolOptions::default()
    };
    let summary = pool.run_parallel(&opts, None).await.unwrap();

    assert!(summary.all_ok());
    let ids: Vec<&str> = summary.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["member_0", "member_1", "member_2"]);

    let aggregate = summary.aggregate();
    assert_eq!(aggregate.total, 3);
    assert_eq!(aggregate.found, 3);
}

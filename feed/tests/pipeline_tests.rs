use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use alerts::{Alert, AlertDispatcher, AlertSink};
use detector::WindowStatistics;
use feed::{ClosedReason, Counters, Supervisor, TradeFeed, TradeParser, TradePipeline};

/// Test sink that records every alert and heartbeat it receives.
struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
    heartbeats: AtomicUsize,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            alerts: Mutex::new(vec![]),
            heartbeats: AtomicUsize::new(0),
        })
    }

    fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn present(&self, alert: &Alert) -> anyhow::Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    fn heartbeat(&self) {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test sink that always fails, standing in for an unreachable store.
struct BrokenStoreSink;

#[async_trait]
impl AlertSink for BrokenStoreSink {
    fn name(&self) -> &'static str {
        "broken-store"
    }

    async fn present(&self, _alert: &Alert) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("store write failed"))
    }
}

/// Feed that replays a fixed list of frames and then reports a remote close.
struct ScriptedFeed {
    frames: Vec<String>,
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl TradeFeed for ScriptedFeed {
    async fn run(&mut self, pipeline: &mut TradePipeline) -> ClosedReason {
        self.runs.fetch_add(1, Ordering::SeqCst);
        for frame in &self.frames {
            pipeline.on_frame(frame).await;
        }
        ClosedReason::RemoteClose
    }
}

fn frame(price: f64) -> String {
    // quantity fixed at 1 so notional == price
    format!(r#"{{"p":"{price}","q":"1","T":1700000000000}}"#)
}

fn mk_pipeline(
    window_size: usize,
    multiplier: f64,
    sinks: Vec<Arc<dyn AlertSink>>,
    counters: Counters,
) -> TradePipeline {
    let mut dispatcher = AlertDispatcher::new();
    for sink in sinks {
        dispatcher.push_sink(sink);
    }

    TradePipeline::new(
        TradeParser::new("btcusdt"),
        WindowStatistics::new(window_size),
        multiplier,
        dispatcher,
        counters,
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn no_verdicts_during_warm_up() {
    let sink = RecordingSink::new();
    let mut pipeline = mk_pipeline(3, 2.0, vec![sink.clone()], Counters::default());

    // window size 3: the first three trades fill the window, and the verdict
    // for the third would need a mean that does not exist yet
    for value in [10.0, 1_000.0, 10.0] {
        pipeline.on_frame(&frame(value)).await;
    }

    assert!(sink.alerts().is_empty());
    assert_eq!(sink.heartbeats(), 0);
    assert!(pipeline.is_warmed_up());
}

#[tokio::test]
async fn whale_is_flagged_against_the_preceding_average() {
    // window 3, multiplier 2; pushes [10, 10, 10] give mean 10, push 21
    // recomputes the mean over [10, 10, 21] = 13.67, and the next trade of
    // 50 is judged against that: 50 > 13.67 * 2 -> flagged.
    let sink = RecordingSink::new();
    let counters = Counters::default();
    let mut pipeline = mk_pipeline(3, 2.0, vec![sink.clone()], counters.clone());

    for value in [10.0, 10.0, 10.0, 21.0, 50.0] {
        pipeline.on_frame(&frame(value)).await;
    }

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 2);

    // 21 is itself a whale against the mean of [10, 10, 10]
    assert!(approx(alerts[0].notional_value, 21.0));
    assert!(approx(alerts[0].average_notional, 10.0));

    assert!(approx(alerts[1].notional_value, 50.0));
    assert!(approx(alerts[1].average_notional, 41.0 / 3.0));

    assert_eq!(Counters::get(&counters.whales_flagged), 2);
    assert_eq!(Counters::get(&counters.trades_seen), 5);
}

#[tokio::test]
async fn exactly_at_threshold_is_a_heartbeat_not_an_alert() {
    let sink = RecordingSink::new();
    let mut pipeline = mk_pipeline(2, 2.0, vec![sink.clone()], Counters::default());

    // mean of [10, 10] is 10; a trade of exactly 20 sits on the threshold
    for value in [10.0, 10.0, 20.0] {
        pipeline.on_frame(&frame(value)).await;
    }

    assert!(sink.alerts().is_empty());
    assert_eq!(sink.heartbeats(), 1);
}

#[tokio::test]
async fn malformed_frames_are_skipped_without_touching_the_window() {
    let sink = RecordingSink::new();
    let counters = Counters::default();
    let mut pipeline = mk_pipeline(2, 2.0, vec![sink.clone()], counters.clone());

    pipeline.on_frame(&frame(10.0)).await;
    pipeline.on_frame("{{ not json").await;
    pipeline.on_frame(r#"{"q":"1","T":1}"#).await; // price absent
    pipeline.on_frame(&frame(10.0)).await;
    pipeline.on_frame(&frame(30.0)).await;

    // the two bad frames contributed nothing: the mean before the 30-trade
    // is still mean([10, 10]) = 10, and 30 > 10 * 2 flags it
    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(approx(alerts[0].notional_value, 30.0));
    assert!(approx(alerts[0].average_notional, 10.0));

    assert_eq!(Counters::get(&counters.parse_failures), 2);
    assert_eq!(Counters::get(&counters.trades_seen), 3);
}

#[tokio::test]
async fn verdicts_depend_on_arrival_order() {
    // same multiset {1, 10, 4} and {4, 1, 10}, different outcomes
    let quiet = RecordingSink::new();
    let mut pipeline = mk_pipeline(2, 2.0, vec![quiet.clone()], Counters::default());
    for value in [1.0, 10.0, 4.0] {
        pipeline.on_frame(&frame(value)).await;
    }
    assert!(quiet.alerts().is_empty());

    let loud = RecordingSink::new();
    let mut pipeline = mk_pipeline(2, 2.0, vec![loud.clone()], Counters::default());
    for value in [4.0, 1.0, 10.0] {
        pipeline.on_frame(&frame(value)).await;
    }
    assert_eq!(loud.alerts().len(), 1);
    assert!(approx(loud.alerts()[0].average_notional, 2.5));
}

#[tokio::test]
async fn failing_store_sink_suppresses_nothing() {
    let sink = RecordingSink::new();
    let mut pipeline = mk_pipeline(
        2,
        2.0,
        vec![Arc::new(BrokenStoreSink), sink.clone()],
        Counters::default(),
    );

    // two separate whales, each dispatched through the broken sink first
    for value in [10.0, 10.0, 100.0, 1_000.0] {
        pipeline.on_frame(&frame(value)).await;
    }

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 2);
    assert!(approx(alerts[0].notional_value, 100.0));
    assert!(approx(alerts[1].notional_value, 1_000.0));
}

#[tokio::test(start_paused = true)]
async fn window_history_survives_a_reconnect() {
    let sink = RecordingSink::new();
    let counters = Counters::default();
    let pipeline = mk_pipeline(3, 2.0, vec![sink.clone()], counters.clone());

    // first session warms the window and ends; the second session delivers
    // the whale, which must be judged against history from the first
    let runs = Arc::new(AtomicUsize::new(0));
    let sessions = Arc::new(AtomicUsize::new(0));
    let runs_for_factory = runs.clone();
    let make_feed = move || {
        let frames = match sessions.fetch_add(1, Ordering::SeqCst) {
            0 => vec![frame(10.0), frame(10.0), frame(10.0), frame(21.0)],
            1 => vec![frame(50.0)],
            _ => vec![],
        };
        ScriptedFeed {
            frames,
            runs: runs_for_factory.clone(),
        }
    };

    let supervisor = Supervisor::new(
        make_feed,
        pipeline,
        Duration::from_secs(5),
        counters.clone(),
    );
    let handle = tokio::spawn(supervisor.run());

    // paused clock auto-advances through the reconnect delays
    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.abort();

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 2);
    assert!(approx(alerts[1].notional_value, 50.0));
    assert!(approx(alerts[1].average_notional, 41.0 / 3.0));
    assert!(runs.load(Ordering::SeqCst) >= 2);
}

#[tokio::test(start_paused = true)]
async fn reconnect_happens_once_per_closure_after_the_fixed_delay() {
    let pipeline = mk_pipeline(3, 2.0, vec![], Counters::default());

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_for_factory = runs.clone();
    let make_feed = move || ScriptedFeed {
        frames: vec![],
        runs: runs_for_factory.clone(),
    };

    let supervisor = Supervisor::new(
        make_feed,
        pipeline,
        Duration::from_secs(5),
        Counters::default(),
    );
    let handle = tokio::spawn(supervisor.run());

    let settle = || async {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    };

    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 1, "first session runs immediately");

    tokio::time::advance(Duration::from_millis(4_999)).await;
    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 1, "no retry before the delay elapses");

    tokio::time::advance(Duration::from_millis(2)).await;
    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 2, "exactly one retry after the delay");

    handle.abort();
}

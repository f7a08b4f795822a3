use std::time::{Duration, Instant};

use stats::{tags, Stats, TaggedStats};
use stats_exporter_statsd::StatsdBuilder;

fn main() {
    tracing_subscriber::fmt::init();

    let transport = StatsdBuilder::default()
        .with_remote_address("localhost:8125")
        .expect("failed to parse remote address")
        .with_prefix("example")
        .with_flush_interval(Duration::from_millis(500))
        .build_buffered()
        .expect("failed to build buffered transport");
    let stats = TaggedStats::new(transport, tags!("host" => "localhost"));

    // Pretend to do some work for a few seconds.
    let started = Instant::now();
    let mut iterations = 0u64;
    while started.elapsed() < Duration::from_secs(5) {
        let loop_start = Instant::now();
        std::thread::sleep(Duration::from_millis(10));
        iterations += 1;

        let _ = stats.inc("loops", 1, 1.0, &tags!("system" => "foo"));
        let _ = stats.timing("loop_duration", loop_start.elapsed(), 1.0, &tags!());
        let _ = stats.gauge("iterations", iterations as f64, 1.0, &tags!());
    }

    stats.close().expect("failed to flush pending metrics");
}

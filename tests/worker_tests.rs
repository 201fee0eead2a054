//! Background worker tests.
//!
//! Tests verify:
//! - A submitted request comes back tagged with its id
//! - The worker produces the same series as a direct call
//! - Shutdown joins cleanly
//! - A malformed request does not take the worker down

use std::time::Duration;

use physio_sim::{compute, ComputeRequest, InterventionLibrary, RequestBuilder, SimulationWorker, TimeGrid};

#[test]
fn test_worker_round_trip() {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::uniform(0.0, 360.0, 10.0))
        .intervention("coffee", "caffeine", 60.0)
        .build();
    let direct = compute(&request);

    let mut worker = SimulationWorker::spawn().expect("spawn worker");
    assert!(worker.latest().is_none());
    let id = worker.submit(request).expect("submit");
    let received = worker
        .recv_timeout(Duration::from_secs(60))
        .expect("worker alive")
        .expect("response within timeout");

    assert_eq!(received.request_id, id);
    assert_eq!(received.response.series, direct.series);
    assert_eq!(worker.latest().map(|r| r.request_id), Some(id));
    worker.shutdown();
}

#[test]
fn test_latest_keeps_newest_response() {
    let library = InterventionLibrary::builtin();
    let mut worker = SimulationWorker::spawn().expect("spawn worker");
    let first = worker
        .submit(RequestBuilder::new(&library, TimeGrid::uniform(0.0, 60.0, 10.0)).build())
        .expect("submit");
    let second = worker
        .submit(RequestBuilder::new(&library, TimeGrid::uniform(0.0, 120.0, 10.0)).build())
        .expect("submit");
    assert!(second > first);

    for _ in 0..2 {
        worker
            .recv_timeout(Duration::from_secs(60))
            .expect("worker alive")
            .expect("response within timeout");
    }
    let latest = worker.latest().expect("latest response");
    assert_eq!(latest.request_id, second);
    assert_eq!(latest.response.minutes.len(), 13);
}

#[test]
fn test_worker_survives_malformed_request() {
    let library = InterventionLibrary::builtin();
    let mut worker = SimulationWorker::spawn().expect("spawn worker");

    for json in [
        r#"{"grid":{"minutes":[0,5]},"subject":{"weight_kg":-70}}"#,
        r#"{"grid":{"minutes":[0,5]},"homeostasis":{"glycogen_capacity_g":-1}}"#,
    ] {
        let bad: ComputeRequest = serde_json::from_str(json).expect("valid json");
        let id = worker.submit(bad).expect("submit malformed request");
        let received = worker
            .recv_timeout(Duration::from_secs(60))
            .expect("worker alive after malformed request")
            .expect("response within timeout");
        assert_eq!(received.request_id, id);
        assert_eq!(received.response.minutes.len(), 2);
        assert!(received
            .response
            .series
            .values()
            .all(|s| s.iter().all(|v| v.is_finite())));
    }

    let good = RequestBuilder::new(&library, TimeGrid::uniform(0.0, 60.0, 10.0)).build();
    let id = worker.submit(good).expect("submit after malformed requests");
    let received = worker
        .recv_timeout(Duration::from_secs(60))
        .expect("worker alive")
        .expect("response within timeout");
    assert_eq!(received.request_id, id);
    assert_eq!(received.response.minutes.len(), 7);
}

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

pub struct Metrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    damage_flagged: Counter<u64>,
}

impl Metrics {
    /// Instruments are no-ops until a global meter provider is installed.
    pub fn init(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0,
        ];

        let requests = meter
            .u64_counter("inspection_requests_total")
            .with_description("Inspection requests by endpoint and response status")
            .build();
        let duration = meter
            .f64_histogram("inspection_duration_seconds")
            .with_description("Time to decode and inspect a single upload")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();
        let damage_flagged = meter
            .u64_counter("inspection_damage_flagged_total")
            .with_description("Damage assessments that reported damage")
            .build();

        Self {
            requests,
            duration,
            damage_flagged,
        }
    }

    pub fn record_request(&self, endpoint: &'static str, status: u16, elapsed_secs: f64) {
        let attributes = [
            KeyValue::new("endpoint", endpoint),
            KeyValue::new("status", status as i64),
        ];
        self.requests.add(1, &attributes);
        self.duration.record(elapsed_secs, &attributes[..1]);
    }

    pub fn record_damage_flagged(&self) {
        self.damage_flagged.add(1, &[]);
    }
}

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use prometheus::Registry;

pub struct Metrics {
    request_counter: Counter<u64>,
    prediction_counter: Counter<u64>,
    preprocess_duration: Histogram<u64>,
    inference_duration: Histogram<u64>,
    pub registry: Registry,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        // TODO: deprecated crate to be replaced with an OLTP exporter
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .unwrap();

        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_reader(exporter)
            .build();

        let meter = provider.meter("mri_prediction");
        global::set_meter_provider(provider);

        let request_counter = meter
            .u64_counter("requests_total")
            .with_description("Total number of requests")
            .build();

        let prediction_counter = meter
            .u64_counter("predictions_total")
            .with_description("Total number of predictions by class label")
            .build();

        let duration_boundaries = vec![1., 2., 5., 10., 20., 50., 100., 250., 500., 1000.];

        let preprocess_duration = meter
            .u64_histogram("preprocess_duration_ms")
            .with_boundaries(duration_boundaries.clone())
            .with_description("Duration of image preprocessing in milliseconds")
            .build();

        let inference_duration = meter
            .u64_histogram("inference_duration_ms")
            .with_boundaries(duration_boundaries)
            .with_description("Duration of model forward passes in milliseconds")
            .build();

        Metrics {
            request_counter,
            prediction_counter,
            preprocess_duration,
            inference_duration,
            registry,
        }
    }

    pub fn record_request(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.request_counter.add(1, &attributes);
    }

    pub fn record_prediction(&self, label: &'static str) {
        let attributes = vec![KeyValue::new("label", label)];
        self.prediction_counter.add(1, &attributes);
    }

    pub fn record_preprocess_duration(&self, duration_ms: u64) {
        self.preprocess_duration.record(duration_ms, &[]);
    }

    pub fn record_inference_duration(&self, duration_ms: u64) {
        self.inference_duration.record(duration_ms, &[]);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub selections_total: IntCounterVec,
    pub selection_latency_seconds: HistogramVec,
    pub partner_exclusions_total: IntCounterVec,
    pub catalog_refreshes_total: IntCounter,
    pub selection_candidates: Histogram,
    pub audit_evictions_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let selections_total = IntCounterVec::new(
            Opts::new("selections_total", "Total partner selections by outcome"),
            &["outcome"],
        )
        .expect("valid selections_total metric");

        let selection_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "selection_latency_seconds",
                "Latency of partner selection in seconds",
            ),
            &["outcome"],
        )
        .expect("valid selection_latency_seconds metric");

        let partner_exclusions_total = IntCounterVec::new(
            Opts::new(
                "partner_exclusions_total",
                "Partners dropped from selection by reason",
            ),
            &["reason"],
        )
        .expect("valid partner_exclusions_total metric");

        let catalog_refreshes_total = IntCounter::new(
            "catalog_refreshes_total",
            "Number of partner catalog snapshot reloads",
        )
        .expect("valid catalog_refreshes_total metric");

        let selection_candidates = Histogram::with_opts(
            HistogramOpts::new(
                "selection_candidates",
                "Scored candidates per selection",
            )
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]),
        )
        .expect("valid selection_candidates metric");

        let audit_evictions_total = IntCounter::new(
            "audit_evictions_total",
            "Selection records dropped from the audit log by retention",
        )
        .expect("valid audit_evictions_total metric");

        registry
            .register(Box::new(selections_total.clone()))
            .expect("register selections_total");
        registry
            .register(Box::new(selection_latency_seconds.clone()))
            .expect("register selection_latency_seconds");
        registry
            .register(Box::new(partner_exclusions_total.clone()))
            .expect("register partner_exclusions_total");
        registry
            .register(Box::new(catalog_refreshes_total.clone()))
            .expect("register catalog_refreshes_total");
        registry
            .register(Box::new(selection_candidates.clone()))
            .expect("register selection_candidates");
        registry
            .register(Box::new(audit_evictions_total.clone()))
            .expect("register audit_evictions_total");

        Self {
            registry,
            selections_total,
            selection_latency_seconds,
            partner_exclusions_total,
            catalog_refreshes_total,
            selection_candidates,
            audit_evictions_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

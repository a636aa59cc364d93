//! Metrics counters and the GET /metrics handler.

use crate::state::SharedState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const TOP_N: usize = 20;

#[derive(Default)]
pub struct Metrics {
    pub resolve_count: AtomicU64,
    pub completion_count: AtomicU64,
    pub total_resolve_ms: AtomicU64,
    pub total_completion_ms: AtomicU64,
    pub analytics: Mutex<Analytics>,
}

#[derive(Default)]
pub struct Analytics {
    pub top_tokens: HashMap<String, u64>,
    pub top_queries: HashMap<String, u64>,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub performance: PerformanceMetrics,
    pub analytics: AnalyticsMetrics,
}

#[derive(Serialize)]
pub struct PerformanceMetrics {
    pub resolves: u64,
    pub completions: u64,
    pub avg_resolve_ms: u64,
    pub avg_completion_ms: u64,
}

#[derive(Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

#[derive(Serialize)]
pub struct AnalyticsMetrics {
    pub top_tokens: Vec<NamedCount>,
    pub top_queries: Vec<NamedCount>,
}

fn top_n_sorted(map: &HashMap<String, u64>, n: usize) -> Vec<NamedCount> {
    let mut entries: Vec<_> = map
        .iter()
        .map(|(k, v)| NamedCount {
            name: k.clone(),
            count: *v,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}

pub async fn metrics(State(state): State<SharedState>) -> Json<MetricsResponse> {
    let resolves = state.metrics.resolve_count.load(Ordering::Relaxed);
    let completions = state.metrics.completion_count.load(Ordering::Relaxed);
    let total_resolve_ms = state.metrics.total_resolve_ms.load(Ordering::Relaxed);
    let total_completion_ms = state.metrics.total_completion_ms.load(Ordering::Relaxed);

    let avg_resolve_ms = if resolves > 0 {
        total_resolve_ms / resolves
    } else {
        0
    };
    let avg_completion_ms = if completions > 0 {
        total_completion_ms / completions
    } else {
        0
    };

    let analytics = if let Ok(a) = state.metrics.analytics.lock() {
        AnalyticsMetrics {
            top_tokens: top_n_sorted(&a.top_tokens, TOP_N),
            top_queries: top_n_sorted(&a.top_queries, TOP_N),
        }
    } else {
        AnalyticsMetrics {
            top_tokens: Vec::new(),
            top_queries: Vec::new(),
        }
    };

    Json(MetricsResponse {
        performance: PerformanceMetrics {
            resolves,
            completions,
            avg_resolve_ms,
            avg_completion_ms,
        },
        analytics,
    })
}

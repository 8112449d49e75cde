use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters for one generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    /// Documented packages in walk order
    pub packages: Vec<String>,
    pub package_pages: usize,
    pub symbol_stubs: usize,
    pub elapsed_ms: u64,
}

impl GenerationStats {
    pub fn files_written(&self) -> usize {
        self.package_pages + self.symbol_stubs
    }
}

/// Tracks progress while packages are documented.
pub struct GenerationProgress {
    started_at: Instant,
    packages_total: usize,
    stats: GenerationStats,
}

impl GenerationProgress {
    pub fn start(packages_total: usize) -> Self {
        Self {
            started_at: Instant::now(),
            packages_total,
            stats: GenerationStats::default(),
        }
    }

    pub fn inc(&mut self, package: &str, symbol_stubs: usize) {
        self.stats.packages.push(package.to_string());
        self.stats.package_pages += 1;
        self.stats.symbol_stubs += symbol_stubs;
    }

    pub fn packages_total(&self) -> usize {
        self.packages_total
    }

    pub fn packages_done(&self) -> usize {
        self.stats.package_pages
    }

    pub fn progress_pct(&self) -> f64 {
        if self.packages_total > 0 {
            (self.packages_done() as f64 / self.packages_total as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn finish(mut self) -> GenerationStats {
        self.stats.elapsed_ms = self.elapsed().as_millis() as u64;
        self.stats
    }
}

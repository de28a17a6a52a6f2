//! Pipeline statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::SonarMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Ticks run
    pub ticks: u64,

    /// Emissions published
    pub emissions: u64,

    /// Simulation time reached (seconds)
    pub sim_time: f64,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Per-sink counters after drain
    pub sink_metrics: Vec<(String, MetricsSnapshot)>,

    /// Sweep and emission metrics
    pub sonar_metrics: SonarMetricsAggregator,
}

impl PipelineStats {
    /// Simulated seconds per wall-clock second
    pub fn real_time_factor(&self) -> f64 {
        let wall = self.duration.as_secs_f64();
        if wall > 0.0 {
            self.sim_time / wall
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Simulation Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Wall time: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Simulation time: {:.3}s", self.sim_time);
        println!("   ├─ Real-time factor: {:.2}x", self.real_time_factor());
        println!("   ├─ Ticks: {}", self.ticks);
        println!("   └─ Emissions: {}", self.emissions);

        println!("\n{}", self.sonar_metrics.summary());

        if !self.sink_metrics.is_empty() {
            println!("📤 Sinks");
            for (i, (name, snapshot)) in self.sink_metrics.iter().enumerate() {
                let prefix = if i == self.sink_metrics.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: written {}, failed {}, dropped {}",
                    prefix, name, snapshot.written, snapshot.failed, snapshot.dropped
                );
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_time_factor() {
        let stats = PipelineStats {
            sim_time: 10.0,
            duration: Duration::from_secs(5),
            ..Default::default()
        };
        assert_eq!(stats.real_time_factor(), 2.0);
        assert_eq!(PipelineStats::default().real_time_factor(), 0.0);
    }
}

//! 声呐扫描指标模块
//!
//! 记录扫描角度、换向、限频跳过与发布指标，并在内存中聚合运行统计。

use std::collections::HashMap;

use contracts::SonarEmission;
use metrics::{counter, gauge, histogram};

/// 记录当前方位角与相对初始方位的位移
///
/// 每个 tick 的 pre_render 阶段调用。
pub fn record_bearing(sensor: &str, bearing: f64, displacement: f64) {
    gauge!("msis_sonar_bearing_rad", "sensor" => sensor.to_string()).set(bearing);
    gauge!("msis_sonar_displacement_rad", "sensor" => sensor.to_string()).set(displacement);
}

/// 记录扫描换向
pub fn record_sweep_reversal(sensor: &str, direction: &str) {
    counter!(
        "msis_sonar_sweep_reversals_total",
        "sensor" => sensor.to_string(),
        "direction" => direction.to_string()
    )
    .increment(1);
}

/// 记录因限频而跳过的 tick
pub fn record_tick_skipped(sensor: &str) {
    counter!("msis_sonar_ticks_skipped_total", "sensor" => sensor.to_string()).increment(1);
}

/// 记录一次发布
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_emission;
///
/// record_emission("msis", composite.valid_fraction);
/// ```
pub fn record_emission(sensor: &str, valid_fraction: f64) {
    counter!("msis_sonar_emissions_total", "sensor" => sensor.to_string()).increment(1);
    gauge!("msis_sonar_valid_fraction", "sensor" => sensor.to_string()).set(valid_fraction);
    histogram!("msis_sonar_valid_fraction_hist", "sensor" => sensor.to_string())
        .record(valid_fraction);
}

/// 记录 sink 写入结果
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "msis_sonar_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 声呐指标聚合器
///
/// 在内存中聚合指标，运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SonarMetricsAggregator {
    /// 总 tick 数
    pub total_ticks: u64,

    /// 发布次数
    pub total_emissions: u64,

    /// 各方向换向次数
    pub reversals: HashMap<String, u64>,

    /// 位移统计 (rad)
    pub displacement_stats: RunningStats,

    /// 有效像素占比统计
    pub valid_fraction_stats: RunningStats,

    /// 发布间隔统计 (ms)
    pub interval_stats: RunningStats,

    last_stamp: Option<f64>,
}

impl SonarMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次 tick
    pub fn record_tick(&mut self) {
        self.total_ticks += 1;
    }

    /// 记录一次换向
    pub fn record_reversal(&mut self, direction: &str) {
        *self.reversals.entry(direction.to_string()).or_insert(0) += 1;
    }

    /// 记录一次发布
    pub fn record_emission(&mut self, emission: &SonarEmission) {
        self.total_emissions += 1;
        self.displacement_stats.push(emission.sonar_return.bearing);
        self.valid_fraction_stats.push(emission.valid_fraction);

        if let Some(last) = self.last_stamp {
            self.interval_stats.push((emission.stamp - last) * 1000.0);
        }
        self.last_stamp = Some(emission.stamp);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_ticks: self.total_ticks,
            total_emissions: self.total_emissions,
            skipped_ticks: self.total_ticks.saturating_sub(self.total_emissions),
            emission_ratio: if self.total_ticks > 0 {
                self.total_emissions as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            reversals: self.reversals.clone(),
            displacement_rad: StatsSummary::from(&self.displacement_stats),
            valid_fraction: StatsSummary::from(&self.valid_fraction_stats),
            emission_interval_ms: StatsSummary::from(&self.interval_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub total_emissions: u64,
    pub skipped_ticks: u64,
    pub emission_ratio: f64,
    pub reversals: HashMap<String, u64>,
    pub displacement_rad: StatsSummary,
    pub valid_fraction: StatsSummary,
    pub emission_interval_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sonar Metrics Summary ===")?;
        writeln!(f, "Ticks: {}", self.total_ticks)?;
        writeln!(
            f,
            "Emissions: {} ({:.2}% of ticks)",
            self.total_emissions, self.emission_ratio
        )?;
        writeln!(f, "Rate-limited ticks: {}", self.skipped_ticks)?;
        writeln!(f, "Displacement (rad): {}", self.displacement_rad)?;
        writeln!(f, "Valid pixel fraction: {}", self.valid_fraction)?;
        writeln!(f, "Emission interval (ms): {}", self.emission_interval_ms)?;

        if !self.reversals.is_empty() {
            writeln!(f, "Sweep reversals:")?;
            let mut directions: Vec<_> = self.reversals.iter().collect();
            directions.sort();
            for (direction, count) in directions {
                writeln!(f, "  {}: {}", direction, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

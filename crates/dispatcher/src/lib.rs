//! # Dispatcher
//!
//! 发布边界：把声呐发布结果分发给各个 sink。
//!
//! 负责：
//! - 消费 `SonarEmission`
//! - Fan-out 到多个 sinks（每个 sink 独立队列与 worker）
//! - 隔离慢 sink，不阻塞仿真 tick

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{SonarEmission, SonarSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink};

#[cfg(test)]
pub(crate) mod test_util {
    use bytes::Bytes;
    use contracts::{EmissionTopics, ImageEncoding, SonarEmission, SonarImage, SonarReturn};

    /// 2x2 emission with a recognizable image and a 2x3 return.
    pub fn emission(sequence: u64, debug: bool) -> SonarEmission {
        let image = SonarImage::new(
            2,
            2,
            ImageEncoding::Rgb8,
            Bytes::from(vec![0, 0, 255, 0, 0, 0, 0, 255, 128, 0, 0, 0]),
        )
        .unwrap();
        SonarEmission {
            sequence,
            stamp: sequence as f64 * 0.01,
            sensor: "msis".to_string(),
            topics: EmissionTopics::new("/sonar", debug),
            image: image.clone(),
            sonar_return: SonarReturn {
                stamp: sequence as f64 * 0.01,
                bearing: 0.1,
                beam_count: 2,
                bin_count: 3,
                hfov: 0.5,
                range_min: 0.5,
                range_max: 10.0,
                intensities: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5],
            },
            shader: debug.then_some(image),
            valid_fraction: 0.5,
        }
    }
}

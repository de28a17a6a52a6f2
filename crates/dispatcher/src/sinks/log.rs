//! LogSink - logs an emission summary via tracing

use contracts::{ContractError, SonarEmission, SonarSink};
use tracing::{info, instrument};

/// Sink that logs emission summaries
pub struct LogSink {
    name: String,
    received: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: 0,
        }
    }

    /// Emissions seen so far
    pub fn received(&self) -> u64 {
        self.received
    }

    fn log_summary(&self, emission: &SonarEmission) {
        let ret = &emission.sonar_return;
        let peak = ret.intensities.iter().copied().fold(0.0_f32, f32::max);

        info!(
            sink = %self.name,
            sensor = %emission.sensor,
            sequence = emission.sequence,
            stamp = emission.stamp,
            topic = %emission.topics.image,
            bearing = ret.bearing,
            width = emission.image.width,
            height = emission.image.height,
            beams = ret.beam_count,
            bins = ret.bin_count,
            peak_return = peak,
            valid_fraction = emission.valid_fraction,
            shader = emission.shader.is_some(),
            "Sonar emission"
        );
    }
}

impl SonarSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, emission),
        fields(sink = %self.name, sequence = emission.sequence)
    )]
    async fn write(&mut self, emission: &SonarEmission) -> Result<(), ContractError> {
        self.received += 1;
        self.log_summary(emission);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, received = self.received, "LogSink closed");
        Ok(())
    }
}

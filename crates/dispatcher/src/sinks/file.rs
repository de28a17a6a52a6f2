//! FileSink - writes emissions to disk, one directory per topic

use contracts::{ContractError, SonarEmission, SonarImage, SonarSink};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Read `base_path` from the params map, `./output` if absent
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// Sink that persists every topic of an emission.
///
/// Layout under `base_path`, with `<topic>` taken as a relative path:
/// - `<topic>/<sequence>.png`: colorized image
/// - `<topic>/beams_fls/<sequence>.json`: structured return
/// - `<topic>/shader/<sequence>.png`: diagnostic image (debug only)
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    created_dirs: HashSet<PathBuf>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            created_dirs: HashSet::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    /// Directory for `topic`, created on first use.
    fn topic_dir(&mut self, topic: &str) -> std::io::Result<PathBuf> {
        let mut dir = self.config.base_path.clone();
        for part in topic
            .split('/')
            .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        {
            dir.push(part);
        }
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    fn write_emission(&mut self, emission: &SonarEmission) -> std::io::Result<()> {
        let stem = format!("{:06}", emission.sequence);

        let image_dir = self.topic_dir(&emission.topics.image)?;
        save_image(&image_dir.join(format!("{stem}.png")), &emission.image)?;

        let returns_dir = self.topic_dir(&emission.topics.returns)?;
        let mut writer = BufWriter::new(File::create(returns_dir.join(format!("{stem}.json")))?);
        serde_json::to_writer(&mut writer, &emission.sonar_return)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()?;

        if let (Some(topic), Some(shader)) = (&emission.topics.shader, &emission.shader) {
            let shader_dir = self.topic_dir(topic)?;
            save_image(&shader_dir.join(format!("{stem}.png")), shader)?;
        }

        Ok(())
    }

    fn persist(&mut self, emission: &SonarEmission) -> Result<(), ContractError> {
        self.write_emission(emission).map_err(|e| {
            error!(
                sink = %self.name,
                sequence = emission.sequence,
                error = %e,
                "Write failed"
            );
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

fn save_image(path: &Path, image: &SonarImage) -> std::io::Result<()> {
    image::save_buffer(
        path,
        &image.data,
        image.width,
        image.height,
        image::ColorType::Rgb8,
    )
    .map_err(std::io::Error::other)
}

impl SonarSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, emission),
        fields(sink = %self.name, sequence = emission.sequence)
    )]
    async fn write(&mut self, emission: &SonarEmission) -> Result<(), ContractError> {
        self.persist(emission)
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, dirs = self.created_dirs.len(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::emission;
    use contracts::SonarReturn;
    use tempfile::tempdir;

    fn sink_in(dir: &Path) -> FileSink {
        FileSink::new(
            "test_file",
            FileSinkConfig {
                base_path: dir.to_path_buf(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_writes_image_and_return() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());

        sink.write(&emission(7, false)).await.unwrap();
        sink.close().await.unwrap();

        let png = dir.path().join("sonar").join("000007.png");
        let decoded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 0]);

        let json = dir.path().join("sonar").join("beams_fls").join("000007.json");
        let ret: SonarReturn = serde_json::from_reader(File::open(json).unwrap()).unwrap();
        assert_eq!(ret.intensities.len(), 6);
        assert!(!dir.path().join("sonar").join("shader").exists());
    }

    #[tokio::test]
    async fn test_debug_writes_shader() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());

        sink.write(&emission(1, true)).await.unwrap();
        assert!(dir
            .path()
            .join("sonar")
            .join("shader")
            .join("000001.png")
            .exists());
    }

    #[test]
    fn test_topic_dir_stays_under_base() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());
        let resolved = sink.topic_dir("/../../etc/./sonar").unwrap();
        assert_eq!(resolved, dir.path().join("etc").join("sonar"));
    }

    #[test]
    fn test_config_default_path() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.base_path, PathBuf::from("./output"));
    }
}

//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 仿真驱动 → 分发器 的完整链路
//! - 扫描往返、角度回绕与速率限制等长时场景
//! - 渲染资源的建立与释放

#[cfg(test)]
mod fixtures {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SonarBlueprint;

    pub const SWEEP_TOML: &str = r#"
[sensor]
name = "msis"
link_reference = "sonar_link"
angle_max = 2.0944
angle_min = -2.0944
axis_rotation = 2
angular_velocity = 0.2
update_rate = 100.0
topic = "/msis"
hfov = 0.785
vfov = 0.2
bin_count = 32
beam_count = 16

[sensor.clip]
near = 0.5
far = 20.0

[sensor.image]
width = 64
height = 32

[world]
name = "tank"
step_size = 0.01

[[world.targets]]
position = { x = 6.0, y = 0.0, z = 0.0 }
radius = 1.0
reflectivity = 0.9
"#;

    pub fn blueprint() -> SonarBlueprint {
        ConfigLoader::load_from_str(SWEEP_TOML, ConfigFormat::Toml).unwrap()
    }
}

#[cfg(test)]
mod sweep_tests {
    use scan_engine::SweepState;
    use sim_host::SimulationDriver;

    use crate::fixtures::blueprint;

    const OMEGA: f64 = 0.2;
    const DT: f64 = 0.01;
    const LIMIT: f64 = 2.0944;

    struct SweepTrace {
        displacements: Vec<f64>,
        reversals: Vec<SweepState>,
    }

    fn trace(driver: &mut SimulationDriver, ticks: u64) -> SweepTrace {
        let mut out = SweepTrace {
            displacements: Vec::new(),
            reversals: Vec::new(),
        };
        for _ in 0..ticks {
            let report = driver.tick().unwrap();
            out.displacements.push(report.sample.displacement);
            if let Some(state) = report.reversal {
                out.reversals.push(state);
            }
        }
        out
    }

    fn assert_bounded(trace: &SweepTrace) {
        let overshoot = OMEGA * DT + 1e-6;
        for d in &trace.displacements {
            assert!(*d <= LIMIT + overshoot, "displacement {d} above limit");
            assert!(*d >= -LIMIT - overshoot, "displacement {d} below limit");
        }
        for pair in trace.displacements.windows(2) {
            assert!(
                (pair[1] - pair[0]).abs() <= overshoot,
                "jump from {} to {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_full_sweep_reverses_at_both_limits() {
        let mut driver = SimulationDriver::from_blueprint(&blueprint()).unwrap();
        let trace = trace(&mut driver, 5000);

        assert_bounded(&trace);
        assert_eq!(
            trace.reversals,
            vec![SweepState::SweepingNegative, SweepState::SweepingPositive]
        );
        let max = trace.displacements.iter().cloned().fold(f64::MIN, f64::max);
        let min = trace.displacements.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max >= LIMIT);
        assert!(min <= -LIMIT);
    }

    #[test]
    fn test_displacement_survives_yaw_wrap() {
        let mut bp = blueprint();
        bp.world.mount.rotation.z = 1.5;
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();
        assert!((driver.sonar().initial_bearing() - 1.5).abs() < 1e-9);

        let trace = trace(&mut driver, 5000);

        // 1.5 + 2.0944 crosses +π; displacement must not jump by 2π
        assert_bounded(&trace);
        assert_eq!(trace.reversals.len(), 2);
    }

    #[test]
    fn test_zero_limits_and_velocity_hold_still() {
        let mut bp = blueprint();
        bp.sensor.angle_min = 0.0;
        bp.sensor.angle_max = 0.0;
        bp.sensor.angular_velocity = 0.0;
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        let trace = trace(&mut driver, 500);

        assert!(trace.reversals.is_empty());
        assert!(trace.displacements.iter().all(|d| d.abs() < 1e-12));
        assert_eq!(driver.sonar().sweep_state(), SweepState::Stationary);
    }

    #[test]
    fn test_pitch_axis_sweep() {
        let mut bp = blueprint();
        bp.sensor.axis_rotation = contracts::ScanAxis::Y;
        bp.sensor.angle_min = -0.3;
        bp.sensor.angle_max = 0.3;
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        let trace = trace(&mut driver, 1000);

        assert!(!trace.reversals.is_empty());
        assert!(trace
            .displacements
            .iter()
            .all(|d| d.abs() <= 0.3 + OMEGA * DT + 1e-6));
    }
}

#[cfg(test)]
mod emission_tests {
    use sim_host::SimulationDriver;

    use crate::fixtures::blueprint;

    fn collect(driver: &mut SimulationDriver, duration: f64) -> Vec<contracts::SonarEmission> {
        let mut emissions = Vec::new();
        driver
            .run_for(duration, |report| {
                if let Some(emission) = &report.emission {
                    emissions.push(emission.clone());
                }
            })
            .unwrap();
        emissions
    }

    #[test]
    fn test_emissions_are_rate_limited() {
        let mut bp = blueprint();
        bp.sensor.update_rate = 10.0;
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        let emissions = collect(&mut driver, 2.0);

        assert!(!emissions.is_empty());
        for pair in emissions.windows(2) {
            assert!(pair[1].stamp - pair[0].stamp > 0.1);
            assert_eq!(pair[1].sequence, pair[0].sequence + 1);
        }
        assert_eq!(driver.sonar().emissions(), emissions.len() as u64);
    }

    #[test]
    fn test_masked_pixels_are_black() {
        let mut driver = SimulationDriver::from_blueprint(&blueprint()).unwrap();
        let emissions = collect(&mut driver, 0.2);
        let first = emissions.first().unwrap();

        let pixels: Vec<[u8; 3]> = first.image.pixels().collect();
        assert!(pixels.iter().any(|p| *p == [0, 0, 0]));
        assert!(pixels.iter().any(|p| *p != [0, 0, 0]));
        assert!(first.valid_fraction > 0.0 && first.valid_fraction < 1.0);
        assert_eq!(first.sonar_return.intensities.len(), 16 * 32);
        assert!(first.shader.is_none());
        assert!(first.topics.shader.is_none());
    }

    #[test]
    fn test_debug_mode_publishes_shader() {
        let mut bp = blueprint();
        bp.sensor.debug = true;
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        let emissions = collect(&mut driver, 0.2);
        let first = emissions.first().unwrap();

        let shader = first.shader.as_ref().unwrap();
        assert_eq!((shader.width, shader.height), (64, 32));
        assert_eq!(first.topics.shader.as_deref(), Some("/msis/shader"));
        assert_eq!(first.topics.returns, "/msis/beams_fls");
    }

    /// Column of the accumulated image holding `bearing`.
    fn image_column(bearing: f64, width: u32) -> u32 {
        use std::f64::consts::{PI, TAU};
        let wrapped = (bearing + PI).rem_euclid(TAU);
        ((wrapped / TAU * f64::from(width)) as u32).min(width - 1)
    }

    fn lit_rows(emission: &contracts::SonarEmission, column: u32) -> usize {
        (0..emission.image.height)
            .filter(|&y| emission.image.pixel(column, y) != Some([0, 0, 0]))
            .count()
    }

    #[test]
    fn test_earlier_swept_target_stays_in_image() {
        let mut bp = blueprint();
        bp.sensor.hfov = 0.2;
        bp.sensor.angular_velocity = 1.0;
        bp.sensor.update_rate = 0.45;
        bp.sensor.angle_max = 3.0;
        bp.sensor.angle_min = -3.0;
        bp.world.targets[0].position =
            contracts::Vec3::new(6.0 * 1.0_f64.cos(), 6.0 * 1.0_f64.sin(), 0.0);
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        // The beam passes the target near t = 1 s, the first emission lands after 2.2 s
        let emissions = collect(&mut driver, 2.5);
        let first = emissions.first().unwrap();
        assert!(first.stamp > 2.2);
        assert!(first.sonar_return.bearing > 2.0);

        let width = first.image.width;
        assert!(first.valid_fraction > 0.0);
        assert!(lit_rows(first, image_column(1.0, width)) > 0);
        assert_eq!(lit_rows(first, image_column(first.sonar_return.bearing, width)), 0);
        // Structured return only carries the latest beam, which misses
        assert!(first.sonar_return.intensities.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_world_yields_black_images() {
        let mut bp = blueprint();
        bp.world.targets.clear();
        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();

        let emissions = collect(&mut driver, 0.2);

        for emission in &emissions {
            assert!(emission.image.pixels().all(|p| p == [0, 0, 0]));
            assert_eq!(emission.valid_fraction, 0.0);
        }
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use contracts::WorldContext;
    use scan_engine::{MsisSonar, ScanError};
    use sim_host::{SimModel, Sphere, SyntheticBackend, SyntheticFailures};

    use crate::fixtures::blueprint;

    fn setup_with(failures: SyntheticFailures) -> (Result<(), ScanError>, SyntheticBackend) {
        let bp = blueprint();
        let model = SimModel::from_world(&bp.world, &bp.sensor.link_reference);
        let targets = bp.world.targets.iter().map(Sphere::from).collect();
        let mut backend = SyntheticBackend::with_failures(targets, failures);
        let world = WorldContext::new(bp.world.name.clone());

        let result = MsisSonar::setup(&bp.sensor, &mut backend, &model, &world).map(|s| s.shutdown());
        (result, backend)
    }

    #[test]
    fn test_texture_failure_releases_renderer() {
        let (result, backend) = setup_with(SyntheticFailures {
            fail_texture: true,
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(backend.sonars_created(), 1);
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn test_far_clip_mismatch_fails_setup() {
        let (result, backend) = setup_with(SyntheticFailures {
            misreport_far_clip: Some(50.0),
            ..Default::default()
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("mismatch"), "{err}");
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn test_clean_shutdown_releases_once() {
        let (result, backend) = setup_with(SyntheticFailures::default());
        assert!(result.is_ok());
        assert_eq!(backend.releases(), 1);
        assert_eq!(backend.scene_count(), 1);
    }

    #[test]
    fn test_unknown_link_creates_nothing() {
        let bp = blueprint();
        let model = SimModel::from_world(&bp.world, "other_link");
        let mut backend = SyntheticBackend::from_world(&bp.world);
        let world = WorldContext::new(bp.world.name.clone());

        let result = MsisSonar::setup(&bp.sensor, &mut backend, &model, &world);
        assert!(result.is_err());
        assert_eq!(backend.sonars_created(), 0);
        assert_eq!(backend.scene_count(), 0);
    }

    #[test]
    fn test_disabled_backend_is_rejected() {
        let bp = blueprint();
        let model = SimModel::from_world(&bp.world, &bp.sensor.link_reference);
        let mut backend = SyntheticBackend::disabled();
        let world = WorldContext::new(bp.world.name.clone());

        assert!(MsisSonar::setup(&bp.sensor, &mut backend, &model, &world).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::fs::File;

    use contracts::{SinkConfig, SinkType, SonarReturn};
    use dispatcher::create_dispatcher;
    use observability::SonarMetricsAggregator;
    use sim_host::SimulationDriver;
    use tokio::sync::mpsc;

    use crate::fixtures::blueprint;

    /// End-to-end: config -> SimulationDriver -> Dispatcher -> FileSink + LogSink
    #[tokio::test]
    async fn test_e2e_file_and_log_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let mut bp = blueprint();
        bp.sensor.update_rate = 20.0;
        bp.sensor.debug = true;
        bp.sinks = vec![
            SinkConfig {
                name: "disk".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 64,
                params: HashMap::from([(
                    "base_path".to_string(),
                    dir.path().display().to_string(),
                )]),
            },
            SinkConfig {
                name: "log".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 64,
                params: HashMap::new(),
            },
        ];

        let (tx, rx) = mpsc::channel(64);
        let dispatcher_handle = create_dispatcher(bp.sinks.clone(), rx).unwrap().spawn();

        let mut driver = SimulationDriver::from_blueprint(&bp).unwrap();
        let mut aggregator = SonarMetricsAggregator::new();
        let mut sequences = Vec::new();
        for _ in 0..50 {
            let report = driver.tick().unwrap();
            aggregator.record_tick();
            if let Some(emission) = report.emission {
                aggregator.record_emission(&emission);
                sequences.push(emission.sequence);
                tx.send(emission).await.unwrap();
            }
        }
        let backend = driver.shutdown();
        assert_eq!(backend.releases(), 1);

        drop(tx);
        let metrics = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher_handle)
            .await
            .expect("dispatcher drained")
            .unwrap();

        assert!(!sequences.is_empty());
        for (name, snapshot) in &metrics {
            assert_eq!(snapshot.written, sequences.len() as u64, "sink {name}");
            assert_eq!(snapshot.failed, 0);
        }

        let last = *sequences.last().unwrap();
        let stem = format!("{last:06}");
        assert!(dir.path().join("msis").join(format!("{stem}.png")).exists());
        assert!(dir
            .path()
            .join("msis")
            .join("shader")
            .join(format!("{stem}.png"))
            .exists());
        let json = dir
            .path()
            .join("msis")
            .join("beams_fls")
            .join(format!("{stem}.json"));
        let ret: SonarReturn = serde_json::from_reader(File::open(json).unwrap()).unwrap();
        assert_eq!(ret.beam_count, 16);
        assert_eq!(ret.bin_count, 32);

        let summary = aggregator.summary();
        assert_eq!(summary.total_ticks, 50);
        assert_eq!(summary.total_emissions, sequences.len() as u64);
    }
}

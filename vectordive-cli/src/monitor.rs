use anyhow::Result;
use log::{info, warn};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{MissedTickBehavior, interval},
};
use vectordive_core::{ActuatorSample, DeadReckoningEstimator, SampleOrigin};
use vectordive_link::{ConnectionParameters, TelemetryLink};

use crate::{config::GroundStationConfig, readout::ThrusterReadout};

/// Runs the estimator and actuator ticks on one task until `q` or Ctrl-C.
pub async fn monitor(config: &GroundStationConfig, params: ConnectionParameters) -> Result<()> {
    let link = TelemetryLink::open(params, config.link_config()?).await;

    let mut estimator = DeadReckoningEstimator::new(link);
    estimator.set_poll_timeout(config.inertial_poll_timeout());

    let mut estimator_tick = interval(config.estimator_period()?);
    estimator_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut actuator_tick = interval(config.actuator_period()?);
    actuator_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut actuators = ActuatorSample::default();

    info!("commands: r = reset integration, q = quit");
    loop {
        tokio::select! {
            _ = estimator_tick.tick() => {
                estimator.update().await;
                log_estimate(&estimator);
            }
            _ = actuator_tick.tick() => {
                let timeout = config.actuator_poll_timeout();
                if let Some(sample) = estimator.source_mut().poll_actuator(timeout).await {
                    actuators = sample;
                }
                log_thrusters(&actuators);
            }
            line = stdin.next_line(), if stdin_open => match line? {
                Some(line) => match line.trim() {
                    "r" => {
                        estimator.reset_integration();
                        info!("integration reset");
                    }
                    "q" => break,
                    "" => {}
                    other => warn!("unknown command {:?}", other),
                },
                None => stdin_open = false,
            },
            _ = &mut ctrl_c => break,
        }
    }

    estimator.source_mut().disconnect();
    Ok(())
}

fn log_estimate(estimator: &DeadReckoningEstimator<TelemetryLink>) {
    let position = estimator.get_current_position();
    let velocity = estimator.get_current_velocity();
    let status = match estimator.last_sample_origin() {
        Some(SampleOrigin::Live) => "connected",
        _ if estimator.source().is_connected() => "connected, no fresh sample",
        _ => "using mock data",
    };

    info!(
        "[{}] position ({:.2}, {:.2}, {:.2}) m, distance {:.2} m | velocity ({:.2}, {:.2}, {:.2}) m/s, speed {:.2} m/s",
        status,
        position.x,
        position.y,
        position.z,
        position.norm(),
        velocity.x,
        velocity.y,
        velocity.z,
        velocity.norm(),
    );
}

fn log_thrusters(actuators: &ActuatorSample) {
    let readouts = ThrusterReadout::all(actuators)
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>();
    info!("thrusters: {}", readouts.join("  "));
}

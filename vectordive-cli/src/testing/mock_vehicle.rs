use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use log::{info, warn};
use mavlink::common::{
    HEARTBEAT_DATA, MavAutopilot, MavMessage, MavState, MavType, RAW_IMU_DATA,
    SERVO_OUTPUT_RAW_DATA,
};
use tokio::{
    net::UdpSocket,
    time::{Instant, interval},
};
use vectordive_core::{MILLI_G_TO_MS2, generate_mock_sample};
use vectordive_link::FrameEncoder;

use crate::args::MockVehicleArgs;

const VEHICLE_SYSTEM_ID: u8 = 1;
const AUTOPILOT_COMPONENT_ID: u8 = 1;
const MAX_RATE_HZ: f64 = 1000.0;

/// Sends RAW_IMU at the requested rate, plus HEARTBEAT and SERVO_OUTPUT_RAW
/// once a second. The acceleration follows the same synthetic profile the
/// estimator falls back to.
pub async fn mock_vehicle(args: MockVehicleArgs) -> Result<()> {
    let period = tick_period(args.rate)?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let mut encoder = FrameEncoder::new(VEHICLE_SYSTEM_ID, AUTOPILOT_COMPONENT_ID);
    let mut tick = interval(period);
    let per_second = (args.rate.round() as u64).max(1);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("sending mock telemetry to {} at {} Hz", args.target, args.rate);
    let start = Instant::now();
    let mut count = 0u64;
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut ctrl_c => break,
        }

        let t = start.elapsed().as_secs_f64();
        let mut messages = vec![raw_imu(t)];
        if count % per_second == 0 {
            messages.push(heartbeat());
            messages.push(servo_output(t));
        }
        count += 1;

        for message in messages {
            let frame = encoder.encode(&message)?;
            if let Err(e) = socket.send_to(&frame, args.target).await {
                warn!("failed to send frame: {}", e);
            }
        }
    }

    info!("sent {} inertial frames", count);
    Ok(())
}

fn tick_period(rate: f64) -> Result<Duration> {
    if !(rate > 0.0 && rate <= MAX_RATE_HZ) {
        bail!("rate must be in (0, {}] Hz, got {}", MAX_RATE_HZ, rate);
    }
    Ok(Duration::from_secs_f64(1.0 / rate))
}

fn heartbeat() -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        mavtype: MavType::MAV_TYPE_SUBMARINE,
        autopilot: MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
        ..Default::default()
    })
}

fn raw_imu(t: f64) -> MavMessage {
    let accel = generate_mock_sample(t).accel / MILLI_G_TO_MS2;
    let time_usec = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or_default();

    MavMessage::RAW_IMU(RAW_IMU_DATA {
        time_usec,
        xacc: accel.x.round() as i16,
        yacc: accel.y.round() as i16,
        zacc: accel.z.round() as i16,
        ..Default::default()
    })
}

/// Slow sweep of every thruster around neutral, phase shifted per channel.
fn servo_output(t: f64) -> MavMessage {
    let pulse = |channel: usize| (1500.0 + 300.0 * (0.2 * t + channel as f64).sin()) as u16;

    MavMessage::SERVO_OUTPUT_RAW(SERVO_OUTPUT_RAW_DATA {
        time_usec: (t * 1e6) as u32,
        servo1_raw: pulse(0),
        servo2_raw: pulse(1),
        servo3_raw: pulse(2),
        servo4_raw: pulse(3),
        servo5_raw: pulse(4),
        servo6_raw: pulse(5),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_must_be_usable_as_a_tick() {
        assert_eq!(tick_period(50.0).unwrap(), Duration::from_millis(20));
        assert_eq!(tick_period(MAX_RATE_HZ).unwrap(), Duration::from_millis(1));

        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY, 2e9] {
            assert!(tick_period(rate).is_err(), "rate {} accepted", rate);
        }
    }

    #[test]
    fn imu_frames_carry_the_mock_profile() {
        let MavMessage::RAW_IMU(imu) = raw_imu(0.0) else {
            panic!("expected RAW_IMU");
        };
        // 0.2 m/s² ≈ 20 mG
        assert_eq!(imu.xacc, 20);
        assert_eq!(imu.yacc, 10);
        assert_eq!(imu.zacc, 5);
    }

    #[test]
    fn servo_sweep_stays_in_thruster_range() {
        for i in 0..100 {
            let MavMessage::SERVO_OUTPUT_RAW(servo) = servo_output(i as f64) else {
                panic!("expected SERVO_OUTPUT_RAW");
            };
            for raw in [servo.servo1_raw, servo.servo4_raw, servo.servo6_raw] {
                assert!((1200..=1800).contains(&raw));
            }
        }
    }
}

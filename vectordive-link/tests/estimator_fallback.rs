use std::{cell::Cell, net::Ipv4Addr, rc::Rc, time::Duration};

use approx::assert_relative_eq;
use nalgebra::Vector3;
use vectordive_core::{Clock, DeadReckoningEstimator, SampleOrigin, generate_mock_sample};
use vectordive_link::{ConnectionMode, ConnectionParameters, LinkConfig, TelemetryLink};

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<f64>>);

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

fn free_port() -> u16 {
    std::net::UdpSocket::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Nobody is sending, so the link fails and every tick integrates the
/// synthetic profile instead.
#[tokio::test]
async fn silent_vehicle_falls_back_to_mock_motion() {
    let params =
        ConnectionParameters::new(Ipv4Addr::LOCALHOST, free_port(), ConnectionMode::Udp).unwrap();
    let link = TelemetryLink::open(
        params,
        LinkConfig {
            heartbeat_timeout: Duration::from_millis(50),
        },
    )
    .await;
    assert!(!link.is_connected());

    let clock = ManualClock::default();
    let mut estimator = DeadReckoningEstimator::with_clock(link, clock.clone());

    for t in [0.0, 0.1, 0.2] {
        clock.0.set(t);
        estimator.update().await;
        assert_eq!(estimator.last_sample_origin(), Some(SampleOrigin::Mock));
    }

    let dt = 0.1;
    let a: Vec<Vector3<f64>> = [0.0, 0.1, 0.2]
        .iter()
        .map(|&t| generate_mock_sample(t).accel)
        .collect();
    let v1 = (a[0] + a[1]) / 2.0 * dt;
    let p1 = v1 / 2.0 * dt;
    let v2 = v1 + (a[1] + a[2]) / 2.0 * dt;
    let p2 = p1 + (v2 + v1) / 2.0 * dt;

    assert_relative_eq!(estimator.get_current_velocity(), v2, epsilon = 1e-12);
    assert_relative_eq!(estimator.get_current_position(), p2, epsilon = 1e-12);

    let history = estimator.position_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.timestamps().collect::<Vec<_>>(), vec![0.1, 0.2]);
}

use log::{debug, trace};
use mavlink::{
    MavHeader, Message,
    common::{MavMessage, RAW_IMU_DATA, SERVO_OUTPUT_RAW_DATA},
    error::{MessageReadError, MessageWriteError},
    peek_reader::PeekReader,
};
use vectordive_core::{ActuatorSample, InertialSample};

const MAV_STX_V1: u8 = 0xFE;
const MAV_STX_V2: u8 = 0xFD;
const MAX_FRAMES_PER_DATAGRAM: usize = 16;

/// The subset of inbound MAVLink traffic the ground station cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    Heartbeat { system_id: u8 },
    Inertial(InertialSample),
    Actuator(ActuatorSample),
    Other { message_id: u32 },
}

impl From<(MavHeader, MavMessage)> for TelemetryMessage {
    fn from((header, message): (MavHeader, MavMessage)) -> Self {
        match message {
            MavMessage::HEARTBEAT(_) => TelemetryMessage::Heartbeat {
                system_id: header.system_id,
            },
            MavMessage::RAW_IMU(imu) => TelemetryMessage::Inertial(inertial_from_raw_imu(&imu)),
            MavMessage::SERVO_OUTPUT_RAW(servo) => {
                TelemetryMessage::Actuator(actuator_from_servo_output(&servo))
            }
            other => TelemetryMessage::Other {
                message_id: other.message_id(),
            },
        }
    }
}

pub fn inertial_from_raw_imu(imu: &RAW_IMU_DATA) -> InertialSample {
    InertialSample::from_raw(
        [imu.xacc, imu.yacc, imu.zacc],
        [imu.xgyro, imu.ygyro, imu.zgyro],
        [imu.xmag, imu.ymag, imu.zmag],
        imu.time_usec,
    )
}

/// Channels 7 and up are not thrusters on this vehicle and are dropped.
pub fn actuator_from_servo_output(servo: &SERVO_OUTPUT_RAW_DATA) -> ActuatorSample {
    ActuatorSample::new([
        servo.servo1_raw,
        servo.servo2_raw,
        servo.servo3_raw,
        servo.servo4_raw,
        servo.servo5_raw,
        servo.servo6_raw,
    ])
}

/// Decodes every MAVLink frame in one UDP datagram. Frames that fail to
/// parse are skipped; the rest of the datagram is still read.
pub fn decode_datagram(datagram: &[u8]) -> Vec<TelemetryMessage> {
    let mut messages = Vec::new();

    let v2 = match datagram.first() {
        Some(&MAV_STX_V2) => true,
        Some(&MAV_STX_V1) => false,
        Some(other) => {
            debug!("dropping datagram with unexpected start byte 0x{:02x}", other);
            return messages;
        }
        None => return messages,
    };

    let mut reader = PeekReader::new(datagram);
    for _ in 0..MAX_FRAMES_PER_DATAGRAM {
        let frame = if v2 {
            mavlink::read_v2_msg::<MavMessage, _>(&mut reader)
        } else {
            mavlink::read_v1_msg::<MavMessage, _>(&mut reader)
        };

        match frame {
            Ok(frame) => messages.push(frame.into()),
            Err(MessageReadError::Io(_)) => break,
            Err(e) => debug!("dropping malformed frame: {:?}", e),
        }
    }

    trace!("decoded {} frame(s) from {} bytes", messages.len(), datagram.len());
    messages
}

/// Serialises outbound frames with a running sequence number. Only used to
/// emulate a vehicle; the ground station itself never transmits.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    system_id: u8,
    component_id: u8,
    sequence: u8,
}

impl FrameEncoder {
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
        }
    }

    pub fn encode(&mut self, message: &MavMessage) -> Result<Vec<u8>, MessageWriteError> {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);

        let mut frame = Vec::new();
        mavlink::write_v2_msg(&mut frame, header, message)?;
        Ok(frame)
    }
}

// Serial link, server, topics, chassis geometry
use std::time::Duration;

// Serial port the robot's radio/USB bridge shows up on
pub const SERIAL_PORT: &str = "/dev/cu.usbserial-AL02L3L9";

// Fixed baud rate of the robot link
pub const SERIAL_BAUD_RATE: u32 = 57_600;

// Write timeout for the serial link
pub const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

// HTTP control endpoint
pub const BIND_ADDR: &str = "127.0.0.1:3000";
pub const SERVER_URL: &str = "http://127.0.0.1:3000/";

// Zenoh topic carrying {"command": "<c>"} payloads
pub const TOPIC_CMD_DRIVE: &str = "robot/cmd/drive";

// Chassis geometry, in diagram units (view box is 0..1000 on both axes)
pub const CHASSIS_CENTER: (f64, f64) = (500.0, 500.0);
pub const CHASSIS_HALF_EXTENT: f64 = 122.0 / 2.0;
pub const WHEEL_OFFSET: f64 = 30.0;

// Below this distance from the center the speed divisor is clamped
pub const MIN_CENTER_DISTANCE: f64 = 150.0;

// Pointer target shown before the user points anywhere
pub const DEFAULT_TARGET: (f64, f64) = (110.0, 400.0);

// Teleop: a key counts as held this long after its first press, which must
// cover the OS initial auto-repeat delay (typically 250..660ms)
pub const KEY_INITIAL_HOLD: Duration = Duration::from_millis(700);

// Teleop: once repeating, a key counts as held this long after its last repeat
pub const KEY_REPEAT_HOLD: Duration = Duration::from_millis(150);

// Teleop: terminal poll period (50Hz)
pub const POLL_PERIOD: Duration = Duration::from_millis(20);

// Teleop: pointer target step for arrow keys
pub const TARGET_STEP: f64 = 10.0;

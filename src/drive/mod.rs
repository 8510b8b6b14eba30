// Drive logic for the arc-drive remote
//
// Provides:
// - Arc-drive kinematics (pointer target -> per-wheel steering and speed)
// - Discrete drive commands and keyboard/pointer input aggregation

pub mod command;
pub mod kinematics;

pub use command::{CommandError, Control, DriveCommand, InputSource, InputState, encode};
pub use kinematics::{ArcDrive, Chassis, Point2D, Wheel, angle_difference, create_wheel};

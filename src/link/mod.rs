// Links between the operator and the robot
//
// Provides:
// - Serial link: the server's single-byte write to the robot
// - Transports: the client's fire-and-forget delivery of commands to the server

pub mod serial;
pub mod transport;

pub use serial::{LinkError, SerialLink};
pub use transport::{CommandSink, HttpTransport, TransportError, ZenohTransport};

// Serial link stand-ins shared by the integration tests
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use arc_drive_remote::drive::Chassis;
use arc_drive_remote::link::SerialLink;
use arc_drive_remote::server::AppState;

/// Records every byte written to the robot
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serial device that went away
pub struct Unplugged;

impl Write for Unplugged {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "device gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn state(writer: impl Write + Send + 'static) -> AppState {
    AppState::new(SerialLink::from_writer(writer, "test"), Chassis::default())
}

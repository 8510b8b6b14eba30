// Operator-side application state
//
// Owns the only mutable state of the remote: which controls are held, where
// the pointer is, and which command is active. Every input goes through a
// transition function; a changed command is forwarded to the sink exactly once
// (edge-triggered), and the wheel solution is recomputed from the target.

use tracing::{debug, info};

use crate::drive::{
    ArcDrive, Chassis, Control, DriveCommand, InputSource, InputState, Point2D, encode,
};
use crate::link::CommandSink;

pub struct Controller<S: CommandSink> {
    chassis: Chassis,
    input: InputState,
    target: Point2D,
    active: DriveCommand,
    sink: S,
}

impl<S: CommandSink> Controller<S> {
    pub fn new(chassis: Chassis, target: Point2D, sink: S) -> Self {
        Self {
            chassis,
            input: InputState::new(),
            target,
            active: DriveCommand::Stop, // Robot assumed idle until first input
            sink,
        }
    }

    pub fn active_command(&self) -> DriveCommand {
        self.active
    }

    pub fn target(&self) -> Point2D {
        self.target
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Press a control; returns the new command if it changed
    pub fn press(&mut self, control: Control, source: InputSource) -> Option<DriveCommand> {
        self.input.press(control, source);
        self.reevaluate()
    }

    /// Release a control; returns the new command if it changed
    pub fn release(&mut self, control: Control, source: InputSource) -> Option<DriveCommand> {
        self.input.release(control, source);
        self.reevaluate()
    }

    /// Release everything held by one source (focus lost, touch cancelled, quitting)
    pub fn release_source(&mut self, source: InputSource) -> Option<DriveCommand> {
        self.input.release_source(source);
        self.reevaluate()
    }

    /// Move the pointer target and return the new wheel solution
    pub fn point_at(&mut self, target: Point2D) -> ArcDrive {
        self.target = target;
        self.wheels()
    }

    /// Wheel solution for the current target
    pub fn wheels(&self) -> ArcDrive {
        self.chassis.arc_drive(self.target)
    }

    /// Recompute the command; transmit only on a transition
    pub fn reevaluate(&mut self) -> Option<DriveCommand> {
        let command = encode(&self.input);
        if command == self.active {
            debug!("Command unchanged: {}", command);
            return None;
        }

        info!("Active command: {} -> {}", self.active, command);
        self.active = command;
        self.sink.send(command);
        Some(command)
    }
}

// Keyboard teleop: q w e / a d / z s c drive, x rotate, arrows move the arc target, Esc quit
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
};
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arc_drive_remote::config::{
    DEFAULT_TARGET, POLL_PERIOD, SERVER_URL, TARGET_STEP, TOPIC_CMD_DRIVE,
};
use arc_drive_remote::controller::Controller;
use arc_drive_remote::drive::{ArcDrive, Chassis, Control, InputSource, Point2D};
use arc_drive_remote::hold::KeyHold;
use arc_drive_remote::link::{CommandSink, HttpTransport, ZenohTransport};

// Time left for in-flight commands before exit
const DRAIN_DELAY: Duration = Duration::from_millis(200);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    Http,
    Zenoh,
}

/// Drive the robot from the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Control server endpoint
    #[arg(long, default_value = SERVER_URL)]
    url: String,

    /// How commands reach the server
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    let sink: Box<dyn CommandSink> = match args.transport {
        Transport::Http => Box::new(HttpTransport::new(&args.url)),
        Transport::Zenoh => Box::new(ZenohTransport::open(TOPIC_CMD_DRIVE).await?),
    };
    let mut controller = Controller::new(Chassis::default(), DEFAULT_TARGET.into(), sink);

    info!("Controls: q/w/e a/d z/s/c=drive, x=rotate, arrows=move arc target, Esc=quit");
    log_wheels(&controller.wheels());

    enable_raw_mode()?;
    // Real key-up events where the terminal supports them, hold timeout otherwise
    let reports_release = supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let result = run_teleop(&mut controller, reports_release);

    if reports_release {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;

    controller.release_source(InputSource::Keyboard);
    tokio::time::sleep(DRAIN_DELAY).await;

    result
}

fn run_teleop<S: CommandSink>(
    controller: &mut Controller<S>,
    reports_release: bool,
) -> Result<(), BoxError> {
    let mut hold = KeyHold::default();

    loop {
        if event::poll(POLL_PERIOD)? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code, kind, modifiers, ..
                }) => {
                    let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                    match code {
                        // Quit
                        KeyCode::Esc => break,
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,

                        // Drive controls
                        KeyCode::Char(key) => {
                            if let Some(control) = Control::from_key(key) {
                                if pressed {
                                    hold.seen(control, Instant::now());
                                    controller.press(control, InputSource::Keyboard);
                                } else {
                                    hold.release(control);
                                    controller.release(control, InputSource::Keyboard);
                                }
                            }
                        }

                        // Arc target
                        KeyCode::Left if pressed => nudge_target(controller, -TARGET_STEP, 0.0),
                        KeyCode::Right if pressed => nudge_target(controller, TARGET_STEP, 0.0),
                        KeyCode::Up if pressed => nudge_target(controller, 0.0, -TARGET_STEP),
                        KeyCode::Down if pressed => nudge_target(controller, 0.0, TARGET_STEP),

                        _ => {}
                    }
                }
                Event::FocusLost => {
                    hold.clear();
                    controller.release_source(InputSource::Keyboard);
                }
                _ => {}
            }
        }

        // Without key-up events a key counts as released once it goes quiet
        if !reports_release {
            for control in hold.expire(Instant::now()) {
                controller.release(control, InputSource::Keyboard);
            }
        }
    }

    Ok(())
}

fn nudge_target<S: CommandSink>(controller: &mut Controller<S>, dx: f64, dy: f64) {
    let target = controller.target() + Point2D::new(dx, dy);
    let drive = controller.point_at(target);
    log_wheels(&drive);
}

fn log_wheels(drive: &ArcDrive) {
    info!("Target: ({:.0}, {:.0})", drive.target.x, drive.target.y);
    for (name, wheel) in ["FL", "FR", "RL", "RR"].iter().zip(&drive.wheels) {
        info!(
            "  {}: steer={:+.1}° speed={:+.3}",
            name,
            wheel.steering_angle.to_degrees(),
            wheel.speed
        );
    }
}

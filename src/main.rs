use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arc_drive_remote::config::{BIND_ADDR, SERIAL_BAUD_RATE, SERIAL_PORT, TOPIC_CMD_DRIVE};
use arc_drive_remote::drive::Chassis;
use arc_drive_remote::link::SerialLink;
use arc_drive_remote::server::{self, AppState};

/// Robot control server: POST / {"command": "w"} writes `w` to the robot's serial link
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Serial device of the robot link
    #[arg(long, default_value = SERIAL_PORT)]
    port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = SERIAL_BAUD_RATE)]
    baud: u32,

    /// Address to listen on
    #[arg(long, default_value = BIND_ADDR)]
    bind: String,

    /// Log commands instead of opening the serial device
    #[arg(long)]
    simulate: bool,

    /// Also accept commands published on the zenoh command topic
    #[arg(long)]
    zenoh: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let link = if args.simulate {
        SerialLink::simulated()
    } else {
        SerialLink::open_with_baudrate(&args.port, args.baud)?
    };
    let state = AppState::new(link, Chassis::default());

    if args.zenoh {
        let bridge_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = server::bridge_zenoh(TOPIC_CMD_DRIVE, bridge_state).await {
                error!("Zenoh bridge stopped: {}", e);
            }
        });
    }

    info!("Serial link: {}", if args.simulate { "simulated" } else { args.port.as_str() });
    server::serve(&args.bind, state).await
}

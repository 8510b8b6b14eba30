// SVG rendering of an arc-drive solution, and the control page around it
// Pure functions of the kinematics output; view box is 0..1000 on both axes.

use std::f64::consts::TAU;
use std::fmt::{self, Write};

use crate::drive::{ArcDrive, Chassis, DriveCommand, Point2D};

pub const VIEW_SIZE: f64 = 1000.0;

// Shape sizes in diagram units
const WHEEL_SIZE: (f64, f64) = (12.0, 52.0);
const HUB_SIZE: (f64, f64) = (8.0, 20.0);
const CHASSIS_SIZE: (f64, f64) = (168.0, 70.0);
const MARKER_RADIUS: f64 = 2.5;

// Length of a full-speed velocity line
const VELOCITY_SCALE: f64 = 80.0;

const DEGREES_PER_RADIAN: f64 = 360.0 / TAU;

// Control grid: (command shown as active, control key or None, label)
const GRID: [[(DriveCommand, Option<char>, &str); 3]; 3] = [
    [
        (DriveCommand::NorthWest, Some('q'), "⬉"),
        (DriveCommand::North, Some('w'), "⬆"),
        (DriveCommand::NorthEast, Some('e'), "⬈"),
    ],
    [
        (DriveCommand::West, Some('a'), "⟲"),
        (DriveCommand::Stop, None, "&nbsp;"),
        (DriveCommand::East, Some('d'), "⟳"),
    ],
    [
        (DriveCommand::SouthWest, Some('z'), "⬋"),
        (DriveCommand::South, Some('s'), "↓"),
        (DriveCommand::SouthEast, Some('c'), "⬊"),
    ],
];

// Keyboard and cell presses go to POST /input; clicks on the diagram move the target
const PAGE_SCRIPT: &str = r#"
const active = document.getElementById('active');
const cells = document.querySelectorAll('td[data-command]');
function show(command) {
  active.textContent = `'${command}'`;
  cells.forEach(cell => cell.classList.toggle('pressed', cell.dataset.command === command));
}
function send(control, source, pressed) {
  fetch('/input', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ control, source, pressed }),
  })
    .then(response => response.json())
    .then(reply => show(reply.active))
    .catch(console.error);
}
const keys = 'qweadzscx';
const down = new Set();
window.addEventListener('keydown', ({ key }) => {
  if (keys.includes(key) && !down.has(key)) {
    down.add(key);
    send(key, 'keyboard', true);
  }
});
window.addEventListener('keyup', ({ key }) => {
  if (down.delete(key)) {
    send(key, 'keyboard', false);
  }
});
document.querySelectorAll('td[data-control]').forEach(cell => {
  const control = cell.dataset.control;
  let held = false;
  const press = event => { event.preventDefault(); held = true; send(control, 'pointer', true); };
  const release = event => {
    event.preventDefault();
    if (held) { held = false; send(control, 'pointer', false); }
  };
  cell.addEventListener('mousedown', press);
  cell.addEventListener('touchstart', press);
  cell.addEventListener('mouseup', release);
  cell.addEventListener('mouseleave', release);
  cell.addEventListener('touchend', release);
});
document.querySelector('svg').addEventListener('click', event => {
  const rect = event.currentTarget.getBoundingClientRect();
  const scale = 1000 / rect.width;
  const x = Math.round((event.clientX - rect.left) * scale);
  const y = Math.round((event.clientY - rect.top) * scale);
  location.search = `?x=${x}&y=${y}`;
});
"#;

const PAGE_STYLE: &str = "\
.controller-table td { width: 64px; height: 64px; text-align: center; font-size: 32px; \
border: 1px solid black; user-select: none; }
.controller-table td.pressed { background: lightblue; }
";

/// Rectangle centered on `center`, rotated by `theta` radians
fn rotated_rect(
    out: &mut impl Write,
    center: Point2D,
    (width, height): (f64, f64),
    theta: f64,
    fill: &str,
) -> fmt::Result {
    writeln!(
        out,
        r#"  <rect x="{x:.3}" y="{y:.3}" width="{width}" height="{height}" fill="{fill}" stroke="black" stroke-width="1" transform="rotate({deg:.3}, {x:.3}, {y:.3}) translate({tx}, {ty})"/>"#,
        x = center.x,
        y = center.y,
        deg = theta * DEGREES_PER_RADIAN,
        tx = -width / 2.0,
        ty = -height / 2.0,
    )
}

fn line(out: &mut impl Write, from: Point2D, to: Point2D, stroke: &str) -> fmt::Result {
    writeln!(
        out,
        r#"  <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-width="1"/>"#,
        from.x, from.y, to.x, to.y, stroke
    )
}

fn marker(out: &mut impl Write, at: Point2D, fill: &str) -> fmt::Result {
    writeln!(
        out,
        r#"  <circle cx="{:.3}" cy="{:.3}" r="{}" fill="{}" stroke="black" stroke-width="1"/>"#,
        at.x, at.y, MARKER_RADIUS, fill
    )
}

/// Draw wheels, hubs, chassis, target and the velocity of every wheel
pub fn render_svg(out: &mut impl Write, chassis: &Chassis, drive: &ArcDrive) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size} {size}" width="{size}" height="{size}" style="border: 1px solid black">"#,
        size = VIEW_SIZE
    )?;

    for wheel in &drive.wheels {
        rotated_rect(out, wheel.contact, WHEEL_SIZE, wheel.steering_angle, "gray")?;
    }
    rotated_rect(out, chassis.center, CHASSIS_SIZE, 0.0, "wheat")?;
    for wheel in &drive.wheels {
        rotated_rect(out, wheel.axle, HUB_SIZE, wheel.steering_angle, "lightblue")?;
    }

    marker(out, drive.target, "red")?;
    for wheel in &drive.wheels {
        line(out, drive.target, wheel.axle, "black")?;
    }

    // Wheels roll along their long axis, square to the line to the target
    for wheel in &drive.wheels {
        let heading = wheel.steering_angle + TAU / 4.0;
        let velocity =
            Point2D::new(heading.cos(), heading.sin()) * (wheel.speed * VELOCITY_SCALE);
        line(out, wheel.contact, wheel.contact + velocity, "blue")?;
    }

    writeln!(out, "</svg>")
}

fn control_grid(out: &mut impl Write, active: DriveCommand) -> fmt::Result {
    writeln!(out, r#"<table class="controller-table"><tbody>"#)?;
    for row in &GRID {
        write!(out, "  <tr>")?;
        for &(command, key, label) in row {
            let class = if command == active { r#" class="pressed""# } else { "" };
            match key {
                Some(key) => write!(
                    out,
                    r#"<td data-command="{}" data-control="{}"{}>{}</td>"#,
                    command.as_char(),
                    key,
                    class,
                    label
                )?,
                None => write!(
                    out,
                    r#"<td data-command="{}"{}>{}</td>"#,
                    command.as_char(),
                    class,
                    label
                )?,
            }
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody></table>")
}

/// Control page: active command, press grid, arc diagram
pub fn render_page(
    out: &mut impl Write,
    chassis: &Chassis,
    drive: &ArcDrive,
    active: DriveCommand,
) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html><head><meta charset="utf-8"><title>Robot remote</title>"#)?;
    writeln!(out, "<style>{}</style></head><body>", PAGE_STYLE)?;
    writeln!(out, r#"<h1>Active command: <span id="active">{}</span></h1>"#, active)?;
    control_grid(out, active)?;

    let speeds: Vec<String> = drive.speeds().iter().map(|s| format!("{:+.3}", s)).collect();
    writeln!(
        out,
        "<p>Target: ({:.1}, {:.1}) wheel speeds: {}</p>",
        drive.target.x,
        drive.target.y,
        speeds.join(" ")
    )?;
    render_svg(out, chassis, drive)?;
    writeln!(out, "<script>{}</script>", PAGE_SCRIPT)?;
    writeln!(out, "</body></html>")
}

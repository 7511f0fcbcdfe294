//! Terminal rendering of a session snapshot
//!
//! Includes the Bloch-sphere projection: the deterministic mapping from
//! a qubit's orientation to 2D viewport coordinates. The projection has
//! no dependency on the session protocol; it is pure math consumed by
//! the rendering code below.

use qt_protocol::{BlochState, LocalView, SessionSnapshot};

/// Viewport edge length, in abstract units.
pub const VIEW_SIZE: f64 = 180.0;

/// Sphere radius inside the viewport.
pub const SPHERE_RADIUS: f64 = 68.0;

/// Camera tilt, radians.
pub const TILT: f64 = 0.45;

/// Camera yaw, radians.
pub const YAW: f64 = 0.32;

/// How many trailing log lines the interactive view shows.
const LOG_TAIL: usize = 6;

/// A Bloch vector projected onto the viewport plane. `depth` is the
/// camera-space z component; negative means the vector points into the
/// back hemisphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Project a Bloch vector onto a 2D viewport.
///
/// Spherical to Cartesian (radius clamped to [0, 1]), yaw rotation about
/// the vertical axis, then tilt foreshortening into viewport
/// coordinates centered on `center`.
pub fn project(state: &BlochState, radius: f64, tilt: f64, yaw: f64, center: f64) -> ProjectedPoint {
    let r = state.radius.clamp(0.0, 1.0);
    let x = state.theta.sin() * state.phi.cos() * r;
    let y = state.theta.sin() * state.phi.sin() * r;
    let z = state.theta.cos() * r;

    let rot_x = x * yaw.cos() - y * yaw.sin();
    let rot_y = x * yaw.sin() + y * yaw.cos();

    ProjectedPoint {
        x: center + rot_x * radius,
        y: center - (rot_y * tilt.cos() - z * tilt.sin()) * radius,
        depth: z,
    }
}

/// Project with the default camera.
pub fn project_default(state: &BlochState) -> ProjectedPoint {
    project(state, SPHERE_RADIUS, TILT, YAW, VIEW_SIZE / 2.0)
}

/// Render a snapshot for the interactive view.
pub fn render_session(snapshot: &SessionSnapshot, local: Option<&LocalView>) -> String {
    let mut out = String::new();

    out.push_str(&format!("session {}\n", snapshot.id));

    for (index, step) in snapshot.steps.iter().enumerate() {
        let marker = if index == snapshot.step_index { ">" } else { " " };
        out.push_str(&format!("{} [{}] {}\n", marker, step.key, step.title));
    }

    out.push_str("participants:\n");
    for participant in snapshot.participants.values() {
        let claim = if participant.taken { "taken" } else { "open" };
        let link = if participant.connected {
            "connected"
        } else {
            "offline"
        };
        out.push_str(&format!(
            "  {:<6} {:<6} {}\n",
            participant.role.as_str(),
            claim,
            link
        ));
    }

    out.push_str("qubits:\n");
    for qubit in &snapshot.qubits {
        let point = project_default(&qubit.bloch);
        out.push_str(&format!(
            "  {} ({:<6}) {:<22} -> ({:.1}, {:.1})\n",
            qubit.id,
            qubit.role.as_str(),
            qubit.state,
            point.x,
            point.y
        ));
    }

    if let Some(local) = local {
        out.push_str(&format!("you are {}: {}\n", local.role, local.state));
    }

    let skip = snapshot.log.len().saturating_sub(LOG_TAIL);
    for line in snapshot.log.iter().skip(skip) {
        out.push_str(&format!("  | {}\n", line));
    }

    out
}

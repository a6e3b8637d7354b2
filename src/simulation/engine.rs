//! High-level runtime engine settings
//!
//! Selects the integrator, motion mode (time step), Barnes–Hut opening angle
//! and the optional parallel / diagnostics passes used by a `Scenario`

use serde::Deserialize;

use crate::simulation::error::ConfigError;
use crate::simulation::integrator::IntegratorKind;

pub const DEFAULT_THETA: f64 = 1.0;
pub const SLOW_MOTION_DT: f64 = 0.001;
pub const FAST_MOTION_DT: f64 = 0.1;

/// Time dilation mode; exactly one is active at a time
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "slow")]
    Slow,
    #[serde(rename = "fast")]
    Fast,
}

impl MotionMode {
    /// Step size for this mode; `normal_dt` is the configured normal step
    pub fn dt(self, normal_dt: f64) -> f64 {
        match self {
            MotionMode::Normal => normal_dt,
            MotionMode::Slow => SLOW_MOTION_DT,
            MotionMode::Fast => FAST_MOTION_DT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorKind, // leapfrog or rk4
    pub motion: MotionMode, // normal, slow or fast
    pub theta: f64, // opening angle for the MAC
    pub parallel: bool, // evaluate forces on the rayon pool
    pub diagnostics: bool, // track potential energy (second tree walk)
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::Leapfrog,
            motion: MotionMode::Normal,
            theta: DEFAULT_THETA,
            parallel: false,
            diagnostics: false,
        }
    }
}

impl Engine {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(ConfigError::InvalidTheta(self.theta));
        }
        Ok(())
    }

    /// Slow motion on/off; switching it on turns fast motion off
    pub fn toggle_slow_motion(&mut self) {
        self.motion = match self.motion {
            MotionMode::Slow => MotionMode::Normal,
            _ => MotionMode::Slow,
        };
    }

    /// Fast motion on/off; switching it on turns slow motion off
    pub fn toggle_fast_motion(&mut self) {
        self.motion = match self.motion {
            MotionMode::Fast => MotionMode::Normal,
            _ => MotionMode::Fast,
        };
    }
}

//! Effects stacked on clips and transitions attached to clip edges.

use reelkit_core::MediaTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EditError;
use crate::id::{EffectId, TransitionId};

/// Category of a clip effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    ColorCorrection,
    ColorGrading,
    Blur,
    Sharpen,
    Distortion,
    Glow,
    Shadow,
    Keying,
    Masking,
    Transform,
    TimeRemap,
    Stabilization,
    NoiseReduction,
    Animation,
    Particle,
    TextAnimation,
    Custom,
}

/// A control point on a parameter curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

/// Effect parameter value.
///
/// `Opaque` carries parameters of effect kinds this build does not know yet,
/// so they survive a save/load cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Color([f32; 4]),
    Curve(Vec<CurvePoint>),
    Text(String),
    Opaque(Vec<u8>),
}

/// Ordered parameter map. Ordering keeps serialized output stable.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// An effect in a clip's stack. Stack order is render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub params: ParamMap,
    /// Blend amount in `[0, 1]`
    pub intensity: f32,
    pub enabled: bool,
}

impl Effect {
    /// Create an enabled effect at full intensity with no parameters.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            id: EffectId::new(),
            kind,
            params: ParamMap::new(),
            intensity: 1.0,
            enabled: true,
        }
    }

    /// Set a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Set the intensity. Not clamped; out-of-range values are refused when stacked.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Check the intensity range.
    pub fn validate(&self) -> Result<(), EditError> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(EditError::InvalidEffect(format!(
                "intensity {} is outside [0, 1]",
                self.intensity
            )));
        }
        Ok(())
    }
}

/// Kind of transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Cut,
    Dissolve,
    Fade,
    Wipe,
    Slide,
    Push,
    Zoom,
    Rotate,
    Morph,
    Glitch,
    Custom,
}

/// Which boundary of a clip a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipEdge {
    /// The clip's first frame.
    Head,
    /// The clip's last frame.
    Tail,
}

/// A transition attached to a clip boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub edge: ClipEdge,
    pub duration: MediaTime,
    pub params: ParamMap,
}

impl Transition {
    /// Create a transition on the given edge.
    pub fn new(kind: TransitionKind, edge: ClipEdge, duration: MediaTime) -> Self {
        Self {
            id: TransitionId::new(),
            kind,
            edge,
            duration,
            params: ParamMap::new(),
        }
    }
}

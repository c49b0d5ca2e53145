//! Keyframe timelines and easing for the cosmetic layers
//!
//! Nothing here feeds back into collision math; these curves only decide how
//! beams and particle floats look at a given time.

use serde::{Deserialize, Serialize};

/// Easing applied to each keyframe segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// cubic-bezier(0.42, 0, 0.58, 1)
    EaseInOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
        }
    }
}

/// Evaluate a CSS-style cubic Bézier timing curve at progress `x`
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    // Curve through (0,0), (x1,y1), (x2,y2), (1,1)
    let bezier = |t: f32, p1: f32, p2: f32| {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    };

    // x(t) is monotonic for x1, x2 in [0, 1]
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    let mut t = x;
    for _ in 0..32 {
        let current = bezier(t, x1, x2);
        if (current - x).abs() < 1e-6 {
            break;
        }
        if current < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    bezier(t, y1, y2)
}

/// Piecewise-linear map from `inputs` to `outputs`, clamped at both ends
///
/// `inputs` must be ascending and the same length as `outputs`.
pub fn interpolate(inputs: &[f32], outputs: &[f32], x: f32) -> f32 {
    debug_assert_eq!(inputs.len(), outputs.len());
    let n = inputs.len().min(outputs.len());
    if n == 0 {
        return 0.0;
    }
    if x.is_nan() || x <= inputs[0] {
        return outputs[0];
    }
    if x >= inputs[n - 1] {
        return outputs[n - 1];
    }

    for i in 0..n - 1 {
        let (a, b) = (inputs[i], inputs[i + 1]);
        if x <= b {
            let span = b - a;
            let t = if span > 0.0 { (x - a) / span } else { 1.0 };
            return outputs[i] + (outputs[i + 1] - outputs[i]) * t;
        }
    }
    outputs[n - 1]
}

/// Evenly spaced keyframes played over `duration`, looping forever
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframes<const N: usize> {
    pub values: [f32; N],
    /// Seconds for one pass through all keyframes
    pub duration: f32,
    /// Seconds before the first pass starts (holds the first value)
    pub delay: f32,
    /// Seconds between passes (holds the last value)
    pub repeat_delay: f32,
    pub easing: Easing,
}

impl<const N: usize> Keyframes<N> {
    pub fn new(values: [f32; N], duration: f32) -> Self {
        Self {
            values,
            duration,
            delay: 0.0,
            repeat_delay: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_repeat_delay(mut self, repeat_delay: f32) -> Self {
        self.repeat_delay = repeat_delay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Value at `time` seconds since the timeline started
    pub fn sample(&self, time: f32) -> f32 {
        if N == 0 {
            return 0.0;
        }
        if N == 1 || time < self.delay {
            return self.values[0];
        }
        if self.duration <= 0.0 {
            return self.values[N - 1];
        }

        let cycle = self.duration + self.repeat_delay.max(0.0);
        let phase = (time - self.delay).rem_euclid(cycle);
        if phase >= self.duration {
            return self.values[N - 1];
        }

        let segments = (N - 1) as f32;
        let pos = phase / self.duration * segments;
        let index = (pos.floor() as usize).min(N - 2);
        let frac = self.easing.apply(pos - index as f32);
        let (a, b) = (self.values[index], self.values[index + 1]);
        a + (b - a) * frac
    }
}

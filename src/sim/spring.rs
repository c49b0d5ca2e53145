//! Damped spring smoothing
//!
//! A mass-spring-damper integrated with RK4 once per frame. Unlike a fixed
//! tween, velocity carries over when the target moves, so a pointer that
//! changes direction mid-flight bends the trajectory instead of restarting it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Physical parameters of a spring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Distance from target below which the spring may come to rest
    #[serde(default = "default_rest_delta")]
    pub rest_delta: f32,
    /// Speed below which the spring may come to rest
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f32,
}

fn default_rest_delta() -> f32 {
    0.01
}

fn default_rest_speed() -> f32 {
    0.01
}

impl SpringConfig {
    pub fn new(mass: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            mass,
            stiffness,
            damping,
            rest_delta: default_rest_delta(),
            rest_speed: default_rest_speed(),
        }
    }

    /// Heavy follow for the reveal panel
    pub fn panel() -> Self {
        Self::new(0.5, 150.0, 20.0)
    }

    /// Slow drift for particle display offsets
    pub fn particle() -> Self {
        Self::new(1.0, 25.0, 25.0)
    }

    /// Quick settle for dock icon sizes
    pub fn dock() -> Self {
        Self::new(0.1, 150.0, 12.0)
    }

    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// damping / critical damping; >= 1 means no oscillation
    pub fn damping_ratio(&self) -> f32 {
        self.damping / self.critical_damping()
    }

    pub fn is_valid(&self) -> bool {
        self.mass > 0.0 && self.stiffness > 0.0 && self.damping >= 0.0
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::panel()
    }
}

/// A scalar spring tracking a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Teleport to `value` and stop
    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let (x, v) = (self.value, self.velocity);

        let k1_v = self.acceleration(x, v);
        let k1_x = v;

        let k2_v = self.acceleration(x + k1_x * dt * 0.5, v + k1_v * dt * 0.5);
        let k2_x = v + k1_v * dt * 0.5;

        let k3_v = self.acceleration(x + k2_x * dt * 0.5, v + k2_v * dt * 0.5);
        let k3_x = v + k2_v * dt * 0.5;

        let k4_v = self.acceleration(x + k3_x * dt, v + k3_v * dt);
        let k4_x = v + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

/// Two independent springs sharing one config (x and y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring2 {
    pub x: Spring,
    pub y: Spring,
}

impl Spring2 {
    pub fn new(config: SpringConfig, initial: Vec2) -> Self {
        Self {
            x: Spring::new(config, initial.x),
            y: Spring::new(config, initial.y),
        }
    }

    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.x.target(), self.y.target())
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn jump(&mut self, value: Vec2) {
        self.x.jump(value.x);
        self.y.jump(value.y);
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }

    pub fn step(&mut self, dt: f32) {
        self.x.step(dt);
        self.y.step(dt);
    }
}

use na::RealField;

use crate::math::Velocity;
use crate::object::{Body, BodyStatus, SleepMaterial};

/// A simple body: a status, a velocity, and sleep bookkeeping.
#[derive(Clone, Debug)]
pub struct Particle<N: RealField> {
    status: BodyStatus,
    velocity: Velocity<N>,
    smoothed_velocity: Velocity<N>,
    sleep_material: Option<SleepMaterial<N>>,
    sleeping: bool,
}

impl<N: RealField> Particle<N> {
    /// Creates an awake particle at rest with the given status and the default sleep material.
    pub fn new(status: BodyStatus) -> Self {
        Particle {
            status,
            velocity: Velocity::zero(),
            smoothed_velocity: Velocity::zero(),
            sleep_material: Some(SleepMaterial::default()),
            sleeping: false,
        }
    }

    /// Creates a dynamic particle.
    pub fn new_dynamic() -> Self {
        Self::new(BodyStatus::Dynamic)
    }

    /// Creates a static particle.
    pub fn new_static() -> Self {
        Self::new(BodyStatus::Static)
    }

    /// Creates a kinematic particle.
    pub fn new_kinematic() -> Self {
        Self::new(BodyStatus::Kinematic)
    }

    /// Sets the status of this particle.
    pub fn set_status(&mut self, status: BodyStatus) {
        self.status = status
    }

    /// The last velocity given to this particle, before smoothing.
    pub fn raw_velocity(&self) -> &Velocity<N> {
        &self.velocity
    }

    /// Sets the velocity of this particle, resetting its smoothed velocity too.
    pub fn set_velocity(&mut self, velocity: Velocity<N>) {
        self.velocity = velocity;
        self.smoothed_velocity = velocity;
    }

    /// Sets the velocity of this particle, blending it into the smoothed velocity.
    ///
    /// `mix_factor` is the weight of the new velocity in the running average.
    pub fn integrate_velocity(&mut self, velocity: Velocity<N>, mix_factor: N) {
        self.velocity = velocity;
        self.smoothed_velocity = self.smoothed_velocity.mix(&velocity, mix_factor);
    }

    /// Sets the sleep thresholds of this particle.
    ///
    /// A value of `None` prevents it from sleeping.
    pub fn set_sleep_material(&mut self, material: Option<SleepMaterial<N>>) {
        self.sleep_material = material
    }
}

impl<N: RealField> Body<N> for Particle<N> {
    #[inline]
    fn status(&self) -> BodyStatus {
        self.status
    }

    #[inline]
    fn velocity(&self) -> &Velocity<N> {
        &self.smoothed_velocity
    }

    #[inline]
    fn sleep_material(&self) -> Option<&SleepMaterial<N>> {
        self.sleep_material.as_ref()
    }

    #[inline]
    fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    fn set_sleeping(&mut self, sleeping: bool) {
        if sleeping && self.is_dynamic() {
            self.velocity = Velocity::zero();
            self.smoothed_velocity = Velocity::zero();
        }

        self.sleeping = sleeping
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tag value generation.
//!
//! One exhaustive match over [`ValueType`] produces the next value for a tag
//! from its declared type, numeric bounds and optional drifting anchor.
//! The generator is a pure function of its inputs and the RNG state; whether
//! a generated value becomes the new anchor (random-walk mode) is the
//! scheduler's decision, not the generator's.

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::catalog::{TagValue, ValueType};

/// Length of generated text values.
const TEXT_VALUE_LEN: usize = 10;

/// Errors raised while generating a value. Caught per tag inside a scheduler
/// shard; the tag is skipped for that tick only.
#[derive(Error, Debug)]
pub enum ValueGenerationError {
    #[error("malformed range: min {min} exceeds max {max}")]
    MalformedRange { min: f64, max: f64 },
    #[error("negative perturbation step {0}")]
    NegativeStep(f64),
}

/// Random value source for tag updates.
///
/// Defaults to OS entropy; [`ValueGenerator::with_seed`] gives a
/// deterministic sequence for tests.
pub struct ValueGenerator {
    rng: StdRng,
}

impl ValueGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce the next value for a tag.
    ///
    /// * Without a base value (or without a step), numeric types draw
    ///   uniformly from `[min, max]`, Boolean flips a coin and Text yields a
    ///   fixed-length alphanumeric string (bounds ignored).
    /// * With a base value and a step, numeric types perturb the base by
    ///   `uniform(-step, step)` and clamp into `[min, max]`.
    /// * A degenerate range (`min == max`, e.g. the 0/0 alarm setpoints)
    ///   yields the single valid value; it is never an error.
    pub fn next(
        &mut self,
        value_type: ValueType,
        min: f64,
        max: f64,
        base_value: Option<f64>,
        step: Option<f64>,
    ) -> Result<TagValue, ValueGenerationError> {
        if let Some(step) = step {
            if step < 0.0 {
                return Err(ValueGenerationError::NegativeStep(step));
            }
        }

        let value = match value_type {
            // Bounds are meaningless for these two and are ignored entirely
            ValueType::Boolean => TagValue::Boolean(self.rng.random_bool(0.5)),
            ValueType::Text => TagValue::Text(self.random_text()),
            ValueType::Int32 => {
                if min > max {
                    return Err(ValueGenerationError::MalformedRange { min, max });
                }
                TagValue::Int32(self.next_int(min, max, base_value, step))
            }
            float => {
                if min > max {
                    return Err(ValueGenerationError::MalformedRange { min, max });
                }
                let candidate = match (base_value, step) {
                    (Some(base), Some(step)) => (base + self.jitter(step)).clamp(min, max),
                    _ => self.uniform(min, max),
                };
                match float {
                    ValueType::Float32 => TagValue::Float32(candidate as f32),
                    ValueType::Float64 => TagValue::Float64(round2(candidate)),
                    _ => unreachable!("remaining types handled above"),
                }
            }
        };
        Ok(value)
    }

    /// Integer generation over the integer window contained in `[min, max]`.
    /// Rounding alone could step past a fractional bound (e.g. 1.7 → 2 with
    /// max 1.79), so candidates are clamped back into the window.
    fn next_int(&mut self, min: f64, max: f64, base_value: Option<f64>, step: Option<f64>) -> i32 {
        let lo = min.ceil() as i32;
        let hi = max.floor() as i32;
        if lo > hi {
            // No integer lies inside the range; serve the nearest bound
            return min.round() as i32;
        }
        match (base_value, step) {
            (Some(base), Some(step)) => {
                let candidate = (base + self.jitter(step)).clamp(min, max);
                (candidate.round() as i32).clamp(lo, hi)
            }
            _ => {
                if lo == hi {
                    lo
                } else {
                    self.rng.random_range(lo..=hi)
                }
            }
        }
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if min == max {
            min
        } else {
            self.rng.random_range(min..=max)
        }
    }

    fn jitter(&mut self, step: f64) -> f64 {
        if step == 0.0 {
            0.0
        } else {
            self.rng.random_range(-step..=step)
        }
    }

    fn random_text(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(TEXT_VALUE_LEN)
            .map(char::from)
            .collect()
    }
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

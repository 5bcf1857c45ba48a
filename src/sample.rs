//! Sample conditioning and the pressure arithmetic.
//!
//! Everything here is pure; the driver feeds it ADC words.

/// Largest pressure estimate [`touch_pressure`] reports before treating the
/// reading as a blow-up. There is no lower bound: z2 < z1 gives a negative
/// estimate.
pub const MAX_PRESSURE: i32 = 0xFFFF;

/// Widen an ADC word of `bits` resolution to the full 16 bit range by
/// replicating its top bits into the low end, so full scale maps to
/// `0xFFFF`. Words of 16 bits or more pass through untouched.
pub fn widen(value: u16, bits: u8) -> u16 {
    if bits >= 16 {
        return value;
    }
    let bits = u32::from(bits.max(8));
    let value = u32::from(value) & ((1 << bits) - 1);
    ((value << (16 - bits)) | (value >> (2 * bits - 16))) as u16
}

/// Two consecutive samples agree when they differ by at most `tolerance`.
#[inline]
pub fn within_tolerance(s0: u16, s1: u16, tolerance: u16) -> bool {
    s0.abs_diff(s1) <= tolerance
}

/// Floor of the mean of two samples.
#[inline]
pub fn average(s0: u16, s1: u16) -> u16 {
    ((u32::from(s0) + u32::from(s1)) >> 1) as u16
}

/// Plain pressure reading: `0xFFFF - (z2 - z1)` with 16 bit wrap-around, so
/// a smaller plate difference reads as a firmer touch.
#[inline]
pub fn raw_pressure(z1: u16, z2: u16) -> u16 {
    u16::MAX.wrapping_sub(z2.wrapping_sub(z1))
}

/// Touch resistance estimate from the z1/z2 ratio.
///
/// `x` is the sum of the two 10 bit x samples (`0..=2046`) and `x_plate_ohms`
/// the resistance of the x-plate. See [`clamp_pressure`] for the range rules.
pub fn touch_pressure(z1: u16, z2: u16, x: i32, x_plate_ohms: u16) -> i32 {
    let ratio = f32::from(z2) / f32::from(z1);
    let half_span = (2046 - x) / 2;
    let rtouch = (ratio - 1.0) * half_span as f32 * f32::from(x_plate_ohms) / 1024.0;
    clamp_pressure(rtouch)
}

/// Truncate toward zero first, then turn anything above `MAX_PRESSURE` into
/// 0. The infinities and NaN of `z1 == 0` are also 0.
pub fn clamp_pressure(rtouch: f32) -> i32 {
    if !rtouch.is_finite() {
        return 0;
    }
    let z = rtouch as i32;
    if z > MAX_PRESSURE {
        0
    } else {
        z
    }
}

/// Running mean that drops the single smallest and largest sample.
#[derive(Debug, Clone, Copy)]
pub struct TrimmedMean {
    sum: u32,
    min: u16,
    max: u16,
    count: u32,
}

impl Default for TrimmedMean {
    fn default() -> Self {
        Self::new()
    }
}

impl TrimmedMean {
    pub const fn new() -> Self {
        Self {
            sum: 0,
            min: u16::MAX,
            max: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, sample: u16) {
        self.sum += u32::from(sample);
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
        self.count += 1;
    }

    /// Mean of the samples left after trimming. With fewer than three
    /// samples nothing would be left, so the plain mean is returned.
    pub fn mean(&self) -> u16 {
        match self.count {
            0 => 0,
            1 | 2 => (self.sum / self.count) as u16,
            n => ((self.sum - u32::from(self.min) - u32::from(self.max)) / (n - 2)) as u16,
        }
    }
}

use strum_macros::Display;

/// Errors that can occur while mapping a value between two ranges.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ScaleError {
    /// The input range has zero width, so no mapping exists.
    DegenerateRange,
    /// The mapped value does not fit into the requested output type.
    OutOfDomain,
}

impl std::error::Error for ScaleError {}

/// Linearly maps `input` from `[input_min, input_max]` to `[output_min, output_max]`.
///
/// The result is converted into `T` by truncation toward zero. With `clamp` set,
/// `input` is first limited to the input range, which also keeps the result inside
/// the output range. Either range may be given in descending order.
///
/// # Arguments
/// * `input_min`, `input_max` – Bounds of the source range.
/// * `input` – The value to map.
/// * `output_min`, `output_max` – Bounds of the destination range.
/// * `clamp` – Whether `input` is limited to the source range before mapping.
///
/// # Errors
/// * [`ScaleError::DegenerateRange`] if `input_min == input_max`.
/// * [`ScaleError::OutOfDomain`] if the mapped value is not finite or not
///   representable in `T`.
#[allow(clippy::float_cmp)]
pub fn scale<T: num::NumCast>(
    input_min: f64,
    input_max: f64,
    input: f64,
    output_min: f64,
    output_max: f64,
    clamp: bool,
) -> Result<T, ScaleError> {
    if input_max == input_min {
        return Err(ScaleError::DegenerateRange);
    }
    let value = if clamp {
        input.clamp(input_min.min(input_max), input_min.max(input_max))
    } else {
        input
    };
    let mapped =
        (value - input_min) / (input_max - input_min) * (output_max - output_min) + output_min;
    if !mapped.is_finite() {
        return Err(ScaleError::OutOfDomain);
    }
    num::NumCast::from(mapped.trunc()).ok_or(ScaleError::OutOfDomain)
}

/// Clamped [`scale`] into a single byte, the resolution used by most frame fields.
pub fn scale_to_byte(input_min: f64, input_max: f64, input: f64) -> Result<u8, ScaleError> {
    scale(input_min, input_max, input, 0.0, f64::from(u8::MAX), true)
}

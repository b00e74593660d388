mod scale;

#[cfg(test)]
mod tests;

pub use scale::{ScaleError, scale, scale_to_byte};

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

#[derive(Debug, Clone, PartialEq, Copy, Default)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Self {
        Number(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_int(&self) -> bool {
        (self.0 - self.0.trunc()).abs() < f64::EPSILON
    }

    /// The value as an index, if it is a non-negative integer.
    pub fn as_index(&self) -> Option<usize> {
        (self.is_int() && self.0 >= 0.0).then_some(self.0 as usize)
    }
}

impl Neg for Number {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Number(-self.0)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value as f64)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number(value as f64)
    }
}

impl From<u8> for Number {
    fn from(value: u8) -> Self {
        Number(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_int() {
            write!(f, "{}", self.0 as i64)
        } else {
            let s = format!("{:.6}", self.0);
            let s = s.trim_end_matches('0').trim_end_matches('.');
            write!(f, "{}", s)
        }
    }
}

impl Add for Number {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Number(self.0 + other.0)
    }
}

impl Sub for Number {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Number(self.0 - other.0)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::int(Number::new(42.0), "42")]
    #[case::negative(Number::new(-3.0), "-3")]
    #[case::fraction(Number::new(1.5), "1.5")]
    #[case::trailing_zeros(Number::new(0.25), "0.25")]
    fn test_display(#[case] number: Number, #[case] expected: &str) {
        assert_eq!(number.to_string(), expected);
    }

    #[rstest]
    #[case::zero(Number::new(0.0), Some(0))]
    #[case::positive(Number::new(2.0), Some(2))]
    #[case::fraction(Number::new(1.5), None)]
    #[case::negative(Number::new(-1.0), None)]
    fn test_as_index(#[case] number: Number, #[case] expected: Option<usize>) {
        assert_eq!(number.as_index(), expected);
    }
}

//! Pixelwise boolean operations on masks
//!
//! Two-operand operations require equal dimensions. A mismatch is logged and
//! yields an all-zero mask the size of the first operand.

use splice_core::Mask;
use tracing::warn;

fn combine(op: &str, a: &Mask, b: &Mask, f: impl Fn(bool, bool) -> bool) -> Mask {
    match a.zip_map(b, |x, y| f(x != 0, y != 0) as u8) {
        Ok(out) => out,
        Err(e) => {
            warn!(op, %e, "mask size mismatch");
            Mask::new_like(a)
        }
    }
}

/// Pixels set in exactly one of the two masks
pub fn xor(a: &Mask, b: &Mask) -> Mask {
    combine("xor", a, b, |x, y| x != y)
}

/// Symmetric difference; same as [`xor`]
pub fn difference(a: &Mask, b: &Mask) -> Mask {
    xor(a, b)
}

/// Union
pub fn or(a: &Mask, b: &Mask) -> Mask {
    combine("or", a, b, |x, y| x || y)
}

/// Intersection
pub fn and(a: &Mask, b: &Mask) -> Mask {
    combine("and", a, b, |x, y| x && y)
}

/// Pixels of `a` not set in `b`
pub fn subtract(a: &Mask, b: &Mask) -> Mask {
    combine("subtract", a, b, |x, y| x && !y)
}

/// Complement
pub fn not(mask: &Mask) -> Mask {
    mask.map(|v| (v == 0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Mask, Mask) {
        let a = Mask::from_vec(2, 2, vec![1, 1, 0, 0]).unwrap();
        let b = Mask::from_vec(2, 2, vec![1, 0, 1, 0]).unwrap();
        (a, b)
    }

    #[test]
    fn test_binary_ops() {
        let (a, b) = pair();
        assert_eq!(xor(&a, &b).data(), &[0, 1, 1, 0]);
        assert_eq!(or(&a, &b).data(), &[1, 1, 1, 0]);
        assert_eq!(and(&a, &b).data(), &[1, 0, 0, 0]);
        assert_eq!(subtract(&a, &b).data(), &[0, 1, 0, 0]);
        assert_eq!(not(&a).data(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_nonbinary_values_count_as_set() {
        let a = Mask::from_vec(2, 1, vec![255, 0]).unwrap();
        let b = Mask::from_vec(2, 1, vec![1, 0]).unwrap();
        assert_eq!(xor(&a, &b).data(), &[0, 0]);
    }

    #[test]
    fn test_size_mismatch_yields_zeros() {
        let a = Mask::filled(3, 2, 1).unwrap();
        let b = Mask::filled(2, 2, 1).unwrap();
        let out = difference(&a, &b);
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.is_blank());
    }
}

use crate::common::*;

/// The height and width of an image or a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw(hw: [T; 2]) -> Result<Self> {
        let [h, w] = hw;
        let zero = T::zero();
        ensure!(
            h >= zero && w >= zero,
            "height and width parameters must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn from_hw(hw: [T; 2]) -> Self {
        Self::try_from_hw(hw).unwrap()
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn is_empty(&self) -> bool {
        self.h == T::zero() || self.w == T::zero()
    }

    /// The side of the largest square that fits in.
    pub fn min_side(&self) -> T {
        if self.h <= self.w {
            self.h
        } else {
            self.w
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn min_side_test() {
        assert_abs_diff_eq!(HW::from_hw([3.0, 2.0]).min_side(), 2.0);
        assert_eq!(HW::from_hw([5, 9]).min_side(), 5);
        assert!(HW::from_hw([0, 9]).is_empty());
    }

    #[test]
    fn negative_size() {
        assert!(HW::try_from_hw([-1, 2]).is_err());
    }
}

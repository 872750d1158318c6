use super::{Rect, RectNum, HW};
use crate::common::*;

/// Bounding box in TLBR format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TLBR<T> {
    pub(crate) t: T,
    pub(crate) l: T,
    pub(crate) b: T,
    pub(crate) r: T,
}

impl<T> TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Clip the box into the `[0, h] x [0, w]` image region.
    ///
    /// It fails if nothing of the box is left inside the image.
    pub fn clamp_to(&self, size: &HW<T>) -> Result<Self> {
        let image = TLBR::from_tlhw([T::zero(), T::zero(), size.h(), size.w()]);
        match self.intersect_with(&image) {
            Some(clipped) => Ok(clipped),
            None => bail!("the box lies outside of the image region"),
        }
    }
}

impl<T> Rect for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> Self::Type {
        self.t
    }

    fn l(&self) -> Self::Type {
        self.l
    }

    fn b(&self) -> Self::Type {
        self.b
    }

    fn r(&self) -> Self::Type {
        self.r
    }

    fn h(&self) -> Self::Type {
        self.b - self.t
    }

    fn w(&self) -> Self::Type {
        self.r - self.l
    }

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self> {
        let [t, l, b, r] = tlbr;
        ensure!(b >= t && r >= l, "b >= t and r >= l must hold");

        Ok(Self { t, l, b, r })
    }

    fn try_from_tlhw(tlhw: [Self::Type; 4]) -> Result<Self> {
        let [t, l, h, w] = tlhw;
        let b = t + h;
        let r = l + w;
        Self::try_from_tlbr([t, l, b, r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlbr_rejects_inverted_box() {
        assert!(TLBR::try_from_tlbr([10, 0, 5, 4]).is_err());
        assert!(TLBR::try_from_tlbr([0, 8, 5, 4]).is_err());
    }

    #[test]
    fn tlbr_clamp_to_image() {
        let size = HW::from_hw([100, 80]);

        let inside = TLBR::from_tlbr([10, 10, 20, 30]);
        assert_eq!(inside.clamp_to(&size).unwrap(), inside);

        let overflow = TLBR::from_tlbr([-5, 60, 120, 95]);
        let clamped = overflow.clamp_to(&size).unwrap();
        assert_eq!(clamped.tlbr(), [0, 60, 100, 80]);

        let outside = TLBR::from_tlbr([101, 0, 140, 10]);
        assert!(outside.clamp_to(&size).is_err());
    }
}

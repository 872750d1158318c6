use super::{HW, TLBR};
use crate::common::*;

/// The generic rectangle.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_tlhw(tlhw: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd + Copy,
{
    fn from_tlbr(tlbr: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlbr(tlbr).unwrap()
    }

    fn from_tlhw(tlhw: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlhw(tlhw).unwrap()
    }

    fn tlbr(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    fn tlhw(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.h(), self.w()]
    }

    fn hw(&self) -> HW<Self::Type> {
        HW::from_hw([self.h(), self.w()])
    }

    /// Compute the overlapping region, or `None` if the rectangles do not overlap.
    fn intersect_with<R>(&self, other: &R) -> Option<TLBR<Self::Type>>
    where
        R: Rect<Type = Self::Type>,
    {
        let t = partial_max(self.t(), other.t());
        let l = partial_max(self.l(), other.l());
        let b = partial_min(self.b(), other.b());
        let r = partial_min(self.r(), other.r());
        (b > t && r > l).then(|| TLBR::from_tlbr([t, l, b, r]))
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd + Copy,
{
}

fn partial_max<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if lhs >= rhs {
        lhs
    } else {
        rhs
    }
}

fn partial_min<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if lhs <= rhs {
        lhs
    } else {
        rhs
    }
}

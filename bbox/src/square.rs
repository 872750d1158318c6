use super::{Rect, RectNum, TLBR};
use crate::common::*;

/// The placement of a square crop inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CropMode {
    /// The square shares the top-left corner with the box.
    TopLeft,
    /// The square is centered in the box.
    Center,
}

impl Default for CropMode {
    fn default() -> Self {
        Self::TopLeft
    }
}

impl<T> TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    /// The largest square inside the box, where the side is the shorter box side.
    pub fn square_crop(&self, mode: CropMode) -> Self {
        let side = self.hw().min_side();

        let (t, l) = match mode {
            CropMode::TopLeft => (self.t(), self.l()),
            CropMode::Center => {
                let two = T::one() + T::one();
                let t = self.t() + (self.h() - side) / two;
                let l = self.l() + (self.w() - side) / two;
                (t, l)
            }
        };

        TLBR::from_tlhw([t, l, side, side])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_crop_top_left() {
        // wide box
        let rect = TLBR::from_tlbr([10, 20, 50, 120]);
        let square = rect.square_crop(CropMode::TopLeft);
        assert_eq!(square.tlhw(), [10, 20, 40, 40]);

        // tall box
        let rect = TLBR::from_tlbr([0, 0, 90, 30]);
        let square = rect.square_crop(CropMode::TopLeft);
        assert_eq!(square.tlhw(), [0, 0, 30, 30]);
    }

    #[test]
    fn square_crop_center() {
        let rect = TLBR::from_tlbr([10, 20, 50, 120]);
        let square = rect.square_crop(CropMode::Center);
        assert_eq!(square.tlhw(), [10, 50, 40, 40]);
        assert!(square.intersect_with(&rect).is_some());
    }

    #[test]
    fn square_crop_is_inside_box() {
        let rect = TLBR::from_tlbr([3.0, 7.0, 11.5, 9.0]);
        for mode in [CropMode::TopLeft, CropMode::Center] {
            let square = rect.square_crop(mode);
            assert_eq!(square.h(), square.w());
            assert!(square.t() >= rect.t() && square.b() <= rect.b());
            assert!(square.l() >= rect.l() && square.r() <= rect.r());
        }
    }
}

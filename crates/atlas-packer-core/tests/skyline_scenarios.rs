use atlas_packer_core::config::SkylinePicker;
use atlas_packer_core::model::Frame;
use atlas_packer_core::packer::PlacementAlgorithm;
use atlas_packer_core::packer::skyline::SkylinePlacement;
use atlas_packer_core::progress::CancelToken;
use atlas_packer_core::sort::HeightWidthDescending;

fn squares(n: usize, side: i32) -> Vec<Frame<String>> {
    (0..n).map(|i| Frame::sized(format!("s{i}"), side, side)).collect()
}

#[test]
fn single_row_keeps_input_order() {
    let frames = squares(10, 64);
    let mut p = SkylinePlacement::new();
    let out = p
        .place(1000, 64, &frames, &CancelToken::new())
        .unwrap()
        .expect("ten squares fit in one row");

    assert_eq!((out.width, out.height), (1000, 64));
    for (i, f) in out.frames.iter().enumerate() {
        assert_eq!(f.key, format!("s{i}"));
        assert_eq!((f.rect.left, f.rect.top), (i as i32 * 64, 0));
        assert_eq!((f.width(), f.height()), (64, 64));
    }
}

#[test]
fn seventeenth_square_does_not_fit() {
    let mut p = SkylinePlacement::new();
    let out = p.place(256, 256, &squares(17, 64), &CancelToken::new()).unwrap();
    assert!(out.is_none());

    let out = p
        .place(256, 256, &squares(16, 64), &CancelToken::new())
        .unwrap()
        .expect("sixteen squares tile the box");
    assert_eq!(out.used_area(), out.area());
    assert!(out.is_disjoint());
}

#[test]
fn every_picker_respects_the_box() {
    let sizes = [(40, 30), (20, 50), (60, 10), (30, 30), (10, 10), (45, 25), (15, 40), (35, 5)];
    let frames: Vec<Frame<usize>> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Frame::sized(i, w, h))
        .collect();
    for picker in [SkylinePicker::MinWaste, SkylinePicker::FirstFit, SkylinePicker::BottomLeft] {
        let mut p = SkylinePlacement::with(Box::new(HeightWidthDescending), picker.build());
        let out = p
            .place(128, 128, &frames, &CancelToken::new())
            .unwrap()
            .unwrap_or_else(|| panic!("{picker:?} failed to place"));
        assert_eq!(out.frames.len(), sizes.len());
        assert!(out.is_disjoint(), "{picker:?} overlaps");
        assert!(out.fits_within(), "{picker:?} leaves the box");
    }
}

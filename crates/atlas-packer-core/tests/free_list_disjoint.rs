use atlas_packer_core::config::{GuillotineChoice, GuillotineSplit};
use atlas_packer_core::model::{Frame, Rect};
use atlas_packer_core::packer::PlacementAlgorithm;
use atlas_packer_core::packer::guillotine::GuillotinePlacement;
use atlas_packer_core::packer::strategies::{FreeListInvariant, FreeRectStrategies};
use atlas_packer_core::progress::CancelToken;
use atlas_packer_core::sort::HeightWidthDescending;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frames(seed: u64, count: usize, min: i32, max: i32) -> Vec<Frame<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min..=max);
            let h = rng.gen_range(min..=max);
            Frame::sized(format!("r{i}"), w, h)
        })
        .collect()
}

fn assert_valid(p: &mut GuillotinePlacement, frames: &[Frame<String>], label: &str) {
    let out = p
        .place(1024, 1024, frames, &CancelToken::new())
        .unwrap()
        .unwrap_or_else(|| panic!("{label}: expected a placement"));
    assert_eq!(out.frames.len(), frames.len(), "{label}");
    assert!(out.is_disjoint(), "{label}: overlapping frames");
    assert!(out.fits_within(), "{label}: frame outside the box");
    assert!(out.width <= 1024 && out.height <= 1024, "{label}");
    assert_eq!(out.bounds(), (out.width, out.height), "{label}: not a tight box");
}

#[test]
fn maxrects_disjoint_on_random_sets() {
    for seed in 0..8 {
        let frames = random_frames(seed, 60, 8, 96);
        assert_valid(&mut GuillotinePlacement::max_rects(), &frames, &format!("seed {seed}"));
    }
}

#[test]
fn guillotine_disjoint_for_every_heuristic() {
    let choices = [
        GuillotineChoice::BestAreaFit,
        GuillotineChoice::BestShortSideFit,
        GuillotineChoice::BestLongSideFit,
        GuillotineChoice::WorstAreaFit,
        GuillotineChoice::WorstShortSideFit,
        GuillotineChoice::WorstLongSideFit,
    ];
    let splits = [
        GuillotineSplit::SplitShorterLeftoverAxis,
        GuillotineSplit::SplitLongerLeftoverAxis,
        GuillotineSplit::SplitMinimizeArea,
        GuillotineSplit::SplitMaximizeArea,
        GuillotineSplit::SplitShorterAxis,
        GuillotineSplit::SplitLongerAxis,
    ];
    let frames = random_frames(42, 40, 8, 64);
    for choice in choices {
        for split in splits {
            let mut p =
                GuillotinePlacement::guillotine_with(Box::new(HeightWidthDescending), choice, split);
            assert_valid(&mut p, &frames, &format!("{choice:?}/{split:?}"));
        }
    }
}

#[test]
fn maxrects_fills_exact_tiling() {
    let frames: Vec<Frame<usize>> = (0..16).map(|i| Frame::sized(i, 32, 32)).collect();
    let mut p = GuillotinePlacement::max_rects();
    let out = p
        .place(128, 128, &frames, &CancelToken::new())
        .unwrap()
        .expect("sixteen 32px squares tile 128x128");
    assert_eq!((out.width, out.height), (128, 128));
    assert_eq!(out.used_area(), out.area());
    assert!(out.is_disjoint());
}

#[test]
fn guillotine_reports_infeasible_box() {
    let frames = vec![Frame::sized("a", 60, 60), Frame::sized("b", 60, 60)];
    let mut p = GuillotinePlacement::guillotine();
    assert!(p.place(100, 100, &frames, &CancelToken::new()).unwrap().is_none());
    let mut p = GuillotinePlacement::max_rects();
    assert!(p.place(100, 100, &frames, &CancelToken::new()).unwrap().is_none());
}

#[test]
fn maxrects_keeps_free_list_free_of_contained_entries() {
    let s = FreeRectStrategies::max_rects();
    assert_eq!(s.invariant, FreeListInvariant::NonContained);

    let mut free = vec![Rect::new(0, 0, 256, 256)];
    let mut placed: Vec<Rect> = Vec::new();
    for f in random_frames(11, 40, 8, 48) {
        let (w, h) = s.orientation.select(f.width(), f.height());
        let Some(idx) = s.extractor.extract(&free, w, h) else {
            break;
        };
        let host = free[idx];
        let rect = Rect::new(host.left, host.top, w, h);
        let residue = s.splitter.split(&host, &rect);
        s.merger.merge(&mut free, idx, residue);
        s.post_processor.post_process(&mut free, &rect);
        placed.push(rect);

        assert!(FreeListInvariant::NonContained.holds(&free), "after {} placements", placed.len());
        assert!(free.windows(2).all(|w| w[0].area() <= w[1].area()));
        assert!(
            free.iter().all(|fr| placed.iter().all(|p| !fr.intersects(p))),
            "free rect overlaps a placed one"
        );
    }
    assert!(placed.len() > 10);
}

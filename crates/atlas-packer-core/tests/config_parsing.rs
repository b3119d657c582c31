use atlas_packer_core::config::{
    Algorithm, GuillotineChoice, GuillotineSplit, PackerConfig, SkylinePicker, SortOrder,
};
use atlas_packer_core::error::PackError;

#[test]
fn short_aliases_parse() {
    assert_eq!("bl".parse::<Algorithm>(), Ok(Algorithm::BottomLeft));
    assert_eq!("MaxRects".parse::<Algorithm>(), Ok(Algorithm::MaxRects));
    assert_eq!("skyline".parse::<Algorithm>(), Ok(Algorithm::Skyline));
    assert!("auto".parse::<Algorithm>().is_err());

    assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::HeightWidthDesc));
    assert_eq!("none".parse::<SortOrder>(), Ok(SortOrder::Preserve));
    assert_eq!("bssf".parse::<GuillotineChoice>(), Ok(GuillotineChoice::BestShortSideFit));
    assert_eq!("minas".parse::<GuillotineSplit>(), Ok(GuillotineSplit::SplitMinimizeArea));
    assert_eq!("ff".parse::<SkylinePicker>(), Ok(SkylinePicker::FirstFit));
}

#[test]
fn json_round_trip_and_defaults() {
    let cfg = PackerConfig::builder()
        .algorithm(Algorithm::Guillotine)
        .g_choice(GuillotineChoice::WorstAreaFit)
        .seed(Some(5))
        .build();
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("\"algorithm\":\"guillotine\""));
    let back: PackerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);

    let partial: PackerConfig =
        serde_json::from_str(r#"{"algorithm":"max_rects","population":4}"#).unwrap();
    assert_eq!(partial.algorithm, Algorithm::MaxRects);
    assert_eq!(partial.population, 4);
    assert_eq!(partial.generations, PackerConfig::default().generations);
    assert_eq!(partial.skyline_picker, SkylinePicker::MinWaste);
}

#[test]
fn validate_rejects_bad_finder_parameters() {
    assert!(PackerConfig::default().validate().is_ok());

    let bad = [
        PackerConfig::builder().population(1).build(),
        PackerConfig::builder().generations(-3).build(),
        PackerConfig::builder().mutation_rate(1.5).build(),
        PackerConfig::builder().crossover_rate(-0.1).build(),
    ];
    for cfg in bad {
        assert!(matches!(cfg.validate(), Err(PackError::InvalidConfig(_))), "{cfg:?}");
    }
}

#[test]
fn factories_follow_the_config() {
    let names = [
        (Algorithm::BottomLeft, "bottom-left"),
        (Algorithm::Guillotine, "guillotine"),
        (Algorithm::MaxRects, "maxrects"),
        (Algorithm::Skyline, "skyline"),
    ];
    for (algorithm, name) in names {
        let cfg = PackerConfig::builder().algorithm(algorithm).build();
        assert_eq!(cfg.build_algorithm::<u32>().name(), name);
        assert_eq!(cfg.build_finder().algorithm_name(), name);
    }

    let finder = PackerConfig::builder().generations(7).population(3).build().build_finder();
    assert_eq!((finder.iterations(), finder.population()), (7, 3));
}

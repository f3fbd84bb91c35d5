use renderer::geometry::SphereGeometry;
use renderer::{Color, FixedStepTimeSource, FramePipeline, VisualizerSettings};

const BACKGROUND_RGB: [u8; 3] = [0x11, 0x18, 0x27];

fn red_blue_still() -> VisualizerSettings {
    VisualizerSettings {
        color_a: Color::from_hex("#ff0000").unwrap(),
        color_b: Color::from_hex("#0000ff").unwrap(),
        motion: 0.0,
        distortion: 0.0,
        grain: 0.0,
        chromatic_aberration: 0.0,
    }
}

#[test]
fn still_red_blue_frames_are_pure_mixes_and_stable() {
    let settings = red_blue_still();
    let mut pipeline = FramePipeline::new(96, 64, 7);

    let first = pipeline.render(&settings, 1.0 / 60.0).clone();
    let coverage = pipeline.coverage().to_vec();
    assert_eq!(pipeline.uniforms().distortion, 0.0);
    assert_eq!(pipeline.animation().accumulated_time, 0.0);

    let covered = coverage.iter().filter(|&&c| c).count();
    assert!(covered > 96 * 64 / 10, "surface covers only {covered} pixels");

    for (pixel, covered) in first.pixels().zip(&coverage) {
        let [r, g, b, a] = pixel.0;
        assert_eq!(a, 255);
        if *covered {
            assert_eq!(g, 0, "green leaked into {:?}", pixel.0);
            assert!((i32::from(r) + i32::from(b) - 255).abs() <= 1, "{:?}", pixel.0);
        } else {
            assert_eq!([r, g, b], BACKGROUND_RGB);
        }
    }

    let second = pipeline.render(&settings, 1.0 / 60.0).clone();
    let third = pipeline.render(&settings, 0.5).clone();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn surface_colors_vary_across_a_flat_sphere() {
    let mut pipeline = FramePipeline::new(96, 96, 1);
    let frame = pipeline.render(&red_blue_still(), 0.0).clone();
    let reds: Vec<u8> = frame
        .pixels()
        .zip(pipeline.coverage())
        .filter(|(_, covered)| **covered)
        .map(|(pixel, _)| pixel.0[0])
        .collect();
    let min = reds.iter().copied().min().unwrap();
    let max = reds.iter().copied().max().unwrap();
    assert!(max - min > 40, "red channel spans only {min}..{max}");
}

#[test]
fn grain_reseeds_every_frame_but_replays_for_a_seed() {
    let settings = VisualizerSettings {
        motion: 0.0,
        grain: 0.3,
        chromatic_aberration: 0.0,
        ..VisualizerSettings::default()
    };
    let geometry = SphereGeometry::new(1.0, 24, 12);

    let mut a = FramePipeline::new(48, 32, 99).with_geometry(geometry.clone());
    let mut b = FramePipeline::new(48, 32, 99).with_geometry(geometry.clone());
    let a1 = a.render(&settings, 0.016).clone();
    let a2 = a.render(&settings, 0.016).clone();
    let b1 = b.render(&settings, 0.016).clone();
    assert_ne!(a1, a2, "grain pattern must change between frames");
    assert_eq!(a1, b1, "same session seed must replay the same grain");

    let mut c = FramePipeline::new(48, 32, 100).with_geometry(geometry);
    assert_ne!(c.render(&settings, 0.016).clone(), a1);
}

#[test]
fn motion_animates_the_surface() {
    let settings = VisualizerSettings {
        grain: 0.0,
        chromatic_aberration: 0.0,
        motion: 1.0,
        distortion: 0.6,
        ..VisualizerSettings::default()
    };
    let mut pipeline =
        FramePipeline::new(64, 64, 3).with_geometry(SphereGeometry::new(1.0, 32, 16));
    let first = pipeline.render(&settings, 0.0).clone();
    let later = pipeline.render(&settings, 0.5).clone();
    assert_ne!(first, later);
    assert_eq!(pipeline.animation().accumulated_time, 0.5);
}

#[test]
fn fixed_step_source_replays_identically() {
    let settings = VisualizerSettings {
        grain: 0.0,
        motion: 0.5,
        ..VisualizerSettings::default()
    };
    let geometry = SphereGeometry::new(1.0, 24, 12);
    let render_run = || {
        let mut pipeline = FramePipeline::new(40, 40, 8).with_geometry(geometry.clone());
        let mut time = FixedStepTimeSource::from_fps(25.0);
        for _ in 0..4 {
            pipeline.render_with(&settings, &mut time);
        }
        (pipeline.animation(), pipeline.latest().cloned())
    };

    let (state, frame) = render_run();
    assert_eq!(state.frame_index, 4);
    assert!((state.accumulated_time - 4.0 * 0.04 * 0.5).abs() < 1e-9);
    assert_eq!(render_run().1, frame);
}

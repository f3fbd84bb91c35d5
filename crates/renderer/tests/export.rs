use std::fs;

use renderer::geometry::SphereGeometry;
use renderer::{
    CaptureError, FramePipeline, RendererConfig, VisualizerSettings, DEFAULT_EXPORT_NAME,
};
use tempfile::TempDir;

#[test]
fn export_after_first_frame_writes_surface_sized_png() {
    let mut pipeline =
        FramePipeline::new(80, 50, 5).with_geometry(SphereGeometry::new(1.0, 32, 16));
    pipeline.render(&VisualizerSettings::default(), 1.0 / 60.0);

    let dir = TempDir::new().unwrap();
    let path = pipeline.sink().export_to(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), DEFAULT_EXPORT_NAME);
    assert!(fs::metadata(&path).unwrap().len() > 0);

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), pipeline.size());
    assert_eq!(&decoded, pipeline.latest().unwrap());
}

#[test]
fn capture_reflects_the_most_recent_frame() {
    let mut pipeline =
        FramePipeline::new(40, 40, 5).with_geometry(SphereGeometry::new(1.0, 16, 8));
    assert!(matches!(
        pipeline.capture(),
        Err(CaptureError::NoFrameAvailable)
    ));

    pipeline.render(&VisualizerSettings::default(), 0.0);
    pipeline.resize(60, 30);
    pipeline.render(&VisualizerSettings::default(), 0.0);

    let bytes = pipeline.capture().unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (60, 30));
}

#[test]
fn default_config_captures_at_window_size() {
    let config = RendererConfig::default();
    let mut pipeline =
        FramePipeline::from_config(&config, 11).with_geometry(SphereGeometry::new(1.0, 48, 24));
    assert!(pipeline.render_size().0 < config.surface_size.0);
    pipeline.render(&VisualizerSettings::default(), 1.0 / 60.0);

    let bytes = pipeline.capture().unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), config.surface_size);
    assert_eq!(pipeline.latest().unwrap().dimensions(), config.surface_size);
}

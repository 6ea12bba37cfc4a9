use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use tileset_minimiser::{minimise_image_file, ImageCodec, MinimiseConfig, Outcome, OutputFormat};

fn cell_pixel(seed: u8, x: u32, y: u32) -> Rgba<u8> {
    Rgba([seed, x as u8, y as u8, 255])
}

#[test]
fn seven_unique_tiles_pack_into_one_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.png");
    // 4x2 grid: seven distinct tiles plus a vertical mirror of the first
    let image = RgbaImage::from_fn(32, 16, |x, y| {
        let index = (y / 8) * 4 + x / 8;
        if index == 7 {
            cell_pixel(0, x % 8, 7 - y % 8)
        } else {
            cell_pixel(index as u8, x % 8, y % 8)
        }
    });
    image.save(&path).unwrap();

    let config = MinimiseConfig {
        output_format: OutputFormat::Png,
        optimise_png: true,
        ..MinimiseConfig::default()
    };
    let outcome = minimise_image_file(&path, &config, &ImageCodec::new(true)).unwrap();
    let report = match outcome {
        Outcome::Minimised(report) => report,
        Outcome::AlreadyMinimal => panic!("expected a reduction"),
    };
    assert_eq!(report.tilesets[0].unique_tiles, 7);
    assert_eq!((report.tilesets[0].columns, report.tilesets[0].rows), (7, 1));
    assert_eq!(report.tilesets[0].reduction_percent(), 13);

    let packed = image::open(dir.path().join("sheet_min.png")).unwrap().to_rgba8();
    assert_eq!(packed.dimensions(), (56, 8));
    // Second-row tiles follow the first row in scan order
    assert_eq!(packed.get_pixel(4 * 8 + 3, 6), &cell_pixel(4, 3, 6));
}

#[test]
fn unique_sheet_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.png");
    RgbaImage::from_fn(16, 16, |x, y| cell_pixel(((y / 8) * 2 + x / 8) as u8, x % 8, y % 8))
        .save(&path)
        .unwrap();

    let outcome =
        minimise_image_file(&path, &MinimiseConfig::default(), &ImageCodec::default()).unwrap();
    assert!(matches!(outcome, Outcome::AlreadyMinimal));
    assert!(!dir.path().join("sheet_min.bmp").exists());
}

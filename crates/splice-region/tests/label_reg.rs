//! Labeling and region feature regression test
//!
//! Labels synthetic masks and palette rasters, checks region features and
//! the fill operations built on top of labeling.
//!
//! Run with:
//! ```
//! cargo test -p splice-region --test label_reg
//! ```

use splice_core::{Mask, Point, Raster, Rgb, RgbRaster};
use splice_morph::contour;
use splice_region::{
    connect_regions, discard_regions, fill_inside, fill_outside_labels, flood_fill4,
    label_regions, region_stats,
};
use splice_test::{RegParams, disk_mask, rect_mask};

#[test]
fn label_reg() {
    let mut rp = RegParams::new("label");

    // Three disjoint objects
    eprintln!("  Testing labeling");
    let a = disk_mask(60, 40, 12, 12, 8).expect("disk");
    let b = rect_mask(60, 40, 30, 5, 20, 6).expect("rect");
    let c = rect_mask(60, 40, 35, 25, 4, 4).expect("rect");
    let mut mask = splice_morph::or(&a, &b);
    mask = splice_morph::or(&mask, &c);
    let labeling = label_regions(&mask, Some(0));
    rp.compare_values(4.0, labeling.count as f64, 0.0);

    let again = label_regions(&mask, Some(0));
    rp.compare_rasters(&labeling.grid, &again.grid);

    // Features
    eprintln!("  Testing region statistics");
    let set = region_stats(&labeling, None, 0.0).expect("stats");
    rp.compare_values(3.0, set.len() as f64, 0.0);
    let disk = &set.regions[0];
    rp.compare_values(12.0 / 60.0, disk.cx, 1e-9);
    rp.compare_values(12.0 / 40.0, disk.cy, 1e-9);
    rp.compare_values(a.count_set() as f64, disk.pixel_count as f64, 0.0);
    let bar = &set.regions[1];
    rp.compare_values(1.0, bar.relative_volume, 1e-12);
    rp.compare_values(1.0, (bar.elongation > disk.elongation) as u8 as f64, 0.0);

    // The small square is 16/2400 < 1% and goes away
    let kept = discard_regions(&mask, 0.01).expect("discard");
    rp.compare_values(
        (a.count_set() + b.count_set()) as f64,
        kept.count_set() as f64,
        0.0,
    );

    let joined = connect_regions(&kept).expect("connect");
    let relabeled = label_regions(&joined, Some(0));
    rp.compare_values(2.0, relabeled.count as f64, 0.0);

    // Color features on a two-tone image
    eprintln!("  Testing color features");
    let mut img = RgbRaster::filled(60, 40, Rgb::new(255, 0, 0)).expect("image");
    for (x, y, v) in b.enumerate() {
        if v != 0 {
            img.set_pixel_unchecked(x, y, Rgb::new(0, 0, 255));
        }
    }
    let set = region_stats(&labeling, Some(&img), 0.0).expect("stats");
    rp.compare_values(1.0, (set.regions[0].color[1] > 0.5) as u8 as f64, 0.0);
    rp.compare_values(1.0, (set.regions[1].color[2] < -0.5) as u8 as f64, 0.0);

    // Palette raster labeled without background
    let palette = Raster::from_vec(3, 2, vec![1u8, 1, 2, 2, 1, 2]).expect("palette");
    let l = label_regions(&palette, None);
    rp.compare_strings(&[1, 1, 2, 3, 1, 2], &to_bytes(l.grid.data()));

    // Fills
    eprintln!("  Testing fills");
    let outline = contour(&a);
    let inside = fill_inside(&outline);
    rp.compare_rasters(&a, &inside);

    let mut hole = a.clone();
    hole.set_pixel_unchecked(12, 12, 0);
    let filled = flood_fill4(&mut hole, Point::new(-1, -1)).expect("fill");
    rp.compare_values((60 * 40 - a.count_set()) as f64, filled as f64, 0.0);

    let guided = fill_outside_labels(&labeling.grid, &Mask::new(60, 40).expect("mask"));
    rp.compare_values(0.0, guided.count_set() as f64, 0.0);

    assert!(rp.cleanup());
}

fn to_bytes(labels: &[u32]) -> Vec<u8> {
    labels.iter().map(|&l| l as u8).collect()
}

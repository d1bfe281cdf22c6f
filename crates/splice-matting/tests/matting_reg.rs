//! Matting controller regression test
//!
//! Runs the full pipeline on a red disk pasted into a gray target that has
//! a bright patch next to it: rough mask relabeling, scissors and erode
//! refinement, feathered compositing with gradient blending, repositioning
//! and whole-object transfer.
//!
//! Run with:
//! ```
//! cargo test -p splice-matting --test matting_reg
//! ```

use parking_lot::Mutex;
use splice_core::{Mask, Point, Rgb};
use splice_matting::{
    BoundaryController, ControllerState, MattingConfig, MattingEvent, RefineMethod,
};
use splice_morph::{contour, dilate_brick, subtract};
use splice_test::{RegParams, disk_mask, solid_image};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SIZE: u32 = 60;
const CENTER: i32 = 30;
const RED: Rgb = Rgb::new(220, 30, 30);
const GRAY: Rgb = Rgb::gray(100);

fn disk(r: i32) -> Mask {
    disk_mask(SIZE, SIZE, CENTER, CENTER, r).expect("disk")
}

fn is_subset(a: &Mask, b: &Mask) -> f64 {
    subtract(a, b).is_blank() as u8 as f64
}

#[test]
fn matting_reg() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut rp = RegParams::new("matting");

    let mut source = solid_image(SIZE, SIZE, GRAY).expect("source");
    let object = disk(10);
    for (x, y, v) in object.enumerate() {
        if v != 0 {
            source.set_pixel_unchecked(x, y, RED);
        }
    }
    let mut target = solid_image(SIZE, SIZE, GRAY).expect("target");
    for y in 0..SIZE as i32 {
        for x in 0..SIZE as i32 {
            let r2 = (x - CENTER).pow(2) + (y - CENTER).pow(2);
            if x >= 42 && r2 * 4 > 25 * 25 {
                target.set_pixel_unchecked(x as u32, y as u32, Rgb::gray(200));
            }
        }
    }
    let stroke = subtract(&disk(16), &disk(14));

    let mut controller = BoundaryController::new(MattingConfig::default()).expect("controller");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    controller.set_listener(move |e| sink.lock().push(e));
    controller.set_source(source.clone());
    controller.set_target(target.clone());
    controller.set_palette(vec![RED, GRAY]);

    // Scissors: relabel inside the stroke, then reroute the boundary
    eprintln!("  Testing scissors refinement");
    controller.apply_correction(&stroke).expect("correction");
    controller.wait().expect("wait");
    let mask = controller.mask().expect("mask");
    eprintln!("  Refined mask: {} pixels", mask.count_set());
    rp.compare_values(1.0, is_subset(&disk(8), &mask), 0.0);
    rp.compare_values(1.0, is_subset(&mask, &disk(16)), 0.0);
    rp.compare_rasters(&contour(&mask), &controller.contour().expect("contour"));
    rp.compare_values(
        1.0,
        (controller.state() == ControllerState::Settled) as u8 as f64,
        0.0,
    );

    // The layer is feathered, blended inside and leaves the target alone
    let layer = controller.composite().expect("composite");
    let before = layer.origin;
    let out = controller.render().expect("render");
    let center = out.get_pixel(CENTER as u32, CENTER as u32).expect("center");
    rp.compare_values(1.0, (center.r > center.g) as u8 as f64, 0.0);
    rp.compare_values(100.0, out.get_pixel(0, 0).expect("corner").r as f64, 0.0);

    // Moving the object composites it again at the new place
    eprintln!("  Testing reposition");
    controller.reposition(Point::new(5, 0)).expect("reposition");
    controller.wait().expect("wait");
    let after = controller.composite().expect("composite").origin;
    rp.compare_values((before.x + 5) as f64, after.x as f64, 0.0);
    rp.compare_values(before.y as f64, after.y as f64, 0.0);
    controller.reposition(Point::new(0, 0)).expect("reposition");
    controller.wait().expect("wait");

    // Erode: search from the inside of the stroke lines
    eprintln!("  Testing erode refinement");
    let erode = MattingConfig::default().with_method(RefineMethod::Erode);
    controller.set_config(erode).expect("config");
    controller.apply_correction(&stroke).expect("correction");
    controller.wait().expect("wait");
    let mask = controller.mask().expect("mask");
    rp.compare_values(1.0, is_subset(&disk(14), &mask), 0.0);
    rp.compare_values(1.0, is_subset(&mask, &disk(16)), 0.0);

    // Rough mask relabeled against the palette, then pasted whole
    eprintln!("  Testing rough mask");
    let relabel = MattingConfig::default().with_segmentation_line(5);
    controller.set_config(relabel).expect("config");
    controller.set_rough_mask(object.clone()).expect("rough");
    controller.wait().expect("wait");
    let relabeled = controller.mask().expect("mask");
    eprintln!("  Relabeled mask: {} pixels", relabeled.count_set());
    rp.compare_values(object.count_set() as f64, relabeled.count_set() as f64, 30.0);
    let grown = dilate_brick(&object, 5).expect("grown");
    rp.compare_values(1.0, is_subset(&relabeled, &grown), 0.0);

    controller.transfer_whole_object().expect("transfer");
    controller.wait().expect("wait");
    rp.compare_rasters(&object, &controller.mask().expect("mask"));

    use MattingEvent::*;
    let expected = [
        CorrectionApplied,
        RefinementSettled,
        ObjectRepositioned,
        RefinementSettled,
        ObjectRepositioned,
        RefinementSettled,
        CorrectionApplied,
        RefinementSettled,
        RefinementSettled,
        FullObjectTransfer,
        RefinementSettled,
    ];
    let seen = events.lock().clone();
    rp.compare_strings(
        format!("{expected:?}").as_bytes(),
        format!("{seen:?}").as_bytes(),
    );

    assert!(rp.cleanup());
}

use std::collections::BTreeMap;

use nalgebra::Vector3;
use tagtrack::{
    init_with_level, quad, Codec, PoseSample, Quad, TagId, TrackingContext, TrackingParams,
};

/// Simulates a flickering detection stream: one tag is read cleanly every
/// frame, a second one drops out every third frame and always arrives with
/// two misread cells.
fn main() {
    init_with_level(log::LevelFilter::Debug).expect("logger already installed");

    let codec = Codec::new();
    let mut context = TrackingContext::new(TrackingParams {
        persistence: 2,
        gain: 0.1,
    });

    let steady: TagId = 42;
    let flickery: TagId = 357;

    for frame in 0..30u32 {
        let mut detections: BTreeMap<TagId, Quad> = BTreeMap::new();
        detections.insert(steady, corners(100.0, 100.0));

        if frame % 3 != 0 {
            let sampled = codec
                .encode(flickery)
                .with_bit_flipped(4)
                .with_bit_flipped(29);
            if let Some(id) = codec.decode(sampled) {
                detections.insert(id, corners(300.0, 150.0));
            }
        }

        let stable = context.update_tags(&detections);
        println!(
            "frame {frame:2}: {} raw, {} stable",
            detections.len(),
            stable.len()
        );

        let mut measured = BTreeMap::new();
        measured.insert(
            "demo".to_owned(),
            PoseSample::new(Vector3::new(0.0, 0.0, 400.0), Vector3::zeros()),
        );
        let poses = context.update_poses(&measured);
        let z = poses["demo"][(2, 3)];
        println!("          demo object at z = {z:.1}");
    }
}

fn corners(x: f32, y: f32) -> Quad {
    quad([(x, y), (x + 20.0, y), (x + 20.0, y + 20.0), (x, y + 20.0)])
}

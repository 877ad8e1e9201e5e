//! Example: Robust plane fitting using RANSAC
//!
//! Fits a plane to eight points near `2x + 0.5y - z + 1 = 0` mixed with eight
//! outliers, asking for a 60% consensus.

use consensus_fit::settings::consensus_threshold_from_fraction;
use consensus_fit::types::data_from_points3;
use consensus_fit::{estimate_plane, evaluate_model, RansacSettings};
use nalgebra::Point3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Robust Plane Fitting Example ===\n");

    let points = [
        // Near 2x + 0.5y - z + 1 = 0
        [1.0, 1.0, 3.5],
        [2.0, 1.0, 5.5],
        [1.0, 2.0, 4.0],
        [3.0, 2.0, 8.0],
        [0.0, 0.0, 1.0],
        [2.5, 1.5, 7.25],
        [1.5, 0.5, 4.25],
        [0.5, 1.5, 2.75],
        // Outliers
        [10.0, 10.0, 10.0],
        [10.0, 20.0, 10.0],
        [5.0, 5.0, 100.0],
        [-5.0, -5.0, -5.0],
        [50.0, 1.0, 1.0],
        [20.0, 20.0, 5.0],
        [1.0, 1.0, -50.0],
        [-10.0, 10.0, 10.0],
    ];
    let data = data_from_points3(&points);

    let tolerance = 0.4;
    let threshold = consensus_threshold_from_fraction(points.len(), 0.6);
    let settings = RansacSettings::plane(tolerance, 2000, threshold);
    let result = estimate_plane(&data, settings)?;

    let plane = &result.model;
    let [a, b, c, d] = plane.coefficients();
    println!("RANSAC Results:");
    println!("  State: {:?}", result.state);
    println!("  Iterations: {}", result.iterations);
    println!("  Estimated plane: {a:.4}x + {b:.4}y + {c:.4}z + {d:.4} = 0");
    println!(
        "  Inliers: {} of {} (consensus threshold {threshold})",
        result.inliers.len(),
        points.len()
    );

    println!("\nDistances to the fitted plane:");
    for p in [
        Point3::new(1.0, 1.0, 3.5),
        Point3::new(2.0, 2.0, 6.0),
        Point3::new(10.0, 10.0, 10.0),
    ] {
        println!("  {p}: {:.4}", plane.distance(&p));
    }

    println!(
        "\nMean inlier error: {:.4}",
        evaluate_model(&data, plane, tolerance)
    );

    Ok(())
}

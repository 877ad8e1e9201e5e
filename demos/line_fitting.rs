//! Example: Robust line fitting using RANSAC
//!
//! Fits `y = m*x + b` to ten points near `y = 2x + 1` mixed with ten outliers.
//! Run with `RUST_LOG=debug` to see the pipeline's log output.

use consensus_fit::types::data_from_points2;
use consensus_fit::{estimate_line, evaluate_model, Line, RansacSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Robust Line Fitting Example ===\n");

    let points = [
        // Near y = 2x + 1
        [0.0, 1.2],
        [1.0, 3.1],
        [2.0, 5.0],
        [3.0, 6.8],
        [4.0, 9.2],
        [5.0, 10.9],
        [6.0, 13.0],
        [7.0, 15.1],
        [8.0, 16.8],
        [9.0, 19.2],
        // Outliers
        [1.0, 10.0],
        [2.0, -3.5],
        [3.0, 20.0],
        [4.0, 1.0],
        [6.0, 25.0],
        [7.0, -5.0],
        [8.0, 30.0],
        [10.0, -10.0],
        [11.0, 35.0],
        [12.0, 0.0],
    ];
    let data = data_from_points2(&points);

    let tolerance = 0.5;
    let settings = RansacSettings::line(tolerance, 100, 10);
    let result = estimate_line(&data, settings)?;

    println!("RANSAC Results:");
    println!("  State: {:?}", result.state);
    println!("  Iterations: {}", result.iterations);
    println!(
        "  Found {} inliers out of {} points: {:?}",
        result.inliers.len(),
        points.len(),
        result.inliers
    );

    match result.model {
        Line::Sloped { slope, intercept } => {
            println!("\nEstimated line: y = {slope:.4}x + {intercept:.4}");
            println!("  True line: y = 2.0000x + 1.0000");
        }
        Line::Vertical { x } => println!("\nEstimated line: x = {x:.4}"),
        Line::Degenerate => println!("\nNo usable line"),
    }

    println!("\nDistances to the fitted line:");
    for (x, y) in [(2.5, 6.0), (5.0, 11.0), (3.0, 20.0)] {
        println!("  ({x}, {y}): {:.4}", result.model.distance(x, y));
    }

    println!(
        "\nMean inlier error: {:.4}",
        evaluate_model(&data, &result.model, tolerance)
    );

    Ok(())
}

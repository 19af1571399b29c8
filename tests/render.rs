//! Renderer behavior across calls: isolation, determinism, pipeline.

use anyhow::Result;
use image::GenericImageView as _;

use plotd::chart::function::{chart_for, FunctionKind, FunctionParams};
use plotd::chart::{encode, render, ChartSpec};

fn spec(i: usize) -> ChartSpec {
    let descriptor = serde_json::json!({
        "title": format!("chart {i}"),
        "series": [{
            "name": format!("series {i}"),
            "kind": if i % 2 == 0 { "line" } else { "scatter" },
            "points": [[0.0, i as f64], [1.0, (i * 2) as f64], [2.0, (i as f64).sqrt()]]
        }]
    });
    ChartSpec::parse(&descriptor.to_string()).unwrap()
}

#[test]
fn concurrent_renders_each_match_their_own_input() -> Result<()> {
    const N: usize = 8;
    let expected: Vec<Vec<u8>> = (0..N).map(|i| render(&spec(i)).unwrap()).collect();

    let rendered: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..N)
            .map(|i| scope.spawn(move || render(&spec(i)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, (got, want)) in rendered.iter().zip(&expected).enumerate() {
        assert_eq!(got, want, "request {i} picked up another request's drawing");
    }
    Ok(())
}

#[test]
fn sequential_renders_leave_no_residue() -> Result<()> {
    let reference = render(&spec(3))?;
    let _unrelated = render(&spec(7))?;
    assert_eq!(render(&spec(3))?, reference);
    Ok(())
}

#[test]
fn distinct_inputs_give_distinct_images() -> Result<()> {
    assert_ne!(render(&spec(0))?, render(&spec(1))?);
    Ok(())
}

#[test]
fn function_pipeline_produces_decodable_png() -> Result<()> {
    for kind in [
        FunctionKind::Sine,
        FunctionKind::Quadratic,
        FunctionKind::Exponential,
        FunctionKind::Logarithm,
    ] {
        let spec = chart_for(kind, &FunctionParams::default())?;
        let png = render(&spec)?;
        let img = image::load_from_memory(&png)?;
        assert_eq!((img.width(), img.height()), (640, 480));
    }
    Ok(())
}

#[test]
fn data_url_wraps_render_output() -> Result<()> {
    let png = render(&spec(5))?;
    let url = encode::data_url(&png);
    assert!(url.starts_with("data:image/png;base64,"));
    // A data URL must stay on one line to be embeddable.
    assert!(!url.contains('\n'));
    Ok(())
}

//! d3-blueprint demo
//!
//! Builds a keyed bar chart on a headless document, draws it, redraws it with
//! shifted data and a resize, then prints the final markup. Transitions are
//! driven on a single-threaded tokio runtime.
//!
//! Run with `RUST_LOG=debug` to follow the draw lifecycle.

mod bar_chart;

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use blueprint_charts::Chart;
use blueprint_core::ConfigBatch;
use blueprint_plugins::{CrosshairPlugin, ResponsivePlugin, Size, TooltipLine, TooltipPlugin};
use blueprint_scene::Document;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bar_chart::{BarChart, Sale, Sales};

/// Render an animated bar chart to SVG markup
#[derive(Parser, Debug)]
#[command(name = "blueprint-demo")]
#[command(version)]
struct Args {
    /// Number of bars
    #[arg(short, long, default_value = "6")]
    bars: usize,

    /// Transition duration in milliseconds
    #[arg(long, default_value = "400")]
    duration_ms: u64,

    /// Frame interval in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Chart width before the resize
    #[arg(long, default_value = "480")]
    width: f64,

    /// Chart height
    #[arg(long, default_value = "240")]
    height: f64,
}

fn sample(bars: usize, round: usize) -> Sales {
    (0..bars)
        .map(|i| {
            let n = i + round;
            let label = char::from(b'A' + (n % 26) as u8).to_string();
            Sale::new(label, ((n * 37 + round * 11) % 50 + 10) as f64)
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let frame = Duration::from_millis(args.frame_ms);

    let doc = Document::new("svg");
    doc.root()
        .attr("width", args.width)
        .attr("height", args.height);

    let chart = Chart::new(doc.root(), BarChart).context("building the bar chart")?;
    chart.set_config_batch(
        ConfigBatch::new()
            .with("width", args.width)
            .with("height", args.height)
            .with("duration_ms", args.duration_ms),
    )?;

    let tooltip = Rc::new(TooltipPlugin::new(
        doc.root(),
        |chart: &Chart<Sales>, tooltip, data: &Sales| {
            let Some((i, top)) = data
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.value.total_cmp(&b.1.value))
            else {
                tooltip.hide();
                return;
            };
            let width = chart.config::<f64>("width").unwrap_or(0.0);
            let step = width / data.len() as f64;
            tooltip.show(
                i as f64 * step,
                0.0,
                &[
                    TooltipLine::new(top.label.as_str()),
                    TooltipLine::new(top.value.to_string()).color("#4c78a8"),
                ],
            );
        },
    ));
    let crosshair = Rc::new(CrosshairPlugin::new(doc.root(), args.height));
    let responsive = Rc::new(ResponsivePlugin::new(|size: Size| {
        ConfigBatch::new()
            .with("width", size.width)
            .with("height", size.height)
    }));
    chart
        .use_plugin(tooltip, None)?
        .use_plugin(crosshair.clone(), None)?
        .use_plugin(responsive.clone(), None)?;

    chart.on("postTransition.demo", |_, event| {
        tracing::info!(event = event.kind().as_str(), "chart idle");
    })?;

    tracing::info!(bars = args.bars, "first draw");
    let (drawn, ()) = futures::join!(chart.draw(sample(args.bars, 0)), doc.drive(frame));
    drawn?;

    tracing::info!("second draw");
    let (drawn, ()) = futures::join!(chart.draw(sample(args.bars, 1)), doc.drive(frame));
    drawn?;

    crosshair.show(args.width / 2.0);

    let resized = Size::new(args.width * 1.5, args.height);
    if let Some(redraw) = responsive.resize(resized) {
        tracing::info!(width = resized.width, "resize");
        let (drawn, ()) = futures::join!(redraw?, doc.drive(frame));
        drawn?;
    }

    println!("{}", doc.markup());

    chart.destroy();
    Ok(())
}

mod options;
mod progress;

use anyhow::Error as AnyError;
use clap::Parser;
use log::info;
use options::{Cli, Command as CliCmd};
use panorama::{
    dem::ContinuousElevationModel,
    math::{azimuth, GeoPoint},
    Panorama, PanoramaComputer, PanoramaParameters, Tiles,
};
use serde::Serialize;
use std::{io::Write, sync::atomic::AtomicBool};
use textplots::{Chart, Plot, Shape};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Distance jump, in meters, above which a pixel is on a silhouette.
const SILHOUETTE_M: f32 = 1_000.0;

fn main() -> Result<(), AnyError> {
    let Cli {
        tile_dir,
        observer,
        elevation,
        azimuth,
        fov,
        max_distance,
        width,
        height,
        supersampling,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let observer = GeoPoint::from_degrees(observer.0.x, observer.0.y)?;
    let params = PanoramaParameters::new(
        observer,
        elevation,
        azimuth::canonicalize(azimuth.to_radians()),
        fov.to_radians(),
        max_distance,
        width,
        height,
    )?
    .supersampled(supersampling)?;
    info!(
        "computing {}x{} panorama from {observer}",
        params.width(),
        params.height()
    );

    let tiles = Tiles::new(tile_dir)?;
    let dem = ContinuousElevationModel::new(tiles.around(observer, max_distance)?);
    let computer = PanoramaComputer::builder().dem(dem).build()?;

    let pb = progress::bar("Casting rays".to_string(), params.width() as u64)?;
    let panorama = computer.compute_panorama_with(&params, &AtomicBool::new(false), |_| pb.inc(1));
    pb.finish_and_clear();

    let mut dem = computer.into_dem();
    dem.release();
    let panorama = panorama?;

    match cmd {
        CliCmd::Summary => print_summary(&panorama)?,
        CliCmd::Skyline => plot_skyline(&panorama)?,
        CliCmd::Json => print_json(&panorama)?,
    };
    Ok(())
}

fn print_summary(panorama: &Panorama) -> Result<(), AnyError> {
    let params = panorama.parameters();
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "observer: {} at {} m, looking {} ({:.1}°)",
        params.observer_position(),
        params.observer_elevation(),
        azimuth::to_octant_string(params.center_azimuth(), "N", "E", "S", "W"),
        params.center_azimuth().to_degrees()
    )?;
    writeln!(
        stdout,
        "view: {:.1}° x {:.1}°, {} x {} pixels",
        params.horizontal_field_of_view().to_degrees(),
        params.vertical_field_of_view().to_degrees(),
        params.width(),
        params.height()
    )?;

    let mut sky_columns = 0;
    let mut hits = 0;
    let mut silhouette = 0;
    let mut nearest = f32::INFINITY;
    let mut farthest = 0_f32;
    let mut highest: Option<(usize, usize, f32)> = None;
    for x in 0..params.width() {
        if panorama.column_is_sky(x)? {
            sky_columns += 1;
            continue;
        }
        for y in 0..params.height() {
            let distance = panorama.distance_at(x, y)?;
            if distance.is_infinite() {
                continue;
            }
            hits += 1;
            nearest = nearest.min(distance);
            farthest = farthest.max(distance);
            if panorama.max_distance_to_neighbors(x, y)? > SILHOUETTE_M {
                silhouette += 1;
            }
            let elevation = panorama.elevation_at(x, y)?;
            if highest.map_or(true, |(_, _, e)| elevation > e) {
                highest = Some((x, y, elevation));
            }
        }
    }

    writeln!(
        stdout,
        "terrain: {hits} pixels, {silhouette} on silhouettes, {sky_columns} empty columns"
    )?;
    if let Some((x, y, elevation)) = highest {
        #[allow(clippy::cast_precision_loss)]
        let direction = params.azimuth_for_x(x as f64)?;
        let position = GeoPoint::new(
            f64::from(panorama.longitude_at(x, y)?),
            f64::from(panorama.latitude_at(x, y)?),
        )?;
        writeln!(stdout, "distance: {nearest:.0} m to {farthest:.0} m")?;
        writeln!(
            stdout,
            "highest: {elevation:.0} m at {position}, {:.0} m away towards {}",
            panorama.distance_at(x, y)?,
            azimuth::to_octant_string(direction, "N", "E", "S", "W")
        )?;
    }
    Ok(())
}

/// Plots the altitude, in degrees, of the topmost terrain pixel of
/// every column.
fn plot_skyline(panorama: &Panorama) -> Result<(), AnyError> {
    let params = panorama.parameters();
    let mut plot_data = Vec::with_capacity(params.width());
    for x in 0..params.width() {
        if let Some(y) = panorama.horizon_row(x)? {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            plot_data.push((x as f32, params.altitude_for_y(y as f64)?.to_degrees() as f32));
        }
    }
    #[allow(clippy::cast_precision_loss)]
    Chart::new(300, 150, 0.0, params.width() as f32)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
    Ok(())
}

fn print_json(panorama: &Panorama) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        pixel: [usize; 2],
        location: [f32; 2],
        distance: f32,
        elevation: f32,
        slope: f32,
    }

    #[derive(Serialize)]
    struct JsonPanorama<'a> {
        parameters: &'a PanoramaParameters,
        samples: Vec<JsonEntry>,
    }

    let params = panorama.parameters();
    let mut samples = Vec::new();
    for x in 0..params.width() {
        for y in 0..params.height() {
            let sample = panorama.sample_at(x, y)?;
            if sample.distance.is_infinite() {
                continue;
            }
            samples.push(JsonEntry {
                pixel: [x, y],
                location: [sample.longitude.to_degrees(), sample.latitude.to_degrees()],
                distance: sample.distance,
                elevation: sample.elevation,
                slope: sample.slope.to_degrees(),
            });
        }
    }
    let json = serde_json::to_string(&JsonPanorama {
        parameters: params,
        samples,
    })?;
    println!("{json}");
    Ok(())
}

// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-camera-cataloger requires the 'std' feature");

use asimov_camera_loader::{
    cli::{handle_error, info_user, parse_rotation, warn_user},
    shared::{CameraError, CameraInfo, DisplayRotation, camera_orientation, list_cameras},
};
use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::json;
use std::error::Error as StdError;

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,

    /// Display rotation in degrees, used to compute each camera's orientation
    #[arg(long, value_parser = parse_rotation, default_value = "0")]
    rotation: DisplayRotation,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_cataloger(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    info_user(&options.flags, "enumerating camera devices");

    let cameras = list_cameras()?;
    if cameras.is_empty() {
        warn_user(&options.flags, "no camera devices found");
        return Ok(());
    }

    for camera in &cameras {
        let orientation = orientation_of(camera, options.rotation);
        match options.output {
            OutputFormat::Text => println!("{}", describe(camera, orientation)),
            OutputFormat::Jsonl => {
                let sizes: Vec<String> = camera.sizes.iter().map(|s| s.to_string()).collect();
                println!(
                    "{}",
                    json!({
                        "id": camera.id,
                        "name": camera.name,
                        "usb": camera.is_usb,
                        "facing": camera.facing.map(|f| f.as_str()),
                        "orientation": orientation,
                        "sizes": sizes,
                    })
                );
            },
        }
    }

    Ok(())
}

fn orientation_of(camera: &CameraInfo, rotation: DisplayRotation) -> Option<u32> {
    let facing = camera.facing?;
    let sensor = camera.sensor_orientation?;
    Some(camera_orientation(facing, sensor, rotation))
}

fn describe(camera: &CameraInfo, orientation: Option<u32>) -> String {
    let mut line = format!("{}: {}", camera.id, camera.name);
    if let Some(facing) = camera.facing {
        line.push_str(&format!(" ({facing})"));
    }
    if camera.is_usb {
        line.push_str(" [usb]");
    }
    if let Some(degrees) = orientation {
        line.push_str(&format!(" rotate={degrees}"));
    }
    if let Some(size) = camera.largest_size() {
        line.push_str(&format!(" max={size}"));
    }
    line
}

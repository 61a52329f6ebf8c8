// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-camera-reader requires the 'std' feature");

use asimov_camera_loader::{
    cli::{
        handle_error, info_user, parse_dimensions, parse_frequency, parse_rotation, warn_user,
        warn_user_with_error,
    },
    shared::{
        CameraConfig, CameraError, CameraEvent, DisplayRotation, Frame, FrameSink, LensFacing,
        PixelFormat, list_cameras, open_camera, preferred_camera,
    },
};
use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use image_hasher::{HashAlg, HasherConfig};
use know::traits::ToJsonLd;
use std::{
    error::Error as StdError,
    io::{self, Write},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Camera to open (default: first USB, else first back-facing camera)
    #[arg(long)]
    device: Option<String>,

    /// Lens facing to start with when no device is given
    #[arg(long, default_value = "back")]
    facing: LensFacing,

    /// Display rotation in degrees, used for the reported orientation
    #[arg(long, value_parser = parse_rotation, default_value = "0")]
    rotation: DisplayRotation,

    /// Preview size; negotiated with the device when omitted on Android
    #[arg(short, long = "size", value_parser = parse_dimensions)]
    size: Option<(u32, u32)>,

    #[arg(short, long, value_parser = parse_frequency, default_value = "30")]
    frequency: f64,

    /// Skip frames whose luma hash barely changed (repeat to raise the threshold)
    #[clap(short = 'D', long, action = clap::ArgAction::Count)]
    debounce: u8,
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

    let exit_code = match run_reader(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_reader(opts: &Options) -> Result<(), CameraError> {
    info_user(&opts.flags, "starting camera reader");

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| CameraError::other(format!("{e}")))?;
    }

    let fps = opts.frequency.max(0.000_001);
    let min_interval = Duration::from_secs_f64(1.0 / fps);

    let hasher = if opts.debounce > 0 {
        Some(HasherConfig::new().hash_alg(HashAlg::Gradient).to_hasher())
    } else {
        None
    };

    let selected = select_device(opts)?;
    info_user(
        &opts.flags,
        &format!("selected device: {}", selected.as_deref().unwrap_or("<by facing>")),
    );

    let (width, height) = opts.size.unwrap_or((0, 0));
    let mut config = CameraConfig::new(width, height, fps)
        .with_facing(opts.facing)
        .with_rotation(opts.rotation)
        .with_pixel_format(PixelFormat::Nv21)
        .with_diagnostics(opts.flags.debug || opts.flags.verbose >= 3);
    if let Some(device) = &selected {
        config = config.with_device(device.clone());
    }
    if cfg!(not(target_os = "android")) && config.requested_size().is_none() {
        config.width = 640;
        config.height = 480;
    }

    let last_emit = Arc::new(Mutex::new(None::<Instant>));
    let last_hash: Arc<Mutex<Option<image_hasher::ImageHash>>> = Arc::new(Mutex::new(None));
    let emitted = Arc::new(AtomicU64::new(0));

    let quit_cb = Arc::clone(&quit);
    let emitted_cb = Arc::clone(&emitted);
    let source = selected.clone().unwrap_or_else(|| format!("camera:{}", opts.facing));
    let debounce_level = opts.debounce;

    let sink: FrameSink = Arc::new(move |frame: Frame| {
        if quit_cb.load(Ordering::SeqCst) {
            return;
        }

        if frame.pixel_format != PixelFormat::Nv21 {
            return;
        }

        {
            let mut guard = last_emit.lock().unwrap_or_else(|p| p.into_inner());
            let now = Instant::now();
            if guard.is_some_and(|last| now.duration_since(last) < min_interval) {
                return;
            }
            *guard = Some(now);
        }

        if let Some(ref hasher) = hasher {
            if let Some(luma) = frame.luma_pixels() {
                if let Some(gray) =
                    image::GrayImage::from_raw(frame.width, frame.height, luma.into_owned())
                {
                    let hash = hasher.hash_image(&image::DynamicImage::ImageLuma8(gray));

                    let mut prev = last_hash.lock().unwrap_or_else(|p| p.into_inner());
                    if let Some(ref mut prev_hash) = *prev {
                        if hash.dist(prev_hash) < debounce_level as u32 {
                            return;
                        }
                        *prev_hash = hash;
                    } else {
                        *prev = Some(hash);
                    }
                }
            }
        }

        let ts_secs: u64 = if frame.timestamp_ns != 0 {
            frame.timestamp_ns / 1_000_000_000
        } else {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0))
                .as_secs()
        };

        let img = know::classes::Image {
            id: Some(format!("{source}#{ts_secs}")),
            width: Some(frame.width as _),
            height: Some(frame.height as _),
            data: frame.data.to_vec(),
            source: Some(source.clone()),
        };

        let json = match img.to_jsonld() {
            Ok(v) => v,
            Err(_) => return,
        };

        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(&mut out, "{json}") {
            if err.kind() == io::ErrorKind::BrokenPipe {
                quit_cb.store(true, Ordering::SeqCst);
            }
        } else {
            emitted_cb.fetch_add(1, Ordering::Relaxed);
        }
    });

    let mut camera = open_camera(selected.unwrap_or_default(), config)?;
    camera.add_sink(sink);
    camera.start()?;

    let mut dropped = 0u64;
    while !quit.load(Ordering::SeqCst) {
        if let Err(err) = camera.poll() {
            let _ = camera.stop();
            return Err(err);
        }
        while let Ok(event) = camera.events().try_recv() {
            match event {
                CameraEvent::FrameDropped { .. } => dropped += 1,
                CameraEvent::Warning { message, .. } => warn_user(&opts.flags, &message),
                CameraEvent::Error { error, .. } => {
                    let _ = camera.stop();
                    return Err(error);
                },
                CameraEvent::StateChanged { state, .. } => {
                    info_user(&opts.flags, &format!("camera {state}"))
                },
                CameraEvent::Started { .. } | CameraEvent::Stopped { .. } => {},
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let _ = camera.stop();
    info_user(
        &opts.flags,
        &format!(
            "emitted {} frames, dropped {dropped}",
            emitted.load(Ordering::Relaxed)
        ),
    );
    Ok(())
}

fn select_device(opts: &Options) -> Result<Option<String>, CameraError> {
    if let Some(s) = &opts.device {
        let t = s.trim();
        if !t.is_empty() {
            return Ok(Some(t.to_string()));
        }
    }

    // On Android the loader resolves the camera from the requested facing.
    if cfg!(target_os = "android") {
        return Ok(None);
    }

    match list_cameras() {
        Ok(cameras) => Ok(preferred_camera(&cameras).map(|c| c.id.clone())),
        Err(err) => {
            warn_user_with_error(&opts.flags, "camera enumeration failed", &err);
            Ok(None)
        },
    }
}

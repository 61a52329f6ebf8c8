// This is free and unencumbered software released into the public domain.

mod catalog;
pub use catalog::*;

mod config;
pub use config::*;

mod driver;
pub use driver::*;

pub mod drivers {
    #[cfg(feature = "ffmpeg")]
    pub mod ffmpeg;

    #[cfg(all(feature = "android", target_os = "android"))]
    pub mod camera2;
}

mod error;
pub use error::*;

mod frame;
pub use frame::*;

pub(crate) mod log;

mod nv21;
pub use nv21::*;

mod open;
pub use open::*;

mod orientation;
pub use orientation::*;

mod plane;
pub use plane::*;

mod session;
pub use session::*;

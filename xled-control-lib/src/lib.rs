//! # xled Control Library
//!
//! `xled-control-lib` is a Rust library for controlling LED light strings that
//! expose the xled REST API. It authenticates against a device with the
//! challenge-response handshake, switches the device's display mode and
//! uploads movies.
//!
//! ## Features
//!
//! - Login and verify handshake producing a session [`Credential`](util::auth::Credential)
//! - Validation and binary encoding of RGB and RGBW movies
//! - Mode control, movie upload, creation and listing
//! - Caller driven cancellation and deadlines for every network call
//!
//! ## Example
//!
//! ```no_run
//! use xled_control_lib::control_interface::ControlInterface;
//! use xled_control_lib::led::pixel::Pixel;
//! use xled_control_lib::util::context::CallContext;
//! use xled_control_lib::util::options::ClientOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ClientOptions::new("192.168.1.100");
//!     let control = ControlInterface::new(&options, CallContext::new()).await?;
//!
//!     control.show_solid_color(Pixel::rgb(255, 0, 0), 600).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with Twinkly or its affiliates.
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// The `control_interface` module talks to an authenticated device: display
// modes, movie upload and the movie library stored on the device.
pub mod control_interface;

// The `led` module holds the pixel, frame and movie types.
pub mod led;

// The `util` module provides authentication, movie encoding, the transport
// seam and the error types shared by the rest of the library.
pub mod util;

pub use util::error::{Error, Result, ValidationError};

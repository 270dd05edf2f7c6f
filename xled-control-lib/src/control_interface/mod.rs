use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use bytes::Bytes;
use clap::ValueEnum;
use log::{debug, info};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::led::pixel::{Frame, LedMovie, LedProfile, Pixel};
use crate::util::auth::{Auth, Credential};
use crate::util::context::CallContext;
use crate::util::error::{Error, Result};
use crate::util::movie::{encode, validate};
use crate::util::options::ClientOptions;
use crate::util::traits::{ResponseCode, ResponseCodeTrait, ERROR_DUPLICATE_UNIQUE_ID};
use crate::util::transport::{decode_json, DeviceRequest, HttpTransport, RequestBody, Transport};

const MODE_PATH: &str = "/xled/v1/led/mode";
const MOVIE_FULL_PATH: &str = "/xled/v1/led/movie/full";
const MOVIE_CONFIG_PATH: &str = "/xled/v1/led/movie/config";
const MOVIES_PATH: &str = "/xled/v1/movies";
const MOVIES_NEW_PATH: &str = "/xled/v1/movies/new";
const MOVIES_FULL_PATH: &str = "/xled/v1/movies/full";

/// Talks to one authenticated device.
#[derive(Clone)]
pub struct ControlInterface {
    credential: Credential,
    transport: Arc<dyn Transport>,
    context: CallContext,
}

impl fmt::Debug for ControlInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlInterface")
            .field("host", self.credential.host())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    Movie,
    Playlist,
    #[serde(rename = "rt")]
    #[value(name = "rt")]
    RealTime,
    Demo,
    Effect,
    Color,
    Off,
}

impl FromStr for DeviceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(DeviceMode::Movie),
            "playlist" => Ok(DeviceMode::Playlist),
            "rt" => Ok(DeviceMode::RealTime),
            "demo" => Ok(DeviceMode::Demo),
            "effect" => Ok(DeviceMode::Effect),
            "color" => Ok(DeviceMode::Color),
            "off" => Ok(DeviceMode::Off),
            _ => Err(anyhow!("Invalid mode")),
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_str = match self {
            DeviceMode::Movie => "movie",
            DeviceMode::Playlist => "playlist",
            DeviceMode::RealTime => "rt",
            DeviceMode::Demo => "demo",
            DeviceMode::Effect => "effect",
            DeviceMode::Color => "color",
            DeviceMode::Off => "off",
        };
        write!(f, "{}", mode_str)
    }
}

/// Mode as reported by the device, which may run firmware with modes unknown here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedMode {
    Known(DeviceMode),
    Other(String),
}

impl From<&str> for ReportedMode {
    fn from(mode: &str) -> Self {
        match mode.parse::<DeviceMode>() {
            Ok(mode) => ReportedMode::Known(mode),
            Err(_) => ReportedMode::Other(mode.to_string()),
        }
    }
}

impl fmt::Display for ReportedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedMode::Known(mode) => write!(f, "{}", mode),
            ReportedMode::Other(mode) => write!(f, "{} (unknown)", mode),
        }
    }
}

/// Metadata of a movie stored on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEntry {
    /// Assigned by the device, absent when creating a movie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub unique_id: String,
    pub descriptor_type: String,
    pub leds_per_frame: usize,
    pub frames_number: usize,
    pub fps: u32,
}

impl MovieEntry {
    pub fn new(name: &str, leds_per_frame: usize, frames_number: usize, fps: u32) -> Self {
        MovieEntry {
            id: None,
            name: name.to_string(),
            unique_id: Uuid::new_v4().to_string().to_uppercase(),
            descriptor_type: descriptor_type(LedProfile::RGB).to_string(),
            leds_per_frame,
            frames_number,
            fps,
        }
    }

    /// Declares the shape of `movie`. The movie itself is not validated here.
    pub fn describe(name: &str, movie: &LedMovie, fps: u32) -> Self {
        let mut entry = Self::new(name, movie.leds_per_frame(), movie.frame_count(), fps);
        if let Some(profile) = movie.profile() {
            entry.descriptor_type = descriptor_type(profile).to_string();
        }
        entry
    }

    pub fn with_unique_id(mut self, unique_id: &str) -> Self {
        self.unique_id = unique_id.to_string();
        self
    }
}

fn descriptor_type(profile: LedProfile) -> &'static str {
    match profile {
        LedProfile::RGB => "rgb_raw",
        LedProfile::RGBW => "rgbw_raw",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMoviesResponse {
    #[serde(default)]
    pub movies: Vec<MovieEntry>,
    #[serde(default)]
    pub available_frames: usize,
    #[serde(default)]
    pub max_capacity: usize,
    #[serde(default)]
    pub code: u32,
}

impl ResponseCodeTrait for ListMoviesResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ModeResponse {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub code: u32,
}

impl ResponseCodeTrait for ModeResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct CodeResponse {
    #[serde(default)]
    code: u32,
}

impl ResponseCodeTrait for CodeResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct UploadMovieResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    frames_number: usize,
}

impl ResponseCodeTrait for UploadMovieResponse {
    fn response_code(&self) -> ResponseCode {
        ResponseCode::from_code(self.code)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MovieConfig {
    pub frame_delay: usize,
    pub leds_number: usize,
    pub frames_number: usize,
}

impl MovieConfig {
    /// The delay is `1000 / frames` in integer milliseconds, so frame counts that
    /// do not divide 1000 get a truncated delay.
    pub fn for_movie(frames_number: usize, leds_number: usize) -> Self {
        MovieConfig {
            frame_delay: 1000 / frames_number.max(1),
            leds_number,
            frames_number,
        }
    }
}

impl ControlInterface {
    /// Authenticates with the device described by `options` over HTTP.
    pub async fn new(options: &ClientOptions, context: CallContext) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(options.timeout)?);
        Self::connect(transport, &options.host, context).await
    }

    /// Authenticates over a caller provided transport.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        host: &str,
        context: CallContext,
    ) -> Result<Self> {
        let credential = Auth::authenticate(transport.as_ref(), host, &context).await?;
        Ok(Self::from_credential(transport, credential, context))
    }

    pub fn from_credential(
        transport: Arc<dyn Transport>,
        credential: Credential,
        context: CallContext,
    ) -> Self {
        ControlInterface {
            credential,
            transport,
            context,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Replaces the cancellation and deadline used for following calls.
    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    async fn call(&self, method: Method, path: &'static str, body: RequestBody) -> Result<Bytes> {
        let request = DeviceRequest::new(method, self.credential.host(), path)
            .with_auth_token(self.credential.token())
            .with_body(body);
        self.context.run(self.transport.round_trip(request)).await
    }

    pub async fn get_mode(&self) -> Result<ReportedMode> {
        let body = self.call(Method::GET, MODE_PATH, RequestBody::Empty).await?;
        let response: ModeResponse = decode_json("get mode", &body)?;
        if !response.is_ok() {
            return Err(Error::unexpected_code("get mode", response.response_code()));
        }
        if response.mode.is_empty() {
            return Err(Error::protocol("get mode", "no mode received"));
        }
        debug!("Mode: {}", response.mode);
        Ok(ReportedMode::from(response.mode.as_str()))
    }

    pub async fn set_mode(&self, mode: DeviceMode, effect_id: u32) -> Result<()> {
        let body = json!({ "mode": mode, "effect_id": effect_id });
        let body = self
            .call(Method::POST, MODE_PATH, RequestBody::Json(body))
            .await?;
        expect_ok("set mode", &body)
    }

    /// Uploads `movie` as the device's current movie and configures its playback.
    pub async fn upload_full_movie(&self, movie: &LedMovie) -> Result<MovieConfig> {
        let data = encode(movie)?;
        let frames_number = movie.frame_count();

        let body = self
            .call(Method::POST, MOVIE_FULL_PATH, RequestBody::Binary(data))
            .await?;
        let response: UploadMovieResponse = decode_json("upload movie", &body)?;
        if !response.is_ok() {
            return Err(Error::unexpected_code("upload movie", response.response_code()));
        }
        if response.frames_number != frames_number {
            return Err(Error::protocol(
                "upload movie",
                format!(
                    "device accepted {} frames, uploaded {}",
                    response.frames_number, frames_number
                ),
            ));
        }

        let config = MovieConfig::for_movie(frames_number, movie.leds_per_frame());
        let body = self
            .call(Method::POST, MOVIE_CONFIG_PATH, RequestBody::Json(json!(config)))
            .await?;
        expect_ok("configure movie", &body)?;
        info!(
            "Uploaded movie with {} frames of {} LEDs",
            config.frames_number, config.leds_number
        );
        Ok(config)
    }

    pub async fn list_movies(&self) -> Result<ListMoviesResponse> {
        let body = self.call(Method::GET, MOVIES_PATH, RequestBody::Empty).await?;
        let response: ListMoviesResponse = decode_json("list movies", &body)?;
        if !response.is_ok() {
            return Err(Error::unexpected_code("list movies", response.response_code()));
        }
        Ok(response)
    }

    /// Stores `movie` on the device under the metadata in `entry`.
    ///
    /// The movie is encoded before anything is sent, so an invalid movie never
    /// leaves a dangling entry behind.
    pub async fn create_movie(&self, entry: &MovieEntry, movie: &LedMovie) -> Result<()> {
        let data = encode(movie)?;

        let body = self
            .call(Method::POST, MOVIES_NEW_PATH, RequestBody::Json(json!(entry)))
            .await?;
        let response: CodeResponse = decode_json("create movie", &body)?;
        match response.response_code() {
            code if code.is_ok() => {}
            code if code == ERROR_DUPLICATE_UNIQUE_ID => {
                return Err(Error::DuplicateIdentifier {
                    unique_id: entry.unique_id.clone(),
                })
            }
            code => return Err(Error::unexpected_code("create movie", code)),
        }

        let body = self
            .call(Method::POST, MOVIES_FULL_PATH, RequestBody::Binary(data))
            .await?;
        expect_ok("upload movie data", &body)?;
        info!("Created movie {} ({})", entry.name, entry.unique_id);
        Ok(())
    }

    /// Shows a single colour on `number_of_led` LEDs as a one frame movie.
    ///
    /// The mode is left untouched when the movie is invalid.
    pub async fn show_solid_color(&self, pixel: Pixel, number_of_led: usize) -> Result<()> {
        let movie = LedMovie::new(vec![Frame::solid(pixel, number_of_led)]);
        validate(&movie)?;
        self.set_mode(DeviceMode::Movie, 0).await?;
        self.upload_full_movie(&movie).await?;
        Ok(())
    }
}

fn expect_ok(operation: &'static str, body: &[u8]) -> Result<()> {
    let response: CodeResponse = decode_json(operation, body)?;
    if response.is_ok() {
        Ok(())
    } else {
        Err(Error::unexpected_code(operation, response.response_code()))
    }
}

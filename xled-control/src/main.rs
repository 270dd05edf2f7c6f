use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use tokio_util::sync::CancellationToken;

use xled_control_lib::control_interface::{ControlInterface, DeviceMode, MovieEntry};
use xled_control_lib::led::pixel::Pixel;
use xled_control_lib::util::context::CallContext;
use xled_control_lib::util::movie::load_movie;
use xled_control_lib::util::options::ClientOptions;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    handle_cli(cli).await
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "xled_control",
    about = "Controls LED devices speaking the xled REST API",
    version = "0.1.0"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Supported output formats for listings.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Subcommand for operations that require device communication
    #[clap(name = "device-call")]
    DeviceCall {
        /// Sets the IP address (or host name) of the device
        #[clap(long)]
        ip: String,

        /// Output format (plaintext, json, yaml)
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,

        /// Request timeout in milliseconds
        #[clap(short = 't', long = "timeout", value_parser = parse_duration, default_value = "5000")]
        timeout: Duration,

        #[clap(subcommand)]
        action: DeviceAction,
    },
}

fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let millis = s
        .parse::<u64>()
        .map_err(|_| "could not parse duration in milliseconds")?;
    Ok(Duration::from_millis(millis))
}

/// Actions available under the `device-call` subcommand
#[derive(Subcommand)]
pub enum DeviceAction {
    /// Gets current device mode.
    #[clap(name = "get-mode")]
    GetMode,
    /// Sets the device mode.
    #[clap(name = "set-mode")]
    SetMode {
        /// The mode to set the device to
        #[clap(value_enum)]
        mode: DeviceMode,

        /// Effect to play in `effect` mode
        #[clap(long, default_value_t = 0)]
        effect_id: u32,
    },
    /// Lists the movies stored on the device.
    #[clap(name = "list-movies")]
    ListMovies,
    /// Uploads a movie file and plays it.
    #[clap(name = "upload-movie")]
    UploadMovie {
        /// Movie file: a `frames leds bytes_per_led fps` header and one hex line per frame
        file: PathBuf,
    },
    /// Stores a movie file in the device's movie library.
    #[clap(name = "create-movie")]
    CreateMovie {
        file: PathBuf,

        /// Display name of the movie
        #[clap(long)]
        name: String,

        /// Unique id of the movie, a random UUID when omitted
        #[clap(long)]
        unique_id: Option<String>,
    },
    /// Shows a solid color by uploading a one frame movie.
    #[clap(name = "show-color")]
    ShowColor {
        /// Red component of the color (0-255)
        red: u8,
        /// Green component of the color (0-255)
        green: u8,
        /// Blue component of the color (0-255)
        blue: u8,

        /// White component, for RGBW devices
        #[clap(short = 'w', long = "white")]
        white: Option<u8>,

        /// Number of LEDs on the device
        #[clap(long)]
        leds: usize,
    },
}

async fn handle_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::DeviceCall {
            ip,
            output,
            timeout,
            action,
        } => {
            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling the running call");
                    ctrl_c.cancel();
                }
            });

            let options = ClientOptions::new(ip).with_timeout(timeout);
            let control_interface =
                ControlInterface::new(&options, CallContext::with_cancellation(cancel))
                    .await
                    .context("Failed to log in")?;

            match action {
                DeviceAction::GetMode => {
                    let mode = control_interface.get_mode().await?;
                    println!("Current mode: {}", mode);
                }
                DeviceAction::SetMode { mode, effect_id } => {
                    control_interface.set_mode(mode, effect_id).await?;
                    println!("Mode set to: {}", mode);
                }
                DeviceAction::ListMovies => {
                    let movies = control_interface.list_movies().await?;
                    match output {
                        OutputFormat::Plaintext => {
                            for movie in &movies.movies {
                                println!(
                                    "{:>3} {} [{}] {} frames x {} LEDs @ {} fps",
                                    movie.id.map(|id| id.to_string()).unwrap_or_default(),
                                    movie.name,
                                    movie.unique_id,
                                    movie.frames_number,
                                    movie.leds_per_frame,
                                    movie.fps
                                );
                            }
                            println!(
                                "Available frames: {} of {}",
                                movies.available_frames, movies.max_capacity
                            );
                        }
                        OutputFormat::Json => {
                            let json = serde_json::to_string(&movies)?;
                            println!("{}", json);
                        }
                        OutputFormat::Yaml => {
                            let yaml = serde_yaml::to_string(&movies)?;
                            println!("{}", yaml);
                        }
                    }
                }
                DeviceAction::UploadMovie { file } => {
                    let (movie, _fps) = load_movie(&file)?;
                    control_interface.set_mode(DeviceMode::Movie, 0).await?;
                    let config = control_interface.upload_full_movie(&movie).await?;
                    println!(
                        "Uploaded {} frames of {} LEDs, {} ms per frame",
                        config.frames_number, config.leds_number, config.frame_delay
                    );
                }
                DeviceAction::CreateMovie {
                    file,
                    name,
                    unique_id,
                } => {
                    let (movie, fps) = load_movie(&file)?;
                    let mut entry = MovieEntry::describe(&name, &movie, fps.round().max(1.0) as u32);
                    if let Some(unique_id) = unique_id {
                        entry = entry.with_unique_id(&unique_id);
                    }
                    control_interface.create_movie(&entry, &movie).await?;
                    println!("Created movie {} ({})", entry.name, entry.unique_id);
                }
                DeviceAction::ShowColor {
                    red,
                    green,
                    blue,
                    white,
                    leds,
                } => {
                    let pixel = match white {
                        Some(white) => Pixel::rgbw(red, green, blue, white),
                        None => Pixel::rgb(red, green, blue),
                    };
                    control_interface.show_solid_color(pixel, leds).await?;
                    println!("Displayed color: {:?}", pixel);
                }
            }
        }
    }

    Ok(())
}

//! queuedctl
//!
//! Command-line interface for a media-queue daemon.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use queued_client::{Client, Config, EventSink, TrackInfo};

/// Control a media-queue daemon
#[derive(Parser, Debug)]
#[command(name = "queuedctl")]
#[command(about = "CLI for a media-queue daemon")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "9599")]
    port: u16,

    /// Username
    #[arg(short, long)]
    username: String,

    /// Password
    #[arg(short = 'w', long)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the server version
    Version,

    /// Show the playing track
    Playing,

    /// Show the queue
    Queue,

    /// Show recently played tracks
    Recent,

    /// Queue a track
    Play {
        /// The track to queue
        track: String,
    },

    /// Remove a track from the queue
    Remove {
        /// The queue ID to remove
        id: String,
    },

    /// Scratch the playing track, or a given queue ID
    Scratch {
        /// The queue ID to scratch
        id: Option<String>,
    },

    /// Pause play
    Pause,

    /// Resume play
    Resume,

    /// Enable play
    Enable,

    /// Disable play
    Disable,

    /// Show or set the volume
    Volume {
        /// Left channel volume
        left: Option<u32>,

        /// Right channel volume
        right: Option<u32>,
    },

    /// Search for tracks
    Search {
        /// Search terms
        terms: String,
    },

    /// Print server statistics
    Stats,

    /// Follow the server's event stream
    Log,
}

/// Sink that prints each event to stdout
struct PrintingSink;

impl EventSink for PrintingSink {
    fn completed(&mut self, track: &str) {
        println!("completed {}", track);
    }

    fn failed(&mut self, track: &str, error: &str) {
        println!("failed {} ({})", track, error);
    }

    fn playing(&mut self, track: &str, username: Option<&str>) {
        match username {
            Some(username) => println!("playing {} (picked by {})", track, username),
            None => println!("playing {}", track),
        }
    }

    fn queue(&mut self, entry: TrackInfo) {
        println!("queued {}", entry.track.as_deref().unwrap_or("?"));
    }

    fn scratched(&mut self, track: &str, username: &str) {
        println!("scratched {} (by {})", track, username);
    }

    fn volume(&mut self, left: u32, right: u32) {
        println!("volume {}/{}", left, right);
    }
}

fn print_track(prefix: &str, info: &TrackInfo) {
    println!(
        "{}{} [{}]",
        prefix,
        info.track.as_deref().unwrap_or("?"),
        info.id.as_deref().unwrap_or("-"),
    );
}

fn run(client: &Client, command: Commands) -> queued_client::Result<()> {
    match command {
        Commands::Version => println!("{}", client.version()?),
        Commands::Playing => match client.playing()? {
            Some(info) => print_track("", &info),
            None => println!("nothing playing"),
        },
        Commands::Queue => {
            for info in client.queue()? {
                print_track("", &info);
            }
        }
        Commands::Recent => {
            for info in client.recent()? {
                print_track("", &info);
            }
        }
        Commands::Play { track } => {
            let id = client.play(&track)?;
            println!("{}", id);
        }
        Commands::Remove { id } => client.remove(&id)?,
        Commands::Scratch { id } => client.scratch(id.as_deref())?,
        Commands::Pause => client.pause()?,
        Commands::Resume => client.resume()?,
        Commands::Enable => client.enable()?,
        Commands::Disable => client.disable()?,
        Commands::Volume { left, right } => {
            let (left, right) = match (left, right) {
                (Some(left), Some(right)) => client.set_volume(left, right)?,
                (None, None) => client.volume()?,
                _ => {
                    eprintln!("volume takes zero or two arguments");
                    std::process::exit(2);
                }
            };
            println!("{} {}", left, right);
        }
        Commands::Search { terms } => {
            for track in client.search(&terms)? {
                println!("{}", track);
            }
        }
        Commands::Stats => {
            for line in client.stats()? {
                println!("{}", line);
            }
        }
        Commands::Log => {
            client.monitor(&mut PrintingSink)?;
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,queued_client=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .host(args.host)
        .port(args.port)
        .username(args.username)
        .password(args.password)
        .build();
    let client = Client::new(config);

    if let Err(e) = run(&client, args.command) {
        eprintln!("queuedctl: {}", e);
        std::process::exit(1);
    }
}

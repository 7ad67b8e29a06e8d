use clap::{Parser, Subcommand};
use std::env;
use wfmu_client::{WfmuClientImpl, WfmuError};

/// WFMU now-playing, playlists, comments and favorites
#[derive(Parser)]
#[command(
    name = "wfmu",
    about = "WFMU now-playing, playlists, comments and favorites",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what is on the air right now
    NowPlaying,
    /// List the songs of a playlist (defaults to the show on air)
    Playlist {
        /// Playlist id
        id: Option<String>,
    },
    /// List the comments on the current playlist
    Comments,
    /// List your favorite songs (requires login)
    Favorites,
    /// Post a comment on a playlist (requires login)
    Comment {
        /// Comment text
        text: String,
        /// Playlist id (defaults to the show on air)
        #[arg(long)]
        playlist: Option<String>,
    },
    /// Add a song to your favorites (requires login)
    Favorite {
        /// Song id (defaults to the song on air)
        #[arg(long)]
        song: Option<String>,
        /// Playlist id (defaults to the show on air)
        #[arg(long)]
        playlist: Option<String>,
    },
    /// Remove a song from your favorites (requires login)
    Unfavorite {
        #[arg(long)]
        song: Option<String>,
        #[arg(long)]
        playlist: Option<String>,
    },
}

impl Commands {
    fn needs_login(&self) -> bool {
        !matches!(
            self,
            Commands::NowPlaying | Commands::Playlist { .. } | Commands::Comments
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let client = WfmuClientImpl::new(Box::new(http_client::native::NativeClient::new()));

    if args.command.needs_login() {
        let (username, password) = match get_credentials() {
            Ok(creds) => creds,
            Err(e) => {
                eprintln!("❌ Error: {e}");
                eprintln!();
                eprintln!("Please set the following environment variables:");
                eprintln!("  WFMU_USERNAME=your_wfmu_username");
                eprintln!("  WFMU_PASSWORD=your_wfmu_password");
                std::process::exit(1);
            }
        };

        if let Err(e) = client.login(&username, &password).await {
            eprintln!("❌ Login failed: {e}");
            std::process::exit(1);
        }
        log::debug!("Logged in as {username}");
    }

    if let Err(e) = execute_command(args.command, &client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn execute_command(command: Commands, client: &WfmuClientImpl) -> Result<(), WfmuError> {
    match command {
        Commands::NowPlaying => {
            let now = client.poll_status().await?;
            println!("📻 {}", now.show);
            if now.show.setbreak {
                println!("   (set break)");
            } else {
                println!("🎵 {}", now.song);
            }
        }
        Commands::Playlist { id } => {
            let songs = match id {
                Some(id) => client.get_playlist(&id).await?,
                None => client.get_current_playlist().await?,
            };
            for (index, song) in songs.iter().enumerate() {
                println!("{:3}. {song}", index + 1);
            }
        }
        Commands::Comments => {
            for comment in client.get_comments().await? {
                println!("{comment}");
            }
        }
        Commands::Favorites => {
            let songs = client.get_favorites().await?;
            if songs.is_empty() {
                println!("No favorites yet");
            }
            for song in songs {
                println!("❤️  {song} (song {})", song.song_id);
            }
        }
        Commands::Comment { text, playlist } => {
            if playlist.is_none() {
                client.poll_status().await?;
            }
            client.post_comment(&text, playlist.as_deref()).await?;
            println!("✅ Comment submitted");
        }
        Commands::Favorite { song, playlist } => {
            if song.is_none() || playlist.is_none() {
                client.poll_status().await?;
            }
            client
                .favorite(song.as_deref(), playlist.as_deref())
                .await?;
            println!("✅ Favorite submitted");
        }
        Commands::Unfavorite { song, playlist } => {
            if song.is_none() || playlist.is_none() {
                client.poll_status().await?;
            }
            client
                .unfavorite(song.as_deref(), playlist.as_deref())
                .await?;
            println!("✅ Unfavorite submitted");
        }
    }
    Ok(())
}

/// Get username and password from environment variables
fn get_credentials() -> Result<(String, String), Box<dyn std::error::Error>> {
    let username =
        env::var("WFMU_USERNAME").map_err(|_| "WFMU_USERNAME environment variable not set")?;
    let password =
        env::var("WFMU_PASSWORD").map_err(|_| "WFMU_PASSWORD environment variable not set")?;
    Ok((username, password))
}

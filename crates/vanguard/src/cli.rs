//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Run every site effect headless and optionally check the backend.
#[derive(Debug, Parser)]
#[command(
    name = "vanguard",
    version,
    about = "Run the VANGUARD page effects headless and diagnose the hosted backend"
)]
pub struct Args {
    /// Effects config (TOML). Defaults are used when omitted.
    #[arg(long, value_name = "FX_TOML")]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value = "600")]
    pub frames: u32,

    /// Simulated frame time in seconds.
    #[arg(long, default_value = "0.016")]
    pub dt: f32,

    /// Viewport width in pixels.
    #[arg(long, default_value = "1920")]
    pub width: f32,

    /// Viewport height in pixels.
    #[arg(long, default_value = "1080")]
    pub height: f32,

    /// Content catalog (TOML) to load and summarize.
    #[arg(long, value_name = "CATALOG_TOML")]
    pub catalog: Option<PathBuf>,

    /// Drive the admin screens against an in-memory copy of the catalog.
    #[arg(long)]
    pub offline: bool,

    /// Hero search used by the offline run.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Ping the hosted backend after the frames.
    #[arg(long)]
    pub check_backend: bool,

    /// Backend config (TOML). Credentials otherwise come from the environment.
    #[arg(long, value_name = "BACKEND_TOML", env = "VANGUARD_BACKEND_CONFIG")]
    pub backend_config: Option<PathBuf>,

    /// Show debug logs.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["vanguard"]).unwrap();
        assert_eq!(args.frames, 600);
        assert!(args.config.is_none());
        assert!(!args.check_backend);
        assert!(!args.offline);
        assert!((args.width - 1920.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "vanguard",
            "--config",
            "fx.toml",
            "--frames",
            "30",
            "--check-backend",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("fx.toml")));
        assert_eq!(args.frames, 30);
        assert!(args.check_backend);
        assert!(args.verbose);
    }

    #[test]
    fn test_rejects_bad_frame_count() {
        assert!(Args::try_parse_from(["vanguard", "--frames", "-1"]).is_err());
    }
}

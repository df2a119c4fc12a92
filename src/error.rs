use thiserror::Error;

#[derive(Error, Debug)]
pub enum MsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video file not found: {0}")]
    MissingInputFile(String),

    #[error("Subtitle file not found: {0}")]
    MissingSubtitleFile(String),

    #[error("Invalid mode '{0}'. Use 1-5 or one of: mkv, mp4, burn, burn-gpu, burn-lowres")]
    InvalidMode(String),

    #[error("Failed to launch {program}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", describe_exit(.code))]
    ProcessExit { program: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, MsubError>;

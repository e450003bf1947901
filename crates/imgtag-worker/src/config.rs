//! Command line and pipeline configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use imgtag_vision::{ModelConfig, ModelName, DEFAULT_TOP_K};

use crate::error::{WorkerError, WorkerResult};

/// Process posts from stdin and label the attached images.
#[derive(Debug, Parser)]
#[command(name = "imgtag", version, about)]
pub struct Cli {
    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pre-trained network to classify with
    #[arg(short, long, default_value = "vgg16", global = true)]
    pub model: String,

    /// Number of predictions per image
    #[arg(short = 'k', long = "topk", default_value_t = DEFAULT_TOP_K, value_parser = parse_top_k, global = true)]
    pub top_k: usize,

    /// Also write predictions to the log
    #[arg(short = 'l', long = "logpreds", global = true)]
    pub log_predictions: bool,

    /// Directory holding `<model>/<model>.onnx` and the class index
    #[arg(long, env = "IMGTAG_MODEL_DIR", default_value = "models", global = true)]
    pub model_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Classify records read from stdin (default)
    Stream,
    /// Classify local image files
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn parse_top_k(s: &str) -> Result<usize, String> {
    let k: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a positive integer", s))?;
    if k == 0 {
        return Err("top-k must be at least 1".to_string());
    }
    Ok(k)
}

/// Settings shared by the stream and classify commands.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model: String,
    pub model_dir: PathBuf,
    pub top_k: usize,
    pub log_predictions: bool,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: ModelName::Vgg16.as_str().to_string(),
            model_dir: PathBuf::from("models"),
            top_k: DEFAULT_TOP_K,
            log_predictions: false,
            verbose: false,
        }
    }
}

impl From<&Cli> for PipelineConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            model: cli.model.clone(),
            model_dir: cli.model_dir.clone(),
            top_k: cli.top_k,
            log_predictions: cli.log_predictions,
            verbose: cli.verbose,
        }
    }
}

impl PipelineConfig {
    /// Reject settings that would fail before the first record.
    pub fn validate(&self) -> WorkerResult<ModelName> {
        if self.top_k == 0 {
            return Err(WorkerError::config_error("top-k must be at least 1"));
        }
        self.model
            .parse::<ModelName>()
            .map_err(|e| WorkerError::config_error(e.to_string()))
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(self.model_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var("IMGTAG_MODEL_DIR");
        let cli = Cli::try_parse_from(["imgtag"]).unwrap();

        assert!(!cli.verbose);
        assert_eq!(cli.model, "vgg16");
        assert_eq!(cli.top_k, 5);
        assert!(!cli.log_predictions);
        assert_eq!(cli.model_dir, PathBuf::from("models"));
        assert_eq!(cli.command, None);
    }

    #[test]
    #[serial]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["imgtag", "-v", "-m", "VGG16", "-k", "3", "-l"]).unwrap();
        let config = PipelineConfig::from(&cli);

        assert!(config.verbose);
        assert!(config.log_predictions);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.validate().unwrap(), ModelName::Vgg16);
    }

    #[test]
    #[serial]
    fn test_zero_top_k_rejected() {
        assert!(Cli::try_parse_from(["imgtag", "--topk", "0"]).is_err());
        assert!(Cli::try_parse_from(["imgtag", "--topk", "five"]).is_err());
    }

    #[test]
    #[serial]
    fn test_classify_subcommand() {
        let cli = Cli::try_parse_from(["imgtag", "classify", "a.jpg", "b.png", "-k", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Classify {
                paths: vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]
            })
        );
        assert_eq!(cli.top_k, 2);

        assert!(Cli::try_parse_from(["imgtag", "classify"]).is_err());
    }

    #[test]
    #[serial]
    fn test_model_dir_from_env() {
        std::env::set_var("IMGTAG_MODEL_DIR", "/opt/weights");
        let cli = Cli::try_parse_from(["imgtag", "stream"]).unwrap();
        std::env::remove_var("IMGTAG_MODEL_DIR");

        assert_eq!(cli.model_dir, PathBuf::from("/opt/weights"));
        assert_eq!(cli.command, Some(Command::Stream));
    }

    #[test]
    fn test_unsupported_model() {
        let config = PipelineConfig {
            model: "resnet50".to_string(),
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();

        assert!(matches!(err, WorkerError::ConfigError(_)));
        assert!(err.is_startup_error());
    }
}

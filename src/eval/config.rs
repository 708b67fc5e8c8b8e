//! Evaluation run configuration.

use std::path::PathBuf;

use tch::Device;

use crate::core::BERTScorerConfig;
use crate::metrics::DEFAULT_MAX_N;

/// Settings for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Directory holding the `*.json` record collections
    pub input_dir: PathBuf,
    /// Destination of the scorecard CSV
    pub output_path: PathBuf,
    /// Highest n-gram order used by density
    pub max_n: usize,
    /// Language of the texts; selects the semantic encoder
    pub language: String,
    /// Pairs per encoder forward pass
    pub batch_size: usize,
    /// Hidden-state index override for the encoder
    pub num_layers: Option<i32>,
    /// Run the encoder on CPU even when CUDA is available
    pub force_cpu: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("faza3"),
            output_path: PathBuf::from("Metrike_sumarizacija_inicijali.csv"),
            max_n: DEFAULT_MAX_N,
            language: "en".into(),
            batch_size: 64,
            num_layers: None,
            force_cpu: false,
        }
    }
}

impl EvalConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    pub fn max_n(mut self, max_n: usize) -> Self {
        self.max_n = max_n;
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn num_layers(mut self, layer: Option<i32>) -> Self {
        self.num_layers = layer;
        self
    }

    pub fn force_cpu(mut self, force_cpu: bool) -> Self {
        self.force_cpu = force_cpu;
        self
    }

    /// Semantic scorer settings derived from this run's language and device choice.
    pub fn scorer_config(&self) -> BERTScorerConfig {
        let mut config = BERTScorerConfig::for_language(&self.language);
        config.batch_size = self.batch_size;
        config.device = if self.force_cpu {
            Device::Cpu
        } else {
            Device::cuda_if_available()
        };
        if self.num_layers.is_some() {
            config.num_layers = self.num_layers;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.max_n, 3);
        assert_eq!(config.language, "en");
        assert_eq!(config.batch_size, 64);
        assert!(config.num_layers.is_none());
    }

    #[test]
    fn test_scorer_config_follows_run_settings() {
        let config = EvalConfig::new("in", "out.csv")
            .language("bs")
            .batch_size(8)
            .num_layers(Some(-2))
            .force_cpu(true);
        let scorer = config.scorer_config();

        assert_eq!(scorer.language, "bs");
        assert_eq!(scorer.batch_size, 8);
        assert_eq!(scorer.num_layers, Some(-2));
        assert_eq!(scorer.device, Device::Cpu);
    }

    #[test]
    fn test_layer_default_comes_from_language() {
        let scorer = EvalConfig::new("in", "out.csv").force_cpu(true).scorer_config();
        assert_eq!(scorer.num_layers, BERTScorerConfig::for_language("en").num_layers);
    }
}

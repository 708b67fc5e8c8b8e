//! Pretrained encoder loading and hidden-state extraction.

use crate::Result;
use rust_bert::bert::{BertConfig, BertConfigResources, BertEmbeddings, BertModel, BertModelResources};
use rust_bert::pipelines::common::ModelType;
use rust_bert::resources::{RemoteResource, ResourceProvider};
use rust_bert::roberta::{
    RobertaConfig, RobertaConfigResources, RobertaForMaskedLM, RobertaModelResources,
};
use rust_bert::Config;
use tch::{nn::VarStore, no_grad, Device, Tensor};

/// Encoder families used for semantic similarity.
enum Encoder {
    Bert(BertModel<BertEmbeddings>),
    Roberta(RobertaForMaskedLM),
}

/// A loaded encoder with its weights.
pub struct Model {
    _vs: VarStore,
    encoder: Encoder,
    device: Device,
}

fn remote_resources(model_type: ModelType) -> Result<(RemoteResource, RemoteResource)> {
    match model_type {
        ModelType::Bert => Ok((
            RemoteResource::from_pretrained(BertConfigResources::BERT),
            RemoteResource::from_pretrained(BertModelResources::BERT),
        )),
        ModelType::Roberta => Ok((
            RemoteResource::from_pretrained(RobertaConfigResources::ROBERTA),
            RemoteResource::from_pretrained(RobertaModelResources::ROBERTA),
        )),
        other => Err(anyhow::anyhow!(
            "encoder type {:?} is not supported for semantic scoring",
            other
        )),
    }
}

impl Model {
    /// Loads pretrained weights for `model_type`, configured to return every hidden state.
    ///
    /// Weights are fetched into the rust-bert resource cache on first use.
    pub fn new(model_type: ModelType, device: Device) -> Result<Self> {
        let (config_resource, weights_resource) = remote_resources(model_type)?;
        let config_path = config_resource.get_local_path()?;
        let weights_path = weights_resource.get_local_path()?;

        let mut var_store = VarStore::new(device);
        let encoder = match model_type {
            ModelType::Bert => {
                let mut config = BertConfig::from_file(config_path);
                config.output_hidden_states = Some(true);
                Encoder::Bert(BertModel::<BertEmbeddings>::new(var_store.root(), &config))
            }
            _ => {
                let mut config = RobertaConfig::from_file(config_path);
                config.output_hidden_states = Some(true);
                Encoder::Roberta(RobertaForMaskedLM::new(var_store.root(), &config))
            }
        };
        var_store.load(weights_path)?;

        Ok(Model {
            _vs: var_store,
            encoder,
            device,
        })
    }

    /// Runs the encoder without gradients and returns the hidden states of every layer.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        attention_mask: &Tensor,
        token_type_ids: Option<&Tensor>,
    ) -> Result<Vec<Tensor>> {
        let input_ids = input_ids.to_device(self.device);
        let attention_mask = attention_mask.to_device(self.device);
        let token_type_ids = token_type_ids.map(|t| t.to_device(self.device));

        let hidden_states = no_grad(|| match &self.encoder {
            Encoder::Bert(model) => model
                .forward_t(
                    Some(&input_ids),
                    Some(&attention_mask),
                    token_type_ids.as_ref(),
                    None,
                    None,
                    None,
                    None,
                    false,
                )
                .map(|output| output.all_hidden_states)
                .map_err(anyhow::Error::from),
            Encoder::Roberta(model) => Ok(model
                .forward_t(
                    Some(&input_ids),
                    Some(&attention_mask),
                    None,
                    None,
                    None,
                    None,
                    None,
                    false,
                )
                .all_hidden_states),
        })?;

        hidden_states.ok_or_else(|| anyhow::anyhow!("encoder returned no hidden states"))
    }
}

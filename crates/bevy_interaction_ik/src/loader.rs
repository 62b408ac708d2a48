use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    log::warn,
    reflect::TypePath,
};
use bevy_interaction_ik_core::definition::InteractionDefinition;

use crate::errors::AssetLoaderError;

#[derive(Default, TypePath)]
pub struct InteractionDefinitionLoader;

impl AssetLoader for InteractionDefinitionLoader {
    type Asset = InteractionDefinition;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let definition = parse_definition(&bytes)?;
        Ok(definition)
    }

    fn extensions(&self) -> &[&str] {
        &["interaction.ron"]
    }
}

pub(crate) fn parse_definition(bytes: &[u8]) -> Result<InteractionDefinition, AssetLoaderError> {
    let definition: InteractionDefinition = ron::de::from_bytes(bytes)?;

    for multiplier in definition
        .multipliers
        .iter()
        .filter(|m| m.is_self_referencing())
    {
        warn!(
            "Multiplier on {:?} is driven by its own curve and will be ignored",
            multiplier.result
        );
    }

    Ok(definition)
}

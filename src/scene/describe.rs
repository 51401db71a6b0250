//! Scene model introspection.

pub use super::*;

use humansize::{format_size, BINARY};
use std::fmt;

/// Description of a scene model and its listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneDescription {
    pub backend: String,
    pub encoder: String,
    pub generator: String,
    pub parameter_count: usize,
    pub size_readable: String,
    /// In registration order.
    pub listeners: Vec<ListenerDescription>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerDescription {
    pub name: String,
    pub model: String,
}

impl<B: Backend, E: RepresentationEncoder<B>, G: GenerativeNetwork<B>>
    SceneModel<B, E, G>
{
    /// Number of parameters in the encoder and the generator.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.encoder.num_params() + self.generator.num_params()
    }

    /// Size of the parameters in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.parameter_count() * size_of::<B::FloatElem>()
    }

    /// Readable size of the parameters.
    #[inline]
    pub fn size_readable(&self) -> String {
        format_size(self.size(), BINARY.decimal_places(1))
    }

    pub fn describe(&self) -> SceneDescription {
        let listeners = self
            .listeners()
            .iter()
            .map(|(name, model)| ListenerDescription {
                name: name.to_owned(),
                model: format!("{model:?}"),
            })
            .collect();

        SceneDescription {
            backend: B::name(),
            encoder: format!("{:?}", self.encoder),
            generator: format!("{:?}", self.generator),
            parameter_count: self.parameter_count(),
            size_readable: self.size_readable(),
            listeners,
        }
    }
}

impl fmt::Display for SceneDescription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "SceneModel<{}> ({} parameters, {})",
            self.backend, self.parameter_count, self.size_readable
        )?;
        writeln!(f, "Encoder: {}", self.encoder)?;
        writeln!(f, "Generator: {}", self.generator)?;
        write!(f, "Listeners: {}", self.listeners.len())?;
        for (index, listener) in self.listeners.iter().enumerate() {
            write!(f, "\n[{index}] {}: {}", listener.name, listener.model)?;
        }
        Ok(())
    }
}

pub use super::*;
pub use crate::{generator::GeneratorConfig, representation::TowerConfig};
pub use burn::config::Config;

use crate::preset::gqn::{
    HIDDEN_DIM, LATENT_DIM, LATENT_SCALE, REFINEMENT_COUNT, REPRESENTATION_DIM,
};

/// The configuration for [`Gqn`].
#[derive(Config, Copy, Debug)]
pub struct GqnConfig {
    /// Image channels.
    pub x_dim: usize,
    /// Viewpoint dimension.
    pub v_dim: usize,
    /// Representation channels.
    #[config(default = "REPRESENTATION_DIM")]
    pub r_dim: usize,
    /// Hidden channels of the recurrent cores.
    #[config(default = "HIDDEN_DIM")]
    pub h_dim: usize,
    /// Latent channels.
    #[config(default = "LATENT_DIM")]
    pub z_dim: usize,
    /// Number of refinement steps, `L`.
    #[config(default = "REFINEMENT_COUNT")]
    pub refinement_count: usize,
    /// Average the representation over the spatial dimensions.
    #[config(default = true)]
    pub pool: bool,
}

impl GqnConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let dims = [
            ("x_dim", self.x_dim),
            ("v_dim", self.v_dim),
            ("r_dim", self.r_dim),
            ("h_dim", self.h_dim),
            ("z_dim", self.z_dim),
            ("refinement_count", self.refinement_count),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(Error::Validation(
                    format!("GqnConfig::{name}"),
                    "positive".into(),
                ));
            }
        }

        Ok(())
    }

    #[inline]
    pub fn tower(&self) -> TowerConfig {
        TowerConfig::new(self.x_dim, self.v_dim)
            .with_r_dim(self.r_dim)
            .with_pool(self.pool)
    }

    #[inline]
    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.x_dim, self.v_dim, self.r_dim)
            .with_h_dim(self.h_dim)
            .with_z_dim(self.z_dim)
            .with_refinement_count(self.refinement_count)
            .with_scale(LATENT_SCALE)
    }

    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<Gqn<B>, Error> {
        self.validate()?;

        #[cfg(debug_assertions)]
        log::debug!(target: "gqn::scene", "GqnConfig::init > {self:?}");

        Ok(SceneModel::new(
            self.tower().init(device),
            self.generator().init(device),
        ))
    }
}

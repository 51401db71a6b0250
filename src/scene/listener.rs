//! Listeners, auxiliary models consuming the scene representation.

pub use super::*;

use std::fmt;

/// An auxiliary model for a downstream task on the scene representation.
pub trait Listener<B: Backend>: 'static + Send + fmt::Debug {
    /// Runs the task on the inputs of the current scene.
    ///
    /// The output is batch-major with any rank up to 4, e.g. `[B, F]` for
    /// features or `[B, C, H, W]` for images. Tensors convert into
    /// [`ListenerTensor`] with `into()`.
    fn listen(
        &self,
        input: &ListenerInput<B>,
    ) -> Result<ListenerTensor<B>, Error>;
}

/// Inputs given to every listener.
///
/// They are the real query and the real aggregated representation
/// of the current scene batch.
#[derive(Clone)]
pub struct ListenerInput<B: Backend> {
    /// `[B, C, H, W]`
    pub image: Tensor<B, 4>,
    /// `[B, K]`
    pub viewpoint: Tensor<B, 2>,
    /// `[B, R, R_y, R_x]`
    pub representation: Tensor<B, 4>,
}

/// Output of a listener, keeping its own rank.
#[derive(Clone)]
pub enum ListenerTensor<B: Backend> {
    /// `[B]`
    Rank1(Tensor<B, 1>),
    /// `[B, F]`
    Rank2(Tensor<B, 2>),
    /// `[B, L, F]`
    Rank3(Tensor<B, 3>),
    /// `[B, C, H, W]`
    Rank4(Tensor<B, 4>),
}

impl<B: Backend> ListenerTensor<B> {
    pub fn rank(&self) -> usize {
        match self {
            Self::Rank1(_) => 1,
            Self::Rank2(_) => 2,
            Self::Rank3(_) => 3,
            Self::Rank4(_) => 4,
        }
    }

    pub fn dims(&self) -> Vec<usize> {
        match self {
            Self::Rank1(tensor) => tensor.dims().to_vec(),
            Self::Rank2(tensor) => tensor.dims().to_vec(),
            Self::Rank3(tensor) => tensor.dims().to_vec(),
            Self::Rank4(tensor) => tensor.dims().to_vec(),
        }
    }

    pub fn into_data(self) -> TensorData {
        match self {
            Self::Rank1(tensor) => tensor.into_data(),
            Self::Rank2(tensor) => tensor.into_data(),
            Self::Rank3(tensor) => tensor.into_data(),
            Self::Rank4(tensor) => tensor.into_data(),
        }
    }

    /// Flattens every dimension after the batch one, `[B, F]`.
    pub fn flatten(self) -> Tensor<B, 2> {
        match self {
            Self::Rank1(tensor) => tensor.unsqueeze_dim(1),
            Self::Rank2(tensor) => tensor,
            Self::Rank3(tensor) => tensor.flatten(1, 2),
            Self::Rank4(tensor) => tensor.flatten(1, 3),
        }
    }
}

impl<B: Backend> From<Tensor<B, 1>> for ListenerTensor<B> {
    #[inline]
    fn from(tensor: Tensor<B, 1>) -> Self {
        Self::Rank1(tensor)
    }
}

impl<B: Backend> From<Tensor<B, 2>> for ListenerTensor<B> {
    #[inline]
    fn from(tensor: Tensor<B, 2>) -> Self {
        Self::Rank2(tensor)
    }
}

impl<B: Backend> From<Tensor<B, 3>> for ListenerTensor<B> {
    #[inline]
    fn from(tensor: Tensor<B, 3>) -> Self {
        Self::Rank3(tensor)
    }
}

impl<B: Backend> From<Tensor<B, 4>> for ListenerTensor<B> {
    #[inline]
    fn from(tensor: Tensor<B, 4>) -> Self {
        Self::Rank4(tensor)
    }
}

#[derive(Clone)]
pub struct ListenerOutput<B: Backend> {
    /// Name given at registration.
    pub name: String,
    /// `[B, ..]`
    pub output: ListenerTensor<B>,
}

/// Ordered registry of named listeners.
///
/// Names are not unique and the registration order is kept.
pub struct ListenerRegistry<B: Backend> {
    entries: Vec<(Box<dyn Listener<B>>, String)>,
}

impl<B: Backend> ListenerRegistry<B> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends the listener.
    pub fn register(
        &mut self,
        model: Box<dyn Listener<B>>,
        name: String,
    ) {
        #[cfg(debug_assertions)]
        log::debug!(
            target: "gqn::scene",
            "ListenerRegistry::register > {name} at {}",
            self.entries.len(),
        );

        self.entries.push((model, name));
    }

    /// Iterates `(name, model)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Listener<B>)> {
        self.entries
            .iter()
            .map(|(model, name)| (name.as_str(), model.as_ref()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every listener in registration order.
    ///
    /// The first failure aborts the remaining listeners.
    pub fn dispatch(
        &self,
        input: &ListenerInput<B>,
    ) -> Result<Vec<ListenerOutput<B>>, Error> {
        let mut outputs = Vec::with_capacity(self.len());

        for (name, model) in self.iter() {
            log::info!(target: "gqn::scene", "Running listener {name}");

            let output = model.listen(input).map_err(|error| match error {
                Error::Listener { .. } => error,
                error => Error::Listener {
                    name: name.to_owned(),
                    reason: error.to_string(),
                },
            })?;

            outputs.push(ListenerOutput {
                name: name.to_owned(),
                output,
            });
        }

        Ok(outputs)
    }
}

impl<B: Backend> Default for ListenerRegistry<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for ListenerRegistry<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(model, name)| (name, model)))
            .finish()
    }
}

impl<B: Backend> fmt::Debug for ListenerInput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("ListenerInput<{}>", B::name()))
            .field("image.dims()", &self.image.dims())
            .field("viewpoint.dims()", &self.viewpoint.dims())
            .field("representation.dims()", &self.representation.dims())
            .finish()
    }
}

impl<B: Backend> fmt::Debug for ListenerTensor<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "ListenerTensor<{}>{:?}", B::name(), self.dims())
    }
}

impl<B: Backend> fmt::Debug for ListenerOutput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("ListenerOutput<{}>", B::name()))
            .field("name", &self.name)
            .field("output.dims()", &self.output.dims())
            .finish()
    }
}

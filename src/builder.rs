use crate::{Injector, Parameters};

/// A builder for an `Injector`.
///
/// ```
/// use keyed_injector::{Injector, Parameters, Value};
///
/// let injector = Injector::builder()
///     .self_id("container")
///     .deep_resolution(true)
///     .parameters(Parameters::new().with("env", "prod"))
///     .build();
///
/// assert!(injector.has("container"));
/// assert!(injector.deep_resolution());
/// assert_eq!(Some(Value::from("prod")), injector.get_parameter("env"));
/// ```
#[derive(Debug)]
pub struct InjectorBuilder {
    self_id: String,
    deep_resolution: bool,
    parameters: Option<Parameters>,
}

impl Default for InjectorBuilder {
    fn default() -> Self {
        InjectorBuilder {
            self_id: "DI".to_owned(),
            deep_resolution: false,
            parameters: None,
        }
    }
}

impl InjectorBuilder {
    /// Sets the id the injector registers itself under. Defaults to `"DI"`.
    #[must_use]
    pub fn self_id(mut self, id: impl Into<String>) -> Self {
        self.self_id = id.into();
        self
    }

    /// Whether a type with no unique definition is constructed directly when
    /// it is requested by type. Disabled by default.
    #[must_use]
    pub fn deep_resolution(mut self, enabled: bool) -> Self {
        self.deep_resolution = enabled;
        self
    }

    /// Installs the parameter store up front. Parameters can only be set once
    /// per injector.
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    /// Builds the injector.
    #[must_use]
    pub fn build(self) -> Injector {
        Injector::with_config(self.self_id, self.deep_resolution, self.parameters)
    }
}

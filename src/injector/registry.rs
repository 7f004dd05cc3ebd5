use crate::{
    services::DefinitionKind, strip_qualifier, Class, Definition, Delegate,
    Function, Parameters, ServiceInfo, Svc, Value,
};
use super::SelfHandle;
use std::{any::TypeId, collections::HashMap};

/// What a lookup by id found, copied out of the registry so that nothing stays
/// borrowed while a value is being constructed.
pub(crate) enum Lookup {
    Cached(Value),
    Value(Value),
    Factory { factory: Function, singleton: bool },
    Injector,
}

/// Maps type names to the ids of the definitions known to produce them.
#[derive(Default)]
pub(crate) struct TypeIndex {
    ids: HashMap<String, Vec<String>>,
}

impl TypeIndex {
    pub fn insert(&mut self, type_name: &str, id: &str) {
        let ids = self
            .ids
            .entry(strip_qualifier(type_name).to_owned())
            .or_default();
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_owned());
        }
    }

    /// The id registered for `type_name`, if there is exactly one.
    pub fn unique(&self, type_name: &str) -> Option<&str> {
        match self.ids.get(type_name).map(Vec::as_slice) {
            Some([id]) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn candidates(&self, type_name: &str) -> usize {
        self.ids.get(type_name).map_or(0, Vec::len)
    }
}

/// All the mutable state of an [`Injector`](crate::Injector).
pub(crate) struct Registry {
    pub self_id: String,
    pub deep_resolution: bool,
    definitions: HashMap<String, Definition>,
    instances: HashMap<String, Value>,
    types: TypeIndex,
    delegates: Vec<(String, Svc<dyn Delegate>)>,
    parameters: Option<Parameters>,
    classes: HashMap<String, Svc<Class>>,
    class_names: HashMap<TypeId, String>,
    functions: HashMap<String, Function>,
    self_handle: Option<SelfHandle>,
}

impl Registry {
    pub fn new(self_id: String, deep_resolution: bool) -> Self {
        Registry {
            self_id,
            deep_resolution,
            definitions: HashMap::new(),
            instances: HashMap::new(),
            types: TypeIndex::default(),
            delegates: Vec::new(),
            parameters: None,
            classes: HashMap::new(),
            class_names: HashMap::new(),
            functions: HashMap::new(),
            self_handle: None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Stores a definition and indexes the types it is known to produce.
    /// The caller has already checked that `id` is free.
    pub fn insert(&mut self, id: &str, definition: Definition) {
        match &definition.kind {
            DefinitionKind::Value(Value::Object(object)) => {
                let info = object.info();
                self.types.insert(info.name(), id);
                if let Some(class) = self.class_of(info.id()) {
                    self.types.insert(class.name(), id);
                    for interface in class.interfaces() {
                        self.types.insert(interface, id);
                    }
                }
            }
            DefinitionKind::Injector => {
                self.types.insert(ServiceInfo::of::<crate::Injector>().name(), id);
            }
            DefinitionKind::Value(_) | DefinitionKind::Factory(_) => {}
        }

        if let Some(declared_type) = &definition.declared_type {
            self.types.insert(declared_type, id);
        }

        self.definitions.insert(id.to_owned(), definition);
    }

    pub fn lookup(&self, id: &str) -> Option<Lookup> {
        let definition = self.definitions.get(id)?;
        if definition.singleton {
            if let Some(instance) = self.instances.get(id) {
                return Some(Lookup::Cached(instance.clone()));
            }
        }

        Some(match &definition.kind {
            DefinitionKind::Value(value) => Lookup::Value(value.clone()),
            DefinitionKind::Factory(factory) => Lookup::Factory {
                factory: factory.clone(),
                singleton: definition.singleton,
            },
            DefinitionKind::Injector => Lookup::Injector,
        })
    }

    /// Caches a constructed singleton. A value cached by a re-entrant
    /// construction of the same id is replaced.
    pub fn cache(&mut self, id: &str, value: Value) -> Value {
        self.instances.insert(id.to_owned(), value.clone());
        value
    }

    pub fn self_handle(&self) -> Option<Svc<crate::Injector>> {
        self.self_handle.as_ref()?.upgrade()
    }

    pub fn set_self_handle(&mut self, handle: SelfHandle) {
        self.self_handle = Some(handle);
    }

    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .definitions
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn types(&self) -> &TypeIndex {
        &self.types
    }

    /// Registers or replaces the delegate for `prefix`, keeping the position
    /// of a replaced entry.
    pub fn set_delegate(&mut self, prefix: &str, delegate: Svc<dyn Delegate>) {
        match self.delegates.iter_mut().find(|(existing, _)| existing == prefix) {
            Some((_, slot)) => *slot = delegate,
            None => self.delegates.push((prefix.to_owned(), delegate)),
        }
    }

    /// The first delegate, in registration order, whose prefix `id` starts
    /// with.
    pub fn delegate_for(&self, id: &str) -> Option<Svc<dyn Delegate>> {
        self.delegates
            .iter()
            .find(|(prefix, _)| id.starts_with(prefix.as_str()))
            .map(|(_, delegate)| delegate.clone())
    }

    /// Installs the parameter store unless one is already installed.
    pub fn set_parameters(&mut self, parameters: Parameters) -> bool {
        if self.parameters.is_some() {
            return false;
        }
        self.parameters = Some(parameters);
        true
    }

    pub fn parameter(&self, key: &str) -> Option<Value> {
        self.parameters.as_ref()?.get(key).cloned()
    }

    pub fn define_class(&mut self, class: Class) {
        if let Some(type_id) = class.type_id() {
            self.class_names.insert(type_id, class.name().to_owned());
        }
        self.classes.insert(class.name().to_owned(), Svc::new(class));
    }

    pub fn class(&self, name: &str) -> Option<Svc<Class>> {
        self.classes.get(name).cloned()
    }

    pub fn class_of(&self, type_id: TypeId) -> Option<Svc<Class>> {
        self.class_names
            .get(&type_id)
            .and_then(|name| self.class(name))
    }

    pub fn define_function(&mut self, name: &str, function: Function) {
        self.functions.insert(name.to_owned(), function);
    }

    pub fn function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).cloned()
    }
}

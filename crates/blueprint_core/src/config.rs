//! Named configuration properties
//!
//! A [`ConfigManager`] holds one property per name. Each property keeps its
//! own value type and may carry a `setter` (applied on every write, including
//! the default value) and a `getter` (applied on every read).
//!
//! Properties must be defined exactly once before use. The store is
//! single-threaded and synchronous.

use std::any::{type_name, Any};
use std::fmt;

use indexmap::IndexMap;

use crate::error::{BlueprintError, Result};

/// Read transform for a config property
pub type Getter<T> = Box<dyn Fn(&T) -> T>;

/// Write transform for a config property
pub type Setter<T> = Box<dyn Fn(T) -> T>;

/// Options when defining a config property
pub struct ConfigDefine<T> {
    default_value: T,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T: Clone + 'static> ConfigDefine<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            getter: None,
            setter: None,
        }
    }

    /// Transform applied when reading the value
    pub fn getter<F: Fn(&T) -> T + 'static>(mut self, getter: F) -> Self {
        self.getter = Some(Box::new(getter));
        self
    }

    /// Transform applied when writing the value
    pub fn setter<F: Fn(T) -> T + 'static>(mut self, setter: F) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }
}

struct Property<T> {
    value: T,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T: Clone + 'static> Property<T> {
    fn read(&self) -> T {
        match &self.getter {
            Some(getter) => getter(&self.value),
            None => self.value.clone(),
        }
    }

    fn write(&mut self, value: T) {
        self.value = match &self.setter {
            Some(setter) => setter(value),
            None => value,
        };
    }
}

/// Type-erased view of a [`Property`] so differently typed properties share one map.
trait StoredProperty {
    fn read_any(&self) -> Box<dyn Any>;
    fn write_any(&mut self, value: Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>>;
    fn value_type(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + 'static> StoredProperty for Property<T> {
    fn read_any(&self) -> Box<dyn Any> {
        Box::new(self.read())
    }

    fn write_any(&mut self, value: Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>> {
        let value = value.downcast::<T>()?;
        self.write(*value);
        Ok(())
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A set of values written together by [`ConfigManager::set_batch`]
#[derive(Default)]
pub struct ConfigBatch {
    entries: Vec<(String, Box<dyn Any>)>,
}

impl ConfigBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder form)
    pub fn with<T: 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), Box::new(value)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for ConfigBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Every defined property with its current (getter-transformed) value
pub struct ConfigSnapshot {
    values: IndexMap<String, Box<dyn Any>>,
}

impl ConfigSnapshot {
    /// Value of `name`, if it was defined with type `T`
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Manages named configuration properties with optional getter/setter transforms
#[derive(Default)]
pub struct ConfigManager {
    properties: IndexMap<String, Box<dyn StoredProperty>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new property. The default value passes through the setter.
    pub fn define<T: Clone + 'static>(
        &mut self,
        name: impl Into<String>,
        options: ConfigDefine<T>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return Err(BlueprintError::AlreadyDefined(name));
        }

        let ConfigDefine {
            default_value,
            getter,
            setter,
        } = options;
        let value = match &setter {
            Some(setter) => setter(default_value),
            None => default_value,
        };

        self.properties.insert(
            name,
            Box::new(Property {
                value,
                getter,
                setter,
            }),
        );
        Ok(self)
    }

    /// Current value of a property, passed through its getter
    pub fn get<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        let property = self.property(name)?;
        property
            .as_any()
            .downcast_ref::<Property<T>>()
            .map(Property::read)
            .ok_or_else(|| BlueprintError::ConfigType {
                name: name.to_string(),
                expected: property.value_type(),
            })
    }

    /// Store a value, passed through the property's setter
    pub fn set<T: Clone + 'static>(&mut self, name: &str, value: T) -> Result<&mut Self> {
        let property = self.property_mut(name)?;
        let expected = property.value_type();
        match property.as_any_mut().downcast_mut::<Property<T>>() {
            Some(property) => {
                property.write(value);
                Ok(self)
            }
            None => Err(BlueprintError::ConfigType {
                name: name.to_string(),
                expected,
            }),
        }
    }

    /// Apply every entry of `batch` in order.
    ///
    /// Not transactional: entries applied before a failing one stay applied.
    pub fn set_batch(&mut self, batch: ConfigBatch) -> Result<&mut Self> {
        for (name, value) in batch.entries {
            let property = self.property_mut(&name)?;
            let expected = property.value_type();
            if property.write_any(value).is_err() {
                return Err(BlueprintError::ConfigType { name, expected });
            }
        }
        Ok(self)
    }

    /// Snapshot of every defined property
    pub fn get_all(&self) -> ConfigSnapshot {
        let values = self
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), property.read_any()))
            .collect();
        ConfigSnapshot { values }
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn property(&self, name: &str) -> Result<&dyn StoredProperty> {
        self.properties
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| BlueprintError::NotDefined(name.to_string()))
    }

    fn property_mut(&mut self, name: &str) -> Result<&mut Box<dyn StoredProperty>> {
        self.properties
            .get_mut(name)
            .ok_or_else(|| BlueprintError::NotDefined(name.to_string()))
    }
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_stores_default() {
        let mut config = ConfigManager::new();
        config.define("width", ConfigDefine::new(500.0f64)).unwrap();

        assert!(config.has("width"));
        assert_eq!(config.get::<f64>("width").unwrap(), 500.0);
    }

    #[test]
    fn test_define_chains() {
        let mut config = ConfigManager::new();
        config
            .define("width", ConfigDefine::new(1.0f64))
            .unwrap()
            .define("label", ConfigDefine::new(String::from("x")))
            .unwrap();

        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_redefinition_fails() {
        let mut config = ConfigManager::new();
        config.define("width", ConfigDefine::new(1.0f64)).unwrap();

        let err = config.define("width", ConfigDefine::new(2.0f64)).unwrap_err();
        assert_eq!(err, BlueprintError::AlreadyDefined("width".into()));
        assert_eq!(config.get::<f64>("width").unwrap(), 1.0);
    }

    #[test]
    fn test_access_before_define_fails() {
        let mut config = ConfigManager::new();

        assert_eq!(
            config.get::<f64>("height").unwrap_err(),
            BlueprintError::NotDefined("height".into())
        );
        assert!(matches!(
            config.set("height", 3.0f64),
            Err(BlueprintError::NotDefined(_))
        ));
        assert!(!config.has("height"));
    }

    #[test]
    fn test_setter_applies_to_default() {
        let mut config = ConfigManager::new();
        config
            .define("padding", ConfigDefine::new(-4i32).setter(|v: i32| v.max(0)))
            .unwrap();

        assert_eq!(config.get::<i32>("padding").unwrap(), 0);
    }

    #[test]
    fn test_transform_combinations() {
        let mut config = ConfigManager::new();
        config
            .define(
                "both",
                ConfigDefine::new(0i32)
                    .setter(|v: i32| v * 2)
                    .getter(|v: &i32| v + 1),
            )
            .unwrap()
            .define("setter", ConfigDefine::new(0i32).setter(|v: i32| v * 2))
            .unwrap()
            .define("getter", ConfigDefine::new(0i32).getter(|v: &i32| v + 1))
            .unwrap()
            .define("plain", ConfigDefine::new(0i32))
            .unwrap();

        for name in ["both", "setter", "getter", "plain"] {
            config.set(name, 5i32).unwrap();
        }

        assert_eq!(config.get::<i32>("both").unwrap(), 11);
        assert_eq!(config.get::<i32>("setter").unwrap(), 10);
        assert_eq!(config.get::<i32>("getter").unwrap(), 6);
        assert_eq!(config.get::<i32>("plain").unwrap(), 5);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let mut config = ConfigManager::new();
        config.define("width", ConfigDefine::new(1.0f64)).unwrap();

        let err = config.get::<i32>("width").unwrap_err();
        assert_eq!(
            err,
            BlueprintError::ConfigType {
                name: "width".into(),
                expected: "f64",
            }
        );
        assert!(config.set("width", 2i32).is_err());
        assert_eq!(config.get::<f64>("width").unwrap(), 1.0);
    }

    #[test]
    fn test_batch_then_snapshot() {
        let mut config = ConfigManager::new();
        config
            .define("a", ConfigDefine::new(0i32))
            .unwrap()
            .define("b", ConfigDefine::new(0i32).getter(|v: &i32| v * 10))
            .unwrap()
            .define("c", ConfigDefine::new(String::from("keep")))
            .unwrap();

        config
            .set_batch(ConfigBatch::new().with("a", 1i32).with("b", 2i32))
            .unwrap();

        let all = config.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all.get::<i32>("a"), Some(&1));
        assert_eq!(all.get::<i32>("b"), Some(&20));
        assert_eq!(all.get::<String>("c").map(String::as_str), Some("keep"));
    }

    #[test]
    fn test_batch_is_not_transactional() {
        let mut config = ConfigManager::new();
        config.define("a", ConfigDefine::new(0i32)).unwrap();

        let batch = ConfigBatch::new()
            .with("a", 7i32)
            .with("missing", 1i32)
            .with("a", 9i32);
        assert!(matches!(
            config.set_batch(batch),
            Err(BlueprintError::NotDefined(_))
        ));
        assert_eq!(config.get::<i32>("a").unwrap(), 7);
    }
}

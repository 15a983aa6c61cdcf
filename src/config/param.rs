use super::Origin;
use crate::text::PrettyValue;
use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use std::{any::Any, fmt, sync::Arc};
use tracing::warn;

/// Types that can be stored in a configuration file
pub trait Parameter:
    PrettyValue + Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
}

impl<T> Parameter for T where
    T: PrettyValue + Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    origin: Origin,
}

/// Shared handle on one typed configuration value and its provenance.
///
/// Cloning the handle does not clone the value: every clone observes the
/// inputs applied through the owning [`ConfigFile`](super::ConfigFile).
#[derive(Debug)]
pub struct Param<T> {
    name: Arc<str>,
    slot: Arc<RwLock<Slot<T>>>,
}

impl<T> Clone for Param<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Parameter> Param<T> {
    pub(crate) fn new(name: &str, value: T, origin: Origin) -> Self {
        Self {
            name: Arc::from(name),
            slot: Arc::new(RwLock::new(Slot { value, origin })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> T {
        self.slot.read().value.clone()
    }

    /// Borrows the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.read().value)
    }

    pub fn origin(&self) -> Origin {
        self.slot.read().origin
    }

    /// Applies `value` if `origin` has precedence over the current one.
    /// Returns whether the value was applied.
    pub fn set(&self, value: T, origin: Origin) -> bool {
        let mut slot = self.slot.write();
        if slot.origin < origin {
            slot.value = value;
            slot.origin = origin;
            true
        } else {
            false
        }
    }

    /// Replaces the current value unless it is a constant (or errored)
    pub fn override_with(&self, value: T) -> bool {
        self.set(value, Origin::Override)
    }

    /// Parses `text` if `origin` has precedence over the current one. A parse
    /// failure marks the value as errored. Returns whether the value is valid.
    pub fn input(&self, text: &str, origin: Origin) -> bool {
        let mut slot = self.slot.write();
        if slot.origin < origin {
            match T::read_pretty(text) {
                Ok(value) => {
                    slot.value = value;
                    slot.origin = origin;
                }
                Err(error) => {
                    warn!(
                        field = %self.name,
                        input = text,
                        %error,
                        "Unable to convert '{}' to '{}'",
                        text,
                        T::type_name()
                    );
                    slot.origin = Origin::Error;
                }
            }
        }
        slot.origin != Origin::Error
    }
}

/// Type erased view used by configuration files
pub(crate) trait ConfigEntry: fmt::Debug + Send + Sync {
    fn origin(&self) -> Origin;

    fn render(&self) -> String;

    fn input(&self, text: &str, origin: Origin) -> bool;

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Restores from a snapshot unless the current value has precedence
    fn load_json(&self, value: &serde_json::Value) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Parameter> ConfigEntry for Param<T> {
    fn origin(&self) -> Origin {
        Param::origin(self)
    }

    fn render(&self) -> String {
        self.slot.read().value.to_pretty()
    }

    fn input(&self, text: &str, origin: Origin) -> bool {
        Param::input(self, text, origin)
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.slot.read().value)
    }

    fn load_json(&self, value: &serde_json::Value) -> bool {
        let mut slot = self.slot.write();
        if Origin::Load <= slot.origin {
            return slot.origin != Origin::Error;
        }
        match serde_json::from_value::<T>(value.clone()) {
            Ok(v) => {
                slot.value = v;
                slot.origin = Origin::Load;
                true
            }
            Err(error) => {
                warn!(field = %self.name, %error, "Unable to restore value from json");
                slot.origin = Origin::Error;
                false
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

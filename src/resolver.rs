//! Polymorphic record decoding.
//!
//! A [`Registry`] maps discriminator values (the `type` field of a record
//! body) to decode functions. Candidates are tried in table order, so more
//! specific shapes must come before looser ones sharing a discriminator;
//! when no candidate accepts the body the registry falls back to its
//! generic decoder, which keeps only the fields every variant has.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A discriminator table that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// Two candidates claim the same discriminator value.
    #[error("{registry}: discriminator '{discriminator}' is registered twice")]
    Ambiguous {
        registry: &'static str,
        discriminator: &'static str,
    },
}

type DecodeFn<T> = Box<dyn Fn(&Value) -> serde_json::Result<T> + Send + Sync>;

fn decoder<T, U>(wrap: fn(U) -> T) -> DecodeFn<T>
where
    T: 'static,
    U: DeserializeOwned + 'static,
{
    Box::new(move |value| U::deserialize(value).map(wrap))
}

/// One entry of a [`Registry`].
pub struct Candidate<T> {
    discriminator: &'static str,
    decode: DecodeFn<T>,
}

impl<T> Candidate<T> {
    pub fn discriminator(&self) -> &'static str {
        self.discriminator
    }
}

impl<T> fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("discriminator", &self.discriminator)
            .finish_non_exhaustive()
    }
}

/// Ordered discriminator → decoder table with a generic fallback.
pub struct Registry<T> {
    name: &'static str,
    field: &'static str,
    candidates: Vec<Candidate<T>>,
    fallback: Option<DecodeFn<T>>,
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("candidates", &self.candidates)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Builder for [`Registry`].
pub struct RegistryBuilder<T> {
    name: &'static str,
    field: &'static str,
    candidates: Vec<Candidate<T>>,
    fallback: Option<DecodeFn<T>>,
}

impl<T: 'static> RegistryBuilder<T> {
    /// Register `U` for bodies whose discriminator equals `discriminator`.
    #[must_use]
    pub fn candidate<U>(mut self, discriminator: &'static str, wrap: fn(U) -> T) -> Self
    where
        U: DeserializeOwned + 'static,
    {
        self.candidates.push(Candidate {
            discriminator,
            decode: decoder(wrap),
        });
        self
    }

    /// Decoder used when no candidate accepts a body.
    #[must_use]
    pub fn fallback<U>(mut self, wrap: fn(U) -> T) -> Self
    where
        U: DeserializeOwned + 'static,
    {
        self.fallback = Some(decoder(wrap));
        self
    }

    /// Check the table and build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Ambiguous`] when a discriminator is
    /// registered more than once.
    pub fn build(self) -> Result<Registry<T>, ResolverError> {
        for (i, candidate) in self.candidates.iter().enumerate() {
            let duplicate = self.candidates[..i]
                .iter()
                .any(|earlier| earlier.discriminator == candidate.discriminator);
            if duplicate {
                return Err(ResolverError::Ambiguous {
                    registry: self.name,
                    discriminator: candidate.discriminator,
                });
            }
        }

        Ok(Registry {
            name: self.name,
            field: self.field,
            candidates: self.candidates,
            fallback: self.fallback,
        })
    }
}

impl<T: 'static> Registry<T> {
    /// Start a table named `name` that dispatches on the body field `field`.
    pub fn builder(name: &'static str, field: &'static str) -> RegistryBuilder<T> {
        RegistryBuilder {
            name,
            field,
            candidates: Vec::new(),
            fallback: None,
        }
    }
}

impl<T> Registry<T> {
    /// The first candidate registered for `discriminator`.
    pub fn resolve(&self, discriminator: &str) -> Option<&Candidate<T>> {
        self.candidates
            .iter()
            .find(|candidate| candidate.discriminator == discriminator)
    }

    /// Discriminators in table order.
    pub fn discriminators(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.candidates.iter().map(|candidate| candidate.discriminator)
    }

    /// Decode a body, choosing the variant from its discriminator field.
    pub fn decode(&self, value: &Value) -> serde_json::Result<T> {
        let discriminator = value.get(self.field).and_then(Value::as_str);

        let mut last_error = None;
        if let Some(discriminator) = discriminator {
            for candidate in &self.candidates {
                if candidate.discriminator != discriminator {
                    continue;
                }
                match (candidate.decode)(value) {
                    Ok(decoded) => return Ok(decoded),
                    Err(err) => last_error = Some(err),
                }
            }
        }

        match &self.fallback {
            Some(fallback) => {
                tracing::debug!(
                    registry = self.name,
                    discriminator = discriminator.unwrap_or("<missing>"),
                    "decoding with generic fallback"
                );
                fallback(value)
            }
            None => Err(last_error.unwrap_or_else(|| {
                serde::de::Error::custom(format!(
                    "{}: no variant for {} '{}'",
                    self.name,
                    self.field,
                    discriminator.unwrap_or("<missing>")
                ))
            })),
        }
    }
}

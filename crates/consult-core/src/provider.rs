//! Provider records and the read-only catalog they live in
//!
//! A [`ProviderCatalog`] is the ordered, immutable seed list the directory
//! filters over. It is built once (from the built-in seed, a `Vec`, or a JSON
//! file) and shared by reference; nothing mutates a provider afterwards.
//!
//! ```rust
//! use docbot_consult_core::provider::{ProviderCatalog, ProviderId};
//!
//! let catalog = ProviderCatalog::seed();
//! assert_eq!(catalog.len(), 5);
//! assert!(catalog.get(ProviderId(1)).unwrap().is_online);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConsultError, ConsultResult};

/// Stable identity of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u32);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProviderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A care provider listed in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub specialty: String,
    /// Portrait reference (URL or path), opaque to the core
    #[serde(alias = "imageRef", alias = "image")]
    pub image_ref: String,
    /// Whether the provider can be called right now
    #[serde(alias = "isOnline")]
    pub is_online: bool,
}

impl Provider {
    /// Create a new provider record
    pub fn new(
        id: impl Into<ProviderId>,
        name: impl Into<String>,
        specialty: impl Into<String>,
        image_ref: impl Into<String>,
        is_online: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialty: specialty.into(),
            image_ref: image_ref.into(),
            is_online,
        }
    }

    /// Whether a call may be started with this provider
    pub fn can_call(&self) -> bool {
        self.is_online
    }

    /// Status badge text shown on the provider card
    pub fn availability_label(&self) -> &'static str {
        if self.is_online {
            "Available Now"
        } else {
            "Offline"
        }
    }

    /// Text of the call button on the provider card
    pub fn call_action_label(&self) -> &'static str {
        if self.is_online {
            "Start Consultation"
        } else {
            "Currently Unavailable"
        }
    }

    /// Case-insensitive substring match against name or specialty.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.specialty.to_lowercase().contains(needle)
    }
}

/// Card view model handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCard {
    pub id: ProviderId,
    pub name: String,
    pub specialty: String,
    pub image_ref: String,
    pub is_online: bool,
    pub availability_label: &'static str,
    pub call_action_label: &'static str,
    pub call_enabled: bool,
}

impl From<&Provider> for ProviderCard {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            name: provider.name.clone(),
            specialty: provider.specialty.clone(),
            image_ref: provider.image_ref.clone(),
            is_online: provider.is_online,
            availability_label: provider.availability_label(),
            call_action_label: provider.call_action_label(),
            call_enabled: provider.can_call(),
        }
    }
}

/// Ordered, id-unique, immutable list of providers
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Arc<[Provider]>,
}

impl ProviderCatalog {
    /// Build a catalog, rejecting duplicate ids. Order is kept as given.
    pub fn new(providers: Vec<Provider>) -> ConsultResult<Self> {
        let mut seen = HashSet::with_capacity(providers.len());
        for provider in &providers {
            if !seen.insert(provider.id) {
                return Err(ConsultError::DuplicateProvider {
                    provider_id: provider.id,
                });
            }
        }
        Ok(Self {
            providers: providers.into(),
        })
    }

    /// The built-in directory used when no provider file is configured
    pub fn seed() -> Self {
        let providers = vec![
            Provider::new(
                1,
                "Dr. Sarah Chen",
                "Cardiologist",
                "https://images.unsplash.com/photo-1559839734-2b71ea197ec2?q=80&w=400&h=400&fit=crop",
                true,
            ),
            Provider::new(
                2,
                "Dr. Michael Patel",
                "Neurologist",
                "https://images.unsplash.com/photo-1612349317150-e413f6a5b16d?q=80&w=400&h=400&fit=crop",
                true,
            ),
            Provider::new(
                3,
                "Dr. Emily Rodriguez",
                "Dermatologist",
                "https://images.unsplash.com/photo-1594824476967-48c8b964273f?q=80&w=400&h=400&fit=crop",
                false,
            ),
            Provider::new(
                4,
                "Dr. James Wilson",
                "Pediatrician",
                "https://images.unsplash.com/photo-1622253692010-333f2da6031d?q=80&w=400&h=400&fit=crop",
                true,
            ),
            Provider::new(
                5,
                "Dr. Lisa Thompson",
                "Psychiatrist",
                "https://images.unsplash.com/photo-1527613426441-4da17471b66d?q=80&w=400&h=400&fit=crop",
                false,
            ),
        ];
        Self {
            providers: providers.into(),
        }
    }

    /// Parse a JSON array of providers
    pub fn from_json_str(json: &str) -> ConsultResult<Self> {
        let providers: Vec<Provider> = serde_json::from_str(json)
            .map_err(|e| ConsultError::provider_source(format!("invalid provider JSON: {}", e)))?;
        Self::new(providers)
    }

    /// Load a JSON array of providers from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> ConsultResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConsultError::provider_source(format!("failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!("Loaded {} providers from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Look up a provider by id
    pub fn get(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// All providers, in catalog order
    pub fn as_slice(&self) -> &[Provider] {
        &self.providers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Provider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::seed()
    }
}

//! Per-collection memo of artifact descriptors.
//!
//! A coordinate reached through several paths is read from the metadata
//! provider once. Failures are remembered too, so a broken coordinate is
//! reported once no matter how often it is referenced.

use std::collections::HashMap;
use std::rc::Rc;

use arbor_core::coordinate::Coordinate;
use arbor_core::provider::{ArtifactDescriptor, MetadataProvider};
use arbor_util::errors::ArborResult;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: HashMap<Coordinate, Option<Rc<ArtifactDescriptor>>>,
    hits: usize,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a descriptor up, reading it from `provider` on first use.
    ///
    /// Returns `Ok(None)` when an earlier read of the same coordinate failed;
    /// that error has already been handed to the caller once.
    pub fn fetch(
        &mut self,
        coordinate: &Coordinate,
        provider: &dyn MetadataProvider,
    ) -> ArborResult<Option<Rc<ArtifactDescriptor>>> {
        if let Some(entry) = self.entries.get(coordinate) {
            self.hits += 1;
            debug!(coordinate = %coordinate, "descriptor cache hit");
            return Ok(entry.clone());
        }
        match provider.read_descriptor(coordinate) {
            Ok(descriptor) => {
                let descriptor = Rc::new(descriptor);
                self.entries
                    .insert(coordinate.clone(), Some(Rc::clone(&descriptor)));
                Ok(Some(descriptor))
            }
            Err(e) => {
                self.entries.insert(coordinate.clone(), None);
                Err(e)
            }
        }
    }

    /// Number of lookups answered without calling the provider.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of distinct coordinates read so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

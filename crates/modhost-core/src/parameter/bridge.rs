//! Parameter vector shared between the control plane and the audio thread.
//!
//! The control side writes values and raises a dirty flag; the audio
//! thread checks the flag once at the start of each block and, if set,
//! hands the module a complete snapshot. Neither side ever blocks.

use super::ParameterInfo;
use crate::lockfree::{AtomicFlag, AtomicFloat};
use crate::module::ProcessingModule;
use crate::{Error, Result};
use std::sync::Arc;

struct SharedParameters {
    infos: Box<[ParameterInfo]>,
    values: Box<[AtomicFloat]>,
    dirty: AtomicFlag,
}

/// Control-plane access to a host's parameters.
///
/// Cheap to clone; writes become visible to the module at the next block.
#[derive(Clone)]
pub struct ParameterHandle {
    shared: Arc<SharedParameters>,
}

impl ParameterHandle {
    #[inline]
    pub fn count(&self) -> usize {
        self.shared.values.len()
    }

    pub fn info(&self, index: usize) -> Option<&ParameterInfo> {
        self.shared.infos.get(index)
    }

    pub fn infos(&self) -> &[ParameterInfo] {
        &self.shared.infos
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.shared.infos.iter().position(|info| info.name == name)
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.shared.values.get(index).map(AtomicFloat::get)
    }

    pub fn values(&self) -> Vec<f32> {
        self.shared.values.iter().map(AtomicFloat::get).collect()
    }

    pub fn set(&self, index: usize, value: f32) -> Result<()> {
        let slot = self
            .shared
            .values
            .get(index)
            .ok_or(Error::ParameterIndex {
                index,
                count: self.count(),
            })?;
        slot.set(value);
        self.shared.dirty.set(true);
        Ok(())
    }

    /// Set from a normalized 0.0-1.0 control value using the declared range.
    pub fn set_normalized(&self, index: usize, normalized: f32) -> Result<()> {
        let info = self.info(index).ok_or(Error::ParameterIndex {
            index,
            count: self.count(),
        })?;
        self.set(index, info.range.denormalize(normalized))
    }

    /// Replace the whole vector. Rejected without writing if the length differs.
    ///
    /// Slots are written one at a time, so a flush racing this call can
    /// deliver a mix of old and new values. The dirty flag is raised after
    /// the last write, and the following flush delivers the complete vector.
    pub fn set_all(&self, values: &[f32]) -> Result<()> {
        if values.len() != self.count() {
            return Err(Error::ParameterCount {
                expected: self.count(),
                got: values.len(),
            });
        }
        for (slot, &value) in self.shared.values.iter().zip(values) {
            slot.set(value);
        }
        self.shared.dirty.set(true);
        Ok(())
    }

    /// Request a change notification without writing any value.
    pub fn touch(&self) {
        self.shared.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.get()
    }
}

impl std::fmt::Debug for ParameterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterHandle")
            .field("values", &self.values())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Audio-thread side of the parameter vector.
pub struct ParameterBridge {
    shared: Arc<SharedParameters>,
    snapshot: Vec<f32>,
}

impl ParameterBridge {
    /// Values start at each parameter's default, with the dirty flag set.
    pub fn new(infos: Vec<ParameterInfo>) -> (Self, ParameterHandle) {
        let snapshot: Vec<f32> = infos.iter().map(ParameterInfo::default_value).collect();
        let shared = Arc::new(SharedParameters {
            values: snapshot.iter().map(|&v| AtomicFloat::new(v)).collect(),
            infos: infos.into_boxed_slice(),
            dirty: AtomicFlag::new(true),
        });
        let handle = ParameterHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared, snapshot }, handle)
    }

    /// Notify the module if anything changed since the last flush.
    ///
    /// Returns whether `params_changed` was called.
    #[inline]
    pub fn flush<M: ProcessingModule + ?Sized>(&mut self, module: &mut M) -> bool {
        if !self.shared.dirty.take() {
            return false;
        }
        self.notify(module);
        true
    }

    /// Notify the module unconditionally and clear the dirty flag.
    pub fn force_flush<M: ProcessingModule + ?Sized>(&mut self, module: &mut M) {
        self.shared.dirty.set(false);
        self.notify(module);
    }

    #[inline]
    fn notify<M: ProcessingModule + ?Sized>(&mut self, module: &mut M) {
        for (dst, src) in self.snapshot.iter_mut().zip(self.shared.values.iter()) {
            *dst = src.get();
        }
        module.params_changed(&self.snapshot);
    }

    /// Values last delivered to the module.
    pub fn snapshot(&self) -> &[f32] {
        &self.snapshot
    }
}

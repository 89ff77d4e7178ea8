use crate::device::{DeviceError, GraphicsDevice, Resource};

/// Device objects owned by one renderer, in creation order.
#[derive(Debug, Default)]
pub struct ResourceSet {
    live: Vec<Resource>,
    closed: bool,
}

impl ResourceSet {
    pub fn track(&mut self, resource: Resource) {
        debug_assert!(!self.closed, "tracked {resource} after teardown");
        self.live.push(resource);
    }

    /// Fails once teardown has run; nothing may be created afterwards.
    pub fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.closed {
            Err(DeviceError::TornDown)
        } else {
            Ok(())
        }
    }

    pub fn live(&self) -> &[Resource] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Releases everything in reverse creation order and closes the set.
    ///
    /// Runs once; later calls release nothing. A failed release is logged and
    /// does not stop the remaining ones. Returns how many objects were released.
    pub fn release_all(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;

        let mut released = 0;
        while let Some(resource) = self.live.pop() {
            match device.release(resource) {
                Ok(()) => released += 1,
                Err(err) => log::warn!("failed to release {resource}: {err}"),
            }
        }
        released
    }
}
